//! Catalog data model

use serde::{Deserialize, Serialize};

/// A song as served by the catalog API.
///
/// Identity is [`Song::id`]; two songs with the same id are the same song as
/// far as the play queue is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub album: String,
    /// Length as reported by the catalog; `0` when unknown.
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub file_name: String,
    /// Size in bytes; `0` when unknown.
    #[serde(default)]
    pub file_size: i64,
    /// Server-side timestamp string, passed through verbatim.
    #[serde(default)]
    pub added_at: String,
}

impl Song {
    /// Minimal song with only the fields the player needs.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration: i64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: String::new(),
            duration,
            file_path: String::new(),
            file_name: String::new(),
            file_size: 0,
            added_at: String::new(),
        }
    }

    /// `mm:ss`, or `--:--` when the duration is unknown.
    pub fn formatted_duration(&self) -> String {
        if self.duration <= 0 {
            return "--:--".to_string();
        }
        format!("{:02}:{:02}", self.duration / 60, self.duration % 60)
    }

    /// Human-readable file size (`B`, `KB`, `MB`), `Unknown` when not reported.
    pub fn formatted_file_size(&self) -> String {
        if self.file_size <= 0 {
            return "Unknown".to_string();
        }

        let kb = self.file_size as f64 / 1024.0;
        let mb = kb / 1024.0;

        if mb >= 1.0 {
            format!("{:.2} MB", mb)
        } else if kb >= 1.0 {
            format!("{:.2} KB", kb)
        } else {
            format!("{} B", self.file_size)
        }
    }
}

/// Response body of `GET {base}/songs`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaylistResponse {
    #[serde(default)]
    pub songs: Vec<Song>,
    #[serde(default)]
    pub total: u64,
}
