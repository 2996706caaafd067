//! Stream URI construction

use std::fmt;

/// Builds the stream URI the media primitive loads for a song.
///
/// The locator is a pure function of the base endpoint and the song id:
/// `{base}/stream/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLocator {
    base: String,
}

impl StreamLocator {
    /// `base` is the catalog API root, e.g. `http://10.0.2.2:8080/api`.
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn stream_url(&self, song_id: &str) -> String {
        format!("{}/stream/{}", self.base, song_id)
    }
}

impl fmt::Display for StreamLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/stream/{{id}}", self.base)
    }
}
