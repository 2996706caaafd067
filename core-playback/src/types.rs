//! Observable player types

use bridge_traits::media::MediaRepeatMode;
use core_catalog::Song;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Coarse lifecycle phase of playback, derived by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    Idle,
    Buffering,
    Playing,
    Paused,
    /// Latched until the next `play`.
    Error(String),
}

impl PlayerState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlayerState::Playing)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            PlayerState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// End-of-track policy.
///
/// Manual skips ignore the repeat mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

impl RepeatMode {
    /// Next mode in the UI toggle order: Off → All → One → Off.
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::All => "all",
            RepeatMode::One => "one",
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RepeatMode> for MediaRepeatMode {
    fn from(mode: RepeatMode) -> Self {
        match mode {
            RepeatMode::Off => MediaRepeatMode::Off,
            RepeatMode::All => MediaRepeatMode::All,
            RepeatMode::One => MediaRepeatMode::One,
        }
    }
}

/// Snapshot of what is playing and how far along.
///
/// `position_ms` is whatever the primitive reported and may briefly exceed
/// `duration_ms` near the end of a track; [`PlaybackInfo::progress`] clamps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackInfo {
    pub current_song: Option<Song>,
    pub position_ms: u64,
    /// `0` while unknown.
    pub duration_ms: u64,
    pub is_playing: bool,
    pub repeat_mode: RepeatMode,
    pub shuffle_enabled: bool,
}

impl PlaybackInfo {
    /// Fraction played in `[0, 1]`; `0` while the duration is unknown.
    pub fn progress(&self) -> f32 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.position_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0) as f32
    }

    pub fn position(&self) -> Duration {
        Duration::from_millis(self.position_ms)
    }

    pub fn duration(&self) -> Option<Duration> {
        (self.duration_ms > 0).then(|| Duration::from_millis(self.duration_ms))
    }
}

/// Playlist contents and selection, as seen by the engine at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueSnapshot {
    pub songs: Vec<Song>,
    pub current_index: Option<usize>,
}

impl QueueSnapshot {
    pub fn current_song(&self) -> Option<&Song> {
        self.current_index.and_then(|index| self.songs.get(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(position_ms: u64, duration_ms: u64) -> PlaybackInfo {
        PlaybackInfo {
            position_ms,
            duration_ms,
            ..Default::default()
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(info(0, 200_000).progress(), 0.0);
        assert_eq!(info(100_000, 200_000).progress(), 0.5);
        assert_eq!(info(250_000, 200_000).progress(), 1.0);
    }

    #[test]
    fn test_progress_is_zero_without_duration() {
        assert_eq!(info(0, 0).progress(), 0.0);
        assert_eq!(info(90_000, 0).progress(), 0.0);
        assert_eq!(info(90_000, 0).duration(), None);
    }

    #[test]
    fn test_progress_stays_in_unit_interval() {
        for duration in [1u64, 7, 1_000, 180_000] {
            for position in [0u64, 1, 500, 179_999, 180_000, 10_000_000] {
                let progress = info(position, duration).progress();
                assert!((0.0..=1.0).contains(&progress));
            }
        }
    }

    #[test]
    fn test_repeat_mode_cycle() {
        assert_eq!(RepeatMode::Off.cycle(), RepeatMode::All);
        assert_eq!(RepeatMode::All.cycle(), RepeatMode::One);
        assert_eq!(RepeatMode::One.cycle(), RepeatMode::Off);
    }

    #[test]
    fn test_repeat_mode_maps_to_media() {
        assert_eq!(MediaRepeatMode::from(RepeatMode::One), MediaRepeatMode::One);
        assert_eq!(MediaRepeatMode::from(RepeatMode::All), MediaRepeatMode::All);
        assert_eq!(MediaRepeatMode::from(RepeatMode::Off), MediaRepeatMode::Off);
    }

    #[test]
    fn test_player_state_helpers() {
        assert!(PlayerState::Playing.is_playing());
        assert_eq!(
            PlayerState::Error("Playback failed".into()).error_message(),
            Some("Playback failed")
        );
        assert_eq!(PlayerState::default(), PlayerState::Idle);
    }
}
