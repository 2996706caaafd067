//! # Playback Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{PlaybackError, Result};

/// Tuning knobs for the playback engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Cadence of the progress loop while the primitive is playing.
    ///
    /// Default: 500 ms.
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    /// `skip_to_previous` restarts the current song instead of changing
    /// track once playback is past this position.
    ///
    /// Default: 3000 ms.
    #[serde(default = "default_restart_threshold_ms")]
    pub restart_threshold_ms: u64,

    /// Seed for shuffle selection. `None` seeds from OS entropy.
    #[serde(default)]
    pub shuffle_seed: Option<u64>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: default_progress_interval_ms(),
            restart_threshold_ms: default_restart_threshold_ms(),
            shuffle_seed: None,
        }
    }
}

impl PlaybackConfig {
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    pub fn restart_threshold(&self) -> Duration {
        Duration::from_millis(self.restart_threshold_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !(50..=10_000).contains(&self.progress_interval_ms) {
            return Err(PlaybackError::InvalidConfig(format!(
                "progress_interval_ms must be between 50 and 10000, got {}",
                self.progress_interval_ms
            )));
        }

        if self.restart_threshold_ms > 60_000 {
            return Err(PlaybackError::InvalidConfig(
                "restart_threshold_ms cannot exceed 60000".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_progress_interval_ms() -> u64 {
    500
}

fn default_restart_threshold_ms() -> u64 {
    3000
}
