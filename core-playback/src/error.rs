//! # Playback Error Types

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Errors raised by the playback core.
///
/// Control operations never return these: they are fire-and-forget and any
/// media failure ends up as [`PlayerState::Error`](crate::PlayerState::Error).
/// These errors cover construction and the request/response helpers.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The player was released; the request was not delivered.
    #[error("Player has been released")]
    Released,

    /// The engine task is not running (no runtime, or it already exited).
    #[error("Playback engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Invalid [`PlaybackConfig`](crate::PlaybackConfig) value.
    #[error("Invalid playback configuration: {0}")]
    InvalidConfig(String),

    /// A media primitive command failed.
    #[error(transparent)]
    Media(#[from] BridgeError),
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
