//! # Playback Module
//!
//! Playback control core: drives a host-provided
//! [`MediaPrimitive`](bridge_traits::media::MediaPrimitive) through a play
//! queue and publishes observable player state.
//!
//! ## Overview
//!
//! - [`PlayerController`]: cloneable, fire-and-forget facade
//! - [`PlayerState`] / [`PlaybackInfo`]: latest-value observable state
//! - [`PlayQueue`]: playlist, selection and next/previous/end-of-track rules
//! - [`ProgressBroadcaster`]: position polling while audio is playing
//! - [`MediaControls`]: reduced transport surface for external UI
//!
//! A single engine task owns the primitive and all mutable state. Commands and
//! primitive events are applied strictly in order, with primitive events
//! taking priority.

pub mod config;
pub mod controller;
mod engine;
pub mod error;
pub mod progress;
pub mod queue;
pub mod types;

pub use config::PlaybackConfig;
pub use controller::{MediaControls, PlayerController};
pub use engine::FALLBACK_ERROR_MESSAGE;
pub use error::{PlaybackError, Result};
pub use progress::ProgressBroadcaster;
pub use queue::{EndOfTrack, PlayQueue};
pub use types::{PlaybackInfo, PlayerState, QueueSnapshot, RepeatMode};
