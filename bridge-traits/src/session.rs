//! Foreground session and media notification bridge.
//!
//! Mobile platforms only keep a streaming app alive in the background while it
//! runs a foreground service (Android) or an active audio session (iOS), both
//! of which are tied to a visible "now playing" notification. The host
//! implements [`ForegroundSession`] to start, refresh and tear down that
//! lifecycle; the core decides *when* to do so.
//!
//! Transport actions the user triggers from the notification or lock screen
//! travel the other way as [`TransportAction`] values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::Result, platform::PlatformSendSync};

/// Inbound user command originating outside the app's own UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportAction {
    Play,
    Pause,
    Next,
    Previous,
    Stop,
}

impl fmt::Display for TransportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportAction::Play => "play",
            TransportAction::Pause => "pause",
            TransportAction::Next => "next",
            TransportAction::Previous => "previous",
            TransportAction::Stop => "stop",
        };
        f.write_str(name)
    }
}

/// Everything the host needs to render the playback notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    /// Song title (may be empty).
    pub title: String,
    /// Artist line (may be empty).
    pub artist: String,
    /// Whether audio is currently playing.
    pub is_playing: bool,
}

impl NotificationContent {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, is_playing: bool) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            is_playing,
        }
    }

    /// Compact action row, in display order: previous, play/pause toggle, next.
    pub fn actions(&self) -> [TransportAction; 3] {
        let toggle = if self.is_playing {
            TransportAction::Pause
        } else {
            TransportAction::Play
        };
        [TransportAction::Previous, toggle, TransportAction::Next]
    }

    /// Action fired when the user dismisses the notification.
    pub fn dismiss_action(&self) -> TransportAction {
        TransportAction::Stop
    }

    /// Playing notifications cannot be swiped away.
    pub fn is_ongoing(&self) -> bool {
        self.is_playing
    }
}

/// Host foreground-service / notification lifecycle.
///
/// - **Android**: `startForeground` / `NotificationManager.notify` /
///   `stopForeground(STOP_FOREGROUND_REMOVE)`
/// - **iOS**: `MPNowPlayingInfoCenter` plus an active `AVAudioSession`
/// - **Desktop**: MPRIS / SMTC metadata, or just logging
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait ForegroundSession: PlatformSendSync {
    /// Enter the foreground lifecycle and show the notification.
    async fn start_foreground(&self, content: NotificationContent) -> Result<()>;

    /// Refresh the notification of an already started session.
    async fn update_notification(&self, content: NotificationContent) -> Result<()>;

    /// Remove the notification and leave the foreground lifecycle.
    async fn stop_foreground(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playing_notification_offers_pause() {
        let content = NotificationContent::new("Song", "Artist", true);

        assert_eq!(
            content.actions(),
            [
                TransportAction::Previous,
                TransportAction::Pause,
                TransportAction::Next
            ]
        );
        assert!(content.is_ongoing());
    }

    #[test]
    fn paused_notification_offers_play_and_can_be_dismissed() {
        let content = NotificationContent::new("", "", false);

        assert_eq!(content.actions()[1], TransportAction::Play);
        assert!(!content.is_ongoing());
        assert_eq!(content.dismiss_action(), TransportAction::Stop);
    }

    #[test]
    fn transport_action_display() {
        assert_eq!(TransportAction::Previous.to_string(), "previous");
        assert_eq!(TransportAction::Stop.to_string(), "stop");
    }
}
