//! Desktop foreground session
//!
//! Desktop processes are never killed for playing audio in the background,
//! so there is no foreground service to enter. This implementation keeps
//! track of the notification the core asked for and logs every transition,
//! which is enough for development builds and headless integration runs.

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    session::{ForegroundSession, NotificationContent},
};
use std::sync::Mutex;
use tracing::info;

/// Logging [`ForegroundSession`] for desktop hosts.
#[derive(Debug, Default)]
pub struct DesktopForegroundSession {
    current: Mutex<Option<NotificationContent>>,
}

impl DesktopForegroundSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notification currently "shown", if the session is running.
    pub fn current(&self) -> Option<NotificationContent> {
        self.current
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn replace(&self, content: Option<NotificationContent>) {
        match self.current.lock() {
            Ok(mut guard) => *guard = content,
            Err(poisoned) => *poisoned.into_inner() = content,
        }
    }
}

#[async_trait]
impl ForegroundSession for DesktopForegroundSession {
    async fn start_foreground(&self, content: NotificationContent) -> Result<()> {
        info!(
            title = %content.title,
            artist = %content.artist,
            is_playing = content.is_playing,
            "Foreground session started"
        );
        self.replace(Some(content));
        Ok(())
    }

    async fn update_notification(&self, content: NotificationContent) -> Result<()> {
        info!(
            title = %content.title,
            is_playing = content.is_playing,
            actions = ?content.actions(),
            "Now playing updated"
        );
        self.replace(Some(content));
        Ok(())
    }

    async fn stop_foreground(&self) -> Result<()> {
        info!("Foreground session stopped");
        self.replace(None);
        Ok(())
    }
}
