//! Session/notification bridge.
//!
//! Connects the host foreground session (Android foreground service, iOS
//! audio session, desktop media keys) to the player:
//!
//! - inbound [`TransportAction`]s map one-to-one onto controller calls
//! - outbound now-playing updates start the foreground session on first use
//!   and refresh its notification afterwards
//!
//! Host failures are logged and reported on the event bus; they never reach
//! the player state.

use std::sync::Arc;

use bridge_traits::session::{ForegroundSession, NotificationContent, TransportAction};
use core_playback::PlayerController;
use core_runtime::events::{CoreEvent, EventBus, SessionEvent};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct SessionBridge {
    player: PlayerController,
    session: Arc<dyn ForegroundSession>,
    /// Whether the foreground session is running. Held across host calls so
    /// concurrent updates cannot start it twice.
    started: Mutex<bool>,
    event_bus: Option<EventBus>,
}

impl SessionBridge {
    pub fn new(player: PlayerController, session: Arc<dyn ForegroundSession>) -> Self {
        Self {
            player,
            session,
            started: Mutex::new(false),
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub async fn is_foreground(&self) -> bool {
        *self.started.lock().await
    }

    /// Apply a transport action from the notification or lock screen.
    ///
    /// `Stop` stops playback and then leaves the foreground lifecycle.
    pub async fn handle_action(&self, action: TransportAction) {
        info!(%action, "Transport action");
        self.emit(SessionEvent::ActionReceived { action });

        match action {
            TransportAction::Play => self.player.resume(),
            TransportAction::Pause => self.player.pause(),
            TransportAction::Next => self.player.skip_to_next(),
            TransportAction::Previous => self.player.skip_to_previous(),
            TransportAction::Stop => {
                self.player.stop();
                // Tear down only once the engine has applied the stop.
                self.player.queue_snapshot().await;
                self.stop_foreground().await;
            }
        }
    }

    /// Show what is playing. Starts the foreground session on the first call,
    /// refreshes the notification afterwards.
    pub async fn update_display(&self, title: Option<&str>, artist: Option<&str>, is_playing: bool) {
        let content = NotificationContent::new(
            title.unwrap_or_default(),
            artist.unwrap_or_default(),
            is_playing,
        );
        self.show(content, None).await;
    }

    /// Push `content` to the host. With `song_id` set, the update is dropped
    /// unless that song is still current once the latch is held.
    async fn show(&self, content: NotificationContent, song_id: Option<&str>) {
        let title = content.title.clone();
        let is_playing = content.is_playing;

        let mut started = self.started.lock().await;
        if let Some(song_id) = song_id {
            let current = self.player.playback_info().current_song;
            if current.as_ref().map(|song| song.id.as_str()) != Some(song_id) {
                debug!(song_id, "Dropping stale now-playing update");
                return;
            }
        }
        if *started {
            match self.session.update_notification(content).await {
                Ok(()) => {
                    debug!(%title, is_playing, "Notification updated");
                    self.emit(SessionEvent::NotificationUpdated { title, is_playing });
                }
                Err(err) => self.report_failure("update_notification", err.to_string()),
            }
        } else {
            match self.session.start_foreground(content).await {
                Ok(()) => {
                    info!(%title, "Foreground session started");
                    *started = true;
                    self.emit(SessionEvent::ForegroundStarted { title });
                }
                Err(err) => self.report_failure("start_foreground", err.to_string()),
            }
        }
    }

    /// Remove the notification and leave the foreground lifecycle. The next
    /// `update_display` starts a new session.
    pub async fn stop_foreground(&self) {
        let mut started = self.started.lock().await;
        match self.session.stop_foreground().await {
            Ok(()) => {
                info!("Foreground session stopped");
                self.emit(SessionEvent::ForegroundStopped);
            }
            Err(err) => self.report_failure("stop_foreground", err.to_string()),
        }
        *started = false;
    }

    /// Keep the notification in sync with the player.
    ///
    /// Calls [`update_display`](Self::update_display) whenever the current
    /// song or the playing flag changes. Position updates are ignored. Runs
    /// until `cancel` fires or the player goes away.
    pub fn spawn_now_playing_sync(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let bridge = Arc::clone(self);
        let mut info = self.player.subscribe_info();

        tokio::spawn(async move {
            let mut shown: Option<(String, bool)> = None;

            loop {
                let now_playing = {
                    let info = info.borrow_and_update();
                    info.current_song.as_ref().map(|song| {
                        (
                            song.id.clone(),
                            song.title.clone(),
                            song.artist.clone(),
                            info.is_playing,
                        )
                    })
                };

                match now_playing {
                    Some((id, title, artist, is_playing)) => {
                        let key = (id, is_playing);
                        if shown.as_ref() != Some(&key) {
                            let content = NotificationContent::new(title, artist, is_playing);
                            bridge.show(content, Some(&key.0)).await;
                            shown = Some(key);
                        }
                    }
                    None => shown = None,
                }

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    changed = info.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("Now-playing sync finished");
        })
    }

    fn report_failure(&self, operation: &str, message: String) {
        warn!(operation, error = %message, "Foreground session call failed");
        self.emit(SessionEvent::Failed { message });
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Session(event)).ok();
        }
    }
}
