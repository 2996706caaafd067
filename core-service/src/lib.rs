//! Core service façade and bootstrap.
//!
//! Wires the host-provided bridges from a [`CoreConfig`] into the shared core:
//! the playback engine, the catalog client and, when the host supplies a
//! [`ForegroundSession`](bridge_traits::session::ForegroundSession), the
//! session bridge that keeps the now-playing notification current.
//!
//! [`CoreService`] is the single owner of the player lifecycle:
//! [`CoreService::shutdown`] is the one place that releases the player.
//!
//! ```ignore
//! let config = CoreConfig::builder()
//!     .media_primitive(Arc::new(host_player))
//!     .foreground_session(Arc::new(host_session))
//!     .build()?;
//! let core = CoreService::start(config, PlaybackConfig::default())?;
//!
//! core.load_catalog().await?;
//! core.player().play(song);
//! // ...
//! core.shutdown().await;
//! ```

pub mod error;
pub mod session;

pub use error::{CoreError, Result};
pub use session::SessionBridge;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bridge_traits::session::TransportAction;
use core_catalog::{CatalogClient, PlaylistResponse};
use core_playback::{PlaybackConfig, PlayerController};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CatalogEvent, CoreEvent, EventBus, EventStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Primary façade exposed to host applications.
pub struct CoreService {
    event_bus: EventBus,
    catalog: CatalogClient,
    player: PlayerController,
    session: Option<Arc<SessionBridge>>,
    sync_cancel: CancellationToken,
    sync_task: Mutex<Option<JoinHandle<()>>>,
    shut_down: AtomicBool,
}

impl CoreService {
    /// Start the playback engine and, if configured, the session bridge.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: CoreConfig, playback: PlaybackConfig) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::new(config.event_buffer_size);
        let catalog = CatalogClient::new(
            config.http_client.clone(),
            config.api_base_url.clone(),
            config.network_timeout,
        );
        let player = PlayerController::spawn_with_event_bus(
            config.media_primitive.clone(),
            catalog.stream_locator(),
            playback,
            Some(event_bus.clone()),
        )?;

        let sync_cancel = CancellationToken::new();
        let (session, sync_task) = match config.foreground_session.clone() {
            Some(host_session) => {
                let bridge = Arc::new(
                    SessionBridge::new(player.clone(), host_session)
                        .with_event_bus(event_bus.clone()),
                );
                let task = bridge.spawn_now_playing_sync(sync_cancel.child_token());
                (Some(bridge), Some(task))
            }
            None => (None, None),
        };

        info!(
            api_base_url = %config.api_base_url,
            session = session.is_some(),
            "Core service started"
        );

        Ok(Self {
            event_bus,
            catalog,
            player,
            session,
            sync_cancel,
            sync_task: Mutex::new(sync_task),
            shut_down: AtomicBool::new(false),
        })
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn catalog(&self) -> &CatalogClient {
        &self.catalog
    }

    pub fn session(&self) -> Option<Arc<SessionBridge>> {
        self.session.clone()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn subscribe_events(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    /// Fetch the catalog and make it the player's playlist.
    #[instrument(skip(self))]
    pub async fn load_catalog(&self) -> Result<PlaylistResponse> {
        match self.catalog.fetch_all_songs().await {
            Ok(response) => {
                let count = response.songs.len();
                info!(count, total = response.total, "Catalog loaded");
                self.event_bus
                    .emit(CoreEvent::Catalog(CatalogEvent::Loaded {
                        count,
                        total: response.total,
                    }))
                    .ok();
                self.player.set_playlist(response.songs.clone());
                Ok(response)
            }
            Err(err) => {
                warn!(error = %err, "Catalog load failed");
                self.event_bus
                    .emit(CoreEvent::Catalog(CatalogEvent::LoadFailed {
                        message: err.user_message(),
                    }))
                    .ok();
                Err(err.into())
            }
        }
    }

    /// Route a transport action through the session bridge, or straight to
    /// the player when no host session is configured.
    pub async fn handle_action(&self, action: TransportAction) {
        if let Some(session) = &self.session {
            session.handle_action(action).await;
            return;
        }

        match action {
            TransportAction::Play => self.player.resume(),
            TransportAction::Pause => self.player.pause(),
            TransportAction::Next => self.player.skip_to_next(),
            TransportAction::Previous => self.player.skip_to_previous(),
            TransportAction::Stop => self.player.stop(),
        }
    }

    /// Stop the now-playing sync, tear down the foreground session and
    /// release the player. Idempotent.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("Shutting down core service");

        self.sync_cancel.cancel();
        if let Some(task) = self.sync_task.lock().await.take() {
            if let Err(err) = task.await {
                warn!(error = %err, "Now-playing sync task failed");
            }
        }

        if let Some(session) = &self.session {
            if session.is_foreground().await {
                session.stop_foreground().await;
            }
        }

        self.player.release().await;
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }
}

impl Drop for CoreService {
    fn drop(&mut self) {
        // Lets the sync task drop its player handle if shutdown was skipped.
        self.sync_cancel.cancel();
    }
}
