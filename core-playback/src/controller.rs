//! # Player Controller
//!
//! Cloneable facade over the playback engine task.
//!
//! Every control operation is fire-and-forget: it posts a command to the
//! engine mailbox and returns immediately. Outcomes are observed through the
//! [`PlayerState`] and [`PlaybackInfo`] watch channels, which always hold the
//! latest value, so a late subscriber sees the current state right away.
//!
//! ## Usage
//!
//! ```ignore
//! let player = PlayerController::spawn(media, StreamLocator::new(base), PlaybackConfig::default())?;
//! let mut state = player.subscribe_state();
//!
//! player.set_playlist(songs.clone());
//! player.play(songs[0].clone());
//!
//! while state.changed().await.is_ok() {
//!     println!("{:?}", *state.borrow());
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bridge_traits::media::{MediaEventSink, MediaPrimitive};
use core_catalog::{Song, StreamLocator};
use core_runtime::events::EventBus;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, info_span, Instrument};

use crate::config::PlaybackConfig;
use crate::engine::{Command, Outputs, PlaybackEngine};
use crate::error::{PlaybackError, Result};
use crate::types::{PlaybackInfo, PlayerState, QueueSnapshot, RepeatMode};

const ERROR_CHANNEL_CAPACITY: usize = 16;

/// Handle to a running playback engine.
///
/// Clones share the same engine. The engine shuts down on [`release`] or once
/// every clone has been dropped.
///
/// [`release`]: PlayerController::release
#[derive(Clone)]
pub struct PlayerController {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<PlayerState>,
    info: watch::Receiver<PlaybackInfo>,
    errors: broadcast::Sender<String>,
    released: Arc<AtomicBool>,
}

impl PlayerController {
    /// Attach to `media` and start the engine on the current tokio runtime.
    pub fn spawn(
        media: Arc<dyn MediaPrimitive>,
        locator: StreamLocator,
        config: PlaybackConfig,
    ) -> Result<Self> {
        Self::spawn_with_event_bus(media, locator, config, None)
    }

    /// Like [`spawn`](Self::spawn), additionally publishing
    /// [`PlaybackEvent`](core_runtime::events::PlaybackEvent)s on `event_bus`.
    pub fn spawn_with_event_bus(
        media: Arc<dyn MediaPrimitive>,
        locator: StreamLocator,
        config: PlaybackConfig,
        event_bus: Option<EventBus>,
    ) -> Result<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| PlaybackError::EngineUnavailable(e.to_string()))?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (sink, media_rx) = MediaEventSink::channel();
        let (state_tx, state_rx) = watch::channel(PlayerState::Idle);
        let (info_tx, info_rx) = watch::channel(PlaybackInfo::default());
        let (errors_tx, _) = broadcast::channel(ERROR_CHANNEL_CAPACITY);

        media.attach(sink);

        let engine = PlaybackEngine::new(
            media,
            locator,
            &config,
            command_tx.downgrade(),
            Outputs {
                state: state_tx,
                info: info_tx,
                errors: errors_tx.clone(),
            },
            event_bus,
        );
        runtime.spawn(
            engine
                .run(command_rx, media_rx)
                .instrument(info_span!("playback_engine")),
        );

        Ok(Self {
            commands: command_tx,
            state: state_rx,
            info: info_rx,
            errors: errors_tx,
            released: Arc::new(AtomicBool::new(false)),
        })
    }

    // ========================================================================
    // Control operations
    // ========================================================================

    /// Make `song` current (appending it to the playlist when absent) and
    /// start it from the beginning. Clears a latched error.
    pub fn play(&self, song: Song) {
        self.send(Command::Play(song));
    }

    pub fn resume(&self) {
        self.send(Command::Resume);
    }

    pub fn pause(&self) {
        self.send(Command::Pause);
    }

    /// Stop, unload and reset playback info, including repeat and shuffle.
    pub fn stop(&self) {
        self.send(Command::Stop);
    }

    pub fn skip_to_next(&self) {
        self.send(Command::SkipToNext);
    }

    /// Restart the current song when past the restart threshold, otherwise
    /// move to the previous one.
    pub fn skip_to_previous(&self) {
        self.send(Command::SkipToPrevious);
    }

    pub fn seek_to(&self, position_ms: u64) {
        self.send(Command::SeekTo(position_ms));
    }

    pub fn set_repeat_mode(&self, mode: RepeatMode) {
        self.send(Command::SetRepeatMode(mode));
    }

    pub fn set_shuffle_enabled(&self, enabled: bool) {
        self.send(Command::SetShuffle(enabled));
    }

    /// Replace the playlist. Playback of the current song is unaffected.
    pub fn set_playlist(&self, songs: Vec<Song>) {
        self.send(Command::SetPlaylist(songs));
    }

    /// Stop the progress loop and release the primitive.
    ///
    /// Idempotent; every later operation is a no-op.
    pub async fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            debug!("Player already released");
            return;
        }

        let (ack_tx, ack_rx) = oneshot::channel();
        if self.commands.send(Command::Release(ack_tx)).is_err() {
            debug!("Playback engine already stopped");
            return;
        }
        ack_rx.await.ok();
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn state(&self) -> PlayerState {
        self.state.borrow().clone()
    }

    pub fn playback_info(&self) -> PlaybackInfo {
        self.info.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<PlayerState> {
        self.state.clone()
    }

    pub fn subscribe_info(&self) -> watch::Receiver<PlaybackInfo> {
        self.info.clone()
    }

    /// Playlist and selection as the engine sees them, after every command
    /// sent before this call has been applied.
    pub async fn try_queue_snapshot(&self) -> Result<QueueSnapshot> {
        if self.is_released() {
            return Err(PlaybackError::Released);
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Snapshot(reply_tx))
            .map_err(|_| PlaybackError::EngineUnavailable("engine task exited".to_string()))?;
        reply_rx
            .await
            .map_err(|_| PlaybackError::EngineUnavailable("snapshot dropped".to_string()))
    }

    /// [`try_queue_snapshot`](Self::try_queue_snapshot), `None` once released.
    pub async fn queue_snapshot(&self) -> Option<QueueSnapshot> {
        self.try_queue_snapshot().await.ok()
    }

    /// Narrow transport capability for UI surfaces that should not see the
    /// playlist.
    pub fn media_controls(&self) -> MediaControls {
        MediaControls {
            player: self.clone(),
        }
    }

    fn send(&self, command: Command) {
        if self.is_released() {
            debug!(command = command.name(), "Ignoring command after release");
            return;
        }
        if self.commands.send(command).is_err() {
            debug!("Playback engine stopped; command dropped");
        }
    }
}

impl std::fmt::Debug for PlayerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerController")
            .field("state", &*self.state.borrow())
            .field("released", &self.is_released())
            .finish()
    }
}

// ============================================================================
// Media Controls
// ============================================================================

/// Play/pause/seek plus position, duration and error observation.
#[derive(Clone, Debug)]
pub struct MediaControls {
    player: PlayerController,
}

impl MediaControls {
    pub fn play(&self) {
        self.player.resume();
    }

    pub fn pause(&self) {
        self.player.pause();
    }

    pub fn seek_to(&self, position_ms: u64) {
        self.player.seek_to(position_ms);
    }

    /// Last published position.
    pub fn position(&self) -> Duration {
        self.player.info.borrow().position()
    }

    /// Last published duration, `None` while unknown.
    pub fn duration(&self) -> Option<Duration> {
        self.player.info.borrow().duration()
    }

    /// Error messages raised after this call. Slow consumers skip ahead.
    pub fn errors(&self) -> BoxStream<'static, String> {
        let receiver = self.player.errors.subscribe();
        stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(message) => return Some((message, receiver)),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(skipped, "Error stream lagged");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        })
        .boxed()
    }
}
