//! Playback engine task.
//!
//! The engine exclusively owns the media primitive, the play queue and the
//! published state. Facade commands, progress ticks and primitive events are
//! all funnelled into this single task and applied one at a time, so state
//! transitions are strictly sequential no matter which thread produced the
//! input.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::media::{MediaEvent, MediaPrimitive, MediaRepeatMode, MediaState};
use core_catalog::{Song, StreamLocator};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::config::PlaybackConfig;
use crate::error::PlaybackError;
use crate::progress::ProgressBroadcaster;
use crate::queue::{EndOfTrack, PlayQueue};
use crate::types::{PlaybackInfo, PlayerState, QueueSnapshot, RepeatMode};

/// Message shown when the primitive fails without a diagnostic.
pub const FALLBACK_ERROR_MESSAGE: &str = "Playback failed";

// ============================================================================
// Commands
// ============================================================================

/// Inputs accepted by the engine mailbox.
#[derive(Debug)]
pub(crate) enum Command {
    Play(Song),
    Resume,
    Pause,
    Stop,
    SkipToNext,
    SkipToPrevious,
    SeekTo(u64),
    SetRepeatMode(RepeatMode),
    SetShuffle(bool),
    SetPlaylist(Vec<Song>),
    /// Posted by the progress loop.
    ProgressTick,
    Snapshot(oneshot::Sender<QueueSnapshot>),
    Release(oneshot::Sender<()>),
}

impl Command {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Command::Play(_) => "play",
            Command::Resume => "resume",
            Command::Pause => "pause",
            Command::Stop => "stop",
            Command::SkipToNext => "skip_to_next",
            Command::SkipToPrevious => "skip_to_previous",
            Command::SeekTo(_) => "seek_to",
            Command::SetRepeatMode(_) => "set_repeat_mode",
            Command::SetShuffle(_) => "set_shuffle",
            Command::SetPlaylist(_) => "set_playlist",
            Command::ProgressTick => "progress_tick",
            Command::Snapshot(_) => "snapshot",
            Command::Release(_) => "release",
        }
    }
}

/// Sending halves the engine publishes through.
pub(crate) struct Outputs {
    pub state: watch::Sender<PlayerState>,
    pub info: watch::Sender<PlaybackInfo>,
    pub errors: broadcast::Sender<String>,
}

// ============================================================================
// Engine
// ============================================================================

pub(crate) struct PlaybackEngine {
    media: Arc<dyn MediaPrimitive>,
    locator: StreamLocator,
    restart_threshold: Duration,
    queue: PlayQueue,
    info: PlaybackInfo,
    state: PlayerState,
    error_latched: bool,
    rng: StdRng,
    progress: ProgressBroadcaster,
    mailbox: mpsc::WeakUnboundedSender<Command>,
    outputs: Outputs,
    event_bus: Option<EventBus>,
}

impl PlaybackEngine {
    pub(crate) fn new(
        media: Arc<dyn MediaPrimitive>,
        locator: StreamLocator,
        config: &PlaybackConfig,
        mailbox: mpsc::WeakUnboundedSender<Command>,
        outputs: Outputs,
        event_bus: Option<EventBus>,
    ) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            media,
            locator,
            restart_threshold: config.restart_threshold(),
            queue: PlayQueue::new(),
            info: PlaybackInfo::default(),
            state: PlayerState::Idle,
            error_latched: false,
            rng,
            progress: ProgressBroadcaster::new(config.progress_interval()),
            mailbox,
            outputs,
            event_bus,
        }
    }

    /// Process inputs until released or every facade handle is dropped.
    ///
    /// Primitive events take priority over queued commands.
    pub(crate) async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut media_events: mpsc::UnboundedReceiver<MediaEvent>,
    ) {
        info!(locator = %self.locator, "Playback engine started");

        loop {
            tokio::select! {
                biased;

                Some(event) = media_events.recv() => {
                    self.handle_media_event(event).await;
                }

                command = commands.recv() => match command {
                    Some(command) => {
                        if !self.handle_command(command).await {
                            break;
                        }
                    }
                    None => {
                        debug!("All player handles dropped");
                        self.release().await;
                        break;
                    }
                },
            }
        }

        info!("Playback engine stopped");
    }

    /// Returns `false` once the engine should shut down.
    async fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Play(song) => self.play(song).await,
            Command::Resume => self.resume().await,
            Command::Pause => self.pause().await,
            Command::Stop => self.stop().await,
            Command::SkipToNext => self.skip_to_next().await,
            Command::SkipToPrevious => self.skip_to_previous().await,
            Command::SeekTo(position_ms) => self.seek_to(position_ms).await,
            Command::SetRepeatMode(mode) => self.set_repeat_mode(mode).await,
            Command::SetShuffle(enabled) => self.set_shuffle(enabled),
            Command::SetPlaylist(songs) => self.set_playlist(songs),
            Command::ProgressTick => self.refresh_progress(),
            Command::Snapshot(reply) => {
                reply.send(self.queue.snapshot()).ok();
            }
            Command::Release(ack) => {
                self.release().await;
                ack.send(()).ok();
                return false;
            }
        }
        true
    }

    // ========================================================================
    // Control operations
    // ========================================================================

    async fn play(&mut self, song: Song) {
        let index = self.queue.select_or_append(&song);
        let uri = self.locator.stream_url(&song.id);
        info!(song_id = %song.id, index, uri = %uri, "Playing song");

        // A fresh play is the only way out of an error.
        if self.error_latched {
            self.error_latched = false;
            self.set_state(PlayerState::Idle);
        }

        self.info.current_song = Some(song.clone());
        self.publish_info();

        let result: BridgeResult<()> = async {
            self.media.load(&uri).await?;
            self.media.prepare().await?;
            self.media.play().await
        }
        .await;

        match result {
            Ok(()) => self.emit(PlaybackEvent::Started {
                song_id: song.id,
                title: song.title,
            }),
            Err(err) => self.fail(err.into()),
        }
    }

    async fn resume(&mut self) {
        debug!("Resume requested");
        if let Err(err) = self.media.play().await {
            self.fail(err.into());
        }
    }

    async fn pause(&mut self) {
        debug!("Pause requested");
        if let Err(err) = self.media.pause().await {
            self.fail(err.into());
        }
    }

    async fn stop(&mut self) {
        info!("Stopping playback");
        let song_id = self.current_song_id();

        let result: BridgeResult<()> = async {
            self.media.stop().await?;
            self.media.clear().await?;
            self.media.set_repeat_mode(MediaRepeatMode::Off).await
        }
        .await;

        self.progress.stop();
        self.queue.clear_selection();
        // Modes reset with the rest of the info, hence Off on the primitive.
        self.info = PlaybackInfo::default();
        self.publish_info();
        self.error_latched = false;
        self.set_state(PlayerState::Idle);
        self.emit(PlaybackEvent::Stopped { song_id });

        if let Err(err) = result {
            self.fail(err.into());
        }
    }

    async fn skip_to_next(&mut self) {
        let Some(index) = self
            .queue
            .next_index(self.info.shuffle_enabled, &mut self.rng)
        else {
            warn!("Skip to next ignored: playlist is empty");
            return;
        };
        debug!(index, shuffle = self.info.shuffle_enabled, "Skipping to next");
        self.play_index(index).await;
    }

    async fn skip_to_previous(&mut self) {
        if self.queue.is_empty() {
            warn!("Skip to previous ignored: playlist is empty");
            return;
        }

        let position = self.media.position();
        if position > self.restart_threshold {
            debug!(position_ms = position.as_millis() as u64, "Restarting current song");
            self.seek_to(0).await;
            return;
        }

        if let Some(index) = self.queue.previous_index() {
            debug!(index, "Skipping to previous");
            self.play_index(index).await;
        }
    }

    async fn play_index(&mut self, index: usize) {
        if let Some(song) = self.queue.get(index).cloned() {
            self.play(song).await;
        }
    }

    async fn seek_to(&mut self, position_ms: u64) {
        debug!(position_ms, "Seeking");
        if let Err(err) = self.media.seek(Duration::from_millis(position_ms)).await {
            self.fail(err.into());
            return;
        }

        self.info.position_ms = position_ms;
        self.info.duration_ms = self.media_duration_ms();
        self.info.is_playing = self.media.is_playing();
        self.publish_info();
    }

    async fn set_repeat_mode(&mut self, mode: RepeatMode) {
        info!(mode = %mode, "Repeat mode changed");
        self.info.repeat_mode = mode;
        self.publish_info();
        self.emit(PlaybackEvent::RepeatModeChanged {
            mode: mode.to_string(),
        });

        if let Err(err) = self.media.set_repeat_mode(mode.into()).await {
            self.fail(err.into());
        }
    }

    fn set_shuffle(&mut self, enabled: bool) {
        info!(enabled, "Shuffle changed");
        self.info.shuffle_enabled = enabled;
        self.publish_info();
        self.emit(PlaybackEvent::ShuffleChanged { enabled });
    }

    fn set_playlist(&mut self, songs: Vec<Song>) {
        let length = songs.len();
        let index_retained = self.queue.replace(songs);
        info!(length, index_retained, "Playlist replaced");
        self.emit(PlaybackEvent::QueueReplaced {
            length,
            index_retained,
        });
    }

    async fn release(&mut self) {
        info!("Releasing player");
        self.progress.stop();
        if let Err(err) = self.media.release().await {
            warn!(error = %err, "Media primitive release failed");
        }
    }

    // ========================================================================
    // Primitive events
    // ========================================================================

    async fn handle_media_event(&mut self, event: MediaEvent) {
        debug!(?event, "Media event");

        match event {
            MediaEvent::StateChanged(state) => self.on_state_changed(state).await,
            MediaEvent::IsPlayingChanged(playing) => self.on_is_playing_changed(playing),
            MediaEvent::Error { message } => {
                let message = message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string());
                self.latch_error(message);
            }
        }
    }

    async fn on_state_changed(&mut self, state: MediaState) {
        if self.error_latched {
            debug!(?state, "Ignoring media state while error is latched");
            return;
        }

        match state {
            MediaState::Idle => self.set_state(PlayerState::Idle),
            MediaState::Buffering => self.set_state(PlayerState::Buffering),
            MediaState::Ready => {
                let next = if self.media.is_playing() {
                    PlayerState::Playing
                } else {
                    PlayerState::Paused
                };
                self.set_state(next);
            }
            MediaState::Ended => {
                self.set_state(PlayerState::Paused);
                self.on_track_ended().await;
            }
        }
    }

    async fn on_track_ended(&mut self) {
        if let Some(song_id) = self.current_song_id() {
            self.emit(PlaybackEvent::Completed { song_id });
        }

        let action = self.queue.end_of_track(self.info.repeat_mode);
        debug!(?action, mode = %self.info.repeat_mode, "Track ended");

        match action {
            EndOfTrack::RestartCurrent => {
                self.seek_to(0).await;
                if let Err(err) = self.media.play().await {
                    self.fail(err.into());
                }
            }
            EndOfTrack::Advance => self.skip_to_next().await,
            EndOfTrack::Hold => {}
        }
    }

    fn on_is_playing_changed(&mut self, playing: bool) {
        let was_playing = self.info.is_playing;

        self.info.position_ms = self.media_position_ms();
        self.info.duration_ms = self.media_duration_ms();
        self.info.is_playing = playing;
        self.publish_info();

        if self.error_latched {
            self.progress.stop();
            return;
        }

        if playing {
            let mailbox = self.mailbox.clone();
            self.progress.start(self.media.clone(), move || {
                mailbox
                    .upgrade()
                    .is_some_and(|tx| tx.send(Command::ProgressTick).is_ok())
            });
        } else {
            self.progress.stop();
        }

        let resumed = self.state == PlayerState::Paused;
        if matches!(self.state, PlayerState::Playing | PlayerState::Paused) {
            self.set_state(if playing {
                PlayerState::Playing
            } else {
                PlayerState::Paused
            });
        }

        let song_id = self.current_song_id();
        let position_ms = self.info.position_ms;
        if playing && !was_playing && resumed {
            self.emit(PlaybackEvent::Resumed {
                song_id,
                position_ms,
            });
        } else if !playing && was_playing {
            self.emit(PlaybackEvent::Paused {
                song_id,
                position_ms,
            });
        }
    }

    fn refresh_progress(&mut self) {
        self.info.position_ms = self.media_position_ms();
        self.info.duration_ms = self.media_duration_ms();
        self.info.is_playing = self.media.is_playing();
        debug!(position_ms = self.info.position_ms, "Progress tick");
        self.publish_info();
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn fail(&mut self, err: PlaybackError) {
        self.latch_error(err.to_string());
    }

    fn latch_error(&mut self, message: String) {
        error!(error = %message, "Playback error");
        self.error_latched = true;
        self.progress.stop();
        self.set_state(PlayerState::Error(message.clone()));
        self.outputs.errors.send(message.clone()).ok();
        self.emit(PlaybackEvent::Error {
            song_id: self.current_song_id(),
            message,
        });
    }

    fn set_state(&mut self, state: PlayerState) {
        if self.state == state {
            return;
        }
        debug!(from = ?self.state, to = ?state, "Player state changed");
        self.state = state.clone();
        self.outputs.state.send_replace(state);
    }

    fn publish_info(&self) {
        self.outputs.info.send_replace(self.info.clone());
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Playback(event)).ok();
        }
    }

    fn current_song_id(&self) -> Option<String> {
        self.info.current_song.as_ref().map(|song| song.id.clone())
    }

    fn media_position_ms(&self) -> u64 {
        self.media.position().as_millis() as u64
    }

    fn media_duration_ms(&self) -> u64 {
        self.media
            .duration()
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}
