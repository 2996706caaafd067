//! Media primitive bridge.
//!
//! The media primitive is the host's native audio pipeline (ExoPlayer,
//! AVPlayer, a desktop decoder/output chain, ...). The core never decodes
//! audio itself: it loads a stream URI into the primitive, issues transport
//! commands, and reacts to the events the primitive reports.
//!
//! Instead of registering listener callbacks, the host pushes every
//! asynchronous notification through a [`MediaEventSink`] handed to it by
//! [`MediaPrimitive::attach`]. The sink is a plain channel sender, so events
//! raised on arbitrary host threads are funnelled into the playback engine's
//! own task and applied there in order.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::{error::Result, platform::PlatformSendSync};

/// Coarse lifecycle phase reported by the media primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaState {
    /// Nothing loaded, or the primitive was stopped.
    Idle,
    /// Waiting for enough data to start or continue rendering.
    Buffering,
    /// Ready to render immediately; whether it actually renders depends on
    /// [`MediaPrimitive::is_playing`].
    Ready,
    /// The loaded item played to its natural end.
    Ended,
}

/// Native repeat behaviour of the primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaRepeatMode {
    #[default]
    Off,
    One,
    All,
}

/// Asynchronous notification raised by the media primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// The primitive moved to a new lifecycle phase.
    StateChanged(MediaState),
    /// Rendering started or stopped (pause, buffering stall, end of track).
    IsPlayingChanged(bool),
    /// Loading, decoding or streaming failed. `message` carries the host's
    /// diagnostic text when one is available.
    Error { message: Option<String> },
}

/// Sending half handed to the primitive for event delivery.
///
/// Cloning is cheap; sends never block. Events sent after the receiving
/// engine has shut down are dropped silently.
#[derive(Debug, Clone)]
pub struct MediaEventSink {
    sender: mpsc::UnboundedSender<MediaEvent>,
}

impl MediaEventSink {
    /// Create a sink and the receiver the engine consumes.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MediaEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Deliver an event. Returns `false` if the engine is gone.
    pub fn emit(&self, event: MediaEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// Host-provided audio playback primitive.
///
/// Command methods may complete before the primitive has actually changed
/// state; the resulting transitions are reported later through the attached
/// [`MediaEventSink`]. Query methods must be cheap and non-blocking since the
/// progress loop polls them at a fixed cadence.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::media::{MediaEventSink, MediaPrimitive};
///
/// async fn start(primitive: &dyn MediaPrimitive, sink: MediaEventSink) -> Result<()> {
///     primitive.attach(sink);
///     primitive.load("http://10.0.2.2:8080/api/stream/42").await?;
///     primitive.prepare().await?;
///     primitive.play().await
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait MediaPrimitive: PlatformSendSync {
    /// Register the sink that receives all subsequent events. Replaces any
    /// previously attached sink.
    fn attach(&self, sink: MediaEventSink);

    /// Replace the loaded media item with the given URI.
    async fn load(&self, uri: &str) -> Result<()>;

    /// Start acquiring resources for the loaded item.
    async fn prepare(&self) -> Result<()>;

    /// Start or resume rendering.
    async fn play(&self) -> Result<()>;

    /// Pause rendering, keeping the current position.
    async fn pause(&self) -> Result<()>;

    /// Stop rendering and drop buffered data.
    async fn stop(&self) -> Result<()>;

    /// Remove every loaded media item.
    async fn clear(&self) -> Result<()>;

    /// Seek to an absolute position in the loaded item.
    async fn seek(&self, position: Duration) -> Result<()>;

    /// Configure the primitive's native end-of-item repeat behaviour.
    async fn set_repeat_mode(&self, mode: MediaRepeatMode) -> Result<()>;

    /// Current playback position.
    fn position(&self) -> Duration;

    /// Duration of the loaded item, `None` while unknown.
    fn duration(&self) -> Option<Duration>;

    /// Whether the primitive is rendering audio right now.
    fn is_playing(&self) -> bool;

    /// Release all native resources. The primitive is unusable afterwards.
    async fn release(&self) -> Result<()>;
}
