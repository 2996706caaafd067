//! Periodic position polling while the primitive is playing.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::media::MediaPrimitive;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Owns at most one polling loop.
///
/// The loop calls `tick` immediately and then once per interval for as long
/// as the primitive reports that it is playing. It ends on its own when
/// playback stops or `tick` returns `false`, and promptly on [`stop`].
///
/// [`stop`]: ProgressBroadcaster::stop
#[derive(Debug)]
pub struct ProgressBroadcaster {
    interval: Duration,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl ProgressBroadcaster {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            cancel: None,
            task: None,
        }
    }

    /// Start polling, replacing any loop that is already running.
    pub fn start<F>(&mut self, media: Arc<dyn MediaPrimitive>, tick: F)
    where
        F: Fn() -> bool + Send + 'static,
    {
        self.stop();

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let interval = self.interval;

        let task = tokio::spawn(async move {
            debug!(interval_ms = interval.as_millis() as u64, "Progress loop started");
            loop {
                if !media.is_playing() || !tick() {
                    break;
                }

                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
            debug!("Progress loop finished");
        });

        self.cancel = Some(token);
        self.task = Some(task);
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.task = None;
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for ProgressBroadcaster {
    fn drop(&mut self) {
        self.stop();
    }
}
