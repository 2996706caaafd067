//! Core service integration tests
//!
//! Boots a [`CoreService`] on scripted bridges and checks catalog loading,
//! the now-playing notification sync, transport actions and shutdown.

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::media::{MediaEvent, MediaEventSink, MediaPrimitive, MediaRepeatMode};
use bridge_traits::session::{ForegroundSession, NotificationContent, TransportAction};
use async_trait::async_trait;
use bytes::Bytes;
use core_catalog::{CatalogErrorKind, Song};
use core_playback::{PlaybackConfig, PlayerState};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CatalogEvent, CoreEvent};
use core_service::{CoreError, CoreService};
use mockall::mock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const BASE_URL: &str = "http://10.0.2.2:8080/api";

mock! {
    HttpClient {}

    #[async_trait]
    impl HttpClient for HttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

// ============================================================================
// Recording bridges
// ============================================================================

#[derive(Clone, Default)]
struct RecordingMedia {
    calls: Arc<Mutex<Vec<String>>>,
    sink: Arc<Mutex<Option<MediaEventSink>>>,
    playing: Arc<Mutex<bool>>,
    stop_delay: Option<Duration>,
}

impl RecordingMedia {
    fn with_slow_stop(delay: Duration) -> Self {
        Self {
            stop_delay: Some(delay),
            ..Self::default()
        }
    }

    fn set_playing(&self, playing: bool) {
        *self.playing.lock().unwrap() = playing;
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn emit(&self, event: MediaEvent) {
        if let Some(sink) = self.sink.lock().unwrap().as_ref() {
            sink.emit(event);
        }
    }
}

#[async_trait]
impl MediaPrimitive for RecordingMedia {
    fn attach(&self, sink: MediaEventSink) {
        *self.sink.lock().unwrap() = Some(sink);
    }
    async fn load(&self, uri: &str) -> BridgeResult<()> {
        self.record(format!("load {}", uri));
        Ok(())
    }
    async fn prepare(&self) -> BridgeResult<()> {
        self.record("prepare");
        Ok(())
    }
    async fn play(&self) -> BridgeResult<()> {
        self.record("play");
        *self.playing.lock().unwrap() = true;
        Ok(())
    }
    async fn pause(&self) -> BridgeResult<()> {
        self.record("pause");
        *self.playing.lock().unwrap() = false;
        Ok(())
    }
    async fn stop(&self) -> BridgeResult<()> {
        if let Some(delay) = self.stop_delay {
            tokio::time::sleep(delay).await;
        }
        self.record("stop");
        *self.playing.lock().unwrap() = false;
        Ok(())
    }
    async fn clear(&self) -> BridgeResult<()> {
        self.record("clear");
        Ok(())
    }
    async fn seek(&self, _position: Duration) -> BridgeResult<()> {
        self.record("seek");
        Ok(())
    }
    async fn set_repeat_mode(&self, _mode: MediaRepeatMode) -> BridgeResult<()> {
        self.record("repeat");
        Ok(())
    }
    fn position(&self) -> Duration {
        Duration::ZERO
    }
    fn duration(&self) -> Option<Duration> {
        Some(Duration::from_secs(180))
    }
    fn is_playing(&self) -> bool {
        *self.playing.lock().unwrap()
    }
    async fn release(&self) -> BridgeResult<()> {
        self.record("release");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SessionCall {
    Start(NotificationContent),
    Update(NotificationContent),
    Stop,
}

#[derive(Clone, Default)]
struct RecordingSession {
    calls: Arc<Mutex<Vec<SessionCall>>>,
}

impl RecordingSession {
    fn calls(&self) -> Vec<SessionCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ForegroundSession for RecordingSession {
    async fn start_foreground(&self, content: NotificationContent) -> BridgeResult<()> {
        self.calls.lock().unwrap().push(SessionCall::Start(content));
        Ok(())
    }
    async fn update_notification(&self, content: NotificationContent) -> BridgeResult<()> {
        self.calls.lock().unwrap().push(SessionCall::Update(content));
        Ok(())
    }
    async fn stop_foreground(&self) -> BridgeResult<()> {
        self.calls.lock().unwrap().push(SessionCall::Stop);
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn json_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    }
}

fn catalog_http(status: u16, body: &'static str) -> MockHttpClient {
    let mut http = MockHttpClient::new();
    http.expect_execute()
        .withf(|request| request.url == format!("{}/songs", BASE_URL))
        .returning(move |_| Ok(json_response(status, body)));
    http
}

fn start_service(
    media: &RecordingMedia,
    http: MockHttpClient,
    session: Option<&RecordingSession>,
) -> CoreService {
    let mut builder = CoreConfig::builder()
        .api_base_url(BASE_URL)
        .media_primitive(Arc::new(media.clone()))
        .http_client(Arc::new(http));
    if let Some(session) = session {
        builder = builder.foreground_session(Arc::new(session.clone()));
    }
    let config = builder.build().expect("valid config");

    CoreService::start(config, PlaybackConfig::default().with_shuffle_seed(1))
        .expect("service starts")
}

async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_load_catalog_sets_playlist() {
    let media = RecordingMedia::default();
    let http = catalog_http(
        200,
        r#"{"songs":[{"id":"1","title":"One"},{"id":"2","title":"Two"}],"total":2}"#,
    );
    let core = start_service(&media, http, None);
    let mut events = core.event_bus().subscribe();

    let response = core.load_catalog().await.unwrap();
    let snapshot = core.player().queue_snapshot().await.unwrap();

    assert_eq!(response.total, 2);
    assert_eq!(
        snapshot.songs.iter().map(|s| s.id.as_str()).collect::<Vec<_>>(),
        vec!["1", "2"]
    );
    assert_eq!(snapshot.current_index, None);
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Catalog(CatalogEvent::Loaded { count: 2, total: 2 })
    );
}

#[tokio::test]
async fn test_load_catalog_failure_leaves_player_alone() {
    let media = RecordingMedia::default();
    let http = catalog_http(503, "maintenance");
    let core = start_service(&media, http, None);
    let mut events = core.event_bus().subscribe();

    let err = core.load_catalog().await.unwrap_err();

    match err {
        CoreError::Catalog(catalog) => assert_eq!(catalog.kind(), CatalogErrorKind::Server),
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        events.recv().await.unwrap(),
        CoreEvent::Catalog(CatalogEvent::LoadFailed { .. })
    ));
    assert!(core.player().queue_snapshot().await.unwrap().songs.is_empty());
    assert!(media.calls().is_empty());
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn test_now_playing_sync_drives_notification() {
    let media = RecordingMedia::default();
    let session = RecordingSession::default();
    let core = start_service(&media, MockHttpClient::new(), Some(&session));

    core.player().play(Song::new("7", "Seven", "Band", 200));
    eventually(|| !session.calls().is_empty()).await;
    assert_eq!(
        session.calls()[0],
        SessionCall::Start(NotificationContent::new("Seven", "Band", false))
    );

    media.emit(MediaEvent::IsPlayingChanged(true));
    eventually(|| session.calls().len() >= 2).await;
    assert_eq!(
        session.calls()[1],
        SessionCall::Update(NotificationContent::new("Seven", "Band", true))
    );

    core.shutdown().await;
}

#[tokio::test]
async fn test_stop_action_stops_player_and_session() {
    let media = RecordingMedia::default();
    let session = RecordingSession::default();
    let core = start_service(&media, MockHttpClient::new(), Some(&session));

    core.player().play(Song::new("7", "Seven", "Band", 200));
    eventually(|| !session.calls().is_empty()).await;

    core.handle_action(TransportAction::Stop).await;
    core.player().queue_snapshot().await;

    assert_eq!(media.count("stop"), 1);
    assert_eq!(session.calls().last(), Some(&SessionCall::Stop));
    assert!(!core.session().unwrap().is_foreground().await);
}

#[tokio::test]
async fn test_stop_action_with_slow_primitive_keeps_session_down() {
    let media = RecordingMedia::with_slow_stop(Duration::from_millis(50));
    let session = RecordingSession::default();
    let core = start_service(&media, MockHttpClient::new(), Some(&session));

    core.player().play(Song::new("7", "Seven", "Band", 200));
    eventually(|| !session.calls().is_empty()).await;
    media.emit(MediaEvent::IsPlayingChanged(true));
    eventually(|| session.calls().len() >= 2).await;

    media.set_playing(false);
    media.emit(MediaEvent::IsPlayingChanged(false));
    core.handle_action(TransportAction::Stop).await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(session.calls().last(), Some(&SessionCall::Stop));
    assert!(!session
        .calls()
        .iter()
        .skip(2)
        .any(|call| matches!(call, SessionCall::Start(_))));
    assert!(!core.session().unwrap().is_foreground().await);
    assert_eq!(core.player().state(), PlayerState::Idle);

    core.shutdown().await;
}

#[tokio::test]
async fn test_actions_without_session_reach_player() {
    let media = RecordingMedia::default();
    let core = start_service(&media, MockHttpClient::new(), None);

    core.handle_action(TransportAction::Pause).await;
    core.handle_action(TransportAction::Play).await;
    core.player().queue_snapshot().await;

    assert_eq!(media.calls(), vec!["pause".to_string(), "play".to_string()]);
    assert!(core.session().is_none());
}

// ============================================================================
// Shutdown
// ============================================================================

#[tokio::test]
async fn test_shutdown_is_idempotent() {
    let media = RecordingMedia::default();
    let session = RecordingSession::default();
    let core = start_service(&media, MockHttpClient::new(), Some(&session));

    core.player().play(Song::new("1", "One", "", 100));
    eventually(|| !session.calls().is_empty()).await;

    core.shutdown().await;
    core.shutdown().await;

    assert!(core.is_shut_down());
    assert!(core.player().is_released());
    assert_eq!(media.count("release"), 1);
    assert_eq!(
        session
            .calls()
            .iter()
            .filter(|c| **c == SessionCall::Stop)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_player_is_inert_after_shutdown() {
    let media = RecordingMedia::default();
    let core = start_service(&media, MockHttpClient::new(), None);

    core.shutdown().await;
    core.player().play(Song::new("1", "One", "", 100));
    core.handle_action(TransportAction::Next).await;

    assert_eq!(media.calls(), vec!["release".to_string()]);
    assert!(core.player().queue_snapshot().await.is_none());
}
