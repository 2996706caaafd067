//! # Core Configuration Module
//!
//! Provides configuration management for the playback core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds all host capabilities and settings. It enforces
//! fail-fast validation so a missing bridge is reported at startup rather
//! than on first use.
//!
//! ## Required Dependencies
//!
//! - `MediaPrimitive` - the host's audio pipeline; there is no default
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - catalog requests (desktop default: reqwest)
//! - `ForegroundSession` - notification lifecycle (none: no session bridge)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://music.example.com/api")
//!     .media_primitive(Arc::new(MyExoPlayerBridge::new()))
//!     .foreground_session(Arc::new(MyNotificationBridge::new()))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```ignore
//! use core_runtime::{config::CoreConfig, Error};
//!
//! let result = CoreConfig::builder().build();
//! assert!(matches!(result, Err(Error::CapabilityMissing { .. })));
//! ```

use crate::error::{Error, Result};
use bridge_traits::{ForegroundSession, HttpClient, MediaPrimitive};
use std::sync::Arc;
use std::time::Duration;

/// Default catalog endpoint (Android emulator alias for the host loopback).
pub const DEFAULT_API_BASE_URL: &str = "http://10.0.2.2:8080/api";

/// Default network timeout for catalog requests.
pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound accepted for [`CoreConfig::network_timeout`].
const MAX_NETWORK_TIMEOUT: Duration = Duration::from_secs(300);

/// Core configuration for the playback core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Base URL of the catalog API, without trailing slash
    pub api_base_url: String,

    /// Timeout applied to every catalog request
    pub network_timeout: Duration,

    /// Buffer size of the diagnostics event bus
    pub event_buffer_size: usize,

    /// Host audio pipeline (required)
    pub media_primitive: Arc<dyn MediaPrimitive>,

    /// HTTP client for catalog requests
    pub http_client: Arc<dyn HttpClient>,

    /// Foreground service / notification lifecycle (optional)
    pub foreground_session: Option<Arc<dyn ForegroundSession>>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("api_base_url", &self.api_base_url)
            .field("network_timeout", &self.network_timeout)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("media_primitive", &"MediaPrimitive { ... }")
            .field("http_client", &"HttpClient { ... }")
            .field(
                "foreground_session",
                &self
                    .foreground_session
                    .as_ref()
                    .map(|_| "ForegroundSession { ... }"),
            )
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The base URL is an absolute http(s) URL
    /// - The network timeout is within (0, 5 min]
    /// - The event buffer holds at least one event
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.is_empty() {
            return Err(Error::Config("API base URL cannot be empty".to_string()));
        }

        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(Error::Config(format!(
                "API base URL must start with http:// or https://, got '{}'",
                self.api_base_url
            )));
        }

        if self.network_timeout.is_zero() {
            return Err(Error::Config(
                "Network timeout must be greater than 0".to_string(),
            ));
        }

        if self.network_timeout > MAX_NETWORK_TIMEOUT {
            return Err(Error::Config(
                "Network timeout exceeds maximum of 300 seconds".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn media_primitive_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "MediaPrimitive".to_string(),
        message: "A MediaPrimitive implementation is required for playback. \
                 Android: wrap ExoPlayer/Media3. \
                 iOS: wrap AVPlayer. \
                 Desktop: inject the host audio pipeline."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::with_timeout(timeout).map_err(|e| {
        Error::Internal(format!("Failed to create default HttpClient: {}", e))
    })?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required to fetch the catalog. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default ReqwestHttpClient. \
                 Mobile: inject the platform-native HTTP stack (OkHttp/URLSession)."
            .to_string(),
    })
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_base_url: Option<String>,
    network_timeout: Option<Duration>,
    event_buffer_size: Option<usize>,
    media_primitive: Option<Arc<dyn MediaPrimitive>>,
    http_client: Option<Arc<dyn HttpClient>>,
    foreground_session: Option<Arc<dyn ForegroundSession>>,
}

impl CoreConfigBuilder {
    /// Sets the catalog API base URL.
    ///
    /// Default: `http://10.0.2.2:8080/api`. Trailing slashes are stripped.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder()
    ///     .api_base_url("https://music.example.com/api/");
    /// ```
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the catalog request timeout.
    ///
    /// Default: 30 seconds
    pub fn network_timeout(mut self, timeout: Duration) -> Self {
        self.network_timeout = Some(timeout);
        self
    }

    /// Sets the diagnostics event bus buffer size.
    ///
    /// Default: 100
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Sets the media primitive (required).
    pub fn media_primitive(mut self, primitive: Arc<dyn MediaPrimitive>) -> Self {
        self.media_primitive = Some(primitive);
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) will be used when
    /// the `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the foreground session implementation (optional).
    ///
    /// Without one, no session bridge is started and transport actions must
    /// be routed to the player directly.
    pub fn foreground_session(mut self, session: Arc<dyn ForegroundSession>) -> Self {
        self.foreground_session = Some(session);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - The media primitive is missing
    /// - No HTTP client was provided and no desktop default is available
    /// - Configuration values are invalid
    pub fn build(self) -> Result<CoreConfig> {
        let media_primitive = self
            .media_primitive
            .ok_or_else(media_primitive_missing_error)?;

        let network_timeout = self.network_timeout.unwrap_or(DEFAULT_NETWORK_TIMEOUT);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(network_timeout)?,
        };

        let api_base_url = self
            .api_base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        let config = CoreConfig {
            api_base_url,
            network_timeout,
            event_buffer_size: self
                .event_buffer_size
                .unwrap_or(crate::events::DEFAULT_EVENT_BUFFER_SIZE),
            media_primitive,
            http_client,
            foreground_session: self.foreground_session,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{
        error::Result as BridgeResult, HttpRequest, HttpResponse, MediaEventSink,
        MediaRepeatMode, NotificationContent,
    };

    struct NullMedia;

    #[async_trait]
    impl MediaPrimitive for NullMedia {
        fn attach(&self, _sink: MediaEventSink) {}
        async fn load(&self, _uri: &str) -> BridgeResult<()> {
            Ok(())
        }
        async fn prepare(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn play(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn pause(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn stop(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn clear(&self) -> BridgeResult<()> {
            Ok(())
        }
        async fn seek(&self, _position: Duration) -> BridgeResult<()> {
            Ok(())
        }
        async fn set_repeat_mode(&self, _mode: MediaRepeatMode) -> BridgeResult<()> {
            Ok(())
        }
        fn position(&self) -> Duration {
            Duration::ZERO
        }
        fn duration(&self) -> Option<Duration> {
            None
        }
        fn is_playing(&self) -> bool {
            false
        }
        async fn release(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    struct NullHttp;

    #[async_trait]
    impl HttpClient for NullHttp {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Ok(HttpResponse {
                status: 204,
                headers: Default::default(),
                body: Default::default(),
            })
        }
    }

    struct NullSession;

    #[async_trait]
    impl ForegroundSession for NullSession {
        async fn start_foreground(&self, _content: NotificationContent) -> BridgeResult<()> {
            Ok(())
        }
        async fn update_notification(&self, _content: NotificationContent) -> BridgeResult<()> {
            Ok(())
        }
        async fn stop_foreground(&self) -> BridgeResult<()> {
            Ok(())
        }
    }

    fn builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .media_primitive(Arc::new(NullMedia))
            .http_client(Arc::new(NullHttp))
    }

    #[test]
    fn test_builder_requires_media_primitive() {
        let result = CoreConfig::builder().http_client(Arc::new(NullHttp)).build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "MediaPrimitive");
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_defaults() {
        let config = builder().build().unwrap();

        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.network_timeout, Duration::from_secs(30));
        assert_eq!(config.event_buffer_size, 100);
        assert!(config.foreground_session.is_none());
    }

    #[test]
    fn test_builder_strips_trailing_slash() {
        let config = builder()
            .api_base_url("https://music.example.com/api/")
            .build()
            .unwrap();

        assert_eq!(config.api_base_url, "https://music.example.com/api");
    }

    #[test]
    fn test_builder_with_foreground_session() {
        let config = builder()
            .foreground_session(Arc::new(NullSession))
            .event_buffer_size(16)
            .build()
            .unwrap();

        assert!(config.foreground_session.is_some());
        assert_eq!(config.event_buffer_size, 16);
    }

    #[test]
    fn test_validate_rejects_relative_url() {
        let result = builder().api_base_url("10.0.2.2:8080/api").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let result = builder().api_base_url("/").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let result = builder().network_timeout(Duration::ZERO).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_excessive_timeout() {
        let result = builder().network_timeout(Duration::from_secs(301)).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_event_buffer() {
        let result = builder().event_buffer_size(0).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_build_with_desktop_http_default() {
        let config = CoreConfig::builder()
            .media_primitive(Arc::new(NullMedia))
            .build();

        assert!(config.is_ok());
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_http_client_without_shims() {
        let result = CoreConfig::builder()
            .media_primitive(Arc::new(NullMedia))
            .build();

        assert!(matches!(
            result,
            Err(Error::CapabilityMissing { ref capability, .. }) if capability == "HttpClient"
        ));
    }

    #[test]
    fn test_config_debug_hides_bridges() {
        let config = builder().build().unwrap();
        let debug = format!("{:?}", config);

        assert!(debug.contains("MediaPrimitive { ... }"));
        assert!(debug.contains("api_base_url"));
    }
}
