//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and the
//! platform-specific pieces it cannot own itself: the native audio pipeline,
//! the foreground-service notification, the network stack and the log sink.
//!
//! ## Traits
//!
//! ### Playback
//! - [`MediaPrimitive`](media::MediaPrimitive) - Native audio pipeline (ExoPlayer, AVPlayer, ...)
//! - [`ForegroundSession`](session::ForegroundSession) - Foreground service and media notification
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations against the catalog API
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ HTTP + logging session |
//! | Android  | host app            | 📋 Planned |
//! | iOS      | host app            | 📋 Planned |
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with a descriptive error when a required capability is
//! missing. There is no meaningful default for [`MediaPrimitive`](media::MediaPrimitive),
//! so building a configuration without one is rejected up front:
//!
//! ```ignore
//! let config = CoreConfig::builder().build();
//! assert!(matches!(config, Err(CoreError::CapabilityMissing { .. })));
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Platform
//! implementations should convert native failures into it and keep the
//! host's diagnostic message.
//!
//! ## Thread Safety
//!
//! Bridge traits require `Send + Sync` on native targets (see
//! [`PlatformSendSync`](platform::PlatformSendSync)) so adapters can be shared
//! across async tasks.

pub mod error;
pub mod http;
pub mod logging;
pub mod media;
pub mod platform;
pub mod session;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use media::{MediaEvent, MediaEventSink, MediaPrimitive, MediaRepeatMode, MediaState};
pub use platform::PlatformSendSync;
pub use session::{ForegroundSession, NotificationContent, TransportAction};
