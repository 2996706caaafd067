//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` with retry/backoff
//! - `ForegroundSession` that records and logs the now-playing notification
//!
//! There is no desktop `MediaPrimitive` here; hosts always inject their own
//! audio pipeline.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopForegroundSession, ReqwestHttpClient};
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new()?);
//! let session = Arc::new(DesktopForegroundSession::new());
//! ```

mod http;
mod session;

pub use http::{ReqwestHttpClient, RetryPolicy};
pub use session::DesktopForegroundSession;
