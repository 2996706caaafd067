//! # Catalog Module
//!
//! Song catalog model and the thin HTTP client that fetches it.
//!
//! ## Overview
//!
//! - [`Song`] / [`PlaylistResponse`]: the catalog payloads, field names as
//!   served by the API
//! - [`StreamLocator`]: deterministic `{base}/stream/{id}` URIs handed to the
//!   media primitive
//! - [`CatalogClient`]: `GET {base}/songs` and `GET {base}/song/{id}` over an
//!   injected [`HttpClient`](bridge_traits::HttpClient)
//! - [`CatalogError`]: classification into user-presentable failure kinds
//!
//! Catalog failures are returned to the caller; they never reach the player
//! state.

pub mod client;
pub mod error;
pub mod locator;
pub mod models;

pub use client::CatalogClient;
pub use error::{CatalogError, CatalogErrorKind, Result};
pub use locator::StreamLocator;
pub use models::{PlaylistResponse, Song};
