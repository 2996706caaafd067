//! Workspace placeholder crate.
//!
//! This crate exposes shared feature flags that map to the individual
//! workspace crates (`core-service`, `core-playback`, `core-catalog`). Host
//! applications can depend on `zeromusic-workspace` and enable the documented
//! features without wiring each crate individually.

#[cfg(feature = "desktop-shims")]
pub use core_service;

#[cfg(feature = "playback-only")]
pub use core_catalog;
#[cfg(feature = "playback-only")]
pub use core_playback;
