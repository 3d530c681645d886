//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! - `HttpClient` using `reqwest`
//! - `PlaybackAdapter` using `rodio` (feature `native-audio`)
//!
//! ## Feature Flags
//!
//! - `native-audio`: Enable audio output through the default device. Off by
//!   default so headless builds do not link a system audio backend.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, RodioPlaybackAdapter};
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new()?);
//! let playback = Arc::new(RodioPlaybackAdapter::new()?);
//! ```

mod http;

#[cfg(feature = "native-audio")]
mod audio;

pub use http::ReqwestHttpClient;

#[cfg(feature = "native-audio")]
pub use audio::RodioPlaybackAdapter;
