//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the recipe core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that must be implemented differently per platform.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP request/response, one attempt per call
//! - [`PlaybackAdapter`](playback::PlaybackAdapter) - Native audio output for decoded narration
//!   ([`NoAudioOutput`](playback::NoAudioOutput) for hosts without a device)
//! - [`LoggerSink`](logger::LoggerSink) - Forward structured logs to host logging
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is missing:
//!
//! ```ignore
//! let playback = deps.playback_adapter
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "PlaybackAdapter".to_string(),
//!         message: "Desktop: enable the `native-audio` feature. \
//!                   Other hosts: inject a platform adapter.".to_string(),
//!     })?;
//! ```
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! convert platform-specific errors into it with an actionable message.
//!
//! ## Thread Safety
//!
//! Bridge traits carry `Send + Sync` bounds on native targets (see
//! [`platform`]) so adapters can be shared across async tasks.

pub mod error;
pub mod http;
pub mod logger;
pub mod platform;
pub mod playback;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use logger::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use playback::{
    AudioBuffer, NoAudioOutput, PlaybackAdapter, PlaybackOptions, PlaybackRequest,
    PlaybackSessionId, PlaybackState,
};
