//! # Playback Module
//!
//! Turns generated narration into audible output.
//!
//! ## Overview
//!
//! This module handles:
//! - Base64 transport decoding of narration payloads
//! - Raw 16-bit PCM decoding into normalized `f32` channels
//! - The [`PlaybackController`], which owns the single narration session and
//!   releases it on toggle-off, stop, natural completion and teardown
//!
//! Output itself goes through a host
//! [`PlaybackAdapter`](bridge_traits::playback::PlaybackAdapter); this crate
//! never touches an audio device directly.

pub mod controller;
pub mod decoder;
pub mod error;

pub use controller::{PlaybackController, PlaybackPhase, PlaybackStatus};
pub use decoder::{decode_base64, decode_narration, decode_pcm, PcmFormat};
pub use error::{PlaybackError, Result};
