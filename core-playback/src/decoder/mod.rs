//! # Narration Decoding
//!
//! Two pure stages turn a backend narration payload into a playable buffer:
//!
//! 1. [`decode_base64`] recovers the raw bytes from the transport encoding.
//! 2. [`decode_pcm`] interprets those bytes as interleaved signed 16-bit
//!    little-endian samples and produces normalized `f32` channels.
//!
//! [`decode_narration`] chains both with the format the backend uses for
//! speech (24 kHz mono).

mod pcm;
mod transport;

pub use pcm::{decode_pcm, PcmFormat, PCM_SCALE};
pub use transport::decode_base64;

use crate::error::Result;
use bridge_traits::playback::AudioBuffer;

/// Decode a base64 narration payload into an audio buffer.
pub fn decode_narration(payload: &str, format: PcmFormat) -> Result<AudioBuffer> {
    let bytes = decode_base64(payload)?;
    decode_pcm(&bytes, format)
}
