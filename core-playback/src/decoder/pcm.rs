//! # PCM Decoding
//!
//! Converts raw signed 16-bit little-endian PCM into normalized `f32`
//! channels.
//!
//! ## Layout
//!
//! Samples are tightly packed and interleaved per frame: sample 0 is
//! channel 0 of frame 0, sample 1 is channel 1 of frame 0 for stereo input,
//! and so on.
//!
//! ## Normalization
//!
//! Each sample is divided by [`PCM_SCALE`], so the output lies in
//! `[-1.0, 1.0)`. `i16::MIN` maps to exactly `-1.0`; `i16::MAX` maps to just
//! below `1.0`.

use bridge_traits::playback::AudioBuffer;
use tracing::debug;

use crate::error::{PlaybackError, Result};

/// Divisor mapping the `i16` range onto `[-1.0, 1.0)`.
pub const PCM_SCALE: f32 = 32768.0;

const BYTES_PER_SAMPLE: usize = 2;

/// Declared layout of a raw PCM payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmFormat {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }
}

impl Default for PcmFormat {
    /// 24 kHz mono, the format of generated speech.
    fn default() -> Self {
        Self::new(24_000, 1)
    }
}

/// Decode interleaved 16-bit little-endian PCM into per-channel samples.
///
/// `frame_count` is the number of samples divided by the channel count.
/// Samples left over after the last complete frame are dropped without
/// error.
///
/// # Errors
///
/// Returns [`PlaybackError::Decode`] when `data` has an odd length, or when
/// the format declares zero channels or a zero sample rate.
///
/// # Example
///
/// ```
/// use core_playback::decoder::{decode_pcm, PcmFormat};
///
/// let data = [0x00, 0x40, 0x00, 0xC0]; // 16384, -16384
/// let buffer = decode_pcm(&data, PcmFormat::default()).unwrap();
/// assert_eq!(buffer.channel(0).unwrap(), &[0.5, -0.5]);
/// ```
pub fn decode_pcm(data: &[u8], format: PcmFormat) -> Result<AudioBuffer> {
    if format.channels == 0 {
        return Err(PlaybackError::decode("PCM format declares zero channels"));
    }
    if format.sample_rate == 0 {
        return Err(PlaybackError::decode("PCM format declares a zero sample rate"));
    }
    if data.len() % BYTES_PER_SAMPLE != 0 {
        return Err(PlaybackError::decode(format!(
            "PCM payload length {} is not a whole number of 16-bit samples",
            data.len()
        )));
    }

    let channel_count = usize::from(format.channels);
    let total_samples = data.len() / BYTES_PER_SAMPLE;
    let frame_count = total_samples / channel_count;

    let dropped = total_samples % channel_count;
    if dropped > 0 {
        debug!(dropped, channel_count, "Dropping trailing partial PCM frame");
    }

    let mut channels = vec![Vec::with_capacity(frame_count); channel_count];
    for (index, chunk) in data
        .chunks_exact(BYTES_PER_SAMPLE)
        .take(frame_count * channel_count)
        .enumerate()
    {
        let sample = i16::from_le_bytes([chunk[0], chunk[1]]);
        channels[index % channel_count].push(f32::from(sample) / PCM_SCALE);
    }

    Ok(AudioBuffer::new(format.sample_rate, channels))
}
