//! Playback bridge traits and supporting audio types.
//!
//! The core decodes narration audio into an [`AudioBuffer`] and hands it to a
//! host [`PlaybackAdapter`], which owns the native output device. Adapters are
//! driven through session identifiers so the core never holds platform audio
//! handles directly.

use crate::error::{BridgeError, Result};
use crate::platform::PlatformSendSync;
use std::time::Duration;
use uuid::Uuid;

/// Decoded, planar floating-point audio ready for output.
///
/// Each entry of `channels` holds the samples of one channel, all of equal
/// length, in the range `[-1.0, 1.0)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build a buffer from planar channel data.
    ///
    /// Channels are truncated to the shortest one so every channel reports the
    /// same frame count.
    pub fn new(sample_rate: u32, mut channels: Vec<Vec<f32>>) -> Self {
        let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
        for channel in &mut channels {
            channel.truncate(frames);
        }
        Self {
            sample_rate,
            channels,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    /// Samples of a single channel, if it exists.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Playback length at the buffer's sample rate.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }

    /// Interleave channels frame by frame, the layout most output APIs expect.
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frame_count();
        let mut out = Vec::with_capacity(frames * self.channels.len());
        for frame in 0..frames {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }
}

/// Additional playback options supplied alongside a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackOptions {
    /// Initial volume (0.0 = muted, 1.0 = unity gain).
    pub initial_volume: f32,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
        }
    }
}

/// Unique identifier for playback sessions managed by a host adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackSessionId(Uuid);

impl PlaybackSessionId {
    /// Generate a new session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlaybackSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlaybackSessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Playback lifecycle state as reported by an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    /// Prepared but not yet started.
    Idle,
    Playing,
    /// Halted by an explicit `stop`.
    Stopped,
    /// The end of the buffer was reached.
    Completed,
    Error { message: String },
}

impl PlaybackState {
    /// Whether the session can no longer produce audio.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            PlaybackState::Stopped | PlaybackState::Completed | PlaybackState::Error { .. }
        )
    }
}

/// Request describing the playback session a host adapter should provision.
#[derive(Debug, Clone)]
pub struct PlaybackRequest {
    /// Decoded audio to play.
    pub buffer: AudioBuffer,
    /// Playback options such as initial volume.
    pub options: PlaybackOptions,
}

impl PlaybackRequest {
    pub fn new(buffer: AudioBuffer) -> Self {
        Self {
            buffer,
            options: PlaybackOptions::default(),
        }
    }

    /// Attach playback options to the request.
    pub fn with_options(mut self, options: PlaybackOptions) -> Self {
        self.options = options;
        self
    }
}

/// Trait for platform-specific playback adapters that drive native audio engines.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait PlaybackAdapter: PlatformSendSync {
    /// Prepare a playback session. Implementations may allocate native resources
    /// or queue buffers. Returns a session identifier that subsequent control
    /// calls reference.
    async fn prepare(&self, request: PlaybackRequest) -> Result<PlaybackSessionId>;

    /// Begin playback for the provided session.
    async fn play(&self, session: PlaybackSessionId) -> Result<()>;

    /// Halt output immediately. Stopping an already finished session succeeds.
    async fn stop(&self, session: PlaybackSessionId) -> Result<()>;

    /// Fetch the adapter's current understanding of the session state.
    async fn state(&self, session: PlaybackSessionId) -> Result<PlaybackState>;

    /// Release resources associated with a playback session.
    async fn unload(&self, session: PlaybackSessionId) -> Result<()>;
}

/// Adapter for hosts without an audio device.
///
/// `prepare` always fails with [`BridgeError::NotAvailable`], so narration
/// degrades to "no audio" while the rest of the core keeps working. Control
/// calls on any session succeed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAudioOutput;

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl PlaybackAdapter for NoAudioOutput {
    async fn prepare(&self, _request: PlaybackRequest) -> Result<PlaybackSessionId> {
        Err(BridgeError::NotAvailable(
            "no audio output configured".to_string(),
        ))
    }

    async fn play(&self, session: PlaybackSessionId) -> Result<()> {
        Err(BridgeError::UnknownSession(session.to_string()))
    }

    async fn stop(&self, _session: PlaybackSessionId) -> Result<()> {
        Ok(())
    }

    async fn state(&self, _session: PlaybackSessionId) -> Result<PlaybackState> {
        Ok(PlaybackState::Stopped)
    }

    async fn unload(&self, _session: PlaybackSessionId) -> Result<()> {
        Ok(())
    }
}
