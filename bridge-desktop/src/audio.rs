//! Native audio output using rodio.
//!
//! The rodio `OutputStream` is not `Send`, so it lives on a dedicated thread
//! for the lifetime of the adapter. Sessions only hold the shareable
//! `OutputStreamHandle` and one `Sink` each.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    playback::{PlaybackAdapter, PlaybackRequest, PlaybackSessionId, PlaybackState},
};
use parking_lot::Mutex;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;
use tracing::{debug, info, warn};

struct SessionEntry {
    sink: Sink,
    state: PlaybackState,
}

/// Playback adapter that plays decoded buffers on the default output device.
pub struct RodioPlaybackAdapter {
    handle: OutputStreamHandle,
    sessions: Mutex<HashMap<PlaybackSessionId, SessionEntry>>,
    // Dropping the sender lets the output thread exit and close the device.
    _shutdown: mpsc::Sender<()>,
}

impl RodioPlaybackAdapter {
    /// Open the default audio output device.
    pub fn new() -> Result<Self> {
        let (handle_tx, handle_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        thread::Builder::new()
            .name("rodio-output".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    if handle_tx.send(Ok(handle)).is_err() {
                        return;
                    }
                    // Blocks until the adapter drops its sender.
                    let _ = shutdown_rx.recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = handle_tx.send(Err(e.to_string()));
                }
            })?;

        let handle = handle_rx
            .recv()
            .map_err(|_| BridgeError::NotAvailable("Audio output thread exited".to_string()))?
            .map_err(|e| BridgeError::NotAvailable(format!("Failed to open audio output: {}", e)))?;

        info!("Opened default audio output device");

        Ok(Self {
            handle,
            sessions: Mutex::new(HashMap::new()),
            _shutdown: shutdown_tx,
        })
    }

    fn with_session<T>(
        &self,
        session: PlaybackSessionId,
        f: impl FnOnce(&mut SessionEntry) -> T,
    ) -> Result<T> {
        let mut sessions = self.sessions.lock();
        let entry = sessions
            .get_mut(&session)
            .ok_or_else(|| BridgeError::UnknownSession(session.to_string()))?;
        Ok(f(entry))
    }
}

#[async_trait]
impl PlaybackAdapter for RodioPlaybackAdapter {
    async fn prepare(&self, request: PlaybackRequest) -> Result<PlaybackSessionId> {
        let buffer = request.buffer;
        let channels = u16::try_from(buffer.channel_count()).map_err(|_| {
            BridgeError::OperationFailed(format!(
                "Unsupported channel count: {}",
                buffer.channel_count()
            ))
        })?;
        if channels == 0 || buffer.sample_rate() == 0 {
            return Err(BridgeError::OperationFailed(
                "Audio buffer has no channels or sample rate".to_string(),
            ));
        }

        let sink = Sink::try_new(&self.handle)
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to create sink: {}", e)))?;
        sink.pause();
        sink.set_volume(request.options.initial_volume.clamp(0.0, 1.0));
        sink.append(SamplesBuffer::new(
            channels,
            buffer.sample_rate(),
            buffer.interleaved(),
        ));

        let session = PlaybackSessionId::new();
        debug!(
            %session,
            frames = buffer.frame_count(),
            sample_rate = buffer.sample_rate(),
            "Prepared playback session"
        );

        self.sessions.lock().insert(
            session,
            SessionEntry {
                sink,
                state: PlaybackState::Idle,
            },
        );

        Ok(session)
    }

    async fn play(&self, session: PlaybackSessionId) -> Result<()> {
        self.with_session(session, |entry| {
            entry.sink.play();
            entry.state = PlaybackState::Playing;
        })
    }

    async fn stop(&self, session: PlaybackSessionId) -> Result<()> {
        self.with_session(session, |entry| {
            entry.sink.stop();
            if !entry.state.is_finished() {
                entry.state = PlaybackState::Stopped;
            }
        })
    }

    async fn state(&self, session: PlaybackSessionId) -> Result<PlaybackState> {
        self.with_session(session, |entry| {
            if entry.state == PlaybackState::Playing && entry.sink.empty() {
                entry.state = PlaybackState::Completed;
            }
            entry.state.clone()
        })
    }

    async fn unload(&self, session: PlaybackSessionId) -> Result<()> {
        match self.sessions.lock().remove(&session) {
            Some(entry) => {
                entry.sink.stop();
                debug!(%session, "Unloaded playback session");
            }
            None => warn!(%session, "Unload requested for unknown session"),
        }
        Ok(())
    }
}
