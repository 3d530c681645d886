//! # Narration Playback Controller
//!
//! Owns the single active narration session and drives it through
//! `Stopped → Loading → Playing → Stopped`.
//!
//! Every transition back to `Stopped` bumps an epoch counter. Work that was
//! started under an older epoch (a narration request still in flight, a
//! completion watcher) checks the epoch before touching state, and releases
//! whatever it acquired instead of publishing it. This keeps at most one
//! adapter session alive and guarantees it is released on every exit path:
//! toggle-off, [`PlaybackController::stop`], natural completion,
//! [`PlaybackController::shutdown`] and `Drop`.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::playback::{
    PlaybackAdapter, PlaybackOptions, PlaybackRequest, PlaybackSessionId, PlaybackState,
};
use core_library::{Recipe, RecipeGenerator, RecipeId};
use core_runtime::config::AudioSettings;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::decoder::{decode_narration, PcmFormat};
use crate::error::{PlaybackError, Result};

/// Controller phase as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    #[default]
    Stopped,
    /// Narration audio is being requested and decoded.
    Loading,
    Playing,
}

/// Snapshot of the controller state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlaybackStatus {
    pub phase: PlaybackPhase,
    /// Recipe being loaded or played; `None` when stopped.
    pub recipe_id: Option<RecipeId>,
}

impl PlaybackStatus {
    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }

    pub fn is_loading(&self) -> bool {
        self.phase == PlaybackPhase::Loading
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == PlaybackPhase::Stopped
    }
}

#[derive(Default)]
struct ActiveState {
    phase: PlaybackPhase,
    recipe_id: Option<RecipeId>,
    session: Option<PlaybackSessionId>,
    epoch: u64,
    watcher: Option<JoinHandle<()>>,
}

/// What a reset handed back for release outside the lock.
struct Released {
    recipe_id: Option<RecipeId>,
    session: Option<PlaybackSessionId>,
}

impl ActiveState {
    fn status(&self) -> PlaybackStatus {
        PlaybackStatus {
            phase: self.phase,
            recipe_id: self.recipe_id.clone(),
        }
    }

    /// Return to `Stopped` and invalidate all work from the current epoch.
    fn reset(&mut self) -> Released {
        self.epoch = self.epoch.wrapping_add(1);
        self.phase = PlaybackPhase::Stopped;
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
        Released {
            recipe_id: self.recipe_id.take(),
            session: self.session.take(),
        }
    }
}

struct Shared {
    adapter: Arc<dyn PlaybackAdapter>,
    events: EventBus,
    state: Mutex<ActiveState>,
}

impl Shared {
    fn emit(&self, event: PlaybackEvent) {
        // No subscribers is not an error for the controller.
        let _ = self.events.emit(CoreEvent::Playback(event));
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.state.lock().epoch == epoch
    }

    async fn unload(&self, session: PlaybackSessionId) {
        if let Err(e) = self.adapter.unload(session).await {
            warn!(%session, error = %e, "Failed to unload playback session");
        }
    }

    async fn release(&self, session: PlaybackSessionId) {
        if let Err(e) = self.adapter.stop(session).await {
            warn!(%session, error = %e, "Failed to stop playback session");
        }
        self.unload(session).await;
    }
}

/// Drives on-demand narration for one recipe at a time.
///
/// Narration is best-effort: missing audio, request failures and decode
/// failures all return the controller to `Stopped` and are only logged.
pub struct PlaybackController {
    generator: Arc<dyn RecipeGenerator>,
    shared: Arc<Shared>,
    format: PcmFormat,
    poll_interval: Duration,
    options: PlaybackOptions,
}

impl PlaybackController {
    pub fn new(
        generator: Arc<dyn RecipeGenerator>,
        adapter: Arc<dyn PlaybackAdapter>,
        settings: &AudioSettings,
        events: EventBus,
    ) -> Self {
        Self {
            generator,
            shared: Arc::new(Shared {
                adapter,
                events,
                state: Mutex::new(ActiveState::default()),
            }),
            format: PcmFormat::new(settings.sample_rate, settings.channels),
            poll_interval: settings.completion_poll_interval,
            options: PlaybackOptions::default(),
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.shared.state.lock().status()
    }

    /// Whether narration is being fetched; the play control should be
    /// disabled meanwhile.
    pub fn is_loading(&self) -> bool {
        self.shared.state.lock().phase == PlaybackPhase::Loading
    }

    /// Start narrating `recipe`, or stop the narration that is playing.
    ///
    /// While a narration is loading the call is ignored. Returns the status
    /// after the transition.
    #[instrument(skip(self, recipe), fields(recipe_id = %recipe.id))]
    pub async fn toggle(&self, recipe: &Recipe) -> PlaybackStatus {
        let epoch = {
            let mut state = self.shared.state.lock();
            match state.phase {
                PlaybackPhase::Playing => None,
                PlaybackPhase::Loading => {
                    debug!("Narration already loading; ignoring toggle");
                    return state.status();
                }
                PlaybackPhase::Stopped => {
                    state.epoch = state.epoch.wrapping_add(1);
                    state.phase = PlaybackPhase::Loading;
                    state.recipe_id = Some(recipe.id.clone());
                    Some(state.epoch)
                }
            }
        };

        let Some(epoch) = epoch else {
            self.stop().await;
            return self.status();
        };

        self.shared.emit(PlaybackEvent::Loading {
            recipe_id: recipe.id.to_string(),
        });

        if let Err(e) = self.load_and_play(recipe, epoch).await {
            warn!(error = %e, "Narration unavailable");
            self.abandon(epoch, &recipe.id, e);
        }

        self.status()
    }

    /// Stop the active narration. A no-op when nothing is loading or playing.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        let released = {
            let mut state = self.shared.state.lock();
            if state.phase == PlaybackPhase::Stopped {
                return;
            }
            state.reset()
        };

        if let Some(session) = released.session {
            self.shared.release(session).await;
        }
        if let Some(recipe_id) = released.recipe_id {
            info!(%recipe_id, "Narration stopped");
            self.shared.emit(PlaybackEvent::Stopped {
                recipe_id: recipe_id.to_string(),
            });
        }
    }

    /// Release any active session ahead of teardown.
    pub async fn shutdown(&self) {
        debug!("Shutting down playback controller");
        self.stop().await;
    }

    async fn load_and_play(&self, recipe: &Recipe, epoch: u64) -> Result<()> {
        let text = recipe.narration_text();
        let payload = self
            .generator
            .request_narration_audio(&text)
            .await?
            .ok_or(PlaybackError::NoAudio)?;

        let buffer = decode_narration(&payload, self.format)?;
        debug!(
            frames = buffer.frame_count(),
            duration_ms = buffer.duration().as_millis() as u64,
            "Decoded narration audio"
        );

        if !self.shared.is_current(epoch) {
            debug!("Narration load superseded before playback");
            return Ok(());
        }

        let request = PlaybackRequest::new(buffer).with_options(self.options);
        let session = self.shared.adapter.prepare(request).await?;

        if !self.shared.is_current(epoch) {
            self.shared.unload(session).await;
            return Ok(());
        }

        if let Err(e) = self.shared.adapter.play(session).await {
            self.shared.unload(session).await;
            return Err(e.into());
        }

        let published = {
            let mut state = self.shared.state.lock();
            if state.epoch == epoch {
                state.phase = PlaybackPhase::Playing;
                state.session = Some(session);
                state.watcher = Some(tokio::spawn(watch_completion(
                    Arc::clone(&self.shared),
                    session,
                    epoch,
                    self.poll_interval,
                )));
                true
            } else {
                false
            }
        };

        if !published {
            self.shared.release(session).await;
            return Ok(());
        }

        info!(%session, "Narration started");
        self.shared.emit(PlaybackEvent::Started {
            recipe_id: recipe.id.to_string(),
        });
        Ok(())
    }

    fn abandon(&self, epoch: u64, recipe_id: &RecipeId, error: PlaybackError) {
        {
            let mut state = self.shared.state.lock();
            if state.epoch != epoch {
                return;
            }
            state.reset();
        }

        self.shared.emit(PlaybackEvent::Unavailable {
            recipe_id: recipe_id.to_string(),
            reason: error.to_string(),
        });
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        let released = self.shared.state.lock().reset();
        let Some(session) = released.session else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let shared = Arc::clone(&self.shared);
                handle.spawn(async move {
                    shared.release(session).await;
                });
            }
            Err(_) => warn!(%session, "No runtime to release playback session on drop"),
        }
    }
}

/// Poll the adapter until the session finishes, then return to `Stopped`.
async fn watch_completion(
    shared: Arc<Shared>,
    session: PlaybackSessionId,
    epoch: u64,
    poll_interval: Duration,
) {
    loop {
        tokio::time::sleep(poll_interval).await;
        match shared.adapter.state(session).await {
            Ok(PlaybackState::Error { message }) => {
                warn!(%session, %message, "Playback session failed");
                break;
            }
            Ok(state) if state.is_finished() => break,
            Ok(_) => {}
            Err(e) => {
                warn!(%session, error = %e, "Lost track of playback session");
                break;
            }
        }
    }

    let released = {
        let mut state = shared.state.lock();
        if state.epoch != epoch {
            return;
        }
        // Dropping our own handle detaches it; aborting would cancel the
        // release below.
        state.watcher.take();
        state.reset()
    };

    shared.unload(session).await;
    if let Some(recipe_id) = released.recipe_id {
        info!(%recipe_id, "Narration completed");
        shared.emit(PlaybackEvent::Completed {
            recipe_id: recipe_id.to_string(),
        });
    }
}
