//! Core service façade and bootstrap helpers.
//!
//! This crate wires the host bridges (HTTP, audio output) and the Gemini
//! generation client into the two components the presentation layer talks
//! to: the [`RecipeSession`] and the narration [`PlaybackController`].
//! Desktop apps typically enable the `desktop-shims` feature (reqwest HTTP
//! client) and `native-audio` (rodio output); other hosts inject their own
//! bridges through [`CoreConfig::builder`].
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use core_service::{CoreService, CoreStartup};
//!
//! match CoreService::start(CoreConfig::builder().api_key_from_env())? {
//!     CoreStartup::Ready(core) => {
//!         core.session().search(Some("Baião de Dois")).await;
//!     }
//!     CoreStartup::Unconfigured { reason } => show_api_key_banner(&reason),
//! }
//! ```

pub mod error;
pub mod session;

pub use error::{CoreError, Result};
pub use session::{
    RecipeSession, SearchOutcome, SessionPhase, SessionSnapshot, SEARCH_FAILED_MESSAGE,
};

pub use core_playback::{PlaybackController, PlaybackPhase, PlaybackStatus};

use std::sync::Arc;

use bridge_traits::playback::PlaybackAdapter;
use core_library::RecipeGenerator;
use core_runtime::config::{
    AudioSettings, ConfigStatus, CoreConfig, CoreConfigBuilder, SeedSettings,
};
use core_runtime::events::{EventBus, EventStream};
use parking_lot::Mutex;
use provider_gemini::GeminiClient;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Aggregated handle to the collaborators the core requires.
pub struct CoreDependencies {
    pub generator: Arc<dyn RecipeGenerator>,
    pub playback_adapter: Arc<dyn PlaybackAdapter>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit handles.
    pub fn new(
        generator: Arc<dyn RecipeGenerator>,
        playback_adapter: Arc<dyn PlaybackAdapter>,
    ) -> Self {
        Self {
            generator,
            playback_adapter,
        }
    }

    /// Gemini client over the configured HTTP bridge, plus the configured
    /// audio output.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(
            Arc::new(GeminiClient::from_config(config)),
            Arc::clone(&config.playback_adapter),
        )
    }
}

/// Result of [`CoreService::start`].
pub enum CoreStartup {
    Ready(CoreService),
    /// No usable credential. Nothing was built and no request was made.
    Unconfigured { reason: String },
}

impl CoreStartup {
    pub fn config_status(&self) -> ConfigStatus {
        match self {
            CoreStartup::Ready(core) => core.config_status(),
            CoreStartup::Unconfigured { reason } => ConfigStatus::Unconfigured {
                reason: reason.clone(),
            },
        }
    }

    /// The running service, or [`CoreError::Unconfigured`].
    pub fn into_service(self) -> Result<CoreService> {
        match self {
            CoreStartup::Ready(core) => Ok(core),
            CoreStartup::Unconfigured { reason } => Err(CoreError::Unconfigured { reason }),
        }
    }
}

/// Primary façade exposed to host applications.
pub struct CoreService {
    session: Arc<RecipeSession>,
    playback: PlaybackController,
    events: EventBus,
    seed_task: Mutex<Option<JoinHandle<SearchOutcome>>>,
}

impl CoreService {
    /// Validate the configuration once and start the core.
    ///
    /// A missing or blank API key yields [`CoreStartup::Unconfigured`]
    /// rather than an error. Any other invalid setting is an error.
    pub fn start(builder: CoreConfigBuilder) -> Result<CoreStartup> {
        if let ConfigStatus::Unconfigured { reason } = builder.status() {
            warn!(%reason, "Core started without a usable API key");
            return Ok(CoreStartup::Unconfigured { reason });
        }

        let config = builder.build()?;
        Ok(CoreStartup::Ready(Self::from_config(&config)))
    }

    /// Build the service from a validated configuration.
    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(CoreDependencies::from_config(config), &config.audio, config.seed)
    }

    /// Create a new service from the provided dependencies.
    ///
    /// When `seed` is enabled and a Tokio runtime is running, a seed search
    /// is scheduled after `seed.delay`.
    pub fn new(deps: CoreDependencies, audio: &AudioSettings, seed: SeedSettings) -> Self {
        let events = EventBus::default();
        let session = Arc::new(RecipeSession::new(Arc::clone(&deps.generator), events.clone()));
        let playback = PlaybackController::new(
            deps.generator,
            deps.playback_adapter,
            audio,
            events.clone(),
        );

        let seed_task = if seed.enabled {
            match tokio::runtime::Handle::try_current() {
                Ok(_) => Some(session.spawn_seed(seed.delay)),
                Err(_) => {
                    warn!("No async runtime; seed search disabled");
                    None
                }
            }
        } else {
            None
        };

        info!(seed = seed.enabled, "Core service started");
        Self {
            session,
            playback,
            events,
            seed_task: Mutex::new(seed_task),
        }
    }

    /// A running service always holds a usable credential.
    pub fn config_status(&self) -> ConfigStatus {
        ConfigStatus::Ready
    }

    pub fn session(&self) -> &RecipeSession {
        &self.session
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    /// Subscribe to session and playback notifications.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    /// Cancel a pending or in-flight seed search and release narration
    /// audio. The session is idle once this returns.
    pub async fn shutdown(&self) {
        let seed_task = self.seed_task.lock().take();
        if let Some(task) = seed_task {
            task.abort();
            if let Err(e) = task.await {
                debug!(cancelled = e.is_cancelled(), "Seed search stopped");
            }
        }
        self.playback.shutdown().await;
        debug!("Core service shut down");
    }
}

impl Drop for CoreService {
    fn drop(&mut self) {
        if let Some(task) = self.seed_task.get_mut().take() {
            task.abort();
        }
    }
}
