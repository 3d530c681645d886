//! # Core Configuration Module
//!
//! Provides configuration management for the recipe core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! holding the generation credential, model settings and the host bridges the
//! core depends on. Validation runs once, at build time, and fails fast.
//!
//! ## Required Settings
//!
//! - `api_key` - Credential for the generative backend
//!
//! ## Bridges (with platform defaults)
//!
//! - `HttpClient` - HTTP operations (desktop default: reqwest)
//! - `PlaybackAdapter` - Audio output (desktop default: rodio, `native-audio`
//!   feature; otherwise `NoAudioOutput`, which disables narration only)
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults are
//! injected automatically if not provided.
//!
//! ## Unconfigured Hosts
//!
//! A missing credential is not a crash. Call
//! [`CoreConfigBuilder::status`] before building to obtain a
//! [`ConfigStatus`] the presentation layer can surface (for example as a
//! "configure your API key" banner).
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, ConfigStatus};
//!
//! let builder = CoreConfig::builder().api_key_from_env();
//! match builder.status() {
//!     ConfigStatus::Ready => {
//!         let config = builder.build()?;
//!     }
//!     ConfigStatus::Unconfigured { reason } => show_banner(&reason),
//! }
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HttpClient, PlaybackAdapter};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Environment variables consulted by [`CoreConfigBuilder::api_key_from_env`],
/// in order.
pub const API_KEY_ENV_VARS: &[&str] = &["API_KEY", "GEMINI_API_KEY"];

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_RECIPE_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_VOICE_NAME: &str = "Kore";
pub const DEFAULT_IMAGE_ASPECT_RATIO: &str = "1:1";

/// Narration audio is raw 16-bit PCM at this rate by backend convention.
pub const DEFAULT_AUDIO_SAMPLE_RATE: u32 = 24_000;
pub const DEFAULT_AUDIO_CHANNELS: u16 = 1;

/// Credential for the generative backend.
///
/// `Debug` and `Display` never print the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Expose the raw secret for request signing.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Whether the core can talk to the generative backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigStatus {
    Ready,
    /// No usable credential; generation is unavailable until one is supplied.
    Unconfigured { reason: String },
}

impl ConfigStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ConfigStatus::Ready)
    }
}

/// Model and endpoint settings for the generation client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSettings {
    /// API root, without a trailing slash.
    pub base_url: String,
    pub recipe_model: String,
    pub image_model: String,
    pub speech_model: String,
    /// Prebuilt voice used for narration.
    pub voice_name: String,
    pub image_aspect_ratio: String,
    /// Per-request timeout. `None` waits for the backend indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            recipe_model: DEFAULT_RECIPE_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            voice_name: DEFAULT_VOICE_NAME.to_string(),
            image_aspect_ratio: DEFAULT_IMAGE_ASPECT_RATIO.to_string(),
            request_timeout: None,
        }
    }
}

impl GenerationSettings {
    fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(Error::Config(format!(
                "Base URL must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }

        let models = [
            ("recipe_model", &self.recipe_model),
            ("image_model", &self.image_model),
            ("speech_model", &self.speech_model),
            ("voice_name", &self.voice_name),
        ];
        for (name, value) in models {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} cannot be empty", name)));
            }
        }

        if let Some(timeout) = self.request_timeout {
            if timeout.is_zero() {
                return Err(Error::Config(
                    "Request timeout must be greater than zero".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Format of narration audio plus playback tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSettings {
    pub sample_rate: u32,
    pub channels: u16,
    /// How often the playback controller checks for natural completion.
    pub completion_poll_interval: Duration,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_AUDIO_SAMPLE_RATE,
            channels: DEFAULT_AUDIO_CHANNELS,
            completion_poll_interval: Duration::from_millis(50),
        }
    }
}

impl AudioSettings {
    fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::Config(
                "Audio sample rate must be greater than 0 Hz".to_string(),
            ));
        }
        if self.channels == 0 {
            return Err(Error::Config(
                "Audio channel count must be at least 1".to_string(),
            ));
        }
        if self.completion_poll_interval.is_zero() {
            return Err(Error::Config(
                "Completion poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Seed search fired once when a session starts with no results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSettings {
    pub enabled: bool,
    pub delay: Duration,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            delay: Duration::from_millis(500),
        }
    }
}

/// Core configuration for the recipe core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Backend credential (required)
    pub api_key: ApiKey,

    /// Generation endpoint and model selection
    pub generation: GenerationSettings,

    /// Narration audio format and playback tuning
    pub audio: AudioSettings,

    /// Startup seed search
    pub seed: SeedSettings,

    /// HTTP client for backend requests
    pub http_client: Arc<dyn HttpClient>,

    /// Audio output for narration playback
    pub playback_adapter: Arc<dyn PlaybackAdapter>,
}

impl fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreConfig")
            .field("api_key", &self.api_key)
            .field("generation", &self.generation)
            .field("audio", &self.audio)
            .field("seed", &self.seed)
            .field("http_client", &"HttpClient { ... }")
            .field("playback_adapter", &"PlaybackAdapter { ... }")
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The credential is not blank
    /// - Base URL is http(s) and model names are set
    /// - Audio format is non-degenerate
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_blank() {
            return Err(Error::Config("API key cannot be empty".to_string()));
        }

        self.generation.validate()?;
        self.audio.validate()?;

        Ok(())
    }

    /// A built configuration always carries a validated credential.
    pub fn status(&self) -> ConfigStatus {
        ConfigStatus::Ready
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP client implementation provided. \
                 Desktop: ensure the 'desktop-shims' feature is enabled to use the default ReqwestHttpClient. \
                 Other hosts: inject a platform HTTP client."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new().map_err(|e| Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: e.to_string(),
    })?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

#[cfg(feature = "native-audio")]
fn provide_default_playback_adapter() -> Result<Arc<dyn PlaybackAdapter>> {
    use bridge_desktop::RodioPlaybackAdapter;

    let adapter = RodioPlaybackAdapter::new().map_err(|e| Error::CapabilityMissing {
        capability: "PlaybackAdapter".to_string(),
        message: e.to_string(),
    })?;
    let adapter: Arc<dyn PlaybackAdapter> = Arc::new(adapter);
    Ok(adapter)
}

#[cfg(not(feature = "native-audio"))]
fn provide_default_playback_adapter() -> Result<Arc<dyn PlaybackAdapter>> {
    use bridge_traits::NoAudioOutput;
    use tracing::warn;

    warn!("No playback adapter provided; narration disabled. Enable 'native-audio' or inject one.");
    let adapter: Arc<dyn PlaybackAdapter> = Arc::new(NoAudioOutput);
    Ok(adapter)
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Use this builder to incrementally set configuration options and then
/// call [`build()`](CoreConfigBuilder::build) to create the final config.
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_key: Option<ApiKey>,
    generation: GenerationSettings,
    audio: AudioSettings,
    seed: SeedSettings,
    http_client: Option<Arc<dyn HttpClient>>,
    playback_adapter: Option<Arc<dyn PlaybackAdapter>>,
}

impl CoreConfigBuilder {
    /// Sets the backend credential.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder().api_key("my-key");
    /// assert!(builder.status().is_ready());
    /// ```
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(ApiKey::new(key));
        self
    }

    /// Reads the credential from the first set variable in [`API_KEY_ENV_VARS`].
    ///
    /// Leaves any previously set key untouched when none is present.
    pub fn api_key_from_env(self) -> Self {
        self.api_key_from_lookup(|name| std::env::var(name).ok())
    }

    fn api_key_from_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
        {
            self.api_key = Some(ApiKey::new(key));
        }
        self
    }

    /// Sets the API root URL. A trailing slash is stripped.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.generation.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn recipe_model(mut self, model: impl Into<String>) -> Self {
        self.generation.recipe_model = model.into();
        self
    }

    pub fn image_model(mut self, model: impl Into<String>) -> Self {
        self.generation.image_model = model.into();
        self
    }

    pub fn speech_model(mut self, model: impl Into<String>) -> Self {
        self.generation.speech_model = model.into();
        self
    }

    pub fn voice_name(mut self, voice: impl Into<String>) -> Self {
        self.generation.voice_name = voice.into();
        self
    }

    /// Sets a per-request timeout.
    ///
    /// Default: none
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.generation.request_timeout = Some(timeout);
        self
    }

    /// Overrides the narration audio format.
    ///
    /// Default: 24000 Hz, mono
    pub fn audio_format(mut self, sample_rate: u32, channels: u16) -> Self {
        self.audio.sample_rate = sample_rate;
        self.audio.channels = channels;
        self
    }

    pub fn completion_poll_interval(mut self, interval: Duration) -> Self {
        self.audio.completion_poll_interval = interval;
        self
    }

    /// Enables or disables the startup seed search.
    ///
    /// Default: enabled
    pub fn seed_search(mut self, enabled: bool) -> Self {
        self.seed.enabled = enabled;
        self
    }

    /// Delay before the seed search fires.
    ///
    /// Default: 500 ms
    pub fn seed_delay(mut self, delay: Duration) -> Self {
        self.seed.delay = delay;
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// If not provided, the desktop default (reqwest-based) will be used when
    /// the `desktop-shims` feature is enabled.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the playback adapter implementation.
    ///
    /// If not provided, the rodio adapter is used when the `native-audio`
    /// feature is enabled.
    pub fn playback_adapter(mut self, adapter: Arc<dyn PlaybackAdapter>) -> Self {
        self.playback_adapter = Some(adapter);
        self
    }

    /// Reports whether a usable credential has been supplied, without
    /// building.
    pub fn status(&self) -> ConfigStatus {
        match &self.api_key {
            Some(key) if !key.is_blank() => ConfigStatus::Ready,
            Some(_) => ConfigStatus::Unconfigured {
                reason: "API key is empty".to_string(),
            },
            None => ConfigStatus::Unconfigured {
                reason: format!(
                    "API key is missing. Set one of {} or call .api_key().",
                    API_KEY_ENV_VARS.join(", ")
                ),
            },
        }
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - The credential is missing or blank
    /// - Required bridges are missing and no platform default is available
    /// - Configuration values are invalid
    pub fn build(self) -> Result<CoreConfig> {
        let api_key = self.api_key.ok_or_else(|| {
            Error::Config("API key is required. Use .api_key() to set it.".to_string())
        })?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let playback_adapter = match self.playback_adapter {
            Some(adapter) => adapter,
            None => provide_default_playback_adapter()?,
        };

        let config = CoreConfig {
            api_key,
            generation: self.generation,
            audio: self.audio,
            seed: self.seed,
            http_client,
            playback_adapter,
        };

        config.validate()?;

        Ok(config)
    }
}
