//! Gemini API client implementation
//!
//! Implements the `RecipeGenerator` trait over the Gemini REST API.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use core_library::{LibraryError, RecipeDraft, RecipeGenerator, RecipeMode};
use core_runtime::config::{ApiKey, CoreConfig, GenerationSettings};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{GeminiError, Result};
use crate::prompts;
use crate::types::{
    ApiErrorResponse, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
    ImageConfig, SpeechConfig,
};

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Mime type assumed for image payloads that omit one
const DEFAULT_IMAGE_MIME_TYPE: &str = "image/png";

const STRING_FIELDS: [&str; 4] = ["title", "description", "history", "cookingTime"];
const LIST_FIELDS: [&str; 2] = ["ingredients", "instructions"];

/// Gemini API client
///
/// Stateless between calls: every operation is one `generateContent`
/// request with no retry.
///
/// # Example
///
/// ```ignore
/// use provider_gemini::GeminiClient;
/// use core_library::{RecipeGenerator, RecipeMode};
///
/// let client = GeminiClient::from_config(&config);
/// let draft = client.request_recipe("Acarajé", RecipeMode::Traditional).await?;
/// ```
pub struct GeminiClient {
    http_client: Arc<dyn HttpClient>,
    api_key: ApiKey,
    settings: GenerationSettings,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `api_key` - Credential sent with every request
    /// * `settings` - Endpoint, models and voice
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        api_key: ApiKey,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            http_client,
            api_key,
            settings,
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(
            Arc::clone(&config.http_client),
            config.api_key.clone(),
            config.generation.clone(),
        )
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.settings.base_url, model)
    }

    /// POST a generateContent request and decode the response
    #[instrument(skip(self, body))]
    async fn generate(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let request = HttpRequest::new(HttpMethod::Post, self.endpoint(model))
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(body)
            .map_err(|e| GeminiError::Parse(e.to_string()))?
            .timeout(self.settings.request_timeout);

        let response = self.http_client.execute(request).await.map_err(|e| {
            warn!(error = %e, "Gemini request failed");
            GeminiError::from(e)
        })?;

        if !response.is_success() {
            let message = match response.json::<ApiErrorResponse>() {
                Ok(envelope) => envelope.error.message,
                Err(_) => String::from_utf8_lossy(&response.body).into_owned(),
            };
            warn!(status = response.status, %message, "Gemini API returned an error");
            return Err(GeminiError::Api {
                status_code: response.status,
                message,
            });
        }

        debug!(bytes = response.body.len(), "Gemini request succeeded");
        serde_json::from_slice(&response.body).map_err(|e| GeminiError::Parse(e.to_string()))
    }

    /// Generate a recipe and validate it against the recipe contract
    #[instrument(skip(self))]
    pub async fn generate_recipe(&self, query: &str, mode: RecipeMode) -> Result<RecipeDraft> {
        let prompt = prompts::recipe_prompt(query, mode);
        debug!(%prompt, "Requesting recipe");

        let body = GenerateContentRequest::from_prompt(prompt)
            .with_system_instruction(prompts::CHEF_SYSTEM_INSTRUCTION)
            .with_generation_config(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(prompts::recipe_schema()),
                ..GenerationConfig::default()
            });

        let response = self.generate(&self.settings.recipe_model, &body).await?;
        let text = response.text().ok_or(GeminiError::EmptyResponse)?;
        let draft = parse_recipe(&text)?;

        info!(title = %draft.title, "Recipe generated");
        Ok(draft)
    }

    /// Generate a food photo, returned as a `data:` URI
    ///
    /// `Ok(None)` when the response holds no image.
    #[instrument(skip(self))]
    pub async fn generate_food_image(&self, title: &str) -> Result<Option<String>> {
        let body = GenerateContentRequest::from_prompt(prompts::image_prompt(title))
            .with_generation_config(GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: self.settings.image_aspect_ratio.clone(),
                }),
                ..GenerationConfig::default()
            });

        let response = self.generate(&self.settings.image_model, &body).await?;
        let image = response.first_inline_data().map(|inline| {
            let mime_type = inline
                .mime_type
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_IMAGE_MIME_TYPE);
            format!("data:{};base64,{}", mime_type, inline.data)
        });

        if image.is_none() {
            debug!("Image response contained no inline data");
        }
        Ok(image)
    }

    /// Generate narration audio, returned as base64 raw PCM
    #[instrument(skip(self, text))]
    pub async fn generate_narration(&self, text: &str) -> Result<Option<String>> {
        let body = GenerateContentRequest::from_prompt(prompts::narration_prompt(text))
            .with_generation_config(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig::prebuilt_voice(&self.settings.voice_name)),
                ..GenerationConfig::default()
            });

        let response = self.generate(&self.settings.speech_model, &body).await?;
        let audio = response.first_inline_data().map(|inline| inline.data.clone());
        debug!(
            payload_len = audio.as_ref().map(String::len).unwrap_or(0),
            "Narration response received"
        );
        Ok(audio)
    }
}

#[async_trait]
impl RecipeGenerator for GeminiClient {
    async fn request_recipe(
        &self,
        query: &str,
        mode: RecipeMode,
    ) -> core_library::Result<RecipeDraft> {
        Ok(self.generate_recipe(query, mode).await?)
    }

    async fn request_food_image(&self, title: &str) -> core_library::Result<Option<String>> {
        Ok(self.generate_food_image(title).await?)
    }

    /// Narration is optional; failures are logged and reported as no audio.
    async fn request_narration_audio(&self, text: &str) -> core_library::Result<Option<String>> {
        match self.generate_narration(text).await {
            Ok(audio) => Ok(audio),
            Err(e) => {
                warn!(error = %e, "Narration request failed");
                Ok(None)
            }
        }
    }
}

/// Parse and locally validate a generated recipe.
///
/// The backend's schema mechanism is not trusted: every required field is
/// checked, list entries must be strings and `difficulty` must be one of the
/// closed labels. A missing `drinkPairings` is accepted as empty.
pub fn parse_recipe(text: &str) -> Result<RecipeDraft> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| GeminiError::Parse(format!("Recipe is not valid JSON: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| GeminiError::Parse("Recipe is not a JSON object".to_string()))?;

    for field in STRING_FIELDS {
        require_string(object, field)?;
    }
    for field in LIST_FIELDS {
        require_string_list(object, field)?;
    }

    let difficulty = require_string(object, "difficulty")?;
    if core_library::Difficulty::from_label(difficulty).is_none() {
        return Err(GeminiError::InvalidEnum {
            field: "difficulty".to_string(),
            value: difficulty.to_string(),
        });
    }

    if object.contains_key("drinkPairings") {
        require_string_list(object, "drinkPairings")?;
    }

    let draft: RecipeDraft = serde_json::from_value(value)
        .map_err(|e| GeminiError::Parse(e.to_string()))?;
    draft.validate().map_err(|e| match e {
        LibraryError::InvalidRecipe { field, message } => {
            GeminiError::InvalidField { field, message }
        }
        other => GeminiError::Parse(other.to_string()),
    })?;
    Ok(draft)
}

fn require_string<'a>(object: &'a Map<String, Value>, field: &str) -> Result<&'a str> {
    match object.get(field) {
        None | Some(Value::Null) => Err(GeminiError::MissingField(field.to_string())),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(GeminiError::Parse(format!(
            "Field '{}' must be a string, got {}",
            field, other
        ))),
    }
}

fn require_string_list(object: &Map<String, Value>, field: &str) -> Result<()> {
    match object.get(field) {
        None | Some(Value::Null) => Err(GeminiError::MissingField(field.to_string())),
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => Ok(()),
        Some(_) => Err(GeminiError::Parse(format!(
            "Field '{}' must be a list of strings",
            field
        ))),
    }
}
