//! Gemini API request and response types
//!
//! Data structures for the `models/{model}:generateContent` endpoint.
//!
//! See: https://ai.google.dev/api/generate-content

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// generateContent request body
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Request with a single user text turn.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::text(prompt)],
            ..Self::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(Content::text(instruction));
        self
    }

    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

/// One conversation turn
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: Some(text.into()),
                inline_data: None,
            }],
        }
    }
}

/// Content part: text or inline binary data
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

/// Base64 payload embedded in a response part
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Base64-encoded bytes
    pub data: String,
}

/// Generation parameters
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,

    /// e.g. `["AUDIO"]` for speech
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

impl SpeechConfig {
    pub fn prebuilt_voice(voice_name: impl Into<String>) -> Self {
        Self {
            voice_config: VoiceConfig {
                prebuilt_voice_config: PrebuiltVoiceConfig {
                    voice_name: voice_name.into(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
}

/// generateContent response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
    }

    /// Concatenated text parts of the first candidate, or `None` when it
    /// carries no text.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let mut texts = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .peekable();
        texts.peek()?;
        Some(texts.collect())
    }

    /// First inline payload across all candidates.
    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.parts().find_map(|part| part.inline_data.as_ref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,

    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,

    pub message: String,

    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateContentRequest::from_prompt("Olá")
            .with_system_instruction("Chef")
            .with_generation_config(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig::prebuilt_voice("Kore")),
                ..GenerationConfig::default()
            });

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "Olá");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "Chef");
        assert_eq!(value["generationConfig"]["responseModalities"], json!(["AUDIO"]));
        assert_eq!(
            value["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Kore"
        );
        assert!(value["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_response_finds_first_inline_data() {
        let body = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Aqui está" },
                        { "inlineData": { "mimeType": "image/jpeg", "data": "AAAA" } },
                        { "inlineData": { "mimeType": "image/png", "data": "BBBB" } }
                    ]
                },
                "finishReason": "STOP"
            }]
        });

        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.text().as_deref(), Some("Aqui está"));

        let inline = response.first_inline_data().unwrap();
        assert_eq!(inline.data, "AAAA");
        assert_eq!(inline.mime_type.as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn test_text_joins_parts_of_first_candidate() {
        let body = json!({
            "candidates": [
                { "content": { "parts": [
                    { "text": "{\"title\": " },
                    { "inlineData": { "data": "AAAA" } },
                    { "text": "\"Vatapá\"}" }
                ] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        });

        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"title\": \"Vatapá\"}"));
    }

    #[test]
    fn test_text_absent_without_text_parts() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "AAAA" } }] } }]
        });

        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        assert!(response.text().is_none());
    }

    #[test]
    fn test_response_without_candidates() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
        assert!(response.first_inline_data().is_none());
    }

    #[test]
    fn test_error_envelope() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        let parsed: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.code, Some(400));
        assert_eq!(parsed.error.message, "API key not valid.");
    }
}
