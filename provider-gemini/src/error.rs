//! Error types for the Gemini provider

use core_library::LibraryError;
use thiserror::Error;

/// Gemini provider errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeminiError {
    /// The request never produced an HTTP response
    #[error("Network error: {0}")]
    Transport(String),

    /// API request returned an error status
    #[error("Gemini API error (status {status_code}): {message}")]
    Api { status_code: u16, message: String },

    /// Response body is not the expected JSON
    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// Generated recipe lacks a required field
    #[error("Generated recipe is missing required field '{0}'")]
    MissingField(String),

    /// Generated recipe carries a value outside a closed set
    #[error("Generated recipe has invalid {field}: '{value}'")]
    InvalidEnum { field: String, value: String },

    /// Generated recipe fails local validation
    #[error("Generated recipe has invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// Response carried no candidate content
    #[error("API response contained no content")]
    EmptyResponse,
}

impl GeminiError {
    /// The backend could not be reached or refused the call.
    pub fn is_transport(&self) -> bool {
        matches!(self, GeminiError::Transport(_) | GeminiError::Api { .. })
    }

    /// The backend answered but the payload broke the contract.
    pub fn is_parse(&self) -> bool {
        !self.is_transport()
    }
}

/// Result type for Gemini operations
pub type Result<T> = std::result::Result<T, GeminiError>;

impl From<bridge_traits::error::BridgeError> for GeminiError {
    fn from(error: bridge_traits::error::BridgeError) -> Self {
        GeminiError::Transport(error.to_string())
    }
}

impl From<GeminiError> for LibraryError {
    fn from(error: GeminiError) -> Self {
        match error {
            GeminiError::MissingField(field) => LibraryError::invalid(field, "missing"),
            GeminiError::InvalidField { field, message } => LibraryError::invalid(field, message),
            GeminiError::InvalidEnum { field, value } => {
                LibraryError::invalid(field, format!("unexpected value '{}'", value))
            }
            other if other.is_transport() => LibraryError::Transport(other.to_string()),
            other => LibraryError::Parse(other.to_string()),
        }
    }
}
