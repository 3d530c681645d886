//! # Playback Error Types
//!
//! Errors raised while turning a narration payload into audible output.

use bridge_traits::error::BridgeError;
use core_library::LibraryError;
use thiserror::Error;

/// Errors that can occur during narration playback.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Decoding Errors
    // ========================================================================
    /// Malformed base64 or a PCM buffer that does not align to whole samples.
    #[error("Decoding error: {0}")]
    Decode(String),

    /// The backend answered without an audio payload.
    #[error("No narration audio was produced")]
    NoAudio,

    // ========================================================================
    // Collaborator Errors
    // ========================================================================
    /// The host audio output rejected an operation.
    #[error("Playback adapter error: {0}")]
    Adapter(#[from] BridgeError),

    /// Narration audio could not be requested.
    #[error("Narration request failed: {0}")]
    Generation(#[from] LibraryError),
}

impl PlaybackError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Whether the failure came from the payload itself rather than a
    /// collaborator.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_classification() {
        assert!(PlaybackError::decode("odd length").is_decode_error());
        assert!(!PlaybackError::NoAudio.is_decode_error());
    }

    #[test]
    fn test_from_bridge_error() {
        let err: PlaybackError = BridgeError::NotAvailable("no device".to_string()).into();
        assert!(matches!(err, PlaybackError::Adapter(_)));
        assert!(err.to_string().contains("no device"));
    }
}
