use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    /// The backend could not be reached or answered with a failure status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered but the payload was not usable.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid recipe: {field} - {message}")]
    InvalidRecipe { field: String, message: String },
}

impl LibraryError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRecipe {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Transport failures are the only class where the backend never saw or
    /// never answered the request.
    pub fn is_transport(&self) -> bool {
        matches!(self, LibraryError::Transport(_))
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
