//! Generation backend contract.
//!
//! The session orchestrator and the playback controller depend on this trait
//! rather than on a concrete provider, so tests can substitute a fake backend.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{RecipeDraft, RecipeMode};

/// Stateless request/response access to the generative backend.
///
/// Each call is independent; implementations keep no session state between
/// calls and impose no timeout of their own unless configured to.
#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    /// Generate a recipe for a dish name (`Traditional`) or an ingredient
    /// list (`Pantry`).
    ///
    /// # Errors
    ///
    /// - [`LibraryError::Transport`](crate::LibraryError::Transport) when the
    ///   backend call fails
    /// - [`LibraryError::Parse`](crate::LibraryError::Parse) or
    ///   [`LibraryError::InvalidRecipe`](crate::LibraryError::InvalidRecipe)
    ///   when the payload does not satisfy the recipe contract
    async fn request_recipe(&self, query: &str, mode: RecipeMode) -> Result<RecipeDraft>;

    /// Generate a photo of the dish.
    ///
    /// `Ok(None)` means the backend answered without an image, which is an
    /// expected outcome. The returned string is a displayable data URI.
    async fn request_food_image(&self, title: &str) -> Result<Option<String>>;

    /// Generate spoken narration for `text`.
    ///
    /// Returns the base64-encoded raw PCM payload, or `Ok(None)` when the
    /// response carries no audio.
    async fn request_narration_audio(&self, text: &str) -> Result<Option<String>>;
}
