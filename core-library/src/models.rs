//! Domain models for generated recipes
//!
//! A [`RecipeDraft`] is what the generation backend returns; a [`Recipe`] is
//! the displayable record the session stores once an id and the optional
//! image have been attached.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::{LibraryError, Result};

/// Dishes used for the seed search when a session starts empty.
pub const SUGGESTED_RECIPES: &[&str] = &[
    "Baião de Dois",
    "Acarajé",
    "Moqueca Baiana",
    "Bolo de Rolo",
    "Vatapá",
    "Sarapatel",
    "Tapioca",
    "Carne de Sol com Macaxeira",
];

/// Pick one entry of [`SUGGESTED_RECIPES`] at random.
pub fn random_suggestion() -> &'static str {
    let index = rand::thread_rng().gen_range(0..SUGGESTED_RECIPES.len());
    SUGGESTED_RECIPES[index]
}

// =============================================================================
// ID Types
// =============================================================================

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LENGTH: usize = 9;

/// Display identifier for a recipe.
///
/// Nine random base36 characters. Collisions are unlikely but not ruled out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(String);

impl RecipeId {
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        let id = (0..ID_LENGTH)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        Self(id)
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecipeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Enumerations
// =============================================================================

/// Preparation difficulty, serialized with the backend's Portuguese labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "Fácil")]
    Easy,
    #[serde(rename = "Médio")]
    Medium,
    #[serde(rename = "Difícil")]
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Fácil",
            Difficulty::Medium => "Médio",
            Difficulty::Hard => "Difícil",
        }
    }

    /// Parse a backend label. Only the exact closed set is accepted.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Prompt strategy for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeMode {
    /// The query names a dish.
    #[default]
    Traditional,
    /// The query lists ingredients available at home.
    Pantry,
}

impl RecipeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipeMode::Traditional => "traditional",
            RecipeMode::Pantry => "pantry",
        }
    }

    /// The other mode, for a two-state toggle.
    pub fn toggled(&self) -> Self {
        match self {
            RecipeMode::Traditional => RecipeMode::Pantry,
            RecipeMode::Pantry => RecipeMode::Traditional,
        }
    }
}

impl fmt::Display for RecipeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Recipes
// =============================================================================

/// Recipe content as generated, before an id or image is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub title: String,
    pub description: String,
    /// Listing order is meaningful.
    pub ingredients: Vec<String>,
    /// One step per entry.
    pub instructions: Vec<String>,
    pub history: String,
    /// Free text such as "40 min"; never parsed.
    pub cooking_time: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub drink_pairings: Vec<String>,
}

impl RecipeDraft {
    /// Validate the draft before it becomes a displayable recipe.
    ///
    /// The title feeds the image prompt and the narration, so it must carry
    /// text.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(LibraryError::invalid("title", "cannot be empty"));
        }

        if self.ingredients.is_empty() || self.instructions.is_empty() {
            debug!(
                title = %self.title,
                ingredients = self.ingredients.len(),
                instructions = self.instructions.len(),
                "Recipe draft accepted with an empty list"
            );
        }

        Ok(())
    }
}

/// A displayable recipe.
///
/// Immutable once inserted into a session's result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub history: String,
    pub cooking_time: String,
    pub difficulty: Difficulty,
    pub drink_pairings: Vec<String>,
    /// Data URI of the generated photo, absent when generation produced none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Recipe {
    /// Combine a draft with its id and optional image.
    pub fn from_draft(draft: RecipeDraft, id: RecipeId, image_url: Option<String>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            history: draft.history,
            cooking_time: draft.cooking_time,
            difficulty: draft.difficulty,
            drink_pairings: draft.drink_pairings,
            image_url,
        }
    }

    /// Text read aloud by the narration feature.
    ///
    /// ```
    /// # use core_library::models::{Difficulty, Recipe, RecipeDraft, RecipeId};
    /// let recipe = Recipe::from_draft(
    ///     RecipeDraft {
    ///         title: "Tapioca".into(),
    ///         description: String::new(),
    ///         ingredients: vec!["goma".into(), "coco".into()],
    ///         instructions: vec!["Aqueça a frigideira".into(), "Espalhe a goma".into()],
    ///         history: String::new(),
    ///         cooking_time: "10 min".into(),
    ///         difficulty: Difficulty::Easy,
    ///         drink_pairings: vec![],
    ///     },
    ///     RecipeId::new(),
    ///     None,
    /// );
    /// assert_eq!(
    ///     recipe.narration_text(),
    ///     "Receita de Tapioca. Ingredientes: goma, coco. \
    ///      Modo de preparo: Aqueça a frigideira. Espalhe a goma"
    /// );
    /// ```
    pub fn narration_text(&self) -> String {
        format!(
            "Receita de {}. Ingredientes: {}. Modo de preparo: {}",
            self.title,
            self.ingredients.join(", "),
            self.instructions.join(". ")
        )
    }
}
