//! # Recipe Library Module
//!
//! Domain model and backend contract for recipe discovery.
//!
//! ## Overview
//!
//! This module defines:
//! - [`Recipe`](models::Recipe) and [`RecipeDraft`](models::RecipeDraft) values
//! - The closed [`Difficulty`](models::Difficulty) set and the two
//!   [`RecipeMode`](models::RecipeMode) prompt strategies
//! - Client-side [`RecipeId`](models::RecipeId) generation
//! - The [`RecipeGenerator`](generator::RecipeGenerator) trait implemented by
//!   generation providers

pub mod error;
pub mod generator;
pub mod models;

pub use error::{LibraryError, Result};
pub use generator::RecipeGenerator;
pub use models::{
    random_suggestion, Difficulty, Recipe, RecipeDraft, RecipeId, RecipeMode, SUGGESTED_RECIPES,
};
