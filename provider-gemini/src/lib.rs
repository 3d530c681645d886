//! # Gemini Provider
//!
//! Implements `RecipeGenerator` for the Gemini `generateContent` REST API.
//!
//! ## Overview
//!
//! This module provides:
//! - Recipe generation with a structured-output schema and local validation
//!   of the returned JSON
//! - Food photo generation, returned as a `data:` URI
//! - Spoken narration as base64 raw PCM (24 kHz mono, prebuilt voice)
//!
//! Requests go through the host `HttpClient` bridge, one attempt each, with
//! the API key in the `x-goog-api-key` header.

pub mod client;
pub mod error;
pub mod prompts;
pub mod types;

pub use client::{parse_recipe, GeminiClient};
pub use error::{GeminiError, Result};
