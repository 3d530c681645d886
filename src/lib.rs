//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates. Host applications can depend on `recipe-workspace` and
//! enable `desktop-shims` (reqwest HTTP client) or `native-audio` (rodio
//! narration output) without wiring each crate individually.

#[cfg(feature = "core-service")]
pub use core_service::{
    CoreDependencies, CoreError, CoreService, CoreStartup, PlaybackController, PlaybackPhase,
    PlaybackStatus, RecipeSession, SearchOutcome, SessionSnapshot,
};
