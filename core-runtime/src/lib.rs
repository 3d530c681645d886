//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the recipe core:
//! - Logging and tracing infrastructure
//! - Configuration management (credential, models, bridges)
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on.
//! It establishes the configuration contract, logging conventions, and event
//! broadcasting mechanisms used throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{ApiKey, ConfigStatus, CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
