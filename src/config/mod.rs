//! Configuration management for the skill ladder
//!
//! This module handles configuration loading from environment variables,
//! validation, and default values. Rating-system constants are deliberately
//! not configuration: see `rating::glicko2`.

pub mod app;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings, StoreSettings};
