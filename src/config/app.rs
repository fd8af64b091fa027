//! Main application configuration
//!
//! Settings for embedding the ladder core: service identity, logging, and
//! the transaction retry policy. Everything loads from environment variables
//! with sensible defaults.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub store: StoreSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Store interaction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Maximum attempts for a submission transaction before a conflict is
    /// surfaced to the caller
    pub max_transaction_retries: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "skill-ladder".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            max_transaction_retries: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }
        if let Ok(retries) = env::var("MAX_TRANSACTION_RETRIES") {
            config.store.max_transaction_retries = retries
                .parse()
                .map_err(|_| anyhow!("Invalid MAX_TRANSACTION_RETRIES value: {}", retries))?;
        }

        validate_config(&config)?;
        Ok(config)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    if config.store.max_transaction_retries == 0 {
        return Err(anyhow!("Max transaction retries must be greater than 0"));
    }

    Ok(())
}
