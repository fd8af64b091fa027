//! Structured logging initialization
//!
//! The ladder core logs through `tracing`; embedding binaries (and
//! integration tests) call [`init_logging`] once at startup. `RUST_LOG`
//! overrides the configured default level.

use crate::error::Result;

/// Initialize the global tracing subscriber with the given default level
pub fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
