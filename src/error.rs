//! Error types for the skill ladder
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the crate.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ladder scenarios
#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("A player cannot play themselves: {player_id}")]
    SelfMatch { player_id: String },

    #[error("Transaction conflict: a concurrent submission modified records read by this transaction")]
    TransactionConflict,

    #[error("Invalid rating state: {reason}")]
    InvalidRating { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal storage error: {message}")]
    InternalError { message: String },
}

impl LadderError {
    /// Whether this error is an optimistic-concurrency conflict that a
    /// caller may retry against a fresh snapshot.
    pub fn is_conflict(&self) -> bool {
        matches!(self, LadderError::TransactionConflict { .. })
    }
}

/// Check an `anyhow` error chain for a retryable transaction conflict.
pub fn is_transaction_conflict(err: &anyhow::Error) -> bool {
    err.downcast_ref::<LadderError>()
        .map(LadderError::is_conflict)
        .unwrap_or(false)
}
