//! Skill Ladder - transactional Glicko-2 rating leaderboard
//!
//! This crate maintains a competitive skill ladder updated atomically per
//! reported match: a pure Glicko-2 rating engine, a match submission
//! coordinator with leadership ("time at #1") bookkeeping, and a document
//! store seam with optimistic transaction isolation.

pub mod config;
pub mod error;
pub mod ladder;
pub mod rating;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LadderError, Result};
pub use types::*;

// Re-export key components
pub use ladder::{LadderQueries, MatchCoordinator};
pub use store::{InMemoryStore, LadderStore, StoreTransaction};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
