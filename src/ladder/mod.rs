//! Ladder orchestration: atomic match submission and read-only queries

pub mod coordinator;
pub mod leaderboard;
pub mod queries;

// Re-export commonly used types
pub use coordinator::{CoordinatorStats, MatchCoordinator};
pub use queries::LadderQueries;
