//! Glicko-2 rating engine
//!
//! Pure rating math: no I/O and no shared state. The match submission
//! coordinator drives these functions; read-only queries reuse them for
//! win-probability and what-if calculations.

pub mod glicko2;

// Re-export commonly used items
pub use glicko2::{
    apply_match_result, win_probability, win_probability_pct, OpponentResult, RANKED_DEVIATION_MAX,
    RD_MAX, SIGMA_DEFAULT, SIGMA_MAX,
};
