//! Common types used throughout the skill ladder
//!
//! Persisted record types serialize with the camelCase field names of the
//! documents already in production storage; renames here are load-bearing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = String;

/// Unique identifier for match records
pub type MatchId = Uuid;

/// A player's rating state on the display scale (centered at 1500)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingState {
    /// Estimated skill
    pub rating: f64,
    /// Rating deviation (RD): uncertainty in the estimate
    pub deviation: f64,
    /// Volatility (sigma): expected fluctuation in true skill
    pub volatility: f64,
}

impl Default for RatingState {
    fn default() -> Self {
        Self {
            rating: 1500.0,
            deviation: 350.0,
            volatility: crate::rating::glicko2::SIGMA_DEFAULT,
        }
    }
}

/// One player document, as stored in the `players` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    /// Display name, captured into match records at submission time
    pub name: String,
    pub rating: f64,
    pub deviation: f64,
    pub volatility: f64,
    pub wins: u32,
    pub losses: u32,
    pub last_match_at: Option<DateTime<Utc>>,
    /// Start of the player's currently open #1 reign, if any
    pub no1_since: Option<DateTime<Utc>>,
    /// Longest completed #1 reign in milliseconds; never decreases
    pub longest_no1_ms: i64,
}

impl PlayerRecord {
    /// Create a fresh player with default Glicko-2 state
    pub fn new(name: impl Into<String>) -> Self {
        let RatingState {
            rating,
            deviation,
            volatility,
        } = RatingState::default();

        Self {
            name: name.into(),
            rating,
            deviation,
            volatility,
            wins: 0,
            losses: 0,
            last_match_at: None,
            no1_since: None,
            longest_no1_ms: 0,
        }
    }

    /// The player's current rating state
    pub fn rating_state(&self) -> RatingState {
        RatingState {
            rating: self.rating,
            deviation: self.deviation,
            volatility: self.volatility,
        }
    }

    /// Whether the player is eligible for a leaderboard position
    pub fn is_ranked(&self) -> bool {
        self.deviation <= crate::rating::glicko2::RANKED_DEVIATION_MAX
    }

    /// Overwrite the rating fields from an engine result
    pub fn apply_rating(&mut self, state: RatingState) {
        self.rating = state.rating;
        self.deviation = state.deviation;
        self.volatility = state.volatility;
    }
}

/// One immutable match document, as stored in the `matches` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub winner_id: PlayerId,
    pub loser_id: PlayerId,
    pub winner_name: String,
    pub loser_name: String,
    pub winner_rating_before: f64,
    pub winner_rating_after: f64,
    pub loser_rating_before: f64,
    pub loser_rating_after: f64,
    /// One-decimal rating deltas (post minus pre)
    pub winner_delta: f64,
    pub loser_delta: f64,
    pub winner_deviation_after: f64,
    pub loser_deviation_after: f64,
    pub winner_volatility_after: f64,
    pub loser_volatility_after: f64,
    /// Literal reported score (e.g. "11-9"), stored opaquely
    pub score: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// One side of a submitted match, as returned to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerOutcome {
    pub player_id: PlayerId,
    pub name: String,
    pub before: RatingState,
    pub after: RatingState,
    /// One-decimal rating delta (after minus before)
    pub delta: f64,
    /// Win/loss record including this match
    pub wins: u32,
    pub losses: u32,
}

/// Snapshot returned by a successful match submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub winner: PlayerOutcome,
    pub loser: PlayerOutcome,
    /// True when the ranked #1 changed as a result of this match
    pub leadership_changed: bool,
    /// The ranked #1 after this match, if any player is ranked
    pub new_leader: Option<PlayerId>,
    pub timestamp: DateTime<Utc>,
}

/// One row of the ranked leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position
    pub rank: usize,
    pub player_id: PlayerId,
    pub name: String,
    pub rating: f64,
    pub deviation: f64,
    pub wins: u32,
    pub losses: u32,
}

/// Head-to-head record between two players
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadToHead {
    pub first_wins: usize,
    pub second_wins: usize,
    pub total: usize,
}

/// A hypothetical win and its rating payoff, for "who should I play" queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingOpportunity {
    pub opponent_id: PlayerId,
    pub opponent_name: String,
    /// One-decimal rating gain if the queried player wins
    pub rating_gain: f64,
    /// Win probability as a percentage (0..100)
    pub win_probability: f64,
}
