//! Read-only ladder queries
//!
//! Everything here reads the store outside any transaction: leaderboard
//! views, win-probability estimates, head-to-head records, and what-if
//! rating gains. None of it mutates state, so plain snapshot reads suffice.

use crate::error::{LadderError, Result};
use crate::ladder::leaderboard::ranked_leaderboard;
use crate::rating::glicko2::{
    apply_match_result, round_one_decimal, win_probability, win_probability_pct, OpponentResult,
};
use crate::store::LadderStore;
use crate::types::{HeadToHead, LeaderboardEntry, PlayerId, PlayerRecord, RatingOpportunity};
use std::sync::Arc;

/// Read-only query surface over the ladder store
pub struct LadderQueries {
    store: Arc<dyn LadderStore>,
}

impl LadderQueries {
    pub fn new(store: Arc<dyn LadderStore>) -> Self {
        Self { store }
    }

    async fn require_player(&self, player_id: &PlayerId) -> Result<PlayerRecord> {
        self.store
            .get_player(player_id)
            .await?
            .ok_or_else(|| {
                LadderError::PlayerNotFound {
                    player_id: player_id.clone(),
                }
                .into()
            })
    }

    /// The ranked leaderboard, best first, with 1-based rank positions
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        let players = self.store.all_players().await?;
        Ok(ranked_leaderboard(&players)
            .into_iter()
            .enumerate()
            .map(|(index, (player_id, record))| LeaderboardEntry {
                rank: index + 1,
                player_id,
                name: record.name,
                rating: record.rating,
                deviation: record.deviation,
                wins: record.wins,
                losses: record.losses,
            })
            .collect())
    }

    /// Win probability of `first` over `second`, in [0, 1]
    pub async fn win_probability(&self, first: &PlayerId, second: &PlayerId) -> Result<f64> {
        let first = self.require_player(first).await?;
        let second = self.require_player(second).await?;
        Ok(win_probability(
            &first.rating_state(),
            &second.rating_state(),
        ))
    }

    /// Win probability of `first` over `second` as a one-decimal percentage
    /// string, e.g. "64.2"
    pub async fn win_probability_pct(&self, first: &PlayerId, second: &PlayerId) -> Result<String> {
        let first = self.require_player(first).await?;
        let second = self.require_player(second).await?;
        Ok(win_probability_pct(
            &first.rating_state(),
            &second.rating_state(),
        ))
    }

    /// Head-to-head record between two players over all stored matches
    pub async fn head_to_head(&self, first: &PlayerId, second: &PlayerId) -> Result<HeadToHead> {
        let matches = self.store.all_matches().await?;

        let mut record = HeadToHead {
            first_wins: 0,
            second_wins: 0,
            total: 0,
        };
        for m in matches {
            if m.winner_id == *first && m.loser_id == *second {
                record.first_wins += 1;
                record.total += 1;
            } else if m.winner_id == *second && m.loser_id == *first {
                record.second_wins += 1;
                record.total += 1;
            }
        }
        Ok(record)
    }

    /// The most profitable hypothetical wins for a player: every other
    /// player's one-decimal rating payoff if beaten, best gains first,
    /// truncated to `limit`.
    pub async fn rating_opportunities(
        &self,
        player_id: &PlayerId,
        limit: usize,
    ) -> Result<Vec<RatingOpportunity>> {
        let player = self.require_player(player_id).await?;
        let player_state = player.rating_state();
        let all_players = self.store.all_players().await?;

        let mut opportunities = Vec::new();
        for (opponent_id, opponent) in all_players {
            if opponent_id == *player_id {
                continue;
            }
            let opponent_state = opponent.rating_state();
            let hypothetical = apply_match_result(
                &player_state,
                &[OpponentResult::win_over(&opponent_state)],
            )?;

            opportunities.push(RatingOpportunity {
                opponent_id,
                opponent_name: opponent.name,
                rating_gain: round_one_decimal(hypothetical.rating - player.rating),
                win_probability: round_one_decimal(
                    win_probability(&player_state, &opponent_state) * 100.0,
                ),
            });
        }

        opportunities.sort_by(|a, b| {
            b.rating_gain
                .partial_cmp(&a.rating_gain)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.opponent_id.cmp(&b.opponent_id))
        });
        opportunities.truncate(limit);
        Ok(opportunities)
    }
}
