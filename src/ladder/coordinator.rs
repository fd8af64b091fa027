//! Match submission coordinator
//!
//! This module owns the one write path of the system: `submit_match` applies
//! a reported result as a single atomic transaction — both rating updates,
//! leadership bookkeeping, and the match record either all commit or none do.
//! Commit conflicts from concurrent submissions are retried against a fresh
//! snapshot up to a configured bound.

use crate::config::StoreSettings;
use crate::error::{is_transaction_conflict, LadderError, Result};
use crate::ladder::leaderboard::{simulate_post_match, top_ranked};
use crate::rating::glicko2::{apply_match_result, round_one_decimal, OpponentResult};
use crate::store::{LadderStore, StoreTransaction};
use crate::types::{MatchOutcome, MatchRecord, PlayerId, PlayerOutcome, PlayerRecord};
use crate::utils::{current_timestamp, elapsed_ms};
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Statistics about coordinator operations
#[derive(Debug, Clone, Default)]
pub struct CoordinatorStats {
    /// Total matches committed
    pub matches_submitted: u64,
    /// Total commit conflicts that were retried
    pub conflicts_retried: u64,
    /// Total submissions that changed the #1 holder
    pub leadership_changes: u64,
}

/// The match submission coordinator
pub struct MatchCoordinator {
    store: Arc<dyn LadderStore>,
    settings: StoreSettings,
    stats: Arc<RwLock<CoordinatorStats>>,
}

impl MatchCoordinator {
    /// Create a coordinator with default store settings
    pub fn new(store: Arc<dyn LadderStore>) -> Self {
        Self::with_settings(store, StoreSettings::default())
    }

    /// Create a coordinator with explicit store settings
    pub fn with_settings(store: Arc<dyn LadderStore>, settings: StoreSettings) -> Self {
        Self {
            store,
            settings,
            stats: Arc::new(RwLock::new(CoordinatorStats::default())),
        }
    }

    /// Submit one match result: `winner_id` beat `loser_id`, optionally with
    /// a literal score string (stored opaquely; callers validate ordering).
    ///
    /// Executes the entire submission — both rating updates computed from
    /// pre-match state, leadership recomputation, bookkeeping, player writes
    /// and the match record — inside one store transaction. On a commit
    /// conflict the whole computation reruns against a fresh snapshot.
    pub async fn submit_match(
        &self,
        winner_id: &PlayerId,
        loser_id: &PlayerId,
        score: Option<String>,
    ) -> Result<MatchOutcome> {
        if winner_id == loser_id {
            return Err(LadderError::SelfMatch {
                player_id: winner_id.clone(),
            }
            .into());
        }

        let max_attempts = self.settings.max_transaction_retries;
        for attempt in 1..=max_attempts {
            let now = current_timestamp();
            let mut tx = self.store.begin().await?;
            let outcome = self
                .submit_in_transaction(tx.as_mut(), winner_id, loser_id, score.clone(), now)
                .await?;

            match tx.commit().await {
                Ok(()) => {
                    self.record_success(&outcome);
                    info!(
                        winner = %outcome.winner.name,
                        loser = %outcome.loser.name,
                        winner_delta = outcome.winner.delta,
                        loser_delta = outcome.loser.delta,
                        leadership_changed = outcome.leadership_changed,
                        "match submitted"
                    );
                    return Ok(outcome);
                }
                Err(e) if is_transaction_conflict(&e) => {
                    warn!(
                        attempt,
                        max_attempts, "submission conflicted with a concurrent write, retrying"
                    );
                    if let Ok(mut stats) = self.stats.write() {
                        stats.conflicts_retried += 1;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            winner_id = %winner_id,
            loser_id = %loser_id,
            max_attempts,
            "submission abandoned after exhausting retries"
        );
        Err(LadderError::TransactionConflict.into())
    }

    /// Coordinator statistics snapshot
    pub fn stats(&self) -> CoordinatorStats {
        self.stats
            .read()
            .map(|stats| stats.clone())
            .unwrap_or_default()
    }

    fn record_success(&self, outcome: &MatchOutcome) {
        if let Ok(mut stats) = self.stats.write() {
            stats.matches_submitted += 1;
            if outcome.leadership_changed {
                stats.leadership_changes += 1;
            }
        }
    }

    /// One submission attempt within an open transaction. Every read goes
    /// through the transaction so commit-time validation covers it.
    async fn submit_in_transaction(
        &self,
        tx: &mut dyn StoreTransaction,
        winner_id: &PlayerId,
        loser_id: &PlayerId,
        score: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<MatchOutcome> {
        let winner = tx
            .get_player(winner_id)
            .await?
            .ok_or_else(|| LadderError::PlayerNotFound {
                player_id: winner_id.clone(),
            })?;
        let loser = tx
            .get_player(loser_id)
            .await?
            .ok_or_else(|| LadderError::PlayerNotFound {
                player_id: loser_id.clone(),
            })?;

        // Both updates derive from pre-match state; neither sees the other's
        // output (simultaneous per the Glicko-2 specification).
        let winner_before = winner.rating_state();
        let loser_before = loser.rating_state();
        let winner_after =
            apply_match_result(&winner_before, &[OpponentResult::win_over(&loser_before)])?;
        let loser_after =
            apply_match_result(&loser_before, &[OpponentResult::loss_to(&winner_before)])?;

        // Leadership is recomputed from this transaction's snapshot, never
        // from cached state.
        let all_players = tx.all_players().await?;
        let top_before = top_ranked(&all_players);
        let simulated =
            simulate_post_match(&all_players, winner_id, &winner_after, loser_id, &loser_after);
        let top_after = top_ranked(&simulated);
        let leadership_changed = top_before != top_after;

        let mut winner_update = winner.clone();
        winner_update.apply_rating(winner_after);
        winner_update.wins += 1;
        winner_update.last_match_at = Some(now);

        let mut loser_update = loser.clone();
        loser_update.apply_rating(loser_after);
        loser_update.losses += 1;
        loser_update.last_match_at = Some(now);

        if leadership_changed {
            debug!(
                top_before = ?top_before,
                top_after = ?top_after,
                "leadership change detected"
            );
            self.close_previous_reign(
                tx,
                &all_players,
                top_before.as_ref(),
                &mut winner_update,
                winner_id,
                &mut loser_update,
                loser_id,
                now,
            )
            .await?;
            self.open_new_reign(
                tx,
                &all_players,
                top_after.as_ref(),
                &mut winner_update,
                winner_id,
                &mut loser_update,
                loser_id,
                now,
            )
            .await?;
        }

        tx.update_player(winner_id, winner_update.clone()).await?;
        tx.update_player(loser_id, loser_update.clone()).await?;

        let winner_delta = round_one_decimal(winner_after.rating - winner.rating);
        let loser_delta = round_one_decimal(loser_after.rating - loser.rating);

        tx.insert_match(MatchRecord {
            winner_id: winner_id.clone(),
            loser_id: loser_id.clone(),
            winner_name: winner.name.clone(),
            loser_name: loser.name.clone(),
            winner_rating_before: winner.rating,
            winner_rating_after: winner_after.rating,
            loser_rating_before: loser.rating,
            loser_rating_after: loser_after.rating,
            winner_delta,
            loser_delta,
            winner_deviation_after: winner_after.deviation,
            loser_deviation_after: loser_after.deviation,
            winner_volatility_after: winner_after.volatility,
            loser_volatility_after: loser_after.volatility,
            score,
            timestamp: now,
        })
        .await?;

        Ok(MatchOutcome {
            winner: PlayerOutcome {
                player_id: winner_id.clone(),
                name: winner.name,
                before: winner_before,
                after: winner_after,
                delta: winner_delta,
                wins: winner_update.wins,
                losses: winner_update.losses,
            },
            loser: PlayerOutcome {
                player_id: loser_id.clone(),
                name: loser.name,
                before: loser_before,
                after: loser_after,
                delta: loser_delta,
                wins: loser_update.wins,
                losses: loser_update.losses,
            },
            leadership_changed,
            new_leader: top_after,
            timestamp: now,
        })
    }

    /// Fold the displaced leader's open reign into `longestNo1Ms` and clear
    /// `no1Since`. Merged into the winner/loser write when the displaced
    /// leader is one of them, otherwise written as a third-party update in
    /// the same transaction.
    #[allow(clippy::too_many_arguments)]
    async fn close_previous_reign(
        &self,
        tx: &mut dyn StoreTransaction,
        all_players: &[(PlayerId, PlayerRecord)],
        previous: Option<&PlayerId>,
        winner_update: &mut PlayerRecord,
        winner_id: &PlayerId,
        loser_update: &mut PlayerRecord,
        loser_id: &PlayerId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let Some(previous_id) = previous else {
            return Ok(());
        };
        let Some((_, previous_record)) = all_players.iter().find(|(id, _)| id == previous_id)
        else {
            return Ok(());
        };
        let Some(since) = previous_record.no1_since else {
            return Ok(());
        };

        let reign_ms = elapsed_ms(since, now);
        let longest = previous_record.longest_no1_ms.max(reign_ms);
        debug!(player_id = %previous_id, reign_ms, "closing #1 reign");

        if previous_id == winner_id {
            winner_update.no1_since = None;
            winner_update.longest_no1_ms = longest;
        } else if previous_id == loser_id {
            loser_update.no1_since = None;
            loser_update.longest_no1_ms = longest;
        } else {
            let mut third_party = previous_record.clone();
            third_party.no1_since = None;
            third_party.longest_no1_ms = longest;
            tx.update_player(previous_id, third_party).await?;
        }
        Ok(())
    }

    /// Stamp the new leader's `no1Since`, preserving an already-open reign
    /// (a leader who stays leader must not have their reign restarted).
    #[allow(clippy::too_many_arguments)]
    async fn open_new_reign(
        &self,
        tx: &mut dyn StoreTransaction,
        all_players: &[(PlayerId, PlayerRecord)],
        next: Option<&PlayerId>,
        winner_update: &mut PlayerRecord,
        winner_id: &PlayerId,
        loser_update: &mut PlayerRecord,
        loser_id: &PlayerId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let Some(next_id) = next else {
            return Ok(());
        };
        let existing_reign = all_players
            .iter()
            .find(|(id, _)| id == next_id)
            .and_then(|(_, record)| record.no1_since);
        let since = existing_reign.unwrap_or(now);
        debug!(player_id = %next_id, since = %since, "opening #1 reign");

        if next_id == winner_id {
            winner_update.no1_since = Some(since);
        } else if next_id == loser_id {
            loser_update.no1_since = Some(since);
        } else if let Some((_, record)) = all_players.iter().find(|(id, _)| id == next_id) {
            let mut third_party = record.clone();
            third_party.no1_since = Some(since);
            tx.update_player(next_id, third_party).await?;
        }
        Ok(())
    }
}
