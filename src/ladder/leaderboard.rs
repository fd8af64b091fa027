//! Pure leaderboard computations
//!
//! Ranking is always re-derived from the player set at hand, never cached:
//! the submission coordinator calls these helpers against its own
//! transaction snapshot, so two concurrent submissions can never disagree
//! about who holds #1 within their committed views.

use crate::types::{PlayerId, PlayerRecord, RatingState};

/// Order two leaderboard rows: rating descending, ties broken by player id
/// ascending so #1 is deterministic
fn compare_rows(a: &(PlayerId, PlayerRecord), b: &(PlayerId, PlayerRecord)) -> std::cmp::Ordering {
    b.1.rating
        .partial_cmp(&a.1.rating)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| a.0.cmp(&b.0))
}

/// The ranked players (deviation at or below the threshold), best first
pub fn ranked_leaderboard(players: &[(PlayerId, PlayerRecord)]) -> Vec<(PlayerId, PlayerRecord)> {
    let mut ranked: Vec<_> = players
        .iter()
        .filter(|(_, record)| record.is_ranked())
        .cloned()
        .collect();
    ranked.sort_by(compare_rows);
    ranked
}

/// The current #1 among ranked players, if any player is ranked
pub fn top_ranked(players: &[(PlayerId, PlayerRecord)]) -> Option<PlayerId> {
    players
        .iter()
        .filter(|(_, record)| record.is_ranked())
        .min_by(|a, b| compare_rows(a, b))
        .map(|(id, _)| id.clone())
}

/// Substitute both players' post-match rating states into a copy of the
/// player set. Pure in-memory simulation; used to compute `topAfter` before
/// any write happens.
pub fn simulate_post_match(
    players: &[(PlayerId, PlayerRecord)],
    winner_id: &PlayerId,
    winner_after: &RatingState,
    loser_id: &PlayerId,
    loser_after: &RatingState,
) -> Vec<(PlayerId, PlayerRecord)> {
    players
        .iter()
        .map(|(id, record)| {
            let mut record = record.clone();
            if id == winner_id {
                record.apply_rating(*winner_after);
            } else if id == loser_id {
                record.apply_rating(*loser_after);
            }
            (id.clone(), record)
        })
        .collect()
}
