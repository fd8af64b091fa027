//! Integration tests for the skill ladder
//!
//! These tests validate the entire system working together, including:
//! - End-to-end match submission between fresh and established players
//! - Glicko-2 rating evolution across sequences of matches
//! - Ranked-threshold crossing and leadership bookkeeping
//! - Error handling without partial writes

use skill_ladder::ladder::{LadderQueries, MatchCoordinator};
use skill_ladder::store::{InMemoryStore, LadderStore};
use skill_ladder::types::{PlayerRecord, RatingState};
use skill_ladder::utils::current_timestamp;
use std::sync::Arc;

/// Integration test setup that creates a store, coordinator and queries
/// over a seeded player set
async fn create_test_system(
    players: &[(&str, PlayerRecord)],
) -> (Arc<InMemoryStore>, MatchCoordinator, LadderQueries) {
    let store = Arc::new(InMemoryStore::new());
    for (id, record) in players {
        store
            .upsert_player(id.to_string(), record.clone())
            .await
            .unwrap();
    }
    let coordinator = MatchCoordinator::new(store.clone());
    let queries = LadderQueries::new(store.clone());
    (store, coordinator, queries)
}

fn fresh_player(name: &str) -> PlayerRecord {
    PlayerRecord::new(name)
}

fn established_player(name: &str, rating: f64, deviation: f64) -> PlayerRecord {
    let mut record = PlayerRecord::new(name);
    record.rating = rating;
    record.deviation = deviation;
    record
}

#[tokio::test]
async fn test_first_match_between_fresh_players() {
    // Scenario: two brand-new players at 1500/350/0.06, A beats B.
    let (store, coordinator, _queries) = create_test_system(&[
        ("a", fresh_player("A")),
        ("b", fresh_player("B")),
    ])
    .await;

    let outcome = coordinator
        .submit_match(&"a".to_string(), &"b".to_string(), Some("11-9".to_string()))
        .await
        .unwrap();

    assert!(outcome.winner.after.rating > 1500.0);
    assert!(outcome.loser.after.rating < 1500.0);
    assert!(outcome.winner.after.deviation < 350.0);
    assert!(outcome.loser.after.deviation < 350.0);
    assert_eq!(outcome.winner.wins, 1);
    assert_eq!(outcome.winner.losses, 0);
    assert_eq!(outcome.loser.wins, 0);
    assert_eq!(outcome.loser.losses, 1);

    // Stored records match the outcome snapshot
    let a = store.get_player(&"a".to_string()).await.unwrap().unwrap();
    let b = store.get_player(&"b".to_string()).await.unwrap().unwrap();
    assert_eq!(a.rating, outcome.winner.after.rating);
    assert_eq!(b.rating, outcome.loser.after.rating);
    assert_eq!(a.wins, 1);
    assert_eq!(b.losses, 1);
    assert!(a.last_match_at.is_some());

    // Exactly one match record, carrying the literal score
    let matches = store.all_matches().await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].score.as_deref(), Some("11-9"));
    assert_eq!(matches[0].winner_rating_before, 1500.0);
    assert_eq!(matches[0].winner_rating_after, outcome.winner.after.rating);
    assert_eq!(
        matches[0].winner_delta,
        ((outcome.winner.after.rating - 1500.0) * 10.0).round() / 10.0
    );
}

#[tokio::test]
async fn test_asymmetric_deltas_with_unequal_deviations() {
    // A well-established winner against an uncertain loser moves by a
    // related but unequal amount.
    let (_store, coordinator, _queries) = create_test_system(&[
        ("veteran", established_player("Veteran", 1500.0, 60.0)),
        ("rookie", established_player("Rookie", 1500.0, 300.0)),
    ])
    .await;

    let outcome = coordinator
        .submit_match(&"veteran".to_string(), &"rookie".to_string(), None)
        .await
        .unwrap();

    assert!(outcome.winner.delta > 0.0);
    assert!(outcome.loser.delta < 0.0);
    assert_ne!(outcome.winner.delta, -outcome.loser.delta);
}

#[tokio::test]
async fn test_rematch_does_not_restore_original_ratings() {
    // Scenario: A beats B, then B beats A. Deviation and volatility evolve,
    // so the pair does not return to the exact starting point.
    let (store, coordinator, _queries) = create_test_system(&[
        ("a", fresh_player("A")),
        ("b", fresh_player("B")),
    ])
    .await;

    coordinator
        .submit_match(&"a".to_string(), &"b".to_string(), None)
        .await
        .unwrap();
    coordinator
        .submit_match(&"b".to_string(), &"a".to_string(), None)
        .await
        .unwrap();

    let a = store.get_player(&"a".to_string()).await.unwrap().unwrap();
    let b = store.get_player(&"b".to_string()).await.unwrap().unwrap();

    let both_restored = a.rating == 1500.0 && b.rating == 1500.0;
    assert!(!both_restored);
    assert_eq!(a.wins, 1);
    assert_eq!(a.losses, 1);
    assert_eq!(b.wins, 1);
    assert_eq!(b.losses, 1);
}

#[tokio::test]
async fn test_unranked_player_crosses_threshold_into_leadership() {
    // Scenario: a strong newcomer (deviation > 100) cannot lead the board
    // until enough games pull their deviation to 100 or below.
    let (store, coordinator, queries) = create_test_system(&[
        ("incumbent", established_player("Incumbent", 2100.0, 60.0)),
        ("newcomer", established_player("Newcomer", 2200.0, 160.0)),
        ("bystander", established_player("Bystander", 1500.0, 60.0)),
    ])
    .await;

    // The newcomer out-rates the incumbent but is not ranked yet
    let leaderboard = queries.leaderboard().await.unwrap();
    assert_eq!(leaderboard[0].player_id, "incumbent");

    let mut became_leader = false;
    for _ in 0..25 {
        let outcome = coordinator
            .submit_match(&"newcomer".to_string(), &"incumbent".to_string(), None)
            .await
            .unwrap();

        let newcomer = store
            .get_player(&"newcomer".to_string())
            .await
            .unwrap()
            .unwrap();
        if outcome.new_leader.as_deref() == Some("newcomer") {
            // Leadership requires being ranked
            assert!(newcomer.deviation <= 100.0);
            assert!(newcomer.no1_since.is_some());
            became_leader = true;
            break;
        } else {
            // Winning alone never makes an unranked player #1
            assert!(newcomer.deviation > 100.0);
            assert_eq!(outcome.new_leader.as_deref(), Some("incumbent"));
        }
    }
    assert!(became_leader, "newcomer never crossed the ranked threshold");
}

#[tokio::test]
async fn test_displaced_leader_reign_is_folded_into_longest() {
    // Scenario: X has held #1 for 10 minutes; a submission displaces X.
    let reign_start = current_timestamp() - chrono::Duration::milliseconds(600_000);
    let mut incumbent = established_player("Incumbent", 1550.0, 60.0);
    incumbent.no1_since = Some(reign_start);

    let (store, coordinator, _queries) = create_test_system(&[
        ("incumbent", incumbent),
        ("challenger", established_player("Challenger", 1540.0, 60.0)),
    ])
    .await;

    let outcome = coordinator
        .submit_match(&"challenger".to_string(), &"incumbent".to_string(), None)
        .await
        .unwrap();

    assert!(outcome.leadership_changed);
    assert_eq!(outcome.new_leader, Some("challenger".to_string()));

    let incumbent = store
        .get_player(&"incumbent".to_string())
        .await
        .unwrap()
        .unwrap();
    assert!(incumbent.no1_since.is_none());
    assert!(incumbent.longest_no1_ms >= 600_000);

    let challenger = store
        .get_player(&"challenger".to_string())
        .await
        .unwrap()
        .unwrap();
    assert!(challenger.no1_since.is_some());
}

#[tokio::test]
async fn test_longest_reign_never_decreases() {
    // A short second reign must not overwrite a longer historical one.
    let reign_start = current_timestamp() - chrono::Duration::milliseconds(1_000);
    let mut incumbent = established_player("Incumbent", 1550.0, 60.0);
    incumbent.no1_since = Some(reign_start);
    incumbent.longest_no1_ms = 3_600_000; // an hour, from an earlier reign

    let (store, coordinator, _queries) = create_test_system(&[
        ("incumbent", incumbent),
        ("challenger", established_player("Challenger", 1540.0, 60.0)),
    ])
    .await;

    coordinator
        .submit_match(&"challenger".to_string(), &"incumbent".to_string(), None)
        .await
        .unwrap();

    let incumbent = store
        .get_player(&"incumbent".to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(incumbent.longest_no1_ms, 3_600_000);
    assert!(incumbent.no1_since.is_none());
}

#[tokio::test]
async fn test_first_ever_leader_opens_reign_from_null() {
    // No player is ranked yet; the first pair to shed enough deviation
    // produces a leader from a null topBefore.
    let (_store, coordinator, _queries) = create_test_system(&[
        ("a", established_player("A", 1500.0, 90.0)),
        ("b", established_player("B", 1500.0, 350.0)),
    ])
    .await;

    let outcome = coordinator
        .submit_match(&"a".to_string(), &"b".to_string(), None)
        .await
        .unwrap();

    // A was already ranked, so A led before and after: not a change unless
    // there was no prior leader. Here topBefore was already A, so nothing
    // changes; repeat with an all-unranked board to hit the null case.
    assert!(!outcome.leadership_changed);

    let (store2, coordinator2, _) = create_test_system(&[
        ("c", established_player("C", 1500.0, 101.0)),
        ("d", established_player("D", 1500.0, 101.0)),
    ])
    .await;

    let outcome = coordinator2
        .submit_match(&"c".to_string(), &"d".to_string(), None)
        .await
        .unwrap();

    if outcome.leadership_changed {
        let leader_id = outcome.new_leader.clone().unwrap();
        let leader = store2.get_player(&leader_id).await.unwrap().unwrap();
        assert!(leader.deviation <= 100.0);
        assert!(leader.no1_since.is_some());
    }
}

#[tokio::test]
async fn test_submission_failure_leaves_no_trace() {
    let (store, coordinator, _queries) =
        create_test_system(&[("a", fresh_player("A"))]).await;

    let result = coordinator
        .submit_match(&"a".to_string(), &"missing".to_string(), None)
        .await;
    assert!(result.is_err());

    let a = store.get_player(&"a".to_string()).await.unwrap().unwrap();
    assert_eq!(a.rating, 1500.0);
    assert_eq!(a.wins, 0);
    assert!(a.last_match_at.is_none());
    assert!(store.all_matches().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_leaderboard_and_outcome_agree_after_submissions() {
    let (_store, coordinator, queries) = create_test_system(&[
        ("alice", established_player("Alice", 1520.0, 60.0)),
        ("bob", established_player("Bob", 1500.0, 60.0)),
        ("carol", established_player("Carol", 1480.0, 60.0)),
    ])
    .await;

    let outcome = coordinator
        .submit_match(&"carol".to_string(), &"alice".to_string(), None)
        .await
        .unwrap();

    let leaderboard = queries.leaderboard().await.unwrap();
    assert_eq!(leaderboard.len(), 3);
    assert_eq!(
        leaderboard[0].player_id,
        outcome.new_leader.clone().unwrap()
    );

    // Ratings on the board reflect the committed post-match values
    let carol_row = leaderboard
        .iter()
        .find(|row| row.player_id == "carol")
        .unwrap();
    assert_eq!(carol_row.rating, outcome.winner.after.rating);
    assert_eq!(carol_row.wins, 1);
}
