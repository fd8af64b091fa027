//! Persistent store interface for the ladder
//!
//! The ladder core does not own a storage engine; it requires only a document
//! store supporting atomic multi-document read-modify-write transactions with
//! optimistic isolation. This module defines that seam, and
//! [`memory::InMemoryStore`] provides the reference implementation used by
//! tests and benches.

pub mod memory;

use crate::error::Result;
use crate::types::{MatchId, MatchRecord, PlayerId, PlayerRecord};
use async_trait::async_trait;

pub use memory::InMemoryStore;

/// Handle to the ladder's document store
#[async_trait]
pub trait LadderStore: Send + Sync {
    /// Begin a snapshot transaction.
    ///
    /// All reads observe the snapshot taken here; writes are buffered and
    /// applied atomically on [`StoreTransaction::commit`]. Dropping the
    /// transaction without committing discards every buffered write.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>>;

    /// Read one player outside any transaction
    async fn get_player(&self, player_id: &PlayerId) -> Result<Option<PlayerRecord>>;

    /// Read the full player set outside any transaction
    async fn all_players(&self) -> Result<Vec<(PlayerId, PlayerRecord)>>;

    /// Read all stored match records, oldest first
    async fn all_matches(&self) -> Result<Vec<MatchRecord>>;

    /// Create or replace a player document (registration and seeding)
    async fn upsert_player(&self, player_id: PlayerId, record: PlayerRecord) -> Result<()>;
}

/// One atomic unit of reads and writes against the store.
///
/// Commit fails with [`crate::error::LadderError::TransactionConflict`] when
/// any document this transaction read (for full scans: any document in the
/// collection) was modified by a concurrently committed writer. Callers retry
/// against a fresh snapshot.
#[async_trait]
pub trait StoreTransaction: Send {
    /// Read one player at this transaction's snapshot
    async fn get_player(&mut self, player_id: &PlayerId) -> Result<Option<PlayerRecord>>;

    /// Read the full player set at this transaction's snapshot
    async fn all_players(&mut self) -> Result<Vec<(PlayerId, PlayerRecord)>>;

    /// Buffer a write of one player document
    async fn update_player(&mut self, player_id: &PlayerId, record: PlayerRecord) -> Result<()>;

    /// Buffer an append of one immutable match record, returning its id
    async fn insert_match(&mut self, record: MatchRecord) -> Result<MatchId>;

    /// Validate reads against the current store state and apply all
    /// buffered writes atomically
    async fn commit(self: Box<Self>) -> Result<()>;
}
