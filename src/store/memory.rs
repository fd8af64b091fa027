//! In-memory ladder store with optimistic transactions
//!
//! Reference implementation of [`LadderStore`]: documents carry version
//! counters, transactions read from a snapshot taken at `begin`, and commit
//! validates every read version against the live store before applying
//! buffered writes. A full-collection scan is validated with a collection
//! generation counter, since the scan's result depends on every document.

use crate::error::{LadderError, Result};
use crate::store::{LadderStore, StoreTransaction};
use crate::types::{MatchId, MatchRecord, PlayerId, PlayerRecord};
use crate::utils::generate_match_id;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

#[derive(Debug, Clone)]
struct VersionedPlayer {
    version: u64,
    record: PlayerRecord,
}

#[derive(Debug, Default)]
struct StoreInner {
    players: HashMap<PlayerId, VersionedPlayer>,
    matches: Vec<(MatchId, MatchRecord)>,
    /// Bumped on every player write; guards full-collection scans
    generation: u64,
}

/// In-memory document store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_inner(&self) -> Result<std::sync::RwLockReadGuard<'_, StoreInner>> {
        self.inner.read().map_err(|_| {
            LadderError::InternalError {
                message: "Failed to acquire store read lock".to_string(),
            }
            .into()
        })
    }

    fn write_inner(&self) -> Result<std::sync::RwLockWriteGuard<'_, StoreInner>> {
        self.inner.write().map_err(|_| {
            LadderError::InternalError {
                message: "Failed to acquire store write lock".to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl LadderStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>> {
        let inner = self.read_inner()?;
        Ok(Box::new(MemoryTransaction {
            store: Arc::clone(&self.inner),
            snapshot: inner.players.clone(),
            snapshot_generation: inner.generation,
            read_versions: HashMap::new(),
            scanned_all: false,
            player_writes: HashMap::new(),
            match_inserts: Vec::new(),
        }))
    }

    async fn get_player(&self, player_id: &PlayerId) -> Result<Option<PlayerRecord>> {
        let inner = self.read_inner()?;
        Ok(inner.players.get(player_id).map(|v| v.record.clone()))
    }

    async fn all_players(&self) -> Result<Vec<(PlayerId, PlayerRecord)>> {
        let inner = self.read_inner()?;
        let mut players: Vec<_> = inner
            .players
            .iter()
            .map(|(id, v)| (id.clone(), v.record.clone()))
            .collect();
        players.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(players)
    }

    async fn all_matches(&self) -> Result<Vec<MatchRecord>> {
        let inner = self.read_inner()?;
        Ok(inner
            .matches
            .iter()
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn upsert_player(&self, player_id: PlayerId, record: PlayerRecord) -> Result<()> {
        let mut inner = self.write_inner()?;
        let version = inner
            .players
            .get(&player_id)
            .map(|v| v.version + 1)
            .unwrap_or(1);
        inner
            .players
            .insert(player_id, VersionedPlayer { version, record });
        inner.generation += 1;
        Ok(())
    }
}

/// A snapshot transaction over [`InMemoryStore`]
struct MemoryTransaction {
    store: Arc<RwLock<StoreInner>>,
    snapshot: HashMap<PlayerId, VersionedPlayer>,
    snapshot_generation: u64,
    /// Versions observed by point reads; `None` means "read as absent"
    read_versions: HashMap<PlayerId, Option<u64>>,
    scanned_all: bool,
    player_writes: HashMap<PlayerId, PlayerRecord>,
    match_inserts: Vec<(MatchId, MatchRecord)>,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn get_player(&mut self, player_id: &PlayerId) -> Result<Option<PlayerRecord>> {
        let snapshot_entry = self.snapshot.get(player_id);
        self.read_versions
            .entry(player_id.clone())
            .or_insert_with(|| snapshot_entry.map(|v| v.version));

        // Read-your-writes within the transaction
        if let Some(written) = self.player_writes.get(player_id) {
            return Ok(Some(written.clone()));
        }
        Ok(snapshot_entry.map(|v| v.record.clone()))
    }

    async fn all_players(&mut self) -> Result<Vec<(PlayerId, PlayerRecord)>> {
        self.scanned_all = true;

        let mut players: Vec<(PlayerId, PlayerRecord)> = self
            .snapshot
            .iter()
            .map(|(id, v)| {
                let record = self
                    .player_writes
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| v.record.clone());
                (id.clone(), record)
            })
            .collect();
        players.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(players)
    }

    async fn update_player(&mut self, player_id: &PlayerId, record: PlayerRecord) -> Result<()> {
        self.player_writes.insert(player_id.clone(), record);
        Ok(())
    }

    async fn insert_match(&mut self, record: MatchRecord) -> Result<MatchId> {
        let match_id = generate_match_id();
        self.match_inserts.push((match_id, record));
        Ok(match_id)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut inner = self.store.write().map_err(|_| LadderError::InternalError {
            message: "Failed to acquire store write lock".to_string(),
        })?;

        // A full scan depends on every document in the collection
        if self.scanned_all && inner.generation != self.snapshot_generation {
            debug!(
                snapshot_generation = self.snapshot_generation,
                current_generation = inner.generation,
                "transaction conflict on full player scan"
            );
            return Err(LadderError::TransactionConflict.into());
        }

        for (player_id, read_version) in &self.read_versions {
            let current = inner.players.get(player_id).map(|v| v.version);
            if current != *read_version {
                debug!(player_id = %player_id, "transaction conflict on player document");
                return Err(LadderError::TransactionConflict.into());
            }
        }

        for (player_id, record) in self.player_writes {
            let version = inner
                .players
                .get(&player_id)
                .map(|v| v.version + 1)
                .unwrap_or(1);
            inner
                .players
                .insert(player_id, VersionedPlayer { version, record });
            inner.generation += 1;
        }

        inner.matches.extend(self.match_inserts);
        Ok(())
    }
}
