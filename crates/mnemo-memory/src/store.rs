// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector store contract and the in-memory reference implementation.
//!
//! The engine only ever talks to [`VectorStoreAdapter`]; a production
//! deployment points it at a real vector database, while
//! [`InMemoryVectorStore`] backs tests and single-process setups. Upsert and
//! delete are atomic per record; concurrent writers to the same id follow
//! last-write-wins.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use mnemo_core::error::MnemoError;

use crate::record::{MemoryRecord, MemoryScope, VectorHit};
use crate::scoring::cosine_similarity;

/// Persistence contract for memory records with nearest-neighbor search.
#[async_trait]
pub trait VectorStoreAdapter: Send + Sync {
    /// Insert or replace a record keyed by (owner, id).
    async fn upsert(&self, record: MemoryRecord) -> Result<(), MnemoError>;

    /// Nearest-neighbor search scoped to one owner, optionally filtered by
    /// scope. Returns up to `top_k` hits sorted by similarity descending.
    /// Hits include inactive/archived records; lifecycle filtering belongs
    /// to the caller.
    async fn search(
        &self,
        vector: &[f32],
        owner_id: &str,
        top_k: usize,
        scopes: Option<&[MemoryScope]>,
    ) -> Result<Vec<VectorHit>, MnemoError>;

    /// All records for one owner, unsorted.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<MemoryRecord>, MnemoError>;

    /// Fetch one record by id.
    async fn get(&self, owner_id: &str, memory_id: &str)
        -> Result<Option<MemoryRecord>, MnemoError>;

    /// Permanently remove a record. Returns whether it existed.
    async fn delete(&self, owner_id: &str, memory_id: &str) -> Result<bool, MnemoError>;
}

/// In-memory store: owner -> (record id -> record).
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    records: RwLock<HashMap<String, HashMap<String, MemoryRecord>>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStoreAdapter for InMemoryVectorStore {
    async fn upsert(&self, record: MemoryRecord) -> Result<(), MnemoError> {
        let mut records = self.records.write().await;
        records
            .entry(record.owner_id.clone())
            .or_default()
            .insert(record.id.clone(), record);
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        owner_id: &str,
        top_k: usize,
        scopes: Option<&[MemoryScope]>,
    ) -> Result<Vec<VectorHit>, MnemoError> {
        let records = self.records.read().await;
        let mut hits: Vec<VectorHit> = records
            .get(owner_id)
            .map(|owned| {
                owned
                    .values()
                    .filter(|r| scopes.is_none_or(|s| s.contains(&r.scope)))
                    .map(|r| VectorHit {
                        similarity: cosine_similarity(vector, &r.embedding),
                        record: r.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        hits.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<MemoryRecord>, MnemoError> {
        let records = self.records.read().await;
        Ok(records
            .get(owner_id)
            .map(|owned| owned.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(
        &self,
        owner_id: &str,
        memory_id: &str,
    ) -> Result<Option<MemoryRecord>, MnemoError> {
        let records = self.records.read().await;
        Ok(records
            .get(owner_id)
            .and_then(|owned| owned.get(memory_id))
            .cloned())
    }

    async fn delete(&self, owner_id: &str, memory_id: &str) -> Result<bool, MnemoError> {
        let mut records = self.records.write().await;
        Ok(records
            .get_mut(owner_id)
            .is_some_and(|owned| owned.remove(memory_id).is_some()))
    }
}
