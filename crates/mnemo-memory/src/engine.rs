// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The semantic memory engine: classification, importance scoring, ranked
//! retrieval, decay, compression, and re-embedding.
//!
//! The engine is a stateless request handler over an externally-owned store.
//! It holds no record-level locks; atomicity of upsert/delete is the store's
//! responsibility, and concurrent read-then-write races on the same record
//! are resolved last-write-wins. Importance is a heuristic that decay keeps
//! re-normalizing, so a lost reinforcement update is tolerable.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use mnemo_config::{LlmConfig, MemoryConfig, MnemoConfig, RankingConfig};
use mnemo_core::error::MnemoError;
use mnemo_core::traits::{CompletionAdapter, EmbeddingAdapter};
use mnemo_core::types::estimate_tokens;

use crate::classify::{classify_kind, detect_scope, extract_tags, normalize_text, score_importance};
use crate::record::{MemoryKind, MemoryRecord, MemoryRow, MemoryScope, VectorHit};
use crate::scoring::RankingWeights;
use crate::store::VectorStoreAdapter;

/// Summary records may run longer than ordinary content.
const SUMMARY_CONTENT_CAP: usize = 1000;

/// Result of one decay sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecayOutcome {
    pub updated: usize,
    pub archived: usize,
    pub deleted: usize,
}

/// Result of one compression sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompressOutcome {
    pub compressed: usize,
}

/// Result of one re-embedding sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReembedOutcome {
    pub reembedded: usize,
}

/// Multiplicative decay step: `importance * factor`, both clamped.
///
/// Pulled out of the sweep so the monotonicity property is testable in
/// isolation: for any factor in (0, 1] the result never exceeds the input.
pub fn decayed_importance(importance: f64, decay_factor: f64) -> f64 {
    let factor = decay_factor.clamp(0.01, 1.0);
    (importance * factor).clamp(0.0, 1.0)
}

/// Classification, scoring, retrieval, and lifecycle maintenance over one
/// owner's memory records.
///
/// Constructed with injected store/embedder dependencies; there is no
/// ambient global instance.
pub struct SemanticMemoryEngine {
    embedder: Arc<dyn EmbeddingAdapter>,
    store: Arc<dyn VectorStoreAdapter>,
    /// Optional completion client used only for compression summaries.
    completion: Option<Arc<dyn CompletionAdapter>>,
    memory: MemoryConfig,
    ranking: RankingConfig,
    llm: LlmConfig,
}

impl SemanticMemoryEngine {
    /// Creates an engine from config plus injected dependencies.
    pub fn new(
        config: &MnemoConfig,
        embedder: Arc<dyn EmbeddingAdapter>,
        store: Arc<dyn VectorStoreAdapter>,
    ) -> Self {
        Self {
            embedder,
            store,
            completion: None,
            memory: config.memory.clone(),
            ranking: config.ranking.clone(),
            llm: config.llm.clone(),
        }
    }

    /// Attaches a completion client for LLM-backed compression summaries.
    /// Without one, compression falls back to deterministic concatenation.
    pub fn with_completion(mut self, completion: Arc<dyn CompletionAdapter>) -> Self {
        self.completion = Some(completion);
        self
    }

    /// Shared access to the store, for wiring maintenance jobs and tests.
    pub fn store(&self) -> Arc<dyn VectorStoreAdapter> {
        Arc::clone(&self.store)
    }

    /// Ingest one message as a memory record.
    ///
    /// Returns `Ok(None)` when memory is disabled or the normalized text is
    /// too short to be meaningful. When the normalized text exactly matches
    /// an existing active record, that record is reinforced instead of
    /// duplicated. Embedding or store failures propagate; ingestion is
    /// best-effort and callers must not let it block the conversation flow.
    pub async fn ingest(
        &self,
        owner_id: &str,
        message: &str,
        source_message_id: Option<&str>,
        scope_hint: Option<&str>,
    ) -> Result<Option<MemoryRecord>, MnemoError> {
        if !self.memory.enabled {
            return Ok(None);
        }
        let normalized = normalize_text(message, self.memory.max_content_chars);
        if normalized.len() < self.memory.min_content_chars {
            return Ok(None);
        }

        let kind = classify_kind(&normalized);
        let scope = self
            .resolve_scope_hint(scope_hint)
            .unwrap_or_else(|| detect_scope(&normalized));

        let (similar_count, exact_duplicate) = self.duplicate_probe(owner_id, &normalized).await;
        if let Some(mut existing) = exact_duplicate {
            let now = Utc::now();
            existing.reinforce(now);
            self.store.upsert(existing.clone()).await?;
            debug!(
                owner_id,
                memory_id = %existing.id,
                "identical content re-ingested, reinforcing existing record"
            );
            return Ok(Some(existing));
        }

        let importance = score_importance(&normalized, &kind, similar_count);
        let tags = extract_tags(&normalized, self.memory.tag_limit);

        let mut record = MemoryRecord::create(
            owner_id,
            &normalized,
            kind,
            scope,
            importance,
            self.memory.decay_factor_per_cycle,
            tags,
            source_message_id.map(str::to_string),
        );
        record.reinforcement_count = similar_count;

        let started = Instant::now();
        let embedding = self.embedder.embed(&normalized).await?;
        metrics::histogram!("mnemo_embedding_seconds").record(started.elapsed().as_secs_f64());
        record.embedding = embedding.vector;
        record.embedding_model = embedding.model;
        record.embedding_provider = embedding.provider;

        record
            .metadata
            .insert("similar_count".to_string(), json!(similar_count));
        record
            .metadata
            .insert("ingested_at".to_string(), json!(Utc::now().to_rfc3339()));
        record.metadata.insert(
            "importance_model".to_string(),
            json!("base+reinforcement+emotion"),
        );

        self.store.upsert(record.clone()).await?;
        metrics::counter!("mnemo_memories_ingested_total").increment(1);
        info!(
            owner_id,
            memory_id = %record.id,
            kind = %record.kind,
            scope = %record.scope,
            importance = record.importance_score,
            embedding_provider = %record.embedding_provider,
            "semantic memory ingested"
        );
        Ok(Some(record))
    }

    /// Ranked retrieval: returns structured rows plus a rendered text block.
    ///
    /// Every returned hit is reinforced exactly once as a side effect; this
    /// is the feedback loop that makes frequently-retrieved memories decay
    /// more slowly.
    pub async fn retrieve(
        &self,
        owner_id: &str,
        query: &str,
        top_k: Option<usize>,
        scopes: Option<&[MemoryScope]>,
    ) -> Result<(Vec<MemoryRow>, String), MnemoError> {
        if !self.memory.enabled {
            return Ok((Vec::new(), String::new()));
        }
        let top_k = top_k.unwrap_or(self.memory.semantic_top_k);
        let weights = RankingWeights::normalized(&self.ranking);
        let now = Utc::now();

        let started = Instant::now();
        let query_emb = self.embedder.embed(query).await?;
        metrics::histogram!("mnemo_embedding_seconds").record(started.elapsed().as_secs_f64());

        // Superset fetch to survive the lifecycle and importance filters.
        let started = Instant::now();
        let hits = self
            .store
            .search(&query_emb.vector, owner_id, top_k * 4, scopes)
            .await?;
        metrics::histogram!("mnemo_retrieval_seconds").record(started.elapsed().as_secs_f64());

        let mut ranked: Vec<VectorHit> = hits
            .into_iter()
            .filter(|h| h.record.is_active && !h.record.is_archived)
            .collect();
        ranked.sort_by(|a, b| {
            let score_a =
                weights.composite(a.similarity, a.record.importance_score, a.record.created_at, now);
            let score_b =
                weights.composite(b.similarity, b.record.importance_score, b.record.created_at, now);
            score_b.partial_cmp(&score_a).unwrap_or(std::cmp::Ordering::Equal)
        });

        // Greedy selection under top_k and the token budget. The budget is
        // skipped for the first pick so at least one hit always survives.
        let mut selected: Vec<VectorHit> = Vec::new();
        let mut used: u64 = 0;
        for hit in ranked {
            if selected.len() >= top_k {
                break;
            }
            if hit.record.importance_score < self.memory.archive_threshold {
                continue;
            }
            let est = estimate_tokens(&hit.record.content);
            if !selected.is_empty() && used + est > self.memory.token_budget {
                break;
            }
            used += est;
            selected.push(hit);
        }

        let mut rows = Vec::with_capacity(selected.len());
        let mut lines = Vec::with_capacity(selected.len());
        for (idx, hit) in selected.iter_mut().enumerate() {
            let rank = idx + 1;
            let final_score = weights.composite(
                hit.similarity,
                hit.record.importance_score,
                hit.record.created_at,
                now,
            );
            rows.push(MemoryRow {
                rank,
                memory_id: hit.record.id.clone(),
                content: hit.record.content.clone(),
                kind: hit.record.kind.clone(),
                scope: hit.record.scope,
                importance_score: hit.record.importance_score,
                similarity_score: hit.similarity,
                recency_weight: weights.recency_weight(hit.record.created_at, now),
                final_score,
                reinforcement_count: hit.record.reinforcement_count,
                created_at: hit.record.created_at,
                tags: hit.record.tags.clone(),
            });
            lines.push(format!(
                "- ({rank}) {} [type={}; scope={}; importance={:.2}; sim={:.2}; final={:.2}]",
                hit.record.content,
                hit.record.kind,
                hit.record.scope,
                hit.record.importance_score,
                hit.similarity,
                final_score,
            ));

            hit.record.reinforce(now);
            self.store.upsert(hit.record.clone()).await?;
        }

        Ok((rows, lines.join("\n")))
    }

    /// Maintenance sweep: multiply each record's importance by its own decay
    /// factor, then delete, archive, or persist depending on thresholds.
    ///
    /// Safe to re-run immediately: a record only ever moves further down the
    /// state ladder.
    pub async fn decay(&self, owner_id: &str) -> Result<DecayOutcome, MnemoError> {
        let records = self.store.list_by_owner(owner_id).await?;
        let mut outcome = DecayOutcome::default();
        let now = Utc::now();

        for mut record in records {
            if record.is_archived {
                continue;
            }
            let prev = record.importance_score;
            record.importance_score = decayed_importance(prev, record.decay_factor);
            record.updated_at = now;
            if (prev - record.importance_score).abs() > 1e-6 {
                outcome.updated += 1;
            }

            if record.importance_score <= self.memory.delete_threshold {
                if self.store.delete(owner_id, &record.id).await? {
                    outcome.deleted += 1;
                }
                continue;
            }
            if record.importance_score <= self.memory.archive_threshold {
                record.archive(now);
                outcome.archived += 1;
            }
            self.store.upsert(record).await?;
        }

        metrics::counter!("mnemo_memory_decay_events_total")
            .increment((outcome.archived + outcome.deleted) as u64);
        info!(
            owner_id,
            updated = outcome.updated,
            archived = outcome.archived,
            deleted = outcome.deleted,
            "memory decay sweep finished"
        );
        Ok(outcome)
    }

    /// Compress clusters of low-importance same-kind-and-scope records into
    /// one summary record each. Sources are archived, never deleted, so
    /// provenance stays inspectable.
    pub async fn compress(&self, owner_id: &str) -> Result<CompressOutcome, MnemoError> {
        let records = self.store.list_by_owner(owner_id).await?;
        let now = Utc::now();

        let mut buckets: HashMap<(MemoryKind, MemoryScope), Vec<MemoryRecord>> = HashMap::new();
        for record in records {
            if !record.is_active || record.is_archived {
                continue;
            }
            if record.importance_score > self.memory.archive_threshold {
                continue;
            }
            buckets
                .entry((record.kind.clone(), record.scope))
                .or_default()
                .push(record);
        }

        let mut outcome = CompressOutcome::default();
        for ((kind, scope), mut bucket) in buckets {
            if bucket.len() < self.memory.compression_cluster_min {
                continue;
            }
            bucket.sort_by(|a, b| {
                a.importance_score
                    .partial_cmp(&b.importance_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.updated_at.cmp(&b.updated_at))
            });
            bucket.truncate(self.memory.compression_cluster_cap);

            match self.compress_bucket(owner_id, &kind, scope, &bucket).await {
                Ok(()) => outcome.compressed += 1,
                Err(e) => {
                    warn!(
                        owner_id,
                        kind = %kind,
                        scope = %scope,
                        error = %e,
                        "compression bucket failed, skipping"
                    );
                }
            }
        }

        info!(owner_id, compressed = outcome.compressed, "memory compression finished");
        Ok(outcome)
    }

    /// Re-embed every record for an owner, e.g. after switching embedding
    /// providers. Per-record failures are logged and skipped; the returned
    /// count reflects successes only.
    pub async fn reembed(&self, owner_id: &str, reason: &str) -> Result<ReembedOutcome, MnemoError> {
        let records = self.store.list_by_owner(owner_id).await?;
        let mut outcome = ReembedOutcome::default();
        let now = Utc::now();

        for mut record in records {
            let embedded = match self.embedder.embed(&record.content).await {
                Ok(e) => e,
                Err(e) => {
                    warn!(owner_id, memory_id = %record.id, error = %e, "reembed failed, skipping record");
                    continue;
                }
            };
            record.embedding = embedded.vector;
            record.embedding_model = embedded.model;
            record.embedding_provider = embedded.provider;
            record.updated_at = now;
            record
                .metadata
                .insert("reembedded_at".to_string(), json!(now.to_rfc3339()));
            record
                .metadata
                .insert("reembed_reason".to_string(), json!(reason));
            if let Err(e) = self.store.upsert(record).await {
                warn!(owner_id, error = %e, "reembed upsert failed, skipping record");
                continue;
            }
            outcome.reembedded += 1;
        }

        info!(owner_id, reason, reembedded = outcome.reembedded, "memory reembed finished");
        Ok(outcome)
    }

    /// All records for one owner, for inspection UIs.
    pub async fn list_user_memories(&self, owner_id: &str) -> Result<Vec<MemoryRecord>, MnemoError> {
        self.store.list_by_owner(owner_id).await
    }

    /// Explicit user-initiated deletion; one of the only two permanent
    /// deletion paths (the other being decay below the delete threshold).
    pub async fn delete_user_memory(
        &self,
        owner_id: &str,
        memory_id: &str,
    ) -> Result<bool, MnemoError> {
        self.store.delete(owner_id, memory_id).await
    }

    fn resolve_scope_hint(&self, scope_hint: Option<&str>) -> Option<MemoryScope> {
        let hint = scope_hint?.trim().to_lowercase();
        if !self.memory.scope_whitelist.iter().any(|s| *s == hint) {
            return None;
        }
        MemoryScope::parse(&hint)
    }

    /// Similarity probe against existing active records. Returns the count
    /// of near-duplicates and, when one has byte-identical content, that
    /// record for reinforcement. Failures degrade to zero; the probe feeds a
    /// heuristic, not a correctness-critical value.
    async fn duplicate_probe(&self, owner_id: &str, text: &str) -> (u32, Option<MemoryRecord>) {
        let embedded = match self.embedder.embed(text).await {
            Ok(e) => e,
            Err(e) => {
                debug!(owner_id, error = %e, "duplicate probe embed failed");
                return (0, None);
            }
        };
        let hits = match self.store.search(&embedded.vector, owner_id, 16, None).await {
            Ok(h) => h,
            Err(e) => {
                debug!(owner_id, error = %e, "duplicate probe search failed");
                return (0, None);
            }
        };
        let mut count = 0;
        let mut exact = None;
        for hit in hits {
            if hit.similarity >= self.memory.duplicate_similarity_threshold
                && hit.record.is_active
                && !hit.record.is_archived
            {
                count += 1;
                if exact.is_none() && hit.record.content == text {
                    exact = Some(hit.record);
                }
            }
        }
        (count, exact)
    }

    async fn compress_bucket(
        &self,
        owner_id: &str,
        kind: &MemoryKind,
        scope: MemoryScope,
        cluster: &[MemoryRecord],
    ) -> Result<(), MnemoError> {
        let now = Utc::now();
        let joined = cluster
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join(" | ");

        let summary_text = match &self.completion {
            Some(completion) => {
                let prompt = format!(
                    "Summarize these related memories into one concise durable memory node.\n\
                     Preserve core facts and preferences. Do not invent facts. Avoid fluff.\n\
                     Memory type: {kind}\nScope: {scope}\nItems: {joined}"
                );
                match completion
                    .complete(&prompt, Duration::from_secs(self.llm.timeout_secs))
                    .await
                {
                    Ok(text) if !text.trim().is_empty() => text,
                    Ok(_) => format!("Compressed {kind} memories: {joined}"),
                    Err(e) => {
                        debug!(owner_id, error = %e, "summary completion failed, using fallback");
                        format!("Compressed {kind} memories: {joined}")
                    }
                }
            }
            None => format!("Compressed {kind} memories: {joined}"),
        };
        let summary_text: String = summary_text.chars().take(SUMMARY_CONTENT_CAP).collect();

        let avg_importance =
            cluster.iter().map(|m| m.importance_score).sum::<f64>() / cluster.len() as f64;
        let mut summary = MemoryRecord::create(
            owner_id,
            &summary_text,
            MemoryKind::Summary(Box::new(kind.clone())),
            scope,
            avg_importance.max(0.3),
            (self.memory.decay_factor_per_cycle * 0.7).max(0.02),
            vec!["summary".to_string(), kind.label(), scope.as_str().to_string()],
            Some("compression".to_string()),
        );

        let embedded = self.embedder.embed(&summary.content).await?;
        summary.embedding = embedded.vector;
        summary.embedding_model = embedded.model;
        summary.embedding_provider = embedded.provider;
        summary.metadata.insert(
            "reference_graph".to_string(),
            json!({
                "cluster_type": kind.label(),
                "scope": scope.as_str(),
                "sources": cluster.iter().map(|m| m.id.clone()).collect::<Vec<_>>(),
                "created_by": "compression_engine",
            }),
        );
        summary
            .metadata
            .insert("compressed_at".to_string(), json!(now.to_rfc3339()));
        self.store.upsert(summary).await?;

        for source in cluster {
            let mut archived = source.clone();
            archived.archive(now);
            self.store.upsert(archived).await?;
        }
        Ok(())
    }
}
