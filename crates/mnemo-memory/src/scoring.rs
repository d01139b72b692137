// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared ranking math: composite scores, recency weighting, cosine
//! similarity.
//!
//! Retrieval (engine-internal) and in-turn re-ranking (orchestrator-internal)
//! both score candidates through this module so the two stages can evolve
//! independently while agreeing on one formula.

use chrono::{DateTime, Utc};
use mnemo_config::RankingConfig;

/// Ranking weights guaranteed to sum to 1.0.
///
/// Construction renormalizes the configured raw weights on every call; a
/// degenerate configuration (non-positive sum) falls back to the compiled
/// default triple. This invariant holds for every ranking call, not just at
/// startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingWeights {
    pub similarity: f64,
    pub importance: f64,
    pub recency: f64,
    pub recency_lambda: f64,
}

impl RankingWeights {
    /// Normalize the configured weights, falling back to 0.60/0.25/0.15 when
    /// the configured sum is zero or negative.
    pub fn normalized(config: &RankingConfig) -> Self {
        let (mut sim, mut imp, mut rec) = (config.similarity, config.importance, config.recency);
        let total = sim + imp + rec;
        if total <= 0.0 {
            sim = 0.60;
            imp = 0.25;
            rec = 0.15;
        } else {
            sim /= total;
            imp /= total;
            rec /= total;
        }
        Self {
            similarity: sim,
            importance: imp,
            recency: rec,
            recency_lambda: config.recency_lambda,
        }
    }

    /// Exponential recency weight for a record created at `created_at`.
    pub fn recency_weight(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let age_days = ((now - created_at).num_seconds() as f64 / 86_400.0).max(0.0);
        (-self.recency_lambda * age_days).exp()
    }

    /// Composite score over similarity, importance, and recency.
    pub fn composite(
        &self,
        similarity: f64,
        importance: f64,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> f64 {
        similarity * self.similarity
            + importance * self.importance
            + self.recency_weight(created_at, now) * self.recency
    }
}

/// Cosine similarity between two vectors.
///
/// Tolerates length mismatch by comparing the shared prefix; returns 0.0 for
/// empty or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut na = 0.0f64;
    let mut nb = 0.0f64;
    for i in 0..n {
        let av = f64::from(a[i]);
        let bv = f64::from(b[i]);
        dot += av * bv;
        na += av * av;
        nb += bv * bv;
    }
    if na <= 0.0 || nb <= 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}
