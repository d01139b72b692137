// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-turn re-ranking of the gathered semantic memory rows.
//!
//! The builder may gather rows from a broader candidate pool than one prompt
//! should carry. The ranker re-applies the composite-score ordering, truncates
//! greedily under the same token budget discipline as retrieval, and
//! re-renders the text block. Retrieval and re-ranking share one scoring
//! formula but evolve independently.

use mnemo_config::MemoryConfig;
use mnemo_core::types::estimate_tokens;
use mnemo_memory::MemoryRow;

use crate::types::ContextBundle;

/// Re-orders and re-renders the semantic rows of a [`ContextBundle`].
pub struct ContextRanker {
    token_budget: u64,
}

impl ContextRanker {
    pub fn new(config: &MemoryConfig) -> Self {
        Self {
            token_budget: config.token_budget,
        }
    }

    /// Ranks the bundle in place and returns it.
    pub fn rank(&self, mut bundle: ContextBundle) -> ContextBundle {
        if bundle.semantic_rows.is_empty() {
            return bundle;
        }

        let mut rows = std::mem::take(&mut bundle.semantic_rows);
        rows.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(
                    b.similarity_score
                        .partial_cmp(&a.similarity_score)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
                .then(
                    b.importance_score
                        .partial_cmp(&a.importance_score)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });

        // Greedy budget truncation; the first row is admitted regardless so
        // one oversized memory cannot blank the whole block.
        let mut selected: Vec<MemoryRow> = Vec::new();
        let mut used: u64 = 0;
        for row in rows {
            let est = estimate_tokens(&row.content);
            if !selected.is_empty() && used + est > self.token_budget {
                break;
            }
            used += est;
            selected.push(row);
        }

        let mut lines = Vec::with_capacity(selected.len());
        for (idx, row) in selected.iter_mut().enumerate() {
            row.rank = idx + 1;
            lines.push(format!(
                "- ({}) {} [type={}; scope={}; importance={:.2}; final={:.2}]",
                row.rank, row.content, row.kind, row.scope, row.importance_score, row.final_score,
            ));
        }

        bundle.semantic_rows = selected;
        bundle.semantic_context = lines.join("\n");
        bundle
    }
}
