// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model for the Mnemo engine and orchestrator.
//!
//! Every field has a compiled default so a bare deployment runs without a
//! config file. Defaults mirror the calibration the memory engine was tuned
//! against; overriding them is supported but changes ranking behavior.

use serde::{Deserialize, Serialize};

/// Root configuration for the Mnemo workspace.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemoConfig {
    /// Semantic memory engine settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Retrieval ranking weights.
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Completion client settings (timeout, retry, cost rates).
    #[serde(default)]
    pub llm: LlmConfig,

    /// Reply streaming settings.
    #[serde(default)]
    pub stream: StreamConfig,
}

/// Semantic memory engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Enable the memory system. When false, ingest and retrieve are no-ops.
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    /// Minimum normalized content length; shorter messages are not ingested.
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,

    /// Maximum content length; longer content is truncated at ingestion.
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,

    /// Maximum number of tags extracted per record.
    #[serde(default = "default_tag_limit")]
    pub tag_limit: usize,

    /// Default number of memories returned by retrieval.
    #[serde(default = "default_semantic_top_k")]
    pub semantic_top_k: usize,

    /// Token budget (chars/4 estimate) for the rendered memory block.
    #[serde(default = "default_token_budget")]
    pub token_budget: u64,

    /// Importance at or below which decay archives a record.
    #[serde(default = "default_archive_threshold")]
    pub archive_threshold: f64,

    /// Importance at or below which decay permanently deletes a record.
    #[serde(default = "default_delete_threshold")]
    pub delete_threshold: f64,

    /// Multiplicative importance shrink applied per maintenance cycle.
    #[serde(default = "default_decay_factor")]
    pub decay_factor_per_cycle: f64,

    /// Similarity at or above which an existing record counts as a near
    /// duplicate during the ingestion probe.
    #[serde(default = "default_duplicate_similarity")]
    pub duplicate_similarity_threshold: f64,

    /// Minimum bucket size before compression produces a summary.
    #[serde(default = "default_compression_cluster_min")]
    pub compression_cluster_min: usize,

    /// Maximum number of records consumed into one summary.
    #[serde(default = "default_compression_cluster_cap")]
    pub compression_cluster_cap: usize,

    /// Valid scopes for explicit scope hints. Hints outside this list fall
    /// back to phrasing inference.
    #[serde(default = "default_scope_whitelist")]
    pub scope_whitelist: Vec<String>,

    /// Embedding dimensions for the hash fallback embedder.
    #[serde(default = "default_embedding_dims")]
    pub embedding_dims: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            min_content_chars: default_min_content_chars(),
            max_content_chars: default_max_content_chars(),
            tag_limit: default_tag_limit(),
            semantic_top_k: default_semantic_top_k(),
            token_budget: default_token_budget(),
            archive_threshold: default_archive_threshold(),
            delete_threshold: default_delete_threshold(),
            decay_factor_per_cycle: default_decay_factor(),
            duplicate_similarity_threshold: default_duplicate_similarity(),
            compression_cluster_min: default_compression_cluster_min(),
            compression_cluster_cap: default_compression_cluster_cap(),
            scope_whitelist: default_scope_whitelist(),
            embedding_dims: default_embedding_dims(),
        }
    }
}

fn default_memory_enabled() -> bool {
    true
}

fn default_min_content_chars() -> usize {
    6
}

fn default_max_content_chars() -> usize {
    500
}

fn default_tag_limit() -> usize {
    8
}

fn default_semantic_top_k() -> usize {
    12
}

fn default_token_budget() -> u64 {
    512
}

fn default_archive_threshold() -> f64 {
    0.18
}

fn default_delete_threshold() -> f64 {
    0.10
}

fn default_decay_factor() -> f64 {
    0.985
}

fn default_duplicate_similarity() -> f64 {
    0.84
}

fn default_compression_cluster_min() -> usize {
    4
}

fn default_compression_cluster_cap() -> usize {
    12
}

fn default_scope_whitelist() -> Vec<String> {
    vec![
        "global".to_string(),
        "user".to_string(),
        "conversation".to_string(),
        "project".to_string(),
    ]
}

fn default_embedding_dims() -> usize {
    384
}

/// Raw retrieval ranking weights.
///
/// These are raw values as configured. The scoring layer renormalizes them to
/// sum to 1.0 on every ranking call and substitutes the compiled defaults
/// when the configured values sum to zero or less.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RankingConfig {
    #[serde(default = "default_weight_similarity")]
    pub similarity: f64,

    #[serde(default = "default_weight_importance")]
    pub importance: f64,

    #[serde(default = "default_weight_recency")]
    pub recency: f64,

    /// Exponential recency decay rate per day of record age.
    #[serde(default = "default_recency_lambda")]
    pub recency_lambda: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            similarity: default_weight_similarity(),
            importance: default_weight_importance(),
            recency: default_weight_recency(),
            recency_lambda: default_recency_lambda(),
        }
    }
}

fn default_weight_similarity() -> f64 {
    0.60
}

fn default_weight_importance() -> f64 {
    0.25
}

fn default_weight_recency() -> f64 {
    0.15
}

fn default_recency_lambda() -> f64 {
    0.03
}

/// Completion client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Per-call timeout in seconds.
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of retries after the first failed attempt.
    #[serde(default = "default_llm_retry_count")]
    pub retry_count: u32,

    /// Base backoff in milliseconds; attempt N sleeps N x this value.
    #[serde(default = "default_llm_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Estimated input cost per 1000 tokens, USD.
    #[serde(default = "default_cost_input_per_1k")]
    pub cost_input_per_1k: f64,

    /// Estimated output cost per 1000 tokens, USD.
    #[serde(default = "default_cost_output_per_1k")]
    pub cost_output_per_1k: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_llm_timeout_secs(),
            retry_count: default_llm_retry_count(),
            retry_backoff_ms: default_llm_retry_backoff_ms(),
            cost_input_per_1k: default_cost_input_per_1k(),
            cost_output_per_1k: default_cost_output_per_1k(),
        }
    }
}

fn default_llm_timeout_secs() -> u64 {
    30
}

fn default_llm_retry_count() -> u32 {
    2
}

fn default_llm_retry_backoff_ms() -> u64 {
    800
}

fn default_cost_input_per_1k() -> f64 {
    0.0005
}

fn default_cost_output_per_1k() -> f64 {
    0.0015
}

/// Reply streaming configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    /// Words per emitted chunk.
    #[serde(default = "default_stream_chunk_words")]
    pub chunk_words: usize,

    /// Delay between chunks in milliseconds.
    #[serde(default = "default_stream_delay_ms")]
    pub delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_words: default_stream_chunk_words(),
            delay_ms: default_stream_delay_ms(),
        }
    }
}

fn default_stream_chunk_words() -> usize {
    3
}

fn default_stream_delay_ms() -> u64 {
    12
}
