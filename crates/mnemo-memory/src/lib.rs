// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic memory engine for Mnemo.
//!
//! Long-term conversational memory with write-time classification, decaying
//! importance, and ranked retrieval. The engine classifies each ingested
//! message into a typed kind and scope, scores its importance, embeds it, and
//! stores it through a pluggable vector store. Retrieval blends similarity,
//! importance, and recency into one composite score, renders a
//! budget-limited context block, and reinforces everything it returns.
//! Offline maintenance sweeps decay importance, archive or delete faded
//! records, compress clusters of stale records into summaries, and re-embed
//! after a model change.

pub mod classify;
pub mod embedder;
pub mod engine;
pub mod record;
pub mod scoring;
pub mod store;

pub use embedder::HashEmbedder;
pub use engine::{CompressOutcome, DecayOutcome, ReembedOutcome, SemanticMemoryEngine};
pub use record::{MemoryKind, MemoryRecord, MemoryRow, MemoryScope, VectorHit};
pub use scoring::RankingWeights;
pub use store::{InMemoryVectorStore, VectorStoreAdapter};
