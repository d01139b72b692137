// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::MnemoError;
use crate::types::EmbeddingVector;

/// Adapter for generating vector embeddings from text.
///
/// Embedding adapters power semantic search and memory retrieval by
/// converting content into vector representations. Implementations must
/// bound their own I/O: a call that hangs past its internal deadline is
/// reported as an error, never left to run unbounded.
#[async_trait]
pub trait EmbeddingAdapter: Send + Sync {
    /// Generates an embedding for the given text.
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, MnemoError>;
}
