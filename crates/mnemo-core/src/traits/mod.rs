// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits implemented by external collaborators.

pub mod completion;
pub mod context;
pub mod embedding;

pub use completion::CompletionAdapter;
pub use context::{
    DeterministicFactSource, LiveDataSource, RecencySource, ReplySanitizer, ToolAgent,
    ToolHintSource,
};
pub use embedding::EmbeddingAdapter;
