// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mnemo semantic memory engine.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Mnemo workspace. Collaborators that live
//! outside the engine (embedding models, completion clients, context
//! sources) implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MnemoError;
pub use types::{
    estimate_tokens, EmbeddingVector, ToolAgentReply, ToolDescriptor, ToolEvent, UsageEstimate,
};

pub use traits::{
    CompletionAdapter, DeterministicFactSource, EmbeddingAdapter, LiveDataSource, RecencySource,
    ReplySanitizer, ToolAgent, ToolHintSource,
};
