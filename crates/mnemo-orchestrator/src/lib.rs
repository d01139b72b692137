// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context orchestration pipeline for Mnemo.
//!
//! Takes one user turn from raw message to final reply: gathers context from
//! the semantic memory engine and external collaborators (each degrading
//! independently), re-ranks the memory rows under a token budget, assembles a
//! prompt, invokes the completion client behind a timeout/retry policy, and
//! sanitizes the result. Tool-capable turns may short-circuit through the
//! tool agent and skip the prompt path entirely. Finished replies are
//! replayed to consumers as paced, cancellable SSE event streams.

pub mod assembler;
pub mod builder;
pub mod pipeline;
pub mod ranker;
pub mod retry;
pub mod stream;
pub mod types;

pub use assembler::assemble_prompt;
pub use builder::ContextBuilder;
pub use pipeline::ChatOrchestrator;
pub use ranker::ContextRanker;
pub use retry::RetryingCompletion;
pub use stream::{StreamEvent, StreamHandler, chunk_text_words};
pub use types::{ContextBundle, PipelineResult, TurnInput, estimate_cost_usd};
