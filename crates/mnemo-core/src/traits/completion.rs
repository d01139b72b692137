// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion adapter trait for LLM text generation.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::MnemoError;

/// Adapter for single-shot LLM completions.
///
/// The caller supplies a per-call timeout; implementations must fail with a
/// descriptive [`MnemoError`] on timeout or API error rather than hang.
#[async_trait]
pub trait CompletionAdapter: Send + Sync {
    /// Completes the prompt, returning the raw reply text.
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, MnemoError>;
}
