// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Mnemo workspace.

use serde::{Deserialize, Serialize};

/// A text embedding together with the identity of the model that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector {
    /// The embedding values. Length is provider-defined but fixed per model.
    pub vector: Vec<f32>,
    /// Model name (e.g. "local-hash-v1").
    pub model: String,
    /// Provider name (e.g. "local", "openai").
    pub provider: String,
}

/// Estimated token usage and cost for one pipeline turn.
///
/// Token counts use the chars/4 heuristic throughout the pipeline. They are
/// budget estimators, not tokenizer output, and must not be treated as exact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageEstimate {
    pub input_tokens_est: u64,
    pub output_tokens_est: u64,
    pub cost_est_usd: f64,
    pub llm_latency_ms: f64,
}

/// A tool invocation recorded during a turn, replayed to stream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEvent {
    /// Tool name (e.g. "calculator").
    pub name: String,
    /// Free-form invocation detail (arguments, result) as reported by the agent.
    pub detail: serde_json::Value,
}

/// A tool made available to the orchestrator, rendered into context hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

/// Reply produced by the tool agent collaborator.
///
/// An empty `reply` means the agent declined the turn and the normal prompt
/// path should run; `tool_events` are kept either way.
#[derive(Debug, Clone, Default)]
pub struct ToolAgentReply {
    pub reply: String,
    pub tool_events: Vec<ToolEvent>,
}

/// Estimate the token count of a text using the chars/4 heuristic.
///
/// Always returns at least 1 so a selected item consumes budget.
pub fn estimate_tokens(text: &str) -> u64 {
    std::cmp::max(1, text.trim().len() as u64 / 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_tokens_floor_is_one() {
        assert_eq!(estimate_tokens(""), 1);
        assert_eq!(estimate_tokens("ab"), 1);
    }

    #[test]
    fn estimate_tokens_divides_by_four() {
        assert_eq!(estimate_tokens("abcdefgh"), 2);
        assert_eq!(estimate_tokens(&"x".repeat(400)), 100);
    }

    #[test]
    fn estimate_tokens_trims_whitespace() {
        assert_eq!(estimate_tokens("  abcdefgh  "), 2);
    }

    #[test]
    fn usage_estimate_serializes() {
        let usage = UsageEstimate {
            input_tokens_est: 120,
            output_tokens_est: 48,
            cost_est_usd: 0.000132,
            llm_latency_ms: 210.5,
        };
        let json = serde_json::to_value(&usage).unwrap();
        assert_eq!(json["input_tokens_est"], 120);
        assert_eq!(json["output_tokens_est"], 48);
    }
}
