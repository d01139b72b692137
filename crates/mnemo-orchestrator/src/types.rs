// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input, intermediate, and output types of the orchestration pipeline.

use serde::{Deserialize, Serialize};

use mnemo_config::LlmConfig;
use mnemo_core::types::{ToolEvent, UsageEstimate};
use mnemo_memory::MemoryRow;

/// One user turn entering the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnInput {
    /// Identity namespace for memory reads and writes.
    pub owner_id: String,
    pub conversation_id: String,
    /// The user message, already reference-resolved by the caller.
    pub message: String,
    /// Whether the tool agent may answer this turn outright.
    #[serde(default)]
    pub use_tools: bool,
    /// Explicit memory scope for the write-time path, validated against the
    /// configured whitelist.
    #[serde(default)]
    pub scope_hint: Option<String>,
}

/// Context gathered for one turn, one field per source.
///
/// Sources degrade independently: a failed source leaves its field empty and
/// the turn proceeds.
#[derive(Debug, Clone, Default)]
pub struct ContextBundle {
    /// Deterministic fact context from the external collaborator.
    pub deterministic_facts: String,
    /// Ranked semantic memory rows, kept for traceability.
    pub semantic_rows: Vec<MemoryRow>,
    /// Rendered semantic memory block.
    pub semantic_context: String,
    /// Bounded recent-conversation window.
    pub recent_window: String,
    /// Rendered tool capability hints.
    pub tool_hints: String,
    /// Live/external data, populated only when the turn asked for it.
    pub live_context: String,
}

/// Final output of one pipeline turn.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub reply: String,
    pub usage: UsageEstimate,
    /// Exactly the semantic rows that went into the prompt.
    pub memory_rows: Vec<MemoryRow>,
    pub tool_events: Vec<ToolEvent>,
    /// The assembled prompt, or "tool_agent" for short-circuited turns.
    pub prompt_used: String,
}

/// Estimated USD cost for a turn at the configured per-1k-token rates,
/// rounded to 8 decimal places.
pub fn estimate_cost_usd(input_tokens: u64, output_tokens: u64, config: &LlmConfig) -> f64 {
    let in_cost = (input_tokens as f64 / 1000.0) * config.cost_input_per_1k;
    let out_cost = (output_tokens as f64 / 1000.0) * config.cost_output_per_1k;
    ((in_cost + out_cost) * 1e8).round() / 1e8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_uses_configured_rates() {
        let config = LlmConfig::default();
        let cost = estimate_cost_usd(1000, 1000, &config);
        assert!((cost - (0.0005 + 0.0015)).abs() < 1e-12);
    }

    #[test]
    fn cost_rounds_to_eight_decimals() {
        let config = LlmConfig::default();
        let cost = estimate_cost_usd(1, 1, &config);
        assert!((cost - 0.000002).abs() < 1e-12);
    }

    #[test]
    fn turn_input_optional_fields_default() {
        let turn: TurnInput = serde_json::from_str(
            r#"{"owner_id":"u1","conversation_id":"c1","message":"hi there"}"#,
        )
        .unwrap();
        assert!(!turn.use_tools);
        assert!(turn.scope_hint.is_none());
    }
}
