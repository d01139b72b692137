// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly: pure rendering of a ranked [`ContextBundle`] into one
//! completion prompt. No I/O, no clock.

use crate::types::{ContextBundle, TurnInput};

const SYSTEM_INSTRUCTIONS: &str = "\
You are a grounded, precise assistant.
Use <DURABLE_FACTS> for user-specific facts and standing rules.
Use <SEMANTIC_MEMORY> only when an entry matches the current question; ignore unrelated entries.
Use <RECENT_CONVERSATION> to resolve references like 'that one' or 'the thing I mentioned'.
If <LIVE_CONTEXT> is present, treat it as the highest-priority source for current facts.
The <TOOL_HINTS> section lists capabilities you may mention when the user asks what you can do.
Never say 'based on your profile' or mention stored memories; use the facts as shared knowledge.
Keep responses concise unless the user asks for depth.";

/// Renders the prompt for one turn.
///
/// Empty sections are omitted entirely so the model never sees a blank
/// tagged block.
pub fn assemble_prompt(turn: &TurnInput, bundle: &ContextBundle) -> String {
    let mut prompt = String::from(SYSTEM_INSTRUCTIONS);
    for (tag, body) in [
        ("LIVE_CONTEXT", bundle.live_context.as_str()),
        ("DURABLE_FACTS", bundle.deterministic_facts.as_str()),
        ("SEMANTIC_MEMORY", bundle.semantic_context.as_str()),
        ("RECENT_CONVERSATION", bundle.recent_window.as_str()),
        ("TOOL_HINTS", bundle.tool_hints.as_str()),
    ] {
        if body.trim().is_empty() {
            continue;
        }
        prompt.push_str(&format!("\n<{tag}>\n{body}\n</{tag}>"));
    }
    prompt.push_str("\n\nUser message:\n");
    prompt.push_str(&turn.message);
    prompt
}
