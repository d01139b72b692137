// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context gathering layer.
//!
//! Each source is fetched independently and a failure in any one source
//! degrades that source to empty output. Building context never aborts a
//! turn; every degradation is logged.

use std::sync::Arc;

use tracing::warn;

use mnemo_core::traits::{DeterministicFactSource, LiveDataSource, RecencySource, ToolHintSource};
use mnemo_memory::SemanticMemoryEngine;

use crate::types::{ContextBundle, TurnInput};

/// Gathers per-turn context from the memory engine and optional external
/// collaborators.
pub struct ContextBuilder {
    engine: Arc<SemanticMemoryEngine>,
    facts: Option<Arc<dyn DeterministicFactSource>>,
    recency: Option<Arc<dyn RecencySource>>,
    live: Option<Arc<dyn LiveDataSource>>,
    tools: Option<Arc<dyn ToolHintSource>>,
}

impl ContextBuilder {
    pub fn new(engine: Arc<SemanticMemoryEngine>) -> Self {
        Self {
            engine,
            facts: None,
            recency: None,
            live: None,
            tools: None,
        }
    }

    pub fn with_fact_source(mut self, facts: Arc<dyn DeterministicFactSource>) -> Self {
        self.facts = Some(facts);
        self
    }

    pub fn with_recency_source(mut self, recency: Arc<dyn RecencySource>) -> Self {
        self.recency = Some(recency);
        self
    }

    pub fn with_live_data_source(mut self, live: Arc<dyn LiveDataSource>) -> Self {
        self.live = Some(live);
        self
    }

    pub fn with_tool_hints(mut self, tools: Arc<dyn ToolHintSource>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Gathers all context for one turn.
    pub async fn build(&self, turn: &TurnInput) -> ContextBundle {
        let mut bundle = ContextBundle::default();

        if let Some(facts) = &self.facts {
            match facts.fact_context(&turn.owner_id, &turn.message).await {
                Ok(text) => bundle.deterministic_facts = text,
                Err(e) => {
                    warn!(owner_id = %turn.owner_id, error = %e, "fact source failed, degrading to empty");
                }
            }
        }

        match self
            .engine
            .retrieve(&turn.owner_id, &turn.message, None, None)
            .await
        {
            Ok((rows, rendered)) => {
                bundle.semantic_rows = rows;
                bundle.semantic_context = rendered;
            }
            Err(e) => {
                warn!(owner_id = %turn.owner_id, error = %e, "semantic retrieval failed, degrading to empty");
            }
        }

        if let Some(recency) = &self.recency {
            match recency.recent_window(&turn.conversation_id).await {
                Ok(text) => bundle.recent_window = text,
                Err(e) => {
                    warn!(conversation_id = %turn.conversation_id, error = %e, "recency source failed, degrading to empty");
                }
            }
        }

        if let Some(tools) = &self.tools {
            bundle.tool_hints = tools
                .list_tools()
                .iter()
                .map(|t| format!("- {}: {}", t.name, t.description))
                .collect::<Vec<_>>()
                .join("\n");
        }

        if let Some(live) = &self.live {
            if live.wants_live_data(&turn.message) {
                match live.live_context(&turn.message).await {
                    Ok(text) => bundle.live_context = text,
                    Err(e) => {
                        warn!(owner_id = %turn.owner_id, error = %e, "live data source failed, degrading to empty");
                    }
                }
            }
        }

        bundle
    }
}
