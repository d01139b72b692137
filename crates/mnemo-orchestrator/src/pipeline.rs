// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The turn pipeline: build context, rank it, answer via tool agent or
//! prompt + completion, sanitize, and account usage.
//!
//! A turn moves through build -> rank -> (tool short-circuit | prompt ->
//! complete) -> sanitize -> done. A tool agent failure degrades silently to
//! the prompt path; a completion failure is the one fatal error a turn can
//! surface.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use mnemo_config::{LlmConfig, MnemoConfig};
use mnemo_core::error::MnemoError;
use mnemo_core::traits::{CompletionAdapter, ReplySanitizer, ToolAgent};
use mnemo_core::types::{ToolEvent, UsageEstimate, estimate_tokens};
use mnemo_memory::SemanticMemoryEngine;

use crate::assembler::assemble_prompt;
use crate::builder::ContextBuilder;
use crate::ranker::ContextRanker;
use crate::types::{PipelineResult, TurnInput, estimate_cost_usd};

/// Runs one conversational turn end to end.
///
/// Owns no ambient state: the engine, completion client, and collaborators
/// are injected at construction and shared by reference.
pub struct ChatOrchestrator {
    engine: Arc<SemanticMemoryEngine>,
    builder: ContextBuilder,
    ranker: ContextRanker,
    completion: Arc<dyn CompletionAdapter>,
    tool_agent: Option<Arc<dyn ToolAgent>>,
    sanitizer: Option<Arc<dyn ReplySanitizer>>,
    llm: LlmConfig,
}

impl ChatOrchestrator {
    /// Creates an orchestrator over an engine and completion client.
    ///
    /// `completion` is invoked as-is; wrap it in
    /// [`crate::retry::RetryingCompletion`] to add the timeout/retry policy.
    pub fn new(
        config: &MnemoConfig,
        engine: Arc<SemanticMemoryEngine>,
        builder: ContextBuilder,
        completion: Arc<dyn CompletionAdapter>,
    ) -> Self {
        Self {
            engine,
            builder,
            ranker: ContextRanker::new(&config.memory),
            completion,
            tool_agent: None,
            sanitizer: None,
            llm: config.llm.clone(),
        }
    }

    pub fn with_tool_agent(mut self, tool_agent: Arc<dyn ToolAgent>) -> Self {
        self.tool_agent = Some(tool_agent);
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: Arc<dyn ReplySanitizer>) -> Self {
        self.sanitizer = Some(sanitizer);
        self
    }

    /// Runs one turn. Only a completion failure is fatal; every other
    /// dependency degrades.
    pub async fn run_turn(&self, turn: &TurnInput) -> Result<PipelineResult, MnemoError> {
        let bundle = self.builder.build(turn).await;
        let bundle = self.ranker.rank(bundle);

        let mut tool_events: Vec<ToolEvent> = Vec::new();
        if turn.use_tools {
            if let Some(agent) = &self.tool_agent {
                match agent.run(&turn.message).await {
                    Ok(agent_reply) => {
                        tool_events = agent_reply.tool_events;
                        let candidate = agent_reply.reply.trim().to_string();
                        if !candidate.is_empty() {
                            let reply = self.sanitize(&turn.message, &candidate);
                            let usage = self.account_usage(&turn.message, &reply, 0.0);
                            self.remember_turn(turn).await;
                            info!(
                                owner_id = %turn.owner_id,
                                tool_events = tool_events.len(),
                                "turn answered by tool agent"
                            );
                            return Ok(PipelineResult {
                                reply,
                                usage,
                                memory_rows: bundle.semantic_rows,
                                tool_events,
                                prompt_used: "tool_agent".to_string(),
                            });
                        }
                    }
                    Err(e) => {
                        warn!(owner_id = %turn.owner_id, error = %e, "tool agent failed, continuing with prompt path");
                    }
                }
            }
        }

        let prompt = assemble_prompt(turn, &bundle);
        let started = Instant::now();
        let raw = self
            .completion
            .complete(&prompt, Duration::from_secs(self.llm.timeout_secs))
            .await?;
        let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
        metrics::histogram!("mnemo_llm_latency_seconds").record(started.elapsed().as_secs_f64());
        debug!(owner_id = %turn.owner_id, latency_ms, "completion finished");

        let reply = self.sanitize(&turn.message, &raw);
        let usage = self.account_usage(&prompt, &reply, (latency_ms * 100.0).round() / 100.0);
        self.remember_turn(turn).await;

        Ok(PipelineResult {
            reply,
            usage,
            memory_rows: bundle.semantic_rows,
            tool_events,
            prompt_used: prompt,
        })
    }

    fn sanitize(&self, user_message: &str, reply: &str) -> String {
        match &self.sanitizer {
            Some(sanitizer) => sanitizer.sanitize(user_message, reply),
            None => reply.trim().to_string(),
        }
    }

    fn account_usage(&self, input: &str, output: &str, latency_ms: f64) -> UsageEstimate {
        let input_tokens = estimate_tokens(input);
        let output_tokens = estimate_tokens(output);
        let usage = UsageEstimate {
            input_tokens_est: input_tokens,
            output_tokens_est: output_tokens,
            cost_est_usd: estimate_cost_usd(input_tokens, output_tokens, &self.llm),
            llm_latency_ms: latency_ms,
        };
        metrics::counter!("mnemo_llm_tokens_input_total").increment(input_tokens);
        metrics::counter!("mnemo_llm_tokens_output_total").increment(output_tokens);
        usage
    }

    /// Write-time memory path. Best-effort: an ingestion failure is logged
    /// and never fails the turn.
    async fn remember_turn(&self, turn: &TurnInput) {
        let result = self
            .engine
            .ingest(
                &turn.owner_id,
                &turn.message,
                None,
                turn.scope_hint.as_deref(),
            )
            .await;
        if let Err(e) = result {
            warn!(owner_id = %turn.owner_id, error = %e, "memory ingestion failed for turn");
        }
    }
}
