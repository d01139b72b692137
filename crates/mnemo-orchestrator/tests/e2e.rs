// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete Mnemo pipeline.
//!
//! Each test wires an isolated engine over the in-memory store with mock
//! adapters. Tests are independent and order-insensitive.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use mnemo_config::MnemoConfig;
use mnemo_core::error::MnemoError;
use mnemo_core::traits::{CompletionAdapter, ToolAgent};
use mnemo_core::types::{ToolAgentReply, ToolEvent};
use mnemo_memory::{HashEmbedder, InMemoryVectorStore, MemoryKind, SemanticMemoryEngine};
use mnemo_orchestrator::{
    ChatOrchestrator, ContextBuilder, RetryingCompletion, StreamEvent, StreamHandler, TurnInput,
};

struct CannedCompletion(&'static str);

#[async_trait]
impl CompletionAdapter for CannedCompletion {
    async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, MnemoError> {
        Ok(self.0.to_string())
    }
}

struct BrokenCompletion;

#[async_trait]
impl CompletionAdapter for BrokenCompletion {
    async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, MnemoError> {
        Err(MnemoError::completion("provider unreachable"))
    }
}

struct CalculatorAgent;

#[async_trait]
impl ToolAgent for CalculatorAgent {
    async fn run(&self, _message: &str) -> Result<ToolAgentReply, MnemoError> {
        Ok(ToolAgentReply {
            reply: "the answer is 42".to_string(),
            tool_events: vec![ToolEvent {
                name: "calculator".to_string(),
                detail: serde_json::json!({"expression": "6*7", "result": 42}),
            }],
        })
    }
}

fn engine() -> Arc<SemanticMemoryEngine> {
    Arc::new(SemanticMemoryEngine::new(
        &MnemoConfig::default(),
        Arc::new(HashEmbedder::new(64)),
        Arc::new(InMemoryVectorStore::new()),
    ))
}

fn orchestrator(
    engine: Arc<SemanticMemoryEngine>,
    completion: Arc<dyn CompletionAdapter>,
) -> ChatOrchestrator {
    let config = MnemoConfig::default();
    let builder = ContextBuilder::new(Arc::clone(&engine));
    let retrying = Arc::new(RetryingCompletion::new(completion, &config.llm));
    ChatOrchestrator::new(&config, engine, builder, retrying)
}

fn turn(owner: &str, message: &str, use_tools: bool) -> TurnInput {
    TurnInput {
        owner_id: owner.to_string(),
        conversation_id: "c1".to_string(),
        message: message.to_string(),
        use_tools,
        scope_hint: None,
    }
}

// ---- Turn pipeline ----

#[tokio::test]
async fn turn_produces_reply_and_remembers_the_message() {
    let engine = engine();
    let orch = orchestrator(Arc::clone(&engine), Arc::new(CannedCompletion("Noted!")));

    let result = orch
        .run_turn(&turn("u1", "I prefer dark roast coffee", false))
        .await
        .unwrap();

    assert_eq!(result.reply, "Noted!");
    assert!(result.usage.input_tokens_est > 0);

    let memories = engine.list_user_memories("u1").await.unwrap();
    assert_eq!(memories.len(), 1);
    assert_eq!(memories[0].kind, MemoryKind::Preference);
}

#[tokio::test]
async fn earlier_memories_reach_the_prompt_and_are_owner_scoped() {
    let engine = engine();
    let orch = orchestrator(Arc::clone(&engine), Arc::new(CannedCompletion("ok")));

    orch.run_turn(&turn("u1", "I prefer dark roast coffee", false))
        .await
        .unwrap();
    let second = orch
        .run_turn(&turn("u1", "what coffee do I like", false))
        .await
        .unwrap();
    assert!(second.prompt_used.contains("dark roast coffee"));
    assert!(!second.memory_rows.is_empty());

    // A different owner sees none of it.
    let other = orch
        .run_turn(&turn("u2", "what coffee do I like", false))
        .await
        .unwrap();
    assert!(other.memory_rows.is_empty());
    assert!(!other.prompt_used.contains("dark roast"));
}

#[tokio::test]
async fn completion_failure_exhausts_retries_and_surfaces() {
    let orch = orchestrator(engine(), Arc::new(BrokenCompletion));
    let err = orch
        .run_turn(&turn("u1", "hello out there", false))
        .await
        .unwrap_err();
    assert!(matches!(err, MnemoError::Completion { .. }));
}

// ---- Streaming ----

#[tokio::test]
async fn tool_turn_streams_tool_call_before_tokens() {
    let engine = engine();
    let orch = orchestrator(Arc::clone(&engine), Arc::new(BrokenCompletion))
        .with_tool_agent(Arc::new(CalculatorAgent));

    let result = orch
        .run_turn(&turn("u1", "what is six times seven", true))
        .await
        .unwrap();
    assert_eq!(result.reply, "the answer is 42");

    let config = MnemoConfig::default();
    let handler = StreamHandler::new(&config.stream);
    let events: Vec<StreamEvent> = handler
        .stream(
            &result.reply,
            "req-1",
            "c1",
            result.usage.clone(),
            result.tool_events.clone(),
            CancellationToken::new(),
        )
        .collect()
        .await;

    assert_eq!(events[0].name(), "start");
    assert_eq!(events[1].name(), "tool_call");
    assert_eq!(events.last().unwrap().name(), "done");

    let text: String = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Token { text } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text.trim_end(), "the answer is 42");
}

#[tokio::test]
async fn failed_turn_streams_error_then_done() {
    let orch = orchestrator(engine(), Arc::new(BrokenCompletion));
    let err = orch
        .run_turn(&turn("u1", "hello out there", false))
        .await
        .unwrap_err();

    let config = MnemoConfig::default();
    let handler = StreamHandler::new(&config.stream);
    let events: Vec<StreamEvent> = handler.stream_error(&err.to_string(), "req-1").collect().await;
    let names: Vec<&str> = events.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["error", "done"]);
}

// ---- Maintenance over pipeline-written memories ----

#[tokio::test]
async fn decay_and_compress_run_against_turn_memories() {
    let engine = engine();
    let orch = orchestrator(Arc::clone(&engine), Arc::new(CannedCompletion("ok")));

    for message in [
        "I study compilers at night",
        "I work on the parser team",
        "my name is Quinn",
        "I am based in Lisbon",
        "I usually take the train",
    ] {
        orch.run_turn(&turn("u1", message, false)).await.unwrap();
    }

    let decayed = engine.decay("u1").await.unwrap();
    assert_eq!(decayed.updated, 5);
    assert_eq!(decayed.deleted, 0);

    // Nothing has faded enough yet, so no cluster is eligible.
    let compressed = engine.compress("u1").await.unwrap();
    assert_eq!(compressed.compressed, 0);
    assert_eq!(engine.list_user_memories("u1").await.unwrap().len(), 5);
}
