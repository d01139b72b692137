// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply streaming as an ordered SSE event sequence.
//!
//! A finished reply is replayed as: one `start` event (usage + identifiers),
//! zero or more `tool_call` events, the reply in small word-count chunks
//! paced by a configurable delay, then a terminal `done`. Cancellation is
//! checked before each chunk; once observed, nothing further is emitted.
//! An abandoned stream is dropped, not buffered.

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use futures::stream::{self, Stream};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use mnemo_config::StreamConfig;
use mnemo_core::types::{ToolEvent, UsageEstimate};

/// One event in the reply stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Start {
        request_id: String,
        conversation_id: String,
        usage: UsageEstimate,
    },
    ToolCall(ToolEvent),
    Token {
        text: String,
    },
    Done {
        request_id: String,
        conversation_id: String,
    },
    Error {
        request_id: String,
        message: String,
    },
}

impl StreamEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::Start { .. } => "start",
            StreamEvent::ToolCall(_) => "tool_call",
            StreamEvent::Token { .. } => "token",
            StreamEvent::Done { .. } => "done",
            StreamEvent::Error { .. } => "error",
        }
    }

    /// SSE data payload.
    pub fn data(&self) -> serde_json::Value {
        match self {
            StreamEvent::Start {
                request_id,
                conversation_id,
                usage,
            } => json!({
                "request_id": request_id,
                "conversation_id": conversation_id,
                "usage": usage,
            }),
            StreamEvent::ToolCall(event) => json!({
                "name": event.name,
                "detail": event.detail,
            }),
            StreamEvent::Token { text } => json!({ "text": text }),
            StreamEvent::Done {
                request_id,
                conversation_id,
            } => json!({
                "request_id": request_id,
                "conversation_id": conversation_id,
            }),
            StreamEvent::Error {
                request_id,
                message,
            } => json!({
                "request_id": request_id,
                "message": message,
            }),
        }
    }

    /// Renders the event in SSE wire format.
    pub fn to_sse(&self) -> String {
        format!("event: {}\ndata: {}\n\n", self.name(), self.data())
    }
}

/// Splits a reply into chunks of `chunk_words` whitespace-separated words.
/// Each chunk keeps a trailing space so concatenation reconstructs the
/// word sequence.
pub fn chunk_text_words(text: &str, chunk_words: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }
    words
        .chunks(chunk_words.max(1))
        .map(|chunk| {
            let mut joined = chunk.join(" ");
            joined.push(' ');
            joined
        })
        .collect()
}

enum StreamPhase {
    Head,
    Chunks { first: bool },
    Done,
    Finished,
}

struct StreamState {
    head: VecDeque<StreamEvent>,
    chunks: std::vec::IntoIter<String>,
    terminal: Option<StreamEvent>,
    delay: Duration,
    cancel: CancellationToken,
    phase: StreamPhase,
}

/// Replays finished replies as paced SSE event streams.
pub struct StreamHandler {
    chunk_words: usize,
    delay: Duration,
}

impl StreamHandler {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            chunk_words: config.chunk_words,
            delay: Duration::from_millis(config.delay_ms),
        }
    }

    /// Streams one finished reply.
    ///
    /// The returned stream stops immediately, without a `done` event, when
    /// `cancel` fires; the consumer is gone and nobody reads a farewell.
    pub fn stream(
        &self,
        reply: &str,
        request_id: &str,
        conversation_id: &str,
        usage: UsageEstimate,
        tool_events: Vec<ToolEvent>,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Stream<Item = StreamEvent> + Send>> {
        let mut head = VecDeque::new();
        head.push_back(StreamEvent::Start {
            request_id: request_id.to_string(),
            conversation_id: conversation_id.to_string(),
            usage,
        });
        for event in tool_events {
            head.push_back(StreamEvent::ToolCall(event));
        }

        let state = StreamState {
            head,
            chunks: chunk_text_words(reply, self.chunk_words).into_iter(),
            terminal: Some(StreamEvent::Done {
                request_id: request_id.to_string(),
                conversation_id: conversation_id.to_string(),
            }),
            delay: self.delay,
            cancel,
            phase: StreamPhase::Head,
        };

        Box::pin(stream::unfold(state, |mut state| async move {
            loop {
                match state.phase {
                    StreamPhase::Head => {
                        if let Some(event) = state.head.pop_front() {
                            return Some((event, state));
                        }
                        state.phase = StreamPhase::Chunks { first: true };
                    }
                    StreamPhase::Chunks { first } => {
                        if state.cancel.is_cancelled() {
                            state.phase = StreamPhase::Finished;
                            return None;
                        }
                        match state.chunks.next() {
                            Some(text) => {
                                if !first && !state.delay.is_zero() {
                                    tokio::select! {
                                        _ = state.cancel.cancelled() => {
                                            state.phase = StreamPhase::Finished;
                                            return None;
                                        }
                                        _ = tokio::time::sleep(state.delay) => {}
                                    }
                                }
                                state.phase = StreamPhase::Chunks { first: false };
                                return Some((StreamEvent::Token { text }, state));
                            }
                            None => state.phase = StreamPhase::Done,
                        }
                    }
                    StreamPhase::Done => {
                        state.phase = StreamPhase::Finished;
                        if let Some(event) = state.terminal.take() {
                            return Some((event, state));
                        }
                    }
                    StreamPhase::Finished => return None,
                }
            }
        }))
    }

    /// Emits the error sequence for a turn that failed before streaming:
    /// an `error` event followed by `done`.
    pub fn stream_error(
        &self,
        message: &str,
        request_id: &str,
    ) -> Pin<Box<dyn Stream<Item = StreamEvent> + Send>> {
        Box::pin(stream::iter(vec![
            StreamEvent::Error {
                request_id: request_id.to_string(),
                message: message.to_string(),
            },
            StreamEvent::Done {
                request_id: request_id.to_string(),
                conversation_id: String::new(),
            },
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn handler(delay_ms: u64) -> StreamHandler {
        StreamHandler::new(&StreamConfig {
            chunk_words: 3,
            delay_ms,
        })
    }

    fn tool_event() -> ToolEvent {
        ToolEvent {
            name: "calculator".to_string(),
            detail: json!({"expression": "6*7"}),
        }
    }

    #[test]
    fn chunking_preserves_words() {
        let chunks = chunk_text_words("one two three four five six seven", 3);
        assert_eq!(chunks, vec!["one two three ", "four five six ", "seven "]);
        let rebuilt: String = chunks.concat();
        assert_eq!(rebuilt.split_whitespace().count(), 7);
    }

    #[test]
    fn chunking_empty_and_zero_width() {
        assert!(chunk_text_words("", 3).is_empty());
        assert!(chunk_text_words("   ", 3).is_empty());
        // A zero chunk size is floored to one word per chunk.
        assert_eq!(chunk_text_words("a b", 0), vec!["a ", "b "]);
    }

    #[test]
    fn sse_wire_format() {
        let event = StreamEvent::Token {
            text: "hello ".to_string(),
        };
        assert_eq!(event.to_sse(), "event: token\ndata: {\"text\":\"hello \"}\n\n");
    }

    #[tokio::test(start_paused = true)]
    async fn event_order_is_start_tools_tokens_done() {
        let events: Vec<StreamEvent> = handler(12)
            .stream(
                "the answer is forty two",
                "req-1",
                "c1",
                UsageEstimate::default(),
                vec![tool_event()],
                CancellationToken::new(),
            )
            .collect()
            .await;

        assert_eq!(events[0].name(), "start");
        assert_eq!(events[1].name(), "tool_call");
        let names: Vec<&str> = events.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["start", "tool_call", "token", "token", "done"]);

        let text: String = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::Token { text } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(text.trim_end(), "the answer is forty two");
    }

    #[tokio::test]
    async fn start_carries_usage_and_identifiers() {
        let usage = UsageEstimate {
            input_tokens_est: 10,
            output_tokens_est: 5,
            cost_est_usd: 0.0000125,
            llm_latency_ms: 42.0,
        };
        let events: Vec<StreamEvent> = handler(0)
            .stream("ok", "req-9", "c7", usage, vec![], CancellationToken::new())
            .collect()
            .await;

        let data = events[0].data();
        assert_eq!(data["request_id"], "req-9");
        assert_eq!(data["conversation_id"], "c7");
        assert_eq!(data["usage"]["input_tokens_est"], 10);
        assert_eq!(events.last().unwrap().name(), "done");
    }

    #[tokio::test]
    async fn cancellation_stops_before_any_chunk() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let events: Vec<StreamEvent> = handler(0)
            .stream(
                "this text never streams",
                "req-1",
                "c1",
                UsageEstimate::default(),
                vec![tool_event()],
                cancel,
            )
            .collect()
            .await;

        // Head events are already queued, but no token and no done follows.
        let names: Vec<&str> = events.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["start", "tool_call"]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_mid_stream_stops_without_done() {
        let cancel = CancellationToken::new();
        let mut stream = handler(12).stream(
            "one two three four five six seven eight nine",
            "req-1",
            "c1",
            UsageEstimate::default(),
            vec![],
            cancel.clone(),
        );

        assert_eq!(stream.next().await.unwrap().name(), "start");
        assert_eq!(stream.next().await.unwrap().name(), "token");
        cancel.cancel();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn error_sequence_is_error_then_done() {
        let events: Vec<StreamEvent> = handler(0)
            .stream_error("completion failed", "req-1")
            .collect()
            .await;
        let names: Vec<&str> = events.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["error", "done"]);
        assert_eq!(events[0].data()["message"], "completion failed");
    }
}
