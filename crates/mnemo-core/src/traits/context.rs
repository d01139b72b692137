// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context source traits consumed by the orchestration pipeline.
//!
//! Each source follows empty-string-on-nothing-found semantics: a source
//! with no contribution returns `Ok(String::new())`, and the builder treats
//! a failed source the same way after logging it.

use async_trait::async_trait;

use crate::error::MnemoError;
use crate::types::{ToolAgentReply, ToolDescriptor};

/// Deterministic (non-semantic) fact context keyed by owner.
#[async_trait]
pub trait DeterministicFactSource: Send + Sync {
    /// Returns fact context relevant to the message, or empty.
    async fn fact_context(&self, owner: &str, message: &str) -> Result<String, MnemoError>;
}

/// Bounded recent-conversation window for one conversation.
#[async_trait]
pub trait RecencySource: Send + Sync {
    /// Returns the rendered recent window, or empty for a fresh conversation.
    async fn recent_window(&self, conversation_id: &str) -> Result<String, MnemoError>;
}

/// Live/external data snippets for turns that need fresh information.
#[async_trait]
pub trait LiveDataSource: Send + Sync {
    /// Cheap predicate deciding whether this turn needs fresh data at all.
    fn wants_live_data(&self, message: &str) -> bool;

    /// Fetches live context for the message, or empty.
    async fn live_context(&self, message: &str) -> Result<String, MnemoError>;
}

/// Tool agent collaborator that may answer a turn outright.
#[async_trait]
pub trait ToolAgent: Send + Sync {
    /// Runs the tool agent for the message. An empty reply means the agent
    /// declined and the normal prompt path should run.
    async fn run(&self, message: &str) -> Result<ToolAgentReply, MnemoError>;
}

/// Registry of tools advertised to the model as capability hints.
pub trait ToolHintSource: Send + Sync {
    /// Lists available tools. An empty list produces no hint block.
    fn list_tools(&self) -> Vec<ToolDescriptor>;
}

/// Post-processing applied to every reply before it leaves the pipeline.
pub trait ReplySanitizer: Send + Sync {
    /// Sanitizes a raw reply in the context of the user message.
    fn sanitize(&self, user_message: &str, reply: &str) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoSanitizer;

    impl ReplySanitizer for EchoSanitizer {
        fn sanitize(&self, _user_message: &str, reply: &str) -> String {
            reply.trim().to_string()
        }
    }

    struct NoTools;

    impl ToolHintSource for NoTools {
        fn list_tools(&self) -> Vec<ToolDescriptor> {
            Vec::new()
        }
    }

    #[test]
    fn sanitizer_is_object_safe() {
        let sanitizer: Box<dyn ReplySanitizer> = Box::new(EchoSanitizer);
        assert_eq!(sanitizer.sanitize("hi", "  hello  "), "hello");
    }

    #[test]
    fn tool_hint_source_is_object_safe() {
        let registry: Box<dyn ToolHintSource> = Box::new(NoTools);
        assert!(registry.list_tools().is_empty());
    }
}
