// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mnemo memory engine.

use thiserror::Error;

/// The primary error type used across all Mnemo adapter traits and engine operations.
#[derive(Debug, Error)]
pub enum MnemoError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Vector store backend errors (connection, query failure, serialization).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Embedding provider errors (model failure, dimension mismatch).
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Completion client errors (API failure, exhausted retries).
    #[error("completion error: {message}")]
    Completion {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MnemoError {
    /// Wraps an arbitrary error as a store error.
    pub fn store(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        MnemoError::Store {
            source: Box::new(source),
        }
    }

    /// Builds an embedding error from a message alone.
    pub fn embedding(message: impl Into<String>) -> Self {
        MnemoError::Embedding {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a completion error from a message alone.
    pub fn completion(message: impl Into<String>) -> Self {
        MnemoError::Completion {
            message: message.into(),
            source: None,
        }
    }
}
