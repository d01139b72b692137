// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order: compiled defaults < `mnemo.toml` in the working directory
//! < `MNEMO_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::MnemoConfig;

/// Load configuration from the local directory with env var overrides.
pub fn load_config() -> Result<MnemoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemoConfig::default()))
        .merge(Toml::file("mnemo.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from an inline TOML string only (no env lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<MnemoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MnemoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `MNEMO_MEMORY_ARCHIVE_THRESHOLD` must map to
/// `memory.archive_threshold`, not `memory.archive.threshold`.
fn env_provider() -> Env {
    Env::prefixed("MNEMO_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("memory_", "memory.", 1)
            .replacen("ranking_", "ranking.", 1)
            .replacen("llm_", "llm.", 1)
            .replacen("stream_", "stream.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert!(config.memory.enabled);
        assert_eq!(config.memory.semantic_top_k, 12);
        assert!((config.ranking.similarity - 0.60).abs() < f64::EPSILON);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [memory]
            semantic_top_k = 5
            archive_threshold = 0.25

            [ranking]
            similarity = 1.0
            importance = 1.0
            recency = 1.0

            [stream]
            chunk_words = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.memory.semantic_top_k, 5);
        assert!((config.memory.archive_threshold - 0.25).abs() < f64::EPSILON);
        assert!((config.ranking.similarity - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.stream.chunk_words, 7);
        // Untouched sections keep their defaults.
        assert_eq!(config.llm.timeout_secs, 30);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result = load_config_from_str(
            r#"
            [memory]
            no_such_knob = true
            "#,
        );
        assert!(result.is_err());
    }
}
