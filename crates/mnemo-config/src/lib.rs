// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration for the Mnemo memory engine and orchestrator.
//!
//! Compiled defaults are merged with an optional `mnemo.toml` and `MNEMO_*`
//! environment variables. Every knob has a sensible default so an empty
//! deployment runs unchanged.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{LlmConfig, MemoryConfig, MnemoConfig, RankingConfig, StreamConfig};
