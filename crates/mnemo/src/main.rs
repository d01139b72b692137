// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mnemo - semantic memory and context orchestration for LLM assistants.
//!
//! Binary entry point. The interesting machinery lives in the library
//! crates; this wires them together for local use.

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;

use mnemo_config::MnemoConfig;
use mnemo_core::error::MnemoError;
use mnemo_core::traits::CompletionAdapter;
use mnemo_memory::{HashEmbedder, InMemoryVectorStore, SemanticMemoryEngine};
use mnemo_orchestrator::{
    ChatOrchestrator, ContextBuilder, RetryingCompletion, StreamEvent, StreamHandler, TurnInput,
};

/// Mnemo - semantic memory engine with a local shell.
#[derive(Parser, Debug)]
#[command(name = "mnemo", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive memory shell.
    Shell {
        /// Owner namespace for memories written in this session.
        #[arg(long, default_value = "local")]
        owner: String,
    },
    /// Print the effective merged configuration.
    Config,
}

/// Completion adapter used when no real provider is wired in.
///
/// Echoes the user message so the memory and streaming paths can be
/// exercised offline; a deployment implements [`CompletionAdapter`] against
/// its provider of choice instead.
struct OfflineCompletion;

#[async_trait]
impl CompletionAdapter for OfflineCompletion {
    async fn complete(&self, prompt: &str, _timeout: Duration) -> Result<String, MnemoError> {
        let message = prompt
            .rsplit("User message:\n")
            .next()
            .unwrap_or_default()
            .trim();
        Ok(format!("(offline) noted: {message}"))
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mnemo=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let config = match mnemo_config::load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("mnemo: failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Shell { owner }) => {
            if let Err(e) = run_shell(&config, &owner).await {
                eprintln!("mnemo: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match serde_json::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("mnemo: failed to render configuration: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("mnemo: use --help for available commands");
        }
    }
}

async fn run_shell(config: &MnemoConfig, owner: &str) -> Result<(), MnemoError> {
    let engine = Arc::new(SemanticMemoryEngine::new(
        config,
        Arc::new(HashEmbedder::new(config.memory.embedding_dims)),
        Arc::new(InMemoryVectorStore::new()),
    ));
    let completion = Arc::new(RetryingCompletion::new(
        Arc::new(OfflineCompletion),
        &config.llm,
    ));
    let orchestrator = ChatOrchestrator::new(
        config,
        Arc::clone(&engine),
        ContextBuilder::new(Arc::clone(&engine)),
        completion,
    );
    let stream_handler = StreamHandler::new(&config.stream);
    let conversation_id = uuid::Uuid::new_v4().to_string();

    info!(owner, conversation_id, "memory shell started");
    println!("mnemo shell - type a message, or 'exit' to quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let Some(line) = lines.next_line().await.map_err(MnemoError::store)? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message == "exit" {
            break;
        }

        let turn = TurnInput {
            owner_id: owner.to_string(),
            conversation_id: conversation_id.clone(),
            message: message.to_string(),
            use_tools: false,
            scope_hint: None,
        };

        let request_id = uuid::Uuid::new_v4().to_string();
        let mut events = match orchestrator.run_turn(&turn).await {
            Ok(result) => stream_handler.stream(
                &result.reply,
                &request_id,
                &conversation_id,
                result.usage,
                result.tool_events,
                CancellationToken::new(),
            ),
            Err(e) => stream_handler.stream_error(&e.to_string(), &request_id),
        };

        while let Some(event) = events.next().await {
            match event {
                StreamEvent::Token { text } => {
                    print!("{text}");
                    let _ = std::io::stdout().flush();
                }
                StreamEvent::Error { message, .. } => {
                    eprintln!("turn failed: {message}");
                }
                StreamEvent::Done { .. } => println!(),
                _ => {}
            }
        }
    }

    println!("bye");
    Ok(())
}
