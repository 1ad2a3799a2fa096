//! # Quote Desk CLI (`qd`)
//!
//! ## Usage
//!
//! ```bash
//! qd [--config ./qd.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `qd load <paths…>` | Load documents and print the status line |
//! | `qd ask --load <path> "<message>"` | Load, then answer one message |
//! | `qd chat [--load <path>]` | Interactive chat on stdin |
//! | `qd serve` | Start the HTTP server |
//!
//! Answers go to stdout. Logs go to stderr and are controlled by `RUST_LOG`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use quote_desk::config::{load_config, Config};
use quote_desk::embedding::create_provider;
use quote_desk::models::Turn;
use quote_desk::server::run_server;
use quote_desk::session::Session;

/// Quote Desk: answers price and delivery questions from plain-text quotes.
#[derive(Parser)]
#[command(name = "qd", version)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load documents and report how many chunks were indexed.
    Load {
        /// Files or directories to load.
        paths: Vec<PathBuf>,
    },

    /// Load documents, then answer a single message.
    Ask {
        /// File or directory to load (repeatable).
        #[arg(long = "load")]
        load: Vec<PathBuf>,

        /// The question, e.g. "What is the price for 150 units of Product Y?".
        message: String,
    },

    /// Interactive chat session on stdin.
    ///
    /// Lines starting with `/` are commands: `/load <paths…>`, `/clear`,
    /// `/history`, `/quit`.
    Chat {
        /// File or directory to load before the first prompt (repeatable).
        #[arg(long = "load")]
        load: Vec<PathBuf>,
    },

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quote_desk=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::minimal(),
    };
    let provider = create_provider(&cfg.embedding).context("Failed to create embedding provider")?;
    let session = Session::new(cfg, provider)?;

    match cli.command {
        Commands::Load { paths } => {
            println!("{}", session.load(&paths).await);
        }
        Commands::Ask { load, message } => {
            if !load.is_empty() {
                eprintln!("{}", session.load(&load).await);
            }
            let history = session.chat(&message, &[]).await;
            if let Some(turn) = history.last() {
                println!("{}", turn.assistant);
            }
        }
        Commands::Chat { load } => {
            if !load.is_empty() {
                println!("{}", session.load(&load).await);
            }
            run_repl(&session).await?;
        }
        Commands::Serve => {
            run_server(Arc::new(session)).await?;
        }
    }

    Ok(())
}

async fn run_repl(session: &Session) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut history: Vec<Turn> = Vec::new();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let output = match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit" | "/exit", _) => break,
            ("/clear", _) => {
                history.clear();
                "History cleared.".to_string()
            }
            ("/history", _) => format_history(&history),
            ("/load", rest) => {
                let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
                session.load(&paths).await
            }
            _ => {
                history = session.chat(line, &history).await;
                history
                    .last()
                    .map(|turn| turn.assistant.clone())
                    .unwrap_or_default()
            }
        };
        stdout.write_all(format!("{}\n", output).as_bytes()).await?;
    }

    Ok(())
}

fn format_history(history: &[Turn]) -> String {
    if history.is_empty() {
        return "(no messages yet)".to_string();
    }
    history
        .iter()
        .map(|turn| format!("you: {}\nbot: {}", turn.user, turn.assistant))
        .collect::<Vec<_>>()
        .join("\n")
}
