//! Flowdoc CLI - document management dashboard for the terminal.
//!
//! Log in, upload documents, browse recent uploads and see aggregate
//! statistics against a Flowdoc backend.

mod cli;
mod commands;
mod render;

use std::io;

use anyhow::Result;
use clap::Parser;
use flowdoc_core::{ApiClient, Config, Session};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;
use commands::App;

/// Exit status after a second Ctrl+C
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// First Ctrl+C cancels the in-flight request; a second one exits.
fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        eprintln!("Cancelling...");
        cancel.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }
    debug!(base_url = %config.base_url, store = ?config.token_store, "Configuration loaded");

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let api = ApiClient::from_config(&config)?.with_cancellation(cancel);
    let session = Session::from_config(&config)?;

    let mut app = App {
        config,
        session,
        api,
    };

    let result = commands::run(&mut app, cli.command).await;
    info!(ok = result.is_ok(), "Command finished");
    result
}
