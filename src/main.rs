// llmscope - Terminal dashboard for LLM usage sessions
//
// A client for a session-based LLM usage backend: chat in a playground
// session, watch token/cost/latency metrics for it, and browse its events.
//
// Architecture:
// - API client (reqwest): typed calls, session id passed per request
// - Session store: tracks one session id, persisted across runs, self-heals on 404
// - TUI (ratatui): chat panel + tabbed metrics/history panes
// - Pollers (tokio): refresh the active pane, results flow back over mpsc
// - CLI (clap): headless subcommands for scripting and config management

mod api;
mod chat;
mod cli;
mod config;
mod history;
mod logging;
mod metrics;
mod poller;
mod session;
mod theme;
mod tui;

use anyhow::{Context, Result};
use api::ApiClient;
use clap::Parser;
use cli::{Cli, Commands};
use config::{Config, LoggingConfig};
use logging::{LogBuffer, TuiLogLayer};
use session::{FileSessionStore, SessionStore};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config management must work even when the config file is broken
    if let Some(Commands::Config {
        show,
        reset,
        edit,
        update,
        path,
    }) = cli.command
    {
        return cli::handle_config(show, reset, edit, update, path);
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();
    let config = Config::from_env();

    // TUI mode captures logs into a buffer so they don't garble the display
    let tui_mode = cli.command.is_none();
    let log_buffer = LogBuffer::new();

    // Must stay alive for the whole run so buffered file logs get flushed
    let _file_guard = init_tracing(&config.logging, tui_mode.then(|| log_buffer.clone()));

    let client = ApiClient::from_config(&config).context("Failed to build HTTP client")?;
    let persistence = Arc::new(FileSessionStore::new(&config.session_file));
    tracing::debug!(
        "Backend {} (session file {})",
        config.api_base(),
        persistence.path().display()
    );
    let store = SessionStore::new(client, persistence);

    match cli.command {
        None => tui::run_tui(config, store, log_buffer).await,
        Some(command) => cli::run_command(command, &config, store).await,
    }
}

/// Initialize tracing
///
/// - TUI mode (`tui_buffer` set): logs go to the in-memory buffer shown in the logs panel
/// - Headless mode: logs go to stderr, leaving stdout for command output
/// - File logging: optional rotating JSON log files, in addition to the above
///
/// Precedence: RUST_LOG env var > config file > default "info"
fn init_tracing(logging: &LoggingConfig, tui_buffer: Option<LogBuffer>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter_directive().into());

    let (file_layer, guard) = match file_writer(logging) {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    let stderr_layer = tui_buffer.is_none().then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tui_buffer.map(TuiLogLayer::new))
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guard
}

/// Non-blocking rolling file writer, if file logging is enabled and usable
fn file_writer(
    logging: &LoggingConfig,
) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = logging.file_dir.as_deref()?;

    if let Err(e) = std::fs::create_dir_all(dir) {
        // Fall back to non-file logging
        eprintln!("Warning: Could not create log directory {:?}: {}", dir, e);
        return None;
    }

    Some(tracing_appender::non_blocking(
        logging.file_rotation.appender(dir),
    ))
}
