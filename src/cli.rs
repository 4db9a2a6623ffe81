// CLI module - command-line argument parsing and handlers
//
// With no subcommand the TUI dashboard starts. Subcommands run headless:
// - health / session / chat / events / chart: one-shot backend queries
// - config --show/--path/--reset/--edit/--update: config file management

use crate::api::{ApiClient, RequestContext};
use crate::chat::ChatLog;
use crate::config::{Config, VERSION};
use crate::metrics::{bucket_events, Granularity, MetricsSummary};
use crate::session::SessionStore;
use crate::tui::components::formatters::{
    format_cost, format_event_cost, format_latency, format_number, truncate_to_width,
};
use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::process::Command;

/// llmscope - Terminal dashboard for LLM usage sessions
#[derive(Parser)]
#[command(name = "llmscope")]
#[command(version = VERSION)]
#[command(about = "Terminal dashboard for LLM usage sessions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check backend health
    Health,

    /// Inspect or manage the tracked session
    Session {
        #[command(subcommand)]
        action: Option<SessionAction>,
    },

    /// Send one chat message in the tracked session
    Chat {
        /// Message text
        message: String,
    },

    /// List recent events for the tracked session
    Events {
        /// Number of events to fetch
        #[arg(long, short)]
        limit: Option<u32>,
    },

    /// Print token usage bucketed by time
    Chart {
        /// minute, hour or day
        #[arg(long, short, default_value = "minute", value_parser = parse_granularity)]
        granularity: Granularity,

        /// Number of events to bucket
        #[arg(long, short)]
        limit: Option<u32>,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Update config with new defaults (preserves user values)
        #[arg(long)]
        update: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Show info and metrics for the tracked session (default)
    Show,
    /// Create a fresh session and track it
    New,
    /// Zero the tracked session's counters (id is kept)
    Reset,
    /// Stop tracking the session locally
    Forget,
    /// Look up any session by id without tracking it
    Get {
        /// Session id
        id: String,
    },
}

fn parse_granularity(s: &str) -> Result<Granularity, String> {
    Granularity::parse(s).ok_or_else(|| format!("unknown granularity '{}' (minute, hour, day)", s))
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend commands
// ─────────────────────────────────────────────────────────────────────────────

/// Run a headless backend command
pub async fn run_command(command: Commands, config: &Config, store: SessionStore) -> Result<()> {
    match command {
        Commands::Health => handle_health(store.client()).await,
        Commands::Session { action } => {
            handle_session(action.unwrap_or(SessionAction::Show), &store).await
        }
        Commands::Chat { message } => handle_chat(&store, &message).await,
        Commands::Events { limit } => {
            let limit = limit.unwrap_or(config.polling.history_event_limit);
            handle_events(&store, limit).await
        }
        Commands::Chart { granularity, limit } => {
            let limit = limit.unwrap_or(config.polling.metrics_event_limit);
            handle_chart(&store, granularity, limit).await
        }
        Commands::Config {
            show,
            reset,
            edit,
            update,
            path,
        } => handle_config(show, reset, edit, update, path),
    }
}

async fn handle_health(client: &ApiClient) -> Result<()> {
    let health = client
        .health()
        .await
        .context("Backend health check failed")?;

    println!("status:   {}", health.status);
    println!("database: {}", health.database);
    println!("sessions: {}", format_number(health.sessions));
    println!("events:   {}", format_number(health.events));
    Ok(())
}

async fn handle_session(action: SessionAction, store: &SessionStore) -> Result<()> {
    match action {
        SessionAction::Show => {
            store.initialize().await;
            print_session(store)
        }
        SessionAction::New => {
            store.create_new_session().await?;
            print_session(store)
        }
        SessionAction::Reset => {
            if store.session_id().is_none() {
                bail!("No tracked session to reset");
            }
            store.reset_session().await?;
            println!("Session reset.");
            print_session(store)
        }
        SessionAction::Forget => {
            store.forget()?;
            println!("Forgot tracked session.");
            Ok(())
        }
        SessionAction::Get { id } => {
            let info = store.client().session_by_id(&id).await?;
            println!("session:  {}", info.session_id);
            println!(
                "created:  {}",
                info.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            );
            println!(
                "active:   {}",
                info.last_activity.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            );
            println!("events:   {}", format_number(info.event_count));
            println!("tokens:   {}", format_number(info.total_tokens));
            println!("cost:     {}", format_cost(info.total_cost));
            Ok(())
        }
    }
}

fn print_session(store: &SessionStore) -> Result<()> {
    let state = store.snapshot();
    if let Some(error) = state.error {
        bail!(error);
    }
    let Some(id) = state.session_id else {
        bail!("No session");
    };

    println!("session:  {}", id);
    if let Some(info) = &state.info {
        println!(
            "created:  {}",
            info.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        );
        println!(
            "active:   {}",
            info.last_activity.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        );
    }
    if let Some(metrics) = &state.metrics {
        println!("events:   {}", format_number(metrics.event_count));
        println!("tokens:   {}", format_number(metrics.total_tokens));
        println!("cost:     {}", format_cost(metrics.total_cost));
        if !metrics.models_used.is_empty() {
            println!("models:   {}", metrics.models_used.join(", "));
        }
    }
    Ok(())
}

/// Bootstrap the session the same way the dashboard does, then return its id
async fn ready_session(store: &SessionStore) -> Result<RequestContext> {
    store.initialize().await;
    let state = store.snapshot();
    match state.session_id {
        Some(id) => Ok(RequestContext::new(id)),
        None => bail!(state.error.unwrap_or_else(|| "No session".to_string())),
    }
}

async fn handle_chat(store: &SessionStore, message: &str) -> Result<()> {
    let ctx = ready_session(store).await?;
    let mut log = ChatLog::new();

    if !log.send(store.client(), &ctx, message).await {
        bail!("Message is empty");
    }
    if let Some(reply) = log.messages().last() {
        println!("{}", reply.content);
        if reply.is_error {
            std::process::exit(1);
        }
    }
    Ok(())
}

async fn handle_events(store: &SessionStore, limit: u32) -> Result<()> {
    let ctx = ready_session(store).await?;
    let events = store
        .client()
        .recent_events(&ctx, limit)
        .await
        .context("Failed to load event history")?;

    if events.is_empty() {
        println!("No events yet.");
        return Ok(());
    }

    println!(
        "{:<19}  {:<24}  {:<10}  {:>13}  {:>9}  {:>8}  STATUS",
        "TIME", "MODEL", "PROVIDER", "TOKENS", "COST", "LATENCY"
    );
    for event in &events {
        println!(
            "{:<19}  {:<24}  {:<10}  {:>13}  {:>9}  {:>8}  {}",
            event
                .time
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S"),
            truncate_to_width(&event.model, 24),
            truncate_to_width(&event.provider, 10),
            format!(
                "{}/{}",
                format_number(event.tokens_prompt),
                format_number(event.tokens_completion)
            ),
            format_event_cost(event.cost_usd),
            format_latency(event.latency_ms),
            event.status,
        );
    }
    Ok(())
}

async fn handle_chart(store: &SessionStore, granularity: Granularity, limit: u32) -> Result<()> {
    let ctx = ready_session(store).await?;
    let events = store.client().recent_events(&ctx, limit).await?;
    let points = bucket_events(&events, granularity);

    if points.is_empty() {
        println!("No events yet.");
        return Ok(());
    }

    const BAR_WIDTH: u64 = 40;
    let max = points.iter().map(|p| p.tokens).max().unwrap_or(0).max(1);
    let label_width = points.iter().map(|p| p.label.len()).max().unwrap_or(0);

    println!("Token usage per {}", granularity);
    for point in &points {
        let bar = "█".repeat((point.tokens * BAR_WIDTH / max) as usize);
        println!(
            "{:<width$}  {:<bar_width$}  {}",
            point.label,
            bar,
            format_number(point.tokens),
            width = label_width,
            bar_width = BAR_WIDTH as usize,
        );
    }

    let summary = MetricsSummary::from_events(&events);
    println!();
    println!(
        "avg latency {:.0}ms · {} errors · {} tokens · {}",
        summary.avg_latency_ms,
        summary.error_count,
        format_number(summary.window_tokens),
        format_cost(summary.window_cost)
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Config commands
// ─────────────────────────────────────────────────────────────────────────────

/// Config management runs before the config is loaded, so a broken file can be reset
pub fn handle_config(show: bool, reset: bool, edit: bool, update: bool, path: bool) -> Result<()> {
    if path {
        handle_config_path()
    } else if show {
        handle_config_show();
        Ok(())
    } else if reset {
        handle_config_reset()
    } else if edit {
        handle_config_edit()
    } else if update {
        handle_config_update()
    } else {
        // No flag provided, show help
        println!("Usage: llmscope config [--show|--reset|--edit|--update|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --edit    Open config file in $EDITOR");
        println!("  --update  Update config with new defaults (preserves user values)");
        println!("  --path    Show config file path");
        Ok(())
    }
}

fn config_path() -> Result<std::path::PathBuf> {
    Config::config_path().context("Could not determine config path")
}

fn handle_config_path() -> Result<()> {
    println!("{}", config_path()?.display());
    Ok(())
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() -> Result<()> {
    let path = config_path()?;

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Error creating config directory")?;
    }

    std::fs::write(&path, Config::default().to_toml()).context("Error writing config")?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

fn handle_config_edit() -> Result<()> {
    let path = config_path()?;

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    let status = Command::new(&editor).arg(&path).status().with_context(|| {
        format!(
            "Failed to launch editor '{}'. Set $EDITOR to your preferred editor",
            editor
        )
    })?;

    if !status.success() {
        bail!("Editor exited with status: {}", status);
    }
    Ok(())
}

fn handle_config_update() -> Result<()> {
    let path = config_path()?;

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
        return Ok(());
    }

    // Re-render the effective config with the current template
    let updated = Config::from_env().to_toml();

    let backup_path = path.with_extension("toml.bak");
    match std::fs::copy(&path, &backup_path) {
        Ok(_) => println!("Backup created: {}", backup_path.display()),
        Err(e) => eprintln!("Warning: Could not create backup: {}", e),
    }

    std::fs::write(&path, updated).context("Error writing config")?;

    println!("Config updated with latest structure: {}", path.display());
    println!("Your values have been preserved.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_dashboard() {
        let cli = Cli::try_parse_from(["llmscope"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_chart_granularity_parses() {
        let cli = Cli::try_parse_from(["llmscope", "chart", "--granularity", "hour"]).unwrap();
        match cli.command {
            Some(Commands::Chart { granularity, limit }) => {
                assert_eq!(granularity, Granularity::Hour);
                assert_eq!(limit, None);
            }
            _ => panic!("expected chart command"),
        }
    }

    #[test]
    fn test_unknown_granularity_rejected() {
        assert!(Cli::try_parse_from(["llmscope", "chart", "-g", "week"]).is_err());
    }

    #[test]
    fn test_session_get_takes_id() {
        let cli = Cli::try_parse_from(["llmscope", "session", "get", "abc-123"]).unwrap();
        match cli.command {
            Some(Commands::Session {
                action: Some(SessionAction::Get { id }),
            }) => assert_eq!(id, "abc-123"),
            _ => panic!("expected session get"),
        }
    }
}
