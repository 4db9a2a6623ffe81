//! Configuration for the dashboard client
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/llmscope/config.toml)
//! 3. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod observability;
mod polling;
mod serialization;

#[cfg(test)]
mod tests;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (maintain public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use observability::{FileLogging, LoggingConfig};
pub use polling::{FilePolling, PollingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_SERVER_URL: &str = "http://localhost:8001";
const DEFAULT_API_PREFIX: &str = "/api/v1";
const DEFAULT_SESSION_HEADER: &str = "X-Session-ID";
const DEFAULT_THEME: &str = "dark";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend root URL (health is served here, the API under `api_prefix`)
    pub server_url: String,

    /// Path prefix for the REST API
    pub api_prefix: String,

    /// Header carrying the session identifier
    pub session_header: String,

    /// Where the tracked session record is persisted
    pub session_file: PathBuf,

    /// Request timeout in seconds (None = transport default, no explicit timeout)
    pub request_timeout_secs: Option<u64>,

    /// Theme name: "dark", "light", "mono"
    pub theme: String,

    /// Polling intervals and fetch limits
    pub polling: PollingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            session_header: DEFAULT_SESSION_HEADER.to_string(),
            session_file: Self::default_session_file(),
            request_timeout_secs: None,
            theme: DEFAULT_THEME.to_string(),
            polling: PollingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure (subset of Config that makes sense to persist)
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub server_url: Option<String>,
    pub api_prefix: Option<String>,
    pub session_header: Option<String>,
    pub session_file: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub theme: Option<String>,

    /// Optional [polling] section
    pub polling: Option<FilePolling>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config directory: ~/.config/llmscope
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("llmscope"))
    }

    /// Get the config file path: ~/.config/llmscope/config.toml
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    fn default_session_file() -> PathBuf {
        Self::config_dir()
            .map(|p| p.join("session.json"))
            .unwrap_or_else(|| PathBuf::from("./llmscope-session.json"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// # Panics
    /// Exits the process if the config file exists but cannot be parsed or read.
    /// A broken config should fail fast instead of silently falling back to defaults.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                    eprintln!("║  CONFIG ERROR - Failed to parse configuration file          ║");
                    eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  To reset, run `llmscope config --reset`.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                eprintln!("║  CONFIG ERROR - Cannot read configuration file              ║");
                eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars -> file -> defaults
    pub fn from_env() -> Self {
        Self::resolve(Self::load_file_config(), |key| std::env::var(key).ok())
    }

    /// Merge a parsed file config with an environment lookup
    pub(crate) fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let server_url = env("LLMSCOPE_SERVER_URL")
            .or(file.server_url)
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let api_prefix = env("LLMSCOPE_API_PREFIX")
            .or(file.api_prefix)
            .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string());

        let session_header = file
            .session_header
            .unwrap_or_else(|| DEFAULT_SESSION_HEADER.to_string());

        let session_file = env("LLMSCOPE_SESSION_FILE")
            .or(file.session_file)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_session_file);

        // 0 in the file means "no explicit timeout"
        let request_timeout_secs = file.request_timeout_secs.filter(|secs| *secs > 0);

        let theme = env("LLMSCOPE_THEME")
            .or(file.theme)
            .unwrap_or_else(|| DEFAULT_THEME.to_string());

        Self {
            server_url,
            api_prefix,
            session_header,
            session_file,
            request_timeout_secs,
            theme,
            polling: PollingConfig::from_file(file.polling),
            logging: LoggingConfig::from_file(file.logging),
        }
    }

    /// Full base URL for API calls, e.g. `http://localhost:8001/api/v1`
    pub fn api_base(&self) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            self.api_prefix.trim_matches('/')
        )
        .trim_end_matches('/')
        .to_string()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
