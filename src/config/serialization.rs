//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render the config as a commented TOML document
    ///
    /// Used for the first-run template, `config --reset` and `config --update`.
    pub fn to_toml(&self) -> String {
        let timeout = match self.request_timeout_secs {
            Some(secs) => format!("request_timeout_secs = {}", secs),
            None => "# request_timeout_secs = 30   # unset/0 = no explicit timeout".to_string(),
        };

        let file_dir = match &self.logging.file_dir {
            Some(dir) => format!("file_dir = \"{}\"", toml_path(dir)),
            None => "# file_dir = \"~/.config/llmscope/logs\"".to_string(),
        };

        format!(
            r#"# llmscope configuration
# Precedence: environment variables > this file > built-in defaults

# Backend root URL (LLMSCOPE_SERVER_URL). /health is served here.
server_url = "{server_url}"

# REST API prefix (LLMSCOPE_API_PREFIX)
api_prefix = "{api_prefix}"

# Header that carries the session id on every call except create/health
session_header = "{session_header}"

# Where the tracked session id is remembered between runs (LLMSCOPE_SESSION_FILE)
session_file = "{session_file}"

{timeout}

# Theme: "dark", "light", "mono" (LLMSCOPE_THEME)
theme = "{theme}"

[polling]
metrics_interval_secs = {metrics_interval}
history_interval_secs = {history_interval}
metrics_event_limit = {metrics_limit}
history_event_limit = {history_limit}

[logging]
# trace, debug, info, warn, error (RUST_LOG overrides)
level = "{level}"
# Rotating JSON log files are written here; unset = no file output
{file_dir}
# hourly, daily, never
file_rotation = "{file_rotation}"
"#,
            server_url = self.server_url,
            api_prefix = self.api_prefix,
            session_header = self.session_header,
            session_file = toml_path(&self.session_file),
            timeout = timeout,
            theme = self.theme,
            metrics_interval = self.polling.metrics_interval_secs,
            history_interval = self.polling.history_interval_secs,
            metrics_limit = self.polling.metrics_event_limit,
            history_limit = self.polling.history_event_limit,
            level = self.logging.level.as_str(),
            file_dir = file_dir,
            file_rotation = self.logging.file_rotation.as_str(),
        )
    }
}

/// Paths go into basic strings, so Windows backslashes must be escaped
fn toml_path(path: &std::path::Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}
