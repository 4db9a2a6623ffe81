//! Logging configuration: filter level and optional rotating JSON log files
//!
//! Both enums deserialize straight from their lowercase names, so a typo in
//! `[logging]` is a parse error that lists the accepted values instead of a
//! silent fallback.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{self, RollingFileAppender};

/// File name prefix; the appender adds the date/hour suffix
const LOG_FILE_PREFIX: &str = "llmscope.log";

/// Level applied to the crate's own events when `RUST_LOG` is unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogVerbosity {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogVerbosity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// How often the JSON log file rolls over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

impl LogRotation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }

    /// Appender writing `llmscope.log[.<period>]` into `dir`
    pub fn appender(self, dir: &Path) -> RollingFileAppender {
        match self {
            Self::Hourly => rolling::hourly(dir, LOG_FILE_PREFIX),
            Self::Daily => rolling::daily(dir, LOG_FILE_PREFIX),
            Self::Never => rolling::never(dir, LOG_FILE_PREFIX),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub level: LogVerbosity,
    /// JSON log file directory; `None` disables file output
    pub file_dir: Option<PathBuf>,
    pub file_rotation: LogRotation,
}

/// `[logging]` as written in the config file
#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<LogVerbosity>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<LogRotation>,
}

impl LoggingConfig {
    /// An empty `file_dir` counts as unset
    pub fn from_file(file: Option<FileLogging>) -> Self {
        let file = file.unwrap_or_default();
        Self {
            level: file.level.unwrap_or_default(),
            file_dir: file
                .file_dir
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            file_rotation: file.file_rotation.unwrap_or_default(),
        }
    }

    /// Default `EnvFilter` directive, scoped to this crate
    pub fn filter_directive(&self) -> String {
        format!("llmscope={}", self.level.as_str())
    }
}
