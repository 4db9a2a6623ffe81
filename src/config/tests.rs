//! Configuration tests
//!
//! Guards that the generated template parses back and that precedence
//! (env > file > defaults) holds for every resolved field.

use super::observability::{LogRotation, LogVerbosity};
use super::*;
use std::collections::HashMap;

fn no_env(_: &str) -> Option<String> {
    None
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_roundtrip_default() {
    let config = Config::default();
    let toml_str = config.to_toml();

    let parsed: Result<FileConfig, _> = toml::from_str(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should round-trip.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
}

#[test]
fn test_config_roundtrip_preserves_values() {
    let mut config = Config::default();
    config.server_url = "https://scope.example.com".to_string();
    config.request_timeout_secs = Some(15);
    config.polling.metrics_interval_secs = 7;
    config.logging.file_rotation = LogRotation::Hourly;
    config.logging.level = LogVerbosity::Debug;
    config.logging.file_dir = Some(PathBuf::from("/tmp/llmscope-logs"));

    let file: FileConfig = toml::from_str(&config.to_toml()).unwrap();
    let resolved = Config::resolve(file, no_env);

    assert_eq!(resolved.server_url, "https://scope.example.com");
    assert_eq!(resolved.request_timeout_secs, Some(15));
    assert_eq!(resolved.polling.metrics_interval_secs, 7);
    assert_eq!(resolved.logging.file_rotation, LogRotation::Hourly);
    assert_eq!(resolved.logging.level, LogVerbosity::Debug);
    assert_eq!(
        resolved.logging.file_dir,
        Some(PathBuf::from("/tmp/llmscope-logs"))
    );
    assert_eq!(resolved.session_file, config.session_file);
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_defaults_when_file_and_env_empty() {
    let config = Config::resolve(FileConfig::default(), no_env);

    assert_eq!(config.server_url, "http://localhost:8001");
    assert_eq!(config.api_base(), "http://localhost:8001/api/v1");
    assert_eq!(config.session_header, "X-Session-ID");
    assert_eq!(config.request_timeout(), None);
    assert_eq!(config.polling.metrics_interval_secs, 5);
    assert_eq!(config.polling.history_interval_secs, 10);
    assert_eq!(config.polling.history_event_limit, 50);
    assert_eq!(config.polling.metrics_event_limit, 100);
}

#[test]
fn test_env_overrides_file() {
    let file: FileConfig = toml::from_str(
        r#"
server_url = "http://file-host:9000"
theme = "light"
"#,
    )
    .unwrap();

    let env: HashMap<&str, &str> = [
        ("LLMSCOPE_SERVER_URL", "http://env-host:7000/"),
        ("LLMSCOPE_SESSION_FILE", "/tmp/scope-session.json"),
    ]
    .into_iter()
    .collect();

    let config = Config::resolve(file, |key| env.get(key).map(|v| v.to_string()));

    assert_eq!(config.server_url, "http://env-host:7000/");
    assert_eq!(config.api_base(), "http://env-host:7000/api/v1");
    assert_eq!(config.session_file, PathBuf::from("/tmp/scope-session.json"));
    // Not overridden by env, so file value wins
    assert_eq!(config.theme, "light");
}

#[test]
fn test_zero_timeout_means_none() {
    let file: FileConfig = toml::from_str("request_timeout_secs = 0").unwrap();
    let config = Config::resolve(file, no_env);
    assert_eq!(config.request_timeout(), None);
}

#[test]
fn test_polling_values_are_clamped() {
    let file: FileConfig = toml::from_str(
        r#"
[polling]
metrics_interval_secs = 0
history_event_limit = 500
"#,
    )
    .unwrap();
    let config = Config::resolve(file, no_env);

    assert_eq!(config.polling.metrics_interval_secs, 1);
    assert_eq!(config.polling.history_event_limit, 100);
}

#[test]
fn test_empty_api_prefix() {
    let mut config = Config::default();
    config.api_prefix = String::new();
    assert_eq!(config.api_base(), "http://localhost:8001");
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging section
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_logging_defaults_disable_file_output() {
    let config = Config::resolve(FileConfig::default(), no_env);

    assert_eq!(config.logging.level, LogVerbosity::Info);
    assert_eq!(config.logging.file_dir, None);
    assert_eq!(config.logging.file_rotation, LogRotation::Daily);
    assert_eq!(config.logging.filter_directive(), "llmscope=info");
}

#[test]
fn test_misspelled_rotation_is_rejected() {
    let err = toml::from_str::<FileConfig>(
        r#"
[logging]
file_rotation = "hourley"
"#,
    )
    .unwrap_err()
    .to_string();

    assert!(err.contains("hourley"), "error was: {}", err);
    assert!(err.contains("hourly"), "error was: {}", err);
    assert!(err.contains("never"), "error was: {}", err);
}

#[test]
fn test_unknown_level_is_rejected() {
    let err = toml::from_str::<FileConfig>(
        r#"
[logging]
level = "verbose"
"#,
    )
    .unwrap_err()
    .to_string();

    assert!(err.contains("verbose"), "error was: {}", err);
    assert!(err.contains("debug"), "error was: {}", err);
}

#[test]
fn test_blank_log_dir_counts_as_unset() {
    let file: FileConfig = toml::from_str(
        r#"
[logging]
file_dir = "  "
level = "warn"
"#,
    )
    .unwrap();
    let config = Config::resolve(file, no_env);

    assert_eq!(config.logging.file_dir, None);
    assert_eq!(config.logging.filter_directive(), "llmscope=warn");
}
