//! Wire types for the backend REST surface
//!
//! Field names follow the backend's snake_case JSON. Numeric counters default
//! to zero when absent so a sparse record still renders.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// `POST /sessions/create`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    #[serde(default)]
    pub message: String,
}

/// `GET /sessions/current/info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub last_activity: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub event_count: u64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub total_cost: f64,
}

/// `GET /sessions/current/metrics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub session_id: String,
    #[serde(default)]
    pub event_count: u64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub models_used: Vec<String>,
}

/// `POST /sessions/current/reset`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetSessionResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub session_id: String,
}

/// `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub sessions: u64,
    #[serde(default)]
    pub events: u64,
}

/// `POST /playground/chat` request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// `POST /playground/chat` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub event_id: String,
}

/// One recorded LLM call, as returned by `GET /events/recent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub tokens_total: u64,
    #[serde(default)]
    pub tokens_prompt: u64,
    #[serde(default)]
    pub tokens_completion: u64,
    #[serde(default)]
    pub cost_usd: f64,
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub has_error: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl Event {
    /// Prompt + completion tokens (what the chart plots)
    pub fn token_sum(&self) -> u64 {
        self.tokens_prompt + self.tokens_completion
    }
}

/// Parse a backend timestamp
///
/// Accepts RFC 3339 (`2024-01-01T10:15:00Z`, `...+02:00`) and naive ISO
/// timestamps (`2024-01-01T10:15:00`, optional fraction). Naive values carry
/// no zone and are read as local wall-clock time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_missing_token_fields_default_to_zero() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "id": "e1",
            "time": "2024-01-01T10:15:00Z",
            "model": "claude-3-5-sonnet-20241022",
            "provider": "anthropic",
            "latency_ms": null,
            "status": "error",
            "has_error": true,
            "error": "upstream timeout"
        }))
        .unwrap();

        assert_eq!(event.tokens_prompt, 0);
        assert_eq!(event.tokens_completion, 0);
        assert_eq!(event.token_sum(), 0);
        assert_eq!(event.latency_ms, None);
        assert_eq!(event.error.as_deref(), Some("upstream timeout"));
    }

    #[test]
    fn test_naive_timestamp_is_local_wall_clock() {
        let parsed = parse_timestamp("2024-01-01T10:15:00").unwrap();
        let local = parsed.with_timezone(&Local);
        assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "2024-01-01 10:15");
    }

    #[test]
    fn test_naive_timestamp_with_fraction() {
        let parsed = parse_timestamp("2024-01-01T10:15:30.123456").unwrap();
        assert_eq!(
            parsed.with_timezone(&Local).format("%H:%M:%S").to_string(),
            "10:15:30"
        );
    }

    #[test]
    fn test_offset_timestamp_normalized_to_utc() {
        let parsed = parse_timestamp("2024-01-01T12:00:00+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T10:00:00+00:00");
    }

    #[test]
    fn test_garbage_timestamp_rejected() {
        assert!(parse_timestamp("yesterday").is_none());
        let result: Result<Event, _> = serde_json::from_value(serde_json::json!({
            "id": "e1",
            "time": "yesterday"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_session_info_with_metadata() {
        let info: SessionInfo = serde_json::from_value(serde_json::json!({
            "session_id": "abc",
            "created_at": "2024-01-01T10:00:00Z",
            "last_activity": "2024-01-01T11:00:00Z",
            "is_active": true,
            "metadata": {"source": "playground"},
            "event_count": 3,
            "total_tokens": 120,
            "total_cost": 0.0012
        }))
        .unwrap();

        assert!(info.is_active);
        assert_eq!(info.metadata["source"], "playground");
        assert_eq!(info.event_count, 3);
    }
}
