//! API error taxonomy

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single backend request
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout, TLS...
    #[error("network error: {0}")]
    Transport(#[source] reqwest::Error),

    /// HTTP 404 - for session lookups this means the backend forgot the id
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-2xx status
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// 2xx with a body that does not match the expected shape
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether this is the distinguished "session not found" case
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Build from a non-success response
    pub(super) fn from_status(status: StatusCode, body: String) -> Self {
        if status == StatusCode::NOT_FOUND {
            Self::NotFound(detail_or_body(body))
        } else {
            Self::Status {
                status,
                body: detail_or_body(body),
            }
        }
    }
}

/// FastAPI wraps messages as `{"detail": "..."}`; unwrap that when present
fn detail_or_body(body: String) -> String {
    serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_404_is_not_found() {
        let err = ApiError::from_status(
            StatusCode::NOT_FOUND,
            r#"{"detail":"Session not found"}"#.to_string(),
        );
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found: Session not found");
    }

    #[test]
    fn test_other_status_keeps_raw_body() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "HTTP 502 Bad Gateway: upstream down");
    }
}
