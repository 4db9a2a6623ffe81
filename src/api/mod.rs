//! Backend REST client
//!
//! One typed function per endpoint. Each issues exactly one HTTP request and
//! returns the decoded body or an [`ApiError`]. The session id travels in a
//! [`RequestContext`] supplied by the caller on every call, so the client holds
//! no mutable state and can be cloned freely into background tasks.
//!
//! ```text
//! POST /sessions/create          (no session header)
//! GET  /sessions/current/info
//! GET  /sessions/current/metrics
//! POST /sessions/current/reset
//! GET  /sessions/{id}            (no session header)
//! POST /playground/chat
//! GET  /events/recent?limit=N
//! GET  /health                   (server root, no session header)
//! ```

mod error;
mod types;

pub use error::ApiError;
pub use types::{
    ChatRequest, ChatResponse, CreateSessionResponse, Event, HealthResponse,
    ResetSessionResponse, SessionInfo, SessionMetrics,
};

use crate::config::Config;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Per-request scope: which session the call belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub session_id: Option<String>,
}

impl RequestContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
        }
    }

    /// Context that carries no session header
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Typed HTTP client for the dashboard backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    /// Root URL, e.g. `http://localhost:8001`
    server_url: String,
    /// API base, e.g. `http://localhost:8001/api/v1`
    api_base: String,
    session_header: String,
}

impl ApiClient {
    /// Build a client from the resolved configuration
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(
            &config.server_url,
            &config.api_base(),
            &config.session_header,
            config.request_timeout(),
        )
    }

    pub fn new(
        server_url: &str,
        api_base: &str,
        session_header: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ApiError::Transport)?;

        Ok(Self {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            session_header: session_header.to_string(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sessions
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn create_session(&self) -> Result<CreateSessionResponse, ApiError> {
        let req = self.request(Method::POST, "/sessions/create", &RequestContext::anonymous());
        Self::send(req).await
    }

    pub async fn session_info(&self, ctx: &RequestContext) -> Result<SessionInfo, ApiError> {
        Self::send(self.request(Method::GET, "/sessions/current/info", ctx)).await
    }

    pub async fn session_metrics(&self, ctx: &RequestContext) -> Result<SessionMetrics, ApiError> {
        Self::send(self.request(Method::GET, "/sessions/current/metrics", ctx)).await
    }

    pub async fn reset_session(
        &self,
        ctx: &RequestContext,
    ) -> Result<ResetSessionResponse, ApiError> {
        Self::send(self.request(Method::POST, "/sessions/current/reset", ctx)).await
    }

    /// Look up any session by id without touching the tracked one
    pub async fn session_by_id(&self, session_id: &str) -> Result<SessionInfo, ApiError> {
        let path = format!("/sessions/{}", session_id);
        Self::send(self.request(Method::GET, &path, &RequestContext::anonymous())).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Chat & events
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn send_chat(
        &self,
        ctx: &RequestContext,
        message: &str,
    ) -> Result<ChatResponse, ApiError> {
        let req = self
            .request(Method::POST, "/playground/chat", ctx)
            .json(&ChatRequest { message });
        Self::send(req).await
    }

    pub async fn recent_events(
        &self,
        ctx: &RequestContext,
        limit: u32,
    ) -> Result<Vec<Event>, ApiError> {
        let req = self
            .request(Method::GET, "/events/recent", ctx)
            .query(&[("limit", limit)]);
        Self::send(req).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Health
    // ─────────────────────────────────────────────────────────────────────────

    /// Health lives at the server root, outside the API prefix
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let url = format!("{}/health", self.server_url);
        Self::send(self.client.get(url)).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plumbing
    // ─────────────────────────────────────────────────────────────────────────

    fn request(&self, method: Method, path: &str, ctx: &RequestContext) -> RequestBuilder {
        let url = format!("{}{}", self.api_base, path);
        let req = self.client.request(method, url);
        match &ctx.session_id {
            Some(id) => req.header(self.session_header.as_str(), id.as_str()),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ApiError> {
        let response = req.send().await.map_err(ApiError::Transport)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Backend returned {}: {}", status, body);
            return Err(ApiError::from_status(status, body));
        }

        let bytes = response.bytes().await.map_err(ApiError::Transport)?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
