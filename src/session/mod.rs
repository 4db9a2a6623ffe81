//! Session store - lifecycle of the client's session identity
//!
//! Owns the tracked session id plus the last fetched info and metrics, shared
//! by every panel. The store is a cheap handle (`Clone`) over one
//! `Arc<Mutex<SessionState>>`, so background pollers and the UI loop see the
//! same state. The mutex is only held for field updates, never across an
//! await: concurrent fetches are last-settled-wins.
//!
//! # Lifecycle
//!
//! ```text
//! initialize ──► stored id? ──yes──► fetch_session_info ──404──► create_new_session
//!                    │                       │                        │
//!                    no                      ok                       ▼
//!                    ▼                       ▼                  persist + fetch
//!             create_new_session        fetch_metrics           info/metrics
//! ```
//!
//! Error policy: create and reset failures land in `SessionState::error`;
//! info/metrics read failures are logged and leave the previous values.

mod persistence;

pub use persistence::{FileSessionStore, SessionPersistence, StoredSession};

#[cfg(test)]
pub use persistence::MemorySessionStore;

use crate::api::{ApiClient, ApiError, RequestContext, SessionInfo, SessionMetrics};
use std::sync::{Arc, Mutex, MutexGuard};

/// Snapshot of everything the UI shows about the session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub session_id: Option<String>,
    pub info: Option<SessionInfo>,
    pub metrics: Option<SessionMetrics>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    /// First 8 characters of the id, for compact display
    pub fn short_id(&self) -> Option<&str> {
        self.session_id
            .as_deref()
            .map(|id| id.get(..8).unwrap_or(id))
    }
}

/// Shared handle to the session lifecycle
#[derive(Clone)]
pub struct SessionStore {
    client: ApiClient,
    persistence: Arc<dyn SessionPersistence>,
    state: Arc<Mutex<SessionState>>,
}

impl SessionStore {
    /// Create the store, recovering any previously persisted session id
    pub fn new(client: ApiClient, persistence: Arc<dyn SessionPersistence>) -> Self {
        let session_id = persistence.load().map(|record| record.session_id);
        if let Some(id) = &session_id {
            tracing::debug!("Recovered stored session {}", id);
        }

        Self {
            client,
            persistence,
            state: Arc::new(Mutex::new(SessionState {
                session_id,
                is_loading: true,
                ..Default::default()
            })),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Clone of the current state
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn session_id(&self) -> Option<String> {
        self.lock().session_id.clone()
    }

    /// Request scope for the currently tracked session
    pub fn context(&self) -> RequestContext {
        RequestContext {
            session_id: self.session_id(),
        }
    }

    /// One-shot bootstrap: reuse the stored session or mint a new one
    pub async fn initialize(&self) {
        if self.session_id().is_some() {
            self.fetch_session_info(None).await;
            self.fetch_metrics(None).await;
            self.lock().is_loading = false;
        } else {
            // Error is already recorded in state
            let _ = self.create_new_session().await;
        }
    }

    /// Ask the backend for a new session id, persist it, then load its data
    pub async fn create_new_session(&self) -> Result<String, ApiError> {
        {
            let mut state = self.lock();
            state.is_loading = true;
            state.error = None;
        }

        let result = self.client.create_session().await;
        let outcome = match result {
            Ok(created) => {
                let id = created.session_id;
                tracing::info!("Created new session {}", id);

                if let Err(e) = self.persistence.save(&StoredSession::new(id.clone())) {
                    tracing::warn!("Could not persist session id: {:#}", e);
                }
                {
                    let mut state = self.lock();
                    state.session_id = Some(id.clone());
                    state.info = None;
                    state.metrics = None;
                }

                // A brand new id that 404s is a backend problem, not a stale id,
                // so this path never recurses into another create.
                if let Err(e) = self.load_info(&id).await {
                    tracing::error!("Error fetching session info: {}", e);
                }
                self.fetch_metrics(Some(&id)).await;
                Ok(id)
            }
            Err(e) => {
                tracing::error!("Error creating session: {}", e);
                let mut state = self.lock();
                state.session_id = None;
                state.info = None;
                state.metrics = None;
                state.error = Some(format!("Failed to create session: {}", e));
                drop(state);
                if let Err(e) = self.persistence.clear() {
                    tracing::warn!("Could not clear stored session: {:#}", e);
                }
                Err(e)
            }
        };

        self.lock().is_loading = false;
        outcome
    }

    /// Fetch info for the given (or current) id
    ///
    /// A 404 means the backend no longer knows the id: a replacement session is
    /// minted transparently, exactly once. Other failures are logged only.
    pub async fn fetch_session_info(&self, session_id: Option<&str>) {
        let Some(id) = self.resolve_id(session_id) else {
            return;
        };

        match self.load_info(&id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!("Session {} not found on backend, creating a new one", id);
                let _ = self.create_new_session().await;
            }
            Err(e) => tracing::error!("Error fetching session info: {}", e),
        }
    }

    /// Fetch metrics for the given (or current) id; failures keep stale values
    pub async fn fetch_metrics(&self, session_id: Option<&str>) {
        let Some(id) = self.resolve_id(session_id) else {
            return;
        };

        match self.client.session_metrics(&RequestContext::new(id)).await {
            Ok(metrics) => self.lock().metrics = Some(metrics),
            Err(e) => tracing::error!("Error fetching metrics: {}", e),
        }
    }

    /// Ask the backend to zero the session's counters; the id is kept
    pub async fn reset_session(&self) -> Result<(), ApiError> {
        let Some(id) = self.session_id() else {
            return Ok(());
        };

        {
            let mut state = self.lock();
            state.is_loading = true;
            state.error = None;
        }

        let outcome = match self.client.reset_session(&RequestContext::new(id.clone())).await {
            Ok(response) => {
                tracing::info!("{}", response.message);
                self.fetch_session_info(None).await;
                self.fetch_metrics(None).await;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Error resetting session: {}", e);
                self.lock().error = Some(format!("Failed to reset session: {}", e));
                Err(e)
            }
        };

        self.lock().is_loading = false;
        outcome
    }

    /// Drop the local record and state without contacting the backend
    pub fn forget(&self) -> anyhow::Result<()> {
        self.persistence.clear()?;
        *self.lock() = SessionState::default();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_id(&self, session_id: Option<&str>) -> Option<String> {
        session_id.map(str::to_string).or_else(|| self.session_id())
    }

    /// Fetch info and record it; also refreshes the stored lastActivity
    async fn load_info(&self, id: &str) -> Result<(), ApiError> {
        let info = self.client.session_info(&RequestContext::new(id)).await?;
        self.touch_record(&info);
        self.lock().info = Some(info);
        Ok(())
    }

    fn touch_record(&self, info: &SessionInfo) {
        let record = match self.persistence.load() {
            Some(record) if record.session_id == info.session_id => StoredSession {
                last_activity: info.last_activity,
                ..record
            },
            _ => return,
        };
        if let Err(e) = self.persistence.save(&record) {
            tracing::warn!("Could not refresh stored session activity: {:#}", e);
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
