// TUI application state
//
// The App owns every panel plus the session store handle. Network work never
// runs on the UI loop: it is spawned onto the runtime and reports back through
// the `AppUpdate` channel, which the event loop drains alongside key presses.

use super::components::{ChatPanel, HistoryPanel, LogsPanel, MetricsPanel, Toast};
use super::scroll::Focus;
use super::traits::{ComponentId, Copyable, Handled, Interactive};
use crate::api::{ApiError, ChatResponse, Event, RequestContext};
use crate::config::{Config, PollingConfig};
use crate::logging::LogBuffer;
use crate::metrics::Granularity;
use crate::poller::PeriodicTask;
use crate::session::{SessionState, SessionStore};
use crate::theme::Theme;
use crossterm::event::KeyEvent;
use tokio::sync::mpsc;

/// Tabs of the right-hand pane
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RightTab {
    #[default]
    Metrics,
    History,
}

impl RightTab {
    pub fn title(self) -> &'static str {
        match self {
            RightTab::Metrics => "Metrics",
            RightTab::History => "History",
        }
    }

    fn component(self) -> ComponentId {
        match self {
            RightTab::Metrics => ComponentId::Metrics,
            RightTab::History => ComponentId::History,
        }
    }
}

/// Results of background work, delivered to the UI loop
#[derive(Debug)]
pub enum AppUpdate {
    /// `SessionStore::initialize` finished (successfully or not)
    SessionReady,
    MetricsEvents(Result<Vec<Event>, ApiError>),
    HistoryEvents(Result<Vec<Event>, ApiError>),
    ChatReply(Result<ChatResponse, ApiError>),
    ResetFinished(Result<(), ApiError>),
}

pub struct App {
    pub theme: Theme,
    pub store: SessionStore,
    /// Session snapshot for the current frame
    pub session: SessionState,

    pub chat: ChatPanel,
    pub metrics: MetricsPanel,
    pub history: HistoryPanel,
    pub logs: LogsPanel,

    pub focus: Focus,
    pub tab: RightTab,
    pub show_logs: bool,
    pub toast: Option<Toast>,
    pub should_quit: bool,

    animation_frame: usize,
    polling: PollingConfig,
    /// Poller for the active tab only
    poller: Option<PeriodicTask>,
    updates: mpsc::Sender<AppUpdate>,
}

impl App {
    pub fn new(
        config: &Config,
        store: SessionStore,
        log_buffer: LogBuffer,
        updates: mpsc::Sender<AppUpdate>,
    ) -> Self {
        Self {
            theme: Theme::by_name(&config.theme),
            session: store.snapshot(),
            store,
            chat: ChatPanel::new(),
            metrics: MetricsPanel::new(Granularity::default()),
            history: HistoryPanel::new(),
            logs: LogsPanel::new(log_buffer),
            focus: Focus::Chat,
            tab: RightTab::Metrics,
            show_logs: false,
            toast: None,
            should_quit: false,
            animation_frame: 0,
            polling: config.polling.clone(),
            poller: None,
            updates,
        }
    }

    /// Kick off the one-shot session bootstrap
    pub fn start(&self) {
        let store = self.store.clone();
        let tx = self.updates.clone();
        tokio::spawn(async move {
            store.initialize().await;
            let _ = tx.send(AppUpdate::SessionReady).await;
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Frame bookkeeping
    // ─────────────────────────────────────────────────────────────────────────

    pub fn refresh_session(&mut self) {
        self.session = self.store.snapshot();
    }

    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    pub fn animation_frame(&self) -> usize {
        self.animation_frame
    }

    pub fn spinner_char(&self) -> char {
        const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];
        SPINNER[self.animation_frame % SPINNER.len()]
    }

    /// Component that receives keys
    pub fn focused_component(&self) -> ComponentId {
        match self.focus {
            Focus::Chat => ComponentId::Chat,
            Focus::RightPane => self.tab.component(),
            Focus::Logs => ComponentId::Logs,
        }
    }

    pub fn focus_hint(&self) -> &'static str {
        let hint = match self.focused_component() {
            ComponentId::Chat => self.chat.focus_hint(),
            ComponentId::Metrics => self.metrics.focus_hint(),
            ComponentId::History => self.history.focus_hint(),
            ComponentId::Logs => self.logs.focus_hint(),
        };
        hint.unwrap_or("")
    }

    pub fn show_toast(&mut self, toast: Toast) {
        self.toast = Some(toast);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next(self.show_logs);
    }

    /// Switch the right pane; only the visible tab keeps a poller running
    pub fn set_tab(&mut self, tab: RightTab) {
        if self.tab != tab {
            self.tab = tab;
            self.start_polling();
        }
    }

    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
        if !self.show_logs && self.focus == Focus::Logs {
            self.focus = Focus::Chat;
        }
    }

    pub fn dispatch_to_focused(&mut self, key: KeyEvent) -> Handled {
        match self.focused_component() {
            ComponentId::Chat => self.chat.handle_key(key),
            ComponentId::Metrics => self.metrics.handle_key(key),
            ComponentId::History => self.history.handle_key(key),
            ComponentId::Logs => self.logs.handle_key(key),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────

    /// (Re)start the poller for the active tab; the first tick fires at once
    pub fn start_polling(&mut self) {
        let store = self.store.clone();
        let tx = self.updates.clone();

        self.stop_polling();
        self.poller = Some(match self.tab {
            RightTab::Metrics => {
                let limit = self.polling.metrics_event_limit;
                PeriodicTask::spawn(self.polling.metrics_interval(), move || {
                    refresh_metrics(store.clone(), tx.clone(), limit)
                })
            }
            RightTab::History => {
                let limit = self.polling.history_event_limit;
                PeriodicTask::spawn(self.polling.history_interval(), move || {
                    refresh_history(store.clone(), tx.clone(), limit)
                })
            }
        });
    }

    pub fn stop_polling(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
    }

    /// Manual refresh (or retry) of the active tab
    pub fn refresh(&mut self) {
        let store = self.store.clone();
        let tx = self.updates.clone();
        match self.tab {
            RightTab::Metrics => {
                tokio::spawn(refresh_metrics(store, tx, self.polling.metrics_event_limit));
            }
            RightTab::History => {
                self.history.state.begin_refresh();
                tokio::spawn(refresh_history(store, tx, self.polling.history_event_limit));
            }
        }
    }

    pub fn send_chat(&mut self) {
        let Some(message) = self.chat.take_message() else {
            return;
        };

        let client = self.store.client().clone();
        let ctx = self.store.context();
        let tx = self.updates.clone();
        tokio::spawn(async move {
            let result = client.send_chat(&ctx, &message).await;
            let _ = tx.send(AppUpdate::ChatReply(result)).await;
        });
    }

    pub fn reset_session(&mut self) {
        let store = self.store.clone();
        let tx = self.updates.clone();
        tokio::spawn(async move {
            let result = store.reset_session().await;
            let _ = tx.send(AppUpdate::ResetFinished(result)).await;
        });
    }

    /// Copy from the logs panel when it has focus, otherwise the last reply
    pub fn copy_to_clipboard(&mut self) {
        let (text, what) = if self.focus == Focus::Logs {
            (self.logs.copy_text(), self.logs.copy_description())
        } else {
            (self.chat.copy_text(), self.chat.copy_description())
        };

        let Some(text) = text else {
            self.show_toast(Toast::info(format!("No {} to copy", what)));
            return;
        };

        match write_clipboard(&text) {
            Ok(()) => self.show_toast(Toast::info(format!("✓ Copied {}", what))),
            Err(e) => {
                tracing::warn!("Clipboard unavailable: {:#}", e);
                self.show_toast(Toast::error("✗ Failed to copy"));
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Background results
    // ─────────────────────────────────────────────────────────────────────────

    pub fn apply(&mut self, update: AppUpdate) {
        match update {
            AppUpdate::SessionReady => {
                self.refresh_session();
                self.start_polling();
            }
            // Results for a tab that is no longer visible are dropped
            AppUpdate::MetricsEvents(result) => {
                if self.tab != RightTab::Metrics {
                    return;
                }
                match result {
                    Ok(events) => self.metrics.view.set_events(events),
                    Err(e) => tracing::error!("Error fetching events: {}", e),
                }
                self.metrics.set_loaded();
            }
            AppUpdate::HistoryEvents(result) => {
                if self.tab == RightTab::History {
                    self.history.state.apply(result);
                }
            }
            AppUpdate::ChatReply(result) => {
                let succeeded = result.is_ok();
                self.chat.log.finish(result);
                if succeeded {
                    // Fire and forget; the next frame picks up the new snapshot
                    let store = self.store.clone();
                    tokio::spawn(async move { store.fetch_metrics(None).await });
                }
            }
            AppUpdate::ResetFinished(Ok(())) => {
                self.show_toast(Toast::info("✓ Session reset"));
                self.refresh();
            }
            AppUpdate::ResetFinished(Err(_)) => {
                self.show_toast(Toast::error("✗ Reset failed"));
            }
        }
    }
}

async fn refresh_metrics(store: SessionStore, tx: mpsc::Sender<AppUpdate>, limit: u32) {
    let Some(id) = store.session_id() else {
        return;
    };
    store.fetch_metrics(Some(&id)).await;
    let result = store
        .client()
        .recent_events(&RequestContext::new(id), limit)
        .await;
    let _ = tx.send(AppUpdate::MetricsEvents(result)).await;
}

async fn refresh_history(store: SessionStore, tx: mpsc::Sender<AppUpdate>, limit: u32) {
    let Some(id) = store.session_id() else {
        return;
    };
    let result = store
        .client()
        .recent_events(&RequestContext::new(id), limit)
        .await;
    let _ = tx.send(AppUpdate::HistoryEvents(result)).await;
}

/// Fresh clipboard handle per copy; holding one open keeps X11 selections alive
fn write_clipboard(text: &str) -> anyhow::Result<()> {
    use anyhow::Context;

    let mut clipboard = arboard::Clipboard::new().context("Failed to access clipboard")?;
    clipboard
        .set_text(text)
        .context("Failed to set clipboard text")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::session::{MemorySessionStore, StoredSession};
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_app() -> (App, mpsc::Receiver<AppUpdate>) {
        // Nothing listens here; these tests never await network results
        app_against("http://127.0.0.1:9")
    }

    /// App tracking session "abc" against the given backend
    fn app_against(server_url: &str) -> (App, mpsc::Receiver<AppUpdate>) {
        let base = format!("{}/api/v1", server_url);
        let client = ApiClient::new(server_url, &base, "X-Session-ID", None).unwrap();
        let persistence = MemorySessionStore::with_record(StoredSession::new("abc"));
        let store = SessionStore::new(client, Arc::new(persistence));
        let (tx, rx) = mpsc::channel(16);
        (App::new(&Config::default(), store, LogBuffer::new(), tx), rx)
    }

    fn events(n: usize) -> Vec<Event> {
        (0..n)
            .map(|i| {
                serde_json::from_value(serde_json::json!({
                    "id": format!("e{}", i),
                    "time": "2024-01-01T10:15:00Z",
                    "tokens_prompt": 1,
                }))
                .unwrap()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_stale_tab_results_are_dropped() {
        let (mut app, _rx) = test_app();
        app.set_tab(RightTab::History);

        app.apply(AppUpdate::MetricsEvents(Ok(events(3))));
        assert!(app.metrics.view.events().is_empty());

        app.apply(AppUpdate::HistoryEvents(Ok(events(2))));
        assert_eq!(app.history.state.events().len(), 2);
    }

    #[tokio::test]
    async fn test_chat_reply_settles_log() {
        let (mut app, _rx) = test_app();
        for c in "hi".chars() {
            app.chat.handle_key(KeyEvent::from(crossterm::event::KeyCode::Char(c)));
        }
        assert!(app.chat.take_message().is_some());

        app.apply(AppUpdate::ChatReply(Err(ApiError::Decode("bad".into()))));
        assert!(!app.chat.log.is_sending());
        assert_eq!(app.chat.log.messages().len(), 2);
    }

    #[tokio::test]
    async fn test_hiding_logs_moves_focus_back_to_chat() {
        let (mut app, _rx) = test_app();
        app.toggle_logs();
        app.focus_next();
        app.focus_next();
        assert_eq!(app.focus, Focus::Logs);

        app.toggle_logs();
        assert_eq!(app.focus, Focus::Chat);
    }

    #[tokio::test]
    async fn test_focused_component_follows_tab() {
        let (mut app, _rx) = test_app();
        app.focus_next();
        assert_eq!(app.focused_component(), ComponentId::Metrics);
        app.set_tab(RightTab::History);
        assert_eq!(app.focused_component(), ComponentId::History);
    }

    #[tokio::test]
    async fn test_only_successful_chat_reply_refreshes_metrics() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/sessions/current/metrics"))
            .and(header("X-Session-ID", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "session_id": "abc",
                "event_count": 1,
                "total_tokens": 12,
                "total_cost": 0.0001,
                "models_used": ["gpt-4o-mini"]
            })))
            .expect(1)
            .mount(&server)
            .await;
        let (mut app, _rx) = app_against(&server.uri());

        assert!(app.chat.log.begin_send("hi").is_some());
        app.apply(AppUpdate::ChatReply(Ok(ChatResponse {
            response: "hello".into(),
            event_id: "ev1".into(),
        })));
        for _ in 0..100 {
            if app.store.snapshot().metrics.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(
            app.store.snapshot().metrics.map(|m| m.event_count),
            Some(1)
        );

        assert!(app.chat.log.begin_send("again").is_some());
        app.apply(AppUpdate::ChatReply(Err(ApiError::Decode("bad".into()))));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn test_stop_polling_aborts_active_poller() {
        let (mut app, _rx) = test_app();
        app.start_polling();
        assert!(app.poller.as_ref().is_some_and(PeriodicTask::is_running));

        app.stop_polling();
        assert!(app.poller.is_none());
    }
}
