//! Event history pane state

use crate::api::{ApiError, Event};

pub const LOAD_ERROR: &str = "Failed to load event history";

#[derive(Debug, Clone, Default)]
pub struct HistoryState {
    events: Vec<Event>,
    loading: bool,
    error: Option<String>,
}

impl HistoryState {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Default::default()
        }
    }

    pub fn begin_refresh(&mut self) {
        self.loading = true;
    }

    /// Apply a fetch result. Success replaces the whole list; failure keeps
    /// the previous rows in memory until the next successful fetch.
    pub fn apply(&mut self, result: Result<Vec<Event>, ApiError>) {
        match result {
            Ok(events) => {
                self.events = events;
                self.error = None;
            }
            Err(e) => {
                tracing::error!("Error fetching events: {}", e);
                self.error = Some(LOAD_ERROR.to_string());
            }
        }
        self.loading = false;
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str) -> Event {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "time": "2024-01-01T10:15:00Z",
        }))
        .unwrap()
    }

    #[test]
    fn test_success_replaces_list() {
        let mut state = HistoryState::new();
        assert!(state.is_loading());

        state.apply(Ok(vec![event("a"), event("b")]));
        state.apply(Ok(vec![event("c")]));

        assert_eq!(state.events().len(), 1);
        assert_eq!(state.events()[0].id, "c");
        assert!(!state.is_loading());
    }

    #[test]
    fn test_failure_keeps_rows_until_retry() {
        let mut state = HistoryState::new();
        state.apply(Ok(vec![event("a")]));
        state.apply(Err(ApiError::Decode("bad".into())));

        assert_eq!(state.error(), Some(LOAD_ERROR));
        assert_eq!(state.events().len(), 1);

        state.begin_refresh();
        state.apply(Ok(vec![]));
        assert!(state.error().is_none());
        assert!(state.events().is_empty());
    }
}
