//! Chat transcript state machine
//!
//! `idle → sending → idle`. The user's message is appended optimistically when
//! the send begins; the outcome appends either the assistant reply or a
//! synthetic assistant-role error line. The transcript lives in memory only.

use crate::api::{ApiClient, ApiError, ChatResponse, RequestContext};

/// Shown in place of a reply when the send fails
pub const ERROR_REPLY: &str = "Sorry, there was an error processing your message.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Backend event id for successful replies
    pub event_id: Option<String>,
    /// Synthetic error reply
    pub is_error: bool,
}

impl ChatMessage {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            event_id: None,
            is_error: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    in_flight: bool,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a send
    ///
    /// Returns the trimmed message to transmit, or `None` when nothing should
    /// go over the wire (blank input, or a send already in flight).
    pub fn begin_send(&mut self, input: &str) -> Option<String> {
        let message = input.trim();
        if message.is_empty() || self.in_flight {
            return None;
        }

        self.messages.push(ChatMessage::user(message));
        self.in_flight = true;
        Some(message.to_string())
    }

    /// Settle the in-flight send
    pub fn finish(&mut self, result: Result<ChatResponse, ApiError>) {
        let reply = match result {
            Ok(reply) => ChatMessage {
                role: Role::Assistant,
                content: reply.response,
                event_id: Some(reply.event_id),
                is_error: false,
            },
            Err(e) => {
                tracing::error!("Error sending message: {}", e);
                ChatMessage {
                    role: Role::Assistant,
                    content: ERROR_REPLY.to_string(),
                    event_id: None,
                    is_error: true,
                }
            }
        };
        self.messages.push(reply);
        self.in_flight = false;
    }

    /// One complete exchange against the backend
    ///
    /// Returns `false` without touching the network when the send is refused.
    pub async fn send(&mut self, client: &ApiClient, ctx: &RequestContext, input: &str) -> bool {
        let Some(message) = self.begin_send(input) else {
            return false;
        };
        let result = client.send_chat(ctx, &message).await;
        self.finish(result);
        true
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight
    }

    /// Most recent successful assistant reply
    pub fn last_reply(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant && !m.is_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ApiClient {
        let base = format!("{}/api/v1", server.uri());
        ApiClient::new(&server.uri(), &base, "X-Session-ID", None).unwrap()
    }

    #[test]
    fn test_blank_input_is_refused() {
        let mut log = ChatLog::new();
        assert_eq!(log.begin_send(""), None);
        assert_eq!(log.begin_send("   \n\t"), None);
        assert!(log.messages().is_empty());
        assert!(!log.is_sending());
    }

    #[test]
    fn test_second_send_while_in_flight_is_refused() {
        let mut log = ChatLog::new();
        assert_eq!(log.begin_send("  hello  "), Some("hello".to_string()));
        assert!(log.is_sending());
        assert_eq!(log.begin_send("again"), None);
        assert_eq!(log.messages().len(), 1);
    }

    #[test]
    fn test_failure_appends_error_reply_and_keeps_user_message() {
        let mut log = ChatLog::new();
        log.begin_send("hello");
        log.finish(Err(ApiError::Decode("bad".into())));

        let messages = log.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "hello");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, ERROR_REPLY);
        assert!(messages[1].is_error);
        assert!(!log.is_sending());
        assert!(log.last_reply().is_none());
    }

    #[tokio::test]
    async fn test_blank_send_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/playground/chat"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut log = ChatLog::new();
        let sent = log
            .send(&client_for(&server), &RequestContext::new("abc"), "   ")
            .await;
        assert!(!sent);
    }

    #[tokio::test]
    async fn test_successful_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/playground/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "Hello! How can I help?",
                "event_id": "ev-42"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut log = ChatLog::new();
        let sent = log
            .send(&client_for(&server), &RequestContext::new("abc"), "hi")
            .await;

        assert!(sent);
        let reply = log.last_reply().unwrap();
        assert_eq!(reply.content, "Hello! How can I help?");
        assert_eq!(reply.event_id.as_deref(), Some("ev-42"));
        assert!(!log.is_sending());
    }
}
