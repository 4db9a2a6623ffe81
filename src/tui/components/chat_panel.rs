//! Chat panel component
//!
//! Left half of the screen: the transcript above a one-line input box. The
//! panel owns the [`ChatLog`] and the draft text; the App performs the actual
//! network send when Enter is pressed.

use super::formatters::{truncate_to_width, wrap_text};
use super::scrollbar::render_scrollbar;
use crate::chat::{ChatLog, Role};
use crate::tui::scroll::ScrollState;
use crate::tui::traits::{
    Component, ComponentId, Copyable, Handled, Interactive, RenderContext, Scrollable,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub struct ChatPanel {
    pub log: ChatLog,
    input: String,
    scroll: ScrollState,
}

impl ChatPanel {
    pub fn new() -> Self {
        Self {
            log: ChatLog::new(),
            input: String::new(),
            scroll: ScrollState::new(),
        }
    }

    /// Hand the draft to the chat log; clears the box only if a send starts
    pub fn take_message(&mut self) -> Option<String> {
        let message = self.log.begin_send(&self.input)?;
        self.input.clear();
        self.scroll.scroll_to_bottom();
        Some(message)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    fn transcript_lines(&self, width: usize, ctx: &RenderContext) -> Vec<Line<'static>> {
        let theme = ctx.theme;

        if self.log.messages().is_empty() && !self.log.is_sending() {
            return vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Start a conversation to generate events.",
                    Style::default().fg(theme.muted),
                )),
                Line::from(Span::styled(
                    "Each reply is recorded with its tokens, cost and latency.",
                    Style::default().fg(theme.muted),
                )),
            ];
        }

        let mut lines = Vec::new();
        for message in self.log.messages() {
            let (label, color) = match (message.role, message.is_error) {
                (Role::User, _) => ("You", theme.user_message),
                (Role::Assistant, false) => ("Assistant", theme.assistant_message),
                (Role::Assistant, true) => ("Assistant", theme.error),
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            for text in wrap_text(&message.content, width.saturating_sub(2)) {
                lines.push(Line::from(Span::styled(
                    format!("  {}", text),
                    Style::default().fg(color),
                )));
            }
            lines.push(Line::from(""));
        }

        if self.log.is_sending() {
            lines.push(Line::from(Span::styled(
                format!("{} Thinking...", ctx.spinner_char()),
                Style::default().fg(theme.muted),
            )));
        }

        lines
    }
}

impl Default for ChatPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ChatPanel {
    fn id(&self) -> ComponentId {
        ComponentId::Chat
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let focused = ctx.is_focused(self.id());
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3)])
            .split(area);

        // Transcript
        let width = chunks[0].width.saturating_sub(2) as usize;
        let height = chunks[0].height.saturating_sub(2) as usize;
        let lines = self.transcript_lines(width, ctx);
        self.scroll.update_dimensions(lines.len(), height);

        let (start, end) = self.scroll.visible_range();
        let visible: Vec<Line> = lines[start..end].to_vec();
        let transcript = Paragraph::new(visible).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(ctx.theme.border_type)
                .border_style(ctx.theme.panel_border(focused))
                .title(" Chat "),
        );
        f.render_widget(transcript, chunks[0]);
        render_scrollbar(f, chunks[0], self.scroll_state());

        // Input box: keep the tail of long drafts visible
        let input_width = chunks[1].width.saturating_sub(3) as usize;
        let draft = if self.input.width() > input_width {
            let reversed: String = self.input.chars().rev().collect();
            truncate_to_width(&reversed, input_width).chars().rev().collect()
        } else {
            self.input.clone()
        };
        let cursor = if focused { "▏" } else { "" };
        let title = if self.log.is_sending() {
            " Message (sending...) "
        } else {
            " Message (Enter to send) "
        };

        let input = Paragraph::new(format!("{}{}", draft, cursor))
            .style(Style::default().fg(ctx.theme.foreground))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(ctx.theme.border_type)
                    .border_style(ctx.theme.panel_border(focused))
                    .title(title),
            );
        f.render_widget(input, chunks[1]);
    }
}

impl Scrollable for ChatPanel {
    fn scroll_state(&self) -> &ScrollState {
        &self.scroll
    }

    fn scroll_state_mut(&mut self) -> &mut ScrollState {
        &mut self.scroll
    }
}

impl Copyable for ChatPanel {
    fn copy_text(&self) -> Option<String> {
        self.log.last_reply().map(|m| m.content.clone())
    }

    fn copy_description(&self) -> &'static str {
        "reply"
    }
}

impl Interactive for ChatPanel {
    fn handle_key(&mut self, key: KeyEvent) -> Handled {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return Handled::No;
        }

        match key.code {
            KeyCode::Char(c) => {
                self.input.push(c);
                Handled::Yes
            }
            KeyCode::Backspace => {
                self.input.pop();
                Handled::Yes
            }
            _ => self.handle_scroll_keys(key),
        }
    }

    fn focus_hint(&self) -> Option<&'static str> {
        Some("Enter:send  Ctrl+Y:copy reply  Tab:switch pane")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ChatResponse;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(panel: &mut ChatPanel, text: &str) {
        for c in text.chars() {
            panel.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut panel = ChatPanel::new();
        type_text(&mut panel, "hey");
        panel.handle_key(key(KeyCode::Backspace));
        assert_eq!(panel.input(), "he");
    }

    #[test]
    fn test_blank_draft_is_not_taken() {
        let mut panel = ChatPanel::new();
        type_text(&mut panel, "   ");
        assert_eq!(panel.take_message(), None);
        assert_eq!(panel.input(), "   ");
    }

    #[test]
    fn test_draft_kept_while_send_in_flight() {
        let mut panel = ChatPanel::new();
        type_text(&mut panel, "first");
        assert_eq!(panel.take_message(), Some("first".to_string()));
        assert_eq!(panel.input(), "");

        type_text(&mut panel, "second");
        assert_eq!(panel.take_message(), None);
        assert_eq!(panel.input(), "second");

        panel.log.finish(Ok(ChatResponse {
            response: "ok".into(),
            event_id: "ev".into(),
        }));
        assert_eq!(panel.copy_text().as_deref(), Some("ok"));
        assert_eq!(panel.take_message(), Some("second".to_string()));
    }

    #[test]
    fn test_control_keys_bubble_up() {
        let mut panel = ChatPanel::new();
        let ctrl_y = KeyEvent::new(KeyCode::Char('y'), KeyModifiers::CONTROL);
        assert_eq!(panel.handle_key(ctrl_y), Handled::No);
        assert_eq!(panel.input(), "");
    }
}
