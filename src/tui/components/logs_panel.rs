//! Logs panel component
//!
//! Shows the tail of the in-memory [`LogBuffer`]. Read-path failures (polling
//! errors) only ever surface here, so this is where a user looks when the
//! dashboard goes stale.

use super::formatters::truncate_to_width;
use super::scrollbar::render_scrollbar;
use crate::logging::{LogBuffer, LogEntry, LogLevel};
use crate::theme::Theme;
use crate::tui::scroll::ScrollState;
use crate::tui::traits::{
    Component, ComponentId, Copyable, Handled, Interactive, RenderContext, Scrollable,
};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

pub struct LogsPanel {
    buffer: LogBuffer,
    scroll: ScrollState,
    /// Selected entry; `None` while following the tail
    selected: Option<usize>,
    entry_count: usize,
}

impl LogsPanel {
    pub fn new(buffer: LogBuffer) -> Self {
        Self {
            buffer,
            scroll: ScrollState::new(),
            selected: None,
            entry_count: 0,
        }
    }

    /// Entry and error counts, plus the current mode
    fn title(&self, focused: bool) -> String {
        let counts = match self.buffer.error_count() {
            0 => format!("{}", self.buffer.len()),
            errors => format!("{}, {} errors", self.buffer.len(), errors),
        };
        let mode = match (self.selected.is_some() && focused, self.scroll.auto_follow) {
            (true, _) => " [select]",
            (false, true) => "",
            (false, false) => " [scroll]",
        };
        format!(" System Logs ({}){} ", counts, mode)
    }

    fn select_previous(&mut self) {
        match self.selected {
            Some(idx) if idx > 0 => {
                self.selected = Some(idx - 1);
                if idx - 1 < self.scroll.offset() {
                    self.scroll.scroll_up();
                }
            }
            None if self.entry_count > 0 => self.selected = Some(self.entry_count - 1),
            _ => {}
        }
    }

    fn select_next(&mut self) {
        match self.selected {
            Some(idx) if idx + 1 < self.entry_count => {
                self.selected = Some(idx + 1);
                let (_, end) = self.scroll.visible_range();
                if idx + 1 >= end {
                    self.scroll.scroll_down();
                }
            }
            None if self.entry_count > 0 => self.selected = Some(self.entry_count - 1),
            _ => {}
        }
    }
}

impl Component for LogsPanel {
    fn id(&self) -> ComponentId {
        ComponentId::Logs
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let entries = self.buffer.snapshot();
        let height = area.height.saturating_sub(2) as usize;
        let width = area.width.saturating_sub(2) as usize;
        let focused = ctx.is_focused(self.id());

        self.entry_count = entries.len();
        self.scroll.update_dimensions(entries.len(), height);
        if let Some(idx) = self.selected {
            if idx >= entries.len() {
                self.selected = entries.len().checked_sub(1);
            }
        }

        let (start, end) = self.scroll.visible_range();
        let items: Vec<ListItem> = entries[start..end]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let line = truncate_to_width(&format_log_entry(entry), width);
                let style = if focused && self.selected == Some(start + i) {
                    ctx.theme.selected()
                } else {
                    log_level_style(entry.level, ctx.theme)
                };
                ListItem::new(line).style(style)
            })
            .collect();

        let title = self.title(focused);

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(ctx.theme.border_type)
                .border_style(ctx.theme.panel_border(focused))
                .title(title),
        );

        f.render_widget(list, area);
        render_scrollbar(f, area, self.scroll_state());
    }
}

impl Scrollable for LogsPanel {
    fn scroll_state(&self) -> &ScrollState {
        &self.scroll
    }

    fn scroll_state_mut(&mut self) -> &mut ScrollState {
        &mut self.scroll
    }
}

impl Copyable for LogsPanel {
    fn copy_text(&self) -> Option<String> {
        let idx = self.selected?;
        self.buffer.snapshot().get(idx).map(format_log_entry)
    }

    fn copy_description(&self) -> &'static str {
        "log entry"
    }
}

impl Interactive for LogsPanel {
    fn handle_key(&mut self, key: KeyEvent) -> Handled {
        match key.code {
            KeyCode::Up => {
                self.select_previous();
                Handled::Yes
            }
            KeyCode::Down => {
                self.select_next();
                Handled::Yes
            }
            KeyCode::Esc if self.selected.is_some() => {
                self.selected = None;
                self.scroll.scroll_to_bottom();
                Handled::Yes
            }
            _ => self.handle_scroll_keys(key),
        }
    }

    fn focus_hint(&self) -> Option<&'static str> {
        Some("↑↓:select  y:copy  Esc:clear")
    }
}

/// `[10:15:02] WARN  session: message`; the crate prefix is dropped from targets
fn format_log_entry(entry: &LogEntry) -> String {
    let target = entry
        .target
        .strip_prefix("llmscope::")
        .unwrap_or(&entry.target);
    format!(
        "[{}] {:5} {}: {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.level.as_str(),
        target,
        entry.message
    )
}

fn log_level_style(level: LogLevel, theme: &Theme) -> Style {
    match level {
        LogLevel::Error => Style::default()
            .fg(theme.error)
            .add_modifier(Modifier::BOLD),
        LogLevel::Warn => Style::default().fg(theme.warning),
        LogLevel::Info => Style::default().fg(theme.info),
        LogLevel::Debug | LogLevel::Trace => Style::default().fg(theme.muted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use crossterm::event::KeyModifiers;

    fn buffer_with(n: usize) -> LogBuffer {
        let buffer = LogBuffer::new();
        for i in 0..n {
            buffer.add(LogEntry {
                timestamp: Local::now(),
                level: LogLevel::Info,
                target: "llmscope".into(),
                message: format!("entry {}", i),
            });
        }
        buffer
    }

    fn entry(level: LogLevel, target: &str, message: &str) -> LogEntry {
        LogEntry {
            timestamp: Local::now(),
            level,
            target: target.into(),
            message: message.into(),
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_first_up_selects_latest_entry() {
        let mut panel = LogsPanel::new(buffer_with(3));
        panel.entry_count = 3;

        panel.handle_key(key(KeyCode::Up));
        assert_eq!(panel.selected, Some(2));
        assert!(panel.copy_text().unwrap().ends_with("entry 2"));

        panel.handle_key(key(KeyCode::Up));
        assert_eq!(panel.selected, Some(1));
    }

    #[test]
    fn test_esc_clears_selection_then_bubbles() {
        let mut panel = LogsPanel::new(buffer_with(1));
        panel.entry_count = 1;
        panel.handle_key(key(KeyCode::Up));

        assert_eq!(panel.handle_key(key(KeyCode::Esc)), Handled::Yes);
        assert_eq!(panel.selected, None);
        assert_eq!(panel.handle_key(key(KeyCode::Esc)), Handled::No);
    }

    #[test]
    fn test_entry_shows_module_without_crate_prefix() {
        let line = format_log_entry(&entry(
            LogLevel::Warn,
            "llmscope::session",
            "Session abc not found",
        ));
        assert!(line.ends_with("WARN  session: Session abc not found"));
    }

    #[test]
    fn test_title_counts_entries_and_errors() {
        let buffer = buffer_with(2);
        let panel = LogsPanel::new(buffer.clone());
        assert_eq!(panel.title(false), " System Logs (2) ");

        buffer.add(entry(LogLevel::Error, "llmscope::api", "boom"));
        assert_eq!(panel.title(false), " System Logs (3, 1 errors) ");
    }
}
