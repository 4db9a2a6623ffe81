//! Event history panel
//!
//! Tabular list of the most recent events. A failed fetch swaps the table for
//! a retry prompt; the rows stay in memory and come back once a retry lands.

use super::formatters::{format_event_cost, format_latency, format_number, truncate_to_width};
use super::scrollbar::render_scrollbar;
use crate::api::Event;
use crate::history::HistoryState;
use crate::theme::Theme;
use crate::tui::scroll::ScrollState;
use crate::tui::traits::{Component, ComponentId, Handled, Interactive, RenderContext, Scrollable};
use chrono::Local;
use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

const COLUMNS: [(&str, Constraint); 7] = [
    ("Time", Constraint::Length(19)),
    ("Model", Constraint::Min(12)),
    ("Provider", Constraint::Length(10)),
    ("Tokens", Constraint::Length(13)),
    ("Cost", Constraint::Length(9)),
    ("Latency", Constraint::Length(8)),
    ("Status", Constraint::Length(8)),
];

pub struct HistoryPanel {
    pub state: HistoryState,
    scroll: ScrollState,
}

impl HistoryPanel {
    pub fn new() -> Self {
        Self {
            state: HistoryState::new(),
            scroll: ScrollState::manual(),
        }
    }

    fn block<'a>(&self, theme: &Theme, focused: bool) -> Block<'a> {
        let title = format!(" Event History ({}) ", self.state.events().len());
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(theme.panel_border(focused))
            .title(title)
            .title_top(Line::from(" r: refresh ").right_aligned())
    }

    fn render_message(&self, f: &mut Frame, area: Rect, lines: Vec<Line>, ctx: &RenderContext) {
        let focused = ctx.is_focused(self.id());
        let message = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(self.block(ctx.theme, focused));
        f.render_widget(message, area);
    }
}

impl Default for HistoryPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for HistoryPanel {
    fn id(&self) -> ComponentId {
        ComponentId::History
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let muted = Style::default().fg(theme.muted);

        if let Some(error) = self.state.error() {
            let lines = vec![
                Line::from(""),
                Line::styled(
                    error.to_string(),
                    Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
                ),
                Line::styled("Press r to retry", muted),
            ];
            self.render_message(f, area, lines, ctx);
            return;
        }

        let events = self.state.events();
        if events.is_empty() {
            let text = if self.state.is_loading() {
                format!("{} Loading events...", ctx.spinner_char())
            } else {
                "No events yet. Start chatting to generate events!".to_string()
            };
            self.render_message(f, area, vec![Line::from(""), Line::styled(text, muted)], ctx);
            return;
        }

        // Header row + bottom border
        let height = area.height.saturating_sub(3) as usize;
        self.scroll.update_dimensions(events.len(), height);
        let (start, end) = self.scroll.visible_range();
        let model_width = area.width.saturating_sub(75).max(12) as usize;

        let rows: Vec<Row> = events[start..end]
            .iter()
            .map(|event| event_row(event, model_width, theme))
            .collect();

        let header = Row::new(COLUMNS.iter().map(|(name, _)| Cell::from(*name))).style(
            Style::default()
                .fg(theme.title)
                .add_modifier(Modifier::BOLD),
        );

        let table = Table::new(rows, COLUMNS.iter().map(|(_, width)| *width))
            .header(header)
            .column_spacing(1)
            .block(self.block(theme, ctx.is_focused(self.id())));

        f.render_widget(table, area);
        render_scrollbar(f, area, self.scroll_state());
    }
}

impl Scrollable for HistoryPanel {
    fn scroll_state(&self) -> &ScrollState {
        &self.scroll
    }

    fn scroll_state_mut(&mut self) -> &mut ScrollState {
        &mut self.scroll
    }
}

impl Interactive for HistoryPanel {
    fn handle_key(&mut self, key: KeyEvent) -> Handled {
        self.handle_scroll_keys(key)
    }

    fn focus_hint(&self) -> Option<&'static str> {
        Some("↑↓:scroll  r:refresh  F1:metrics")
    }
}

fn event_row<'a>(event: &Event, model_width: usize, theme: &Theme) -> Row<'a> {
    let status_style = if event.has_error {
        Style::default().fg(theme.error).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.success)
    };

    Row::new(vec![
        Cell::from(
            event
                .time
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        ),
        Cell::from(truncate_to_width(&event.model, model_width)),
        Cell::from(event.provider.clone()),
        Cell::from(format!(
            "{}/{}",
            format_number(event.tokens_prompt),
            format_number(event.tokens_completion)
        )),
        Cell::from(format_event_cost(event.cost_usd)),
        Cell::from(format_latency(event.latency_ms)),
        Cell::from(event.status.clone()).style(status_style),
    ])
    .style(Style::default().fg(theme.foreground))
}
