// Title bar component
//
// App name, active session, and the session store's loading/error state.

use crate::session::SessionState;
use crate::theme::Theme;
use crate::tui::layout::Breakpoint;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the title bar
///
/// Shows the first 8 characters of the session id and its event count. A
/// lifecycle error (failed create/reset) replaces the counters in red.
pub fn render(f: &mut Frame, area: Rect, session: &SessionState, spinner: char, theme: &Theme) {
    let bp = Breakpoint::from_width(area.width);
    let name = if bp.at_least(Breakpoint::Normal) {
        " 🔭 LLM Scope"
    } else {
        " 🔭"
    };

    let mut spans = vec![Span::styled(
        name,
        Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
    )];

    if session.is_loading {
        spans.push(Span::styled(
            format!(" {} loading", spinner),
            Style::default().fg(theme.muted),
        ));
    }

    spans.push(Span::raw(" ──── "));

    if let Some(error) = &session.error {
        spans.push(Span::styled(
            format!("⚠ {}", error),
            Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
        ));
    } else {
        match session.short_id() {
            Some(id) => {
                spans.push(Span::styled(
                    format!("Session: {}", id),
                    Style::default().fg(theme.foreground),
                ));
                if let Some(count) = event_count(session) {
                    spans.push(Span::styled(
                        format!(" · {} events", count),
                        Style::default().fg(theme.muted),
                    ));
                }
            }
            None => spans.push(Span::styled(
                "No session",
                Style::default().fg(theme.muted),
            )),
        }
    }

    let title = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.title)),
    );

    f.render_widget(title, area);
}

/// Metrics are polled more often than session info, so prefer their count
fn event_count(session: &SessionState) -> Option<u64> {
    session
        .metrics
        .as_ref()
        .map(|m| m.event_count)
        .or_else(|| session.info.as_ref().map(|i| i.event_count))
}
