// Status bar component
//
// Session totals from the metrics snapshot plus the focused panel's key hints.

use super::formatters::{format_compact_number, format_cost, format_number};
use crate::session::SessionState;
use crate::theme::Theme;
use crate::tui::layout::Breakpoint;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the status bar
///
/// Adapts to terminal width:
/// - Wide: full numbers, models used, key hints
/// - Narrow: compact numbers only
pub fn render(
    f: &mut Frame,
    area: Rect,
    session: &SessionState,
    avg_latency_ms: f64,
    hint: &str,
    theme: &Theme,
) {
    let bp = Breakpoint::from_width(area.width);
    let metrics = session.metrics.clone().unwrap_or_default();

    let text = if bp.at_least(Breakpoint::Wide) {
        let models = if metrics.models_used.is_empty() {
            "-".to_string()
        } else {
            metrics.models_used.join(", ")
        };
        format!(
            " 📡 {} events │ 🔤 {} tokens │ 💰 {} │ ⏱ ~{:.0}ms │ 🤖 {} │ {}",
            format_number(metrics.event_count),
            format_number(metrics.total_tokens),
            format_cost(metrics.total_cost),
            avg_latency_ms,
            models,
            hint,
        )
    } else {
        format!(
            " 📡 {} │ 🔤 {} │ {} │ ~{:.0}ms",
            metrics.event_count,
            format_compact_number(metrics.total_tokens),
            format_cost(metrics.total_cost),
            avg_latency_ms,
        )
    };

    let status = Paragraph::new(text)
        .style(Style::default().fg(theme.status_bar))
        .block(Block::default().borders(Borders::TOP));

    f.render_widget(status, area);
}
