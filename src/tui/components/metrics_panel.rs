// Metrics panel component
//
// Summary cards, a token-usage line chart bucketed by the selected
// granularity, models used, and the latest few calls. Counters come from the
// session metrics snapshot; the chart and latency come from recent events.

use super::formatters::{format_cost, format_latency, format_number, truncate_to_width};
use crate::metrics::{ChartPoint, Granularity, MetricsView};
use crate::theme::Theme;
use crate::tui::layout::Breakpoint;
use crate::tui::traits::{Component, ComponentId, Handled, Interactive, RenderContext};
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

/// Calls listed under "Recent"
const RECENT_ROWS: usize = 5;

pub struct MetricsPanel {
    pub view: MetricsView,
    /// Set until the first events fetch settles
    loading: bool,
}

impl MetricsPanel {
    pub fn new(granularity: Granularity) -> Self {
        Self {
            view: MetricsView::new(granularity),
            loading: true,
        }
    }

    pub fn set_loaded(&mut self) {
        self.loading = false;
    }

    fn render_cards(&self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let metrics = ctx.session.metrics.clone().unwrap_or_default();
        let theme = ctx.theme;
        let cards = [
            ("Total Events", format_number(metrics.event_count), theme.card_events),
            ("Total Tokens", format_number(metrics.total_tokens), theme.card_tokens),
            ("Total Cost", format_cost(metrics.total_cost), theme.card_cost),
            (
                "Avg Latency",
                format!("{:.0}ms", self.view.summary().avg_latency_ms),
                theme.card_latency,
            ),
        ];

        let cells: Vec<Rect> = if Breakpoint::from_width(area.width).at_least(Breakpoint::Normal) {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, 4); 4])
                .split(area)
                .to_vec()
        } else {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Ratio(1, 2); 2])
                .split(area);
            rows.iter()
                .flat_map(|row| {
                    Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([Constraint::Ratio(1, 2); 2])
                        .split(*row)
                        .to_vec()
                })
                .collect()
        };

        for ((label, value, color), cell) in cards.into_iter().zip(cells) {
            let card = Paragraph::new(Line::from(Span::styled(
                value,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(theme.border_type)
                    .border_style(Style::default().fg(color))
                    .title(format!(" {} ", label)),
            );
            f.render_widget(card, cell);
        }
    }

    fn render_chart(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let granularity = self.view.granularity();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.border))
            .title(format!(" Token Usage per {} ", granularity))
            .title_top(Line::from(" g: granularity ").right_aligned());

        let points = self.view.chart();
        if points.is_empty() {
            let placeholder = Paragraph::new("No events yet - send a chat message")
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.muted))
                .block(block);
            f.render_widget(placeholder, area);
            return;
        }

        let data = chart_data(points);
        let max_tokens = points.iter().map(|p| p.tokens).max().unwrap_or(0).max(1);
        let y_max = (max_tokens as f64 * 1.1).ceil();
        let x_max = (points.len().saturating_sub(1)).max(1) as f64;

        let datasets = vec![Dataset::default()
            .name("tokens")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme.chart_line))
            .data(&data)];

        let label_style = Style::default().fg(theme.muted);
        let x_labels = x_axis_labels(points)
            .into_iter()
            .map(|l| Span::styled(l, label_style))
            .collect::<Vec<_>>();
        let y_labels = vec![
            Span::styled("0", label_style),
            Span::styled(format_number((y_max / 2.0) as u64), label_style),
            Span::styled(format_number(y_max as u64), label_style),
        ];

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(theme.border))
                    .bounds([0.0, x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(theme.border))
                    .bounds([0.0, y_max])
                    .labels(y_labels),
            );

        f.render_widget(chart, area);
    }

    fn render_details(&self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        let width = area.width.saturating_sub(2) as usize;
        let label = Style::default().fg(theme.muted);
        let mut lines = Vec::new();

        let models = ctx
            .session
            .metrics
            .as_ref()
            .map(|m| m.models_used.join(", "))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "-".to_string());
        lines.push(Line::from(vec![
            Span::styled("Models: ", label),
            Span::styled(
                truncate_to_width(&models, width.saturating_sub(8)),
                Style::default().fg(theme.foreground),
            ),
        ]));

        for event in self.view.events().iter().take(RECENT_ROWS) {
            let status_color = if event.has_error {
                theme.error
            } else {
                theme.success
            };
            let line = format!(
                "{} {} · {} tokens · {}",
                event.time.with_timezone(&Local).format("%H:%M:%S"),
                event.model,
                format_number(event.token_sum()),
                format_latency(event.latency_ms),
            );
            lines.push(Line::from(vec![
                Span::styled("● ", Style::default().fg(status_color)),
                Span::styled(
                    truncate_to_width(&line, width.saturating_sub(2)),
                    Style::default().fg(theme.foreground),
                ),
            ]));
        }

        let details = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(theme.border))
                .title(" Recent "),
        );
        f.render_widget(details, area);
    }
}

impl Component for MetricsPanel {
    fn id(&self) -> ComponentId {
        ComponentId::Metrics
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        if self.loading && ctx.session.metrics.is_none() {
            let loading = Paragraph::new(format!("{} Loading metrics...", ctx.spinner_char()))
                .alignment(Alignment::Center)
                .style(Style::default().fg(ctx.theme.muted));
            f.render_widget(loading, area);
            return;
        }

        let card_height = if Breakpoint::from_width(area.width).at_least(Breakpoint::Normal) {
            3
        } else {
            6
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(card_height),
                Constraint::Min(8),
                Constraint::Length(RECENT_ROWS as u16 + 3),
            ])
            .split(area);

        self.render_cards(f, chunks[0], ctx);
        self.render_chart(f, chunks[1], ctx.theme);
        self.render_details(f, chunks[2], ctx);
    }
}

impl Interactive for MetricsPanel {
    fn handle_key(&mut self, key: KeyEvent) -> Handled {
        match key.code {
            KeyCode::Char('g') => {
                let granularity = self.view.cycle_granularity();
                tracing::debug!("Chart granularity: {}", granularity);
                Handled::Yes
            }
            _ => Handled::No,
        }
    }

    fn focus_hint(&self) -> Option<&'static str> {
        Some("g:granularity  r:refresh  R:reset  F2:history")
    }
}

/// Chart coordinates: x is the bucket index so labels stay evenly spaced
fn chart_data(points: &[ChartPoint]) -> Vec<(f64, f64)> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.tokens as f64))
        .collect()
}

/// First, middle and last bucket labels
fn x_axis_labels(points: &[ChartPoint]) -> Vec<String> {
    match points.len() {
        0 => Vec::new(),
        1 => vec![points[0].label.clone()],
        2 => vec![points[0].label.clone(), points[1].label.clone()],
        n => vec![
            points[0].label.clone(),
            points[n / 2].label.clone(),
            points[n - 1].label.clone(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(label: &str, tokens: u64) -> ChartPoint {
        ChartPoint {
            label: label.to_string(),
            tokens,
            timestamp_ms: 0,
        }
    }

    #[test]
    fn test_chart_data_uses_bucket_index() {
        let data = chart_data(&[point("10:15", 20), point("10:16", 5)]);
        assert_eq!(data, vec![(0.0, 20.0), (1.0, 5.0)]);
    }

    #[test]
    fn test_axis_labels_pick_ends_and_middle() {
        let points: Vec<ChartPoint> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|l| point(l, 1))
            .collect();
        assert_eq!(x_axis_labels(&points), vec!["a", "c", "e"]);
        assert_eq!(x_axis_labels(&points[..1]), vec!["a"]);
    }

    #[test]
    fn test_g_cycles_granularity() {
        let mut panel = MetricsPanel::new(Granularity::Minute);
        let key = KeyEvent::new(KeyCode::Char('g'), crossterm::event::KeyModifiers::NONE);
        assert_eq!(panel.handle_key(key), Handled::Yes);
        assert_eq!(panel.view.granularity(), Granularity::Hour);
    }
}
