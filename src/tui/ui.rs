// Frame layout
//
// ┌ title bar ─────────────────────────────────────────┐
// │ chat                    │ [Metrics] [History]       │
// │                         │ active tab                │
// ├ system logs (toggle) ───────────────────────────────┤
// └ status bar ─────────────────────────────────────────┘

use super::app::{App, RightTab};
use super::components::{status_bar, title_bar};
use super::traits::{Component, RenderContext};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::Tabs,
    Frame,
};

/// Height of the logs panel when visible
const LOGS_HEIGHT: u16 = 8;

pub fn draw(f: &mut Frame, app: &mut App) {
    app.refresh_session();

    let mut constraints = vec![Constraint::Length(3), Constraint::Min(10)];
    if app.show_logs {
        constraints.push(Constraint::Length(LOGS_HEIGHT));
    }
    constraints.push(Constraint::Length(2));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    let spinner = app.spinner_char();
    title_bar::render(f, rows[0], &app.session, spinner, &app.theme);

    let ctx = RenderContext {
        theme: &app.theme,
        focus: app.focused_component(),
        animation_frame: app.animation_frame(),
        session: &app.session,
    };

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    app.chat.render(f, body[0], &ctx);
    render_right_pane(f, body[1], app.tab, &mut app.metrics, &mut app.history, &ctx);

    if app.show_logs {
        app.logs.render(f, rows[2], &ctx);
    }

    let status_area = rows[rows.len() - 1];
    let avg_latency = app.metrics.view.summary().avg_latency_ms;
    status_bar::render(
        f,
        status_area,
        &app.session,
        avg_latency,
        app.focus_hint(),
        &app.theme,
    );

    if let Some(toast) = &app.toast {
        toast.render(f, f.area(), &app.theme);
    }
}

fn render_right_pane(
    f: &mut Frame,
    area: Rect,
    tab: RightTab,
    metrics: &mut impl Component,
    history: &mut impl Component,
    ctx: &RenderContext,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    let titles = [RightTab::Metrics, RightTab::History]
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!(" {} [F{}] ", t.title(), i + 1)))
        .collect::<Vec<_>>();
    let selected = match tab {
        RightTab::Metrics => 0,
        RightTab::History => 1,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(ctx.theme.muted))
        .highlight_style(
            Style::default()
                .fg(ctx.theme.highlight)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider("│");
    f.render_widget(tabs, chunks[0]);

    match tab {
        RightTab::Metrics => metrics.render(f, chunks[1], ctx),
        RightTab::History => history.render(f, chunks[1], ctx),
    }
}
