// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, background results)
// - Key dispatch to the focused panel

pub mod app;
pub mod components;
pub mod layout;
pub mod scroll;
pub mod traits;
pub mod ui;

use crate::config::Config;
use crate::logging::LogBuffer;
use crate::session::SessionStore;
use anyhow::{Context, Result};
use app::{App, AppUpdate, RightTab};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use scroll::Focus;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use traits::Handled;

/// Run the TUI until the user quits
pub async fn run_tui(config: Config, store: SessionStore, log_buffer: LogBuffer) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let (update_tx, mut update_rx) = mpsc::channel(64);
    let mut app = App::new(&config, store, log_buffer, update_tx);
    app.start();

    let result = run_event_loop(&mut terminal, &mut app, &mut update_rx).await;
    app.stop_polling();

    // Restore terminal even if the loop failed
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on whichever comes first: a key press, the redraw tick, or a
/// background result. Network calls never block this loop.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    update_rx: &mut mpsc::Receiver<AppUpdate>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key_event)) => handle_key_event(app, key_event),
                        Ok(Event::Mouse(mouse_event)) => handle_mouse_event(app, mouse_event),
                        _ => {}
                    }
                }
            } => {}

            _ = tick_interval.tick() => {
                app.tick();
            }

            Some(update) = update_rx.recv() => {
                app.apply(update);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input
///
/// Layered dispatch: global chords → focused panel → pane shortcuts. Plain
/// letters are shortcuts only outside the chat panel, where they are text.
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    if key_event.kind != KeyEventKind::Press {
        return;
    }

    // Layer 1: works from any panel
    if handle_global_keys(app, &key_event) {
        return;
    }

    // Layer 2: chat input
    if app.focus == Focus::Chat {
        match key_event.code {
            KeyCode::Enter => app.send_chat(),
            KeyCode::Esc => app.should_quit = true,
            _ => {
                app.dispatch_to_focused(key_event);
            }
        }
        return;
    }

    // Layer 3: focused panel gets first refusal (g, arrows, Esc to clear)
    if app.dispatch_to_focused(key_event) == Handled::Yes {
        return;
    }

    // Layer 4: right-pane shortcuts
    match key_event.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('R') => app.reset_session(),
        KeyCode::Char('y') => app.copy_to_clipboard(),
        KeyCode::Char('L') => app.toggle_logs(),
        _ => {}
    }
}

/// Keys that behave the same regardless of focus; returns true if handled
fn handle_global_keys(app: &mut App, key_event: &KeyEvent) -> bool {
    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

    match key_event.code {
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Char('y') if ctrl => app.copy_to_clipboard(),
        KeyCode::Char('l') if ctrl => app.toggle_logs(),
        KeyCode::Char('r') if ctrl => app.refresh(),
        KeyCode::Tab | KeyCode::BackTab => app.focus_next(),
        KeyCode::F(1) => app.set_tab(RightTab::Metrics),
        KeyCode::F(2) => app.set_tab(RightTab::History),
        _ => return false,
    }
    true
}

/// Mouse wheel scrolls whichever panel has focus
fn handle_mouse_event(app: &mut App, mouse_event: MouseEvent) {
    let code = match mouse_event.kind {
        MouseEventKind::ScrollUp => KeyCode::Up,
        MouseEventKind::ScrollDown => KeyCode::Down,
        _ => return,
    };
    app.dispatch_to_focused(KeyEvent::new(code, KeyModifiers::NONE));
}
