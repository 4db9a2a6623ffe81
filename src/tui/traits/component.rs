//! Core component trait

use crate::session::SessionState;
use crate::theme::Theme;
use ratatui::{layout::Rect, Frame};

/// Identity of each panel on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Chat,
    Metrics,
    History,
    Logs,
}

/// Read-only inputs shared by every panel during a frame
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub theme: &'a Theme,
    /// Component that currently owns keyboard focus
    pub focus: ComponentId,
    pub animation_frame: usize,
    /// Snapshot of the session taken at the start of the frame
    pub session: &'a SessionState,
}

impl<'a> RenderContext<'a> {
    pub fn is_focused(&self, id: ComponentId) -> bool {
        self.focus == id
    }

    pub fn spinner_char(&self) -> char {
        const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];
        SPINNER[self.animation_frame % SPINNER.len()]
    }
}

/// Anything that draws itself into a rectangle
///
/// Rendering takes `&mut self` so panels can sync their scroll dimensions with
/// the area they were given before drawing.
pub trait Component {
    fn id(&self) -> ComponentId;

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext);
}
