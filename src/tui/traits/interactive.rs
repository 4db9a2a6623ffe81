//! Keyboard handling for focusable components

use super::Component;
use crossterm::event::KeyEvent;

/// Whether a component consumed a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Yes,
    No,
}

/// Component that reacts to keys while focused
///
/// Unhandled keys bubble back to the App for global shortcuts.
pub trait Interactive: Component {
    fn handle_key(&mut self, key: KeyEvent) -> Handled;

    /// Key hints shown in the status bar while focused
    fn focus_hint(&self) -> Option<&'static str> {
        None
    }
}
