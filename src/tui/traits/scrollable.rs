//! Scroll navigation shared by list-like panels

use super::{Component, Handled};
use crate::tui::scroll::ScrollState;
use crossterm::event::{KeyCode, KeyEvent};

pub trait Scrollable: Component {
    fn scroll_state(&self) -> &ScrollState;

    fn scroll_state_mut(&mut self) -> &mut ScrollState;

    /// Standard navigation keys: arrows, Home/End, PageUp/PageDown
    fn handle_scroll_keys(&mut self, key: KeyEvent) -> Handled {
        let scroll = self.scroll_state_mut();
        match key.code {
            KeyCode::Up => scroll.scroll_up(),
            KeyCode::Down => scroll.scroll_down(),
            KeyCode::Home => scroll.scroll_to_top(),
            KeyCode::End => scroll.scroll_to_bottom(),
            KeyCode::PageUp => scroll.page_up(),
            KeyCode::PageDown => scroll.page_down(),
            _ => return Handled::No,
        }
        Handled::Yes
    }
}
