//! Clipboard export for components

use super::Component;

pub trait Copyable: Component {
    /// Text for the clipboard, `None` when there is nothing to copy
    fn copy_text(&self) -> Option<String>;

    /// Noun used in the toast, e.g. "reply"
    fn copy_description(&self) -> &'static str {
        "content"
    }
}
