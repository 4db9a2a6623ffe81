// Scroll state and focus targets for TUI panels
//
// Each panel owns a ScrollState; the App only routes input to whichever
// panel has focus. Auto-follow keeps a growing transcript pinned to the
// bottom until the user scrolls up.

/// Scroll position over a list of lines or rows
#[derive(Debug, Clone)]
pub struct ScrollState {
    /// Index of the first visible line
    offset: usize,
    total: usize,
    viewport: usize,
    /// Snap to the bottom when content grows
    pub auto_follow: bool,
    /// Whether reaching the bottom re-enables auto-follow
    sticky: bool,
}

impl ScrollState {
    /// Starts pinned to the bottom
    pub fn new() -> Self {
        Self {
            offset: 0,
            total: 0,
            viewport: 0,
            auto_follow: true,
            sticky: true,
        }
    }

    /// Starts at the top and stays there as content changes
    pub fn manual() -> Self {
        Self {
            auto_follow: false,
            sticky: false,
            ..Self::new()
        }
    }

    /// Sync with current content size; call once per frame before rendering
    pub fn update_dimensions(&mut self, total: usize, viewport: usize) {
        self.total = total;
        self.viewport = viewport;

        if self.auto_follow {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    pub fn scroll_up(&mut self) {
        if self.offset > 0 {
            self.offset -= 1;
            self.auto_follow = false;
        }
    }

    pub fn scroll_down(&mut self) {
        if self.offset < self.max_offset() {
            self.offset += 1;
        }
        if self.offset >= self.max_offset() && self.follows_by_default() {
            self.auto_follow = true;
        }
    }

    pub fn page_up(&mut self) {
        self.offset = self.offset.saturating_sub(self.viewport.max(1));
        self.auto_follow = false;
    }

    pub fn page_down(&mut self) {
        self.offset = (self.offset + self.viewport.max(1)).min(self.max_offset());
        if self.offset >= self.max_offset() && self.follows_by_default() {
            self.auto_follow = true;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.auto_follow = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.auto_follow = self.follows_by_default();
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// `(start, end)` indices of the visible slice
    pub fn visible_range(&self) -> (usize, usize) {
        let end = (self.offset + self.viewport).min(self.total);
        (self.offset.min(end), end)
    }

    pub fn needs_scrollbar(&self) -> bool {
        self.total > self.viewport
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }

    fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.viewport)
    }

    fn follows_by_default(&self) -> bool {
        self.sticky && self.total > 0
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

/// Panels that can receive keyboard input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Chat,
    /// Metrics or History, whichever tab is active
    RightPane,
    Logs,
}

impl Focus {
    /// Tab order; the logs panel only joins the cycle while visible
    pub fn next(self, logs_visible: bool) -> Self {
        match self {
            Focus::Chat => Focus::RightPane,
            Focus::RightPane if logs_visible => Focus::Logs,
            Focus::RightPane | Focus::Logs => Focus::Chat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_follow_on_new_content() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(10, 5);
        assert_eq!(scroll.offset(), 5);

        scroll.update_dimensions(15, 5);
        assert_eq!(scroll.offset(), 10);
    }

    #[test]
    fn test_scroll_up_disables_auto_follow() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(20, 5);

        scroll.scroll_up();
        assert!(!scroll.auto_follow);
        assert_eq!(scroll.offset(), 14);

        // New content no longer drags the view down
        scroll.update_dimensions(30, 5);
        assert_eq!(scroll.offset(), 14);
    }

    #[test]
    fn test_scrolling_back_to_bottom_resumes_following() {
        let mut scroll = ScrollState::new();
        scroll.update_dimensions(20, 5);
        scroll.scroll_up();
        scroll.scroll_down();
        assert!(scroll.auto_follow);
    }

    #[test]
    fn test_visible_range() {
        let mut scroll = ScrollState::manual();
        scroll.update_dimensions(100, 10);
        assert_eq!(scroll.visible_range(), (0, 10));

        scroll.page_down();
        assert_eq!(scroll.visible_range(), (10, 20));
    }

    #[test]
    fn test_focus_cycle_skips_hidden_logs() {
        assert_eq!(Focus::Chat.next(false), Focus::RightPane);
        assert_eq!(Focus::RightPane.next(false), Focus::Chat);
        assert_eq!(Focus::RightPane.next(true), Focus::Logs);
        assert_eq!(Focus::Logs.next(true), Focus::Chat);
    }
}
