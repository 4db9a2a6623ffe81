// Theme support for the TUI
//
// Three built-in palettes selected by name from config. "dark" and "light"
// use named ANSI colors so they follow the terminal's own palette; "mono"
// relies on modifiers only and suits terminals without color.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::BorderType;

pub const THEME_NAMES: &[&str] = &["dark", "light", "mono"];

/// Resolved colors for every UI element
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub border_type: BorderType,

    // ─── Base ────────────────────────────────────────────────
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub highlight: Color,
    pub title: Color,
    pub status_bar: Color,
    pub selection: Color,
    pub selection_fg: Color,

    // ─── Chat ────────────────────────────────────────────────
    pub user_message: Color,
    pub assistant_message: Color,

    // ─── Metrics ─────────────────────────────────────────────
    pub card_events: Color,
    pub card_tokens: Color,
    pub card_cost: Color,
    pub card_latency: Color,
    pub chart_line: Color,

    // ─── Severity ────────────────────────────────────────────
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Look up a palette by name, falling back to dark
    pub fn by_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "light" => Self::light(),
            "mono" | "monochrome" => Self::mono(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!("Unknown theme '{}', using dark", other);
                Self::dark()
            }
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark",
            border_type: BorderType::Rounded,
            background: Color::Reset,
            foreground: Color::White,
            muted: Color::DarkGray,
            border: Color::Gray,
            highlight: Color::Cyan,
            title: Color::Cyan,
            status_bar: Color::Green,
            selection: Color::DarkGray,
            selection_fg: Color::Yellow,
            user_message: Color::LightBlue,
            assistant_message: Color::White,
            card_events: Color::Blue,
            card_tokens: Color::Magenta,
            card_cost: Color::Green,
            card_latency: Color::Yellow,
            chart_line: Color::Cyan,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::LightBlue,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            border_type: BorderType::Rounded,
            background: Color::White,
            foreground: Color::Black,
            muted: Color::Gray,
            border: Color::DarkGray,
            highlight: Color::Blue,
            title: Color::Blue,
            status_bar: Color::DarkGray,
            selection: Color::LightBlue,
            selection_fg: Color::Black,
            user_message: Color::Blue,
            assistant_message: Color::Black,
            card_events: Color::Blue,
            card_tokens: Color::Magenta,
            card_cost: Color::Green,
            card_latency: Color::Rgb(184, 134, 11),
            chart_line: Color::Blue,
            success: Color::Green,
            warning: Color::Rgb(184, 134, 11),
            error: Color::Red,
            info: Color::Blue,
        }
    }

    pub fn mono() -> Self {
        Self {
            name: "mono",
            border_type: BorderType::Plain,
            background: Color::Reset,
            foreground: Color::Reset,
            muted: Color::Reset,
            border: Color::Reset,
            highlight: Color::Reset,
            title: Color::Reset,
            status_bar: Color::Reset,
            selection: Color::Reset,
            selection_fg: Color::Reset,
            user_message: Color::Reset,
            assistant_message: Color::Reset,
            card_events: Color::Reset,
            card_tokens: Color::Reset,
            card_cost: Color::Reset,
            card_latency: Color::Reset,
            chart_line: Color::Reset,
            success: Color::Reset,
            warning: Color::Reset,
            error: Color::Reset,
            info: Color::Reset,
        }
    }

    /// Border style for a panel, emphasized when focused
    pub fn panel_border(&self, focused: bool) -> Style {
        if focused {
            Style::default()
                .fg(self.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.border)
        }
    }

    /// Style for selected rows; mono falls back to reverse video
    pub fn selected(&self) -> Style {
        if self.name == "mono" {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
                .fg(self.selection_fg)
                .bg(self.selection)
                .add_modifier(Modifier::BOLD)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_resolves_known_palettes() {
        for name in THEME_NAMES {
            assert_eq!(Theme::by_name(name).name, *name);
        }
        assert_eq!(Theme::by_name("  LIGHT ").name, "light");
    }

    #[test]
    fn test_unknown_name_falls_back_to_dark() {
        assert_eq!(Theme::by_name("solarized").name, "dark");
    }
}
