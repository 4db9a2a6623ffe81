// Display formatters shared by panels and the headless CLI
//
// Widths are measured in terminal columns (unicode-width), not bytes, so
// CJK text and emoji in chat replies wrap and truncate cleanly.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Thousands separators: `1234567` → `1,234,567`
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Compact K/M suffix: `954356` → `954K`, `1500000` → `1.5M`
pub fn format_compact_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{}K", n / 1_000)
    } else {
        n.to_string()
    }
}

/// Session totals keep four decimals
pub fn format_cost(usd: f64) -> String {
    format!("${:.4}", usd)
}

/// Single calls are often a few millionths of a dollar, so rows keep six
pub fn format_event_cost(usd: f64) -> String {
    format!("${:.6}", usd)
}

pub fn format_latency(ms: Option<u64>) -> String {
    match ms {
        Some(ms) => format!("{}ms", ms),
        None => "-".to_string(),
    }
}

/// Cut to at most `max_width` columns, ending in `…` when shortened
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    let target = max_width.saturating_sub(1);
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > target {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// Greedy word wrap to `max_width` columns, preserving explicit newlines
///
/// Words wider than a line are split at character boundaries.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = word.width();
            let sep = usize::from(!line.is_empty());

            if line_width + sep + word_width <= max_width {
                if sep == 1 {
                    line.push(' ');
                }
                line.push_str(word);
                line_width += sep + word_width;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }

            if word_width <= max_width {
                line.push_str(word);
                line_width = word_width;
                continue;
            }

            // Hard-split an overlong word
            for c in word.chars() {
                let w = c.width().unwrap_or(0);
                if line_width + w > max_width {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                line.push(c);
                line_width += w;
            }
        }

        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_compact_number() {
        assert_eq!(format_compact_number(42), "42");
        assert_eq!(format_compact_number(954_356), "954K");
        assert_eq!(format_compact_number(1_500_000), "1.5M");
    }

    #[test]
    fn test_format_cost_and_latency() {
        assert_eq!(format_cost(0.00012), "$0.0001");
        assert_eq!(format_latency(Some(850)), "850ms");
        assert_eq!(format_latency(None), "-");
    }

    #[test]
    fn test_event_cost_keeps_micro_dollars() {
        assert_eq!(format_event_cost(0.000025), "$0.000025");
        assert_eq!(format_event_cost(0.0), "$0.000000");
        // Same value as a total rounds away
        assert_eq!(format_cost(0.000025), "$0.0000");
    }

    #[test]
    fn test_truncate_uses_display_width() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello world", 6), "hello…");
        // Each CJK char is two columns wide
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(
            wrap_text("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
        assert_eq!(wrap_text("line one\n\nline two", 20), vec!["line one", "", "line two"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }
}
