use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::fmt::{money, signed_pct};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const UP_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const DOWN_STYLE: Style = Style::new().fg(Color::Red);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

pub const INVALID_STYLE: Style = Style::new().fg(Color::Red);

/// Credit amounts render green; the book only collects premium.
pub fn credit_span(amount: f64) -> Span<'static> {
    Span::styled(money(amount), UP_STYLE)
}

/// A day-change percentage colored by sign.
pub fn change_span(pct: f64) -> Span<'static> {
    let style = if pct < 0.0 { DOWN_STYLE } else { UP_STYLE };
    Span::styled(signed_pct(pct), style)
}

/// Wrap text to a given width. Returns (wrapped_string, line_count).
pub fn wrap_text(text: &str, width: usize) -> (String, u16) {
    if width == 0 {
        return (text.to_string(), 1);
    }
    let wrapped = textwrap::fill(text, width);
    let lines = wrapped.lines().count().max(1) as u16;
    (wrapped, lines)
}
