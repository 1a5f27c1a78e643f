//! Status bar widget.

use crate::text::{truncate_to_width, visual_width};
use crate::ui::theme::{Palette, Styles};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

/// A key hint for the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub label: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Bottom bar: a mode badge, key hints, and right-aligned session or
/// notification text.
#[derive(Debug, Clone)]
pub struct StatusBar<'a> {
    mode: &'a str,
    hints: &'a [KeyHint],
    right_text: Option<&'a str>,
    right_style: Style,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar.
    pub fn new(mode: &'a str) -> Self {
        Self {
            mode,
            hints: &[],
            right_text: None,
            right_style: Styles::status_bar(),
        }
    }

    /// Add key hints.
    #[must_use]
    pub fn hints(mut self, hints: &'a [KeyHint]) -> Self {
        self.hints = hints;
        self
    }

    /// Set right-aligned text.
    #[must_use]
    pub fn right(mut self, text: &'a str) -> Self {
        self.right_text = Some(text);
        self
    }

    /// Highlight the right-aligned text as a notification.
    #[must_use]
    pub fn notify(mut self, text: &'a str) -> Self {
        self.right_text = Some(text);
        self.right_style = Style::default()
            .fg(Palette::SUCCESS)
            .bg(Palette::STATUS_BG);
        self
    }
}

impl Widget for StatusBar<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        for x in area.x..area.x.saturating_add(area.width) {
            buf[(x, area.y)].set_char(' ').set_bg(Palette::STATUS_BG);
        }

        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.mode),
                Styles::default().bg(Palette::ACCENT).fg(Palette::BG),
            ),
            Span::styled(" ", Styles::status_bar()),
        ];

        for hint in self.hints {
            spans.push(Span::styled(format!(" {} ", hint.key), Styles::key_hint()));
            spans.push(Span::styled(format!(" {} ", hint.label), Styles::key_label()));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);

        // Right side gets at most half the bar
        if let Some(text) = self.right_text {
            let text = truncate_to_width(text, usize::from(area.width / 2));
            let text_len = visual_width(&text) as u16;
            if text_len < area.width {
                let x = area.x + area.width - text_len - 1;
                buf.set_string(x, area.y, &text, self.right_style);
            }
        }
    }
}
