//! Transcript widget.

use std::cell::Cell;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use super::transcript::{transcript_lines, TranscriptView};
use crate::text::wrap_lines;
use crate::ui::theme::Styles;

/// Heading of the panel shown before the first message.
pub const WELCOME_TITLE: &str = "Welcome to Study Bot";

/// Scroll position, counted in rows up from the newest line.
///
/// Zero means "follow": new messages stay in view.
#[derive(Debug, Default)]
pub struct TranscriptScroll {
    from_bottom: usize,
    /// Largest useful offset, refreshed on every draw.
    max: Cell<usize>,
}

impl TranscriptScroll {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows scrolled up from the end.
    pub fn offset(&self) -> usize {
        self.from_bottom
    }

    /// Whether the view sticks to the newest message.
    pub fn is_following(&self) -> bool {
        self.from_bottom == 0
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.from_bottom = (self.from_bottom + rows).min(self.max.get());
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.from_bottom = self.from_bottom.saturating_sub(rows);
    }

    /// Jump to the newest message.
    pub fn scroll_to_end(&mut self) {
        self.from_bottom = 0;
    }
}

/// Bordered transcript, or the welcome panel when nothing was said yet.
pub struct TranscriptWidget<'a> {
    view: TranscriptView<'a>,
    scroll: &'a TranscriptScroll,
    focused: bool,
}

impl<'a> TranscriptWidget<'a> {
    pub fn new(view: TranscriptView<'a>, scroll: &'a TranscriptScroll) -> Self {
        Self {
            view,
            scroll,
            focused: true,
        }
    }

    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

fn welcome_lines() -> Vec<Line<'static>> {
    vec![
        Line::default(),
        Line::from(Span::styled(WELCOME_TITLE, Styles::title())),
        Line::default(),
        Line::from(Span::styled(
            "Your study companion for concepts, code, and math.",
            Styles::default(),
        )),
        Line::default(),
        Line::from(Span::styled("Try asking:", Styles::dim())),
        Line::from(Span::styled("\"Explain recursion with an example\"", Styles::dim())),
        Line::from(Span::styled("\"Solve 2x + 3 = 11\"", Styles::dim())),
        Line::from(Span::styled("\"Give me tips for exam week\"", Styles::dim())),
    ]
}

impl Widget for TranscriptWidget<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Conversation ")
            .title_style(Styles::title())
            .borders(Borders::ALL)
            .border_style(if self.focused {
                Styles::border_active()
            } else {
                Styles::border()
            })
            .style(Styles::default());
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.view.log.is_empty() && !self.view.log.is_typing() {
            self.scroll.max.set(0);
            Paragraph::new(welcome_lines())
                .alignment(Alignment::Center)
                .style(Styles::default())
                .render(inner, buf);
            return;
        }

        let lines = wrap_lines(transcript_lines(&self.view), inner.width as usize);
        let max = lines.len().saturating_sub(inner.height as usize);
        self.scroll.max.set(max);
        let top = max - self.scroll.offset().min(max);

        Paragraph::new(lines)
            .style(Styles::default())
            .scroll((top.min(u16::MAX as usize) as u16, 0))
            .render(inner, buf);
    }
}
