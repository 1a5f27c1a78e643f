//! Multi-line compose box.

use crate::text::wrap_lines;
use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

/// Prompt prefix drawn before the first line.
pub const PROMPT: &str = "> ";

/// A multi-line text input widget.
#[derive(Debug, Clone)]
pub struct TextInput<'a> {
    state: &'a TextInputState,
    block: Option<Block<'a>>,
    focused: bool,
    placeholder: Option<&'a str>,
}

impl<'a> TextInput<'a> {
    /// Create a widget drawing `state`.
    pub fn new(state: &'a TextInputState) -> Self {
        Self {
            state,
            block: None,
            focused: true,
            placeholder: None,
        }
    }

    /// Set the block for the text input.
    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Set focus state.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set placeholder text.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }
}

impl Widget for TextInput<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        if inner.height < 1 || inner.width < 1 {
            return;
        }

        // Show placeholder if empty
        if self.state.is_empty() {
            let mut spans = vec![Span::styled(PROMPT, Styles::active())];
            if self.focused {
                spans.push(Span::styled("█", Styles::active()));
            }
            if let Some(placeholder) = self.placeholder {
                spans.push(Span::styled(placeholder, Styles::dim()));
            }
            Paragraph::new(Line::from(spans)).render(inner, buf);
            return;
        }

        let lines = wrap_lines(self.state.display_lines(self.focused), inner.width as usize);

        // Keep the last rows visible when the content outgrows the box
        let scroll = lines.len().saturating_sub(inner.height as usize) as u16;
        Paragraph::new(lines)
            .style(Styles::default())
            .scroll((scroll, 0))
            .render(inner, buf);
    }
}

/// Compose box state.
#[derive(Debug, Clone)]
pub struct TextInputState {
    content: String,
    /// Cursor position (character index).
    cursor: usize,
    enabled: bool,
}

impl Default for TextInputState {
    fn default() -> Self {
        Self {
            content: String::new(),
            cursor: 0,
            enabled: true,
        }
    }
}

impl TextInputState {
    /// Create a new empty text input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position as a character index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Check if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Whether the content can be sent.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable sending. Editing stays possible either way.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Clear the content.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Take the content, clearing the state.
    pub fn take(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.cursor = 0;
        content
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_idx)
            .map_or(self.content.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_offset(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Insert a literal newline at the cursor position.
    pub fn insert_newline(&mut self) {
        self.insert('\n');
    }

    /// Insert a string at the cursor position.
    pub fn insert_str(&mut self, s: &str) {
        let at = self.byte_offset(self.cursor);
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    /// Delete the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset(self.cursor);
            self.content.remove(at);
        }
    }

    /// Delete the character at the cursor (delete).
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_offset(self.cursor);
            self.content.remove(at);
        }
    }

    /// Move cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Move cursor to start.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to end.
    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Rows needed to show the content wrapped at `width` columns, at least
    /// one and at most `max_height`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn fit_height(&self, width: u16, max_height: u16) -> u16 {
        let rows = wrap_lines(self.display_lines(true), usize::from(width.max(1))).len();
        rows.clamp(1, usize::from(max_height.max(1))) as u16
    }

    /// Content as prompt-prefixed lines, with the block cursor when focused.
    fn display_lines(&self, focused: bool) -> Vec<Line<'static>> {
        let text_style = if self.is_enabled() {
            Styles::default()
        } else {
            Styles::dim()
        };
        let indent = " ".repeat(PROMPT.len());
        let mut lines = Vec::new();
        let mut offset = 0;

        for (idx, line) in self.content().split('\n').enumerate() {
            let prefix = if idx == 0 { PROMPT.to_string() } else { indent.clone() };
            let mut spans = vec![Span::styled(prefix, Styles::active())];
            let len = line.chars().count();
            let cursor = self.cursor();

            if focused && cursor >= offset && cursor <= offset + len {
                let col = cursor - offset;
                let before: String = line.chars().take(col).collect();
                let after: String = line.chars().skip(col).collect();
                spans.push(Span::styled(before, text_style));
                spans.push(Span::styled("█", Styles::active()));
                spans.push(Span::styled(after, text_style));
            } else {
                spans.push(Span::styled(line.to_string(), text_style));
            }
            lines.push(Line::from(spans));
            // +1 for the newline separator
            offset += len + 1;
        }
        lines
    }
}
