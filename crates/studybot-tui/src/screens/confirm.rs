//! Confirmation dialogs drawn over the chat screen.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use super::chat::ChatScreen;
use super::Screen;
use crate::app::App;
use crate::ui::centered_fixed;
use crate::ui::theme::Styles;

/// Question asked before the conversation is cleared.
pub const RESET_PROMPT: &str = "Start a fresh conversation? History will be cleared.";

/// Question asked before leaving.
pub const QUIT_PROMPT: &str = "Leave Study Bot? The conversation is not saved.";

/// Reset confirmation overlay.
pub struct ResetConfirmScreen;

impl Screen for ResetConfirmScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        ChatScreen.render(app, area, buf);
        render_confirm_overlay(" New Conversation ", RESET_PROMPT, "Reset", area, buf);
    }
}

/// Quit confirmation overlay.
pub struct QuitConfirmScreen;

impl Screen for QuitConfirmScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        ChatScreen.render(app, area, buf);
        render_confirm_overlay(" Quit ", QUIT_PROMPT, "Quit", area, buf);
    }
}

fn render_confirm_overlay(title: &str, prompt: &str, verb: &str, area: Rect, buf: &mut Buffer) {
    let width = 60.min(area.width.saturating_sub(4));
    let height = 7.min(area.height.saturating_sub(2));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(title.to_string())
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .style(Styles::default());

    let inner = block.inner(overlay_area);
    block.render(overlay_area, buf);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {prompt}"), Styles::default())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  ", Styles::default()),
            Span::styled("[y]", Styles::key_hint()),
            Span::styled(format!(" {verb}   "), Styles::default()),
            Span::styled("[n]", Styles::key_hint()),
            Span::styled(" Cancel", Styles::default()),
        ]),
    ];

    Paragraph::new(lines)
        .style(Styles::default())
        .render(inner, buf);
}
