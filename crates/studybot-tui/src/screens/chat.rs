//! The chat screen: transcript, compose box, status bar.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Borders, Widget},
};

use super::Screen;
use crate::app::{App, Screen as AppScreen};
use crate::conversation::{input_placeholder, TranscriptWidget};
use crate::ui::theme::Styles;
use crate::ui::widgets::{KeyHint, StatusBar, TextInput};
use crate::ui::{chat_layout, main_layout};

const CHAT_HINTS: [KeyHint; 4] = [
    KeyHint::new("Enter", "Send"),
    KeyHint::new("C-y", "Copy code"),
    KeyHint::new("C-r", "Reset"),
    KeyHint::new("F1", "Help"),
];

pub struct ChatScreen;

impl Screen for ChatScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let (main, status) = main_layout(area);
        let input_rows = app.input_rows(main.width.saturating_sub(2));
        let (transcript, input) = chat_layout(main, input_rows);
        let active = app.screen == AppScreen::Chat && !app.show_help;

        TranscriptWidget::new(app.transcript_view(), &app.scroll)
            .focused(active)
            .render(transcript, buf);

        let pending = app.client.is_pending();
        let title = if pending { " Waiting for reply " } else { " Message " };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(if active && !pending {
                Styles::border_active()
            } else {
                Styles::border()
            })
            .style(Styles::default());
        TextInput::new(&app.input)
            .block(block)
            .focused(active)
            .placeholder(input_placeholder(pending))
            .render(input, buf);

        let mut bar = StatusBar::new("CHAT").hints(&CHAT_HINTS);
        bar = match app.active_notification() {
            Some(text) => bar.notify(text),
            None => bar.right(app.client.session().as_str()),
        };
        bar.render(status, buf);
    }
}
