//! Projection of the message log into styled terminal lines.

use std::time::Instant;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use studybot_engine::{
    code_blocks, format_rich_text, markup_events, ConversationLog, MarkupEvent, MarkupTag,
    Message, Sender,
};

use crate::copy::{BlockKey, CopyControls};
use crate::ui::theme::{typing_frame, Styles};

const BODY_INDENT: &str = "   ";
const BLOCK_GUTTER: &str = "   │ ";

/// Everything the transcript needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptView<'a> {
    pub log: &'a ConversationLog,
    pub copy: &'a CopyControls,
    pub selected: Option<BlockKey>,
    pub now: Instant,
    pub tick: usize,
}

/// Display name next to the avatar.
fn sender_name(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "You",
        Sender::Bot => "Study Bot",
    }
}

/// Every code block in the log, oldest first.
pub fn block_keys(log: &ConversationLog) -> Vec<BlockKey> {
    log.messages()
        .iter()
        .flat_map(|m| (0..code_blocks(&m.body).len()).map(move |idx| (m.id, idx)))
        .collect()
}

/// Unwrapped lines for the whole transcript, typing indicator last.
pub fn transcript_lines(view: &TranscriptView<'_>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in view.log.messages() {
        lines.push(header_line(message.sender, message.is_error));
        lines.extend(body_lines(message, view));
        lines.push(Line::default());
    }
    if view.log.is_typing() {
        lines.push(header_line(Sender::Bot, false));
        lines.push(Line::from(vec![
            Span::raw(BODY_INDENT),
            Span::styled(typing_frame(view.tick), Styles::dim()),
        ]));
    }
    lines
}

fn header_line(sender: Sender, is_error: bool) -> Line<'static> {
    Line::from(Span::styled(
        format!("{} {}", sender.avatar(), sender_name(sender)),
        Styles::sender(sender, is_error),
    ))
}

fn body_lines(message: &Message, view: &TranscriptView<'_>) -> Vec<Line<'static>> {
    let base = if message.is_error {
        Styles::error()
    } else {
        Styles::default()
    };
    let mut out = BodyProjector::new(base);

    for event in markup_events(&format_rich_text(&message.body)) {
        match event {
            MarkupEvent::Start(MarkupTag::CodeBlock) => out.open_block(),
            MarkupEvent::End(MarkupTag::CodeBlock) => {
                let key = (message.id, out.block_index);
                let label = view.copy.label(key, view.now);
                out.close_block(label, view.selected == Some(key));
            }
            MarkupEvent::Start(tag) => out.toggle(tag, true),
            MarkupEvent::End(tag) => out.toggle(tag, false),
            MarkupEvent::Text(text) => out.text(text),
            MarkupEvent::LineBreak => out.flush(),
        }
    }
    out.finish()
}

/// Streams markup events into lines. Inline tags are toggles since spans
/// from the formatter may overlap.
struct BodyProjector {
    base: Style,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    code: bool,
    strong: bool,
    emphasis: bool,
    block: Option<String>,
    block_index: usize,
}

impl BodyProjector {
    fn new(base: Style) -> Self {
        Self {
            base,
            lines: Vec::new(),
            current: Vec::new(),
            code: false,
            strong: false,
            emphasis: false,
            block: None,
            block_index: 0,
        }
    }

    fn style(&self) -> Style {
        if self.code {
            return Styles::code();
        }
        let mut style = self.base;
        if self.strong {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.emphasis {
            style = style.add_modifier(Modifier::ITALIC);
        }
        style
    }

    fn toggle(&mut self, tag: MarkupTag, on: bool) {
        match tag {
            MarkupTag::Code => self.code = on,
            MarkupTag::Strong => self.strong = on,
            MarkupTag::Emphasis => self.emphasis = on,
            MarkupTag::CodeBlock => {}
        }
    }

    fn text(&mut self, text: String) {
        if let Some(block) = self.block.as_mut() {
            block.push_str(&text);
        } else if !text.is_empty() {
            let style = self.style();
            self.current.push(Span::styled(text, style));
        }
    }

    fn flush(&mut self) {
        let mut spans = vec![Span::raw(BODY_INDENT)];
        spans.append(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn open_block(&mut self) {
        if !self.current.is_empty() {
            self.flush();
        }
        self.block = Some(String::new());
    }

    fn close_block(&mut self, label: &str, selected: bool) {
        let content = self.block.take().unwrap_or_default();
        for line in content.split('\n') {
            self.lines.push(Line::from(vec![
                Span::styled(BLOCK_GUTTER, Styles::border()),
                Span::styled(line.to_string(), Styles::code()),
            ]));
        }
        self.lines.push(Line::from(vec![
            Span::raw(BODY_INDENT),
            Span::styled(format!("[{label}]"), Styles::copy_control(selected)),
        ]));
        self.block_index += 1;
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if !self.current.is_empty() || self.lines.is_empty() {
            self.flush();
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studybot_engine::{COPIED_LABEL, COPY_LABEL};

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn render(
        log: &ConversationLog,
        copy: &CopyControls,
        selected: Option<BlockKey>,
    ) -> Vec<String> {
        let view = TranscriptView {
            log,
            copy,
            selected,
            now: Instant::now(),
            tick: 0,
        };
        transcript_lines(&view).iter().map(text_of).collect()
    }

    #[test]
    fn test_messages_in_order_with_headers() {
        let mut log = ConversationLog::new();
        log.push_user("What is Rust?");
        log.push_bot("A systems language.");

        let lines = render(&log, &CopyControls::new(), None);
        assert_eq!(lines[0], "👤 You");
        assert_eq!(lines[1], "   What is Rust?");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "🤖 Study Bot");
        assert_eq!(lines[4], "   A systems language.");
    }

    #[test]
    fn test_line_breaks_split_lines() {
        let mut log = ConversationLog::new();
        log.push_user("one\ntwo");
        let lines = render(&log, &CopyControls::new(), None);
        assert_eq!(lines[1], "   one");
        assert_eq!(lines[2], "   two");
    }

    #[test]
    fn test_markup_is_styled_not_printed() {
        let mut log = ConversationLog::new();
        log.push_bot("use **bold** and `code`");
        let view = TranscriptView {
            log: &log,
            copy: &CopyControls::new(),
            selected: None,
            now: Instant::now(),
            tick: 0,
        };
        let lines = transcript_lines(&view);
        assert_eq!(text_of(&lines[1]), "   use bold and code");

        let bold = lines[1]
            .spans
            .iter()
            .find(|s| s.content == "bold")
            .unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
        let code = lines[1]
            .spans
            .iter()
            .find(|s| s.content == "code")
            .unwrap();
        assert_eq!(code.style, Styles::code());
    }

    #[test]
    fn test_code_block_gets_gutter_and_copy_control() {
        let mut log = ConversationLog::new();
        let id = log.push_bot("Try:\n```\nlet x = 1;\nlet y = 2;\n```");

        let lines = render(&log, &CopyControls::new(), None);
        assert_eq!(lines[1], "   Try:");
        assert!(lines.contains(&"   │ let x = 1;".to_string()));
        assert!(lines.contains(&"   │ let y = 2;".to_string()));
        assert!(lines.contains(&format!("   [{COPY_LABEL}]")));

        let mut copy = CopyControls::new();
        copy.record_copy((id, 0), Instant::now());
        let lines = render(&log, &copy, Some((id, 0)));
        assert!(lines.contains(&format!("   [{COPIED_LABEL}]")));
    }

    #[test]
    fn test_error_message_uses_error_style() {
        let mut log = ConversationLog::new();
        log.push_bot_error("Network breakdown.");
        let view = TranscriptView {
            log: &log,
            copy: &CopyControls::new(),
            selected: None,
            now: Instant::now(),
            tick: 0,
        };
        let lines = transcript_lines(&view);
        assert_eq!(lines[1].spans[1].style, Styles::error());
    }

    #[test]
    fn test_typing_indicator_last() {
        let mut log = ConversationLog::new();
        log.push_user("hi");
        log.show_typing();
        let lines = render(&log, &CopyControls::new(), None);
        assert_eq!(lines[lines.len() - 2], "🤖 Study Bot");
        assert_eq!(lines[lines.len() - 1], format!("   {}", typing_frame(0)));
    }

    #[test]
    fn test_empty_body_keeps_a_line() {
        let mut log = ConversationLog::new();
        log.push_bot("");
        let lines = render(&log, &CopyControls::new(), None);
        assert_eq!(lines, vec!["🤖 Study Bot", "   ", ""]);
    }

    #[test]
    fn test_block_keys_in_order() {
        let mut log = ConversationLog::new();
        let a = log.push_bot("```a``` and ```b```");
        log.push_user("no code");
        let c = log.push_bot("```c```");
        assert_eq!(block_keys(&log), vec![(a, 0), (a, 1), (c, 0)]);
    }
}
