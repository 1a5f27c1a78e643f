//! Rich-text rendering for message bodies.
//!
//! The formatter escapes the body once and then applies a fixed sequence of
//! markup substitutions to the escaped text:
//!
//! 1. `&`, `<`, `>` become entities
//! 2. ```` ```fenced``` ```` blocks become `<pre><code>`, content untouched
//! 3. `` `inline` `` becomes `<code>`
//! 4. `**bold**` becomes `<strong>`
//! 5. `*italic*` becomes `<em>`
//! 6. remaining newlines become `<br>`
//!
//! Bold and italic spans never contain an asterisk. Substituted text is not
//! escaped a second time, so the entity escape in step 1 is the only
//! injection defense.
//!
//! [`format_rich_text`] produces HTML. [`markup_events`] turns that HTML back
//! into a small event stream so non-HTML views share the same decisions.

use crate::conversation::{ConversationLog, TYPING_INDICATOR_ID};
use crate::message::{Message, Sender};
use regex::Regex;
use std::sync::OnceLock;

/// Label of the copy control attached to each code block.
pub const COPY_LABEL: &str = "Copy";

/// Label shown right after a successful copy.
pub const COPIED_LABEL: &str = "Copied!";

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(.*?)```").expect("valid fence regex"))
}

fn inline_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("valid inline code regex"))
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold regex"))
}

fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*([^*]+)\*").expect("valid italic regex"))
}

/// Escape the three HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reverse [`escape_html`].
pub fn unescape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let (decoded, len) = if rest.starts_with("&amp;") {
            ('&', 5)
        } else if rest.starts_with("&lt;") {
            ('<', 4)
        } else if rest.starts_with("&gt;") {
            ('>', 4)
        } else {
            ('&', 1)
        };
        out.push(decoded);
        rest = &rest[len..];
    }
    out.push_str(rest);
    out
}

/// Format a raw message body as HTML.
pub fn format_rich_text(text: &str) -> String {
    let escaped = escape_html(text);
    let mut out = String::with_capacity(escaped.len() + 32);
    let mut last = 0;

    for caps in fence_re().captures_iter(&escaped) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&format_inline(&escaped[last..whole.start()]));

        let content = caps.get(1).map_or("", |m| m.as_str());
        out.push_str("<pre><code>");
        out.push_str(trim_fence_newlines(content));
        out.push_str("</code></pre>");

        last = whole.end();
    }
    out.push_str(&format_inline(&escaped[last..]));
    out
}

/// Steps 3 to 6, applied to text outside fenced blocks.
fn format_inline(segment: &str) -> String {
    if segment.is_empty() {
        return String::new();
    }
    let s = inline_code_re().replace_all(segment, "<code>${1}</code>");
    let s = bold_re().replace_all(&s, "<strong>${1}</strong>");
    let s = italic_re().replace_all(&s, "<em>${1}</em>");
    s.replace('\n', "<br>")
}

/// Drop the newline directly after the opening fence and before the closing one.
fn trim_fence_newlines(content: &str) -> &str {
    let content = content.strip_prefix('\n').unwrap_or(content);
    content.strip_suffix('\n').unwrap_or(content)
}

/// Render one message as a self-contained HTML fragment.
///
/// Every code block gets a copy button appended inside its `<pre>`.
pub fn render_message_html(message: &Message) -> String {
    let body = format_rich_text(&message.body).replace(
        "</code></pre>",
        &format!("</code><button class=\"copy-btn\">{COPY_LABEL}</button></pre>"),
    );
    format!(
        "<div class=\"{classes}\"><div class=\"message-avatar\">{avatar}</div>\
         <div class=\"message-content\">{body}</div></div>",
        classes = message.css_classes(),
        avatar = message.sender.avatar(),
    )
}

/// Render the typing indicator placeholder.
pub fn render_typing_indicator_html() -> String {
    format!(
        "<div class=\"message bot typing-message\" id=\"{TYPING_INDICATOR_ID}\">\
         <div class=\"message-avatar\">{avatar}</div>\
         <div class=\"message-content typing-indicator\">\
         <div class=\"typing-dot\"></div><div class=\"typing-dot\"></div><div class=\"typing-dot\"></div>\
         </div></div>",
        avatar = Sender::Bot.avatar(),
    )
}

/// Render the whole conversation, typing indicator last.
pub fn render_conversation_html(log: &ConversationLog) -> String {
    let mut out = String::new();
    for message in log.messages() {
        out.push_str(&render_message_html(message));
        out.push('\n');
    }
    if log.is_typing() {
        out.push_str(&render_typing_indicator_html());
        out.push('\n');
    }
    out
}

/// Inline or block construct produced by the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupTag {
    /// Fenced, preformatted block.
    CodeBlock,
    /// Inline code span.
    Code,
    /// Bold span.
    Strong,
    /// Italic span.
    Emphasis,
}

/// One event in the formatted body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    /// A construct opens.
    Start(MarkupTag),
    /// A construct closes.
    End(MarkupTag),
    /// Plain text, entities decoded.
    Text(String),
    /// A `<br>`.
    LineBreak,
}

/// Tokenise the output of [`format_rich_text`].
///
/// Spans may close out of order (italic can straddle an inline code span),
/// so consumers should treat starts and ends as toggles rather than a tree.
pub fn markup_events(html: &str) -> Vec<MarkupEvent> {
    let mut events = Vec::new();
    let mut rest = html;
    let mut in_block = false;

    while !rest.is_empty() {
        let Some(open) = rest.find('<') else {
            events.push(MarkupEvent::Text(unescape_html(rest)));
            break;
        };
        if open > 0 {
            events.push(MarkupEvent::Text(unescape_html(&rest[..open])));
        }
        let after = &rest[open..];
        // The formatter never emits a bare '<', so every '<' opens a tag
        let Some(close) = after.find('>') else {
            events.push(MarkupEvent::Text(unescape_html(after)));
            break;
        };
        let tag = &after[1..close];
        rest = &after[close + 1..];

        let event = match tag {
            "pre" => {
                in_block = true;
                Some(MarkupEvent::Start(MarkupTag::CodeBlock))
            }
            "/pre" => {
                in_block = false;
                Some(MarkupEvent::End(MarkupTag::CodeBlock))
            }
            "code" if !in_block => Some(MarkupEvent::Start(MarkupTag::Code)),
            "/code" if !in_block => Some(MarkupEvent::End(MarkupTag::Code)),
            "strong" => Some(MarkupEvent::Start(MarkupTag::Strong)),
            "/strong" => Some(MarkupEvent::End(MarkupTag::Strong)),
            "em" => Some(MarkupEvent::Start(MarkupTag::Emphasis)),
            "/em" => Some(MarkupEvent::End(MarkupTag::Emphasis)),
            "br" => Some(MarkupEvent::LineBreak),
            _ => None,
        };
        if let Some(event) = event {
            events.push(event);
        }
    }
    events
}

/// Text content of every fenced block in a raw body, in order.
///
/// This is exactly what a copy control puts on the clipboard.
pub fn code_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<String> = None;

    for event in markup_events(&format_rich_text(text)) {
        match event {
            MarkupEvent::Start(MarkupTag::CodeBlock) => current = Some(String::new()),
            MarkupEvent::End(MarkupTag::CodeBlock) => {
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
            }
            MarkupEvent::Text(t) => {
                if let Some(block) = current.as_mut() {
                    block.push_str(&t);
                }
            }
            _ => {}
        }
    }
    blocks
}
