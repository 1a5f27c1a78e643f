//! studybot-engine: Headless core of the studybot chat client
//!
//! This crate provides everything that does not need a terminal:
//! - Session identity and the ordered message log
//! - Rich-text rendering of message bodies
//! - The HTTP transport to the chat service
//! - The conversation client that ties the request lifecycle together

pub mod client;
pub mod config;
pub mod conversation;
pub mod message;
pub mod render;
pub mod session;
pub mod transport;

// Re-export commonly used types
pub use client::{
    ConversationClient, SendOutcome, INVALID_REPLY_TEXT, REMOTE_ERROR_TEXT, UNREACHABLE_ERROR_TEXT,
};
pub use config::{Config, ConfigError, DEFAULT_MAX_INPUT_HEIGHT};
pub use conversation::{ConversationLog, TYPING_INDICATOR_ID};
pub use message::{Message, Sender};
pub use render::{
    code_blocks, escape_html, format_rich_text, markup_events, render_conversation_html,
    render_message_html, render_typing_indicator_html, MarkupEvent, MarkupTag, COPIED_LABEL,
    COPY_LABEL,
};
pub use session::SessionId;
pub use transport::{
    ChatRequest, ChatTransport, HttpTransport, ReplyMode, ResetRequest, TransportError,
    DEFAULT_BASE_URL,
};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
