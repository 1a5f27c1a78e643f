//! Conversation pane: the transcript of messages above the compose box.
//!
//! - [`transcript_lines`] projects the message log into styled lines
//! - [`TranscriptWidget`] draws them with scrolling and the welcome panel
//! - [`input_placeholder`] picks the compose box hint

mod placeholder;
mod transcript;
mod widget;

pub use placeholder::input_placeholder;
pub use transcript::{block_keys, transcript_lines, TranscriptView};
pub use widget::{TranscriptScroll, TranscriptWidget, WELCOME_TITLE};
