//! Conversation message model.
//!
//! Messages are the ordered log the client keeps instead of relying on
//! rendered output as its history. Every view is a projection of this log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person typing into the compose box.
    User,
    /// The remote chat service.
    Bot,
}

impl Sender {
    /// Style tag used by the projections (`user` / `bot`).
    pub fn tag(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }

    /// Avatar glyph, fixed per sender.
    pub fn avatar(self) -> &'static str {
        match self {
            Sender::User => "👤",
            Sender::Bot => "🤖",
        }
    }
}

/// A single rendered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Position-stable id assigned by the log.
    pub id: u64,
    /// Author of the message.
    pub sender: Sender,
    /// Raw body text, before any formatting.
    pub body: String,
    /// Error styling flag (bot messages only).
    #[serde(default)]
    pub is_error: bool,
    /// When the message was appended.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a user message.
    pub fn user(id: u64, body: impl Into<String>) -> Self {
        Self {
            id,
            sender: Sender::User,
            body: body.into(),
            is_error: false,
            timestamp: Utc::now(),
        }
    }

    /// Create a bot reply.
    pub fn bot(id: u64, body: impl Into<String>) -> Self {
        Self {
            id,
            sender: Sender::Bot,
            body: body.into(),
            is_error: false,
            timestamp: Utc::now(),
        }
    }

    /// Create a bot-authored error message.
    pub fn bot_error(id: u64, body: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::bot(id, body)
        }
    }

    /// Space-separated style classes: sender tag, plus `error` when flagged.
    pub fn css_classes(&self) -> String {
        if self.is_error {
            format!("message {} error", self.sender.tag())
        } else {
            format!("message {}", self.sender.tag())
        }
    }
}
