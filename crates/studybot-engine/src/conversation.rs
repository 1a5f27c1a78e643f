//! Ordered conversation log with a transient typing indicator.

use crate::message::Message;

/// Reserved identifier of the typing indicator placeholder.
pub const TYPING_INDICATOR_ID: &str = "typing-indicator";

/// Conversation history in append order.
///
/// The typing indicator lives beside the messages, never among them: it is
/// drawn after the last message while a reply is outstanding.
#[derive(Debug, Clone)]
pub struct ConversationLog {
    messages: Vec<Message>,
    typing: bool,
    next_id: u64,
}

impl ConversationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            typing: false,
            next_id: 1,
        }
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no message has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Append a user message and return its id.
    pub fn push_user(&mut self, body: impl Into<String>) -> u64 {
        let id = self.take_id();
        self.messages.push(Message::user(id, body));
        id
    }

    /// Append a bot reply and return its id.
    pub fn push_bot(&mut self, body: impl Into<String>) -> u64 {
        let id = self.take_id();
        self.messages.push(Message::bot(id, body));
        id
    }

    /// Append a bot error message and return its id.
    pub fn push_bot_error(&mut self, body: impl Into<String>) -> u64 {
        let id = self.take_id();
        self.messages.push(Message::bot_error(id, body));
        id
    }

    /// Whether the typing indicator is currently shown.
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Show the typing indicator. Showing it twice still yields one.
    pub fn show_typing(&mut self) {
        self.typing = true;
    }

    /// Remove the typing indicator. No-op when absent.
    pub fn hide_typing(&mut self) {
        self.typing = false;
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Sender;

    #[test]
    fn test_append_order_and_ids() {
        let mut log = ConversationLog::new();
        assert!(log.is_empty());

        let a = log.push_user("question");
        let b = log.push_bot("answer");
        let c = log.push_bot_error("failure");

        assert_eq!((a, b, c), (1, 2, 3));
        assert_eq!(log.len(), 3);

        let senders: Vec<Sender> = log.messages().iter().map(|m| m.sender).collect();
        assert_eq!(senders, vec![Sender::User, Sender::Bot, Sender::Bot]);
        assert!(log.last().unwrap().is_error);
    }

    #[test]
    fn test_typing_indicator_is_idempotent() {
        let mut log = ConversationLog::new();
        assert!(!log.is_typing());

        log.hide_typing();
        assert!(!log.is_typing());

        log.show_typing();
        log.show_typing();
        assert!(log.is_typing());
        // The indicator is never a message
        assert!(log.is_empty());

        log.hide_typing();
        log.hide_typing();
        assert!(!log.is_typing());
    }
}
