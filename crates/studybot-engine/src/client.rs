//! Conversation client: session, pending flag, and the message log.
//!
//! The request lifecycle is split in two halves so an event loop can run the
//! transport call on its own task:
//!
//! - [`ConversationClient::prepare_send`] applies the send guard, appends the
//!   user message, shows the typing indicator and marks the client pending.
//! - [`ConversationClient::complete_send`] hides the indicator, appends the
//!   reply (or a fixed error message) and clears the pending flag.
//!
//! [`ConversationClient::send`] runs both halves around one transport call.

use crate::conversation::ConversationLog;
use crate::session::SessionId;
use crate::transport::{ChatRequest, ChatTransport, ResetRequest, TransportError};
use tracing::{debug, warn};

/// Shown when the server answered with a non-success status.
pub const REMOTE_ERROR_TEXT: &str = "Wait, I hit a snag. The AI server returned an error.";

/// Shown when no response was obtained at all.
pub const UNREACHABLE_ERROR_TEXT: &str = "Network breakdown. Is the chat server running?";

/// Shown when a success response could not be read as a reply.
pub const INVALID_REPLY_TEXT: &str = "The AI server sent a reply I couldn't read.";

/// How a send attempt resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// A bot reply was appended.
    Replied,
    /// The server responded with an error status.
    RemoteError,
    /// The server could not be reached.
    Unreachable,
    /// The server responded successfully with an unreadable body.
    InvalidReply,
    /// The result belonged to a session that has since been reset.
    Discarded,
}

impl SendOutcome {
    /// Whether the attempt ended with an error message in the log.
    pub fn is_error(self) -> bool {
        matches!(
            self,
            SendOutcome::RemoteError | SendOutcome::Unreachable | SendOutcome::InvalidReply
        )
    }
}

/// Client-side state of one conversation.
#[derive(Debug, Clone)]
pub struct ConversationClient {
    session: SessionId,
    pending: bool,
    log: ConversationLog,
}

impl ConversationClient {
    /// Create a client with a freshly generated session.
    pub fn new() -> Self {
        Self::with_session(SessionId::generate())
    }

    /// Create a client bound to a known session.
    pub fn with_session(session: SessionId) -> Self {
        Self {
            session,
            pending: false,
            log: ConversationLog::new(),
        }
    }

    /// Current session token.
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Whether a send is awaiting its response.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Conversation so far.
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Whether `raw` would pass the send guard right now.
    pub fn can_send(&self, raw: &str) -> bool {
        !self.pending && !raw.trim().is_empty()
    }

    /// Start a send. Returns `None` (and changes nothing) when the trimmed
    /// text is empty or another send is still pending.
    pub fn prepare_send(&mut self, raw: &str) -> Option<ChatRequest> {
        if !self.can_send(raw) {
            return None;
        }
        let message = raw.trim().to_string();

        self.pending = true;
        self.log.push_user(message.clone());
        self.log.show_typing();

        debug!(session_id = %self.session, len = message.len(), "send started");
        Some(ChatRequest {
            message,
            session_id: self.session.clone(),
        })
    }

    /// Finish a send started under `session`.
    ///
    /// Results for a session other than the current one are dropped without
    /// touching the log or the pending flag.
    pub fn complete_send(
        &mut self,
        session: &SessionId,
        result: Result<String, TransportError>,
    ) -> SendOutcome {
        if *session != self.session {
            debug!(stale = %session, current = %self.session, "discarding stale reply");
            return SendOutcome::Discarded;
        }

        self.log.hide_typing();
        let outcome = match result {
            Ok(reply) => {
                self.log.push_bot(reply);
                SendOutcome::Replied
            }
            Err(TransportError::Remote { status }) => {
                debug!(status, "chat service returned an error");
                self.log.push_bot_error(REMOTE_ERROR_TEXT);
                SendOutcome::RemoteError
            }
            Err(TransportError::InvalidReply(reason)) => {
                debug!(%reason, "chat reply could not be decoded");
                self.log.push_bot_error(INVALID_REPLY_TEXT);
                SendOutcome::InvalidReply
            }
            Err(e @ (TransportError::Unreachable(_) | TransportError::Client(_))) => {
                debug!(error = %e, "chat service unreachable");
                self.log.push_bot_error(UNREACHABLE_ERROR_TEXT);
                SendOutcome::Unreachable
            }
        };
        self.pending = false;
        outcome
    }

    /// Send `raw` through `transport` and wait for the outcome.
    ///
    /// Returns `None` when the send guard rejected the text.
    pub async fn send<T>(&mut self, transport: &T, raw: &str) -> Option<SendOutcome>
    where
        T: ChatTransport + ?Sized,
    {
        let request = self.prepare_send(raw)?;
        let result = transport.send_message(&request).await;
        Some(self.complete_send(&request.session_id, result))
    }

    /// Request that tells the server to forget the current session.
    pub fn reset_request(&self) -> ResetRequest {
        ResetRequest {
            session_id: self.session.clone(),
        }
    }

    /// Start over locally: fresh session, empty log, nothing pending.
    ///
    /// An in-flight send is not cancelled; its result is discarded when it
    /// arrives because it carries the old session.
    pub fn finish_reset(&mut self) {
        let previous = std::mem::replace(&mut self.session, SessionId::generate());
        self.log = ConversationLog::new();
        self.pending = false;
        debug!(%previous, session_id = %self.session, "conversation reset");
    }

    /// Tell the server to forget the session, then start over locally.
    ///
    /// A failed reset request is logged and otherwise ignored.
    pub async fn reset<T>(&mut self, transport: &T)
    where
        T: ChatTransport + ?Sized,
    {
        if let Err(e) = transport.reset_session(&self.reset_request()).await {
            warn!(
                error = %e,
                session_id = %self.session,
                "reset request failed, resetting locally"
            );
        }
        self.finish_reset();
    }
}

impl Default for ConversationClient {
    fn default() -> Self {
        Self::new()
    }
}
