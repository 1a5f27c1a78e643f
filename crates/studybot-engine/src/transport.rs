//! HTTP transport to the remote chat service.
//!
//! Two requests exist: `POST /chat` with `{message, session_id}` answering
//! `{response}`, and `POST /reset` with `{session_id}` whose body is ignored.
//! No authentication and no timeout are applied.

use crate::session::SessionId;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default base URL of the chat service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Trimmed user text.
    pub message: String,
    /// Session the message belongs to.
    pub session_id: SessionId,
}

/// Body of `POST /reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetRequest {
    /// Session whose server-side history should be dropped.
    pub session_id: SessionId,
}

/// Expected success body of `POST /chat`.
#[derive(Debug, Deserialize)]
struct ChatReply {
    response: String,
}

/// How strictly a 2xx chat reply is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyMode {
    /// A reply without a string `response` field is an error.
    #[default]
    Strict,
    /// A missing or non-string `response` field renders as an empty reply.
    Lenient,
}

impl ReplyMode {
    /// Decode a 2xx body into the reply text.
    pub fn decode(self, body: &[u8]) -> Result<String, TransportError> {
        match self {
            ReplyMode::Strict => serde_json::from_slice::<ChatReply>(body)
                .map(|reply| reply.response)
                .map_err(|e| TransportError::InvalidReply(e.to_string())),
            ReplyMode::Lenient => {
                let value: serde_json::Value = serde_json::from_slice(body)
                    .map_err(|e| TransportError::InvalidReply(e.to_string()))?;
                Ok(value
                    .get("response")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or_default()
                    .to_string())
            }
        }
    }
}

/// Ways a transport call can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("server returned HTTP {status}")]
    Remote {
        /// HTTP status code.
        status: u16,
    },

    /// No response was obtained at all.
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// A success status whose body is not a chat reply.
    #[error("invalid reply: {0}")]
    InvalidReply(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// The two calls the conversation client makes against the service.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Post one user message and return the reply text.
    async fn send_message(&self, request: &ChatRequest) -> Result<String, TransportError>;

    /// Ask the server to forget a session.
    async fn reset_session(&self, request: &ResetRequest) -> Result<(), TransportError>;
}

/// [`ChatTransport`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    reply_mode: ReplyMode,
}

impl HttpTransport {
    /// Create a transport against `base_url` (trailing slashes are ignored).
    pub fn new(base_url: &str, reply_mode: ReplyMode) -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            reply_mode,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send_message(&self, request: &ChatRequest) -> Result<String, TransportError> {
        let url = self.url("/chat");
        debug!(%url, session_id = %request.session_id, "sending chat message");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "chat request failed");
            return Err(TransportError::Remote {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;
        let reply = self.reply_mode.decode(&body)?;

        debug!(reply_len = reply.len(), "chat reply received");
        Ok(reply)
    }

    async fn reset_session(&self, request: &ResetRequest) -> Result<(), TransportError> {
        let url = self.url("/reset");
        debug!(%url, session_id = %request.session_id, "resetting session");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::Remote {
                status: status.as_u16(),
            })
        }
    }
}
