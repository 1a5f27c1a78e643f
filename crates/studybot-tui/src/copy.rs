//! Copy controls for fenced code blocks.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use studybot_engine::{COPIED_LABEL, COPY_LABEL};
use thiserror::Error;

/// How long a control shows its "copied" label after a click.
pub const COPY_FEEDBACK: Duration = Duration::from_secs(2);

/// One code block in the transcript: owning message id and block index.
pub type BlockKey = (u64, usize);

/// Per-block "copied" deadlines.
///
/// Each control is independent. Copying again before the deadline restarts
/// the two-second window.
#[derive(Debug, Default, Clone)]
pub struct CopyControls {
    copied_until: HashMap<BlockKey, Instant>,
}

impl CopyControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as copied at `now`.
    pub fn record_copy(&mut self, key: BlockKey, now: Instant) {
        self.copied_until.insert(key, now + COPY_FEEDBACK);
    }

    /// Label for the control of `key` at `now`.
    pub fn label(&self, key: BlockKey, now: Instant) -> &'static str {
        match self.copied_until.get(&key) {
            Some(deadline) if now < *deadline => COPIED_LABEL,
            _ => COPY_LABEL,
        }
    }

    /// Drop deadlines that have passed.
    pub fn expire(&mut self, now: Instant) {
        self.copied_until.retain(|_, deadline| now < *deadline);
    }

    /// Forget every control (the transcript was cleared).
    pub fn clear(&mut self) {
        self.copied_until.clear();
    }
}

/// Clipboard failure.
#[derive(Debug, Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

/// Destination for copied code.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The system clipboard.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        // Opened lazily; headless sessions may never have one
        if self.inner.is_none() {
            self.inner =
                Some(arboard::Clipboard::new().map_err(|e| ClipboardError(e.to_string()))?);
        }
        match self.inner.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_string())
                .map_err(|e| ClipboardError(e.to_string())),
            None => Err(ClipboardError("not initialised".to_string())),
        }
    }
}

/// Clipboard that remembers what it was given. Used by tests and headless runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub contents: Vec<String>,
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents.push(text.to_string());
        Ok(())
    }
}
