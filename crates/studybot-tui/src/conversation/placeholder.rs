//! State-aware placeholder text for the compose box.

/// Placeholder shown while the compose box is empty.
#[must_use]
pub fn input_placeholder(pending: bool) -> &'static str {
    if pending {
        "Waiting for Study Bot..."
    } else {
        "Ask a question... (Shift+Enter for a new line)"
    }
}
