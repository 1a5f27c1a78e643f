//! Layout helpers for the studybot TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Create a centered rect with fixed dimensions.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Create the main layout with status bar at bottom.
pub fn main_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Split the chat area into transcript (top) and compose box (bottom).
///
/// The compose box gets `input_rows` plus its border, but the transcript
/// always keeps at least three rows.
pub fn chat_layout(area: Rect, input_rows: u16) -> (Rect, Rect) {
    let wanted = input_rows.saturating_add(2);
    let max_input = area.height.saturating_sub(3).max(3);
    let input_height = wanted.clamp(3, max_input).min(area.height);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(input_height)])
        .split(area);
    (chunks[0], chunks[1])
}
