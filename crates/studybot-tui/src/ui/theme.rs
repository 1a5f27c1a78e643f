//! Theme and styling definitions for the studybot TUI.

use ratatui::style::{Color, Modifier, Style};
use studybot_engine::Sender;

/// Color palette for the TUI.
pub struct Palette;

impl Palette {
    // Base colors
    pub const BG: Color = Color::Rgb(30, 30, 40);
    pub const FG: Color = Color::Rgb(220, 220, 230);
    pub const DIM: Color = Color::Rgb(140, 140, 160);

    // Accent colors
    pub const ACCENT: Color = Color::Rgb(130, 170, 255);

    // Status bar colors (high contrast)
    pub const STATUS_BG: Color = Color::Rgb(45, 45, 60);
    pub const STATUS_KEY_BG: Color = Color::Rgb(70, 90, 140);

    // Senders
    pub const USER: Color = Color::Rgb(148, 226, 213);
    pub const BOT: Color = Color::Rgb(250, 179, 135);

    // Status colors
    pub const SUCCESS: Color = Color::Rgb(130, 220, 130);
    pub const ERROR: Color = Color::Rgb(240, 100, 100);

    // Code
    pub const CODE_BG: Color = Color::Rgb(45, 45, 58);
    pub const CODE_FG: Color = Color::Rgb(240, 200, 100);

    // Border colors
    pub const BORDER: Color = Color::Rgb(80, 80, 100);
    pub const BORDER_ACTIVE: Color = Color::Rgb(130, 170, 255);
}

/// Common styles used throughout the TUI.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::BG)
    }

    /// Dimmed text for secondary information.
    pub fn dim() -> Style {
        Style::default().fg(Palette::DIM).bg(Palette::BG)
    }

    /// Active/focused element.
    pub fn active() -> Style {
        Style::default().fg(Palette::ACCENT).bg(Palette::BG)
    }

    /// Error status.
    pub fn error() -> Style {
        Style::default().fg(Palette::ERROR).bg(Palette::BG)
    }

    /// Title style.
    pub fn title() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Message header for a sender; error messages override the color.
    pub fn sender(sender: Sender, is_error: bool) -> Style {
        let fg = match (sender, is_error) {
            (_, true) => Palette::ERROR,
            (Sender::User, false) => Palette::USER,
            (Sender::Bot, false) => Palette::BOT,
        };
        Style::default()
            .fg(fg)
            .bg(Palette::BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Inline code span and fenced block text.
    pub fn code() -> Style {
        Style::default().fg(Palette::CODE_FG).bg(Palette::CODE_BG)
    }

    /// Copy control label.
    pub fn copy_control(selected: bool) -> Style {
        if selected {
            Style::default()
                .fg(Palette::BG)
                .bg(Palette::ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Self::dim()
        }
    }

    /// Key hint style (for status bar) - bright on dark for visibility.
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Palette::FG)
            .bg(Palette::STATUS_KEY_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint label style - readable on status bar background.
    pub fn key_label() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Status bar background style.
    pub fn status_bar() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Border style for inactive elements.
    pub fn border() -> Style {
        Style::default().fg(Palette::BORDER)
    }

    /// Border style for active/focused elements.
    pub fn border_active() -> Style {
        Style::default().fg(Palette::BORDER_ACTIVE)
    }
}

/// Animated "typing" dots, cycled on every tick.
pub const TYPING_FRAMES: [&str; 4] = ["·  ", "·· ", "···", " ··"];

/// Frame of the typing animation for the given tick.
pub fn typing_frame(tick: usize) -> &'static str {
    TYPING_FRAMES[tick % TYPING_FRAMES.len()]
}
