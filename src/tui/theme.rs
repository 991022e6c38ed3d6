// src/tui/theme.rs — Color scheme and style definitions for the terminal UI.

use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

impl Theme {
    // ── Base colors ──────────────────────────────────────────────
    pub const ACCENT: Color = Color::Rgb(255, 140, 50);
    pub const WHITE: Color = Color::Rgb(240, 240, 240);
    pub const GRAY: Color = Color::Rgb(120, 120, 140);
    pub const DIM: Color = Color::Rgb(80, 80, 100);
    pub const RED: Color = Color::Rgb(230, 80, 80);
    pub const CYAN: Color = Color::Rgb(80, 200, 220);
    pub const BLUE: Color = Color::Rgb(70, 130, 220);

    // ── Emotion colors (pie slices) ──────────────────────────────
    pub const HAPPY: Color = Color::Rgb(0x28, 0xa7, 0x45);
    pub const SAD: Color = Color::Rgb(0xdc, 0x35, 0x45);
    pub const ANGRY: Color = Color::Rgb(0xff, 0xc1, 0x07);
    pub const NEUTRAL: Color = Color::Rgb(0x17, 0xa2, 0xb8);
    pub const DISGUST: Color = Color::Rgb(0x6f, 0x42, 0xc1);
    pub const FEAR: Color = Color::Rgb(0xfd, 0x7e, 0x14);
    pub const SURPRISE: Color = Color::Rgb(0x66, 0x10, 0xf2);

    /// Used in order for labels outside the known vocabulary.
    const FALLBACK: [Color; 4] = [
        Color::Rgb(0xe8, 0x3e, 0x8c),
        Color::Rgb(0x20, 0xc9, 0x97),
        Color::Rgb(0xad, 0xb5, 0xbd),
        Color::Rgb(0x0d, 0x6e, 0xfd),
    ];

    /// Slice color for `label`; `index` picks a fallback for unknown labels.
    pub fn emotion(label: &str, index: usize) -> Color {
        match label.trim().to_lowercase().as_str() {
            "happy" => Theme::HAPPY,
            "sad" => Theme::SAD,
            "angry" => Theme::ANGRY,
            "neutral" => Theme::NEUTRAL,
            "disgust" => Theme::DISGUST,
            "fear" => Theme::FEAR,
            "surprise" => Theme::SURPRISE,
            _ => Theme::FALLBACK[index % Theme::FALLBACK.len()],
        }
    }

    // ── Semantic styles ──────────────────────────────────────────

    pub fn header() -> Style {
        Style::default()
            .fg(Theme::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(Theme::DIM)
    }

    /// Border of the focused input box.
    pub fn border_focus() -> Style {
        Style::default().fg(Theme::ACCENT)
    }

    pub fn text() -> Style {
        Style::default().fg(Theme::WHITE)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(Theme::GRAY)
    }

    pub fn error() -> Style {
        Style::default().fg(Theme::RED)
    }

    /// Speaker tag of user entries.
    pub fn user() -> Style {
        Style::default()
            .fg(Theme::BLUE)
            .add_modifier(Modifier::BOLD)
    }

    /// Speaker tag of bot entries.
    pub fn bot() -> Style {
        Style::default()
            .fg(Theme::CYAN)
            .add_modifier(Modifier::BOLD)
    }

    /// The "Feeling: ..." line.
    pub fn feeling(label: Option<&str>) -> Style {
        let fg = label.map(|l| Theme::emotion(l, 0)).unwrap_or(Theme::GRAY);
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }

    pub fn key_hint() -> Style {
        Style::default().fg(Theme::ACCENT)
    }

    pub fn key_desc() -> Style {
        Style::default().fg(Theme::GRAY)
    }
}
