// src/tui/widgets/transcript.rs — Scrolling chat transcript panel.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::session::{Role, Transcript, TranscriptEntry};
use crate::tui::theme::Theme;

fn entry_line(entry: &TranscriptEntry) -> Line<'_> {
    let speaker_style = if entry.is_error {
        Theme::error()
    } else {
        match entry.role {
            Role::User => Theme::user(),
            Role::Bot => Theme::bot(),
        }
    };
    let text_style = if entry.is_error {
        Theme::error()
    } else {
        Theme::text()
    };

    Line::from(vec![
        Span::styled(entry.at.format("%H:%M ").to_string(), Theme::text_dim()),
        Span::styled(format!("{}: ", entry.role.speaker()), speaker_style),
        Span::styled(entry.text.as_str(), text_style),
    ])
}

/// Rows a line of `chars` characters takes when wrapped to `width`.
pub fn wrapped_rows(chars: usize, width: u16) -> usize {
    let width = width.max(1) as usize;
    chars.max(1).div_ceil(width)
}

/// First row to show so that the view ends `scroll_back` rows above the
/// bottom of the transcript.
pub fn scroll_offset(total_rows: usize, visible_rows: u16, scroll_back: u16) -> u16 {
    let max_offset = total_rows.saturating_sub(visible_rows as usize);
    max_offset.saturating_sub(scroll_back as usize).min(u16::MAX as usize) as u16
}

pub fn render(f: &mut Frame, area: Rect, transcript: &Transcript, scroll_back: u16) {
    let title = if scroll_back > 0 {
        format!(" Chat ({} messages, scrolled) ", transcript.len())
    } else {
        format!(" Chat ({} messages) ", transcript.len())
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let inner_width = area.width.saturating_sub(2);
    let visible_rows = area.height.saturating_sub(2);

    let lines: Vec<Line> = transcript.entries().iter().map(entry_line).collect();
    let total_rows: usize = lines
        .iter()
        .map(|l| wrapped_rows(l.width(), inner_width))
        .sum();

    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll_offset(total_rows, visible_rows, scroll_back), 0));
    f.render_widget(p, area);
}
