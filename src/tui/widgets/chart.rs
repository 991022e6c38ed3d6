// src/tui/widgets/chart.rs — Emotion distribution pie chart.
//
// The pie is sampled on the Braille grid of a `Canvas`: every sample point
// inside the unit circle is assigned to the slice covering its angle,
// measured clockwise from twelve o'clock.

use std::f64::consts::TAU;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, Paragraph,
    },
    Frame,
};

use crate::session::EmotionDistribution;
use crate::session::EmotionLabel;
use crate::tui::theme::Theme;

/// Index of the slice containing `angle` (radians clockwise from the top).
fn slice_at(angle: f64, fractions: &[f64]) -> usize {
    let mut acc = 0.0;
    for (i, f) in fractions.iter().enumerate() {
        acc += f * TAU;
        if angle < acc {
            return i;
        }
    }
    fractions.len().saturating_sub(1)
}

/// Sample points of a unit pie, grouped per slice.
///
/// `cols` x `rows` samples are spread over `x_range` x `y_range`.
pub fn pie_points(
    fractions: &[f64],
    x_range: [f64; 2],
    y_range: [f64; 2],
    cols: usize,
    rows: usize,
) -> Vec<Vec<(f64, f64)>> {
    let mut groups = vec![Vec::new(); fractions.len()];
    if fractions.is_empty() || cols == 0 || rows == 0 {
        return groups;
    }

    let dx = (x_range[1] - x_range[0]) / cols as f64;
    let dy = (y_range[1] - y_range[0]) / rows as f64;
    for r in 0..rows {
        let y = y_range[0] + (r as f64 + 0.5) * dy;
        for c in 0..cols {
            let x = x_range[0] + (c as f64 + 0.5) * dx;
            if x * x + y * y > 1.0 {
                continue;
            }
            let angle = x.atan2(y).rem_euclid(TAU);
            groups[slice_at(angle, fractions)].push((x, y));
        }
    }
    groups
}

/// Canvas bounds that keep the circle round, assuming terminal cells are
/// twice as tall as they are wide.
fn bounds(area: Rect) -> ([f64; 2], [f64; 2]) {
    let ratio = area.width.max(1) as f64 / (area.height.max(1) as f64 * 2.0);
    if ratio >= 1.0 {
        ([-ratio, ratio], [-1.0, 1.0])
    } else {
        ([-1.0, 1.0], [-1.0 / ratio, 1.0 / ratio])
    }
}

pub fn render(f: &mut Frame, area: Rect, data: &EmotionDistribution) {
    let block = Block::default()
        .title(" Emotion Distribution ")
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let slices = data.slices();
    if slices.is_empty() {
        let p = Paragraph::new(Line::from(Span::styled(
            "  No emotion data yet.",
            Theme::text_dim(),
        )))
        .block(block);
        f.render_widget(p, area);
        return;
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    let legend_height = (slices.len() as u16).min(inner.height / 2);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(legend_height)])
        .split(inner);

    let fractions: Vec<f64> = slices.iter().map(|s| s.fraction).collect();
    let (x_bounds, y_bounds) = bounds(chunks[0]);
    // Braille: 2x4 dots per cell.
    let groups = pie_points(
        &fractions,
        x_bounds,
        y_bounds,
        chunks[0].width as usize * 2,
        chunks[0].height as usize * 4,
    );
    let colors: Vec<_> = slices
        .iter()
        .enumerate()
        .map(|(i, s)| Theme::emotion(s.label, i))
        .collect();

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|ctx| {
            for (points, color) in groups.iter().zip(colors.iter()) {
                ctx.draw(&Points {
                    coords: points,
                    color: *color,
                });
            }
        });
    f.render_widget(canvas, chunks[0]);

    let legend: Vec<Line> = slices
        .iter()
        .zip(colors.iter())
        .map(|(s, color)| {
            let name = EmotionLabel::new(s.label)
                .map(|l| l.capitalized())
                .unwrap_or_else(|| s.label.to_string());
            Line::from(vec![
                Span::styled(" \u{25A0} ", ratatui::style::Style::default().fg(*color)),
                Span::styled(format!("{name:<10}"), Theme::text()),
                Span::styled(format!("{:>5.1}%", s.fraction * 100.0), Theme::text_dim()),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(legend), chunks[1]);
}
