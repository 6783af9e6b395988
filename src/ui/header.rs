use super::theme;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

const SPARKLE_CHARS: &[char] = &['.', '+', '*', '+', '.', ' '];

pub fn draw_header(f: &mut Frame, area: Rect, title: &str, frame_index: u64) {
    let tick = frame_index as usize;

    // Two sparkles, out of phase.
    let left_sparkle = SPARKLE_CHARS[tick / 4 % SPARKLE_CHARS.len()];
    let right_sparkle = SPARKLE_CHARS[(tick / 4 + 3) % SPARKLE_CHARS.len()];

    let spaced: String = title
        .chars()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    let lines = vec![
        Line::from(vec![Span::styled("  TELEGRAM DESKTOP", theme::eyebrow_style())]),
        Line::from(vec![Span::styled(
            format!("  {} {} {}", left_sparkle, spaced, right_sparkle),
            theme::title_style(),
        )]),
        Line::from(vec![Span::styled(
            "  Chats, in your terminal.",
            theme::subtitle_style(),
        )]),
    ];

    f.render_widget(Paragraph::new(lines), area);
}
