use super::theme;
use crate::types::DialogKind;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

/// Draw a modal dialog overlay.
pub fn draw_dialog(f: &mut Frame, area: Rect, dialog: &DialogKind) {
    match dialog {
        DialogKind::Confirm { message, .. } => draw_confirm(f, area, message),
        DialogKind::Help => draw_help(f, area),
    }
}

pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1])[1]
}

fn popup_block(title: &str) -> Block<'_> {
    Block::default()
        .title(Line::from(vec![Span::styled(
            format!(" {} ", title),
            theme::panel_title_style(),
        )]))
        .borders(Borders::ALL)
        .border_style(theme::border_style(true))
        .style(Style::default().bg(theme::SURFACE))
}

/// Single-line text prompt with an optional validation error.
pub fn draw_input(
    f: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    error: Option<&str>,
    cursor_on: bool,
) {
    let popup = centered_rect(60, 8, area);
    f.render_widget(Clear, popup);

    let block = popup_block(label);
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let cursor_char = if cursor_on { "█" } else { " " };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  > ", Style::default().fg(theme::ACCENT_WARM)),
            Span::styled(value, Style::default().fg(theme::TEXT)),
            Span::styled(cursor_char, Style::default().fg(theme::ACCENT)),
        ]),
    ];
    match error {
        Some(err) => lines.push(Line::from(Span::styled(
            format!("  {}", err),
            Style::default().fg(theme::ERROR),
        ))),
        None => lines.push(Line::from("")),
    }
    lines.push(Line::from(vec![
        Span::styled("  [Enter]", theme::key_hint_style()),
        Span::styled(" Confirm  ", theme::footer_style()),
        Span::styled("[Esc]", theme::key_hint_style()),
        Span::styled(" Cancel", theme::footer_style()),
    ]));

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_confirm(f: &mut Frame, area: Rect, message: &str) {
    let popup = centered_rect(50, 7, area);
    f.render_widget(Clear, popup);

    let block = popup_block("Confirm");
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  {}", message),
            Style::default().fg(theme::TEXT),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [y]", theme::key_hint_style()),
            Span::styled(" Yes  ", theme::footer_style()),
            Span::styled("[n]", theme::key_hint_style()),
            Span::styled(" No", theme::footer_style()),
        ]),
    ];

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        title,
        Style::default()
            .fg(theme::ACCENT)
            .add_modifier(Modifier::BOLD),
    ))
}

fn binding(keys: &'static str, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<15}", keys), theme::key_hint_style()),
        Span::styled(what, Style::default().fg(theme::TEXT)),
    ])
}

fn draw_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(65, 24, area);
    f.render_widget(Clear, popup);

    let block = popup_block("Help - tgdesk");
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let lines = vec![
        Line::from(""),
        section("  GLOBAL"),
        binding("q", "Quit"),
        binding("Ctrl+C", "Force quit"),
        binding("?", "Toggle help"),
        binding("b", "Toggle starfield"),
        Line::from(""),
        section("  TABS"),
        binding("Tab / Shift+Tab", "Next / previous tab"),
        binding("Alt+←/→", "Move tab"),
        binding("Ctrl+D", "Detach tab into a window"),
        binding("Ctrl+A", "Attach last detached window"),
        binding("Ctrl+W", "Close tab"),
        binding("Ctrl+X", "Close last detached window"),
        binding("Ctrl+O", "Close other tabs"),
        Line::from(""),
        section("  TELEGRAM"),
        binding("↑/↓  Enter", "Select / open chat"),
        binding("[ ]", "Switch account"),
        binding("a  x", "Add / remove account"),
        binding("i  y  w", "Compose / copy / close chat"),
        Line::from(""),
        Line::from(Span::styled(
            "  Press any key to close",
            Style::default().fg(theme::TEXT_DIM),
        )),
    ];

    f.render_widget(Paragraph::new(lines), inner);
}
