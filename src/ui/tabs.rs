//! Tab area and floating windows for the panels of a [`PanelManager`].

use super::theme;
use crate::context::AppContext;
use crate::panel::{PanelFlags, PanelId, PanelManager, PanelSlot};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Tabs,
};
use ratatui::Frame;

fn tab_title(slot: &PanelSlot) -> Line<'static> {
    let mut spans = vec![Span::raw(slot.label())];
    if slot.flags().contains(PanelFlags::CAN_CLOSE) {
        spans.push(Span::styled(" ×", theme::subtitle_style()));
    }
    Line::from(spans)
}

fn empty_message(f: &mut Frame, area: Rect, text: &'static str) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(text, theme::subtitle_style())),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_menu_bar(f: &mut Frame, area: Rect, items: &[(&str, &str)]) {
    let mut spans = vec![Span::raw(" ")];
    for (key, label) in items {
        spans.push(Span::styled(format!("[{}]", key), theme::key_hint_style()));
        spans.push(Span::styled(format!(" {}  ", label), theme::footer_style()));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(theme::SURFACE_ALT)),
        area,
    );
}

/// Draw one panel's body inside `block_area`, with its menu bar and
/// scrollbar when its flags ask for them.
fn draw_panel_body(
    f: &mut Frame,
    block_area: Rect,
    block: Block<'_>,
    slot: &mut PanelSlot,
    ctx: &AppContext,
) {
    let inner = block.inner(block_area);
    f.render_widget(block, block_area);

    let flags = slot.flags();
    let menu = if flags.contains(PanelFlags::MENU_BAR) {
        slot.panel().menu_bar()
    } else {
        Vec::new()
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(if menu.is_empty() { 0 } else { 1 }),
            Constraint::Min(0),
        ])
        .split(inner);
    if !menu.is_empty() {
        draw_menu_bar(f, rows[0], &menu);
    }

    slot.panel_mut().on_render(f, rows[1], ctx);

    if flags.contains(PanelFlags::NO_SCROLLBAR) {
        return;
    }
    if let Some((position, length)) = slot.panel().scroll() {
        let mut state = ScrollbarState::new(length).position(position);
        f.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            block_area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut state,
        );
    }
}

/// Tab bar plus the focused panel's content.
pub fn draw_tab_area(f: &mut Frame, area: Rect, panels: &mut PanelManager, ctx: &AppContext) {
    if panels.attached_count() == 0 {
        empty_message(f, area, "No panels open. Press Ctrl+A to attach a window.");
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let attached: Vec<&PanelSlot> = panels.iter().filter(|s| !s.is_detached()).collect();
    let selected = attached.iter().position(|s| s.is_focused());
    let titles: Vec<Line> = attached.iter().map(|s| tab_title(s)).collect();
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(theme::tab_style(false))
        .highlight_style(theme::tab_style(true))
        .divider("│");
    f.render_widget(tabs, rows[0]);

    let Some(slot) = panels.active_slot_mut() else {
        empty_message(f, rows[1], "No active panel");
        return;
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::border_style(true))
        .style(theme::surface(ctx.transparent));
    draw_panel_body(f, rows[1], block, slot, ctx);
}

/// Where the `index`-th floating window goes: cascaded down and left from
/// the top-right corner of `area`.
fn window_rect(area: Rect, slot: &PanelSlot, index: u16) -> Rect {
    let size = slot.detached_size();
    let width = size.width.min(area.width);
    let height = size.height.min(area.height);
    let x = area
        .right()
        .saturating_sub(width + index * 2)
        .max(area.x);
    let y = (area.y + 1 + index).min(area.bottom().saturating_sub(height));
    Rect::new(x, y, width, height)
}

/// Floating windows for detached panels. Windows closed since the last frame
/// are removed afterwards.
pub fn draw_detached(f: &mut Frame, area: Rect, panels: &mut PanelManager, ctx: &AppContext) {
    let newest = panels.last_detached();
    let ids: Vec<PanelId> = panels
        .iter()
        .filter(|s| s.is_detached() && s.is_open())
        .map(|s| s.id())
        .collect();

    for (index, id) in ids.into_iter().enumerate() {
        let Some(slot) = panels.panel_mut(id) else {
            continue;
        };
        let rect = window_rect(area, slot, index as u16);
        if rect.width < 4 || rect.height < 3 {
            continue;
        }
        f.render_widget(Clear, rect);

        let on_top = newest == Some(id);
        let block = Block::default()
            .title(Line::from(Span::styled(
                format!(" {} ", slot.label()),
                theme::panel_title_style(),
            )))
            .title_bottom(
                Line::from(Span::styled(" [Ctrl+A] Attach ", theme::key_hint_style()))
                    .alignment(Alignment::Right),
            )
            .borders(Borders::ALL)
            .border_style(theme::border_style(on_top))
            .style(Style::default().bg(theme::SURFACE));
        draw_panel_body(f, rect, block, slot, ctx);
    }

    panels.remove_closed();
}
