use super::{dialogs, header, tabs, theme, UiLayer};
use crate::context::AppContext;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Draws the window chrome, header, tab area and footer, then any dialog.
pub fn draw_layout(f: &mut Frame, ui: &mut UiLayer, ctx: &AppContext) {
    let full = f.area();
    let area = if ui.decorated {
        let block = Block::default()
            .title(Line::from(Span::styled(
                format!(" {} ", ui.title),
                theme::panel_title_style(),
            )))
            .borders(Borders::ALL)
            .border_style(theme::border_style(false));
        let inner = block.inner(full);
        f.render_widget(block, full);
        inner
    } else {
        full
    };

    // Vertical: header | body | footer
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(3),    // body
            Constraint::Length(1), // footer
        ])
        .split(area);

    header::draw_header(f, vert[0], &ui.title, ctx.frame_index);
    tabs::draw_tab_area(f, vert[1], &mut ui.panels, ctx);
    tabs::draw_detached(f, vert[1], &mut ui.panels, ctx);
    draw_footer(f, vert[2], ui);

    if let Some(dialog) = &ui.dialog {
        dialogs::draw_dialog(f, full, dialog);
    }
}

fn draw_footer(f: &mut Frame, area: Rect, ui: &UiLayer) {
    // Show flash message if active, otherwise normal footer
    if let Some(msg) = ui.flash_text() {
        let footer = Line::from(vec![Span::styled(format!(" {} ", msg), theme::flash_style())]);
        f.render_widget(Paragraph::new(footer), area);
        return;
    }

    let footer = Line::from(vec![
        Span::styled(" [Tab]", theme::key_hint_style()),
        Span::styled(" Next tab  ", theme::footer_style()),
        Span::styled("[^D]", theme::key_hint_style()),
        Span::styled(" Detach  ", theme::footer_style()),
        Span::styled("[^A]", theme::key_hint_style()),
        Span::styled(" Attach  ", theme::footer_style()),
        Span::styled("[^W]", theme::key_hint_style()),
        Span::styled(" Close  ", theme::footer_style()),
        Span::styled("[?]", theme::key_hint_style()),
        Span::styled(" Help  ", theme::footer_style()),
        Span::styled("[q]", theme::key_hint_style()),
        Span::styled(" Quit", theme::footer_style()),
    ]);

    f.render_widget(Paragraph::new(footer), area);
}
