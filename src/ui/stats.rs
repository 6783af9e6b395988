use super::theme;
use crate::context::AppContext;
use crate::panel::{Panel, PanelFlags};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Sparkline};
use ratatui::Frame;

pub const DIAGNOSTICS_PANEL: &str = "Diagnostics";

/// Frame timing readout. Docked for good: it cannot be closed.
#[derive(Debug, Default)]
pub struct DiagnosticsPanel;

impl DiagnosticsPanel {
    pub fn new() -> Self {
        Self
    }
}

fn row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", label), theme::subtitle_style()),
        Span::styled(value, Style::default().fg(theme::TEXT)),
    ])
}

fn uptime(seconds: f64) -> String {
    let total = seconds as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, total / 60 % 60, total % 60)
}

impl Panel for DiagnosticsPanel {
    fn name(&self) -> &str {
        DIAGNOSTICS_PANEL
    }

    fn icon(&self) -> &str {
        "📊"
    }

    fn flags(&self) -> PanelFlags {
        PanelFlags::CAN_DETACH | PanelFlags::NO_SCROLLBAR
    }

    fn on_render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppContext) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(7), Constraint::Min(1)])
            .split(area);

        let stats = &ctx.stats;
        let lines = vec![
            Line::from(""),
            row("FPS", format!("{:.1}", stats.fps())),
            row("Frame time", format!("{:.2}ms (avg {:.2}ms)", stats.last_millis(), stats.average_millis())),
            row("Frames", ctx.frame_index.to_string()),
            row("Uptime", uptime(ctx.elapsed)),
            row(
                "Window",
                format!("{}x{}", ctx.window_size.width, ctx.window_size.height),
            ),
        ];
        frame.render_widget(Paragraph::new(lines), rows[0]);

        let samples = stats.micros();
        let sparkline = Sparkline::default()
            .data(&samples)
            .style(Style::default().fg(theme::ACCENT));
        frame.render_widget(sparkline, rows[1]);
    }
}
