pub mod chat;
pub mod dialogs;
pub mod header;
pub mod layout;
pub mod starfield;
pub mod stats;
pub mod tabs;
pub mod theme;

pub use chat::ChatPanel;
pub use starfield::StarfieldLayer;
pub use stats::DiagnosticsPanel;

use crate::context::AppContext;
use crate::error::HookError;
use crate::layer::Layer;
use crate::panel::{KeyResponse, Panel, PanelFlags, PanelId, PanelManager};
use crate::time::TimeStep;
use crate::types::{ConfirmAction, DialogKind, Flash};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use tracing::{debug, info};

pub const UI_LAYER: &str = "UI";

/// How long footer messages stay up.
const FLASH_FRAMES: u64 = 60;

/// Overlay layer that owns the panels and draws the chrome around them.
pub struct UiLayer {
    title: String,
    decorated: bool,
    panels: PanelManager,
    dialog: Option<DialogKind>,
    flash: Option<Flash>,
    frame_index: u64,
}

impl UiLayer {
    pub fn new(title: impl Into<String>, decorated: bool) -> Self {
        Self {
            title: title.into(),
            decorated,
            panels: PanelManager::new(),
            dialog: None,
            flash: None,
            frame_index: 0,
        }
    }

    pub fn add_panel(&mut self, panel: Box<dyn Panel>) -> Option<PanelId> {
        self.panels.add_panel(panel)
    }

    pub fn panels(&self) -> &PanelManager {
        &self.panels
    }

    pub fn panels_mut(&mut self) -> &mut PanelManager {
        &mut self.panels
    }

    pub fn dialog(&self) -> Option<&DialogKind> {
        self.dialog.as_ref()
    }

    pub fn flash_text(&self) -> Option<&str> {
        self.flash.as_ref().map(|f| f.text.as_str())
    }

    fn flash(&mut self, text: impl Into<String>) {
        self.flash = Some(Flash {
            text: text.into(),
            until_frame: self.frame_index + FLASH_FRAMES,
        });
    }

    fn active_name(&self) -> Option<String> {
        self.panels.active_slot().map(|s| s.name().to_string())
    }

    /// Route a key press. Returns true when it was handled here.
    pub fn handle_key(&mut self, key: KeyEvent, ctx: &mut AppContext) -> bool {
        if self.dialog.is_some() {
            self.handle_dialog_key(key);
            return true;
        }

        let capturing = self
            .panels
            .active_slot()
            .is_some_and(|s| s.panel().captures_input());
        if capturing {
            self.forward_to_panel(key);
            return true;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return self.handle_ctrl_key(key);
        }

        if key.modifiers.contains(KeyModifiers::ALT) {
            let offset = match key.code {
                KeyCode::Left => -1,
                KeyCode::Right => 1,
                _ => return false,
            };
            if let Some(id) = self.panels.active() {
                self.panels.move_panel(id, offset);
            }
            return true;
        }

        // Shift+Tab
        if key.code == KeyCode::Tab && key.modifiers.contains(KeyModifiers::SHIFT) {
            self.panels.focus_prev();
            return true;
        }

        match key.code {
            KeyCode::Tab => self.panels.focus_next(),
            KeyCode::BackTab => self.panels.focus_prev(),
            KeyCode::Char('q') => ctx.request_close(),
            KeyCode::Char('?') => self.dialog = Some(DialogKind::Help),
            KeyCode::Char('b') => ctx.toggle_layer(starfield::STARFIELD_LAYER),
            _ => return self.forward_to_panel(key),
        }
        true
    }

    fn handle_ctrl_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('d') => {
                let Some(slot) = self.panels.active_slot() else {
                    return true;
                };
                let (id, name) = (slot.id(), slot.name().to_string());
                if slot.flags().contains(PanelFlags::CAN_DETACH) {
                    self.panels.detach_panel(id);
                    self.flash(format!("Detached {name}"));
                } else {
                    self.flash(format!("{name} cannot be detached"));
                }
            }
            KeyCode::Char('a') => match self.panels.last_detached() {
                Some(id) => {
                    self.panels.attach_panel(id);
                    self.panels.set_active_panel(id);
                }
                None => self.flash("No detached windows"),
            },
            KeyCode::Char('w') => {
                let Some(id) = self.panels.active() else {
                    return true;
                };
                let name = self.active_name().unwrap_or_default();
                if self.panels.close_panel(id) {
                    self.flash(format!("Closed {name}"));
                } else {
                    self.flash(format!("{name} cannot be closed"));
                }
            }
            KeyCode::Char('x') => {
                let Some(slot) = self.panels.last_detached().and_then(|id| self.panels.panel(id))
                else {
                    self.flash("No detached windows");
                    return true;
                };
                let id = slot.id();
                if slot.flags().contains(PanelFlags::CAN_CLOSE) {
                    self.panels.set_open(id, false);
                } else {
                    let name = slot.name().to_string();
                    self.flash(format!("{name} cannot be closed"));
                }
            }
            KeyCode::Char('o') => {
                let Some(id) = self.panels.active() else {
                    return true;
                };
                let name = self.active_name().unwrap_or_default();
                self.dialog = Some(DialogKind::Confirm {
                    message: format!("Close all panels except \"{name}\"?"),
                    action: ConfirmAction::CloseOthers(id),
                });
            }
            _ => return false,
        }
        true
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        match self.dialog {
            Some(DialogKind::Help) => self.dialog = None,
            Some(DialogKind::Confirm { action, .. }) => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.dialog = None;
                    match action {
                        ConfirmAction::CloseOthers(keep) => {
                            let closed = self.panels.close_others(keep);
                            self.flash(format!("Closed {closed} panel(s)"));
                        }
                    }
                }
                KeyCode::Char('n') | KeyCode::Esc => self.dialog = None,
                _ => {}
            },
            None => {}
        }
    }

    fn forward_to_panel(&mut self, key: KeyEvent) -> bool {
        let response = match self.panels.active_slot_mut() {
            Some(slot) => slot.panel_mut().on_key(key),
            None => return false,
        };
        match response {
            KeyResponse::Ignored => false,
            KeyResponse::Consumed => true,
            KeyResponse::Status(message) => {
                self.flash(message);
                true
            }
        }
    }
}

impl Layer for UiLayer {
    fn name(&self) -> &str {
        UI_LAYER
    }

    fn on_attach(&mut self) {
        info!(panels = self.panels.len(), "ui layer attached");
    }

    fn on_detach(&mut self) -> Result<(), HookError> {
        self.panels.shutdown();
        Ok(())
    }

    fn on_update(&mut self, _ts: TimeStep, ctx: &mut AppContext) {
        self.frame_index = ctx.frame_index;
        if self
            .flash
            .as_ref()
            .is_some_and(|f| f.until_frame <= ctx.frame_index)
        {
            self.flash = None;
        }
    }

    fn on_ui_render(&mut self, frame: &mut Frame<'_>, ctx: &mut AppContext) {
        layout::draw_layout(frame, self, ctx);
    }

    fn on_event(&mut self, event: &Event, ctx: &mut AppContext) -> bool {
        match event {
            Event::Key(key) => {
                let handled = self.handle_key(*key, ctx);
                debug!(code = ?key.code, handled, "ui key");
                handled
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    struct Dummy(&'static str, PanelFlags);

    impl Panel for Dummy {
        fn name(&self) -> &str {
            self.0
        }

        fn flags(&self) -> PanelFlags {
            self.1
        }

        fn on_render(&mut self, _frame: &mut Frame<'_>, _area: Rect, _ctx: &AppContext) {}
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn plain(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ui_with(names: &[&'static str]) -> UiLayer {
        let mut ui = UiLayer::new("TG", true);
        for name in names {
            ui.add_panel(Box::new(Dummy(*name, PanelFlags::default())));
        }
        ui
    }

    fn active(ui: &UiLayer) -> Option<&str> {
        ui.panels().active_slot().map(|s| s.name())
    }

    #[test]
    fn q_requests_close() {
        let mut ui = ui_with(&["A"]);
        let mut ctx = AppContext::default();
        assert!(ui.handle_key(plain(KeyCode::Char('q')), &mut ctx));
        assert!(ctx.close_requested());
    }

    #[test]
    fn tab_cycles_focus() {
        let mut ui = ui_with(&["A", "B"]);
        let mut ctx = AppContext::default();
        ui.handle_key(plain(KeyCode::Tab), &mut ctx);
        assert_eq!(active(&ui), Some("B"));
        ui.handle_key(plain(KeyCode::BackTab), &mut ctx);
        assert_eq!(active(&ui), Some("A"));
    }

    #[test]
    fn detach_and_reattach_with_shortcuts() {
        let mut ui = ui_with(&["A", "B"]);
        let mut ctx = AppContext::default();

        ui.handle_key(ctrl('d'), &mut ctx);
        assert_eq!(active(&ui), Some("B"));
        assert_eq!(ui.flash_text(), Some("Detached A"));

        ui.handle_key(ctrl('a'), &mut ctx);
        assert_eq!(active(&ui), Some("A"));
        assert_eq!(ui.panels().last_detached(), None);
    }

    #[test]
    fn ctrl_d_respects_can_detach() {
        let mut ui = UiLayer::new("TG", true);
        ui.add_panel(Box::new(Dummy("Stats", PanelFlags::NO_SCROLLBAR)));
        ui.add_panel(Box::new(Dummy("B", PanelFlags::default())));
        let mut ctx = AppContext::default();

        assert!(ui.handle_key(ctrl('d'), &mut ctx));
        assert_eq!(active(&ui), Some("Stats"));
        assert_eq!(ui.panels().last_detached(), None);
        assert_eq!(ui.flash_text(), Some("Stats cannot be detached"));
    }

    #[test]
    fn ctrl_x_closes_the_last_detached_window_on_next_draw() {
        let mut ui = ui_with(&["A", "B"]);
        let mut ctx = AppContext::default();
        ui.handle_key(ctrl('d'), &mut ctx);
        ui.handle_key(ctrl('x'), &mut ctx);

        let closed = ui.panels().iter().find(|s| s.name() == "A").expect("still listed");
        assert!(!closed.is_open());
        assert_eq!(ui.panels_mut().remove_closed(), 1);
    }

    #[test]
    fn close_others_asks_first() {
        let mut ui = ui_with(&["A", "B", "C"]);
        let mut ctx = AppContext::default();

        ui.handle_key(ctrl('o'), &mut ctx);
        assert!(matches!(ui.dialog(), Some(DialogKind::Confirm { .. })));
        ui.handle_key(plain(KeyCode::Char('n')), &mut ctx);
        assert!(ui.dialog().is_none());
        assert_eq!(ui.panels().len(), 3);

        ui.handle_key(ctrl('o'), &mut ctx);
        ui.handle_key(plain(KeyCode::Char('y')), &mut ctx);
        assert_eq!(ui.panels().len(), 1);
        assert_eq!(ui.flash_text(), Some("Closed 2 panel(s)"));
    }

    #[test]
    fn help_closes_on_any_key() {
        let mut ui = ui_with(&["A"]);
        let mut ctx = AppContext::default();
        ui.handle_key(plain(KeyCode::Char('?')), &mut ctx);
        assert_eq!(ui.dialog(), Some(&DialogKind::Help));
        assert!(ui.handle_key(plain(KeyCode::Char('q')), &mut ctx));
        assert!(ui.dialog().is_none());
        assert!(!ctx.close_requested());
    }

    #[test]
    fn b_toggles_the_starfield() {
        let mut ui = ui_with(&[]);
        let mut ctx = AppContext::default();
        ui.handle_key(plain(KeyCode::Char('b')), &mut ctx);
        assert_eq!(ctx.take_layer_toggles(), vec![starfield::STARFIELD_LAYER.to_string()]);
    }

    #[test]
    fn unknown_keys_fall_through() {
        let mut ui = ui_with(&["A"]);
        let mut ctx = AppContext::default();
        assert!(!ui.handle_key(plain(KeyCode::Char('z')), &mut ctx));
    }

    #[test]
    fn flash_expires_after_its_frames() {
        let mut ui = ui_with(&["A", "B"]);
        let mut ctx = AppContext::default();
        ui.handle_key(ctrl('w'), &mut ctx);
        assert_eq!(ui.flash_text(), Some("Closed A"));

        ctx.frame_index = FLASH_FRAMES;
        ui.on_update(TimeStep::default(), &mut ctx);
        assert!(ui.flash_text().is_none());
    }
}
