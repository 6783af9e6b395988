//! Dockable, tabbable panels and the manager that tracks their focus.
//!
//! Attached panels share one tabbed area and at most one of them is focused.
//! Detached panels float in their own windows and can never hold focus.

use crate::context::AppContext;
use crate::error::{panic_message, HookError};
use bitflags::bitflags;
use crossterm::event::KeyEvent;
use ratatui::layout::{Rect, Size};
use ratatui::Frame;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

bitflags! {
    /// Capabilities a panel advertises to the tab area.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PanelFlags: u8 {
        const CAN_CLOSE = 1 << 0;
        const CAN_DETACH = 1 << 1;
        const NO_SCROLLBAR = 1 << 2;
        const MENU_BAR = 1 << 3;
    }
}

impl Default for PanelFlags {
    fn default() -> Self {
        PanelFlags::CAN_CLOSE | PanelFlags::CAN_DETACH
    }
}

/// What a panel did with a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResponse {
    Ignored,
    Consumed,
    /// Consumed, with a short message for the status line.
    Status(String),
}

pub trait Panel {
    fn name(&self) -> &str;

    fn icon(&self) -> &str {
        ""
    }

    /// Flags the panel starts with when registered.
    fn flags(&self) -> PanelFlags {
        PanelFlags::default()
    }

    fn on_render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppContext);

    fn on_attach(&mut self) {}

    fn on_detach(&mut self) -> Result<(), HookError> {
        Ok(())
    }

    fn on_focus(&mut self) {}

    fn on_lost_focus(&mut self) {}

    fn on_key(&mut self, _key: KeyEvent) -> KeyResponse {
        KeyResponse::Ignored
    }

    /// True while the panel is taking text input, which suspends global
    /// shortcuts.
    fn captures_input(&self) -> bool {
        false
    }

    /// `(key, label)` hints shown when the panel has [`PanelFlags::MENU_BAR`].
    fn menu_bar(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    /// `(position, content_length)` for the scrollbar.
    fn scroll(&self) -> Option<(usize, usize)> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(u32);

impl PanelId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered panel plus the state the manager keeps for it.
pub struct PanelSlot {
    id: PanelId,
    name: String,
    icon: String,
    unique_id: String,
    flags: PanelFlags,
    open: bool,
    focused: bool,
    detached: bool,
    detach_seq: u64,
    detached_size: Size,
    panel: Box<dyn Panel>,
}

impl PanelSlot {
    pub fn id(&self) -> PanelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// Name plus id, stable for the panel's lifetime and unique per manager.
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Icon and name, as shown on tabs and window titles.
    pub fn label(&self) -> String {
        if self.icon.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.icon, self.name)
        }
    }

    pub fn flags(&self) -> PanelFlags {
        self.flags
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn detached_size(&self) -> Size {
        self.detached_size
    }

    pub fn panel(&self) -> &dyn Panel {
        self.panel.as_ref()
    }

    pub fn panel_mut(&mut self) -> &mut dyn Panel {
        self.panel.as_mut()
    }
}

impl fmt::Debug for PanelSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelSlot")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("flags", &self.flags)
            .field("open", &self.open)
            .field("focused", &self.focused)
            .field("detached", &self.detached)
            .finish_non_exhaustive()
    }
}

/// Ordered panels plus single-selection focus.
#[derive(Debug)]
pub struct PanelManager {
    panels: Vec<PanelSlot>,
    active: Option<PanelId>,
    next_id: u32,
    detach_seq: u64,
}

impl Default for PanelManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelManager {
    pub fn new() -> Self {
        Self {
            panels: Vec::new(),
            active: None,
            next_id: 1,
            detach_seq: 0,
        }
    }

    /// Register a panel. Rejected (and dropped) if the name is taken.
    pub fn add_panel(&mut self, panel: Box<dyn Panel>) -> Option<PanelId> {
        let name = panel.name().to_string();
        if self.find(&name).is_some() {
            warn!(panel = %name, "panel already registered");
            return None;
        }

        let id = PanelId(self.next_id);
        self.next_id += 1;
        let mut slot = PanelSlot {
            id,
            icon: panel.icon().to_string(),
            unique_id: format!("{name}##Panel{id}"),
            name,
            flags: panel.flags(),
            open: true,
            focused: false,
            detached: false,
            detach_seq: 0,
            detached_size: Size::new(40, 16),
            panel,
        };
        slot.panel.on_attach();
        self.panels.push(slot);
        info!(panel = %self.panels[self.panels.len() - 1].name, %id, "panel added");

        if self.active.is_none() {
            self.focus_at(self.panels.len() - 1);
        }
        Some(id)
    }

    /// Unregister a panel and hand it back. Focus moves to the next attached
    /// panel if the removed one had it.
    pub fn remove_panel(&mut self, id: PanelId) -> Option<Box<dyn Panel>> {
        let Some(idx) = self.index_of(id) else {
            debug!(%id, "remove_panel: unknown panel");
            return None;
        };

        if self.active == Some(id) {
            self.blur_active();
            if let Some(next) = self.next_attached_after(idx) {
                self.focus_at(next);
            }
        }

        detach_guarded(&mut self.panels[idx]);
        let slot = self.panels.remove(idx);
        info!(panel = %slot.name, "panel removed");
        Some(slot.panel)
    }

    pub fn remove_panel_by_name(&mut self, name: &str) -> Option<Box<dyn Panel>> {
        let id = self.find(name)?;
        self.remove_panel(id)
    }

    /// Give a panel focus. Detached and unknown panels are ignored.
    pub fn set_active_panel(&mut self, id: PanelId) {
        let Some(idx) = self.index_of(id) else {
            return;
        };
        if self.panels[idx].detached {
            debug!(panel = %self.panels[idx].name, "detached panels cannot take focus");
            return;
        }
        if self.active == Some(id) {
            return;
        }
        self.blur_active();
        self.focus_at(idx);
    }

    pub fn set_active_panel_by_name(&mut self, name: &str) {
        if let Some(id) = self.find(name) {
            self.set_active_panel(id);
        }
    }

    /// Move a panel out of the tab area into its own window.
    ///
    /// [`PanelFlags::CAN_DETACH`] is not checked here; it only gates the
    /// user-facing shortcut.
    pub fn detach_panel(&mut self, id: PanelId) {
        let Some(idx) = self.index_of(id) else {
            return;
        };
        let slot = &mut self.panels[idx];
        if slot.detached {
            return;
        }
        self.detach_seq += 1;
        slot.detached = true;
        slot.detach_seq = self.detach_seq;
        info!(panel = %slot.name, "panel detached");

        if self.active == Some(id) {
            self.blur_active();
            if let Some(next) = self.next_attached_after(idx) {
                self.focus_at(next);
            }
        }
    }

    /// Bring a detached panel back into the tab area.
    pub fn attach_panel(&mut self, id: PanelId) {
        let Some(idx) = self.index_of(id) else {
            return;
        };
        if !self.panels[idx].detached {
            return;
        }
        self.panels[idx].detached = false;
        info!(panel = %self.panels[idx].name, "panel attached");
        if self.active.is_none() {
            self.focus_at(idx);
        }
    }

    /// Close a panel that allows it. Returns whether it was closed.
    pub fn close_panel(&mut self, id: PanelId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if !self.panels[idx].flags.contains(PanelFlags::CAN_CLOSE) {
            debug!(panel = %self.panels[idx].name, "panel cannot be closed");
            return false;
        }
        self.panels[idx].open = false;
        self.remove_panel(id).is_some()
    }

    /// Close every other closable panel. Returns how many were closed.
    pub fn close_others(&mut self, keep: PanelId) -> usize {
        let doomed: Vec<PanelId> = self
            .panels
            .iter()
            .filter(|s| s.id != keep && s.flags.contains(PanelFlags::CAN_CLOSE))
            .map(|s| s.id)
            .collect();
        doomed.into_iter().filter(|id| self.close_panel(*id)).count()
    }

    /// Mark a panel open or closed. Closed detached windows are collected by
    /// [`PanelManager::remove_closed`].
    pub fn set_open(&mut self, id: PanelId, open: bool) {
        if let Some(idx) = self.index_of(id) {
            self.panels[idx].open = open;
        }
    }

    /// Remove every panel whose open flag was cleared.
    pub fn remove_closed(&mut self) -> usize {
        let closed: Vec<PanelId> = self
            .panels
            .iter()
            .filter(|s| !s.open)
            .map(|s| s.id)
            .collect();
        closed
            .into_iter()
            .filter(|id| self.remove_panel(*id).is_some())
            .count()
    }

    /// Focus the next attached panel, wrapping around.
    pub fn focus_next(&mut self) {
        self.cycle_focus(true);
    }

    /// Focus the previous attached panel, wrapping around.
    pub fn focus_prev(&mut self) {
        self.cycle_focus(false);
    }

    /// Shift a panel `offset` places in tab order, clamped to the ends.
    pub fn move_panel(&mut self, id: PanelId, offset: isize) -> bool {
        let Some(from) = self.index_of(id) else {
            return false;
        };
        let last = self.panels.len() as isize - 1;
        let to = (from as isize + offset).clamp(0, last) as usize;
        if to == from {
            return false;
        }
        let slot = self.panels.remove(from);
        self.panels.insert(to, slot);
        true
    }

    pub fn set_flags(&mut self, id: PanelId, flags: PanelFlags) {
        if let Some(idx) = self.index_of(id) {
            self.panels[idx].flags = flags;
        }
    }

    pub fn set_detached_size(&mut self, id: PanelId, size: Size) {
        if let Some(idx) = self.index_of(id) {
            self.panels[idx].detached_size = size;
        }
    }

    /// Detach every panel and forget them all.
    pub fn shutdown(&mut self) {
        for slot in &mut self.panels {
            detach_guarded(slot);
        }
        self.panels.clear();
        self.active = None;
        info!("panel manager shut down");
    }

    pub fn find(&self, name: &str) -> Option<PanelId> {
        self.panels.iter().find(|s| s.name == name).map(|s| s.id)
    }

    pub fn panel(&self, id: PanelId) -> Option<&PanelSlot> {
        self.panels.iter().find(|s| s.id == id)
    }

    pub fn panel_mut(&mut self, id: PanelId) -> Option<&mut PanelSlot> {
        self.panels.iter_mut().find(|s| s.id == id)
    }

    pub fn active(&self) -> Option<PanelId> {
        self.active
    }

    pub fn active_slot(&self) -> Option<&PanelSlot> {
        self.active.and_then(|id| self.panel(id))
    }

    pub fn active_slot_mut(&mut self) -> Option<&mut PanelSlot> {
        let id = self.active?;
        self.panel_mut(id)
    }

    /// The panel detached most recently that is still detached.
    pub fn last_detached(&self) -> Option<PanelId> {
        self.panels
            .iter()
            .filter(|s| s.detached)
            .max_by_key(|s| s.detach_seq)
            .map(|s| s.id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PanelSlot> {
        self.panels.iter()
    }

    pub fn attached_count(&self) -> usize {
        self.panels.iter().filter(|s| !s.detached).count()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    fn index_of(&self, id: PanelId) -> Option<usize> {
        self.panels.iter().position(|s| s.id == id)
    }

    fn focus_at(&mut self, idx: usize) {
        let slot = &mut self.panels[idx];
        slot.focused = true;
        self.active = Some(slot.id);
        slot.panel.on_focus();
        debug!(panel = %slot.name, "panel focused");
    }

    fn blur_active(&mut self) {
        let Some(id) = self.active.take() else {
            return;
        };
        if let Some(idx) = self.index_of(id) {
            let slot = &mut self.panels[idx];
            slot.focused = false;
            slot.panel.on_lost_focus();
        }
    }

    /// First attached panel after `idx`, wrapping, never `idx` itself.
    fn next_attached_after(&self, idx: usize) -> Option<usize> {
        let len = self.panels.len();
        (1..len)
            .map(|offset| (idx + offset) % len)
            .find(|&i| !self.panels[i].detached)
    }

    fn cycle_focus(&mut self, forward: bool) {
        let attached: Vec<usize> = (0..self.panels.len())
            .filter(|&i| !self.panels[i].detached)
            .collect();
        if attached.is_empty() {
            return;
        }
        let current = self
            .active
            .and_then(|id| self.index_of(id))
            .and_then(|idx| attached.iter().position(|&i| i == idx));
        let target = match current {
            Some(pos) if forward => attached[(pos + 1) % attached.len()],
            Some(pos) => attached[(pos + attached.len() - 1) % attached.len()],
            None => attached[0],
        };
        let id = self.panels[target].id;
        self.set_active_panel(id);
    }
}

impl Drop for PanelManager {
    fn drop(&mut self) {
        if !self.panels.is_empty() {
            self.shutdown();
        }
    }
}

fn detach_guarded(slot: &mut PanelSlot) {
    let panel = &mut slot.panel;
    match catch_unwind(AssertUnwindSafe(|| panel.on_detach())) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(panel = %slot.name, "error during panel detach: {e}"),
        Err(payload) => error!(
            panel = %slot.name,
            "panic during panel detach: {}",
            panic_message(payload.as_ref())
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Journal = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        flags: PanelFlags,
        journal: Journal,
        fail_detach: bool,
    }

    impl Panel for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn flags(&self) -> PanelFlags {
            self.flags
        }

        fn on_render(&mut self, _frame: &mut Frame<'_>, _area: Rect, _ctx: &AppContext) {}

        fn on_attach(&mut self) {
            self.journal.borrow_mut().push(format!("attach:{}", self.name));
        }

        fn on_detach(&mut self) -> Result<(), HookError> {
            self.journal.borrow_mut().push(format!("detach:{}", self.name));
            if self.fail_detach {
                return Err(HookError::new("session still open"));
            }
            Ok(())
        }

        fn on_focus(&mut self) {
            self.journal.borrow_mut().push(format!("focus:{}", self.name));
        }

        fn on_lost_focus(&mut self) {
            self.journal.borrow_mut().push(format!("blur:{}", self.name));
        }
    }

    fn recorder(name: &'static str, journal: &Journal) -> Box<dyn Panel> {
        Box::new(Recorder {
            name,
            flags: PanelFlags::default(),
            journal: journal.clone(),
            fail_detach: false,
        })
    }

    fn focused(manager: &PanelManager) -> Vec<&str> {
        manager
            .iter()
            .filter(|s| s.is_focused())
            .map(|s| s.name())
            .collect()
    }

    fn assert_focus_invariant(manager: &PanelManager) {
        let focused: Vec<&PanelSlot> = manager.iter().filter(|s| s.is_focused()).collect();
        assert!(focused.len() <= 1);
        if let Some(slot) = focused.first() {
            assert!(!slot.is_detached());
            assert_eq!(manager.active(), Some(slot.id()));
        } else {
            assert_eq!(manager.active(), None);
        }
    }

    #[test]
    fn first_panel_takes_focus() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        let x = manager.add_panel(recorder("X", &journal)).expect("added");
        manager.add_panel(recorder("Y", &journal)).expect("added");

        assert_eq!(manager.active(), Some(x));
        assert_eq!(focused(&manager), ["X"]);
        assert_eq!(*journal.borrow(), ["attach:X", "focus:X", "attach:Y"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        assert!(manager.add_panel(recorder("Telegram", &journal)).is_some());
        assert!(manager.add_panel(recorder("Telegram", &journal)).is_none());
        assert_eq!(manager.len(), 1);
        assert_eq!(
            journal.borrow().iter().filter(|e| *e == "attach:Telegram").count(),
            1
        );
    }

    #[test]
    fn ids_increase_and_unique_ids_embed_them() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        let a = manager.add_panel(recorder("A", &journal)).expect("added");
        let b = manager.add_panel(recorder("B", &journal)).expect("added");
        assert!(b > a);
        let slot = manager.panel(b).expect("registered");
        assert_eq!(slot.unique_id(), format!("B##Panel{}", b.get()));
    }

    #[test]
    fn detaching_focused_panel_moves_focus_and_blocks_reactivation() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        let x = manager.add_panel(recorder("X", &journal)).expect("added");
        let y = manager.add_panel(recorder("Y", &journal)).expect("added");

        manager.detach_panel(x);
        assert_eq!(manager.active(), Some(y));
        assert!(manager.panel(x).expect("still registered").is_detached());

        manager.set_active_panel(x);
        assert_eq!(manager.active(), Some(y));
        assert_focus_invariant(&manager);
    }

    #[test]
    fn detaching_the_last_attached_panel_clears_focus() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        let x = manager.add_panel(recorder("X", &journal)).expect("added");
        manager.detach_panel(x);
        assert_eq!(manager.active(), None);
        assert_focus_invariant(&manager);

        manager.attach_panel(x);
        assert_eq!(manager.active(), Some(x));
        assert_focus_invariant(&manager);
    }

    #[test]
    fn attach_does_not_steal_focus() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        let x = manager.add_panel(recorder("X", &journal)).expect("added");
        let y = manager.add_panel(recorder("Y", &journal)).expect("added");
        manager.detach_panel(y);
        manager.attach_panel(y);
        assert_eq!(manager.active(), Some(x));
        assert!(!manager.panel(y).expect("registered").is_detached());
    }

    #[test]
    fn detach_ignores_capability_flags() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        let x = manager
            .add_panel(Box::new(Recorder {
                name: "X",
                flags: PanelFlags::CAN_CLOSE,
                journal: journal.clone(),
                fail_detach: false,
            }))
            .expect("added");
        let y = manager.add_panel(recorder("Y", &journal)).expect("added");

        manager.detach_panel(x);
        assert!(manager.panel(x).expect("registered").is_detached());
        assert_eq!(manager.active(), Some(y));
        assert_focus_invariant(&manager);
    }

    #[test]
    fn panels_without_can_close_stay_open() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        let x = manager
            .add_panel(Box::new(Recorder {
                name: "Stats",
                flags: PanelFlags::NO_SCROLLBAR,
                journal: journal.clone(),
                fail_detach: false,
            }))
            .expect("added");
        assert!(!manager.close_panel(x));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn removing_focused_panel_focuses_the_next_attached_one() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        let a = manager.add_panel(recorder("A", &journal)).expect("added");
        let b = manager.add_panel(recorder("B", &journal)).expect("added");
        let c = manager.add_panel(recorder("C", &journal)).expect("added");
        manager.detach_panel(b);
        journal.borrow_mut().clear();

        let removed = manager.remove_panel(a).expect("removed");
        assert_eq!(removed.name(), "A");
        assert_eq!(manager.active(), Some(c));
        assert_eq!(*journal.borrow(), ["blur:A", "focus:C", "detach:A"]);
        assert_focus_invariant(&manager);
    }

    #[test]
    fn removing_an_unfocused_panel_keeps_focus() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        let a = manager.add_panel(recorder("A", &journal)).expect("added");
        manager.add_panel(recorder("B", &journal)).expect("added");
        assert!(manager.remove_panel_by_name("B").is_some());
        assert!(manager.remove_panel_by_name("B").is_none());
        assert_eq!(manager.active(), Some(a));
    }

    #[test]
    fn set_active_switches_focus_with_hooks() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        manager.add_panel(recorder("A", &journal)).expect("added");
        let b = manager.add_panel(recorder("B", &journal)).expect("added");
        journal.borrow_mut().clear();

        manager.set_active_panel_by_name("B");
        manager.set_active_panel(b);
        assert_eq!(*journal.borrow(), ["blur:A", "focus:B"]);
        assert_eq!(focused(&manager), ["B"]);
    }

    #[test]
    fn focus_cycles_over_attached_panels() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        let a = manager.add_panel(recorder("A", &journal)).expect("added");
        let b = manager.add_panel(recorder("B", &journal)).expect("added");
        let c = manager.add_panel(recorder("C", &journal)).expect("added");
        manager.detach_panel(b);

        manager.focus_next();
        assert_eq!(manager.active(), Some(c));
        manager.focus_next();
        assert_eq!(manager.active(), Some(a));
        manager.focus_prev();
        assert_eq!(manager.active(), Some(c));
    }

    #[test]
    fn close_others_keeps_unclosable_panels() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        let keep = manager.add_panel(recorder("Chat", &journal)).expect("added");
        manager.add_panel(recorder("Notes", &journal)).expect("added");
        manager
            .add_panel(Box::new(Recorder {
                name: "Stats",
                flags: PanelFlags::CAN_DETACH,
                journal: journal.clone(),
                fail_detach: false,
            }))
            .expect("added");

        assert_eq!(manager.close_others(keep), 1);
        let names: Vec<&str> = manager.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["Chat", "Stats"]);
    }

    #[test]
    fn closed_detached_panels_are_collected() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        manager.add_panel(recorder("A", &journal)).expect("added");
        let b = manager.add_panel(recorder("B", &journal)).expect("added");
        manager.detach_panel(b);
        assert_eq!(manager.last_detached(), Some(b));

        manager.set_open(b, false);
        assert_eq!(manager.remove_closed(), 1);
        assert!(manager.panel(b).is_none());
        assert_eq!(manager.last_detached(), None);
    }

    #[test]
    fn move_panel_reorders_tabs() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        let a = manager.add_panel(recorder("A", &journal)).expect("added");
        manager.add_panel(recorder("B", &journal)).expect("added");
        manager.add_panel(recorder("C", &journal)).expect("added");

        assert!(manager.move_panel(a, 1));
        assert!(manager.move_panel(a, 5));
        assert!(!manager.move_panel(a, 1));
        let names: Vec<&str> = manager.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["B", "C", "A"]);
    }

    #[test]
    fn shutdown_detaches_every_panel_despite_failures() {
        let journal = Journal::default();
        let mut manager = PanelManager::new();
        manager
            .add_panel(Box::new(Recorder {
                name: "Flaky",
                flags: PanelFlags::default(),
                journal: journal.clone(),
                fail_detach: true,
            }))
            .expect("added");
        manager.add_panel(recorder("B", &journal)).expect("added");
        journal.borrow_mut().clear();

        manager.shutdown();
        assert_eq!(*journal.borrow(), ["detach:Flaky", "detach:B"]);
        assert!(manager.is_empty());
        assert_eq!(manager.active(), None);
    }

    #[test]
    fn drop_detaches_remaining_panels() {
        let journal = Journal::default();
        {
            let mut manager = PanelManager::new();
            manager.add_panel(recorder("A", &journal)).expect("added");
        }
        assert_eq!(journal.borrow().last().map(String::as_str), Some("detach:A"));
    }
}
