//! Layers and the ordered stack that owns them while they are registered.
//!
//! The stack is split into two contiguous zones: regular layers in
//! `[0, insert_index)` and overlays in `[insert_index, len)`. Forward
//! iteration is update/render order; reverse iteration is teardown and
//! event order, so the topmost overlay sees input first.

use crate::context::AppContext;
use crate::error::{panic_message, HookError};
use crate::time::TimeStep;
use crossterm::event::Event;
use ratatui::Frame;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

/// A unit of per-frame behavior with a position in the [`LayerStack`].
pub trait Layer {
    /// Display name. Copied once when the layer is pushed.
    fn name(&self) -> &str;

    fn on_attach(&mut self) {}

    fn on_detach(&mut self) -> Result<(), HookError> {
        Ok(())
    }

    fn on_update(&mut self, _ts: TimeStep, _ctx: &mut AppContext) {}

    fn on_ui_render(&mut self, _frame: &mut Frame<'_>, _ctx: &mut AppContext) {}

    /// Return `true` to stop the event from reaching layers further down.
    fn on_event(&mut self, _event: &Event, _ctx: &mut AppContext) -> bool {
        false
    }
}

/// Identity of a pushed layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

/// A registered layer together with the state the stack keeps for it.
pub struct LayerEntry {
    id: LayerId,
    name: String,
    active: bool,
    visible: bool,
    event_priority: i32,
    layer: Box<dyn Layer>,
}

impl LayerEntry {
    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn event_priority(&self) -> i32 {
        self.event_priority
    }

    pub fn layer(&self) -> &dyn Layer {
        self.layer.as_ref()
    }

    pub fn layer_mut(&mut self) -> &mut dyn Layer {
        self.layer.as_mut()
    }
}

impl fmt::Debug for LayerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("active", &self.active)
            .field("visible", &self.visible)
            .field("event_priority", &self.event_priority)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of regular layers followed by overlays.
#[derive(Debug, Default)]
pub struct LayerStack {
    layers: Vec<LayerEntry>,
    insert_index: usize,
    next_id: u64,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a regular layer at the end of the regular zone and attach it.
    pub fn push_layer(&mut self, layer: Box<dyn Layer>) -> LayerId {
        let entry = self.make_entry(layer);
        let id = entry.id;
        self.layers.insert(self.insert_index, entry);
        self.insert_index += 1;
        self.attach_at(self.insert_index - 1);
        id
    }

    /// Append an overlay after every other layer and attach it.
    pub fn push_overlay(&mut self, overlay: Box<dyn Layer>) -> LayerId {
        let entry = self.make_entry(overlay);
        let id = entry.id;
        self.layers.push(entry);
        self.attach_at(self.layers.len() - 1);
        id
    }

    /// Detach and remove a regular layer. Overlays are never matched.
    pub fn pop_layer(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        let Some(pos) = self.layers[..self.insert_index]
            .iter()
            .position(|e| e.id == id)
        else {
            debug!(%id, "pop_layer: not in the regular zone");
            return None;
        };
        detach_guarded(&mut self.layers[pos]);
        let entry = self.layers.remove(pos);
        self.insert_index -= 1;
        info!(layer = %entry.name, "layer popped");
        Some(entry.layer)
    }

    /// Detach and remove an overlay. Regular layers are never matched.
    pub fn pop_overlay(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        let Some(offset) = self.layers[self.insert_index..]
            .iter()
            .position(|e| e.id == id)
        else {
            debug!(%id, "pop_overlay: not in the overlay zone");
            return None;
        };
        let pos = self.insert_index + offset;
        detach_guarded(&mut self.layers[pos]);
        let entry = self.layers.remove(pos);
        info!(layer = %entry.name, "overlay popped");
        Some(entry.layer)
    }

    /// Detach every layer, most recent overlay first, and hand them back.
    ///
    /// A layer whose `on_detach` fails or panics is logged and skipped so the
    /// rest of the stack still tears down.
    pub fn clear(&mut self) -> Vec<Box<dyn Layer>> {
        for entry in self.layers.iter_mut().rev() {
            detach_guarded(entry);
        }
        self.insert_index = 0;
        self.layers.drain(..).map(|entry| entry.layer).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LayerEntry> {
        self.layers.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, LayerEntry> {
        self.layers.iter_mut()
    }

    pub fn names(&self) -> Vec<&str> {
        self.layers.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of regular layers, which is also where the next one goes.
    pub fn insert_index(&self) -> usize {
        self.insert_index
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.entry(id).is_some()
    }

    pub fn is_overlay(&self, id: LayerId) -> bool {
        self.layers[self.insert_index..].iter().any(|e| e.id == id)
    }

    pub fn find(&self, name: &str) -> Option<LayerId> {
        self.layers.iter().find(|e| e.name == name).map(|e| e.id)
    }

    pub fn name(&self, id: LayerId) -> Option<&str> {
        self.entry(id).map(|e| e.name.as_str())
    }

    pub fn set_active(&mut self, id: LayerId, active: bool) {
        match self.entry_mut(id) {
            Some(entry) => entry.active = active,
            None => warn!(%id, "set_active on unknown layer"),
        }
    }

    pub fn is_active(&self, id: LayerId) -> bool {
        self.entry(id).is_some_and(|e| e.active)
    }

    pub fn set_visible(&mut self, id: LayerId, visible: bool) {
        if let Some(entry) = self.entry_mut(id) {
            entry.visible = visible;
        }
    }

    pub fn is_visible(&self, id: LayerId) -> bool {
        self.entry(id).is_some_and(|e| e.visible)
    }

    pub fn set_event_priority(&mut self, id: LayerId, priority: i32) {
        if let Some(entry) = self.entry_mut(id) {
            entry.event_priority = priority;
        }
    }

    pub fn event_priority(&self, id: LayerId) -> Option<i32> {
        self.entry(id).map(|e| e.event_priority)
    }

    fn entry(&self, id: LayerId) -> Option<&LayerEntry> {
        self.layers.iter().find(|e| e.id == id)
    }

    fn entry_mut(&mut self, id: LayerId) -> Option<&mut LayerEntry> {
        self.layers.iter_mut().find(|e| e.id == id)
    }

    fn make_entry(&mut self, layer: Box<dyn Layer>) -> LayerEntry {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        LayerEntry {
            id,
            name: layer.name().to_string(),
            active: true,
            visible: true,
            event_priority: 0,
            layer,
        }
    }

    fn attach_at(&mut self, pos: usize) {
        let entry = &mut self.layers[pos];
        entry.layer.on_attach();
        info!(layer = %entry.name, id = %entry.id, "layer attached");
    }
}

impl Drop for LayerStack {
    fn drop(&mut self) {
        if !self.layers.is_empty() {
            self.clear();
        }
    }
}

fn detach_guarded(entry: &mut LayerEntry) {
    let layer = &mut entry.layer;
    match catch_unwind(AssertUnwindSafe(|| layer.on_detach())) {
        Ok(Ok(())) => info!(layer = %entry.name, "layer detached"),
        Ok(Err(e)) => error!(layer = %entry.name, "error during layer detach: {e}"),
        Err(payload) => error!(
            layer = %entry.name,
            "panic during layer detach: {}",
            panic_message(payload.as_ref())
        ),
    }
}
