//! A layered terminal application shell: a window, a stack of layers driven
//! once per frame, and dockable panels with focus and attach/detach state.

pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod layer;
pub mod logging;
pub mod panel;
pub mod render;
pub mod time;
pub mod types;
pub mod ui;
pub mod window;

pub use app::{App, AppPhase, Application, RunSummary};
pub use context::AppContext;
pub use error::{AppError, HookError, WindowError};
pub use layer::{Layer, LayerId, LayerStack};
pub use panel::{Panel, PanelFlags, PanelId, PanelManager};
pub use time::{TimeStep, Timer};
pub use window::{HeadlessWindow, TerminalWindow, Window, WindowConfig};
