//! The window collaborator: a surface the run loop polls, draws into and
//! presents once per frame.

use crate::error::WindowError;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
};
use ratatui::backend::{Backend, CrosstermBackend, TestBackend};
use ratatui::buffer::Buffer;
use ratatui::layout::{Rect, Size};
use ratatui::{Terminal, TerminalOptions, Viewport};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Frame interval used when vsync is on (~30 fps).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Headless,
    Fullscreen,
    FullscreenBorderless,
    #[default]
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VSync {
    Off,
    #[default]
    On,
}

/// Window placement, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    pub start_x: u16,
    pub start_y: u16,
    pub width: u16,
    pub height: u16,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            start_x: 0,
            start_y: 0,
            width: 120,
            height: 36,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub mode: Mode,
    pub dimensions: Dimensions,
    pub decorated: bool,
    pub transparent: bool,
    pub vsync: VSync,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "TG".into(),
            mode: Mode::Default,
            dimensions: Dimensions::default(),
            decorated: true,
            transparent: false,
            vsync: VSync::On,
        }
    }
}

/// Surface the run loop drives. The ratatui terminal it exposes is the UI
/// backend that layers draw into.
pub trait Window {
    type Backend: Backend;

    /// Create the surface. Failure is fatal for the application.
    fn init(&mut self) -> Result<(), WindowError>;

    fn is_initialized(&self) -> bool;

    /// Drain pending input without blocking.
    fn process_events(&mut self) -> Result<Vec<Event>, WindowError>;

    /// Present the frame that was just drawn.
    fn swap_buffers(&mut self) -> Result<(), WindowError>;

    fn is_open(&self) -> bool;

    fn size(&self) -> Size;

    fn request_close(&mut self);

    fn config(&self) -> &WindowConfig;

    fn terminal(&mut self) -> Result<&mut Terminal<Self::Backend>, WindowError>;

    /// Release the surface. Called once after the run loop exits.
    fn shutdown(&mut self) {}
}

/// A window backed by the controlling terminal's alternate screen.
pub struct TerminalWindow {
    config: WindowConfig,
    terminal: Option<Terminal<CrosstermBackend<Stdout>>>,
    area: Rect,
    open: bool,
    last_present: Instant,
}

impl TerminalWindow {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            terminal: None,
            area: Rect::default(),
            open: false,
            last_present: Instant::now(),
        }
    }

    fn create_terminal(&mut self) -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, SetTitle(&self.config.title))?;

        let (cols, rows) = terminal::size()?;
        let full = Rect::new(0, 0, cols, rows);
        let viewport = match self.config.mode {
            Mode::Default => {
                let dims = self.config.dimensions;
                let x = dims.start_x.min(cols.saturating_sub(1));
                let y = dims.start_y.min(rows.saturating_sub(1));
                let rect = Rect::new(
                    x,
                    y,
                    dims.width.min(cols - x),
                    dims.height.min(rows - y),
                );
                self.area = rect;
                Viewport::Fixed(rect)
            }
            Mode::Headless => {
                warn!("headless mode requested for a terminal window; using the full screen");
                self.area = full;
                Viewport::Fullscreen
            }
            Mode::Fullscreen | Mode::FullscreenBorderless => {
                self.area = full;
                Viewport::Fullscreen
            }
        };

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::with_options(backend, TerminalOptions { viewport })?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(terminal)
    }

    /// Apply window-level effects of `ev` and say whether layers should see
    /// it. Ctrl+C closes the window and is swallowed.
    fn accept(&mut self, ev: &Event) -> bool {
        match ev {
            // Only key presses matter; release/repeat are platform noise.
            Event::Key(key) if key.kind != KeyEventKind::Press => false,
            Event::Key(key)
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c') =>
            {
                debug!("ctrl+c received, closing window");
                self.open = false;
                false
            }
            Event::Resize(cols, rows) => {
                if self.config.mode != Mode::Default {
                    self.area = Rect::new(0, 0, *cols, *rows);
                }
                true
            }
            _ => true,
        }
    }

    fn restore(&mut self) {
        if let Some(mut terminal) = self.terminal.take() {
            let _ = disable_raw_mode();
            let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
            let _ = terminal.show_cursor();
            info!("terminal restored");
        }
        self.open = false;
    }
}

impl Window for TerminalWindow {
    type Backend = CrosstermBackend<Stdout>;

    fn init(&mut self) -> Result<(), WindowError> {
        info!(
            title = %self.config.title,
            mode = ?self.config.mode,
            width = self.config.dimensions.width,
            height = self.config.dimensions.height,
            "creating window"
        );
        match self.create_terminal() {
            Ok(terminal) => {
                self.terminal = Some(terminal);
                self.open = true;
                self.last_present = Instant::now();
                Ok(())
            }
            Err(e) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                Err(WindowError::Init(e))
            }
        }
    }

    fn is_initialized(&self) -> bool {
        self.terminal.is_some()
    }

    fn process_events(&mut self) -> Result<Vec<Event>, WindowError> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            let ev = event::read()?;
            if self.accept(&ev) {
                events.push(ev);
            }
        }
        Ok(events)
    }

    fn swap_buffers(&mut self) -> Result<(), WindowError> {
        let terminal = self.terminal.as_mut().ok_or(WindowError::NotInitialized)?;
        terminal.swap_buffers();
        terminal.backend_mut().flush()?;

        if self.config.vsync == VSync::On {
            if let Some(remaining) = FRAME_INTERVAL.checked_sub(self.last_present.elapsed()) {
                thread::sleep(remaining);
            }
        }
        self.last_present = Instant::now();
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn size(&self) -> Size {
        Size::from(self.area)
    }

    fn request_close(&mut self) {
        self.open = false;
    }

    fn config(&self) -> &WindowConfig {
        &self.config
    }

    fn terminal(&mut self) -> Result<&mut Terminal<Self::Backend>, WindowError> {
        self.terminal.as_mut().ok_or(WindowError::NotInitialized)
    }

    fn shutdown(&mut self) {
        self.restore();
    }
}

impl Drop for TerminalWindow {
    fn drop(&mut self) {
        self.restore();
    }
}

/// An off-screen window rendering into an in-memory buffer.
///
/// Closes itself after an optional frame budget and replays scripted input,
/// which makes whole run loops reproducible.
pub struct HeadlessWindow {
    config: WindowConfig,
    terminal: Option<Terminal<TestBackend>>,
    open: bool,
    frame_budget: Option<u64>,
    presented: u64,
    pending: VecDeque<Event>,
    script: Vec<(u64, Event)>,
}

impl HeadlessWindow {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            terminal: None,
            open: false,
            frame_budget: None,
            presented: 0,
            pending: VecDeque::new(),
            script: Vec::new(),
        }
    }

    /// Close after `frames` presented frames.
    pub fn with_frame_budget(mut self, frames: u64) -> Self {
        self.frame_budget = Some(frames);
        self
    }

    /// Deliver `event` during the frame with the given zero-based index.
    pub fn schedule(&mut self, frame: u64, event: Event) {
        self.script.push((frame, event));
    }

    /// Deliver `event` on the next call to `process_events`.
    pub fn push_event(&mut self, event: Event) {
        self.pending.push_back(event);
    }

    pub fn frames_presented(&self) -> u64 {
        self.presented
    }

    /// Contents of the last presented frame.
    pub fn buffer(&self) -> Option<&Buffer> {
        self.terminal.as_ref().map(|t| t.backend().buffer())
    }
}

impl Window for HeadlessWindow {
    type Backend = TestBackend;

    fn init(&mut self) -> Result<(), WindowError> {
        let dims = self.config.dimensions;
        let backend = TestBackend::new(dims.width, dims.height);
        let terminal = Terminal::new(backend).map_err(WindowError::Init)?;
        self.terminal = Some(terminal);
        self.open = self.frame_budget != Some(0);
        info!(width = dims.width, height = dims.height, "headless window created");
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.terminal.is_some()
    }

    fn process_events(&mut self) -> Result<Vec<Event>, WindowError> {
        let frame = self.presented;
        let mut events: Vec<Event> = self.pending.drain(..).collect();
        let (due, later): (Vec<_>, Vec<_>) =
            self.script.drain(..).partition(|(at, _)| *at <= frame);
        self.script = later;
        events.extend(due.into_iter().map(|(_, ev)| ev));
        Ok(events)
    }

    fn swap_buffers(&mut self) -> Result<(), WindowError> {
        let terminal = self.terminal.as_mut().ok_or(WindowError::NotInitialized)?;
        terminal.swap_buffers();
        terminal.backend_mut().flush()?;
        self.presented += 1;
        if self.frame_budget.is_some_and(|budget| self.presented >= budget) {
            self.open = false;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn size(&self) -> Size {
        Size::new(self.config.dimensions.width, self.config.dimensions.height)
    }

    fn request_close(&mut self) {
        self.open = false;
    }

    fn config(&self) -> &WindowConfig {
        &self.config
    }

    fn terminal(&mut self) -> Result<&mut Terminal<Self::Backend>, WindowError> {
        self.terminal.as_mut().ok_or(WindowError::NotInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn headless(width: u16, height: u16) -> HeadlessWindow {
        HeadlessWindow::new(WindowConfig {
            mode: Mode::Headless,
            dimensions: Dimensions {
                width,
                height,
                ..Dimensions::default()
            },
            ..WindowConfig::default()
        })
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn ctrl_c_closes_the_terminal_window_without_reaching_layers() {
        let mut window = TerminalWindow::new(WindowConfig::default());
        window.open = true;

        assert!(window.accept(&key('c')));
        assert!(window.is_open());

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!window.accept(&ctrl_c));
        assert!(!window.is_open());
    }

    #[test]
    fn key_releases_are_dropped() {
        let mut window = TerminalWindow::new(WindowConfig::default());
        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(!window.accept(&Event::Key(release)));
    }

    #[test]
    fn default_config_matches_desktop_defaults() {
        let cfg = WindowConfig::default();
        assert_eq!(cfg.title, "TG");
        assert_eq!(cfg.mode, Mode::Default);
        assert!(cfg.decorated);
        assert!(!cfg.transparent);
        assert_eq!(cfg.vsync, VSync::On);
    }

    #[test]
    fn config_deserializes_with_partial_fields() {
        let cfg: WindowConfig =
            serde_json::from_str(r#"{"title":"Chats","mode":"fullscreen_borderless"}"#)
                .expect("valid config");
        assert_eq!(cfg.title, "Chats");
        assert_eq!(cfg.mode, Mode::FullscreenBorderless);
        assert_eq!(cfg.dimensions, Dimensions::default());
    }

    #[test]
    fn headless_window_is_closed_until_init() {
        let mut window = headless(20, 5);
        assert!(!window.is_open());
        assert!(matches!(window.terminal(), Err(WindowError::NotInitialized)));
        window.init().expect("headless init");
        assert!(window.is_open());
        assert_eq!(window.size(), Size::new(20, 5));
    }

    #[test]
    fn frame_budget_closes_the_window() {
        let mut window = headless(10, 3).with_frame_budget(2);
        window.init().expect("headless init");
        window.swap_buffers().expect("present");
        assert!(window.is_open());
        window.swap_buffers().expect("present");
        assert!(!window.is_open());
        assert_eq!(window.frames_presented(), 2);
    }

    #[test]
    fn scripted_events_arrive_on_their_frame() {
        let mut window = headless(10, 3);
        window.init().expect("headless init");
        window.schedule(1, key('x'));
        window.push_event(key('a'));

        assert_eq!(window.process_events().expect("poll"), vec![key('a')]);
        window.swap_buffers().expect("present");
        assert_eq!(window.process_events().expect("poll"), vec![key('x')]);
        assert!(window.process_events().expect("poll").is_empty());
    }

    #[test]
    fn request_close_stops_the_window() {
        let mut window = headless(10, 3);
        window.init().expect("headless init");
        window.request_close();
        assert!(!window.is_open());
    }
}
