use crate::context::AppContext;
use crate::error::{AppError, WindowError};
use crate::layer::{Layer, LayerId, LayerStack};
use crate::render::UiRenderer;
use crate::time::{TimeStep, Timer};
use crate::window::Window;
use crossterm::event::Event;
use tracing::{debug, info, warn};

/// Where the application is in its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    Init,
    Running,
    Shutdown,
}

/// Hooks the embedding program supplies to [`App::run`].
pub trait Application<W: Window> {
    /// Called once before the first frame. Register layers here.
    fn on_init(&mut self, app: &mut App<W>) -> Result<(), AppError>;

    /// Called once after the window closed, before layers are torn down.
    fn on_shutdown(&mut self, _app: &mut App<W>) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub elapsed: f64,
}

/// Owns the window and the layer stack and drives the per-frame cycle.
pub struct App<W: Window> {
    window: W,
    layers: LayerStack,
    context: AppContext,
    ui: UiRenderer,
    frame_timer: Timer,
    phase: AppPhase,
}

impl<W: Window> App<W> {
    pub fn new(window: W) -> Self {
        let context = AppContext::new(window.size(), window.config().transparent);
        info!(title = %window.config().title, "app created");
        Self {
            window,
            layers: LayerStack::new(),
            context,
            ui: UiRenderer::new(),
            frame_timer: Timer::new(),
            phase: AppPhase::Init,
        }
    }

    pub fn push_layer(&mut self, layer: Box<dyn Layer>) -> LayerId {
        self.layers.push_layer(layer)
    }

    pub fn push_overlay(&mut self, overlay: Box<dyn Layer>) -> LayerId {
        self.layers.push_overlay(overlay)
    }

    pub fn pop_layer(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        self.layers.pop_layer(id)
    }

    pub fn pop_overlay(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        self.layers.pop_overlay(id)
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut LayerStack {
        &mut self.layers
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut AppContext {
        &mut self.context
    }

    pub fn phase(&self) -> AppPhase {
        self.phase
    }

    /// Run the application until the window closes.
    ///
    /// `on_init` runs once, then frames are processed while the window is
    /// open, then `on_shutdown` runs once and every remaining layer is
    /// detached.
    pub fn run<A: Application<W>>(&mut self, application: &mut A) -> Result<RunSummary, AppError> {
        if self.phase != AppPhase::Init {
            return Err(AppError::Init("run() may only be called once".into()));
        }
        if !self.window.is_initialized() {
            self.window.init()?;
        }
        self.context.window_size = self.window.size();

        if let Err(e) = application.on_init(self) {
            self.teardown();
            return Err(e);
        }
        info!(layers = ?self.layers.names(), "app initialized");

        self.phase = AppPhase::Running;
        self.frame_timer.reset();
        let mut result = Ok(());
        while self.window.is_open() {
            if let Err(e) = self.frame() {
                result = Err(e);
                break;
            }
        }

        self.phase = AppPhase::Shutdown;
        application.on_shutdown(self);
        self.teardown();
        info!(frames = self.context.frame_index, "app shut down");

        result.map(|()| RunSummary {
            frames: self.context.frame_index,
            elapsed: self.context.elapsed,
        })
    }

    fn frame(&mut self) -> Result<(), AppError> {
        let ts = TimeStep::from(self.frame_timer.reset());

        let events = self.window.process_events()?;
        self.context.begin_frame(ts, self.window.size());
        for event in &events {
            self.dispatch_event(event);
        }
        self.apply_requests();

        for entry in self.layers.iter_mut() {
            if entry.is_active() {
                entry.layer_mut().on_update(ts, &mut self.context);
            }
        }

        self.render_ui()?;
        self.window.swap_buffers()?;
        Ok(())
    }

    /// Offer an event to active layers from the top of the stack down.
    fn dispatch_event(&mut self, event: &Event) {
        for entry in self.layers.iter_mut().rev() {
            if !entry.is_active() {
                continue;
            }
            if entry.layer_mut().on_event(event, &mut self.context) {
                debug!(layer = %entry.name(), ?event, "event handled");
                break;
            }
        }
    }

    fn apply_requests(&mut self) {
        if self.context.take_close_request() {
            info!("close requested");
            self.window.request_close();
        }
        for name in self.context.take_layer_toggles() {
            match self.layers.find(&name) {
                Some(id) => {
                    let active = !self.layers.is_active(id);
                    self.layers.set_active(id, active);
                    info!(layer = %name, active, "layer toggled");
                }
                None => warn!(layer = %name, "toggle requested for unknown layer"),
            }
        }
    }

    fn render_ui(&mut self) -> Result<(), AppError> {
        let terminal = self.window.terminal()?;
        let layers = &mut self.layers;
        let ctx = &mut self.context;
        self.ui
            .frame(terminal, |frame| {
                for entry in layers.iter_mut() {
                    if entry.is_active() && entry.is_visible() {
                        entry.layer_mut().on_ui_render(frame, ctx);
                    }
                }
            })
            .map_err(WindowError::from)?;
        Ok(())
    }

    fn teardown(&mut self) {
        self.layers.clear();
        self.window.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HookError;
    use crate::window::{Dimensions, HeadlessWindow, Mode, WindowConfig};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Journal = Rc<RefCell<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        journal: Journal,
        consumes: Option<char>,
    }

    impl Layer for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn on_attach(&mut self) {
            self.journal.borrow_mut().push(format!("attach:{}", self.name));
        }

        fn on_detach(&mut self) -> Result<(), HookError> {
            self.journal.borrow_mut().push(format!("detach:{}", self.name));
            Ok(())
        }

        fn on_update(&mut self, _ts: TimeStep, _ctx: &mut AppContext) {
            self.journal.borrow_mut().push(format!("update:{}", self.name));
        }

        fn on_ui_render(&mut self, _frame: &mut ratatui::Frame<'_>, _ctx: &mut AppContext) {
            self.journal.borrow_mut().push(format!("render:{}", self.name));
        }

        fn on_event(&mut self, event: &Event, ctx: &mut AppContext) -> bool {
            self.journal.borrow_mut().push(format!("event:{}", self.name));
            match (event, self.consumes) {
                (Event::Key(key), Some(c)) if key.code == KeyCode::Char(c) => {
                    if c == 'q' {
                        ctx.request_close();
                    }
                    true
                }
                _ => false,
            }
        }
    }

    struct Setup {
        journal: Journal,
        shutdowns: usize,
        inactive: Option<&'static str>,
    }

    impl Setup {
        fn new(journal: &Journal) -> Self {
            Self {
                journal: journal.clone(),
                shutdowns: 0,
                inactive: None,
            }
        }

        fn layer(&self, name: &'static str, consumes: Option<char>) -> Box<dyn Layer> {
            Box::new(Recorder {
                name,
                journal: self.journal.clone(),
                consumes,
            })
        }
    }

    impl Application<HeadlessWindow> for Setup {
        fn on_init(&mut self, app: &mut App<HeadlessWindow>) -> Result<(), AppError> {
            app.push_layer(self.layer("A", None));
            app.push_overlay(self.layer("UI", Some('q')));
            let b = app.push_layer(self.layer("B", None));
            if self.inactive == Some("B") {
                app.layers_mut().set_active(b, false);
            }
            Ok(())
        }

        fn on_shutdown(&mut self, app: &mut App<HeadlessWindow>) {
            assert_eq!(app.phase(), AppPhase::Shutdown);
            self.shutdowns += 1;
            self.journal.borrow_mut().push("shutdown".into());
        }
    }

    fn window(frames: Option<u64>) -> HeadlessWindow {
        let config = WindowConfig {
            mode: Mode::Headless,
            dimensions: Dimensions {
                width: 20,
                height: 4,
                ..Dimensions::default()
            },
            ..WindowConfig::default()
        };
        let window = HeadlessWindow::new(config);
        match frames {
            Some(n) => window.with_frame_budget(n),
            None => window,
        }
    }

    fn count(journal: &Journal, entry: &str) -> usize {
        journal.borrow().iter().filter(|e| e.as_str() == entry).count()
    }

    #[test]
    fn three_frames_update_each_layer_three_times_in_order() {
        let journal = Journal::default();
        let mut setup = Setup::new(&journal);
        let mut app = App::new(window(Some(3)));

        let summary = app.run(&mut setup).expect("run");

        assert_eq!(summary.frames, 3);
        assert_eq!(setup.shutdowns, 1);
        for name in ["A", "B", "UI"] {
            assert_eq!(count(&journal, &format!("update:{name}")), 3);
            assert_eq!(count(&journal, &format!("render:{name}")), 3);
        }
        let updates: Vec<String> = journal
            .borrow()
            .iter()
            .filter(|e| e.starts_with("update:"))
            .take(3)
            .cloned()
            .collect();
        assert_eq!(updates, ["update:A", "update:B", "update:UI"]);
    }

    #[test]
    fn shutdown_runs_before_teardown_and_detaches_everything_once() {
        let journal = Journal::default();
        let mut setup = Setup::new(&journal);
        let mut app = App::new(window(Some(1)));
        app.run(&mut setup).expect("run");

        let log = journal.borrow();
        let tail: Vec<&str> = log.iter().rev().take(4).rev().map(String::as_str).collect();
        assert_eq!(tail, ["shutdown", "detach:UI", "detach:B", "detach:A"]);
        for name in ["A", "B", "UI"] {
            assert_eq!(log.iter().filter(|e| **e == format!("attach:{name}")).count(), 1);
            assert_eq!(log.iter().filter(|e| **e == format!("detach:{name}")).count(), 1);
        }
        assert!(app.layers().is_empty());
    }

    #[test]
    fn inactive_layers_do_not_tick_or_render() {
        let journal = Journal::default();
        let mut setup = Setup::new(&journal);
        setup.inactive = Some("B");
        let mut app = App::new(window(Some(2)));
        app.run(&mut setup).expect("run");

        assert_eq!(count(&journal, "update:B"), 0);
        assert_eq!(count(&journal, "render:B"), 0);
        assert_eq!(count(&journal, "update:A"), 2);
        assert_eq!(count(&journal, "detach:B"), 1);
    }

    #[test]
    fn events_reach_the_topmost_layer_first_and_can_close_the_window() {
        let journal = Journal::default();
        let mut setup = Setup::new(&journal);
        let mut win = window(Some(10));
        win.schedule(
            1,
            Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)),
        );
        let mut app = App::new(win);
        let summary = app.run(&mut setup).expect("run");

        // The frame that saw 'q' still completes, then the loop stops.
        assert_eq!(summary.frames, 2);
        let events: Vec<String> = journal
            .borrow()
            .iter()
            .filter(|e| e.starts_with("event:"))
            .cloned()
            .collect();
        assert_eq!(events, ["event:UI"]);
    }

    #[test]
    fn unhandled_events_bubble_down_the_stack() {
        let journal = Journal::default();
        let mut setup = Setup::new(&journal);
        let mut win = window(Some(1));
        win.push_event(Event::Key(KeyEvent::new(
            KeyCode::Char('z'),
            KeyModifiers::NONE,
        )));
        let mut app = App::new(win);
        app.run(&mut setup).expect("run");

        let events: Vec<String> = journal
            .borrow()
            .iter()
            .filter(|e| e.starts_with("event:"))
            .cloned()
            .collect();
        assert_eq!(events, ["event:UI", "event:B", "event:A"]);
    }

    #[test]
    fn toggle_requests_flip_layer_activity() {
        struct Toggler;
        impl Layer for Toggler {
            fn name(&self) -> &str {
                "Toggler"
            }
            fn on_update(&mut self, _ts: TimeStep, ctx: &mut AppContext) {
                if ctx.frame_index == 1 {
                    ctx.toggle_layer("A");
                }
            }
        }
        struct ToggleSetup(Journal);
        impl Application<HeadlessWindow> for ToggleSetup {
            fn on_init(&mut self, app: &mut App<HeadlessWindow>) -> Result<(), AppError> {
                app.push_layer(Box::new(Recorder {
                    name: "A",
                    journal: self.0.clone(),
                    consumes: None,
                }));
                app.push_overlay(Box::new(Toggler));
                Ok(())
            }
        }

        let journal = Journal::default();
        let mut app = App::new(window(Some(3)));
        app.run(&mut ToggleSetup(journal.clone())).expect("run");
        // Requested during frame 1, applied at the start of frame 2.
        assert_eq!(count(&journal, "update:A"), 1);
    }

    #[test]
    fn failed_init_tears_down_what_was_registered() {
        struct Failing(Journal);
        impl Application<HeadlessWindow> for Failing {
            fn on_init(&mut self, app: &mut App<HeadlessWindow>) -> Result<(), AppError> {
                app.push_layer(Box::new(Recorder {
                    name: "A",
                    journal: self.0.clone(),
                    consumes: None,
                }));
                Err(AppError::Init("no fonts".into()))
            }
        }

        let journal = Journal::default();
        let mut app = App::new(window(Some(3)));
        let err = app.run(&mut Failing(journal.clone())).expect_err("init fails");
        assert!(matches!(err, AppError::Init(_)));
        assert_eq!(count(&journal, "detach:A"), 1);
        assert_eq!(count(&journal, "update:A"), 0);
    }

    #[test]
    fn run_cannot_be_called_twice() {
        let journal = Journal::default();
        let mut setup = Setup::new(&journal);
        let mut app = App::new(window(Some(1)));
        app.run(&mut setup).expect("first run");
        assert!(app.run(&mut setup).is_err());
    }

    #[test]
    fn popping_through_the_app_detaches_exactly_once() {
        let journal = Journal::default();
        let setup = Setup::new(&journal);
        let mut app = App::new(window(None));
        let a = app.push_layer(setup.layer("A", None));
        let ui = app.push_overlay(setup.layer("UI", None));
        app.pop_layer(a).expect("regular");
        app.pop_overlay(ui).expect("overlay");
        assert_eq!(count(&journal, "attach:A"), 1);
        assert_eq!(count(&journal, "detach:A"), 1);
        assert_eq!(count(&journal, "detach:UI"), 1);
    }
}
