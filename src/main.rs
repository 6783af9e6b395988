use tgdesk::config::{self, Config};
use tgdesk::ui::{ChatPanel, DiagnosticsPanel, StarfieldLayer, UiLayer};
use tgdesk::window::{HeadlessWindow, Mode, TerminalWindow, Window};
use tgdesk::{logging, App, AppError, Application};
use tracing::{error, info, warn};

/// Builds the starfield background and the panel UI on top of it.
struct TgDesk {
    accounts: Vec<String>,
}

impl<W: Window> Application<W> for TgDesk {
    fn on_init(&mut self, app: &mut App<W>) -> Result<(), AppError> {
        let window = app.window().config().clone();

        let mut chat = ChatPanel::new().map_err(|e| AppError::Init(e.to_string()))?;
        for phone in &self.accounts {
            if let Err(e) = chat.add_account(phone) {
                warn!("skipping configured account: {e}");
            }
        }

        let mut ui = UiLayer::new(window.title, window.decorated);
        ui.add_panel(Box::new(chat));
        ui.add_panel(Box::new(DiagnosticsPanel::new()));

        app.push_layer(Box::new(StarfieldLayer::default()));
        app.push_overlay(Box::new(ui));
        Ok(())
    }

    fn on_shutdown(&mut self, app: &mut App<W>) {
        info!(frames = app.context().frame_index, "shutting down");
    }
}

fn run<W: Window>(window: W, config: &Config) -> Result<(), AppError> {
    let mut app = App::new(window);
    let mut desk = TgDesk {
        accounts: config.accounts.clone(),
    };
    let summary = app.run(&mut desk)?;
    info!(frames = summary.frames, elapsed = ?summary.elapsed, "run finished");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, config_problem) = config::load_config();
    let log_file = logging::init(&config.log_level);
    if let Err(e) = &log_file {
        eprintln!("logging disabled: {}", e);
    }
    if let Some(e) = config_problem {
        warn!("{e}; using defaults");
    }

    let window_config = config.window.clone();
    // The terminal window restores the screen on shutdown, before this
    // returns, so errors print to a normal terminal.
    let result = if window_config.mode == Mode::Headless {
        run(
            HeadlessWindow::new(window_config).with_frame_budget(config.headless_frames),
            &config,
        )
    } else {
        run(TerminalWindow::new(window_config), &config)
    };

    if let Err(e) = result {
        error!("{e}");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
