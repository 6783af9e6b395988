use crate::context::AppContext;
use crate::layer::Layer;
use crate::time::TimeStep;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;
use ratatui::Frame;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const STARFIELD_LAYER: &str = "Starfield";

/// Twinkle phase units per second of wall time.
const PHASE_RATE: f64 = 30.0;

/// Background layer: a field of stars that twinkle over time.
#[derive(Debug)]
pub struct StarfieldLayer {
    seed: u64,
    phase: f64,
}

impl StarfieldLayer {
    pub fn new(seed: u64) -> Self {
        Self { seed, phase: 0.0 }
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }
}

impl Default for StarfieldLayer {
    fn default() -> Self {
        Self::new(42_424_242)
    }
}

impl Layer for StarfieldLayer {
    fn name(&self) -> &str {
        STARFIELD_LAYER
    }

    fn on_update(&mut self, ts: TimeStep, _ctx: &mut AppContext) {
        self.phase += f64::from(ts.seconds()) * PHASE_RATE;
    }

    fn on_ui_render(&mut self, frame: &mut Frame<'_>, _ctx: &mut AppContext) {
        let widget = StarfieldWidget {
            seed: self.seed,
            phase: self.phase,
        };
        frame.render_widget(widget, frame.area());
    }
}

struct StarfieldWidget {
    seed: u64,
    phase: f64,
}

impl Widget for StarfieldWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let cell_count = (area.width as usize) * (area.height as usize);
        let count = (cell_count / 8).clamp(40, 500);

        for _ in 0..count {
            let depth: u8 = if rng.gen_bool(0.4) {
                0
            } else if rng.gen_bool(0.5) {
                1
            } else {
                2
            };
            let base_brightness: f64 = match depth {
                0 => rng.gen_range(0.15..0.45),
                1 => rng.gen_range(0.35..0.65),
                _ => rng.gen_range(0.55..0.90),
            };
            let x_frac: f64 = rng.gen_range(0.0..1.0);
            let y_frac: f64 = rng.gen_range(0.0..1.0);
            let speed: f64 = rng.gen_range(0.03..0.12);
            let offset: f64 = rng.gen_range(0.0..std::f64::consts::TAU);

            let col = (x_frac * area.width as f64) as u16;
            let row = (y_frac * area.height as f64) as u16;
            if col >= area.width || row >= area.height {
                continue;
            }

            let twinkle = (self.phase * speed + offset).sin() * 0.5 + 0.5;
            let brightness = base_brightness * (0.4 + 0.6 * twinkle);
            let (ch, color) = star_appearance(depth, brightness);

            let cell = &mut buf[(area.x + col, area.y + row)];
            cell.set_char(ch);
            cell.set_style(Style::default().fg(color));
        }
    }
}

fn star_appearance(depth: u8, brightness: f64) -> (char, Color) {
    let b = (brightness * 255.0).clamp(0.0, 255.0) as u8;
    let ch = match depth {
        0 => if brightness > 0.35 { '∙' } else { '·' },
        1 => if brightness > 0.55 { '•' } else { '∙' },
        _ => if brightness > 0.8 { '✦' } else if brightness > 0.6 { '*' } else { '•' },
    };
    // Slight blue tint, like distant stars.
    (ch, Color::Rgb(b, b, b.saturating_add(20)))
}
