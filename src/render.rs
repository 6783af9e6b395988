use ratatui::backend::Backend;
use ratatui::{Frame, Terminal};
use std::io;

/// Brackets one frame of immediate-mode UI drawing.
///
/// `begin` prepares the back buffer, `end` diffs it against what is on
/// screen and writes the changes out. Presenting (buffer swap) belongs to the
/// window.
#[derive(Debug, Default)]
pub struct UiRenderer {
    frames: u64,
}

impl UiRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `draw` between `begin` and `end`. `end` always runs once `begin`
    /// succeeded.
    pub fn frame<B, F>(&mut self, terminal: &mut Terminal<B>, draw: F) -> io::Result<()>
    where
        B: Backend,
        F: FnOnce(&mut Frame<'_>),
    {
        self.begin(terminal)?;
        {
            let mut frame = terminal.get_frame();
            draw(&mut frame);
        }
        self.end(terminal)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    fn begin<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.autoresize()
    }

    fn end<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.flush()?;
        terminal.hide_cursor()?;
        self.frames += 1;
        Ok(())
    }
}
