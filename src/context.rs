use crate::time::TimeStep;
use ratatui::layout::Size;
use std::collections::VecDeque;

const FRAME_HISTORY: usize = 120;

/// Rolling window of recent frame durations.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    samples: VecDeque<f32>,
}

impl FrameStats {
    pub fn record(&mut self, ts: TimeStep) {
        if self.samples.len() == FRAME_HISTORY {
            self.samples.pop_front();
        }
        self.samples.push_back(ts.millis());
    }

    pub fn last_millis(&self) -> f32 {
        self.samples.back().copied().unwrap_or(0.0)
    }

    pub fn average_millis(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    pub fn fps(&self) -> f32 {
        let avg = self.average_millis();
        if avg > 0.0 {
            1000.0 / avg
        } else {
            0.0
        }
    }

    /// Frame times in whole microseconds, oldest first.
    pub fn micros(&self) -> Vec<u64> {
        self.samples.iter().map(|ms| (ms * 1000.0) as u64).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Per-application state shared with layers and panels.
///
/// One context exists per [`crate::app::App`] and is handed to every hook
/// that needs application-wide information, in place of a global accessor.
#[derive(Debug, Clone, Default)]
pub struct AppContext {
    pub timestep: TimeStep,
    pub frame_index: u64,
    pub elapsed: f64,
    pub window_size: Size,
    pub transparent: bool,
    pub stats: FrameStats,
    close_requested: bool,
    layer_toggles: Vec<String>,
}

impl AppContext {
    pub fn new(window_size: Size, transparent: bool) -> Self {
        Self {
            window_size,
            transparent,
            ..Self::default()
        }
    }

    pub(crate) fn begin_frame(&mut self, ts: TimeStep, window_size: Size) {
        self.timestep = ts;
        self.frame_index += 1;
        self.elapsed += f64::from(ts.seconds());
        self.window_size = window_size;
        self.stats.record(ts);
    }

    /// Ask the run loop to close the window after event dispatch.
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// Ask the run loop to flip the active flag of the named layer.
    pub fn toggle_layer(&mut self, name: impl Into<String>) {
        self.layer_toggles.push(name.into());
    }

    pub(crate) fn take_close_request(&mut self) -> bool {
        std::mem::take(&mut self.close_requested)
    }

    pub(crate) fn take_layer_toggles(&mut self) -> Vec<String> {
        std::mem::take(&mut self.layer_toggles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_keep_a_bounded_history() {
        let mut stats = FrameStats::default();
        for _ in 0..(FRAME_HISTORY + 10) {
            stats.record(TimeStep::new(0.010));
        }
        assert_eq!(stats.len(), FRAME_HISTORY);
        assert!((stats.average_millis() - 10.0).abs() < 1e-3);
        assert!((stats.fps() - 100.0).abs() < 0.1);
    }

    #[test]
    fn empty_stats_report_zero() {
        let stats = FrameStats::default();
        assert_eq!(stats.last_millis(), 0.0);
        assert_eq!(stats.fps(), 0.0);
    }

    #[test]
    fn begin_frame_advances_counters() {
        let mut ctx = AppContext::new(Size::new(80, 24), false);
        ctx.begin_frame(TimeStep::new(0.5), Size::new(100, 30));
        ctx.begin_frame(TimeStep::new(0.25), Size::new(100, 30));
        assert_eq!(ctx.frame_index, 2);
        assert!((ctx.elapsed - 0.75).abs() < 1e-6);
        assert_eq!(ctx.window_size, Size::new(100, 30));
    }

    #[test]
    fn requests_are_drained_once() {
        let mut ctx = AppContext::default();
        ctx.request_close();
        ctx.toggle_layer("Starfield");
        assert!(ctx.close_requested());
        assert!(ctx.take_close_request());
        assert!(!ctx.take_close_request());
        assert_eq!(ctx.take_layer_toggles(), vec!["Starfield".to_string()]);
        assert!(ctx.take_layer_toggles().is_empty());
    }
}
