//! Manual zoom control
//!
//! Persistent multiplier set through explicit zoom-in/out/reset controls.
//! Independent of temporary zoom triggers and never recorded on the timeline.

/// Lowest manual multiplier
pub const MIN_LEVEL: f64 = 1.0;
/// Highest manual multiplier
pub const MAX_LEVEL: f64 = 3.0;
/// Multiplier change per control press
pub const STEP: f64 = 0.2;

const MAX_STEPS: u8 = 10;

/// Manual zoom level, stored as whole steps above 1x
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManualZoom {
    steps: u8,
}

impl ManualZoom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> f64 {
        MIN_LEVEL + f64::from(self.steps) * STEP
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.steps = (self.steps + 1).min(MAX_STEPS);
        self.level()
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.steps = self.steps.saturating_sub(1);
        self.level()
    }

    pub fn reset(&mut self) -> f64 {
        self.steps = 0;
        self.level()
    }
}
