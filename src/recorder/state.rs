//! Recording state management
//!
//! Defines the recording state machine, the active-time clock and the
//! studio phase view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// Current state of a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    #[default]
    Idle,
    /// Currently recording
    Recording,
    /// Recording is paused
    Paused,
}

impl RecordingState {
    /// Recording or paused
    pub fn is_active(&self) -> bool {
        !matches!(self, RecordingState::Idle)
    }
}

/// What the studio is doing, derived from session and timeline contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Capturing,
    Normalizing,
    Editing,
    Exporting,
}

/// One unpaused stretch of a recording
///
/// A new segment starts each time recording is resumed.
#[derive(Debug, Clone)]
pub struct ClockSegment {
    /// Segment index (0, 1, 2, ...)
    pub index: usize,

    started_at: Instant,

    ended_at: Option<Instant>,

    /// Wall-clock time the segment started
    pub unix_start: DateTime<Utc>,
}

impl ClockSegment {
    fn new(index: usize) -> Self {
        Self {
            index,
            started_at: Instant::now(),
            ended_at: None,
            unix_start: Utc::now(),
        }
    }

    fn end(&mut self) {
        if self.ended_at.is_none() {
            self.ended_at = Some(Instant::now());
        }
    }

    fn duration(&self) -> Duration {
        let end = self.ended_at.unwrap_or_else(Instant::now);
        end.saturating_duration_since(self.started_at)
    }
}

/// Counts active (unpaused) recording time
///
/// Elapsed time is frozen while paused and only returns to zero when a new
/// session starts.
#[derive(Debug, Clone, Default)]
pub struct SessionClock {
    segments: Vec<ClockSegment>,
}

impl SessionClock {
    /// Start counting from zero
    pub fn start(&mut self) {
        self.segments.clear();
        self.segments.push(ClockSegment::new(0));
    }

    pub fn pause(&mut self) {
        if let Some(segment) = self.segments.last_mut() {
            segment.end();
        }
    }

    pub fn resume(&mut self) {
        let running = self
            .segments
            .last()
            .map(|s| s.ended_at.is_none())
            .unwrap_or(false);
        if !running {
            let index = self.segments.len();
            self.segments.push(ClockSegment::new(index));
        }
    }

    /// Freeze the clock for good
    pub fn stop(&mut self) {
        self.pause();
    }

    /// Total active time
    pub fn elapsed(&self) -> Duration {
        self.segments.iter().map(ClockSegment::duration).sum()
    }

    /// Whole seconds of active time
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed().as_secs()
    }

    pub fn segments(&self) -> &[ClockSegment] {
        &self.segments
    }

    /// When the session started, if it has
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.segments.first().map(|s| s.unix_start)
    }
}
