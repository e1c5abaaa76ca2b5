//! Timeline data model
//!
//! Zoom annotations recorded against a session, and the media asset they
//! are later edited against.

use crate::export::types::ExportFormat;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Cursor position as percentages of the capture surface
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
}

impl CursorPosition {
    /// Create a position, clamping both coordinates to `[0, 100]`
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }

    /// Convert a pixel offset inside a `width` x `height` surface
    pub fn from_pixels(px: f64, py: f64, width: f64, height: f64) -> Self {
        if width <= 0.0 || height <= 0.0 {
            return Self::default();
        }
        Self::new(px / width * 100.0, py / height * 100.0)
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// A time-addressed zoom annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomEvent {
    pub id: Uuid,
    /// Seconds from the start of the recording
    pub start_time: f64,
    /// Seconds the zoom stays applied
    pub duration: f64,
    /// Magnification multiplier, at least 1
    pub zoom_level: f64,
    pub cursor_position: CursorPosition,
}

impl ZoomEvent {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// A completed, normalized recording
///
/// Cloning shares the underlying bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    bytes: Arc<[u8]>,
    format: ExportFormat,
}

impl MediaAsset {
    pub fn new(bytes: Vec<u8>, format: ExportFormat) -> Self {
        Self {
            bytes: Arc::from(bytes),
            format,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the bytes, for handing to a transcoder
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether both values share the same underlying allocation
    pub fn same_asset(&self, other: &MediaAsset) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

/// Snapshot of one session's timeline
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimelineState {
    pub asset: Option<MediaAsset>,
    /// Seconds
    pub duration: f64,
    pub zoom_events: Vec<ZoomEvent>,
}
