//! Zoom timeline store
//!
//! Owns the zoom annotations and the normalized asset for one recording
//! session. All mutations are synchronous and deterministic; missing ids are
//! no-ops rather than errors.

use super::types::{CursorPosition, MediaAsset, TimelineState, ZoomEvent};
use crate::utils::error::{AppError, AppResult};
use uuid::Uuid;

/// Fallback duration for triggers recorded with a non-positive duration
const DEFAULT_EVENT_DURATION: f64 = 1.0;

#[derive(Debug, Default)]
pub struct TimelineStore {
    state: TimelineState,
}

impl TimelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a zoom event for a trigger at `elapsed_secs` into the recording
    pub fn record_zoom_trigger(
        &mut self,
        cursor: CursorPosition,
        elapsed_secs: f64,
        level: f64,
        duration: f64,
    ) -> ZoomEvent {
        let event = ZoomEvent {
            id: Uuid::new_v4(),
            start_time: if elapsed_secs.is_finite() {
                elapsed_secs.max(0.0)
            } else {
                0.0
            },
            duration: if duration.is_finite() && duration > 0.0 {
                duration
            } else {
                DEFAULT_EVENT_DURATION
            },
            zoom_level: clamp_level(level),
            cursor_position: CursorPosition::new(cursor.x, cursor.y),
        };
        let cursor = event.cursor_position;

        tracing::debug!(
            "Recorded zoom {}x at {}s ({:.1}%, {:.1}%)",
            event.zoom_level,
            event.start_time,
            cursor.x,
            cursor.y
        );

        self.state.zoom_events.push(event.clone());
        event
    }

    /// Replace the event with the same id. Returns whether anything changed.
    ///
    /// Edits with a non-finite start or a non-positive duration are rejected;
    /// level and cursor are clamped into range.
    pub fn update(&mut self, event: ZoomEvent) -> bool {
        let Some(event) = normalize_event(event) else {
            return false;
        };
        match self.state.zoom_events.iter_mut().find(|e| e.id == event.id) {
            Some(slot) => {
                *slot = event;
                true
            }
            None => {
                tracing::debug!("Ignoring update for unknown zoom event {}", event.id);
                false
            }
        }
    }

    /// Add an event authored outside live capture.
    ///
    /// Rejected (returns false) if an event with the same id already exists
    /// or its timing is invalid; level and cursor are clamped into range.
    pub fn insert(&mut self, event: ZoomEvent) -> bool {
        let Some(event) = normalize_event(event) else {
            return false;
        };
        if self.get(event.id).is_some() {
            tracing::debug!("Ignoring duplicate zoom event {}", event.id);
            return false;
        }
        self.state.zoom_events.push(event);
        true
    }

    /// Remove the event with `id`, returning it if it existed
    pub fn delete(&mut self, id: Uuid) -> Option<ZoomEvent> {
        let index = self.state.zoom_events.iter().position(|e| e.id == id)?;
        Some(self.state.zoom_events.remove(index))
    }

    /// Clear the asset, duration and every event
    pub fn reset(&mut self) {
        self.state = TimelineState::default();
    }

    /// Attach the normalized asset. Allowed once per session.
    pub fn attach_asset(&mut self, asset: MediaAsset, duration: f64) -> AppResult<()> {
        if self.state.asset.is_some() {
            tracing::warn!("Rejected second asset attach for this session");
            return Err(AppError::InvalidState(
                "an asset is already attached to this timeline".to_string(),
            ));
        }

        tracing::info!(
            "Attached {} byte {} asset ({}s)",
            asset.len(),
            asset.format(),
            duration
        );
        self.state.asset = Some(asset);
        self.state.duration = duration.max(0.0);
        Ok(())
    }

    pub fn asset(&self) -> Option<&MediaAsset> {
        self.state.asset.as_ref()
    }

    pub fn has_asset(&self) -> bool {
        self.state.asset.is_some()
    }

    pub fn duration(&self) -> f64 {
        self.state.duration
    }

    /// Events in insertion order
    pub fn events(&self) -> &[ZoomEvent] {
        &self.state.zoom_events
    }

    pub fn get(&self, id: Uuid) -> Option<&ZoomEvent> {
        self.state.zoom_events.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.state.zoom_events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.zoom_events.is_empty()
    }

    /// Events ordered by start time, for display
    pub fn events_by_start(&self) -> Vec<&ZoomEvent> {
        let mut events: Vec<&ZoomEvent> = self.state.zoom_events.iter().collect();
        events.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        events
    }

    pub fn snapshot(&self) -> TimelineState {
        self.state.clone()
    }

    pub fn state(&self) -> &TimelineState {
        &self.state
    }
}

/// Bring an externally authored event within the zoom event invariants
fn normalize_event(mut event: ZoomEvent) -> Option<ZoomEvent> {
    if !event.start_time.is_finite() || !(event.duration.is_finite() && event.duration > 0.0) {
        tracing::debug!(
            "Rejected zoom event {} (start {}, duration {})",
            event.id,
            event.start_time,
            event.duration
        );
        return None;
    }

    event.start_time = event.start_time.max(0.0);
    event.zoom_level = clamp_level(event.zoom_level);
    event.cursor_position = CursorPosition::new(event.cursor_position.x, event.cursor_position.y);
    Some(event)
}

fn clamp_level(level: f64) -> f64 {
    if level.is_finite() {
        level.max(1.0)
    } else {
        1.0
    }
}
