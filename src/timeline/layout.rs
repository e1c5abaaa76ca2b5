//! Editor strip geometry
//!
//! Events may extend past the recorded duration (the live clock counts whole
//! seconds, the encoded asset may be slightly shorter). Rendering clamps to
//! the timeline instead of rejecting such events.

use super::types::ZoomEvent;
use serde::Serialize;

/// Horizontal placement of an event block, in percent of the strip
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StripSpan {
    pub left_percent: f64,
    pub width_percent: f64,
}

/// Place `event` on a strip representing `timeline_duration` seconds
pub fn event_span(event: &ZoomEvent, timeline_duration: f64) -> StripSpan {
    if !has_length(timeline_duration) {
        return StripSpan {
            left_percent: 0.0,
            width_percent: 0.0,
        };
    }

    let left = clamp_or_zero(event.start_time * 100.0 / timeline_duration, 100.0);
    let width = clamp_or_zero(event.duration * 100.0 / timeline_duration, 100.0 - left);

    StripSpan {
        left_percent: left,
        width_percent: width,
    }
}

/// Map a fractional strip position to a playback time
pub fn scrub_time(fraction: f64, timeline_duration: f64) -> f64 {
    if !has_length(timeline_duration) {
        return 0.0;
    }
    (clamp_or_zero(fraction, 1.0) * timeline_duration).min(timeline_duration)
}

/// Playhead position in percent
pub fn playhead_percent(current_time: f64, timeline_duration: f64) -> f64 {
    if !has_length(timeline_duration) {
        return 0.0;
    }
    clamp_or_zero(current_time * 100.0 / timeline_duration, 100.0)
}

fn has_length(timeline_duration: f64) -> bool {
    timeline_duration.is_finite() && timeline_duration > 0.0
}

/// Clamp into `[0, max]`; NaN maps to 0
fn clamp_or_zero(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max.max(0.0))
    }
}
