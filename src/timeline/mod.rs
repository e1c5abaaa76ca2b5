//! Zoom timeline
//!
//! Zoom annotations captured during recording and edited afterwards.

pub mod layout;
pub mod store;
pub mod types;

pub use store::TimelineStore;
pub use types::{CursorPosition, MediaAsset, TimelineState, ZoomEvent};
