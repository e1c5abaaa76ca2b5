//! Preview zoom
//!
//! - `controller`: temporary zoom driven by clicks and held keys
//! - `manual`: persistent zoom set through explicit controls

pub mod controller;
pub mod manual;

pub use controller::{RevertTimer, TemporaryZoom, TriggerKey, ZoomPhase, ZoomView};
pub use manual::ManualZoom;
