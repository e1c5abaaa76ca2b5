//! Session bundle persistence

pub mod bundle;
pub mod schema;

pub use bundle::{is_valid_bundle, read_bundle, read_timeline, write_bundle, BundleError};
pub use schema::{BundleMeta, SavedTimeline};
