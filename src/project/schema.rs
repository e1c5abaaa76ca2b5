//! Bundle schema definitions
//!
//! JSON documents stored alongside the recorded asset in a session bundle.

use crate::export::types::ExportFormat;
use crate::timeline::ZoomEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bundle format identifier written to `meta.json`
pub const BUNDLE_FORMAT: &str = "zoomcast-v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleMeta {
    pub version: String,
    pub format: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for BundleMeta {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: BUNDLE_FORMAT.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Contents of `timeline.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedTimeline {
    /// Recorded duration in seconds
    pub duration: f64,
    /// File name of the asset inside the bundle
    pub asset_file: String,
    pub asset_format: ExportFormat,
    #[serde(default)]
    pub zoom_events: Vec<ZoomEvent>,
}
