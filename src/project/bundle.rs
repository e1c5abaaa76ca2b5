//! Session bundle read/write operations
//!
//! A bundle is a directory containing:
//! - meta.json: Version and metadata
//! - timeline.json: Duration and zoom events
//! - recording.<ext>: The normalized asset

use super::schema::{BundleMeta, SavedTimeline, BUNDLE_FORMAT};
use crate::timeline::{MediaAsset, TimelineState};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Bundle-related errors
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid bundle: {0}")]
    InvalidBundle(String),

    #[error("Missing required file: {0}")]
    MissingFile(String),
}

/// Write a completed timeline to a bundle directory
pub fn write_bundle(state: &TimelineState, bundle_path: &Path) -> Result<(), BundleError> {
    let asset = state.asset.as_ref().ok_or_else(|| {
        BundleError::InvalidBundle("timeline has no recorded asset".to_string())
    })?;

    if !bundle_path.exists() {
        fs::create_dir_all(bundle_path)?;
    }

    let asset_file = format!("recording.{}", asset.format().extension());
    fs::write(bundle_path.join(&asset_file), asset.bytes())?;

    let saved = SavedTimeline {
        duration: state.duration,
        asset_file,
        asset_format: asset.format(),
        zoom_events: state.zoom_events.clone(),
    };
    fs::write(
        bundle_path.join("timeline.json"),
        serde_json::to_string_pretty(&saved)?,
    )?;

    // Keep the original creation time when re-saving
    let meta = match read_meta(bundle_path) {
        Ok(mut meta) => {
            meta.updated_at = chrono::Utc::now();
            meta
        }
        Err(_) => BundleMeta::default(),
    };
    fs::write(
        bundle_path.join("meta.json"),
        serde_json::to_string_pretty(&meta)?,
    )?;

    tracing::debug!(
        "Saved bundle with {} zoom events to {:?}",
        saved.zoom_events.len(),
        bundle_path
    );

    Ok(())
}

/// Read a timeline (with its asset) from a bundle directory
pub fn read_bundle(bundle_path: &Path) -> Result<TimelineState, BundleError> {
    if !bundle_path.is_dir() {
        return Err(BundleError::InvalidBundle(
            "Path is not a directory".to_string(),
        ));
    }

    let meta = read_meta(bundle_path)?;
    if meta.format != BUNDLE_FORMAT {
        return Err(BundleError::InvalidBundle(format!(
            "unsupported bundle format: {}",
            meta.format
        )));
    }

    let saved = read_timeline(bundle_path)?;

    // The asset must live inside the bundle
    if saved.asset_file.contains(['/', '\\']) || saved.asset_file.starts_with("..") {
        return Err(BundleError::InvalidBundle(format!(
            "asset path escapes bundle: {}",
            saved.asset_file
        )));
    }
    let asset_path = bundle_path.join(&saved.asset_file);
    if !asset_path.exists() {
        return Err(BundleError::MissingFile(saved.asset_file));
    }
    let bytes = fs::read(&asset_path)?;

    tracing::debug!("Loaded bundle from {:?}", bundle_path);

    Ok(TimelineState {
        asset: Some(MediaAsset::new(bytes, saved.asset_format)),
        duration: saved.duration,
        zoom_events: saved.zoom_events,
    })
}

/// Read bundle metadata
pub fn read_meta(bundle_path: &Path) -> Result<BundleMeta, BundleError> {
    let meta_path = bundle_path.join("meta.json");

    if !meta_path.exists() {
        return Err(BundleError::MissingFile("meta.json".to_string()));
    }

    let meta_content = fs::read_to_string(&meta_path)?;
    let meta: BundleMeta = serde_json::from_str(&meta_content)?;

    Ok(meta)
}

/// Read only the timeline document, without loading the asset
pub fn read_timeline(bundle_path: &Path) -> Result<SavedTimeline, BundleError> {
    let timeline_path = bundle_path.join("timeline.json");

    if !timeline_path.exists() {
        return Err(BundleError::MissingFile("timeline.json".to_string()));
    }

    let content = fs::read_to_string(&timeline_path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Check if a path is a valid session bundle
pub fn is_valid_bundle(path: &Path) -> bool {
    if !path.is_dir() {
        return false;
    }

    path.join("meta.json").exists() && path.join("timeline.json").exists()
}
