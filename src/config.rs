//! Application configuration
//!
//! Loaded from a JSON file; every field has a default so a partial file (or
//! no file at all) is valid.

use crate::utils::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Temporary zoom behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZoomSettings {
    /// Multiplier while a temporary zoom trigger is active
    pub temporary_level: f64,
    /// How long a click holds the zoom before reverting
    pub click_hold_ms: u64,
    /// Duration given to zoom events recorded from clicks
    pub click_event_duration_secs: f64,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            temporary_level: 2.0,
            click_hold_ms: 1000,
            click_event_duration_secs: 1.0,
        }
    }
}

impl ZoomSettings {
    pub fn click_hold(&self) -> Duration {
        Duration::from_millis(self.click_hold_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// FFmpeg executable used by the local transcoder
    pub ffmpeg_path: PathBuf,

    /// Parent directory for per-request scratch space (system temp if unset)
    pub work_dir: Option<PathBuf>,

    /// Listen address of the transcoding service
    pub bind_addr: SocketAddr,

    /// Upload size limit for the transcoding endpoint
    pub max_upload_bytes: usize,

    /// Remote transcoding service; local FFmpeg is used when unset
    pub service_url: Option<String>,

    /// Timeout for requests to a remote transcoding service
    pub request_timeout_secs: u64,

    /// Where exported artifacts are written
    pub output_dir: PathBuf,

    pub zoom: ZoomSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            work_dir: None,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_upload_bytes: 512 * 1024 * 1024,
            service_url: None,
            request_timeout_secs: 600,
            output_dir: PathBuf::from("."),
            zoom: ZoomSettings::default(),
        }
    }
}

impl AppConfig {
    /// Read a configuration file
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Read `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
