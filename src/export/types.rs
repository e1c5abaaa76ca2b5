//! Export types and configuration
//!
//! This module defines the types used for export configuration, the
//! transcoding request/response pair, and transcoding errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Mp4,
    Webm,
    Gif,
}

impl ExportFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Mp4 => "mp4",
            ExportFormat::Webm => "webm",
            ExportFormat::Gif => "gif",
        }
    }

    /// Content type used when the artifact is returned over HTTP
    pub fn content_type(&self) -> String {
        format!("video/{}", self.extension())
    }

    /// Whether the quality tier applies to this format
    pub fn uses_quality(&self) -> bool {
        !matches!(self, ExportFormat::Gif)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = TranscodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mp4" => Ok(ExportFormat::Mp4),
            "webm" => Ok(ExportFormat::Webm),
            "gif" => Ok(ExportFormat::Gif),
            other => Err(TranscodeError::InvalidRequest(format!(
                "unsupported format: {}",
                other
            ))),
        }
    }
}

/// Export quality levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportQuality {
    Low,
    Medium,
    #[default]
    High,
}

impl ExportQuality {
    /// Get the CRF value for H.264/VP9 encoding
    /// Lower values = higher quality, larger files
    pub fn crf(&self) -> u8 {
        match self {
            ExportQuality::Low => 28,
            ExportQuality::Medium => 23,
            ExportQuality::High => 18,
        }
    }

    /// Get the encoder speed preset
    pub fn preset(&self) -> &'static str {
        match self {
            ExportQuality::Low => "fast",
            ExportQuality::Medium => "medium",
            ExportQuality::High => "slow",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportQuality::Low => "low",
            ExportQuality::Medium => "medium",
            ExportQuality::High => "high",
        }
    }
}

impl fmt::Display for ExportQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportQuality {
    type Err = TranscodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(ExportQuality::High),
            "medium" => Ok(ExportQuality::Medium),
            "low" => Ok(ExportQuality::Low),
            other => Err(TranscodeError::InvalidRequest(format!(
                "unsupported quality: {}",
                other
            ))),
        }
    }
}

/// Text burned into the exported video
///
/// Transient: supplied per export call, never stored on the timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextOverlay {
    pub text: String,
    /// Drawing origin in pixels
    pub x: i32,
    pub y: i32,
}

impl TextOverlay {
    pub fn new(text: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }

    /// An overlay with no visible text is treated as absent
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Export configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    /// Output format
    pub format: ExportFormat,
    /// Quality level (ignored for GIF)
    #[serde(default)]
    pub quality: ExportQuality,
    /// Optional text overlay
    #[serde(default)]
    pub text_overlay: Option<TextOverlay>,
}

impl ExportConfig {
    pub fn new(format: ExportFormat, quality: ExportQuality) -> Self {
        Self {
            format,
            quality,
            text_overlay: None,
        }
    }

    pub fn with_overlay(mut self, overlay: Option<TextOverlay>) -> Self {
        self.text_overlay = overlay;
        self
    }

    /// The fixed baseline used by the post-capture normalization pass
    pub fn baseline() -> Self {
        Self::new(ExportFormat::Mp4, ExportQuality::High)
    }
}

/// A single request to the transcoding service
///
/// Mirrors the multipart form: `video`, `format`, `quality`, `textOverlay`.
#[derive(Debug, Clone)]
pub struct TranscodeRequest {
    pub video: Arc<[u8]>,
    pub format: ExportFormat,
    pub quality: ExportQuality,
    pub text_overlay: Option<TextOverlay>,
}

impl TranscodeRequest {
    /// Build a request from source bytes and an export configuration.
    ///
    /// Blank overlays are dropped here so that every transport sees the
    /// same request.
    pub fn new(video: Arc<[u8]>, config: &ExportConfig) -> Self {
        Self {
            video,
            format: config.format,
            quality: config.quality,
            text_overlay: config
                .text_overlay
                .clone()
                .filter(|overlay| !overlay.is_blank()),
        }
    }
}

/// A finished export artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Download file name offered to the user
    pub fn file_name(&self) -> String {
        format!("screen-recording.{}", self.format.extension())
    }

    pub fn content_type(&self) -> String {
        self.format.content_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the artifact into `dir` under its download name
    pub async fn save_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(self.file_name());
        tokio::fs::write(&path, &self.bytes).await?;
        tracing::info!("Saved {} bytes to {:?}", self.bytes.len(), path);
        Ok(path)
    }
}

/// Transcoding errors
#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transcoding service returned status {0}")]
    Status(u16),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Transcoding produced no output")]
    EmptyOutput,
}
