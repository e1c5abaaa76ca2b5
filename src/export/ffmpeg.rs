//! FFmpeg-backed transcoder
//!
//! Writes the incoming bytes to a scratch directory, runs FFmpeg with the
//! resolved encoding plan, and reads the result back. The scratch directory
//! is removed when the call returns, whether it succeeded or not.

use crate::export::params::EncodingPlan;
use crate::export::service::TranscodingService;
use crate::export::types::{TranscodeError, TranscodeRequest};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use uuid::Uuid;

/// Number of stderr lines kept when FFmpeg fails
const STDERR_TAIL_LINES: usize = 12;

/// Local transcoder that shells out to FFmpeg
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    ffmpeg: PathBuf,
    work_dir: Option<PathBuf>,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            work_dir: None,
        }
    }

    /// Create scratch directories under `dir` instead of the system temp dir
    pub fn with_work_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.work_dir = dir;
        self
    }

    fn scratch_dir(&self) -> std::io::Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("zoomcast-");
        match &self.work_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempdir_in(dir)
            }
            None => builder.tempdir(),
        }
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl TranscodingService for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn transcode(&self, request: TranscodeRequest) -> Result<Vec<u8>, TranscodeError> {
        if request.video.is_empty() {
            return Err(TranscodeError::InvalidRequest("no video data".to_string()));
        }

        let scratch = self.scratch_dir()?;
        let input_path = scratch.path().join(format!("{}.input", Uuid::new_v4()));
        let output_path = scratch
            .path()
            .join(format!("{}.{}", Uuid::new_v4(), request.format.extension()));

        tokio::fs::write(&input_path, &request.video[..]).await?;

        let plan = EncodingPlan::for_request(&request);
        let args = plan.ffmpeg_args(&input_path, &output_path);

        tracing::info!(
            "Running FFmpeg: {} bytes -> {} ({} quality)",
            request.video.len(),
            request.format,
            request.quality
        );
        tracing::debug!("FFmpeg args: {:?}", args);

        let output = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| TranscodeError::Ffmpeg(format!("Failed to start FFmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail = stderr_tail(&stderr, STDERR_TAIL_LINES);
            tracing::error!("FFmpeg exited with {}: {}", output.status, tail);
            return Err(TranscodeError::Ffmpeg(format!(
                "exited with {}: {}",
                output.status, tail
            )));
        }

        let bytes = tokio::fs::read(&output_path).await?;
        if bytes.is_empty() {
            return Err(TranscodeError::EmptyOutput);
        }

        tracing::info!("FFmpeg produced {} bytes", bytes.len());
        Ok(bytes)
    }
}

/// Keep the last `lines` lines of FFmpeg's stderr
fn stderr_tail(stderr: &str, lines: usize) -> String {
    let all: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::types::{ExportConfig, ExportFormat, ExportQuality};
    use std::sync::Arc;

    #[test]
    fn test_stderr_tail() {
        let stderr = "a\nb\n\nc\nd\n";
        assert_eq!(stderr_tail(stderr, 2), "c\nd");
        assert_eq!(stderr_tail(stderr, 10), "a\nb\nc\nd");
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let transcoder = FfmpegTranscoder::default();
        let request = TranscodeRequest::new(
            Arc::from(Vec::<u8>::new()),
            &ExportConfig::new(ExportFormat::Mp4, ExportQuality::High),
        );
        let result = transcoder.transcode(request).await;
        assert!(matches!(result, Err(TranscodeError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_missing_binary_is_ffmpeg_error() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder = FfmpegTranscoder::new(dir.path().join("no-such-ffmpeg"))
            .with_work_dir(Some(dir.path().join("scratch")));
        let request = TranscodeRequest::new(
            Arc::from(vec![0u8; 16]),
            &ExportConfig::new(ExportFormat::Gif, ExportQuality::Low),
        );
        let result = transcoder.transcode(request).await;
        assert!(matches!(result, Err(TranscodeError::Ffmpeg(_))));

        // Scratch directories are cleaned up on failure
        let leftovers = std::fs::read_dir(dir.path().join("scratch")).unwrap().count();
        assert_eq!(leftovers, 0);
    }
}
