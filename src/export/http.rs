//! HTTP client for a remote transcoding service
//!
//! Speaks the multipart protocol served by [`crate::server`]:
//! `video`, `format`, `quality` and an optional JSON `textOverlay`.

use crate::export::service::TranscodingService;
use crate::export::types::{TranscodeError, TranscodeRequest};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

/// Path of the processing endpoint
pub const PROCESS_VIDEO_PATH: &str = "/api/process-video";

/// Remote transcoder reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpTranscoder {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTranscoder {
    /// Create a client for the service rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TranscodeError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), PROCESS_VIDEO_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_form(request: &TranscodeRequest) -> Result<Form, TranscodeError> {
        let video = Part::bytes(request.video.to_vec())
            .file_name("recording.webm")
            .mime_str("video/webm")?;

        let mut form = Form::new()
            .part("video", video)
            .text("format", request.format.extension())
            .text("quality", request.quality.as_str());

        if let Some(overlay) = &request.text_overlay {
            let encoded = serde_json::to_string(overlay)
                .map_err(|e| TranscodeError::InvalidRequest(e.to_string()))?;
            form = form.text("textOverlay", encoded);
        }

        Ok(form)
    }
}

#[async_trait]
impl TranscodingService for HttpTranscoder {
    fn name(&self) -> &str {
        "http"
    }

    async fn transcode(&self, request: TranscodeRequest) -> Result<Vec<u8>, TranscodeError> {
        let form = Self::build_form(&request)?;

        tracing::info!(
            "Posting {} bytes to {} ({} / {})",
            request.video.len(),
            self.endpoint,
            request.format,
            request.quality
        );

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Transcoding service returned {}", status);
            return Err(TranscodeError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(TranscodeError::EmptyOutput);
        }

        Ok(bytes.to_vec())
    }
}
