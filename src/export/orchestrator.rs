//! Export orchestration
//!
//! Both the post-capture normalization pass and the user-initiated export go
//! through [`ExportOrchestrator::run`]; they differ only in parameters.
//! Every transcoder failure is collapsed into [`AppError::ExportFailed`] and
//! nothing partial is ever handed back.

use crate::export::service::TranscodingService;
use crate::export::types::{Artifact, ExportConfig, TranscodeRequest};
use crate::timeline::MediaAsset;
use crate::utils::error::{AppError, AppResult};
use std::sync::Arc;

/// Delegates export work to a transcoding service
#[derive(Clone)]
pub struct ExportOrchestrator {
    service: Arc<dyn TranscodingService>,
}

impl ExportOrchestrator {
    pub fn new(service: Arc<dyn TranscodingService>) -> Self {
        Self { service }
    }

    /// Name of the underlying service, for logs
    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    /// Convert freshly captured bytes into the baseline editing asset
    pub async fn normalize(&self, captured: Vec<u8>) -> AppResult<MediaAsset> {
        let config = ExportConfig::baseline();
        tracing::info!("Normalizing {} captured bytes to {}", captured.len(), config.format);

        let bytes = self.run(Arc::from(captured), &config).await?;
        Ok(MediaAsset::new(bytes, config.format))
    }

    /// Produce the final artifact for `source` using `config`
    pub async fn export(&self, source: Arc<[u8]>, config: &ExportConfig) -> AppResult<Artifact> {
        tracing::info!(
            "Exporting {} bytes as {} ({})",
            source.len(),
            config.format,
            if config.format.uses_quality() {
                config.quality.as_str()
            } else {
                "fixed gif policy"
            }
        );

        let bytes = self.run(source, config).await?;
        Ok(Artifact {
            format: config.format,
            bytes,
        })
    }

    async fn run(&self, source: Arc<[u8]>, config: &ExportConfig) -> AppResult<Vec<u8>> {
        if source.is_empty() {
            return Err(AppError::ExportFailed("no media to transcode".to_string()));
        }

        let request = TranscodeRequest::new(source, config);
        match self.service.transcode(request).await {
            Ok(bytes) if bytes.is_empty() => {
                tracing::error!("{} returned an empty artifact", self.service.name());
                Err(AppError::ExportFailed("empty artifact".to_string()))
            }
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                tracing::error!("{} transcoding failed: {}", self.service.name(), e);
                Err(AppError::ExportFailed(e.to_string()))
            }
        }
    }
}
