//! Transcoding service seam
//!
//! The transcoder is an external collaborator: it takes raw media bytes and
//! a target format and hands back a finished artifact, or fails outright.

use crate::export::types::{TranscodeError, TranscodeRequest};
use async_trait::async_trait;

/// Anything that can re-encode media bytes into a requested container
#[async_trait]
pub trait TranscodingService: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Re-encode `request.video` according to the request parameters.
    ///
    /// Returns the complete output bytes. Implementations never return a
    /// partially written artifact.
    async fn transcode(&self, request: TranscodeRequest) -> Result<Vec<u8>, TranscodeError>;
}
