//! Video export module
//!
//! This module turns captured or normalized media into finished artifacts
//! by delegating to a transcoding service, either local FFmpeg or a remote
//! HTTP endpoint.

pub mod ffmpeg;
pub mod http;
pub mod orchestrator;
pub mod params;
pub mod service;
pub mod types;

pub use ffmpeg::FfmpegTranscoder;
pub use http::HttpTranscoder;
pub use orchestrator::ExportOrchestrator;
pub use params::{Encoding, EncodingPlan};
pub use service::TranscodingService;
pub use types::{
    Artifact, ExportConfig, ExportFormat, ExportQuality, TextOverlay, TranscodeError,
    TranscodeRequest,
};
