//! Error types and handling
//!
//! Common error types used across the application.

use crate::project::bundle::BundleError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// The capture device refused or could not be acquired.
    #[error("Capture device denied: {0}")]
    CaptureDeviceDenied(String),

    /// An operation was attempted in a state that does not allow it.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The transcoding service failed; no artifact was produced.
    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bundle error: {0}")]
    Bundle(#[from] BundleError),
}

impl AppError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            AppError::CaptureDeviceDenied(_) => "CAPTURE_DEVICE_DENIED",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::ExportFailed(_) => "EXPORT_FAILED",
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Bundle(_) => "BUNDLE_ERROR",
        }
    }
}

/// Error response for clients
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        ErrorResponse {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
