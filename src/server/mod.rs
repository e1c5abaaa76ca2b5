//! HTTP transcoding service
//!
//! Serves `POST /api/process-video`: a multipart upload with `video`,
//! `format`, `quality` and an optional JSON `textOverlay`, answered with the
//! re-encoded bytes.

use crate::config::AppConfig;
use crate::export::http::PROCESS_VIDEO_PATH;
use crate::export::service::TranscodingService;
use crate::export::types::{
    ExportConfig, ExportFormat, ExportQuality, TextOverlay, TranscodeRequest,
};
use crate::export::FfmpegTranscoder;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;

type SharedService = Arc<dyn TranscodingService>;

/// Build the service router around `service`
pub fn router(service: SharedService, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(PROCESS_VIDEO_PATH, post(process_video))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(service)
}

/// Run the service on local FFmpeg until the process is stopped
pub async fn serve(config: &AppConfig) -> Result<(), std::io::Error> {
    let transcoder =
        FfmpegTranscoder::new(&config.ffmpeg_path).with_work_dir(config.work_dir.clone());

    let app = router(Arc::new(transcoder), config.max_upload_bytes);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr: SocketAddr = listener.local_addr()?;

    tracing::info!("Transcoding service listening on http://{}", addr);
    tracing::info!("FFmpeg: {:?}", config.ffmpeg_path);

    axum::serve(listener, app).await
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn bad_request(message: impl AsRef<str>) -> Response {
    tracing::warn!("Rejected upload: {}", message.as_ref());
    error_response(StatusCode::BAD_REQUEST, message.as_ref())
}

#[derive(Default)]
struct UploadFields {
    video: Option<Vec<u8>>,
    format: Option<String>,
    quality: Option<String>,
    text_overlay: Option<String>,
}

async fn read_fields(mut multipart: Multipart) -> Result<UploadFields, Response> {
    let mut fields = UploadFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video" => {
                let bytes = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;
                fields.video = Some(bytes.to_vec());
            }
            "format" | "quality" | "textOverlay" => {
                let text = field.text().await.map_err(|e| bad_request(e.body_text()))?;
                match name.as_str() {
                    "format" => fields.format = Some(text),
                    "quality" => fields.quality = Some(text),
                    _ => fields.text_overlay = Some(text),
                }
            }
            other => tracing::debug!("Ignoring unknown field {:?}", other),
        }
    }

    Ok(fields)
}

/// Validate the upload into a transcoding request
fn parse_request(fields: UploadFields) -> Result<TranscodeRequest, Response> {
    let video = match fields.video {
        Some(video) if !video.is_empty() => video,
        _ => return Err(error_response(StatusCode::BAD_REQUEST, "No file uploaded")),
    };

    let format = fields
        .format
        .as_deref()
        .ok_or_else(|| bad_request("Missing format"))?
        .parse::<ExportFormat>()
        .map_err(|e| bad_request(e.to_string()))?;

    // gif has a fixed encoding policy; its quality field is not read
    let quality = match fields.quality.as_deref() {
        _ if !format.uses_quality() => ExportQuality::default(),
        Some(quality) => quality
            .parse::<ExportQuality>()
            .map_err(|e| bad_request(e.to_string()))?,
        None => return Err(bad_request("Missing quality")),
    };

    let text_overlay = match fields.text_overlay.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(
            serde_json::from_str::<TextOverlay>(raw)
                .map_err(|e| bad_request(format!("Invalid textOverlay: {}", e)))?,
        ),
        _ => None,
    };

    let config = ExportConfig::new(format, quality).with_overlay(text_overlay);
    Ok(TranscodeRequest::new(Arc::from(video), &config))
}

async fn process_video(State(service): State<SharedService>, multipart: Multipart) -> Response {
    let request = match read_fields(multipart).await.and_then(parse_request) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let format = request.format;

    tracing::info!(
        "Processing {} byte upload as {} ({})",
        request.video.len(),
        format,
        request.quality
    );

    match service.transcode(request).await {
        Ok(bytes) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, format.content_type())
            .header(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"processed.{}\"", format.extension()),
            )
            .body(axum::body::Body::from(bytes))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => {
            tracing::error!("Error processing video: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Processing failed")
        }
    }
}
