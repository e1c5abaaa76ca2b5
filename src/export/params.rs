//! Encoding parameter resolution
//!
//! Turns a format/quality/overlay triple into the exact encoder settings and
//! FFmpeg argument list used by the local transcoder.

use crate::export::types::{ExportFormat, ExportQuality, TextOverlay, TranscodeRequest};
use std::path::Path;

/// GIF output frame rate
pub const GIF_FPS: u32 = 15;
/// GIF output width in pixels (height follows aspect ratio)
pub const GIF_WIDTH: u32 = 640;

/// Overlay font size in pixels
pub const OVERLAY_FONT_SIZE: u32 = 24;
/// Overlay border width in pixels
pub const OVERLAY_BORDER_WIDTH: u32 = 2;

/// Resolved video encoding settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoding {
    /// CRF-driven codec with a speed preset
    Compressed {
        codec: &'static str,
        crf: u8,
        preset: &'static str,
    },
    /// Fixed frame-rate/size palette output; quality tiers do not apply
    Gif { fps: u32, width: u32 },
}

/// Everything needed to run one transcode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingPlan {
    pub format: ExportFormat,
    pub encoding: Encoding,
    pub overlay: Option<TextOverlay>,
}

impl EncodingPlan {
    /// Resolve encoder settings for a format and quality tier
    pub fn resolve(
        format: ExportFormat,
        quality: ExportQuality,
        overlay: Option<&TextOverlay>,
    ) -> Self {
        let encoding = match format {
            ExportFormat::Gif => Encoding::Gif {
                fps: GIF_FPS,
                width: GIF_WIDTH,
            },
            ExportFormat::Mp4 => Encoding::Compressed {
                codec: "libx264",
                crf: quality.crf(),
                preset: quality.preset(),
            },
            ExportFormat::Webm => Encoding::Compressed {
                codec: "libvpx-vp9",
                crf: quality.crf(),
                preset: quality.preset(),
            },
        };

        Self {
            format,
            encoding,
            overlay: overlay.filter(|o| !o.is_blank()).cloned(),
        }
    }

    pub fn for_request(request: &TranscodeRequest) -> Self {
        Self::resolve(request.format, request.quality, request.text_overlay.as_ref())
    }

    /// Build the `-vf` filter chain, if any
    pub fn video_filter(&self) -> Option<String> {
        let mut filters = Vec::new();

        if let Some(overlay) = &self.overlay {
            filters.push(drawtext_filter(overlay));
        }

        if let Encoding::Gif { fps, width } = self.encoding {
            filters.push(format!("fps={}", fps));
            filters.push(format!("scale={}:-1:flags=lanczos", width));
        }

        if filters.is_empty() {
            None
        } else {
            Some(filters.join(","))
        }
    }

    /// Build the full FFmpeg argument list
    pub fn ffmpeg_args(&self, input: &Path, output: &Path) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
        ];

        if let Some(filter) = self.video_filter() {
            args.extend(["-vf".to_string(), filter]);
        }

        match (&self.encoding, self.format) {
            (Encoding::Compressed { codec, crf, preset }, ExportFormat::Mp4) => {
                args.extend([
                    "-c:v".to_string(),
                    codec.to_string(),
                    "-preset".to_string(),
                    preset.to_string(),
                    "-crf".to_string(),
                    crf.to_string(),
                    "-pix_fmt".to_string(),
                    "yuv420p".to_string(),
                    "-movflags".to_string(),
                    "+faststart".to_string(),
                    "-c:a".to_string(),
                    "aac".to_string(),
                    "-b:a".to_string(),
                    "192k".to_string(),
                ]);
            }
            (Encoding::Compressed { codec, crf, preset }, _) => {
                args.extend([
                    "-c:v".to_string(),
                    codec.to_string(),
                    "-crf".to_string(),
                    crf.to_string(),
                    "-b:v".to_string(),
                    "0".to_string(),
                    "-deadline".to_string(),
                    "good".to_string(),
                    "-cpu-used".to_string(),
                    vp9_cpu_used(preset).to_string(),
                    "-c:a".to_string(),
                    "libopus".to_string(),
                ]);
            }
            (Encoding::Gif { .. }, _) => {
                args.extend(["-an".to_string()]);
            }
        }

        args.extend(["-f".to_string(), self.format.extension().to_string()]);
        args.push(output.to_string_lossy().to_string());
        args
    }
}

/// VP9 has no named presets; map the speed preset onto `-cpu-used`
fn vp9_cpu_used(preset: &str) -> u8 {
    match preset {
        "slow" => 1,
        "medium" => 2,
        _ => 4,
    }
}

/// Build a drawtext filter burning `overlay` in at its drawing origin
fn drawtext_filter(overlay: &TextOverlay) -> String {
    format!(
        "drawtext=text='{}':x={}:y={}:fontsize={}:fontcolor=white:bordercolor=black:borderw={}",
        escape_filter_text(&overlay.text),
        overlay.x,
        overlay.y,
        OVERLAY_FONT_SIZE,
        OVERLAY_BORDER_WIDTH
    )
}

/// Escape text for a quoted drawtext value inside a filtergraph.
///
/// Three levels unescape the value in turn: the graph parser (quotes keep
/// their contents literal), the option parser (`\` escapes, `:` separates)
/// and drawtext's own expansion (`\` escapes, `%` expands).
fn escape_filter_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\\\\\"),
            // Leave the quotes so the graph parser yields `\'` to the option parser
            '\'' => escaped.push_str("'\\\\\\''"),
            '%' => escaped.push_str("\\\\%"),
            ':' | ',' | ';' | '[' | ']' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' | '\r' => escaped.push(' '),
            _ => escaped.push(c),
        }
    }
    escaped
}
