//! zoomcast CLI
//!
//! ## Usage
//!
//! ```bash
//! zoomcast serve                                   # Transcoding service on local ffmpeg
//! zoomcast export session/ --format gif            # Export a saved session
//! zoomcast export clip.webm --format mp4 --text Hi # Burn in an overlay
//! zoomcast inspect session/                        # Print the zoom timeline
//! ```

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zoomcast::config::AppConfig;
use zoomcast::export::{
    ExportConfig, ExportFormat, ExportOrchestrator, ExportQuality, FfmpegTranscoder,
    HttpTranscoder, TextOverlay, TranscodingService,
};
use zoomcast::project::{is_valid_bundle, read_bundle, read_timeline};
use zoomcast::timeline::layout::event_span;

/// zoomcast: screen recordings with a zoom timeline
#[derive(Parser, Debug)]
#[command(name = "zoomcast")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = "ZOOMCAST_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP transcoding service
    Serve(ServeArgs),

    /// Export a recording or saved session
    Export(ExportArgs),

    /// Print the zoom timeline of a saved session
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Listen address
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// FFmpeg executable
    #[arg(long, env = "ZOOMCAST_FFMPEG")]
    ffmpeg: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Media file or session bundle directory
    input: PathBuf,

    /// Target container (mp4, webm, gif)
    #[arg(short, long, default_value = "mp4")]
    format: ExportFormat,

    /// Quality tier (high, medium, low); ignored for gif
    #[arg(short, long, default_value = "high")]
    quality: ExportQuality,

    /// Overlay text to burn in
    #[arg(long)]
    text: Option<String>,

    /// Overlay x position in pixels
    #[arg(long, default_value = "10", requires = "text")]
    x: i32,

    /// Overlay y position in pixels
    #[arg(long, default_value = "10", requires = "text")]
    y: i32,

    /// Remote transcoding service; local ffmpeg when omitted
    #[arg(long, env = "ZOOMCAST_SERVICE_URL")]
    service_url: Option<String>,

    /// FFmpeg executable
    #[arg(long, env = "ZOOMCAST_FFMPEG")]
    ffmpeg: Option<PathBuf>,

    /// Directory the artifact is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Session bundle directory
    bundle: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    zoomcast::init_tracing(cli.verbose);

    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(args) => run_serve(config, args).await,
        Commands::Export(args) => run_export(config, args).await,
        Commands::Inspect(args) => run_inspect(&args.bundle),
    }
}

async fn run_serve(mut config: AppConfig, args: ServeArgs) -> Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(ffmpeg) = args.ffmpeg {
        config.ffmpeg_path = ffmpeg;
    }

    zoomcast::server::serve(&config)
        .await
        .with_context(|| format!("transcoding service on {} failed", config.bind_addr))
}

async fn run_export(mut config: AppConfig, args: ExportArgs) -> Result<()> {
    if let Some(url) = args.service_url {
        config.service_url = Some(url);
    }
    if let Some(ffmpeg) = args.ffmpeg {
        config.ffmpeg_path = ffmpeg;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    let source = load_source(&args.input)?;

    let service: Arc<dyn TranscodingService> = match &config.service_url {
        Some(url) => Arc::new(HttpTranscoder::new(url, config.request_timeout())?),
        None => Arc::new(
            FfmpegTranscoder::new(&config.ffmpeg_path).with_work_dir(config.work_dir.clone()),
        ),
    };
    let orchestrator = ExportOrchestrator::new(service);

    let overlay = args.text.map(|text| TextOverlay::new(text, args.x, args.y));
    let export_config = ExportConfig::new(args.format, args.quality).with_overlay(overlay);

    let artifact = orchestrator.export(Arc::from(source), &export_config).await?;
    let path = artifact
        .save_to(&config.output_dir)
        .await
        .with_context(|| format!("failed to write artifact to {:?}", config.output_dir))?;

    println!("{}", path.display());
    Ok(())
}

/// Bytes of a media file, or of the asset stored in a bundle
fn load_source(input: &Path) -> Result<Vec<u8>> {
    if input.is_dir() {
        if !is_valid_bundle(input) {
            bail!("{} is not a session bundle", input.display());
        }
        let state = read_bundle(input)?;
        let asset = state
            .asset
            .with_context(|| format!("{} has no recording", input.display()))?;
        return Ok(asset.bytes().to_vec());
    }

    std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))
}

fn run_inspect(bundle: &Path) -> Result<()> {
    let saved = read_timeline(bundle)?;

    tracing::debug!(
        "{} zoom events over {}s",
        saved.zoom_events.len(),
        saved.duration
    );
    for event in &saved.zoom_events {
        let span = event_span(event, saved.duration);
        tracing::debug!(
            "{} at {}s: {:.1}% +{:.1}%",
            event.id,
            event.start_time,
            span.left_percent,
            span.width_percent
        );
    }

    println!("{}", serde_json::to_string_pretty(&saved)?);
    Ok(())
}
