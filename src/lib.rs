//! zoomcast - screen recordings with a zoom timeline.
//!
//! Captures a recording, collects zoom annotations while it runs, normalizes
//! the result through a transcoding service and exports the edited timeline
//! to mp4, webm or gif.

pub mod capture;
pub mod config;
pub mod export;
pub mod project;
pub mod recorder;
pub mod server;
pub mod timeline;
pub mod utils;
pub mod zoom;

#[cfg(test)]
mod testing;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise logs this crate at info (debug when
/// `verbose`).
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "zoomcast=debug" } else { "zoomcast=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
