//! Step inspector binary for the steptrace aggregation engine.
//!
//! Reads simulator snapshots as JSON lines, applies them batch by batch to
//! one [`Session`], and writes one panel frame per batch to stdout as a
//! JSON line. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! steptrace-engine [FEED.jsonl]   # reads stdin when no path is given
//! ```
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `steptrace-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Open the feed and spawn the reader task
//! 4. Apply batches in arrival order, writing one frame each
//! 5. Log the feed summary
//!
//! [`Session`]: steptrace_core::session::Session

mod error;
mod output;
mod reader;

use std::path::Path;

use steptrace_core::config::{InspectorConfig, LogFormat, LoggingConfig};
use steptrace_core::session::Session;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Configuration file looked up in the working directory.
const CONFIG_FILE: &str = "steptrace-config.yaml";

/// Application entry point for the step inspector.
///
/// # Errors
///
/// Returns an error if configuration, the feed, or frame output fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, config_found) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        config_found,
        rate_panels = config.panels.rates.len(),
        timeline = config.panels.timeline.enabled,
        channel_capacity = config.session.batch_channel_capacity,
        "steptrace-engine starting"
    );

    // 3. Open the feed.
    let source = std::env::args().nth(1);
    let feed: Box<dyn AsyncBufRead + Unpin + Send> = match &source {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|source| EngineError::OpenFeed {
                    path: path.clone(),
                    source,
                })?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };
    info!(source = source.as_deref().unwrap_or("stdin"), "feed opened");

    let (tx, mut rx) = mpsc::channel(config.session.batch_channel_capacity);
    let reader_task = tokio::spawn(reader::read_feed(feed, tx));

    // 4. Apply batches strictly in arrival order.
    let mut session = Session::new(config);
    let mut stdout = tokio::io::stdout();
    let mut frames: u64 = 0;

    while let Some(batch) = rx.recv().await {
        let frame = session.apply_batch(batch);
        if let Some(steps) = frame.request_more_steps {
            debug!(steps, "cursor caught up, more steps wanted");
        }
        output::write_frame(&mut stdout, &frame).await?;
        frames = frames.saturating_add(1);
    }

    // 5. Log results.
    let summary = reader_task.await.map_err(EngineError::from)??;
    info!(
        session_id = %session.id(),
        lines = summary.lines,
        batches = summary.batches,
        snapshots = summary.snapshots,
        skipped = summary.skipped,
        frames,
        total_faults = session.total_faults(),
        "steptrace-engine shutdown complete"
    );

    Ok(())
}

/// Install the tracing subscriber on stderr, keeping stdout for frames.
///
/// `RUST_LOG` wins over `logging.level` when set.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Load the inspector configuration from `steptrace-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
/// Returns whether the file was found alongside the configuration.
fn load_config() -> Result<(InspectorConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        Ok((InspectorConfig::from_file(config_path)?, true))
    } else {
        let mut config = InspectorConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}
