//! Attention Tracker - Replay Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use storage::{JsonConfigStore, NdjsonLogStore};
use tokio::sync::{mpsc, watch};
use tracing::{info, Level};
use tracker::driver::{report_stats, run_engine};
use tracker::replay::{demo_script, produce, read_frames};
use tracker::{init_logging, AttentionTracker, Cli, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings =
        Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    cli.apply(&mut settings);

    init_logging(if settings.verbose { Level::DEBUG } else { Level::INFO })?;
    info!("=== Attention Tracker v{} ===", env!("CARGO_PKG_VERSION"));

    std::fs::create_dir_all(&settings.data_dir).with_context(|| {
        format!("failed to create data directory {}", settings.data_dir.display())
    })?;

    let frames = match &settings.input {
        Some(path) => read_frames(path)
            .with_context(|| format!("failed to read landmark stream {}", path.display()))?,
        None => {
            let start = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0);
            info!(fps = settings.demo_fps, "No input given; replaying synthetic session");
            demo_script(start, settings.demo_fps)
        }
    };

    let mut tracker = AttentionTracker::new(
        Box::new(JsonConfigStore::in_dir(&settings.data_dir)),
        Box::new(NdjsonLogStore::in_dir(&settings.data_dir)),
    );

    let (frame_tx, frame_rx) = mpsc::channel(64);
    let (stats_tx, stats_rx) = watch::channel(tracker.live_stats());

    let producer = tokio::spawn(produce(
        frames,
        frame_tx,
        Duration::from_millis(settings.frame_interval_ms),
    ));
    let reporter = tokio::spawn(report_stats(
        stats_rx,
        Duration::from_secs(settings.stats_interval_secs),
    ));

    let summary = run_engine(&mut tracker, frame_rx, stats_tx, settings.calibrate).await;
    let sent = producer.await.context("frame producer panicked")?;
    reporter.await.context("stats reporter panicked")?;
    info!(frames = sent, "Replay complete");

    if let Some(summary) = summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
