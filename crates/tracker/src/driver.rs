//! Engine and reporter tasks for the replay binary

use crate::replay::ReplayFrame;
use crate::AttentionTracker;
use session::{LiveStats, SessionSummary};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// Consume frames until the producer hangs up, publishing live statistics
/// after every frame. The session opens on the first frame and closes at
/// the last frame's timestamp.
pub async fn run_engine(
    tracker: &mut AttentionTracker,
    mut frames: mpsc::Receiver<ReplayFrame>,
    stats: watch::Sender<LiveStats>,
    calibrate: bool,
) -> Option<SessionSummary> {
    let mut last_timestamp = None;

    while let Some(frame) = frames.recv().await {
        let now = frame.timestamp;
        if last_timestamp.is_none() {
            if calibrate {
                tracker.start_calibration(now);
            }
            tracker.start(now);
        }
        last_timestamp = Some(now);

        let landmarks = frame.to_landmarks();
        let analysis = tracker.process_frame(landmarks.as_ref(), now);
        if tracker.config().debug_overlay {
            debug!(lines = ?analysis.overlay_lines(), "Overlay");
        }

        // No reporter attached is fine
        let _ = stats.send(tracker.live_stats());
    }

    let summary = tracker.stop(last_timestamp?)?;
    info!(
        duration = %session::format_duration(summary.duration_sec),
        focus_pct = summary.focus_pct,
        distractions = summary.distraction_count,
        "Replay finished"
    );
    Some(summary)
}

/// Log the latest statistics every `period` until the engine finishes
pub async fn report_stats(mut stats: watch::Receiver<LiveStats>, period: Duration) {
    let mut ticker = tokio::time::interval(period.max(Duration::from_millis(10)));
    loop {
        ticker.tick().await;
        match stats.has_changed() {
            Ok(true) => {
                let latest = *stats.borrow_and_update();
                info!("{}", latest.describe());
            }
            Ok(false) => {}
            Err(_) => break,
        }
    }
}
