//! Landmark frame sources
//!
//! Recorded streams are newline-delimited JSON, one frame per line:
//! `{"timestamp": 1700000000.5, "landmarks": [[x, y, z], ...]}`.
//! A missing or null `landmarks` field marks a frame without a face.

use crate::TrackerError;
use feature_engine::{FaceGeometry, LandmarkFrame, Point3};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// One recorded frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// Capture time (seconds since the Unix epoch)
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<Vec<Point3>>,
}

impl ReplayFrame {
    pub fn face(frame: LandmarkFrame) -> Self {
        Self {
            timestamp: frame.timestamp,
            landmarks: Some(frame.points),
        }
    }

    pub fn no_face(timestamp: f64) -> Self {
        Self {
            timestamp,
            landmarks: None,
        }
    }

    /// Landmarks as a frame, `None` when no face was found
    pub fn to_landmarks(&self) -> Option<LandmarkFrame> {
        self.landmarks
            .as_ref()
            .map(|points| LandmarkFrame::new(self.timestamp, points.clone()))
    }
}

/// Parse a newline-delimited frame stream; blank lines are skipped
pub fn parse_frames(reader: impl BufRead) -> Result<Vec<ReplayFrame>, TrackerError> {
    let mut frames = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let frame = serde_json::from_str(&line).map_err(|source| TrackerError::Replay {
            line: index + 1,
            source,
        })?;
        frames.push(frame);
    }
    Ok(frames)
}

pub fn read_frames(path: &Path) -> Result<Vec<ReplayFrame>, TrackerError> {
    let frames = parse_frames(BufReader::new(File::open(path)?))?;
    info!(path = %path.display(), frames = frames.len(), "Loaded landmark stream");
    Ok(frames)
}

/// Scripted segment of the synthetic demo
#[derive(Debug, Clone, Copy)]
struct Segment {
    secs: f64,
    face: Option<FaceGeometry>,
}

/// Synthetic session starting at `start`: focused work with a glance away,
/// a look down at a phone, a short absence and a yawn.
pub fn demo_script(start: f64, fps: f64) -> Vec<ReplayFrame> {
    let focused = FaceGeometry::default();
    let segments = [
        Segment {
            secs: 15.0,
            face: Some(focused),
        },
        Segment {
            secs: 4.0,
            face: Some(FaceGeometry {
                face_x: 0.85,
                ..focused
            }),
        },
        Segment {
            secs: 12.0,
            face: Some(focused),
        },
        Segment {
            secs: 5.0,
            face: Some(FaceGeometry {
                nose_y: 0.68,
                ..focused
            }),
        },
        Segment {
            secs: 8.0,
            face: Some(focused),
        },
        Segment {
            secs: 3.0,
            face: None,
        },
        Segment {
            secs: 6.0,
            face: Some(focused),
        },
        Segment {
            secs: 2.0,
            face: Some(FaceGeometry {
                mar: 0.6,
                ..focused
            }),
        },
        Segment {
            secs: 5.0,
            face: Some(focused),
        },
    ];

    let step = 1.0 / fps.max(1.0);
    let mut frames = Vec::new();
    let mut offset = 0.0;
    for segment in segments {
        let count = (segment.secs * fps.max(1.0)).round() as usize;
        for _ in 0..count {
            let t = start + offset;
            frames.push(match segment.face {
                Some(face) => ReplayFrame::face(face.to_frame(t)),
                None => ReplayFrame::no_face(t),
            });
            offset += step;
        }
    }
    frames
}

/// Send frames in order, pacing them by `interval` when non-zero.
/// Stops early if the receiver is dropped.
pub async fn produce(
    frames: Vec<ReplayFrame>,
    tx: mpsc::Sender<ReplayFrame>,
    interval: Duration,
) -> usize {
    let mut sent = 0;
    for frame in frames {
        if tx.send(frame).await.is_err() {
            debug!(sent, "Frame receiver closed");
            break;
        }
        sent += 1;
        if !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
    }
    sent
}
