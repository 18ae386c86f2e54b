//! Session records and statistics views

use crate::format::{format_duration, iso_timestamp, round1, round2, round2_seq};
use attention::AttentionState;
use serde::{Deserialize, Serialize};

/// Closed interval with a single smoothed state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start_time: f64,
    pub end_time: f64,
    pub duration_sec: f64,
    pub state: AttentionState,
}

/// One line of `attention_log.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanRecord {
    /// Local ISO-8601 time the span ended
    pub timestamp: String,
    #[serde(serialize_with = "round2")]
    pub attention_span_seconds: f64,
    pub duration_human_readable: String,
}

impl SpanRecord {
    /// Record for an attentive span of `span_secs` ending at `ended_at`
    pub fn new(ended_at: f64, span_secs: f64) -> Self {
        Self {
            timestamp: iso_timestamp(ended_at),
            attention_span_seconds: span_secs,
            duration_human_readable: format_duration(span_secs),
        }
    }
}

/// Periodic focus sample for charting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since session start
    #[serde(serialize_with = "round1")]
    pub t: f64,
    #[serde(serialize_with = "round1")]
    pub focus_pct_so_far: f64,
    #[serde(serialize_with = "round1")]
    pub attentive_sec: f64,
    #[serde(serialize_with = "round1")]
    pub distracted_sec: f64,
}

/// One line of `attention_sessions.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_start: String,
    pub session_end: String,
    #[serde(serialize_with = "round1")]
    pub duration_sec: f64,
    #[serde(serialize_with = "round1")]
    pub attentive_sec: f64,
    #[serde(serialize_with = "round1")]
    pub distracted_sec: f64,
    #[serde(serialize_with = "round1")]
    pub focus_pct: f64,
    pub distraction_count: u32,
    #[serde(serialize_with = "round2_seq")]
    pub spans_sec: Vec<f64>,
    #[serde(serialize_with = "round1")]
    pub avg_span_sec: f64,
    #[serde(serialize_with = "round1")]
    pub max_span_sec: f64,
    pub samples: Vec<Sample>,
    pub events_count: u32,
}

/// Running totals as of the last tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LiveStats {
    pub elapsed: f64,
    pub attentive_sec: f64,
    pub distracted_sec: f64,
    pub current_span_sec: f64,
    pub focus_pct: f64,
}

impl LiveStats {
    /// Human-readable one-line summary
    pub fn describe(&self) -> String {
        format!(
            "total {} | attentive {} | distracted {} | span {} | focus {:.1}%",
            format_duration(self.elapsed),
            format_duration(self.attentive_sec),
            format_duration(self.distracted_sec),
            format_duration(self.current_span_sec),
            self.focus_pct
        )
    }
}

/// Span and streak analytics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insights {
    pub avg_span: f64,
    pub max_span: f64,
    pub distraction_count: u32,
    pub focus_pct: f64,
    pub current_state: AttentionState,
    /// Seconds spent in the current state
    pub current_streak: f64,
    /// Longest attentive streak this session
    pub longest_streak: f64,
}

pub(crate) fn focus_pct(attentive_sec: f64, duration_sec: f64) -> f64 {
    if duration_sec > 0.0 {
        attentive_sec / duration_sec * 100.0
    } else {
        0.0
    }
}
