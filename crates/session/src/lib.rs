//! Session Aggregation
//!
//! Accumulates attentive/distracted time from the smoothed attention state,
//! closes spans on every state change, logs completed attention spans, and
//! produces the end-of-session summary.

mod aggregator;
mod format;
mod records;

pub use aggregator::{SessionAggregator, SessionConfig, MIN_LOGGED_SPAN_SECS, SAMPLE_INTERVAL_SECS};
pub use format::{format_duration, iso_timestamp, iso_timestamp_in, round_to};
pub use records::{Insights, LiveStats, Sample, SessionSummary, Span, SpanRecord};
