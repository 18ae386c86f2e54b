//! Duration, timestamp, and rounding helpers for records

use chrono::{DateTime, Local, TimeZone};
use serde::Serializer;

/// Format seconds as `"1h 0m 0s"`, `"2m 30s"` or `"5s"`
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Local ISO-8601 timestamp without offset, e.g. `2024-03-01T09:30:00.250000`
pub fn iso_timestamp(epoch_secs: f64) -> String {
    iso_timestamp_in(epoch_secs, &Local)
}

/// ISO-8601 timestamp of `epoch_secs` as wall-clock time in `tz`.
///
/// Microsecond precision; the fraction is left out when it is zero.
pub fn iso_timestamp_in<Tz: TimeZone>(epoch_secs: f64, tz: &Tz) -> String {
    let mut whole = epoch_secs.floor();
    let mut micros = ((epoch_secs - whole) * 1e6).round() as u32;
    if micros >= 1_000_000 {
        whole += 1.0;
        micros = 0;
    }

    let pattern = if micros == 0 {
        "%Y-%m-%dT%H:%M:%S"
    } else {
        "%Y-%m-%dT%H:%M:%S%.6f"
    };

    match DateTime::from_timestamp(whole as i64, micros * 1_000) {
        Some(utc) if epoch_secs.is_finite() => utc
            .with_timezone(tz)
            .naive_local()
            .format(pattern)
            .to_string(),
        _ => format!("{epoch_secs}"),
    }
}

/// Round to a fixed number of decimals
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub(crate) fn round1<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 1))
}

pub(crate) fn round2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(round_to(*value, 2))
}

pub(crate) fn round2_seq<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().map(|v| round_to(*v, 2)))
}
