//! Session aggregator

use crate::format::iso_timestamp;
use crate::records::{focus_pct, Insights, LiveStats, Sample, SessionSummary, Span, SpanRecord};
use attention::AttentionState;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Session time between focus samples (seconds)
pub const SAMPLE_INTERVAL_SECS: f64 = 10.0;

/// Attentive spans this short are neither logged nor counted as a distraction
pub const MIN_LOGGED_SPAN_SECS: f64 = 1.0;

/// Session aggregation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub sample_interval_secs: f64,
    pub min_logged_span_secs: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_interval_secs: SAMPLE_INTERVAL_SECS,
            min_logged_span_secs: MIN_LOGGED_SPAN_SECS,
        }
    }
}

/// Accumulates one session's statistics from smoothed state ticks.
///
/// Time comes exclusively from the `now` arguments (seconds since the Unix
/// epoch), so a synthetic clock drives it deterministically. Elapsed time
/// between ticks is credited to the state held before the tick.
#[derive(Debug, Clone)]
pub struct SessionAggregator {
    config: SessionConfig,
    session_start: Option<f64>,
    running: bool,
    last_tick: f64,
    state: AttentionState,
    span_start: f64,
    attentive_sec: f64,
    distracted_sec: f64,
    distraction_count: u32,
    spans_sec: Vec<f64>,
    spans: Vec<Span>,
    samples: Vec<Sample>,
    since_sample: f64,
    longest_streak: f64,
}

impl SessionAggregator {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            session_start: None,
            running: false,
            last_tick: 0.0,
            state: AttentionState::Attentive,
            span_start: 0.0,
            attentive_sec: 0.0,
            distracted_sec: 0.0,
            distraction_count: 0,
            spans_sec: Vec::new(),
            spans: Vec::new(),
            samples: Vec::new(),
            since_sample: 0.0,
            longest_streak: 0.0,
        }
    }

    /// Open a new session, discarding any previous statistics
    pub fn start(&mut self, initial: AttentionState, now: f64) {
        self.reset();
        self.session_start = Some(now);
        self.running = true;
        self.last_tick = now;
        self.span_start = now;
        self.state = initial;
        info!(state = %initial, "Session started");
    }

    /// Advance the session to `now` with the current smoothed state.
    ///
    /// Returns a span record when an attentive span long enough to log
    /// just ended.
    pub fn tick(&mut self, state: AttentionState, now: f64) -> Option<SpanRecord> {
        if !self.running {
            return None;
        }
        let start = self.session_start?;

        let now = if now < self.last_tick {
            warn!(now, last_tick = self.last_tick, "Clock went backwards; holding time");
            self.last_tick
        } else {
            now
        };

        let dt = now - self.last_tick;
        match self.state {
            AttentionState::Attentive => self.attentive_sec += dt,
            AttentionState::Distracted => self.distracted_sec += dt,
        }
        self.last_tick = now;

        if self.state.is_attentive() {
            self.longest_streak = self.longest_streak.max(now - self.span_start);
        }

        self.since_sample += dt;
        if self.since_sample >= self.config.sample_interval_secs {
            self.since_sample %= self.config.sample_interval_secs;
            let elapsed = now - start;
            self.samples.push(Sample {
                t: elapsed,
                focus_pct_so_far: focus_pct(self.attentive_sec, elapsed),
                attentive_sec: self.attentive_sec,
                distracted_sec: self.distracted_sec,
            });
        }

        if state == self.state {
            return None;
        }

        let closed = self.close_span(now);
        self.state = state;
        self.span_start = now;

        if closed.state.is_attentive() && closed.duration_sec > self.config.min_logged_span_secs {
            self.distraction_count += 1;
            self.spans_sec.push(closed.duration_sec);
            info!(
                span_secs = closed.duration_sec,
                distractions = self.distraction_count,
                "Attention span ended"
            );
            return Some(SpanRecord::new(now, closed.duration_sec));
        }
        None
    }

    /// End the session and produce its summary.
    ///
    /// The trailing open span counts towards the totals but is not logged.
    pub fn stop(&mut self, now: f64) -> Option<SessionSummary> {
        if !self.running {
            return None;
        }
        let start = self.session_start?;

        self.tick(self.state, now);
        let trailing = self.close_span(self.last_tick);
        self.span_start = self.last_tick;
        self.running = false;

        let duration_sec = self.last_tick - start;
        let summary = SessionSummary {
            session_start: iso_timestamp(start),
            session_end: iso_timestamp(self.last_tick),
            duration_sec,
            attentive_sec: self.attentive_sec,
            distracted_sec: self.distracted_sec,
            focus_pct: focus_pct(self.attentive_sec, duration_sec),
            distraction_count: self.distraction_count,
            spans_sec: self.spans_sec.clone(),
            avg_span_sec: self.avg_span(),
            max_span_sec: self.max_span(),
            samples: self.samples.clone(),
            events_count: self.distraction_count,
        };

        info!(
            duration_sec,
            focus_pct = summary.focus_pct,
            distractions = self.distraction_count,
            trailing_secs = trailing.duration_sec,
            "Session stopped"
        );
        Some(summary)
    }

    /// Clear all counters, spans, samples and streaks without emitting anything
    pub fn reset(&mut self) {
        debug!("Session reset");
        *self = Self::new(self.config.clone());
    }

    fn close_span(&mut self, now: f64) -> Span {
        let span = Span {
            start_time: self.span_start,
            end_time: now,
            duration_sec: now - self.span_start,
            state: self.state,
        };
        self.spans.push(span);
        span
    }

    fn avg_span(&self) -> f64 {
        if self.spans_sec.is_empty() {
            return 0.0;
        }
        self.spans_sec.iter().sum::<f64>() / self.spans_sec.len() as f64
    }

    fn max_span(&self) -> f64 {
        self.spans_sec.iter().cloned().fold(0.0, f64::max)
    }

    /// Whether a session is open
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> AttentionState {
        self.state
    }

    pub fn live_stats(&self) -> LiveStats {
        let Some(start) = self.session_start else {
            return LiveStats::default();
        };
        let elapsed = self.last_tick - start;
        LiveStats {
            elapsed,
            attentive_sec: self.attentive_sec,
            distracted_sec: self.distracted_sec,
            current_span_sec: self.last_tick - self.span_start,
            focus_pct: focus_pct(self.attentive_sec, elapsed),
        }
    }

    pub fn insights(&self) -> Insights {
        let stats = self.live_stats();
        let current_streak = if self.running {
            self.last_tick - self.span_start
        } else {
            0.0
        };
        Insights {
            avg_span: self.avg_span(),
            max_span: self.max_span(),
            distraction_count: self.distraction_count,
            focus_pct: stats.focus_pct,
            current_state: self.state,
            current_streak,
            longest_streak: self.longest_streak,
        }
    }

    /// Focus samples in session order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Every closed span, both states
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Durations of logged attentive spans
    pub fn spans_sec(&self) -> &[f64] {
        &self.spans_sec
    }
}

impl Default for SessionAggregator {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const T0: f64 = 1_700_000_000.0;

    /// Tick every half second from `from` (exclusive) through `to` (inclusive)
    fn run(
        agg: &mut SessionAggregator,
        state: AttentionState,
        from: f64,
        to: f64,
    ) -> Vec<SpanRecord> {
        let mut records = Vec::new();
        let mut t = from;
        while t < to {
            t += 0.5;
            records.extend(agg.tick(state, T0 + t));
        }
        records
    }

    #[test]
    fn test_scripted_session() {
        let mut agg = SessionAggregator::default();
        agg.start(AttentionState::Attentive, T0);

        let mut records = run(&mut agg, AttentionState::Attentive, 0.0, 9.5);
        records.extend(agg.tick(AttentionState::Distracted, T0 + 10.0));
        records.extend(run(&mut agg, AttentionState::Distracted, 10.0, 12.5));
        records.extend(agg.tick(AttentionState::Attentive, T0 + 13.0));
        records.extend(run(&mut agg, AttentionState::Attentive, 13.0, 17.5));
        let summary = agg.stop(T0 + 18.0).unwrap();

        assert_eq!(records.len(), 1);
        assert!((records[0].attention_span_seconds - 10.0).abs() < 1e-9);
        assert_eq!(records[0].duration_human_readable, "10s");

        assert_eq!(summary.spans_sec, vec![10.0]);
        assert_eq!(summary.distraction_count, 1);
        assert_eq!(summary.events_count, 1);
        assert!((summary.attentive_sec - 15.0).abs() < 1e-9);
        assert!((summary.distracted_sec - 3.0).abs() < 1e-9);
        assert!((summary.duration_sec - 18.0).abs() < 1e-9);
        assert!((summary.focus_pct - 15.0 / 18.0 * 100.0).abs() < 1e-9);
        assert_eq!(summary.avg_span_sec, 10.0);
        assert_eq!(summary.max_span_sec, 10.0);

        // Attentive 10s, distracted 3s, trailing attentive 5s
        let durations: Vec<_> = agg.spans().iter().map(|s| s.duration_sec).collect();
        assert_eq!(durations, vec![10.0, 3.0, 5.0]);
        assert!(!agg.is_running());
    }

    #[test]
    fn test_samples_every_interval() {
        let mut agg = SessionAggregator::default();
        agg.start(AttentionState::Attentive, T0);
        run(&mut agg, AttentionState::Attentive, 0.0, 10.0);
        agg.tick(AttentionState::Distracted, T0 + 10.5);
        run(&mut agg, AttentionState::Distracted, 10.5, 25.0);

        let samples = agg.samples();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].t, 10.0);
        assert_eq!(samples[0].focus_pct_so_far, 100.0);
        assert_eq!(samples[1].t, 20.0);
        assert!((samples[1].focus_pct_so_far - 52.5).abs() < 1e-9);
        assert_eq!(samples[1].attentive_sec + samples[1].distracted_sec, 20.0);
    }

    #[test]
    fn test_short_span_not_logged() {
        let mut agg = SessionAggregator::default();
        agg.start(AttentionState::Attentive, T0);
        let record = agg.tick(AttentionState::Distracted, T0 + 0.5);

        assert!(record.is_none());
        assert_eq!(agg.insights().distraction_count, 0);
        assert!(agg.spans_sec().is_empty());
        assert_eq!(agg.spans().len(), 1);
        assert_eq!(agg.live_stats().attentive_sec, 0.5);
    }

    #[test]
    fn test_distracted_to_attentive_not_logged() {
        let mut agg = SessionAggregator::default();
        agg.start(AttentionState::Distracted, T0);
        run(&mut agg, AttentionState::Distracted, 0.0, 5.0);
        assert!(agg.tick(AttentionState::Attentive, T0 + 5.5).is_none());
        assert_eq!(agg.insights().distraction_count, 0);
    }

    #[test]
    fn test_streaks() {
        let mut agg = SessionAggregator::default();
        agg.start(AttentionState::Attentive, T0);
        run(&mut agg, AttentionState::Attentive, 0.0, 7.5);
        agg.tick(AttentionState::Distracted, T0 + 8.0);
        run(&mut agg, AttentionState::Distracted, 8.0, 10.0);

        let insights = agg.insights();
        assert_eq!(insights.current_state, AttentionState::Distracted);
        assert_eq!(insights.current_streak, 2.0);
        assert_eq!(insights.longest_streak, 8.0);

        agg.tick(AttentionState::Attentive, T0 + 10.5);
        run(&mut agg, AttentionState::Attentive, 10.5, 13.0);
        let insights = agg.insights();
        assert_eq!(insights.current_streak, 2.5);
        assert_eq!(insights.longest_streak, 8.0);
    }

    #[test]
    fn test_stop_zero_duration() {
        let mut agg = SessionAggregator::default();
        agg.start(AttentionState::Attentive, T0);
        let summary = agg.stop(T0).unwrap();

        assert_eq!(summary.duration_sec, 0.0);
        assert_eq!(summary.focus_pct, 0.0);
        assert_eq!(summary.avg_span_sec, 0.0);
        assert_eq!(summary.max_span_sec, 0.0);
        assert!(agg.stop(T0 + 1.0).is_none());
    }

    #[test]
    fn test_reset_clears_counters() {
        let mut agg = SessionAggregator::default();
        agg.start(AttentionState::Attentive, T0);
        run(&mut agg, AttentionState::Attentive, 0.0, 12.0);
        agg.tick(AttentionState::Distracted, T0 + 12.5);

        agg.reset();
        assert_eq!(agg.live_stats(), LiveStats::default());
        assert_eq!(agg.live_stats().elapsed, 0.0);
        assert!(agg.samples().is_empty());
        assert!(agg.spans().is_empty());
        assert_eq!(agg.insights().longest_streak, 0.0);
        assert!(!agg.is_running());
        assert!(agg.tick(AttentionState::Attentive, T0 + 20.0).is_none());
    }

    #[test]
    fn test_custom_intervals() {
        let mut agg = SessionAggregator::new(SessionConfig {
            sample_interval_secs: 2.0,
            min_logged_span_secs: 0.25,
        });
        agg.start(AttentionState::Attentive, T0);
        let record = agg.tick(AttentionState::Distracted, T0 + 0.5);
        run(&mut agg, AttentionState::Distracted, 0.5, 4.0);

        assert!(record.is_some());
        assert_eq!(agg.samples().len(), 2);
        assert_eq!(agg.samples()[1].t, 4.0);
    }

    #[test]
    fn test_clock_going_backwards() {
        let mut agg = SessionAggregator::default();
        agg.start(AttentionState::Attentive, T0);
        agg.tick(AttentionState::Attentive, T0 + 5.0);
        agg.tick(AttentionState::Attentive, T0 + 3.0);
        assert_eq!(agg.live_stats().elapsed, 5.0);
        assert_eq!(agg.live_stats().attentive_sec, 5.0);
    }

    proptest! {
        #[test]
        fn prop_time_is_fully_accounted(
            steps in prop::collection::vec((any::<bool>(), 0.0f64..3.0), 1..200),
        ) {
            let mut agg = SessionAggregator::default();
            agg.start(AttentionState::Attentive, T0);

            let mut t = T0;
            for (attentive, dt) in steps {
                t += dt;
                agg.tick(AttentionState::from_attentive(attentive), t);
            }
            let summary = agg.stop(t + 0.25).unwrap();

            let total = summary.attentive_sec + summary.distracted_sec;
            prop_assert!((total - summary.duration_sec).abs() < 1e-6);
            let expected_pct = summary.attentive_sec / summary.duration_sec * 100.0;
            prop_assert!((summary.focus_pct - expected_pct).abs() < 1e-9);
        }
    }
}
