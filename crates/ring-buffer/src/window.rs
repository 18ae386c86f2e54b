//! Voting and averaging windows built on [`RingBuffer`]

use crate::buffer::RingBuffer;
use serde::{Deserialize, Serialize};

/// Boolean history with a running count of `true` entries.
///
/// The tally is adjusted on every push from the evicted entry, so majority
/// queries never rescan the window.
#[derive(Debug, Clone)]
pub struct VoteWindow {
    buffer: RingBuffer<bool>,
    positives: usize,
}

/// Point-in-time view of a [`VoteWindow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub len: usize,
    pub capacity: usize,
    pub positives: usize,
}

impl VoteWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: RingBuffer::new(capacity),
            positives: 0,
        }
    }

    /// Record one vote
    pub fn push(&mut self, vote: bool) {
        if vote {
            self.positives += 1;
        }
        if let Some(true) = self.buffer.push(vote) {
            self.positives -= 1;
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Number of `true` votes in the window
    pub fn positives(&self) -> usize {
        self.positives
    }

    /// Number of `false` votes in the window
    pub fn negatives(&self) -> usize {
        self.buffer.len() - self.positives
    }

    /// Fraction of `true` votes (0.0 when empty)
    pub fn positive_fraction(&self) -> f64 {
        if self.buffer.is_empty() {
            return 0.0;
        }
        self.positives as f64 / self.buffer.len() as f64
    }

    /// Fraction of `false` votes (0.0 when empty)
    pub fn negative_fraction(&self) -> f64 {
        if self.buffer.is_empty() {
            return 0.0;
        }
        self.negatives() as f64 / self.buffer.len() as f64
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        WindowSnapshot {
            len: self.len(),
            capacity: self.capacity(),
            positives: self.positives,
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.positives = 0;
    }
}

/// Moving average over the last N samples
#[derive(Debug, Clone)]
pub struct RollingMean {
    buffer: RingBuffer<f64>,
}

impl RollingMean {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: RingBuffer::new(capacity),
        }
    }

    /// Add a sample and return the mean of the current window
    pub fn push(&mut self, value: f64) -> f64 {
        self.buffer.push(value);
        self.mean()
    }

    /// Mean of the current window (0.0 when empty)
    pub fn mean(&self) -> f64 {
        if self.buffer.is_empty() {
            return 0.0;
        }
        self.buffer.iter().sum::<f64>() / self.buffer.len() as f64
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}
