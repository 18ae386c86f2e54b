//! Majority-vote temporal smoothing

use crate::config::ThresholdConfig;
use crate::state::{AttentionState, RawDecision};
use ring_buffer::{VoteWindow, WindowSnapshot};
use tracing::debug;

/// Stabilizes raw per-frame decisions into an [`AttentionState`].
///
/// The state flips only when one side holds a strict majority of the
/// window's full capacity, so a freshly reset smoother needs more than
/// half a window of agreeing frames before it can leave `Attentive`.
/// Ties keep the current state.
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    window: VoteWindow,
    state: AttentionState,
}

impl TemporalSmoother {
    pub fn new(history_len: usize) -> Self {
        Self {
            window: VoteWindow::new(history_len),
            state: AttentionState::Attentive,
        }
    }

    pub fn from_config(config: &ThresholdConfig) -> Self {
        Self::new(config.history_len)
    }

    /// Record a frame's decision and return the (possibly updated) state
    pub fn push(&mut self, decision: &RawDecision) -> AttentionState {
        self.update(decision.is_attentive)
    }

    /// Record a raw attentive/distracted vote
    pub fn update(&mut self, is_attentive: bool) -> AttentionState {
        self.window.push(is_attentive);

        let capacity = self.window.capacity();
        let next = if self.window.negatives() * 2 > capacity {
            AttentionState::Distracted
        } else if self.window.positives() * 2 > capacity {
            AttentionState::Attentive
        } else {
            self.state
        };

        if next != self.state {
            debug!(
                from = %self.state,
                to = %next,
                positives = self.window.positives(),
                len = self.window.len(),
                "Smoothed state changed"
            );
            self.state = next;
        }
        self.state
    }

    pub fn state(&self) -> AttentionState {
        self.state
    }

    pub fn history_len(&self) -> usize {
        self.window.capacity()
    }

    /// Number of decisions currently held
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        self.window.snapshot()
    }

    /// Clear history and return to the optimistic initial state
    pub fn reset(&mut self) {
        self.window.clear();
        self.state = AttentionState::Attentive;
    }

    /// Change the window length; history restarts empty, state is kept
    pub fn resize(&mut self, history_len: usize) {
        if history_len != self.window.capacity() {
            self.window = VoteWindow::new(history_len);
        }
    }
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::from_config(&ThresholdConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::no_face;
    use proptest::prelude::*;

    #[test]
    fn test_initial_state() {
        let smoother = TemporalSmoother::new(9);
        assert_eq!(smoother.state(), AttentionState::Attentive);
        assert!(smoother.is_empty());
    }

    #[test]
    fn test_needs_majority_of_capacity() {
        let mut smoother = TemporalSmoother::new(9);
        for _ in 0..4 {
            assert_eq!(smoother.update(false), AttentionState::Attentive);
        }
        // Fifth distracted vote out of nine
        assert_eq!(smoother.update(false), AttentionState::Distracted);
    }

    #[test]
    fn test_blink_does_not_flip() {
        let mut smoother = TemporalSmoother::new(5);
        for _ in 0..5 {
            smoother.update(true);
        }
        assert_eq!(smoother.update(false), AttentionState::Attentive);
        assert_eq!(smoother.update(true), AttentionState::Attentive);
    }

    #[test]
    fn test_tie_keeps_state() {
        let mut smoother = TemporalSmoother::new(4);
        for _ in 0..4 {
            smoother.update(false);
        }
        assert_eq!(smoother.state(), AttentionState::Distracted);
        smoother.update(true);
        // Window is [D, D, D, A] then [D, D, A, A]
        assert_eq!(smoother.update(true), AttentionState::Distracted);
        assert_eq!(smoother.update(true), AttentionState::Attentive);
    }

    #[test]
    fn test_no_face_frames_reach_distracted() {
        let mut smoother = TemporalSmoother::new(9);
        let states: Vec<_> = (0..9).map(|_| smoother.push(&no_face())).collect();
        assert_eq!(states[3], AttentionState::Attentive);
        assert_eq!(states[4], AttentionState::Distracted);
        assert_eq!(states[8], AttentionState::Distracted);
    }

    #[test]
    fn test_reset_and_resize() {
        let mut smoother = TemporalSmoother::new(3);
        for _ in 0..3 {
            smoother.update(false);
        }
        smoother.resize(7);
        assert_eq!(smoother.history_len(), 7);
        assert!(smoother.is_empty());
        assert_eq!(smoother.state(), AttentionState::Distracted);

        smoother.reset();
        assert!(smoother.is_empty());
        assert_eq!(smoother.state(), AttentionState::Attentive);
    }

    proptest! {
        #[test]
        fn prop_repeated_decision_converges(
            history_len in 1usize..20,
            prefix in prop::collection::vec(any::<bool>(), 0..40),
            target in any::<bool>(),
            extra in 0usize..20,
        ) {
            let mut smoother = TemporalSmoother::new(history_len);
            for &vote in &prefix {
                smoother.update(vote);
            }

            let expected = AttentionState::from_attentive(target);
            for _ in 0..history_len {
                smoother.update(target);
            }
            prop_assert_eq!(smoother.state(), expected);

            for _ in 0..extra {
                prop_assert_eq!(smoother.update(target), expected);
            }
        }

        #[test]
        fn prop_single_outlier_rejected(
            history_len in 3usize..20,
            majority in any::<bool>(),
            position in 0usize..20,
        ) {
            let mut smoother = TemporalSmoother::new(history_len);
            for _ in 0..history_len {
                smoother.update(majority);
            }
            let expected = AttentionState::from_attentive(majority);

            let position = position % history_len;
            for i in 0..history_len {
                let vote = if i == position { !majority } else { majority };
                prop_assert_eq!(smoother.update(vote), expected);
            }
        }
    }
}
