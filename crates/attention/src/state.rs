//! Attention state, decision reasons, and per-frame decisions

use crate::AttentionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smoothed, externally visible attention state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttentionState {
    #[default]
    Attentive,
    Distracted,
}

impl AttentionState {
    pub fn from_attentive(is_attentive: bool) -> Self {
        if is_attentive {
            Self::Attentive
        } else {
            Self::Distracted
        }
    }

    pub fn is_attentive(self) -> bool {
        self == Self::Attentive
    }
}

impl fmt::Display for AttentionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attentive => f.write_str("ATTENTIVE"),
            Self::Distracted => f.write_str("DISTRACTED"),
        }
    }
}

/// Why a frame was judged distracted (or noteworthy)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    EyesClosed,
    Blink,
    TurnedAway,
    LookingDown,
    LookingUp,
    /// Informational unless open-mouth distraction is enabled
    MouthOpen,
    NoFace,
}

impl Reason {
    pub const ALL: [Reason; 7] = [
        Reason::EyesClosed,
        Reason::Blink,
        Reason::TurnedAway,
        Reason::LookingDown,
        Reason::LookingUp,
        Reason::MouthOpen,
        Reason::NoFace,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Reason::EyesClosed => "eyes_closed",
            Reason::Blink => "blink",
            Reason::TurnedAway => "turned_away",
            Reason::LookingDown => "looking_down",
            Reason::LookingUp => "looking_up",
            Reason::MouthOpen => "mouth_open",
            Reason::NoFace => "no_face",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Reason {
    type Err = AttentionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Reason::ALL
            .into_iter()
            .find(|r| r.tag() == s)
            .ok_or_else(|| AttentionError::UnknownReason(s.to_string()))
    }
}

/// Set of [`Reason`] flags, serialized as a list of tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<&'static str>", try_from = "Vec<String>")]
pub struct Reasons(u8);

impl Reasons {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, reason: Reason) {
        self.0 |= reason.bit();
    }

    pub fn remove(&mut self, reason: Reason) {
        self.0 &= !reason.bit();
    }

    /// Copy of this set without `reason`
    pub fn without(mut self, reason: Reason) -> Self {
        self.remove(reason);
        self
    }

    pub fn contains(&self, reason: Reason) -> bool {
        self.0 & reason.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Reason> + '_ {
        Reason::ALL.into_iter().filter(move |r| self.contains(*r))
    }

    pub fn tags(&self) -> Vec<&'static str> {
        self.iter().map(Reason::tag).collect()
    }
}

impl FromIterator<Reason> for Reasons {
    fn from_iter<I: IntoIterator<Item = Reason>>(iter: I) -> Self {
        let mut reasons = Reasons::empty();
        for reason in iter {
            reasons.insert(reason);
        }
        reasons
    }
}

impl From<Reasons> for Vec<&'static str> {
    fn from(reasons: Reasons) -> Self {
        reasons.tags()
    }
}

impl TryFrom<Vec<String>> for Reasons {
    type Error = AttentionError;

    fn try_from(tags: Vec<String>) -> Result<Self, Self::Error> {
        tags.iter().map(|t| t.parse::<Reason>()).collect()
    }
}

impl fmt::Display for Reasons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tags().join(","))
    }
}

/// Unsmoothed per-frame decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawDecision {
    pub is_attentive: bool,
    pub reasons: Reasons,
}

impl RawDecision {
    pub fn attentive() -> Self {
        Self {
            is_attentive: true,
            reasons: Reasons::empty(),
        }
    }

    pub fn distracted(reasons: Reasons) -> Self {
        Self {
            is_attentive: false,
            reasons,
        }
    }
}
