//! Scores and validation verdicts shared by every pipeline stage.
//!
//! # Weighted score
//!
//! ```text
//! weighted = utility × priority.weight() × confidence
//! ```
//!
//! Utility and confidence are clamped to [0, 1] on construction (NaN becomes
//! 0), so the weighted score is always finite and comparable. Ranking uses a
//! strict `>`: on equal weighted scores the action declared first in
//! [`ActionKind`] wins.

use std::borrow::Cow;
use std::fmt;

use crate::action::ActionKind;

/// Discrete urgency tier. Variants are declared from most to least urgent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Priority {
    Emergency,
    High,
    Medium,
    Low,
    Minimal,
}

impl Priority {
    /// Strictly increasing multiplier: Minimal 1 through Emergency 5.
    pub const fn weight(self) -> f32 {
        match self {
            Priority::Emergency => 5.0,
            Priority::High => 4.0,
            Priority::Medium => 3.0,
            Priority::Low => 2.0,
            Priority::Minimal => 1.0,
        }
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.weight().total_cmp(&other.weight())
    }
}

fn unit_interval(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Score assigned to one action kind by an evaluator.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionScore {
    pub kind: ActionKind,
    /// Desirability independent of urgency, in [0, 1].
    pub utility: f32,
    pub priority: Priority,
    /// Evaluator's certainty in [0, 1].
    pub confidence: f32,
    pub reasoning: Cow<'static, str>,
}

impl ActionScore {
    pub fn new(
        kind: ActionKind,
        utility: f32,
        priority: Priority,
        confidence: f32,
        reasoning: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            kind,
            utility: unit_interval(utility),
            priority,
            confidence: unit_interval(confidence),
            reasoning: reasoning.into(),
        }
    }

    /// Score used when an evaluator has no opinion on `kind`.
    pub fn omitted(kind: ActionKind) -> Self {
        Self::new(kind, 0.0, Priority::Minimal, 0.0, "not evaluated")
    }

    pub fn weighted_score(&self) -> f32 {
        self.utility * self.priority.weight() * self.confidence
    }
}

impl fmt::Display for ActionScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.3} (u={:.2} p={} c={:.2}): {}",
            self.kind,
            self.weighted_score(),
            self.utility,
            self.priority,
            self.confidence,
            self.reasoning
        )
    }
}

/// Outcome of a validation pass. Never an error: reasons are collected in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            errors: vec![reason.into()],
        }
    }

    pub fn push(&mut self, reason: impl Into<String>) {
        self.errors.push(reason.into());
    }

    /// Records `reason` when `condition` does not hold.
    pub fn require(&mut self, condition: bool, reason: impl FnOnce() -> String) {
        if !condition {
            self.errors.push(reason());
        }
    }

    /// Appends the reasons from `other` that are not already recorded.
    pub fn merge(&mut self, other: ValidationResult) {
        for reason in other.errors {
            if !self.errors.contains(&reason) {
                self.errors.push(reason);
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}
