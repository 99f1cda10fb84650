//! Pluggable action evaluators.
//!
//! The [`crate::DecisionMaker`] depends only on the [`ActionEvaluator`]
//! contract. Evaluators are swapped as whole units per agent, usually by
//! [`EvaluatorKind`] so that scenario files can name them.

mod aggressive;
mod default;

pub use aggressive::AggressiveEvaluator;
pub use default::DefaultEvaluator;

use crate::action::ActionKind;
use crate::config::DecisionConfig;
use crate::decision::{ActionScore, DecisionContext};

/// Scores one action kind against a context.
pub trait ActionEvaluator: std::fmt::Debug + Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Scores `kind`. `None` means "no opinion" and is treated as
    /// [`ActionScore::omitted`], never as an error.
    fn evaluate(&self, kind: ActionKind, ctx: &DecisionContext) -> Option<ActionScore>;

    /// Scores every kind in declaration order, filling omissions.
    fn evaluate_all(&self, ctx: &DecisionContext) -> Vec<ActionScore> {
        ActionKind::all()
            .map(|kind| match self.evaluate(kind, ctx) {
                Some(score) if score.kind == kind => score,
                Some(mismatched) => {
                    tracing::warn!(
                        evaluator = self.name(),
                        expected = %kind,
                        got = %mismatched.kind,
                        "evaluator returned a score for the wrong action; treating as omitted"
                    );
                    ActionScore::omitted(kind)
                }
                None => ActionScore::omitted(kind),
            })
            .collect()
    }
}

/// Built-in evaluator selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EvaluatorKind {
    #[default]
    Default,
    Aggressive,
}

impl EvaluatorKind {
    pub fn build(self, config: &DecisionConfig) -> Box<dyn ActionEvaluator> {
        match self {
            EvaluatorKind::Default => Box::new(DefaultEvaluator::new(config.critical_health)),
            EvaluatorKind::Aggressive => {
                Box::new(AggressiveEvaluator::new(config.critical_health))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{Priority, build_context};
    use crate::state::{AgentId, AgentState, AgentStats, BattlefieldBounds, TeamId, Vec2};

    #[derive(Debug)]
    struct MeleeOnly;

    impl ActionEvaluator for MeleeOnly {
        fn name(&self) -> &'static str {
            "melee_only"
        }

        fn evaluate(&self, kind: ActionKind, _ctx: &DecisionContext) -> Option<ActionScore> {
            match kind {
                ActionKind::AttackMelee => {
                    Some(ActionScore::new(kind, 1.0, Priority::High, 1.0, "always"))
                }
                // wrong kind on purpose
                ActionKind::Move => Some(ActionScore::new(
                    ActionKind::Dodge,
                    1.0,
                    Priority::High,
                    1.0,
                    "mislabelled",
                )),
                _ => None,
            }
        }
    }

    #[test]
    fn evaluate_all_fills_omissions_in_order() {
        let agent = AgentState::new(AgentId(1), Some(TeamId(1)), Vec2::ZERO, AgentStats::default())
            .snapshot();
        let ctx = build_context(
            &agent,
            &[],
            &BattlefieldBounds::default(),
            &DecisionConfig::default(),
        )
        .unwrap();

        let scores = MeleeOnly.evaluate_all(&ctx);
        assert_eq!(scores.len(), 8);
        assert_eq!(scores[0].weighted_score(), 4.0);
        assert_eq!(scores[2].kind, ActionKind::Move);
        assert_eq!(scores[2].weighted_score(), 0.0);
        assert!(scores[1..].iter().all(|s| s.weighted_score() == 0.0));
    }

    #[test]
    fn kinds_parse_from_names() {
        assert_eq!("aggressive".parse(), Ok(EvaluatorKind::Aggressive));
        assert_eq!(
            EvaluatorKind::Default
                .build(&DecisionConfig::default())
                .name(),
            "default"
        );
    }
}
