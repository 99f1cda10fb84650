//! Aggressive evaluator: closes distance and commits to attacks.
//!
//! Only attacks, movement and retreat are re-scored; everything else is
//! delegated to [`DefaultEvaluator`]. The critical-health emergency retreat is
//! kept so a dying agent still disengages.

use crate::action::ActionKind;
use crate::decision::{ActionEvaluator, ActionScore, DecisionContext, DefaultEvaluator, Priority};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AggressiveEvaluator {
    base: DefaultEvaluator,
}

impl AggressiveEvaluator {
    pub fn new(critical_health: f32) -> Self {
        Self {
            base: DefaultEvaluator::new(critical_health),
        }
    }
}

impl Default for AggressiveEvaluator {
    fn default() -> Self {
        Self {
            base: DefaultEvaluator::default(),
        }
    }
}

impl ActionEvaluator for AggressiveEvaluator {
    fn name(&self) -> &'static str {
        "aggressive"
    }

    fn evaluate(&self, kind: ActionKind, ctx: &DecisionContext) -> Option<ActionScore> {
        let stats = &ctx.agent().stats;
        let distance = ctx.distance_to_nearest_enemy();

        let score = match kind {
            ActionKind::AttackMelee => match distance {
                Some(d) if d <= stats.melee_range => ActionScore::new(
                    kind,
                    0.9 + ctx.health_fraction() * 0.1,
                    Priority::High,
                    0.9,
                    "enemy in reach",
                ),
                _ => return self.base.evaluate(kind, ctx),
            },
            ActionKind::AttackRanged => match distance {
                Some(d) if d <= stats.attack_range => ActionScore::new(
                    kind,
                    0.75,
                    Priority::High,
                    0.75,
                    "enemy in sight",
                ),
                _ => return self.base.evaluate(kind, ctx),
            },
            ActionKind::Move => match distance {
                Some(d) if d > stats.melee_range => {
                    ActionScore::new(kind, 0.8, Priority::High, 0.8, "charge")
                }
                _ => return self.base.evaluate(kind, ctx),
            },
            ActionKind::Retreat if !self.base.is_critical(ctx) => {
                ActionScore::new(kind, 0.05, Priority::Low, 0.9, "never retreat while healthy")
            }
            _ => return self.base.evaluate(kind, ctx),
        };
        Some(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecisionConfig;
    use crate::decision::build_context;
    use crate::state::{AgentId, AgentSnapshot, AgentState, AgentStats, BattlefieldBounds, TeamId, Vec2};

    fn snap(id: u32, team: u32, x: f32, health: f32) -> AgentSnapshot {
        AgentState::new(
            AgentId(id),
            Some(TeamId(team)),
            Vec2::new(x, 0.0),
            AgentStats::default(),
        )
        .with_health(health)
        .snapshot()
    }

    fn best(agent: &AgentSnapshot, visible: &[AgentSnapshot]) -> ActionScore {
        let ctx = build_context(
            agent,
            visible,
            &BattlefieldBounds::default(),
            &DecisionConfig::default(),
        )
        .unwrap();
        let mut best: Option<ActionScore> = None;
        for score in AggressiveEvaluator::default().evaluate_all(&ctx) {
            if best
                .as_ref()
                .is_none_or(|b| score.weighted_score() > b.weighted_score())
            {
                best = Some(score);
            }
        }
        best.unwrap()
    }

    #[test]
    fn charges_when_outnumbered_but_healthy() {
        let top = best(
            &snap(1, 1, 0.0, 90.0),
            &[snap(2, 2, 140.0, 100.0), snap(3, 2, -140.0, 100.0)],
        );
        assert_eq!(top.kind, ActionKind::Move);
    }

    #[test]
    fn still_retreats_at_critical_health() {
        let top = best(&snap(1, 1, 0.0, 10.0), &[snap(2, 2, 20.0, 100.0)]);
        assert_eq!(top.kind, ActionKind::Retreat);
        assert_eq!(top.priority, Priority::Emergency);
    }
}
