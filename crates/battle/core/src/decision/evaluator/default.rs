//! Balanced heuristic evaluator.
//!
//! Edge policies that callers rely on:
//!
//! - Below critical health, retreat scores `0.8 + (1 - health) × 0.2` at
//!   Emergency priority, which outranks any non-emergency score.
//! - Melee utility grows with health while the nearest enemy is within melee
//!   range (inclusive) and collapses to 0.1 at Low priority outside it.
//! - Being outnumbered or surrounded favours retreat at High priority. That
//!   retreat (at most 0.7 × High × 0.9) only wins while no enemy is in melee
//!   reach; a full-health melee swing (1.0 × High × 0.8) outranks it.
//! - With no enemy visible every combat action scores zero utility and
//!   movement dominates.

use crate::action::ActionKind;
use crate::decision::{ActionEvaluator, ActionScore, DecisionContext, Priority};

/// Preferred engagement distance as a fraction of melee range.
const OPTIMAL_RANGE_FACTOR: f32 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefaultEvaluator {
    critical_health: f32,
}

impl DefaultEvaluator {
    pub fn new(critical_health: f32) -> Self {
        Self { critical_health }
    }

    pub(crate) fn is_critical(&self, ctx: &DecisionContext) -> bool {
        ctx.health_fraction() < self.critical_health
    }

    fn retreat(&self, ctx: &DecisionContext) -> ActionScore {
        let kind = ActionKind::Retreat;
        let health = ctx.health_fraction();
        if self.is_critical(ctx) {
            ActionScore::new(
                kind,
                0.8 + (1.0 - health) * 0.2,
                Priority::Emergency,
                0.9,
                "critical health",
            )
        } else if ctx.is_surrounded() {
            ActionScore::new(kind, 0.7, Priority::High, 0.9, "surrounded")
        } else if ctx.is_outnumbered() {
            ActionScore::new(kind, 0.6, Priority::High, 0.9, "outnumbered")
        } else {
            ActionScore::new(kind, 0.1, Priority::Low, 0.9, "no reason to retreat")
        }
    }

    fn melee(&self, ctx: &DecisionContext) -> ActionScore {
        let kind = ActionKind::AttackMelee;
        let Some(distance) = ctx.distance_to_nearest_enemy() else {
            return ActionScore::new(kind, 0.0, Priority::Minimal, 0.0, "no enemy visible");
        };
        if distance <= ctx.agent().stats.melee_range {
            ActionScore::new(
                kind,
                0.8 + ctx.health_fraction() * 0.2,
                Priority::High,
                0.8,
                "enemy within melee range",
            )
        } else {
            ActionScore::new(kind, 0.1, Priority::Low, 0.8, "enemy out of melee range")
        }
    }

    fn ranged(&self, ctx: &DecisionContext) -> ActionScore {
        let kind = ActionKind::AttackRanged;
        let in_range = ctx
            .distance_to_nearest_enemy()
            .is_some_and(|d| d <= ctx.agent().stats.attack_range);
        if !in_range {
            return ActionScore::new(kind, 0.0, Priority::Minimal, 0.0, "no enemy in ranged range");
        }
        let pressed = !ctx.immediate_threats().is_empty();
        let positioning = if pressed { -0.2 } else { 0.3 };
        let priority = if pressed { Priority::Medium } else { Priority::High };
        ActionScore::new(
            kind,
            0.6 + positioning + ctx.health_fraction() * 0.1,
            priority,
            0.7,
            if pressed { "ranged under pressure" } else { "ranged from safety" },
        )
    }

    fn dodge(&self, ctx: &DecisionContext) -> ActionScore {
        let kind = ActionKind::Dodge;
        let threats = ctx.immediate_threats().len();
        if threats == 0 {
            return ActionScore::new(kind, 0.1, Priority::Minimal, 0.6, "nothing to dodge");
        }
        let priority = if self.is_critical(ctx) {
            Priority::High
        } else {
            Priority::Medium
        };
        ActionScore::new(
            kind,
            0.5 + 0.2 * threats as f32 + 0.3 * (1.0 - ctx.health_fraction()),
            priority,
            0.6,
            format!("{threats} immediate threat(s)"),
        )
    }

    fn defend(&self, ctx: &DecisionContext) -> ActionScore {
        let kind = ActionKind::Defend;
        let threats = ctx.immediate_threats().len();
        if threats == 0 {
            ActionScore::new(kind, 0.2, Priority::Low, 0.7, "no immediate threat")
        } else if ctx.is_surrounded() || threats >= 3 {
            ActionScore::new(
                kind,
                0.7 + 0.2 * (1.0 - ctx.health_fraction()),
                Priority::High,
                0.7,
                "heavy pressure",
            )
        } else {
            ActionScore::new(
                kind,
                0.4 + 0.1 * threats as f32,
                Priority::Medium,
                0.7,
                "under attack",
            )
        }
    }

    fn movement(&self, ctx: &DecisionContext) -> ActionScore {
        let kind = ActionKind::Move;
        let mut utility = 0.5;
        let reasoning = match ctx.distance_to_nearest_enemy() {
            Some(distance) => {
                let optimal = ctx.agent().stats.melee_range * OPTIMAL_RANGE_FACTOR;
                if distance > optimal * 1.5 {
                    utility += 0.3;
                    "closing distance"
                } else if distance < optimal * 0.5 {
                    utility += 0.2;
                    "opening distance"
                } else {
                    "holding position"
                }
            }
            None => {
                utility += 0.1;
                "no enemy visible"
            }
        };
        ActionScore::new(kind, utility, Priority::Medium, 0.8, reasoning)
    }

    fn special(&self, ctx: &DecisionContext) -> ActionScore {
        let kind = ActionKind::UseSpecial;
        let threats = ctx.immediate_threats().len();
        if threats == 0 {
            ActionScore::new(kind, 0.1, Priority::Low, 0.5, "no pressing need")
        } else {
            ActionScore::new(
                kind,
                0.4 + 0.1 * threats as f32,
                Priority::Medium,
                0.5,
                "special under pressure",
            )
        }
    }

    fn cooperate(&self, ctx: &DecisionContext) -> ActionScore {
        let kind = ActionKind::Cooperate;
        if ctx.allies().is_empty() {
            ActionScore::new(kind, 0.0, Priority::Minimal, 0.4, "no allies visible")
        } else if ctx.has_advantage() && !ctx.immediate_threats().is_empty() {
            ActionScore::new(kind, 0.5, Priority::Medium, 0.4, "press the advantage together")
        } else {
            ActionScore::new(kind, 0.2, Priority::Low, 0.4, "allies nearby")
        }
    }
}

impl Default for DefaultEvaluator {
    fn default() -> Self {
        Self::new(crate::config::DecisionConfig::DEFAULT_CRITICAL_HEALTH)
    }
}

impl ActionEvaluator for DefaultEvaluator {
    fn name(&self) -> &'static str {
        "default"
    }

    fn evaluate(&self, kind: ActionKind, ctx: &DecisionContext) -> Option<ActionScore> {
        let score = match kind {
            ActionKind::AttackMelee => self.melee(ctx),
            ActionKind::AttackRanged => self.ranged(ctx),
            ActionKind::Move => self.movement(ctx),
            ActionKind::Dodge => self.dodge(ctx),
            ActionKind::Defend => self.defend(ctx),
            ActionKind::Retreat => self.retreat(ctx),
            ActionKind::UseSpecial => self.special(ctx),
            ActionKind::Cooperate => self.cooperate(ctx),
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

    fn scores(agent: &AgentSnapshot, visible: &[AgentSnapshot]) -> Vec<ActionScore> {
        let ctx = build_context(
            agent,
            visible,
            &BattlefieldBounds::default(),
            &DecisionConfig::default(),
        )
        .unwrap();
        DefaultEvaluator::default().evaluate_all(&ctx)
    }

    fn score_of(scores: &[ActionScore], kind: ActionKind) -> &ActionScore {
        &scores[kind.index()]
    }

    #[test]
    fn critical_health_makes_retreat_emergency() {
        let s = scores(&snap(1, 1, 0.0, 15.0), &[snap(2, 2, 25.0, 100.0)]);
        let retreat = score_of(&s, ActionKind::Retreat);
        assert_eq!(retreat.priority, Priority::Emergency);
        assert!((retreat.utility - 0.97).abs() < 1e-6);
        let best_other = s
            .iter()
            .filter(|x| x.kind != ActionKind::Retreat)
            .map(ActionScore::weighted_score)
            .fold(0.0, f32::max);
        assert!(retreat.weighted_score() > best_other);
    }

    #[test]
    fn melee_collapses_out_of_range() {
        let in_range = scores(&snap(1, 1, 0.0, 100.0), &[snap(2, 2, 30.0, 100.0)]);
        let out_of_range = scores(&snap(1, 1, 0.0, 100.0), &[snap(2, 2, 31.0, 100.0)]);

        let near = score_of(&in_range, ActionKind::AttackMelee);
        let far = score_of(&out_of_range, ActionKind::AttackMelee);
        assert_eq!(near.utility, 1.0);
        assert_eq!(near.priority, Priority::High);
        assert_eq!(far.utility, 0.1);
        assert_eq!(far.priority, Priority::Low);
    }

    #[test]
    fn outnumbered_prefers_retreat_at_high() {
        let s = scores(
            &snap(1, 1, 0.0, 90.0),
            &[snap(2, 2, 140.0, 100.0), snap(3, 2, -140.0, 100.0)],
        );
        let retreat = score_of(&s, ActionKind::Retreat);
        assert_eq!(retreat.priority, Priority::High);
        assert!(retreat.weighted_score() > score_of(&s, ActionKind::AttackMelee).weighted_score());
    }

    #[test]
    fn no_enemies_zeroes_combat() {
        let s = scores(&snap(1, 1, 0.0, 100.0), &[]);
        for kind in [ActionKind::AttackMelee, ActionKind::AttackRanged] {
            assert_eq!(score_of(&s, kind).utility, 0.0);
        }
        assert_eq!(score_of(&s, ActionKind::Cooperate).utility, 0.0);
        let movement = score_of(&s, ActionKind::Move).weighted_score();
        assert!(s.iter().all(|x| x.weighted_score() <= movement));
    }

    #[test]
    fn ranged_prefers_safe_distance() {
        let s = scores(&snap(1, 1, 0.0, 100.0), &[snap(2, 2, 100.0, 100.0)]);
        let ranged = score_of(&s, ActionKind::AttackRanged);
        // 100 is inside the default threat radius (120), so the agent is pressed
        assert_eq!(ranged.priority, Priority::Medium);
        assert!((ranged.utility - 0.5).abs() < 1e-6);
    }
}
