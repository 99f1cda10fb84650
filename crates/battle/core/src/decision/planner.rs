//! Resolves scored action kinds into concrete actions.

use crate::action::{Action, ActionKind};
use crate::decision::DecisionContext;

/// Preferred engagement distance as a fraction of melee range.
pub const ENGAGEMENT_RANGE_FACTOR: f32 = 0.7;

/// Fills in the parameters for `kind` from the context.
///
/// Returns `None` when the kind has nothing to act on (an attack with no
/// enemy in sight).
pub fn plan(kind: ActionKind, ctx: &DecisionContext) -> Option<Action> {
    let action = match kind {
        ActionKind::AttackMelee => Action::AttackMelee {
            target: ctx.nearest_enemy()?.id,
        },
        ActionKind::AttackRanged => Action::AttackRanged {
            target: ctx.nearest_enemy()?.id,
        },
        ActionKind::Move => Action::Move {
            destination: ctx.bounds().clamp(move_destination(ctx)),
        },
        ActionKind::Dodge => Action::Dodge,
        ActionKind::Defend => Action::Defend,
        ActionKind::Retreat => Action::Retreat {
            heading: ctx.escape_direction(),
        },
        ActionKind::UseSpecial => Action::UseSpecial {
            ability: ctx.agent().stats.special,
        },
        ActionKind::Cooperate => Action::Cooperate,
    };
    Some(action)
}

/// Point at engagement range from the nearest enemy along the line towards
/// the agent, or the battlefield centre when no enemy is visible.
fn move_destination(ctx: &DecisionContext) -> crate::state::Vec2 {
    let me = ctx.agent();
    match ctx.nearest_enemy() {
        Some(enemy) => {
            let optimal = me.stats.melee_range * ENGAGEMENT_RANGE_FACTOR;
            let away = (me.position - enemy.position).normalize();
            enemy.position + away * optimal
        }
        None => ctx.bounds().center(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecisionConfig;
    use crate::decision::build_context;
    use crate::state::{
        AgentId, AgentSnapshot, AgentState, AgentStats, BattlefieldBounds, CardinalDirection,
        TeamId, Vec2,
    };

    fn snap(id: u32, team: u32, x: f32, y: f32) -> AgentSnapshot {
        AgentState::new(
            AgentId(id),
            Some(TeamId(team)),
            Vec2::new(x, y),
            AgentStats::default(),
        )
        .snapshot()
    }

    fn ctx(agent: &AgentSnapshot, visible: &[AgentSnapshot]) -> DecisionContext {
        build_context(
            agent,
            visible,
            &BattlefieldBounds::default(),
            &DecisionConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn attacks_target_nearest_enemy() {
        let me = snap(1, 1, 0.0, 0.0);
        let c = ctx(&me, &[snap(3, 2, 80.0, 0.0), snap(2, 2, 40.0, 0.0)]);
        assert_eq!(
            plan(ActionKind::AttackMelee, &c),
            Some(Action::AttackMelee { target: AgentId(2) })
        );
    }

    #[test]
    fn attacks_without_enemy_are_unplannable() {
        let me = snap(1, 1, 0.0, 0.0);
        let c = ctx(&me, &[]);
        assert_eq!(plan(ActionKind::AttackRanged, &c), None);
        assert_eq!(plan(ActionKind::Defend, &c), Some(Action::Defend));
    }

    #[test]
    fn move_stops_at_engagement_range() {
        let me = snap(1, 1, 0.0, 0.0);
        let c = ctx(&me, &[snap(2, 2, 100.0, 0.0)]);
        let Some(Action::Move { destination }) = plan(ActionKind::Move, &c) else {
            panic!("expected a move");
        };
        assert!((destination.x - 79.0).abs() < 1e-4);
        assert_eq!(destination.y, 0.0);
    }

    #[test]
    fn idle_move_heads_for_centre() {
        let me = snap(1, 1, 200.0, -100.0);
        let c = ctx(&me, &[]);
        assert_eq!(
            plan(ActionKind::Move, &c),
            Some(Action::Move {
                destination: Vec2::ZERO
            })
        );
    }

    #[test]
    fn retreat_uses_escape_direction() {
        let me = snap(1, 1, 0.0, 0.0);
        let c = ctx(&me, &[snap(2, 2, 0.0, 20.0)]);
        assert_eq!(
            plan(ActionKind::Retreat, &c),
            Some(Action::Retreat {
                heading: Some(CardinalDirection::South)
            })
        );
    }
}
