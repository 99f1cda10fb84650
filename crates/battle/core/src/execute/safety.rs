//! Execution-time safety validation.
//!
//! Runs against the live battlefield immediately before mutation, because the
//! state may have changed since the decision was made. Checks are cumulative
//! by [`ValidationLevel`]:
//!
//! | Level    | Adds |
//! |----------|------|
//! | Basic    | agent exists and is alive, bounds and action are well-formed |
//! | Standard | target existence, liveness and range; capability; cooldown; bounds |
//! | Strict   | health and position consistency; full feasibility re-derivation |
//! | Paranoid | snapshot/live identity, stats, velocity, energy and hostility cross-checks |

use crate::action::{Action, ActionKind};
use crate::config::DecisionConfig;
use crate::decision::{FeasibilityValidator, ValidationResult, build_context};
use crate::execute::{ExecutionContext, ValidationLevel};
use crate::state::{AgentState, Battlefield, Capabilities};

#[derive(Clone, Debug, Default)]
pub struct SafetyValidator {
    decision: DecisionConfig,
}

impl SafetyValidator {
    /// `decision` is used for the context rebuilt at Strict and above.
    pub fn new(decision: DecisionConfig) -> Self {
        Self { decision }
    }

    pub fn validate(&self, ctx: &ExecutionContext<'_>) -> ValidationResult {
        let mut result = ValidationResult::valid();
        let field: &Battlefield = &*ctx.battlefield;
        let id = ctx.agent.id;

        // ====================================================================
        // Basic
        // ====================================================================
        let Some(live) = field.agent(id) else {
            return ValidationResult::invalid(format!("agent {id} not found"));
        };
        if !live.alive {
            return ValidationResult::invalid(format!("agent {id} is not alive"));
        }
        if !field.bounds.is_well_formed() {
            return ValidationResult::invalid("battlefield bounds are malformed");
        }
        match ctx.action {
            Action::AttackMelee { target } | Action::AttackRanged { target } => {
                result.require(target != id, || format!("agent {id} cannot target itself"));
            }
            Action::Move { destination } => {
                result.require(destination.is_finite(), || {
                    "move destination is not finite".into()
                });
            }
            _ => {}
        }
        if ctx.level == ValidationLevel::Basic || !result.is_valid() {
            return result;
        }

        // ====================================================================
        // Standard
        // ====================================================================
        self.check_standard(&mut result, &ctx.action, live, field);
        if ctx.level == ValidationLevel::Standard {
            return result;
        }

        // ====================================================================
        // Strict
        // ====================================================================
        result.require(
            live.health.is_consistent() && live.health.current <= live.stats.max_health,
            || {
                format!(
                    "health {:.1} outside [0, {:.1}]",
                    live.health.current, live.stats.max_health
                )
            },
        );
        result.require(field.bounds.contains(live.position), || {
            format!(
                "position ({:.1}, {:.1}) outside the battlefield",
                live.position.x, live.position.y
            )
        });
        result.require(live.alive == (live.health.current > 0.0), || {
            "alive flag disagrees with health".into()
        });
        if result.is_valid() {
            self.rederive_feasibility(&mut result, &ctx.action, live, field);
        }
        if ctx.level == ValidationLevel::Strict {
            return result;
        }

        // ====================================================================
        // Paranoid
        // ====================================================================
        let snapshot = &ctx.agent;
        result.require(snapshot.team == live.team, || {
            format!("agent {id} changed team since the decision")
        });
        result.require(snapshot.stats == live.stats, || {
            format!("agent {id} stats changed since the decision")
        });
        result.require(live.stats.is_consistent(), || "agent stats are inconsistent".into());
        result.require(live.velocity.is_finite(), || "velocity is not finite".into());
        result.require(live.energy.is_consistent(), || {
            format!("energy {:.1} is inconsistent", live.energy.current)
        });
        if let Some(target) = ctx.action.target()
            && let Some(other) = field.agent(target)
        {
            let hostile = matches!((live.team, other.team), (Some(a), Some(b)) if a != b);
            result.require(hostile, || format!("target {target} is not hostile"));
        }
        result
    }

    fn check_standard(
        &self,
        result: &mut ValidationResult,
        action: &Action,
        live: &AgentState,
        field: &Battlefield,
    ) {
        let kind = action.kind();
        let movable = live.capabilities.contains(Capabilities::CAN_MOVE);

        match *action {
            Action::AttackMelee { target } | Action::AttackRanged { target } => {
                result.require(live.capabilities.contains(Capabilities::CAN_ATTACK), || {
                    "agent cannot attack".into()
                });
                cooldown(result, kind, live);
                match field.agent(target) {
                    None => result.push(format!("target {target} not found")),
                    Some(other) if !other.alive => {
                        result.push(format!("target {target} is not alive"));
                    }
                    Some(other) => {
                        let distance = live.position.distance_to(other.position);
                        let range = live.stats.range_of(kind);
                        result.require(distance <= range, || {
                            format!(
                                "target {target} at {distance:.1} is beyond {kind} range {range:.1}"
                            )
                        });
                    }
                }
            }
            Action::Move { destination } => {
                result.require(movable, || "agent cannot move".into());
                result.require(field.bounds.contains(destination), || {
                    "move destination is outside the battlefield".into()
                });
            }
            Action::Retreat { .. } => {
                result.require(movable, || "agent cannot move".into());
            }
            Action::UseSpecial { .. } => cooldown(result, kind, live),
            Action::Dodge | Action::Defend | Action::Cooperate => {}
        }
    }

    /// Full decision-time feasibility against a freshly built context.
    fn rederive_feasibility(
        &self,
        result: &mut ValidationResult,
        action: &Action,
        live: &AgentState,
        field: &Battlefield,
    ) {
        let snapshot = live.snapshot();
        let visible = field.visible_to(live.id);
        match build_context(&snapshot, &visible, &field.bounds, &self.decision) {
            Ok(fresh) => {
                result.merge(FeasibilityValidator::new().is_legal(action, &snapshot, &fresh));
            }
            Err(e) => result.push(e.to_string()),
        }
    }
}

fn cooldown(result: &mut ValidationResult, kind: ActionKind, live: &AgentState) {
    let remaining = live.cooldowns.remaining(kind);
    result.require(remaining == 0, || {
        format!("{kind} on cooldown for {remaining} more tick(s)")
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AgentId, AgentStats, TeamId, Vec2};

    fn agent(id: u32, team: u32, x: f32) -> AgentState {
        AgentState::new(
            AgentId(id),
            Some(TeamId(team)),
            Vec2::new(x, 0.0),
            AgentStats::default(),
        )
    }

    fn check(field: &mut Battlefield, action: Action, level: ValidationLevel) -> ValidationResult {
        let snapshot = field.snapshot(AgentId(1)).unwrap_or_else(|| agent(1, 1, 0.0).snapshot());
        let ctx = ExecutionContext::new(action, snapshot, field, level);
        SafetyValidator::default().validate(&ctx)
    }

    #[test]
    fn basic_rejects_missing_agent_and_self_target() {
        let mut empty = Battlefield::default();
        let verdict = check(&mut empty, Action::Defend, ValidationLevel::Basic);
        assert_eq!(verdict.errors(), ["agent #1 not found"]);

        let mut field = Battlefield::default().with_agent(agent(1, 1, 0.0));
        let verdict = check(
            &mut field,
            Action::AttackMelee { target: AgentId(1) },
            ValidationLevel::Basic,
        );
        assert!(!verdict.is_valid());
    }

    #[test]
    fn basic_skips_range_check_standard_does_not() {
        let mut field = Battlefield::default()
            .with_agent(agent(1, 1, 0.0))
            .with_agent(agent(2, 2, 200.0));
        let melee = Action::AttackMelee { target: AgentId(2) };
        assert!(check(&mut field, melee, ValidationLevel::Basic).is_valid());
        assert!(!check(&mut field, melee, ValidationLevel::Standard).is_valid());
    }

    #[test]
    fn strict_catches_inconsistent_health() {
        let mut broken = agent(1, 1, 0.0);
        broken.health.current = 150.0;
        let mut field = Battlefield::default().with_agent(broken);
        assert!(check(&mut field, Action::Defend, ValidationLevel::Standard).is_valid());
        assert!(!check(&mut field, Action::Defend, ValidationLevel::Strict).is_valid());
    }

    #[test]
    fn strict_rederives_feasibility() {
        // cooperate with nobody around passes Standard but not Strict
        let mut field = Battlefield::default().with_agent(agent(1, 1, 0.0));
        assert!(check(&mut field, Action::Cooperate, ValidationLevel::Standard).is_valid());
        let verdict = check(&mut field, Action::Cooperate, ValidationLevel::Strict);
        assert_eq!(verdict.errors(), ["no allies visible"]);
    }

    #[test]
    fn paranoid_requires_hostile_target() {
        let mut field = Battlefield::default()
            .with_agent(agent(1, 1, 0.0))
            .with_agent(agent(2, 1, 10.0));
        let melee = Action::AttackMelee { target: AgentId(2) };
        assert!(check(&mut field, melee, ValidationLevel::Standard).is_valid());
        let verdict = check(&mut field, melee, ValidationLevel::Paranoid);
        assert!(verdict.errors().iter().any(|e| e.contains("not hostile")));
    }
}
