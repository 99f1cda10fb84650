//! Decision-time legality checks.
//!
//! Purely advisory: nothing here mutates state. Every rule is independent and
//! all failing rules are reported, in rule order.

use crate::action::{Action, ActionKind};
use crate::decision::{DecisionContext, ValidationResult};
use crate::state::{AgentId, AgentSnapshot};

#[derive(Clone, Copy, Debug, Default)]
pub struct FeasibilityValidator;

impl FeasibilityValidator {
    pub fn new() -> Self {
        Self
    }

    /// Legal subset of `candidates`, preserving order.
    pub fn filter(
        &self,
        candidates: &[Action],
        agent: &AgentSnapshot,
        ctx: &DecisionContext,
    ) -> Vec<Action> {
        candidates
            .iter()
            .filter(|action| {
                let verdict = self.is_legal(action, agent, ctx);
                if !verdict.is_valid() {
                    tracing::debug!(
                        agent = %agent.id,
                        action = %action,
                        reasons = ?verdict.errors(),
                        "filtered illegal action"
                    );
                }
                verdict.is_valid()
            })
            .copied()
            .collect()
    }

    pub fn is_legal(
        &self,
        action: &Action,
        agent: &AgentSnapshot,
        ctx: &DecisionContext,
    ) -> ValidationResult {
        let mut result = ValidationResult::valid();
        if !agent.alive {
            result.push(format!("agent {} is not alive", agent.id));
            return result;
        }

        let kind = action.kind();
        match *action {
            Action::AttackMelee { target } | Action::AttackRanged { target } => {
                check_attack(&mut result, kind, target, agent, ctx);
            }
            Action::Move { destination } => {
                result.require(agent.can_move(), || "agent cannot move".into());
                result.require(ctx.bounds().contains(destination), || {
                    format!(
                        "destination ({:.1}, {:.1}) is outside the battlefield",
                        destination.x, destination.y
                    )
                });
            }
            // Retreat degrades to the best available direction instead of
            // requiring a fully clear escape route.
            Action::Retreat { .. } => {
                result.require(agent.can_move(), || "agent cannot move".into());
            }
            Action::Dodge | Action::Defend => {}
            Action::UseSpecial { ability } => {
                check_cooldown(&mut result, kind, agent);
                result.require(agent.energy.current >= ability.cost(), || {
                    format!(
                        "{} needs {:.0} energy, agent has {:.0}",
                        ability.name(),
                        ability.cost(),
                        agent.energy.current
                    )
                });
            }
            Action::Cooperate => {
                result.require(!ctx.allies().is_empty(), || "no allies visible".into());
            }
        }
        result
    }
}

fn check_cooldown(result: &mut ValidationResult, kind: ActionKind, agent: &AgentSnapshot) {
    let remaining = agent.cooldowns.remaining(kind);
    result.require(remaining == 0, || {
        format!("{kind} on cooldown for {remaining} more tick(s)")
    });
}

fn check_attack(
    result: &mut ValidationResult,
    kind: ActionKind,
    target: AgentId,
    agent: &AgentSnapshot,
    ctx: &DecisionContext,
) {
    result.require(agent.can_attack(), || "agent cannot attack".into());
    check_cooldown(result, kind, agent);

    match ctx.enemies().iter().find(|e| e.id == target) {
        Some(enemy) => {
            let range = agent.stats.range_of(kind);
            let distance = agent.distance_to(enemy);
            result.require(distance <= range, || {
                format!("target {target} at {distance:.1} is beyond {kind} range {range:.1}")
            });
        }
        None => result.push(format!("target {target} is not a visible live enemy")),
    }
}
