//! Execution results and the status state machine.
//!
//! ```text
//! Pending ──► Validating ──► Executing ──► Success | Failed | Partial
//!    │            │
//!    │            └──► Blocked
//!    └────────────┴──► Cancelled
//! ```

use std::time::Duration;

use crate::action::{Action, ActionKind};
use crate::execute::ExecutionFault;
use crate::state::{AgentId, AgentSnapshot, Tick, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Validating,
    Executing,
    Success,
    Failed,
    Blocked,
    Cancelled,
    Partial,
}

impl ActionStatus {
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Success | Self::Failed | Self::Blocked | Self::Cancelled | Self::Partial
        )
    }

    pub const fn can_transition_to(self, next: ActionStatus) -> bool {
        use ActionStatus::*;
        matches!(
            (self, next),
            (Pending, Validating)
                | (Pending, Cancelled)
                | (Validating, Executing)
                | (Validating, Blocked)
                | (Validating, Cancelled)
                | (Executing, Success)
                | (Executing, Failed)
                | (Executing, Partial)
        )
    }
}

/// A single observable change made by an action.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Effect {
    DamageDealt { target: AgentId, amount: f32 },
    Evaded { target: AgentId },
    Knockback { target: AgentId, distance: f32 },
    TargetDefeated { target: AgentId },
    Moved { from: Vec2, to: Vec2 },
    /// Requested position was outside the battlefield and was clamped.
    Clamped { requested: Vec2, actual: Vec2 },
    VelocityChanged { velocity: Vec2 },
    EvasionBonus { bonus: f32, until: Tick },
    DamageReduction { reduction: f32, until: Tick },
    SpeedBonus { multiplier: f32, until: Tick },
    Healed { amount: f32 },
    EnergySpent { amount: f32 },
    CooldownStarted { kind: ActionKind, ticks: u32 },
    RalliedAlly { ally: AgentId, bonus: f32, until: Tick },
    AllyOutOfRange { ally: AgentId, distance: f32 },
}

/// Structured outcome of one execution. Always well-formed and, once
/// returned by the executor, always in a terminal status.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ActionResult {
    pub action: Action,
    pub agent_id: AgentId,
    pub status: ActionStatus,
    /// Every status entered, in order, starting with `Pending`.
    pub trail: Vec<ActionStatus>,
    /// Battlefield tick the execution ran in.
    pub tick: Tick,
    /// Live state of the acting agent before validation, if it existed.
    pub pre_state: Option<AgentSnapshot>,
    /// Live state of the acting agent once effects ran. `None` unless the
    /// result reached `Executing`.
    pub post_state: Option<AgentSnapshot>,
    pub validation_duration: Duration,
    pub execution_duration: Duration,
    pub validation_errors: Vec<String>,
    pub primary_effect: Option<Effect>,
    pub secondary_effects: Vec<Effect>,
    pub fault: Option<ExecutionFault>,
}

impl ActionResult {
    pub fn new(action: Action, agent_id: AgentId, tick: Tick) -> Self {
        Self {
            action,
            agent_id,
            status: ActionStatus::Pending,
            trail: vec![ActionStatus::Pending],
            tick,
            pre_state: None,
            post_state: None,
            validation_duration: Duration::ZERO,
            execution_duration: Duration::ZERO,
            validation_errors: Vec::new(),
            primary_effect: None,
            secondary_effects: Vec::new(),
            fault: None,
        }
    }

    /// Moves to `next` if the state machine allows it. Illegal transitions are
    /// rejected and leave the result unchanged.
    pub fn transition(&mut self, next: ActionStatus) -> bool {
        if !self.status.can_transition_to(next) {
            tracing::error!(
                agent = %self.agent_id,
                from = %self.status,
                to = %next,
                "rejected illegal status transition"
            );
            return false;
        }
        self.status = next;
        self.trail.push(next);
        true
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Success or partial success.
    pub fn applied(&self) -> bool {
        matches!(self.status, ActionStatus::Success | ActionStatus::Partial)
    }

    /// Primary effect followed by secondary effects.
    pub fn effects(&self) -> impl Iterator<Item = &Effect> {
        self.primary_effect.iter().chain(self.secondary_effects.iter())
    }

    /// Human-readable failure reason for non-applied results.
    pub fn reason(&self) -> Option<String> {
        if let Some(fault) = &self.fault {
            return Some(fault.to_string());
        }
        if !self.validation_errors.is_empty() {
            return Some(self.validation_errors.join("; "));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executing_cannot_be_cancelled() {
        assert!(ActionStatus::Pending.can_transition_to(ActionStatus::Cancelled));
        assert!(ActionStatus::Validating.can_transition_to(ActionStatus::Cancelled));
        assert!(!ActionStatus::Executing.can_transition_to(ActionStatus::Cancelled));
    }

    #[test]
    fn terminal_states_have_no_exit() {
        use ActionStatus::*;
        let all = [
            Pending, Validating, Executing, Success, Failed, Blocked, Cancelled, Partial,
        ];
        for from in all.iter().filter(|s| s.is_terminal()) {
            assert!(all.iter().all(|to| !from.can_transition_to(*to)));
        }
    }

    #[test]
    fn transition_records_trail() {
        let mut result = ActionResult::new(Action::Defend, AgentId(1), Tick(0));
        assert!(result.transition(ActionStatus::Validating));
        assert!(!result.transition(ActionStatus::Success));
        assert!(result.transition(ActionStatus::Executing));
        assert!(result.transition(ActionStatus::Success));
        assert_eq!(
            result.trail,
            vec![
                ActionStatus::Pending,
                ActionStatus::Validating,
                ActionStatus::Executing,
                ActionStatus::Success
            ]
        );
        assert!(result.applied());
    }
}
