//! The action executor: safety validation, mutation and result assembly.

use std::time::{Duration, Instant};

use crate::config::{DecisionConfig, ExecutionConfig};
use crate::env::PcgRng;
use crate::error::PipelineError;
use crate::execute::effects::Effects;
use crate::execute::{ActionResult, ActionStatus, ExecutionContext, SafetyValidator};

/// Running totals of execution outcomes and time spent. Diagnostics only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecutionStats {
    pub total: u64,
    pub success: u64,
    pub partial: u64,
    pub failed: u64,
    pub blocked: u64,
    pub cancelled: u64,
    /// Wall-clock time spent in safety validation.
    pub validation_time: Duration,
    /// Wall-clock time spent applying effects.
    pub execution_time: Duration,
}

impl ExecutionStats {
    pub fn record(&mut self, result: &ActionResult) {
        self.total += 1;
        self.validation_time += result.validation_duration;
        self.execution_time += result.execution_duration;
        match result.status {
            ActionStatus::Success => self.success += 1,
            ActionStatus::Partial => self.partial += 1,
            ActionStatus::Failed => self.failed += 1,
            ActionStatus::Blocked => self.blocked += 1,
            ActionStatus::Cancelled => self.cancelled += 1,
            ActionStatus::Pending | ActionStatus::Validating | ActionStatus::Executing => {}
        }
    }

    fn rate(&self, count: u64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64
        }
    }

    /// Fraction of executions that fully succeeded.
    pub fn success_rate(&self) -> f64 {
        self.rate(self.success)
    }

    pub fn failure_rate(&self) -> f64 {
        self.rate(self.failed)
    }

    pub fn block_rate(&self) -> f64 {
        self.rate(self.blocked)
    }

    fn average(&self, time: Duration) -> Duration {
        if self.total == 0 {
            Duration::ZERO
        } else {
            time / u32::try_from(self.total).unwrap_or(u32::MAX)
        }
    }

    pub fn average_validation_time(&self) -> Duration {
        self.average(self.validation_time)
    }

    pub fn average_execution_time(&self) -> Duration {
        self.average(self.execution_time)
    }

    /// Outcome counters without the timing totals, which vary run to run.
    pub fn counts(&self) -> [u64; 6] {
        [
            self.total,
            self.success,
            self.partial,
            self.failed,
            self.blocked,
            self.cancelled,
        ]
    }
}

/// Executes decided actions against the live battlefield.
///
/// `execute` never panics and never returns an error: every outcome, including
/// rejected or faulted ones, is a terminal [`ActionResult`].
#[derive(Debug)]
pub struct ActionExecutor {
    config: ExecutionConfig,
    safety: SafetyValidator,
    rng: PcgRng,
    /// Per-execution counter mixed into random seeds.
    nonce: u64,
    stats: ExecutionStats,
}

impl ActionExecutor {
    pub fn new(config: ExecutionConfig, decision: DecisionConfig) -> Self {
        Self {
            config,
            safety: SafetyValidator::new(decision),
            rng: PcgRng,
            nonce: 0,
            stats: ExecutionStats::default(),
        }
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    pub fn execute(&mut self, ctx: ExecutionContext<'_>) -> ActionResult {
        let mut result = ActionResult::new(ctx.action, ctx.agent.id, ctx.battlefield.tick);
        result.pre_state = ctx.battlefield.snapshot(ctx.agent.id);
        self.run(ctx, &mut result);
        debug_assert!(result.is_terminal());
        self.stats.record(&result);
        result
    }

    fn run(&mut self, ctx: ExecutionContext<'_>, result: &mut ActionResult) {
        if ctx.is_cancelled() {
            result.transition(ActionStatus::Cancelled);
            return;
        }
        result.transition(ActionStatus::Validating);

        let validation_started = Instant::now();
        let verdict = self.safety.validate(&ctx);
        result.validation_duration = validation_started.elapsed();
        if !verdict.is_valid() {
            tracing::warn!(
                agent = %ctx.agent.id,
                action = %ctx.action,
                level = %ctx.level,
                reasons = ?verdict.errors(),
                "action blocked by safety validation"
            );
            result.validation_errors = verdict.into_errors();
            result.transition(ActionStatus::Blocked);
            return;
        }

        if ctx.is_cancelled() {
            result.transition(ActionStatus::Cancelled);
            return;
        }
        result.transition(ActionStatus::Executing);

        let execution_started = Instant::now();
        self.nonce = self.nonce.wrapping_add(1);
        let mut effects = Effects {
            field: ctx.battlefield,
            config: &self.config,
            rng: &self.rng,
            nonce: self.nonce,
        };
        let outcome = effects.apply(ctx.agent.id, &ctx.action);
        result.execution_duration = execution_started.elapsed();
        result.post_state = effects.field.snapshot(ctx.agent.id);

        match outcome {
            Ok(outcome) => {
                result.primary_effect = outcome.primary;
                result.secondary_effects = outcome.secondary;
                let status = if outcome.partial {
                    ActionStatus::Partial
                } else {
                    ActionStatus::Success
                };
                result.transition(status);
                tracing::debug!(
                    agent = %result.agent_id,
                    action = %result.action,
                    status = %status,
                    effect = ?result.primary_effect,
                    "action executed"
                );
            }
            Err(fault) => {
                tracing::error!(
                    agent = %result.agent_id,
                    action = %result.action,
                    code = fault.error_code(),
                    severity = fault.severity().as_str(),
                    "execution fault: {fault}"
                );
                result.fault = Some(fault);
                result.transition(ActionStatus::Failed);
            }
        }
    }
}

impl Default for ActionExecutor {
    fn default() -> Self {
        Self::new(ExecutionConfig::default(), DecisionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::execute::{CancelToken, Effect, ExecutionFault, ValidationLevel};
    use crate::state::{
        AgentId, AgentState, AgentStats, Battlefield, BattlefieldBounds, CardinalDirection,
        SpecialAbility, StatusKind, TeamId, Tick, Vec2,
    };

    fn stats() -> AgentStats {
        AgentStats {
            evasion: 0.0,
            ..AgentStats::default()
        }
    }

    fn agent(id: u32, team: u32, x: f32, y: f32) -> AgentState {
        AgentState::new(AgentId(id), Some(TeamId(team)), Vec2::new(x, y), stats())
    }

    fn run(field: &mut Battlefield, action: Action, level: ValidationLevel) -> ActionResult {
        let snapshot = field.snapshot(AgentId(1)).unwrap();
        ActionExecutor::default().execute(ExecutionContext::new(action, snapshot, field, level))
    }

    #[test]
    fn melee_hit_damages_and_knocks_back() {
        let mut field = Battlefield::default()
            .with_agent(agent(1, 1, 0.0, 0.0))
            .with_agent(agent(2, 2, 20.0, 0.0));
        let result = run(
            &mut field,
            Action::AttackMelee { target: AgentId(2) },
            ValidationLevel::Standard,
        );

        assert_eq!(result.status, ActionStatus::Success);
        assert_eq!(
            result.primary_effect,
            Some(Effect::DamageDealt {
                target: AgentId(2),
                amount: 15.0
            })
        );
        assert!(result
            .secondary_effects
            .iter()
            .any(|e| matches!(e, Effect::Knockback { .. })));

        let target = field.agent(AgentId(2)).unwrap();
        assert_eq!(target.health.current, 85.0);
        assert_eq!(target.position, Vec2::new(25.0, 0.0));
        assert!(!field.agent(AgentId(1)).unwrap().cooldowns.is_ready(crate::action::ActionKind::AttackMelee));
    }

    #[test]
    fn guarded_target_takes_reduced_damage() {
        let mut target = agent(2, 2, 100.0, 0.0);
        target.status.apply(StatusKind::Guarded, 0.5, Tick(2));
        let mut field = Battlefield::default()
            .with_agent(agent(1, 1, 0.0, 0.0))
            .with_agent(target);
        let result = run(
            &mut field,
            Action::AttackRanged { target: AgentId(2) },
            ValidationLevel::Standard,
        );
        // (20 × 0.8 − 5) × 0.5
        assert_eq!(
            result.primary_effect,
            Some(Effect::DamageDealt {
                target: AgentId(2),
                amount: 5.5
            })
        );
    }

    #[test]
    fn lethal_hit_records_defeat() {
        let mut field = Battlefield::default()
            .with_agent(agent(1, 1, 0.0, 0.0))
            .with_agent(agent(2, 2, 10.0, 0.0).with_health(5.0));
        let result = run(
            &mut field,
            Action::AttackMelee { target: AgentId(2) },
            ValidationLevel::Strict,
        );
        assert!(result
            .secondary_effects
            .contains(&Effect::TargetDefeated { target: AgentId(2) }));
        assert!(!field.agent(AgentId(2)).unwrap().alive);
    }

    #[test]
    fn out_of_range_at_basic_fails_without_mutation() {
        let mut field = Battlefield::default()
            .with_agent(agent(1, 1, 0.0, 0.0))
            .with_agent(agent(2, 2, 300.0, 0.0));
        let before = field.clone();
        let result = run(
            &mut field,
            Action::AttackMelee { target: AgentId(2) },
            ValidationLevel::Basic,
        );
        assert_eq!(result.status, ActionStatus::Failed);
        assert!(matches!(result.fault, Some(ExecutionFault::OutOfRange { .. })));
        assert_eq!(field, before);
    }

    #[test]
    fn move_is_limited_by_speed() {
        let mut field = Battlefield::default().with_agent(agent(1, 1, 0.0, 0.0));
        let result = run(
            &mut field,
            Action::Move {
                destination: Vec2::new(200.0, 0.0),
            },
            ValidationLevel::Standard,
        );
        assert_eq!(result.status, ActionStatus::Success);
        let moved = field.agent(AgentId(1)).unwrap();
        assert_eq!(moved.position, Vec2::new(50.0, 0.0));
        assert_eq!(moved.velocity, Vec2::new(50.0, 0.0));
    }

    #[test]
    fn retreat_moves_away_from_threats_and_clamps() {
        let mut field = Battlefield::default()
            .with_agent(agent(1, 1, 480.0, 0.0))
            .with_agent(agent(2, 2, 400.0, 0.0));
        let result = run(&mut field, Action::Retreat { heading: None }, ValidationLevel::Standard);

        assert_eq!(result.status, ActionStatus::Success);
        assert_eq!(field.agent(AgentId(1)).unwrap().position, Vec2::new(500.0, 0.0));
        assert!(result
            .secondary_effects
            .iter()
            .any(|e| matches!(e, Effect::Clamped { .. })));
    }

    #[test]
    fn special_without_energy_fails() {
        let mut poor = agent(1, 1, 0.0, 0.0);
        poor.energy.current = 5.0;
        let mut field = Battlefield::default().with_agent(poor);
        let result = run(
            &mut field,
            Action::UseSpecial {
                ability: SpecialAbility::default(),
            },
            ValidationLevel::Standard,
        );
        assert_eq!(result.status, ActionStatus::Failed);
        assert!(matches!(
            result.fault,
            Some(ExecutionFault::InsufficientEnergy { .. })
        ));
    }

    #[test]
    fn self_heal_restores_health() {
        let mut field = Battlefield::default().with_agent(agent(1, 1, 0.0, 0.0).with_health(50.0));
        let result = run(
            &mut field,
            Action::UseSpecial {
                ability: SpecialAbility::default(),
            },
            ValidationLevel::Standard,
        );
        assert_eq!(result.primary_effect, Some(Effect::Healed { amount: 20.0 }));
        let healed = field.agent(AgentId(1)).unwrap();
        assert_eq!(healed.health.current, 70.0);
        assert_eq!(healed.energy.current, 70.0);
    }

    #[test]
    fn cooperate_is_partial_when_some_allies_are_far() {
        let mut field = Battlefield::default()
            .with_agent(agent(1, 1, 0.0, 0.0))
            .with_agent(agent(2, 1, 50.0, 0.0))
            .with_agent(agent(3, 1, 0.0, 140.0));
        let result = run(&mut field, Action::Cooperate, ValidationLevel::Standard);

        assert_eq!(result.status, ActionStatus::Partial);
        assert!(field.agent(AgentId(2)).unwrap().status.has(StatusKind::Rallied, Tick(0)));
        assert!(!field.agent(AgentId(3)).unwrap().status.has(StatusKind::Rallied, Tick(0)));
    }

    #[test]
    fn cancellation_before_execution() {
        let mut field = Battlefield::default().with_agent(agent(1, 1, 0.0, 0.0));
        let token = CancelToken::new();
        token.cancel();
        let snapshot = field.snapshot(AgentId(1)).unwrap();
        let mut executor = ActionExecutor::default();
        let result = executor.execute(
            ExecutionContext::new(Action::Defend, snapshot, &mut field, ValidationLevel::Basic)
                .with_cancel(token),
        );
        assert_eq!(result.status, ActionStatus::Cancelled);
        assert_eq!(result.trail, vec![ActionStatus::Pending, ActionStatus::Cancelled]);
        assert!(field.agent(AgentId(1)).unwrap().status.is_empty());
        assert_eq!(executor.stats().cancelled, 1);
    }

    #[test]
    fn dodge_grants_evasion_until_it_expires() {
        let mut field = Battlefield::default().with_agent(agent(1, 1, 0.0, 0.0));
        let result = run(&mut field, Action::Dodge, ValidationLevel::Standard);
        assert_eq!(
            result.primary_effect,
            Some(Effect::EvasionBonus {
                bonus: 0.25,
                until: Tick(2)
            })
        );
        assert_eq!(field.agent(AgentId(1)).unwrap().effective_evasion(Tick(0)), 0.25);

        field.advance_tick();
        assert!(field.agent(AgentId(1)).unwrap().status.has(StatusKind::Evasive, field.tick));
        field.advance_tick();
        let dodger = field.agent(AgentId(1)).unwrap();
        assert!(!dodger.status.has(StatusKind::Evasive, field.tick));
        assert_eq!(dodger.effective_evasion(field.tick), 0.0);
    }

    #[test]
    fn defend_grants_guard_until_it_expires() {
        let mut field = Battlefield::default().with_agent(agent(1, 1, 0.0, 0.0));
        let result = run(&mut field, Action::Defend, ValidationLevel::Standard);
        assert_eq!(
            result.primary_effect,
            Some(Effect::DamageReduction {
                reduction: 0.5,
                until: Tick(2)
            })
        );
        let guard = field.agent(AgentId(1)).unwrap();
        assert_eq!(guard.status.magnitude(StatusKind::Guarded, Tick(1)), Some(0.5));

        field.advance_tick();
        field.advance_tick();
        assert!(field.agent(AgentId(1)).unwrap().status.is_empty());
    }

    #[test]
    fn sprint_multiplies_speed_for_its_duration() {
        let mut field = Battlefield::default().with_agent(agent(1, 1, 0.0, 0.0));
        let sprint = SpecialAbility::Sprint {
            multiplier: 2.0,
            duration: 3,
            cost: 20.0,
        };
        let result = run(
            &mut field,
            Action::UseSpecial { ability: sprint },
            ValidationLevel::Standard,
        );
        assert_eq!(
            result.primary_effect,
            Some(Effect::SpeedBonus {
                multiplier: 2.0,
                until: Tick(3)
            })
        );
        let runner = field.agent(AgentId(1)).unwrap();
        assert!(runner.status.has(StatusKind::Hasted, Tick(0)));
        assert_eq!(runner.effective_speed(Tick(0)), 100.0);
        assert_eq!(runner.effective_speed(Tick(3)), 50.0);
        assert_eq!(runner.energy.current, 80.0);

        let moved = run(
            &mut field,
            Action::Move {
                destination: Vec2::new(500.0, 0.0),
            },
            ValidationLevel::Standard,
        );
        assert_eq!(moved.status, ActionStatus::Success);
        assert_eq!(field.agent(AgentId(1)).unwrap().position, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn cooperate_fails_without_mutation_when_every_ally_is_far() {
        let mut field = Battlefield::default()
            .with_agent(agent(1, 1, 0.0, 0.0))
            .with_agent(agent(2, 1, 0.0, 140.0))
            .with_agent(agent(3, 1, -120.0, 0.0));
        let before = field.clone();
        let result = run(&mut field, Action::Cooperate, ValidationLevel::Basic);

        assert_eq!(result.status, ActionStatus::Failed);
        assert_eq!(result.fault, Some(ExecutionFault::NoAlliesReachable));
        assert_eq!(field, before);
    }

    #[test]
    fn malformed_bounds_fault_before_any_effect() {
        let mut field = Battlefield::default()
            .with_agent(agent(1, 1, 0.0, 0.0))
            .with_agent(agent(2, 2, 10.0, 0.0));
        field.bounds = BattlefieldBounds::new(10.0, -10.0, -10.0, 10.0);
        let before = field.clone();
        let config = ExecutionConfig::default();
        let rng = PcgRng;
        let mut effects = Effects {
            field: &mut field,
            config: &config,
            rng: &rng,
            nonce: 1,
        };

        for action in [
            Action::Retreat {
                heading: Some(CardinalDirection::North),
            },
            Action::Move {
                destination: Vec2::new(5.0, 5.0),
            },
            Action::AttackMelee { target: AgentId(2) },
        ] {
            assert!(matches!(
                effects.apply(AgentId(1), &action),
                Err(ExecutionFault::InvalidGeometry(_))
            ));
        }
        assert_eq!(field, before);
    }

    #[test]
    fn result_carries_pre_and_post_state() {
        let mut field = Battlefield::default().with_agent(agent(1, 1, 0.0, 0.0));
        let result = run(
            &mut field,
            Action::Move {
                destination: Vec2::new(30.0, 0.0),
            },
            ValidationLevel::Strict,
        );
        assert_eq!(result.tick, Tick(0));
        let pre = result.pre_state.as_ref().unwrap();
        let post = result.post_state.as_ref().unwrap();
        assert_eq!(pre.position, Vec2::ZERO);
        assert_eq!(post.position, Vec2::new(30.0, 0.0));
        assert_eq!(*post, field.snapshot(AgentId(1)).unwrap());
    }

    #[test]
    fn blocked_result_has_no_post_state() {
        let mut field = Battlefield::default()
            .with_agent(agent(1, 1, 0.0, 0.0))
            .with_agent(agent(2, 2, 300.0, 0.0));
        let result = run(
            &mut field,
            Action::AttackMelee { target: AgentId(2) },
            ValidationLevel::Standard,
        );
        assert_eq!(result.status, ActionStatus::Blocked);
        assert!(result.pre_state.is_some());
        assert_eq!(result.post_state, None);
        assert_eq!(result.execution_duration, Duration::ZERO);
    }

    #[test]
    fn stats_track_rates_and_time() {
        let mut success = ActionResult::new(Action::Defend, AgentId(1), Tick(0));
        success.status = ActionStatus::Success;
        success.validation_duration = Duration::from_millis(2);
        success.execution_duration = Duration::from_millis(6);
        let mut blocked = ActionResult::new(Action::Defend, AgentId(1), Tick(0));
        blocked.status = ActionStatus::Blocked;
        blocked.validation_duration = Duration::from_millis(4);

        let mut stats = ExecutionStats::default();
        assert_eq!(stats.average_execution_time(), Duration::ZERO);
        stats.record(&success);
        stats.record(&blocked);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.success_rate(), 0.5);
        assert_eq!(stats.block_rate(), 0.5);
        assert_eq!(stats.failure_rate(), 0.0);
        assert_eq!(stats.validation_time, Duration::from_millis(6));
        assert_eq!(stats.average_validation_time(), Duration::from_millis(3));
        assert_eq!(stats.average_execution_time(), Duration::from_millis(3));
        assert_eq!(stats.counts(), [2, 1, 0, 0, 1, 0]);
    }
}
