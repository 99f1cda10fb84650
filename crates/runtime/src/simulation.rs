//! Synchronous tick loop driving decision and execution for every agent.
//!
//! [`Simulation`] owns the authoritative [`Battlefield`], one
//! [`DecisionMaker`] per agent and a shared [`ActionExecutor`]. Construction
//! goes through [`SimulationBuilder`].

use std::collections::BTreeMap;

use battle_core::{
    ActionExecutor, AgentId, BattleConfig, Battlefield, CancelToken, DecisionHistory,
    DecisionMaker, Effect, EvaluatorKind, ExecutionContext, ExecutionStats, Tick,
};
use tracing::{debug, info, warn};

use crate::error::{Result, RuntimeError};
use crate::report::{BattleOutcome, StopReason, TickEntry, TickReport};

pub struct Simulation {
    config: BattleConfig,
    battlefield: Battlefield,
    makers: BTreeMap<AgentId, DecisionMaker>,
    executor: ActionExecutor,
    cancel: CancelToken,
}

impl Simulation {
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::new()
    }

    /// Builds a simulation from a loaded scenario, honouring each agent's
    /// evaluator choice.
    #[cfg(feature = "scenarios")]
    pub fn from_scenario(scenario: &battle_content::Scenario, config: BattleConfig) -> Result<Self> {
        let battlefield = scenario
            .build_battlefield()
            .map_err(|e| RuntimeError::InvalidScenario(format!("{e:#}")))?;
        Self::builder()
            .config(config)
            .battlefield(battlefield)
            .evaluators(scenario.evaluators())
            .build()
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn battlefield(&self) -> &Battlefield {
        &self.battlefield
    }

    pub fn tick(&self) -> Tick {
        self.battlefield.tick
    }

    pub fn stats(&self) -> &ExecutionStats {
        self.executor.stats()
    }

    /// Token that withdraws every not-yet-executing action and stops [`Self::run`].
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn decision_history(&self, agent: AgentId) -> Result<&DecisionHistory> {
        self.makers
            .get(&agent)
            .map(DecisionMaker::history)
            .ok_or(RuntimeError::UnknownAgent(agent))
    }

    pub fn evaluator_name(&self, agent: AgentId) -> Result<&'static str> {
        self.makers
            .get(&agent)
            .map(|maker| maker.evaluator().name())
            .ok_or(RuntimeError::UnknownAgent(agent))
    }

    /// Returns why the battle is over, or `None` while it is still contested.
    pub fn verdict(&self) -> Option<StopReason> {
        match self.battlefield.living_teams().len() {
            0 => Some(StopReason::Annihilation),
            1 => Some(StopReason::Victory),
            _ => None,
        }
    }

    /// Runs one tick: every living agent, in ascending id order, decides
    /// against the current battlefield and executes immediately.
    pub fn step(&mut self) -> TickReport {
        let tick = self.battlefield.tick;
        let order: Vec<AgentId> = self
            .battlefield
            .agents()
            .filter(|agent| agent.alive)
            .map(|agent| agent.id)
            .collect();

        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        for id in order {
            // may have died earlier this tick
            let Some(snapshot) = self.battlefield.snapshot(id).filter(|s| s.alive) else {
                continue;
            };
            let Some(maker) = self.makers.get_mut(&id) else {
                warn!(agent = %id, "no decision maker registered, skipping");
                continue;
            };

            let visible = self.battlefield.visible_to(id);
            let decision = maker.decide(&snapshot, &visible, &self.battlefield.bounds);

            let ctx = ExecutionContext::new(
                decision.action,
                snapshot,
                &mut self.battlefield,
                self.config.execution.validation_level,
            )
            .with_cancel(self.cancel.clone());
            let result = self.executor.execute(ctx);

            for effect in result.effects() {
                if let Effect::TargetDefeated { target } = effect {
                    info!(tick = %tick, agent = %id, target = %target, "agent defeated");
                    report.defeated.push(*target);
                }
            }

            debug!(
                tick = %tick,
                agent = %id,
                action = %decision.action,
                fallback = decision.fallback,
                status = %result.status,
                "turn resolved"
            );
            report.entries.push(TickEntry {
                agent: id,
                decision,
                result,
            });
        }

        self.battlefield.advance_tick();
        debug!(
            tick = %tick,
            turns = report.entries.len(),
            fallbacks = report.fallbacks(),
            "tick complete"
        );
        report
    }

    /// Steps until one team remains, the tick limit is reached, or the
    /// cancel token fires.
    pub fn run(&mut self) -> BattleOutcome {
        self.run_with(|_| {})
    }

    /// Like [`Self::run`], handing every tick report to `observe`.
    pub fn run_with(&mut self, mut observe: impl FnMut(&TickReport)) -> BattleOutcome {
        info!(
            agents = self.battlefield.living_count(),
            teams = self.battlefield.living_teams().len(),
            max_ticks = self.config.max_ticks,
            "battle started"
        );

        let mut ticks = 0;
        let reason = loop {
            if self.cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if let Some(reason) = self.verdict() {
                break reason;
            }
            if ticks >= self.config.max_ticks {
                break StopReason::TickLimit;
            }
            let report = self.step();
            observe(&report);
            ticks += 1;
        };

        let winner = match reason {
            StopReason::Victory => self.battlefield.living_teams().first().copied(),
            _ => None,
        };
        let outcome = BattleOutcome {
            reason,
            winner,
            ticks,
            survivors: self
                .battlefield
                .agents()
                .filter(|agent| agent.alive)
                .map(|agent| agent.id)
                .collect(),
            stats: *self.executor.stats(),
        };
        info!(%outcome, "battle finished");
        outcome
    }
}

/// Builder for [`Simulation`].
pub struct SimulationBuilder {
    config: BattleConfig,
    battlefield: Option<Battlefield>,
    default_evaluator: EvaluatorKind,
    evaluators: BTreeMap<AgentId, EvaluatorKind>,
    cancel: Option<CancelToken>,
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self {
            config: BattleConfig::default(),
            battlefield: None,
            default_evaluator: EvaluatorKind::Default,
            evaluators: BTreeMap::new(),
            cancel: None,
        }
    }

    pub fn config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn battlefield(mut self, battlefield: Battlefield) -> Self {
        self.battlefield = Some(battlefield);
        self
    }

    /// Evaluator for agents without an explicit choice.
    pub fn default_evaluator(mut self, kind: EvaluatorKind) -> Self {
        self.default_evaluator = kind;
        self
    }

    pub fn evaluator(mut self, agent: AgentId, kind: EvaluatorKind) -> Self {
        self.evaluators.insert(agent, kind);
        self
    }

    pub fn evaluators(mut self, evaluators: BTreeMap<AgentId, EvaluatorKind>) -> Self {
        self.evaluators.extend(evaluators);
        self
    }

    /// Shares an externally owned cancel token.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn build(self) -> Result<Simulation> {
        let battlefield = self.battlefield.ok_or(RuntimeError::MissingBattlefield)?;
        if battlefield.is_empty() {
            return Err(RuntimeError::EmptyRoster);
        }
        if let Some(unknown) = self
            .evaluators
            .keys()
            .find(|id| battlefield.agent(**id).is_none())
        {
            return Err(RuntimeError::UnknownAgent(*unknown));
        }

        let makers = battlefield
            .ids()
            .map(|id| {
                let kind = self
                    .evaluators
                    .get(&id)
                    .copied()
                    .unwrap_or(self.default_evaluator);
                (id, DecisionMaker::with_kind(kind, self.config.decision.clone()))
            })
            .collect();
        let executor =
            ActionExecutor::new(self.config.execution.clone(), self.config.decision.clone());

        info!(
            agents = battlefield.len(),
            seed = battlefield.seed,
            level = %self.config.execution.validation_level,
            "simulation built"
        );

        Ok(Simulation {
            config: self.config,
            battlefield,
            makers,
            executor,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}
