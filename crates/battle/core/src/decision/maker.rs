//! Decision orchestration: context → evaluate → filter → rank → record.

use crate::action::{Action, ActionKind};
use crate::config::DecisionConfig;
use crate::decision::{
    ActionEvaluator, ActionScore, DecisionContext, DecisionHistory, DefaultEvaluator,
    EvaluatorKind, FeasibilityValidator, Priority, build_context, planner,
};
use crate::state::{AgentSnapshot, BattlefieldBounds};

/// Reasoning attached to every substituted fallback decision.
pub const FALLBACK_REASONING: &str = "fallback: no legal action available";

/// The outcome of one [`DecisionMaker::decide`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub score: ActionScore,
    /// True when no legal action existed and the configured default was substituted.
    pub fallback: bool,
}

/// Per-agent decision maker owning its evaluator and history.
///
/// # Tie-break
///
/// Candidates are ranked by [`ActionScore::weighted_score`] with a strict
/// comparison, visited in [`ActionKind`] declaration order. On equal weighted
/// scores the earlier-declared action wins, so identical inputs always yield
/// the identical action.
#[derive(Debug)]
pub struct DecisionMaker {
    config: DecisionConfig,
    evaluator: Box<dyn ActionEvaluator>,
    validator: FeasibilityValidator,
    history: DecisionHistory,
}

impl DecisionMaker {
    pub fn new(config: DecisionConfig, evaluator: Box<dyn ActionEvaluator>) -> Self {
        let history = DecisionHistory::new(config.history_capacity, config.history_compaction);
        Self {
            config,
            evaluator,
            validator: FeasibilityValidator::new(),
            history,
        }
    }

    pub fn with_kind(kind: EvaluatorKind, config: DecisionConfig) -> Self {
        let evaluator = kind.build(&config);
        Self::new(config, evaluator)
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &dyn ActionEvaluator {
        self.evaluator.as_ref()
    }

    pub fn history(&self) -> &DecisionHistory {
        &self.history
    }

    /// Builds a context with this maker's configuration.
    pub fn context(
        &self,
        agent: &AgentSnapshot,
        visible: &[AgentSnapshot],
        bounds: &BattlefieldBounds,
    ) -> Result<DecisionContext, crate::error::ContextError> {
        build_context(agent, visible, bounds, &self.config)
    }

    /// Picks the best legal action for `agent`. Never fails: when nothing is
    /// legal (or the context cannot be built) the configured fallback is
    /// returned with [`Decision::fallback`] set.
    pub fn decide(
        &mut self,
        agent: &AgentSnapshot,
        visible: &[AgentSnapshot],
        bounds: &BattlefieldBounds,
    ) -> Decision {
        let decision = match self.context(agent, visible, bounds) {
            Ok(ctx) => self.select(agent, &ctx),
            Err(e) => {
                if agent.alive {
                    tracing::error!(agent = %agent.id, error = %e, "cannot build decision context");
                } else {
                    tracing::debug!(agent = %agent.id, "agent is dead, substituting fallback");
                }
                self.fallback(agent, None)
            }
        };

        self.history
            .push(decision.action, decision.score.clone(), decision.fallback);
        decision
    }

    fn select(&self, agent: &AgentSnapshot, ctx: &DecisionContext) -> Decision {
        let scores = self.evaluator.evaluate_all(ctx);
        for score in &scores {
            tracing::debug!(agent = %agent.id, "  {score}");
        }

        let planned: Vec<Action> = ActionKind::all()
            .filter_map(|kind| planner::plan(kind, ctx))
            .collect();
        let legal = self.validator.filter(&planned, agent, ctx);

        let mut best: Option<(Action, &ActionScore)> = None;
        for action in legal {
            let score = &scores[action.kind().index()];
            if best.is_none_or(|(_, b)| score.weighted_score() > b.weighted_score()) {
                best = Some((action, score));
            }
        }

        match best {
            Some((action, score)) => {
                tracing::debug!(
                    agent = %agent.id,
                    action = %action,
                    score = score.weighted_score(),
                    evaluator = self.evaluator.name(),
                    "selected action"
                );
                Decision {
                    action,
                    score: score.clone(),
                    fallback: false,
                }
            }
            None => self.fallback(agent, Some(ctx)),
        }
    }

    fn fallback(&self, agent: &AgentSnapshot, ctx: Option<&DecisionContext>) -> Decision {
        let kind = self.config.fallback_action;
        let action = ctx
            .and_then(|ctx| planner::plan(kind, ctx))
            .unwrap_or_else(|| static_fallback(kind, agent));
        tracing::warn!(agent = %agent.id, action = %action, "no legal action, using fallback");
        Decision {
            action,
            score: ActionScore::new(
                action.kind(),
                0.0,
                Priority::Minimal,
                1.0,
                FALLBACK_REASONING,
            ),
            fallback: true,
        }
    }
}

impl Default for DecisionMaker {
    fn default() -> Self {
        let config = DecisionConfig::default();
        let evaluator = Box::new(DefaultEvaluator::new(config.critical_health));
        Self::new(config, evaluator)
    }
}

/// Fallback action that needs no context. Attacks have no context-free form
/// and degrade to defend.
fn static_fallback(kind: ActionKind, agent: &AgentSnapshot) -> Action {
    match kind {
        ActionKind::Move => Action::Move {
            destination: agent.position,
        },
        ActionKind::Dodge => Action::Dodge,
        ActionKind::Retreat => Action::Retreat { heading: None },
        ActionKind::UseSpecial => Action::UseSpecial {
            ability: agent.stats.special,
        },
        ActionKind::Cooperate => Action::Cooperate,
        ActionKind::Defend | ActionKind::AttackMelee | ActionKind::AttackRanged => Action::Defend,
    }
}
