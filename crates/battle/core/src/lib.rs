//! Deterministic decision-and-execution pipeline for autonomous combat agents.
//!
//! `battle-core` turns one battlefield snapshot into one executed action per
//! agent per tick:
//!
//! ```text
//! Context → Evaluate → Validate → Select → Execute → Report
//! ```
//!
//! - [`decision::build_context`] derives an immutable [`DecisionContext`]
//! - an [`ActionEvaluator`] scores every [`ActionKind`] in the closed set
//! - the [`FeasibilityValidator`] drops illegal candidates
//! - the [`DecisionMaker`] ranks the survivors and records the winner
//! - the [`ActionExecutor`] re-validates through the [`SafetyValidator`] and
//!   mutates the [`Battlefield`], returning a typed [`ActionResult`]
//!
//! Every step is synchronous, in-memory and free of OS entropy, so identical
//! inputs always yield identical decisions and results.
pub mod action;
pub mod config;
pub mod decision;
pub mod env;
pub mod error;
pub mod execute;
pub mod state;

pub use action::{Action, ActionKind};
pub use config::{BattleConfig, DecisionConfig, ExecutionConfig};
pub use decision::{
    ActionEvaluator, ActionScore, AggressiveEvaluator, Decision, DecisionContext, DecisionHistory,
    DecisionMaker, DecisionRecord, DefaultEvaluator, EvaluatorKind, FeasibilityValidator,
    HistorySummary, Priority, ValidationResult, build_context,
};
pub use error::{ContextError, ErrorSeverity, PipelineError};
pub use execute::{
    ActionExecutor, ActionResult, ActionStatus, CancelToken, Effect, ExecutionContext,
    ExecutionFault, ExecutionStats, SafetyValidator, ValidationLevel,
};
pub use state::{
    AgentId, AgentSnapshot, AgentState, AgentStats, Battlefield, BattlefieldBounds, Capabilities,
    CardinalDirection, Cooldowns, ResourceMeter, SpecialAbility, StatusEffect, StatusEffects,
    StatusKind, TeamId, Tick, Vec2,
};
