//! Decision pipeline: context building, evaluation, feasibility and selection.

mod context;
mod evaluator;
mod feasibility;
mod history;
mod maker;
pub mod planner;
mod score;

pub use context::{DecisionContext, build_context};
pub use evaluator::{ActionEvaluator, AggressiveEvaluator, DefaultEvaluator, EvaluatorKind};
pub use feasibility::FeasibilityValidator;
pub use history::{DecisionHistory, DecisionRecord, HistorySummary};
pub use maker::{Decision, DecisionMaker, FALLBACK_REASONING};
pub use score::{ActionScore, Priority, ValidationResult};
