//! Inputs to a single execution.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::action::Action;
use crate::state::{AgentSnapshot, Battlefield};

/// Depth of execution-time safety re-validation. Each level includes every
/// check of the levels before it.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ValidationLevel {
    /// Agent exists and is alive; the action itself is well-formed.
    Basic,
    /// Adds target, range, capability, cooldown and bounds checks.
    #[default]
    Standard,
    /// Adds state consistency and a full feasibility re-derivation.
    Strict,
    /// Adds cross-field consistency of every value read.
    Paranoid,
}

/// Caller-side withdrawal flag, shared between the caller and the executor.
///
/// Cancellation is honoured only before execution begins.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Everything the executor needs for one action.
///
/// `agent` is the snapshot the decision was made from; the battlefield is the
/// live (possibly newer) state that will be mutated.
#[derive(Debug)]
pub struct ExecutionContext<'a> {
    pub action: Action,
    pub agent: AgentSnapshot,
    pub battlefield: &'a mut Battlefield,
    pub level: ValidationLevel,
    pub cancel: Option<CancelToken>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        action: Action,
        agent: AgentSnapshot,
        battlefield: &'a mut Battlefield,
        level: ValidationLevel,
    ) -> Self {
        Self {
            action,
            agent,
            battlefield,
            level,
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}
