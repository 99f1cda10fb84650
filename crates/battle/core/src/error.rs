//! Common error infrastructure for battle-core.
//!
//! The pipeline distinguishes four outcomes that are easy to conflate:
//!
//! - [`ContextError`]: malformed input to context construction. A programmer
//!   error; returned loudly by [`crate::build_context`], absorbed into the
//!   fallback path by [`crate::DecisionMaker::decide`].
//! - Validation failures: expected and recoverable, reported as ordered reason
//!   strings inside [`crate::ValidationResult`] and `Blocked` results.
//! - [`crate::ExecutionFault`]: unexpected failure during mutation, captured
//!   as a `Failed` result.
//! - Fallback: not an error. Recorded on the decision and in history.

use crate::state::AgentId;

/// Severity level of an error, used for logging priority and recovery strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// May succeed on a later tick with fresh state.
    Recoverable,

    /// Invalid input; retrying unchanged will fail again.
    Validation,

    /// Unexpected inconsistency; indicates a bug in a collaborator.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Uniform classification for all battle-core errors.
pub trait PipelineError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for metrics and tests.
    fn error_code(&self) -> &'static str;
}

/// Malformed input to context construction.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ContextError {
    #[error("agent {0} is not alive")]
    AgentNotAlive(AgentId),

    #[error("agent {0} has a non-finite position")]
    InvalidPosition(AgentId),

    #[error("battlefield bounds are malformed")]
    InvalidBounds,
}

impl PipelineError for ContextError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ContextError::AgentNotAlive(_) => ErrorSeverity::Validation,
            ContextError::InvalidPosition(_) | ContextError::InvalidBounds => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ContextError::AgentNotAlive(_) => "CONTEXT_AGENT_NOT_ALIVE",
            ContextError::InvalidPosition(_) => "CONTEXT_INVALID_POSITION",
            ContextError::InvalidBounds => "CONTEXT_INVALID_BOUNDS",
        }
    }
}
