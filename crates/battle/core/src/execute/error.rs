use crate::error::{ErrorSeverity, PipelineError};
use crate::state::AgentId;

/// Unexpected failure while mutating the battlefield.
///
/// Faults never escape the executor; they are stored on a `Failed`
/// [`super::ActionResult`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ExecutionFault {
    #[error("acting agent {0} vanished before execution")]
    AgentVanished(AgentId),

    #[error("target {0} vanished before execution")]
    TargetVanished(AgentId),

    #[error("target {0} is no longer alive")]
    TargetNotAlive(AgentId),

    #[error("target {target} at {distance:.1} is beyond range {range:.1}")]
    OutOfRange {
        target: AgentId,
        distance: f32,
        range: f32,
    },

    #[error("insufficient energy: need {required:.0}, have {available:.0}")]
    InsufficientEnergy { required: f32, available: f32 },

    #[error("no ally within coordination range")]
    NoAlliesReachable,

    #[error("invalid geometry: {0}")]
    InvalidGeometry(&'static str),
}

impl PipelineError for ExecutionFault {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::TargetVanished(_)
            | Self::TargetNotAlive(_)
            | Self::OutOfRange { .. }
            | Self::NoAlliesReachable => {
                ErrorSeverity::Recoverable
            }
            Self::InsufficientEnergy { .. } => ErrorSeverity::Validation,
            Self::AgentVanished(_) | Self::InvalidGeometry(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AgentVanished(_) => "EXEC_AGENT_VANISHED",
            Self::TargetVanished(_) => "EXEC_TARGET_VANISHED",
            Self::TargetNotAlive(_) => "EXEC_TARGET_NOT_ALIVE",
            Self::OutOfRange { .. } => "EXEC_OUT_OF_RANGE",
            Self::InsufficientEnergy { .. } => "EXEC_INSUFFICIENT_ENERGY",
            Self::NoAlliesReachable => "EXEC_NO_ALLIES_REACHABLE",
            Self::InvalidGeometry(_) => "EXEC_INVALID_GEOMETRY",
        }
    }
}
