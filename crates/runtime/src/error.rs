use battle_core::AgentId;
use thiserror::Error;

/// Runtime errors
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Agent {0} is not part of this simulation")]
    UnknownAgent(AgentId),

    #[error("Simulation has no agents")]
    EmptyRoster,

    #[error("Battlefield is required to build a simulation")]
    MissingBattlefield,

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
