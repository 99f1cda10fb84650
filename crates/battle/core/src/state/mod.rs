//! Battlefield state: agents, geometry, and timed effects.
//!
//! The pipeline reads agents only through [`AgentSnapshot`] values during
//! decision-making and mutates [`AgentState`] records through the
//! [`Battlefield`] during execution.

mod agent;
mod battlefield;
mod common;
mod geometry;
mod status;

pub use agent::{
    AgentSnapshot, AgentState, AgentStats, Capabilities, Cooldowns, SpecialAbility,
};
pub use battlefield::{Battlefield, BattlefieldError};
pub use common::{AgentId, ResourceMeter, TeamId, Tick};
pub use geometry::{BattlefieldBounds, CardinalDirection, Vec2};
pub use status::{MAX_STATUS_EFFECTS, StatusEffect, StatusEffects, StatusKind};
