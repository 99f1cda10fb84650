//! Tick-driven battle runtime.
//!
//! Modules:
//! - [`simulation`]: the [`Simulation`] loop and its [`SimulationBuilder`]
//! - [`report`]: per-tick and end-of-battle reports
//! - [`error`]: [`RuntimeError`] and the crate [`Result`] alias
//!
//! Each tick visits living agents in ascending id order. An agent decides
//! against the current battlefield and its action executes immediately, so
//! later agents in the same tick observe earlier agents' effects. The tick
//! then advances (cooldowns and status effects age by one).
pub mod error;
pub mod report;
pub mod simulation;

pub use error::{Result, RuntimeError};
pub use report::{BattleOutcome, StopReason, TickEntry, TickReport};
pub use simulation::{Simulation, SimulationBuilder};
