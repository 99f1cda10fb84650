//! Data-driven battle content and loaders.
//!
//! Provides loaders for the two file formats a battle is assembled from:
//! - Battle configuration (TOML): [`battle_core::BattleConfig`]
//! - Scenarios (RON): bounds, seed and the agent roster
//!
//! All loaders deserialize battle-core types directly through its `serde` feature.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{AgentSpec, ConfigLoader, LoadResult, Scenario, ScenarioLoader};
