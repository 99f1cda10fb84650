//! Tunable parameters for decision-making and execution.
//!
//! Every threshold the pipeline uses lives here with a documented default, so
//! that scenarios can override them from TOML without touching code.

use crate::action::ActionKind;
use crate::execute::ValidationLevel;

/// Parameters for context building, ranking and history.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecisionConfig {
    /// Immediate/distant threat split. `None` uses the agent's maximum attack range.
    pub threat_radius: Option<f32>,
    /// Angular sectors around the agent used for the surrounded test.
    pub surround_sectors: u8,
    /// Occupied sectors needed to count as surrounded.
    pub surround_threshold: u8,
    /// Distance to an edge that counts as near the boundary.
    pub boundary_margin: f32,
    /// How far each escape direction is projected.
    pub escape_lookahead: f32,
    /// A projected escape point within this distance of a threat is blocked.
    pub escape_safety_radius: f32,
    /// Health fraction below which retreat becomes an emergency.
    pub critical_health: f32,
    /// History size that triggers compaction.
    pub history_capacity: usize,
    /// History size kept after compaction.
    pub history_compaction: usize,
    /// Action substituted when nothing is legal.
    pub fallback_action: ActionKind,
}

impl DecisionConfig {
    pub const DEFAULT_SURROUND_SECTORS: u8 = 4;
    pub const DEFAULT_SURROUND_THRESHOLD: u8 = 3;
    pub const DEFAULT_BOUNDARY_MARGIN: f32 = 50.0;
    pub const DEFAULT_ESCAPE_LOOKAHEAD: f32 = 50.0;
    pub const DEFAULT_ESCAPE_SAFETY_RADIUS: f32 = 25.0;
    pub const DEFAULT_CRITICAL_HEALTH: f32 = 0.3;
    pub const DEFAULT_HISTORY_CAPACITY: usize = 100;
    pub const DEFAULT_HISTORY_COMPACTION: usize = 50;

    pub fn new() -> Self {
        Self {
            threat_radius: None,
            surround_sectors: Self::DEFAULT_SURROUND_SECTORS,
            surround_threshold: Self::DEFAULT_SURROUND_THRESHOLD,
            boundary_margin: Self::DEFAULT_BOUNDARY_MARGIN,
            escape_lookahead: Self::DEFAULT_ESCAPE_LOOKAHEAD,
            escape_safety_radius: Self::DEFAULT_ESCAPE_SAFETY_RADIUS,
            critical_health: Self::DEFAULT_CRITICAL_HEALTH,
            history_capacity: Self::DEFAULT_HISTORY_CAPACITY,
            history_compaction: Self::DEFAULT_HISTORY_COMPACTION,
            fallback_action: ActionKind::Defend,
        }
    }
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameters for safety validation and per-action effects.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExecutionConfig {
    /// Strictness used when a caller does not pick one explicitly.
    pub validation_level: ValidationLevel,
    /// Evasion probability added by dodge.
    pub dodge_bonus: f32,
    pub dodge_duration: u64,
    /// Fraction of incoming damage absorbed while defending.
    pub defend_reduction: f32,
    pub defend_duration: u64,
    /// Speed multiplier applied to a retreat move.
    pub retreat_speed_multiplier: f32,
    /// Distance a melee hit pushes the target.
    pub knockback_distance: f32,
    /// Ranged hits deal this fraction of base attack damage.
    pub ranged_damage_factor: f32,
    /// Allies within this distance receive the cooperate benefit.
    pub coordination_range: f32,
    /// Outgoing damage bonus granted by cooperate.
    pub rally_bonus: f32,
    pub rally_duration: u64,
    /// Floor for damage after defense.
    pub minimum_damage: f32,
}

impl ExecutionConfig {
    pub fn new() -> Self {
        Self {
            validation_level: ValidationLevel::Standard,
            dodge_bonus: 0.25,
            dodge_duration: 2,
            defend_reduction: 0.5,
            defend_duration: 2,
            retreat_speed_multiplier: 1.5,
            knockback_distance: 5.0,
            ranged_damage_factor: 0.8,
            coordination_range: 100.0,
            rally_bonus: 0.2,
            rally_duration: 3,
            minimum_damage: 1.0,
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level configuration for one battle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    pub decision: DecisionConfig,
    pub execution: ExecutionConfig,
    /// Upper bound on simulated ticks.
    pub max_ticks: u64,
}

impl BattleConfig {
    pub const DEFAULT_MAX_TICKS: u64 = 500;

    pub fn new() -> Self {
        Self {
            decision: DecisionConfig::new(),
            execution: ExecutionConfig::new(),
            max_ticks: Self::DEFAULT_MAX_TICKS,
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
