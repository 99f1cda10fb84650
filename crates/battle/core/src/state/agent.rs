//! Agent state records.
//!
//! [`AgentState`] is the mutable record stored in the [`super::Battlefield`].
//! [`AgentSnapshot`] is the value view handed to the decision pipeline: it is
//! copied out at context-creation time and never aliases live state.

use bitflags::bitflags;
use strum::EnumCount;

use crate::action::ActionKind;
use crate::state::{AgentId, ResourceMeter, StatusEffects, StatusKind, TeamId, Tick, Vec2};

bitflags! {
    /// What an agent is physically able to do.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Capabilities: u8 {
        const CAN_ATTACK = 0b0000_0001;
        const CAN_MOVE   = 0b0000_0010;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities::all()
    }
}

/// Special ability dispatched by the `use-special` action.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpecialAbility {
    /// Restore `fraction` of maximum health.
    SelfHeal { fraction: f32, cost: f32 },
    /// Multiply movement speed by `multiplier` for `duration` ticks.
    Sprint {
        multiplier: f32,
        duration: u64,
        cost: f32,
    },
}

impl SpecialAbility {
    pub const fn name(&self) -> &'static str {
        match self {
            SpecialAbility::SelfHeal { .. } => "self_heal",
            SpecialAbility::Sprint { .. } => "sprint",
        }
    }

    /// Energy consumed per use.
    pub const fn cost(&self) -> f32 {
        match self {
            SpecialAbility::SelfHeal { cost, .. } | SpecialAbility::Sprint { cost, .. } => *cost,
        }
    }
}

impl Default for SpecialAbility {
    fn default() -> Self {
        SpecialAbility::SelfHeal {
            fraction: 0.2,
            cost: 30.0,
        }
    }
}

/// Static combat statistics.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentStats {
    pub max_health: f32,
    pub max_energy: f32,
    /// Distance per tick.
    pub speed: f32,
    pub attack_damage: f32,
    /// Flat damage reduction per hit.
    pub defense: f32,
    /// Base probability of evading an incoming hit.
    pub evasion: f32,
    pub melee_range: f32,
    pub attack_range: f32,
    pub vision_range: f32,
    /// Cooldown in ticks after any attack.
    pub attack_cooldown: u32,
    /// Cooldown in ticks after using the special ability.
    pub special_cooldown: u32,
    pub special: SpecialAbility,
}

impl AgentStats {
    /// Longest reach of any attack.
    pub fn max_attack_range(&self) -> f32 {
        self.melee_range.max(self.attack_range)
    }

    /// Range of the given attack kind (0 for non-attacks).
    pub fn range_of(&self, kind: ActionKind) -> f32 {
        match kind {
            ActionKind::AttackMelee => self.melee_range,
            ActionKind::AttackRanged => self.attack_range,
            _ => 0.0,
        }
    }

    pub fn is_consistent(&self) -> bool {
        let values = [
            self.max_health,
            self.max_energy,
            self.speed,
            self.attack_damage,
            self.defense,
            self.melee_range,
            self.attack_range,
            self.vision_range,
        ];
        values.iter().all(|v| v.is_finite() && *v >= 0.0)
            && self.max_health > 0.0
            && (0.0..=1.0).contains(&self.evasion)
    }
}

impl Default for AgentStats {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            max_energy: 100.0,
            speed: 50.0,
            attack_damage: 20.0,
            defense: 5.0,
            evasion: 0.1,
            melee_range: 30.0,
            attack_range: 120.0,
            vision_range: 150.0,
            attack_cooldown: 1,
            special_cooldown: 5,
            special: SpecialAbility::default(),
        }
    }
}

/// Remaining cooldown ticks per action kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cooldowns([u32; ActionKind::COUNT]);

impl Cooldowns {
    pub fn remaining(&self, kind: ActionKind) -> u32 {
        self.0[kind.index()]
    }

    pub fn is_ready(&self, kind: ActionKind) -> bool {
        self.remaining(kind) == 0
    }

    pub fn start(&mut self, kind: ActionKind, ticks: u32) {
        self.0[kind.index()] = ticks;
    }

    /// Advances every cooldown by one tick.
    pub fn tick_down(&mut self) {
        for remaining in self.0.iter_mut() {
            *remaining = remaining.saturating_sub(1);
        }
    }
}

/// Mutable agent record owned by the battlefield.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentState {
    pub id: AgentId,
    pub team: Option<TeamId>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: ResourceMeter,
    pub energy: ResourceMeter,
    pub stats: AgentStats,
    pub capabilities: Capabilities,
    pub cooldowns: Cooldowns,
    pub status: StatusEffects,
    pub alive: bool,
}

impl AgentState {
    /// Creates a healthy agent at `position` with full health and energy.
    pub fn new(id: AgentId, team: Option<TeamId>, position: Vec2, stats: AgentStats) -> Self {
        Self {
            id,
            team,
            position,
            velocity: Vec2::ZERO,
            health: ResourceMeter::full(stats.max_health),
            energy: ResourceMeter::full(stats.max_energy),
            stats,
            capabilities: Capabilities::default(),
            cooldowns: Cooldowns::default(),
            status: StatusEffects::empty(),
            alive: true,
        }
    }

    /// Sets current health (builder pattern).
    #[must_use]
    pub fn with_health(mut self, current: f32) -> Self {
        self.health.current = current;
        self.alive = current > 0.0;
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Value snapshot for the decision pipeline.
    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            team: self.team,
            position: self.position,
            velocity: self.velocity,
            health: self.health,
            energy: self.energy,
            stats: self.stats,
            capabilities: self.capabilities,
            cooldowns: self.cooldowns,
            status: self.status.clone(),
            alive: self.alive,
        }
    }

    /// Applies `amount` damage and updates the alive flag.
    /// Returns true if this hit killed the agent.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if !self.alive {
            return false;
        }
        self.health.drain(amount);
        if self.health.current <= 0.0 {
            self.alive = false;
            self.velocity = Vec2::ZERO;
            return true;
        }
        false
    }

    /// Effective evasion probability at `now`, including the dodge bonus.
    pub fn effective_evasion(&self, now: Tick) -> f32 {
        let bonus = self.status.magnitude(StatusKind::Evasive, now).unwrap_or(0.0);
        (self.stats.evasion + bonus).clamp(0.0, 1.0)
    }

    /// Effective movement speed at `now`, including haste.
    pub fn effective_speed(&self, now: Tick) -> f32 {
        let multiplier = self.status.magnitude(StatusKind::Hasted, now).unwrap_or(1.0);
        self.stats.speed * multiplier.max(1.0)
    }

    /// Fraction of incoming damage that is absorbed at `now`.
    pub fn damage_reduction(&self, now: Tick) -> f32 {
        self.status
            .magnitude(StatusKind::Guarded, now)
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }

    /// Multiplier on outgoing damage at `now`.
    pub fn damage_multiplier(&self, now: Tick) -> f32 {
        1.0 + self.status.magnitude(StatusKind::Rallied, now).unwrap_or(0.0).max(0.0)
    }
}

/// Read-only value view of an agent, taken atomically at one point in time.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub team: Option<TeamId>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: ResourceMeter,
    pub energy: ResourceMeter,
    pub stats: AgentStats,
    pub capabilities: Capabilities,
    pub cooldowns: Cooldowns,
    pub status: StatusEffects,
    pub alive: bool,
}

impl AgentSnapshot {
    pub fn health_fraction(&self) -> f32 {
        self.health.fraction()
    }

    pub fn can_attack(&self) -> bool {
        self.alive && self.capabilities.contains(Capabilities::CAN_ATTACK)
    }

    pub fn can_move(&self) -> bool {
        self.alive && self.capabilities.contains(Capabilities::CAN_MOVE)
    }

    pub fn distance_to(&self, other: &AgentSnapshot) -> f32 {
        self.position.distance_to(other.position)
    }

    /// Both agents belong to the same team (neutral agents have no allies).
    pub fn is_ally_of(&self, other: &AgentSnapshot) -> bool {
        self.id != other.id && matches!((self.team, other.team), (Some(a), Some(b)) if a == b)
    }

    /// Both agents belong to different teams (neutral agents have no enemies).
    pub fn is_enemy_of(&self, other: &AgentSnapshot) -> bool {
        self.id != other.id && matches!((self.team, other.team), (Some(a), Some(b)) if a != b)
    }
}
