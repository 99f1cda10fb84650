//! Battlefield: the reference agent store consumed by the pipeline.

use std::collections::BTreeMap;

use crate::state::{AgentId, AgentSnapshot, AgentState, BattlefieldBounds, TeamId, Tick};

/// Errors raised while populating a battlefield.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BattlefieldError {
    #[error("agent {0} already exists")]
    DuplicateAgent(AgentId),

    #[error("agent {0} is placed outside the battlefield bounds")]
    OutOfBounds(AgentId),
}

/// All agents plus static bounds and the battle clock.
///
/// Agents live in a `BTreeMap`, so every iteration is in ascending id order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battlefield {
    pub bounds: BattlefieldBounds,
    pub tick: Tick,
    /// Base seed for deterministic rolls.
    pub seed: u64,
    agents: BTreeMap<AgentId, AgentState>,
}

impl Battlefield {
    pub fn new(bounds: BattlefieldBounds, seed: u64) -> Self {
        Self {
            bounds,
            tick: Tick::ZERO,
            seed,
            agents: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, agent: AgentState) -> Result<(), BattlefieldError> {
        if self.agents.contains_key(&agent.id) {
            return Err(BattlefieldError::DuplicateAgent(agent.id));
        }
        if !self.bounds.contains(agent.position) {
            return Err(BattlefieldError::OutOfBounds(agent.id));
        }
        self.agents.insert(agent.id, agent);
        Ok(())
    }

    /// Inserts `agent` (builder pattern).
    ///
    /// # Panics
    ///
    /// Panics on a duplicate id or out-of-bounds placement. Intended for
    /// fixtures; use [`Battlefield::insert`] for untrusted rosters.
    #[must_use]
    pub fn with_agent(mut self, agent: AgentState) -> Self {
        if let Err(e) = self.insert(agent) {
            panic!("invalid battlefield fixture: {e}");
        }
        self
    }

    pub fn agent(&self, id: AgentId) -> Option<&AgentState> {
        self.agents.get(&id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut AgentState> {
        self.agents.get_mut(&id)
    }

    /// Removes an agent entirely (e.g. despawned by the simulation).
    pub fn remove(&mut self, id: AgentId) -> Option<AgentState> {
        self.agents.remove(&id)
    }

    pub fn snapshot(&self, id: AgentId) -> Option<AgentSnapshot> {
        self.agent(id).map(AgentState::snapshot)
    }

    pub fn agents(&self) -> impl Iterator<Item = &AgentState> {
        self.agents.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.agents.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Alive agents other than `id` within its vision range, ascending id.
    pub fn visible_to(&self, id: AgentId) -> Vec<AgentSnapshot> {
        let Some(viewer) = self.agent(id) else {
            return Vec::new();
        };
        let range = viewer.stats.vision_range;
        self.agents
            .values()
            .filter(|other| other.id != id && other.alive)
            .filter(|other| viewer.position.distance_to(other.position) <= range)
            .map(AgentState::snapshot)
            .collect()
    }

    /// Teams that still have at least one living member, ascending.
    pub fn living_teams(&self) -> Vec<TeamId> {
        let mut teams: Vec<TeamId> = self
            .agents
            .values()
            .filter(|a| a.alive)
            .filter_map(|a| a.team)
            .collect();
        teams.sort();
        teams.dedup();
        teams
    }

    pub fn living_count(&self) -> usize {
        self.agents.values().filter(|a| a.alive).count()
    }

    /// Ends the current tick: cooldowns tick down, expired statuses are pruned.
    pub fn advance_tick(&mut self) {
        self.tick = self.tick.next();
        let now = self.tick;
        for agent in self.agents.values_mut() {
            agent.cooldowns.tick_down();
            agent.status.expire(now);
        }
    }
}

impl Default for Battlefield {
    fn default() -> Self {
        Self::new(BattlefieldBounds::default(), 0)
    }
}
