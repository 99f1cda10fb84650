//! Scenario loader.
//!
//! A scenario is a RON document describing the battlefield and its roster:
//!
//! ```ron
//! (
//!     name: "skirmish",
//!     seed: 7,
//!     bounds: (min_x: -200.0, max_x: 200.0, min_y: -200.0, max_y: 200.0),
//!     agents: [
//!         (id: 1, team: Some(1), position: (x: -60.0, y: 0.0)),
//!         (id: 2, team: Some(2), position: (x: 60.0, y: 0.0), evaluator: aggressive),
//!     ],
//! )
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use battle_core::{
    AgentId, AgentState, AgentStats, Battlefield, BattlefieldBounds, Capabilities, EvaluatorKind,
    TeamId, Vec2,
};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// One agent in a scenario roster.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub id: u32,
    /// `None` places the agent as a neutral.
    #[serde(default)]
    pub team: Option<u32>,
    pub position: Vec2,
    #[serde(default)]
    pub stats: AgentStats,
    /// Starting health; full health when omitted.
    #[serde(default)]
    pub health: Option<f32>,
    #[serde(default)]
    pub capabilities: Option<Capabilities>,
    #[serde(default)]
    pub evaluator: EvaluatorKind,
}

impl AgentSpec {
    pub fn to_state(&self) -> AgentState {
        let mut state = AgentState::new(
            AgentId(self.id),
            self.team.map(TeamId),
            self.position,
            self.stats,
        );
        if let Some(health) = self.health {
            state = state.with_health(health);
        }
        if let Some(capabilities) = self.capabilities {
            state = state.with_capabilities(capabilities);
        }
        state
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub bounds: BattlefieldBounds,
    pub agents: Vec<AgentSpec>,
}

impl Scenario {
    /// Builds the initial battlefield, rejecting duplicate ids and agents
    /// placed outside the bounds.
    pub fn build_battlefield(&self) -> LoadResult<Battlefield> {
        if !self.bounds.is_well_formed() {
            anyhow::bail!("Scenario '{}' has malformed bounds", self.name);
        }
        let mut field = Battlefield::new(self.bounds, self.seed);
        for spec in &self.agents {
            field
                .insert(spec.to_state())
                .map_err(|e| anyhow::anyhow!("Scenario '{}': {}", self.name, e))?;
        }
        Ok(field)
    }

    /// Evaluator chosen for each agent.
    pub fn evaluators(&self) -> BTreeMap<AgentId, EvaluatorKind> {
        self.agents
            .iter()
            .map(|spec| (AgentId(spec.id), spec.evaluator))
            .collect()
    }
}

/// Loader for scenarios from RON files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> LoadResult<Scenario> {
        let content = read_file(path)?;
        let mut scenario = Self::parse(&content)?;
        if scenario.name.is_empty()
            && let Some(stem) = path.file_stem()
        {
            scenario.name = stem.to_string_lossy().into_owned();
        }
        Ok(scenario)
    }

    pub fn parse(content: &str) -> LoadResult<Scenario> {
        let scenario: Scenario = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse scenario RON: {}", e))?;
        if scenario.agents.is_empty() {
            anyhow::bail!("Scenario '{}' has no agents", scenario.name);
        }
        Ok(scenario)
    }
}
