//! Reports produced by the simulation loop.

use std::fmt;

use battle_core::{ActionResult, ActionStatus, AgentId, Decision, ExecutionStats, TeamId, Tick};

/// One agent's turn within a tick.
#[derive(Clone, Debug)]
pub struct TickEntry {
    pub agent: AgentId,
    pub decision: Decision,
    pub result: ActionResult,
}

/// Everything that happened during a single tick, in processing order.
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    /// Tick the entries were executed in (before advancing).
    pub tick: Tick,
    pub entries: Vec<TickEntry>,
    /// Agents that died during this tick, in order of death.
    pub defeated: Vec<AgentId>,
}

impl TickReport {
    pub fn count(&self, status: ActionStatus) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.result.status == status)
            .count()
    }

    pub fn fallbacks(&self) -> usize {
        self.entries.iter().filter(|entry| entry.decision.fallback).count()
    }
}

/// Why [`crate::Simulation::run`] stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StopReason {
    /// Exactly one team is left standing.
    Victory,
    /// No team has living members.
    Annihilation,
    /// The configured tick limit was reached first.
    TickLimit,
    /// The cancellation token fired.
    Cancelled,
}

/// End-of-battle summary.
#[derive(Clone, Debug, PartialEq)]
pub struct BattleOutcome {
    pub reason: StopReason,
    pub winner: Option<TeamId>,
    /// Ticks simulated by this run.
    pub ticks: u64,
    /// Living agents at the end, ascending id.
    pub survivors: Vec<AgentId>,
    pub stats: ExecutionStats,
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.winner {
            Some(team) => write!(f, "{} wins", team)?,
            None => write!(f, "no winner")?,
        }
        write!(
            f,
            " ({}) after {} tick(s), {} survivor(s), {} action(s), {:.1}% succeeded",
            self.reason,
            self.ticks,
            self.survivors.len(),
            self.stats.total,
            self.stats.success_rate() * 100.0
        )
    }
}
