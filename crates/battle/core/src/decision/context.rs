//! Battlefield-relative facts for one agent at decision time.

use std::f32::consts::TAU;

use strum::IntoEnumIterator;

use crate::config::DecisionConfig;
use crate::error::ContextError;
use crate::state::{AgentSnapshot, BattlefieldBounds, CardinalDirection, Vec2};

/// Immutable snapshot of everything an evaluator may consider.
///
/// Every agent referenced here is a value copy taken when the context was
/// built; nothing aliases the live battlefield. Agent lists are sorted by
/// ascending distance, ties by ascending id.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionContext {
    agent: AgentSnapshot,
    bounds: BattlefieldBounds,
    threat_radius: f32,
    immediate_threats: Vec<AgentSnapshot>,
    distant_threats: Vec<AgentSnapshot>,
    allies: Vec<AgentSnapshot>,
    enemies: Vec<AgentSnapshot>,
    outnumbered: bool,
    surrounded: bool,
    has_advantage: bool,
    near_boundary: bool,
    escape_route_available: bool,
    escape_direction: Option<CardinalDirection>,
}

impl DecisionContext {
    /// The deciding agent.
    pub fn agent(&self) -> &AgentSnapshot {
        &self.agent
    }

    pub fn bounds(&self) -> &BattlefieldBounds {
        &self.bounds
    }

    pub fn health_fraction(&self) -> f32 {
        self.agent.health_fraction()
    }

    /// Distance separating immediate from distant threats (inclusive).
    pub fn threat_radius(&self) -> f32 {
        self.threat_radius
    }

    pub fn immediate_threats(&self) -> &[AgentSnapshot] {
        &self.immediate_threats
    }

    pub fn distant_threats(&self) -> &[AgentSnapshot] {
        &self.distant_threats
    }

    pub fn allies(&self) -> &[AgentSnapshot] {
        &self.allies
    }

    pub fn enemies(&self) -> &[AgentSnapshot] {
        &self.enemies
    }

    pub fn nearest_enemy(&self) -> Option<&AgentSnapshot> {
        self.enemies.first()
    }

    pub fn nearest_ally(&self) -> Option<&AgentSnapshot> {
        self.allies.first()
    }

    pub fn distance_to_nearest_enemy(&self) -> Option<f32> {
        self.nearest_enemy().map(|e| self.agent.distance_to(e))
    }

    pub fn is_outnumbered(&self) -> bool {
        self.outnumbered
    }

    pub fn is_surrounded(&self) -> bool {
        self.surrounded
    }

    pub fn has_advantage(&self) -> bool {
        self.has_advantage
    }

    pub fn is_near_boundary(&self) -> bool {
        self.near_boundary
    }

    pub fn escape_route_available(&self) -> bool {
        self.escape_route_available
    }

    /// Best escape direction, even when no direction is fully clear.
    /// `None` only when the agent cannot leave its position in any direction.
    pub fn escape_direction(&self) -> Option<CardinalDirection> {
        self.escape_direction
    }
}

/// Derives a [`DecisionContext`] for `agent` from the agents it can see.
///
/// `visible` may contain the agent itself, dead agents and neutrals; they are
/// excluded from every partition. Pure and O(n) in `visible`.
///
/// # Errors
///
/// Returns [`ContextError`] if the agent is dead, its position is not finite,
/// or `bounds` is malformed.
pub fn build_context(
    agent: &AgentSnapshot,
    visible: &[AgentSnapshot],
    bounds: &BattlefieldBounds,
    config: &DecisionConfig,
) -> Result<DecisionContext, ContextError> {
    if !agent.alive {
        return Err(ContextError::AgentNotAlive(agent.id));
    }
    if !agent.position.is_finite() {
        return Err(ContextError::InvalidPosition(agent.id));
    }
    if !bounds.is_well_formed() {
        return Err(ContextError::InvalidBounds);
    }

    let threat_radius = config
        .threat_radius
        .filter(|r| r.is_finite() && *r >= 0.0)
        .unwrap_or_else(|| agent.stats.max_attack_range());

    let mut allies = Vec::new();
    let mut enemies = Vec::new();
    for other in visible
        .iter()
        .filter(|o| o.alive && o.id != agent.id && o.position.is_finite())
    {
        if agent.is_ally_of(other) {
            allies.push(other.clone());
        } else if agent.is_enemy_of(other) {
            enemies.push(other.clone());
        }
    }
    sort_by_distance(agent.position, &mut allies);
    sort_by_distance(agent.position, &mut enemies);

    let (immediate_threats, distant_threats): (Vec<_>, Vec<_>) = enemies
        .iter()
        .cloned()
        .partition(|e| agent.distance_to(e) <= threat_radius);

    let outnumbered = enemies.len() > allies.len() + 1;
    let surrounded = occupied_sectors(agent.position, &enemies, config.surround_sectors)
        >= usize::from(config.surround_threshold.max(1));
    let has_advantage = !outnumbered
        && !surrounded
        && (allies.len() >= enemies.len()
            || (agent.health_fraction() > 0.8 && immediate_threats.len() <= 1));

    let near_boundary = bounds.distance_to_edge(agent.position) < config.boundary_margin;
    let (escape_direction, escape_route_available) =
        probe_escape(agent.position, &enemies, bounds, config);

    tracing::trace!(
        agent = %agent.id,
        allies = allies.len(),
        enemies = enemies.len(),
        immediate = immediate_threats.len(),
        outnumbered,
        surrounded,
        "built decision context"
    );

    Ok(DecisionContext {
        agent: agent.clone(),
        bounds: *bounds,
        threat_radius,
        immediate_threats,
        distant_threats,
        allies,
        enemies,
        outnumbered,
        surrounded,
        has_advantage,
        near_boundary,
        escape_route_available,
        escape_direction,
    })
}

fn sort_by_distance(origin: Vec2, agents: &mut [AgentSnapshot]) {
    agents.sort_by(|a, b| {
        origin
            .distance_to(a.position)
            .total_cmp(&origin.distance_to(b.position))
            .then(a.id.cmp(&b.id))
    });
}

/// Number of distinct angular sectors around `origin` holding at least one agent.
fn occupied_sectors(origin: Vec2, agents: &[AgentSnapshot], sectors: u8) -> usize {
    let sectors = usize::from(sectors.max(1));
    let width = TAU / sectors as f32;
    let mut occupied = vec![false; sectors];
    for agent in agents {
        let offset = agent.position - origin;
        if offset.is_zero() {
            continue;
        }
        let index = ((offset.angle() / width) as usize).min(sectors - 1);
        occupied[index] = true;
    }
    occupied.iter().filter(|o| **o).count()
}

/// Returns the best escape direction and whether it is fully clear.
///
/// Directions are ranked by (stays in bounds, clearance from the nearest
/// threat at the projected point); the first declared direction wins ties.
fn probe_escape(
    origin: Vec2,
    threats: &[AgentSnapshot],
    bounds: &BattlefieldBounds,
    config: &DecisionConfig,
) -> (Option<CardinalDirection>, bool) {
    let mut best: Option<(CardinalDirection, bool, f32)> = None;

    for direction in CardinalDirection::iter() {
        let projected = origin + direction.unit() * config.escape_lookahead;
        let in_bounds = bounds.contains(projected);
        let landing = bounds.clamp(projected);
        if !in_bounds && landing.distance_to(origin) <= f32::EPSILON {
            continue;
        }
        let clearance = threats
            .iter()
            .map(|t| landing.distance_to(t.position))
            .fold(f32::INFINITY, f32::min);

        let better = match best {
            None => true,
            Some((_, best_in, best_clear)) => {
                (in_bounds && !best_in) || (in_bounds == best_in && clearance > best_clear)
            }
        };
        if better {
            best = Some((direction, in_bounds, clearance));
        }
    }

    match best {
        Some((direction, in_bounds, clearance)) => (
            Some(direction),
            in_bounds && clearance > config.escape_safety_radius,
        ),
        None => (None, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AgentId, AgentState, AgentStats, TeamId};

    fn snap(id: u32, team: Option<u32>, x: f32, y: f32) -> AgentSnapshot {
        AgentState::new(
            AgentId(id),
            team.map(TeamId),
            Vec2::new(x, y),
            AgentStats::default(),
        )
        .snapshot()
    }

    fn build(agent: &AgentSnapshot, visible: &[AgentSnapshot]) -> DecisionContext {
        build_context(
            agent,
            visible,
            &BattlefieldBounds::default(),
            &DecisionConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn partitions_by_team_and_threat_radius() {
        let me = snap(1, Some(1), 0.0, 0.0);
        let visible = vec![
            me.clone(),
            snap(2, Some(1), 10.0, 0.0),
            snap(3, Some(2), 120.0, 0.0),
            snap(4, Some(2), 140.0, 0.0),
            snap(5, None, 5.0, 0.0),
        ];
        let ctx = build(&me, &visible);

        assert_eq!(ctx.allies().len(), 1);
        assert_eq!(ctx.enemies().len(), 2);
        // exactly at the threshold counts as immediate
        assert_eq!(ctx.immediate_threats()[0].id, AgentId(3));
        assert_eq!(ctx.distant_threats()[0].id, AgentId(4));
        assert_eq!(ctx.nearest_ally().map(|a| a.id), Some(AgentId(2)));
    }

    #[test]
    fn outnumbered_counts_self() {
        let me = snap(1, Some(1), 0.0, 0.0);
        let two = vec![snap(2, Some(2), 60.0, 0.0), snap(3, Some(2), 0.0, 60.0)];
        assert!(build(&me, &two).is_outnumbered());

        let with_ally = vec![
            snap(2, Some(2), 60.0, 0.0),
            snap(3, Some(2), 0.0, 140.0),
            snap(4, Some(1), -10.0, 0.0),
        ];
        let ctx = build(&me, &with_ally);
        assert!(!ctx.is_outnumbered());
        assert!(ctx.has_advantage());
    }

    #[test]
    fn surrounded_needs_three_sectors() {
        let me = snap(1, Some(1), 0.0, 0.0);
        let two_sides = vec![snap(2, Some(2), 20.0, 5.0), snap(3, Some(2), -20.0, 5.0)];
        assert!(!build(&me, &two_sides).is_surrounded());

        let three_sides = vec![
            snap(2, Some(2), 20.0, 5.0),
            snap(3, Some(2), -20.0, 5.0),
            snap(4, Some(2), 0.0, -20.0),
        ];
        let ctx = build(&me, &three_sides);
        assert!(ctx.is_surrounded());
        assert!(!ctx.has_advantage());
    }

    #[test]
    fn escape_prefers_direction_away_from_threat() {
        let me = snap(1, Some(1), 0.0, 0.0);
        let ctx = build(&me, &[snap(2, Some(2), 20.0, 0.0)]);
        assert!(ctx.escape_route_available());
        assert_eq!(ctx.escape_direction(), Some(CardinalDirection::West));
    }

    #[test]
    fn corner_agent_is_near_boundary() {
        let me = snap(1, Some(1), 490.0, 490.0);
        let ctx = build(&me, &[]);
        assert!(ctx.is_near_boundary());
        assert!(ctx.escape_route_available());
        assert!(matches!(
            ctx.escape_direction(),
            Some(CardinalDirection::SouthWest | CardinalDirection::South | CardinalDirection::West)
        ));
    }

    #[test]
    fn rejects_dead_agent_and_bad_bounds() {
        let dead = AgentState::new(AgentId(1), Some(TeamId(1)), Vec2::ZERO, AgentStats::default())
            .with_health(0.0)
            .snapshot();
        assert_eq!(
            build_context(&dead, &[], &BattlefieldBounds::default(), &DecisionConfig::default()),
            Err(ContextError::AgentNotAlive(AgentId(1)))
        );

        let me = snap(1, Some(1), 0.0, 0.0);
        let inverted = BattlefieldBounds::new(10.0, -10.0, 0.0, 1.0);
        assert_eq!(
            build_context(&me, &[], &inverted, &DecisionConfig::default()),
            Err(ContextError::InvalidBounds)
        );
    }
}
