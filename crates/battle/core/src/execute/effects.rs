//! Per-action battlefield mutations.
//!
//! Each handler checks everything it depends on before the first write, so a
//! returned [`ExecutionFault`] leaves the battlefield unmutated.

use crate::action::{Action, ActionKind};
use crate::config::ExecutionConfig;
use crate::env::{PcgRng, RngOracle, compute_seed};
use crate::execute::{Effect, ExecutionFault};
use crate::state::{
    AgentId, AgentState, Battlefield, CardinalDirection, SpecialAbility, StatusKind, TeamId, Vec2,
};

/// Roll context for the evasion check.
const ROLL_EVASION: u32 = 1;

/// What an action did.
#[derive(Debug, Default)]
pub(crate) struct Outcome {
    pub primary: Option<Effect>,
    pub secondary: Vec<Effect>,
    /// Some but not all intended effects were applied.
    pub partial: bool,
}

impl Outcome {
    fn primary(effect: Effect) -> Self {
        Self {
            primary: Some(effect),
            ..Self::default()
        }
    }
}

pub(crate) struct Effects<'a> {
    pub field: &'a mut Battlefield,
    pub config: &'a ExecutionConfig,
    pub rng: &'a PcgRng,
    pub nonce: u64,
}

impl Effects<'_> {
    pub fn apply(&mut self, agent: AgentId, action: &Action) -> Result<Outcome, ExecutionFault> {
        // Movement and knockback clamp into the bounds.
        if !self.field.bounds.is_well_formed() {
            return Err(ExecutionFault::InvalidGeometry("battlefield bounds are malformed"));
        }
        match *action {
            Action::AttackMelee { target } => self.attack(agent, target, ActionKind::AttackMelee),
            Action::AttackRanged { target } => {
                self.attack(agent, target, ActionKind::AttackRanged)
            }
            Action::Move { destination } => self.move_to(agent, destination),
            Action::Dodge => self.dodge(agent),
            Action::Defend => self.defend(agent),
            Action::Retreat { heading } => self.retreat(agent, heading),
            Action::UseSpecial { ability } => self.special(agent, ability),
            Action::Cooperate => self.cooperate(agent),
        }
    }

    fn actor(&self, id: AgentId) -> Result<&AgentState, ExecutionFault> {
        self.field.agent(id).ok_or(ExecutionFault::AgentVanished(id))
    }

    fn actor_mut(&mut self, id: AgentId) -> Result<&mut AgentState, ExecutionFault> {
        self.field
            .agent_mut(id)
            .ok_or(ExecutionFault::AgentVanished(id))
    }

    // ========================================================================
    // Combat
    // ========================================================================

    fn attack(
        &mut self,
        id: AgentId,
        target: AgentId,
        kind: ActionKind,
    ) -> Result<Outcome, ExecutionFault> {
        let now = self.field.tick;
        let bounds = self.field.bounds;

        let attacker = self.actor(id)?;
        let defender = self
            .field
            .agent(target)
            .ok_or(ExecutionFault::TargetVanished(target))?;
        if !defender.alive {
            return Err(ExecutionFault::TargetNotAlive(target));
        }
        let distance = attacker.position.distance_to(defender.position);
        let range = attacker.stats.range_of(kind);
        if distance > range {
            return Err(ExecutionFault::OutOfRange {
                target,
                distance,
                range,
            });
        }

        let attacker_position = attacker.position;
        let cooldown = attacker.stats.attack_cooldown;
        let mut raw = attacker.stats.attack_damage * attacker.damage_multiplier(now);
        if kind == ActionKind::AttackRanged {
            raw *= self.config.ranged_damage_factor;
        }
        let evasion = defender.effective_evasion(now);
        let mitigated = (raw - defender.stats.defense).max(self.config.minimum_damage);
        let damage = mitigated * (1.0 - defender.damage_reduction(now));

        let mut outcome = Outcome::default();
        self.actor_mut(id)?.cooldowns.start(kind, cooldown);
        outcome
            .secondary
            .push(Effect::CooldownStarted { kind, ticks: cooldown });

        let seed = compute_seed(self.field.seed, self.nonce, id.0, ROLL_EVASION);
        if self.rng.chance(seed, evasion) {
            outcome.primary = Some(Effect::Evaded { target });
            return Ok(outcome);
        }

        let defender = self
            .field
            .agent_mut(target)
            .ok_or(ExecutionFault::TargetVanished(target))?;
        let before = defender.health.current;
        let killed = defender.take_damage(damage);
        outcome.primary = Some(Effect::DamageDealt {
            target,
            amount: before - defender.health.current,
        });

        if killed {
            outcome.secondary.push(Effect::TargetDefeated { target });
        } else if kind == ActionKind::AttackMelee && self.config.knockback_distance > 0.0 {
            let push = (defender.position - attacker_position).normalize();
            if !push.is_zero() {
                let landed = bounds.clamp(defender.position + push * self.config.knockback_distance);
                let moved = defender.position.distance_to(landed);
                defender.position = landed;
                if moved > 0.0 {
                    outcome.secondary.push(Effect::Knockback {
                        target,
                        distance: moved,
                    });
                }
            }
        }
        Ok(outcome)
    }

    // ========================================================================
    // Movement
    // ========================================================================

    fn move_to(&mut self, id: AgentId, destination: Vec2) -> Result<Outcome, ExecutionFault> {
        if !destination.is_finite() {
            return Err(ExecutionFault::InvalidGeometry("move destination is not finite"));
        }
        let now = self.field.tick;
        let actor = self.actor(id)?;
        let offset = destination - actor.position;
        let step = actor.effective_speed(now).min(offset.length());
        let velocity = offset.normalize() * step;
        Ok(self.relocate(id, velocity))
    }

    fn retreat(
        &mut self,
        id: AgentId,
        heading: Option<CardinalDirection>,
    ) -> Result<Outcome, ExecutionFault> {
        let now = self.field.tick;
        let actor = self.actor(id)?;
        let origin = actor.position;
        let vision = actor.stats.vision_range;
        let team = actor.team;
        let speed = actor.effective_speed(now) * self.config.retreat_speed_multiplier;

        // Inverse-distance weighted centroid of visible hostiles.
        let mut weight_sum = 0.0;
        let mut centroid = Vec2::ZERO;
        for threat in self
            .field
            .agents()
            .filter(|o| o.alive && o.id != id && hostile(team, o.team))
        {
            let distance = origin.distance_to(threat.position);
            if distance > vision {
                continue;
            }
            let weight = 1.0 / distance.max(1.0);
            centroid = centroid + threat.position * weight;
            weight_sum += weight;
        }

        let mut direction = Vec2::ZERO;
        if weight_sum > 0.0 {
            direction = (origin - centroid * (1.0 / weight_sum)).normalize();
        }
        if direction.is_zero() {
            direction = heading.map(CardinalDirection::unit).unwrap_or(Vec2::ZERO);
        }
        if direction.is_zero() {
            return Err(ExecutionFault::InvalidGeometry("no escape vector"));
        }

        Ok(self.relocate(id, direction * speed))
    }

    /// Moves `id` by `velocity`, clamped to the battlefield.
    fn relocate(&mut self, id: AgentId, velocity: Vec2) -> Outcome {
        let bounds = self.field.bounds;
        let Some(actor) = self.field.agent_mut(id) else {
            return Outcome::default();
        };
        let from = actor.position;
        let requested = from + velocity;
        let to = bounds.clamp(requested);
        actor.position = to;
        actor.velocity = to - from;

        let mut outcome = Outcome::primary(Effect::Moved { from, to });
        outcome.secondary.push(Effect::VelocityChanged {
            velocity: actor.velocity,
        });
        if to != requested {
            outcome.secondary.push(Effect::Clamped {
                requested,
                actual: to,
            });
        }
        outcome
    }

    // ========================================================================
    // Self buffs
    // ========================================================================

    fn dodge(&mut self, id: AgentId) -> Result<Outcome, ExecutionFault> {
        let until = self.field.tick + self.config.dodge_duration;
        let bonus = self.config.dodge_bonus;
        self.actor_mut(id)?
            .status
            .apply(StatusKind::Evasive, bonus, until);
        Ok(Outcome::primary(Effect::EvasionBonus { bonus, until }))
    }

    fn defend(&mut self, id: AgentId) -> Result<Outcome, ExecutionFault> {
        let until = self.field.tick + self.config.defend_duration;
        let reduction = self.config.defend_reduction;
        self.actor_mut(id)?
            .status
            .apply(StatusKind::Guarded, reduction, until);
        Ok(Outcome::primary(Effect::DamageReduction { reduction, until }))
    }

    fn special(&mut self, id: AgentId, ability: SpecialAbility) -> Result<Outcome, ExecutionFault> {
        let now = self.field.tick;
        let actor = self.actor_mut(id)?;
        let cost = ability.cost();
        if actor.energy.current < cost {
            return Err(ExecutionFault::InsufficientEnergy {
                required: cost,
                available: actor.energy.current,
            });
        }

        let spent = actor.energy.drain(cost);
        let cooldown = actor.stats.special_cooldown;
        actor.cooldowns.start(ActionKind::UseSpecial, cooldown);

        let primary = match ability {
            SpecialAbility::SelfHeal { fraction, .. } => {
                let amount = actor.health.restore(actor.stats.max_health * fraction);
                Effect::Healed { amount }
            }
            SpecialAbility::Sprint {
                multiplier,
                duration,
                ..
            } => {
                let until = now + duration;
                actor.status.apply(StatusKind::Hasted, multiplier, until);
                Effect::SpeedBonus { multiplier, until }
            }
        };

        let mut outcome = Outcome::primary(primary);
        outcome.secondary.push(Effect::EnergySpent { amount: spent });
        outcome.secondary.push(Effect::CooldownStarted {
            kind: ActionKind::UseSpecial,
            ticks: cooldown,
        });
        Ok(outcome)
    }

    // ========================================================================
    // Cooperation
    // ========================================================================

    fn cooperate(&mut self, id: AgentId) -> Result<Outcome, ExecutionFault> {
        let actor = self.actor(id)?.snapshot();
        let eligible: Vec<_> = self
            .field
            .visible_to(id)
            .into_iter()
            .filter(|other| actor.is_ally_of(other))
            .collect();
        let (reachable, unreachable): (Vec<_>, Vec<_>) = eligible
            .iter()
            .partition(|ally| actor.distance_to(ally) <= self.config.coordination_range);
        if reachable.is_empty() {
            return Err(ExecutionFault::NoAlliesReachable);
        }

        let until = self.field.tick + self.config.rally_duration;
        let bonus = self.config.rally_bonus;
        let mut rallied = Vec::with_capacity(reachable.len());
        for ally in &reachable {
            if let Some(state) = self.field.agent_mut(ally.id) {
                state.status.apply(StatusKind::Rallied, bonus, until);
                rallied.push(Effect::RalliedAlly {
                    ally: ally.id,
                    bonus,
                    until,
                });
            }
        }

        let mut effects = rallied.into_iter();
        let mut outcome = Outcome {
            primary: effects.next(),
            secondary: effects.collect(),
            partial: !unreachable.is_empty(),
        };
        outcome
            .secondary
            .extend(unreachable.iter().map(|ally| Effect::AllyOutOfRange {
                ally: ally.id,
                distance: actor.distance_to(ally),
            }));
        Ok(outcome)
    }
}

fn hostile(a: Option<TeamId>, b: Option<TeamId>) -> bool {
    matches!((a, b), (Some(x), Some(y)) if x != y)
}
