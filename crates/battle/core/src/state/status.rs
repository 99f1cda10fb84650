//! Timed status effects applied by execution.
//!
//! Effects store `expires_at: Tick`; an effect is active while
//! `current_tick < expires_at` and is pruned by [`StatusEffects::expire`].

use arrayvec::ArrayVec;

use crate::state::Tick;

/// Maximum simultaneous status effects per agent.
pub const MAX_STATUS_EFFECTS: usize = 8;

/// Kinds of timed effects. One active instance per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StatusKind {
    /// Additive evasion probability bonus (dodge).
    Evasive,
    /// Fractional incoming damage reduction (defend).
    Guarded,
    /// Movement speed multiplier (sprint).
    Hasted,
    /// Fractional outgoing damage bonus (cooperate).
    Rallied,
}

/// A single status effect with magnitude and expiration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub magnitude: f32,
    pub expires_at: Tick,
}

/// Active status effects on an agent.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, MAX_STATUS_EFFECTS>,
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Magnitude of an active effect, if any.
    pub fn magnitude(&self, kind: StatusKind, now: Tick) -> Option<f32> {
        self.effects
            .iter()
            .find(|e| e.kind == kind && e.expires_at > now)
            .map(|e| e.magnitude)
    }

    pub fn has(&self, kind: StatusKind, now: Tick) -> bool {
        self.magnitude(kind, now).is_some()
    }

    /// Adds or refreshes an effect.
    ///
    /// Refreshing keeps the larger magnitude and the later expiration.
    pub fn apply(&mut self, kind: StatusKind, magnitude: f32, expires_at: Tick) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == kind) {
            existing.magnitude = existing.magnitude.max(magnitude);
            existing.expires_at = existing.expires_at.max(expires_at);
            return;
        }

        if !self.effects.is_full() {
            self.effects.push(StatusEffect {
                kind,
                magnitude,
                expires_at,
            });
        }
    }

    /// Removes every effect that has expired at `now`.
    pub fn expire(&mut self, now: Tick) {
        self.effects.retain(|e| e.expires_at > now);
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effect_is_active_until_expiration() {
        let mut effects = StatusEffects::empty();
        effects.apply(StatusKind::Guarded, 0.5, Tick(3));

        assert_eq!(effects.magnitude(StatusKind::Guarded, Tick(2)), Some(0.5));
        assert!(!effects.has(StatusKind::Guarded, Tick(3)));

        effects.expire(Tick(3));
        assert!(effects.is_empty());
    }

    #[test]
    fn refresh_keeps_strongest_and_latest() {
        let mut effects = StatusEffects::empty();
        effects.apply(StatusKind::Evasive, 0.2, Tick(5));
        effects.apply(StatusKind::Evasive, 0.1, Tick(8));

        assert_eq!(effects.len(), 1);
        assert_eq!(effects.magnitude(StatusKind::Evasive, Tick(7)), Some(0.2));
    }
}
