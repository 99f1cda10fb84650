use std::fmt;

/// Unique identifier for an agent on the battlefield.
///
/// Ordering is significant: agents are processed in ascending id order every
/// tick, which keeps whole battles reproducible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Team affiliation. Agents without a team are neutral to everyone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TeamId(pub u32);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "team-{}", self.0)
    }
}

/// Discrete simulation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_add(rhs))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Continuous resource meter (health, energy) tracked per agent.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: f32,
    pub maximum: f32,
}

impl ResourceMeter {
    pub fn new(current: f32, maximum: f32) -> Self {
        Self { current, maximum }
    }

    pub fn full(maximum: f32) -> Self {
        Self::new(maximum, maximum)
    }

    /// Current value as a fraction of the maximum, clamped to [0, 1].
    ///
    /// A non-positive maximum reads as empty.
    pub fn fraction(&self) -> f32 {
        if self.maximum <= 0.0 || !self.maximum.is_finite() || !self.current.is_finite() {
            return 0.0;
        }
        (self.current / self.maximum).clamp(0.0, 1.0)
    }

    /// Adds `amount`, saturating at the maximum. Returns the amount actually gained.
    pub fn restore(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current + amount.max(0.0)).min(self.maximum);
        self.current - before
    }

    /// Removes `amount`, saturating at zero. Returns the amount actually lost.
    pub fn drain(&mut self, amount: f32) -> f32 {
        let before = self.current;
        self.current = (self.current - amount.max(0.0)).max(0.0);
        before - self.current
    }

    pub fn is_consistent(&self) -> bool {
        self.current.is_finite()
            && self.maximum.is_finite()
            && self.current >= 0.0
            && self.current <= self.maximum
    }
}
