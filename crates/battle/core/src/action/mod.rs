//! The closed set of combat actions.
//!
//! [`ActionKind`] is the fieldless enumeration that evaluators score and that
//! cooldowns are keyed by. [`Action`] is the same set as a tagged variant that
//! carries the parameters resolved at decision time (target, destination, ...).
//!
//! Both the feasibility validator and the executor match exhaustively on these
//! enums: adding an action requires updating both.

use strum::{EnumCount, EnumIter};

use crate::state::{AgentId, CardinalDirection, SpecialAbility, Vec2};

/// Combat action kinds in declaration order.
///
/// Declaration order is the tie-break order for equal weighted scores: the
/// earlier variant wins.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumCount,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActionKind {
    AttackMelee,
    AttackRanged,
    Move,
    Dodge,
    Defend,
    Retreat,
    UseSpecial,
    Cooperate,
}

impl ActionKind {
    /// Stable index in declaration order (0-based).
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn is_attack(self) -> bool {
        matches!(self, ActionKind::AttackMelee | ActionKind::AttackRanged)
    }

    /// Actions that only make sense with a hostile agent around.
    pub const fn is_combat(self) -> bool {
        matches!(
            self,
            ActionKind::AttackMelee | ActionKind::AttackRanged | ActionKind::UseSpecial
        )
    }

    pub const fn is_movement(self) -> bool {
        matches!(self, ActionKind::Move | ActionKind::Retreat)
    }

    /// All kinds in declaration order.
    pub fn all() -> impl Iterator<Item = ActionKind> {
        <ActionKind as strum::IntoEnumIterator>::iter()
    }
}

/// A concrete action with its resolved parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    AttackMelee { target: AgentId },
    AttackRanged { target: AgentId },
    Move { destination: Vec2 },
    Dodge,
    Defend,
    /// Retreat away from threats. `heading` is the planned escape direction,
    /// used when the live threat layout yields no usable escape vector.
    Retreat { heading: Option<CardinalDirection> },
    UseSpecial { ability: SpecialAbility },
    Cooperate,
}

impl Action {
    pub const fn kind(&self) -> ActionKind {
        match self {
            Action::AttackMelee { .. } => ActionKind::AttackMelee,
            Action::AttackRanged { .. } => ActionKind::AttackRanged,
            Action::Move { .. } => ActionKind::Move,
            Action::Dodge => ActionKind::Dodge,
            Action::Defend => ActionKind::Defend,
            Action::Retreat { .. } => ActionKind::Retreat,
            Action::UseSpecial { .. } => ActionKind::UseSpecial,
            Action::Cooperate => ActionKind::Cooperate,
        }
    }

    /// Target agent for attack actions.
    pub const fn target(&self) -> Option<AgentId> {
        match self {
            Action::AttackMelee { target } | Action::AttackRanged { target } => Some(*target),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::AttackMelee { target } | Action::AttackRanged { target } => {
                write!(f, "{}({})", self.kind(), target)
            }
            Action::Move { destination } => {
                write!(f, "move({:.1}, {:.1})", destination.x, destination.y)
            }
            Action::UseSpecial { ability } => write!(f, "use_special({})", ability.name()),
            _ => write!(f, "{}", self.kind()),
        }
    }
}
