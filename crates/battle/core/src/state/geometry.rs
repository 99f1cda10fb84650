//! Planar geometry used by context building and execution.
//!
//! Coordinate system: X grows eastward, Y grows northward.

use std::ops::{Add, Mul, Sub};

/// 2D vector / point in battlefield units.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(self, other: Vec2) -> f32 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or zero for a zero-length vector.
    pub fn normalize(self) -> Vec2 {
        let len = self.length();
        if len <= f32::EPSILON || !len.is_finite() {
            Vec2::ZERO
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    /// Angle in radians within [0, 2π).
    pub fn angle(self) -> f32 {
        let a = self.y.atan2(self.x);
        if a < 0.0 { a + std::f32::consts::TAU } else { a }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn is_zero(self) -> bool {
        self.length() <= f32::EPSILON
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangular battlefield limits (inclusive).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattlefieldBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl BattlefieldBounds {
    pub const fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Square bounds centred on the origin.
    pub const fn square(half_extent: f32) -> Self {
        Self::new(-half_extent, half_extent, -half_extent, half_extent)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.is_finite()
            && point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Clamps `point` into the bounds. Never panics; on malformed bounds the
    /// result is meaningless, so callers check [`Self::is_well_formed`] first.
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.max(self.min_x).min(self.max_x),
            point.y.max(self.min_y).min(self.max_y),
        )
    }

    /// Distance from `point` to the nearest edge (negative when outside).
    pub fn distance_to_edge(&self, point: Vec2) -> f32 {
        (point.x - self.min_x)
            .min(self.max_x - point.x)
            .min(point.y - self.min_y)
            .min(self.max_y - point.y)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    pub fn is_well_formed(&self) -> bool {
        [self.min_x, self.max_x, self.min_y, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }
}

impl Default for BattlefieldBounds {
    fn default() -> Self {
        Self::square(500.0)
    }
}

/// The eight principal compass directions, used for escape-route probing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum CardinalDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CardinalDirection {
    /// Unit vector for this direction.
    pub fn unit(self) -> Vec2 {
        const D: f32 = std::f32::consts::FRAC_1_SQRT_2;
        match self {
            CardinalDirection::North => Vec2::new(0.0, 1.0),
            CardinalDirection::NorthEast => Vec2::new(D, D),
            CardinalDirection::East => Vec2::new(1.0, 0.0),
            CardinalDirection::SouthEast => Vec2::new(D, -D),
            CardinalDirection::South => Vec2::new(0.0, -1.0),
            CardinalDirection::SouthWest => Vec2::new(-D, -D),
            CardinalDirection::West => Vec2::new(-1.0, 0.0),
            CardinalDirection::NorthWest => Vec2::new(-D, D),
        }
    }

    /// Direction whose unit vector is closest to `v`. `None` for a zero vector.
    pub fn nearest(v: Vec2) -> Option<CardinalDirection> {
        if v.is_zero() || !v.is_finite() {
            return None;
        }
        let n = v.normalize();
        <CardinalDirection as strum::IntoEnumIterator>::iter().max_by(|a, b| {
            let da = a.unit().x * n.x + a.unit().y * n.y;
            let db = b.unit().x * n.x + b.unit().y * n.y;
            da.total_cmp(&db)
        })
    }
}
