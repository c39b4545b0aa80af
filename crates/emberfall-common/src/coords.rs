//! World-space value types.
//!
//! Positions are `glam::Vec2` in world pixels, x growing right and y growing
//! down (screen convention).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Side length of every Emberfall map, in world pixels.
pub const WORLD_SIZE: f32 = 2000.0;

/// Margin kept between generated positions and the world edge.
pub const DEFAULT_INSET: f32 = 50.0;

/// Rectangular extent of a map plus the inset used when generating positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Width of the world
    pub width: f32,
    /// Height of the world
    pub height: f32,
    /// Distance from each edge that generated positions keep clear of
    pub inset: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self::new(WORLD_SIZE, WORLD_SIZE, DEFAULT_INSET)
    }
}

impl WorldBounds {
    /// Creates new world bounds.
    #[must_use]
    pub const fn new(width: f32, height: f32, inset: f32) -> Self {
        Self {
            width,
            height,
            inset,
        }
    }

    /// Returns the center of the world.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Checks whether a point lies inside the full world extent.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        (0.0..=self.width).contains(&point.x) && (0.0..=self.height).contains(&point.y)
    }

    /// Checks that the extent is positive and finite and the inset leaves a
    /// non-empty rectangle.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let extent_ok = self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0;
        extent_ok
            && self.inset.is_finite()
            && self.inset >= 0.0
            && self.inset * 2.0 <= self.width.min(self.height)
    }

    /// Clamps a point into the inset rectangle.
    ///
    /// Bounds must satisfy [`is_valid`](Self::is_valid).
    #[must_use]
    pub fn clamp_inset(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.inset, self.width - self.inset),
            point.y.clamp(self.inset, self.height - self.inset),
        )
    }
}

/// Facing of an entity, derived from its last movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Facing up the screen (negative y)
    Up,
    /// Facing down the screen (positive y)
    #[default]
    Down,
    /// Facing left (negative x)
    Left,
    /// Facing right (positive x)
    Right,
}

impl Direction {
    /// Derives a facing from a movement delta.
    ///
    /// The dominant axis wins; at `|dx| == |dy|` the vertical axis wins.
    /// Returns `None` for a zero delta so callers keep the previous facing.
    #[must_use]
    pub fn from_delta(dx: f32, dy: f32) -> Option<Self> {
        if dx == 0.0 && dy == 0.0 {
            return None;
        }
        if dx.abs() > dy.abs() {
            Some(if dx > 0.0 { Self::Right } else { Self::Left })
        } else {
            Some(if dy > 0.0 { Self::Down } else { Self::Up })
        }
    }
}
