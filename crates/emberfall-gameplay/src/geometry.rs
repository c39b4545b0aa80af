//! Axis-aligned rectangles and the collision query seam.
//!
//! Obstacles and passable regions are both plain [`Rect`]s. Anything that can
//! answer "is this point blocked?" implements [`CollisionQuery`], which is all
//! the movement and line-of-sight code needs to know about a map.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world pixels, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Right edge (`x + w`).
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Bottom edge (`y + h`).
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Checks if a point lies within the closed bounds `[x, x+w] × [y, y+h]`.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Thickness along the thinner axis.
    #[must_use]
    pub fn thickness(&self) -> f32 {
        self.w.min(self.h)
    }
}

/// Collision query interface for point blocking.
pub trait CollisionQuery {
    /// Checks if a point is blocked for movement and sight.
    fn is_blocked(&self, point: Vec2) -> bool;
}

/// Mock collision query for testing: a bare list of blocking rectangles.
#[derive(Debug, Default)]
pub struct MockCollision {
    /// Blocking rectangles
    walls: Vec<Rect>,
}

impl MockCollision {
    /// Creates a mock with no walls.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a blocking rectangle.
    #[must_use]
    pub fn with_wall(mut self, wall: Rect) -> Self {
        self.walls.push(wall);
        self
    }
}

impl CollisionQuery for MockCollision {
    fn is_blocked(&self, point: Vec2) -> bool {
        self.walls.iter().any(|wall| wall.contains(point))
    }
}
