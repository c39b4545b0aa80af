//! Collision primitives for enemy movement and sight.
//!
//! - Point blocking against an obstacle set with passable carve-outs
//! - Expanding ring search for the nearest safe position
//! - Bresenham line of sight on the integer lattice
//! - Axis-separated slide movement

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geometry::{CollisionQuery, Rect};
use crate::obstacles::ObstacleLayout;

/// Number of angles sampled on every ring of the safe-position search.
pub const SAFE_SEARCH_ANGLES: usize = 16;

/// Parameters of the expanding ring search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeSearch {
    /// Radius increment between rings
    pub step: f32,
    /// Largest ring radius tried before falling back
    pub max_radius: f32,
}

impl Default for SafeSearch {
    fn default() -> Self {
        Self {
            step: 10.0,
            max_radius: 300.0,
        }
    }
}

/// Checks whether a point is blocked by the obstacle set.
///
/// A point inside any passage is never blocked, whatever obstacles overlap it.
/// Otherwise it is blocked iff it lies in the closed bounds of an obstacle.
#[must_use]
pub fn is_point_in_obstacle(point: Vec2, obstacles: &[Rect], passages: &[Rect]) -> bool {
    if passages.iter().any(|passage| passage.contains(point)) {
        return false;
    }
    obstacles.iter().any(|obstacle| obstacle.contains(point))
}

/// Finds the nearest unblocked position to `point`.
///
/// Unblocked input is returned unchanged. Otherwise rings of increasing
/// radius are sampled at [`SAFE_SEARCH_ANGLES`] angles, each sample clamped
/// into the layout's inset bounds, and the first unblocked sample wins. When
/// every ring is exhausted the layout's fallback point is returned.
#[must_use]
pub fn find_safe_position(point: Vec2, layout: &ObstacleLayout, search: &SafeSearch) -> Vec2 {
    if !layout.is_blocked(point) {
        return point;
    }

    let step = search.step.max(1.0);
    let rings = (search.max_radius / step).floor() as u32;
    let bounds = layout.bounds();

    for ring in 1..=rings {
        let radius = step * ring as f32;
        for i in 0..SAFE_SEARCH_ANGLES {
            let angle = i as f32 * TAU / SAFE_SEARCH_ANGLES as f32;
            let sample = bounds.clamp_inset(point + Vec2::from_angle(angle) * radius);
            if !layout.is_blocked(sample) {
                return sample;
            }
        }
    }

    warn!(
        "No safe position within {} of ({}, {}) on {:?}, using fallback",
        search.max_radius,
        point.x,
        point.y,
        layout.map()
    );
    layout.fallback()
}

/// Checks for an unobstructed line between two points.
///
/// Walks the integer lattice from `from` to `to` (both rounded) with
/// Bresenham stepping and fails at the first blocked point after the start.
/// A point always sees itself. The walk is not guaranteed to be symmetric.
#[must_use]
pub fn has_line_of_sight<C: CollisionQuery + ?Sized>(from: Vec2, to: Vec2, world: &C) -> bool {
    let (mut x, mut y) = (from.x.round() as i64, from.y.round() as i64);
    let (x1, y1) = (to.x.round() as i64, to.y.round() as i64);

    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    while x != x1 || y != y1 {
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        if world.is_blocked(Vec2::new(x as f32, y as f32)) {
            return false;
        }
    }

    true
}

/// Moves by `delta` one axis at a time, sliding along walls.
///
/// The x step is accepted only if `(x + dx, y)` is unblocked; the y step is
/// then accepted only if `(x', y + dy)` is unblocked, where `x'` is the x
/// after the first step. The returned position is never blocked unless the
/// start was.
#[must_use]
pub fn slide_move<C: CollisionQuery + ?Sized>(position: Vec2, delta: Vec2, world: &C) -> Vec2 {
    let mut next = position;

    if delta.x != 0.0 {
        let candidate = Vec2::new(position.x + delta.x, position.y);
        if !world.is_blocked(candidate) {
            next.x = candidate.x;
        }
    }

    if delta.y != 0.0 {
        let candidate = Vec2::new(next.x, position.y + delta.y);
        if !world.is_blocked(candidate) {
            next.y = candidate.y;
        }
    }

    next
}
