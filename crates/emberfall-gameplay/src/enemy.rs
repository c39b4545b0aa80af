//! Runtime enemy state.

use emberfall_common::{Direction, EnemyId};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::{find_safe_position, SafeSearch};
use crate::obstacles::ObstacleLayout;
use crate::roster::{BehaviourRadii, EnemyDefinition, StatBlock, VisualKind};

/// What an enemy did on its last tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BehaviourState {
    /// Standing near its wander target
    #[default]
    WanderIdle,
    /// Walking toward its wander target
    WanderMoving,
    /// Closing in on the player
    Chasing,
    /// In attack range, holding position for the battle
    Engaging,
    /// Health reached zero, waiting for removal
    Dead,
}

/// Result of applying damage to an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Enemy was already dead, nothing changed
    Ignored,
    /// Enemy took damage and survived
    Wounded {
        /// Health left
        health: u32,
    },
    /// This hit killed the enemy
    Killed,
}

/// A live (or dead but not yet removed) enemy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Stable id
    pub id: EnemyId,
    /// Display name
    pub name: String,
    /// Sprite family
    pub visual: VisualKind,
    /// Combat numbers
    pub stats: StatBlock,
    /// AI distances and speed
    pub radii: BehaviourRadii,
    /// Current health
    pub health: u32,
    /// Current position
    pub position: Vec2,
    /// Wander anchor
    pub spawn_position: Vec2,
    /// Current wander destination
    pub target_position: Vec2,
    /// Facing from the last movement
    pub direction: Direction,
    /// Whether the enemy moved on its last tick
    pub is_moving: bool,
    /// Whether the attack animation should play
    pub is_attacking: bool,
    /// Health reached zero
    pub is_dead: bool,
    /// Simulation time of the last battle request, in milliseconds
    pub last_attack_ms: Option<u64>,
    /// State chosen on the last tick
    pub state: BehaviourState,
}

impl Enemy {
    /// Instantiates a definition at full health, placed outside all walls.
    #[must_use]
    pub fn spawn(def: &EnemyDefinition, layout: &ObstacleLayout, search: &SafeSearch) -> Self {
        let position = find_safe_position(def.spawn, layout, search);
        Self {
            id: def.id,
            name: def.name.clone(),
            visual: def.visual,
            stats: def.stats,
            radii: def.radii,
            health: def.stats.max_health,
            position,
            spawn_position: position,
            target_position: position,
            direction: Direction::default(),
            is_moving: false,
            is_attacking: false,
            is_dead: false,
            last_attack_ms: None,
            state: BehaviourState::WanderIdle,
        }
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.stats.max_health
    }

    /// Returns distance to a position.
    #[must_use]
    pub fn distance_to(&self, pos: Vec2) -> f32 {
        self.position.distance(pos)
    }

    /// Applies raw damage, clamping health at zero.
    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.is_dead {
            return DamageOutcome::Ignored;
        }

        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.is_dead = true;
            self.is_moving = false;
            self.is_attacking = false;
            self.state = BehaviourState::Dead;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded {
                health: self.health,
            }
        }
    }

    /// Read-only view for the render adapter.
    #[must_use]
    pub fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            name: self.name.clone(),
            visual: self.visual,
            position: self.position,
            direction: self.direction,
            health: self.health,
            max_health: self.stats.max_health,
            is_attacking: self.is_attacking,
            is_dead: self.is_dead,
            state: self.state,
        }
    }
}

/// What the render adapter needs to draw an enemy and its health bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    /// Stable id
    pub id: EnemyId,
    /// Display name
    pub name: String,
    /// Sprite family
    pub visual: VisualKind,
    /// Current position
    pub position: Vec2,
    /// Facing
    pub direction: Direction,
    /// Current health
    pub health: u32,
    /// Maximum health
    pub max_health: u32,
    /// Attack animation flag
    pub is_attacking: bool,
    /// Dead flag
    pub is_dead: bool,
    /// Last behaviour state
    pub state: BehaviourState,
}
