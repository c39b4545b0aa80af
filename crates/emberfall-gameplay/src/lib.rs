//! # Emberfall Gameplay
//!
//! Enemy AI and world collision for Emberfall's overworld maps.
//!
//! This crate provides:
//! - Rectangle geometry and the collision query seam
//! - Per-map obstacle layouts with walkable passages
//! - Safe-position search, line of sight and sliding movement
//! - Enemy rosters and runtime enemy state
//! - The per-tick engage/chase/wander simulation
//! - Damage, removal and timed respawn
//! - Event bus for battle requests and lifecycle events

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod collision;
pub mod config;
pub mod enemy;
pub mod events;
pub mod geometry;
pub mod lifecycle;
pub mod obstacles;
pub mod roster;
pub mod simulation;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::collision::*;
    pub use crate::config::*;
    pub use crate::enemy::*;
    pub use crate::events::*;
    pub use crate::geometry::*;
    pub use crate::lifecycle::*;
    pub use crate::obstacles::*;
    pub use crate::roster::{
        validate_roster, BehaviourRadii, EnemyDefinition, StatBlock, VisualKind,
    };
    pub use crate::simulation::*;
}

pub use prelude::*;
