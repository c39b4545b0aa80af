//! Error types for Emberfall.
//!
//! The simulation itself never fails once constructed; these errors cover
//! loading and validating the static data it is built from.

use thiserror::Error;

use crate::ids::{EnemyId, MapId};

/// Top-level error type for Emberfall operations.
#[derive(Debug, Error)]
pub enum EmberfallError {
    /// Obstacle layout errors
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Enemy roster errors
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Obstacle layout validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// World extent is not positive and finite, or the inset leaves no room
    #[error("World bounds {width}x{height} with inset {inset} on {map:?} are invalid")]
    InvalidBounds {
        /// Map the layout belongs to
        map: MapId,
        /// World width
        width: f32,
        /// World height
        height: f32,
        /// Generation inset
        inset: f32,
    },

    /// Obstacle thinner than the minimum wall thickness
    #[error("Obstacle {index} on {map:?} is thinner than {min} units")]
    TooThin {
        /// Map the layout belongs to
        map: MapId,
        /// Index of the obstacle
        index: usize,
        /// Minimum thickness
        min: f32,
    },

    /// Obstacle extends past the world edge
    #[error("Obstacle {index} on {map:?} lies outside the world bounds")]
    OutOfBounds {
        /// Map the layout belongs to
        map: MapId,
        /// Index of the obstacle
        index: usize,
    },

    /// Fallback position is itself blocked
    #[error("Fallback position ({x}, {y}) on {map:?} is blocked")]
    BlockedFallback {
        /// Map the layout belongs to
        map: MapId,
        /// X coordinate
        x: f32,
        /// Y coordinate
        y: f32,
    },
}

/// Enemy roster validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RosterError {
    /// Two definitions share an id
    #[error("Duplicate enemy id: {0}")]
    DuplicateId(EnemyId),

    /// A definition has invalid stats or radii
    #[error("Invalid definition for {id}: {reason}")]
    InvalidDefinition {
        /// Offending enemy
        id: EnemyId,
        /// What is wrong
        reason: String,
    },
}

/// Result type alias for Emberfall operations.
pub type EmberfallResult<T> = Result<T, EmberfallError>;
