//! ID types for enemies and maps.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an enemy roster slot.
///
/// The same id is reused when an enemy respawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates an enemy ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enemy#{}", self.0)
    }
}

/// Maps with their own obstacle layout and enemy roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MapId {
    /// Starting village, fenced paddocks
    #[default]
    Village,
    /// Mine labyrinth under the hill
    Mines,
    /// Dark forest east of the village
    DarkForest,
}

impl MapId {
    /// All maps.
    pub const ALL: [Self; 3] = [Self::Village, Self::Mines, Self::DarkForest];

    /// Display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Village => "Village",
            Self::Mines => "Mines",
            Self::DarkForest => "Dark Forest",
        }
    }
}
