//! Enemy roster: the static base definitions each map starts with.
//!
//! A definition is split into a [`VisualKind`], which only tells the renderer
//! which sprite sheet to use, and a [`StatBlock`] plus [`BehaviourRadii`] that
//! drive combat and AI. Forest monsters borrow bat and rat sprites without
//! sharing their numbers.

use std::collections::HashSet;

use emberfall_common::{EmberfallError, EmberfallResult, EnemyId, MapId, RosterError};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Sprite family used to draw an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualKind {
    /// Flapping bat
    Bat,
    /// Scurrying rat
    Rat,
    /// Bouncing slime
    Slime,
    /// Walking skeleton
    Skeleton,
    /// Cave spider
    Spider,
    /// Prowling wolf
    Wolf,
    /// Stone golem
    Golem,
}

/// Combat numbers of an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    /// Health when freshly spawned
    pub max_health: u32,
    /// Damage dealt per hit
    pub damage: u32,
    /// Percentage of incoming damage ignored (0-100)
    pub damage_reduction: u8,
    /// Minimum time between attacks in milliseconds
    pub attack_cooldown_ms: u64,
}

impl StatBlock {
    /// Creates a new stat block.
    #[must_use]
    pub const fn new(
        max_health: u32,
        damage: u32,
        damage_reduction: u8,
        attack_cooldown_ms: u64,
    ) -> Self {
        Self {
            max_health,
            damage,
            damage_reduction,
            attack_cooldown_ms,
        }
    }
}

/// Distances and speed that shape an enemy's AI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviourRadii {
    /// Distance at which a battle is triggered
    pub attack_range: f32,
    /// Distance at which chasing begins
    pub aggression_range: f32,
    /// Maximum roaming distance from the spawn anchor
    pub wander_radius: f32,
    /// Units per tick while chasing (wandering moves at half)
    pub speed: f32,
}

impl BehaviourRadii {
    /// Creates new behaviour radii.
    #[must_use]
    pub const fn new(
        attack_range: f32,
        aggression_range: f32,
        wander_radius: f32,
        speed: f32,
    ) -> Self {
        Self {
            attack_range,
            aggression_range,
            wander_radius,
            speed,
        }
    }
}

/// Base definition of one roster slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyDefinition {
    /// Stable id, reused on respawn
    pub id: EnemyId,
    /// Display name
    pub name: String,
    /// Sprite family
    pub visual: VisualKind,
    /// Combat numbers
    pub stats: StatBlock,
    /// AI distances and speed
    pub radii: BehaviourRadii,
    /// Authored spawn point (re-placed if it lands in a wall)
    pub spawn: Vec2,
}

impl EnemyDefinition {
    /// Creates a new definition.
    #[must_use]
    pub fn new(
        id: u32,
        name: impl Into<String>,
        visual: VisualKind,
        stats: StatBlock,
        radii: BehaviourRadii,
        spawn: Vec2,
    ) -> Self {
        Self {
            id: EnemyId::new(id),
            name: name.into(),
            visual,
            stats,
            radii,
            spawn,
        }
    }
}

// Shared stat templates
const CAVE_BAT: (StatBlock, BehaviourRadii) = (
    StatBlock::new(30, 5, 0, 1000),
    BehaviourRadii::new(40.0, 160.0, 120.0, 3.0),
);
const MINE_RAT: (StatBlock, BehaviourRadii) = (
    StatBlock::new(20, 4, 0, 800),
    BehaviourRadii::new(35.0, 120.0, 80.0, 2.5),
);
const CAVE_SPIDER: (StatBlock, BehaviourRadii) = (
    StatBlock::new(35, 6, 5, 900),
    BehaviourRadii::new(35.0, 140.0, 70.0, 3.0),
);
const SKELETON: (StatBlock, BehaviourRadii) = (
    StatBlock::new(60, 10, 20, 1500),
    BehaviourRadii::new(45.0, 180.0, 100.0, 2.0),
);
const STONE_GOLEM: (StatBlock, BehaviourRadii) = (
    StatBlock::new(150, 18, 40, 2500),
    BehaviourRadii::new(60.0, 200.0, 60.0, 1.5),
);
const SHADOW_WOLF: (StatBlock, BehaviourRadii) = (
    StatBlock::new(70, 12, 10, 1200),
    BehaviourRadii::new(50.0, 250.0, 150.0, 4.0),
);
const FOREST_WISP: (StatBlock, BehaviourRadii) = (
    StatBlock::new(45, 9, 30, 1000),
    BehaviourRadii::new(40.0, 200.0, 180.0, 3.5),
);
const THORN_CRAWLER: (StatBlock, BehaviourRadii) = (
    StatBlock::new(55, 7, 15, 900),
    BehaviourRadii::new(35.0, 140.0, 90.0, 2.5),
);

fn define(
    id: u32,
    name: &str,
    visual: VisualKind,
    template: (StatBlock, BehaviourRadii),
    x: f32,
    y: f32,
) -> EnemyDefinition {
    EnemyDefinition::new(id, name, visual, template.0, template.1, Vec2::new(x, y))
}

/// Returns the built-in roster for a map.
#[must_use]
pub fn for_map(map: MapId) -> Vec<EnemyDefinition> {
    match map {
        MapId::Village => village(),
        MapId::Mines => mines(),
        MapId::DarkForest => dark_forest(),
    }
}

/// Village: a couple of rats raiding the paddock and garden.
#[must_use]
pub fn village() -> Vec<EnemyDefinition> {
    vec![
        define(1, "Paddock Rat", VisualKind::Rat, MINE_RAT, 600.0, 600.0),
        define(2, "Garden Rat", VisualKind::Rat, MINE_RAT, 1450.0, 1350.0),
    ]
}

/// Mines: bats, rats and a spider in the galleries, skeletons deeper in, a
/// golem in the far chamber.
#[must_use]
pub fn mines() -> Vec<EnemyDefinition> {
    vec![
        define(101, "Cave Bat", VisualKind::Bat, CAVE_BAT, 450.0, 300.0),
        define(102, "Cave Bat", VisualKind::Bat, CAVE_BAT, 750.0, 900.0),
        define(103, "Cave Bat", VisualKind::Bat, CAVE_BAT, 1400.0, 450.0),
        define(104, "Mine Rat", VisualKind::Rat, MINE_RAT, 1100.0, 1500.0),
        define(105, "Mine Rat", VisualKind::Rat, MINE_RAT, 450.0, 1800.0),
        define(106, "Restless Skeleton", VisualKind::Skeleton, SKELETON, 1600.0, 1800.0),
        define(107, "Restless Skeleton", VisualKind::Skeleton, SKELETON, 1350.0, 1000.0),
        define(108, "Stone Golem", VisualKind::Golem, STONE_GOLEM, 1800.0, 300.0),
        define(109, "Cave Spider", VisualKind::Spider, CAVE_SPIDER, 150.0, 1100.0),
    ]
}

/// Dark forest: wolves and wisps between the trees, crawlers in the brush.
/// Wisps reuse the bat sprites and crawlers the rat sprites.
#[must_use]
pub fn dark_forest() -> Vec<EnemyDefinition> {
    vec![
        define(201, "Shadow Wolf", VisualKind::Wolf, SHADOW_WOLF, 500.0, 500.0),
        define(202, "Shadow Wolf", VisualKind::Wolf, SHADOW_WOLF, 1500.0, 1000.0),
        define(203, "Forest Wisp", VisualKind::Bat, FOREST_WISP, 900.0, 400.0),
        define(204, "Forest Wisp", VisualKind::Bat, FOREST_WISP, 1200.0, 1600.0),
        define(205, "Thorn Crawler", VisualKind::Rat, THORN_CRAWLER, 300.0, 1500.0),
        define(206, "Thorn Crawler", VisualKind::Rat, THORN_CRAWLER, 1750.0, 1800.0),
    ]
}

/// Parses and validates a roster authored in RON.
pub fn from_ron(source: &str) -> EmberfallResult<Vec<EnemyDefinition>> {
    let roster: Vec<EnemyDefinition> =
        ron::from_str(source).map_err(|e| EmberfallError::Serialization(e.to_string()))?;
    validate_roster(&roster)?;
    Ok(roster)
}

/// Checks ids are unique and every definition is internally consistent.
pub fn validate_roster(roster: &[EnemyDefinition]) -> Result<(), RosterError> {
    let mut seen = HashSet::with_capacity(roster.len());
    for def in roster {
        if !seen.insert(def.id) {
            return Err(RosterError::DuplicateId(def.id));
        }
        validate_definition(def)?;
    }
    Ok(())
}

fn validate_definition(def: &EnemyDefinition) -> Result<(), RosterError> {
    let invalid = |reason: &str| RosterError::InvalidDefinition {
        id: def.id,
        reason: reason.to_string(),
    };

    if def.stats.max_health == 0 {
        return Err(invalid("max_health must be positive"));
    }
    if def.stats.damage_reduction > 100 {
        return Err(invalid("damage_reduction must be within 0-100"));
    }

    let radii = &def.radii;
    let all_finite = [
        radii.attack_range,
        radii.aggression_range,
        radii.wander_radius,
        radii.speed,
    ]
    .iter()
    .all(|v| v.is_finite() && *v >= 0.0);
    if !all_finite {
        return Err(invalid("radii and speed must be finite and non-negative"));
    }
    if radii.attack_range > radii.aggression_range {
        return Err(invalid("attack_range exceeds aggression_range"));
    }
    if !def.spawn.is_finite() {
        return Err(invalid("spawn must be finite"));
    }

    Ok(())
}
