//! Static obstacle layouts for each map.
//!
//! A layout is fixed for the life of a map: obstacles block both movement and
//! sight, passages carve passable gaps out of them (the mines entrance, the
//! village north gate), and the fallback point is where the safe-position
//! search lands when it finds nothing closer.

use emberfall_common::{EmberfallError, EmberfallResult, LayoutError, MapId, WorldBounds};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::collision::is_point_in_obstacle;
use crate::geometry::{CollisionQuery, Rect};

/// Minimum thickness of any obstacle along either axis.
///
/// Line of sight samples integer lattice points, so nothing thinner than one
/// unit may be authored.
pub const MIN_WALL_THICKNESS: f32 = 1.0;

/// Obstacle set and passable regions of one map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleLayout {
    /// Map this layout belongs to
    map: MapId,
    /// World extent and generation inset
    #[serde(default)]
    bounds: WorldBounds,
    /// Blocking rectangles
    obstacles: Vec<Rect>,
    /// Passable carve-outs, checked before obstacles
    #[serde(default)]
    passages: Vec<Rect>,
    /// Last-resort safe position
    fallback: Vec2,
}

impl ObstacleLayout {
    /// Creates and validates a layout.
    pub fn new(
        map: MapId,
        bounds: WorldBounds,
        obstacles: Vec<Rect>,
        passages: Vec<Rect>,
        fallback: Vec2,
    ) -> Result<Self, LayoutError> {
        let layout = Self {
            map,
            bounds,
            obstacles,
            passages,
            fallback,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// Parses and validates a layout authored in RON.
    pub fn from_ron(source: &str) -> EmberfallResult<Self> {
        let layout: Self =
            ron::from_str(source).map_err(|e| EmberfallError::Serialization(e.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Serializes the layout to pretty RON.
    pub fn to_ron(&self) -> EmberfallResult<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| EmberfallError::Serialization(e.to_string()))
    }

    /// Checks the world bounds, wall thickness, world containment and the
    /// fallback point.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if !self.bounds.is_valid() {
            return Err(LayoutError::InvalidBounds {
                map: self.map,
                width: self.bounds.width,
                height: self.bounds.height,
                inset: self.bounds.inset,
            });
        }

        for (index, obstacle) in self.obstacles.iter().enumerate() {
            if obstacle.thickness() < MIN_WALL_THICKNESS {
                return Err(LayoutError::TooThin {
                    map: self.map,
                    index,
                    min: MIN_WALL_THICKNESS,
                });
            }
            let inside = self.bounds.contains(Vec2::new(obstacle.x, obstacle.y))
                && self.bounds.contains(Vec2::new(obstacle.right(), obstacle.bottom()));
            if !inside {
                return Err(LayoutError::OutOfBounds {
                    map: self.map,
                    index,
                });
            }
        }

        if self.is_blocked(self.fallback) {
            return Err(LayoutError::BlockedFallback {
                map: self.map,
                x: self.fallback.x,
                y: self.fallback.y,
            });
        }

        Ok(())
    }

    /// Returns the built-in layout for a map.
    #[must_use]
    pub fn for_map(map: MapId) -> Self {
        match map {
            MapId::Village => Self::village(),
            MapId::Mines => Self::mines(),
            MapId::DarkForest => Self::dark_forest(),
        }
    }

    /// Village: paddock and garden fences, plus the north boundary fence
    /// with the road to the mines cut through it.
    #[must_use]
    pub fn village() -> Self {
        Self {
            map: MapId::Village,
            bounds: WorldBounds::default(),
            obstacles: vec![
                // North boundary fence
                Rect::new(0.0, 100.0, 2000.0, 10.0),
                // Paddock, gate on the south side
                Rect::new(400.0, 400.0, 400.0, 10.0),
                Rect::new(400.0, 400.0, 10.0, 400.0),
                Rect::new(790.0, 400.0, 10.0, 400.0),
                Rect::new(400.0, 790.0, 150.0, 10.0),
                Rect::new(650.0, 790.0, 150.0, 10.0),
                // Garden, gate on the south side
                Rect::new(1200.0, 1200.0, 500.0, 10.0),
                Rect::new(1200.0, 1200.0, 10.0, 300.0),
                Rect::new(1690.0, 1200.0, 10.0, 300.0),
                Rect::new(1200.0, 1490.0, 200.0, 10.0),
                Rect::new(1500.0, 1490.0, 200.0, 10.0),
                // Well and market stalls
                Rect::new(980.0, 880.0, 40.0, 40.0),
                Rect::new(1100.0, 700.0, 120.0, 30.0),
                Rect::new(1300.0, 700.0, 120.0, 30.0),
            ],
            passages: vec![Rect::new(900.0, 90.0, 200.0, 30.0)],
            fallback: Vec2::new(1000.0, 1000.0),
        }
    }

    /// Mines: labyrinth walls inside a solid rock border, entrance at the
    /// bottom center.
    #[must_use]
    pub fn mines() -> Self {
        Self {
            map: MapId::Mines,
            bounds: WorldBounds::default(),
            obstacles: vec![
                // Rock border
                Rect::new(0.0, 0.0, 2000.0, 40.0),
                Rect::new(0.0, 1960.0, 2000.0, 40.0),
                Rect::new(0.0, 0.0, 40.0, 2000.0),
                Rect::new(1960.0, 0.0, 40.0, 2000.0),
                // West galleries
                Rect::new(300.0, 40.0, 40.0, 600.0),
                Rect::new(300.0, 800.0, 40.0, 700.0),
                Rect::new(40.0, 1600.0, 500.0, 40.0),
                Rect::new(600.0, 300.0, 40.0, 900.0),
                // Central shafts
                Rect::new(900.0, 40.0, 40.0, 500.0),
                Rect::new(900.0, 700.0, 40.0, 500.0),
                Rect::new(600.0, 1400.0, 600.0, 40.0),
                Rect::new(800.0, 1700.0, 40.0, 260.0),
                // East chambers
                Rect::new(1200.0, 300.0, 500.0, 40.0),
                Rect::new(1200.0, 300.0, 40.0, 900.0),
                Rect::new(1500.0, 600.0, 40.0, 800.0),
                Rect::new(1700.0, 900.0, 260.0, 40.0),
                Rect::new(1200.0, 1600.0, 500.0, 40.0),
            ],
            passages: vec![Rect::new(900.0, 1940.0, 200.0, 60.0)],
            fallback: Vec2::new(1000.0, 1000.0),
        }
    }

    /// Dark forest: scattered tree trunks, no walls.
    #[must_use]
    pub fn dark_forest() -> Self {
        const TRUNK: f32 = 40.0;
        let trunks = [
            (200.0, 200.0),
            (500.0, 350.0),
            (800.0, 150.0),
            (1100.0, 300.0),
            (1400.0, 200.0),
            (1700.0, 400.0),
            (300.0, 700.0),
            (650.0, 800.0),
            (1000.0, 650.0),
            (1300.0, 850.0),
            (1650.0, 750.0),
            (250.0, 1200.0),
            (600.0, 1300.0),
            (950.0, 1150.0),
            (1250.0, 1400.0),
            (1600.0, 1250.0),
            (400.0, 1700.0),
            (900.0, 1650.0),
            (1450.0, 1750.0),
            (1800.0, 1600.0),
        ];

        Self {
            map: MapId::DarkForest,
            bounds: WorldBounds::default(),
            obstacles: trunks
                .iter()
                .map(|&(x, y)| Rect::new(x, y, TRUNK, TRUNK))
                .collect(),
            passages: Vec::new(),
            fallback: Vec2::new(1000.0, 1000.0),
        }
    }

    /// Map this layout belongs to.
    #[must_use]
    pub const fn map(&self) -> MapId {
        self.map
    }

    /// World bounds.
    #[must_use]
    pub const fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Blocking rectangles.
    #[must_use]
    pub fn obstacles(&self) -> &[Rect] {
        &self.obstacles
    }

    /// Passable carve-outs.
    #[must_use]
    pub fn passages(&self) -> &[Rect] {
        &self.passages
    }

    /// Last-resort safe position.
    #[must_use]
    pub const fn fallback(&self) -> Vec2 {
        self.fallback
    }
}

impl CollisionQuery for ObstacleLayout {
    fn is_blocked(&self, point: Vec2) -> bool {
        is_point_in_obstacle(point, &self.obstacles, &self.passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_layouts_validate() {
        for map in MapId::ALL {
            let layout = ObstacleLayout::for_map(map);
            assert_eq!(layout.map(), map);
            layout.validate().expect("built-in layout should validate");
        }
    }

    #[test]
    fn test_mines_entrance_is_passable() {
        let mines = ObstacleLayout::mines();
        assert!(!mines.is_blocked(Vec2::new(1000.0, 1980.0)));
        assert!(mines.is_blocked(Vec2::new(500.0, 1980.0)));
    }

    #[test]
    fn test_village_gate_is_passable() {
        let village = ObstacleLayout::village();
        assert!(!village.is_blocked(Vec2::new(1000.0, 105.0)));
        assert!(village.is_blocked(Vec2::new(300.0, 105.0)));
    }

    #[test]
    fn test_forest_trunks() {
        let forest = ObstacleLayout::dark_forest();
        assert_eq!(forest.obstacles().len(), 20);
        assert!(forest.is_blocked(Vec2::new(220.0, 220.0)));
        assert!(!forest.is_blocked(Vec2::new(150.0, 150.0)));
    }

    #[test]
    fn test_too_thin_rejected() {
        let result = ObstacleLayout::new(
            MapId::Mines,
            WorldBounds::default(),
            vec![Rect::new(10.0, 10.0, 0.5, 100.0)],
            Vec::new(),
            Vec2::new(1000.0, 1000.0),
        );
        assert!(matches!(result, Err(LayoutError::TooThin { index: 0, .. })));
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let result = ObstacleLayout::new(
            MapId::Mines,
            WorldBounds::default(),
            vec![Rect::new(1990.0, 10.0, 40.0, 100.0)],
            Vec::new(),
            Vec2::new(1000.0, 1000.0),
        );
        assert!(matches!(result, Err(LayoutError::OutOfBounds { index: 0, .. })));
    }

    #[test]
    fn test_blocked_fallback_rejected() {
        let result = ObstacleLayout::new(
            MapId::Village,
            WorldBounds::default(),
            vec![Rect::new(900.0, 900.0, 200.0, 200.0)],
            Vec::new(),
            Vec2::new(1000.0, 1000.0),
        );
        assert!(matches!(result, Err(LayoutError::BlockedFallback { .. })));
    }

    #[test]
    fn test_inverted_inset_rejected() {
        let source = r"(
            map: Village,
            bounds: (width: 2000.0, height: 2000.0, inset: 1200.0),
            obstacles: [],
            fallback: (1000.0, 1000.0),
        )";
        let result = ObstacleLayout::from_ron(source);
        assert!(matches!(
            result,
            Err(EmberfallError::Layout(LayoutError::InvalidBounds { .. }))
        ));
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        let result = ObstacleLayout::new(
            MapId::Mines,
            WorldBounds::new(f32::NAN, 2000.0, 50.0),
            Vec::new(),
            Vec::new(),
            Vec2::new(1000.0, 1000.0),
        );
        assert!(matches!(result, Err(LayoutError::InvalidBounds { .. })));

        let result = ObstacleLayout::new(
            MapId::Mines,
            WorldBounds::new(2000.0, -5.0, 0.0),
            Vec::new(),
            Vec::new(),
            Vec2::new(1000.0, 1000.0),
        );
        assert!(matches!(result, Err(LayoutError::InvalidBounds { .. })));
    }

    #[test]
    fn test_ron_roundtrip() {
        let original = ObstacleLayout::mines();
        let text = original.to_ron().expect("serialize should succeed");
        let parsed = ObstacleLayout::from_ron(&text).expect("parse should succeed");
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_from_ron_authored() {
        let source = r"(
            map: DarkForest,
            obstacles: [(x: 100.0, y: 100.0, w: 20.0, h: 20.0)],
            fallback: (500.0, 500.0),
        )";
        let layout = ObstacleLayout::from_ron(source).expect("parse should succeed");
        assert_eq!(layout.obstacles().len(), 1);
        assert!(layout.passages().is_empty());
        assert_eq!(layout.bounds(), WorldBounds::default());
    }

    #[test]
    fn test_from_ron_invalid() {
        let result = ObstacleLayout::from_ron("(map: Nowhere)");
        assert!(matches!(result, Err(EmberfallError::Serialization(_))));
    }
}
