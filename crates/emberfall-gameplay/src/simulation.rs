//! Enemy simulation loop.
//!
//! Every tick each live enemy picks one of three behaviours, in priority
//! order:
//!
//! 1. **Engage**: player within attack range, no battle running, clear line
//!    of sight. The enemy holds still and asks for a battle.
//! 2. **Chase**: player within aggression range and visible. Step toward the
//!    player at full speed.
//! 3. **Wander**: roam around the spawn anchor at half speed, pausing at
//!    each destination.
//!
//! Each enemy's update reads only its own previous state and the tick input,
//! so the result is the same as evaluating every enemy against one snapshot
//! and publishing the new states together.

use std::f32::consts::TAU;
use std::sync::Arc;

use ahash::AHashMap;
use emberfall_common::{Direction, EmberfallResult, EnemyId, MapId};
use glam::Vec2;
use tracing::{debug, info, trace};

use crate::collision::{find_safe_position, has_line_of_sight, slide_move};
use crate::config::SimulationConfig;
use crate::enemy::{BehaviourState, Enemy, EnemySnapshot};
use crate::events::{EventBus, SimEvent};
use crate::geometry::CollisionQuery;
use crate::lifecycle::RespawnQueue;
use crate::obstacles::ObstacleLayout;
use crate::roster::{self, validate_roster, EnemyDefinition};

/// Per-tick input from the map layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    /// Where the player stands this tick
    pub player_position: Vec2,
    /// Whether a battle is already running
    pub battle_active: bool,
}

impl TickInput {
    /// Creates a new tick input.
    #[must_use]
    pub const fn new(player_position: Vec2, battle_active: bool) -> Self {
        Self {
            player_position,
            battle_active,
        }
    }
}

/// Behaviour chosen for one enemy on one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickDecision {
    /// Hold position and request a battle
    Engage {
        /// Distance to the player
        distance: f32,
    },
    /// Move toward the player
    Chase,
    /// Roam around the spawn anchor
    Wander,
}

/// Decides what a live enemy does this tick.
///
/// Line of sight is only traced when the player is within one of the ranges.
#[must_use]
pub fn decide<C: CollisionQuery + ?Sized>(
    enemy: &Enemy,
    input: &TickInput,
    world: &C,
) -> TickDecision {
    let distance = enemy.distance_to(input.player_position);
    let can_engage = distance <= enemy.radii.attack_range && !input.battle_active;
    let can_chase = distance <= enemy.radii.aggression_range;

    if !can_engage && !can_chase {
        return TickDecision::Wander;
    }
    if !has_line_of_sight(enemy.position, input.player_position, world) {
        return TickDecision::Wander;
    }

    if can_engage {
        TickDecision::Engage { distance }
    } else {
        TickDecision::Chase
    }
}

/// Summary of one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Tick number, starting at 1
    pub tick: u64,
    /// Simulation clock after the tick, in milliseconds
    pub clock_ms: u64,
    /// Enemy that asked for a battle this tick
    pub battle_request: Option<EnemyId>,
    /// Enemies that respawned at the start of this tick
    pub respawned: Vec<EnemyId>,
    /// Number of enemies chasing the player
    pub chasing: usize,
}

/// Owner of every enemy on the active map.
///
/// All mutation goes through [`tick`](Self::tick),
/// [`attack_enemy`](Self::attack_enemy) and
/// [`remove_enemy`](Self::remove_enemy); callers only ever see shared
/// references to the enemy records.
#[derive(Debug)]
pub struct EnemySimulation {
    /// Static obstacle layout, shared read-only
    pub(crate) layout: Arc<ObstacleLayout>,
    /// Base definitions by id, used for respawns
    pub(crate) definitions: AHashMap<EnemyId, EnemyDefinition>,
    /// Active enemies, dead ones included until removed
    pub(crate) enemies: Vec<Enemy>,
    /// Pending respawn timers
    pub(crate) respawns: RespawnQueue,
    /// Tuning
    pub(crate) config: SimulationConfig,
    /// Output events
    pub(crate) events: EventBus,
    /// Wander RNG
    rng: fastrand::Rng,
    /// Simulation clock in milliseconds
    clock_ms: u64,
    /// Ticks run so far
    tick_count: u64,
}

impl EnemySimulation {
    /// Creates a simulation from a layout and roster.
    ///
    /// Both inputs are validated; every enemy is placed outside all walls.
    pub fn new(
        layout: impl Into<Arc<ObstacleLayout>>,
        roster: Vec<EnemyDefinition>,
        mut config: SimulationConfig,
    ) -> EmberfallResult<Self> {
        let layout = layout.into();
        layout.validate()?;
        validate_roster(&roster)?;
        config.validate();

        let enemies: Vec<Enemy> = roster
            .iter()
            .map(|def| Enemy::spawn(def, &layout, &config.safe_search))
            .collect();
        let definitions = roster.into_iter().map(|def| (def.id, def)).collect();

        info!(
            "Enemy simulation ready on {} with {} enemies",
            layout.map().display_name(),
            enemies.len()
        );

        Ok(Self {
            layout,
            definitions,
            enemies,
            respawns: RespawnQueue::new(config.respawn_delay()),
            events: EventBus::new(config.event_capacity),
            rng: fastrand::Rng::with_seed(config.seed),
            config,
            clock_ms: 0,
            tick_count: 0,
        })
    }

    /// Creates a simulation with the built-in layout and roster of a map.
    pub fn for_map(map: MapId, config: SimulationConfig) -> EmberfallResult<Self> {
        Self::new(ObstacleLayout::for_map(map), roster::for_map(map), config)
    }

    /// Runs one fixed tick.
    pub fn tick(&mut self, input: TickInput) -> TickReport {
        let dt_ms = self.config.tick_interval_ms;
        self.tick_count += 1;
        self.clock_ms += dt_ms;

        let respawned = self.process_respawns(dt_ms);

        let previous = std::mem::take(&mut self.enemies);
        let mut next = Vec::with_capacity(previous.len());
        let mut engagers: Vec<(usize, f32)> = Vec::new();
        let mut chasing = 0;

        for mut enemy in previous {
            if enemy.is_dead {
                next.push(enemy);
                continue;
            }

            match decide(&enemy, &input, self.layout.as_ref()) {
                TickDecision::Engage { distance } => {
                    enemy.is_moving = false;
                    enemy.is_attacking = true;
                    enemy.state = BehaviourState::Engaging;
                    engagers.push((next.len(), distance));
                },
                TickDecision::Chase => {
                    self.chase(&mut enemy, input.player_position);
                    chasing += 1;
                },
                TickDecision::Wander => self.wander(&mut enemy),
            }
            next.push(enemy);
        }

        let battle_request = pick_engager(&next, &engagers).map(|(index, distance)| {
            let enemy = &mut next[index];
            enemy.last_attack_ms = Some(self.clock_ms);
            debug!("{} ({}) requests a battle at distance {distance:.1}", enemy.id, enemy.name);
            self.events.publish(SimEvent::BattleRequested {
                enemy_id: enemy.id,
                distance,
            });
            enemy.id
        });

        self.enemies = next;

        trace!(
            tick = self.tick_count,
            chasing,
            engaging = engagers.len(),
            "enemy tick"
        );

        TickReport {
            tick: self.tick_count,
            clock_ms: self.clock_ms,
            battle_request,
            respawned,
            chasing,
        }
    }

    /// Steps toward the player at full speed.
    fn chase(&mut self, enemy: &mut Enemy, player: Vec2) {
        let heading = (player - enemy.position).normalize_or_zero();
        self.step(enemy, heading * enemy.radii.speed);
        enemy.is_moving = true;
        enemy.is_attacking = false;
        enemy.state = BehaviourState::Chasing;
    }

    /// Idle/roam behaviour around the spawn anchor.
    fn wander(&mut self, enemy: &mut Enemy) {
        enemy.is_attacking = false;

        let arrived =
            enemy.distance_to(enemy.target_position) < self.config.wander_arrival_threshold;

        if arrived {
            enemy.target_position = self.pick_wander_target(enemy);
            enemy.is_moving = false;
            enemy.state = BehaviourState::WanderIdle;
        } else if !enemy.is_moving {
            if self.rng.f32() < self.config.wander_trigger_chance {
                enemy.target_position = self.pick_wander_target(enemy);
                enemy.is_moving = true;
                enemy.state = BehaviourState::WanderMoving;
            } else {
                enemy.state = BehaviourState::WanderIdle;
            }
        } else {
            let to_target = enemy.target_position - enemy.position;
            let stride = (enemy.radii.speed / 2.0).min(to_target.length());
            if self.step(enemy, to_target.normalize_or_zero() * stride) {
                enemy.state = BehaviourState::WanderMoving;
            } else {
                // Wedged against a wall, wait for a new target
                enemy.is_moving = false;
                enemy.state = BehaviourState::WanderIdle;
            }
        }
    }

    /// Applies an axis-separated move and updates facing. Returns whether the
    /// enemy actually moved.
    fn step(&self, enemy: &mut Enemy, delta: Vec2) -> bool {
        let next = slide_move(enemy.position, delta, self.layout.as_ref());
        if let Some(direction) = Direction::from_delta(delta.x, delta.y) {
            enemy.direction = direction;
        }
        let moved = next != enemy.position;
        enemy.position = next;
        moved
    }

    /// Random point within the wander radius of the spawn anchor, kept inside
    /// the world and outside walls.
    fn pick_wander_target(&mut self, enemy: &Enemy) -> Vec2 {
        let angle = self.rng.f32() * TAU;
        let reach = self.rng.f32() * enemy.radii.wander_radius;
        let raw = enemy.spawn_position + Vec2::from_angle(angle) * reach;
        let clamped = self.layout.bounds().clamp_inset(raw);
        find_safe_position(clamped, &self.layout, &self.config.safe_search)
    }

    /// All enemies currently in the active set, dead ones included.
    #[must_use]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// Looks up an enemy by id.
    #[must_use]
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|enemy| enemy.id == id)
    }

    /// Render-facing records of every enemy.
    #[must_use]
    pub fn snapshot(&self) -> Vec<EnemySnapshot> {
        self.enemies.iter().map(Enemy::snapshot).collect()
    }

    /// Number of enemies in the active set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    /// Whether the active set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Number of enemies that are not dead.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.enemies.iter().filter(|enemy| !enemy.is_dead).count()
    }

    /// The obstacle layout.
    #[must_use]
    pub fn layout(&self) -> &ObstacleLayout {
        &self.layout
    }

    /// Shared handle to the obstacle layout.
    #[must_use]
    pub fn layout_handle(&self) -> Arc<ObstacleLayout> {
        Arc::clone(&self.layout)
    }

    /// The active tuning.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulation clock in milliseconds.
    #[must_use]
    pub const fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Drains all pending output events.
    pub fn drain_events(&self) -> Vec<SimEvent> {
        self.events.drain()
    }
}

/// Nearest engaging enemy wins; exact distance ties go to the lower id.
fn pick_engager(enemies: &[Enemy], engagers: &[(usize, f32)]) -> Option<(usize, f32)> {
    engagers.iter().copied().min_by(|a, b| {
        a.1.total_cmp(&b.1)
            .then_with(|| enemies[a.0].id.cmp(&enemies[b.0].id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::roster::{BehaviourRadii, StatBlock, VisualKind};
    use emberfall_common::WorldBounds;

    fn open_layout() -> ObstacleLayout {
        ObstacleLayout::new(
            MapId::Village,
            WorldBounds::default(),
            Vec::new(),
            Vec::new(),
            Vec2::new(1000.0, 1000.0),
        )
        .expect("empty layout should validate")
    }

    fn walled_layout() -> ObstacleLayout {
        ObstacleLayout::new(
            MapId::Mines,
            WorldBounds::default(),
            vec![Rect::new(320.0, 0.0, 10.0, 600.0)],
            Vec::new(),
            Vec2::new(1000.0, 1000.0),
        )
        .expect("walled layout should validate")
    }

    fn grunt(id: u32, x: f32, y: f32) -> EnemyDefinition {
        EnemyDefinition::new(
            id,
            "Grunt",
            VisualKind::Slime,
            StatBlock::new(40, 5, 0, 1000),
            BehaviourRadii::new(50.0, 100.0, 50.0, 3.0),
            Vec2::new(x, y),
        )
    }

    fn quiet_config() -> SimulationConfig {
        SimulationConfig::default().with_wander_trigger_chance(0.0)
    }

    fn sim(layout: ObstacleLayout, roster: Vec<EnemyDefinition>) -> EnemySimulation {
        EnemySimulation::new(layout, roster, quiet_config()).expect("simulation should build")
    }

    #[test]
    fn test_engage_in_attack_range() {
        let mut sim = sim(open_layout(), vec![grunt(1, 300.0, 300.0)]);
        let report = sim.tick(TickInput::new(Vec2::new(300.0, 330.0), false));

        assert_eq!(report.battle_request, Some(EnemyId::new(1)));
        let enemy = sim.enemy(EnemyId::new(1)).expect("enemy should exist");
        assert_eq!(enemy.position, Vec2::new(300.0, 300.0));
        assert_eq!(enemy.state, BehaviourState::Engaging);
        assert!(enemy.is_attacking);
        assert_eq!(enemy.last_attack_ms, Some(50));

        let events = sim.drain_events();
        assert!(matches!(
            events.as_slice(),
            [SimEvent::BattleRequested { enemy_id, .. }] if *enemy_id == EnemyId::new(1)
        ));
    }

    #[test]
    fn test_no_chase_beyond_aggression_range() {
        let mut sim = sim(open_layout(), vec![grunt(1, 300.0, 300.0)]);
        let report = sim.tick(TickInput::new(Vec2::new(500.0, 300.0), false));

        assert_eq!(report.battle_request, None);
        assert_eq!(report.chasing, 0);
        let enemy = sim.enemy(EnemyId::new(1)).expect("enemy should exist");
        assert_eq!(enemy.state, BehaviourState::WanderIdle);
        assert_eq!(enemy.position, Vec2::new(300.0, 300.0));
    }

    #[test]
    fn test_wander_stays_near_spawn() {
        let config = SimulationConfig::default()
            .with_wander_trigger_chance(0.2)
            .with_seed(42);
        let mut sim = EnemySimulation::new(open_layout(), vec![grunt(1, 300.0, 300.0)], config)
            .expect("simulation should build");
        let spawn = Vec2::new(300.0, 300.0);
        let far_player = TickInput::new(Vec2::new(1800.0, 1800.0), false);
        let mut moved = false;

        for _ in 0..3000 {
            sim.tick(far_player);
            let enemy = sim.enemy(EnemyId::new(1)).expect("enemy should exist");
            assert!(enemy.position.distance(spawn) <= 50.0 + 1.5 + 0.01);
            moved |= enemy.position != spawn;
        }
        assert!(moved, "enemy should have wandered at least once");
    }

    #[test]
    fn test_chase_moves_toward_player() {
        let mut sim = sim(open_layout(), vec![grunt(1, 300.0, 300.0)]);
        let report = sim.tick(TickInput::new(Vec2::new(380.0, 300.0), false));

        assert_eq!(report.chasing, 1);
        let enemy = sim.enemy(EnemyId::new(1)).expect("enemy should exist");
        assert_eq!(enemy.position, Vec2::new(303.0, 300.0));
        assert_eq!(enemy.direction, Direction::Right);
        assert_eq!(enemy.state, BehaviourState::Chasing);
        assert!(enemy.is_moving);
        assert!(!enemy.is_attacking);
    }

    #[test]
    fn test_chase_diagonal_faces_vertical() {
        let mut sim = sim(open_layout(), vec![grunt(1, 300.0, 300.0)]);
        sim.tick(TickInput::new(Vec2::new(360.0, 360.0), false));
        let enemy = sim.enemy(EnemyId::new(1)).expect("enemy should exist");
        assert_eq!(enemy.direction, Direction::Down);
    }

    #[test]
    fn test_wall_blocks_chase_and_engage() {
        let mut sim = sim(walled_layout(), vec![grunt(1, 300.0, 300.0)]);

        let report = sim.tick(TickInput::new(Vec2::new(380.0, 300.0), false));
        assert_eq!(report.chasing, 0);

        let report = sim.tick(TickInput::new(Vec2::new(345.0, 300.0), false));
        assert_eq!(report.battle_request, None);
        assert!(sim.drain_events().is_empty());
    }

    #[test]
    fn test_wander_wedged_against_wall_goes_idle() {
        let mut sim = sim(walled_layout(), vec![grunt(1, 300.0, 300.0)]);
        // Target on the far side of the wall at x = 320..330
        sim.enemies[0].target_position = Vec2::new(340.0, 300.0);
        sim.enemies[0].is_moving = true;
        let far_player = TickInput::new(Vec2::new(1800.0, 1800.0), false);

        sim.tick(far_player);
        let enemy = sim.enemy(EnemyId::new(1)).expect("enemy should exist");
        assert_eq!(enemy.state, BehaviourState::WanderMoving);
        assert_eq!(enemy.position, Vec2::new(301.5, 300.0));

        for _ in 0..30 {
            sim.tick(far_player);
        }
        let enemy = sim.enemy(EnemyId::new(1)).expect("enemy should exist");
        assert_eq!(enemy.state, BehaviourState::WanderIdle);
        assert!(!enemy.is_moving);
        assert_eq!(enemy.position, Vec2::new(319.5, 300.0));
        assert!(!sim.layout().is_blocked(enemy.position));
    }

    #[test]
    fn test_active_battle_suppresses_engage() {
        let mut sim = sim(open_layout(), vec![grunt(1, 300.0, 300.0)]);
        let report = sim.tick(TickInput::new(Vec2::new(300.0, 330.0), true));

        assert_eq!(report.battle_request, None);
        assert!(sim.drain_events().is_empty());
        // Still in aggression range, so it closes in instead
        let enemy = sim.enemy(EnemyId::new(1)).expect("enemy should exist");
        assert_eq!(enemy.state, BehaviourState::Chasing);
    }

    #[test]
    fn test_nearest_engager_wins() {
        let mut sim = sim(
            open_layout(),
            vec![grunt(1, 300.0, 270.0), grunt(2, 300.0, 320.0)],
        );
        let report = sim.tick(TickInput::new(Vec2::new(300.0, 300.0), false));

        assert_eq!(report.battle_request, Some(EnemyId::new(2)));
        let loser = sim.enemy(EnemyId::new(1)).expect("enemy should exist");
        assert_eq!(loser.state, BehaviourState::Engaging);
        assert_eq!(loser.position, Vec2::new(300.0, 270.0));
        assert_eq!(loser.last_attack_ms, None);
        assert_eq!(sim.drain_events().len(), 1);
    }

    #[test]
    fn test_engage_tie_goes_to_lower_id() {
        let mut sim = sim(
            open_layout(),
            vec![grunt(7, 300.0, 280.0), grunt(3, 300.0, 320.0)],
        );
        let report = sim.tick(TickInput::new(Vec2::new(300.0, 300.0), false));
        assert_eq!(report.battle_request, Some(EnemyId::new(3)));
    }

    #[test]
    fn test_dead_enemies_are_skipped() {
        let mut sim = sim(open_layout(), vec![grunt(1, 300.0, 300.0)]);
        sim.attack_enemy(EnemyId::new(1), 999);
        sim.drain_events();

        let report = sim.tick(TickInput::new(Vec2::new(300.0, 320.0), false));
        assert_eq!(report.battle_request, None);
        let enemy = sim.enemy(EnemyId::new(1)).expect("dead enemy stays until removed");
        assert_eq!(enemy.state, BehaviourState::Dead);
        assert_eq!(enemy.position, Vec2::new(300.0, 300.0));
        assert_eq!(sim.live_count(), 0);
        assert_eq!(sim.len(), 1);
    }

    #[test]
    fn test_decide_priorities() {
        let layout = open_layout();
        let enemy = Enemy::spawn(&grunt(1, 300.0, 300.0), &layout, &Default::default());

        let near = TickInput::new(Vec2::new(300.0, 340.0), false);
        assert!(matches!(decide(&enemy, &near, &layout), TickDecision::Engage { .. }));

        let near_in_battle = TickInput::new(Vec2::new(300.0, 340.0), true);
        assert_eq!(decide(&enemy, &near_in_battle, &layout), TickDecision::Chase);

        let far = TickInput::new(Vec2::new(300.0, 450.0), false);
        assert_eq!(decide(&enemy, &far, &layout), TickDecision::Wander);
    }

    #[test]
    fn test_positions_never_enter_walls() {
        let mut sim = EnemySimulation::for_map(
            MapId::Mines,
            SimulationConfig::default().with_wander_trigger_chance(0.05),
        )
        .expect("mines should build");
        let layout = sim.layout_handle();

        for tick in 0..4000u32 {
            // Player circles the center of the labyrinth
            let angle = tick as f32 * 0.01;
            let player = Vec2::new(1000.0, 1000.0) + Vec2::from_angle(angle) * 700.0;
            sim.tick(TickInput::new(player, true));

            for enemy in sim.enemies() {
                assert!(
                    !layout.is_blocked(enemy.position),
                    "{} entered a wall at {:?}",
                    enemy.id,
                    enemy.position
                );
            }
        }
    }

    #[test]
    fn test_clock_advances_per_tick() {
        let mut sim = sim(open_layout(), vec![grunt(1, 300.0, 300.0)]);
        let player = TickInput::new(Vec2::new(1800.0, 1800.0), false);
        sim.tick(player);
        let report = sim.tick(player);
        assert_eq!(report.tick, 2);
        assert_eq!(report.clock_ms, 100);
        assert_eq!(sim.clock_ms(), 100);
    }

    #[test]
    fn test_snapshot_matches_roster_order() {
        let sim = EnemySimulation::for_map(MapId::DarkForest, SimulationConfig::default())
            .expect("forest should build");
        let ids: Vec<u32> = sim.snapshot().iter().map(|s| s.id.raw()).collect();
        assert_eq!(ids, vec![201, 202, 203, 204, 205, 206]);
    }

    #[test]
    fn test_invalid_roster_rejected() {
        let result = EnemySimulation::new(
            open_layout(),
            vec![grunt(1, 300.0, 300.0), grunt(1, 400.0, 400.0)],
            SimulationConfig::default(),
        );
        assert!(result.is_err());
    }
}
