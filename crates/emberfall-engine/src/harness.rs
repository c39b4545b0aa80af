//! Headless run of one map.
//!
//! Stands in for the map and battle layers: a scripted player patrols a route
//! and any battle request is settled by trading blows until the enemy dies,
//! after which it is removed and its respawn scheduled.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use emberfall_common::{EnemyId, MapId};
use emberfall_gameplay::{
    find_safe_position, roster, slide_move, DamageOutcome, EnemySimulation, EnemySnapshot,
    ObstacleLayout, TickInput,
};
use glam::Vec2;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::timing::TickClock;

/// Counters collected over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Ticks simulated
    pub ticks: u64,
    /// Battles started
    pub battles: u32,
    /// Enemies killed and removed
    pub kills: u32,
    /// Enemies that came back
    pub respawns: u32,
}

/// What gets written to the snapshot file.
#[derive(Debug, Serialize)]
struct SnapshotDump {
    map: MapId,
    clock_ms: u64,
    summary: RunSummary,
    player: Vec2,
    enemies: Vec<EnemySnapshot>,
}

/// Player walking a closed route.
#[derive(Debug)]
struct ScriptedPlayer {
    position: Vec2,
    route: Vec<Vec2>,
    next: usize,
    speed: f32,
}

impl ScriptedPlayer {
    fn new(route: Vec<Vec2>, speed: f32) -> Self {
        Self {
            position: route.first().copied().unwrap_or(Vec2::ZERO),
            route,
            next: 1,
            speed,
        }
    }

    fn walk(&mut self, layout: &ObstacleLayout) {
        if self.route.len() < 2 {
            return;
        }

        let target = self.route[self.next % self.route.len()];
        let to_target = target - self.position;
        if to_target.length() <= self.speed {
            self.next = (self.next + 1) % self.route.len();
        }
        let stride = self.speed.min(to_target.length());
        self.position = slide_move(self.position, to_target.normalize_or_zero() * stride, layout);
    }
}

/// Drives the simulation from the engine config.
#[derive(Debug)]
pub struct Harness {
    sim: EnemySimulation,
    player: ScriptedPlayer,
    battle: Option<EnemyId>,
    clock: TickClock,
    config: EngineConfig,
    summary: RunSummary,
}

impl Harness {
    /// Builds the simulation, loading layout and roster overrides if set.
    ///
    /// The config is validated first, so out-of-range values are clamped.
    pub fn new(mut config: EngineConfig) -> Result<Self> {
        config.validate();

        let layout = match &config.layout_path {
            Some(path) => ObstacleLayout::from_ron(&read(path)?)
                .with_context(|| format!("invalid layout in {}", path.display()))?,
            None => ObstacleLayout::for_map(config.map),
        };
        let roster = match &config.roster_path {
            Some(path) => roster::from_ron(&read(path)?)
                .with_context(|| format!("invalid roster in {}", path.display()))?,
            None => roster::for_map(config.map),
        };

        let route = patrol_route(&config.waypoints, &layout, &config);
        let player = ScriptedPlayer::new(route, config.player_speed);
        let sim = EnemySimulation::new(layout, roster, config.simulation.clone())?;
        let clock = TickClock::new(sim.config().tick_interval(), config.max_ticks_per_frame);

        Ok(Self {
            sim,
            player,
            battle: None,
            clock,
            config,
            summary: RunSummary::default(),
        })
    }

    /// Runs frames for the configured duration.
    pub fn run(&mut self) -> Result<RunSummary> {
        let frame = Duration::from_secs(1) / self.config.frame_rate;
        let frames = self.config.duration_secs * u64::from(self.config.frame_rate);
        info!(
            "Running {} for {}s ({} frames, {:?} ticks)",
            self.sim.layout().map().display_name(),
            self.config.duration_secs,
            frames,
            self.clock.tick()
        );
        self.clock.reset();

        for _ in 0..frames {
            for _ in 0..self.clock.accumulate(frame) {
                self.step();
            }
            if self.config.realtime {
                thread::sleep(frame);
            }
        }

        info!(
            ticks = self.summary.ticks,
            battles = self.summary.battles,
            kills = self.summary.kills,
            respawns = self.summary.respawns,
            live = self.sim.live_count(),
            pending = self.sim.pending_respawns(),
            "Run complete"
        );

        if let Some(path) = self.config.snapshot_path.clone() {
            self.write_snapshot(&path)?;
        }

        Ok(self.summary)
    }

    /// One simulation tick plus the stand-in map and battle layers.
    pub fn step(&mut self) {
        let input = TickInput::new(self.player.position, self.battle.is_some());
        let report = self.sim.tick(input);
        self.summary.ticks += 1;
        self.summary.respawns += report.respawned.len() as u32;

        if let Some(id) = report.battle_request {
            info!("Battle started with {id}");
            self.battle = Some(id);
            self.summary.battles += 1;
        }

        for event in self.sim.drain_events() {
            debug!(enemy = %event.enemy_id(), ?event, "sim event");
        }

        match self.battle {
            Some(id) => self.battle_turn(id),
            None => self.player.walk(self.sim.layout()),
        }
    }

    /// Player hits once; the battle ends when the enemy is gone.
    fn battle_turn(&mut self, id: EnemyId) {
        let reduction = self
            .sim
            .enemy(id)
            .map_or(0, |enemy| u32::from(enemy.stats.damage_reduction.min(100)));
        let damage = (self.config.player_damage.saturating_mul(100 - reduction) / 100).max(1);

        match self.sim.attack_enemy(id, damage) {
            Some(DamageOutcome::Wounded { .. }) => {},
            Some(DamageOutcome::Killed | DamageOutcome::Ignored) | None => {
                if self.sim.remove_enemy(id) {
                    self.summary.kills += 1;
                }
                info!("Battle with {id} over");
                self.battle = None;
            },
        }
    }

    /// Writes the current enemy snapshot as pretty JSON.
    pub fn write_snapshot(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let dump = SnapshotDump {
            map: self.sim.layout().map(),
            clock_ms: self.sim.clock_ms(),
            summary: self.summary,
            player: self.player.position,
            enemies: self.sim.snapshot(),
        };
        let json = serde_json::to_string_pretty(&dump)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!("Wrote snapshot to {}", path.display());
        Ok(())
    }

    /// The driven simulation.
    #[cfg(test)]
    pub fn simulation(&self) -> &EnemySimulation {
        &self.sim
    }

    /// Current player position.
    #[cfg(test)]
    pub fn player_position(&self) -> Vec2 {
        self.player.position
    }

    /// Enemy currently in battle with the player.
    #[cfg(test)]
    pub fn battle(&self) -> Option<EnemyId> {
        self.battle
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Configured waypoints, or a square around the map center, moved out of walls.
fn patrol_route(
    waypoints: &[[f32; 2]],
    layout: &ObstacleLayout,
    config: &EngineConfig,
) -> Vec<Vec2> {
    let points: Vec<Vec2> = if waypoints.is_empty() {
        let center = layout.bounds().center();
        [(-400.0, -400.0), (400.0, -400.0), (400.0, 400.0), (-400.0, 400.0)]
            .into_iter()
            .map(|(dx, dy)| center + Vec2::new(dx, dy))
            .collect()
    } else {
        waypoints.iter().map(|&[x, y]| Vec2::new(x, y)).collect()
    };

    points
        .into_iter()
        .map(|point| {
            let clamped = layout.bounds().clamp_inset(point);
            find_safe_position(clamped, layout, &config.simulation.safe_search)
        })
        .collect()
}
