//! Engine configuration.
//!
//! Selects the map, run length and pacing, the scripted player, optional RON
//! overrides for the layout and roster, and the simulation tuning. Loaded from
//! TOML; missing or broken files fall back to defaults.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use emberfall_common::MapId;
use emberfall_gameplay::SimulationConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "emberfall.toml";

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Run ===
    /// Map to simulate
    pub map: MapId,
    /// Length of the run in seconds of simulation time
    pub duration_secs: u64,
    /// Driver frames per second
    pub frame_rate: u32,
    /// Maximum simulation ticks per frame
    pub max_ticks_per_frame: u32,
    /// Sleep between frames instead of running flat out
    pub realtime: bool,

    // === Scripted player ===
    /// Player movement per tick
    pub player_speed: f32,
    /// Raw damage dealt per battle turn
    pub player_damage: u32,
    /// Patrol route; empty uses a loop around the map center
    pub waypoints: Vec<[f32; 2]>,

    // === Data overrides ===
    /// RON obstacle layout replacing the built-in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_path: Option<PathBuf>,
    /// RON roster replacing the built-in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roster_path: Option<PathBuf>,
    /// Where to write the final JSON snapshot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,

    // === Simulation ===
    /// Enemy simulation tuning
    pub simulation: SimulationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            map: MapId::Village,
            duration_secs: 60,
            frame_rate: 60,
            max_ticks_per_frame: 10,
            realtime: false,
            player_speed: 4.0,
            player_damage: 25,
            waypoints: Vec::new(),
            layout_path: None,
            roster_path: None,
            snapshot_path: None,
            simulation: SimulationConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str(&contents) {
                    Ok(config) => {
                        info!("Loaded config from {}", path.display());
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.duration_secs = self.duration_secs.clamp(1, 86_400);
        self.frame_rate = self.frame_rate.clamp(1, 240);
        self.max_ticks_per_frame = self.max_ticks_per_frame.clamp(1, 100);

        self.player_speed = self.player_speed.clamp(0.1, 50.0);
        self.player_damage = self.player_damage.max(1);
        self.waypoints
            .retain(|point| point.iter().all(|v| v.is_finite()));

        self.simulation.validate();
    }
}
