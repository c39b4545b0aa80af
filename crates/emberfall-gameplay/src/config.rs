//! Simulation tuning.
//!
//! Every field has a default matching the shipped game; configs loaded from
//! disk may omit any of them.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::collision::SafeSearch;

/// Tuning parameters for the enemy simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Length of one simulation tick in milliseconds
    pub tick_interval_ms: u64,
    /// Delay between removing an enemy and its respawn, in seconds
    pub respawn_delay_secs: u64,
    /// Distance at which a wandering enemy counts as arrived
    pub wander_arrival_threshold: f32,
    /// Per-tick chance that an idle enemy starts wandering (0.0 - 1.0)
    pub wander_trigger_chance: f32,
    /// Capacity of the simulation event channel
    pub event_capacity: usize,
    /// Seed for the wander RNG
    pub seed: u64,
    /// Safe-position ring search parameters
    pub safe_search: SafeSearch,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            respawn_delay_secs: 300, // 5 minutes
            wander_arrival_threshold: 5.0,
            wander_trigger_chance: 0.01,
            event_capacity: 1024,
            seed: 0x00E3_BE2F,
            safe_search: SafeSearch::default(),
        }
    }
}

impl SimulationConfig {
    /// Tick length as a duration.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Respawn delay as a duration.
    #[must_use]
    pub fn respawn_delay(&self) -> Duration {
        Duration::from_secs(self.respawn_delay_secs)
    }

    /// Sets the RNG seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the respawn delay.
    #[must_use]
    pub const fn with_respawn_delay_secs(mut self, secs: u64) -> Self {
        self.respawn_delay_secs = secs;
        self
    }

    /// Sets the idle wander trigger chance.
    #[must_use]
    pub fn with_wander_trigger_chance(mut self, chance: f32) -> Self {
        self.wander_trigger_chance = chance;
        self
    }

    /// Validate and clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.tick_interval_ms = self.tick_interval_ms.clamp(1, 1000);
        self.wander_arrival_threshold = self.wander_arrival_threshold.clamp(0.1, 100.0);
        self.wander_trigger_chance = self.wander_trigger_chance.clamp(0.0, 1.0);
        self.safe_search.step = self.safe_search.step.clamp(1.0, 500.0);
        self.safe_search.max_radius = self
            .safe_search
            .max_radius
            .clamp(self.safe_search.step, 2000.0);
        self.event_capacity = self.event_capacity.max(16);
    }
}
