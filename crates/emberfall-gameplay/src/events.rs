//! Event bus for simulation output.
//!
//! The battle initiator listens for [`SimEvent::BattleRequested`]; the render
//! adapter may use the lifecycle events for effects and health bars.

use crossbeam_channel::{bounded, Receiver, Sender};
use emberfall_common::EnemyId;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Events published by the enemy simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// An enemy reached the player and wants to start a battle
    BattleRequested {
        /// Enemy ID
        enemy_id: EnemyId,
        /// Distance to the player when the request fired
        distance: f32,
    },
    /// An enemy took damage
    EnemyDamaged {
        /// Enemy ID
        enemy_id: EnemyId,
        /// Damage applied
        amount: u32,
        /// Health left
        health: u32,
    },
    /// An enemy's health reached zero
    EnemyDied {
        /// Enemy ID
        enemy_id: EnemyId,
    },
    /// An enemy was evicted and its respawn scheduled
    EnemyRemoved {
        /// Enemy ID
        enemy_id: EnemyId,
        /// Milliseconds until the respawn fires
        respawn_in_ms: u64,
    },
    /// A removed enemy came back
    EnemyRespawned {
        /// Enemy ID
        enemy_id: EnemyId,
        /// Where it was placed
        position: Vec2,
    },
}

impl SimEvent {
    /// Enemy the event concerns.
    #[must_use]
    pub const fn enemy_id(&self) -> EnemyId {
        match self {
            Self::BattleRequested { enemy_id, .. }
            | Self::EnemyDamaged { enemy_id, .. }
            | Self::EnemyDied { enemy_id }
            | Self::EnemyRemoved { enemy_id, .. }
            | Self::EnemyRespawned { enemy_id, .. } => *enemy_id,
        }
    }
}

/// Event bus for broadcasting simulation events.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<SimEvent>,
    /// Receiver for collecting events
    receiver: Receiver<SimEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: SimEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<SimEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
