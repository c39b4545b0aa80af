//! Damage, removal and respawn of enemies.
//!
//! Killing an enemy only marks it dead; it stays in the active set until the
//! battle layer calls [`EnemySimulation::remove_enemy`], which evicts it and
//! starts a respawn timer measured in simulation time.

use std::time::Duration;

use emberfall_common::EnemyId;
use tracing::{debug, info, warn};

use crate::enemy::{DamageOutcome, Enemy};
use crate::events::SimEvent;
use crate::simulation::EnemySimulation;

/// A removed enemy waiting to come back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRespawn {
    /// Enemy to respawn
    pub id: EnemyId,
    /// Milliseconds left on the timer
    pub remaining_ms: u64,
}

/// Respawn timers in scheduling order.
#[derive(Debug, Clone, Default)]
pub struct RespawnQueue {
    /// Delay applied to every new timer
    delay_ms: u64,
    /// Active timers
    pending: Vec<PendingRespawn>,
}

impl RespawnQueue {
    /// Creates an empty queue with the given respawn delay.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            pending: Vec::new(),
        }
    }

    /// Starts (or restarts) the timer for an enemy.
    pub fn schedule(&mut self, id: EnemyId) {
        self.pending.retain(|entry| entry.id != id);
        self.pending.push(PendingRespawn {
            id,
            remaining_ms: self.delay_ms,
        });
    }

    /// Advances every timer and returns the ids that are due, in scheduling
    /// order.
    pub fn update(&mut self, dt_ms: u64) -> Vec<EnemyId> {
        let mut ready = Vec::new();

        self.pending.retain_mut(|entry| {
            entry.remaining_ms = entry.remaining_ms.saturating_sub(dt_ms);
            if entry.remaining_ms == 0 {
                ready.push(entry.id);
                false
            } else {
                true
            }
        });

        ready
    }

    /// Time left before an enemy respawns.
    #[must_use]
    pub fn time_remaining(&self, id: EnemyId) -> Option<Duration> {
        self.pending
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| Duration::from_millis(entry.remaining_ms))
    }

    /// The configured delay in milliseconds.
    #[must_use]
    pub const fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no timers are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl EnemySimulation {
    /// Applies damage to an enemy.
    ///
    /// Returns `None` for unknown ids. Damage to an already dead enemy is
    /// ignored and publishes nothing.
    pub fn attack_enemy(&mut self, id: EnemyId, amount: u32) -> Option<DamageOutcome> {
        let enemy = self.enemies.iter_mut().find(|enemy| enemy.id == id)?;
        let outcome = enemy.apply_damage(amount);

        match outcome {
            DamageOutcome::Ignored => {},
            DamageOutcome::Wounded { health } => {
                self.events.publish(SimEvent::EnemyDamaged {
                    enemy_id: id,
                    amount,
                    health,
                });
            },
            DamageOutcome::Killed => {
                info!("{} ({}) died", id, enemy.name);
                self.events.publish(SimEvent::EnemyDamaged {
                    enemy_id: id,
                    amount,
                    health: 0,
                });
                self.events.publish(SimEvent::EnemyDied { enemy_id: id });
            },
        }

        Some(outcome)
    }

    /// Evicts an enemy from the active set and schedules its respawn.
    ///
    /// Unknown ids are a no-op. Returns whether an enemy was removed.
    pub fn remove_enemy(&mut self, id: EnemyId) -> bool {
        let Some(index) = self.enemies.iter().position(|enemy| enemy.id == id) else {
            debug!("Ignoring removal of unknown {id}");
            return false;
        };

        let enemy = self.enemies.remove(index);
        self.respawns.schedule(id);
        let respawn_in_ms = self.respawns.delay_ms();
        debug!("{} ({}) removed, respawn in {respawn_in_ms} ms", id, enemy.name);

        self.events.publish(SimEvent::EnemyRemoved {
            enemy_id: id,
            respawn_in_ms,
        });
        true
    }

    /// Fires respawn timers that came due during this tick.
    pub(crate) fn process_respawns(&mut self, dt_ms: u64) -> Vec<EnemyId> {
        let due = self.respawns.update(dt_ms);
        let mut respawned = Vec::with_capacity(due.len());

        for id in due {
            if self.enemies.iter().any(|enemy| enemy.id == id) {
                debug!("{id} is already active, dropping respawn");
                continue;
            }
            let Some(def) = self.definitions.get(&id) else {
                warn!("No definition for {id}, cannot respawn");
                continue;
            };

            let enemy = Enemy::spawn(def, &self.layout, &self.config.safe_search);
            info!("{} ({}) respawned at {:?}", id, enemy.name, enemy.position);
            self.events.publish(SimEvent::EnemyRespawned {
                enemy_id: id,
                position: enemy.position,
            });
            self.enemies.push(enemy);
            respawned.push(id);
        }

        respawned
    }

    /// Number of enemies waiting to respawn.
    #[must_use]
    pub fn pending_respawns(&self) -> usize {
        self.respawns.len()
    }

    /// Time left before a removed enemy respawns.
    #[must_use]
    pub fn respawn_time_remaining(&self, id: EnemyId) -> Option<Duration> {
        self.respawns.time_remaining(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::enemy::BehaviourState;
    use crate::geometry::CollisionQuery;
    use crate::simulation::TickInput;
    use emberfall_common::MapId;
    use glam::Vec2;

    const FAR: TickInput = TickInput::new(Vec2::new(1000.0, 1000.0), true);

    fn mines(respawn_secs: u64) -> EnemySimulation {
        let config = SimulationConfig::default().with_respawn_delay_secs(respawn_secs);
        EnemySimulation::for_map(MapId::Mines, config).expect("mines should build")
    }

    #[test]
    fn test_queue_fires_after_delay() {
        let mut queue = RespawnQueue::new(Duration::from_millis(100));
        queue.schedule(EnemyId::new(1));
        assert_eq!(queue.update(50), Vec::<EnemyId>::new());
        assert_eq!(
            queue.time_remaining(EnemyId::new(1)),
            Some(Duration::from_millis(50))
        );
        assert_eq!(queue.update(50), vec![EnemyId::new(1)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_reschedule_replaces_timer() {
        let mut queue = RespawnQueue::new(Duration::from_millis(100));
        queue.schedule(EnemyId::new(1));
        queue.update(80);
        queue.schedule(EnemyId::new(1));
        assert_eq!(queue.len(), 1);
        assert_eq!(
            queue.time_remaining(EnemyId::new(1)),
            Some(Duration::from_millis(100))
        );
    }

    #[test]
    fn test_attack_wounds_then_kills() {
        let mut sim = mines(300);
        let id = EnemyId::new(101);

        assert_eq!(
            sim.attack_enemy(id, 10),
            Some(DamageOutcome::Wounded { health: 20 })
        );
        assert_eq!(sim.attack_enemy(id, 100), Some(DamageOutcome::Killed));
        assert_eq!(sim.attack_enemy(id, 5), Some(DamageOutcome::Ignored));

        let enemy = sim.enemy(id).expect("dead enemy stays until removed");
        assert_eq!(enemy.health, 0);
        assert_eq!(enemy.state, BehaviourState::Dead);

        let events = sim.drain_events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[2], SimEvent::EnemyDied { .. }));
    }

    #[test]
    fn test_attack_unknown_enemy() {
        let mut sim = mines(300);
        assert_eq!(sim.attack_enemy(EnemyId::new(9999), 10), None);
        assert!(sim.drain_events().is_empty());
    }

    #[test]
    fn test_remove_schedules_respawn() {
        let mut sim = mines(300);
        let before = sim.len();
        let id = EnemyId::new(104);

        assert!(sim.remove_enemy(id));
        assert_eq!(sim.len(), before - 1);
        assert!(sim.enemy(id).is_none());
        assert_eq!(sim.pending_respawns(), 1);
        assert_eq!(
            sim.respawn_time_remaining(id),
            Some(Duration::from_secs(300))
        );
        assert!(matches!(
            sim.drain_events().as_slice(),
            [SimEvent::EnemyRemoved { respawn_in_ms: 300_000, .. }]
        ));
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut sim = mines(300);
        let before = sim.len();
        assert!(!sim.remove_enemy(EnemyId::new(9999)));
        assert_eq!(sim.len(), before);
        assert_eq!(sim.pending_respawns(), 0);
    }

    #[test]
    fn test_respawn_after_delay() {
        let mut sim = mines(1);
        let id = EnemyId::new(102);
        sim.attack_enemy(id, 1000);
        sim.remove_enemy(id);
        sim.drain_events();

        // 1 s at 50 ms per tick
        for _ in 0..19 {
            let report = sim.tick(FAR);
            assert!(report.respawned.is_empty());
        }
        assert!(sim.enemy(id).is_none());

        let report = sim.tick(FAR);
        assert_eq!(report.respawned, vec![id]);

        let enemy = sim.enemy(id).expect("enemy should be back");
        assert_eq!(enemy.health, enemy.max_health());
        assert!(!enemy.is_dead);
        assert!(!sim.layout().is_blocked(enemy.position));
        assert_eq!(sim.pending_respawns(), 0);
        let events = sim.drain_events();
        assert!(events.iter().any(|event| {
            matches!(event, SimEvent::EnemyRespawned { enemy_id, .. } if *enemy_id == id)
        }));
    }

    #[test]
    fn test_respawn_skipped_when_already_active() {
        let mut sim = mines(1);
        let id = EnemyId::new(103);
        let before = sim.len();
        sim.respawns.schedule(id);

        for _ in 0..20 {
            let report = sim.tick(FAR);
            assert!(report.respawned.is_empty());
        }
        assert_eq!(sim.len(), before);
        assert_eq!(sim.enemies().iter().filter(|enemy| enemy.id == id).count(), 1);
    }
}
