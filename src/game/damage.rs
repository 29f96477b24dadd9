// Health and periodic contact damage

use log::{debug, info, warn};
use std::collections::BTreeMap;

use crate::game::characters::CharacterId;

/// Unique identifier for a hazard
pub type HazardId = u32;

/// Damage tuning values
#[derive(Debug, Clone)]
pub struct DamageStats {
    /// Seconds between damage applications while contact persists
    pub interval: f32,
    /// Damage dealt per application by a standard hazard
    pub contact_damage: i32,
}

/// Default damage tuning
pub const BASE_DAMAGE: DamageStats = DamageStats {
    interval: 0.5,
    contact_damage: 1,
};

impl Default for DamageStats {
    fn default() -> Self {
        BASE_DAMAGE
    }
}

/// Result of applying damage to a `Health`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Health dropped but is still above zero
    Damaged { remaining: i32 },
    /// Health reached zero with this hit
    Died,
    /// Already dead, nothing changed
    Ignored,
}

/// Hit points that never go below zero
#[derive(Debug, Clone)]
pub struct Health {
    current: i32,
    dead: bool,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self {
            current: max.max(0),
            dead: max <= 0,
        }
    }

    /// Subtract `amount`, clamping at zero. Reports `Died` exactly once.
    pub fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::Ignored;
        }

        self.current = (self.current - amount.max(0)).max(0);
        if self.current == 0 {
            self.dead = true;
            DamageOutcome::Died
        } else {
            DamageOutcome::Damaged {
                remaining: self.current,
            }
        }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }
}

/// Slack for clock values that land a rounding error short of an interval boundary
const BOUNDARY_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone)]
struct ContactRecord {
    started_at: f64,
    hits_applied: u64,
    damage: i32,
}

/// Damage due to a character from one hazard contact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageHit {
    pub character: CharacterId,
    pub hazard: HazardId,
    pub amount: i32,
}

/// Applies damage on a fixed cadence while a character touches a hazard.
///
/// For T seconds of uninterrupted contact, `floor(T / interval)` hits are produced. Hits are
/// counted from the contact start on an f64 clock, so small frame steps do not drift.
#[derive(Debug)]
pub struct DamageCoordinator {
    stats: DamageStats,
    contacts: BTreeMap<(CharacterId, HazardId), ContactRecord>,
    now: f64,
}

impl DamageCoordinator {
    /// A non-positive or non-finite interval falls back to the default one.
    pub fn new(mut stats: DamageStats) -> Self {
        if !(stats.interval.is_finite() && stats.interval > 0.0) {
            warn!(
                "Damage interval {} is not positive, using {}",
                stats.interval, BASE_DAMAGE.interval
            );
            stats.interval = BASE_DAMAGE.interval;
        }

        Self {
            stats,
            contacts: BTreeMap::new(),
            now: 0.0,
        }
    }

    /// Start tracking a contact. Repeated begins for the same pair are ignored.
    pub fn begin_contact(&mut self, character: CharacterId, hazard: HazardId, damage: i32) {
        let now = self.now;
        self.contacts.entry((character, hazard)).or_insert_with(|| {
            debug!("Character {} touching hazard {}", character, hazard);
            ContactRecord {
                started_at: now,
                hits_applied: 0,
                damage,
            }
        });
    }

    /// Stop tracking a contact
    pub fn end_contact(&mut self, character: CharacterId, hazard: HazardId) {
        if let Some(record) = self.contacts.remove(&(character, hazard)) {
            debug!(
                "Character {} left hazard {} after {:.2}s",
                character,
                hazard,
                self.now - record.started_at
            );
        }
    }

    /// Drop every contact involving a removed hazard
    pub fn clear_hazard(&mut self, hazard: HazardId) {
        self.contacts.retain(|&(_, h), _| h != hazard);
    }

    /// Drop every contact involving a removed or dead character
    pub fn clear_character(&mut self, character: CharacterId) {
        self.contacts.retain(|&(c, _), _| c != character);
    }

    #[allow(dead_code)]
    pub fn is_in_contact(&self, character: CharacterId, hazard: HazardId) -> bool {
        self.contacts.contains_key(&(character, hazard))
    }

    #[allow(dead_code)]
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Advance the clock and return every hit that came due
    pub fn update(&mut self, dt: f32) -> Vec<DamageHit> {
        if dt.is_finite() && dt > 0.0 {
            self.now += f64::from(dt);
        }

        let interval = f64::from(self.stats.interval);
        let mut hits = Vec::new();
        for (&(character, hazard), record) in self.contacts.iter_mut() {
            let elapsed = self.now - record.started_at;
            let due = (elapsed / interval + BOUNDARY_EPSILON).floor() as u64;
            while record.hits_applied < due {
                record.hits_applied += 1;
                hits.push(DamageHit {
                    character,
                    hazard,
                    amount: record.damage,
                });
            }
        }
        hits
    }

    /// Apply a one-off hit through the same clamp-and-death path as contact damage
    pub fn apply_direct(
        &self,
        character: CharacterId,
        health: &mut Health,
        amount: i32,
    ) -> DamageOutcome {
        let outcome = health.apply_damage(amount);
        match outcome {
            DamageOutcome::Died => info!("Character {} died", character),
            DamageOutcome::Damaged { remaining } => {
                debug!(
                    "Character {} took {} damage ({} left)",
                    character, amount, remaining
                )
            }
            DamageOutcome::Ignored => {}
        }
        outcome
    }

    pub fn stats(&self) -> &DamageStats {
        &self.stats
    }
}

impl Default for DamageCoordinator {
    fn default() -> Self {
        Self::new(DamageStats::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_clamps_at_zero() {
        let mut health = Health::new(3);
        assert_eq!(health.apply_damage(2), DamageOutcome::Damaged { remaining: 1 });
        assert_eq!(health.apply_damage(5), DamageOutcome::Died);
        assert_eq!(health.current(), 0);
    }

    #[test]
    fn test_death_fires_once() {
        let mut health = Health::new(1);
        assert_eq!(health.apply_damage(1), DamageOutcome::Died);
        assert_eq!(health.apply_damage(1), DamageOutcome::Ignored);
        assert!(health.is_dead());
        assert_eq!(health.current(), 0);
    }

    #[test]
    fn test_zero_health_starts_dead() {
        let mut health = Health::new(0);
        assert!(health.is_dead());
        assert_eq!(health.apply_damage(1), DamageOutcome::Ignored);
    }

    #[test]
    fn test_contact_cadence() {
        let mut coordinator = DamageCoordinator::default();
        coordinator.begin_contact(1, 10, 1);

        // 1.375s of contact at 0.5s intervals -> 2 hits
        let mut hits = 0;
        for _ in 0..11 {
            hits += coordinator.update(0.125).len();
        }
        assert_eq!(hits, 2);

        hits += coordinator.update(0.125).len();
        assert_eq!(hits, 3);
    }

    #[test]
    fn test_contact_cadence_at_frame_rate() {
        let mut coordinator = DamageCoordinator::default();
        coordinator.begin_contact(1, 10, 1);

        // 1/60 does not divide the interval exactly in f32
        let mut hits = 0;
        for frame in 1..=240 {
            hits += coordinator.update(1.0 / 60.0).len();
            match frame {
                29 => assert_eq!(hits, 0),
                30 => assert_eq!(hits, 1),
                60 => assert_eq!(hits, 2),
                120 => assert_eq!(hits, 4),
                _ => {}
            }
        }
        assert_eq!(hits, 8);
    }

    #[test]
    fn test_invalid_interval_falls_back() {
        for interval in [0.0, -1.0, f32::NAN] {
            let mut coordinator = DamageCoordinator::new(DamageStats {
                interval,
                contact_damage: 1,
            });
            assert_eq!(coordinator.stats().interval, BASE_DAMAGE.interval);

            coordinator.begin_contact(1, 10, 1);
            assert_eq!(coordinator.update(1.0).len(), 2);
        }
    }

    #[test]
    fn test_contact_damage_reduces_health() {
        let mut coordinator = DamageCoordinator::default();
        let mut health = Health::new(10);
        coordinator.begin_contact(1, 10, 1);

        // 2 seconds -> 4 hits
        for _ in 0..16 {
            for hit in coordinator.update(0.125) {
                coordinator.apply_direct(hit.character, &mut health, hit.amount);
            }
        }

        assert_eq!(health.current(), 6);
    }

    #[test]
    fn test_repeated_begin_keeps_original_record() {
        let mut coordinator = DamageCoordinator::default();
        coordinator.begin_contact(1, 10, 1);
        coordinator.update(0.375);
        coordinator.begin_contact(1, 10, 1);

        assert_eq!(coordinator.update(0.125).len(), 1);
        assert_eq!(coordinator.contact_count(), 1);
    }

    #[test]
    fn test_end_contact_stops_damage() {
        let mut coordinator = DamageCoordinator::default();
        coordinator.begin_contact(1, 10, 1);
        coordinator.update(0.25);
        coordinator.end_contact(1, 10);

        assert!(coordinator.update(1.0).is_empty());
        assert!(!coordinator.is_in_contact(1, 10));
    }

    #[test]
    fn test_clear_hazard_and_character() {
        let mut coordinator = DamageCoordinator::default();
        coordinator.begin_contact(1, 10, 1);
        coordinator.begin_contact(1, 11, 1);
        coordinator.begin_contact(2, 10, 1);

        coordinator.clear_hazard(10);
        assert_eq!(coordinator.contact_count(), 1);

        coordinator.clear_character(1);
        assert_eq!(coordinator.contact_count(), 0);
    }

    #[test]
    fn test_separate_pairs_tick_independently() {
        let mut coordinator = DamageCoordinator::default();
        coordinator.begin_contact(1, 10, 2);
        coordinator.update(0.25);
        coordinator.begin_contact(1, 11, 3);

        let hits = coordinator.update(0.25);
        assert_eq!(
            hits,
            vec![DamageHit {
                character: 1,
                hazard: 10,
                amount: 2
            }]
        );
    }
}
