// Knife registry and lifecycle management

use glam::Vec2;
use log::{debug, error, info, warn};
use std::collections::HashMap;

use super::knife::{Knife, KnifeEvent, KnifeId, KnifeState, OwnerView};
use super::stats::KnifeStats;
use super::WeaponError;
use crate::engine::physics::PhysicsWorld;
use crate::game::characters::CharacterId;

/// Seconds between checks that every character has a knife
pub const AVAILABILITY_CHECK_INTERVAL: f32 = 5.0;

/// Owns every knife in the world and the per-character claim registry.
///
/// A character claims at most one knife. Spawning a knife for a character, or a character
/// picking one up, retires every other knife that character owns.
#[derive(Debug)]
pub struct KnifeManager {
    knives: Vec<Knife>,
    /// Current knife of each character
    claims: HashMap<CharacterId, KnifeId>,
    /// Stats for newly spawned knives; spawning fails without one
    template: Option<KnifeStats>,
    next_id: KnifeId,
    availability_timer: f32,
    /// Lifecycle events not yet drained by the world
    events: Vec<KnifeEvent>,
}

impl Default for KnifeManager {
    fn default() -> Self {
        Self::new(Some(KnifeStats::standard()))
    }
}

impl KnifeManager {
    pub fn new(template: Option<KnifeStats>) -> Self {
        Self {
            knives: Vec::new(),
            claims: HashMap::new(),
            template,
            next_id: 0,
            availability_timer: 0.0,
            events: Vec::new(),
        }
    }

    /// Spawn a knife at `position`, optionally owned by a character.
    ///
    /// Fails without changing anything if no template is configured.
    pub fn spawn(
        &mut self,
        physics: &mut PhysicsWorld,
        position: Vec2,
        owner: Option<CharacterId>,
    ) -> Result<KnifeId, WeaponError> {
        let Some(stats) = self.template.clone() else {
            error!("Cannot spawn knife: no knife template configured");
            return Err(WeaponError::NoTemplate);
        };

        let id = self.next_id;
        self.next_id += 1;

        if let Some(owner) = owner {
            self.retire_owned_by(physics, owner, None);
        }

        self.knives
            .push(Knife::spawn(id, stats, physics, position, owner));
        if let Some(owner) = owner {
            self.claims.insert(owner, id);
        }

        info!("Spawned knife {} (owner: {:?})", id, owner);
        Ok(id)
    }

    /// Spawn a knife just above `owner`
    pub fn spawn_for(
        &mut self,
        physics: &mut PhysicsWorld,
        owner: &OwnerView,
    ) -> Result<KnifeId, WeaponError> {
        let offset = self
            .template
            .as_ref()
            .map(|stats| stats.spawn_offset)
            .unwrap_or(Vec2::ZERO);
        self.spawn(physics, owner.position + offset, Some(owner.id))
    }

    /// Remove a knife from the world. Returns false if it does not exist.
    pub fn retire(&mut self, physics: &mut PhysicsWorld, id: KnifeId) -> bool {
        let Some(index) = self.knives.iter().position(|knife| knife.id() == id) else {
            return false;
        };

        let knife = self.knives.remove(index);
        let owner = knife.owner();
        if let Some(owner) = owner {
            if self.claims.get(&owner) == Some(&id) {
                self.claims.remove(&owner);
            }
        }

        knife.retire(physics);
        self.events.push(KnifeEvent::Retired { knife: id, owner });
        true
    }

    /// Tick every knife, then resolve the events they raised.
    ///
    /// `owners` holds a snapshot of every character that can own a knife.
    pub fn update(&mut self, dt: f32, physics: &mut PhysicsWorld, owners: &[OwnerView]) {
        let mut raised = Vec::new();
        for knife in &mut self.knives {
            let owner = knife
                .owner()
                .and_then(|id| owners.iter().find(|owner| owner.id == id));
            raised.extend(knife.tick(dt, physics, owner));
        }

        for event in raised {
            self.handle_event(physics, event, owners);
        }

        self.availability_timer += dt;
        if self.availability_timer >= AVAILABILITY_CHECK_INTERVAL {
            self.availability_timer -= AVAILABILITY_CHECK_INTERVAL;
            self.check_availability(physics, owners);
        }
    }

    /// Throw a knife in `direction`
    pub fn throw(
        &mut self,
        physics: &mut PhysicsWorld,
        id: KnifeId,
        direction: Vec2,
    ) -> Result<(), WeaponError> {
        self.knife_mut(id)?.throw(physics, direction)
    }

    /// Start a knife's return immediately
    pub fn force_return(
        &mut self,
        physics: &mut PhysicsWorld,
        id: KnifeId,
    ) -> Result<(), WeaponError> {
        self.knife_mut(id)?.force_return(physics)
    }

    /// Attach a knife to `owner` regardless of distance
    pub fn force_attach(
        &mut self,
        physics: &mut PhysicsWorld,
        id: KnifeId,
        owner: &OwnerView,
    ) -> Result<(), WeaponError> {
        let event = self.knife_mut(id)?.force_attach(physics, owner);
        self.handle_event(physics, event, &[]);
        Ok(())
    }

    /// Route a solid contact to a knife
    pub fn on_solid_contact(
        &mut self,
        physics: &mut PhysicsWorld,
        id: KnifeId,
        normal: Option<Vec2>,
    ) -> bool {
        self.get_mut(id)
            .is_some_and(|knife| knife.on_solid_contact(physics, normal))
    }

    /// Route a trigger contact to a knife
    pub fn on_trigger_contact(
        &mut self,
        physics: &mut PhysicsWorld,
        id: KnifeId,
        other_position: Vec2,
    ) -> bool {
        self.get_mut(id)
            .is_some_and(|knife| knife.on_trigger_contact(physics, other_position))
    }

    /// Route a character contact to a knife. Returns true if the character picked it up.
    pub fn on_owner_contact(
        &mut self,
        physics: &mut PhysicsWorld,
        id: KnifeId,
        owner: &OwnerView,
    ) -> bool {
        let Some(event) = self
            .get_mut(id)
            .and_then(|knife| knife.on_owner_contact(physics, owner))
        else {
            return false;
        };

        self.handle_event(physics, event, &[]);
        true
    }

    fn handle_event(
        &mut self,
        physics: &mut PhysicsWorld,
        event: KnifeEvent,
        owners: &[OwnerView],
    ) {
        match event {
            KnifeEvent::PickedUp { knife, owner } => {
                // Already retired by an earlier pickup this tick
                if self.get(knife).is_none() {
                    return;
                }
                self.retire_owned_by(physics, owner, Some(knife));
                self.claims.insert(owner, knife);
                self.events.push(event);
            }
            KnifeEvent::OwnerLost { knife } => self.reassign_owner(knife, owners),
            KnifeEvent::Retired { .. } => self.events.push(event),
        }
    }

    fn reassign_owner(&mut self, id: KnifeId, owners: &[OwnerView]) {
        let candidate = owners
            .iter()
            .find(|owner| !self.claims.contains_key(&owner.id))
            .map(|owner| owner.id);

        let Some(knife) = self.knives.iter_mut().find(|knife| knife.id() == id) else {
            return;
        };

        if let Some(previous) = knife.owner() {
            if self.claims.get(&previous) == Some(&id) {
                self.claims.remove(&previous);
            }
        }

        match candidate {
            Some(owner) => {
                info!("Knife {} reassigned to character {}", id, owner);
                knife.set_owner(Some(owner));
                self.claims.insert(owner, id);
            }
            None => {
                debug!("Knife {} has no available owner", id);
                knife.set_owner(None);
            }
        }
    }

    fn retire_owned_by(
        &mut self,
        physics: &mut PhysicsWorld,
        owner: CharacterId,
        keep: Option<KnifeId>,
    ) {
        let duplicates: Vec<KnifeId> = self
            .knives
            .iter()
            .filter(|knife| knife.owner() == Some(owner) && Some(knife.id()) != keep)
            .map(|knife| knife.id())
            .collect();

        for id in duplicates {
            debug!("Retiring duplicate knife {} of character {}", id, owner);
            self.retire(physics, id);
        }
    }

    fn check_availability(&mut self, physics: &mut PhysicsWorld, owners: &[OwnerView]) {
        for owner in owners {
            let has_knife = self
                .knives
                .iter()
                .any(|knife| knife.owner() == Some(owner.id));
            if has_knife {
                continue;
            }

            warn!("Character {} has no knife, spawning a new one", owner.id);
            if self.spawn_for(physics, owner).is_err() {
                break;
            }
        }
    }

    fn knife_mut(&mut self, id: KnifeId) -> Result<&mut Knife, WeaponError> {
        self.get_mut(id).ok_or(WeaponError::UnknownKnife(id))
    }

    /// Get a knife by ID
    pub fn get(&self, id: KnifeId) -> Option<&Knife> {
        self.knives.iter().find(|knife| knife.id() == id)
    }

    /// Get a mutable knife by ID
    pub fn get_mut(&mut self, id: KnifeId) -> Option<&mut Knife> {
        self.knives.iter_mut().find(|knife| knife.id() == id)
    }

    pub fn count(&self) -> usize {
        self.knives.len()
    }

    /// The knife a character currently claims
    pub fn claimed_knife(&self, owner: CharacterId) -> Option<KnifeId> {
        self.claims.get(&owner).copied()
    }

    /// The character's claimed knife, if it is in hand
    pub fn attached_knife(&self, owner: CharacterId) -> Option<KnifeId> {
        self.claimed_knife(owner).filter(|&id| {
            self.get(id)
                .is_some_and(|knife| knife.state() == KnifeState::Attached)
        })
    }

    /// Take all lifecycle events raised since the last call
    pub fn drain_events(&mut self) -> Vec<KnifeEvent> {
        std::mem::take(&mut self.events)
    }
}
