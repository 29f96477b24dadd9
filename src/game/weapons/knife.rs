// Knife entity and its attach/throw/return state machine

use glam::Vec2;
use log::{debug, info, warn};
use rapier2d::prelude::{InteractionGroups, Isometry, RigidBodyType};

use super::stats::KnifeStats;
use super::WeaponError;
use crate::core::math::{from_physics, reflect, to_physics};
use crate::engine::physics::{
    presets, ColliderHandle, CollisionGroups, EntityKind, EntityTag, PhysicsWorld,
    RigidBodyHandle,
};
use crate::engine::scheduler::{Scheduler, TaskHandle};
use crate::game::characters::CharacterId;

/// Unique identifier for a knife
pub type KnifeId = u32;

/// Attachment state of a knife
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnifeState {
    /// Held by the owner, physics disabled
    Attached,
    /// Free flight with spin, collides with the level
    Thrown,
    /// Flying back to the owner through geometry
    Returning,
}

/// Delayed work a knife schedules for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KnifeTask {
    Return,
    RestoreOwnerCollision,
    SelfCheck,
}

/// Snapshot of a character that knives follow and return to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OwnerView {
    pub id: CharacterId,
    pub position: Vec2,
    pub facing_right: bool,
    /// Collider the knife passes through during the grace window after a throw
    pub collider: ColliderHandle,
}

/// Lifecycle notifications raised by knives for the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnifeEvent {
    /// A knife attached to `owner`
    PickedUp { knife: KnifeId, owner: CharacterId },
    /// A knife noticed its owner is gone
    OwnerLost { knife: KnifeId },
    /// A knife was removed from the world
    Retired {
        knife: KnifeId,
        owner: Option<CharacterId>,
    },
}

/// A throwable knife.
///
/// Every delayed action goes through the knife's own scheduler. Each kind of action has at
/// most one pending handle, and a new schedule always cancels the previous one first.
#[derive(Debug)]
pub struct Knife {
    id: KnifeId,
    owner: Option<CharacterId>,
    state: KnifeState,
    stats: KnifeStats,

    // Physics
    body_handle: RigidBodyHandle,
    collider_handle: ColliderHandle,
    /// Position after the last tick, used to rebuild a lost body
    last_position: Vec2,

    // Flight
    facing_right: bool,
    flight_direction: Vec2,
    flight_speed: f32,
    flight_started_at: Option<f32>,
    return_started_at: Option<f32>,
    pickup_eligible: bool,
    /// Owner collider while attached, and the one ignored during the grace window
    owner_collider: Option<ColliderHandle>,
    grace_collider: Option<ColliderHandle>,

    // Timers
    scheduler: Scheduler<KnifeTask>,
    pending_return: Option<TaskHandle>,
    pending_grace: Option<TaskHandle>,
    pending_self_check: Option<TaskHandle>,
}

impl Knife {
    /// Create a knife at `position`.
    ///
    /// An owned knife starts returning to its owner; an unowned one drops loose until someone
    /// picks it up or the registry assigns it an owner.
    pub fn spawn(
        id: KnifeId,
        stats: KnifeStats,
        physics: &mut PhysicsWorld,
        position: Vec2,
        owner: Option<CharacterId>,
    ) -> Self {
        let (body_handle, collider_handle) = Self::create_body(id, &stats, physics, position);

        let mut knife = Self {
            id,
            owner,
            state: KnifeState::Thrown,
            stats,
            body_handle,
            collider_handle,
            last_position: position,
            facing_right: true,
            flight_direction: Vec2::ZERO,
            flight_speed: 0.0,
            flight_started_at: None,
            return_started_at: None,
            pickup_eligible: true,
            owner_collider: None,
            grace_collider: None,
            scheduler: Scheduler::new(),
            pending_return: None,
            pending_grace: None,
            pending_self_check: None,
        };

        knife.pending_self_check = Some(
            knife
                .scheduler
                .schedule(knife.stats.self_check_interval, KnifeTask::SelfCheck),
        );

        if owner.is_some() {
            knife.begin_return(physics);
        } else {
            knife.drop_loose(physics);
        }

        debug!("Knife {} spawned at {:?} ({:?})", id, position, knife.state);
        knife
    }

    fn create_body(
        id: KnifeId,
        stats: &KnifeStats,
        physics: &mut PhysicsWorld,
        position: Vec2,
    ) -> (RigidBodyHandle, ColliderHandle) {
        let body_handle = physics.add_rigid_body(presets::knife_body(position.x, position.y));
        let collider_handle = physics.add_collider(
            presets::knife_collider(stats.length, stats.thickness),
            body_handle,
            EntityTag::new(EntityKind::Knife, id),
        );
        (body_handle, collider_handle)
    }

    /// Advance timers and per-state behavior by `dt`.
    ///
    /// `owner` is the current snapshot of this knife's owner, if it still exists.
    pub fn tick(
        &mut self,
        dt: f32,
        physics: &mut PhysicsWorld,
        owner: Option<&OwnerView>,
    ) -> Vec<KnifeEvent> {
        self.ensure_body(physics);

        let mut events = Vec::new();

        for task in self.scheduler.advance(dt) {
            match task {
                KnifeTask::Return => {
                    self.pending_return = None;
                    if self.state != KnifeState::Attached {
                        self.begin_return(physics);
                    }
                }
                KnifeTask::RestoreOwnerCollision => {
                    self.pending_grace = None;
                    self.end_grace(physics);
                }
                KnifeTask::SelfCheck => {
                    self.pending_self_check = Some(
                        self.scheduler
                            .schedule(self.stats.self_check_interval, KnifeTask::SelfCheck),
                    );
                    events.extend(self.self_check(physics, owner));
                }
            }
        }

        match (self.state, owner) {
            (KnifeState::Attached, Some(owner)) => self.follow(physics, owner),
            (KnifeState::Returning, Some(owner)) => events.extend(self.pursue(physics, owner)),
            (KnifeState::Returning, None) => self.set_linvel(physics, Vec2::ZERO),
            _ => {}
        }

        self.last_position = self.position(physics);
        events
    }

    /// Throw the knife. Only legal while attached.
    pub fn throw(
        &mut self,
        physics: &mut PhysicsWorld,
        direction: Vec2,
    ) -> Result<(), WeaponError> {
        if self.state != KnifeState::Attached {
            return Err(WeaponError::NotAttached {
                knife: self.id,
                state: self.state,
            });
        }
        if self.owner.is_none() {
            return Err(WeaponError::NoOwner(self.id));
        }
        let direction = direction
            .try_normalize()
            .ok_or(WeaponError::InvalidDirection)?;

        self.state = KnifeState::Thrown;
        self.flight_direction = direction;
        self.flight_speed = self.stats.throw_speed;
        self.flight_started_at = Some(self.now());
        self.return_started_at = None;
        self.pickup_eligible = false;

        let spin = -direction.x.signum() * self.stats.spin_speed;
        self.configure_body(
            physics,
            RigidBodyType::Dynamic,
            0.0,
            direction * self.flight_speed,
            spin,
        );
        self.configure_collider(
            physics,
            true,
            false,
            CollisionGroups::Knife.to_interaction_groups(),
        );

        // Only the owner is ignored until the grace window closes
        self.cancel_grace(physics);
        if let Some(owner) = self.owner_collider {
            physics.ignore_contacts(self.collider_handle, owner);
            self.grace_collider = Some(owner);
        }
        self.pending_grace = Some(self.scheduler.schedule(
            self.stats.owner_grace_period,
            KnifeTask::RestoreOwnerCollision,
        ));
        self.schedule_return(self.stats.max_flight_time);

        info!("Knife {} thrown towards {:?}", self.id, direction);
        Ok(())
    }

    /// Start returning after `delay` seconds, replacing any pending return.
    /// A non-positive delay starts the return immediately.
    pub fn return_after_delay(
        &mut self,
        physics: &mut PhysicsWorld,
        delay: f32,
    ) -> Result<(), WeaponError> {
        if self.state == KnifeState::Attached {
            return Err(WeaponError::AlreadyAttached(self.id));
        }

        if delay <= 0.0 {
            self.cancel_return();
            self.begin_return(physics);
        } else {
            self.schedule_return(delay);
        }
        Ok(())
    }

    /// Start returning right away
    pub fn force_return(&mut self, physics: &mut PhysicsWorld) -> Result<(), WeaponError> {
        self.return_after_delay(physics, 0.0)
    }

    /// Attach to `owner` immediately, wherever the knife is
    pub fn force_attach(&mut self, physics: &mut PhysicsWorld, owner: &OwnerView) -> KnifeEvent {
        self.attach(physics, owner)
    }

    /// Handle a contact with solid geometry.
    /// Returns true if the knife bounced.
    pub fn on_solid_contact(&mut self, physics: &mut PhysicsWorld, normal: Option<Vec2>) -> bool {
        if self.state != KnifeState::Thrown || self.flight_direction == Vec2::ZERO {
            return false;
        }

        let normal = normal
            .filter(|n| n.length_squared() > 0.0)
            .unwrap_or(-self.flight_direction);
        let reflected = reflect(self.flight_direction, normal).normalize_or_zero();
        self.bounce(physics, reflected);
        true
    }

    /// Handle a contact with a non-owner object at `other_position`, such as a hazard or
    /// another character.
    /// Returns true if the knife bounced.
    pub fn on_trigger_contact(&mut self, physics: &mut PhysicsWorld, other_position: Vec2) -> bool {
        if self.state != KnifeState::Thrown || self.flight_direction == Vec2::ZERO {
            return false;
        }

        let away = (self.position(physics) - other_position)
            .try_normalize()
            .unwrap_or(-self.flight_direction);
        self.bounce(physics, away);
        true
    }

    /// Handle a contact with a character.
    /// Picks the knife up if the character may claim it.
    pub fn on_owner_contact(
        &mut self,
        physics: &mut PhysicsWorld,
        owner: &OwnerView,
    ) -> Option<KnifeEvent> {
        if self.state == KnifeState::Attached {
            return None;
        }
        if !self.pickup_eligible {
            debug!("Knife {} ignores owner contact during grace window", self.id);
            return None;
        }
        if self.owner.is_some_and(|id| id != owner.id) {
            return None;
        }

        Some(self.attach(physics, owner))
    }

    /// Assign a new owner (used when the previous one is gone)
    pub fn set_owner(&mut self, owner: Option<CharacterId>) {
        self.owner = owner;
    }

    /// Remove the knife from the world, cancelling everything it had scheduled
    pub fn retire(mut self, physics: &mut PhysicsWorld) {
        self.cancel_grace(physics);
        self.scheduler.clear();
        self.pending_return = None;
        self.pending_grace = None;
        self.pending_self_check = None;
        physics.remove_rigid_body(self.body_handle);
        debug!("Knife {} retired", self.id);
    }

    fn bounce(&mut self, physics: &mut PhysicsWorld, direction: Vec2) {
        self.flight_direction = direction;
        self.flight_speed = self.stats.throw_speed * self.stats.bounce_factor;

        if let Some(body) = physics.get_rigid_body_mut(self.body_handle) {
            body.set_linvel(to_physics(direction * self.flight_speed), true);
            // Bounced knives drop instead of flying straight
            body.set_gravity_scale(1.0, true);
        }

        debug!("Knife {} bounced towards {:?}", self.id, direction);
        self.schedule_return(self.stats.bounce_return_delay);
    }

    fn begin_return(&mut self, physics: &mut PhysicsWorld) {
        if self.state == KnifeState::Attached {
            return;
        }
        if self.owner.is_none() {
            warn!("Knife {} has no owner to return to", self.id);
            return;
        }

        self.cancel_return();
        self.cancel_grace(physics);

        self.state = KnifeState::Returning;
        self.return_started_at = Some(self.now());
        self.pickup_eligible = true;
        self.configure_returning(physics);

        debug!("Knife {} returning", self.id);
    }

    fn attach(&mut self, physics: &mut PhysicsWorld, owner: &OwnerView) -> KnifeEvent {
        self.cancel_return();
        self.cancel_grace(physics);

        self.owner = Some(owner.id);
        self.state = KnifeState::Attached;
        self.flight_direction = Vec2::ZERO;
        self.flight_speed = 0.0;
        self.flight_started_at = None;
        self.return_started_at = None;
        self.pickup_eligible = true;

        self.configure_body(
            physics,
            RigidBodyType::KinematicPositionBased,
            0.0,
            Vec2::ZERO,
            0.0,
        );
        self.configure_collider(
            physics,
            false,
            false,
            CollisionGroups::Knife.to_interaction_groups(),
        );
        self.follow(physics, owner);

        info!("Knife {} attached to character {}", self.id, owner.id);
        KnifeEvent::PickedUp {
            knife: self.id,
            owner: owner.id,
        }
    }

    fn drop_loose(&mut self, physics: &mut PhysicsWorld) {
        self.state = KnifeState::Thrown;
        self.flight_direction = Vec2::ZERO;
        self.flight_started_at = Some(self.now());
        self.pickup_eligible = true;

        self.configure_body(physics, RigidBodyType::Dynamic, 1.0, Vec2::ZERO, 0.0);
        self.configure_collider(
            physics,
            true,
            false,
            CollisionGroups::Knife.to_interaction_groups(),
        );
    }

    fn end_grace(&mut self, physics: &mut PhysicsWorld) {
        self.pickup_eligible = true;
        if let Some(owner) = self.grace_collider.take() {
            physics.restore_contacts(self.collider_handle, owner);
        }
    }

    fn self_check(
        &mut self,
        physics: &mut PhysicsWorld,
        owner: Option<&OwnerView>,
    ) -> Option<KnifeEvent> {
        let Some(owner) = owner else {
            debug!("Knife {} self-check: owner missing", self.id);
            return Some(KnifeEvent::OwnerLost { knife: self.id });
        };

        let now = self.now();
        match self.state {
            KnifeState::Attached => None,
            KnifeState::Thrown => {
                let flight = self.flight_started_at.map_or(0.0, |start| now - start);
                let distance = self.position(physics).distance(owner.position);
                if flight > self.stats.max_flight_time || distance > self.stats.max_owner_distance {
                    warn!(
                        "Knife {} stuck in flight ({:.1}s, {:.1} units away), recalling",
                        self.id, flight, distance
                    );
                    self.begin_return(physics);
                }
                None
            }
            KnifeState::Returning => {
                let returning = self.return_started_at.map_or(0.0, |start| now - start);
                if returning > self.stats.max_return_time {
                    warn!(
                        "Knife {} returning for {:.1}s, attaching to character {}",
                        self.id, returning, owner.id
                    );
                    Some(self.attach(physics, owner))
                } else {
                    None
                }
            }
        }
    }

    fn follow(&mut self, physics: &mut PhysicsWorld, owner: &OwnerView) {
        let target = owner.position + self.stats.offset_for(owner.facing_right);
        self.facing_right = owner.facing_right;
        self.owner_collider = Some(owner.collider);

        if let Some(body) = physics.get_rigid_body_mut(self.body_handle) {
            // Identity rotation while held
            body.set_position(Isometry::translation(target.x, target.y), true);
        }
    }

    fn pursue(&mut self, physics: &mut PhysicsWorld, owner: &OwnerView) -> Option<KnifeEvent> {
        let to_owner = owner.position - self.position(physics);
        if to_owner.length() <= self.stats.pickup_radius {
            return Some(self.attach(physics, owner));
        }

        self.set_linvel(physics, to_owner.normalize_or_zero() * self.stats.return_speed);
        None
    }

    fn ensure_body(&mut self, physics: &mut PhysicsWorld) {
        if physics.get_rigid_body(self.body_handle).is_some() {
            return;
        }

        warn!(
            "Knife {} lost its physics body, rebuilding at {:?}",
            self.id, self.last_position
        );
        let (body_handle, collider_handle) =
            Self::create_body(self.id, &self.stats, physics, self.last_position);
        self.body_handle = body_handle;
        self.collider_handle = collider_handle;
        // Filter entries went with the old collider
        self.grace_collider = None;

        match self.state {
            KnifeState::Attached => {
                self.configure_body(
                    physics,
                    RigidBodyType::KinematicPositionBased,
                    0.0,
                    Vec2::ZERO,
                    0.0,
                );
                self.configure_collider(
                    physics,
                    false,
                    false,
                    CollisionGroups::Knife.to_interaction_groups(),
                );
            }
            KnifeState::Thrown => self.drop_loose(physics),
            KnifeState::Returning => self.configure_returning(physics),
        }
    }

    fn configure_returning(&mut self, physics: &mut PhysicsWorld) {
        let spin = if self.facing_right {
            -self.stats.spin_speed
        } else {
            self.stats.spin_speed
        };
        self.configure_body(
            physics,
            RigidBodyType::KinematicVelocityBased,
            0.0,
            Vec2::ZERO,
            spin,
        );
        // Passes through geometry, still reports the owner
        self.configure_collider(
            physics,
            true,
            true,
            CollisionGroups::Knife.to_interaction_groups(),
        );
    }

    fn configure_body(
        &self,
        physics: &mut PhysicsWorld,
        body_type: RigidBodyType,
        gravity_scale: f32,
        linvel: Vec2,
        angvel: f32,
    ) {
        if let Some(body) = physics.get_rigid_body_mut(self.body_handle) {
            // Position-based kinematic bodies ignore velocity writes, so clear the old
            // motion before switching types
            body.set_linvel(to_physics(Vec2::ZERO), true);
            body.set_angvel(0.0, true);
            body.set_body_type(body_type, true);
            body.set_gravity_scale(gravity_scale, true);
            body.set_linvel(to_physics(linvel), true);
            body.set_angvel(angvel, true);
        }
    }

    fn configure_collider(
        &self,
        physics: &mut PhysicsWorld,
        enabled: bool,
        sensor: bool,
        groups: InteractionGroups,
    ) {
        if let Some(collider) = physics.get_collider_mut(self.collider_handle) {
            collider.set_enabled(enabled);
            collider.set_sensor(sensor);
            collider.set_collision_groups(groups);
        }
    }

    fn set_linvel(&self, physics: &mut PhysicsWorld, velocity: Vec2) {
        if let Some(body) = physics.get_rigid_body_mut(self.body_handle) {
            body.set_linvel(to_physics(velocity), true);
        }
    }

    fn schedule_return(&mut self, delay: f32) {
        self.cancel_return();
        self.pending_return = Some(self.scheduler.schedule(delay, KnifeTask::Return));
    }

    fn cancel_return(&mut self) {
        if let Some(handle) = self.pending_return.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn cancel_grace(&mut self, physics: &mut PhysicsWorld) {
        if let Some(handle) = self.pending_grace.take() {
            self.scheduler.cancel(handle);
        }
        if let Some(owner) = self.grace_collider.take() {
            physics.restore_contacts(self.collider_handle, owner);
        }
    }

    pub fn id(&self) -> KnifeId {
        self.id
    }

    pub fn owner(&self) -> Option<CharacterId> {
        self.owner
    }

    pub fn state(&self) -> KnifeState {
        self.state
    }

    /// Knife clock (seconds since spawn)
    pub fn now(&self) -> f32 {
        self.scheduler.now()
    }

    pub fn position(&self, physics: &PhysicsWorld) -> Vec2 {
        physics
            .get_rigid_body(self.body_handle)
            .map(|body| from_physics(body.translation()))
            .unwrap_or(self.last_position)
    }
}

// Inspection of knife internals, used by debugging and tests
#[allow(dead_code)]
impl Knife {
    pub fn stats(&self) -> &KnifeStats {
        &self.stats
    }

    pub fn body_handle(&self) -> RigidBodyHandle {
        self.body_handle
    }

    pub fn collider_handle(&self) -> ColliderHandle {
        self.collider_handle
    }

    pub fn flight_started_at(&self) -> Option<f32> {
        self.flight_started_at
    }

    /// Whether a character contact can pick the knife up
    pub fn is_pickup_eligible(&self) -> bool {
        self.pickup_eligible
    }

    /// Seconds until the pending return fires
    pub fn pending_return_remaining(&self) -> Option<f32> {
        self.pending_return
            .and_then(|handle| self.scheduler.remaining(handle))
    }

    pub fn is_facing_right(&self) -> bool {
        self.facing_right
    }

    pub fn velocity(&self, physics: &PhysicsWorld) -> Vec2 {
        physics
            .get_rigid_body(self.body_handle)
            .map(|body| from_physics(body.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    /// Rotation in radians
    pub fn rotation(&self, physics: &PhysicsWorld) -> f32 {
        physics
            .get_rigid_body(self.body_handle)
            .map(|body| body.rotation().angle())
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn owner_at(x: f32, y: f32) -> OwnerView {
        OwnerView {
            id: 7,
            position: Vec2::new(x, y),
            facing_right: true,
            collider: ColliderHandle::invalid(),
        }
    }

    fn owned_knife(physics: &mut PhysicsWorld, owner: &OwnerView) -> Knife {
        Knife::spawn(1, KnifeStats::standard(), physics, Vec2::ZERO, Some(owner.id))
    }

    /// Knife attached to an owner standing at the origin
    fn attached_knife(physics: &mut PhysicsWorld) -> Knife {
        let owner = owner_at(0.0, 0.0);
        let mut knife = owned_knife(physics, &owner);
        knife.force_attach(physics, &owner);
        knife
    }

    fn tick_for(
        knife: &mut Knife,
        physics: &mut PhysicsWorld,
        owner: &OwnerView,
        seconds: f32,
        dt: f32,
    ) -> Vec<KnifeEvent> {
        let mut events = Vec::new();
        let steps = (seconds / dt).round() as usize;
        for _ in 0..steps {
            events.extend(knife.tick(dt, physics, Some(owner)));
        }
        events
    }

    #[test]
    fn test_spawn_with_owner_starts_returning() {
        let mut physics = PhysicsWorld::new();
        let knife = Knife::spawn(1, KnifeStats::standard(), &mut physics, Vec2::ZERO, Some(3));

        assert_eq!(knife.state(), KnifeState::Returning);
        assert_eq!(knife.owner(), Some(3));
        assert!(knife.is_pickup_eligible());
    }

    #[test]
    fn test_spawn_without_owner_drops_loose() {
        let mut physics = PhysicsWorld::new();
        let knife = Knife::spawn(1, KnifeStats::standard(), &mut physics, Vec2::ZERO, None);

        assert_eq!(knife.state(), KnifeState::Thrown);
        assert_eq!(knife.owner(), None);
        let body = physics.get_rigid_body(knife.body_handle()).unwrap();
        assert!(body.is_dynamic());
        assert_eq!(body.gravity_scale(), 1.0);
    }

    #[test]
    fn test_attached_knife_tracks_owner_offset() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);

        let mut owner = owner_at(3.0, 1.0);
        owner.facing_right = false;
        knife.tick(0.1, &mut physics, Some(&owner));

        assert_eq!(knife.state(), KnifeState::Attached);
        assert_eq!(knife.position(&physics), Vec2::new(2.5, 1.0));
        assert!(!knife.is_facing_right());
        assert!(!physics.get_collider(knife.collider_handle()).unwrap().is_enabled());
    }

    #[test]
    fn test_throw_enters_thrown() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);

        knife.throw(&mut physics, Vec2::new(2.0, 0.0)).unwrap();

        assert_eq!(knife.state(), KnifeState::Thrown);
        assert_eq!(knife.flight_started_at(), Some(0.0));
        assert!(!knife.is_pickup_eligible());
        assert_relative_eq!(knife.velocity(&physics).x, 15.0);
        assert_relative_eq!(
            knife.pending_return_remaining().unwrap(),
            knife.stats().max_flight_time
        );

        let collider = physics.get_collider(knife.collider_handle()).unwrap();
        assert!(collider.is_enabled());
        assert!(!collider.is_sensor());
    }

    #[test]
    fn test_throw_requires_attached() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);
        knife.throw(&mut physics, Vec2::X).unwrap();

        let err = knife.throw(&mut physics, Vec2::X).unwrap_err();
        assert_eq!(
            err,
            WeaponError::NotAttached {
                knife: 1,
                state: KnifeState::Thrown
            }
        );
    }

    #[test]
    fn test_throw_rejects_zero_direction() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);

        assert_eq!(
            knife.throw(&mut physics, Vec2::ZERO),
            Err(WeaponError::InvalidDirection)
        );
        assert_eq!(knife.state(), KnifeState::Attached);
    }

    #[test]
    fn test_bounce_reflects_off_wall() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);
        knife.throw(&mut physics, Vec2::new(1.0, 0.0)).unwrap();

        assert!(knife.on_solid_contact(&mut physics, Some(Vec2::new(-1.0, 0.0))));

        let stats = knife.stats().clone();
        let velocity = knife.velocity(&physics);
        assert_relative_eq!(velocity.x, -stats.throw_speed * stats.bounce_factor);
        assert_relative_eq!(velocity.y, 0.0);
        // Short post-collision delay replaces the max-flight return
        assert_relative_eq!(
            knife.pending_return_remaining().unwrap(),
            stats.bounce_return_delay
        );
        assert_eq!(knife.state(), KnifeState::Thrown);
    }

    #[test]
    fn test_repeated_bounces_keep_bounce_speed() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);
        knife.throw(&mut physics, Vec2::X).unwrap();

        knife.on_solid_contact(&mut physics, Some(Vec2::NEG_X));
        knife.on_solid_contact(&mut physics, Some(Vec2::X));

        let stats = knife.stats().clone();
        assert_relative_eq!(
            knife.velocity(&physics).length(),
            stats.throw_speed * stats.bounce_factor
        );
        assert!(knife.velocity(&physics).x > 0.0);
    }

    #[test]
    fn test_trigger_contact_bounces_away() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);
        knife.throw(&mut physics, Vec2::X).unwrap();

        // Object sits to the right of the knife
        let other = knife.position(&physics) + Vec2::new(1.0, 0.0);
        assert!(knife.on_trigger_contact(&mut physics, other));

        assert!(knife.velocity(&physics).x < 0.0);
        assert_relative_eq!(
            knife.pending_return_remaining().unwrap(),
            knife.stats().bounce_return_delay
        );
    }

    #[test]
    fn test_contacts_ignored_unless_thrown() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);

        assert!(!knife.on_solid_contact(&mut physics, Some(Vec2::Y)));
        assert!(!knife.on_trigger_contact(&mut physics, Vec2::ZERO));
        assert_eq!(knife.state(), KnifeState::Attached);
    }

    #[test]
    fn test_return_after_delay_only_latest_fires() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);
        knife.throw(&mut physics, Vec2::X).unwrap();

        // Owner far away so the returning knife does not attach immediately
        let owner = owner_at(30.0, 0.0);
        knife.return_after_delay(&mut physics, 0.25).unwrap();
        knife.return_after_delay(&mut physics, 1.0).unwrap();

        tick_for(&mut knife, &mut physics, &owner, 0.5, 0.25);
        assert_eq!(knife.state(), KnifeState::Thrown);

        tick_for(&mut knife, &mut physics, &owner, 0.5, 0.25);
        assert_eq!(knife.state(), KnifeState::Returning);
    }

    #[test]
    fn test_return_after_delay_rejected_when_attached() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);

        assert_eq!(
            knife.return_after_delay(&mut physics, 1.0),
            Err(WeaponError::AlreadyAttached(1))
        );
        assert_eq!(knife.pending_return_remaining(), None);
    }

    #[test]
    fn test_force_return_starts_immediately() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);
        knife.throw(&mut physics, Vec2::X).unwrap();

        knife.force_return(&mut physics).unwrap();

        assert_eq!(knife.state(), KnifeState::Returning);
        assert_eq!(knife.pending_return_remaining(), None);
        let collider = physics.get_collider(knife.collider_handle()).unwrap();
        assert!(collider.is_sensor());
    }

    #[test]
    fn test_returning_pursues_owner() {
        let mut physics = PhysicsWorld::new();
        let owner = owner_at(30.0, 0.0);
        let mut knife = owned_knife(&mut physics, &owner);

        let events = knife.tick(0.1, &mut physics, Some(&owner));

        assert!(events.is_empty());
        let velocity = knife.velocity(&physics);
        assert_relative_eq!(velocity.x, knife.stats().return_speed);
        assert_relative_eq!(velocity.y, 0.0);
    }

    #[test]
    fn test_returning_within_radius_attaches() {
        let mut physics = PhysicsWorld::new();
        let far = owner_at(30.0, 0.0);
        let mut knife = owned_knife(&mut physics, &far);

        // Pursue first so the body carries real velocity into the attach
        assert!(knife.tick(0.1, &mut physics, Some(&far)).is_empty());
        physics.step();
        assert!(knife.velocity(&physics).x > 0.0);

        let near = owner_at(knife.position(&physics).x + 1.0, 0.0);
        let events = knife.tick(0.1, &mut physics, Some(&near));

        assert_eq!(events, vec![KnifeEvent::PickedUp { knife: 1, owner: 7 }]);
        assert_eq!(knife.state(), KnifeState::Attached);
        let body = physics.get_rigid_body(knife.body_handle()).unwrap();
        assert!(body.is_kinematic());
        assert_eq!(knife.velocity(&physics), Vec2::ZERO);
        assert_eq!(body.angvel(), 0.0);
    }

    #[test]
    fn test_force_attach_clears_flight_motion() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);
        knife.throw(&mut physics, Vec2::X).unwrap();
        physics.step();
        assert!(knife.velocity(&physics).x > 0.0);

        knife.force_attach(&mut physics, &owner_at(0.0, 0.0));

        assert_eq!(knife.velocity(&physics), Vec2::ZERO);
        let body = physics.get_rigid_body(knife.body_handle()).unwrap();
        assert_eq!(body.angvel(), 0.0);

        // Still at rest after the next step
        physics.step();
        assert_eq!(knife.velocity(&physics), Vec2::ZERO);
    }

    #[test]
    fn test_max_flight_recalls_knife() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);
        knife.throw(&mut physics, Vec2::X).unwrap();

        let owner = owner_at(30.0, 0.0);
        tick_for(&mut knife, &mut physics, &owner, 2.75, 0.25);
        assert_eq!(knife.state(), KnifeState::Thrown);

        tick_for(&mut knife, &mut physics, &owner, 0.25, 0.25);
        assert_eq!(knife.state(), KnifeState::Returning);
    }

    #[test]
    fn test_owner_contact_ignored_during_grace() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);
        knife.throw(&mut physics, Vec2::X).unwrap();
        let owner = owner_at(30.0, 0.0);

        assert_eq!(knife.on_owner_contact(&mut physics, &owner), None);

        tick_for(&mut knife, &mut physics, &owner, 0.25, 0.25);
        assert!(knife.is_pickup_eligible());
        assert_eq!(
            knife.on_owner_contact(&mut physics, &owner),
            Some(KnifeEvent::PickedUp { knife: 1, owner: 7 })
        );
        assert_eq!(knife.state(), KnifeState::Attached);
    }

    #[test]
    fn test_grace_ignores_only_owner_collider() {
        let mut physics = PhysicsWorld::new();
        let owner_body = physics.add_rigid_body(presets::player_body(0.0, 0.0));
        let owner_collider = physics.add_collider(
            presets::player_collider(1.0, 2.0),
            owner_body,
            EntityTag::new(EntityKind::Character, 7),
        );
        let owner = OwnerView {
            collider: owner_collider,
            ..owner_at(0.0, 0.0)
        };
        let mut knife = owned_knife(&mut physics, &owner);
        knife.force_attach(&mut physics, &owner);

        knife.throw(&mut physics, Vec2::X).unwrap();

        // Full knife groups: other characters still collide during the window
        let collider = physics.get_collider(knife.collider_handle()).unwrap();
        assert_eq!(
            collider.collision_groups(),
            CollisionGroups::Knife.to_interaction_groups()
        );
        assert!(physics.contacts_ignored(knife.collider_handle(), owner_collider));

        tick_for(&mut knife, &mut physics, &owner, 0.25, 0.25);
        assert!(!physics.contacts_ignored(knife.collider_handle(), owner_collider));
    }

    #[test]
    fn test_force_return_ends_grace() {
        let mut physics = PhysicsWorld::new();
        let owner_body = physics.add_rigid_body(presets::player_body(0.0, 0.0));
        let owner_collider = physics.add_collider(
            presets::player_collider(1.0, 2.0),
            owner_body,
            EntityTag::new(EntityKind::Character, 7),
        );
        let owner = OwnerView {
            collider: owner_collider,
            ..owner_at(0.0, 0.0)
        };
        let mut knife = owned_knife(&mut physics, &owner);
        knife.force_attach(&mut physics, &owner);
        knife.throw(&mut physics, Vec2::X).unwrap();

        knife.force_return(&mut physics).unwrap();

        assert!(!physics.contacts_ignored(knife.collider_handle(), owner_collider));
    }

    #[test]
    fn test_other_character_cannot_claim_owned_knife() {
        let mut physics = PhysicsWorld::new();
        let mut knife = Knife::spawn(1, KnifeStats::standard(), &mut physics, Vec2::ZERO, Some(7));
        let stranger = OwnerView {
            id: 8,
            ..owner_at(0.0, 0.0)
        };

        assert_eq!(knife.on_owner_contact(&mut physics, &stranger), None);
        assert_eq!(knife.owner(), Some(7));
    }

    #[test]
    fn test_loose_knife_claimed_on_contact() {
        let mut physics = PhysicsWorld::new();
        let mut knife = Knife::spawn(1, KnifeStats::standard(), &mut physics, Vec2::ZERO, None);
        let owner = owner_at(0.0, 0.0);

        let event = knife.on_owner_contact(&mut physics, &owner);

        assert_eq!(event, Some(KnifeEvent::PickedUp { knife: 1, owner: 7 }));
        assert_eq!(knife.owner(), Some(7));
    }

    #[test]
    fn test_self_check_reports_lost_owner() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);

        let mut events = Vec::new();
        for _ in 0..4 {
            events.extend(knife.tick(0.25, &mut physics, None));
        }

        assert_eq!(events, vec![KnifeEvent::OwnerLost { knife: 1 }]);
    }

    #[test]
    fn test_self_check_attaches_stuck_return() {
        let mut physics = PhysicsWorld::new();
        let owner = owner_at(30.0, 0.0);
        let mut knife = owned_knife(&mut physics, &owner);

        // No physics step, so the knife never gets closer
        let events = tick_for(&mut knife, &mut physics, &owner, 7.0, 0.5);

        assert_eq!(events, vec![KnifeEvent::PickedUp { knife: 1, owner: 7 }]);
        assert_eq!(knife.state(), KnifeState::Attached);
    }

    #[test]
    fn test_rebuilds_missing_body() {
        let mut physics = PhysicsWorld::new();
        let mut knife = attached_knife(&mut physics);
        let old_handle = knife.body_handle();

        physics.remove_rigid_body(old_handle);
        knife.tick(0.1, &mut physics, Some(&owner_at(0.0, 0.0)));

        assert!(physics.get_rigid_body(knife.body_handle()).is_some());
        assert_eq!(
            physics.entity_tag(knife.collider_handle()),
            Some(EntityTag::new(EntityKind::Knife, 1))
        );
    }

    #[test]
    fn test_retire_removes_body() {
        let mut physics = PhysicsWorld::new();
        let knife = attached_knife(&mut physics);
        let handle = knife.body_handle();

        knife.retire(&mut physics);

        assert!(physics.get_rigid_body(handle).is_none());
    }
}
