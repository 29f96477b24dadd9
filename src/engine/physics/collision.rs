use rapier2d::prelude::*;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Collision groups for filtering what objects can collide with each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroups {
    /// Default group - interacts with everything
    Default = 0b0000_0001,

    /// Player characters
    Player = 0b0000_0010,

    /// Throwable knives
    Knife = 0b0000_0100,

    /// Static platforms and walls
    Platform = 0b0000_1000,

    /// Enemies and other things that hurt on contact
    Hazard = 0b0001_0000,

    /// Coins and other collectibles
    Pickup = 0b0010_0000,

    /// Sensors (trigger zones, etc.) - don't cause physical collision
    Sensor = 0b1000_0000,
}

impl CollisionGroups {
    /// Convert to rapier2d's InteractionGroups
    pub fn to_interaction_groups(self) -> InteractionGroups {
        let memberships = Group::from_bits_truncate(self as u32);

        let filter = match self {
            // Players never collide with each other
            CollisionGroups::Player => Group::from_bits_truncate(
                CollisionGroups::Platform as u32
                    | CollisionGroups::Hazard as u32
                    | CollisionGroups::Pickup as u32
                    | CollisionGroups::Knife as u32
                    | CollisionGroups::Sensor as u32,
            ),

            // Knives bounce off geometry, strike hazards and can be caught by players
            CollisionGroups::Knife => Group::from_bits_truncate(
                CollisionGroups::Player as u32
                    | CollisionGroups::Platform as u32
                    | CollisionGroups::Hazard as u32,
            ),

            CollisionGroups::Platform => Group::from_bits_truncate(
                CollisionGroups::Player as u32
                    | CollisionGroups::Knife as u32
                    | CollisionGroups::Platform as u32
                    | CollisionGroups::Hazard as u32,
            ),

            CollisionGroups::Hazard => Group::from_bits_truncate(
                CollisionGroups::Player as u32
                    | CollisionGroups::Knife as u32
                    | CollisionGroups::Platform as u32,
            ),

            CollisionGroups::Pickup => Group::from_bits_truncate(CollisionGroups::Player as u32),

            CollisionGroups::Sensor => Group::ALL,

            CollisionGroups::Default => Group::ALL,
        };

        InteractionGroups::new(memberships, filter)
    }

    /// Query groups that only hit members of this group
    pub fn query_only(self) -> InteractionGroups {
        InteractionGroups::new(Group::ALL, Group::from_bits_truncate(self as u32))
    }
}

/// Custom collision event for game logic
#[derive(Debug, Clone, Copy)]
pub enum CollisionEvent {
    /// Two colliders started touching
    Started {
        collider1: ColliderHandle,
        collider2: ColliderHandle,
        /// Contact normal pointing from `collider1` towards `collider2`, for solid contacts
        normal: Option<Vector<Real>>,
    },

    /// Two colliders stopped touching
    Stopped {
        collider1: ColliderHandle,
        collider2: ColliderHandle,
    },
}

impl CollisionEvent {
    /// Both collider handles of the event
    pub fn colliders(&self) -> (ColliderHandle, ColliderHandle) {
        match *self {
            CollisionEvent::Started {
                collider1,
                collider2,
                ..
            }
            | CollisionEvent::Stopped {
                collider1,
                collider2,
                ..
            } => (collider1, collider2),
        }
    }
}

/// Queue for storing collision events during physics step
pub struct CollisionEventQueue {
    events: Arc<Mutex<Vec<CollisionEvent>>>,
}

impl CollisionEventQueue {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::with_capacity(32))),
        }
    }

    /// Clear all events (call at start of physics step)
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    /// Get all collision events from this frame
    pub fn events(&self) -> Vec<CollisionEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Add a collision event
    pub(crate) fn push(&self, event: CollisionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl Default for CollisionEventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// World-space normal of a contact pair, oriented from `from` towards the other collider
fn oriented_normal(pair: &ContactPair, from: ColliderHandle) -> Option<Vector<Real>> {
    let manifold = pair.manifolds.iter().find(|m| !m.points.is_empty())?;
    let normal = manifold.data.normal;
    if pair.collider1 == from {
        Some(normal)
    } else {
        Some(-normal)
    }
}

impl EventHandler for CollisionEventQueue {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: rapier2d::prelude::CollisionEvent,
        contact_pair: Option<&ContactPair>,
    ) {
        match event {
            rapier2d::prelude::CollisionEvent::Started(h1, h2, _) => {
                self.push(CollisionEvent::Started {
                    collider1: h1,
                    collider2: h2,
                    normal: contact_pair.and_then(|pair| oriented_normal(pair, h1)),
                });
            }
            rapier2d::prelude::CollisionEvent::Stopped(h1, h2, _) => {
                self.push(CollisionEvent::Stopped {
                    collider1: h1,
                    collider2: h2,
                });
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// Collider pairs that pass through each other while their groups would collide.
///
/// Only consulted for colliders built with contact filtering enabled.
#[derive(Debug, Default)]
pub struct ContactFilter {
    ignored: HashSet<(ColliderHandle, ColliderHandle)>,
}

impl ContactFilter {
    fn key(a: ColliderHandle, b: ColliderHandle) -> (ColliderHandle, ColliderHandle) {
        if a.into_raw_parts() <= b.into_raw_parts() {
            (a, b)
        } else {
            (b, a)
        }
    }

    pub fn ignore(&mut self, a: ColliderHandle, b: ColliderHandle) {
        self.ignored.insert(Self::key(a, b));
    }

    pub fn restore(&mut self, a: ColliderHandle, b: ColliderHandle) {
        self.ignored.remove(&Self::key(a, b));
    }

    /// Forget every pair involving a removed collider
    pub fn forget(&mut self, collider: ColliderHandle) {
        self.ignored.retain(|&(a, b)| a != collider && b != collider);
    }

    pub fn is_ignored(&self, a: ColliderHandle, b: ColliderHandle) -> bool {
        self.ignored.contains(&Self::key(a, b))
    }
}

impl PhysicsHooks for ContactFilter {
    fn filter_contact_pair(&self, context: &PairFilterContext) -> Option<SolverFlags> {
        if self.is_ignored(context.collider1, context.collider2) {
            None
        } else {
            Some(SolverFlags::COMPUTE_IMPULSES)
        }
    }
}
