// Game world - owns every entity and routes physics contacts between them

use glam::Vec2;
use log::{debug, info, warn};

use crate::core::math::from_physics;
use crate::engine::input::{InputProvider, ScriptedInput};
use crate::engine::physics::{
    presets, ColliderHandle, CollisionEvent, EntityKind, EntityTag, PhysicsWorld,
    RigidBodyHandle,
};
use crate::game::characters::{
    Character, CharacterId, CharacterManager, CharacterStats, StateKind,
};
use crate::game::damage::{DamageCoordinator, DamageOutcome, HazardId};
use crate::game::weapons::{KnifeEvent, KnifeId, KnifeManager};

/// Size of a hazard's box collider
const HAZARD_SIZE: Vec2 = Vec2::new(1.0, 1.0);
/// Radius of a coin's sensor
const COIN_RADIUS: f32 = 0.4;

/// Collectible coin colors. Blue and red coins unlock run and dance in the outer game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoinKind {
    Gold,
    Red,
    Blue,
}

/// Things that happened during a tick, for the outer game to react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// One or more transitions ran during the tick. A round trip such as
    /// Idle -> Shoot -> Idle reports `from == to`.
    StateChanged {
        character: CharacterId,
        from: StateKind,
        to: StateKind,
    },
    /// One-shot animation trigger raised by a state, e.g. `StopDance`
    AnimationTriggered {
        character: CharacterId,
        trigger: &'static str,
    },
    KnifePickedUp {
        knife: KnifeId,
        owner: CharacterId,
    },
    KnifeRetired {
        knife: KnifeId,
        owner: Option<CharacterId>,
    },
    CharacterDied {
        character: CharacterId,
    },
    HazardKilled {
        hazard: HazardId,
    },
    CoinCollected {
        character: CharacterId,
        kind: CoinKind,
    },
}

/// Anything that hurts characters on contact
#[derive(Debug)]
pub struct Hazard {
    pub id: HazardId,
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
    /// Damage per contact interval
    pub damage: i32,
}

#[derive(Debug)]
pub struct Coin {
    pub id: u32,
    pub kind: CoinKind,
    pub body_handle: RigidBodyHandle,
    pub collider_handle: ColliderHandle,
}

/// All gameplay state advanced by one fixed-timestep tick
pub struct GameWorld {
    physics: PhysicsWorld,
    characters: CharacterManager,
    knives: KnifeManager,
    damage: DamageCoordinator,
    hazards: Vec<Hazard>,
    coins: Vec<Coin>,
    /// Character driven by the input passed to `tick`; others get no input
    player: Option<CharacterId>,
    next_hazard_id: HazardId,
    next_coin_id: u32,
    next_platform_id: u32,
    events: Vec<GameEvent>,
}

impl GameWorld {
    pub fn new() -> Self {
        Self {
            physics: PhysicsWorld::new(),
            characters: CharacterManager::new(),
            knives: KnifeManager::default(),
            damage: DamageCoordinator::default(),
            hazards: Vec::new(),
            coins: Vec::new(),
            player: None,
            next_hazard_id: 0,
            next_coin_id: 0,
            next_platform_id: 0,
            events: Vec::new(),
        }
    }

    /// Add a fixed platform or wall centered at `(x, y)`
    pub fn add_platform(&mut self, x: f32, y: f32, width: f32, height: f32) -> ColliderHandle {
        let id = self.next_platform_id;
        self.next_platform_id += 1;

        let body = self.physics.add_rigid_body(presets::platform_body(x, y));
        self.physics.add_collider(
            presets::platform_collider(width, height),
            body,
            EntityTag::new(EntityKind::Platform, id),
        )
    }

    /// Spawn a character holding a fresh knife.
    /// The first character spawned becomes the player.
    pub fn spawn_character(&mut self, name: &str, x: f32, y: f32) -> CharacterId {
        let id = self.characters.spawn_character(
            name,
            CharacterStats::standard(),
            &mut self.physics,
            x,
            y,
        );
        info!("Spawned character {} ({}) at ({}, {})", id, name, x, y);

        if self.player.is_none() {
            self.player = Some(id);
        }

        if let Some(knife) = self.spawn_knife(id) {
            self.force_attach_knife(id);
            debug!("Character {} starts with knife {}", id, knife);
        }
        id
    }

    /// Spawn a hazard dealing `damage` per contact interval
    pub fn spawn_hazard(&mut self, x: f32, y: f32, damage: i32) -> HazardId {
        let id = self.next_hazard_id;
        self.next_hazard_id += 1;

        let body_handle = self.physics.add_rigid_body(presets::hazard_body(x, y));
        let collider_handle = self.physics.add_collider(
            presets::hazard_collider(HAZARD_SIZE.x, HAZARD_SIZE.y),
            body_handle,
            EntityTag::new(EntityKind::Hazard, id),
        );

        self.hazards.push(Hazard {
            id,
            body_handle,
            collider_handle,
            damage,
        });
        id
    }

    pub fn spawn_coin(&mut self, x: f32, y: f32, kind: CoinKind) -> u32 {
        let id = self.next_coin_id;
        self.next_coin_id += 1;

        let body_handle = self.physics.add_rigid_body(presets::pickup_body(x, y));
        let collider_handle = self.physics.add_collider(
            presets::pickup_collider(COIN_RADIUS),
            body_handle,
            EntityTag::new(EntityKind::Pickup, id),
        );

        self.coins.push(Coin {
            id,
            kind,
            body_handle,
            collider_handle,
        });
        id
    }

    /// Spawn a new knife above `owner`, retiring the one it had
    pub fn spawn_knife(&mut self, owner: CharacterId) -> Option<KnifeId> {
        let view = self.characters.get(owner)?.body.owner_view(&self.physics);
        self.knives.spawn_for(&mut self.physics, &view).ok()
    }

    /// Send `owner`'s knife back to them now. Returns false if that was not possible.
    pub fn force_return_knife(&mut self, owner: CharacterId) -> bool {
        let Some(knife) = self.knives.claimed_knife(owner) else {
            warn!("Character {} has no knife to return", owner);
            return false;
        };
        match self.knives.force_return(&mut self.physics, knife) {
            Ok(()) => true,
            Err(err) => {
                warn!("Cannot return knife {}: {}", knife, err);
                false
            }
        }
    }

    /// Put `owner`'s knife in their hand wherever it is
    pub fn force_attach_knife(&mut self, owner: CharacterId) -> bool {
        let Some(view) = self
            .characters
            .get(owner)
            .map(|character| character.body.owner_view(&self.physics))
        else {
            return false;
        };
        let Some(knife) = self.knives.claimed_knife(owner) else {
            warn!("Character {} has no knife to attach", owner);
            return false;
        };
        match self.knives.force_attach(&mut self.physics, knife, &view) {
            Ok(()) => true,
            Err(err) => {
                warn!("Cannot attach knife {}: {}", knife, err);
                false
            }
        }
    }

    /// Apply a one-off hit to a character. Returns `None` if it does not exist.
    pub fn damage_character(&mut self, id: CharacterId, amount: i32) -> Option<DamageOutcome> {
        let character = self.characters.get_mut(id)?;
        let outcome = self
            .damage
            .apply_direct(id, &mut character.body.health, amount);

        if outcome == DamageOutcome::Died {
            character.kill(&mut self.physics, &mut self.knives);
            self.damage.clear_character(id);
            self.events.push(GameEvent::CharacterDied { character: id });
        }
        Some(outcome)
    }

    /// Advance the world by `dt` seconds. `input` drives the player character.
    pub fn tick(&mut self, dt: f32, input: &dyn InputProvider) {
        self.physics.set_timestep(dt);

        for character in self.characters.all_mut() {
            character.body.refresh_sensors(&self.physics);
        }

        let idle = ScriptedInput::new();
        for character in self.characters.all_mut() {
            let source: &dyn InputProvider = if Some(character.id()) == self.player {
                input
            } else {
                &idle
            };

            let from = character.state();
            let transitions = character.state_machine.transition_count();
            character.tick(dt, source, &mut self.physics, &mut self.knives);
            if character.state_machine.transition_count() != transitions {
                self.events.push(GameEvent::StateChanged {
                    character: character.id(),
                    from,
                    to: character.state(),
                });
            }

            for trigger in character.body.animation.drain_triggers() {
                self.events.push(GameEvent::AnimationTriggered {
                    character: character.id(),
                    trigger,
                });
            }
        }

        let owners = self.characters.owner_views(&self.physics);
        self.knives.update(dt, &mut self.physics, &owners);

        for hit in self.damage.update(dt) {
            self.damage_character(hit.character, hit.amount);
        }

        self.physics.step();
        for event in self.physics.get_collision_events() {
            self.dispatch_collision(event);
        }

        self.collect_knife_events();
    }

    /// Events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.collect_knife_events();
        std::mem::take(&mut self.events)
    }

    fn collect_knife_events(&mut self) {
        for event in self.knives.drain_events() {
            match event {
                KnifeEvent::PickedUp { knife, owner } => {
                    self.events.push(GameEvent::KnifePickedUp { knife, owner })
                }
                KnifeEvent::Retired { knife, owner } => {
                    self.events.push(GameEvent::KnifeRetired { knife, owner })
                }
                KnifeEvent::OwnerLost { .. } => {}
            }
        }
    }

    /// Route one contact event to both participants
    fn dispatch_collision(&mut self, event: CollisionEvent) {
        let (first, second) = event.colliders();
        let (Some(a), Some(b)) = (
            self.physics.entity_tag(first),
            self.physics.entity_tag(second),
        ) else {
            return;
        };

        match event {
            CollisionEvent::Started { normal, .. } => {
                let normal = normal.map(|n| from_physics(&n));
                self.contact_started(a, b, normal);
                self.contact_started(b, a, normal.map(|n| -n));
            }
            CollisionEvent::Stopped { .. } => {
                self.contact_stopped(a, b);
                self.contact_stopped(b, a);
            }
        }
    }

    /// `normal` points from `subject` towards `other`
    fn contact_started(&mut self, subject: EntityTag, other: EntityTag, normal: Option<Vec2>) {
        match (subject.kind, other.kind) {
            (EntityKind::Knife, EntityKind::Character) => {
                let Some(view) = self
                    .characters
                    .get(other.id)
                    .filter(|character| character.is_alive())
                    .map(|character| character.body.owner_view(&self.physics))
                else {
                    return;
                };
                let owner = self.knives.get(subject.id).and_then(|knife| knife.owner());
                match owner {
                    // Someone else's knife glances off and heads home
                    Some(owner) if owner != other.id => {
                        self.knives
                            .on_trigger_contact(&mut self.physics, subject.id, view.position);
                    }
                    _ => {
                        self.knives
                            .on_owner_contact(&mut self.physics, subject.id, &view);
                    }
                }
            }
            (EntityKind::Knife, EntityKind::Platform) => {
                self.knives
                    .on_solid_contact(&mut self.physics, subject.id, normal);
            }
            (EntityKind::Knife, EntityKind::Hazard) => {
                let Some(position) = self
                    .hazard(other.id)
                    .and_then(|hazard| self.physics.collider_position(hazard.collider_handle))
                else {
                    return;
                };
                let position = from_physics(&position);
                if self
                    .knives
                    .on_trigger_contact(&mut self.physics, subject.id, position)
                {
                    self.kill_hazard(other.id);
                }
            }
            (EntityKind::Character, EntityKind::Hazard) => {
                let alive = self
                    .characters
                    .get(subject.id)
                    .is_some_and(Character::is_alive);
                if let (true, Some(hazard)) = (alive, self.hazard(other.id)) {
                    let damage = hazard.damage;
                    self.damage.begin_contact(subject.id, other.id, damage);
                }
            }
            (EntityKind::Character, EntityKind::Pickup) => self.collect_coin(subject.id, other.id),
            _ => {}
        }
    }

    fn contact_stopped(&mut self, subject: EntityTag, other: EntityTag) {
        if let (EntityKind::Character, EntityKind::Hazard) = (subject.kind, other.kind) {
            self.damage.end_contact(subject.id, other.id);
        }
    }

    fn kill_hazard(&mut self, id: HazardId) {
        let Some(index) = self.hazards.iter().position(|hazard| hazard.id == id) else {
            return;
        };
        let hazard = self.hazards.remove(index);
        self.physics.remove_rigid_body(hazard.body_handle);
        self.damage.clear_hazard(id);

        info!("Hazard {} destroyed", id);
        self.events.push(GameEvent::HazardKilled { hazard: id });
    }

    fn collect_coin(&mut self, character: CharacterId, coin: u32) {
        let Some(collector) = self
            .characters
            .get_mut(character)
            .filter(|collector| collector.is_alive())
        else {
            return;
        };
        let Some(index) = self.coins.iter().position(|c| c.id == coin) else {
            return;
        };

        let coin = self.coins.remove(index);
        if coin.kind == CoinKind::Gold {
            collector.body.coins += 1;
        }
        self.physics.remove_rigid_body(coin.body_handle);

        info!("Character {} collected a {:?} coin", character, coin.kind);
        self.events.push(GameEvent::CoinCollected {
            character,
            kind: coin.kind,
        });
    }

    pub fn hazard(&self, id: HazardId) -> Option<&Hazard> {
        self.hazards.iter().find(|hazard| hazard.id == id)
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(id)
    }

    pub fn characters(&self) -> &CharacterManager {
        &self.characters
    }

    pub fn knives(&self) -> &KnifeManager {
        &self.knives
    }

    pub fn damage(&self) -> &DamageCoordinator {
        &self.damage
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn player(&self) -> Option<CharacterId> {
        self.player
    }

    /// Choose which character the input passed to `tick` drives
    #[allow(dead_code)]
    pub fn set_player(&mut self, id: CharacterId) {
        if self.characters.get(id).is_some() {
            self.player = Some(id);
        } else {
            warn!("Cannot control missing character {}", id);
        }
    }
}

impl Default for GameWorld {
    fn default() -> Self {
        Self::new()
    }
}
