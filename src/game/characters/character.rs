// Character entity and management

use glam::Vec2;
use log::info;

use crate::core::math::{from_physics, is_active_axis, to_physics};
use crate::engine::input::{InputProvider, ScriptedInput};
use crate::engine::physics::{
    presets, ColliderHandle, CollisionGroups, EntityKind, EntityTag, PhysicsWorld, QueryFilter,
    RigidBodyHandle,
};
use crate::game::damage::Health;
use crate::game::weapons::{KnifeManager, OwnerView};

use super::animation::AnimationPlayer;
use super::state::{CharacterStateMachine, StateContext, StateKind};
use super::stats::CharacterStats;

/// Unique identifier for a character
pub type CharacterId = u32;

/// Length of the ground ray below the feet
const GROUND_RAY: f32 = 0.2;
/// Reach of the wall rays beyond the sides
const WALL_RAY: f32 = 0.1;

/// Physical and gameplay data of a character that states read and modify
#[derive(Debug)]
pub struct CharacterBody {
    /// Unique identifier
    pub id: CharacterId,

    // Physics
    /// Handle to the character's rigid body in the physics world
    pub body_handle: RigidBodyHandle,
    /// Handle to the character's collider
    pub collider_handle: ColliderHandle,

    /// Character properties
    pub stats: CharacterStats,
    /// Animation player for sprite animations
    pub animation: AnimationPlayer,

    // Gameplay state
    pub health: Health,
    pub coins: u32,
    /// Number of remaining jumps (resets on landing)
    pub jumps_remaining: u8,
    pub facing_right: bool,
    /// Sprite scale, x sign is independent of facing
    pub visual_scale: Vec2,

    // Sensors (refreshed every tick before states run)
    pub grounded: bool,
    pub touching_wall: bool,
    /// -1.0 for a wall on the left, 1.0 on the right, 0.0 for none
    pub wall_side: f32,
}

impl CharacterBody {
    /// Create the character's body and add it to the physics world
    pub fn new(
        id: CharacterId,
        stats: CharacterStats,
        physics: &mut PhysicsWorld,
        spawn_x: f32,
        spawn_y: f32,
    ) -> Self {
        let body_handle = physics.add_rigid_body(presets::player_body(spawn_x, spawn_y));
        let collider_handle = physics.add_collider(
            presets::player_collider(stats.width, stats.height),
            body_handle,
            EntityTag::new(EntityKind::Character, id),
        );

        Self {
            id,
            body_handle,
            collider_handle,
            health: Health::new(stats.max_health),
            coins: 0,
            jumps_remaining: stats.max_jumps,
            facing_right: true,
            visual_scale: Vec2::ONE,
            grounded: false,
            touching_wall: false,
            wall_side: 0.0,
            stats,
            animation: AnimationPlayer::with_standard_animations(),
        }
    }

    /// Update ground and wall flags with raycasts against platforms.
    /// Landing restores every jump.
    pub fn refresh_sensors(&mut self, physics: &PhysicsWorld) {
        let Some(body) = physics.get_rigid_body(self.body_handle) else {
            return;
        };
        let position = from_physics(body.translation());
        let velocity = from_physics(body.linvel());

        let half_height = self.stats.height / 2.0;
        let half_width = self.stats.width / 2.0;
        let handle = self.body_handle;
        let filter = || {
            QueryFilter::default()
                .exclude_rigid_body(handle)
                .exclude_sensors()
                .groups(CollisionGroups::Platform.query_only())
        };

        // Cast a ray downward from the character's feet
        let feet = Vec2::new(position.x, position.y - half_height + 0.1);
        self.grounded = physics
            .raycast(
                to_physics(feet),
                to_physics(Vec2::NEG_Y),
                GROUND_RAY,
                true,
                filter(),
            )
            .is_some();

        let reach = half_width + WALL_RAY;
        let wall_right = physics
            .raycast(to_physics(position), to_physics(Vec2::X), reach, true, filter())
            .is_some();
        let wall_left = physics
            .raycast(to_physics(position), to_physics(Vec2::NEG_X), reach, true, filter())
            .is_some();

        self.touching_wall = wall_right || wall_left;
        self.wall_side = if wall_right {
            1.0
        } else if wall_left {
            -1.0
        } else {
            0.0
        };

        if self.grounded && velocity.y <= 0.0 {
            self.jumps_remaining = self.stats.max_jumps;
        }
    }

    /// Get character's current position
    pub fn position(&self, physics: &PhysicsWorld) -> Vec2 {
        physics
            .get_rigid_body(self.body_handle)
            .map(|body| from_physics(body.translation()))
            .unwrap_or(Vec2::ZERO)
    }

    /// Get character's current velocity
    pub fn velocity(&self, physics: &PhysicsWorld) -> Vec2 {
        physics
            .get_rigid_body(self.body_handle)
            .map(|body| from_physics(body.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_velocity(&self, physics: &mut PhysicsWorld, velocity: Vec2) {
        if let Some(body) = physics.get_rigid_body_mut(self.body_handle) {
            body.set_linvel(to_physics(velocity), true);
        }
    }

    /// Set horizontal velocity, keeping the vertical component
    pub fn set_horizontal_velocity(&self, physics: &mut PhysicsWorld, vx: f32) {
        let velocity = self.velocity(physics);
        self.set_velocity(physics, Vec2::new(vx, velocity.y));
    }

    /// Set vertical velocity, keeping the horizontal component
    pub fn set_vertical_velocity(&self, physics: &mut PhysicsWorld, vy: f32) {
        let velocity = self.velocity(physics);
        self.set_velocity(physics, Vec2::new(velocity.x, vy));
    }

    /// Turn towards a horizontal axis value; small values keep the current facing
    pub fn face(&mut self, axis_x: f32) {
        if is_active_axis(axis_x) {
            self.facing_right = axis_x > 0.0;
        }
    }

    pub fn can_jump(&self) -> bool {
        self.jumps_remaining > 0
    }

    pub fn consume_jump(&mut self) {
        self.jumps_remaining = self.jumps_remaining.saturating_sub(1);
    }

    pub fn is_alive(&self) -> bool {
        !self.health.is_dead()
    }

    /// Snapshot used by knives to follow this character
    pub fn owner_view(&self, physics: &PhysicsWorld) -> OwnerView {
        OwnerView {
            id: self.id,
            position: self.position(physics),
            facing_right: self.facing_right,
            collider: self.collider_handle,
        }
    }
}

/// Represents a player-controlled character in the game
#[derive(Debug)]
pub struct Character {
    /// Character name (for display)
    pub name: String,
    pub body: CharacterBody,
    /// State machine for character behavior
    pub state_machine: CharacterStateMachine,
}

impl Character {
    /// Create a new character and add it to the physics world
    pub fn new(
        id: CharacterId,
        name: &str,
        stats: CharacterStats,
        physics: &mut PhysicsWorld,
        spawn_x: f32,
        spawn_y: f32,
    ) -> Self {
        Self {
            name: name.to_string(),
            body: CharacterBody::new(id, stats, physics, spawn_x, spawn_y),
            state_machine: CharacterStateMachine::new(),
        }
    }

    pub fn id(&self) -> CharacterId {
        self.body.id
    }

    /// Run one tick of the state machine and advance the animation
    pub fn tick(
        &mut self,
        dt: f32,
        input: &dyn InputProvider,
        physics: &mut PhysicsWorld,
        knives: &mut KnifeManager,
    ) {
        let mut ctx = StateContext {
            body: &mut self.body,
            input,
            physics,
            knives,
        };
        self.state_machine.tick(&mut ctx, dt);
        self.body.animation.update(dt);
    }

    /// Switch state from outside the state machine (no input is visible to the states)
    pub fn force_state(
        &mut self,
        next: StateKind,
        physics: &mut PhysicsWorld,
        knives: &mut KnifeManager,
    ) {
        let input = ScriptedInput::new();
        let mut ctx = StateContext {
            body: &mut self.body,
            input: &input,
            physics,
            knives,
        };
        self.state_machine.switch_state(&mut ctx, next);
    }

    /// Enter the terminal dead state
    pub fn kill(&mut self, physics: &mut PhysicsWorld, knives: &mut KnifeManager) {
        if self.state() == StateKind::Dead {
            return;
        }
        info!("Character {} ({}) is dead", self.id(), self.name);
        self.force_state(StateKind::Dead, physics, knives);
    }

    /// Check if character is alive
    pub fn is_alive(&self) -> bool {
        self.body.is_alive() && self.state() != StateKind::Dead
    }

    /// Get the current state
    pub fn state(&self) -> StateKind {
        self.state_machine.state()
    }

    pub fn position(&self, physics: &PhysicsWorld) -> Vec2 {
        self.body.position(physics)
    }
}

/// Manages all characters in the game
#[derive(Debug, Default)]
pub struct CharacterManager {
    characters: Vec<Character>,
    next_id: CharacterId,
}

impl CharacterManager {
    pub fn new() -> Self {
        Self {
            characters: Vec::new(),
            next_id: 0,
        }
    }

    /// Spawn a new character
    pub fn spawn_character(
        &mut self,
        name: &str,
        stats: CharacterStats,
        physics: &mut PhysicsWorld,
        spawn_x: f32,
        spawn_y: f32,
    ) -> CharacterId {
        let id = self.next_id;
        self.next_id += 1;

        let character = Character::new(id, name, stats, physics, spawn_x, spawn_y);
        self.characters.push(character);

        id
    }

    /// Get a character by ID
    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id() == id)
    }

    /// Get a mutable character by ID
    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.iter_mut().find(|c| c.id() == id)
    }

    /// Get all characters
    pub fn all(&self) -> &[Character] {
        &self.characters
    }

    /// Get all characters mutably
    pub fn all_mut(&mut self) -> &mut [Character] {
        &mut self.characters
    }

    /// Knife owner snapshots of every living character
    pub fn owner_views(&self, physics: &PhysicsWorld) -> Vec<OwnerView> {
        self.characters
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| c.body.owner_view(physics))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_manager_spawn() {
        let mut physics = PhysicsWorld::new();
        let mut manager = CharacterManager::new();

        let id =
            manager.spawn_character("Runner", CharacterStats::standard(), &mut physics, 1.0, 2.0);

        assert_eq!(manager.all().len(), 1);
        let character = manager.get(id).unwrap();
        assert_eq!(character.position(&physics), Vec2::new(1.0, 2.0));
        assert_eq!(character.body.health.current(), 10);
        assert_eq!(
            physics.entity_tag(character.body.collider_handle),
            Some(EntityTag::new(EntityKind::Character, id))
        );
    }

    #[test]
    fn test_owner_views_skip_dead_characters() {
        let mut physics = PhysicsWorld::new();
        let mut knives = KnifeManager::default();
        let mut manager = CharacterManager::new();
        let stats = CharacterStats::standard();
        let alive = manager.spawn_character("Runner", stats.clone(), &mut physics, 0.0, 0.0);
        let dead = manager.spawn_character("Rival", stats, &mut physics, 5.0, 0.0);
        manager.get_mut(dead).unwrap().kill(&mut physics, &mut knives);

        let views = manager.owner_views(&physics);

        assert_eq!(views.len(), 1);
        assert_eq!(views[0].id, alive);
        assert_eq!(views[0].collider, manager.get(alive).unwrap().body.collider_handle);
    }

    #[test]
    fn test_face_ignores_deadzone() {
        let mut physics = PhysicsWorld::new();
        let mut body = CharacterBody::new(0, CharacterStats::standard(), &mut physics, 0.0, 0.0);

        body.face(-1.0);
        assert!(!body.facing_right);
        body.face(0.05);
        assert!(!body.facing_right);
        body.face(0.5);
        assert!(body.facing_right);
    }

    #[test]
    fn test_velocity_helpers_keep_other_axis() {
        let mut physics = PhysicsWorld::new();
        let body = CharacterBody::new(0, CharacterStats::standard(), &mut physics, 0.0, 0.0);

        body.set_velocity(&mut physics, Vec2::new(1.0, 2.0));
        body.set_horizontal_velocity(&mut physics, 5.0);
        assert_eq!(body.velocity(&physics), Vec2::new(5.0, 2.0));

        body.set_vertical_velocity(&mut physics, -3.0);
        assert_eq!(body.velocity(&physics), Vec2::new(5.0, -3.0));
    }

    #[test]
    fn test_refresh_sensors_on_platform() {
        let mut physics = PhysicsWorld::new();

        // Floor top at y = 0, wall face at x = 0.55 spanning y = 0.5..4.5
        let floor = physics.add_rigid_body(presets::platform_body(0.0, -0.5));
        physics.add_collider(
            presets::platform_collider(20.0, 1.0),
            floor,
            EntityTag::new(EntityKind::Platform, 0),
        );
        let wall = physics.add_rigid_body(presets::platform_body(1.05, 2.5));
        physics.add_collider(
            presets::platform_collider(1.0, 4.0),
            wall,
            EntityTag::new(EntityKind::Platform, 1),
        );

        let mut body = CharacterBody::new(0, CharacterStats::standard(), &mut physics, 0.0, 1.0);
        body.jumps_remaining = 0;

        // Populate the query pipeline
        physics.step();
        body.set_velocity(&mut physics, Vec2::ZERO);
        body.refresh_sensors(&physics);

        assert!(body.grounded);
        assert!(body.touching_wall);
        assert_eq!(body.wall_side, 1.0);
        assert_eq!(body.jumps_remaining, body.stats.max_jumps);
    }

    #[test]
    fn test_kill_enters_dead_once() {
        let mut physics = PhysicsWorld::new();
        let mut knives = KnifeManager::default();
        let mut character =
            Character::new(0, "Runner", CharacterStats::standard(), &mut physics, 0.0, 0.0);

        character.kill(&mut physics, &mut knives);
        character.kill(&mut physics, &mut knives);

        assert_eq!(character.state(), StateKind::Dead);
        assert_eq!(character.state_machine.transition_count(), 1);
        assert!(!character.is_alive());
    }
}
