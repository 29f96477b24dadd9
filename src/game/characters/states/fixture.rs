// Test rig: one character body driven by scripted input, without physics steps

use glam::Vec2;

use super::locomotion::settle;
use crate::engine::input::ScriptedInput;
use crate::engine::physics::PhysicsWorld;
use crate::game::characters::character::CharacterBody;
use crate::game::characters::state::{CharacterStateMachine, StateContext, StateKind};
use crate::game::characters::CharacterStats;
use crate::game::weapons::{KnifeId, KnifeManager};

pub struct Rig {
    pub physics: PhysicsWorld,
    pub knives: KnifeManager,
    pub body: CharacterBody,
    pub input: ScriptedInput,
    pub machine: CharacterStateMachine,
}

impl Rig {
    /// Grounded character at the origin, starting in Idle
    pub fn new() -> Self {
        let mut physics = PhysicsWorld::new();
        let mut body = CharacterBody::new(0, CharacterStats::standard(), &mut physics, 0.0, 0.0);
        body.grounded = true;
        Self {
            physics,
            knives: KnifeManager::default(),
            body,
            input: ScriptedInput::new(),
            machine: CharacterStateMachine::new(),
        }
    }

    /// Spawn a knife and put it in the character's hand
    pub fn give_knife(&mut self) -> KnifeId {
        let owner = self.body.owner_view(&self.physics);
        let knife = self
            .knives
            .spawn_for(&mut self.physics, &owner)
            .expect("knife template");
        self.knives
            .force_attach(&mut self.physics, knife, &owner)
            .expect("knife exists");
        knife
    }

    /// Tick the machine once, then release one-shot presses
    pub fn tick(&mut self, dt: f32) {
        let mut ctx = StateContext {
            body: &mut self.body,
            input: &self.input,
            physics: &mut self.physics,
            knives: &mut self.knives,
        };
        self.machine.tick(&mut ctx, dt);
        self.input.jump = false;
        self.input.shoot = false;
    }

    pub fn switch_to(&mut self, next: StateKind) {
        let mut ctx = StateContext {
            body: &mut self.body,
            input: &self.input,
            physics: &mut self.physics,
            knives: &mut self.knives,
        };
        self.machine.switch_state(&mut ctx, next);
    }

    /// Movement state the current input and sensors lead to
    pub fn settle(&mut self) -> StateKind {
        let ctx = StateContext {
            body: &mut self.body,
            input: &self.input,
            physics: &mut self.physics,
            knives: &mut self.knives,
        };
        settle(&ctx)
    }

    pub fn state(&self) -> StateKind {
        self.machine.state()
    }

    pub fn velocity(&self) -> Vec2 {
        self.body.velocity(&self.physics)
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.body.set_velocity(&mut self.physics, velocity);
    }
}
