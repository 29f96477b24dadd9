// Player input state backed by keyboard and mouse actions

use super::action::Action;
use super::provider::InputProvider;
use glam::Vec2;
use std::collections::HashSet;

/// Represents the input state for the local player
#[derive(Debug, Default)]
pub struct PlayerInput {
    /// Actions that are currently pressed this frame
    pressed: HashSet<Action>,

    /// Actions that were just pressed this frame (press events)
    just_pressed: HashSet<Action>,

    /// Running has been unlocked by the game
    run_unlocked: bool,

    /// Dancing has been unlocked by the game
    dance_unlocked: bool,
}

impl PlayerInput {
    /// Check if an action is currently pressed
    pub fn is_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    /// Check if an action was just pressed this frame
    pub fn just_pressed(&self, action: Action) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Register an action press
    pub(crate) fn press(&mut self, action: Action) {
        if self.pressed.insert(action) {
            self.just_pressed.insert(action);
        }
    }

    /// Register an action release
    pub(crate) fn release(&mut self, action: Action) {
        self.pressed.remove(&action);
    }

    /// Take a press so it is seen only once (for hotkeys handled outside the simulation)
    pub(crate) fn consume(&mut self, action: Action) -> bool {
        self.just_pressed.remove(&action)
    }

    /// Update input state for a new frame.
    /// Call this once per simulation step after the world consumed the input.
    pub(crate) fn update(&mut self) {
        self.just_pressed.clear();
    }

    /// Reset all pressed state (unlock flags are kept)
    pub(crate) fn reset(&mut self) {
        self.pressed.clear();
        self.just_pressed.clear();
    }

    fn axis(&self, negative: Action, positive: Action) -> f32 {
        let mut value = 0.0;
        if self.is_pressed(negative) {
            value -= 1.0;
        }
        if self.is_pressed(positive) {
            value += 1.0;
        }
        value
    }
}

impl InputProvider for PlayerInput {
    fn movement_axis(&self) -> Vec2 {
        Vec2::new(
            self.axis(Action::MoveLeft, Action::MoveRight),
            self.axis(Action::AimDown, Action::AimUp),
        )
    }

    fn is_jump_pressed(&self) -> bool {
        self.just_pressed(Action::Jump)
    }

    fn is_crouch_held(&self) -> bool {
        self.is_pressed(Action::Crouch)
    }

    fn is_run_pressed(&self) -> bool {
        self.run_unlocked && self.is_pressed(Action::Run)
    }

    fn is_shoot_pressed(&self) -> bool {
        self.just_pressed(Action::Shoot)
    }

    fn is_dance_pressed(&self) -> bool {
        self.dance_unlocked && self.is_pressed(Action::Dance)
    }

    fn set_run_unlocked(&mut self, unlocked: bool) {
        self.run_unlocked = unlocked;
    }

    fn set_dance_unlocked(&mut self, unlocked: bool) {
        self.dance_unlocked = unlocked;
    }
}
