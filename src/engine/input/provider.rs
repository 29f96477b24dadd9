// Input queries consumed by the character state machine

use glam::Vec2;

/// Per-tick input queries for one character.
///
/// `is_run_pressed` and `is_dance_pressed` are gated by unlock flags that the outer game
/// sets (e.g. after collecting a coin). Implementations must report `false` while locked.
pub trait InputProvider {
    /// Horizontal movement in `x`, aim up/down in `y`, both in -1..=1
    fn movement_axis(&self) -> Vec2;

    /// Jump was pressed this tick
    fn is_jump_pressed(&self) -> bool;

    fn is_crouch_held(&self) -> bool;

    /// Run is held and unlocked
    fn is_run_pressed(&self) -> bool;

    /// Shoot was pressed this tick
    fn is_shoot_pressed(&self) -> bool;

    /// Dance is held and unlocked
    fn is_dance_pressed(&self) -> bool;

    fn set_run_unlocked(&mut self, unlocked: bool);

    fn set_dance_unlocked(&mut self, unlocked: bool);
}

/// Input provider driven by plain fields, for scripted play and tests
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    pub axis: Vec2,
    pub jump: bool,
    pub crouch: bool,
    pub run: bool,
    pub shoot: bool,
    pub dance: bool,
    pub run_unlocked: bool,
    pub dance_unlocked: bool,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputProvider for ScriptedInput {
    fn movement_axis(&self) -> Vec2 {
        self.axis
    }

    fn is_jump_pressed(&self) -> bool {
        self.jump
    }

    fn is_crouch_held(&self) -> bool {
        self.crouch
    }

    fn is_run_pressed(&self) -> bool {
        self.run_unlocked && self.run
    }

    fn is_shoot_pressed(&self) -> bool {
        self.shoot
    }

    fn is_dance_pressed(&self) -> bool {
        self.dance_unlocked && self.dance
    }

    fn set_run_unlocked(&mut self, unlocked: bool) {
        self.run_unlocked = unlocked;
    }

    fn set_dance_unlocked(&mut self, unlocked: bool) {
        self.dance_unlocked = unlocked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_requires_unlock() {
        let mut input = ScriptedInput::new();
        input.run = true;
        assert!(!input.is_run_pressed());

        input.set_run_unlocked(true);
        assert!(input.is_run_pressed());
    }

    #[test]
    fn test_dance_requires_unlock() {
        let mut input = ScriptedInput::new();
        input.dance = true;
        assert!(!input.is_dance_pressed());

        input.set_dance_unlocked(true);
        assert!(input.is_dance_pressed());
    }
}
