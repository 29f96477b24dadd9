// Input manager - translates window events into player actions

use super::action::{Action, InputSource};
use super::config::InputConfig;
use super::player::PlayerInput;
use winit::event::{ElementState, KeyEvent, MouseButton};
use winit::keyboard::PhysicalKey;

/// Coordinates key bindings and the local player's input state
#[derive(Debug, Default)]
pub struct InputManager {
    /// Active key bindings
    config: InputConfig,

    /// Input state for the local player
    player: PlayerInput,
}

impl InputManager {
    /// Process a keyboard event from winit
    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        if let PhysicalKey::Code(key_code) = event.physical_key {
            // Key repeats are not new presses
            if event.repeat {
                return;
            }
            self.apply(InputSource::key(key_code), event.state);
        }
    }

    /// Process a mouse button event from winit
    pub fn process_mouse_event(&mut self, button: MouseButton, state: ElementState) {
        self.apply(InputSource::mouse(button), state);
    }

    fn apply(&mut self, source: InputSource, state: ElementState) {
        let Some(action) = self.config.get_action(source) else {
            return;
        };

        match state {
            ElementState::Pressed => self.player.press(action),
            ElementState::Released => self.player.release(action),
        }
    }

    /// Update input state for a new simulation step
    pub fn update(&mut self) {
        self.player.update();
    }

    /// Drop every held key, e.g. when the window loses focus and releases go missing
    pub fn reset(&mut self) {
        self.player.reset();
    }

    /// Get the local player's input
    pub fn player(&self) -> &PlayerInput {
        &self.player
    }

    /// Get the local player's input mutably (for unlock flags)
    pub fn player_mut(&mut self) -> &mut PlayerInput {
        &mut self.player
    }

    /// Check and clear a press of `action`, so a hotkey fires once per key press
    pub fn consume(&mut self, action: Action) -> bool {
        self.player.consume(action)
    }
}
