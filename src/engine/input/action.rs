// Game action definitions and mappings

use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Represents all possible in-game actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Movement
    MoveLeft,
    MoveRight,
    AimUp,
    AimDown,
    Jump,
    Crouch,
    Run,

    // Combat & emotes
    Shoot,
    Dance,

    // Knife debugging
    SpawnKnife,
    ForceReturn,
    ForceAttach,

    // Meta actions
    Pause,
}

/// Represents an input source (keyboard key or mouse button)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Keyboard(KeyCode),
    Mouse(MouseButton),
}

impl InputSource {
    /// Create a keyboard input source
    pub fn key(code: KeyCode) -> Self {
        Self::Keyboard(code)
    }

    /// Create a mouse button input source
    pub fn mouse(button: MouseButton) -> Self {
        Self::Mouse(button)
    }
}

/// Default keyboard/mouse bindings
pub fn default_bindings() -> Vec<(InputSource, Action)> {
    vec![
        // Movement (arrows and WASD)
        (InputSource::key(KeyCode::KeyA), Action::MoveLeft),
        (InputSource::key(KeyCode::ArrowLeft), Action::MoveLeft),
        (InputSource::key(KeyCode::KeyD), Action::MoveRight),
        (InputSource::key(KeyCode::ArrowRight), Action::MoveRight),
        (InputSource::key(KeyCode::KeyW), Action::AimUp),
        (InputSource::key(KeyCode::ArrowUp), Action::AimUp),
        (InputSource::key(KeyCode::KeyS), Action::AimDown),
        (InputSource::key(KeyCode::ArrowDown), Action::AimDown),
        (InputSource::key(KeyCode::Space), Action::Jump),
        (InputSource::key(KeyCode::KeyC), Action::Crouch),
        (InputSource::key(KeyCode::ShiftLeft), Action::Run),
        (InputSource::key(KeyCode::ShiftRight), Action::Run),
        // Combat
        (InputSource::mouse(MouseButton::Left), Action::Shoot),
        (InputSource::key(KeyCode::KeyJ), Action::Dance),
        // Knife debugging
        (InputSource::key(KeyCode::KeyK), Action::SpawnKnife),
        (InputSource::key(KeyCode::KeyR), Action::ForceReturn),
        (InputSource::key(KeyCode::KeyL), Action::ForceAttach),
        // Meta
        (InputSource::key(KeyCode::KeyP), Action::Pause),
    ]
}
