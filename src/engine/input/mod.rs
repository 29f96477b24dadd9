// Input handling system
//
// Translates keyboard and mouse events into game actions and exposes them to the
// gameplay code through the `InputProvider` trait.
//
// ## Architecture
//
// - `action`: Defines game actions and default key bindings
// - `config`: Input configuration and remapping
// - `player`: Local player input state (implements `InputProvider`)
// - `provider`: The `InputProvider` trait and a scripted implementation
// - `manager`: Routes winit events through the bindings into the player state
//
// ## Usage Example
//
// ```rust
// let mut input = InputManager::default();
//
// // In your event loop
// input.process_keyboard_event(&key_event);
//
// // Each simulation step
// world.tick(FIXED_TIMESTEP, input.player());
// input.update();
// ```

pub mod action;
pub mod config;
pub mod manager;
pub mod player;
pub mod provider;

// Re-export commonly used types
pub use action::Action;
pub use manager::InputManager;
pub use provider::{InputProvider, ScriptedInput};
