// Character system
//
// This module contains everything related to playable characters:
// - Character body, identity and management
// - Character tuning values
// - State machine and the concrete movement and action states
// - Animation clip bookkeeping

pub mod animation;
pub mod character;
pub mod state;
pub mod states;
pub mod stats;

// Re-export commonly used types
pub use character::{Character, CharacterId, CharacterManager};
pub use state::StateKind;
pub use stats::CharacterStats;
