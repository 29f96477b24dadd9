// Throwable knife system
//
// - Knife state machine (attached, thrown, returning)
// - Per-owner registry and lifecycle management
// - Knife tuning values

pub mod knife;
pub mod manager;
pub mod stats;

use thiserror::Error;

// Re-export commonly used types
pub use knife::{KnifeEvent, KnifeId, KnifeState, OwnerView};
pub use manager::KnifeManager;

/// Errors from knife operations
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum WeaponError {
    #[error("No knife template configured")]
    NoTemplate,

    #[error("Unknown knife: {0}")]
    UnknownKnife(KnifeId),

    #[error("Knife {knife} cannot be thrown while {state:?}")]
    NotAttached { knife: KnifeId, state: KnifeState },

    #[error("Knife {0} is already attached")]
    AlreadyAttached(KnifeId),

    #[error("Knife {0} has no owner")]
    NoOwner(KnifeId),

    #[error("Invalid throw direction")]
    InvalidDirection,
}
