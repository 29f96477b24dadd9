// Concrete character states

mod dance;
mod dead;
mod locomotion;
mod shoot;

#[cfg(test)]
mod fixture;

pub use dance::Dance;
pub use dead::Dead;
pub use locomotion::{Crouch, Fall, Idle, Jump, Run, Walk, WallCling};
pub use shoot::Shoot;
