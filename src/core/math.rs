// Math utilities and helper functions

use glam::Vec2;
use rapier2d::prelude::{vector, Real, Vector};

/// Axis values below this magnitude count as "no input"
pub const AXIS_DEADZONE: f32 = 0.1;

/// Convert a glam vector into a rapier vector
pub fn to_physics(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

/// Convert a rapier vector into a glam vector
pub fn from_physics(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Reflect `incoming` about the surface `normal`.
///
/// The normal does not need to be unit length; a zero normal returns `incoming` unchanged.
pub fn reflect(incoming: Vec2, normal: Vec2) -> Vec2 {
    let n = normal.normalize_or_zero();
    incoming - 2.0 * incoming.dot(n) * n
}

/// Check whether an axis value is outside the deadzone
pub fn is_active_axis(value: f32) -> bool {
    value.abs() > AXIS_DEADZONE
}
