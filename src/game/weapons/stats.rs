// Knife tuning values

use glam::Vec2;
use std::f32::consts::PI;

/// Flight, return and timing parameters shared by every knife spawned from a template
#[derive(Debug, Clone)]
pub struct KnifeStats {
    // Attachment
    /// Offset from the owner while attached, mirrored when the owner faces left
    pub attach_offset: Vec2,
    /// Offset from the owner where replacement knives appear
    pub spawn_offset: Vec2,

    // Flight
    /// Speed of a fresh throw (units/second)
    pub throw_speed: f32,
    /// Spin while airborne (radians/second)
    pub spin_speed: f32,
    /// Speed multiplier applied on every bounce
    pub bounce_factor: f32,
    /// Return delay after a bounce (seconds)
    pub bounce_return_delay: f32,
    /// Longest flight before the knife comes back on its own (seconds)
    pub max_flight_time: f32,
    /// Owner contacts are ignored for this long after a throw (seconds)
    pub owner_grace_period: f32,

    // Return
    /// Pursuit speed while returning (units/second)
    pub return_speed: f32,
    /// Distance from the owner at which a returning knife attaches
    pub pickup_radius: f32,
    /// Returning longer than this forces an attach (seconds)
    pub max_return_time: f32,

    // Self-check
    /// Seconds between self-checks
    pub self_check_interval: f32,
    /// A knife in flight further than this from its owner is recalled
    pub max_owner_distance: f32,

    // Dimensions (for physics collider)
    pub length: f32,
    pub thickness: f32,
}

/// Default knife template
pub const BASE_KNIFE: KnifeStats = KnifeStats {
    attach_offset: Vec2::new(0.5, 0.0),
    spawn_offset: Vec2::new(0.0, 1.5),

    throw_speed: 15.0,
    spin_speed: 4.0 * PI,
    bounce_factor: 0.5,
    bounce_return_delay: 0.5,
    max_flight_time: 3.0,
    owner_grace_period: 0.25,

    return_speed: 20.0,
    pickup_radius: 2.0,
    max_return_time: 6.0,

    self_check_interval: 1.0,
    max_owner_distance: 50.0,

    length: 0.6,
    thickness: 0.15,
};

impl Default for KnifeStats {
    fn default() -> Self {
        BASE_KNIFE
    }
}

impl KnifeStats {
    /// Get the standard knife stats
    pub fn standard() -> Self {
        BASE_KNIFE
    }

    /// Attach offset for an owner facing the given direction
    pub fn offset_for(&self, facing_right: bool) -> Vec2 {
        if facing_right {
            self.attach_offset
        } else {
            Vec2::new(-self.attach_offset.x, self.attach_offset.y)
        }
    }
}
