// Character tuning values

/// Movement, combat and timing parameters for a character
#[derive(Debug, Clone)]
pub struct CharacterStats {
    // Movement
    /// Walking speed (units/second)
    pub move_speed: f32,
    /// Multiplier applied to `move_speed` while running
    pub run_multiplier: f32,
    /// Multiplier applied to `move_speed` while crouching
    pub crouch_multiplier: f32,
    /// Upward velocity applied when a jump starts
    pub jump_force: f32,
    /// Number of jumps available before landing
    pub max_jumps: u8,
    /// Air control multiplier (0.0 = no air control, 1.0 = full control)
    pub air_control: f32,
    /// Maximum downward speed while clinging to a wall
    pub wall_slide_speed: f32,
    /// Horizontal push away from the wall on a wall jump
    pub wall_jump_push: f32,

    // Combat
    /// Starting health points
    pub max_health: i32,
    /// Seconds spent in the shoot state after a throw
    pub shoot_dwell: f32,
    /// Multiplier applied to `move_speed` while shooting
    pub shoot_move_multiplier: f32,

    // Dance
    /// Seconds a dance lasts before it can be cancelled
    pub dance_min_duration: f32,
    /// Uniform visual scale multiplier while dancing
    pub dance_scale_multiplier: f32,

    // Dimensions (for physics collider)
    /// Character width in world units
    pub width: f32,
    /// Character height in world units
    pub height: f32,
}

/// Default stats for the player character
pub const BASE_STATS: CharacterStats = CharacterStats {
    move_speed: 6.0,
    run_multiplier: 1.75,
    crouch_multiplier: 0.4,
    jump_force: 12.0,
    max_jumps: 2,
    air_control: 0.8,
    wall_slide_speed: 2.0,
    wall_jump_push: 6.0,

    max_health: 10,
    shoot_dwell: 0.5,
    shoot_move_multiplier: 0.5,

    dance_min_duration: 4.0,
    dance_scale_multiplier: 1.5,

    width: 1.0,
    height: 2.0,
};

impl Default for CharacterStats {
    fn default() -> Self {
        BASE_STATS
    }
}

impl CharacterStats {
    /// Get the standard character stats
    pub fn standard() -> Self {
        BASE_STATS
    }

    /// Horizontal speed for the run state
    pub fn run_speed(&self) -> f32 {
        self.move_speed * self.run_multiplier
    }

    /// Horizontal speed for the crouch state
    pub fn crouch_speed(&self) -> f32 {
        self.move_speed * self.crouch_multiplier
    }

    /// Horizontal speed while the shoot state dwells
    pub fn shoot_speed(&self) -> f32 {
        self.move_speed * self.shoot_move_multiplier
    }
}
