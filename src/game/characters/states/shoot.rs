// Knife throw state

use glam::Vec2;
use log::{debug, warn};

use super::locomotion::settle;
use crate::core::math::is_active_axis;
use crate::game::characters::animation::FALLBACK_CLIP;
use crate::game::characters::state::{CharacterState, StateContext, StateKind};
use crate::game::weapons::KnifeId;

/// Horizontal part of an upward or downward throw
const AIMED_THROW_X: f32 = 0.5;

/// Throw direction from facing and vertical aim.
///
/// Without aim the knife flies straight ahead; with aim it leaves at `(±0.5, ±1)` normalized.
pub fn throw_direction(facing_right: bool, aim_y: f32) -> Vec2 {
    let forward = if facing_right { 1.0 } else { -1.0 };
    if is_active_axis(aim_y) {
        Vec2::new(forward * AIMED_THROW_X, aim_y.signum()).normalize()
    } else {
        Vec2::new(forward, 0.0)
    }
}

/// Throws the attached knife, then dwells briefly while moving at reduced speed
#[derive(Debug, Default)]
pub struct Shoot {
    elapsed: f32,
    knife: Option<KnifeId>,
}

impl CharacterState for Shoot {
    fn kind(&self) -> StateKind {
        StateKind::Shoot
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) -> Option<StateKind> {
        ctx.body
            .animation
            .play_or_fallback(StateKind::Shoot.animation_name(), FALLBACK_CLIP);
        self.elapsed = 0.0;

        let owner = ctx.body.id;
        let Some(knife) = ctx.knives.attached_knife(owner) else {
            debug!("Character {} has no knife in hand", owner);
            return Some(StateKind::Idle);
        };

        let direction = throw_direction(ctx.body.facing_right, ctx.input.movement_axis().y);
        if let Err(err) = ctx.knives.throw(ctx.physics, knife, direction) {
            warn!("Character {} could not throw: {}", owner, err);
            return Some(StateKind::Idle);
        }

        self.knife = Some(knife);
        None
    }

    fn tick(&mut self, ctx: &mut StateContext<'_>, dt: f32) -> Option<StateKind> {
        let axis = ctx.input.movement_axis();
        ctx.body.face(axis.x);
        let speed = ctx.body.stats.shoot_speed();
        ctx.body.set_horizontal_velocity(ctx.physics, axis.x * speed);

        self.elapsed += dt;
        if self.elapsed < ctx.body.stats.shoot_dwell {
            return None;
        }
        Some(settle(ctx))
    }

    fn exit(&mut self, _ctx: &mut StateContext<'_>) {
        self.knife = None;
    }
}
