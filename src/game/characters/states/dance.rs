// Dance state

use glam::Vec2;

use crate::game::characters::animation::FALLBACK_CLIP;
use crate::game::characters::state::{CharacterState, StateContext, StateKind};

/// Trigger raised when a dance ends
pub const STOP_DANCE_TRIGGER: &str = "StopDance";

/// Grows the character while dancing in place. Lasts a minimum time, then ends once the
/// dance input is released. The scale it had before dancing comes back on any exit.
#[derive(Debug, Default)]
pub struct Dance {
    elapsed: f32,
    saved_scale: Option<Vec2>,
}

impl CharacterState for Dance {
    fn kind(&self) -> StateKind {
        StateKind::Dance
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) -> Option<StateKind> {
        self.elapsed = 0.0;

        let scale = ctx.body.visual_scale;
        self.saved_scale = Some(scale);
        // Positive multiplier keeps the sign of x
        ctx.body.visual_scale = scale * ctx.body.stats.dance_scale_multiplier.abs();

        ctx.body.set_horizontal_velocity(ctx.physics, 0.0);
        ctx.body
            .animation
            .play_or_fallback(StateKind::Dance.animation_name(), FALLBACK_CLIP);
        None
    }

    fn tick(&mut self, ctx: &mut StateContext<'_>, dt: f32) -> Option<StateKind> {
        ctx.body.set_horizontal_velocity(ctx.physics, 0.0);

        self.elapsed += dt;
        if self.elapsed >= ctx.body.stats.dance_min_duration && !ctx.input.is_dance_pressed() {
            return Some(StateKind::Idle);
        }
        None
    }

    fn exit(&mut self, ctx: &mut StateContext<'_>) {
        if let Some(scale) = self.saved_scale.take() {
            ctx.body.visual_scale = scale;
        }
        ctx.body.animation.set_trigger(STOP_DANCE_TRIGGER);
    }
}
