// Terminal state

use crate::game::characters::state::{CharacterState, StateContext, StateKind};

#[derive(Debug, Default)]
pub struct Dead;

impl CharacterState for Dead {
    fn kind(&self) -> StateKind {
        StateKind::Dead
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) -> Option<StateKind> {
        ctx.body.animation.play(StateKind::Dead.animation_name());
        ctx.body.set_horizontal_velocity(ctx.physics, 0.0);
        None
    }

    fn tick(&mut self, ctx: &mut StateContext<'_>, _dt: f32) -> Option<StateKind> {
        ctx.body.set_horizontal_velocity(ctx.physics, 0.0);
        None
    }
}
