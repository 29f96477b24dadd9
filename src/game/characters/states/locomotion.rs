// Ground and air movement states

use crate::core::math::is_active_axis;
use crate::game::characters::animation::FALLBACK_CLIP;
use crate::game::characters::state::{CharacterState, StateContext, StateKind};

/// Pick the movement state that fits the current input and sensors.
///
/// Priority: jump (if one is left), then crouch, idle, run, walk on the ground, then wall
/// cling (touching a wall while not rising) or fall in the air.
pub(crate) fn settle(ctx: &StateContext<'_>) -> StateKind {
    let input = ctx.input;
    let body = &*ctx.body;

    if input.is_jump_pressed() && body.can_jump() {
        return StateKind::Jump;
    }

    if body.grounded {
        let axis = input.movement_axis();
        if input.is_crouch_held() {
            StateKind::Crouch
        } else if !is_active_axis(axis.x) {
            StateKind::Idle
        } else if input.is_run_pressed() {
            StateKind::Run
        } else {
            StateKind::Walk
        }
    } else if body.touching_wall && body.velocity(&*ctx.physics).y <= 0.0 {
        StateKind::WallCling
    } else {
        StateKind::Fall
    }
}

/// `next` if it differs from the current state
fn change(current: StateKind, next: StateKind) -> Option<StateKind> {
    (next != current).then_some(next)
}

/// Shoot or dance requested from the ground
fn ground_action(ctx: &StateContext<'_>) -> Option<StateKind> {
    if ctx.input.is_shoot_pressed() {
        Some(StateKind::Shoot)
    } else if ctx.input.is_dance_pressed() {
        Some(StateKind::Dance)
    } else {
        None
    }
}

/// Move horizontally at `speed` scaled by the input axis
fn ground_move(ctx: &mut StateContext<'_>, speed: f32) {
    let axis = ctx.input.movement_axis();
    ctx.body.face(axis.x);
    ctx.body.set_horizontal_velocity(ctx.physics, axis.x * speed);
}

/// Steer in the air; without input the horizontal velocity is kept
fn air_move(ctx: &mut StateContext<'_>) {
    let axis = ctx.input.movement_axis();
    if !is_active_axis(axis.x) {
        return;
    }
    ctx.body.face(axis.x);
    let speed = ctx.body.stats.move_speed * ctx.body.stats.air_control;
    ctx.body.set_horizontal_velocity(ctx.physics, axis.x * speed);
}

#[derive(Debug, Default)]
pub struct Idle;

impl CharacterState for Idle {
    fn kind(&self) -> StateKind {
        StateKind::Idle
    }

    fn tick(&mut self, ctx: &mut StateContext<'_>, _dt: f32) -> Option<StateKind> {
        ctx.body.set_horizontal_velocity(ctx.physics, 0.0);
        ground_action(ctx).or_else(|| change(StateKind::Idle, settle(ctx)))
    }
}

#[derive(Debug, Default)]
pub struct Walk;

impl CharacterState for Walk {
    fn kind(&self) -> StateKind {
        StateKind::Walk
    }

    fn tick(&mut self, ctx: &mut StateContext<'_>, _dt: f32) -> Option<StateKind> {
        let speed = ctx.body.stats.move_speed;
        ground_move(ctx, speed);
        ground_action(ctx).or_else(|| change(StateKind::Walk, settle(ctx)))
    }
}

#[derive(Debug, Default)]
pub struct Run;

impl CharacterState for Run {
    fn kind(&self) -> StateKind {
        StateKind::Run
    }

    fn tick(&mut self, ctx: &mut StateContext<'_>, _dt: f32) -> Option<StateKind> {
        let speed = ctx.body.stats.run_speed();
        ground_move(ctx, speed);
        ground_action(ctx).or_else(|| change(StateKind::Run, settle(ctx)))
    }
}

#[derive(Debug, Default)]
pub struct Crouch;

impl CharacterState for Crouch {
    fn kind(&self) -> StateKind {
        StateKind::Crouch
    }

    fn tick(&mut self, ctx: &mut StateContext<'_>, _dt: f32) -> Option<StateKind> {
        let speed = ctx.body.stats.crouch_speed();
        ground_move(ctx, speed);

        if ctx.input.is_shoot_pressed() {
            return Some(StateKind::Shoot);
        }
        change(StateKind::Crouch, settle(ctx))
    }
}

#[derive(Debug, Default)]
pub struct Jump;

impl CharacterState for Jump {
    fn kind(&self) -> StateKind {
        StateKind::Jump
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) -> Option<StateKind> {
        ctx.body
            .animation
            .play_or_fallback(StateKind::Jump.animation_name(), FALLBACK_CLIP);
        ctx.body.consume_jump();
        let jump_force = ctx.body.stats.jump_force;
        ctx.body.set_vertical_velocity(ctx.physics, jump_force);
        None
    }

    fn tick(&mut self, ctx: &mut StateContext<'_>, _dt: f32) -> Option<StateKind> {
        air_move(ctx);

        if ctx.input.is_shoot_pressed() {
            return Some(StateKind::Shoot);
        }
        // Air jump restarts the state
        if ctx.input.is_jump_pressed() && ctx.body.can_jump() {
            return Some(StateKind::Jump);
        }
        if ctx.body.velocity(ctx.physics).y > 0.0 {
            return None;
        }
        change(StateKind::Jump, settle(ctx))
    }
}

#[derive(Debug, Default)]
pub struct Fall;

impl CharacterState for Fall {
    fn kind(&self) -> StateKind {
        StateKind::Fall
    }

    fn tick(&mut self, ctx: &mut StateContext<'_>, _dt: f32) -> Option<StateKind> {
        air_move(ctx);

        if ctx.input.is_shoot_pressed() {
            return Some(StateKind::Shoot);
        }
        change(StateKind::Fall, settle(ctx))
    }
}

#[derive(Debug, Default)]
pub struct WallCling;

impl CharacterState for WallCling {
    fn kind(&self) -> StateKind {
        StateKind::WallCling
    }

    fn enter(&mut self, ctx: &mut StateContext<'_>) -> Option<StateKind> {
        ctx.body
            .animation
            .play_or_fallback(StateKind::WallCling.animation_name(), FALLBACK_CLIP);
        // Face away from the wall
        ctx.body.face(-ctx.body.wall_side);
        ctx.body.jumps_remaining = ctx.body.jumps_remaining.max(1);
        None
    }

    fn tick(&mut self, ctx: &mut StateContext<'_>, _dt: f32) -> Option<StateKind> {
        let slide = ctx.body.stats.wall_slide_speed;
        if ctx.body.velocity(ctx.physics).y < -slide {
            ctx.body.set_vertical_velocity(ctx.physics, -slide);
        }

        if ctx.input.is_shoot_pressed() {
            return Some(StateKind::Shoot);
        }

        if ctx.input.is_jump_pressed() && ctx.body.can_jump() {
            let away = -ctx.body.wall_side;
            let push = ctx.body.stats.wall_jump_push;
            ctx.body.face(away);
            ctx.body.set_horizontal_velocity(ctx.physics, away * push);
            return Some(StateKind::Jump);
        }

        if ctx.body.grounded || !ctx.body.touching_wall {
            return change(StateKind::WallCling, settle(ctx));
        }
        None
    }
}
