use anyhow::Result;
use log::{debug, info};
use winit::{
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    window::WindowBuilder,
};

mod core;
mod engine;
mod game;

use engine::game_loop::{GameLoop, FIXED_TIMESTEP};
use engine::input::{Action, InputManager, InputProvider};
use game::{CoinKind, GameEvent, GameWorld};

/// Build the starting level: floor, a wall to cling to, a hazard and the unlock coins
fn build_level(world: &mut GameWorld) {
    world.add_platform(0.0, -0.5, 60.0, 1.0);
    world.add_platform(-12.0, 5.0, 1.0, 10.0);
    world.add_platform(8.0, 3.0, 6.0, 0.5);

    world.spawn_character("Player", 0.0, 1.0);
    let contact_damage = world.damage().stats().contact_damage;
    world.spawn_hazard(14.0, 0.5, contact_damage);

    world.spawn_coin(4.0, 0.5, CoinKind::Gold);
    world.spawn_coin(8.0, 4.0, CoinKind::Blue);
    world.spawn_coin(-8.0, 0.5, CoinKind::Red);
}

/// Debug hotkeys acting on the player's knife
fn handle_hotkeys(world: &mut GameWorld, input: &mut InputManager, game_loop: &mut GameLoop) {
    if input.consume(Action::Pause) {
        game_loop.toggle_pause();
        if game_loop.is_paused() {
            log_status(world, game_loop);
        }
    }

    let Some(player) = world.player() else {
        return;
    };
    if input.consume(Action::SpawnKnife) {
        world.spawn_knife(player);
    }
    if input.consume(Action::ForceReturn) {
        world.force_return_knife(player);
    }
    if input.consume(Action::ForceAttach) {
        world.force_attach_knife(player);
    }
}

/// Dump the simulation state to the log, shown when the game pauses
fn log_status(world: &GameWorld, game_loop: &GameLoop) {
    info!(
        "Paused after {:.2}s of play ({} updates)",
        game_loop.sim_time(),
        game_loop.update_count()
    );

    let physics = world.physics();
    for character in world.characters().all() {
        let animation = &character.body.animation;
        info!(
            "{} [{}]: {:?} at {:?}, health {}, coins {}, animation {} frame {}",
            character.name,
            character.id(),
            character.state(),
            character.position(physics),
            character.body.health.current(),
            character.body.coins,
            animation.current_animation(),
            animation.current_frame()
        );

        let knife = world
            .knives()
            .claimed_knife(character.id())
            .and_then(|id| world.knives().get(id));
        if let Some(knife) = knife {
            info!(
                "  knife {}: {:?} at {:?}, {:.2}s old",
                knife.id(),
                knife.state(),
                knife.position(physics),
                knife.now()
            );
        }
    }

    info!(
        "{} knives, {} hazards and {} coins left",
        world.knives().count(),
        world.hazards().len(),
        world.coins().len()
    );
}

/// React to what happened in the world since the last frame
fn handle_events(world: &mut GameWorld, input: &mut InputManager) {
    for event in world.drain_events() {
        match event {
            GameEvent::CoinCollected { kind, .. } => match kind {
                CoinKind::Blue => {
                    info!("Run unlocked");
                    input.player_mut().set_run_unlocked(true);
                }
                CoinKind::Red => {
                    info!("Dance unlocked");
                    input.player_mut().set_dance_unlocked(true);
                }
                CoinKind::Gold => {}
            },
            GameEvent::CharacterDied { character } => info!("Character {} is out", character),
            other => debug!("{:?}", other),
        }
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Knife Runner...");

    // Create event loop and window
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Knife Runner")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
        .with_resizable(true)
        .build(&event_loop)?;

    info!("Window created successfully");

    let mut world = GameWorld::new();
    build_level(&mut world);
    let mut input = InputManager::default();
    let mut game_loop = GameLoop::new();

    // Main event loop
    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!("Close requested, shutting down...");
                elwt.exit();
            }
            Event::WindowEvent {
                event: WindowEvent::KeyboardInput { event, .. },
                ..
            } => input.process_keyboard_event(&event),
            Event::WindowEvent {
                event: WindowEvent::MouseInput { state, button, .. },
                ..
            } => input.process_mouse_event(button, state),
            Event::WindowEvent {
                event: WindowEvent::Focused(false),
                ..
            } => {
                // Key releases while unfocused never arrive
                input.reset();
            }
            Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                ..
            } => {
                handle_hotkeys(&mut world, &mut input, &mut game_loop);

                for _ in 0..game_loop.begin_frame() {
                    world.tick(FIXED_TIMESTEP, input.player());
                    input.update();
                }

                handle_events(&mut world, &mut input);
            }
            Event::AboutToWait => {
                // Request redraw on next frame
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}
