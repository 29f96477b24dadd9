// Engine modules: simulation loop, input, physics, timers

pub mod game_loop;
pub mod input;
pub mod physics;
pub mod scheduler;
