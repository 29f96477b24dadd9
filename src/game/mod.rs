// Gameplay layer
//
// - `characters`: character bodies, stats, animation bookkeeping and the state machine
// - `weapons`: throwable knives and their per-owner registry
// - `damage`: health and sustained hazard contact damage
// - `world`: owns every entity and routes physics contacts between them

pub mod characters;
pub mod damage;
pub mod weapons;
pub mod world;

pub use world::{CoinKind, GameEvent, GameWorld};
