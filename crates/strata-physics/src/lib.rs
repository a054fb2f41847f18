//! Fixed-timestep avatar physics: cylinder-vs-voxel collision with two-phase
//! detection and deterministic, smallest-overlap-first resolution.

mod collision;
mod engine;
mod player;
mod query;

pub use collision::{Contact, broad_phase, narrow_phase, resolve_collisions};
pub use engine::PhysicsEngine;
pub use player::Player;
pub use query::BlockQuery;
