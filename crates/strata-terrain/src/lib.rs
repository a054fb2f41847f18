//! Procedural terrain generation: deterministic RNG, biome classification,
//! and the fixed chunk generation pipeline.

mod biome;
mod generator;
mod params;
mod rng;

pub use biome::Biome;
pub use generator::{ChunkGenerator, GenError};
pub use params::{BiomeParams, CloudParams, GenParams, TerrainParams, TreeParams};
pub use rng::GenRng;
