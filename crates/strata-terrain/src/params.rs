//! Generation parameter set.
//!
//! An immutable snapshot of every knob the generator consults. A
//! [`GenParams`] is cloned into each [`ChunkGenerator`](crate::ChunkGenerator)
//! at construction; mutating a copy and regenerating is the only way to
//! change the world's shape.

use serde::{Deserialize, Serialize};

/// Complete parameter set for one generation pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenParams {
    /// World seed feeding every noise field and the placement RNG.
    pub seed: u64,
    /// Terrain height field parameters.
    pub terrain: TerrainParams,
    /// Biome classifier parameters.
    pub biomes: BiomeParams,
    /// Tree placement parameters.
    pub trees: TreeParams,
    /// Cloud layer parameters.
    pub clouds: CloudParams,
}

/// Terrain height field: one octave of coherent noise mapped through
/// `offset + magnitude * value`, floored and clamped into the chunk height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Horizontal divisor applied to world coordinates before sampling.
    pub scale: f64,
    /// Height contribution of the noise value, in blocks.
    pub magnitude: f64,
    /// Base terrain height, in blocks.
    pub offset: f64,
    /// Surface columns at or below this height get a sand surface.
    pub water_level: i32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            scale: 80.0,
            magnitude: 10.0,
            offset: 16.0,
            water_level: 5,
        }
    }
}

/// Biome classifier: a blend of two noise octaves compared against ascending
/// thresholds (tundra < temperate < jungle < desert).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeParams {
    /// Horizontal divisor of the base octave.
    pub scale: f64,
    /// Contribution of the variation octave.
    pub variation_amplitude: f64,
    /// Horizontal divisor of the variation octave.
    pub variation_scale: f64,
    /// Classifier value below which a column is tundra.
    pub tundra_to_temperate: f64,
    /// Classifier value below which a column is temperate.
    pub temperate_to_jungle: f64,
    /// Classifier value below which a column is jungle; above is desert.
    pub jungle_to_desert: f64,
}

impl Default for BiomeParams {
    fn default() -> Self {
        Self {
            scale: 200.0,
            variation_amplitude: 0.2,
            variation_scale: 50.0,
            tundra_to_temperate: 0.25,
            temperate_to_jungle: 0.5,
            jungle_to_desert: 0.75,
        }
    }
}

/// Tree placement: stochastic trunk plus spherical canopy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    /// Probability that an eligible surface column grows a tree.
    pub frequency: f64,
    /// Minimum trunk height, in blocks.
    pub trunk_min_height: i32,
    /// Maximum trunk height, in blocks.
    pub trunk_max_height: i32,
    /// Minimum canopy radius, in blocks.
    pub canopy_min_radius: i32,
    /// Maximum canopy radius, in blocks.
    pub canopy_max_radius: i32,
    /// Probability that a candidate offset within the canopy sphere becomes
    /// a leaf block.
    pub canopy_density: f64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            frequency: 0.01,
            trunk_min_height: 4,
            trunk_max_height: 7,
            canopy_min_radius: 2,
            canopy_max_radius: 3,
            canopy_density: 0.6,
        }
    }
}

/// Cloud layer: the top horizontal slice gets a cloud block wherever a noise
/// field falls below the density threshold.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudParams {
    /// Horizontal divisor applied to world coordinates before sampling.
    pub scale: f64,
    /// Fraction of the sky covered, in `[0, 1]`. Zero disables clouds.
    pub density: f64,
}

impl Default for CloudParams {
    fn default() -> Self {
        Self {
            scale: 30.0,
            density: 0.3,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
