//! Biome classification from a blended noise value.

use crate::params::BiomeParams;

/// The four surface biomes, in ascending classifier order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Biome {
    /// Cold: snow surface.
    Tundra,
    /// Mild: grass surface.
    Temperate,
    /// Hot and wet: grass surface, jungle trees.
    Jungle,
    /// Hot and dry: sand surface, no trees.
    Desert,
}

impl Biome {
    /// Classifies a blended noise value against the ascending thresholds.
    pub fn classify(value: f64, params: &BiomeParams) -> Biome {
        if value < params.tundra_to_temperate {
            Biome::Tundra
        } else if value < params.temperate_to_jungle {
            Biome::Temperate
        } else if value < params.jungle_to_desert {
            Biome::Jungle
        } else {
            Biome::Desert
        }
    }

    /// Returns `true` if trees can grow in this biome.
    pub fn grows_trees(self) -> bool {
        !matches!(self, Biome::Desert)
    }
}
