//! Chunk generation pipeline.
//!
//! [`ChunkGenerator::generate`] runs a fixed sequence of stages over a fresh
//! chunk: terrain and biome survey, column fill with resource veins, tree
//! placement, cloud layer, then persisted edit replay. Stage order defines
//! correctness since later stages read earlier stages' output.

use noise::{NoiseFn, Simplex};
use thiserror::Error;
use tracing::debug;

use strata_voxel::{BlockId, BlockRegistry, Chunk, ChunkSize, EditStore, ResourceDef};

use crate::biome::Biome;
use crate::params::GenParams;
use crate::rng::GenRng;

/// Seed offsets decorrelating the noise fields from each other.
const BIOME_SEED_OFFSET: u64 = 1;
const RESOURCE_SEED_OFFSET: u64 = 2;
const CLOUD_SEED_OFFSET: u64 = 3;

/// Generator construction failure.
#[derive(Debug, Error)]
pub enum GenError {
    /// The block registry is missing a block the generator requires.
    #[error("block registry has no entry named '{0}'")]
    MissingBlock(String),
}

/// Block IDs the pipeline writes, resolved once at construction.
struct Palette {
    grass: BlockId,
    dirt: BlockId,
    sand: BlockId,
    snow: BlockId,
    tree_trunk: BlockId,
    leaves: BlockId,
    jungle_tree_trunk: BlockId,
    jungle_leaves: BlockId,
    cloud: BlockId,
}

impl Palette {
    fn resolve(registry: &BlockRegistry) -> Result<Self, GenError> {
        let lookup = |name: &str| {
            registry
                .lookup_by_name(name)
                .ok_or_else(|| GenError::MissingBlock(name.to_string()))
        };
        Ok(Self {
            grass: lookup("grass")?,
            dirt: lookup("dirt")?,
            sand: lookup("sand")?,
            snow: lookup("snow")?,
            tree_trunk: lookup("tree_trunk")?,
            leaves: lookup("leaves")?,
            jungle_tree_trunk: lookup("jungle_tree_trunk")?,
            jungle_leaves: lookup("jungle_leaves")?,
            cloud: lookup("cloud")?,
        })
    }

    fn surface_for(&self, biome: Biome) -> BlockId {
        match biome {
            Biome::Tundra => self.snow,
            Biome::Temperate | Biome::Jungle => self.grass,
            Biome::Desert => self.sand,
        }
    }

    fn trunk_for(&self, biome: Biome) -> BlockId {
        match biome {
            Biome::Jungle => self.jungle_tree_trunk,
            _ => self.tree_trunk,
        }
    }

    fn leaves_for(&self, biome: Biome) -> BlockId {
        match biome {
            Biome::Jungle => self.jungle_leaves,
            _ => self.leaves,
        }
    }
}

/// Per-column survey result from the first pipeline stage.
#[derive(Clone, Copy)]
struct Column {
    biome: Biome,
    height: i32,
}

/// Deterministic chunk generator.
///
/// Holds an immutable parameter snapshot, a resolved block palette, and the
/// pre-seeded noise fields. One generator serves every chunk of a world; the
/// world position of the chunk is the only per-call variation, so two
/// generators built from equal parameters produce bit-identical grids.
pub struct ChunkGenerator {
    params: GenParams,
    palette: Palette,
    resources: Vec<(BlockId, ResourceDef)>,
    terrain_noise: Simplex,
    biome_noise: Simplex,
    resource_noise: Simplex,
    cloud_noise: Simplex,
}

impl ChunkGenerator {
    /// Builds a generator from a parameter snapshot and a block registry.
    ///
    /// Resources are taken in registry registration order, which fixes their
    /// priority: the first resource whose noise clears its scarcity threshold
    /// at a voxel wins.
    pub fn new(params: GenParams, registry: &BlockRegistry) -> Result<Self, GenError> {
        let palette = Palette::resolve(registry)?;
        let resources = registry.resources().map(|(id, def)| (id, *def)).collect();
        let seed = params.seed;
        Ok(Self {
            params,
            palette,
            resources,
            terrain_noise: Simplex::new(seed as u32),
            biome_noise: Simplex::new(seed.wrapping_add(BIOME_SEED_OFFSET) as u32),
            resource_noise: Simplex::new(seed.wrapping_add(RESOURCE_SEED_OFFSET) as u32),
            cloud_noise: Simplex::new(seed.wrapping_add(CLOUD_SEED_OFFSET) as u32),
        })
    }

    /// The parameter snapshot this generator was built from.
    pub fn params(&self) -> &GenParams {
        &self.params
    }

    /// Generates the full voxel grid for the chunk at grid coordinates
    /// `(chunk_x, chunk_z)`, replaying any persisted edits on top.
    pub fn generate(
        &self,
        chunk_x: i32,
        chunk_z: i32,
        size: ChunkSize,
        edits: &EditStore,
    ) -> Chunk {
        let mut chunk = Chunk::empty(size);
        let mut rng = GenRng::new(self.params.seed);

        let columns = self.survey_columns(chunk_x, chunk_z, size);
        self.fill_terrain(&mut chunk, chunk_x, chunk_z, &columns);
        self.place_trees(&mut chunk, &columns, &mut rng);
        self.place_clouds(&mut chunk, chunk_x, chunk_z);
        apply_edits(&mut chunk, chunk_x, chunk_z, edits);

        debug!(chunk_x, chunk_z, "generated chunk");
        chunk
    }

    // ---- pipeline stages ----

    /// Samples biome and terrain height for every planar column.
    fn survey_columns(&self, chunk_x: i32, chunk_z: i32, size: ChunkSize) -> Vec<Column> {
        let width = size.width as i32;
        let max_y = size.height as i32 - 1;
        let terrain = &self.params.terrain;
        let biomes = &self.params.biomes;

        let mut columns = Vec::with_capacity((width * width) as usize);
        for x in 0..width {
            for z in 0..width {
                let wx = (chunk_x * width + x) as f64;
                let wz = (chunk_z * width + z) as f64;

                let base = 0.5
                    * (self
                        .biome_noise
                        .get([wx / biomes.scale, wz / biomes.scale])
                        + 1.0);
                let variation = biomes.variation_amplitude
                    * self
                        .biome_noise
                        .get([wx / biomes.variation_scale, wz / biomes.variation_scale]);
                let biome = Biome::classify(base + variation, biomes);

                let value = self
                    .terrain_noise
                    .get([wx / terrain.scale, wz / terrain.scale]);
                let height = (terrain.offset + terrain.magnitude * value).floor() as i32;
                let height = height.clamp(0, max_y);

                columns.push(Column { biome, height });
            }
        }
        columns
    }

    /// Fills each column up to its surveyed height. The surface block is
    /// biome-dependent (sand near the water level); interior blocks are dirt
    /// unless a resource vein claims them.
    fn fill_terrain(&self, chunk: &mut Chunk, chunk_x: i32, chunk_z: i32, columns: &[Column]) {
        let width = chunk.size().width as i32;
        let water_level = self.params.terrain.water_level;

        for x in 0..width {
            for z in 0..width {
                let column = columns[(x * width + z) as usize];
                for y in 0..=column.height {
                    if y == column.height {
                        let surface = if column.height <= water_level {
                            self.palette.sand
                        } else {
                            self.palette.surface_for(column.biome)
                        };
                        chunk.set_id(x, y, z, surface);
                    } else {
                        let wx = (chunk_x * width + x) as f64;
                        let wz = (chunk_z * width + z) as f64;
                        let id = self
                            .sample_resource(wx, y as f64, wz)
                            .unwrap_or(self.palette.dirt);
                        chunk.set_id(x, y, z, id);
                    }
                }
            }
        }
    }

    /// Tests the resource veins at a sub-surface voxel. Resources are checked
    /// in priority order and the first whose noise exceeds its scarcity
    /// threshold wins.
    fn sample_resource(&self, wx: f64, wy: f64, wz: f64) -> Option<BlockId> {
        for (id, def) in &self.resources {
            let value = self.resource_noise.get([
                wx / def.scale[0],
                wy / def.scale[1],
                wz / def.scale[2],
            ]);
            if value > def.scarcity {
                return Some(*id);
            }
        }
        None
    }

    /// Grows trees on eligible surface blocks. A column is eligible when its
    /// biome grows trees and its surface block is grass or snow (the water
    /// level may have turned it to sand). RNG draws happen only for eligible
    /// columns, in column order, so the sequence is reproducible.
    fn place_trees(&self, chunk: &mut Chunk, columns: &[Column], rng: &mut GenRng) {
        let width = chunk.size().width as i32;
        let trees = &self.params.trees;

        for x in 0..width {
            for z in 0..width {
                let column = columns[(x * width + z) as usize];
                if !column.biome.grows_trees() {
                    continue;
                }
                let surface = chunk.id_at(x, column.height, z);
                if surface != self.palette.grass && surface != self.palette.snow {
                    continue;
                }
                if rng.next() >= trees.frequency {
                    continue;
                }

                let trunk_height = rng.next_range(trees.trunk_min_height, trees.trunk_max_height);
                let trunk = self.palette.trunk_for(column.biome);
                for dy in 1..=trunk_height {
                    chunk.set_id(x, column.height + dy, z, trunk);
                }

                let radius = rng.next_range(trees.canopy_min_radius, trees.canopy_max_radius);
                let leaves = self.palette.leaves_for(column.biome);
                let top = column.height + trunk_height;
                for dx in -radius..=radius {
                    for dy in -radius..=radius {
                        for dz in -radius..=radius {
                            if dx * dx + dy * dy + dz * dz > radius * radius {
                                continue;
                            }
                            if rng.next() >= trees.canopy_density {
                                continue;
                            }
                            let (cx, cy, cz) = (x + dx, top + dy, z + dz);
                            // Leaves never overwrite existing matter.
                            if chunk.id_at(cx, cy, cz).is_empty() {
                                chunk.set_id(cx, cy, cz, leaves);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Writes cloud blocks into the top horizontal slice wherever the cloud
    /// noise falls below the density threshold.
    fn place_clouds(&self, chunk: &mut Chunk, chunk_x: i32, chunk_z: i32) {
        let width = chunk.size().width as i32;
        let top = chunk.size().height as i32 - 1;
        let clouds = &self.params.clouds;

        for x in 0..width {
            for z in 0..width {
                let wx = (chunk_x * width + x) as f64;
                let wz = (chunk_z * width + z) as f64;
                let value =
                    0.5 * (self.cloud_noise.get([wx / clouds.scale, wz / clouds.scale]) + 1.0);
                if value < clouds.density {
                    chunk.set_id(x, top, z, self.palette.cloud);
                }
            }
        }
    }
}

/// Replays persisted edits over a freshly generated grid. Edits always win
/// over procedural output, including edits that carve a voxel back to empty.
fn apply_edits(chunk: &mut Chunk, chunk_x: i32, chunk_z: i32, edits: &EditStore) {
    for (key, id) in edits.edits_for_chunk(chunk_x, chunk_z) {
        chunk.set_id(key.x, key.y, key.z, id);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
