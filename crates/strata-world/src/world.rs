//! The world manager: chunk streaming, block queries, and edit routing.

use std::collections::VecDeque;

use glam::Vec3;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use strata_terrain::{ChunkGenerator, GenError, GenParams};
use strata_voxel::{BlockId, BlockRegistry, ChunkSize, EditKey, EditStore};

use crate::chunk::WorldChunk;
use crate::coords::{ChunkCoord, world_to_chunk_coords};
use crate::save::{BlobStore, EDITS_KEY, PARAMS_KEY, SaveError};

const FACES: [(i32, i32, i32); 6] = [
    (0, 1, 0),
    (0, -1, 0),
    (1, 0, 0),
    (-1, 0, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// World manager configuration.
#[derive(Clone, Debug)]
pub struct WorldParams {
    /// Dimensions of every chunk.
    pub chunk_size: ChunkSize,
    /// Chebyshev radius of the visible window, in chunks. The window holds
    /// `(2 * draw_distance + 1)^2` chunks.
    pub draw_distance: i32,
    /// When true, chunk generation is deferred and spread across updates;
    /// when false, chunks generate synchronously as they enter the window.
    pub async_generation: bool,
    /// Maximum deferred generations executed per update.
    pub generation_budget: usize,
    /// Terrain generation parameters.
    pub gen_params: GenParams,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            chunk_size: ChunkSize::new(32, 32),
            draw_distance: 2,
            async_generation: true,
            generation_budget: 1,
            gen_params: GenParams::default(),
        }
    }
}

/// A streamable, mutable voxel world.
///
/// Owns the loaded chunk window, the single shared edit store, and the
/// generator built from the current parameter snapshot. All mutation happens
/// from the single simulation thread.
pub struct World {
    params: WorldParams,
    registry: BlockRegistry,
    generator: ChunkGenerator,
    edits: EditStore,
    chunks: FxHashMap<ChunkCoord, WorldChunk>,
    /// Deferred generation queue, in scheduling order.
    pending: VecDeque<ChunkCoord>,
    center: ChunkCoord,
}

impl World {
    /// Creates an empty world. No chunks exist until the first [`update`].
    ///
    /// [`update`]: World::update
    pub fn new(params: WorldParams, registry: BlockRegistry) -> Result<Self, GenError> {
        let generator = ChunkGenerator::new(params.gen_params.clone(), &registry)?;
        Ok(Self {
            params,
            registry,
            generator,
            edits: EditStore::new(),
            chunks: FxHashMap::default(),
            pending: VecDeque::new(),
            center: ChunkCoord::new(0, 0),
        })
    }

    fn width(&self) -> u32 {
        self.params.chunk_size.width
    }

    // ---- streaming ----

    /// Re-centers the visible window on the avatar, disposing chunks that
    /// left it and scheduling generation for chunks that entered it.
    pub fn update(&mut self, avatar: Vec3) {
        let (center, _) = world_to_chunk_coords(
            avatar.x.floor() as i32,
            0,
            avatar.z.floor() as i32,
            self.width(),
        );
        self.center = center;
        let dd = self.params.draw_distance;

        let before = self.chunks.len();
        self.chunks.retain(|coord, _| coord.chebyshev(center) <= dd);
        let dropped = before - self.chunks.len();
        if dropped > 0 {
            debug!(dropped, ?center, "unloaded chunks leaving the window");
        }
        // Cancel deferred generation for chunks that left the window.
        self.pending.retain(|coord| coord.chebyshev(center) <= dd);

        for dx in -dd..=dd {
            for dz in -dd..=dd {
                let coord = ChunkCoord::new(center.x + dx, center.z + dz);
                if self.chunks.contains_key(&coord) {
                    continue;
                }
                self.chunks
                    .insert(coord, WorldChunk::unloaded(coord, self.params.chunk_size));
                if self.params.async_generation {
                    self.pending.push_back(coord);
                } else {
                    self.generate_scheduled(coord);
                }
            }
        }

        if self.params.async_generation {
            for _ in 0..self.params.generation_budget {
                let Some(coord) = self.pending.pop_front() else {
                    break;
                };
                self.generate_scheduled(coord);
            }
        }
    }

    /// Executes one scheduled generation. A request whose chunk has left the
    /// window, or already finished, is stale and skipped.
    fn generate_scheduled(&mut self, coord: ChunkCoord) {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        if chunk.is_loaded() {
            return;
        }
        chunk.generate(&self.generator, &self.edits);
    }

    /// Drops every chunk so the next [`update`] regenerates the window from
    /// the current parameters and edit store.
    ///
    /// [`update`]: World::update
    pub fn regenerate(&mut self) {
        self.chunks.clear();
        self.pending.clear();
    }

    /// Replaces the generation parameters and schedules a full regeneration.
    pub fn set_gen_params(&mut self, gen_params: GenParams) -> Result<(), GenError> {
        self.generator = ChunkGenerator::new(gen_params.clone(), &self.registry)?;
        self.params.gen_params = gen_params;
        self.regenerate();
        Ok(())
    }

    // ---- queries ----

    /// Returns the block type at world coordinates, or `None` when the owning
    /// chunk is absent, has not finished generating, or the coordinate lies
    /// above or below the chunk volume.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<BlockId> {
        let (coord, (lx, ly, lz)) = world_to_chunk_coords(x, y, z, self.width());
        let chunk = self.chunks.get(&coord)?;
        if !chunk.is_loaded() {
            return None;
        }
        chunk.data().get(lx, ly, lz).map(|voxel| voxel.id)
    }

    /// Returns `true` if the block at world coordinates collides with
    /// avatars. Unloaded or absent chunks report `false`.
    pub fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        match self.get_block(x, y, z) {
            Some(id) if !id.is_empty() => self.registry.get(id).solid,
            _ => false,
        }
    }

    /// The chunk at a grid coordinate, if present in the window.
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&WorldChunk> {
        self.chunks.get(&coord)
    }

    /// Iterates over every chunk in the window, loaded or not.
    pub fn chunks(&self) -> impl Iterator<Item = &WorldChunk> {
        self.chunks.values()
    }

    /// Number of chunks whose generation has completed.
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.values().filter(|c| c.is_loaded()).count()
    }

    /// Number of deferred generation requests not yet executed.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The shared edit store.
    pub fn edits(&self) -> &EditStore {
        &self.edits
    }

    /// The block catalog.
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    /// The current configuration.
    pub fn params(&self) -> &WorldParams {
        &self.params
    }

    // ---- edits ----

    /// Places a block at world coordinates.
    ///
    /// Silently ignored when the block type is not in the registry, the
    /// owning chunk is unavailable, or the target voxel is already solid;
    /// rapid input can race with streaming, so an invalid edit is not an
    /// error.
    pub fn add_block(&mut self, x: i32, y: i32, z: i32, id: BlockId) {
        if id.is_empty() || id.0 as usize >= self.registry.len() {
            return;
        }
        let (coord, (lx, ly, lz)) = world_to_chunk_coords(x, y, z, self.width());
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        if !chunk.is_loaded() {
            return;
        }
        let (data, instances) = chunk.data_and_instances_mut();
        if !data.in_bounds(lx, ly, lz) || !data.id_at(lx, ly, lz).is_empty() {
            return;
        }
        data.set_id(lx, ly, lz, id);
        // A placement enclosed on all six faces is not part of the visible
        // surface; neighbor repair handles the exposed case.
        if !data.is_obscured(lx, ly, lz) {
            instances.reveal(data, lx, ly, lz);
        }

        self.edits.set(
            EditKey {
                chunk_x: coord.x,
                chunk_z: coord.z,
                x: lx,
                y: ly,
                z: lz,
            },
            id,
        );
        self.repair_neighbors(x, y, z);
    }

    /// Removes the block at world coordinates.
    ///
    /// Silently ignored when the owning chunk is unavailable or the target
    /// voxel is already empty.
    pub fn remove_block(&mut self, x: i32, y: i32, z: i32) {
        let (coord, (lx, ly, lz)) = world_to_chunk_coords(x, y, z, self.width());
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        if !chunk.is_loaded() {
            return;
        }
        let (data, instances) = chunk.data_and_instances_mut();
        if data.id_at(lx, ly, lz).is_empty() {
            return;
        }
        instances.hide(data, lx, ly, lz);
        data.set_id(lx, ly, lz, BlockId::EMPTY);

        // Removal persists as an explicit empty override.
        self.edits.set(
            EditKey {
                chunk_x: coord.x,
                chunk_z: coord.z,
                x: lx,
                y: ly,
                z: lz,
            },
            BlockId::EMPTY,
        );
        self.repair_neighbors(x, y, z);
    }

    /// Re-evaluates occlusion for the six face neighbors of an edited voxel,
    /// revealing newly exposed ones and hiding newly occluded ones. This is
    /// the only mechanism keeping the visible-surface invariant true across
    /// edits.
    fn repair_neighbors(&mut self, x: i32, y: i32, z: i32) {
        for (dx, dy, dz) in FACES {
            self.repair_voxel(x + dx, y + dy, z + dz);
        }
    }

    fn repair_voxel(&mut self, x: i32, y: i32, z: i32) {
        let (coord, (lx, ly, lz)) = world_to_chunk_coords(x, y, z, self.width());
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return;
        };
        if !chunk.is_loaded() {
            return;
        }
        let (data, instances) = chunk.data_and_instances_mut();
        if data.id_at(lx, ly, lz).is_empty() {
            return;
        }
        if data.is_obscured(lx, ly, lz) {
            instances.hide(data, lx, ly, lz);
        } else {
            instances.reveal(data, lx, ly, lz);
        }
    }

    // ---- persistence ----

    /// Serializes the generation parameters and the edit store.
    pub fn save(&self, store: &mut dyn BlobStore) -> Result<(), SaveError> {
        let params = serde_json::to_vec_pretty(&self.params.gen_params)?;
        store.put(PARAMS_KEY, &params)?;
        let edits = serde_json::to_vec_pretty(&self.edits.to_entries())?;
        store.put(EDITS_KEY, &edits)?;
        info!(edits = self.edits.len(), "saved world state");
        Ok(())
    }

    /// Restores parameters and edits from durable storage, then schedules a
    /// full regeneration so the edits replay deterministically.
    ///
    /// All-or-nothing: if either blob is missing or unparsable, the error is
    /// returned and in-memory state is left untouched.
    pub fn load(&mut self, store: &dyn BlobStore) -> Result<(), SaveError> {
        let params_bytes = store
            .get(PARAMS_KEY)?
            .ok_or(SaveError::MissingBlob(PARAMS_KEY))?;
        let edits_bytes = store
            .get(EDITS_KEY)?
            .ok_or(SaveError::MissingBlob(EDITS_KEY))?;

        let gen_params: GenParams = serde_json::from_slice(&params_bytes)
            .map_err(|source| SaveError::Corrupt {
                key: PARAMS_KEY,
                source,
            })?;
        let entries: Vec<strata_voxel::EditEntry> = serde_json::from_slice(&edits_bytes)
            .map_err(|source| SaveError::Corrupt {
                key: EDITS_KEY,
                source,
            })?;
        // An edit referencing a block this registry does not know would panic
        // later at query time; reject the save instead.
        if let Some(entry) = entries
            .iter()
            .find(|entry| entry.id.0 as usize >= self.registry.len())
        {
            return Err(SaveError::UnknownBlock(entry.id.0));
        }
        let generator = ChunkGenerator::new(gen_params.clone(), &self.registry)?;

        // Every fallible step succeeded; commit.
        self.generator = generator;
        self.params.gen_params = gen_params;
        self.edits = EditStore::from_entries(entries);
        self.regenerate();
        info!(edits = self.edits.len(), "loaded world state");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::save::MemoryBlobStore;
    use strata_voxel::default_registry;

    /// Flat world: surface grass plane at y = 8, no trees, no clouds.
    fn flat_params(sync: bool) -> WorldParams {
        let mut gen_params = GenParams::default();
        gen_params.terrain.magnitude = 0.0;
        gen_params.terrain.offset = 8.0;
        gen_params.terrain.water_level = 3;
        gen_params.trees.frequency = 0.0;
        gen_params.clouds.density = 0.0;
        WorldParams {
            chunk_size: ChunkSize::new(16, 16),
            draw_distance: 1,
            async_generation: !sync,
            generation_budget: 1,
            gen_params,
        }
    }

    fn flat_world(sync: bool) -> World {
        World::new(flat_params(sync), default_registry()).unwrap()
    }

    #[test]
    fn test_sync_update_fills_the_window() {
        let mut world = flat_world(true);
        world.update(Vec3::ZERO);
        assert_eq!(world.loaded_chunk_count(), 9, "3x3 window at draw distance 1");
    }

    #[test]
    fn test_chunks_leaving_the_window_are_dropped() {
        let mut world = flat_world(true);
        world.update(Vec3::ZERO);
        assert!(world.chunk(ChunkCoord::new(0, 0)).is_some());

        world.update(Vec3::new(1000.0, 0.0, 0.0));
        assert!(
            world.chunk(ChunkCoord::new(0, 0)).is_none(),
            "origin chunk must be disposed after the avatar moves away"
        );
        assert_eq!(world.loaded_chunk_count(), 9);
    }

    #[test]
    fn test_deferred_generation_respects_budget() {
        let mut world = flat_world(false);
        world.update(Vec3::ZERO);
        assert_eq!(world.loaded_chunk_count(), 1, "one generation per update");
        assert_eq!(world.pending_count(), 8);

        for _ in 0..8 {
            world.update(Vec3::ZERO);
        }
        assert_eq!(world.loaded_chunk_count(), 9);
        assert_eq!(world.pending_count(), 0);
    }

    #[test]
    fn test_unloaded_chunk_reports_no_blocks() {
        let mut world = flat_world(false);
        world.update(Vec3::ZERO);
        // Some window chunk is still a placeholder.
        let unloaded = world
            .chunks()
            .find(|c| !c.is_loaded())
            .expect("budget 1 leaves placeholders")
            .coord();
        let wx = unloaded.x * 16;
        let wz = unloaded.z * 16;
        assert_eq!(world.get_block(wx, 8, wz), None);
        assert!(!world.is_solid(wx, 8, wz));
    }

    #[test]
    fn test_moving_away_cancels_stale_generation() {
        let mut world = flat_world(false);
        world.update(Vec3::ZERO);
        assert!(world.pending_count() > 0);

        // No request for the abandoned window survives the move.
        for _ in 0..20 {
            world.update(Vec3::new(10_000.0, 0.0, 0.0));
        }
        assert!(world.chunk(ChunkCoord::new(0, 0)).is_none());
        assert_eq!(world.loaded_chunk_count(), 9);
    }

    #[test]
    fn test_get_block_on_flat_terrain() {
        let mut world = flat_world(true);
        world.update(Vec3::ZERO);
        let grass = world.registry().lookup_by_name("grass").unwrap();

        assert_eq!(world.get_block(3, 8, 3), Some(grass));
        assert_eq!(world.get_block(3, 9, 3), Some(BlockId::EMPTY));
        assert_eq!(world.get_block(3, 200, 3), None, "above the chunk volume");
        assert_eq!(world.get_block(3, -1, 3), None, "below the chunk volume");
        assert!(world.is_solid(3, 8, 3));
        assert!(!world.is_solid(3, 9, 3));
        // Negative coordinates resolve through floored division.
        assert_eq!(world.get_block(-5, 8, -5), Some(grass));
    }

    #[test]
    fn test_add_then_remove_restores_instance_count() {
        let mut world = flat_world(true);
        world.update(Vec3::ZERO);
        let stone = world.registry().lookup_by_name("stone").unwrap();
        let total = |w: &World| -> usize {
            w.chunks().map(|c| c.instances().total_instances()).sum()
        };
        let before = total(&world);

        world.add_block(3, 9, 3, stone);
        assert_eq!(world.get_block(3, 9, 3), Some(stone));
        world.remove_block(3, 9, 3);
        assert_eq!(world.get_block(3, 9, 3), Some(BlockId::EMPTY));
        assert_eq!(
            total(&world),
            before,
            "add followed by remove must leave the instance count unchanged"
        );
    }

    #[test]
    fn test_add_on_solid_voxel_is_a_noop() {
        let mut world = flat_world(true);
        world.update(Vec3::ZERO);
        let stone = world.registry().lookup_by_name("stone").unwrap();
        let grass = world.registry().lookup_by_name("grass").unwrap();

        world.add_block(3, 8, 3, stone);
        assert_eq!(world.get_block(3, 8, 3), Some(grass), "surface must survive");
        assert_eq!(world.edits().len(), 0, "invalid edit must not persist");
    }

    #[test]
    fn test_add_into_enclosed_cavity_stays_hidden() {
        let mut world = flat_world(true);
        world.update(Vec3::ZERO);
        let stone = world.registry().lookup_by_name("stone").unwrap();

        // Carve a one-voxel cavity below the surface, then fill it back in.
        // The refilled voxel is enclosed on all six faces.
        world.remove_block(3, 5, 3);
        world.add_block(3, 5, 3, stone);
        assert_eq!(world.get_block(3, 5, 3), Some(stone));

        let (coord, (lx, ly, lz)) = world_to_chunk_coords(3, 5, 3, 16);
        let voxel = world.chunk(coord).unwrap().data().get(lx, ly, lz).unwrap();
        assert!(
            voxel.instance_slot.is_none(),
            "a fully occluded placement must not be rendered"
        );
    }

    #[test]
    fn test_add_with_unregistered_id_is_a_noop() {
        let mut world = flat_world(true);
        world.update(Vec3::ZERO);

        world.add_block(3, 9, 3, BlockId(9999));
        assert_eq!(world.get_block(3, 9, 3), Some(BlockId::EMPTY));
        assert_eq!(world.edits().len(), 0, "invalid edit must not persist");
    }

    #[test]
    fn test_remove_on_empty_voxel_is_a_noop() {
        let mut world = flat_world(true);
        world.update(Vec3::ZERO);
        world.remove_block(3, 12, 3);
        assert_eq!(world.edits().len(), 0);
    }

    #[test]
    fn test_removal_reveals_the_voxel_below() {
        let mut world = flat_world(true);
        world.update(Vec3::ZERO);

        // The voxel under the surface is fully occluded before the edit.
        let (coord, (lx, ly, lz)) = world_to_chunk_coords(3, 7, 3, 16);
        let buried = world.chunk(coord).unwrap().data().get(lx, ly, lz).unwrap();
        assert!(buried.instance_slot.is_none(), "buried voxel starts hidden");

        world.remove_block(3, 8, 3);
        let revealed = world.chunk(coord).unwrap().data().get(lx, ly, lz).unwrap();
        assert!(
            revealed.instance_slot.is_some(),
            "removing the surface must reveal the voxel below"
        );
    }

    #[test]
    fn test_addition_hides_newly_buried_neighbor() {
        let mut world = flat_world(true);
        world.update(Vec3::ZERO);
        let stone = world.registry().lookup_by_name("stone").unwrap();

        let (coord, (lx, ly, lz)) = world_to_chunk_coords(3, 8, 3, 16);
        let surface = world.chunk(coord).unwrap().data().get(lx, ly, lz).unwrap();
        assert!(surface.instance_slot.is_some(), "surface starts rendered");

        // Capping the column occludes the old surface on every face.
        world.add_block(3, 9, 3, stone);
        let buried = world.chunk(coord).unwrap().data().get(lx, ly, lz).unwrap();
        assert!(
            buried.instance_slot.is_none(),
            "the old surface is now fully enclosed and must be hidden"
        );
    }

    #[test]
    fn test_edit_routing_across_chunk_boundary() {
        let mut world = flat_world(true);
        world.update(Vec3::ZERO);

        // World x = 16 is local x = 0 of chunk (1, 0); its -x neighbor lives
        // in chunk (0, 0). Repair must cross the boundary without panicking.
        world.remove_block(16, 8, 3);
        assert_eq!(world.get_block(16, 8, 3), Some(BlockId::EMPTY));
        assert_eq!(
            world
                .edits()
                .get(EditKey {
                    chunk_x: 1,
                    chunk_z: 0,
                    x: 0,
                    y: 8,
                    z: 3,
                }),
            Some(BlockId::EMPTY)
        );
    }

    #[test]
    fn test_save_then_load_reproduces_the_grid() {
        let mut world = flat_world(true);
        world.update(Vec3::ZERO);
        let stone = world.registry().lookup_by_name("stone").unwrap();
        world.add_block(2, 9, 2, stone);
        world.remove_block(5, 8, 5);

        let mut store = MemoryBlobStore::new();
        world.save(&mut store).unwrap();

        let mut restored = flat_world(true);
        restored.load(&store).unwrap();
        restored.update(Vec3::ZERO);

        for chunk in world.chunks() {
            let other = restored.chunk(chunk.coord()).expect("same window");
            for ((x, y, z, va), (_, _, _, vb)) in chunk.data().iter().zip(other.data().iter()) {
                assert_eq!(
                    va.id, vb.id,
                    "restored grid diverged at chunk {:?} voxel ({x}, {y}, {z})",
                    chunk.coord()
                );
            }
        }
    }

    #[test]
    fn test_load_with_missing_blob_fails_and_preserves_state() {
        let mut world = flat_world(true);
        world.update(Vec3::ZERO);
        let loaded_before = world.loaded_chunk_count();

        let store = MemoryBlobStore::new();
        let result = world.load(&store);
        assert!(matches!(result, Err(SaveError::MissingBlob(_))));
        assert_eq!(world.loaded_chunk_count(), loaded_before, "state untouched");
    }

    #[test]
    fn test_load_with_corrupt_blob_fails() {
        let mut world = flat_world(true);
        let mut store = MemoryBlobStore::new();
        store.put(PARAMS_KEY, b"not json").unwrap();
        store.put(EDITS_KEY, b"[]").unwrap();
        assert!(matches!(
            world.load(&store),
            Err(SaveError::Corrupt { key: PARAMS_KEY, .. })
        ));
    }

    #[test]
    fn test_load_rejects_edits_with_unknown_block_id() {
        let mut world = flat_world(true);
        world.update(Vec3::ZERO);
        let mut store = MemoryBlobStore::new();
        world.save(&mut store).unwrap();

        // An edit list from a newer catalog version may reference ids this
        // registry has never heard of; it must be rejected, not deferred to a
        // panic at query time.
        store
            .put(
                EDITS_KEY,
                br#"[{"key":{"chunk_x":0,"chunk_z":0,"x":3,"y":12,"z":3},"id":9999}]"#,
            )
            .unwrap();

        let result = world.load(&store);
        assert!(matches!(result, Err(SaveError::UnknownBlock(9999))));
        // The rejected load leaves the world untouched and queryable.
        assert!(!world.is_solid(3, 12, 3));
        assert_eq!(world.get_block(3, 12, 3), Some(BlockId::EMPTY));
    }

    #[test]
    fn test_set_gen_params_regenerates() {
        let mut world = flat_world(true);
        world.update(Vec3::ZERO);
        let grass = world.registry().lookup_by_name("grass").unwrap();
        let sand = world.registry().lookup_by_name("sand").unwrap();
        assert_eq!(world.get_block(3, 8, 3), Some(grass));

        // Dropping the surface to the water level turns it to sand.
        let mut gen_params = world.params().gen_params.clone();
        gen_params.terrain.offset = 3.0;
        world.set_gen_params(gen_params).unwrap();
        assert_eq!(world.get_block(3, 8, 3), None, "window cleared");

        world.update(Vec3::ZERO);
        assert_eq!(world.get_block(3, 3, 3), Some(sand));
    }
}
