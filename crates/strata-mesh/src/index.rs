//! Per-chunk instance index: one buffer per block type, kept consistent with
//! the voxel grid's slot back-references through every mutation.

use glam::Vec3;
use rustc_hash::FxHashMap;

use strata_voxel::{BlockId, Chunk};

use crate::buffer::InstanceBuffer;

/// The instanced-geometry buckets of one chunk.
///
/// Invariant (visible surface): an instance exists for a voxel iff the voxel
/// is non-empty and at least one of its six face neighbors is empty or
/// outside the chunk. [`rebuild`] establishes the invariant from scratch;
/// [`reveal`] and [`hide`] maintain it incrementally as edits change which
/// voxels are occluded.
///
/// [`rebuild`]: ChunkInstances::rebuild
/// [`reveal`]: ChunkInstances::reveal
/// [`hide`]: ChunkInstances::hide
#[derive(Clone, Debug, Default)]
pub struct ChunkInstances {
    buckets: FxHashMap<BlockId, InstanceBuffer>,
}

impl ChunkInstances {
    /// Creates an index with no buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds every bucket from the voxel grid, discarding prior contents.
    ///
    /// Writes the assigned slot back onto each rendered voxel; occluded and
    /// empty voxels get no slot.
    pub fn rebuild(&mut self, chunk: &mut Chunk) {
        self.buckets.clear();

        let size = chunk.size();
        for index in 0..size.volume() {
            let (x, y, z) = chunk.delinearize(index);
            let id = chunk.voxel_at_index(index).id;
            if id.is_empty() || chunk.is_obscured(x, y, z) {
                chunk.voxel_at_index_mut(index).instance_slot = None;
                continue;
            }
            let slot = self
                .buckets
                .entry(id)
                .or_default()
                .push(Vec3::new(x as f32, y as f32, z as f32), index);
            chunk.voxel_at_index_mut(index).instance_slot = Some(slot);
        }
    }

    /// Allocates an instance for the voxel at `(x, y, z)` if it is solid and
    /// currently unrendered. No-op otherwise.
    pub fn reveal(&mut self, chunk: &mut Chunk, x: i32, y: i32, z: i32) {
        let Some(voxel) = chunk.get(x, y, z) else {
            return;
        };
        if voxel.id.is_empty() || voxel.instance_slot.is_some() {
            return;
        }
        let id = voxel.id;
        let index = chunk.linear_index(x, y, z);
        let slot = self
            .buckets
            .entry(id)
            .or_default()
            .push(Vec3::new(x as f32, y as f32, z as f32), index);
        chunk.voxel_at_index_mut(index).instance_slot = Some(slot);
    }

    /// Deallocates the instance of the voxel at `(x, y, z)` if it has one,
    /// keeping the bucket contiguous via swap-remove. No-op otherwise.
    pub fn hide(&mut self, chunk: &mut Chunk, x: i32, y: i32, z: i32) {
        let Some(voxel) = chunk.get(x, y, z) else {
            return;
        };
        let (id, Some(slot)) = (voxel.id, voxel.instance_slot) else {
            return;
        };

        let Some(bucket) = self.buckets.get_mut(&id) else {
            return;
        };
        if let Some(moved_owner) = bucket.swap_remove(slot) {
            // The last instance now lives in the freed slot; repoint its voxel.
            chunk.voxel_at_index_mut(moved_owner).instance_slot = Some(slot);
        }

        let index = chunk.linear_index(x, y, z);
        chunk.voxel_at_index_mut(index).instance_slot = None;
    }

    /// The buffer for one block type, if any instances of it are active.
    pub fn bucket(&self, id: BlockId) -> Option<&InstanceBuffer> {
        self.buckets.get(&id)
    }

    /// Iterates over `(block type, buffer)` pairs with at least one instance.
    pub fn iter_buckets(&self) -> impl Iterator<Item = (BlockId, &InstanceBuffer)> {
        self.buckets
            .iter()
            .filter(|(_, buffer)| !buffer.is_empty())
            .map(|(id, buffer)| (*id, buffer))
    }

    /// Total number of active instances across all buckets.
    pub fn total_instances(&self) -> usize {
        self.buckets.values().map(InstanceBuffer::len).sum()
    }

    /// Drops every bucket, freeing the instance storage.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
