//! One streamed chunk: voxel grid plus instance index plus lifecycle state.

use strata_mesh::ChunkInstances;
use strata_terrain::ChunkGenerator;
use strata_voxel::{Chunk, ChunkSize, EditStore};

use crate::coords::ChunkCoord;

/// A chunk as the world manager holds it.
///
/// `loaded` starts false and flips to true exactly once, after generation and
/// the initial instance build both complete. Until then block queries against
/// this chunk report "not available" rather than partial data.
pub struct WorldChunk {
    coord: ChunkCoord,
    data: Chunk,
    instances: ChunkInstances,
    loaded: bool,
}

impl WorldChunk {
    /// Creates an unloaded placeholder for the given grid coordinate.
    pub fn unloaded(coord: ChunkCoord, size: ChunkSize) -> Self {
        Self {
            coord,
            data: Chunk::empty(size),
            instances: ChunkInstances::new(),
            loaded: false,
        }
    }

    /// Runs generation plus the initial instance build, then marks the chunk
    /// loaded.
    pub fn generate(&mut self, generator: &ChunkGenerator, edits: &EditStore) {
        self.data = generator.generate(self.coord.x, self.coord.z, self.data.size(), edits);
        self.instances.rebuild(&mut self.data);
        self.loaded = true;
    }

    /// This chunk's grid coordinate.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Whether generation has completed.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The voxel grid. Callers must check [`is_loaded`] before treating its
    /// contents as authoritative.
    ///
    /// [`is_loaded`]: WorldChunk::is_loaded
    pub fn data(&self) -> &Chunk {
        &self.data
    }

    /// The instance index for render consumption.
    pub fn instances(&self) -> &ChunkInstances {
        &self.instances
    }

    /// Splits borrows for edit routines that mutate grid and index together.
    pub(crate) fn data_and_instances_mut(&mut self) -> (&mut Chunk, &mut ChunkInstances) {
        (&mut self.data, &mut self.instances)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
