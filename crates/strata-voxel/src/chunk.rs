//! Dense voxel storage for a fixed `(width, height, width)` chunk volume.
//!
//! Voxels live in a flat `Vec` with a computed linear index (x fastest, then
//! y, then z) for cache locality. Out-of-bounds reads return `None` and
//! out-of-bounds writes are silently dropped: generation and collision
//! routinely probe boundary-adjacent cells, so the boundary is "empty", not
//! an error.

use crate::block::BlockId;

/// Fixed dimensions of a chunk: `width × height × width` voxels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkSize {
    /// Horizontal extent in both x and z.
    pub width: u32,
    /// Vertical extent.
    pub height: u32,
}

impl ChunkSize {
    /// Creates a new chunk size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of voxels in the volume.
    pub fn volume(self) -> usize {
        self.width as usize * self.height as usize * self.width as usize
    }
}

/// A single voxel cell: block type plus the render-instance back-reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Voxel {
    /// The block type occupying this cell. [`BlockId::EMPTY`] means air.
    pub id: BlockId,
    /// Slot into the owning chunk's per-type instance buffer, or `None` when
    /// the voxel is empty or fully occluded (not rendered).
    pub instance_slot: Option<u32>,
}

impl Voxel {
    /// An empty, unrendered voxel.
    pub const EMPTY: Voxel = Voxel {
        id: BlockId::EMPTY,
        instance_slot: None,
    };
}

/// Dense voxel grid for one chunk.
///
/// Dimensions never change after construction.
pub struct Chunk {
    size: ChunkSize,
    data: Vec<Voxel>,
}

impl Chunk {
    /// Creates a chunk with every voxel set to empty.
    pub fn empty(size: ChunkSize) -> Self {
        Self {
            size,
            data: vec![Voxel::EMPTY; size.volume()],
        }
    }

    /// Returns the fixed dimensions of this chunk.
    pub fn size(&self) -> ChunkSize {
        self.size
    }

    /// Returns `true` if `(x, y, z)` lies inside the chunk volume.
    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        let w = self.size.width as i32;
        let h = self.size.height as i32;
        (0..w).contains(&x) && (0..h).contains(&y) && (0..w).contains(&z)
    }

    /// Returns the voxel at `(x, y, z)`, or `None` out of bounds.
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<&Voxel> {
        if self.in_bounds(x, y, z) {
            Some(&self.data[self.linear_index(x, y, z)])
        } else {
            None
        }
    }

    /// Returns the block type at `(x, y, z)`, treating out-of-bounds as empty.
    pub fn id_at(&self, x: i32, y: i32, z: i32) -> BlockId {
        self.get(x, y, z).map(|v| v.id).unwrap_or(BlockId::EMPTY)
    }

    /// Sets the block type at `(x, y, z)`. Out-of-bounds writes are dropped.
    pub fn set_id(&mut self, x: i32, y: i32, z: i32, id: BlockId) {
        if self.in_bounds(x, y, z) {
            let idx = self.linear_index(x, y, z);
            self.data[idx].id = id;
        }
    }

    /// Records the render-instance slot for the voxel at `(x, y, z)`.
    /// Out-of-bounds writes are dropped.
    pub fn set_instance_slot(&mut self, x: i32, y: i32, z: i32, slot: Option<u32>) {
        if self.in_bounds(x, y, z) {
            let idx = self.linear_index(x, y, z);
            self.data[idx].instance_slot = slot;
        }
    }

    /// Returns `true` if the voxel at `(x, y, z)` is completely hidden by its
    /// six face-adjacent neighbors.
    ///
    /// Neighbors outside the chunk count as empty, so boundary voxels are
    /// never obscured.
    pub fn is_obscured(&self, x: i32, y: i32, z: i32) -> bool {
        const FACES: [(i32, i32, i32); 6] = [
            (0, 1, 0),
            (0, -1, 0),
            (1, 0, 0),
            (-1, 0, 0),
            (0, 0, 1),
            (0, 0, -1),
        ];
        FACES
            .iter()
            .all(|&(dx, dy, dz)| !self.id_at(x + dx, y + dy, z + dz).is_empty())
    }

    /// Converts a linear index back to `(x, y, z)` coordinates.
    pub fn delinearize(&self, index: usize) -> (i32, i32, i32) {
        let w = self.size.width as usize;
        let h = self.size.height as usize;
        let x = index % w;
        let y = (index / w) % h;
        let z = index / (w * h);
        (x as i32, y as i32, z as i32)
    }

    /// Converts `(x, y, z)` to the flat array index (x varies fastest).
    ///
    /// Callers must have bounds-checked the coordinates.
    pub fn linear_index(&self, x: i32, y: i32, z: i32) -> usize {
        debug_assert!(self.in_bounds(x, y, z));
        let w = self.size.width as usize;
        let h = self.size.height as usize;
        x as usize + w * (y as usize + h * z as usize)
    }

    /// Direct voxel access by linear index, used by the instance index to
    /// follow slot back-references.
    pub fn voxel_at_index(&self, index: usize) -> &Voxel {
        &self.data[index]
    }

    /// Direct mutable voxel access by linear index.
    pub fn voxel_at_index_mut(&mut self, index: usize) -> &mut Voxel {
        &mut self.data[index]
    }

    /// Iterates over all `(x, y, z, voxel)` tuples in linear order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, i32, &Voxel)> {
        self.data.iter().enumerate().map(|(i, voxel)| {
            let (x, y, z) = self.delinearize(i);
            (x, y, z, voxel)
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Chunk {
        Chunk::empty(ChunkSize::new(4, 8))
    }

    #[test]
    fn test_new_chunk_is_all_empty() {
        let chunk = small();
        for (_, _, _, voxel) in chunk.iter() {
            assert_eq!(*voxel, Voxel::EMPTY);
        }
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let mut chunk = small();
        chunk.set_id(1, 2, 3, BlockId(5));
        assert_eq!(chunk.id_at(1, 2, 3), BlockId(5));
        assert_eq!(chunk.get(1, 2, 3).unwrap().instance_slot, None);
    }

    #[test]
    fn test_out_of_bounds_get_returns_none() {
        let chunk = small();
        assert!(chunk.get(-1, 0, 0).is_none());
        assert!(chunk.get(0, 8, 0).is_none());
        assert!(chunk.get(0, 0, 4).is_none());
        assert_eq!(chunk.id_at(99, 99, 99), BlockId::EMPTY);
    }

    #[test]
    fn test_out_of_bounds_set_is_dropped() {
        let mut chunk = small();
        chunk.set_id(-1, 0, 0, BlockId(3));
        chunk.set_id(4, 0, 0, BlockId(3));
        for (_, _, _, voxel) in chunk.iter() {
            assert!(voxel.id.is_empty());
        }
    }

    #[test]
    fn test_linear_index_delinearize_inverse() {
        let chunk = small();
        for z in 0..4 {
            for y in 0..8 {
                for x in 0..4 {
                    let idx = chunk.linear_index(x, y, z);
                    assert_eq!(chunk.delinearize(idx), (x, y, z));
                }
            }
        }
    }

    #[test]
    fn test_interior_voxel_obscured_when_surrounded() {
        let mut chunk = small();
        for (dx, dy, dz) in [
            (0, 1, 0),
            (0, -1, 0),
            (1, 0, 0),
            (-1, 0, 0),
            (0, 0, 1),
            (0, 0, -1),
        ] {
            chunk.set_id(1 + dx, 1 + dy, 1 + dz, BlockId(1));
        }
        chunk.set_id(1, 1, 1, BlockId(1));
        assert!(chunk.is_obscured(1, 1, 1));

        // Opening one face exposes it again.
        chunk.set_id(1, 2, 1, BlockId::EMPTY);
        assert!(!chunk.is_obscured(1, 1, 1));
    }

    #[test]
    fn test_boundary_voxel_never_obscured() {
        let mut chunk = small();
        for z in 0..4 {
            for y in 0..8 {
                for x in 0..4 {
                    chunk.set_id(x, y, z, BlockId(1));
                }
            }
        }
        // Corner voxel touches three out-of-bounds (empty) neighbors.
        assert!(!chunk.is_obscured(0, 0, 0));
        // Dead center of a filled chunk is obscured.
        assert!(chunk.is_obscured(2, 4, 2));
    }
}
