//! World-to-chunk coordinate mapping.

use serde::{Deserialize, Serialize};

/// Integer chunk-grid coordinates. Chunks are not partitioned vertically, so
/// only the horizontal axes appear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chebyshev distance to another chunk coordinate; a chunk is inside a
    /// window of draw distance `d` iff this distance to the center is `<= d`.
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

/// Splits world block coordinates into the owning chunk coordinate and the
/// local coordinate within it.
///
/// Uses floored division so negative world coordinates land in the correct
/// chunk. Exact left-inverse of reconstruction: for any input,
/// `chunk * width + local` yields the original world coordinate (y is passed
/// through unchanged).
pub fn world_to_chunk_coords(x: i32, y: i32, z: i32, width: u32) -> (ChunkCoord, (i32, i32, i32)) {
    let w = width as i32;
    let chunk = ChunkCoord::new(x.div_euclid(w), z.div_euclid(w));
    let local = (x.rem_euclid(w), y, z.rem_euclid(w));
    (chunk, local)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
