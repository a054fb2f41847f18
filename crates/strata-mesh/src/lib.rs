//! Instanced render representation of a chunk's voxel grid.
//!
//! One growable transform buffer per block type plus an active count; the
//! render consumer draws exactly the active instances. Single-voxel add and
//! remove are O(1) thanks to swap-remove compaction, so edits never trigger a
//! full chunk rebuild.

mod buffer;
mod index;

pub use buffer::InstanceBuffer;
pub use index::ChunkInstances;
