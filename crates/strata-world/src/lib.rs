//! World management: a dynamic window of chunks streamed around the avatar,
//! world-to-chunk coordinate mapping, single-block edit routing with neighbor
//! occlusion repair, and durable save/load of parameters plus edits.

mod chunk;
mod coords;
mod save;
mod world;

pub use chunk::WorldChunk;
pub use coords::{ChunkCoord, world_to_chunk_coords};
pub use save::{BlobStore, FileBlobStore, MemoryBlobStore, SaveError};
pub use world::{World, WorldParams};
