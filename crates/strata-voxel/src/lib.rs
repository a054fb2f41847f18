//! Voxel data model: block catalog, dense chunk storage, and the sparse edit store.

pub mod block;
pub mod chunk;
pub mod edits;

pub use block::{BlockDef, BlockId, BlockRegistry, RegistryError, ResourceDef, default_registry};
pub use chunk::{Chunk, ChunkSize, Voxel};
pub use edits::{EditEntry, EditKey, EditStore};
