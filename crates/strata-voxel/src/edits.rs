//! Sparse edit store: player modifications persisted over procedural terrain.
//!
//! Maps `(chunk, local-block)` keys to a block-type override. The store
//! outlives any individual chunk instance; chunks are destroyed and
//! regenerated as the avatar moves, and their edits replay from here.
//! Entries change only through explicit edits or an explicit [`clear`].
//!
//! [`clear`]: EditStore::clear

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::block::BlockId;

/// Key addressing one edited voxel: chunk-grid coordinates plus local
/// coordinates within that chunk.
///
/// Chunk-grid coordinates are the canonical form of the chunk origin
/// (origin = coordinate × chunk width).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EditKey {
    /// Chunk-grid x coordinate.
    pub chunk_x: i32,
    /// Chunk-grid z coordinate.
    pub chunk_z: i32,
    /// Local x within the chunk.
    pub x: i32,
    /// Local y within the chunk.
    pub y: i32,
    /// Local z within the chunk.
    pub z: i32,
}

/// One persisted edit, the unit of the durable save blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditEntry {
    /// Where the edit applies.
    pub key: EditKey,
    /// The overriding block type. [`BlockId::EMPTY`] records a removal.
    pub id: BlockId,
}

/// Sparse override map recording only voxels a player has changed from their
/// procedurally generated value.
#[derive(Clone, Debug, Default)]
pub struct EditStore {
    map: FxHashMap<EditKey, BlockId>,
}

impl EditStore {
    /// Creates an empty edit store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an edit, replacing any previous edit at the same key.
    pub fn set(&mut self, key: EditKey, id: BlockId) {
        self.map.insert(key, id);
    }

    /// Returns the override at `key`, if any.
    pub fn get(&self, key: EditKey) -> Option<BlockId> {
        self.map.get(&key).copied()
    }

    /// Returns `true` if an edit exists at `key`.
    pub fn contains(&self, key: EditKey) -> bool {
        self.map.contains_key(&key)
    }

    /// Removes every edit. Only an explicit reset clears the store.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Number of recorded edits.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no edits are recorded.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over the edits recorded for one chunk.
    pub fn edits_for_chunk(
        &self,
        chunk_x: i32,
        chunk_z: i32,
    ) -> impl Iterator<Item = (EditKey, BlockId)> + '_ {
        self.map
            .iter()
            .filter(move |(key, _)| key.chunk_x == chunk_x && key.chunk_z == chunk_z)
            .map(|(key, id)| (*key, *id))
    }

    /// Converts the store to a sorted entry list for serialization.
    ///
    /// Sorting makes the durable blob byte-stable across runs.
    pub fn to_entries(&self) -> Vec<EditEntry> {
        let mut entries: Vec<_> = self
            .map
            .iter()
            .map(|(key, id)| EditEntry { key: *key, id: *id })
            .collect();
        entries.sort_by_key(|entry| entry.key);
        entries
    }

    /// Rebuilds a store from a deserialized entry list.
    pub fn from_entries(entries: Vec<EditEntry>) -> Self {
        let map = entries
            .into_iter()
            .map(|entry| (entry.key, entry.id))
            .collect();
        Self { map }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn key(chunk_x: i32, chunk_z: i32, x: i32, y: i32, z: i32) -> EditKey {
        EditKey {
            chunk_x,
            chunk_z,
            x,
            y,
            z,
        }
    }

    #[test]
    fn test_set_then_get() {
        let mut store = EditStore::new();
        store.set(key(0, 0, 1, 2, 3), BlockId(7));
        assert_eq!(store.get(key(0, 0, 1, 2, 3)), Some(BlockId(7)));
        assert_eq!(store.get(key(0, 0, 1, 2, 4)), None);
    }

    #[test]
    fn test_latest_edit_wins() {
        let mut store = EditStore::new();
        let k = key(-2, 5, 0, 0, 0);
        store.set(k, BlockId(3));
        store.set(k, BlockId::EMPTY);
        assert_eq!(store.get(k), Some(BlockId::EMPTY));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_empty_override_is_a_real_entry() {
        // Removing a generated block must persist as an explicit EMPTY entry,
        // not as the absence of one.
        let mut store = EditStore::new();
        store.set(key(1, 1, 4, 4, 4), BlockId::EMPTY);
        assert!(store.contains(key(1, 1, 4, 4, 4)));
    }

    #[test]
    fn test_edits_for_chunk_filters_by_chunk() {
        let mut store = EditStore::new();
        store.set(key(0, 0, 1, 1, 1), BlockId(1));
        store.set(key(0, 0, 2, 2, 2), BlockId(2));
        store.set(key(3, -1, 1, 1, 1), BlockId(3));

        let in_origin: Vec<_> = store.edits_for_chunk(0, 0).collect();
        assert_eq!(in_origin.len(), 2);
        assert!(in_origin.iter().all(|(k, _)| k.chunk_x == 0 && k.chunk_z == 0));
    }

    #[test]
    fn test_entry_round_trip_preserves_edits() {
        let mut store = EditStore::new();
        store.set(key(0, 0, 1, 2, 3), BlockId(4));
        store.set(key(-1, 2, 0, 9, 5), BlockId::EMPTY);
        store.set(key(7, 7, 7, 7, 7), BlockId(1));

        let rebuilt = EditStore::from_entries(store.to_entries());
        assert_eq!(rebuilt.len(), store.len());
        assert_eq!(rebuilt.get(key(0, 0, 1, 2, 3)), Some(BlockId(4)));
        assert_eq!(rebuilt.get(key(-1, 2, 0, 9, 5)), Some(BlockId::EMPTY));
    }

    #[test]
    fn test_to_entries_is_sorted() {
        let mut store = EditStore::new();
        store.set(key(5, 0, 0, 0, 0), BlockId(1));
        store.set(key(-5, 0, 0, 0, 0), BlockId(2));
        store.set(key(0, 0, 0, 0, 0), BlockId(3));

        let entries = store.to_entries();
        let keys: Vec<_> = entries.iter().map(|e| e.key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_clear_removes_everything() {
        let mut store = EditStore::new();
        store.set(key(0, 0, 0, 0, 0), BlockId(1));
        store.clear();
        assert!(store.is_empty());
    }
}
