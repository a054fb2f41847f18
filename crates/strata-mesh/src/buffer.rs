//! Per-block-type instance buffer with O(1) swap-remove.

use glam::Vec3;

/// A contiguous buffer of instance transforms for one block type.
///
/// Every live instance records the linear index of its owning voxel, giving
/// the slot→voxel half of the bidirectional slot mapping (the voxel itself
/// stores the voxel→slot half). Both halves must be updated together on every
/// mutation; [`swap_remove`] reports the moved owner so the caller can do so.
///
/// [`swap_remove`]: InstanceBuffer::swap_remove
#[derive(Clone, Debug, Default)]
pub struct InstanceBuffer {
    /// Chunk-local position of each active instance.
    positions: Vec<Vec3>,
    /// Linear voxel index owning each slot, parallel to `positions`.
    owners: Vec<usize>,
}

impl InstanceBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instance and returns its slot.
    pub fn push(&mut self, position: Vec3, owner: usize) -> u32 {
        let slot = self.positions.len() as u32;
        self.positions.push(position);
        self.owners.push(owner);
        slot
    }

    /// Removes the instance at `slot` by moving the last instance into its
    /// place.
    ///
    /// Returns the linear voxel index of the moved instance so the caller can
    /// update that voxel's recorded slot, or `None` when `slot` was the last
    /// entry and nothing moved.
    pub fn swap_remove(&mut self, slot: u32) -> Option<usize> {
        let slot = slot as usize;
        let last = self.positions.len() - 1;
        self.positions.swap_remove(slot);
        self.owners.swap_remove(slot);
        if slot < last { Some(self.owners[slot]) } else { None }
    }

    /// Number of active instances.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if no instances are active.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The active instance positions, ready for upload.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// The owning voxel's linear index for each slot.
    pub fn owner_of(&self, slot: u32) -> usize {
        self.owners[slot as usize]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
