//! Voxel occupancy abstraction consumed by collision detection.

use strata_world::World;

/// Read-only voxel occupancy, the physics engine's only view of the world.
///
/// Absent, unloaded, or out-of-range voxels report non-solid so that falling
/// through an unstreamed region degrades to free fall rather than a panic.
pub trait BlockQuery {
    /// Returns `true` if a solid block occupies the unit cube at the given
    /// integer world coordinates.
    fn is_solid(&self, x: i32, y: i32, z: i32) -> bool;
}

impl BlockQuery for World {
    fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        World::is_solid(self, x, y, z)
    }
}
