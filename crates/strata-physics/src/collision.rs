//! Two-phase cylinder-vs-voxel collision detection and ordered resolution.

use glam::{IVec3, Vec3};

use crate::player::Player;
use crate::query::BlockQuery;

/// One confirmed contact between the avatar's cylinder and a voxel cube.
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    /// Integer coordinates of the contacted voxel.
    pub block: IVec3,
    /// Closest point on the cube to the cylinder center.
    pub point: Vec3,
    /// Unit normal pointing from the cube toward the avatar.
    pub normal: Vec3,
    /// Penetration depth along the normal.
    pub overlap: f32,
}

/// Enumerates every solid voxel inside the avatar's axis-aligned extent.
///
/// The extent spans the cylinder's diameter in x/z and its full height in y,
/// with each bound floored or ceiled to the containing integer cell.
pub fn broad_phase(player: &Player, world: &impl BlockQuery) -> Vec<IVec3> {
    let p = player.position;
    let x_min = (p.x - player.radius).floor() as i32;
    let x_max = (p.x + player.radius).ceil() as i32;
    let y_min = (p.y - player.height).floor() as i32;
    let y_max = p.y.ceil() as i32;
    let z_min = (p.z - player.radius).floor() as i32;
    let z_max = (p.z + player.radius).ceil() as i32;

    let mut candidates = Vec::new();
    for x in x_min..=x_max {
        for y in y_min..=y_max {
            for z in z_min..=z_max {
                if world.is_solid(x, y, z) {
                    candidates.push(IVec3::new(x, y, z));
                }
            }
        }
    }
    candidates
}

/// Tests each candidate cube against the bounding cylinder and computes
/// contact data for real intersections.
///
/// Also recomputes `on_ground`: the flag is cleared first and set only by a
/// vertical contact whose normal pushes the avatar upward, so resting on a
/// ceilingless block is required and a ceiling bump does not count.
pub fn narrow_phase(candidates: &[IVec3], player: &mut Player) -> Vec<Contact> {
    player.on_ground = false;
    let center = player.cylinder_center();

    let mut contacts = Vec::new();
    for &block in candidates {
        // Closest point on the unit cube to the cylinder center.
        let b = block.as_vec3();
        let point = Vec3::new(
            center.x.clamp(b.x - 0.5, b.x + 0.5),
            center.y.clamp(b.y - 0.5, b.y + 0.5),
            center.z.clamp(b.z - 0.5, b.z + 0.5),
        );

        let dx = point.x - center.x;
        let dy = point.y - center.y;
        let dz = point.z - center.z;
        if !player.contains_point(point) {
            continue;
        }

        let overlap_y = player.height / 2.0 - dy.abs();
        let overlap_xz = player.radius - (dx * dx + dz * dz).sqrt();

        let (normal, overlap) = if overlap_y < overlap_xz {
            let normal = if dy > 0.0 { Vec3::NEG_Y } else { Vec3::Y };
            if normal.y > 0.0 {
                player.on_ground = true;
            }
            (normal, overlap_y)
        } else {
            (Vec3::new(-dx, 0.0, -dz).normalize_or_zero(), overlap_xz)
        };

        contacts.push(Contact {
            block,
            point,
            normal,
            overlap,
        });
    }
    contacts
}

/// Resolves contacts in ascending order of overlap.
///
/// Resolving smallest first applies the least-intrusive correction before
/// larger ones. Because each resolution moves the avatar, every later contact
/// is re-validated against the updated position and skipped if it no longer
/// touches the cylinder.
pub fn resolve_collisions(player: &mut Player, mut contacts: Vec<Contact>) {
    contacts.sort_by(|a, b| a.overlap.total_cmp(&b.overlap));

    for contact in contacts {
        if !player.contains_point(contact.point) {
            continue;
        }

        player.position += contact.normal * contact.overlap;

        // Remove the velocity component along the normal: inelastic slide,
        // no bounce.
        let magnitude = player.velocity.dot(contact.normal);
        player.velocity -= contact.normal * magnitude;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    /// Minimal occupancy grid for exercising collision without a full world.
    pub(crate) struct VoxelSet(pub FxHashSet<(i32, i32, i32)>);

    impl VoxelSet {
        pub(crate) fn from_blocks(blocks: &[(i32, i32, i32)]) -> Self {
            Self(blocks.iter().copied().collect())
        }
    }

    impl BlockQuery for VoxelSet {
        fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
            self.0.contains(&(x, y, z))
        }
    }

    #[test]
    fn test_broad_phase_finds_only_solid_cells() {
        let world = VoxelSet::from_blocks(&[(0, 0, 0), (5, 5, 5)]);
        let player = Player::new(Vec3::new(0.0, 2.0, 0.0));
        let candidates = broad_phase(&player, &world);
        assert_eq!(candidates, vec![IVec3::new(0, 0, 0)]);
    }

    #[test]
    fn test_no_contact_when_separated() {
        let world = VoxelSet::from_blocks(&[(0, 0, 0)]);
        // Bottom of the cylinder is 1.0 above the top of the voxel.
        let mut player = Player::new(Vec3::new(0.0, 3.25, 0.0));
        let candidates = broad_phase(&player, &world);
        let contacts = narrow_phase(&candidates, &mut player);
        assert!(contacts.is_empty());
        assert!(!player.on_ground);
    }

    #[test]
    fn test_standing_contact_sets_on_ground() {
        // Cylinder bottom 0.1 below the top face of the voxel at the origin.
        let mut player = Player::new(Vec3::new(0.0, 2.15, 0.0));
        let world = VoxelSet::from_blocks(&[(0, 0, 0)]);
        let candidates = broad_phase(&player, &world);
        let contacts = narrow_phase(&candidates, &mut player);

        assert_eq!(contacts.len(), 1);
        assert!(player.on_ground);
        let contact = contacts[0];
        assert_eq!(contact.normal, Vec3::Y);
        assert!((contact.overlap - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_ceiling_contact_does_not_set_on_ground() {
        // Voxel overlapping the top of the cylinder.
        let mut player = Player::new(Vec3::new(0.0, 1.95, 0.0));
        let world = VoxelSet::from_blocks(&[(0, 2, 0)]);
        let candidates = broad_phase(&player, &world);
        let contacts = narrow_phase(&candidates, &mut player);

        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].normal, Vec3::NEG_Y);
        assert!(!player.on_ground, "a head bump is not standing on ground");
    }

    #[test]
    fn test_side_contact_normal_is_horizontal() {
        // Wall block beside the cylinder, overlapping horizontally.
        let mut player = Player::new(Vec3::new(0.6, 1.75, 0.0));
        let world = VoxelSet::from_blocks(&[(0, 0, 0)]);
        let candidates = broad_phase(&player, &world);
        let contacts = narrow_phase(&candidates, &mut player);

        assert_eq!(contacts.len(), 1);
        let normal = contacts[0].normal;
        assert_eq!(normal.y, 0.0);
        assert!(normal.x > 0.99, "normal must point from the cube to the avatar");
        assert!(!player.on_ground);
    }

    #[test]
    fn test_resolution_removes_normal_velocity_only() {
        let mut player = Player::new(Vec3::new(0.6, 1.75, 0.0));
        player.velocity = Vec3::new(-3.0, 0.0, 2.0);
        let world = VoxelSet::from_blocks(&[(0, 0, 0)]);
        let candidates = broad_phase(&player, &world);
        let contacts = narrow_phase(&candidates, &mut player);
        resolve_collisions(&mut player, contacts);

        assert!(player.position.x > 0.6, "pushed out along +x");
        assert!((player.velocity.x - 0.0).abs() < 1e-4, "normal component gone");
        assert_eq!(player.velocity.z, 2.0, "tangential velocity preserved");
    }

    #[test]
    fn test_smallest_overlap_resolves_first_and_stale_contacts_skip() {
        let mut player = Player::new(Vec3::new(0.0, 1.75, 0.0));

        // A deep side contact right at the bottom rim of the cylinder and a
        // shallow ground contact. The ground contact (overlap 0.1) must
        // resolve first; lifting the avatar 0.1 pushes the rim point out of
        // the cylinder, so the 0.3-overlap contact must be skipped.
        let stale_after_lift = Contact {
            block: IVec3::new(-1, 0, 0),
            point: Vec3::new(-0.3, 0.005, 0.0),
            normal: Vec3::X,
            overlap: 0.3,
        };
        let ground = Contact {
            block: IVec3::new(0, 0, 0),
            point: Vec3::new(0.0, 0.01, 0.0),
            normal: Vec3::Y,
            overlap: 0.1,
        };
        assert!(player.contains_point(stale_after_lift.point));
        assert!(player.contains_point(ground.point));

        resolve_collisions(&mut player, vec![stale_after_lift, ground]);

        assert!((player.position.y - 1.85).abs() < 1e-5, "lifted by 0.1");
        assert_eq!(player.position.x, 0.0, "stale side contact was skipped");
    }
}
