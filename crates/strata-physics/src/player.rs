//! Avatar kinematic state.

use glam::Vec3;

/// The avatar's kinematic state and bounding volume.
///
/// The bounding volume is a vertical cylinder; `position` is the eye point at
/// the top of the cylinder, so the cylinder center sits at
/// `position.y - height / 2`.
#[derive(Clone, Debug)]
pub struct Player {
    /// Eye position in world units.
    pub position: Vec3,
    /// Current velocity in world units per second.
    pub velocity: Vec3,
    /// Per-frame movement intent, applied directly to horizontal velocity.
    pub input: Vec3,
    /// Cylinder radius. Must be positive.
    pub radius: f32,
    /// Cylinder height. Must be positive.
    pub height: f32,
    /// Horizontal speed cap for input, in units per second.
    pub max_speed: f32,
    /// Vertical speed granted by a jump.
    pub jump_speed: f32,
    /// True while the last physics step pushed the avatar up off a block.
    /// Recomputed every step, never carried over.
    pub on_ground: bool,
}

impl Player {
    /// Creates an avatar at `position` with the standard bounding cylinder.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            input: Vec3::ZERO,
            radius: 0.5,
            height: 1.75,
            max_speed: 10.0,
            jump_speed: 10.0,
            on_ground: false,
        }
    }

    /// Center of the bounding cylinder.
    pub fn cylinder_center(&self) -> Vec3 {
        Vec3::new(
            self.position.x,
            self.position.y - self.height / 2.0,
            self.position.z,
        )
    }

    /// Copies horizontal input into velocity and integrates position.
    pub fn apply_inputs(&mut self, dt: f32) {
        self.velocity.x = self.input.x.clamp(-self.max_speed, self.max_speed);
        self.velocity.z = self.input.z.clamp(-self.max_speed, self.max_speed);
        self.position += self.velocity * dt;
    }

    /// Starts a jump if the avatar is standing on ground.
    pub fn jump(&mut self) {
        if self.on_ground {
            self.velocity.y += self.jump_speed;
        }
    }

    /// Returns `true` if the point lies inside the bounding cylinder.
    pub fn contains_point(&self, point: Vec3) -> bool {
        let center = self.cylinder_center();
        let dy = point.y - center.y;
        let dx = point.x - center.x;
        let dz = point.z - center.z;
        dy.abs() < self.height / 2.0 && dx * dx + dz * dz < self.radius * self.radius
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
