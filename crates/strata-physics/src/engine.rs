//! Fixed-timestep simulation driver.

use crate::collision::{broad_phase, narrow_phase, resolve_collisions};
use crate::player::Player;
use crate::query::BlockQuery;

/// Default simulation rate in steps per second.
pub const SIMULATION_RATE: f32 = 200.0;
/// Default downward acceleration in units per second squared.
pub const GRAVITY: f32 = 32.0;

/// Advances avatar kinematics on a fixed timestep.
///
/// Real frame deltas accumulate; whole timesteps are consumed one at a time,
/// so simulation results are independent of the frame rate feeding them.
pub struct PhysicsEngine {
    timestep: f32,
    gravity: f32,
    accumulator: f32,
}

impl PhysicsEngine {
    /// Creates an engine at the default rate and gravity.
    pub fn new() -> Self {
        Self::with_rate(SIMULATION_RATE, GRAVITY)
    }

    /// Creates an engine with an explicit simulation rate and gravity.
    pub fn with_rate(simulation_rate: f32, gravity: f32) -> Self {
        Self {
            timestep: 1.0 / simulation_rate,
            gravity,
            accumulator: 0.0,
        }
    }

    /// The fixed step duration in seconds.
    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    /// Consumes a frame delta, running as many whole fixed steps as fit.
    pub fn update(&mut self, dt: f32, player: &mut Player, world: &impl BlockQuery) {
        self.accumulator += dt;
        while self.accumulator >= self.timestep {
            self.step(player, world);
            self.accumulator -= self.timestep;
        }
    }

    /// One simulation step: integrate gravity and input, then detect and
    /// resolve collisions.
    fn step(&self, player: &mut Player, world: &impl BlockQuery) {
        player.velocity.y -= self.gravity * self.timestep;
        player.apply_inputs(self.timestep);

        let candidates = broad_phase(player, world);
        let contacts = narrow_phase(&candidates, player);
        if !contacts.is_empty() {
            resolve_collisions(player, contacts);
        }
    }
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
