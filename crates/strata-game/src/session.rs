//! One play session: world, avatar, and physics wired together.

use glam::Vec3;
use tracing::{debug, warn};

use strata_config::Config;
use strata_physics::{PhysicsEngine, Player};
use strata_terrain::{GenError, GenParams};
use strata_voxel::{BlockId, ChunkSize, default_registry};
use strata_world::{BlobStore, World, WorldParams};

/// Outcome of restoring a session from durable storage.
#[derive(Debug)]
pub enum LoadStatus {
    /// Saved state was restored; the world will regenerate with it.
    Loaded,
    /// Saved state was missing or corrupt; a fresh world was generated
    /// instead. The message is suitable for user display.
    Failed(String),
}

/// A running game session.
///
/// Each frame runs one fixed-step physics pass and then one world-streaming
/// pass, in that order, from the single simulation thread. A render pass may
/// follow and only reads final state.
pub struct Session {
    world: World,
    player: Player,
    physics: PhysicsEngine,
    log_frame_stats: bool,
}

impl Session {
    /// Builds a session from configuration.
    pub fn new(config: &Config) -> Result<Self, GenError> {
        let gen_params = GenParams {
            seed: config.world.seed,
            ..GenParams::default()
        };
        let spawn_height = gen_params.terrain.offset as f32 + 4.0;
        let params = WorldParams {
            chunk_size: ChunkSize::new(config.world.chunk_width, config.world.chunk_height),
            draw_distance: config.world.draw_distance,
            async_generation: config.world.async_generation,
            generation_budget: config.world.generation_budget,
            gen_params,
        };
        let world = World::new(params, default_registry())?;
        let player = Player::new(Vec3::new(0.5, spawn_height, 0.5));
        let physics = PhysicsEngine::with_rate(config.sim.simulation_rate, config.sim.gravity);

        Ok(Self {
            world,
            player,
            physics,
            log_frame_stats: config.debug.log_frame_stats,
        })
    }

    /// Advances the session by one frame delta.
    pub fn update(&mut self, dt: f32) {
        self.physics.update(dt, &mut self.player, &self.world);
        self.world.update(self.player.position);

        if self.log_frame_stats {
            debug!(
                loaded = self.world.loaded_chunk_count(),
                pending = self.world.pending_count(),
                pos = ?self.player.position,
                on_ground = self.player.on_ground,
                "frame"
            );
        }
    }

    /// Places a block at world coordinates.
    pub fn add_block(&mut self, x: i32, y: i32, z: i32, id: BlockId) {
        self.world.add_block(x, y, z, id);
    }

    /// Removes the block at world coordinates.
    pub fn remove_block(&mut self, x: i32, y: i32, z: i32) {
        self.world.remove_block(x, y, z);
    }

    /// Persists world parameters and edits.
    pub fn save(&self, store: &mut dyn BlobStore) -> Result<(), strata_world::SaveError> {
        self.world.save(store)
    }

    /// Restores world parameters and edits, falling back to a fresh world
    /// when the save is missing or corrupt. Never fails the session.
    pub fn load(&mut self, store: &dyn BlobStore) -> LoadStatus {
        match self.world.load(store) {
            Ok(()) => LoadStatus::Loaded,
            Err(err) => {
                warn!(%err, "load failed, generating a fresh world");
                self.world.regenerate();
                LoadStatus::Failed(format!("load failed: {err}"))
            }
        }
    }

    /// The world state, for render consumers.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The avatar state.
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable avatar state, for input binding.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
