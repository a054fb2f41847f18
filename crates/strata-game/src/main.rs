//! Headless demo driver for the voxel world core.
//!
//! Streams a world around a simulated avatar walking a straight line, edits a
//! few blocks along the way, and persists the session to the save directory.
//!
//! Run with: `cargo run -p strata-game`

mod session;

use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;
use tracing::{info, warn};

use strata_config::{CliArgs, Config, default_config_dir, default_save_dir};
use strata_world::FileBlobStore;

use crate::session::{LoadStatus, Session};

const FRAME_DT: f32 = 1.0 / 60.0;
const WALK_SECONDS: f32 = 10.0;

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(default_config_dir)
        .unwrap_or_else(|| PathBuf::from("./config"));
    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config unavailable ({err}), using defaults");
            Config::default()
        }
    };
    config.apply_cli_overrides(&args);

    strata_log::init_logging(None, cfg!(debug_assertions), Some(&config));

    info!(
        seed = config.world.seed,
        draw_distance = config.world.draw_distance,
        chunk = format!("{}x{}", config.world.chunk_width, config.world.chunk_height),
        "starting session"
    );

    let mut session = match Session::new(&config) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("failed to build session: {err}");
            std::process::exit(1);
        }
    };

    let save_dir = args
        .save_dir
        .clone()
        .or_else(default_save_dir)
        .unwrap_or_else(|| PathBuf::from("./saves"));
    let mut store = match FileBlobStore::new(&save_dir) {
        Ok(store) => Some(store),
        Err(err) => {
            warn!(%err, "save directory unavailable, persistence disabled");
            None
        }
    };

    // Resume a previous session if one was saved.
    if let Some(store) = &store {
        match session.load(store) {
            LoadStatus::Loaded => info!("resumed saved world"),
            LoadStatus::Failed(message) => info!(%message, "starting fresh"),
        }
    }

    // Stream the initial window in before physics runs.
    session.update(0.0);
    while session.world().pending_count() > 0 {
        session.update(0.0);
    }
    info!(
        chunks = session.world().loaded_chunk_count(),
        "initial window loaded"
    );

    // Walk east for a while, streaming chunks as we go.
    session.player_mut().input = Vec3::new(4.0, 0.0, 0.0);
    let frames = (WALK_SECONDS / FRAME_DT) as usize;
    for frame in 0..frames {
        session.update(FRAME_DT);

        // Partway through, carve a block out from underfoot and cap it back.
        if frame == frames / 2 {
            let p = session.player().position;
            let (x, y, z) = (p.x.floor() as i32, p.y.floor() as i32, p.z.floor() as i32);
            session.remove_block(x, y - 3, z);
            let stone = session
                .world()
                .registry()
                .lookup_by_name("stone")
                .unwrap_or(strata_voxel::BlockId(1));
            session.add_block(x, y - 3, z, stone);
        }
    }

    let player = session.player();
    info!(
        pos = ?player.position,
        on_ground = player.on_ground,
        chunks = session.world().loaded_chunk_count(),
        edits = session.world().edits().len(),
        "walk complete"
    );

    if let Some(store) = store.as_mut() {
        match session.save(store) {
            Ok(()) => info!(dir = %save_dir.display(), "session saved"),
            Err(err) => warn!(%err, "save failed"),
        }
    }
}
