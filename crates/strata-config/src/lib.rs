//! Configuration for the voxel world runtime.
//!
//! Settings persist to disk as RON files, take CLI overrides via clap, and
//! tolerate missing or extra fields across versions.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, SimConfig, WorldConfig, default_config_dir, default_save_dir};
pub use error::ConfigError;
