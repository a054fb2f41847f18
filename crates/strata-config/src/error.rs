//! Configuration failure modes.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while loading or persisting `config.ron`.
///
/// Filesystem variants carry the offending path so the startup message can
/// point the user at the file (the config and save directories live in
/// platform-specific locations).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config directory or file could not be written.
    #[error("failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid RON or does not match the config schema.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    /// The in-memory config could not be rendered to RON.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}
