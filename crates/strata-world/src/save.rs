//! Durable persistence of world state.
//!
//! Two blobs under fixed keys: the generation parameter set and the sparse
//! edit list. Everything else is regenerated from them, so a save is small no
//! matter how large the explored world is.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use rustc_hash::FxHashMap;
use thiserror::Error;

/// Key of the serialized generation parameter blob.
pub const PARAMS_KEY: &str = "world-params";
/// Key of the serialized edit list blob.
pub const EDITS_KEY: &str = "world-edits";

/// Persistence failure. None of these are fatal; callers fall back to a
/// freshly generated world.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("blob '{0}' is missing from the store")]
    MissingBlob(&'static str),
    #[error("blob '{key}' failed to parse: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("edit references unknown block id {0}")]
    UnknownBlock(u16),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Gen(#[from] strata_terrain::GenError),
}

/// Generic durable key-value blob storage.
///
/// The world core writes whole blobs under fixed names and never assumes
/// anything about the backing medium.
pub trait BlobStore {
    /// Stores `bytes` under `key`, replacing any previous blob.
    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<(), SaveError>;

    /// Retrieves the blob under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SaveError>;
}

/// Blob store backed by one file per key inside a directory.
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Creates a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SaveError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileBlobStore {
    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<(), SaveError> {
        fs::write(self.path_for(key), bytes)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SaveError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory blob store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: FxHashMap<String, Vec<u8>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<(), SaveError> {
        self.blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, SaveError> {
        Ok(self.blobs.get(key).cloned())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
