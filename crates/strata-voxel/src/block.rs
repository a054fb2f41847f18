//! Block catalog: maps compact [`BlockId`] values to [`BlockDef`] metadata.
//!
//! The registry is built once at startup. Empty is always ID 0 so that
//! zero-initialized chunk memory represents empty space. Resource types carry
//! the 3-axis noise scale and scarcity threshold consumed by the generator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compact identifier stored inside every voxel cell (2 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u16);

impl BlockId {
    /// The reserved ID for empty space.
    pub const EMPTY: BlockId = BlockId(0);

    /// Returns `true` if this is the empty block.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Parameters for a resource block's underground distribution.
///
/// A voxel below the surface becomes this resource when 3D noise sampled at
/// the world position divided by `scale` exceeds `scarcity`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ResourceDef {
    /// Per-axis divisor applied to world coordinates before noise sampling.
    /// Larger values stretch veins along that axis.
    pub scale: [f64; 3],
    /// Noise threshold in `[-1, 1]`. Higher threshold = rarer resource.
    pub scarcity: f64,
}

/// Full descriptor for a block type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlockDef {
    /// Human-readable name (e.g. "grass", "coal_ore").
    pub name: String,
    /// Whether avatars collide with this block.
    pub solid: bool,
    /// Index into the consumer's material palette. Opaque to this core.
    pub material_index: u16,
    /// Resource distribution parameters, for ore-like blocks only.
    pub resource: Option<ResourceDef>,
}

/// Errors that can occur during block registration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A block with the same name has already been registered.
    #[error("duplicate block name: {0}")]
    DuplicateName(String),
    /// All 65 536 ID slots have been consumed.
    #[error("block registry is full (max 65536 types)")]
    RegistryFull,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Maps [`BlockId`] → [`BlockDef`] with O(1) lookup by index and O(1)
/// reverse lookup by name.
pub struct BlockRegistry {
    /// Dense array where `index == BlockId.0`.
    defs: Vec<BlockDef>,
    /// Reverse lookup: name → ID.
    name_to_id: HashMap<String, BlockId>,
}

impl BlockRegistry {
    /// Creates a new registry with Empty pre-registered as ID 0.
    pub fn new() -> Self {
        let empty = BlockDef {
            name: "empty".to_string(),
            solid: false,
            material_index: 0,
            resource: None,
        };

        let mut name_to_id = HashMap::new();
        name_to_id.insert("empty".to_string(), BlockId::EMPTY);

        Self {
            defs: vec![empty],
            name_to_id,
        }
    }

    /// Registers a new block type and returns its assigned ID.
    ///
    /// IDs are assigned sequentially starting from 1 (0 is Empty). The
    /// registration order of resource blocks defines the fixed priority order
    /// used by the generator: the first matching resource wins.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateName`] if a block with the same name
    /// already exists, or [`RegistryError::RegistryFull`] if all ID slots are
    /// consumed.
    pub fn register(&mut self, def: BlockDef) -> Result<BlockId, RegistryError> {
        if self.name_to_id.contains_key(&def.name) {
            return Err(RegistryError::DuplicateName(def.name));
        }
        if self.defs.len() > u16::MAX as usize {
            return Err(RegistryError::RegistryFull);
        }

        let id = BlockId(self.defs.len() as u16);
        self.name_to_id.insert(def.name.clone(), id);
        self.defs.push(def);
        Ok(id)
    }

    /// Returns the definition for a given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range. IDs are only produced by the registry
    /// itself, so an out-of-range ID is a programming error.
    pub fn get(&self, id: BlockId) -> &BlockDef {
        &self.defs[id.0 as usize]
    }

    /// Returns the ID for a named block type, or `None` if not found.
    pub fn lookup_by_name(&self, name: &str) -> Option<BlockId> {
        self.name_to_id.get(name).copied()
    }

    /// Returns the total number of registered types (including Empty).
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Returns `true` if only Empty is registered.
    pub fn is_empty(&self) -> bool {
        self.defs.len() <= 1
    }

    /// Iterates over all registered `(id, def)` pairs, Empty included.
    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &BlockDef)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(i, def)| (BlockId(i as u16), def))
    }

    /// Iterates over resource blocks in registration order.
    ///
    /// This order is the generator's per-voxel test priority.
    pub fn resources(&self) -> impl Iterator<Item = (BlockId, &ResourceDef)> {
        self.iter()
            .filter_map(|(id, def)| def.resource.as_ref().map(|res| (id, res)))
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the standard block catalog.
///
/// Resource thresholds and scales follow the reference parameter set: stone
/// is the common filler vein, coal and iron are progressively rarer.
pub fn default_registry() -> BlockRegistry {
    let mut registry = BlockRegistry::new();

    let solid = |name: &str, material_index: u16| BlockDef {
        name: name.to_string(),
        solid: true,
        material_index,
        resource: None,
    };
    let resource = |name: &str, material_index: u16, scale: [f64; 3], scarcity: f64| BlockDef {
        name: name.to_string(),
        solid: true,
        material_index,
        resource: Some(ResourceDef { scale, scarcity }),
    };

    // Registration order fixes both the ID assignment and the resource
    // priority order; do not reorder.
    let defs = [
        solid("grass", 1),
        solid("dirt", 2),
        resource("stone", 3, [30.0, 30.0, 30.0], 0.5),
        resource("coal_ore", 4, [20.0, 20.0, 20.0], 0.8),
        resource("iron_ore", 5, [40.0, 40.0, 40.0], 0.9),
        solid("tree_trunk", 6),
        solid("leaves", 7),
        solid("sand", 8),
        solid("cloud", 9),
        solid("snow", 10),
        solid("jungle_tree_trunk", 11),
        solid("jungle_leaves", 12),
    ];

    for def in defs {
        registry
            .register(def)
            .unwrap_or_else(|err| unreachable!("default catalog is internally consistent: {err}"));
    }

    registry
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
