//! Block type descriptors.
//!
//! Block types are static data looked up by id. The two properties the
//! terrain pipeline cares about are:
//! - **scalable**: faces may merge with neighbors of the same type
//! - **occlusion**: the block hides the adjoining face of a solid neighbor

use serde::Deserialize;

use crate::error::{TerrainError, TerrainResult};

/// Block type identifier. `0` is air.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u8);

impl BlockId {
    /// Empty space.
    pub const AIR: Self = Self(0);
    /// Plain stone.
    pub const STONE: Self = Self(1);
    /// Dirt.
    pub const DIRT: Self = Self(2);
    /// Grass-covered dirt.
    pub const GRASS: Self = Self(3);
    /// Sand.
    pub const SAND: Self = Self(4);
    /// Glass - mergeable look, but does not hide neighbors.
    pub const GLASS: Self = Self(5);
    /// Leaves - neither merges nor hides neighbors.
    pub const LEAVES: Self = Self(6);
    /// Brick - hides neighbors but every face keeps its own texture tile.
    pub const BRICK: Self = Self(7);

    /// Returns true for the air id.
    #[inline]
    #[must_use]
    pub const fn is_air(self) -> bool {
        self.0 == 0
    }
}

/// Meshing-relevant shape flags of a block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockShape {
    /// Faces may merge with same-type neighbors.
    pub scalable: bool,
    /// Hides the adjoining face of a neighboring solid voxel.
    pub occlusion: bool,
}

impl BlockShape {
    /// Shape of air: hides nothing, merges with nothing.
    pub const AIR: Self = Self { scalable: false, occlusion: false };

    /// Shape used for ids missing from the registry.
    pub const FALLBACK: Self = Self { scalable: false, occlusion: true };

    /// Returns true if faces of this shape take part in greedy merging.
    ///
    /// Merging is only sound when the block also occludes, otherwise a merged
    /// quad would cover faces that must stay individually visible.
    #[inline]
    #[must_use]
    pub const fn mergeable(self) -> bool {
        self.scalable && self.occlusion
    }
}

const fn default_true() -> bool {
    true
}

/// A registered block type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockDef {
    /// Unique id, never 0.
    pub id: BlockId,
    /// Human-readable name.
    pub name: String,
    /// See [`BlockShape::scalable`].
    #[serde(default = "default_true")]
    pub scalable: bool,
    /// See [`BlockShape::occlusion`].
    #[serde(default = "default_true")]
    pub occlusion: bool,
}

impl BlockDef {
    /// Creates a block definition.
    #[must_use]
    pub fn new(id: BlockId, name: impl Into<String>, scalable: bool, occlusion: bool) -> Self {
        Self { id, name: name.into(), scalable, occlusion }
    }

    /// Returns the meshing flags of this block.
    #[inline]
    #[must_use]
    pub const fn shape(&self) -> BlockShape {
        BlockShape { scalable: self.scalable, occlusion: self.occlusion }
    }
}

/// Lookup table from [`BlockId`] to [`BlockDef`].
///
/// Immutable once the terrain is running; shared read-only by the mesher.
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    /// Indexed by block id.
    defs: Vec<Option<BlockDef>>,
    /// Shapes cached next to the definitions for the meshing hot path.
    shapes: [BlockShape; 256],
}

impl BlockRegistry {
    /// Creates a registry that only knows air.
    #[must_use]
    pub fn empty() -> Self {
        let mut shapes = [BlockShape::FALLBACK; 256];
        shapes[0] = BlockShape::AIR;
        Self { defs: vec![None; 256], shapes }
    }

    /// Builds a registry from a list of definitions.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate id or on a definition using the air id.
    pub fn from_defs(defs: impl IntoIterator<Item = BlockDef>) -> TerrainResult<Self> {
        let mut registry = Self::empty();
        for def in defs {
            registry.register(def)?;
        }
        Ok(registry)
    }

    /// Adds a block type.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate id or on a definition using the air id.
    pub fn register(&mut self, def: BlockDef) -> TerrainResult<()> {
        if def.id.is_air() {
            return Err(TerrainError::ReservedBlockId(def.name));
        }
        let slot = &mut self.defs[usize::from(def.id.0)];
        if slot.is_some() {
            return Err(TerrainError::DuplicateBlock(def.id.0));
        }
        self.shapes[usize::from(def.id.0)] = def.shape();
        *slot = Some(def);
        Ok(())
    }

    /// Gets a block definition by id.
    #[inline]
    #[must_use]
    pub fn get(&self, id: BlockId) -> Option<&BlockDef> {
        self.defs[usize::from(id.0)].as_ref()
    }

    /// Returns the meshing flags for an id.
    ///
    /// Air maps to [`BlockShape::AIR`], unknown ids to [`BlockShape::FALLBACK`].
    #[inline]
    #[must_use]
    pub fn shape(&self, id: BlockId) -> BlockShape {
        self.shapes[usize::from(id.0)]
    }

    /// Returns the number of registered (non-air) block types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.iter().flatten().count()
    }

    /// Returns true when only air is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over registered definitions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &BlockDef> {
        self.defs.iter().flatten()
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        let defaults = [
            BlockDef::new(BlockId::STONE, "stone", true, true),
            BlockDef::new(BlockId::DIRT, "dirt", true, true),
            BlockDef::new(BlockId::GRASS, "grass", true, true),
            BlockDef::new(BlockId::SAND, "sand", true, true),
            BlockDef::new(BlockId::GLASS, "glass", true, false),
            BlockDef::new(BlockId::LEAVES, "leaves", false, false),
            BlockDef::new(BlockId::BRICK, "brick", false, true),
        ];
        for def in defaults {
            // Ids above are distinct and non-zero.
            let registered = registry.register(def);
            debug_assert!(registered.is_ok());
        }
        registry
    }
}
