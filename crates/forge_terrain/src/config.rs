//! Terrain configuration.
//!
//! Loaded once at startup from TOML. Every field has a default, so a config
//! file only lists what it changes:
//!
//! ```toml
//! rebuild_interval = 0.1
//! pick_mode = "stepped"
//!
//! [world]
//! width = 128
//! height = 64
//! depth = 128
//!
//! [[blocks]]
//! id = 1
//! name = "stone"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::engine::PickMode;
use crate::error::{TerrainError, TerrainResult};
use crate::octree::OctreeSettings;
use crate::voxel::{BlockDef, BlockRegistry, ChunkMap, CHUNK_SIZE};

/// World size in voxels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorldSize {
    /// Voxels along X.
    pub width: u32,
    /// Voxels along Y.
    pub height: u32,
    /// Voxels along Z.
    pub depth: u32,
}

impl Default for WorldSize {
    /// 5 x 2 x 5 chunks.
    #[allow(clippy::cast_sign_loss)]
    fn default() -> Self {
        let chunk = CHUNK_SIZE as u32;
        Self { width: 5 * chunk, height: 2 * chunk, depth: 5 * chunk }
    }
}

/// Tunables of the terrain pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Seconds between rebuild + cull passes.
    pub rebuild_interval: f32,
    /// Degrees added to the camera field of view while culling.
    pub fov_margin: f32,
    /// Minimum dot product between the chunk-to-camera vector and a face
    /// normal for the face to count as facing the camera.
    pub backface_threshold: f32,
    /// World units per voxel.
    pub voxel_scale: f32,
    /// Items an octree leaf holds before splitting.
    pub octree_split_threshold: usize,
    /// Deepest octree level.
    pub octree_max_depth: u32,
    /// Voxel picking strategy.
    pub pick_mode: PickMode,
    /// Sample spacing of [`PickMode::Stepped`], in world units.
    pub pick_step: f32,
    /// A pass slower than this many microseconds logs a warning.
    pub tick_budget_us: u64,
    /// World dimensions.
    pub world: WorldSize,
    /// Block types; the built-in registry is used when absent.
    pub blocks: Option<Vec<BlockDef>>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            rebuild_interval: 0.05,
            fov_margin: 10.0,
            backface_threshold: 0.1,
            voxel_scale: 1.0,
            octree_split_threshold: 8,
            octree_max_depth: 6,
            pick_mode: PickMode::Traversal,
            pick_step: 0.1,
            tick_budget_us: 4_000,
            world: WorldSize::default(),
            blocks: None,
        }
    }
}

impl TerrainConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML or on values rejected by [`TerrainConfig::validate`].
    pub fn from_toml_str(source: &str) -> TerrainResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, or as [`TerrainConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> TerrainResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Checks every value is in range.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> TerrainResult<()> {
        fn positive(field: &'static str, value: f32) -> TerrainResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(TerrainError::InvalidConfig {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                })
            }
        }

        positive("rebuild_interval", self.rebuild_interval)?;
        positive("voxel_scale", self.voxel_scale)?;
        positive("pick_step", self.pick_step)?;

        if !(0.0..180.0).contains(&self.fov_margin) {
            return Err(TerrainError::InvalidConfig {
                field: "fov_margin",
                reason: format!("must be in [0, 180) degrees, got {}", self.fov_margin),
            });
        }
        if !self.backface_threshold.is_finite() {
            return Err(TerrainError::InvalidConfig {
                field: "backface_threshold",
                reason: "must be finite".to_string(),
            });
        }
        if self.octree_split_threshold == 0 {
            return Err(TerrainError::InvalidConfig {
                field: "octree_split_threshold",
                reason: "must be at least 1".to_string(),
            });
        }

        let WorldSize { width, height, depth } = self.world;
        if width == 0 || height == 0 || depth == 0 {
            return Err(TerrainError::InvalidDimensions { width, height, depth });
        }
        Ok(())
    }

    /// Returns the octree subdivision limits.
    #[must_use]
    pub const fn octree_settings(&self) -> OctreeSettings {
        OctreeSettings {
            split_threshold: self.octree_split_threshold,
            max_depth: self.octree_max_depth,
        }
    }

    /// Builds the block registry.
    ///
    /// # Errors
    ///
    /// Fails on duplicate or reserved block ids.
    pub fn block_registry(&self) -> TerrainResult<BlockRegistry> {
        match &self.blocks {
            Some(defs) => BlockRegistry::from_defs(defs.iter().cloned()),
            None => Ok(BlockRegistry::default()),
        }
    }

    /// Creates an empty chunk map of the configured size.
    ///
    /// # Errors
    ///
    /// Fails on invalid dimensions, scale or block table.
    pub fn chunk_map(&self) -> TerrainResult<ChunkMap> {
        let WorldSize { width, height, depth } = self.world;
        ChunkMap::new(width, height, depth, self.voxel_scale, self.block_registry()?)
    }
}
