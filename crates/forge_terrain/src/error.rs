//! # Terrain Error Types
//!
//! Errors only surface while building a terrain (configuration, registry,
//! grid dimensions). Runtime operations never fail: out-of-bounds reads are
//! empty, out-of-bounds writes are ignored and picking misses are `None`.

use thiserror::Error;

/// Errors that can occur while setting up the terrain pipeline.
#[derive(Error, Debug)]
pub enum TerrainError {
    /// A world axis has zero voxels.
    #[error("invalid world dimensions: {width}x{height}x{depth} (every axis must be > 0)")]
    InvalidDimensions {
        /// Voxels along X.
        width: u32,
        /// Voxels along Y.
        height: u32,
        /// Voxels along Z.
        depth: u32,
    },

    /// A configuration value is out of range.
    #[error("invalid configuration: {field}: {reason}")]
    InvalidConfig {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// Two block definitions share an id.
    #[error("duplicate block id: {0}")]
    DuplicateBlock(u8),

    /// A block definition tried to claim the air id.
    #[error("block id 0 is reserved for air (got {0:?})")]
    ReservedBlockId(String),

    /// The config file is not valid TOML for [`crate::TerrainConfig`].
    #[error("failed to parse terrain config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The config file could not be read.
    #[error("failed to read terrain config: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for terrain setup operations.
pub type TerrainResult<T> = Result<T, TerrainError>;
