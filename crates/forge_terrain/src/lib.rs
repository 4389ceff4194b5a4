//! # FORGE Terrain
//!
//! Voxel terrain pipeline: decides what geometry exists and which of it a
//! camera can see. Drawing is left to the caller.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      TERRAIN PIPELINE                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  set_voxel → ChunkMap dirty queue                             │
//! │       ↓  (every rebuild_interval)                             │
//! │  TerrainBuilder (greedy) → Chunk face groups → Octree refill  │
//! │       ↓                                                       │
//! │  Widened frustum → Octree retrieve → chunk/face tests         │
//! │       ↓                                                       │
//! │  Visible faces (stable until next pass) → renderer, picking   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use forge_terrain::{BlockId, Camera, TerrainConfig, TerrainEngine, Voxel};
//! use glam::{IVec3, Vec3};
//!
//! let mut engine = TerrainEngine::new(TerrainConfig::default())?;
//! engine.map_mut().build_floor(Voxel::new(BlockId::GRASS));
//! engine.set_voxel(IVec3::new(4, 1, 4), Voxel::new(BlockId::STONE));
//!
//! let eye = Vec3::new(40.0, 30.0, 100.0);
//! let camera = Camera::looking_at(eye, Vec3::new(40.0, 0.0, 40.0), 67.0, 1.6);
//! let report = engine.force_tick(&camera.into());
//! assert!(report.visible_faces > 0);
//! # Ok::<(), forge_terrain::TerrainError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod culling;
pub mod engine;
pub mod error;
pub mod mesh;
pub mod octree;
pub mod voxel;

pub use config::{TerrainConfig, WorldSize};
pub use culling::{Aabb, Camera, CullVolume, Frustum, GameCamera, Plane, ViewMode};
pub use engine::{
    pick_voxel, FaceHandle, FaceHit, PickHit, PickMode, Ray, TerrainEngine, TickReport,
};
pub use error::{TerrainError, TerrainResult};
pub use mesh::{FacePart, FaceQuad, TerrainBuilder, TerrainVertex, VoxelFaceRenderable};
pub use octree::{Octree, OctreeNode, OctreeSettings};
pub use voxel::{
    Axis, BlockDef, BlockId, BlockRegistry, BlockShape, Chunk, ChunkCoord, ChunkMap, Direction,
    Voxel, CHUNK_SIZE,
};
