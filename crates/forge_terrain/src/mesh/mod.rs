//! Greedy meshing: face parts, the terrain builder and renderable faces.

mod builder;
mod part;
mod renderable;

pub use builder::TerrainBuilder;
pub use part::FacePart;
pub use renderable::{FaceQuad, TerrainVertex, VoxelFaceRenderable};
