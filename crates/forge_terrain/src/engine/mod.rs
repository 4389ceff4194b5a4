//! Terrain engine: timed rebuild and cull passes, visibility queries and
//! picking.

mod picking;
mod stats;
mod terrain;

pub use picking::{pick_voxel, PickHit, PickMode, Ray};
pub use stats::TickReport;
pub use terrain::{FaceHandle, FaceHit, TerrainEngine};
