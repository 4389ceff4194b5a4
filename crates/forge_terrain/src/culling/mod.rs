//! Visibility primitives: bounding boxes, frustum planes and cameras.

mod bounds;
mod camera;
mod frustum;

pub use bounds::Aabb;
pub use camera::{Camera, GameCamera, ViewMode};
pub use frustum::{CullVolume, Frustum, Plane};
