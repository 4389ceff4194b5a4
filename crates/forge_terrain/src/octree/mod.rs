//! Octree spatial index used to find the chunks a camera can see.

mod node;
mod tree;

pub use node::{OctreeNode, OctreeSettings};
pub use tree::Octree;
