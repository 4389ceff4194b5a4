//! Octree spatial index over bounding boxes.

use crate::culling::{Aabb, CullVolume};

use super::node::{OctreeNode, OctreeSettings};

/// Spatial index of items by bounding box.
///
/// Built for clear-and-refill use: the terrain clears it and reinserts
/// every chunk after each rebuild pass rather than moving items around.
/// Every item is stored in exactly one node, so a query never reports an
/// item twice.
#[derive(Debug, Clone)]
pub struct Octree<T> {
    root: OctreeNode<T>,
    settings: OctreeSettings,
}

impl<T: Copy> Octree<T> {
    /// Creates an empty tree covering `bounds`.
    ///
    /// Items outside `bounds` are accepted and kept at the root.
    #[must_use]
    pub fn new(bounds: Aabb, settings: OctreeSettings) -> Self {
        Self { root: OctreeNode::new(bounds, 0), settings }
    }

    /// Returns the subdivision limits.
    #[inline]
    #[must_use]
    pub const fn settings(&self) -> OctreeSettings {
        self.settings
    }

    /// Returns the root node.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> &OctreeNode<T> {
        &self.root
    }

    /// Inserts an item with its bounding box.
    pub fn insert(&mut self, item: T, aabb: Aabb) {
        let settings = self.settings;
        self.root.insert(item, aabb, &settings);
    }

    /// Removes every item. Node storage is kept for the next fill.
    pub fn clear(&mut self) {
        self.root.clear();
    }

    /// Appends every item in a node intersecting `volume` to `out`.
    ///
    /// `out` is not cleared. With `exact`, items are also tested one by one
    /// against the volume.
    pub fn retrieve<V>(&self, out: &mut Vec<T>, volume: &V, exact: bool)
    where
        V: CullVolume + ?Sized,
    {
        self.root.retrieve(out, volume, exact);
    }

    /// Returns the number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}
