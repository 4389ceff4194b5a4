//! Octree nodes.

use glam::Vec3;

use crate::culling::{Aabb, CullVolume};

/// Subdivision limits shared by every node of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OctreeSettings {
    /// Items a leaf holds before it splits.
    pub split_threshold: usize,
    /// Depth below which nodes never split.
    pub max_depth: u32,
}

impl Default for OctreeSettings {
    fn default() -> Self {
        Self { split_threshold: 8, max_depth: 6 }
    }
}

/// A node covering an axis-aligned region.
///
/// Holds the items that fit no single child. Once split, a node keeps its
/// 8 children for the rest of its life; [`OctreeNode::clear`] only drops
/// items so the node storage is reused by the next fill.
#[derive(Debug, Clone)]
pub struct OctreeNode<T> {
    bounds: Aabb,
    depth: u32,
    items: Vec<(T, Aabb)>,
    children: Option<Box<[OctreeNode<T>; 8]>>,
}

impl<T: Copy> OctreeNode<T> {
    /// Creates an empty leaf.
    #[must_use]
    pub fn new(bounds: Aabb, depth: u32) -> Self {
        Self { bounds, depth, items: Vec::new(), children: None }
    }

    /// Returns the region this node covers.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Returns the items stored directly at this node.
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[(T, Aabb)] {
        &self.items
    }

    /// Returns the children, if the node has split.
    #[inline]
    #[must_use]
    pub fn children(&self) -> Option<&[OctreeNode<T>; 8]> {
        self.children.as_deref()
    }

    /// Bounds of child `octant`.
    ///
    /// Bit 0 selects the +X half, bit 1 the +Y half, bit 2 the +Z half.
    #[must_use]
    pub fn child_bounds(&self, octant: usize) -> Aabb {
        let center = self.bounds.center();
        let pick = |bit: usize, lo: f32, mid: f32, hi: f32| {
            if octant & bit == 0 {
                (lo, mid)
            } else {
                (mid, hi)
            }
        };
        let (min_x, max_x) = pick(1, self.bounds.min.x, center.x, self.bounds.max.x);
        let (min_y, max_y) = pick(2, self.bounds.min.y, center.y, self.bounds.max.y);
        let (min_z, max_z) = pick(4, self.bounds.min.z, center.z, self.bounds.max.z);
        Aabb::new(Vec3::new(min_x, min_y, min_z), Vec3::new(max_x, max_y, max_z))
    }

    /// Inserts an item, pushing it as deep as a child fully contains it.
    pub fn insert(&mut self, item: T, aabb: Aabb, settings: &OctreeSettings) {
        if let Some(children) = self.children.as_deref_mut() {
            if let Some(child) = children.iter_mut().find(|child| child.bounds.contains(&aabb)) {
                child.insert(item, aabb, settings);
                return;
            }
        }

        self.items.push((item, aabb));
        if self.children.is_none()
            && self.items.len() > settings.split_threshold
            && self.depth < settings.max_depth
        {
            self.split(settings);
        }
    }

    /// Creates the 8 children and moves down every item that fits one.
    fn split(&mut self, settings: &OctreeSettings) {
        let depth = self.depth + 1;
        let children: [OctreeNode<T>; 8] =
            std::array::from_fn(|octant| OctreeNode::new(self.child_bounds(octant), depth));
        self.children = Some(Box::new(children));

        let items = std::mem::take(&mut self.items);
        for (item, aabb) in items {
            self.insert(item, aabb, settings);
        }
    }

    /// Drops every item in this subtree.
    pub fn clear(&mut self) {
        self.items.clear();
        if let Some(children) = self.children.as_deref_mut() {
            for child in children {
                child.clear();
            }
        }
    }

    /// Appends the items of every node intersecting `volume` to `out`.
    ///
    /// With `exact`, each item's own box must intersect the volume too;
    /// otherwise all items of an intersecting node are returned.
    pub fn retrieve<V>(&self, out: &mut Vec<T>, volume: &V, exact: bool)
    where
        V: CullVolume + ?Sized,
    {
        if !volume.intersects_aabb(&self.bounds) {
            return;
        }
        for (item, aabb) in &self.items {
            if !exact || volume.intersects_aabb(aabb) {
                out.push(*item);
            }
        }
        if let Some(children) = self.children.as_deref() {
            for child in children {
                child.retrieve(out, volume, exact);
            }
        }
    }

    /// Counts the items in this subtree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len() + self.children().map_or(0, |c| c.iter().map(OctreeNode::len).sum())
    }

    /// Returns true if the subtree holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts the nodes in this subtree, including this one.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children().map_or(0, |c| c.iter().map(OctreeNode::node_count).sum())
    }
}
