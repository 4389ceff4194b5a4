//! Voxels, chunk coordinates and chunk geometry containers.
//!
//! Chunks are 16x16x16 voxels - the unit of remeshing and spatial indexing.

use glam::{IVec3, Vec3};

use super::block::BlockId;
use crate::culling::Aabb;
use crate::mesh::VoxelFaceRenderable;

/// Chunk dimension - 16 voxels per axis.
pub const CHUNK_SIZE: i32 = 16;

/// A single voxel.
///
/// Immutable once placed; edits replace the whole value.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Voxel {
    block: BlockId,
}

impl Voxel {
    /// Empty voxel.
    pub const EMPTY: Self = Self { block: BlockId::AIR };

    /// Creates a voxel of the given block type.
    #[inline]
    #[must_use]
    pub const fn new(block: BlockId) -> Self {
        Self { block }
    }

    /// Returns the block type.
    #[inline]
    #[must_use]
    pub const fn block(self) -> BlockId {
        self.block
    }

    /// Returns true if this voxel is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.block.is_air()
    }

    /// Returns true if this voxel is occupied.
    #[inline]
    #[must_use]
    pub const fn is_solid(self) -> bool {
        !self.block.is_air()
    }
}

/// Chunk coordinate on the chunk grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkCoord {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
    /// Z coordinate.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Returns the chunk containing a voxel coordinate.
    #[inline]
    #[must_use]
    pub const fn from_voxel(voxel: IVec3) -> Self {
        Self::new(
            voxel.x.div_euclid(CHUNK_SIZE),
            voxel.y.div_euclid(CHUNK_SIZE),
            voxel.z.div_euclid(CHUNK_SIZE),
        )
    }

    /// Returns the voxel coordinate of the chunk's minimum corner.
    #[inline]
    #[must_use]
    pub const fn origin_voxel(self) -> IVec3 {
        IVec3::new(self.x * CHUNK_SIZE, self.y * CHUNK_SIZE, self.z * CHUNK_SIZE)
    }

    /// Returns the chunk coordinate as a vector.
    #[inline]
    #[must_use]
    pub const fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// Returns the neighboring chunk in `offset` direction.
    #[inline]
    #[must_use]
    pub const fn offset(self, offset: IVec3) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.z + offset.z)
    }
}

/// Meshed geometry of one chunk.
///
/// Owns up to one [`VoxelFaceRenderable`] per face direction plus the union
/// of their bounding boxes. Voxel data lives in the chunk map; a chunk only
/// exists in the engine while it has geometry.
#[derive(Debug)]
pub struct Chunk {
    /// The coordinate of this chunk on the chunk grid.
    coord: ChunkCoord,
    /// World-space position of the minimum corner.
    world_origin: Vec3,
    /// Face groups, at most one per direction.
    renderables: Vec<VoxelFaceRenderable>,
    /// Union of the face bounding boxes.
    bounds: Aabb,
}

impl Chunk {
    /// Creates an empty chunk.
    #[must_use]
    pub fn new(coord: ChunkCoord, voxel_scale: f32) -> Self {
        let world_origin = coord.origin_voxel().as_vec3() * voxel_scale;
        Self {
            coord,
            world_origin,
            renderables: Vec::with_capacity(6),
            bounds: Aabb::new(world_origin, world_origin),
        }
    }

    /// Returns the chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Returns the world-space minimum corner.
    #[inline]
    #[must_use]
    pub const fn world_origin(&self) -> Vec3 {
        self.world_origin
    }

    /// Returns the bounding box computed by the last [`Chunk::update_bounds`].
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Returns the face groups.
    #[inline]
    #[must_use]
    pub fn renderables(&self) -> &[VoxelFaceRenderable] {
        &self.renderables
    }

    /// Returns true when the chunk has no geometry.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }

    /// Returns the number of merged quads over all directions.
    #[must_use]
    pub fn quad_count(&self) -> usize {
        self.renderables.iter().map(VoxelFaceRenderable::quad_count).sum()
    }

    /// Adds a face group.
    pub fn add_face(&mut self, renderable: VoxelFaceRenderable) {
        debug_assert!(
            self.renderables.iter().all(|r| r.direction() != renderable.direction()),
            "one face group per direction"
        );
        self.renderables.push(renderable);
    }

    /// Drops all face groups, keeping their storage for reuse.
    pub fn clear_faces(&mut self) {
        self.renderables.clear();
    }

    /// Recomputes the bounding box from the face groups.
    pub fn update_bounds(&mut self) {
        let mut faces = self.renderables.iter();
        self.bounds = match faces.next() {
            Some(first) => faces.fold(first.bounds(), |acc, face| acc.union(&face.bounds())),
            None => Aabb::new(self.world_origin, self.world_origin),
        };
    }

    /// Releases all geometry memory.
    pub fn dispose(&mut self) {
        self.renderables = Vec::new();
        self.bounds = Aabb::new(self.world_origin, self.world_origin);
    }
}
