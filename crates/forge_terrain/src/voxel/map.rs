//! Chunk map - the voxel grid.
//!
//! Owns every voxel of a fixed-size world, partitioned into cubic chunks,
//! and the queue of chunks waiting to be remeshed. Every mutation marks the
//! chunks whose geometry depends on the edited voxel.

use std::collections::HashSet;

use glam::{IVec3, Vec3};

use super::block::BlockRegistry;
use super::chunk::{ChunkCoord, Voxel, CHUNK_SIZE};
use crate::culling::Aabb;
use crate::error::{TerrainError, TerrainResult};

/// Voxel grid partitioned into chunks.
///
/// Bounds are fixed at construction. Reads outside the grid return
/// [`Voxel::EMPTY`]; writes outside the grid are ignored.
#[derive(Debug, Clone)]
pub struct ChunkMap {
    /// Voxels along X, Y, Z.
    size: IVec3,
    /// World units per voxel.
    voxel_scale: f32,
    /// Voxel storage.
    /// Layout: voxels[z * width * height + y * width + x]
    voxels: Vec<Voxel>,
    /// Block type table.
    blocks: BlockRegistry,
    /// Chunks along X, Y, Z (last chunk on an axis may be partial).
    chunks_per_axis: IVec3,
    /// Pending rebuilds, drained from the back.
    rebuild_stack: Vec<ChunkCoord>,
    /// Membership of `rebuild_stack`, keeps enqueueing idempotent.
    rebuild_set: HashSet<ChunkCoord>,
}

impl ChunkMap {
    /// Creates an empty grid of `width x height x depth` voxels.
    ///
    /// # Errors
    ///
    /// Fails if any axis is zero, too large to index, or the scale is not a
    /// positive finite number.
    pub fn new(
        width: u32,
        height: u32,
        depth: u32,
        voxel_scale: f32,
        blocks: BlockRegistry,
    ) -> TerrainResult<Self> {
        let invalid = || TerrainError::InvalidDimensions { width, height, depth };
        if width == 0 || height == 0 || depth == 0 {
            return Err(invalid());
        }
        if !(voxel_scale.is_finite() && voxel_scale > 0.0) {
            return Err(TerrainError::InvalidConfig {
                field: "voxel_scale",
                reason: format!("must be a positive number, got {voxel_scale}"),
            });
        }

        let size = IVec3::new(
            i32::try_from(width).map_err(|_| invalid())?,
            i32::try_from(height).map_err(|_| invalid())?,
            i32::try_from(depth).map_err(|_| invalid())?,
        );
        let volume = usize::try_from(u64::from(width) * u64::from(height) * u64::from(depth))
            .map_err(|_| invalid())?;
        let chunks_per_axis = (size + IVec3::splat(CHUNK_SIZE - 1)) / CHUNK_SIZE;

        Ok(Self {
            size,
            voxel_scale,
            voxels: vec![Voxel::EMPTY; volume],
            blocks,
            chunks_per_axis,
            rebuild_stack: Vec::new(),
            rebuild_set: HashSet::new(),
        })
    }

    /// Returns the grid size in voxels.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> IVec3 {
        self.size
    }

    /// Returns world units per voxel.
    #[inline]
    #[must_use]
    pub const fn voxel_scale(&self) -> f32 {
        self.voxel_scale
    }

    /// Returns the block type table.
    #[inline]
    #[must_use]
    pub const fn blocks(&self) -> &BlockRegistry {
        &self.blocks
    }

    /// Returns the number of chunks along each axis.
    #[inline]
    #[must_use]
    pub const fn chunks_per_axis(&self) -> IVec3 {
        self.chunks_per_axis
    }

    /// Returns the world-space box covering the whole grid.
    #[must_use]
    pub fn world_bounds(&self) -> Aabb {
        Aabb::new(Vec3::ZERO, self.size.as_vec3() * self.voxel_scale)
    }

    /// Returns true if the voxel coordinate is inside the grid.
    #[inline]
    #[must_use]
    pub fn contains(&self, pos: IVec3) -> bool {
        pos.cmpge(IVec3::ZERO).all() && pos.cmplt(self.size).all()
    }

    /// Returns true if the chunk coordinate covers part of the grid.
    #[inline]
    #[must_use]
    pub fn contains_chunk(&self, coord: ChunkCoord) -> bool {
        let c = coord.as_ivec3();
        c.cmpge(IVec3::ZERO).all() && c.cmplt(self.chunks_per_axis).all()
    }

    #[inline]
    #[allow(clippy::cast_sign_loss)]
    fn index(&self, pos: IVec3) -> usize {
        debug_assert!(self.contains(pos));
        // In-bounds coordinates are non-negative.
        (pos.z as usize * self.size.y as usize + pos.y as usize) * self.size.x as usize
            + pos.x as usize
    }

    /// Gets a voxel, or [`Voxel::EMPTY`] outside the grid.
    #[inline]
    #[must_use]
    pub fn get_voxel(&self, pos: IVec3) -> Voxel {
        if self.contains(pos) {
            self.voxels[self.index(pos)]
        } else {
            Voxel::EMPTY
        }
    }

    /// Returns true if the voxel is occupied. False outside the grid.
    #[inline]
    #[must_use]
    pub fn is_solid(&self, pos: IVec3) -> bool {
        self.get_voxel(pos).is_solid()
    }

    /// Returns true if the voxel hides the adjoining faces of its neighbors.
    #[inline]
    #[must_use]
    pub fn is_occluding(&self, pos: IVec3) -> bool {
        let voxel = self.get_voxel(pos);
        voxel.is_solid() && self.blocks.shape(voxel.block()).occlusion
    }

    /// Writes a voxel and queues every chunk whose mesh depends on it.
    ///
    /// The owning chunk is always queued; a voxel on a chunk face also
    /// queues the chunk across that face. Returns false (and does nothing)
    /// outside the grid.
    pub fn set_voxel(&mut self, pos: IVec3, voxel: Voxel) -> bool {
        if !self.contains(pos) {
            return false;
        }
        let index = self.index(pos);
        self.voxels[index] = voxel;

        let coord = ChunkCoord::from_voxel(pos);
        self.enqueue_rebuild(coord);

        let local = pos - coord.origin_voxel();
        for axis in 0..3 {
            let mut step = IVec3::ZERO;
            if local[axis] == 0 {
                step[axis] = -1;
                self.enqueue_rebuild(coord.offset(step));
            } else if local[axis] == CHUNK_SIZE - 1 {
                step[axis] = 1;
                self.enqueue_rebuild(coord.offset(step));
            }
        }
        true
    }

    /// Fills the inclusive box `min..=max` (clamped to the grid).
    ///
    /// Returns the number of voxels written.
    pub fn fill(&mut self, min: IVec3, max: IVec3, voxel: Voxel) -> usize {
        let lo = min.max(IVec3::ZERO);
        let hi = max.min(self.size - IVec3::ONE);
        let mut written = 0;
        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    if self.set_voxel(IVec3::new(x, y, z), voxel) {
                        written += 1;
                    }
                }
            }
        }
        written
    }

    /// Covers the bottom layer of the grid with `voxel`.
    pub fn build_floor(&mut self, voxel: Voxel) -> usize {
        let max = IVec3::new(self.size.x - 1, 0, self.size.z - 1);
        self.fill(IVec3::ZERO, max, voxel)
    }

    /// Converts a world position to the voxel containing it.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn world_to_local_voxel(&self, world: Vec3) -> IVec3 {
        (world / self.voxel_scale).floor().as_ivec3()
    }

    /// Returns the world position of a voxel's minimum corner.
    #[inline]
    #[must_use]
    pub fn voxel_to_world(&self, pos: IVec3) -> Vec3 {
        pos.as_vec3() * self.voxel_scale
    }

    /// Queues a chunk for remeshing.
    ///
    /// Returns true if the chunk was newly queued. Chunks outside the grid
    /// are ignored.
    pub fn enqueue_rebuild(&mut self, coord: ChunkCoord) -> bool {
        if !self.contains_chunk(coord) || !self.rebuild_set.insert(coord) {
            return false;
        }
        self.rebuild_stack.push(coord);
        true
    }

    /// Queues every chunk of the grid.
    pub fn enqueue_all(&mut self) {
        let coords: Vec<ChunkCoord> = self.chunk_coords().collect();
        for coord in coords {
            self.enqueue_rebuild(coord);
        }
    }

    /// Takes the next chunk to rebuild. Order is unspecified.
    pub fn pop_rebuild(&mut self) -> Option<ChunkCoord> {
        let coord = self.rebuild_stack.pop()?;
        self.rebuild_set.remove(&coord);
        Some(coord)
    }

    /// Returns the number of queued chunks.
    #[inline]
    #[must_use]
    pub fn pending_rebuilds(&self) -> usize {
        self.rebuild_stack.len()
    }

    /// Returns true if the chunk is queued for remeshing.
    #[inline]
    #[must_use]
    pub fn is_dirty(&self, coord: ChunkCoord) -> bool {
        self.rebuild_set.contains(&coord)
    }

    /// Iterates over every chunk coordinate of the grid.
    pub fn chunk_coords(&self) -> impl Iterator<Item = ChunkCoord> {
        let n = self.chunks_per_axis;
        (0..n.z).flat_map(move |z| {
            (0..n.y).flat_map(move |y| (0..n.x).map(move |x| ChunkCoord::new(x, y, z)))
        })
    }
}
