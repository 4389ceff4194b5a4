//! Greedy terrain builder.
//!
//! Converts the voxels of one chunk into merged quads, one face group per
//! direction.
//!
//! ## Algorithm
//!
//! For each of the 6 directions:
//! 1. Sweep slices of the chunk along the face normal
//! 2. Within a slice, sweep rows along the `v` axis
//! 3. Within a row, grow face parts along the `u` axis while faces join
//! 4. Stack each finished run onto the open part of the row below when
//!    both cover the same span; parts that were not continued are closed
//! 5. Close what is still open at the end of the slice
//!
//! A face is exposed when its voxel is solid and the neighbor it faces
//! does not occlude. Faces on the grid boundary are always exposed.

use forge_core::{PoolHandle, SlotPool};
use glam::IVec3;
use tracing::debug;

use super::part::FacePart;
use super::renderable::{FaceQuad, VoxelFaceRenderable};
use crate::voxel::{Chunk, ChunkMap, Direction, CHUNK_SIZE};

/// Parts kept warm in the pool between builds.
const INITIAL_PARTS: usize = 64;

/// Greedy mesher with reusable scratch state.
///
/// One builder meshes any number of chunks; its part pool and scratch
/// vectors are reused across builds and cleared on each use.
pub struct TerrainBuilder {
    /// Face accumulators.
    parts: SlotPool<FacePart>,
    /// Runs finished in the current row.
    row: Vec<PoolHandle>,
    /// Parts that may still absorb the next row.
    open: Vec<PoolHandle>,
    /// Parts continued or started in the current row.
    carried: Vec<PoolHandle>,
    /// Quads closed for the current direction.
    quads: Vec<FaceQuad>,
}

impl TerrainBuilder {
    /// Creates a builder with a warm part pool.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn new() -> Self {
        Self {
            parts: SlotPool::with_capacity(INITIAL_PARTS),
            row: Vec::with_capacity(CHUNK_SIZE as usize),
            open: Vec::with_capacity(CHUNK_SIZE as usize),
            carried: Vec::with_capacity(CHUNK_SIZE as usize),
            quads: Vec::new(),
        }
    }

    /// Remeshes `chunk` from the voxels in `map`.
    ///
    /// Replaces the chunk's face groups and returns the number of quads
    /// produced. Zero means the chunk has no visible geometry. Bounds are not
    /// updated here; call [`Chunk::update_bounds`] afterwards.
    pub fn build(&mut self, map: &ChunkMap, chunk: &mut Chunk) -> usize {
        chunk.clear_faces();
        if !map.contains_chunk(chunk.coord()) {
            return 0;
        }

        let origin = chunk.coord().origin_voxel();
        for direction in Direction::ALL {
            self.build_direction(map, origin, direction);
            if self.quads.is_empty() {
                continue;
            }
            let mut renderable = VoxelFaceRenderable::new(direction, map.voxel_scale());
            for quad in self.quads.drain(..) {
                renderable.push_quad(quad);
            }
            chunk.add_face(renderable);
        }
        debug_assert_eq!(self.parts.allocated_count(), 0, "every face part is released");

        let quads = chunk.quad_count();
        debug!("chunk {:?} meshed: {} quads", chunk.coord(), quads);
        quads
    }

    /// Drops all scratch memory.
    pub fn release(&mut self) {
        self.parts.purge();
        self.row = Vec::new();
        self.open = Vec::new();
        self.carried = Vec::new();
        self.quads = Vec::new();
    }

    /// Returns the number of pooled face parts.
    #[inline]
    #[must_use]
    pub fn pooled_parts(&self) -> usize {
        self.parts.capacity()
    }

    fn build_direction(&mut self, map: &ChunkMap, origin: IVec3, direction: Direction) {
        let (u, v) = direction.plane_axes();
        let n = direction.axis();
        // The last chunk on an axis may be cut short by the grid.
        let extent = (map.size() - origin).min(IVec3::splat(CHUNK_SIZE));

        for d in 0..extent[n.index()] {
            for j in 0..extent[v.index()] {
                let row_start = origin + n.unit() * d + v.unit() * j;
                self.sweep_row(map, direction, row_start, extent[u.index()]);
                self.stack_row();
            }
            close_parts(&mut self.parts, &mut self.quads, &mut self.open);
        }
    }

    /// Collects the runs of exposed faces in one row.
    fn sweep_row(&mut self, map: &ChunkMap, direction: Direction, row_start: IVec3, len: i32) {
        let (u, _) = direction.plane_axes();
        let normal = direction.normal();
        let mut current: Option<PoolHandle> = None;

        for i in 0..len {
            let pos = row_start + u.unit() * i;
            let voxel = map.get_voxel(pos);
            if voxel.is_empty() || map.is_occluding(pos + normal) {
                self.row.extend(current.take());
                continue;
            }

            let block = voxel.block();
            if let Some(handle) = current {
                if let Some(part) = self.parts.get_mut(handle) {
                    if let Some(axis) = part.can_join(block, pos) {
                        part.join(axis);
                        continue;
                    }
                }
                self.row.push(handle);
            }

            let handle = self.parts.acquire();
            if let Some(part) = self.parts.get_mut(handle) {
                part.begin(direction, block, pos, map.blocks().shape(block).mergeable());
            }
            current = Some(handle);
        }
        self.row.extend(current);
    }

    /// Stacks the finished row onto the open parts and closes the rest.
    fn stack_row(&mut self) {
        let mut row = std::mem::take(&mut self.row);
        for run_handle in row.drain(..) {
            let Some(run) = self.parts.get(run_handle).copied() else {
                continue;
            };
            let parts = &self.parts;
            let target = self
                .open
                .iter()
                .position(|&h| parts.get(h).is_some_and(|part| part.can_stack(&run)));

            if let Some(index) = target {
                let handle = self.open.swap_remove(index);
                if let Some(part) = self.parts.get_mut(handle) {
                    part.stack(&run);
                }
                self.parts.release(run_handle);
                self.carried.push(handle);
            } else {
                self.carried.push(run_handle);
            }
        }
        self.row = row;

        close_parts(&mut self.parts, &mut self.quads, &mut self.open);
        std::mem::swap(&mut self.open, &mut self.carried);
    }
}

/// Turns parts into quads and returns them to the pool.
fn close_parts(
    parts: &mut SlotPool<FacePart>,
    quads: &mut Vec<FaceQuad>,
    handles: &mut Vec<PoolHandle>,
) {
    for handle in handles.drain(..) {
        if let Some(part) = parts.get(handle) {
            if !part.is_empty() {
                quads.push(FaceQuad {
                    direction: part.direction,
                    block: part.block,
                    origin: part.origin,
                    width: part.width,
                    height: part.height,
                });
            }
        }
        parts.release(handle);
    }
}

impl Default for TerrainBuilder {
    fn default() -> Self {
        Self::new()
    }
}
