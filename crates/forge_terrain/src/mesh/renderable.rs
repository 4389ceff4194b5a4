//! Renderable face geometry.
//!
//! A chunk owns one [`VoxelFaceRenderable`] per direction that has visible
//! faces. Each holds the merged quads of that direction together with the
//! vertex and index data an external renderer uploads as-is.

use bytemuck::{Pod, Zeroable};
use glam::{IVec3, Vec2, Vec3};

use crate::culling::Aabb;
use crate::voxel::{BlockId, Direction};

/// Vertex layout of terrain meshes.
///
/// 36 bytes, no padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Outward face normal.
    pub normal: [f32; 3],
    /// Texture coordinates, repeating once per voxel.
    pub uv: [f32; 2],
    /// Block type for texture lookup.
    pub block: u32,
}

/// One merged rectangle of faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceQuad {
    /// Outward direction.
    pub direction: Direction,
    /// Block type.
    pub block: BlockId,
    /// Voxel holding the minimum corner face.
    pub origin: IVec3,
    /// Extent along the direction's `u` axis, in voxels.
    pub width: u32,
    /// Extent along the direction's `v` axis, in voxels.
    pub height: u32,
}

impl FaceQuad {
    /// Returns the texture repeat of the quad.
    ///
    /// Always the extent along the face's own `(u, v)` axes, so a texture
    /// tiles once per voxel regardless of the face direction.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn uv_scale(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Returns the four world-space corners in `(0,0) (w,0) (w,h) (0,h)` order.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn corners(&self, voxel_scale: f32) -> [Vec3; 4] {
        let (u, v) = self.direction.plane_axes();
        let mut base = self.origin.as_vec3();
        if self.direction.is_positive() {
            base += self.direction.normal_f32();
        }
        let du = u.unit().as_vec3() * self.width as f32;
        let dv = v.unit().as_vec3() * self.height as f32;
        [base, base + du, base + du + dv, base + dv].map(|corner| corner * voxel_scale)
    }

    /// Returns the world-space box of the quad (flat along the normal).
    #[must_use]
    pub fn bounds(&self, voxel_scale: f32) -> Aabb {
        let [a, _, c, _] = self.corners(voxel_scale);
        Aabb::new(a.min(c), a.max(c))
    }

    /// Number of unit faces merged into the quad.
    #[inline]
    #[must_use]
    pub const fn area(&self) -> u32 {
        self.width * self.height
    }
}

/// All visible faces of one chunk pointing in one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelFaceRenderable {
    direction: Direction,
    voxel_scale: f32,
    quads: Vec<FaceQuad>,
    vertices: Vec<TerrainVertex>,
    indices: Vec<u32>,
    bounds: Aabb,
}

impl VoxelFaceRenderable {
    /// Creates an empty face group.
    #[must_use]
    pub fn new(direction: Direction, voxel_scale: f32) -> Self {
        Self {
            direction,
            voxel_scale,
            quads: Vec::new(),
            vertices: Vec::new(),
            indices: Vec::new(),
            bounds: Aabb::default(),
        }
    }

    /// Appends a quad and its geometry.
    ///
    /// # Panics
    ///
    /// Debug builds panic if the quad faces another direction or is empty.
    #[allow(clippy::cast_possible_truncation)]
    pub fn push_quad(&mut self, quad: FaceQuad) {
        debug_assert_eq!(quad.direction, self.direction, "quad direction must match its group");
        debug_assert!(quad.area() > 0, "closed face part has no extent");

        let corners = quad.corners(self.voxel_scale);
        let uv = quad.uv_scale();
        let uvs = [[0.0, 0.0], [uv.x, 0.0], [uv.x, uv.y], [0.0, uv.y]];
        let normal = self.direction.normal_f32().to_array();

        let base = self.vertices.len() as u32;
        for (corner, uv) in corners.iter().zip(uvs) {
            self.vertices.push(TerrainVertex {
                position: corner.to_array(),
                normal,
                uv,
                block: u32::from(quad.block.0),
            });
        }

        // Counter-clockwise seen from outside.
        let (u, v) = self.direction.plane_axes();
        let winding = u.unit().as_vec3().cross(v.unit().as_vec3());
        let ccw = winding.dot(self.direction.normal_f32()) > 0.0;
        let order: [u32; 6] = if ccw { [0, 1, 2, 0, 2, 3] } else { [0, 2, 1, 0, 3, 2] };
        self.indices.extend(order.iter().map(|i| base + i));

        let quad_bounds = quad.bounds(self.voxel_scale);
        self.bounds =
            if self.quads.is_empty() { quad_bounds } else { self.bounds.union(&quad_bounds) };
        self.quads.push(quad);
    }

    /// Returns the outward direction.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the union of the quad boxes.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Returns the merged quads.
    #[inline]
    #[must_use]
    pub fn quads(&self) -> &[FaceQuad] {
        &self.quads
    }

    /// Returns the number of merged quads.
    #[inline]
    #[must_use]
    pub fn quad_count(&self) -> usize {
        self.quads.len()
    }

    /// Returns true when the group has no quads.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Returns the vertices, four per quad.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    /// Returns the triangle indices, six per quad.
    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Returns the vertex buffer as raw bytes.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Returns the index buffer as raw bytes.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Iterates over the triangles as world-space vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        let position = |i: u32| Vec3::from_array(self.vertices[i as usize].position);
        self.indices
            .chunks_exact(3)
            .map(move |tri| [position(tri[0]), position(tri[1]), position(tri[2])])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(direction: Direction, width: u32, height: u32) -> FaceQuad {
        FaceQuad { direction, block: BlockId::STONE, origin: IVec3::new(1, 2, 3), width, height }
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<TerrainVertex>(), 36);
    }

    #[test]
    fn test_positive_faces_sit_on_far_side() {
        let top = quad(Direction::Top, 1, 1).bounds(1.0);
        assert_eq!(top.min, Vec3::new(1.0, 3.0, 3.0));
        assert_eq!(top.max, Vec3::new(2.0, 3.0, 4.0));

        let bottom = quad(Direction::Bottom, 1, 1).bounds(1.0);
        assert_eq!(bottom.min.y, 2.0);
    }

    #[test]
    fn test_uv_scale_follows_face_axes() {
        // Right faces: u = Z, v = Y. Width 4 spans Z, height 2 spans Y.
        let q = quad(Direction::Right, 4, 2);
        assert_eq!(q.uv_scale(), Vec2::new(4.0, 2.0));
        let b = q.bounds(1.0);
        assert_eq!(b.max - b.min, Vec3::new(0.0, 2.0, 4.0));
    }

    #[test]
    fn test_winding_faces_outward() {
        for direction in Direction::ALL {
            let mut group = VoxelFaceRenderable::new(direction, 1.0);
            group.push_quad(quad(direction, 2, 3));
            for [a, b, c] in group.triangles() {
                let n = (b - a).cross(c - a).normalize();
                assert!((n - direction.normal_f32()).length() < 1e-5, "{direction:?}");
            }
        }
    }

    #[test]
    fn test_buffers_grow_per_quad() {
        let mut group = VoxelFaceRenderable::new(Direction::Front, 2.0);
        group.push_quad(quad(Direction::Front, 1, 1));
        group.push_quad(FaceQuad { origin: IVec3::new(5, 2, 3), ..quad(Direction::Front, 1, 1) });

        assert_eq!(group.quad_count(), 2);
        assert_eq!(group.vertices().len(), 8);
        assert_eq!(group.indices().len(), 12);
        assert_eq!(group.vertex_bytes().len(), 8 * 36);
        assert_eq!(group.index_bytes().len(), 12 * 4);
        assert_eq!(group.bounds().min, Vec3::new(2.0, 4.0, 8.0));
        assert_eq!(group.bounds().max, Vec3::new(12.0, 6.0, 8.0));
    }
}
