//! Frustum culling for view-dependent visibility.
//!
//! Extracts frustum planes from the view-projection matrix and tests
//! bounding volumes against them.

use glam::{Mat4, Vec3, Vec4};

use super::bounds::Aabb;

/// A volume that bounding boxes can be tested against.
///
/// Implemented by [`Frustum`] for visibility retrieval and by [`Aabb`] for
/// region queries.
pub trait CullVolume {
    /// Returns true if the box is at least partially inside the volume.
    fn intersects_aabb(&self, aabb: &Aabb) -> bool;
}

/// A plane in 3D space (`normal . p + d = 0`), normal pointing inside.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Plane {
    /// Unit normal.
    pub normal: Vec3,
    /// Distance from origin.
    pub d: f32,
}

impl Plane {
    /// Builds a normalized plane from `(a, b, c, d)` coefficients.
    #[must_use]
    pub fn from_coefficients(v: Vec4) -> Self {
        let normal = v.truncate();
        let len = normal.length();
        if len > 0.0 {
            Self { normal: normal / len, d: v.w / len }
        } else {
            Self { normal, d: v.w }
        }
    }

    /// Returns the signed distance from a point to the plane.
    #[inline]
    #[must_use]
    pub fn distance_to_point(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }
}

/// View frustum for culling.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frustum {
    /// Left, right, bottom, top, near, far planes.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Left plane index.
    pub const LEFT: usize = 0;
    /// Right plane index.
    pub const RIGHT: usize = 1;
    /// Bottom plane index.
    pub const BOTTOM: usize = 2;
    /// Top plane index.
    pub const TOP: usize = 3;
    /// Near plane index.
    pub const NEAR: usize = 4;
    /// Far plane index.
    pub const FAR: usize = 5;

    /// Extracts frustum planes from a view-projection matrix.
    ///
    /// Expects an OpenGL-style clip space (`-w <= z <= w`), as produced by
    /// [`Mat4::perspective_rh_gl`].
    #[must_use]
    pub fn from_view_projection(m: &Mat4) -> Self {
        let (r0, r1, r2, r3) = (m.row(0), m.row(1), m.row(2), m.row(3));
        let mut planes = [Plane::default(); 6];

        planes[Self::LEFT] = Plane::from_coefficients(r3 + r0);
        planes[Self::RIGHT] = Plane::from_coefficients(r3 - r0);
        planes[Self::BOTTOM] = Plane::from_coefficients(r3 + r1);
        planes[Self::TOP] = Plane::from_coefficients(r3 - r1);
        planes[Self::NEAR] = Plane::from_coefficients(r3 + r2);
        planes[Self::FAR] = Plane::from_coefficients(r3 - r2);

        Self { planes }
    }

    /// Tests if an AABB is visible (intersects the frustum).
    ///
    /// Conservative: boxes near frustum corners may pass.
    #[must_use]
    pub fn test_aabb(&self, aabb: &Aabb) -> bool {
        let center = aabb.center();
        let half = aabb.half_extents();

        for plane in &self.planes {
            // Compute the projection interval radius
            let r = half.dot(plane.normal.abs());

            // If distance is less than -radius, AABB is outside
            if plane.distance_to_point(center) < -r {
                return false;
            }
        }

        true
    }
}

impl CullVolume for Frustum {
    #[inline]
    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.test_aabb(aabb)
    }
}

impl CullVolume for Aabb {
    #[inline]
    fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        self.overlaps(aabb)
    }
}
