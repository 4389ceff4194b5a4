//! Ray picking against the voxel grid and visible faces.

use glam::{IVec3, Vec3};
use serde::Deserialize;

use crate::culling::Aabb;
use crate::voxel::ChunkMap;

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, normalizing `direction`.
    ///
    /// Returns `None` for a zero or non-finite direction.
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    /// Creates a ray from `origin` through `target`.
    #[must_use]
    pub fn through(origin: Vec3, target: Vec3) -> Option<Self> {
        Self::new(origin, target - origin)
    }

    /// Point at distance `t` along the ray.
    #[inline]
    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to a triangle, if the ray crosses it.
    ///
    /// Both windings count as hits.
    #[must_use]
    pub fn intersect_triangle(&self, [a, b, c]: [Vec3; 3]) -> Option<f32> {
        const EPSILON: f32 = 1e-6;

        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(q) * inv_det;
        (t >= 0.0).then_some(t)
    }
}

/// How [`pick_voxel`] walks the ray.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickMode {
    /// Visit every voxel the ray crosses, in order. Exact.
    #[default]
    Traversal,
    /// Sample the ray at a fixed step. Thin features may be skipped.
    Stepped,
}

/// Result of a voxel pick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// The solid voxel hit.
    pub voxel: IVec3,
    /// World distance from the ray origin to where the voxel was found.
    pub distance: f32,
    /// The voxel visited just before the hit, where a new block would go.
    /// `None` when the hit is the first voxel visited: the ray starts inside
    /// it, or enters the grid through it.
    pub adjacent: Option<IVec3>,
}

/// Finds the first solid voxel along `ray` within `max_distance`.
///
/// Only the part of the ray inside the grid is walked, so an unbounded
/// `max_distance` such as `f32::MAX` is fine. `step` is only used by
/// [`PickMode::Stepped`]. Returns `None` on a miss, for a negative or
/// non-finite `max_distance` and for a non-positive step.
#[must_use]
pub fn pick_voxel(
    map: &ChunkMap,
    ray: &Ray,
    max_distance: f32,
    mode: PickMode,
    step: f32,
) -> Option<PickHit> {
    if !(max_distance.is_finite() && max_distance >= 0.0) {
        return None;
    }
    match mode {
        PickMode::Traversal => traverse(map, ray, max_distance),
        PickMode::Stepped => march(map, ray, max_distance, step),
    }
}

/// Amanatides-Woo voxel traversal, clipped to the grid.
#[allow(clippy::cast_possible_truncation)]
fn traverse(map: &ChunkMap, ray: &Ray, max_distance: f32) -> Option<PickHit> {
    let scale = map.voxel_scale();
    let origin = ray.origin / scale;
    let dir = ray.direction;

    let grid = Aabb::new(Vec3::ZERO, map.size().as_vec3());
    let (enter, exit) = grid.ray_interval(origin, dir)?;
    let max_t = exit.min(max_distance / scale);
    if enter > max_t {
        return None;
    }

    // The entry point lies on the grid surface; keep the first voxel inside.
    let start = origin + dir * enter;
    let mut voxel = start.floor().as_ivec3().clamp(IVec3::ZERO, map.size() - IVec3::ONE);
    let step = IVec3::new(
        if dir.x > 0.0 { 1 } else { -1 },
        if dir.y > 0.0 { 1 } else { -1 },
        if dir.z > 0.0 { 1 } else { -1 },
    );
    let t_delta = Vec3::new(
        if dir.x == 0.0 { f32::INFINITY } else { dir.x.abs().recip() },
        if dir.y == 0.0 { f32::INFINITY } else { dir.y.abs().recip() },
        if dir.z == 0.0 { f32::INFINITY } else { dir.z.abs().recip() },
    );
    let boundary = |axis: usize| {
        let v = voxel[axis] as f32;
        if dir[axis] == 0.0 {
            f32::INFINITY
        } else if dir[axis] > 0.0 {
            (v + 1.0 - origin[axis]) * t_delta[axis]
        } else {
            (origin[axis] - v) * t_delta[axis]
        }
    };
    let mut t_max = Vec3::new(boundary(0), boundary(1), boundary(2));

    let mut t = enter;
    let mut previous = None;
    // Every step moves one voxel along one axis, so the walk leaves the grid.
    while map.contains(voxel) {
        if map.is_solid(voxel) {
            return Some(PickHit { voxel, distance: t * scale, adjacent: previous });
        }

        let axis = if t_max.x < t_max.y {
            if t_max.x < t_max.z { 0 } else { 2 }
        } else if t_max.y < t_max.z {
            1
        } else {
            2
        };
        t = t_max[axis];
        if t > max_t {
            return None;
        }
        previous = Some(voxel);
        voxel[axis] += step[axis];
        t_max[axis] += t_delta[axis];
    }
    None
}

/// Fixed-step march, sampling every `step` world units inside the grid.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn march(map: &ChunkMap, ray: &Ray, max_distance: f32, step: f32) -> Option<PickHit> {
    if !(step.is_finite() && step > 0.0) {
        return None;
    }
    let (enter, exit) = map.world_bounds().ray_interval(ray.origin, ray.direction)?;
    let end = exit.min(max_distance);
    if enter > end {
        return None;
    }
    // Samples stay on multiples of `step` from the origin.
    let first = (enter / step).ceil() as u32;
    let last = (end / step).floor() as u32;

    let mut previous: Option<IVec3> = None;
    for i in first..=last {
        let t = i as f32 * step;
        let voxel = map.world_to_local_voxel(ray.at(t));
        if previous == Some(voxel) {
            continue;
        }
        if map.is_solid(voxel) {
            return Some(PickHit { voxel, distance: t, adjacent: previous });
        }
        previous = Some(voxel);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::{BlockId, BlockRegistry, Voxel};

    fn map_with_target(scale: f32) -> ChunkMap {
        let mut map = ChunkMap::new(32, 16, 32, scale, BlockRegistry::default()).unwrap();
        map.set_voxel(IVec3::new(10, 2, 2), Voxel::new(BlockId::STONE));
        map
    }

    fn ray_along_x() -> Ray {
        Ray::new(Vec3::new(0.5, 2.5, 2.5), Vec3::X).unwrap()
    }

    #[test]
    fn test_zero_direction_is_rejected() {
        assert!(Ray::new(Vec3::ZERO, Vec3::ZERO).is_none());
        assert!(Ray::through(Vec3::ONE, Vec3::ONE).is_none());
    }

    #[test]
    fn test_traversal_hits_within_range() {
        let map = map_with_target(1.0);
        let hit = pick_voxel(&map, &ray_along_x(), 20.0, PickMode::Traversal, 0.1).unwrap();
        assert_eq!(hit.voxel, IVec3::new(10, 2, 2));
        assert_eq!(hit.adjacent, Some(IVec3::new(9, 2, 2)));
        assert!((hit.distance - 9.5).abs() < 1e-4);
    }

    #[test]
    fn test_traversal_misses_beyond_range() {
        let map = map_with_target(1.0);
        assert!(pick_voxel(&map, &ray_along_x(), 9.0, PickMode::Traversal, 0.1).is_none());
    }

    #[test]
    fn test_stepped_matches_traversal_on_thick_target() {
        let map = map_with_target(1.0);
        let hit = pick_voxel(&map, &ray_along_x(), 20.0, PickMode::Stepped, 0.1).unwrap();
        assert_eq!(hit.voxel, IVec3::new(10, 2, 2));
        assert_eq!(hit.adjacent, Some(IVec3::new(9, 2, 2)));
        assert!(hit.distance >= 9.5 && hit.distance < 9.7);

        assert!(pick_voxel(&map, &ray_along_x(), 9.0, PickMode::Stepped, 0.1).is_none());
    }

    #[test]
    fn test_traversal_respects_voxel_scale() {
        let map = map_with_target(2.0);
        let ray = Ray::new(Vec3::new(1.0, 5.0, 5.0), Vec3::X).unwrap();
        let hit = pick_voxel(&map, &ray, 40.0, PickMode::Traversal, 0.1).unwrap();
        assert_eq!(hit.voxel, IVec3::new(10, 2, 2));
        assert!((hit.distance - 19.0).abs() < 1e-4);
    }

    #[test]
    fn test_diagonal_ray_finds_target() {
        let mut map = ChunkMap::new(16, 16, 16, 1.0, BlockRegistry::default()).unwrap();
        map.set_voxel(IVec3::new(5, 5, 5), Voxel::new(BlockId::DIRT));
        let ray = Ray::through(Vec3::splat(0.5), Vec3::splat(5.5)).unwrap();
        let hit = pick_voxel(&map, &ray, 100.0, PickMode::Traversal, 0.1).unwrap();
        assert_eq!(hit.voxel, IVec3::splat(5));
    }

    #[test]
    fn test_start_inside_solid() {
        let map = map_with_target(1.0);
        let ray = Ray::new(Vec3::new(10.5, 2.5, 2.5), Vec3::Y).unwrap();
        let hit = pick_voxel(&map, &ray, 5.0, PickMode::Traversal, 0.1).unwrap();
        assert_eq!(hit.distance, 0.0);
        assert_eq!(hit.adjacent, None);
    }

    #[test]
    fn test_invalid_limits_miss() {
        let map = map_with_target(1.0);
        let ray = ray_along_x();
        assert!(pick_voxel(&map, &ray, f32::NAN, PickMode::Traversal, 0.1).is_none());
        assert!(pick_voxel(&map, &ray, -1.0, PickMode::Traversal, 0.1).is_none());
        assert!(pick_voxel(&map, &ray, 20.0, PickMode::Stepped, 0.0).is_none());
    }

    #[test]
    fn test_unbounded_distance_ends_at_grid_edge() {
        let map = map_with_target(1.0);
        let away = Ray::new(Vec3::new(8.5, 8.5, 8.5), Vec3::NEG_X).unwrap();
        let outward = Ray::new(Vec3::new(-4.0, 2.5, 2.5), Vec3::NEG_X).unwrap();
        for mode in [PickMode::Traversal, PickMode::Stepped] {
            assert!(pick_voxel(&map, &away, f32::MAX, mode, 0.1).is_none(), "{mode:?}");
            assert!(pick_voxel(&map, &away, 1.0e8, mode, 0.1).is_none(), "{mode:?}");
            assert!(pick_voxel(&map, &outward, f32::MAX, mode, 0.1).is_none(), "{mode:?}");

            let hit = pick_voxel(&map, &ray_along_x(), f32::MAX, mode, 0.1).unwrap();
            assert_eq!(hit.voxel, IVec3::new(10, 2, 2), "{mode:?}");
        }
    }

    #[test]
    fn test_ray_from_outside_enters_grid() {
        let map = map_with_target(1.0);
        let ray = Ray::new(Vec3::new(-100.0, 2.5, 2.5), Vec3::X).unwrap();

        let hit = pick_voxel(&map, &ray, f32::MAX, PickMode::Traversal, 0.1).unwrap();
        assert_eq!(hit.voxel, IVec3::new(10, 2, 2));
        assert!((hit.distance - 110.0).abs() < 1e-3);
        assert_eq!(hit.adjacent, Some(IVec3::new(9, 2, 2)));

        let hit = pick_voxel(&map, &ray, f32::MAX, PickMode::Stepped, 0.1).unwrap();
        assert_eq!(hit.voxel, IVec3::new(10, 2, 2));

        // Range ends before the grid.
        assert!(pick_voxel(&map, &ray, 99.0, PickMode::Traversal, 0.1).is_none());
        assert!(pick_voxel(&map, &ray, 99.0, PickMode::Stepped, 0.1).is_none());
    }

    #[test]
    fn test_ray_triangle() {
        let ray = Ray::new(Vec3::new(0.25, 0.25, 5.0), Vec3::NEG_Z).unwrap();
        let tri = [Vec3::ZERO, Vec3::X, Vec3::Y];
        assert!((ray.intersect_triangle(tri).unwrap() - 5.0).abs() < 1e-5);

        let away = Ray::new(Vec3::new(0.25, 0.25, 5.0), Vec3::Z).unwrap();
        assert!(away.intersect_triangle(tri).is_none());
        let beside = Ray::new(Vec3::new(2.0, 2.0, 5.0), Vec3::NEG_Z).unwrap();
        assert!(beside.intersect_triangle(tri).is_none());
    }
}
