//! Cameras the terrain culls against.
//!
//! The engine never renders; it only needs a position, a view direction and
//! a frustum. [`GameCamera`] bundles the player camera with an optional
//! frozen debug camera so the culling result can be inspected from outside.

use glam::{Mat4, Vec3};

use super::frustum::Frustum;

/// Widest field of view a widened camera may reach.
const MAX_FOV_DEGREES: f32 = 179.0;

/// Squared sine of the smallest angle allowed between view and up vectors.
const PARALLEL_EPSILON: f32 = 1e-6;

/// Returns `up`, or a perpendicular substitute when `direction` runs along it.
fn stable_up(direction: Vec3, up: Vec3) -> Vec3 {
    if direction.cross(up).length_squared() > PARALLEL_EPSILON {
        up
    } else if up.z.abs() < 0.9 {
        Vec3::Z
    } else {
        Vec3::X
    }
}

/// Perspective camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye position in world space.
    pub position: Vec3,
    /// Unit view direction.
    pub direction: Vec3,
    /// Unit up vector. Replaced by a perpendicular axis while the camera
    /// looks straight along it.
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Viewport width / height.
    pub aspect: f32,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
}

impl Camera {
    /// Creates a camera at `position` looking along `direction`.
    ///
    /// Up is `+Y`, or `+Z` for a camera looking straight up or down.
    #[must_use]
    pub fn new(position: Vec3, direction: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        let direction = direction.normalize_or(Vec3::NEG_Z);
        Self {
            position,
            direction,
            up: stable_up(direction, Vec3::Y),
            fov_y_degrees,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Creates a camera at `position` looking at `target`.
    #[must_use]
    pub fn looking_at(position: Vec3, target: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        Self::new(position, target - position, fov_y_degrees, aspect)
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        // Fields are public; guard against a direction edited onto the up axis.
        Mat4::look_to_rh(self.position, self.direction, stable_up(self.direction, self.up))
    }

    /// Returns the projection matrix (OpenGL clip space).
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Returns the view frustum.
    #[must_use]
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection())
    }

    /// Returns a copy with the field of view widened by `margin` degrees.
    #[must_use]
    pub fn widened(&self, margin: f32) -> Self {
        Self { fov_y_degrees: (self.fov_y_degrees + margin).min(MAX_FOV_DEGREES), ..*self }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::NEG_Z, 67.0, 16.0 / 9.0)
    }
}

/// Which camera drives culling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// Cull against the player camera.
    #[default]
    Normal,
    /// Cull against the debug camera, if one is set.
    Debug,
}

/// The player camera plus an optional debug camera.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GameCamera {
    /// Player camera.
    pub main: Camera,
    /// Frozen camera used in [`ViewMode::Debug`].
    pub debug: Option<Camera>,
    /// Active mode.
    pub mode: ViewMode,
}

impl GameCamera {
    /// Wraps a player camera in normal mode.
    #[must_use]
    pub const fn new(main: Camera) -> Self {
        Self { main, debug: None, mode: ViewMode::Normal }
    }

    /// Freezes the current player camera as the debug camera and switches to it.
    pub fn freeze_debug(&mut self) {
        self.debug = Some(self.main);
        self.mode = ViewMode::Debug;
    }

    /// Returns to normal mode, dropping the debug camera.
    pub fn release_debug(&mut self) {
        self.debug = None;
        self.mode = ViewMode::Normal;
    }

    /// Returns the camera culling should use.
    ///
    /// Debug mode without a debug camera falls back to the player camera.
    #[must_use]
    pub fn cull_camera(&self) -> &Camera {
        match (self.mode, &self.debug) {
            (ViewMode::Debug, Some(debug)) => debug,
            _ => &self.main,
        }
    }
}

impl From<Camera> for GameCamera {
    fn from(main: Camera) -> Self {
        Self::new(main)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culling::Aabb;

    #[test]
    fn test_widened_fov_is_clamped() {
        let camera = Camera::default();
        assert!((camera.widened(10.0).fov_y_degrees - 77.0).abs() < f32::EPSILON);
        assert!(camera.widened(500.0).fov_y_degrees <= MAX_FOV_DEGREES);
        assert_eq!(camera.widened(10.0).position, camera.position);
    }

    #[test]
    fn test_widened_frustum_sees_more() {
        let camera = Camera::new(Vec3::ZERO, Vec3::NEG_Z, 60.0, 1.0);
        // Just outside the 60 degree cone at distance 10.
        let edge = Aabb::new(Vec3::new(6.2, -0.1, -10.1), Vec3::new(6.4, 0.1, -9.9));
        assert!(!camera.frustum().test_aabb(&edge));
        assert!(camera.widened(10.0).frustum().test_aabb(&edge));
    }

    #[test]
    fn test_debug_camera_selection() {
        let mut game = GameCamera::new(Camera::default());
        game.mode = ViewMode::Debug;
        assert_eq!(game.cull_camera(), &game.main);

        game.freeze_debug();
        game.main.position = Vec3::new(100.0, 0.0, 0.0);
        assert_eq!(game.cull_camera().position, Vec3::ZERO);

        game.release_debug();
        assert_eq!(game.cull_camera().position, Vec3::new(100.0, 0.0, 0.0));
    }

    #[test]
    fn test_vertical_cameras_cull() {
        let below = Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0));
        let above = Aabb::new(Vec3::new(-1.0, 99.0, -1.0), Vec3::new(1.0, 101.0, 1.0));

        let down = Camera::new(Vec3::new(0.0, 50.0, 0.0), Vec3::NEG_Y, 60.0, 1.0);
        let up = Camera::new(Vec3::new(0.0, 50.0, 0.0), Vec3::Y, 60.0, 1.0);
        for camera in [down, up] {
            assert!(camera.view_projection().is_finite());
        }
        assert!(down.frustum().test_aabb(&below));
        assert!(!down.frustum().test_aabb(&above));
        assert!(up.frustum().test_aabb(&above));
        assert!(!up.frustum().test_aabb(&below));

        // Direction edited in place onto the up axis.
        let edited = Camera {
            position: Vec3::new(0.0, 50.0, 0.0),
            direction: Vec3::NEG_Y,
            ..Camera::default()
        };
        assert_eq!(edited.up, Vec3::Y);
        assert!(edited.view_matrix().is_finite());
        assert!(edited.frustum().test_aabb(&below));
        assert!(!edited.frustum().test_aabb(&above));
    }
}
