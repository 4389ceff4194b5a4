//! The six axis-aligned face directions of a voxel.

use glam::{IVec3, Vec3};

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// Component index (0, 1, 2).
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Unit vector along the axis.
    #[inline]
    #[must_use]
    pub const fn unit(self) -> IVec3 {
        match self {
            Self::X => IVec3::X,
            Self::Y => IVec3::Y,
            Self::Z => IVec3::Z,
        }
    }
}

/// Outward direction of a voxel face.
///
/// Declaration order is the order faces are built for a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// -Z
    Back,
    /// +Z
    Front,
    /// +Y
    Top,
    /// -Y
    Bottom,
    /// -X
    Left,
    /// +X
    Right,
}

impl Direction {
    /// All directions in build order.
    pub const ALL: [Self; 6] = [
        Self::Back,
        Self::Front,
        Self::Top,
        Self::Bottom,
        Self::Left,
        Self::Right,
    ];

    /// Axis the face normal lies on.
    #[inline]
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::Back | Self::Front => Axis::Z,
            Self::Top | Self::Bottom => Axis::Y,
            Self::Left | Self::Right => Axis::X,
        }
    }

    /// True when the normal points along the positive axis.
    #[inline]
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Front | Self::Top | Self::Right)
    }

    /// Integer outward normal.
    #[inline]
    #[must_use]
    pub const fn normal(self) -> IVec3 {
        match self {
            Self::Back => IVec3::NEG_Z,
            Self::Front => IVec3::Z,
            Self::Top => IVec3::Y,
            Self::Bottom => IVec3::NEG_Y,
            Self::Left => IVec3::NEG_X,
            Self::Right => IVec3::X,
        }
    }

    /// Float outward normal.
    #[inline]
    #[must_use]
    pub fn normal_f32(self) -> Vec3 {
        self.normal().as_vec3()
    }

    /// In-plane axes `(u, v)` of faces pointing this way.
    ///
    /// Merging runs along `u` first, then stacks runs along `v`. UV
    /// coordinates of a face follow the same axes.
    #[inline]
    #[must_use]
    pub const fn plane_axes(self) -> (Axis, Axis) {
        match self.axis() {
            Axis::X => (Axis::Z, Axis::Y),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }

    /// Dense index in [`Direction::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}
