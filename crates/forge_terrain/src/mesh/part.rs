//! Face parts - pooled accumulators of merged unit faces.

use forge_core::Reset;
use glam::IVec3;

use crate::voxel::{Axis, BlockId, Direction};

/// A rectangle of unit faces being merged, all of one block type and facing
/// one direction.
///
/// A part starts as a single face, grows into a run along one axis and may
/// then absorb runs of the same width stacked on it. The growth axis is
/// fixed by the second face joined and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacePart {
    /// Outward direction of every face in the part.
    pub direction: Direction,
    /// Block type of every face in the part.
    pub block: BlockId,
    /// Voxel holding the first face.
    pub origin: IVec3,
    /// Faces along the direction's `u` axis.
    pub width: u32,
    /// Faces along the direction's `v` axis.
    pub height: u32,
    /// Axis fixed by the first join.
    pub growth: Option<Axis>,
    /// Whether the block type allows merging at all.
    pub mergeable: bool,
}

impl Default for FacePart {
    fn default() -> Self {
        Self {
            direction: Direction::Back,
            block: BlockId::AIR,
            origin: IVec3::ZERO,
            width: 0,
            height: 0,
            growth: None,
            mergeable: false,
        }
    }
}

impl Reset for FacePart {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl FacePart {
    /// Starts the part with a single face.
    pub fn begin(&mut self, direction: Direction, block: BlockId, origin: IVec3, mergeable: bool) {
        *self = Self { direction, block, origin, width: 1, height: 1, growth: None, mergeable };
    }

    /// Returns true if the part holds no faces.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Voxel holding the last face of the part.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn last(&self) -> IVec3 {
        let (u, v) = self.direction.plane_axes();
        self.origin + u.unit() * (self.width as i32 - 1) + v.unit() * (self.height as i32 - 1)
    }

    /// Checks whether a face of `block` at `pos` can join this part.
    ///
    /// Returns the axis it would grow along. Both faces must be of the same
    /// mergeable block, and the new face must sit one voxel past the end of
    /// the part along its growth axis (or along either in-plane axis when the
    /// part is still a single face).
    #[must_use]
    pub fn can_join(&self, block: BlockId, pos: IVec3) -> Option<Axis> {
        if !self.mergeable || self.block != block || self.is_empty() {
            return None;
        }
        let step = pos - self.last();
        let (u, v) = self.direction.plane_axes();
        let axis = if step == u.unit() {
            u
        } else if step == v.unit() {
            v
        } else {
            return None;
        };
        match self.growth {
            Some(growth) if growth != axis => None,
            _ => Some(axis),
        }
    }

    /// Extends the part by one face along `axis`.
    pub fn join(&mut self, axis: Axis) {
        let (u, v) = self.direction.plane_axes();
        debug_assert!(axis == u || axis == v, "join axis must lie in the face plane");
        debug_assert!(self.growth.is_none() || self.growth == Some(axis), "growth axis is fixed");
        if axis == u {
            self.width += 1;
        } else {
            self.height += 1;
        }
        self.growth.get_or_insert(axis);
    }

    /// Checks whether `run` covers exactly the row right above this part.
    ///
    /// Rows stack along the `v` axis: same block, same direction, same
    /// start and width, and the run begins where the part ends.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn can_stack(&self, run: &FacePart) -> bool {
        if !(self.mergeable && run.mergeable) || self.is_empty() || run.is_empty() {
            return false;
        }
        let (_, v) = self.direction.plane_axes();
        self.direction == run.direction
            && self.block == run.block
            && self.width == run.width
            && run.origin == self.origin + v.unit() * self.height as i32
    }

    /// Absorbs a run accepted by [`FacePart::can_stack`].
    pub fn stack(&mut self, run: &FacePart) {
        debug_assert!(self.can_stack(run), "stacked run must continue the part");
        self.height += run.height;
    }
}
