//! Axis-aligned integer bounding boxes on the world tile grid.
//!
//! Boxes may have zero extent on one or both axes (a footprint that is a
//! line or a point). Containment and intersection are written out per axis so
//! that these degenerate boxes behave the same way as regular ones.

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Integer bounding box with inclusive `min` and `max` corners.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    /// Minimum corner (bottom-left)
    pub min: IVec2,
    /// Maximum corner (top-right)
    pub max: IVec2,
}

impl GridBounds {
    /// Creates bounds from two corners, in any order.
    #[must_use]
    pub fn from_corners(a: IVec2, b: IVec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Creates bounds from a minimum corner and a non-negative size.
    ///
    /// Negative size components are treated as zero.
    #[must_use]
    pub fn from_position_size(position: IVec2, size: IVec2) -> Self {
        Self {
            min: position,
            max: position + size.max(IVec2::ZERO),
        }
    }

    /// Returns the extent on each axis.
    #[must_use]
    pub fn size(&self) -> IVec2 {
        self.max - self.min
    }

    /// Width (x extent).
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    /// Height (y extent).
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    /// True if either axis has zero extent.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.min.x == self.max.x || self.min.y == self.max.y
    }

    /// Checks whether `inner` lies entirely inside these bounds.
    ///
    /// Edges may touch. Works for boxes with zero extent on any axis.
    #[must_use]
    pub const fn contains_bounds(&self, inner: &Self) -> bool {
        inner.min.x >= self.min.x
            && inner.min.y >= self.min.y
            && inner.max.x <= self.max.x
            && inner.max.y <= self.max.y
    }

    /// Checks whether the tile whose bottom-left corner is `cell` is inside.
    #[must_use]
    pub const fn contains_cell(&self, cell: IVec2) -> bool {
        cell.x >= self.min.x && cell.x < self.max.x && cell.y >= self.min.y && cell.y < self.max.y
    }

    /// Checks whether two boxes share any area.
    ///
    /// Boxes that only touch along an edge do not intersect. An axis with zero
    /// extent on either box is compared as a closed interval instead, so a
    /// line footprint lying inside another footprint still counts.
    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        axis_overlaps(self.min.x, self.max.x, other.min.x, other.max.x)
            && axis_overlaps(self.min.y, self.max.y, other.min.y, other.max.y)
    }

    /// Returns these bounds moved by `offset`.
    #[must_use]
    pub fn translated(&self, offset: IVec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

const fn axis_overlaps(a_min: i32, a_max: i32, b_min: i32, b_max: i32) -> bool {
    if a_min == a_max || b_min == b_max {
        a_min <= b_max && b_min <= a_max
    } else {
        a_min < b_max && b_min < a_max
    }
}

impl fmt::Display for GridBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.min.x, self.min.y, self.max.x, self.max.y
        )
    }
}
