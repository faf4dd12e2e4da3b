//! Coordinate types for grid areas and the world tile grid.

use std::fmt;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Snaps a world-space value onto the world tile grid.
///
/// Zero stays at zero, negative values round down and positive values round
/// up, so a grid area that starts part-way into a tile claims that whole tile.
#[must_use]
pub fn snap_to_world_grid(n: f32) -> i32 {
    if n == 0.0 {
        0
    } else if n < 0.0 {
        n.floor() as i32
    } else {
        n.ceil() as i32
    }
}

/// Snaps both axes of a world position with [`snap_to_world_grid`].
#[must_use]
pub fn snap_vec_to_world_grid(v: Vec2) -> IVec2 {
    IVec2::new(snap_to_world_grid(v.x), snap_to_world_grid(v.y))
}

/// Row/column position of a cell inside a grid area or a menu grid.
///
/// Rows grow downwards from the area's top-left origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    /// Row index
    pub row: i32,
    /// Column index
    pub col: i32,
}

impl Coordinate {
    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Converts to a linear row-major index for a grid with `cols` columns.
    ///
    /// Returns `None` for negative coordinates or a column outside `cols`.
    #[must_use]
    pub fn to_index(self, cols: usize) -> Option<usize> {
        let row = usize::try_from(self.row).ok()?;
        let col = usize::try_from(self.col).ok()?;
        if col >= cols {
            return None;
        }
        Some(row * cols + col)
    }

    /// Creates from a linear row-major index.
    #[must_use]
    pub const fn from_index(index: usize, cols: usize) -> Self {
        Self {
            row: (index / cols) as i32,
            col: (index % cols) as i32,
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_zero_stays_zero() {
        assert_eq!(snap_to_world_grid(0.0), 0);
        assert_eq!(snap_to_world_grid(-0.0), 0);
    }

    #[test]
    fn test_snap_is_asymmetric() {
        assert_eq!(snap_to_world_grid(0.2), 1);
        assert_eq!(snap_to_world_grid(2.0), 2);
        assert_eq!(snap_to_world_grid(-0.2), -1);
        assert_eq!(snap_to_world_grid(-3.0), -3);
        assert_eq!(snap_to_world_grid(-3.5), -4);
    }

    #[test]
    fn test_snap_vec() {
        assert_eq!(
            snap_vec_to_world_grid(Vec2::new(1.5, -1.5)),
            IVec2::new(2, -2)
        );
    }

    #[test]
    fn test_coordinate_index_round_trip() {
        let coord = Coordinate::new(2, 3);
        let index = coord.to_index(5).expect("in range");
        assert_eq!(index, 13);
        assert_eq!(Coordinate::from_index(index, 5), coord);
    }

    #[test]
    fn test_coordinate_index_rejects_out_of_range() {
        assert_eq!(Coordinate::new(-1, 0).to_index(5), None);
        assert_eq!(Coordinate::new(0, 5).to_index(5), None);
    }

    #[test]
    fn test_coordinate_display() {
        assert_eq!(Coordinate::new(4, 1).to_string(), "(4,1)");
    }
}
