//! Buildable grid areas.
//!
//! A grid area is a rows × cols block of cells hanging down and to the right
//! of a world-space origin (its top-left corner). Its bounds on the world
//! tile grid are derived purely from origin, size and cell size.

use glam::{IVec2, Vec2};
use homestead_common::{snap_vec_to_world_grid, Coordinate, GridBounds};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Grid area error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// `from` is not strictly before `to` on both axes
    #[error("Invalid fill range {from} - {to}")]
    InvalidRange {
        /// Start (inclusive)
        from: Coordinate,
        /// End (exclusive)
        to: Coordinate,
    },
    /// Fill range does not fit in the grid
    #[error("Fill range {from} - {to} is larger than the {rows}x{cols} grid")]
    RangeTooLarge {
        /// Start (inclusive)
        from: Coordinate,
        /// End (exclusive)
        to: Coordinate,
        /// Grid rows
        rows: usize,
        /// Grid columns
        cols: usize,
    },
    /// Coordinate outside the grid
    #[error("Coordinate {0} is outside the grid")]
    OutOfBounds(Coordinate),
    /// Cell size must be positive and finite
    #[error("Invalid cell size {0}")]
    InvalidCellSize(f32),
}

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Metadata for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// Position in the area
    pub coordinate: Coordinate,
    /// World position of the cell's top-left corner
    pub origin_world: Vec2,
    /// Whether objects may be built here
    pub buildable: bool,
}

/// A rectangular buildable region.
#[derive(Debug, Clone, PartialEq)]
pub struct GridArea {
    origin: Vec2,
    rows: usize,
    cols: usize,
    cell_size: f32,
    cells: Vec<Option<GridCell>>,
}

impl GridArea {
    /// Creates an area and fills in every cell.
    ///
    /// A non-positive or non-finite cell size falls back to 1.
    #[must_use]
    pub fn new(origin: Vec2, rows: usize, cols: usize, cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            warn!("Invalid grid cell size {}, using 1", cell_size);
            1.0
        };
        let mut area = Self {
            origin,
            rows,
            cols,
            cell_size,
            cells: vec![None; rows * cols],
        };
        if rows > 0 && cols > 0 {
            let to = Coordinate::new(rows as i32, cols as i32);
            if let Err(e) = area.fill_cells(Coordinate::new(0, 0), to) {
                warn!("Failed to fill grid cells: {}", e);
            }
        }
        area
    }

    /// Creates an area, rejecting a bad cell size.
    pub fn try_new(origin: Vec2, rows: usize, cols: usize, cell_size: f32) -> GridResult<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GridError::InvalidCellSize(cell_size));
        }
        Ok(Self::new(origin, rows, cols, cell_size))
    }

    /// Top-left corner in world space.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Cell edge length in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Tile-grid cells per world unit: `round(1 / cell_size)`, at least 1.
    #[must_use]
    pub fn scale_factor(&self) -> i32 {
        ((1.0 / self.cell_size).round() as i32).max(1)
    }

    /// Bounds of this area on the world tile grid.
    ///
    /// Partially covered tiles are included.
    #[must_use]
    pub fn bounds(&self) -> GridBounds {
        let scale = self.scale_factor() as f32;
        let height = self.rows as f32 * self.cell_size;
        let width = self.cols as f32 * self.cell_size;
        let bottom_left = Vec2::new(self.origin.x, self.origin.y - height);
        let min = snap_vec_to_world_grid(bottom_left * scale);
        let size = IVec2::new(
            (width * scale).ceil() as i32,
            (height * scale).ceil() as i32,
        );
        GridBounds::from_position_size(min, size)
    }

    /// Tile containing a world position.
    #[must_use]
    pub fn world_to_grid(&self, world: Vec2) -> IVec2 {
        (world * self.scale_factor() as f32).floor().as_ivec2()
    }

    /// World position of a cell's top-left corner.
    #[must_use]
    pub fn cell_origin(&self, coord: Coordinate) -> Vec2 {
        self.origin + Vec2::new(self.cell_size * coord.col as f32, -self.cell_size * coord.row as f32)
    }

    /// Cell under a world position, if inside the area.
    #[must_use]
    pub fn world_to_cell(&self, world: Vec2) -> Option<Coordinate> {
        let local = Vec2::new(world.x - self.origin.x, self.origin.y - world.y) / self.cell_size;
        let coord = Coordinate::new(local.y.floor() as i32, local.x.floor() as i32);
        self.contains_coordinate(coord).then_some(coord)
    }

    /// Whether a coordinate lies inside the area.
    #[must_use]
    pub fn contains_coordinate(&self, coord: Coordinate) -> bool {
        coord.row >= 0
            && coord.col >= 0
            && (coord.row as usize) < self.rows
            && (coord.col as usize) < self.cols
    }

    /// Cell metadata.
    #[must_use]
    pub fn cell(&self, coord: Coordinate) -> Option<&GridCell> {
        if !self.contains_coordinate(coord) {
            return None;
        }
        let index = coord.to_index(self.cols)?;
        self.cells.get(index)?.as_ref()
    }

    /// Marks a cell buildable or not.
    pub fn set_buildable(&mut self, coord: Coordinate, buildable: bool) -> GridResult<()> {
        let index = self
            .contains_coordinate(coord)
            .then(|| coord.to_index(self.cols))
            .flatten()
            .ok_or(GridError::OutOfBounds(coord))?;
        let origin_world = self.cell_origin(coord);
        let cell = self.cells[index].get_or_insert(GridCell {
            coordinate: coord,
            origin_world,
            buildable,
        });
        cell.buildable = buildable;
        Ok(())
    }

    /// (Re)creates cell metadata for rows `from.row..to.row` and columns
    /// `from.col..to.col`.
    pub fn fill_cells(&mut self, from: Coordinate, to: Coordinate) -> GridResult<()> {
        if from.row >= to.row || from.col >= to.col {
            return Err(GridError::InvalidRange { from, to });
        }
        let end_inside = to.row as usize <= self.rows && to.col as usize <= self.cols;
        if from.row < 0 || from.col < 0 || !end_inside {
            return Err(GridError::RangeTooLarge {
                from,
                to,
                rows: self.rows,
                cols: self.cols,
            });
        }

        for row in from.row..to.row {
            for col in from.col..to.col {
                let coordinate = Coordinate::new(row, col);
                let Some(index) = coordinate.to_index(self.cols) else {
                    continue;
                };
                self.cells[index] = Some(GridCell {
                    coordinate,
                    origin_world: self.cell_origin(coordinate),
                    buildable: true,
                });
            }
        }
        Ok(())
    }

    /// Iterates over filled cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> + '_ {
        self.cells.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bounds_unit_cells() {
        let area = GridArea::new(Vec2::new(0.0, 4.0), 4, 4, 1.0);
        assert_eq!(area.scale_factor(), 1);
        assert_eq!(
            area.bounds(),
            GridBounds::from_corners(IVec2::ZERO, IVec2::new(4, 4))
        );
    }

    #[test]
    fn test_bounds_snap_outwards() {
        let area = GridArea::new(Vec2::new(-1.5, 2.0), 3, 4, 1.0);
        let bounds = area.bounds();
        assert_eq!(bounds.min, IVec2::new(-2, -1));
        assert_eq!(bounds.max, IVec2::new(2, 2));

        let area = GridArea::new(Vec2::new(0.5, 3.5), 3, 2, 1.0);
        assert_eq!(area.bounds().min, IVec2::new(1, 1));
    }

    #[test]
    fn test_bounds_half_cells() {
        let area = GridArea::new(Vec2::new(1.0, 1.0), 2, 2, 0.5);
        assert_eq!(area.scale_factor(), 2);
        assert_eq!(
            area.bounds(),
            GridBounds::from_corners(IVec2::new(2, 0), IVec2::new(4, 2))
        );
    }

    #[test]
    fn test_large_cells_scale_is_at_least_one() {
        let area = GridArea::new(Vec2::ZERO, 1, 1, 4.0);
        assert_eq!(area.scale_factor(), 1);
        assert_eq!(area.bounds().size(), IVec2::new(4, 4));
    }

    #[test]
    fn test_invalid_cell_size() {
        assert_eq!(
            GridArea::try_new(Vec2::ZERO, 1, 1, 0.0),
            Err(GridError::InvalidCellSize(0.0))
        );
        assert_eq!(GridArea::new(Vec2::ZERO, 1, 1, -2.0).cell_size(), 1.0);
    }

    #[test]
    fn test_cells_filled_on_creation() {
        let area = GridArea::new(Vec2::new(0.0, 2.0), 2, 3, 1.0);
        assert_eq!(area.cells().count(), 6);
        let cell = area.cell(Coordinate::new(1, 2)).expect("filled");
        assert_eq!(cell.origin_world, Vec2::new(2.0, 1.0));
        assert!(cell.buildable);
        assert!(area.cell(Coordinate::new(2, 0)).is_none());
    }

    #[test]
    fn test_contains_coordinate() {
        let area = GridArea::new(Vec2::ZERO, 2, 3, 1.0);
        assert!(area.contains_coordinate(Coordinate::new(1, 2)));
        assert!(!area.contains_coordinate(Coordinate::new(2, 0)));
        assert!(!area.contains_coordinate(Coordinate::new(0, 3)));
        assert!(!area.contains_coordinate(Coordinate::new(-1, 0)));
    }

    #[test]
    fn test_fill_cells_range_errors() {
        let mut area = GridArea::new(Vec2::ZERO, 2, 2, 1.0);
        assert!(matches!(
            area.fill_cells(Coordinate::new(1, 0), Coordinate::new(1, 2)),
            Err(GridError::InvalidRange { .. })
        ));
        assert!(matches!(
            area.fill_cells(Coordinate::new(0, 0), Coordinate::new(3, 2)),
            Err(GridError::RangeTooLarge { .. })
        ));
        assert!(area
            .fill_cells(Coordinate::new(0, 1), Coordinate::new(2, 2))
            .is_ok());
    }

    #[test]
    fn test_set_buildable() {
        let mut area = GridArea::new(Vec2::ZERO, 2, 2, 1.0);
        area.set_buildable(Coordinate::new(0, 1), false)
            .expect("inside");
        assert_eq!(
            area.cell(Coordinate::new(0, 1)).map(|c| c.buildable),
            Some(false)
        );
        assert_eq!(
            area.set_buildable(Coordinate::new(5, 5), true),
            Err(GridError::OutOfBounds(Coordinate::new(5, 5)))
        );
    }

    #[test]
    fn test_world_to_cell() {
        let area = GridArea::new(Vec2::new(0.0, 3.0), 3, 3, 1.0);
        assert_eq!(area.world_to_cell(Vec2::new(0.5, 2.5)), Some(Coordinate::new(0, 0)));
        assert_eq!(area.world_to_cell(Vec2::new(2.5, 0.5)), Some(Coordinate::new(2, 2)));
        assert_eq!(area.world_to_cell(Vec2::new(3.5, 0.5)), None);
        assert_eq!(area.world_to_cell(Vec2::new(0.5, 3.5)), None);
    }

    #[test]
    fn test_world_to_grid() {
        let area = GridArea::new(Vec2::ZERO, 1, 1, 1.0);
        assert_eq!(area.world_to_grid(Vec2::new(1.7, -0.2)), IVec2::new(1, -1));

        let half = GridArea::new(Vec2::ZERO, 1, 1, 0.5);
        assert_eq!(half.world_to_grid(Vec2::new(1.7, 0.2)), IVec2::new(3, 0));
    }

    proptest! {
        #[test]
        fn prop_bounds_is_pure(
            x in -50.0f32..50.0,
            y in -50.0f32..50.0,
            rows in 0usize..20,
            cols in 0usize..20,
            cell in prop_oneof![Just(0.25f32), Just(0.5), Just(1.0), Just(2.0)],
        ) {
            let area = GridArea::new(Vec2::new(x, y), rows, cols, cell);
            let first = area.bounds();
            prop_assert_eq!(first, area.bounds());
            prop_assert_eq!(first, area.clone().bounds());
            prop_assert!(first.width() >= 0 && first.height() >= 0);
        }
    }
}
