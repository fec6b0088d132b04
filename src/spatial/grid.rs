//! Cell grid and the current/next double buffer
//!
//! A grid is a dense row-major `Array2` of cell states. Zero is dead and any
//! other value is alive; the value itself is only a display colour.

use std::ops::Range;

use ndarray::{Array2, ArrayView2, ArrayViewMut2, Axis, Slice};

use crate::spatial::tiles::Region;

/// State of a single cell (0 = dead, nonzero = alive colour)
pub type Cell = u32;

/// Dense 2D array of cell states
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    cells: Array2<Cell>,
}

impl Grid {
    /// Create an all-dead grid with the given dimensions
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cells: Array2::zeros((rows, cols)),
        }
    }

    /// Create an all-dead DIM×DIM grid
    pub fn square(dim: usize) -> Self {
        Self::new(dim, dim)
    }

    /// Wrap an existing array of cell states
    pub const fn from_array(cells: Array2<Cell>) -> Self {
        Self { cells }
    }

    /// Get the number of rows in the grid
    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    /// Get the number of columns in the grid
    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    /// Grid dimensions as (rows, cols)
    pub fn dim(&self) -> (usize, usize) {
        self.cells.dim()
    }

    /// Cell state at a position; positions outside the grid read as dead
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells.get((row, col)).copied().unwrap_or(0)
    }

    /// Set a cell state; positions outside the grid are ignored
    pub fn set(&mut self, row: usize, col: usize, value: Cell) {
        if let Some(cell) = self.cells.get_mut((row, col)) {
            *cell = value;
        }
    }

    /// Whether the cell at a position is alive
    #[inline]
    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.get(row, col) != 0
    }

    /// Number of live cells
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != 0).count()
    }

    /// Reset every cell to dead
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Read-only view of all cells
    pub fn cells(&self) -> ArrayView2<'_, Cell> {
        self.cells.view()
    }

    /// Mutable view of all cells
    pub fn cells_mut(&mut self) -> ArrayViewMut2<'_, Cell> {
        self.cells.view_mut()
    }

    /// Mutable view of a rectangular region, clamped to the grid
    pub fn region_mut(&mut self, region: Region) -> ArrayViewMut2<'_, Cell> {
        let (rows, cols) = self.dim();
        let bottom = region.bottom.min(rows);
        let right = region.right.min(cols);
        let top = region.top.min(bottom);
        let left = region.left.min(right);
        let mut view = self.cells.view_mut();
        view.slice_axis_inplace(Axis(0), Slice::from(top..bottom));
        view.slice_axis_inplace(Axis(1), Slice::from(left..right));
        view
    }

    /// States of the outer frame (row/col 0 and the last row/col), row-major
    pub fn border(&self) -> Vec<Cell> {
        let (rows, cols) = self.dim();
        self.cells
            .indexed_iter()
            .filter(|((r, c), _)| *r == 0 || *c == 0 || *r + 1 == rows || *c + 1 == cols)
            .map(|(_, &cell)| cell)
            .collect()
    }

    /// Copy a range of rows into a flat row-major vector
    pub fn rows_to_vec(&self, rows: Range<usize>) -> Vec<Cell> {
        let end = rows.end.min(self.rows());
        let start = rows.start.min(end);
        self.cells
            .slice_axis(Axis(0), Slice::from(start..end))
            .iter()
            .copied()
            .collect()
    }

    /// Overwrite consecutive rows starting at `first_row` from flat row-major data
    ///
    /// Data beyond the end of the grid is ignored.
    pub fn write_rows(&mut self, first_row: usize, data: &[Cell]) {
        let start = first_row.min(self.rows());
        let mut target = self.cells.slice_axis_mut(Axis(0), Slice::from(start..));
        for (cell, &value) in target.iter_mut().zip(data) {
            *cell = value;
        }
    }
}

/// The (current, next) grid pair owned by the generation driver
///
/// Strategies read `current` and write `next`; `swap` exchanges the roles and
/// is the only operation that changes which buffer is which.
#[derive(Debug, Clone)]
pub struct DoubleBuffer {
    current: Grid,
    next: Grid,
}

impl DoubleBuffer {
    /// Build the pair from a seeded grid
    ///
    /// Both buffers start as copies of `initial` so the frozen border and any
    /// region a strategy leaves untouched agree across swaps.
    pub fn new(initial: Grid) -> Self {
        let next = initial.clone();
        Self {
            current: initial,
            next,
        }
    }

    /// Grid holding the latest completed generation
    pub const fn current(&self) -> &Grid {
        &self.current
    }

    /// Grid being written by the generation in progress
    pub const fn next(&self) -> &Grid {
        &self.next
    }

    /// Borrow current for reading and next for writing at the same time
    pub const fn split(&mut self) -> (&Grid, &mut Grid) {
        (&self.current, &mut self.next)
    }

    /// Exchange the roles of the two buffers in O(1)
    pub const fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Replace both buffers with a new state
    pub fn reset(&mut self, state: Grid) {
        self.next = state.clone();
        self.current = state;
    }

    /// Dimensions shared by both buffers
    pub fn dim(&self) -> (usize, usize) {
        self.current.dim()
    }

    /// Consume the pair and return the latest completed generation
    pub fn into_current(self) -> Grid {
        self.current
    }
}
