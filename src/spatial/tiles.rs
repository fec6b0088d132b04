//! Tile partitioning of the grid interior
//!
//! The interior (every cell except row/col 0 and DIM-1) is divided into a
//! GRAIN×GRAIN array of tiles of side `tranche = DIM / GRAIN`. The first and
//! last tile in each dimension are inset by one cell so no tile ever covers
//! the frozen border.

use std::ops::Range;

use crate::io::configuration::{MIN_DIM, MIN_TRANCHE};
use crate::io::error::{Result, invalid_parameter};

/// Half-open rectangle of cell positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    /// First row (inclusive)
    pub top: usize,
    /// Last row (exclusive)
    pub bottom: usize,
    /// First column (inclusive)
    pub left: usize,
    /// Last column (exclusive)
    pub right: usize,
}

impl Region {
    /// Create a region from row and column ranges
    pub const fn new(rows: Range<usize>, cols: Range<usize>) -> Self {
        Self {
            top: rows.start,
            bottom: rows.end,
            left: cols.start,
            right: cols.end,
        }
    }

    /// Everything except the outer frame of a `rows`×`cols` grid
    pub const fn interior(rows: usize, cols: usize) -> Self {
        Self {
            top: 1,
            bottom: rows.saturating_sub(1),
            left: 1,
            right: cols.saturating_sub(1),
        }
    }

    /// Number of rows covered
    pub const fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }

    /// Number of columns covered
    pub const fn width(&self) -> usize {
        self.right.saturating_sub(self.left)
    }

    /// Number of cells covered
    pub const fn area(&self) -> usize {
        self.height() * self.width()
    }

    /// Whether the region covers no cells
    pub const fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// Whether a position lies inside the region
    pub const fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.top && row < self.bottom && col >= self.left && col < self.right
    }

    /// Top-left corner as [row, col]
    pub const fn origin(&self) -> [usize; 2] {
        [self.top, self.left]
    }

    /// Row range covered
    pub const fn rows(&self) -> Range<usize> {
        self.top..self.bottom
    }

    /// Column range covered
    pub const fn cols(&self) -> Range<usize> {
        self.left..self.right
    }
}

/// One tile of the partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    /// Tile row index in `0..grain`
    pub row: usize,
    /// Tile column index in `0..grain`
    pub col: usize,
    /// Cells covered by the tile
    pub region: Region,
}

/// GRAIN×GRAIN partition of a DIM×DIM grid interior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tiling {
    dim: usize,
    grain: usize,
    tranche: usize,
}

impl Tiling {
    /// Validate DIM and GRAIN and build the partition
    ///
    /// # Errors
    ///
    /// Returns an error if DIM is below the minimum, GRAIN is zero or does not
    /// evenly divide DIM, or the resulting tiles are thinner than two cells
    pub fn new(dim: usize, grain: usize) -> Result<Self> {
        if dim < MIN_DIM {
            return Err(invalid_parameter(
                "dim",
                &dim,
                &format!("grid needs at least {MIN_DIM} cells per side"),
            ));
        }
        if grain == 0 {
            return Err(invalid_parameter(
                "grain",
                &grain,
                &"at least one tile per dimension is required",
            ));
        }
        if !dim.is_multiple_of(grain) {
            return Err(invalid_parameter(
                "grain",
                &grain,
                &format!("must evenly divide the grid dimension {dim}"),
            ));
        }
        let tranche = dim / grain;
        // A single tile is inset on both sides, so MIN_DIM alone is enough
        if grain > 1 && tranche < MIN_TRANCHE {
            return Err(invalid_parameter(
                "grain",
                &grain,
                &format!("tiles of side {tranche} leave empty edge tiles after the border inset"),
            ));
        }
        Ok(Self {
            dim,
            grain,
            tranche,
        })
    }

    /// Grid side length
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// Tiles per dimension
    pub const fn grain(&self) -> usize {
        self.grain
    }

    /// Nominal tile side length
    pub const fn tranche(&self) -> usize {
        self.tranche
    }

    /// Total number of tiles
    pub const fn len(&self) -> usize {
        self.grain * self.grain
    }

    /// Always false: a valid tiling has at least one tile
    pub const fn is_empty(&self) -> bool {
        self.grain == 0
    }

    /// Region covered by all tiles together
    pub const fn interior(&self) -> Region {
        Region::interior(self.dim, self.dim)
    }

    /// Index range covered by tile `index` along one axis
    const fn span(&self, index: usize) -> Range<usize> {
        let start = index * self.tranche + if index == 0 { 1 } else { 0 };
        let end = (index + 1) * self.tranche - if index + 1 == self.grain { 1 } else { 0 };
        start..end
    }

    /// Tile at tile coordinates, if inside the partition
    pub const fn tile(&self, row: usize, col: usize) -> Option<Tile> {
        if row >= self.grain || col >= self.grain {
            return None;
        }
        Some(Tile {
            row,
            col,
            region: Region::new(self.span(row), self.span(col)),
        })
    }

    /// Whether tile coordinates lie in the border-adjacent band
    pub const fn is_edge(&self, row: usize, col: usize) -> bool {
        row == 0 || col == 0 || row + 1 == self.grain || col + 1 == self.grain
    }

    /// Row-major iterator over every tile; restartable by calling again
    pub const fn tiles(&self) -> Tiles {
        Tiles {
            tiling: *self,
            position: 0,
        }
    }
}

/// Lazy row-major sequence of tiles
#[derive(Debug, Clone)]
pub struct Tiles {
    tiling: Tiling,
    position: usize,
}

impl Iterator for Tiles {
    type Item = Tile;

    fn next(&mut self) -> Option<Self::Item> {
        let grain = self.tiling.grain;
        if grain == 0 || self.position >= self.tiling.len() {
            return None;
        }
        let tile = self
            .tiling
            .tile(self.position / grain, self.position % grain);
        self.position += 1;
        tile
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.tiling.len().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Tiles {}
