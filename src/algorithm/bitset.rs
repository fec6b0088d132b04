use bitvec::prelude::*;
use std::fmt;

/// Per-tile change record for a GRAIN×GRAIN tiling
///
/// Stored row-major in a single bit vector. A set bit means the tile changed
/// during the generation that produced the matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirtyMatrix {
    bits: BitVec,
    grain: usize,
}

impl DirtyMatrix {
    /// Create a matrix with every tile clean
    pub fn new(grain: usize) -> Self {
        Self {
            bits: bitvec![0; grain * grain],
            grain,
        }
    }

    /// Create a matrix with every tile dirty
    pub fn all(grain: usize) -> Self {
        Self {
            bits: bitvec![1; grain * grain],
            grain,
        }
    }

    /// Tiles per dimension
    pub const fn grain(&self) -> usize {
        self.grain
    }

    const fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row < self.grain && col < self.grain {
            Some(row * self.grain + col)
        } else {
            None
        }
    }

    /// Whether a tile changed; tiles outside the matrix read as clean
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.index(row, col)
            .and_then(|index| self.bits.get(index).as_deref().copied())
            .unwrap_or(false)
    }

    /// Record whether a tile changed
    pub fn set(&mut self, row: usize, col: usize, changed: bool) {
        if let Some(index) = self.index(row, col) {
            self.bits.set(index, changed);
        }
    }

    /// Whether the tile or any of its 8 neighbouring tiles changed
    pub fn neighbourhood_dirty(&self, row: usize, col: usize) -> bool {
        let rows = row.saturating_sub(1)..=(row + 1).min(self.grain.saturating_sub(1));
        rows.into_iter().any(|r| {
            let cols = col.saturating_sub(1)..=(col + 1).min(self.grain.saturating_sub(1));
            cols.into_iter().any(|c| self.get(r, c))
        })
    }

    /// Mark every tile clean
    pub fn clear(&mut self) {
        self.bits.fill(false);
    }

    /// Number of dirty tiles
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Test if any tile is dirty
    pub fn any(&self) -> bool {
        self.bits.any()
    }
}

impl fmt::Display for DirtyMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.bits.chunks(self.grain.max(1)) {
            let line: String = row.iter().map(|bit| if *bit { '#' } else { '.' }).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
