//! Named initial patterns
//!
//! Seeds only ever write interior cells, so the frozen border of a fresh grid
//! is always dead.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

use crate::io::configuration::{ALIVE, DEFAULT_PATTERN};
use crate::io::error::{LifeError, Result};
use crate::spatial::grid::Grid;

/// Gosper glider gun, 11 rows by 38 columns
const GLIDER_GUN: [&str; 11] = [
    "......................................",
    ".........................#............",
    ".......................#.#............",
    ".............##......##............##.",
    "............#...#....##............##.",
    ".##........#.....#...##...............",
    ".##........#...#.##....#.#............",
    "...........#.....#.......#............",
    "............#...#.....................",
    ".............##.......................",
    "......................................",
];

/// Function filling a cleared grid with a pattern
pub type SeedFn = fn(&mut Grid, u64);

/// Set a cell alive unless it lies outside the interior
fn plant(grid: &mut Grid, row: isize, col: isize) {
    let (rows, cols) = grid.dim();
    if let (Ok(row), Ok(col)) = (usize::try_from(row), usize::try_from(col))
        && row > 0
        && col > 0
        && row + 1 < rows
        && col + 1 < cols
    {
        grid.set(row, col, ALIVE);
    }
}

/// Place one gun with its table origin at (`row`, `col`)
///
/// `down` and `right` select the direction table rows and columns run in, so
/// the four corners get mirrored copies.
fn gun(grid: &mut Grid, row: isize, col: isize, down: bool, right: bool) {
    for (i, line) in GLIDER_GUN.iter().enumerate() {
        for (j, _) in line.char_indices().filter(|&(_, c)| c == '#') {
            let (i, j) = (i as isize, j as isize);
            let r = if down { row + i } else { row - i };
            let c = if right { col + j } else { col - j };
            plant(grid, r, c);
        }
    }
}

/// Four glider guns, one in each corner
pub fn guns(grid: &mut Grid, _seed: u64) {
    let last_row = grid.rows() as isize - 1;
    let last_col = grid.cols() as isize - 1;
    gun(grid, 0, 0, true, true);
    gun(grid, 0, last_col, true, false);
    gun(grid, last_row, last_col, false, false);
    gun(grid, last_row, 0, false, true);
}

/// Lattice of 2×2 blocks, a still life
pub fn stable(grid: &mut Grid, _seed: u64) {
    let (rows, cols) = grid.dim();
    for i in (1..rows.saturating_sub(2)).step_by(4) {
        for j in (1..cols.saturating_sub(2)).step_by(4) {
            for (r, c) in [(i, j), (i, j + 1), (i + 1, j), (i + 1, j + 1)] {
                plant(grid, r as isize, c as isize);
            }
        }
    }
}

/// Uniform random interior fill, reproducible for a given seed
pub fn random(grid: &mut Grid, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let (rows, cols) = grid.dim();
    for row in 1..rows.saturating_sub(1) {
        for col in 1..cols.saturating_sub(1) {
            if rng.random_bool(0.5) {
                grid.set(row, col, ALIVE);
            }
        }
    }
}

/// Methuselah centred on the grid
pub fn clown(grid: &mut Grid, _seed: u64) {
    let mid = (grid.rows() / 2) as isize;
    for (dr, dc) in [(0, -1), (0, 0), (0, 1), (1, -1), (1, 1), (2, -1), (2, 1)] {
        plant(grid, mid + dr, mid + dc);
    }
}

/// Diehard: vanishes after 130 generations on an open grid
pub fn diehard(grid: &mut Grid, _seed: u64) {
    let mid = (grid.rows() / 2) as isize;
    for (dr, dc) in [(0, -3), (0, -2), (1, -2), (-1, 3), (1, 2), (1, 3), (1, 4)] {
        plant(grid, mid + dr, mid + dc);
    }
}

/// Name-to-seed lookup
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    entries: Vec<(&'static str, SeedFn)>,
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternRegistry {
    /// Registry holding every built-in pattern
    pub fn new() -> Self {
        Self {
            entries: vec![
                ("guns", guns as SeedFn),
                ("stable", stable),
                ("random", random),
                ("clown", clown),
                ("diehard", diehard),
            ],
        }
    }

    /// Add or replace a pattern
    pub fn register(&mut self, name: &'static str, seed: SeedFn) {
        match self.entries.iter_mut().find(|(known, _)| *known == name) {
            Some(entry) => entry.1 = seed,
            None => self.entries.push((name, seed)),
        }
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }

    /// Look up a pattern by name
    ///
    /// # Errors
    ///
    /// Returns an error listing the known names if `name` is not registered
    pub fn resolve(&self, name: &str) -> Result<SeedFn> {
        self.entries
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, seed)| *seed)
            .ok_or_else(|| LifeError::UnknownPattern {
                name: name.to_string(),
                available: self.names(),
            })
    }

    /// Look up a pattern, falling back to the default pattern with a warning
    ///
    /// # Errors
    ///
    /// Returns an error only if the default pattern itself is missing
    pub fn resolve_or_default(&self, name: &str) -> Result<SeedFn> {
        self.resolve(name).or_else(|error| {
            warn!(%error, fallback = DEFAULT_PATTERN, "using default pattern");
            self.resolve(DEFAULT_PATTERN)
        })
    }

    /// Build a fresh DIM×DIM grid seeded with the named pattern
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is unknown
    pub fn seed(&self, name: &str, dim: usize, rng_seed: u64) -> Result<Grid> {
        let fill = self.resolve(name)?;
        let mut grid = Grid::square(dim);
        fill(&mut grid, rng_seed);
        Ok(grid)
    }
}
