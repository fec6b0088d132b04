//! Conway's B3/S23 transition for a single cell

use ndarray::ArrayViewMut2;

use crate::io::configuration::ALIVE;
use crate::spatial::grid::{Cell, Grid};

/// Offsets of the 8 Moore neighbours as (row, col) deltas
const NEIGHBOURHOOD: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Compute the next state of a cell from its current state and its 8 neighbours
///
/// Only liveness (nonzero) is inspected, never the stored colour. Cells that
/// are alive after the step hold [`ALIVE`]. Returns `(new_state, changed)`
/// where `changed` compares the stored values.
pub fn evaluate(cell: Cell, neighbours: &[Cell; 8]) -> (Cell, bool) {
    let live = neighbours.iter().filter(|&&n| n != 0).count();
    let next = match (cell != 0, live) {
        (true, 2 | 3) | (false, 3) => ALIVE,
        _ => 0,
    };
    (next, next != cell)
}

/// Gather the neighbours of a position and evaluate it
///
/// Neighbours outside the grid count as dead.
#[inline]
pub fn next_state(grid: &Grid, row: usize, col: usize) -> (Cell, bool) {
    let neighbours = NEIGHBOURHOOD.map(|(dr, dc)| {
        match (row.checked_add_signed(dr), col.checked_add_signed(dc)) {
            (Some(r), Some(c)) => grid.get(r, c),
            _ => 0,
        }
    });
    evaluate(grid.get(row, col), &neighbours)
}

/// Evaluate every cell of an output view whose top-left cell is at `origin`
///
/// Reads neighbours from `current` and writes results into `out`. Returns
/// true when at least one cell changed.
pub fn apply(current: &Grid, origin: [usize; 2], mut out: ArrayViewMut2<'_, Cell>) -> bool {
    let mut changed = false;
    for ((r, c), cell) in out.indexed_iter_mut() {
        let (state, diff) = next_state(current, origin[0] + r, origin[1] + c);
        *cell = state;
        changed |= diff;
    }
    changed
}
