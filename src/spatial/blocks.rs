//! Disjoint work blocks carved out of the `next` buffer
//!
//! Every parallel policy hands out blocks that own mutable views into
//! non-overlapping parts of the output grid. Because the views come from
//! consuming `split_at` calls, two workers can never write the same cell and
//! no locking is needed while a generation is computed.

use ndarray::{ArrayViewMut2, Axis};

use crate::algorithm::rule;
use crate::spatial::grid::{Cell, Grid};
use crate::spatial::tiles::{Region, Tiling};

/// Rectangular piece of the output grid anchored at a grid position
#[derive(Debug)]
pub struct Span<'a> {
    origin: [usize; 2],
    cells: ArrayViewMut2<'a, Cell>,
}

impl<'a> Span<'a> {
    /// Wrap a mutable view whose top-left cell sits at `origin`
    pub const fn new(origin: [usize; 2], cells: ArrayViewMut2<'a, Cell>) -> Self {
        Self { origin, cells }
    }

    /// Grid position of the top-left cell
    pub const fn origin(&self) -> [usize; 2] {
        self.origin
    }

    /// Grid region covered by the span
    pub fn region(&self) -> Region {
        let (rows, cols) = self.cells.dim();
        Region::new(
            self.origin[0]..self.origin[0] + rows,
            self.origin[1]..self.origin[1] + cols,
        )
    }

    /// Apply the rule to every cell of the span, returning whether any changed
    pub fn update(self, current: &Grid) -> bool {
        rule::apply(current, self.origin, self.cells)
    }
}

/// Unit of dispatched work: one or more spans processed by a single worker
#[derive(Debug, Default)]
pub struct Block<'a> {
    spans: Vec<Span<'a>>,
}

impl<'a> Block<'a> {
    /// Block consisting of a single span
    pub fn single(origin: [usize; 2], cells: ArrayViewMut2<'a, Cell>) -> Self {
        Self {
            spans: vec![Span::new(origin, cells)],
        }
    }

    /// Append a span to the block
    pub fn push(&mut self, span: Span<'a>) {
        self.spans.push(span);
    }

    /// Grid position of the first span, used to group blocks by row band
    pub fn origin(&self) -> Option<[usize; 2]> {
        self.spans.first().map(Span::origin)
    }

    /// Regions covered by the block
    pub fn regions(&self) -> Vec<Region> {
        self.spans.iter().map(Span::region).collect()
    }

    /// Number of cells covered by the block
    pub fn area(&self) -> usize {
        self.spans.iter().map(|span| span.region().area()).sum()
    }

    /// Whether the block covers no cells
    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// Apply the rule to every cell of the block, returning whether any changed
    pub fn update(self, current: &Grid) -> bool {
        self.spans
            .into_iter()
            .fold(false, |changed, span| span.update(current) | changed)
    }
}

/// Split `region` of `next` into blocks of `rows_per_block` consecutive rows
pub fn row_blocks<'a>(next: &'a mut Grid, region: Region, rows_per_block: usize) -> Vec<Block<'a>> {
    let step = rows_per_block.max(1);
    let mut rest = next.region_mut(region);
    let mut row = region.top;
    let mut blocks = Vec::with_capacity(region.height().div_ceil(step));

    while rest.len_of(Axis(0)) > 0 {
        let take = step.min(rest.len_of(Axis(0)));
        let (head, tail) = rest.split_at(Axis(0), take);
        blocks.push(Block::single([row, region.left], head));
        rest = tail;
        row += take;
    }

    blocks
}

/// Split the interior of `next` into one block per tile, in row-major tile order
pub fn tile_blocks<'a>(next: &'a mut Grid, tiling: &Tiling) -> Vec<Block<'a>> {
    let mut rest = next.region_mut(tiling.interior());
    let mut band: Option<ArrayViewMut2<'a, Cell>> = None;
    let mut blocks = Vec::with_capacity(tiling.len());

    for tile in tiling.tiles() {
        let region = tile.region;
        let current_band = match band.take() {
            Some(remainder) if tile.col != 0 => remainder,
            _ => {
                let take = region.height().min(rest.len_of(Axis(0)));
                let (head, tail) = rest.split_at(Axis(0), take);
                rest = tail;
                head
            }
        };
        let take = region.width().min(current_band.len_of(Axis(1)));
        let (cells, remainder) = current_band.split_at(Axis(1), take);
        band = Some(remainder);
        blocks.push(Block::single(region.origin(), cells));
    }

    blocks
}

/// Flatten `region` into a single index space and cut it into `parts` contiguous ranges
///
/// A range may start or end in the middle of a row, so a block can hold a
/// partial first row, several full rows and a partial last row.
pub fn flattened_blocks<'a>(next: &'a mut Grid, region: Region, parts: usize) -> Vec<Block<'a>> {
    let total = region.area();
    if total == 0 {
        return Vec::new();
    }
    let parts = parts.clamp(1, total);
    let width = region.width();
    let boundary = |part: usize| total * part / parts;

    let mut blocks: Vec<Block<'a>> = (0..parts).map(|_| Block::default()).collect();
    let mut rows = next.region_mut(region);
    let mut part = 0;
    let mut row = region.top;

    while rows.len_of(Axis(0)) > 0 {
        let (line, tail) = rows.split_at(Axis(0), 1);
        rows = tail;

        let row_start = (row - region.top) * width;
        let row_end = row_start + width;
        let mut position = row_start;
        let mut rest = line;

        while position < row_end {
            let part_end = boundary(part + 1).min(row_end);
            let (segment, remainder) = rest.split_at(Axis(1), part_end - position);
            if let Some(block) = blocks.get_mut(part) {
                block.push(Span::new([row, region.left + position - row_start], segment));
            }
            rest = remainder;
            position = part_end;
            if position == boundary(part + 1) {
                part += 1;
            }
        }
        row += 1;
    }

    blocks
}
