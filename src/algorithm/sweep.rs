//! Full-interior sweep: every block computed every generation

use crate::algorithm::driver::Stepper;
use crate::algorithm::executor::Executor;
use crate::algorithm::policy::Granularity;
use crate::io::error::{Result, invalid_parameter};
use crate::spatial::blocks::tile_blocks;
use crate::spatial::grid::Grid;
use crate::spatial::tiles::Tiling;

/// Stepper that recomputes the whole interior under a scheduling policy
#[derive(Debug)]
pub struct Sweep {
    executor: Executor,
    tiling: Tiling,
    granularity: Granularity,
}

impl Sweep {
    /// Combine an executor with a tiling and block granularity
    ///
    /// A per-tile-row task graph joins at the end of every band of `tranche`
    /// rows, whatever the granularity.
    pub const fn new(executor: Executor, tiling: Tiling, granularity: Granularity) -> Self {
        Self {
            executor: executor.with_band_rows(tiling.tranche()),
            tiling,
            granularity,
        }
    }

    /// Executor running the blocks
    pub const fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Tiling of the grid interior
    pub const fn tiling(&self) -> &Tiling {
        &self.tiling
    }

    /// Shape of the dispatched blocks
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }
}

impl Stepper for Sweep {
    fn name(&self) -> &'static str {
        self.executor.policy().name()
    }

    fn run_generation(&mut self, current: &Grid, next: &mut Grid) -> Result<bool> {
        check_dimensions(&self.tiling, current, next)?;

        let blocks = match self.granularity {
            Granularity::Rows => self.executor.decompose_rows(next, self.tiling.interior()),
            Granularity::Tiles => tile_blocks(next, &self.tiling),
        };

        Ok(self.executor.dispatch(current, blocks).any())
    }
}

/// Ensure both buffers are DIM×DIM for the tiling
///
/// # Errors
///
/// Returns an error naming the mismatched buffer
pub fn check_dimensions(tiling: &Tiling, current: &Grid, next: &Grid) -> Result<()> {
    let expected = (tiling.dim(), tiling.dim());
    for (name, grid) in [("current", current), ("next", next)] {
        if grid.dim() != expected {
            return Err(invalid_parameter(
                name,
                &format!("{}x{}", grid.rows(), grid.cols()),
                &format!("buffer must be {}x{}", expected.0, expected.1),
            ));
        }
    }
    Ok(())
}
