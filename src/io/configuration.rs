//! Engine constants and runtime configuration defaults

use crate::algorithm::dirty::DirtyTiles;
use crate::algorithm::driver::Stepper;
use crate::algorithm::executor::Executor;
use crate::algorithm::policy::{Granularity, Policy};
use crate::algorithm::sweep::Sweep;
use crate::io::error::{Result, invalid_parameter};
use crate::spatial::tiles::Tiling;

// Colour written into every cell the rule brings to life (yellow)
/// State assigned to newly computed live cells
pub const ALIVE: u32 = 0xFFFF_00FF;

/// Default grid side length
pub const DEFAULT_DIM: usize = 512;

/// Default number of tiles per dimension
pub const DEFAULT_GRAIN: usize = 8;

/// Default generation bound
pub const DEFAULT_ITERATIONS: u32 = 1000;

/// Pattern used when none is requested or the requested one is unknown
pub const DEFAULT_PATTERN: &str = "guns";

/// Fixed seed for reproducible random fills
pub const DEFAULT_RNG_SEED: u64 = 42;

/// Rows per chunk for the static-cyclic policy
pub const DEFAULT_CYCLIC_CHUNK: usize = 2;

/// Rows per chunk for the dynamic policy
pub const DEFAULT_DYNAMIC_CHUNK: usize = 1;

/// Rank that scatters the grid and gathers the results
pub const COORDINATOR_RANK: usize = 0;

/// Default number of ranks for the distributed backend
pub const DEFAULT_RANKS: usize = 4;

/// Work-group shape `[rows, cols]` for device kernels
pub const DEFAULT_DEVICE_TILE: [usize; 2] = [16, 16];

// The rule needs one border cell on each side of at least one interior cell
/// Smallest grid side length the engine accepts
pub const MIN_DIM: usize = 3;

// Safety limit to prevent excessive memory allocation
/// Largest grid side length the engine accepts
pub const MAX_DIM: usize = 16_384;

/// Smallest tile side length, so inset edge tiles keep a nonzero area
pub const MIN_TRANCHE: usize = 2;

/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

/// Shared-memory engine parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Grid side length
    pub dim: usize,
    /// Tiles per dimension
    pub grain: usize,
    /// Worker threads (0 selects the available parallelism)
    pub workers: usize,
    /// Scheduling policy
    pub policy: Policy,
    /// Whether blocks are row chunks or tiles
    pub granularity: Granularity,
    /// Wrap the policy in the dirty-tile optimizer
    pub skip_stable_tiles: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIM,
            grain: DEFAULT_GRAIN,
            workers: 0,
            policy: Policy::StaticBlock,
            granularity: Granularity::Rows,
            skip_stable_tiles: false,
        }
    }
}

impl EngineConfig {
    /// Check every parameter and return the tiling it describes
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions are out of range, GRAIN does not
    /// evenly divide DIM, tiles would be too small, or a policy chunk is zero
    pub fn validate(&self) -> Result<Tiling> {
        if self.dim > MAX_DIM {
            return Err(invalid_parameter(
                "dim",
                &self.dim,
                &format!("must not exceed {MAX_DIM}"),
            ));
        }
        self.policy.validate()?;
        Tiling::new(self.dim, self.grain)
    }

    /// Resolve the worker count, substituting the machine's parallelism for 0
    pub fn effective_workers(&self) -> usize {
        resolve_workers(self.workers)
    }

    /// Validate and build the shared-memory strategy this configuration describes
    ///
    /// Dirty-tile skipping always works on tiles, whatever the granularity.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the worker pool cannot be built
    pub fn build_stepper(&self) -> Result<Box<dyn Stepper + Send>> {
        let tiling = self.validate()?;
        let executor = Executor::new(self.policy, self.workers)?;
        if self.skip_stable_tiles {
            Ok(Box::new(DirtyTiles::new(executor, tiling)))
        } else {
            Ok(Box::new(Sweep::new(executor, tiling, self.granularity)))
        }
    }
}

/// Resolve a requested worker count, substituting the available parallelism for 0
pub fn resolve_workers(requested: usize) -> usize {
    if requested == 0 {
        std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
    } else {
        requested
    }
}
