//! Row-block partitioning of the grid over ranks
//!
//! Rank r owns global rows `[r * block, (r + 1) * block)`. Each rank keeps a
//! local copy of its rows framed by one halo row above and one below, so the
//! rule can be applied to the block without touching the rest of the grid.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::algorithm::driver::{Driver, Stepper};
use crate::algorithm::executor::Executor;
use crate::algorithm::policy::Policy;
use crate::distributed::comm::{Communicator, LocalCluster, Tag};
use crate::io::configuration::{COORDINATOR_RANK, MAX_DIM, MIN_DIM};
use crate::io::error::{LifeError, Result, communication_error, invalid_parameter};
use crate::spatial::grid::{DoubleBuffer, Grid};
use crate::spatial::tiles::Region;

/// How rows on the edge of a rank's block are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BoundaryMode {
    /// Neighbouring ranks swap boundary rows every generation
    #[default]
    Exchange,
    /// Block edge rows are frozen like the grid border
    Frozen,
}

impl BoundaryMode {
    /// Short name used on the command line and in logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Exchange => "exchange",
            Self::Frozen => "frozen",
        }
    }
}

impl fmt::Display for BoundaryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoundaryMode {
    type Err = LifeError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "exchange" | "halo" => Ok(Self::Exchange),
            "frozen" | "fixed" => Ok(Self::Frozen),
            _ => Err(invalid_parameter(
                "boundary",
                &value,
                &"expected exchange or frozen",
            )),
        }
    }
}

/// Stepper that runs one rank's share of every generation
#[derive(Debug)]
pub struct Distributed<C> {
    comm: C,
    executor: Executor,
    boundary: BoundaryMode,
    dim: usize,
    block: usize,
}

impl<C: Communicator> Distributed<C> {
    /// Configure this rank for a DIM×DIM grid
    ///
    /// # Errors
    ///
    /// Returns an error if DIM is out of range or the rank count does not
    /// evenly divide DIM
    pub fn new(comm: C, executor: Executor, boundary: BoundaryMode, dim: usize) -> Result<Self> {
        if !(MIN_DIM..=MAX_DIM).contains(&dim) {
            return Err(invalid_parameter(
                "dim",
                &dim,
                &format!("must lie in {MIN_DIM}..={MAX_DIM}"),
            ));
        }
        let size = comm.size();
        if size == 0 || !dim.is_multiple_of(size) {
            return Err(invalid_parameter(
                "ranks",
                &size,
                &format!("must evenly divide the grid dimension {dim}"),
            ));
        }

        let block = dim / size;
        Ok(Self {
            block,
            comm,
            // The haloed block is a single band
            executor: executor.with_band_rows(block + 2),
            boundary,
            dim,
        })
    }

    /// Rows owned by each rank
    pub const fn block(&self) -> usize {
        self.block
    }

    /// Boundary treatment in use
    pub const fn boundary(&self) -> BoundaryMode {
        self.boundary
    }

    /// Global row range owned by `rank`
    pub const fn owned_rows(&self, rank: usize) -> std::ops::Range<usize> {
        rank * self.block..(rank + 1) * self.block
    }

    /// Local rows (inside the haloed block) the rule is applied to
    fn computed_rows(&self) -> std::ops::Range<usize> {
        let owned = self.owned_rows(self.comm.rank());
        let (first, last) = match self.boundary {
            BoundaryMode::Exchange => (owned.start.max(1), owned.end.min(self.dim - 1)),
            BoundaryMode::Frozen => (owned.start + 1, owned.end.saturating_sub(1)),
        };
        // Local row 0 is the upper halo
        let to_local = |row: usize| row + 1 - owned.start;
        to_local(first)..to_local(last.max(first))
    }

    /// Swap first and last block rows with the neighbouring ranks
    fn exchange_halos(&self, local: &mut Grid) -> Result<()> {
        let rank = self.comm.rank();
        let last = self.comm.size() - 1;

        if rank > 0 {
            self.comm
                .send_cells(rank - 1, Tag::Halo, local.rows_to_vec(1..2))?;
        }
        if rank < last {
            self.comm.send_cells(
                rank + 1,
                Tag::Halo,
                local.rows_to_vec(self.block..self.block + 1),
            )?;
        }
        if rank > 0 {
            let above = self.comm.recv_cells(rank - 1, Tag::Halo)?;
            local.write_rows(0, &above);
        }
        if rank < last {
            let below = self.comm.recv_cells(rank + 1, Tag::Halo)?;
            local.write_rows(self.block + 1, &below);
        }
        Ok(())
    }
}

impl<C: Communicator> Stepper for Distributed<C> {
    fn name(&self) -> &'static str {
        "distributed"
    }

    fn run_generation(&mut self, current: &Grid, next: &mut Grid) -> Result<bool> {
        let rank = self.comm.rank();
        for (name, grid) in [("current", current), ("next", &*next)] {
            if grid.dim() != (self.dim, self.dim) {
                return Err(invalid_parameter(
                    name,
                    &format!("{}x{}", grid.rows(), grid.cols()),
                    &format!("buffer must be {}x{}", self.dim, self.dim),
                ));
            }
        }

        let parts = if rank == COORDINATOR_RANK {
            (0..self.comm.size())
                .map(|owner| current.rows_to_vec(self.owned_rows(owner)))
                .collect()
        } else {
            Vec::new()
        };
        let rows = self.comm.scatter(COORDINATOR_RANK, parts)?;
        if rows.len() != self.block * self.dim {
            return Err(communication_error(
                rank,
                "scatter",
                &format!("received {} cells, expected {}", rows.len(), self.block * self.dim),
            ));
        }

        let mut local = Grid::new(self.block + 2, self.dim);
        local.write_rows(1, &rows);
        if self.boundary == BoundaryMode::Exchange {
            self.exchange_halos(&mut local)?;
        }

        let mut local_next = local.clone();
        let region = Region::new(self.computed_rows(), 1..self.dim - 1);
        let blocks = self.executor.decompose_rows(&mut local_next, region);
        let changed = self.executor.dispatch(&local, blocks).any();

        let computed = local_next.rows_to_vec(1..self.block + 1);
        next.write_rows(self.owned_rows(rank).start, &computed);
        let gathered = self.comm.gather(COORDINATOR_RANK, computed)?;
        for (owner, part) in gathered.iter().enumerate() {
            next.write_rows(self.owned_rows(owner).start, part);
        }

        let any = self.comm.all_reduce_or(COORDINATOR_RANK, changed)?;
        debug!(rank, local = changed, global = any, "rank generation complete");
        Ok(any)
    }
}

/// Parameters of an in-process cluster run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Number of ranks
    pub ranks: usize,
    /// Treatment of block edge rows
    pub boundary: BoundaryMode,
    /// Shared-memory policy each rank uses for its block
    pub policy: Policy,
    /// Worker threads per rank (0 selects the available parallelism)
    pub workers: usize,
}

/// Result of a cluster run as seen by the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterOutcome {
    /// Coordinator's grid after the last generation
    pub grid: Grid,
    /// Stabilization generation, or 0
    pub generation: u32,
}

/// Run the distributed strategy with one thread per rank
///
/// Every rank starts from a copy of `initial`; only the coordinator's copy is
/// scattered.
///
/// # Errors
///
/// Returns the first rank failure in rank order, or a communication error if
/// a rank thread panicked
pub fn run_cluster(initial: &Grid, config: ClusterConfig, nb_iter: u32) -> Result<ClusterOutcome> {
    let communicators = LocalCluster::connect(config.ranks)?;
    let dim = initial.rows();
    if initial.cols() != dim {
        return Err(invalid_parameter(
            "grid",
            &format!("{}x{}", initial.rows(), initial.cols()),
            &"distributed runs need a square grid",
        ));
    }

    info!(
        ranks = config.ranks,
        boundary = %config.boundary,
        policy = %config.policy,
        nb_iter,
        "starting cluster run"
    );

    let results: Vec<Result<ClusterOutcome>> = std::thread::scope(|scope| {
        let handles: Vec<_> = communicators
            .into_iter()
            .map(|comm| {
                let rank = comm.rank();
                let handle = scope.spawn(move || -> Result<ClusterOutcome> {
                    let executor = Executor::new(config.policy, config.workers)?;
                    let stepper = Distributed::new(comm, executor, config.boundary, dim)?;
                    let mut buffers = DoubleBuffer::new(initial.clone());
                    let generation = Driver::new(stepper).run(&mut buffers, nb_iter)?;
                    Ok(ClusterOutcome {
                        grid: buffers.into_current(),
                        generation,
                    })
                });
                (rank, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(rank, handle)| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(communication_error(rank, "join", &"rank panicked")))
            })
            .collect()
    });

    let mut coordinator = None;
    for (rank, result) in results.into_iter().enumerate() {
        let outcome = result?;
        if rank == COORDINATOR_RANK {
            coordinator = Some(outcome);
        }
    }
    coordinator.ok_or_else(|| communication_error(COORDINATOR_RANK, "join", &"no coordinator rank"))
}
