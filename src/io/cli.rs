//! Command-line interface for running one simulation and reporting its outcome

use crate::accelerator::{Accelerator, HostDevice};
use crate::algorithm::driver::Driver;
use crate::algorithm::policy::{Granularity, Policy};
use crate::distributed::{BoundaryMode, ClusterConfig, run_cluster};
use crate::io::configuration::{
    DEFAULT_DEVICE_TILE, DEFAULT_DIM, DEFAULT_GRAIN, DEFAULT_ITERATIONS, DEFAULT_PATTERN,
    DEFAULT_RANKS, DEFAULT_RNG_SEED, EngineConfig,
};
use crate::io::error::{Result, invalid_parameter};
use crate::io::progress::GenerationProgress;
use crate::io::seeds::PatternRegistry;
use crate::spatial::grid::{DoubleBuffer, Grid};
use clap::{ArgAction, Parser, ValueEnum};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::info;

/// Where generations are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Worker threads sharing one grid
    Shared,
    /// Row blocks spread over in-process ranks
    Distributed,
    /// Kernel launches on a compute device
    Accelerator,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Shared => "shared",
            Self::Distributed => "distributed",
            Self::Accelerator => "accelerator",
        };
        f.write_str(name)
    }
}

/// Parse a work-group shape written as `ROWSxCOLS` or a single side length
///
/// # Errors
///
/// Returns an error if either side is not a positive integer
pub fn parse_device_tile(value: &str) -> Result<[usize; 2]> {
    let parse = |side: &str| {
        side.trim()
            .parse::<usize>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                invalid_parameter("device_tile", &value, &"sides must be positive integers")
            })
    };
    match value.split_once(['x', 'X']) {
        Some((rows, cols)) => Ok([parse(rows)?, parse(cols)?]),
        None => {
            let side = parse(value)?;
            Ok([side, side])
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "tiled-life")]
#[command(
    author,
    version,
    about = "Run Conway's Game of Life under a choice of parallel strategies"
)]
/// Command-line arguments for a simulation run
pub struct Cli {
    /// Grid side length in cells
    #[arg(short = 'n', long, default_value_t = DEFAULT_DIM)]
    pub dim: usize,

    /// Tiles per dimension (must divide the grid side)
    #[arg(short, long, default_value_t = DEFAULT_GRAIN)]
    pub grain: usize,

    /// Maximum generations to compute
    #[arg(short, long, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: u32,

    /// Initial pattern (guns, stable, random, clown, diehard)
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Seed for the random pattern
    #[arg(long, default_value_t = DEFAULT_RNG_SEED)]
    pub seed: u64,

    /// Execution backend
    #[arg(short, long, value_enum, default_value_t = Backend::Shared)]
    pub backend: Backend,

    /// Scheduling policy: seq, static, cyclic[:n], dynamic[:n], collapse, task, task-sweep
    #[arg(short, long, default_value = "static")]
    pub strategy: Policy,

    /// Work blocks for the shared backend: rows or tiles
    #[arg(long, default_value = "rows")]
    pub granularity: Granularity,

    /// Worker threads (0 uses every available core)
    #[arg(short = 't', long, default_value_t = 0)]
    pub workers: usize,

    /// Skip tiles whose neighbourhood did not change in the last generation
    #[arg(long)]
    pub skip_stable: bool,

    /// Ranks for the distributed backend (must divide the grid side)
    #[arg(long, default_value_t = DEFAULT_RANKS)]
    pub ranks: usize,

    /// Block edge rows for the distributed backend: exchange or frozen
    #[arg(long, default_value = "exchange")]
    pub boundary: BoundaryMode,

    /// Device work-group shape as ROWSxCOLS
    #[arg(long, value_parser = parse_device_tile)]
    pub device_tile: Option<[usize; 2]>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log detail (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Shared-memory engine parameters selected on the command line
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            dim: self.dim,
            grain: self.grain,
            workers: self.workers,
            policy: self.strategy,
            granularity: self.granularity,
            skip_stable_tiles: self.skip_stable,
        }
    }
}

/// Outcome of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Backend that ran the generations
    pub backend: Backend,
    /// Strategy label
    pub strategy: String,
    /// Grid side length
    pub dim: usize,
    /// Generation bound
    pub nb_iter: u32,
    /// Stabilization generation, or 0
    pub generation: u32,
    /// Live cells in the final grid
    pub population: usize,
    /// Wall-clock time of the generation loop
    pub elapsed: Duration,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) on {}x{}: ",
            self.strategy, self.backend, self.dim, self.dim
        )?;
        match (self.backend, self.generation) {
            (Backend::Accelerator, _) => {
                write!(f, "ran {} generations, stabilization not tracked", self.nb_iter)?;
            }
            (_, 0) => write!(f, "still changing after {} generations", self.nb_iter)?,
            (_, generation) => write!(f, "stabilized at generation {generation}")?,
        }
        write!(
            f,
            "; {} live cells; {:.3} ms",
            self.population,
            self.elapsed.as_secs_f64() * 1000.0
        )
    }
}

/// Seeds a grid and runs the selected backend over it
#[derive(Debug)]
pub struct Runner {
    cli: Cli,
    registry: PatternRegistry,
}

impl Runner {
    /// Create a runner for the parsed arguments
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            registry: PatternRegistry::new(),
        }
    }

    /// Build the initial grid, falling back to the default pattern for unknown names
    ///
    /// # Errors
    ///
    /// Returns an error if the default pattern is missing from the registry
    pub fn initial_grid(&self) -> Result<Grid> {
        let fill = self.registry.resolve_or_default(&self.cli.pattern)?;
        let mut grid = Grid::square(self.cli.dim);
        fill(&mut grid, self.cli.seed);
        Ok(grid)
    }

    /// Reject shared-memory options the selected backend cannot honour
    ///
    /// Ranks always cut their blocks into row chunks and recompute them in
    /// full, so tile granularity and dirty-tile skipping have no effect there.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first option the backend would ignore
    pub fn check_backend_options(&self) -> Result<()> {
        if self.cli.backend != Backend::Distributed {
            return Ok(());
        }
        if self.cli.skip_stable {
            return Err(invalid_parameter(
                "skip_stable",
                &true,
                &"dirty-tile skipping is only available on the shared backend",
            ));
        }
        if self.cli.granularity != Granularity::Rows {
            return Err(invalid_parameter(
                "granularity",
                &self.cli.granularity,
                &"distributed ranks always work on row blocks",
            ));
        }
        Ok(())
    }

    /// Run the simulation
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the backend fails
    pub fn run(&self) -> Result<Report> {
        let config = self.cli.engine_config();
        config.validate()?;
        self.check_backend_options()?;
        let initial = self.initial_grid()?;
        let nb_iter = self.cli.iterations;
        let visible = self.cli.should_show_progress();

        info!(
            backend = %self.cli.backend,
            dim = config.dim,
            grain = config.grain,
            pattern = %self.cli.pattern,
            population = initial.population(),
            "starting run"
        );

        let start = Instant::now();
        let (strategy, generation, grid) = match self.cli.backend {
            Backend::Shared => {
                let mut driver = Driver::new(config.build_stepper()?);
                let strategy = driver.stepper().name().to_string();
                let progress = GenerationProgress::new(&strategy, nb_iter, visible);
                let mut buffers = DoubleBuffer::new(initial);
                let generation = driver.run_with(&mut buffers, nb_iter, |generation, changed| {
                    progress.update(generation, changed);
                })?;
                progress.finish(format!("state {:?}", driver.state()));
                (strategy, generation, buffers.into_current())
            }
            Backend::Distributed => {
                let cluster = ClusterConfig {
                    ranks: self.cli.ranks,
                    boundary: self.cli.boundary,
                    policy: config.policy,
                    workers: config.workers,
                };
                let strategy = format!("distributed:{}/{}", cluster.ranks, cluster.boundary);
                let progress = GenerationProgress::spinner(&strategy, visible);
                let outcome = run_cluster(&initial, cluster, nb_iter)?;
                progress.finish(format!("generation {}", outcome.generation));
                (strategy, outcome.generation, outcome.grid)
            }
            Backend::Accelerator => {
                let local = self.cli.device_tile.unwrap_or(DEFAULT_DEVICE_TILE);
                let strategy = format!("device:{}x{}", local[0], local[1]);
                let progress = GenerationProgress::spinner(&strategy, visible);
                let mut accelerator = Accelerator::new(HostDevice::new(), &initial, local)?;
                let generation = accelerator.compute(nb_iter)?;
                progress.finish(format!("{nb_iter} generations"));
                (strategy, generation, accelerator.read_back()?)
            }
        };

        let report = Report {
            backend: self.cli.backend,
            strategy,
            dim: config.dim,
            nb_iter,
            generation,
            population: grid.population(),
            elapsed: start.elapsed(),
        };
        info!(generation = report.generation, population = report.population, "run complete");
        Ok(report)
    }
}
