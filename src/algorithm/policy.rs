//! Scheduling policies for distributing work blocks to workers

use std::fmt;
use std::str::FromStr;

use crate::io::configuration::{DEFAULT_CYCLIC_CHUNK, DEFAULT_DYNAMIC_CHUNK};
use crate::io::error::{LifeError, Result, invalid_parameter};

/// Where the task-graph policy waits for its spawned tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskBarrier {
    /// Wait at the end of every tile row
    #[default]
    PerTileRow,
    /// Wait once at the end of the whole sweep
    PerSweep,
}

/// How the work of one generation is distributed over workers
///
/// Every policy computes bit-identical results; they differ only in which
/// worker processes which block and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// One worker walks every block in row-major order
    Sequential,
    /// Blocks split into contiguous equal groups, one per worker
    StaticBlock,
    /// Chunks of `chunk` rows dealt round-robin to workers
    StaticCyclic {
        /// Rows per chunk
        chunk: usize,
    },
    /// Chunks of `chunk` rows pulled from a shared queue as workers free up
    Dynamic {
        /// Rows per chunk
        chunk: usize,
    },
    /// Row and column loops fused into one index space before splitting
    Collapsed,
    /// One asynchronous task per block, joined at a barrier
    TaskGraph {
        /// Where spawned tasks are awaited
        barrier: TaskBarrier,
    },
}

impl Policy {
    /// Every policy with its default parameters
    pub const ALL: [Self; 7] = [
        Self::Sequential,
        Self::StaticBlock,
        Self::StaticCyclic {
            chunk: DEFAULT_CYCLIC_CHUNK,
        },
        Self::Dynamic {
            chunk: DEFAULT_DYNAMIC_CHUNK,
        },
        Self::Collapsed,
        Self::TaskGraph {
            barrier: TaskBarrier::PerTileRow,
        },
        Self::TaskGraph {
            barrier: TaskBarrier::PerSweep,
        },
    ];

    /// Short name used on the command line and in logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sequential => "seq",
            Self::StaticBlock => "static",
            Self::StaticCyclic { .. } => "cyclic",
            Self::Dynamic { .. } => "dynamic",
            Self::Collapsed => "collapse",
            Self::TaskGraph {
                barrier: TaskBarrier::PerTileRow,
            } => "task",
            Self::TaskGraph {
                barrier: TaskBarrier::PerSweep,
            } => "task-sweep",
        }
    }

    /// Whether the policy runs on a worker pool
    pub const fn is_parallel(&self) -> bool {
        !matches!(self, Self::Sequential)
    }

    /// Rows per block when the interior is cut into row chunks
    pub fn rows_per_block(&self, rows: usize, workers: usize) -> usize {
        match self {
            Self::Sequential | Self::Collapsed => rows.max(1),
            Self::StaticBlock => rows.div_ceil(workers.max(1)).max(1),
            Self::StaticCyclic { chunk } | Self::Dynamic { chunk } => (*chunk).max(1),
            Self::TaskGraph { .. } => 1,
        }
    }

    /// Check policy parameters
    ///
    /// # Errors
    ///
    /// Returns an error if a chunk size is zero
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::StaticCyclic { chunk: 0 } | Self::Dynamic { chunk: 0 } => Err(
                invalid_parameter("chunk", &0, &"chunks must hold at least one row"),
            ),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaticCyclic { chunk } | Self::Dynamic { chunk } => {
                write!(f, "{}:{chunk}", self.name())
            }
            _ => f.write_str(self.name()),
        }
    }
}

impl FromStr for Policy {
    type Err = LifeError;

    /// Parse `name` or `name:chunk` (chunk only for `cyclic` and `dynamic`)
    fn from_str(value: &str) -> Result<Self> {
        let (name, chunk) = match value.split_once(':') {
            Some((name, chunk)) => {
                let parsed = chunk.parse::<usize>().map_err(|error| {
                    invalid_parameter("strategy", &value, &format!("bad chunk size: {error}"))
                })?;
                (name, Some(parsed))
            }
            None => (value, None),
        };

        let policy = match (name.to_ascii_lowercase().as_str(), chunk) {
            ("seq" | "sequential", None) => Self::Sequential,
            ("static" | "block", None) => Self::StaticBlock,
            ("cyclic", chunk) => Self::StaticCyclic {
                chunk: chunk.unwrap_or(DEFAULT_CYCLIC_CHUNK),
            },
            ("dynamic", chunk) => Self::Dynamic {
                chunk: chunk.unwrap_or(DEFAULT_DYNAMIC_CHUNK),
            },
            ("collapse" | "collapsed", None) => Self::Collapsed,
            ("task", None) => Self::TaskGraph {
                barrier: TaskBarrier::PerTileRow,
            },
            ("task-sweep", None) => Self::TaskGraph {
                barrier: TaskBarrier::PerSweep,
            },
            _ => {
                return Err(invalid_parameter(
                    "strategy",
                    &value,
                    &"expected seq, static, cyclic[:n], dynamic[:n], collapse, task or task-sweep",
                ));
            }
        };
        policy.validate()?;
        Ok(policy)
    }
}

/// Shape of the blocks a sweep hands to the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    /// Chunks of interior rows spanning the full interior width
    #[default]
    Rows,
    /// The GRAIN×GRAIN tiles of the partition
    Tiles,
}

impl Granularity {
    /// Short name used on the command line and in logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rows => "rows",
            Self::Tiles => "tiles",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Granularity {
    type Err = LifeError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "rows" | "row" => Ok(Self::Rows),
            "tiles" | "tile" | "tiled" => Ok(Self::Tiles),
            _ => Err(invalid_parameter(
                "granularity",
                &value,
                &"expected rows or tiles",
            )),
        }
    }
}
