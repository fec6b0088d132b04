//! Worker pool that runs work blocks under a scheduling policy
//!
//! The executor owns a dedicated rayon pool sized to the requested worker
//! count. Each dispatched block records its own change flag in an
//! `AtomicBool` slot; the pool scope join is the generation barrier, after
//! which the flags are collected into a bitset and OR-reduced by the caller.
//!
//! The per-tile-row task graph joins once per band of `band_rows` grid rows.
//! Row blocks are one row each, so a band holds one task per row of a tile
//! row; tile blocks start on the first row of their band.

use std::sync::atomic::{AtomicBool, Ordering};

use bitvec::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::trace;

use crate::algorithm::policy::{Policy, TaskBarrier};
use crate::io::configuration::resolve_workers;
use crate::io::error::Result;
use crate::spatial::blocks::{Block, flattened_blocks, row_blocks};
use crate::spatial::grid::Grid;
use crate::spatial::tiles::Region;

/// A block paired with its position in the dispatch order
type Indexed<'a> = (usize, Block<'a>);

/// Runs blocks on a worker pool according to a [`Policy`]
pub struct Executor {
    policy: Policy,
    workers: usize,
    band_rows: usize,
    pool: Option<ThreadPool>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("policy", &self.policy)
            .field("workers", &self.workers)
            .field("band_rows", &self.band_rows)
            .finish_non_exhaustive()
    }
}

impl Executor {
    /// Create an executor; `workers == 0` selects the available parallelism
    ///
    /// # Errors
    ///
    /// Returns an error if the policy parameters are invalid or the worker
    /// pool cannot be created
    pub fn new(policy: Policy, workers: usize) -> Result<Self> {
        policy.validate()?;
        if !policy.is_parallel() {
            return Ok(Self::sequential());
        }

        let workers = resolve_workers(workers);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("life-worker-{index}"))
            .build()?;

        Ok(Self {
            policy,
            workers,
            band_rows: 1,
            pool: Some(pool),
        })
    }

    /// Single-worker executor with no pool
    pub const fn sequential() -> Self {
        Self {
            policy: Policy::Sequential,
            workers: 1,
            band_rows: 1,
            pool: None,
        }
    }

    /// Set the height of the row band a per-tile-row task graph joins on
    #[must_use]
    pub const fn with_band_rows(mut self, rows: usize) -> Self {
        self.band_rows = if rows == 0 { 1 } else { rows };
        self
    }

    /// Scheduling policy in use
    pub const fn policy(&self) -> Policy {
        self.policy
    }

    /// Number of workers blocks are spread over
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Height of the row band the per-tile-row task graph joins on
    pub const fn band_rows(&self) -> usize {
        self.band_rows
    }

    /// Number of tasks between consecutive barriers when `blocks` are dispatched
    ///
    /// Only the per-tile-row task graph joins more than once; every other
    /// policy forms a single group.
    pub fn barrier_groups(&self, blocks: &[Block<'_>]) -> Vec<usize> {
        group_consecutive(blocks.iter(), |block| self.barrier_key(block))
            .iter()
            .map(Vec::len)
            .collect()
    }

    /// Barrier band a block belongs to
    fn barrier_key(&self, block: &Block<'_>) -> Option<usize> {
        match self.policy {
            Policy::TaskGraph {
                barrier: TaskBarrier::PerTileRow,
            } => block.origin().map(|origin| origin[0] / self.band_rows),
            _ => Some(0),
        }
    }

    /// Cut `region` of `next` into row-based blocks suited to the policy
    ///
    /// The collapsed policy flattens the region and produces one block per
    /// worker; every other policy produces chunks of whole rows.
    pub fn decompose_rows<'a>(&self, next: &'a mut Grid, region: Region) -> Vec<Block<'a>> {
        match self.policy {
            Policy::Collapsed => flattened_blocks(next, region, self.workers),
            policy => row_blocks(
                next,
                region,
                policy.rows_per_block(region.height(), self.workers),
            ),
        }
    }

    /// Apply the rule to every block and return one change flag per block
    ///
    /// Flags are in the order the blocks were supplied. All workers have
    /// finished when this returns.
    pub fn dispatch(&self, current: &Grid, blocks: Vec<Block<'_>>) -> BitVec {
        let flags: Vec<AtomicBool> = blocks.iter().map(|_| AtomicBool::new(false)).collect();
        let indexed: Vec<Indexed<'_>> = blocks.into_iter().enumerate().collect();

        trace!(
            policy = %self.policy,
            blocks = indexed.len(),
            workers = self.workers,
            "dispatching blocks"
        );

        match (self.policy, &self.pool) {
            (Policy::Sequential, _) | (_, None) => run_lane(current, &flags, indexed),
            (Policy::StaticBlock | Policy::Collapsed, Some(pool)) => {
                run_lanes(pool, current, &flags, contiguous(indexed, self.workers));
            }
            (Policy::StaticCyclic { .. }, Some(pool)) => {
                run_lanes(pool, current, &flags, round_robin(indexed, self.workers));
            }
            (Policy::Dynamic { .. }, Some(pool)) => {
                run_queue(pool, current, &flags, indexed, self.workers);
            }
            (Policy::TaskGraph { .. }, Some(pool)) => {
                let groups = group_consecutive(indexed, |(_, block)| self.barrier_key(block));
                run_tasks(pool, current, &flags, groups);
            }
        }

        flags.into_iter().map(AtomicBool::into_inner).collect()
    }
}

fn record(flags: &[AtomicBool], index: usize, changed: bool) {
    if let Some(flag) = flags.get(index) {
        flag.store(changed, Ordering::Relaxed);
    }
}

fn run_lane(current: &Grid, flags: &[AtomicBool], lane: Vec<Indexed<'_>>) {
    for (index, block) in lane {
        record(flags, index, block.update(current));
    }
}

/// Split blocks into `workers` contiguous groups of near-equal length
fn contiguous(indexed: Vec<Indexed<'_>>, workers: usize) -> Vec<Vec<Indexed<'_>>> {
    let workers = workers.max(1);
    let total = indexed.len();
    let mut lanes: Vec<Vec<Indexed<'_>>> = (0..workers).map(|_| Vec::new()).collect();
    for item in indexed {
        let lane = item.0 * workers / total.max(1);
        if let Some(target) = lanes.get_mut(lane) {
            target.push(item);
        }
    }
    lanes
}

/// Deal blocks to `workers` lanes in turn
fn round_robin(indexed: Vec<Indexed<'_>>, workers: usize) -> Vec<Vec<Indexed<'_>>> {
    let workers = workers.max(1);
    let mut lanes: Vec<Vec<Indexed<'_>>> = (0..workers).map(|_| Vec::new()).collect();
    for item in indexed {
        if let Some(target) = lanes.get_mut(item.0 % workers) {
            target.push(item);
        }
    }
    lanes
}

/// Run each lane as one job on the pool and wait for all of them
fn run_lanes(pool: &ThreadPool, current: &Grid, flags: &[AtomicBool], lanes: Vec<Vec<Indexed<'_>>>) {
    pool.scope(|scope| {
        for lane in lanes.into_iter().filter(|lane| !lane.is_empty()) {
            scope.spawn(move |_| run_lane(current, flags, lane));
        }
    });
}

/// Workers pull blocks one at a time from a shared queue until it drains
fn run_queue(
    pool: &ThreadPool,
    current: &Grid,
    flags: &[AtomicBool],
    indexed: Vec<Indexed<'_>>,
    workers: usize,
) {
    let (sender, receiver) = crossbeam_channel::bounded(indexed.len());
    for item in indexed {
        if sender.try_send(item).is_err() {
            break;
        }
    }
    drop(sender);

    pool.scope(|scope| {
        for _ in 0..workers.max(1) {
            let receiver = receiver.clone();
            scope.spawn(move |_| {
                for (index, block) in receiver.iter() {
                    record(flags, index, block.update(current));
                }
            });
        }
    });
}

/// Spawn one task per block, joining after each group
fn run_tasks(pool: &ThreadPool, current: &Grid, flags: &[AtomicBool], groups: Vec<Vec<Indexed<'_>>>) {
    for group in groups {
        // Leaving the scope waits for every task spawned inside it
        pool.scope(|scope| {
            for (index, block) in group {
                scope.spawn(move |_| record(flags, index, block.update(current)));
            }
        });
    }
}

/// Group consecutive items that share a key
fn group_consecutive<T, K: PartialEq>(
    items: impl IntoIterator<Item = T>,
    key: impl Fn(&T) -> K,
) -> Vec<Vec<T>> {
    let mut groups: Vec<(K, Vec<T>)> = Vec::new();
    for item in items {
        let item_key = key(&item);
        match groups.last_mut() {
            Some((last, group)) if *last == item_key => group.push(item),
            _ => groups.push((item_key, vec![item])),
        }
    }
    groups.into_iter().map(|(_, group)| group).collect()
}
