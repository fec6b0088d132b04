//! Tiled Game of Life engine with interchangeable parallel strategies
//!
//! A fixed-size grid evolves under Conway's B3/S23 rule until a generation
//! changes nothing or a generation bound is reached. The interior is cut into
//! tiles or row blocks that are computed by sequential, thread-pool,
//! task-graph, distributed or device-offload strategies, all of which produce
//! bit-identical grids.

#![forbid(unsafe_code)]

/// Device offload backend
pub mod accelerator;
/// Cell rule, scheduling policies, strategies and the generation driver
pub mod algorithm;
/// Distributed-memory backend over rank communicators
pub mod distributed;
/// Configuration, command-line interface, logging and error handling
pub mod io;
/// Grid storage, tiling and work blocks
pub mod spatial;

pub use io::error::{LifeError, Result};
