//! Distributed-memory backend
//!
//! The grid is cut into horizontal row blocks, one per rank. The coordinator
//! scatters blocks of the current generation, every rank computes its block,
//! and the results are gathered back before the change flags are OR-reduced
//! so all ranks leave the generation loop together.

/// Rank communicators and collectives
pub mod comm;
/// Row-block stepper and in-process cluster runner
pub mod strategy;

pub use comm::{Communicator, LocalCluster, LocalCommunicator};
pub use strategy::{BoundaryMode, ClusterConfig, ClusterOutcome, Distributed, run_cluster};
