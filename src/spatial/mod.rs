//! Spatial data structures and grid partitioning
//!
//! This module contains spatial-related functionality including:
//! - Grid storage and the current/next double buffer
//! - Tile partitioning of the grid interior
//! - Disjoint work blocks carved out of the output grid

/// Disjoint mutable work blocks
pub mod blocks;
/// Grid storage and double buffering
pub mod grid;
/// Tile partitioning of the interior
pub mod tiles;

pub use grid::{DoubleBuffer, Grid};
