//! Greedy tower placement over an obstructed city grid.
//!
//! A [`GridState`] classifies every block as blocked, free, covered, or
//! tower. [`CoveragePlanner`] repeatedly places the tower whose square
//! footprint covers the most still-free blocks until nothing is left
//! uncovered. This approximates minimum set cover; it is not optimal.

pub mod config;
pub mod constants;
pub mod coverage_index;
pub mod error;
pub mod grid;
pub mod location;
pub mod obstruction;
pub mod pipeline;
pub mod plan;
pub mod planner;

pub mod visual;
pub use visual::*;

pub use config::CityConfig;
pub use error::{CoverageError, Result};
pub use grid::{CellMask, CellState, GridState};
pub use location::Location;
pub use obstruction::{ObstructionSource, RandomObstructions};
pub use pipeline::{CpuBudget, ScanStrategy};
pub use planner::*;
