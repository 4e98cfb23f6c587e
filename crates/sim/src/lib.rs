//! # Simulation Crate
//!
//! The `sim` crate provides the core logic for simulating mutation
//! accumulation in populations of cells. It includes modules for dense arrays
//! and random sampling, branching and Moran processes with their history
//! bookkeeping, empirical distributions, statistics gatherers, and the Monte
//! Carlo driver that runs trials until the statistics converge.

pub mod base;
pub mod errors;
pub mod prelude;
pub mod probability;
pub mod process;
pub mod simulation;
pub mod statistics;
pub mod storage;

pub use errors::{Result, SimError};
