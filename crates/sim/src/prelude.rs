//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use mutacc_sim::prelude::*;
//!
//! let initial = PopulationMatrix::from_row(vec![100, 0]).unwrap();
//! let grid = TimeGrid::span(10.0, TimeKind::Discrete).unwrap();
//! let process: Process = BranchingProcess::chain(initial, vec![0.0], 1.0, 1.0, grid).unwrap().into();
//! assert_eq!(process.number_species(), 2);
//! ```

pub use crate::base::{Count, PopulationMatrix, SimRng, rng_from_seed};
pub use crate::errors::{Result, SimError};
pub use crate::probability::Accumulator;
pub use crate::process::{BranchingProcess, Fate, MoranProcess, Process, TimeGrid, TimeKind};
pub use crate::simulation::{Configuration, MonteCarlo, ProcessBuilder, ProcessFactory, TrialPolicy};
pub use crate::statistics::{
    CdfStatistics, GathererOptions, MomentStatistics, PmfStatistics, Statistics, StatisticsGatherer,
};
