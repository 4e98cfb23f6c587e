//! Interface shared by every statistic the Monte Carlo driver feeds.

use crate::base::{Array2D, Array3D};
use crate::errors::Result;
use crate::process::Process;

/// Hard cap on trials for histogram-based statistics.
pub const DEFAULT_TRIALS_CAP: u64 = 1_000_000_000_000;

/// Folds finished trials into per-sub-population and whole-population results.
pub trait StatisticsGatherer: Send {
    /// Result type held per accumulator.
    type Results;

    /// Fold the terminal state of one trial into the statistics.
    fn dump(&mut self, process: &Process) -> Result<()>;

    /// True once the observed accumulator has enough data, or the trial cap is hit.
    fn converged(&self) -> bool;

    /// Get the results so far, indexed by `(pop, row, col)`.
    fn results(&self) -> Result<Array3D<Self::Results>>;

    /// Get the whole-population results so far, indexed by `(row, col)`.
    fn results_whole(&self) -> Result<Array2D<Self::Results>>;

    /// Number of trials folded into the observed accumulator.
    fn trials(&self) -> u64;
}
