//! Statistics gathered over many independent trials.

pub mod distribution;
pub mod gatherer;
pub mod kind;
pub mod moment;
pub mod summary;

pub use distribution::{CdfStatistics, DistributionStatistics, GathererOptions, PmfStatistics, threshold_frequency};
pub use gatherer::{DEFAULT_TRIALS_CAP, StatisticsGatherer};
pub use kind::{ResultRecord, StatisticKind, Statistics, StatisticsResult};
pub use moment::{MomentStatistics, POPULATION_MOMENT_TRIALS};

use crate::base::Count;
use crate::errors::{Result, SimError};
use crate::process::Process;

/// Size of `spe` in `pop` at `node`.
///
/// A trial that stopped early because every sub-population went extinct has
/// an absorbing final state, which then stands for all unrecorded nodes.
pub(crate) fn node_population(process: &Process, pop: usize, spe: usize, node: usize) -> Result<Count> {
    let path = process.path();
    if node < path.number_filled_nodes() || node >= path.number_nodes() {
        process.path_population(pop, spe, node)
    } else if process.extinguished_all() {
        process.population(pop, spe)
    } else {
        Err(SimError::IncompletePath { pop, species: spe })
    }
}

/// Size of `spe` summed over sub-populations at `node`.
pub(crate) fn node_population_whole(process: &Process, spe: usize, node: usize) -> Result<Count> {
    (0..process.number_sub_pops())
        .map(|pop| node_population(process, pop, spe, node))
        .sum()
}
