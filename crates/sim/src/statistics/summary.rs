//! Scalar summaries read off accumulated statistics.

use crate::errors::{Result, SimError};
use crate::probability::{Accumulator, Sample, SampleSpaceProbability};
use crate::process::TimeGrid;
use crate::statistics::distribution::{CdfStatistics, PmfStatistics};
use crate::statistics::gatherer::StatisticsGatherer;
use crate::statistics::moment::MomentStatistics;

/// Get the estimated probability that `spe` arose in `pop`.
pub fn probability_mutation_fate(stats: &PmfStatistics, pop: usize, spe: usize) -> Result<f64> {
    Ok(stats.histogram(pop, spe, 0)?.probability_true())
}

/// Get the estimated probability that `spe` arose anywhere.
pub fn probability_mutation_fate_whole(stats: &PmfStatistics, spe: usize) -> Result<f64> {
    Ok(stats.histogram_whole(spe, 0)?.probability_true())
}

/// Whole-population probability for the last species.
pub fn probability_mutation_fate_last(stats: &PmfStatistics) -> Result<f64> {
    let rows = stats.results_whole()?.dim(0);
    let last = rows
        .checked_sub(1)
        .ok_or_else(|| SimError::mismatch("statistics hold no species"))?;
    probability_mutation_fate_whole(stats, last)
}

/// Mean of a non-negative integer variable from its CDF on `0, 1, 2, ..`.
///
/// Uses `E[X] = sum_x P(X > x)`. Only meaningful when the support covers
/// every integer up to the largest attainable value.
pub fn mean_from_cdf(cdf: &SampleSpaceProbability<f64>) -> f64 {
    cdf.probability.iter().map(|p| 1.0 - p).sum()
}

/// Mean from a probability mass function.
pub fn mean_from_pmf<S: Sample>(pmf: &SampleSpaceProbability<S>) -> f64 {
    pmf.sample_space
        .iter()
        .zip(&pmf.probability)
        .map(|(x, p)| x.value() * p)
        .sum()
}

/// Mean size of `spe` in `pop` at every node of `grid`, as `(time, mean)`.
pub fn mean_population_versus_time(
    stats: &CdfStatistics,
    grid: &TimeGrid,
    pop: usize,
    spe: usize,
) -> Result<Vec<(f64, f64)>> {
    grid.nodes()
        .iter()
        .enumerate()
        .map(|(node, &t)| Ok((t, mean_from_cdf(&stats.histogram(pop, spe, node)?.histogram().snapshot()))))
        .collect()
}

/// Get the moment of the mutation time of `spe` in `pop`, if any trial produced it.
pub fn moment_time(stats: &MomentStatistics, pop: usize, spe: usize) -> Result<Option<f64>> {
    Ok(stats.moment(pop, spe, 0)?.value().ok())
}

pub fn moment_time_whole(stats: &MomentStatistics, spe: usize) -> Result<Option<f64>> {
    Ok(stats.moment_whole(spe, 0)?.value().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::PopulationMatrix;
    use crate::process::{BranchingProcess, Process, TimeKind};
    use crate::statistics::distribution::GathererOptions;

    #[test]
    fn test_mean_from_cdf_and_pmf() {
        // X uniform on {0, 1, 2}
        let cdf = SampleSpaceProbability::new(vec![0.0, 1.0, 2.0], vec![1.0 / 3.0, 2.0 / 3.0, 1.0]);
        assert!((mean_from_cdf(&cdf) - 1.0).abs() < 1e-12);
        let pmf = SampleSpaceProbability::new(vec![0.0, 1.0, 2.0], vec![0.25, 0.5, 0.25]);
        assert!((mean_from_pmf(&pmf) - 1.0).abs() < 1e-12);
        let bernoulli = SampleSpaceProbability::new(vec![false, true], vec![0.3, 0.7]);
        assert!((mean_from_pmf(&bernoulli) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_probability_of_fate() {
        let initial = PopulationMatrix::from_rows(vec![vec![1, 1], vec![2, 0]]).unwrap();
        let grid = TimeGrid::uniform(2, 1.0, TimeKind::Discrete).unwrap();
        let mut process: Process = BranchingProcess::chain(initial, vec![0.0], 1.0, 0.0, grid).unwrap().into();
        let mut rng = crate::base::rng_from_seed(Some(9));
        process.advance(&mut rng).unwrap();
        let mut stats = PmfStatistics::lifetime_risk(&process, &GathererOptions::default()).unwrap();
        assert_eq!(probability_mutation_fate_last(&stats).unwrap(), -1.0);
        stats.dump(&process).unwrap();
        assert_eq!(probability_mutation_fate(&stats, 0, 1).unwrap(), 1.0);
        assert_eq!(probability_mutation_fate(&stats, 1, 1).unwrap(), 0.0);
        assert_eq!(probability_mutation_fate_last(&stats).unwrap(), 1.0);
    }
}
