//! Running moments of mutation times and population sizes.

use crate::base::{Array2D, Array3D};
use crate::errors::Result;
use crate::probability::Moment;
use crate::process::Process;
use crate::statistics::distribution::GathererOptions;
use crate::statistics::gatherer::StatisticsGatherer;
use crate::statistics::{node_population, node_population_whole};

/// Default trial cap for population moments.
pub const POPULATION_MOMENT_TRIALS: u64 = 1000;

/// `None` skips the trial for that accumulator.
type SampleFn = fn(&Process, [usize; 3]) -> Result<Option<f64>>;
type SampleWholeFn = fn(&Process, [usize; 2]) -> Result<Option<f64>>;

/// Grid of raw moments. Converges once the observed moment has seen
/// `trials_cap` samples.
#[derive(Debug, Clone)]
pub struct MomentStatistics {
    moments: Array3D<Moment>,
    moments_whole: Array2D<Moment>,
    observed: [usize; 3],
    trials_cap: u64,
    sample: SampleFn,
    sample_whole: SampleWholeFn,
}

impl MomentStatistics {
    fn build(
        dims: [usize; 3],
        order: i32,
        options: &GathererOptions,
        sample: SampleFn,
        sample_whole: SampleWholeFn,
    ) -> Result<Self> {
        let [_, rows, cols] = dims;
        let moments = Array3D::try_from_fn(dims, |_| Moment::new(order))?;
        let moments_whole = Array2D::try_from_fn([rows, cols], |_| Moment::new(order))?;
        let observed = [options.pop, options.species.unwrap_or(rows.saturating_sub(1)), options.node.unwrap_or(0)];
        moments.at(observed)?;
        Ok(Self {
            moments,
            moments_whole,
            observed,
            trials_cap: options.trials_cap,
            sample,
            sample_whole,
        })
    }

    /// Moments of the first-arrival time, over trials in which the species arose.
    pub fn mutation_time(template: &Process, order: i32, options: &GathererOptions) -> Result<Self> {
        Self::build(
            [template.number_sub_pops(), template.number_species(), 1],
            order,
            options,
            |p, [pop, spe, _]| {
                if p.fate_bool(pop, spe)? {
                    p.first_mutation_time(pop, spe)
                } else {
                    Ok(None)
                }
            },
            |p, [spe, _]| {
                if p.fate_bool_whole(spe)? {
                    p.mutation_time_whole(spe)
                } else {
                    Ok(None)
                }
            },
        )
    }

    /// Moments of every species' size at every grid node.
    pub fn population(template: &Process, order: i32, options: &GathererOptions) -> Result<Self> {
        Self::build(
            [template.number_sub_pops(), template.number_species(), template.path().number_nodes()],
            order,
            options,
            |p, [pop, spe, node]| Ok(Some(node_population(p, pop, spe, node)? as f64)),
            |p, [spe, node]| Ok(Some(node_population_whole(p, spe, node)? as f64)),
        )
    }

    pub fn moment(&self, pop: usize, row: usize, col: usize) -> Result<&Moment> {
        self.moments.at([pop, row, col])
    }

    pub fn moment_whole(&self, row: usize, col: usize) -> Result<&Moment> {
        self.moments_whole.at([row, col])
    }
}

impl StatisticsGatherer for MomentStatistics {
    /// `None` while an accumulator has no samples.
    type Results = Option<f64>;

    fn dump(&mut self, process: &Process) -> Result<()> {
        let [pops, rows, cols] = self.moments.dims();
        for pop in 0..pops {
            for row in 0..rows {
                for col in 0..cols {
                    if let Some(x) = (self.sample)(process, [pop, row, col])? {
                        self.moments.at_mut([pop, row, col])?.update(x);
                    }
                }
            }
        }
        for row in 0..rows {
            for col in 0..cols {
                if let Some(x) = (self.sample_whole)(process, [row, col])? {
                    self.moments_whole.at_mut([row, col])?.update(x);
                }
            }
        }
        Ok(())
    }

    fn converged(&self) -> bool {
        self.trials() >= self.trials_cap
    }

    fn results(&self) -> Result<Array3D<Option<f64>>> {
        Ok(self.moments.map(|m| m.value().ok()))
    }

    fn results_whole(&self) -> Result<Array2D<Option<f64>>> {
        Ok(self.moments_whole.map(|m| m.value().ok()))
    }

    fn trials(&self) -> u64 {
        self.moments.at(self.observed).map_or(0, Moment::trials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{PopulationMatrix, rng_from_seed};
    use crate::process::{BranchingProcess, TimeGrid, TimeKind};

    fn doubling(rows: Vec<Vec<i64>>, ticks: f64) -> Process {
        let initial = PopulationMatrix::from_rows(rows).unwrap();
        let grid = TimeGrid::uniform(ticks as usize + 1, ticks, TimeKind::Discrete).unwrap();
        let mut process: Process = BranchingProcess::chain(initial, vec![0.0], 1.0, 1.0, grid).unwrap().into();
        let mut rng = rng_from_seed(Some(5));
        while !process.is_terminal() {
            process.advance(&mut rng).unwrap();
        }
        process
    }

    #[test]
    fn test_population_mean_per_node() {
        let process = doubling(vec![vec![3, 1]], 2.0);
        let options = GathererOptions {
            trials_cap: 2,
            ..GathererOptions::default()
        };
        let mut stats = MomentStatistics::population(&process, 1, &options).unwrap();
        stats.dump(&process).unwrap();
        assert!(!stats.converged());
        stats.dump(&process).unwrap();
        assert!(stats.converged());
        let results = stats.results().unwrap();
        assert_eq!(results.dims(), [1, 2, 3]);
        assert_eq!(results.at([0, 0, 2]).unwrap(), &Some(12.0));
        assert_eq!(results.at([0, 1, 1]).unwrap(), &Some(1.0));
        let whole = stats.results_whole().unwrap();
        assert_eq!(whole.at([0, 1]).unwrap(), &Some(6.0));
    }

    #[test]
    fn test_mutation_time_skips_extinguished_sub_population() {
        let process = doubling(vec![vec![2, 1], vec![0, 0]], 1.0);
        let mut stats = MomentStatistics::mutation_time(&process, 1, &GathererOptions::default()).unwrap();
        stats.dump(&process).unwrap();
        assert_eq!(stats.moment(1, 0, 0).unwrap().trials(), 0);
        let results = stats.results().unwrap();
        assert_eq!(results.at([1, 1, 0]).unwrap(), &None);
        assert_eq!(results.at([0, 1, 0]).unwrap(), &Some(0.0));
        assert_eq!(stats.results_whole().unwrap().at([0, 0]).unwrap(), &Some(0.0));
    }

    #[test]
    fn test_mutation_time_moments() {
        let process = doubling(vec![vec![2, 1], vec![3, 0]], 1.0);
        let mut stats = MomentStatistics::mutation_time(&process, 2, &GathererOptions::default()).unwrap();
        assert!(stats.dump(&process).is_err());

        let process = doubling(vec![vec![2, 1], vec![4, 2]], 1.0);
        let mut stats = MomentStatistics::mutation_time(&process, 2, &GathererOptions::default()).unwrap();
        stats.dump(&process).unwrap();
        let results = stats.results().unwrap();
        assert_eq!(results.at([1, 1, 0]).unwrap(), &Some(0.0));
        assert_eq!(stats.moment(0, 0, 0).unwrap().trials(), 1);
    }
}
