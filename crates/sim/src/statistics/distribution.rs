//! Grids of histograms filled from finished trials.
//!
//! A [`DistributionStatistics`] holds one accumulator per
//! `(sub-population, row, col)` and one per whole-population `(row, col)`.
//! Rows are species for every statistic here. Columns are grid nodes for
//! population sizes and a single placeholder column otherwise. One per-pop
//! accumulator is observed: it carries the progress logger and decides
//! convergence.

use crate::base::{Array2D, Array3D};
use crate::errors::{Result, SimError, check_probability};
use crate::probability::{
    Accumulator, Cdf, HistogramLogger, Notification, PmfBool, SampleSpaceProbability, logarithmic_sample_space,
    uniform_sample_space,
};
use crate::process::{Process, TimeKind};
use crate::statistics::gatherer::{DEFAULT_TRIALS_CAP, StatisticsGatherer};
use crate::statistics::{node_population, node_population_whole};
use crate::storage::{Checkpoint, DEFAULT_CHECKPOINT_INTERVAL, histogram_file_name, histogram_whole_file_name};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Number of points in a uniform or logarithmic mutation-time support.
pub const MUTATION_TIME_POINTS: usize = 100;
/// Number of points in an extinction-time support.
pub const EXTINCTION_TIME_POINTS: usize = 51;
/// Suggested number of points in a population-size support.
pub const POPULATION_POINTS: usize = 10_000;

type SampleFn<I> = fn(&Process, [usize; 3]) -> Result<I>;
type SampleWholeFn<I> = fn(&Process, [usize; 2]) -> Result<I>;

/// Convergence, logging and checkpoint settings shared by all gatherers.
#[derive(Debug, Clone)]
pub struct GathererOptions {
    /// Target error of the observed probability; convergence needs `1/err^2` hits.
    pub error_probability: f64,
    /// Sub-population whose accumulator is observed.
    pub pop: usize,
    /// Observed row (species). Defaults to the last species.
    pub species: Option<usize>,
    /// Observed column (node). Defaults to the last column.
    pub node: Option<usize>,
    /// Log every `divisor` notifications of the observed accumulator.
    pub divisor: u64,
    pub trials_cap: u64,
    /// Directory for histogram checkpoints. No checkpoints when unset.
    pub checkpoint_dir: Option<PathBuf>,
    pub checkpoint_interval: Duration,
    pub notification: Notification,
}

impl Default for GathererOptions {
    fn default() -> Self {
        Self {
            error_probability: 0.1,
            pop: 0,
            species: None,
            node: None,
            divisor: 1000,
            trials_cap: DEFAULT_TRIALS_CAP,
            checkpoint_dir: None,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            notification: Notification::NonNegativeBoundedAbove,
        }
    }
}

/// Smallest integer count `>= 1/err^2`, robust to rounding of `err^2`.
pub fn threshold_frequency(error_probability: f64) -> u64 {
    ((1.0 / (error_probability * error_probability)) - 1e-9).ceil().max(0.0) as u64
}

struct Layout {
    number_sub_pops: usize,
    rows: usize,
    cols: usize,
    row_label: &'static str,
    col_label: &'static str,
}

/// Histogram grid over one per-trial quantity.
pub struct DistributionStatistics<A: Accumulator> {
    histograms: Array3D<A>,
    histograms_whole: Array2D<A>,
    observed: [usize; 3],
    threshold: u64,
    trials_cap: u64,
    sample: SampleFn<A::Input>,
    sample_whole: SampleWholeFn<A::Input>,
}

impl<A: Accumulator> fmt::Debug for DistributionStatistics<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributionStatistics")
            .field("dims", &self.histograms.dims())
            .field("observed", &self.observed)
            .field("threshold", &self.threshold)
            .field("trials_cap", &self.trials_cap)
            .finish()
    }
}

/// Distribution of a time or a population size.
pub type CdfStatistics = DistributionStatistics<Cdf>;
/// Probability of a boolean outcome.
pub type PmfStatistics = DistributionStatistics<PmfBool>;

impl<A: Accumulator> DistributionStatistics<A> {
    fn build(
        layout: Layout,
        options: &GathererOptions,
        mut make: impl FnMut() -> Result<A>,
        sample: SampleFn<A::Input>,
        sample_whole: SampleWholeFn<A::Input>,
    ) -> Result<Self> {
        if !(options.error_probability > 0.0) {
            return Err(SimError::parameter(format!(
                "error probability must be positive, got {}",
                options.error_probability
            )));
        }
        check_probability("error probability", options.error_probability)?;
        let Layout {
            number_sub_pops,
            rows,
            cols,
            row_label,
            col_label,
        } = layout;

        let checkpoint = |name: String| {
            options
                .checkpoint_dir
                .as_ref()
                .map(|dir| Checkpoint::new(dir.join(name), options.checkpoint_interval))
        };

        let mut histograms = Array3D::try_from_fn([number_sub_pops, rows, cols], |[pop, row, col]| {
            let mut accumulator = make()?;
            if let Some(c) = checkpoint(histogram_file_name(pop, row_label, row, col_label, col)) {
                accumulator.histogram_mut().set_checkpoint(c);
            }
            Ok(accumulator)
        })?;
        let histograms_whole = Array2D::try_from_fn([rows, cols], |[row, col]| {
            let mut accumulator = make()?;
            if let Some(c) = checkpoint(histogram_whole_file_name(row_label, row, col_label, col)) {
                accumulator.histogram_mut().set_checkpoint(c);
            }
            Ok(accumulator)
        })?;

        let observed = [
            options.pop,
            options.species.unwrap_or(rows.saturating_sub(1)),
            options.node.unwrap_or(cols.saturating_sub(1)),
        ];
        let [pop, row, col] = observed;
        let label = histogram_file_name(pop, row_label, row, col_label, col);
        let logger = HistogramLogger::new(label.trim_end_matches(".json"), options.divisor);
        logger.attach(histograms.at_mut(observed)?.histogram_mut());

        Ok(Self {
            histograms,
            histograms_whole,
            observed,
            threshold: threshold_frequency(options.error_probability),
            trials_cap: options.trials_cap,
            sample,
            sample_whole,
        })
    }

    /// Get the accumulator at `(pop, row, col)`.
    pub fn histogram(&self, pop: usize, row: usize, col: usize) -> Result<&A> {
        self.histograms.at([pop, row, col])
    }

    /// Get the whole-population accumulator at `(row, col)`.
    pub fn histogram_whole(&self, row: usize, col: usize) -> Result<&A> {
        self.histograms_whole.at([row, col])
    }

    /// Index of the accumulator that drives convergence.
    pub fn observed(&self) -> [usize; 3] {
        self.observed
    }

    /// Get the end-bin frequency required for convergence.
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    fn observed_accumulator(&self) -> Option<&A> {
        self.histograms.at(self.observed).ok()
    }
}

impl<A: Accumulator> StatisticsGatherer for DistributionStatistics<A> {
    type Results = SampleSpaceProbability<A::Sample>;

    fn dump(&mut self, process: &Process) -> Result<()> {
        let [pops, rows, cols] = self.histograms.dims();
        for pop in 0..pops {
            for row in 0..rows {
                for col in 0..cols {
                    let input = (self.sample)(process, [pop, row, col])?;
                    self.histograms.at_mut([pop, row, col])?.update(input)?;
                }
            }
        }
        for row in 0..rows {
            for col in 0..cols {
                let input = (self.sample_whole)(process, [row, col])?;
                self.histograms_whole.at_mut([row, col])?.update(input)?;
            }
        }
        Ok(())
    }

    fn converged(&self) -> bool {
        match self.observed_accumulator() {
            Some(observed) => {
                let status = observed.status();
                status.end_frequency >= self.threshold || status.trials >= self.trials_cap
            }
            None => true,
        }
    }

    fn results(&self) -> Result<Array3D<Self::Results>> {
        Ok(self.histograms.map(|a| a.results()))
    }

    fn results_whole(&self) -> Result<Array2D<Self::Results>> {
        Ok(self.histograms_whole.map(|a| a.results()))
    }

    fn trials(&self) -> u64 {
        self.observed_accumulator().map_or(0, |a| a.status().trials)
    }
}

impl CdfStatistics {
    /// First-arrival time of every species, on a uniform support over `[0, span]`.
    pub fn mutation_time(template: &Process, span: f64, options: &GathererOptions) -> Result<Self> {
        let kind = template.kind();
        let space = uniform_sample_space(MUTATION_TIME_POINTS, 0.0, span, kind)?;
        Self::mutation_time_over(template, space, options)
    }

    /// First-arrival time of every species, on a logarithmic support over `[lower, upper]`.
    pub fn mutation_time_logarithmic(
        template: &Process,
        lower: f64,
        upper: f64,
        options: &GathererOptions,
    ) -> Result<Self> {
        let space = logarithmic_sample_space(MUTATION_TIME_POINTS, lower, upper, template.kind())?;
        Self::mutation_time_over(template, space, options)
    }

    fn mutation_time_over(template: &Process, space: Vec<f64>, options: &GathererOptions) -> Result<Self> {
        let kind = template.kind();
        let notification = options.notification;
        Self::build(
            Layout {
                number_sub_pops: template.number_sub_pops(),
                rows: template.number_species(),
                cols: 1,
                row_label: "spe",
                col_label: "xxx",
            },
            options,
            || Cdf::new(space.clone(), kind, notification),
            |p, [pop, spe, _]| p.first_mutation_time(pop, spe),
            |p, [spe, _]| p.mutation_time_whole(spe),
        )
    }

    /// Extinction time of every sub-population and of the whole population.
    pub fn extinction_time(template: &Process, span: f64, options: &GathererOptions) -> Result<Self> {
        let kind = template.kind();
        let space = uniform_sample_space(EXTINCTION_TIME_POINTS, 0.0, span, kind)?;
        let notification = options.notification;
        let options = GathererOptions {
            species: Some(0),
            node: Some(0),
            ..options.clone()
        };
        Self::build(
            Layout {
                number_sub_pops: template.number_sub_pops(),
                rows: 1,
                cols: 1,
                row_label: "xxx",
                col_label: "xxx",
            },
            &options,
            || Cdf::new(space.clone(), kind, notification),
            |p, [pop, _, _]| p.extinction_time(pop),
            |p, _| Ok(p.extinction_time_whole()),
        )
    }

    /// Size of every species at every grid node, over `[0, population_span]`.
    pub fn population(template: &Process, population_span: f64, options: &GathererOptions) -> Result<Self> {
        let space = uniform_sample_space(POPULATION_POINTS, 0.0, population_span, TimeKind::Discrete)?;
        let notification = options.notification;
        Self::build(
            Layout {
                number_sub_pops: template.number_sub_pops(),
                rows: template.number_species(),
                cols: template.path().number_nodes(),
                row_label: "spe",
                col_label: "node",
            },
            options,
            || Cdf::new(space.clone(), TimeKind::Discrete, notification),
            |p, [pop, spe, node]| Ok(Some(node_population(p, pop, spe, node)? as f64)),
            |p, [spe, node]| Ok(Some(node_population_whole(p, spe, node)? as f64)),
        )
    }
}

impl PmfStatistics {
    /// Eventual fate of every species: `true` if it arose.
    pub fn fate(template: &Process, options: &GathererOptions) -> Result<Self> {
        Self::build(
            Self::bool_layout(template),
            &Self::bool_options(options),
            PmfBool::new,
            |p, [pop, spe, _]| p.fate_bool(pop, spe),
            |p, [spe, _]| p.fate_bool_whole(spe),
        )
    }

    /// Lifetime risk of every species: `true` if it arose within the time span.
    pub fn lifetime_risk(template: &Process, options: &GathererOptions) -> Result<Self> {
        Self::build(
            Self::bool_layout(template),
            &Self::bool_options(options),
            PmfBool::new,
            |p, [pop, spe, _]| p.mutation_within_span_strict(pop, spe),
            |p, [spe, _]| p.mutation_within_span_whole(spe),
        )
    }

    fn bool_layout(template: &Process) -> Layout {
        Layout {
            number_sub_pops: template.number_sub_pops(),
            rows: template.number_species(),
            cols: 1,
            row_label: "spe",
            col_label: "xxx",
        }
    }

    fn bool_options(options: &GathererOptions) -> GathererOptions {
        GathererOptions {
            notification: Notification::True,
            ..options.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::PopulationMatrix;
    use crate::process::{BranchingProcess, MoranProcess, TimeGrid};
    use tempfile::tempdir;

    fn branching(rows: Vec<Vec<i64>>, rate: f64, span: f64) -> Process {
        let initial = PopulationMatrix::from_rows(rows).unwrap();
        let grid = TimeGrid::uniform(span as usize + 1, span, TimeKind::Discrete).unwrap();
        BranchingProcess::chain(initial, vec![rate], 1.0, 1.0, grid).unwrap().into()
    }

    #[test]
    fn test_threshold_frequency() {
        assert_eq!(threshold_frequency(0.1), 100);
        assert_eq!(threshold_frequency(0.5), 4);
        assert_eq!(threshold_frequency(1.0), 1);
    }

    #[test]
    fn test_mutation_time_layout_and_dump() {
        let mut process = branching(vec![vec![10, 0], vec![0, 3]], 0.0, 4.0);
        let mut stats = CdfStatistics::mutation_time(&process, 4.0, &GathererOptions::default()).unwrap();
        assert_eq!(stats.observed(), [0, 1, 0]);
        let mut rng = crate::base::rng_from_seed(Some(1));
        while !process.is_terminal() {
            process.advance(&mut rng).unwrap();
        }
        stats.dump(&process).unwrap();
        let results = stats.results().unwrap();
        assert_eq!(results.dims(), [2, 2, 1]);
        // wild type present at time 0 in pop 0
        assert_eq!(results.at([0, 0, 0]).unwrap().probability[0], 1.0);
        assert_eq!(results.at([0, 1, 0]).unwrap().end_probability(), 0.0);
        assert_eq!(results.at([1, 1, 0]).unwrap().end_probability(), 1.0);
        let whole = stats.results_whole().unwrap();
        assert_eq!(whole.at([1, 0]).unwrap().end_probability(), 1.0);
        assert_eq!(stats.trials(), 1);
        assert!(!stats.converged());
    }

    #[test]
    fn test_converges_on_trial_cap() {
        let process = branching(vec![vec![10, 0]], 0.0, 2.0);
        let options = GathererOptions {
            trials_cap: 3,
            ..GathererOptions::default()
        };
        let mut stats = PmfStatistics::lifetime_risk(&process, &options).unwrap();
        let mut finished = process.clone();
        let mut rng = crate::base::rng_from_seed(Some(2));
        while !finished.is_terminal() {
            finished.advance(&mut rng).unwrap();
        }
        for _ in 0..3 {
            assert!(!stats.converged());
            stats.dump(&finished).unwrap();
        }
        assert!(stats.converged());
    }

    #[test]
    fn test_converges_on_end_frequency() {
        let process = branching(vec![vec![1, 5]], 0.0, 1.0);
        let options = GathererOptions {
            error_probability: 0.5,
            ..GathererOptions::default()
        };
        let mut stats = PmfStatistics::fate(&process, &options).unwrap();
        for _ in 0..3 {
            stats.dump(&process).unwrap();
        }
        assert!(!stats.converged());
        stats.dump(&process).unwrap();
        assert!(stats.converged());
    }

    #[test]
    fn test_hundred_hits_for_ten_percent_error() {
        let process = branching(vec![vec![1, 5]], 0.0, 1.0);
        let mut stats = PmfStatistics::fate(&process, &GathererOptions::default()).unwrap();
        for _ in 0..99 {
            stats.dump(&process).unwrap();
        }
        assert!(!stats.converged());
        stats.dump(&process).unwrap();
        assert!(stats.converged());
        assert_eq!(stats.trials(), 100);
    }

    #[test]
    fn test_undetermined_fate_is_an_error() {
        let process = branching(vec![vec![5, 0]], 0.0, 3.0);
        let mut stats = PmfStatistics::fate(&process, &GathererOptions::default()).unwrap();
        assert!(stats.dump(&process).is_err());
    }

    #[test]
    fn test_extinction_time_single_row() {
        let process = branching(vec![vec![5, 0], vec![2, 0]], 0.0, 5.0);
        let stats = CdfStatistics::extinction_time(&process, 5.0, &GathererOptions::default()).unwrap();
        assert_eq!(stats.observed(), [0, 0, 0]);
        let space = stats.histogram(1, 0, 0).unwrap().histogram().sample_space().to_vec();
        assert_eq!(space.first(), Some(&0.0));
        assert_eq!(space.last(), Some(&5.0));
    }

    #[test]
    fn test_population_columns_are_nodes() {
        let initial = PopulationMatrix::from_rows(vec![vec![3, 1, 0]]).unwrap();
        let grid = TimeGrid::uniform(3, 1.0, TimeKind::Continuous).unwrap();
        let process: Process = MoranProcess::chain(initial, &[0.0, 0.0], 1.0, grid).unwrap().into();
        let stats = CdfStatistics::population(&process, 4.0, &GathererOptions::default()).unwrap();
        assert_eq!(stats.observed(), [0, 2, 2]);
        let space = stats.histogram(0, 0, 0).unwrap().histogram().sample_space().to_vec();
        assert_eq!(space, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_invalid_options() {
        let process = branching(vec![vec![5, 0]], 0.0, 3.0);
        let bad_error = GathererOptions {
            error_probability: 0.0,
            ..GathererOptions::default()
        };
        assert!(PmfStatistics::fate(&process, &bad_error).is_err());
        let bad_pop = GathererOptions {
            pop: 4,
            ..GathererOptions::default()
        };
        assert!(matches!(
            PmfStatistics::fate(&process, &bad_pop),
            Err(SimError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_checkpoints_written_on_drop() {
        let dir = tempdir().unwrap();
        let process = branching(vec![vec![1, 5]], 0.0, 1.0);
        let options = GathererOptions {
            checkpoint_dir: Some(dir.path().to_path_buf()),
            ..GathererOptions::default()
        };
        {
            let mut stats = PmfStatistics::fate(&process, &options).unwrap();
            stats.dump(&process).unwrap();
        }
        assert!(dir.path().join("histogram__pop0__spe1__xxx0.json").exists());
        assert!(dir.path().join("histogramWhole__spe0__xxx0.json").exists());
    }
}
