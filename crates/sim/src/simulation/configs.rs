//! Run configuration.
//!
//! A [`Configuration`] document fully describes one run: the process and its
//! parameters, the statistic to gather, and how trials are executed. It is
//! read from JSON and validated when the process and statistics are built.

use crate::base::{Count, PopulationMatrix, SimRng, rng_from_seed};
use crate::errors::{Result, SimError};
use crate::probability::Notification;
use crate::process::{BranchingProcess, MoranProcess, Process, TimeGrid, TimeKind};
use crate::simulation::policy::TrialPolicy;
use crate::simulation::raw_data::{DiamondRouteSink, MutationTimeSink, RawDataSink};
use crate::statistics::{
    CdfStatistics, DEFAULT_TRIALS_CAP, GathererOptions, MomentStatistics, POPULATION_MOMENT_TRIALS, PmfStatistics,
    StatisticKind, Statistics,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The master configuration struct.
/// Can be deserialized from a file to fully reproduce a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub process: ProcessConfig,
    /// Counts indexed by `[sub-population][species]`.
    pub initial_population: Vec<Vec<Count>>,
    /// Last node of the time grid.
    pub time_span: f64,
    /// Number of grid nodes over `[0, time_span]`. Only the two end points when unset.
    #[serde(default)]
    pub grid_points: Option<usize>,
    #[serde(default)]
    pub statistics: StatisticsConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

/// Process variant and its rate parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProcessConfig {
    BranchingChain {
        rates: Vec<f64>,
        symmetry: f64,
        renewal: f64,
    },
    /// Rates `[u0a, u0b, ua, ub]`.
    BranchingDiamond {
        rates: Vec<f64>,
        symmetry: f64,
        renewal: f64,
    },
    MoranChain {
        rates: Vec<f64>,
        symmetry: f64,
    },
    MoranPaddedChain {
        rates: Vec<f64>,
        symmetry: f64,
    },
    /// Rates `[u0a, u0b, ua, ub]`.
    MoranDiamond {
        rates: Vec<f64>,
        symmetry: f64,
    },
    MoranSelection {
        rates: Vec<f64>,
        fitness: Vec<f64>,
        symmetry: f64,
    },
}

impl ProcessConfig {
    /// Time kind the variant runs on.
    pub fn kind(&self) -> TimeKind {
        match self {
            ProcessConfig::BranchingChain { .. } | ProcessConfig::BranchingDiamond { .. } => TimeKind::Discrete,
            _ => TimeKind::Continuous,
        }
    }

    /// Build the initial process from `initial` on `grid`.
    pub fn build(&self, initial: PopulationMatrix, grid: TimeGrid) -> Result<Process> {
        Ok(match self {
            ProcessConfig::BranchingChain {
                rates,
                symmetry,
                renewal,
            } => BranchingProcess::chain(initial, rates.clone(), *symmetry, *renewal, grid)?.into(),
            ProcessConfig::BranchingDiamond {
                rates,
                symmetry,
                renewal,
            } => BranchingProcess::diamond(initial, rates, *symmetry, *renewal, grid)?.into(),
            ProcessConfig::MoranChain { rates, symmetry } => {
                MoranProcess::chain(initial, rates, *symmetry, grid)?.into()
            }
            ProcessConfig::MoranPaddedChain { rates, symmetry } => {
                MoranProcess::padded_chain(initial, rates, *symmetry, grid)?.into()
            }
            ProcessConfig::MoranDiamond { rates, symmetry } => {
                MoranProcess::diamond(initial, rates, *symmetry, grid)?.into()
            }
            ProcessConfig::MoranSelection {
                rates,
                fitness,
                symmetry,
            } => MoranProcess::with_fitness(initial, rates, fitness.clone(), *symmetry, grid)?.into(),
        })
    }
}

/// Statistic to gather and its convergence parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsConfig {
    #[serde(default)]
    pub kind: StatisticKind,
    /// Upper end of the histogram support. Defaults to the time span for
    /// time statistics; required for population statistics.
    #[serde(default)]
    pub span: Option<f64>,
    /// Lower end of a logarithmic support.
    #[serde(default)]
    pub lower: Option<f64>,
    /// Order of moment statistics.
    #[serde(default = "default_order")]
    pub order: i32,
    #[serde(default = "default_error_probability")]
    pub error_probability: f64,
    #[serde(default = "default_divisor")]
    pub divisor: u64,
    /// Defaults to a very large cap for histograms and a small one for
    /// population moments.
    #[serde(default)]
    pub trials_cap: Option<u64>,
    #[serde(default)]
    pub pop: usize,
    #[serde(default)]
    pub species: Option<usize>,
    #[serde(default)]
    pub node: Option<usize>,
    #[serde(default = "default_checkpoint_minutes")]
    pub checkpoint_minutes: u64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            kind: StatisticKind::default(),
            span: None,
            lower: None,
            order: default_order(),
            error_probability: default_error_probability(),
            divisor: default_divisor(),
            trials_cap: None,
            pop: 0,
            species: None,
            node: None,
            checkpoint_minutes: default_checkpoint_minutes(),
        }
    }
}

impl StatisticsConfig {
    fn trials_cap(&self) -> u64 {
        match (self.trials_cap, self.kind) {
            (Some(cap), _) => cap,
            (None, StatisticKind::PopulationMoment) => POPULATION_MOMENT_TRIALS,
            (None, _) => DEFAULT_TRIALS_CAP,
        }
    }

    /// Gatherer options; checkpoints go to `checkpoint_dir` when set.
    pub fn options(&self, checkpoint_dir: Option<&Path>) -> GathererOptions {
        GathererOptions {
            error_probability: self.error_probability,
            pop: self.pop,
            species: self.species,
            node: self.node,
            divisor: self.divisor,
            trials_cap: self.trials_cap(),
            checkpoint_dir: checkpoint_dir.map(Path::to_path_buf),
            checkpoint_interval: Duration::from_secs(self.checkpoint_minutes * 60),
            notification: Notification::NonNegativeBoundedAbove,
        }
    }

    /// Build the gatherer matching `kind` around `template`.
    pub fn build(&self, template: &Process, time_span: f64, checkpoint_dir: Option<&Path>) -> Result<Statistics> {
        let options = self.options(checkpoint_dir);
        let span = self.span.unwrap_or(time_span);
        Ok(match self.kind {
            StatisticKind::MutationTime => Statistics::Cdf(CdfStatistics::mutation_time(template, span, &options)?),
            StatisticKind::MutationTimeLogarithmic => {
                let lower = self.lower.ok_or_else(|| {
                    SimError::parameter("logarithmic mutation-time statistics need a lower bound")
                })?;
                Statistics::Cdf(CdfStatistics::mutation_time_logarithmic(template, lower, span, &options)?)
            }
            StatisticKind::ExtinctionTime => {
                Statistics::Cdf(CdfStatistics::extinction_time(template, span, &options)?)
            }
            StatisticKind::Fate => Statistics::Pmf(PmfStatistics::fate(template, &options)?),
            StatisticKind::LifetimeRisk => Statistics::Pmf(PmfStatistics::lifetime_risk(template, &options)?),
            StatisticKind::Population => {
                let span = self
                    .span
                    .ok_or_else(|| SimError::parameter("population statistics need a population span"))?;
                Statistics::Cdf(CdfStatistics::population(template, span, &options)?)
            }
            StatisticKind::MutationTimeMoment => {
                Statistics::Moment(MomentStatistics::mutation_time(template, self.order, &options)?)
            }
            StatisticKind::PopulationMoment => {
                Statistics::Moment(MomentStatistics::population(template, self.order, &options)?)
            }
        })
    }
}

/// Raw per-trial samples written next to the statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawDataConfig {
    MutationTime { pop: usize, species: usize },
    DiamondRoutes,
}

impl RawDataConfig {
    pub fn file_name(&self) -> &'static str {
        match self {
            RawDataConfig::MutationTime { .. } => "raw_mutation_time.dat",
            RawDataConfig::DiamondRoutes => "raw_diamond_routes.dat",
        }
    }

    /// Open the sink writing into `dir`.
    pub fn create_sink(&self, dir: impl AsRef<Path>) -> Result<Box<dyn RawDataSink>> {
        let path = dir.as_ref().join(self.file_name());
        Ok(match self {
            RawDataConfig::MutationTime { pop, species } => Box::new(MutationTimeSink::create(path, *pop, *species)?),
            RawDataConfig::DiamondRoutes => Box::new(DiamondRouteSink::create(path)?),
        })
    }
}

/// How trials are executed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Optional RNG seed for reproducibility
    #[serde(default)]
    pub seed: Option<u64>,
    /// Worker threads. Rayon's default when unset.
    #[serde(default)]
    pub threads: Option<usize>,
    /// Trials per parallel batch. Trials run serially when unset.
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub policy: TrialPolicy,
    /// Fresh trajectories printed after the run.
    #[serde(default)]
    pub random_trajectories: usize,
    #[serde(default)]
    pub checkpoint_dir: Option<PathBuf>,
    #[serde(default)]
    pub raw_data: Option<RawDataConfig>,
}

impl ExecutionConfig {
    pub fn rng(&self) -> SimRng {
        rng_from_seed(self.seed)
    }
}

impl Configuration {
    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the settings the constructors do not see.
    pub fn validate(&self) -> Result<()> {
        if !(self.time_span > 0.0) {
            return Err(SimError::parameter(format!(
                "time span must be positive, got {}",
                self.time_span
            )));
        }
        if self.grid_points.is_some_and(|n| n < 2) {
            return Err(SimError::parameter("time grid needs at least 2 points"));
        }
        if self.execution.threads == Some(0) {
            return Err(SimError::parameter("thread count must be positive"));
        }
        if self.execution.batch_size == Some(0) {
            return Err(SimError::parameter("batch size must be positive"));
        }
        Ok(())
    }

    pub fn initial_population(&self) -> Result<PopulationMatrix> {
        PopulationMatrix::from_rows(self.initial_population.clone())
    }

    pub fn time_grid(&self) -> Result<TimeGrid> {
        let kind = self.process.kind();
        match self.grid_points {
            Some(points) => TimeGrid::uniform(points, self.time_span, kind),
            None => TimeGrid::span(self.time_span, kind),
        }
    }

    /// Initial process shared by every trial.
    pub fn template(&self) -> Result<Process> {
        self.process.build(self.initial_population()?, self.time_grid()?)
    }

    pub fn build_statistics(&self, template: &Process) -> Result<Statistics> {
        self.statistics
            .build(template, self.time_span, self.execution.checkpoint_dir.as_deref())
    }
}

impl Default for Configuration {
    /// Neutral three-stage branching chain gathering the mutation-time CDF.
    fn default() -> Self {
        Self {
            process: ProcessConfig::BranchingChain {
                rates: vec![0.01, 0.01],
                symmetry: 0.5,
                renewal: 0.5,
            },
            initial_population: vec![vec![100, 0, 0]],
            time_span: 100.0,
            grid_points: None,
            statistics: StatisticsConfig::default(),
            execution: ExecutionConfig {
                seed: Some(42),
                policy: TrialPolicy::WaitForLastSpeciesInAllSubPops,
                ..ExecutionConfig::default()
            },
        }
    }
}

fn default_order() -> i32 {
    1
}

fn default_error_probability() -> f64 {
    0.1
}

fn default_divisor() -> u64 {
    1000
}

fn default_checkpoint_minutes() -> u64 {
    15
}
