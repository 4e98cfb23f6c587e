use clap::{ArgAction, Args, ValueEnum};
use mutacc_sim::simulation::TrialPolicy;
use mutacc_sim::statistics::StatisticKind;
use std::path::PathBuf;

use crate::defaults;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProcessArg {
    BranchingChain,
    BranchingDiamond,
    MoranChain,
    MoranPaddedChain,
    MoranDiamond,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatisticArg {
    MutationTime,
    ExtinctionTime,
    Fate,
    LifetimeRisk,
    Population,
    MutationTimeMoment,
    PopulationMoment,
}

impl From<StatisticArg> for StatisticKind {
    fn from(arg: StatisticArg) -> Self {
        match arg {
            StatisticArg::MutationTime => StatisticKind::MutationTime,
            StatisticArg::ExtinctionTime => StatisticKind::ExtinctionTime,
            StatisticArg::Fate => StatisticKind::Fate,
            StatisticArg::LifetimeRisk => StatisticKind::LifetimeRisk,
            StatisticArg::Population => StatisticKind::Population,
            StatisticArg::MutationTimeMoment => StatisticKind::MutationTimeMoment,
            StatisticArg::PopulationMoment => StatisticKind::PopulationMoment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    AllExtinctions,
    LastSpecies,
    EventualFate,
    FixedDuration,
}

impl From<PolicyArg> for TrialPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::AllExtinctions => TrialPolicy::WaitForAllExtinctions,
            PolicyArg::LastSpecies => TrialPolicy::WaitForLastSpeciesInAllSubPops,
            PolicyArg::EventualFate => TrialPolicy::WaitForEventualFateLastSpecies,
            PolicyArg::FixedDuration => TrialPolicy::FixedDuration,
        }
    }
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Output configuration file
    #[arg(short, long, default_value = defaults::CONFIG_FILE)]
    pub output: PathBuf,

    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,

    /// Process variant
    #[arg(short, long, value_enum, default_value = "branching-chain")]
    pub process: ProcessArg,

    /// Number of sub-populations
    #[arg(short = 'P', long, default_value_t = defaults::SUB_POPULATIONS)]
    pub sub_pops: usize,

    /// Initial wild-type cells per sub-population
    #[arg(short = 'n', long, default_value_t = defaults::WILD_TYPE)]
    pub wild_type: i64,

    /// Mutation rates, comma separated
    ///
    /// A chain of S species takes S - 1 rates. The diamond takes u0a,u0b,ua,ub.
    #[arg(short = 'u', long, value_delimiter = ',', default_values_t = [defaults::MUTATION_RATE, defaults::MUTATION_RATE])]
    pub rates: Vec<f64>,

    /// Fitness of each dividing species (Moran chain only)
    #[arg(long, value_delimiter = ',')]
    pub fitness: Option<Vec<f64>>,

    /// Probability that a division is symmetric
    #[arg(short, long, default_value_t = defaults::SYMMETRY)]
    pub symmetry: f64,

    /// Renewal bias of symmetric divisions (branching only)
    #[arg(short, long, default_value_t = defaults::RENEWAL)]
    pub renewal: f64,

    /// Time span of every trial
    #[arg(short = 'T', long, default_value_t = defaults::TIME_SPAN)]
    pub time_span: f64,

    /// Number of time grid nodes (default: only 0 and the span)
    #[arg(long)]
    pub grid_points: Option<usize>,

    /// Statistic to gather
    #[arg(long, value_enum, default_value = "mutation-time")]
    pub statistic: StatisticArg,

    /// Upper end of the histogram support (required for population statistics)
    #[arg(long)]
    pub span: Option<f64>,

    /// Target error of the observed probability
    #[arg(short, long, default_value_t = defaults::ERROR_PROBABILITY)]
    pub error_probability: f64,

    /// Log progress every N notifications of the observed histogram
    #[arg(long, default_value_t = defaults::OBSERVER_DIVISOR)]
    pub divisor: u64,

    /// Hard cap on trials
    #[arg(long)]
    pub trials_cap: Option<u64>,

    /// When a trial stops
    #[arg(long, value_enum, default_value = "last-species")]
    pub policy: PolicyArg,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run trials in parallel batches of this size
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Number of random trajectories printed after the run
    #[arg(long, default_value_t = 0)]
    pub random_trajectories: usize,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration file
    #[arg(short, long, default_value = defaults::CONFIG_FILE)]
    pub config: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = defaults::OUTPUT_DIR)]
    pub output: PathBuf,

    /// Override random seed (default: use configured seed)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Show progress spinner
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub progress: bool,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Configuration file the states were captured with
    #[arg(short, long, default_value = defaults::CONFIG_FILE)]
    pub config: PathBuf,

    /// Exported generator states
    #[arg(short, long)]
    pub states: PathBuf,

    /// Output directory for trajectory files
    #[arg(short, long, default_value = defaults::OUTPUT_DIR)]
    pub output: PathBuf,

    /// Also print this many fresh random trajectories
    #[arg(long, default_value_t = 0)]
    pub random: usize,

    /// Seed for the random trajectories
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct LifetimeRiskArgs {
    /// Number of population sizes
    #[arg(long, default_value_t = defaults::NUMBER_N)]
    pub number_n: usize,

    /// Smallest population size
    #[arg(long, default_value_t = defaults::N_LOWER)]
    pub n_lower: i64,

    /// Largest population size
    #[arg(long, default_value_t = defaults::N_UPPER)]
    pub n_upper: i64,

    /// Mutation rates, comma separated
    #[arg(short = 'u', long, value_delimiter = ',', required = true)]
    pub rates: Vec<f64>,

    /// Symmetry values, comma separated
    #[arg(short, long, value_delimiter = ',', default_values_t = [defaults::SYMMETRY])]
    pub symmetries: Vec<f64>,

    /// Time span of every trial
    #[arg(short = 'T', long, default_value_t = defaults::TIME_SPAN)]
    pub time_span: f64,

    /// Target error of the estimated risk
    #[arg(short, long, default_value_t = defaults::ERROR_PROBABILITY)]
    pub error_probability: f64,

    /// Log progress every N notifications of the observed histogram
    #[arg(long, default_value_t = defaults::OBSERVER_DIVISOR)]
    pub divisor: u64,

    /// Hard cap on trials per point
    #[arg(long)]
    pub trials_cap: Option<u64>,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run trials in parallel batches of this size
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Output directory
    #[arg(short, long, default_value = defaults::OUTPUT_DIR)]
    pub output: PathBuf,
}
