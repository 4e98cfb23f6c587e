//! Monte Carlo driver and everything around a run.
//!
//! Re-exports
//!
//! - `MonteCarlo`: repeats trials until a statistics gatherer converges,
//!   serially or in deterministic parallel batches.
//! - `TrialPolicy`: decides when a trial stops and whether it succeeded.
//! - `Configuration`: serde document describing a whole run.
//! - `ProcessBuilder`: fluent builder for a single process.

pub mod builder;
pub mod configs;
pub mod engine;
pub mod policy;
pub mod raw_data;
pub mod sweep;
pub mod trajectory;

pub use builder::ProcessBuilder;
pub use configs::{Configuration, ExecutionConfig, ProcessConfig, RawDataConfig, StatisticsConfig};
pub use engine::{DEFAULT_BATCH_SIZE, MonteCarlo, ProcessFactory, TrialCallback, run_trial};
pub use policy::{SUCCESSFUL_STATES_CAP, SuccessfulStates, TrialPolicy};
pub use raw_data::{DiamondRouteSink, MutationTimeSink, RawDataSink};
pub use sweep::{LifetimeRiskPoint, LifetimeRiskSweep, write_lifetime_risk_tables};
pub use trajectory::{RANDOM_TRAJECTORIES_CAP, Trajectory, save_random_trajectories, save_successful_trajectories};
