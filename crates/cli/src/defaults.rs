//! Shared default values for run configuration.
//! These values are used by the `init` and `lifetime-risk` commands (via clap).

pub const CONFIG_FILE: &str = "mutacc.json";
pub const OUTPUT_DIR: &str = "results";
pub const RESULTS_FILE: &str = "results.json";
pub const STATES_FILE: &str = "successful_states.bin";

pub const SUB_POPULATIONS: usize = 1;
pub const WILD_TYPE: i64 = 100;
pub const MUTATION_RATE: f64 = 0.01;
pub const SYMMETRY: f64 = 0.5;
pub const RENEWAL: f64 = 0.5;
pub const TIME_SPAN: f64 = 100.0;

pub const ERROR_PROBABILITY: f64 = 0.1;
pub const OBSERVER_DIVISOR: u64 = 1000;

// Lifetime risk sweep
pub const NUMBER_N: usize = 10;
pub const N_LOWER: i64 = 10;
pub const N_UPPER: i64 = 100_000;
