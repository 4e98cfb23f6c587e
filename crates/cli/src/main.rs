mod args;
mod commands;
pub mod defaults;
mod printing;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use args::{InitArgs, LifetimeRiskArgs, ReplayArgs, RunArgs};
use commands::{init, lifetime_risk, replay, run, validate};

/// mutacc: Monte Carlo simulation of mutation accumulation
///
/// This tool simulates how mutations accumulate in populations of dividing
/// cells, and estimates mutation-time distributions, extinction times, fates
/// and lifetime risks from many independent trials.
#[derive(Parser, Debug)]
#[command(name = "mutacc")]
#[command(author, version, about = "Simulates mutation accumulation in cell populations", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel batches
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a new run configuration.
    ///
    /// Sets up the process, statistic and execution parameters but does not
    /// run anything yet.
    Init(Box<InitArgs>),

    /// Run trials until the configured statistic converges.
    Run(RunArgs),

    /// Print trajectories replayed from captured generator states.
    Replay(ReplayArgs),

    /// Sweep lifetime risk over population sizes and symmetry values.
    LifetimeRisk(Box<LifetimeRiskArgs>),

    /// Check that a configuration builds.
    Validate {
        /// Configuration file
        #[arg(short, long, default_value = defaults::CONFIG_FILE)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Init(args) => {
            init::init_configuration(&args)?;
        }
        Commands::Run(args) => {
            run::run_simulation(&args)?;
        }
        Commands::Replay(args) => {
            replay::replay_trajectories(&args)?;
        }
        Commands::LifetimeRisk(args) => {
            lifetime_risk::sweep_lifetime_risk(&args)?;
        }
        Commands::Validate { config } => {
            validate::validate_configuration(&config)?;
        }
    }

    Ok(())
}
