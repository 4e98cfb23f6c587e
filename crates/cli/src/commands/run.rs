use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use mutacc_sim::simulation::{
    Configuration, MonteCarlo, SUCCESSFUL_STATES_CAP, SuccessfulStates, save_random_trajectories,
    save_successful_trajectories,
};
use mutacc_sim::statistics::ResultRecord;
use serde::Serialize;
use std::fs;
use std::time::Instant;

use crate::args::RunArgs;
use crate::defaults;
use crate::printing::{print_configuration, print_results};

#[derive(Serialize)]
struct RunResults<'a> {
    trials: u64,
    records: &'a [ResultRecord],
}

pub fn run_simulation(args: &RunArgs) -> Result<()> {
    println!("🧬 mutacc - Running Simulation");
    println!("============================================\n");

    let mut config = Configuration::load(&args.config).with_context(|| {
        format!(
            "Failed to load {}. Did you run 'mutacc init' first?",
            args.config.display()
        )
    })?;
    if let Some(seed) = args.seed {
        config.execution.seed = Some(seed);
    }
    config.validate().context("Invalid configuration")?;
    print_configuration(&config);

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let template = config.template().context("Failed to build process")?;
    let mut stats = config
        .build_statistics(&template)
        .context("Failed to build statistics")?;

    let pb = if args.progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} trials ({per_sec})")?,
        );
        Some(pb)
    } else {
        None
    };

    let policy = config.execution.policy.clone();
    let mut monte_carlo = MonteCarlo::new(template, policy.clone())
        .with_successful_states(SuccessfulStates::new(SUCCESSFUL_STATES_CAP));
    if let Some(raw) = &config.execution.raw_data {
        let sink = raw
            .create_sink(&args.output)
            .context("Failed to open raw data file")?;
        monte_carlo = monte_carlo.with_sink(sink);
    }
    if let Some(pb) = &pb {
        let pb = pb.clone();
        monte_carlo = monte_carlo.on_trial(move |n| pb.set_position(n));
    }

    let mut rng = config.execution.rng();
    let start = Instant::now();
    let trials = match config.execution.batch_size {
        Some(batch_size) => {
            println!("\nRunning trials in parallel batches of {batch_size}...");
            monte_carlo = monte_carlo.with_batch_size(batch_size);
            match config.execution.threads {
                Some(threads) => {
                    let pool = rayon::ThreadPoolBuilder::new()
                        .num_threads(threads)
                        .build()
                        .context("Failed to build thread pool")?;
                    pool.install(|| monte_carlo.run_parallel(&mut stats, &mut rng))?
                }
                None => monte_carlo.run_parallel(&mut stats, &mut rng)?,
            }
        }
        None => {
            println!("\nRunning trials...");
            monte_carlo.run(&mut stats, &mut rng)?
        }
    };
    let elapsed = start.elapsed();

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    let records = stats.records()?;
    let results_path = args.output.join(defaults::RESULTS_FILE);
    let document = serde_json::to_string_pretty(&RunResults {
        trials,
        records: &records,
    })?;
    fs::write(&results_path, document)
        .with_context(|| format!("Failed to write {}", results_path.display()))?;
    info!("Wrote results to {}", results_path.display());

    let successful = monte_carlo.successful_states();
    let states_path = args.output.join(defaults::STATES_FILE);
    let bytes = bincode::serialize(&successful.to_bytes()?).context("Failed to encode generator states")?;
    fs::write(&states_path, bytes)
        .with_context(|| format!("Failed to write {}", states_path.display()))?;

    let printed = save_successful_trajectories(monte_carlo.factory(), &policy, successful, &args.output)?;
    let random = save_random_trajectories(
        monte_carlo.factory(),
        &policy,
        config.execution.random_trajectories,
        &mut rng,
        &args.output,
    )?;

    print_results(&records, trials, elapsed);

    println!("\n✓ Simulation complete!");
    println!("  Trials: {trials}");
    println!("  Successful trajectories: {printed}");
    if random > 0 {
        println!("  Random trajectories: {random}");
    }
    println!("  Output: {}", args.output.display());
    Ok(())
}
