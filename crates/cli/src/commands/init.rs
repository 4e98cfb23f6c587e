use anyhow::{Context, Result};
use mutacc_sim::simulation::{Configuration, ExecutionConfig, ProcessBuilder, StatisticsConfig};
use std::fs;

use crate::args::{InitArgs, ProcessArg};
use crate::printing::print_configuration;

pub fn init_configuration(args: &InitArgs) -> Result<()> {
    println!("🧬 mutacc - Mutation Accumulation Simulator");
    println!("============================================\n");

    if args.output.exists() && !args.force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            args.output.display()
        );
    }

    let config = build_configuration(args)?;

    // Building the template checks every model parameter
    config
        .template()
        .context("Invalid process parameters")?;

    print_configuration(&config);

    fs::write(&args.output, config.to_json()?)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("\n✓ Configuration initialized successfully!");
    println!("  Written to: {}", args.output.display());
    println!("  Next: mutacc run --config {}", args.output.display());
    Ok(())
}

pub fn build_configuration(args: &InitArgs) -> Result<Configuration> {
    let mut builder = ProcessBuilder::new()
        .rates(args.rates.clone())
        .symmetry(args.symmetry)
        .renewal(args.renewal);
    builder = match args.process {
        ProcessArg::BranchingChain => builder.branching_chain(),
        ProcessArg::BranchingDiamond => builder.branching_diamond(),
        ProcessArg::MoranChain => builder.moran_chain(),
        ProcessArg::MoranPaddedChain => builder.moran_padded_chain(),
        ProcessArg::MoranDiamond => builder.moran_diamond(),
    };
    if let Some(fitness) = &args.fitness {
        builder = builder.fitness(fitness.clone());
    }
    let process = builder.process_config().context("Invalid process parameters")?;

    let species = match args.process {
        ProcessArg::BranchingDiamond | ProcessArg::MoranDiamond => 4,
        _ => args.rates.len() + 1,
    };
    let mut row = vec![0; species];
    row[0] = args.wild_type;

    let config = Configuration {
        process,
        initial_population: vec![row; args.sub_pops],
        time_span: args.time_span,
        grid_points: args.grid_points,
        statistics: StatisticsConfig {
            kind: args.statistic.into(),
            span: args.span,
            error_probability: args.error_probability,
            divisor: args.divisor,
            trials_cap: args.trials_cap,
            ..StatisticsConfig::default()
        },
        execution: ExecutionConfig {
            seed: args.seed,
            batch_size: args.batch_size,
            policy: args.policy.into(),
            random_trajectories: args.random_trajectories,
            ..ExecutionConfig::default()
        },
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
