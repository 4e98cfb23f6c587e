use mutacc_sim::simulation::{Configuration, LifetimeRiskPoint, ProcessConfig};
use mutacc_sim::statistics::{ResultRecord, StatisticsResult};
use std::time::Duration;

fn format_rates(rates: &[f64]) -> String {
    rates
        .iter()
        .map(|u| format!("{u:.2e}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn print_configuration(config: &Configuration) {
    let execution = &config.execution;
    let statistics = &config.statistics;

    println!("\n📋 Run Configuration");
    println!(
        "  • Sub-populations: {} [-P, --sub-pops]",
        config.initial_population.len()
    );
    if let Some(first) = config.initial_population.first() {
        println!("  • Initial Counts: {first:?} [-n, --wild-type]");
    }
    println!("  • Time Span: {} [-T, --time-span]", config.time_span);
    match config.grid_points {
        Some(points) => println!("  • Grid Nodes: {points} [--grid-points]"),
        None => println!("  • Grid Nodes: start and end [--grid-points]"),
    }
    if let Some(seed) = execution.seed {
        println!("  • Random Seed: {seed} [--seed]");
    } else {
        println!("  • Random Seed: Random [--seed]");
    }

    println!("\n🧫 Process");
    println!("  • Model: {} [-p, --process]", process_name(&config.process));
    println!("  • Time: {:?}", config.process.kind());
    match &config.process {
        ProcessConfig::BranchingChain {
            rates,
            symmetry,
            renewal,
        }
        | ProcessConfig::BranchingDiamond {
            rates,
            symmetry,
            renewal,
        } => {
            println!("  • Mutation Rates: {} [-u, --rates]", format_rates(rates));
            println!("  • Symmetry: {symmetry:.3} [-s, --symmetry]");
            println!("  • Renewal: {renewal:.3} [-r, --renewal]");
        }
        ProcessConfig::MoranChain { rates, symmetry }
        | ProcessConfig::MoranPaddedChain { rates, symmetry }
        | ProcessConfig::MoranDiamond { rates, symmetry } => {
            println!("  • Mutation Rates: {} [-u, --rates]", format_rates(rates));
            println!("  • Symmetry: {symmetry:.3} [-s, --symmetry]");
        }
        ProcessConfig::MoranSelection {
            rates,
            fitness,
            symmetry,
        } => {
            println!("  • Mutation Rates: {} [-u, --rates]", format_rates(rates));
            println!("  • Fitness: {fitness:?} [--fitness]");
            println!("  • Symmetry: {symmetry:.3} [-s, --symmetry]");
        }
    }

    println!("\n📊 Statistics");
    println!("  • Kind: {:?} [--statistic]", statistics.kind);
    if let Some(span) = statistics.span {
        println!("  • Support Span: {span} [--span]");
    }
    println!(
        "  • Error Probability: {} [-e, --error-probability]",
        statistics.error_probability
    );
    match statistics.trials_cap {
        Some(cap) => println!("  • Trials Cap: {cap} [--trials-cap]"),
        None => println!("  • Trials Cap: default [--trials-cap]"),
    }

    println!("\n⚙️  Execution");
    println!("  • Policy: {:?} [--policy]", execution.policy);
    match execution.batch_size {
        Some(size) => println!("  • Parallel Batches: {size} trials [--batch-size]"),
        None => println!("  • Parallel Batches: off (serial) [--batch-size]"),
    }
    if execution.random_trajectories > 0 {
        println!(
            "  • Random Trajectories: {} [--random-trajectories]",
            execution.random_trajectories
        );
    }
    if let Some(raw) = &execution.raw_data {
        println!("  • Raw Data: {}", raw.file_name());
    }
}

fn process_name(process: &ProcessConfig) -> &'static str {
    match process {
        ProcessConfig::BranchingChain { .. } => "branching chain",
        ProcessConfig::BranchingDiamond { .. } => "branching diamond",
        ProcessConfig::MoranChain { .. } => "Moran chain",
        ProcessConfig::MoranPaddedChain { .. } => "Moran chain, dividing top species",
        ProcessConfig::MoranDiamond { .. } => "Moran diamond",
        ProcessConfig::MoranSelection { .. } => "Moran chain with selection",
    }
}

fn summarize(result: &StatisticsResult) -> String {
    match result {
        StatisticsResult::Distribution(ssp) => match ssp.sample_space.last() {
            Some(upper) => format!("P(X <= {upper}) = {:.4}", ssp.end_probability()),
            None => "empty".to_string(),
        },
        StatisticsResult::Bernoulli(ssp) => format!("P(true) = {:.4}", ssp.end_probability()),
        StatisticsResult::Moment(Some(value)) => format!("{value:.6}"),
        StatisticsResult::Moment(None) => "no samples".to_string(),
    }
}

pub fn print_results(records: &[ResultRecord], trials: u64, elapsed: Duration) {
    println!("\n📈 Results");
    println!("  • Trials: {trials}");
    println!("  • Elapsed: {:.2}s", elapsed.as_secs_f64());
    for record in records {
        let scope = match record.pop {
            Some(pop) => format!("pop {pop}"),
            None => "whole".to_string(),
        };
        println!(
            "  • [{scope}, {}, {}] {}",
            record.row,
            record.col,
            summarize(&record.result)
        );
    }
}

pub fn print_lifetime_risk(points: &[LifetimeRiskPoint]) {
    println!("\n📈 Lifetime Risk");
    println!("  {:>10}{:>14}{:>14}", "symmetry", "N", "risk");
    for point in points {
        println!(
            "  {:>10}{:>14}{:>14.6}",
            point.symmetry, point.population, point.risk
        );
    }
}
