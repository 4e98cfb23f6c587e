use anyhow::{Context, Result};
use mutacc_sim::base::rng_from_seed;
use mutacc_sim::simulation::{LifetimeRiskSweep, write_lifetime_risk_tables};
use mutacc_sim::statistics::{DEFAULT_TRIALS_CAP, GathererOptions};
use std::fmt::Write as _;
use std::fs;

use crate::args::LifetimeRiskArgs;
use crate::printing::print_lifetime_risk;

const SYMMETRIES_FILE: &str = "ss.in";

pub fn sweep_lifetime_risk(args: &LifetimeRiskArgs) -> Result<()> {
    println!("🧬 mutacc - Lifetime Risk Sweep");
    println!("============================================\n");

    let options = GathererOptions {
        error_probability: args.error_probability,
        divisor: args.divisor,
        trials_cap: args.trials_cap.unwrap_or(DEFAULT_TRIALS_CAP),
        ..GathererOptions::default()
    };
    let mut sweep = LifetimeRiskSweep::logarithmic(
        args.number_n,
        args.n_lower,
        args.n_upper,
        args.rates.clone(),
        args.symmetries.clone(),
        args.time_span,
        options,
    )
    .context("Invalid sweep parameters")?;
    sweep.batch_size = args.batch_size;

    println!("  • Population Sizes: {:?}", sweep.populations);
    println!("  • Symmetries: {:?}", sweep.symmetries);
    println!("  • Time Span: {}", sweep.time_span);

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let mut rng = rng_from_seed(args.seed);
    let points = sweep.run(&mut rng)?;
    let tables = write_lifetime_risk_tables(&points, &args.output)?;

    let mut listing = String::new();
    for symmetry in &sweep.symmetries {
        writeln!(listing, "{symmetry}")?;
    }
    fs::write(args.output.join(SYMMETRIES_FILE), listing)?;

    print_lifetime_risk(&points);

    println!("\n✓ Sweep complete!");
    println!("  Tables written: {}", tables.len());
    println!("  Output: {}", args.output.display());
    Ok(())
}
