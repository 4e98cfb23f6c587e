use anyhow::{Context, Result};
use mutacc_sim::base::rng_from_seed;
use mutacc_sim::simulation::{
    Configuration, SUCCESSFUL_STATES_CAP, SuccessfulStates, save_random_trajectories,
    save_successful_trajectories,
};
use std::fs;

use crate::args::ReplayArgs;

pub fn replay_trajectories(args: &ReplayArgs) -> Result<()> {
    println!("🔁 mutacc - Replaying Trajectories");
    println!("============================================\n");

    let config = Configuration::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    let template = config.template().context("Failed to build process")?;

    let bytes = fs::read(&args.states)
        .with_context(|| format!("Failed to read {}", args.states.display()))?;
    let encoded: Vec<Vec<u8>> =
        bincode::deserialize(&bytes).context("Failed to decode generator states")?;
    let states = SuccessfulStates::from_bytes(SUCCESSFUL_STATES_CAP, &encoded)?;
    println!("✓ Loaded {} generator states", states.len());

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let policy = &config.execution.policy;
    let printed = save_successful_trajectories(&template, policy, &states, &args.output)?;
    let random = if args.random > 0 {
        let mut rng = rng_from_seed(args.seed);
        save_random_trajectories(&template, policy, args.random, &mut rng, &args.output)?
    } else {
        0
    };

    println!("\n✓ Replay complete!");
    println!("  Successful trajectories: {printed}");
    if random > 0 {
        println!("  Random trajectories: {random}");
    }
    println!("  Output: {}", args.output.display());
    Ok(())
}
