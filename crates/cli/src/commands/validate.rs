use anyhow::{Context, Result};
use mutacc_sim::simulation::Configuration;
use std::path::Path;

use crate::printing::print_configuration;

pub fn validate_configuration(path: &Path) -> Result<()> {
    println!("🔍 Validating configuration: {}", path.display());

    if !path.exists() {
        anyhow::bail!("Configuration file does not exist");
    }

    let config = Configuration::load(path).context("Failed to parse configuration")?;
    println!("✓ Document: OK");

    let template = config.template().context("Failed to build process")?;
    println!(
        "✓ Process: OK ({} sub-populations, {} species, {} grid nodes)",
        template.number_sub_pops(),
        template.number_species(),
        template.path().number_nodes()
    );

    config
        .build_statistics(&template)
        .context("Failed to build statistics")?;
    println!("✓ Statistics: OK");

    print_configuration(&config);
    println!("\n✓ Configuration is valid");
    Ok(())
}
