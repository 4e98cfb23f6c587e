//! Lifetime risk as a function of population size and division symmetry.

use crate::base::grid::make_logarithmic_grid_discrete;
use crate::base::{Count, PopulationMatrix, SimRng};
use crate::errors::{Result, SimError};
use crate::process::{MoranProcess, Process, TimeGrid, TimeKind};
use crate::simulation::engine::MonteCarlo;
use crate::simulation::policy::TrialPolicy;
use crate::statistics::summary::probability_mutation_fate_last;
use crate::statistics::{GathererOptions, PmfStatistics};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One estimated lifetime risk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifetimeRiskPoint {
    pub symmetry: f64,
    pub population: Count,
    pub risk: f64,
}

/// Homeostatic chain started from `[N, 0, .., 0]` for every `N` and symmetry.
#[derive(Debug, Clone)]
pub struct LifetimeRiskSweep {
    pub populations: Vec<Count>,
    pub rates: Vec<f64>,
    pub symmetries: Vec<f64>,
    pub time_span: f64,
    pub options: GathererOptions,
    /// Run trials in parallel batches of this size. Serial when unset.
    pub batch_size: Option<usize>,
}

impl LifetimeRiskSweep {
    /// Sweep over `number` logarithmically spaced sizes in `[lower, upper]`.
    pub fn logarithmic(
        number: usize,
        lower: Count,
        upper: Count,
        rates: Vec<f64>,
        symmetries: Vec<f64>,
        time_span: f64,
        options: GathererOptions,
    ) -> Result<Self> {
        let populations = make_logarithmic_grid_discrete(number, lower, upper)?;
        if rates.is_empty() {
            return Err(SimError::parameter("lifetime risk needs at least one mutation rate"));
        }
        Ok(Self {
            populations,
            rates,
            symmetries,
            time_span,
            options,
            batch_size: None,
        })
    }

    /// Initial process for one point of the sweep.
    pub fn template(&self, population: Count, symmetry: f64) -> Result<Process> {
        let mut row = vec![0; self.rates.len() + 1];
        row[0] = population;
        let initial = PopulationMatrix::from_row(row)?;
        let grid = TimeGrid::span(self.time_span, TimeKind::Continuous)?;
        Ok(MoranProcess::chain(initial, &self.rates, symmetry, grid)?.into())
    }

    /// Estimate the probability that the last species arises within the span.
    pub fn risk(&self, population: Count, symmetry: f64, rng: &mut SimRng) -> Result<f64> {
        let template = self.template(population, symmetry)?;
        let mut stats = PmfStatistics::lifetime_risk(&template, &self.options)?;
        let mut mc = MonteCarlo::new(template, TrialPolicy::WaitForLastSpeciesInAllSubPops);
        let trials = match self.batch_size {
            Some(batch) => mc.with_batch_size(batch).run_parallel(&mut stats, rng)?,
            None => mc.run(&mut stats, rng)?,
        };
        let risk = probability_mutation_fate_last(&stats)?;
        info!("N = {population}, s = {symmetry}: lifetime risk {risk} after {trials} trials");
        Ok(risk)
    }

    /// Estimate every point, symmetry-major.
    pub fn run(&self, rng: &mut SimRng) -> Result<Vec<LifetimeRiskPoint>> {
        let mut points = Vec::with_capacity(self.symmetries.len() * self.populations.len());
        for &symmetry in &self.symmetries {
            for &population in &self.populations {
                let risk = self.risk(population, symmetry, rng)?;
                points.push(LifetimeRiskPoint {
                    symmetry,
                    population,
                    risk,
                });
            }
        }
        Ok(points)
    }
}

/// Write one `lifetime_risk__s{symmetry}.dat` table per symmetry into `dir`.
pub fn write_lifetime_risk_tables(points: &[LifetimeRiskPoint], dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut written: Vec<PathBuf> = Vec::new();
    let mut current: Option<(f64, BufWriter<File>)> = None;
    for point in points {
        if current.as_ref().is_none_or(|(s, _)| *s != point.symmetry) {
            if let Some((_, mut w)) = current.take() {
                w.flush()?;
            }
            let path = dir.join(format!("lifetime_risk__s{}.dat", point.symmetry));
            current = Some((point.symmetry, BufWriter::new(File::create(&path)?)));
            written.push(path);
        }
        if let Some((_, w)) = current.as_mut() {
            writeln!(w, "{:>30}{:>30}", point.population, point.risk)?;
        }
    }
    if let Some((_, mut w)) = current {
        w.flush()?;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::rng_from_seed;

    fn sweep() -> LifetimeRiskSweep {
        let options = GathererOptions {
            trials_cap: 30,
            ..GathererOptions::default()
        };
        LifetimeRiskSweep::logarithmic(2, 10, 100, vec![0.5, 0.5], vec![0.0, 1.0], 2.0, options).unwrap()
    }

    #[test]
    fn test_template_shape() {
        let s = sweep();
        assert_eq!(s.populations, vec![10, 100]);
        let p = s.template(20, 0.5).unwrap();
        assert_eq!(p.number_species(), 3);
        assert_eq!(p.population(0, 0).unwrap(), 20);
        assert_eq!(p.population(0, 2).unwrap(), 0);
    }

    #[test]
    fn test_run_and_tables() {
        let s = sweep();
        let points = s.run(&mut rng_from_seed(Some(4))).unwrap();
        assert_eq!(points.len(), 4);
        assert!(points.iter().all(|p| (0.0..=1.0).contains(&p.risk)));

        let dir = tempfile::tempdir().unwrap();
        let files = write_lifetime_risk_tables(&points, dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        let table = std::fs::read_to_string(&files[0]).unwrap();
        assert_eq!(table.lines().count(), 2);
    }

    #[test]
    fn test_needs_rates() {
        let err = LifetimeRiskSweep::logarithmic(2, 2, 20, vec![], vec![0.5], 1.0, GathererOptions::default());
        assert!(err.is_err());
    }
}
