//! Builder pattern for creating processes.
//!
//! Provides a fluent API for configuring a process with sensible defaults.
//! Validation happens in [`ProcessBuilder::build`].

use crate::base::{Count, PopulationMatrix};
use crate::errors::{Result, SimError};
use crate::process::{Process, TimeGrid};
use crate::simulation::configs::ProcessConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    BranchingChain,
    BranchingDiamond,
    MoranChain,
    MoranPaddedChain,
    MoranDiamond,
}

/// Builder for constructing [`Process`] instances with a fluent API.
///
/// # Examples
///
/// ```
/// use mutacc_sim::simulation::ProcessBuilder;
///
/// let process = ProcessBuilder::new()
///     .branching_chain()
///     .uniform_sub_populations(4, 100)
///     .rates(vec![0.01, 0.02])
///     .symmetry(0.5)
///     .renewal(0.5)
///     .time_span(50.0)
///     .build()
///     .unwrap();
/// assert_eq!(process.number_sub_pops(), 4);
/// assert_eq!(process.number_species(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    variant: Variant,
    initial: Option<Vec<Vec<Count>>>,
    // Wild-type count per sub-population, all other species start empty
    uniform: Option<(usize, Count)>,
    rates: Vec<f64>,
    symmetry: f64,
    renewal: f64,
    fitness: Option<Vec<f64>>,
    time_span: Option<f64>,
    grid_points: Option<usize>,
}

impl Default for ProcessBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessBuilder {
    /// Create a builder for a neutral branching chain.
    pub fn new() -> Self {
        Self {
            variant: Variant::BranchingChain,
            initial: None,
            uniform: None,
            rates: Vec::new(),
            symmetry: 0.5,
            renewal: 1.0,
            fitness: None,
            time_span: None,
            grid_points: None,
        }
    }

    pub fn branching_chain(mut self) -> Self {
        self.variant = Variant::BranchingChain;
        self
    }

    pub fn branching_diamond(mut self) -> Self {
        self.variant = Variant::BranchingDiamond;
        self
    }

    pub fn moran_chain(mut self) -> Self {
        self.variant = Variant::MoranChain;
        self
    }

    /// Moran chain whose top species keeps dividing.
    pub fn moran_padded_chain(mut self) -> Self {
        self.variant = Variant::MoranPaddedChain;
        self
    }

    pub fn moran_diamond(mut self) -> Self {
        self.variant = Variant::MoranDiamond;
        self
    }

    /// Set the initial counts, `[sub-population][species]`.
    pub fn initial_population(mut self, rows: Vec<Vec<Count>>) -> Self {
        self.initial = Some(rows);
        self.uniform = None;
        self
    }

    /// Start `number` sub-populations with `wild_type` cells of species 0 each.
    /// The number of species follows from the rates.
    pub fn uniform_sub_populations(mut self, number: usize, wild_type: Count) -> Self {
        self.uniform = Some((number, wild_type));
        self.initial = None;
        self
    }

    pub fn rates(mut self, rates: Vec<f64>) -> Self {
        self.rates = rates;
        self
    }

    pub fn symmetry(mut self, symmetry: f64) -> Self {
        self.symmetry = symmetry;
        self
    }

    /// Renewal bias of branching processes.
    pub fn renewal(mut self, renewal: f64) -> Self {
        self.renewal = renewal;
        self
    }

    /// Fitness of each dividing species. Only for Moran chains.
    pub fn fitness(mut self, fitness: Vec<f64>) -> Self {
        self.fitness = Some(fitness);
        self
    }

    pub fn time_span(mut self, span: f64) -> Self {
        self.time_span = Some(span);
        self
    }

    pub fn grid_points(mut self, points: usize) -> Self {
        self.grid_points = Some(points);
        self
    }

    fn number_species(&self) -> usize {
        match self.variant {
            Variant::BranchingDiamond | Variant::MoranDiamond => 4,
            _ => self.rates.len() + 1,
        }
    }

    /// Equivalent configuration entry for this process.
    pub fn process_config(&self) -> Result<ProcessConfig> {
        let rates = self.rates.clone();
        let symmetry = self.symmetry;
        let renewal = self.renewal;
        Ok(match (self.variant, self.fitness.clone()) {
            (Variant::MoranChain, Some(fitness)) => ProcessConfig::MoranSelection {
                rates,
                fitness,
                symmetry,
            },
            (_, Some(_)) => {
                return Err(SimError::parameter("fitness weights are only supported by the Moran chain"));
            }
            (Variant::BranchingChain, None) => ProcessConfig::BranchingChain {
                rates,
                symmetry,
                renewal,
            },
            (Variant::BranchingDiamond, None) => ProcessConfig::BranchingDiamond {
                rates,
                symmetry,
                renewal,
            },
            (Variant::MoranChain, None) => ProcessConfig::MoranChain { rates, symmetry },
            (Variant::MoranPaddedChain, None) => ProcessConfig::MoranPaddedChain { rates, symmetry },
            (Variant::MoranDiamond, None) => ProcessConfig::MoranDiamond { rates, symmetry },
        })
    }

    fn initial_matrix(&self) -> Result<PopulationMatrix> {
        match (&self.initial, self.uniform) {
            (Some(rows), _) => PopulationMatrix::from_rows(rows.clone()),
            (None, Some((number, wild_type))) => {
                let mut row = vec![0; self.number_species()];
                row[0] = wild_type;
                PopulationMatrix::from_rows(vec![row; number])
            }
            (None, None) => Err(SimError::parameter("initial population is required")),
        }
    }

    /// Build the process.
    pub fn build(self) -> Result<Process> {
        let config = self.process_config()?;
        let span = self
            .time_span
            .ok_or_else(|| SimError::parameter("time span is required"))?;
        let grid = match self.grid_points {
            Some(points) => TimeGrid::uniform(points, span, config.kind())?,
            None => TimeGrid::span(span, config.kind())?,
        };
        config.build(self.initial_matrix()?, grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::TimeKind;

    #[test]
    fn test_builder_requires_span_and_population() {
        assert!(ProcessBuilder::new().rates(vec![0.1]).uniform_sub_populations(1, 5).build().is_err());
        assert!(ProcessBuilder::new().rates(vec![0.1]).time_span(3.0).build().is_err());
    }

    #[test]
    fn test_builder_variants() {
        let diamond = ProcessBuilder::new()
            .moran_diamond()
            .uniform_sub_populations(2, 10)
            .rates(vec![0.1, 0.1, 0.2, 0.2])
            .time_span(1.0)
            .grid_points(5)
            .build()
            .unwrap();
        assert_eq!(diamond.number_species(), 4);
        assert_eq!(diamond.kind(), TimeKind::Continuous);
        assert_eq!(diamond.path().number_nodes(), 5);

        let selection = ProcessBuilder::new()
            .moran_chain()
            .initial_population(vec![vec![8, 2, 0]])
            .rates(vec![0.1, 0.1])
            .fitness(vec![1.0, 1.2])
            .time_span(1.0)
            .process_config()
            .unwrap();
        assert!(matches!(selection, ProcessConfig::MoranSelection { .. }));

        let err = ProcessBuilder::new()
            .branching_chain()
            .rates(vec![0.1])
            .fitness(vec![1.0])
            .process_config();
        assert!(err.is_err());
    }
}
