//! Questions asked of a finished (or running) trajectory: did a species arise,
//! did a sub-population die out, and did either happen within the time span.
//!
//! "Whole" queries treat all sub-populations together as one population.

use crate::base::Count;
use crate::errors::{Result, SimError};
use crate::process::Process;
use serde::{Deserialize, Serialize};

/// Which of the two eventual fates has happened to a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fate {
    /// The species arose.
    Arose,
    /// The species did not arise and the population went extinct.
    Extinguished,
    /// Neither has happened yet.
    Undetermined,
}

impl Process {
    /// True if `pop` went extinct after the start.
    pub fn extinguished(&self, pop: usize) -> Result<bool> {
        Ok(matches!(self.extinction_time(pop)?, Some(t) if t > 0.0))
    }

    /// True if every sub-population went extinct.
    pub fn extinguished_all(&self) -> bool {
        (0..self.number_sub_pops()).all(|pop| self.extinguished(pop).unwrap_or(false))
    }

    /// Time the last surviving sub-population went extinct.
    pub fn extinction_time_whole(&self) -> Option<f64> {
        if !self.extinguished_all() {
            return None;
        }
        self.state()
            .extinction_times()
            .as_slice()
            .iter()
            .flatten()
            .copied()
            .reduce(f64::max)
    }

    /// True if `spe` has arisen in `pop`.
    pub fn mutation_occurred(&self, pop: usize, spe: usize) -> Result<bool> {
        Ok(self.first_mutation_time(pop, spe)?.is_some())
    }

    /// True if `spe` has arisen in at least one sub-population.
    pub fn mutation_occurred_whole(&self, spe: usize) -> Result<bool> {
        Ok(self.mutation_time_whole(spe)?.is_some())
    }

    /// True if `spe` has arisen in every sub-population.
    pub fn all_mutations_occurred(&self, spe: usize) -> Result<bool> {
        for pop in 0..self.number_sub_pops() {
            if !self.mutation_occurred(pop, spe)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Earliest time `spe` appeared in any sub-population.
    pub fn mutation_time_whole(&self, spe: usize) -> Result<Option<f64>> {
        let mut earliest: Option<f64> = None;
        for pop in 0..self.number_sub_pops() {
            if let Some(t) = self.first_mutation_time(pop, spe)? {
                earliest = Some(earliest.map_or(t, |e| e.min(t)));
            }
        }
        Ok(earliest)
    }

    /// Fate of `spe` in `pop`.
    pub fn fate(&self, pop: usize, spe: usize) -> Result<Fate> {
        Ok(if self.mutation_occurred(pop, spe)? {
            Fate::Arose
        } else if self.extinguished(pop)? {
            Fate::Extinguished
        } else {
            Fate::Undetermined
        })
    }

    /// Fate of `spe` across the whole population.
    pub fn fate_whole(&self, spe: usize) -> Result<Fate> {
        Ok(if self.mutation_occurred_whole(spe)? {
            Fate::Arose
        } else if self.extinguished_all() {
            Fate::Extinguished
        } else {
            Fate::Undetermined
        })
    }

    /// Fate of `spe` in `pop` as a boolean. Fails while it is undetermined.
    pub fn fate_bool(&self, pop: usize, spe: usize) -> Result<bool> {
        match self.fate(pop, spe)? {
            Fate::Arose => Ok(true),
            Fate::Extinguished => Ok(false),
            Fate::Undetermined => Err(SimError::UndeterminedFate { pop, species: spe }),
        }
    }

    /// Whole-population fate of `spe` as a boolean. Fails while it is undetermined.
    ///
    /// The error reports sub-population 0 when the whole population is meant.
    pub fn fate_bool_whole(&self, spe: usize) -> Result<bool> {
        match self.fate_whole(spe)? {
            Fate::Arose => Ok(true),
            Fate::Extinguished => Ok(false),
            Fate::Undetermined => Err(SimError::UndeterminedFate { pop: 0, species: spe }),
        }
    }

    fn within_span(&self, time: f64) -> bool {
        self.kind().within_span(time, self.path().last_node_time())
    }

    /// True if `spe` arose in `pop` within the time span. Unset counts as false,
    /// so this can be asked while the trajectory is still running.
    pub fn mutation_within_span(&self, pop: usize, spe: usize) -> Result<bool> {
        Ok(self
            .first_mutation_time(pop, spe)?
            .is_some_and(|t| self.within_span(t)))
    }

    /// True if `spe` arose in `pop` within the time span.
    ///
    /// When the species has not arisen the answer is only known once the path
    /// is complete or the whole population has died out.
    pub fn mutation_within_span_strict(&self, pop: usize, spe: usize) -> Result<bool> {
        let time = self.first_mutation_time(pop, spe)?;
        self.resolve_within_span(time, pop, spe)
    }

    /// Whole-population version of [`Process::mutation_within_span_strict`].
    pub fn mutation_within_span_whole(&self, spe: usize) -> Result<bool> {
        let time = self.mutation_time_whole(spe)?;
        self.resolve_within_span(time, 0, spe)
    }

    fn resolve_within_span(&self, time: Option<f64>, pop: usize, spe: usize) -> Result<bool> {
        match time {
            Some(t) => Ok(self.within_span(t)),
            None if self.is_terminal() || self.extinguished_all() => Ok(false),
            None => Err(SimError::IncompletePath { pop, species: spe }),
        }
    }

    fn last_species(&self) -> usize {
        self.number_species().saturating_sub(1)
    }

    /// True if the fate of the last species is known in every sub-population.
    pub fn eventual_fate_last_species_all(&self) -> Result<bool> {
        let last = self.last_species();
        for pop in 0..self.number_sub_pops() {
            if self.fate(pop, last)? == Fate::Undetermined {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// True if the last species arose within the span in every sub-population.
    pub fn all_last_species_within_span(&self) -> Result<bool> {
        let last = self.last_species();
        for pop in 0..self.number_sub_pops() {
            if !self.mutation_within_span(pop, last)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Count of `spe` summed over sub-populations at path node `node`.
    pub fn path_population_whole(&self, spe: usize, node: usize) -> Result<Count> {
        self.path().snapshot(node)?.species_total(spe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{PopulationMatrix, SimRng};
    use crate::process::{BranchingProcess, TimeGrid, TimeKind};
    use rand::SeedableRng;

    fn branching(rows: Vec<Vec<Count>>, rates: Vec<f64>, ss: f64, rr: f64, span: f64) -> Process {
        let initial = PopulationMatrix::from_rows(rows).unwrap();
        let grid = TimeGrid::span(span, TimeKind::Discrete).unwrap();
        BranchingProcess::chain(initial, rates, ss, rr, grid).unwrap().into()
    }

    fn run(process: &mut Process, seed: u64) {
        let mut rng = SimRng::seed_from_u64(seed);
        while !process.is_terminal() {
            process.advance(&mut rng).unwrap();
        }
    }

    #[test]
    fn test_undetermined_fate_while_growing() {
        let p = branching(vec![vec![100, 0]], vec![0.0], 1.0, 1.0, 10.0);
        assert_eq!(p.fate(0, 1).unwrap(), Fate::Undetermined);
        assert!(matches!(p.fate_bool(0, 1), Err(SimError::UndeterminedFate { pop: 0, species: 1 })));
        assert!(matches!(
            p.mutation_within_span_strict(0, 1),
            Err(SimError::IncompletePath { .. })
        ));
        assert!(!p.mutation_within_span(0, 1).unwrap());
        assert_eq!(p.fate(0, 0).unwrap(), Fate::Arose);
    }

    #[test]
    fn test_extinguished_fate() {
        let mut p = branching(vec![vec![3, 0], vec![2, 0]], vec![0.0], 1.0, 0.0, 10.0);
        let mut rng = SimRng::seed_from_u64(1);
        p.advance(&mut rng).unwrap();
        assert!(p.extinguished(0).unwrap());
        assert!(p.extinguished_all());
        assert_eq!(p.extinction_time_whole(), Some(1.0));
        assert_eq!(p.fate(1, 1).unwrap(), Fate::Extinguished);
        assert_eq!(p.fate_whole(1).unwrap(), Fate::Extinguished);
        assert!(!p.fate_bool(0, 1).unwrap());
        // extinct before the path completed: the strict form still answers
        assert!(!p.mutation_within_span_strict(0, 1).unwrap());
        assert!(p.eventual_fate_last_species_all().unwrap());
    }

    #[test]
    fn test_arose_within_span() {
        let mut p = branching(vec![vec![5, 0], vec![5, 0]], vec![1.0], 1.0, 1.0, 4.0);
        run(&mut p, 2);
        assert_eq!(p.first_mutation_time(0, 1).unwrap(), Some(1.0));
        assert_eq!(p.mutation_time_whole(1).unwrap(), Some(1.0));
        assert!(p.all_mutations_occurred(1).unwrap());
        assert!(p.fate_bool_whole(1).unwrap());
        assert!(p.mutation_within_span_strict(1, 1).unwrap());
        assert!(p.mutation_within_span_whole(1).unwrap());
        assert!(p.all_last_species_within_span().unwrap());
        assert_eq!(p.path_population_whole(1, 1).unwrap(), p.current().species_total(1).unwrap());
    }

    #[test]
    fn test_strict_form_after_complete_path() {
        let mut p = branching(vec![vec![5, 0]], vec![0.0], 0.0, 1.0, 3.0);
        run(&mut p, 3);
        assert!(p.is_terminal());
        assert!(!p.mutation_within_span_strict(0, 1).unwrap());
        assert!(!p.extinguished_all());
        assert_eq!(p.extinction_time_whole(), None);
    }
}
