//! State shared by every process variant and the single transition sequence.

use crate::base::{Count, PopulationMatrix};
use crate::errors::Result;
use crate::process::history::{ExtinctionTimes, MutationTimes, Path};
use crate::process::time::{TimeGrid, TimeKind};
use std::fmt;

/// Current and previous populations, the clock, and the trajectory history.
///
/// Variants compute the next population matrix and hand it to
/// [`ProcessState::record_transition`]; nothing else mutates the state.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessState {
    time: f64,
    current: PopulationMatrix,
    previous: PopulationMatrix,
    extinction_times: ExtinctionTimes,
    mutation_times: MutationTimes,
    path: Path,
}

impl ProcessState {
    /// Initialise at time 0. Species present initially get mutation time 0.
    pub fn new(initial: PopulationMatrix, grid: TimeGrid) -> Result<Self> {
        let mutation_times = MutationTimes::new(&initial)?;
        Ok(Self {
            time: 0.0,
            extinction_times: ExtinctionTimes::new(initial.number_sub_pops()),
            mutation_times,
            previous: initial.clone(),
            path: Path::new(initial.clone(), grid),
            current: initial,
        })
    }

    /// Apply one transition.
    ///
    /// The outgoing state becomes `previous`, then populations and time are
    /// replaced, then extinction, mutation and path records are updated in
    /// that order.
    pub fn record_transition(&mut self, next: PopulationMatrix, time: f64) -> Result<()> {
        self.previous = std::mem::replace(&mut self.current, next);
        self.time = time;
        self.extinction_times.update(&self.current, self.time)?;
        self.mutation_times.update(&self.current, self.time)?;
        self.path.update(self.time, &self.current, &self.previous);
        Ok(())
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn kind(&self) -> TimeKind {
        self.path.grid().kind()
    }

    pub fn current(&self) -> &PopulationMatrix {
        &self.current
    }

    pub fn previous(&self) -> &PopulationMatrix {
        &self.previous
    }

    /// Get the current count of `spe` in `pop`.
    pub fn population(&self, pop: usize, spe: usize) -> Result<Count> {
        self.current.get(pop, spe)
    }

    pub fn number_sub_pops(&self) -> usize {
        self.current.number_sub_pops()
    }

    pub fn number_species(&self) -> usize {
        self.current.number_species()
    }

    pub fn extinction_times(&self) -> &ExtinctionTimes {
        &self.extinction_times
    }

    pub fn mutation_times(&self) -> &MutationTimes {
        &self.mutation_times
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once the path has a snapshot at every grid node.
    pub fn is_terminal(&self) -> bool {
        self.path.is_complete()
    }
}

fn format_time(t: Option<f64>) -> String {
    t.map_or_else(|| "-".to_string(), |t| t.to_string())
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "time = {}", self.time)?;
        writeln!(f, "populations:")?;
        write!(f, "{}", self.current)?;
        writeln!(f, "mutation times:")?;
        for pop in 0..self.number_sub_pops() {
            let row: Vec<String> = (0..self.number_species())
                .map(|spe| format_time(self.mutation_times.get(pop, spe).ok().flatten()))
                .collect();
            writeln!(f, "{}", row.join(" "))?;
        }
        let extinctions: Vec<String> = self
            .extinction_times
            .as_slice()
            .iter()
            .map(|t| format_time(*t))
            .collect();
        writeln!(f, "extinction times: {}", extinctions.join(" "))?;
        writeln!(f, "total population = {}", self.current.total())
    }
}
