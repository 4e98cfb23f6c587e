//! Stochastic processes and the bookkeeping they carry.
//!
//! [`Process`] is the closed set of variants the Monte Carlo driver runs. All
//! variants share a [`ProcessState`], so every query except [`Process::advance`]
//! reads the same structure.

pub mod branching;
pub mod history;
pub mod moran;
pub mod outcome;
pub mod state;
pub mod time;

pub use branching::{BranchingProcess, DiamondRates, Topology};
pub use history::{DiamondRoutes, ExtinctionTimes, MutationTimes, Path};
pub use moran::{MoranProcess, MutationEdge, MutationGraph};
pub use outcome::Fate;
pub use state::ProcessState;
pub use time::{TIME_TOLERANCE, TimeGrid, TimeKind};

use crate::base::{Count, PopulationMatrix, SimRng};
use crate::errors::Result;
use std::fmt;

/// A stochastic process variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Process {
    /// Discrete-time branching process.
    Branching(BranchingProcess),
    /// Continuous-time Moran process.
    Moran(MoranProcess),
}

impl Process {
    /// Mutate the state by exactly one step (branching) or one event (Moran).
    pub fn advance(&mut self, rng: &mut SimRng) -> Result<()> {
        match self {
            Process::Branching(p) => p.advance(rng),
            Process::Moran(p) => p.advance(rng),
        }
    }

    pub fn state(&self) -> &ProcessState {
        match self {
            Process::Branching(p) => p.state(),
            Process::Moran(p) => p.state(),
        }
    }

    pub fn kind(&self) -> TimeKind {
        self.state().kind()
    }

    pub fn current_time(&self) -> f64 {
        self.state().time()
    }

    /// Get the current count of `spe` in `pop`.
    pub fn population(&self, pop: usize, spe: usize) -> Result<Count> {
        self.state().population(pop, spe)
    }

    pub fn current(&self) -> &PopulationMatrix {
        self.state().current()
    }

    pub fn number_sub_pops(&self) -> usize {
        self.state().number_sub_pops()
    }

    pub fn number_species(&self) -> usize {
        self.state().number_species()
    }

    /// Get the extinction time of `pop`, if it has gone extinct.
    pub fn extinction_time(&self, pop: usize) -> Result<Option<f64>> {
        self.state().extinction_times().get(pop)
    }

    /// Get the first time `spe` appeared in `pop`.
    pub fn first_mutation_time(&self, pop: usize, spe: usize) -> Result<Option<f64>> {
        self.state().mutation_times().get(pop, spe)
    }

    pub fn path(&self) -> &Path {
        self.state().path()
    }

    /// Time of path node `node`.
    pub fn path_time(&self, node: usize) -> Result<f64> {
        self.path().time(node)
    }

    /// Count of `spe` in `pop` recorded at path node `node`.
    pub fn path_population(&self, pop: usize, spe: usize, node: usize) -> Result<Count> {
        self.path().population(pop, spe, node)
    }

    /// True once the path has filled every grid node.
    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }

    /// Diamond route latches, for the branching diamond.
    pub fn routes(&self) -> Option<&DiamondRoutes> {
        match self {
            Process::Branching(p) => p.routes(),
            Process::Moran(_) => None,
        }
    }
}

impl From<BranchingProcess> for Process {
    fn from(p: BranchingProcess) -> Self {
        Process::Branching(p)
    }
}

impl From<MoranProcess> for Process {
    fn from(p: MoranProcess) -> Self {
        Process::Moran(p)
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.state().fmt(f)
    }
}
