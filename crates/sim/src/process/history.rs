//! Per-trajectory bookkeeping updated once per transition.
//!
//! - [`ExtinctionTimes`]: first time each sub-population empties.
//! - [`MutationTimes`]: first time each species appears in each sub-population.
//! - [`Path`]: population snapshots at the nodes of a [`TimeGrid`].
//! - [`DiamondRoutes`]: which single mutant produced the first double mutant.
//!
//! Every latch is one-shot: once recorded, a time is never overwritten.

use crate::base::{Array2D, Count, PopulationMatrix};
use crate::errors::{Result, SimError};
use crate::process::time::{TimeGrid, TimeKind};
use serde::{Deserialize, Serialize};

/// Extinction time of each sub-population, `None` until it happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtinctionTimes {
    times: Vec<Option<f64>>,
}

impl ExtinctionTimes {
    /// All slots unset. The initial state is not inspected.
    pub fn new(number_sub_pops: usize) -> Self {
        Self {
            times: vec![None; number_sub_pops],
        }
    }

    /// Latch `time` for every sub-population that is empty and not yet latched.
    pub fn update(&mut self, population: &PopulationMatrix, time: f64) -> Result<()> {
        for (pop, slot) in self.times.iter_mut().enumerate() {
            if slot.is_none() && population.sub_pop_total(pop)? == 0 {
                *slot = Some(time);
            }
        }
        Ok(())
    }

    /// Get the extinction time of sub-population `pop`.
    pub fn get(&self, pop: usize) -> Result<Option<f64>> {
        self.times.get(pop).copied().ok_or_else(|| SimError::InvalidIndex {
            index: vec![pop],
            dims: vec![self.times.len()],
        })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn as_slice(&self) -> &[Option<f64>] {
        &self.times
    }
}

/// First-appearance time of each species in each sub-population.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationTimes {
    times: Array2D<Option<f64>>,
}

impl MutationTimes {
    /// Seeded from the initial state: species present at construction get time 0.
    pub fn new(initial: &PopulationMatrix) -> Result<Self> {
        let mut times = Self {
            times: Array2D::new([initial.number_sub_pops(), initial.number_species()]),
        };
        times.update(initial, 0.0)?;
        Ok(times)
    }

    /// Latch `time` for every species that is present and not yet latched.
    pub fn update(&mut self, population: &PopulationMatrix, time: f64) -> Result<()> {
        for pop in 0..population.number_sub_pops() {
            for spe in 0..population.number_species() {
                let slot = self.times.at_mut([pop, spe])?;
                if slot.is_none() && population.get(pop, spe)? > 0 {
                    *slot = Some(time);
                }
            }
        }
        Ok(())
    }

    /// Get the first-appearance time of `spe` in `pop`.
    pub fn get(&self, pop: usize, spe: usize) -> Result<Option<f64>> {
        self.times.at([pop, spe]).copied()
    }

    pub fn number_sub_pops(&self) -> usize {
        self.times.dim(0)
    }

    pub fn number_species(&self) -> usize {
        self.times.dim(1)
    }
}

/// Population snapshots keyed to the nodes of a time grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    grid: TimeGrid,
    nodes: Vec<PopulationMatrix>,
}

impl Path {
    /// Start a path holding the initial state at node 0.
    pub fn new(initial: PopulationMatrix, grid: TimeGrid) -> Self {
        Self {
            grid,
            nodes: vec![initial],
        }
    }

    /// True once every grid node has a snapshot.
    pub fn is_complete(&self) -> bool {
        self.nodes.len() >= self.grid.len()
    }

    fn next_node_time(&self) -> Option<f64> {
        self.grid.nodes().get(self.nodes.len()).copied()
    }

    /// Record snapshots after a transition that moved time to `time`.
    ///
    /// Discrete time appends `current` once the tick reaches the next node,
    /// at most one node per call. Continuous time appends `previous`, the state
    /// valid up to and including each node the event jumped past.
    pub fn update(&mut self, time: f64, current: &PopulationMatrix, previous: &PopulationMatrix) {
        match self.grid.kind() {
            TimeKind::Discrete => {
                if let Some(next) = self.next_node_time() {
                    if time >= next {
                        self.nodes.push(current.clone());
                    }
                }
            }
            TimeKind::Continuous => {
                while let Some(next) = self.next_node_time() {
                    if time > next {
                        self.nodes.push(previous.clone());
                    } else {
                        break;
                    }
                }
            }
        }
    }

    /// Count of `spe` in `pop` at node `node`.
    pub fn population(&self, pop: usize, spe: usize, node: usize) -> Result<Count> {
        self.snapshot(node)?.get(pop, spe)
    }

    /// Snapshot recorded at node `node`.
    pub fn snapshot(&self, node: usize) -> Result<&PopulationMatrix> {
        self.nodes.get(node).ok_or_else(|| SimError::InvalidIndex {
            index: vec![node],
            dims: vec![self.nodes.len()],
        })
    }

    /// Time of node `node`.
    pub fn time(&self, node: usize) -> Result<f64> {
        self.grid.at(node)
    }

    /// Number of nodes with a snapshot so far.
    pub fn number_filled_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of nodes in the grid.
    pub fn number_nodes(&self) -> usize {
        self.grid.len()
    }

    /// Time of the final grid node.
    pub fn last_node_time(&self) -> f64 {
        self.grid.last()
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }
}

/// Routes to the double mutant in a two-route diamond, per sub-population.
///
/// In a discrete branching step both single mutants may produce the first
/// double mutant in the same tick, so both flags can latch together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiamondRoutes {
    a_yielded_ab: Vec<bool>,
    b_yielded_ab: Vec<bool>,
    first_ab_generated: Vec<bool>,
}

impl DiamondRoutes {
    pub fn new(number_sub_pops: usize) -> Self {
        Self {
            a_yielded_ab: vec![false; number_sub_pops],
            b_yielded_ab: vec![false; number_sub_pops],
            first_ab_generated: vec![false; number_sub_pops],
        }
    }

    /// Record how many double mutants each route produced in this step.
    pub fn update(&mut self, pop: usize, ab_from_a: Count, ab_from_b: Count) -> Result<()> {
        let dims = vec![self.first_ab_generated.len()];
        let generated = self
            .first_ab_generated
            .get_mut(pop)
            .ok_or_else(|| SimError::InvalidIndex { index: vec![pop], dims })?;
        if *generated {
            return Ok(());
        }
        if ab_from_a > 0 {
            self.a_yielded_ab[pop] = true;
            *generated = true;
        }
        if ab_from_b > 0 {
            self.b_yielded_ab[pop] = true;
            *generated = true;
        }
        Ok(())
    }

    /// True if the first double mutant in `pop` came from an `a` cell.
    pub fn a_yielded_ab(&self, pop: usize) -> bool {
        self.a_yielded_ab.get(pop).copied().unwrap_or(false)
    }

    /// True if the first double mutant in `pop` came from a `b` cell.
    pub fn b_yielded_ab(&self, pop: usize) -> bool {
        self.b_yielded_ab.get(pop).copied().unwrap_or(false)
    }

    pub fn first_ab_generated(&self, pop: usize) -> bool {
        self.first_ab_generated.get(pop).copied().unwrap_or(false)
    }
}
