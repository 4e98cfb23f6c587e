//! Continuous-time Moran processes simulated with the Gillespie algorithm.
//!
//! One engine serves every topology. A [`MutationGraph`] lists which species
//! divide and which mutation edges connect them. Each step rebuilds the rate
//! tensor from the current counts, picks one replacement by inverting its
//! cumulative sum, and advances time by an exponential waiting time.
//!
//! The tensor is indexed `(j, k, i, l)`: a stage-`k` cell in sub-population
//! `j` is replaced by a stage-`l` cell produced in sub-population `i`. Only
//! dividing species can be replaced, so the second dimension is the number of
//! dividing species. The total population size is conserved.

use crate::base::{Array4D, PopulationMatrix, SimRng};
use crate::errors::{Result, SimError, check_probability};
use crate::process::branching::DiamondRates;
use crate::process::state::ProcessState;
use crate::process::time::{TimeGrid, TimeKind};
use rand::Rng;
use rand_distr::{Distribution, Exp};

/// A mutation from one species into another at a fixed per-division rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutationEdge {
    pub from: usize,
    pub to: usize,
    pub rate: f64,
}

/// Which species divide and how they mutate into each other.
///
/// Species `0..dividing` divide; the remaining species are terminal and
/// neither divide nor get replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationGraph {
    number_species: usize,
    dividing: usize,
    edges: Vec<MutationEdge>,
}

impl MutationGraph {
    /// Create a graph, checking that every edge starts at a dividing species.
    pub fn new(number_species: usize, dividing: usize, edges: Vec<MutationEdge>) -> Result<Self> {
        if dividing > number_species {
            return Err(SimError::mismatch(format!(
                "{dividing} dividing species exceed {number_species} species"
            )));
        }
        for edge in &edges {
            if edge.from >= dividing || edge.to >= number_species {
                return Err(SimError::mismatch(format!(
                    "mutation edge {} -> {} does not fit {number_species} species with {dividing} dividing",
                    edge.from, edge.to
                )));
            }
            check_probability(&format!("mutation rate {} -> {}", edge.from, edge.to), edge.rate)?;
        }
        Ok(Self {
            number_species,
            dividing,
            edges,
        })
    }

    /// Chain `0 -> 1 -> .. -> S-1` with a terminal top species.
    pub fn chain(rates: &[f64]) -> Result<Self> {
        let edges = chain_edges(rates);
        Self::new(rates.len() + 1, rates.len(), edges)
    }

    /// Chain whose top species still divides, with no outgoing mutation.
    pub fn padded_chain(rates: &[f64]) -> Result<Self> {
        let edges = chain_edges(rates);
        Self::new(rates.len() + 1, rates.len() + 1, edges)
    }

    /// Diamond `0 -> a, 0 -> b, a -> ab, b -> ab` with `ab` terminal.
    pub fn diamond(rates: DiamondRates) -> Result<Self> {
        let edge = |from, to, rate| MutationEdge { from, to, rate };
        Self::new(
            4,
            3,
            vec![
                edge(0, 1, rates.u0a),
                edge(0, 2, rates.u0b),
                edge(1, 3, rates.ua),
                edge(2, 3, rates.ub),
            ],
        )
    }

    pub fn number_species(&self) -> usize {
        self.number_species
    }

    pub fn dividing(&self) -> usize {
        self.dividing
    }

    pub fn edges(&self) -> &[MutationEdge] {
        &self.edges
    }

    /// Total mutation rate out of species `spe`.
    pub fn outgoing_rate(&self, spe: usize) -> f64 {
        self.edges.iter().filter(|e| e.from == spe).map(|e| e.rate).sum()
    }
}

fn chain_edges(rates: &[f64]) -> Vec<MutationEdge> {
    rates
        .iter()
        .enumerate()
        .map(|(from, &rate)| MutationEdge {
            from,
            to: from + 1,
            rate,
        })
        .collect()
}

/// Moran process in continuous time.
#[derive(Debug, Clone, PartialEq)]
pub struct MoranProcess {
    state: ProcessState,
    graph: MutationGraph,
    symmetry: f64,
    fitness: Option<Vec<f64>>,
    total_population: f64,
}

impl MoranProcess {
    /// Create a process on an arbitrary mutation graph.
    pub fn new(
        initial: PopulationMatrix,
        graph: MutationGraph,
        symmetry: f64,
        fitness: Option<Vec<f64>>,
        grid: TimeGrid,
    ) -> Result<Self> {
        check_probability("symmetry", symmetry)?;
        if initial.number_species() != graph.number_species() {
            return Err(SimError::mismatch(format!(
                "population has {} species, mutation graph has {}",
                initial.number_species(),
                graph.number_species()
            )));
        }
        if let Some(weights) = &fitness {
            if weights.len() != graph.dividing() {
                return Err(SimError::mismatch(format!(
                    "{} fitness values for {} dividing species",
                    weights.len(),
                    graph.dividing()
                )));
            }
            if weights.iter().any(|w| !(*w >= 0.0)) {
                return Err(SimError::parameter("fitness values must be non-negative"));
            }
        }
        if symmetry > 0.0 {
            for spe in 0..graph.dividing() {
                let outgoing = graph.outgoing_rate(spe);
                if outgoing > 0.5 {
                    return Err(SimError::parameter(format!(
                        "mutation rate {outgoing} out of species {spe} exceeds 0.5, symmetric division rates would be negative"
                    )));
                }
            }
        }
        if grid.kind() != TimeKind::Continuous {
            return Err(SimError::parameter("Moran processes run on a continuous time grid"));
        }
        let total_population = initial.total();
        if total_population <= 0 {
            return Err(SimError::parameter("Moran process needs a positive total population"));
        }
        Ok(Self {
            state: ProcessState::new(initial, grid)?,
            graph,
            symmetry,
            fitness,
            total_population: total_population as f64,
        })
    }

    /// Chain with a terminal top species. Needs one rate fewer than species.
    pub fn chain(initial: PopulationMatrix, rates: &[f64], symmetry: f64, grid: TimeGrid) -> Result<Self> {
        check_chain_rates(&initial, rates)?;
        Self::new(initial, MutationGraph::chain(rates)?, symmetry, None, grid)
    }

    /// Chain whose top species keeps dividing with a zero mutation rate.
    pub fn padded_chain(initial: PopulationMatrix, rates: &[f64], symmetry: f64, grid: TimeGrid) -> Result<Self> {
        check_chain_rates(&initial, rates)?;
        Self::new(initial, MutationGraph::padded_chain(rates)?, symmetry, None, grid)
    }

    /// Diamond with species ordered `0, a, b, ab`.
    pub fn diamond(initial: PopulationMatrix, rates: &[f64], symmetry: f64, grid: TimeGrid) -> Result<Self> {
        if initial.number_species() != 4 {
            return Err(SimError::mismatch(format!(
                "diamond needs exactly 4 species, got {}",
                initial.number_species()
            )));
        }
        let graph = MutationGraph::diamond(DiamondRates::from_slice(rates)?)?;
        Self::new(initial, graph, symmetry, None, grid)
    }

    /// Chain with selection: `fitness[s]` weights each dividing species.
    pub fn with_fitness(
        initial: PopulationMatrix,
        rates: &[f64],
        fitness: Vec<f64>,
        symmetry: f64,
        grid: TimeGrid,
    ) -> Result<Self> {
        check_chain_rates(&initial, rates)?;
        Self::new(initial, MutationGraph::chain(rates)?, symmetry, Some(fitness), grid)
    }

    pub fn state(&self) -> &ProcessState {
        &self.state
    }

    pub fn graph(&self) -> &MutationGraph {
        &self.graph
    }

    /// Relative fitness `w_s / mean_w` of each dividing species.
    ///
    /// Without weights every species has relative fitness 1.
    pub fn relative_fitness(&self) -> Result<Vec<f64>> {
        let dividing = self.graph.dividing();
        let Some(weights) = &self.fitness else {
            return Ok(vec![1.0; dividing]);
        };
        let current = self.state.current();
        let mut mean = 0.0;
        for pop in 0..current.number_sub_pops() {
            for (spe, w) in weights.iter().enumerate() {
                mean += w * current.get(pop, spe)? as f64;
            }
        }
        mean /= self.total_population;
        if mean > 0.0 {
            Ok(weights.iter().map(|w| w / mean).collect())
        } else {
            Ok(vec![1.0; dividing])
        }
    }

    /// Build the rate tensor for the current state.
    pub fn rate_tensor(&self) -> Result<Array4D<f64>> {
        let counts = self.state.current().rows();
        let pops = counts.len();
        let dividing = self.graph.dividing();
        let species = self.graph.number_species();
        let ss = self.symmetry;
        let big_n = self.total_population;
        let fitness = self.relative_fitness()?;
        let outgoing: Vec<f64> = (0..dividing).map(|s| self.graph.outgoing_rate(s)).collect();
        let n = |pop: usize, spe: usize| counts[pop][spe] as f64;

        Ok(Array4D::from_fn([pops, dividing, pops, species], |[j, k, i, l]| {
            if i == j && k == l {
                return 0.0;
            }
            let replaced = n(j, k);
            let mut rate = 0.0;
            if l < dividing {
                rate += 0.5 * ss * fitness[l] * n(i, l) * (1.0 - 2.0 * outgoing[l]) * replaced / big_n;
            }
            for edge in self.graph.edges().iter().filter(|e| e.to == l) {
                let p = edge.from;
                rate += ss * fitness[p] * n(i, p) * edge.rate * replaced / big_n;
                if i == j && k == p {
                    rate += (1.0 - ss) * n(i, p) * edge.rate;
                }
            }
            rate
        }))
    }

    /// Advance by one Gillespie event.
    pub fn advance(&mut self, rng: &mut SimRng) -> Result<()> {
        let rates = self.rate_tensor()?;
        let total = rates.sum();
        let threshold = rng.random::<f64>() * total;
        let Some([pop_dec, spe_dec, pop_inc, spe_inc]) = rates.cumulative_sum(threshold) else {
            return Err(SimError::DegenerateSelection {
                threshold,
                total,
                absorbing: total < 1e-10,
                state: self.state.to_string(),
            });
        };
        let mut next = self.state.current().clone();
        next.add(pop_dec, spe_dec, -1)?;
        next.add(pop_inc, spe_inc, 1)?;
        let waiting = Exp::new(total)
            .map_err(|e| SimError::parameter(format!("total rate {total}: {e}")))?
            .sample(rng);
        let time = self.state.time() + waiting;
        self.state.record_transition(next, time)
    }
}

fn check_chain_rates(initial: &PopulationMatrix, rates: &[f64]) -> Result<()> {
    if rates.len() + 1 != initial.number_species() {
        return Err(SimError::mismatch(format!(
            "chain of {} species needs {} mutation rates, got {}",
            initial.number_species(),
            initial.number_species().saturating_sub(1),
            rates.len()
        )));
    }
    Ok(())
}
