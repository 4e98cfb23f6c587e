//! Discrete-time branching processes.
//!
//! Every tick, each species in each sub-population draws a multinomial vector
//! of reaction-category counts from its current size, and all species are then
//! updated simultaneously from those counts. Time advances by exactly one.
//!
//! Two mutation topologies are supported:
//!
//! - [`Topology::Chain`]: species `0 -> 1 -> .. -> S-1`, where a division may
//!   carry a mutation into one or both daughters.
//! - [`Topology::Diamond`]: wild type `0` mutates to `a` or `b`, and both single
//!   mutants mutate to the double mutant `ab`.

use crate::base::{Count, PopulationMatrix, SimRng, multinomial};
use crate::errors::{Result, SimError, check_probability};
use crate::process::history::DiamondRoutes;
use crate::process::state::ProcessState;
use crate::process::time::{TimeGrid, TimeKind};

const SPE_0: usize = 0;
const SPE_A: usize = 1;
const SPE_B: usize = 2;
const SPE_AB: usize = 3;

/// Mutation rates in the diamond, in the order `u_0a, u_0b, u_a, u_b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiamondRates {
    pub u0a: f64,
    pub u0b: f64,
    pub ua: f64,
    pub ub: f64,
}

impl DiamondRates {
    /// Unpack a rate vector of length 4.
    pub fn from_slice(rates: &[f64]) -> Result<Self> {
        match rates {
            &[u0a, u0b, ua, ub] => Ok(Self { u0a, u0b, ua, ub }),
            _ => Err(SimError::mismatch(format!(
                "diamond needs 4 mutation rates, got {}",
                rates.len()
            ))),
        }
    }

    /// Reject rates whose diamond categories would be negative. Symmetric
    /// renewal needs `u0a + u0b <= 0.5`, `ua <= 0.5` and `ub <= 0.5`;
    /// asymmetric division needs `u0a + u0b <= 1`.
    pub(crate) fn check_categories(&self, symmetry: f64, renewal: f64) -> Result<()> {
        let wild_type = self.u0a + self.u0b;
        let limits = [
            (symmetry * renewal > 0.0, "u0a + u0b", wild_type, 0.5),
            (symmetry * renewal > 0.0, "ua", self.ua, 0.5),
            (symmetry * renewal > 0.0, "ub", self.ub, 0.5),
            (symmetry < 1.0, "u0a + u0b", wild_type, 1.0),
        ];
        for (applies, name, value, limit) in limits {
            if applies && value > limit {
                return Err(SimError::parameter(format!(
                    "{name} = {value} exceeds {limit}, division probabilities would be negative"
                )));
            }
        }
        Ok(())
    }

    fn to_vec(self) -> Vec<f64> {
        vec![self.u0a, self.u0b, self.ua, self.ub]
    }
}

/// Mutation topology of a branching process.
#[derive(Debug, Clone, PartialEq)]
pub enum Topology {
    /// Linear chain. `rates[s]` is the mutation rate out of species `s`;
    /// there is one rate fewer than species.
    Chain { rates: Vec<f64> },
    /// Two converging routes to the double mutant.
    Diamond { rates: DiamondRates, routes: DiamondRoutes },
}

/// Branching process in discrete time.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchingProcess {
    state: ProcessState,
    topology: Topology,
    symmetry: f64,
    renewal: f64,
}

impl BranchingProcess {
    /// Branching process along a linear chain of species.
    pub fn chain(
        initial: PopulationMatrix,
        rates: Vec<f64>,
        symmetry: f64,
        renewal: f64,
        grid: TimeGrid,
    ) -> Result<Self> {
        if rates.len() + 1 != initial.number_species() {
            return Err(SimError::mismatch(format!(
                "chain of {} species needs {} mutation rates, got {}",
                initial.number_species(),
                initial.number_species().saturating_sub(1),
                rates.len()
            )));
        }
        Self::build(initial, Topology::Chain { rates }, symmetry, renewal, grid)
    }

    /// Branching process on the two-route diamond. Species are ordered
    /// `0, a, b, ab`.
    pub fn diamond(
        initial: PopulationMatrix,
        rates: &[f64],
        symmetry: f64,
        renewal: f64,
        grid: TimeGrid,
    ) -> Result<Self> {
        if initial.number_species() != 4 {
            return Err(SimError::mismatch(format!(
                "diamond needs exactly 4 species, got {}",
                initial.number_species()
            )));
        }
        let rates = DiamondRates::from_slice(rates)?;
        let routes = DiamondRoutes::new(initial.number_sub_pops());
        Self::build(initial, Topology::Diamond { rates, routes }, symmetry, renewal, grid)
    }

    fn build(
        initial: PopulationMatrix,
        topology: Topology,
        symmetry: f64,
        renewal: f64,
        grid: TimeGrid,
    ) -> Result<Self> {
        check_probability("symmetry", symmetry)?;
        check_probability("renewal", renewal)?;
        let rates = match &topology {
            Topology::Chain { rates } => rates.clone(),
            Topology::Diamond { rates, .. } => rates.to_vec(),
        };
        for (i, &u) in rates.iter().enumerate() {
            check_probability(&format!("mutation rate {i}"), u)?;
        }
        if let Topology::Diamond { rates, .. } = &topology {
            rates.check_categories(symmetry, renewal)?;
        }
        if grid.kind() != TimeKind::Discrete {
            return Err(SimError::parameter("branching processes run on a discrete time grid"));
        }
        Ok(Self {
            state: ProcessState::new(initial, grid)?,
            topology,
            symmetry,
            renewal,
        })
    }

    pub fn state(&self) -> &ProcessState {
        &self.state
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Diamond route latches, if this is a diamond process.
    pub fn routes(&self) -> Option<&DiamondRoutes> {
        match &self.topology {
            Topology::Diamond { routes, .. } => Some(routes),
            Topology::Chain { .. } => None,
        }
    }

    /// Category probabilities for species `spe` of a chain of `number_species`.
    ///
    /// Categories: 0 symmetric renewal without mutation, 1 symmetric renewal
    /// with one mutated daughter, 2 symmetric renewal with both daughters
    /// mutated, 3 asymmetric division without mutation, 4 asymmetric division
    /// with mutation, 5 symmetric differentiation. The last species only
    /// divides asymmetrically without change.
    pub fn chain_probabilities(&self, rates: &[f64], spe: usize) -> [f64; 6] {
        let (rr, ss) = (self.renewal, self.symmetry);
        match rates.get(spe) {
            Some(&u) => {
                let us = u * u;
                [
                    rr * ss * (1.0 - 2.0 * u + us),
                    rr * ss * 2.0 * u * (1.0 - u),
                    rr * ss * us,
                    (1.0 - ss) * (1.0 - u),
                    (1.0 - ss) * u,
                    (1.0 - rr) * ss,
                ]
            }
            None => [0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        }
    }

    /// Wild-type category probabilities on the diamond.
    pub fn diamond_wild_type_probabilities(&self, rates: &DiamondRates) -> [f64; 7] {
        let (rr, ss) = (self.renewal, self.symmetry);
        let (u0a, u0b) = (rates.u0a, rates.u0b);
        [
            rr * ss * (1.0 - 2.0 * (u0a + u0b)),
            rr * ss * 2.0 * u0a,
            rr * ss * 2.0 * u0b,
            (1.0 - ss) * (1.0 - (u0a + u0b)),
            (1.0 - ss) * u0a,
            (1.0 - ss) * u0b,
            (1.0 - rr) * ss,
        ]
    }

    /// Single-mutant category probabilities on the diamond, given its rate to `ab`.
    pub fn diamond_single_mutant_probabilities(&self, u: f64) -> [f64; 5] {
        let (rr, ss) = (self.renewal, self.symmetry);
        [
            rr * ss * (1.0 - 2.0 * u),
            rr * ss * 2.0 * u,
            (1.0 - ss) * (1.0 - u),
            (1.0 - ss) * u,
            (1.0 - rr) * ss,
        ]
    }

    /// Advance by one tick.
    pub fn advance(&mut self, rng: &mut SimRng) -> Result<()> {
        let mut next = self.state.current().clone();
        for pop in 0..next.number_sub_pops() {
            match &self.topology {
                Topology::Chain { rates } => self.update_chain(&mut next, pop, rates, rng)?,
                Topology::Diamond { rates, .. } => {
                    let rates = *rates;
                    let (from_a, from_b) = self.update_diamond(&mut next, pop, &rates, rng)?;
                    if let Topology::Diamond { routes, .. } = &mut self.topology {
                        routes.update(pop, from_a, from_b)?;
                    }
                }
            }
        }
        let time = self.state.time() + 1.0;
        self.state.record_transition(next, time)
    }

    fn draw(&self, rng: &mut SimRng, pop: usize, spe: usize, probabilities: &[f64]) -> Result<Vec<Count>> {
        let size = self.state.population(pop, spe)?;
        let draws = multinomial(rng, size.max(0) as u64, probabilities)?;
        Ok(draws.into_iter().map(|d| d as Count).collect())
    }

    fn update_chain(
        &self,
        next: &mut PopulationMatrix,
        pop: usize,
        rates: &[f64],
        rng: &mut SimRng,
    ) -> Result<()> {
        let species = next.number_species();
        let mut reactions = Vec::with_capacity(species);
        for spe in 0..species {
            let probabilities = self.chain_probabilities(rates, spe);
            reactions.push(self.draw(rng, pop, spe, &probabilities)?);
        }
        let from_current = |r: &[Count]| -r[0] + r[2] + r[4] + r[5];
        let from_prior = |r: &[Count]| r[1] + 2 * r[2] + r[4];
        for spe in 0..species {
            let mut delta = -from_current(&reactions[spe]);
            if spe > 0 {
                delta += from_prior(&reactions[spe - 1]);
            }
            next.add(pop, spe, delta)?;
        }
        Ok(())
    }

    /// Returns the double mutants produced along each route.
    fn update_diamond(
        &self,
        next: &mut PopulationMatrix,
        pop: usize,
        rates: &DiamondRates,
        rng: &mut SimRng,
    ) -> Result<(Count, Count)> {
        let z0 = self.draw(rng, pop, SPE_0, &self.diamond_wild_type_probabilities(rates))?;
        let za = self.draw(rng, pop, SPE_A, &self.diamond_single_mutant_probabilities(rates.ua))?;
        let zb = self.draw(rng, pop, SPE_B, &self.diamond_single_mutant_probabilities(rates.ub))?;

        let from_wild_type_to_a = z0[1] + z0[4];
        let from_wild_type_to_b = z0[2] + z0[5];
        let ab_from_a = za[1] + za[3];
        let ab_from_b = zb[1] + zb[3];
        let single = |z: &[Count]| -z[0] + z[3] + z[4];

        next.add(pop, SPE_0, -(-z0[0] + z0[4] + z0[5] + z0[6]))?;
        next.add(pop, SPE_A, from_wild_type_to_a - single(&za))?;
        next.add(pop, SPE_B, from_wild_type_to_b - single(&zb))?;
        next.add(pop, SPE_AB, ab_from_a + ab_from_b)?;
        Ok((ab_from_a, ab_from_b))
    }
}
