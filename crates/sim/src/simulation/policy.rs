//! When a trial stops, and which trials are worth replaying.

use crate::base::random::{rng_from_bytes, rng_state_bytes};
use crate::base::SimRng;
use crate::errors::Result;
use crate::process::Process;
use serde::{Deserialize, Serialize};

/// Number of successful generator states kept for replay.
pub const SUCCESSFUL_STATES_CAP: usize = 10;

/// Success predicate for a single trial.
///
/// Every policy stops a trial once the path is complete, the trial succeeded,
/// or every sub-population is extinct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialPolicy {
    /// Success once every sub-population is extinct.
    WaitForAllExtinctions,
    /// Success once the last species has arisen within the span in every sub-population.
    WaitForLastSpeciesInAllSubPops,
    /// Success once the fate of the last species is known in every sub-population.
    WaitForEventualFateLastSpecies,
    /// Never succeeds; trials run to the end of the path.
    #[default]
    FixedDuration,
    /// Success if any member succeeds.
    Combined(Vec<TrialPolicy>),
}

impl TrialPolicy {
    pub fn success(&self, process: &Process) -> Result<bool> {
        match self {
            TrialPolicy::WaitForAllExtinctions => Ok(process.extinguished_all()),
            TrialPolicy::WaitForLastSpeciesInAllSubPops => process.all_last_species_within_span(),
            TrialPolicy::WaitForEventualFateLastSpecies => process.eventual_fate_last_species_all(),
            TrialPolicy::FixedDuration => Ok(false),
            TrialPolicy::Combined(policies) => {
                for policy in policies {
                    if policy.success(process)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    pub fn terminate(&self, process: &Process) -> Result<bool> {
        Ok(process.is_terminal() || self.success(process)? || process.extinguished_all())
    }
}

/// Capped list of generator states captured before successful trials.
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessfulStates {
    cap: usize,
    states: Vec<SimRng>,
}

impl SuccessfulStates {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            states: Vec::with_capacity(cap),
        }
    }

    /// Keep `state` unless the list is already full. Returns true if kept.
    pub fn push(&mut self, state: SimRng) -> bool {
        if self.is_full() {
            return false;
        }
        self.states.push(state);
        true
    }

    pub fn is_full(&self) -> bool {
        self.states.len() >= self.cap
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[SimRng] {
        &self.states
    }

    /// Serialize every state for export.
    pub fn to_bytes(&self) -> Result<Vec<Vec<u8>>> {
        self.states.iter().map(rng_state_bytes).collect()
    }

    /// Rebuild from exported states. States beyond `cap` are dropped.
    pub fn from_bytes(cap: usize, bytes: &[Vec<u8>]) -> Result<Self> {
        let mut states = Self::new(cap);
        for b in bytes {
            states.push(rng_from_bytes(b)?);
        }
        Ok(states)
    }
}

impl Default for SuccessfulStates {
    fn default() -> Self {
        Self::new(SUCCESSFUL_STATES_CAP)
    }
}
