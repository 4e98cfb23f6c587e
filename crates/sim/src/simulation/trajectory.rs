//! Replay of single trials for inspection.
//!
//! A trial is fully determined by the factory, the policy and the generator
//! state it started from, so a captured state replays the same trajectory.

use crate::base::SimRng;
use crate::errors::Result;
use crate::simulation::engine::ProcessFactory;
use crate::simulation::policy::{SuccessfulStates, TrialPolicy};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Most random trajectories printed per run.
pub const RANDOM_TRAJECTORIES_CAP: usize = 10;

/// Rendered record of one trial.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// Full state before the first transition and after every one.
    pub transitions: Vec<String>,
    /// Path time and populations at every filled node.
    pub nodes: String,
}

impl Trajectory {
    /// Run one trial from `rng`, recording every state it goes through.
    pub fn replay<F: ProcessFactory + ?Sized>(factory: &F, policy: &TrialPolicy, rng: &mut SimRng) -> Result<Self> {
        let mut process = factory.create()?;
        let mut transitions = vec![process.to_string()];
        while !policy.terminate(&process)? {
            process.advance(rng)?;
            transitions.push(process.to_string());
        }

        let path = process.path();
        let mut nodes = String::new();
        for node in 0..path.number_filled_nodes() {
            nodes.push_str(&format!("node {node}, time = {}\n", path.time(node)?));
            nodes.push_str(&path.snapshot(node)?.to_string());
        }
        Ok(Self { transitions, nodes })
    }

    /// Number of transitions after the initial state.
    pub fn steps(&self) -> usize {
        self.transitions.len().saturating_sub(1)
    }

    pub fn render_transitions(&self) -> String {
        self.transitions.join("\n")
    }

    /// Write `{stem}_transitions` and `{stem}_nodes` into `dir`.
    pub fn save(&self, dir: impl AsRef<Path>, stem: &str) -> Result<[PathBuf; 2]> {
        let dir = dir.as_ref();
        let transitions = dir.join(format!("{stem}_transitions"));
        let nodes = dir.join(format!("{stem}_nodes"));
        fs::write(&transitions, self.render_transitions())?;
        fs::write(&nodes, &self.nodes)?;
        Ok([transitions, nodes])
    }
}

/// Replay every captured successful state into `successful_trajectory{i}.dat`.
pub fn save_successful_trajectories<F: ProcessFactory + ?Sized>(
    factory: &F,
    policy: &TrialPolicy,
    states: &SuccessfulStates,
    dir: impl AsRef<Path>,
) -> Result<usize> {
    let dir = dir.as_ref();
    for (i, state) in states.states().iter().enumerate() {
        let trajectory = Trajectory::replay(factory, policy, &mut state.clone())?;
        trajectory.save(dir, &format!("successful_trajectory{i}.dat"))?;
    }
    info!("Printed {} successful trajectories to {}", states.len(), dir.display());
    Ok(states.len())
}

/// Run up to [`RANDOM_TRAJECTORIES_CAP`] fresh trials from `rng` into
/// `random_trajectory{i}.dat`.
pub fn save_random_trajectories<F: ProcessFactory + ?Sized>(
    factory: &F,
    policy: &TrialPolicy,
    count: usize,
    rng: &mut SimRng,
    dir: impl AsRef<Path>,
) -> Result<usize> {
    let dir = dir.as_ref();
    let count = count.min(RANDOM_TRAJECTORIES_CAP);
    for i in 0..count {
        let trajectory = Trajectory::replay(factory, policy, rng)?;
        trajectory.save(dir, &format!("random_trajectory{i}.dat"))?;
    }
    info!("Printed {count} random trajectories to {}", dir.display());
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{PopulationMatrix, rng_from_seed};
    use crate::process::{MoranProcess, Process, TimeGrid, TimeKind};
    use crate::simulation::engine::run_trial;

    fn moran() -> Process {
        let initial = PopulationMatrix::from_row(vec![10, 0, 0]).unwrap();
        let grid = TimeGrid::uniform(3, 1.0, TimeKind::Continuous).unwrap();
        MoranProcess::padded_chain(initial, &[0.3, 0.3], 0.5, grid).unwrap().into()
    }

    #[test]
    fn test_replay_is_deterministic() {
        let policy = TrialPolicy::FixedDuration;
        let state = rng_from_seed(Some(21));
        let first = Trajectory::replay(&moran(), &policy, &mut state.clone()).unwrap();
        let second = Trajectory::replay(&moran(), &policy, &mut state.clone()).unwrap();
        assert_eq!(first, second);
        assert!(first.transitions[0].starts_with("time = 0"));
        assert_eq!(first.nodes.matches("node ").count(), 3);

        let ran = run_trial(&moran(), &policy, &mut state.clone()).unwrap();
        assert_eq!(first.transitions.last().unwrap(), &ran.to_string());
    }

    #[test]
    fn test_saved_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let policy = TrialPolicy::FixedDuration;
        let mut states = SuccessfulStates::new(2);
        states.push(rng_from_seed(Some(1)));
        assert_eq!(save_successful_trajectories(&moran(), &policy, &states, dir.path()).unwrap(), 1);
        let saved = save_random_trajectories(&moran(), &policy, 50, &mut rng_from_seed(Some(2)), dir.path()).unwrap();
        assert_eq!(saved, RANDOM_TRAJECTORIES_CAP);
        assert!(dir.path().join("successful_trajectory0.dat_transitions").exists());
        assert!(dir.path().join("successful_trajectory0.dat_nodes").exists());
        assert!(dir.path().join("random_trajectory9.dat_nodes").exists());
        assert!(!dir.path().join("random_trajectory10.dat_nodes").exists());
    }

    #[test]
    fn test_node_text_lists_every_snapshot() {
        let trajectory =
            Trajectory::replay(&moran(), &TrialPolicy::FixedDuration, &mut rng_from_seed(Some(8))).unwrap();
        let lines: Vec<&str> = trajectory.nodes.lines().collect();
        assert_eq!(lines[0], "node 0, time = 0");
        assert!(lines.contains(&"node 2, time = 1"));
        assert!(trajectory.nodes.contains("10 0 0"));
    }
}
