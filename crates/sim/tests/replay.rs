//! Exact replay of trials from captured generator states.

use mutacc_sim::prelude::*;
use mutacc_sim::simulation::{SuccessfulStates, Trajectory, run_trial};

fn template() -> Process {
    ProcessBuilder::new()
        .branching_chain()
        .uniform_sub_populations(1, 3)
        .rates(vec![0.3, 0.3])
        .symmetry(0.5)
        .renewal(0.8)
        .time_span(20.0)
        .build()
        .unwrap()
}

#[test]
fn test_captured_states_replay_identically() {
    let template = template();
    let policy = TrialPolicy::WaitForLastSpeciesInAllSubPops;
    let options = GathererOptions {
        trials_cap: 300,
        ..GathererOptions::default()
    };
    let mut stats = PmfStatistics::lifetime_risk(&template, &options).unwrap();
    let mut mc = MonteCarlo::new(template.clone(), policy.clone());
    mc.run(&mut stats, &mut rng_from_seed(Some(8))).unwrap();

    for state in mc.successful_states().states() {
        let first = run_trial(&template, &policy, &mut state.clone()).unwrap();
        let second = run_trial(&template, &policy, &mut state.clone()).unwrap();
        assert_eq!(first, second);
        assert!(policy.success(&first).unwrap());

        let trajectory = Trajectory::replay(&template, &policy, &mut state.clone()).unwrap();
        assert_eq!(trajectory.transitions.last().unwrap(), &first.to_string());
    }
}

#[test]
fn test_exported_states_restore() {
    let template = template();
    let policy = TrialPolicy::FixedDuration;
    let mut states = SuccessfulStates::new(3);
    states.push(rng_from_seed(Some(1)));
    states.push(rng_from_seed(Some(2)));
    let restored = SuccessfulStates::from_bytes(3, &states.to_bytes().unwrap()).unwrap();
    for (a, b) in states.states().iter().zip(restored.states()) {
        let left = run_trial(&template, &policy, &mut a.clone()).unwrap();
        let right = run_trial(&template, &policy, &mut b.clone()).unwrap();
        assert_eq!(left, right);
    }
}
