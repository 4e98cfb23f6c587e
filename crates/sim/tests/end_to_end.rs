//! End-to-end runs of complete Monte Carlo experiments.

use mutacc_sim::prelude::*;
use mutacc_sim::process::Fate;
use mutacc_sim::simulation::run_trial;
use mutacc_sim::statistics::summary::probability_mutation_fate_last;

fn symmetric_renewal(span: f64) -> Process {
    let initial = PopulationMatrix::from_row(vec![100, 0]).unwrap();
    let grid = TimeGrid::span(span, TimeKind::Discrete).unwrap();
    BranchingProcess::chain(initial, vec![0.0], 1.0, 1.0, grid)
        .unwrap()
        .into()
}

#[test]
fn test_species_never_arises_without_mutation() {
    let mut process = symmetric_renewal(8.0);
    let mut rng = rng_from_seed(Some(1));
    while !process.is_terminal() {
        process.advance(&mut rng).unwrap();
        assert_eq!(process.first_mutation_time(0, 1).unwrap(), None);
        assert_eq!(process.extinction_time(0).unwrap(), None);
        assert_eq!(process.fate(0, 1).unwrap(), Fate::Undetermined);
    }
    assert_eq!(process.current_time(), 8.0);
    assert_eq!(process.population(0, 0).unwrap(), 100 << 8);
    assert!(process.fate_bool(0, 1).is_err());
    assert!(!process.mutation_within_span(0, 1).unwrap());
}

#[test]
fn test_fixed_duration_run_converges_on_trial_cap() {
    let template = symmetric_renewal(5.0);
    let options = GathererOptions {
        trials_cap: 25,
        ..GathererOptions::default()
    };
    let mut stats = CdfStatistics::mutation_time(&template, 5.0, &options).unwrap();
    let mut mc = MonteCarlo::new(template, TrialPolicy::FixedDuration);
    let trials = mc.run(&mut stats, &mut rng_from_seed(Some(2))).unwrap();
    assert_eq!(trials, 25);
    assert!(stats.converged());

    // species 0 is present from the start, species 1 never arises
    let wild_type = stats.histogram(0, 0, 0).unwrap().histogram().snapshot();
    assert!(wild_type.probability.iter().all(|&p| p == 1.0));
    let mutant = stats.histogram(0, 1, 0).unwrap().histogram().snapshot();
    assert!(mutant.probability.iter().all(|&p| p == 0.0));
}

#[test]
fn test_lifetime_risk_of_certain_mutation() {
    // every division of species 0 mutates, so species 1 arises in the first tick
    let initial = PopulationMatrix::from_rows(vec![vec![50, 0], vec![50, 0]]).unwrap();
    let grid = TimeGrid::span(3.0, TimeKind::Discrete).unwrap();
    let template: Process = BranchingProcess::chain(initial, vec![1.0], 0.0, 1.0, grid)
        .unwrap()
        .into();
    let options = GathererOptions {
        error_probability: 0.5,
        ..GathererOptions::default()
    };
    let mut stats = PmfStatistics::lifetime_risk(&template, &options).unwrap();
    let mut mc = MonteCarlo::new(template.clone(), TrialPolicy::WaitForLastSpeciesInAllSubPops);
    let trials = mc.run(&mut stats, &mut rng_from_seed(Some(3))).unwrap();
    assert_eq!(trials, 4);
    assert_eq!(probability_mutation_fate_last(&stats).unwrap(), 1.0);
    assert_eq!(mc.successful_states().len(), 4);

    let replayed = run_trial(&template, mc.policy(), &mut mc.successful_states().states()[0].clone()).unwrap();
    assert!(replayed.all_last_species_within_span().unwrap());
}
