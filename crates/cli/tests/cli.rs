use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn mutacc() -> Command {
    Command::cargo_bin("mutacc").unwrap()
}

/// Two-species chain that doubles every tick and never mutates.
fn init_doubling(config: &Path) {
    mutacc()
        .arg("init")
        .arg("--output")
        .arg(config)
        .args(["-u", "0", "-s", "1", "-r", "1", "-n", "2", "-T", "5"])
        .args(["--trials-cap", "5", "--policy", "fixed-duration", "--seed", "1"])
        .assert()
        .success();
}

#[test]
fn test_init_writes_configuration() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("mutacc.json");

    mutacc()
        .arg("init")
        .arg("--output")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration initialized successfully!"));

    let text = std::fs::read_to_string(&config).unwrap();
    assert!(text.contains("branching_chain"));
    assert!(text.contains("initial_population"));
}

#[test]
fn test_init_prints_parameters() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("params.json");

    mutacc()
        .arg("init")
        .arg("--output")
        .arg(&config)
        .args(["--process", "moran-diamond", "-u", "0.1,0.1,0.2,0.2", "-P", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sub-populations: 3"))
        .stdout(predicate::str::contains("Moran diamond"));
}

#[test]
fn test_init_refuses_overwrite() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("mutacc.json");
    init_doubling(&config);

    mutacc()
        .arg("init")
        .arg("--output")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    mutacc()
        .arg("init")
        .arg("--output")
        .arg(&config)
        .arg("--force")
        .assert()
        .success();
}

#[test]
fn test_init_rejects_fitness_outside_moran_chain() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("mutacc.json");

    mutacc()
        .arg("init")
        .arg("--output")
        .arg(&config)
        .args(["--fitness", "1.0,1.1"])
        .assert()
        .failure();
    assert!(!config.exists());
}

#[test]
fn test_validate() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("mutacc.json");
    init_doubling(&config);

    mutacc()
        .arg("validate")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_validate_missing_file() {
    let temp = tempdir().unwrap();

    mutacc()
        .arg("validate")
        .arg("--config")
        .arg(temp.path().join("missing.json"))
        .assert()
        .failure();
}

#[test]
fn test_run_writes_results() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("mutacc.json");
    let output = temp.path().join("results");
    init_doubling(&config);

    mutacc()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .args(["--progress", "false"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Simulation complete!"));

    let results = std::fs::read_to_string(output.join("results.json")).unwrap();
    let results: serde_json::Value = serde_json::from_str(&results).unwrap();
    assert_eq!(results["trials"], 5);
    assert!(!results["records"].as_array().unwrap().is_empty());
    assert!(output.join("successful_states.bin").exists());
}

#[test]
fn test_run_then_replay() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("mutacc.json");
    let output = temp.path().join("results");
    let replayed = temp.path().join("replayed");
    init_doubling(&config);

    mutacc()
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .args(["--progress", "false"])
        .assert()
        .success();

    mutacc()
        .arg("replay")
        .arg("--config")
        .arg(&config)
        .arg("--states")
        .arg(output.join("successful_states.bin"))
        .arg("--output")
        .arg(&replayed)
        .args(["--random", "2", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Random trajectories: 2"));

    assert!(replayed.join("random_trajectory0.dat_transitions").exists());
    assert!(replayed.join("random_trajectory1.dat_nodes").exists());
}

#[test]
fn test_lifetime_risk_sweep() {
    let temp = tempdir().unwrap();
    let output = temp.path().join("risk");

    mutacc()
        .arg("lifetime-risk")
        .args(["--number-n", "2", "--n-lower", "10", "--n-upper", "100"])
        .args(["-u", "0.5,0.5", "-s", "0", "-T", "2"])
        .args(["--trials-cap", "20", "--seed", "4"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Sweep complete!"));

    let table = std::fs::read_to_string(output.join("lifetime_risk__s0.dat")).unwrap();
    assert_eq!(table.lines().count(), 2);
    let symmetries = std::fs::read_to_string(output.join("ss.in")).unwrap();
    assert_eq!(symmetries.trim(), "0");
}
