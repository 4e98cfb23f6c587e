//! Monte Carlo driver.
//!
//! Repeats independent trials until a statistics gatherer converges. Each
//! trial clones a fresh process from the factory, advances it until the
//! trial policy stops it, and folds the terminal state into the statistics.
//! Generator states captured before successful trials are kept for replay.

use crate::base::SimRng;
use crate::errors::Result;
use crate::process::Process;
use crate::simulation::policy::{SuccessfulStates, TrialPolicy};
use crate::simulation::raw_data::RawDataSink;
use crate::statistics::StatisticsGatherer;
use log::debug;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Default number of trials per parallel batch.
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Source of fresh initial states, one per trial.
pub trait ProcessFactory: Sync {
    fn create(&self) -> Result<Process>;
}

impl ProcessFactory for Process {
    fn create(&self) -> Result<Process> {
        Ok(self.clone())
    }
}

impl<F> ProcessFactory for F
where
    F: Fn() -> Result<Process> + Sync,
{
    fn create(&self) -> Result<Process> {
        self()
    }
}

/// Called after every finished trial with the total trial count.
pub type TrialCallback = Box<dyn FnMut(u64) + Send>;

/// Monte Carlo driver over a process factory and a trial policy.
pub struct MonteCarlo<F: ProcessFactory> {
    factory: F,
    policy: TrialPolicy,
    sink: Option<Box<dyn RawDataSink>>,
    successful: SuccessfulStates,
    batch_size: usize,
    trials: u64,
    on_trial: Option<TrialCallback>,
}

/// Run one trial from `factory` with `rng`.
pub fn run_trial<F: ProcessFactory + ?Sized>(factory: &F, policy: &TrialPolicy, rng: &mut SimRng) -> Result<Process> {
    let mut process = factory.create()?;
    while !policy.terminate(&process)? {
        process.advance(rng)?;
    }
    Ok(process)
}

impl<F: ProcessFactory> MonteCarlo<F> {
    pub fn new(factory: F, policy: TrialPolicy) -> Self {
        Self {
            factory,
            policy,
            sink: None,
            successful: SuccessfulStates::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            trials: 0,
            on_trial: None,
        }
    }

    /// Write raw samples of every trial to `sink`.
    pub fn with_sink(mut self, sink: Box<dyn RawDataSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_successful_states(mut self, successful: SuccessfulStates) -> Self {
        self.successful = successful;
        self
    }

    /// Report progress after every finished trial.
    pub fn on_trial(mut self, callback: impl FnMut(u64) + Send + 'static) -> Self {
        self.on_trial = Some(Box::new(callback));
        self
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn policy(&self) -> &TrialPolicy {
        &self.policy
    }

    /// Get the generator states captured before successful trials.
    pub fn successful_states(&self) -> &SuccessfulStates {
        &self.successful
    }

    /// Get the number of trials run so far.
    pub fn trials(&self) -> u64 {
        self.trials
    }

    /// Run trials on the calling thread until `stats` converges.
    ///
    /// `rng` is one sequential stream across trials; the state it holds
    /// before each trial is what gets kept for a successful trial.
    pub fn run<G: StatisticsGatherer>(&mut self, stats: &mut G, rng: &mut SimRng) -> Result<u64> {
        let start = self.trials;
        while !stats.converged() {
            let initial = rng.clone();
            let process = run_trial(&self.factory, &self.policy, rng)?;
            self.finish_trial(&process, initial, stats)?;
        }
        self.flush()?;
        Ok(self.trials - start)
    }

    /// Run trials in parallel batches until `stats` converges.
    ///
    /// Every trial gets its own generator seeded from `rng`. Finished trials
    /// are folded in seed order and convergence is checked after each one,
    /// so the result only depends on `rng` and the batch size.
    pub fn run_parallel<G: StatisticsGatherer>(&mut self, stats: &mut G, rng: &mut SimRng) -> Result<u64> {
        let start = self.trials;
        while !stats.converged() {
            let seeds: Vec<u64> = (0..self.batch_size).map(|_| rng.random()).collect();
            let factory = &self.factory;
            let policy = &self.policy;
            let batch: Vec<Result<(SimRng, Process)>> = seeds
                .par_iter()
                .map(|&seed| {
                    let initial = SimRng::seed_from_u64(seed);
                    let mut local_rng = initial.clone();
                    let process = run_trial(factory, policy, &mut local_rng)?;
                    Ok((initial, process))
                })
                .collect();

            for trial in batch {
                if stats.converged() {
                    break;
                }
                let (initial, process) = trial?;
                self.finish_trial(&process, initial, stats)?;
            }
        }
        self.flush()?;
        Ok(self.trials - start)
    }

    fn finish_trial<G: StatisticsGatherer>(&mut self, process: &Process, initial: SimRng, stats: &mut G) -> Result<()> {
        stats.dump(process)?;
        if let Some(sink) = self.sink.as_mut() {
            sink.record(process)?;
        }
        if self.policy.success(process)? && self.successful.push(initial) {
            debug!("Kept generator state of successful trial {}", self.trials);
        }
        self.trials += 1;
        debug!("Trial {} finished at time {}", self.trials, process.current_time());
        if let Some(callback) = self.on_trial.as_mut() {
            callback(self.trials);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.sink.as_mut() {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }
}
