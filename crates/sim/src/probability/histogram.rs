//! Frequency histogram over a fixed sample space.
//!
//! The histogram owns the bookkeeping used by every empirical distribution:
//! frequencies, the trial counter, derived probabilities, registered listeners
//! and an optional checkpoint. Concrete distributions ([`Cdf`], [`PmfBool`])
//! decide which bins a sample increments and whether listeners are notified.
//!
//! [`Cdf`]: crate::probability::Cdf
//! [`PmfBool`]: crate::probability::PmfBool

use crate::errors::{Result, SimError};
use crate::probability::sample_space::{Sample, SampleSpaceProbability};
use crate::storage::Checkpoint;
use log::warn;
use std::fmt;

/// Aggregate state a listener pulls from the histogram on notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramStatus {
    pub end_frequency: u64,
    pub largest_frequency: u64,
    pub trials: u64,
}

/// Callback invoked synchronously on every notification.
pub type Listener = Box<dyn FnMut(&HistogramStatus) + Send>;

/// A histogram-backed distribution that folds one trial outcome at a time.
pub trait Accumulator: Send {
    /// Support type of the underlying histogram.
    type Sample: Sample;
    /// Outcome of a single trial.
    type Input;

    fn update(&mut self, input: Self::Input) -> Result<()>;

    fn histogram(&self) -> &Histogram<Self::Sample>;

    fn histogram_mut(&mut self) -> &mut Histogram<Self::Sample>;

    fn status(&self) -> HistogramStatus {
        self.histogram().status()
    }

    fn results(&self) -> SampleSpaceProbability<Self::Sample> {
        self.histogram().snapshot()
    }
}

pub struct Histogram<S: Sample> {
    sample_space: Vec<S>,
    frequencies: Vec<u64>,
    probability: Vec<f64>,
    trials: u64,
    listeners: Vec<Listener>,
    checkpoint: Option<Checkpoint>,
}

impl<S: Sample> Histogram<S> {
    /// Create an empty histogram. Probabilities read `-1` until the first trial.
    pub fn new(sample_space: Vec<S>) -> Result<Self> {
        if sample_space.is_empty() {
            return Err(SimError::parameter("sample space must not be empty"));
        }
        let len = sample_space.len();
        Ok(Self {
            sample_space,
            frequencies: vec![0; len],
            probability: vec![-1.0; len],
            trials: 0,
            listeners: Vec::new(),
            checkpoint: None,
        })
    }

    /// Persist results through `checkpoint` periodically and on drop.
    pub fn set_checkpoint(&mut self, checkpoint: Checkpoint) {
        self.checkpoint = Some(checkpoint);
    }

    /// Register a listener. It is dropped together with the histogram.
    pub fn add_listener(&mut self, listener: impl FnMut(&HistogramStatus) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Count one trial, increment the bins selected by `event` and refresh
    /// probabilities. With `first_only`, at most one bin is incremented.
    pub(crate) fn record(
        &mut self,
        sample: Option<S>,
        event: impl Fn(S, S) -> bool,
        first_only: bool,
        notify: bool,
    ) -> Result<()> {
        self.trials += 1;
        if let Some(sample) = sample {
            for (x, freq) in self.sample_space.iter().zip(self.frequencies.iter_mut()) {
                if event(sample, *x) {
                    *freq += 1;
                    if first_only {
                        break;
                    }
                }
            }
        }
        if notify {
            self.notify();
        }
        self.normalize();
        if self.checkpoint.as_mut().is_some_and(Checkpoint::just_passed) {
            self.store()?;
        }
        Ok(())
    }

    fn normalize(&mut self) {
        let trials = self.trials as f64;
        for (p, &f) in self.probability.iter_mut().zip(&self.frequencies) {
            *p = f as f64 / trials;
        }
    }

    fn notify(&mut self) {
        let status = self.status();
        for listener in &mut self.listeners {
            listener(&status);
        }
    }

    /// Write the current results to the checkpoint file, if one is set.
    pub fn store(&self) -> Result<()> {
        match &self.checkpoint {
            Some(checkpoint) => checkpoint.store(&self.snapshot()),
            None => Ok(()),
        }
    }

    pub fn status(&self) -> HistogramStatus {
        HistogramStatus {
            end_frequency: self.end_frequency(),
            largest_frequency: self.largest_frequency(),
            trials: self.trials,
        }
    }

    /// Get the frequency of the last bin.
    pub fn end_frequency(&self) -> u64 {
        self.frequencies.last().copied().unwrap_or(0)
    }

    /// Get the largest bin frequency.
    pub fn largest_frequency(&self) -> u64 {
        self.frequencies.iter().copied().max().unwrap_or(0)
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }

    pub fn sample_space(&self) -> &[S] {
        &self.sample_space
    }

    pub fn frequencies(&self) -> &[u64] {
        &self.frequencies
    }

    pub fn probability(&self) -> &[f64] {
        &self.probability
    }

    /// Copy of the support and current probabilities.
    pub fn snapshot(&self) -> SampleSpaceProbability<S> {
        SampleSpaceProbability::new(self.sample_space.clone(), self.probability.clone())
    }
}

impl<S: Sample> fmt::Debug for Histogram<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Histogram")
            .field("sample_space", &self.sample_space)
            .field("frequencies", &self.frequencies)
            .field("trials", &self.trials)
            .field("listeners", &self.listeners.len())
            .field("checkpoint", &self.checkpoint)
            .finish()
    }
}

impl<S: Sample> Drop for Histogram<S> {
    fn drop(&mut self) {
        if let Err(e) = self.store() {
            warn!("Failed to write final histogram checkpoint: {e}");
        }
    }
}
