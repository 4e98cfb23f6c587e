//! Progress reporting for long-running accumulators.

use crate::probability::histogram::{Histogram, HistogramStatus};
use crate::probability::sample_space::Sample;
use log::info;

/// Listener that logs a histogram's status every `divisor` notifications.
#[derive(Debug, Clone)]
pub struct HistogramLogger {
    label: String,
    divisor: u64,
    updates: u64,
}

impl HistogramLogger {
    pub fn new(label: impl Into<String>, divisor: u64) -> Self {
        Self {
            label: label.into(),
            divisor,
            updates: 0,
        }
    }

    /// Count one notification. Returns true when a report was logged.
    pub fn observe(&mut self, status: &HistogramStatus) -> bool {
        self.updates += 1;
        if self.divisor == 0 || self.updates % self.divisor != 0 {
            return false;
        }
        let ratio = if status.trials > 0 {
            status.end_frequency as f64 / status.trials as f64
        } else {
            0.0
        };
        info!(
            "{}: end frequency = {}, trials = {}, ratio = {:.6e}",
            self.label, status.end_frequency, status.trials, ratio
        );
        true
    }

    /// Move the logger into `histogram` as a listener.
    pub fn attach<S: Sample>(mut self, histogram: &mut Histogram<S>) {
        histogram.add_listener(move |status| {
            self.observe(status);
        });
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }
}
