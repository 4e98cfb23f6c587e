//! Right-continuous empirical CDF over optional real samples.

use crate::errors::Result;
use crate::probability::histogram::{Accumulator, Histogram};
use crate::probability::notify::Notification;
use crate::process::TimeKind;

/// Empirical `P(X <= x)` on a fixed support.
///
/// An unset sample (`None`) counts as a trial that never reached any bin.
#[derive(Debug)]
pub struct Cdf {
    histogram: Histogram<f64>,
    kind: TimeKind,
    notification: Notification,
}

impl Cdf {
    pub fn new(sample_space: Vec<f64>, kind: TimeKind, notification: Notification) -> Result<Self> {
        Ok(Self {
            histogram: Histogram::new(sample_space)?,
            kind,
            notification,
        })
    }

    pub fn kind(&self) -> TimeKind {
        self.kind
    }

    fn should_notify(&self, sample: f64) -> bool {
        let space = self.histogram.sample_space();
        match (space.first(), space.last()) {
            (Some(&front), Some(&back)) => self.notification.should_notify(self.kind, sample, front, back),
            _ => false,
        }
    }
}

impl Accumulator for Cdf {
    type Sample = f64;
    type Input = Option<f64>;

    fn update(&mut self, input: Option<f64>) -> Result<()> {
        let kind = self.kind;
        let notify = input.is_some_and(|s| self.should_notify(s));
        self.histogram.record(input, |s, x| kind.cdf_event(s, x), false, notify)
    }

    fn histogram(&self) -> &Histogram<f64> {
        &self.histogram
    }

    fn histogram_mut(&mut self) -> &mut Histogram<f64> {
        &mut self.histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn discrete_cdf() -> Cdf {
        Cdf::new(vec![0.0, 1.0, 2.0, 3.0], TimeKind::Discrete, Notification::Range).unwrap()
    }

    #[test]
    fn test_discrete_cdf_is_right_continuous() {
        let mut cdf = discrete_cdf();
        cdf.update(Some(1.0)).unwrap();
        cdf.update(Some(3.0)).unwrap();
        assert_eq!(cdf.histogram().frequencies(), &[0, 1, 1, 2]);
        assert_eq!(cdf.results().probability, vec![0.0, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn test_unset_sample_counts_trial_only() {
        let mut cdf = discrete_cdf();
        cdf.update(None).unwrap();
        cdf.update(Some(10.0)).unwrap();
        assert_eq!(cdf.histogram().frequencies(), &[0, 0, 0, 0]);
        assert_eq!(cdf.histogram().trials(), 2);
        assert_eq!(cdf.results().end_probability(), 0.0);
    }

    #[test]
    fn test_continuous_boundary() {
        let mut cdf = Cdf::new(vec![0.0, 1.0, 2.0], TimeKind::Continuous, Notification::Range).unwrap();
        cdf.update(Some(1.0)).unwrap();
        assert_eq!(cdf.histogram().frequencies(), &[0, 0, 1]);
        cdf.update(Some(0.0)).unwrap();
        assert_eq!(cdf.histogram().frequencies(), &[0, 1, 2]);
    }

    #[test]
    fn test_notifies_only_in_range() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut cdf = discrete_cdf();
        cdf.histogram_mut().add_listener(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        cdf.update(Some(2.0)).unwrap();
        cdf.update(Some(7.0)).unwrap();
        cdf.update(None).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
