//! Probability mass function of a boolean outcome.

use crate::errors::Result;
use crate::probability::histogram::{Accumulator, Histogram};
use crate::probability::sample_space::bernoulli_sample_space;

/// Two-bin histogram over `(false, true)`. Listeners fire on `true` samples.
#[derive(Debug)]
pub struct PmfBool {
    histogram: Histogram<bool>,
}

impl PmfBool {
    pub fn new() -> Result<Self> {
        Ok(Self {
            histogram: Histogram::new(bernoulli_sample_space())?,
        })
    }

    /// Get the estimated `P(true)`, or `-1` before any trial.
    pub fn probability_true(&self) -> f64 {
        self.histogram.probability().last().copied().unwrap_or(-1.0)
    }
}

impl Accumulator for PmfBool {
    type Sample = bool;
    type Input = bool;

    fn update(&mut self, input: bool) -> Result<()> {
        self.histogram.record(Some(input), |s, x| s == x, true, input)
    }

    fn histogram(&self) -> &Histogram<bool> {
        &self.histogram
    }

    fn histogram_mut(&mut self) -> &mut Histogram<bool> {
        &mut self.histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bins_and_probability() {
        let mut pmf = PmfBool::new().unwrap();
        assert_eq!(pmf.probability_true(), -1.0);
        for outcome in [true, false, false, true] {
            pmf.update(outcome).unwrap();
        }
        assert_eq!(pmf.histogram().frequencies(), &[2, 2]);
        assert_eq!(pmf.probability_true(), 0.5);
        assert_eq!(pmf.status().end_frequency, 2);
    }
}
