//! Sample spaces and the (support, probability) pairs exported from histograms.

use crate::base::grid::{make_logarithmic_grid, make_uniform_grid_continuous, make_uniform_grid_discrete};
use crate::errors::Result;
use crate::process::TimeKind;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Value type a histogram can be built over.
pub trait Sample: Copy + PartialEq + Debug + Serialize + Send + 'static {
    /// Numeric value used for notification rules and summaries.
    fn value(self) -> f64;
}

impl Sample for f64 {
    fn value(self) -> f64 {
        self
    }
}

impl Sample for bool {
    fn value(self) -> f64 {
        if self { 1.0 } else { 0.0 }
    }
}

/// A support paired with its probabilities. Copyable snapshot of a histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSpaceProbability<S> {
    pub sample_space: Vec<S>,
    pub probability: Vec<f64>,
}

impl<S: Sample> SampleSpaceProbability<S> {
    pub fn new(sample_space: Vec<S>, probability: Vec<f64>) -> Self {
        Self {
            sample_space,
            probability,
        }
    }

    /// Probability at the last support point: `P(true)` for a boolean PMF,
    /// `P(X <= upper)` for a CDF.
    pub fn end_probability(&self) -> f64 {
        self.probability.last().copied().unwrap_or(-1.0)
    }
}

/// `(false, true)`.
pub fn bernoulli_sample_space() -> Vec<bool> {
    vec![false, true]
}

/// Uniform sample space over `[lower, upper]`. Discrete spaces hold integers
/// and may receive extra points so the spacing is whole.
pub fn uniform_sample_space(points: usize, lower: f64, upper: f64, kind: TimeKind) -> Result<Vec<f64>> {
    match kind {
        TimeKind::Discrete => Ok(make_uniform_grid_discrete(points, lower as i64, upper as i64)?
            .into_iter()
            .map(|x| x as f64)
            .collect()),
        TimeKind::Continuous => make_uniform_grid_continuous(points, lower, upper),
    }
}

/// Logarithmic sample space over `[lower, upper]`, `lower > 0`.
pub fn logarithmic_sample_space(points: usize, lower: f64, upper: f64, kind: TimeKind) -> Result<Vec<f64>> {
    let grid = make_logarithmic_grid(points, lower, upper)?;
    Ok(match kind {
        TimeKind::Discrete => {
            let mut grid: Vec<f64> = grid.into_iter().map(f64::trunc).collect();
            grid.dedup();
            grid
        }
        TimeKind::Continuous => grid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sample_spaces() {
        let d = uniform_sample_space(100, 0.0, 99.0, TimeKind::Discrete).unwrap();
        assert_eq!(d.len(), 100);
        assert_eq!(d[1], 1.0);
        let c = uniform_sample_space(5, 0.0, 1.0, TimeKind::Continuous).unwrap();
        assert_eq!(c, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_logarithmic_sample_space_discrete_is_integral() {
        let s = logarithmic_sample_space(50, 1.0, 10.0, TimeKind::Discrete).unwrap();
        assert!(s.iter().all(|x| x.fract() == 0.0));
        assert!(s.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_end_probability() {
        let s = SampleSpaceProbability::new(bernoulli_sample_space(), vec![0.25, 0.75]);
        assert_eq!(s.end_probability(), 0.75);
        assert!(true.value() == 1.0 && false.value() == 0.0);
    }
}
