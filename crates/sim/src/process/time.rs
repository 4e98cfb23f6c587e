//! Discrete and continuous time, handled through one set of comparison rules.
//!
//! Times are stored as `f64` for both kinds. Discrete processes only ever
//! produce integral values, so comparisons stay exact. Continuous processes
//! compare against zero and against sample-space points with a small
//! tolerance so that exact ties at a boundary are not lost to rounding.

use crate::base::grid::{make_uniform_grid_continuous, make_uniform_grid_discrete};
use crate::errors::{Result, SimError};
use serde::{Deserialize, Serialize};

/// Tolerance used for continuous-time comparisons.
pub const TIME_TOLERANCE: f64 = 1e-8;

/// Whether a process advances in integer ticks or real-valued waiting times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeKind {
    Discrete,
    Continuous,
}

impl TimeKind {
    /// True if `t` counts as a valid (non-negative) time.
    pub fn is_nonnegative(self, t: f64) -> bool {
        match self {
            TimeKind::Discrete => t >= 0.0,
            TimeKind::Continuous => t >= -TIME_TOLERANCE,
        }
    }

    /// True if `t` lies inside a trajectory whose last node is at `last`.
    pub fn within_span(self, t: f64, last: f64) -> bool {
        self.is_nonnegative(t)
            && match self {
                TimeKind::Discrete => t <= last,
                TimeKind::Continuous => t < last,
            }
    }

    /// Empirical CDF event: does `sample` count towards the bin at `x`.
    pub fn cdf_event(self, sample: f64, x: f64) -> bool {
        match self {
            TimeKind::Discrete => sample <= x && sample >= 0.0,
            TimeKind::Continuous => sample < x && sample > -TIME_TOLERANCE,
        }
    }

    /// True if `sample` lies within `[front, back]` under this kind's rules.
    pub fn in_range(self, sample: f64, front: f64, back: f64) -> bool {
        match self {
            TimeKind::Discrete => front <= sample && sample <= back,
            TimeKind::Continuous => sample > front - TIME_TOLERANCE && sample < back,
        }
    }
}

/// Ordered sample times at which a trajectory is recorded.
///
/// Always starts at 0 and is strictly increasing. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    nodes: Vec<f64>,
    kind: TimeKind,
}

impl TimeGrid {
    /// Create a grid from explicit node times.
    pub fn new(nodes: Vec<f64>, kind: TimeKind) -> Result<Self> {
        match nodes.first() {
            Some(&first) if first == 0.0 => {}
            _ => {
                return Err(SimError::parameter("time grid must start at 0"));
            }
        }
        if nodes.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(SimError::parameter("time grid must be strictly increasing"));
        }
        if kind == TimeKind::Discrete && nodes.iter().any(|t| t.fract() != 0.0) {
            return Err(SimError::parameter("discrete time grid must hold integer times"));
        }
        Ok(Self { nodes, kind })
    }

    /// Grid holding `0` and `span`, or only `0` when the span is zero.
    pub fn span(span: f64, kind: TimeKind) -> Result<Self> {
        if span == 0.0 {
            Self::origin(kind)
        } else {
            Self::new(vec![0.0, span], kind)
        }
    }

    /// Grid with the single node `0`.
    pub fn origin(kind: TimeKind) -> Result<Self> {
        Self::new(vec![0.0], kind)
    }

    /// Uniformly spaced grid over `[0, span]`.
    ///
    /// Discrete grids may hold more points than suggested so that the spacing
    /// is an integer.
    pub fn uniform(points: usize, span: f64, kind: TimeKind) -> Result<Self> {
        if !(span >= 0.0) {
            return Err(SimError::parameter(format!("time span {span} must be non-negative")));
        }
        if kind == TimeKind::Discrete && span.fract() != 0.0 {
            return Err(SimError::parameter(format!("discrete time span {span} must be a whole number")));
        }
        let nodes = match kind {
            TimeKind::Discrete => make_uniform_grid_discrete(points, 0, span as i64)?
                .into_iter()
                .map(|t| t as f64)
                .collect(),
            TimeKind::Continuous => make_uniform_grid_continuous(points.max(1), 0.0, span)?,
        };
        Self::new(nodes, kind)
    }

    pub fn kind(&self) -> TimeKind {
        self.kind
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Time of node `node`.
    pub fn at(&self, node: usize) -> Result<f64> {
        self.nodes.get(node).copied().ok_or_else(|| SimError::InvalidIndex {
            index: vec![node],
            dims: vec![self.nodes.len()],
        })
    }

    /// Time of the final node (the horizon).
    pub fn last(&self) -> f64 {
        self.nodes.last().copied().unwrap_or(0.0)
    }

    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discrete_rules() {
        let k = TimeKind::Discrete;
        assert!(k.within_span(10.0, 10.0));
        assert!(!k.within_span(-1.0, 10.0));
        assert!(k.cdf_event(3.0, 3.0));
        assert!(!k.cdf_event(-1.0, 3.0));
        assert!(k.in_range(0.0, 0.0, 5.0));
        assert!(k.in_range(5.0, 0.0, 5.0));
    }

    #[test]
    fn test_continuous_rules() {
        let k = TimeKind::Continuous;
        assert!(!k.within_span(10.0, 10.0));
        assert!(k.within_span(-1e-9, 10.0));
        assert!(!k.cdf_event(3.0, 3.0));
        assert!(k.cdf_event(2.999, 3.0));
        assert!(!k.in_range(5.0, 0.0, 5.0));
        assert!(k.in_range(-1e-9, 0.0, 5.0));
    }

    #[test]
    fn test_grid_validation() {
        assert!(TimeGrid::new(vec![1.0, 2.0], TimeKind::Continuous).is_err());
        assert!(TimeGrid::new(vec![0.0, 2.0, 2.0], TimeKind::Continuous).is_err());
        assert!(TimeGrid::new(vec![0.0, 1.5], TimeKind::Discrete).is_err());
        assert!(TimeGrid::new(vec![0.0, 1.5], TimeKind::Continuous).is_ok());
    }

    #[test]
    fn test_span_and_uniform_grids() {
        let g = TimeGrid::span(10.0, TimeKind::Discrete).unwrap();
        assert_eq!(g.nodes(), &[0.0, 10.0]);
        assert_eq!(TimeGrid::span(0.0, TimeKind::Discrete).unwrap().len(), 1);
        let u = TimeGrid::uniform(3, 1.0, TimeKind::Continuous).unwrap();
        assert_eq!(u.nodes(), &[0.0, 0.5, 1.0]);
        let d = TimeGrid::uniform(11, 100.0, TimeKind::Discrete).unwrap();
        assert_eq!(d.len(), 11);
        assert_eq!(d.at(1).unwrap(), 10.0);
        assert_eq!(d.last(), 100.0);
        assert!(d.at(11).is_err());
    }

    #[test]
    fn test_discrete_uniform_rejects_fractional_span() {
        assert!(matches!(
            TimeGrid::uniform(5, 10.5, TimeKind::Discrete),
            Err(SimError::InvalidParameter(_))
        ));
        assert!(TimeGrid::span(10.5, TimeKind::Discrete).is_err());
        assert_eq!(TimeGrid::uniform(3, 10.5, TimeKind::Continuous).unwrap().last(), 10.5);
    }
}
