//! Running raw moments of real-valued samples.

use crate::errors::{Result, SimError};
use serde::{Deserialize, Serialize};

/// k-th raw moment `E[X^k]` accumulated over trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moment {
    order: i32,
    sum: f64,
    trials: u64,
}

impl Moment {
    pub fn new(order: i32) -> Result<Self> {
        if order < 1 {
            return Err(SimError::parameter(format!("moment order must be >= 1, got {order}")));
        }
        Ok(Self {
            order,
            sum: 0.0,
            trials: 0,
        })
    }

    pub fn update(&mut self, sample: f64) {
        self.sum += sample.powi(self.order);
        self.trials += 1;
    }

    /// Get the current estimate. Fails before the first sample.
    pub fn value(&self) -> Result<f64> {
        if self.trials == 0 {
            return Err(SimError::parameter("moment has no samples yet"));
        }
        Ok(self.sum / self.trials as f64)
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn trials(&self) -> u64 {
        self.trials
    }
}

/// Running arithmetic mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mean(Moment);

impl Mean {
    pub fn new() -> Self {
        Self(Moment {
            order: 1,
            sum: 0.0,
            trials: 0,
        })
    }

    pub fn update(&mut self, sample: f64) {
        self.0.update(sample);
    }

    pub fn value(&self) -> Result<f64> {
        self.0.value()
    }

    pub fn trials(&self) -> u64 {
        self.0.trials()
    }
}

impl Default for Mean {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        let mut mean = Mean::new();
        assert!(mean.value().is_err());
        for x in [1.0, 2.0, 6.0] {
            mean.update(x);
        }
        assert_eq!(mean.value().unwrap(), 3.0);
        assert_eq!(mean.trials(), 3);
    }

    #[test]
    fn test_second_moment() {
        let mut m = Moment::new(2).unwrap();
        m.update(1.0);
        m.update(3.0);
        assert_eq!(m.value().unwrap(), 5.0);
        assert!(Moment::new(0).is_err());
    }
}
