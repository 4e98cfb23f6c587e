//! Rules deciding when an accumulator notifies its listeners.

use crate::process::TimeKind;
use serde::{Deserialize, Serialize};

/// Notification predicate evaluated on each new sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// The sample lies anywhere in the support.
    Range,
    /// The sample is a valid time no later than the upper end of the support.
    NonNegativeBoundedAbove,
    /// The sample is `true`.
    True,
}

impl Notification {
    /// Evaluate the rule for `sample` against a support spanning `[front, back]`.
    pub fn should_notify(self, kind: TimeKind, sample: f64, front: f64, back: f64) -> bool {
        match self {
            Notification::Range => kind.in_range(sample, front, back),
            Notification::NonNegativeBoundedAbove => kind.within_span(sample, back),
            Notification::True => sample == 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_rules() {
        let n = Notification::Range;
        assert!(n.should_notify(TimeKind::Discrete, 0.0, 0.0, 10.0));
        assert!(n.should_notify(TimeKind::Discrete, 10.0, 0.0, 10.0));
        assert!(!n.should_notify(TimeKind::Discrete, -1.0, 0.0, 10.0));
        assert!(n.should_notify(TimeKind::Continuous, 0.0, 0.0, 10.0));
        assert!(!n.should_notify(TimeKind::Continuous, 10.0, 0.0, 10.0));
    }

    #[test]
    fn test_bounded_above_and_true() {
        let n = Notification::NonNegativeBoundedAbove;
        assert!(n.should_notify(TimeKind::Discrete, 5.0, 2.0, 5.0));
        assert!(!n.should_notify(TimeKind::Continuous, 5.0, 2.0, 5.0));
        assert!(Notification::True.should_notify(TimeKind::Discrete, 1.0, 0.0, 1.0));
        assert!(!Notification::True.should_notify(TimeKind::Discrete, 0.0, 0.0, 1.0));
    }
}
