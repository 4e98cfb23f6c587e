//! Error types shared across the engine.

use thiserror::Error;

/// Convenience alias used by every fallible operation in the crate.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised while building or running a stochastic process.
///
/// None of these are retried. A process either advances from a valid state or
/// the caller receives the full diagnostic context.
#[derive(Debug, Error)]
pub enum SimError {
    /// Array or matrix access outside the declared bounds.
    #[error("Index {index:?} out of bounds for dimensions {dims:?}")]
    InvalidIndex { index: Vec<usize>, dims: Vec<usize> },

    /// Weighted selection could not find a target.
    #[error(
        "Could not choose next reaction (threshold = {threshold}, total rate = {total}){}\n{state}",
        absorbing_note(.absorbing)
    )]
    DegenerateSelection {
        threshold: f64,
        total: f64,
        absorbing: bool,
        state: String,
    },

    /// Shapes or rate vectors inconsistent with the requested model.
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),

    /// A scalar parameter outside its admissible range.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Neither fate has occurred yet for the requested species.
    #[error("Fate of species {species} in sub-population {pop} is not determined yet")]
    UndeterminedFate { pop: usize, species: usize },

    /// A time-span question was asked of a trajectory that has not finished.
    #[error(
        "Cannot determine whether species {species} arose in sub-population {pop} within the time span: path is incomplete"
    )]
    IncompletePath { pop: usize, species: usize },

    /// Failure while encoding or decoding persisted state.
    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    pub(crate) fn mismatch(msg: impl Into<String>) -> Self {
        Self::StructuralMismatch(msg.into())
    }

    pub(crate) fn parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

fn absorbing_note(absorbing: &bool) -> &'static str {
    if *absorbing {
        "; process could be stuck in absorbing state"
    } else {
        ""
    }
}

/// Check that `value` lies in `[0, 1]`.
pub(crate) fn check_probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SimError::parameter(format!(
            "{name} = {value} (must be between 0.0 and 1.0)"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_probability_bounds() {
        assert!(check_probability("ss", 0.0).is_ok());
        assert!(check_probability("ss", 1.0).is_ok());
        assert!(check_probability("ss", -0.1).is_err());
        assert!(check_probability("ss", 1.5).is_err());
        assert!(check_probability("ss", f64::NAN).is_err());
    }

    #[test]
    fn test_degenerate_selection_mentions_absorbing_state() {
        let err = SimError::DegenerateSelection {
            threshold: 0.0,
            total: 0.0,
            absorbing: true,
            state: "time = 1".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("absorbing state"));
        assert!(msg.contains("time = 1"));
    }
}
