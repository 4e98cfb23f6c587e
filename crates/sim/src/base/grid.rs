//! Uniform and logarithmic grids of sample points.

use crate::errors::{Result, SimError};

fn build_grid(size: usize, delta: f64, lower: f64) -> Vec<f64> {
    (0..size).map(|i| lower + i as f64 * delta).collect()
}

/// Uniform grid of integers over `[lower, upper]`.
///
/// The suggested number of points is increased until the grid spacing divides
/// the span exactly. When more points are suggested than integers exist in
/// the span, every integer in the span is returned.
pub fn make_uniform_grid_discrete(suggested_points: usize, lower: i64, upper: i64) -> Result<Vec<i64>> {
    if upper < lower {
        return Err(SimError::parameter(format!(
            "grid upper bound {upper} is below lower bound {lower}"
        )));
    }
    let span = upper - lower;
    if span == 0 || suggested_points < 2 {
        return Ok(vec![lower]);
    }
    let mut intervals = (suggested_points - 1) as i64;
    let delta = if intervals <= span {
        while span % intervals != 0 {
            intervals += 1;
        }
        span / intervals
    } else {
        intervals = span;
        1
    };
    Ok((0..=intervals).map(|i| lower + i * delta).collect())
}

/// Uniform grid of reals with exactly `points` points spanning `[lower, upper]`.
pub fn make_uniform_grid_continuous(points: usize, lower: f64, upper: f64) -> Result<Vec<f64>> {
    if !(upper >= lower) {
        return Err(SimError::parameter(format!(
            "grid upper bound {upper} is below lower bound {lower}"
        )));
    }
    match points {
        0 => Ok(Vec::new()),
        1 => Ok(vec![lower]),
        _ => Ok(build_grid(points, (upper - lower) / (points - 1) as f64, lower)),
    }
}

/// Logarithmically spaced grid of reals over `[lower, upper]`. Requires `lower > 0`.
pub fn make_logarithmic_grid(points: usize, lower: f64, upper: f64) -> Result<Vec<f64>> {
    if !(lower > 0.0) {
        return Err(SimError::parameter(
            "lower bound of a logarithmic grid must be greater than zero",
        ));
    }
    let exponents = make_uniform_grid_continuous(points, lower.log10(), upper.log10())?;
    Ok(exponents.into_iter().map(|e| 10f64.powf(e)).collect())
}

/// Logarithmically spaced grid of integers; duplicates from truncation are removed.
pub fn make_logarithmic_grid_discrete(points: usize, lower: i64, upper: i64) -> Result<Vec<i64>> {
    let mut grid: Vec<i64> = make_logarithmic_grid(points, lower as f64, upper as f64)?
        .into_iter()
        .map(|v| v as i64)
        .collect();
    grid.sort_unstable();
    grid.dedup();
    Ok(grid)
}
