//! Random number generation: the engine generator and the multinomial sampler.

use crate::errors::{Result, SimError};
use rand::{Rng, SeedableRng};
use rand_distr::{Binomial, Distribution};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Generator threaded explicitly through every stochastic call.
///
/// Cloning captures the exact state, which is what trial replay relies on.
pub type SimRng = Xoshiro256PlusPlus;

/// Create a generator from a seed, or from OS entropy when no seed is given.
pub fn rng_from_seed(seed: Option<u64>) -> SimRng {
    match seed {
        Some(seed) => SimRng::seed_from_u64(seed),
        None => SimRng::from_seed(rand::rng().random()),
    }
}

/// Serialize the exact generator state.
pub fn rng_state_bytes(rng: &SimRng) -> Result<Vec<u8>> {
    bincode::serialize(rng).map_err(|e| SimError::Checkpoint(format!("Failed to serialize RNG state: {e}")))
}

/// Restore a generator from [`rng_state_bytes`] output.
pub fn rng_from_bytes(bytes: &[u8]) -> Result<SimRng> {
    bincode::deserialize(bytes)
        .map_err(|e| SimError::Checkpoint(format!("Failed to deserialize RNG state: {e}")))
}

/// Draw counts for each category from a multinomial distribution.
///
/// Uses the conditional method: category `i` receives
/// `Binomial(remaining, p_i / (1 - sum_{j<i} p_j))` and the last category
/// receives whatever is left, so the result always sums to `n`. The
/// probability vector is expected to sum to one; a negative or non-finite
/// entry is an error. Rounding drift in the remaining mass may push a
/// conditional probability just above 1, which is capped. Once the remaining
/// mass reaches zero the intermediate categories receive nothing and the
/// remainder goes to the last.
pub fn multinomial<R: Rng + ?Sized>(rng: &mut R, n: u64, probabilities: &[f64]) -> Result<Vec<u64>> {
    if let Some((i, p)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, p)| !(p.is_finite() && **p >= 0.0))
    {
        return Err(SimError::parameter(format!("category {i} has invalid probability {p}")));
    }
    let mut counts = vec![0; probabilities.len()];
    if n == 0 || probabilities.is_empty() {
        return Ok(counts);
    }
    let last = probabilities.len() - 1;
    let mut remaining = n;
    let mut mass = 1.0;
    for (i, &p) in probabilities[..last].iter().enumerate() {
        if remaining == 0 || mass <= 0.0 {
            break;
        }
        let p_bar = (p / mass).min(1.0);
        let binomial = Binomial::new(remaining, p_bar).map_err(|e| {
            SimError::parameter(format!("category {i} has invalid probability {p}: {e}"))
        })?;
        let draw = binomial.sample(rng);
        counts[i] = draw;
        remaining -= draw;
        mass -= p;
    }
    counts[last] = remaining;
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rng() -> SimRng {
        SimRng::seed_from_u64(42)
    }

    #[test]
    fn test_multinomial_sums_to_n() {
        let mut rng = test_rng();
        let vectors: [&[f64]; 4] = [
            &[0.2, 0.3, 0.5],
            &[0.25; 4],
            &[0.9, 0.05, 0.03, 0.01, 0.005, 0.005],
            &[1.0],
        ];
        for probs in vectors {
            for n in [0_u64, 1, 7, 100, 10_000] {
                for _ in 0..20 {
                    let counts = multinomial(&mut rng, n, probs).unwrap();
                    assert_eq!(counts.len(), probs.len());
                    assert_eq!(counts.iter().sum::<u64>(), n);
                }
            }
        }
    }

    #[test]
    fn test_multinomial_certain_category() {
        let mut rng = test_rng();
        for _ in 0..50 {
            assert_eq!(multinomial(&mut rng, 5, &[0.0, 0.0, 1.0]).unwrap(), vec![0, 0, 5]);
            assert_eq!(multinomial(&mut rng, 5, &[0.0, 1.0, 0.0]).unwrap(), vec![0, 5, 0]);
            assert_eq!(multinomial(&mut rng, 5, &[1.0, 0.0, 0.0]).unwrap(), vec![5, 0, 0]);
        }
    }

    #[test]
    fn test_multinomial_rejects_invalid_probabilities() {
        let mut rng = test_rng();
        assert!(matches!(
            multinomial(&mut rng, 10, &[-0.6, 0.8, 0.8]),
            Err(SimError::InvalidParameter(_))
        ));
        assert!(multinomial(&mut rng, 10, &[f64::NAN, 1.0]).is_err());
        assert!(multinomial(&mut rng, 10, &[0.5, f64::INFINITY]).is_err());
        // checked even when nothing is drawn
        assert!(multinomial(&mut rng, 0, &[0.5, -0.5, 1.0]).is_err());
    }

    #[test]
    fn test_multinomial_zero_draws() {
        let mut rng = test_rng();
        let before = rng.clone();
        assert_eq!(multinomial(&mut rng, 0, &[0.3, 0.7]).unwrap(), vec![0, 0]);
        // no randomness consumed
        assert_eq!(rng, before);
    }

    #[test]
    fn test_multinomial_mean_close_to_expectation() {
        let mut rng = test_rng();
        let probs = [0.1, 0.6, 0.3];
        let trials = 2_000;
        let n = 100;
        let mut totals = [0_u64; 3];
        for _ in 0..trials {
            let counts = multinomial(&mut rng, n, &probs).unwrap();
            for (t, c) in totals.iter_mut().zip(counts) {
                *t += c;
            }
        }
        for (t, p) in totals.iter().zip(probs) {
            let mean = *t as f64 / trials as f64;
            assert!((mean - p * n as f64).abs() < 1.0, "mean {mean} vs {}", p * n as f64);
        }
    }

    #[test]
    fn test_rng_state_round_trip_replays_stream() {
        let mut rng = test_rng();
        let _: u64 = rng.random();
        let bytes = rng_state_bytes(&rng).unwrap();
        let mut restored = rng_from_bytes(&bytes).unwrap();
        let a: Vec<u64> = (0..5).map(|_| rng.random()).collect();
        let b: Vec<u64> = (0..5).map(|_| restored.random()).collect();
        assert_eq!(a, b);
    }
}
