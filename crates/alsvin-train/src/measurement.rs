//! Measurement strategies: how exact expectation values become
//! "measured" ones.
//!
//! The sampler produces exact ⟨P⟩ values; a [`MeasurementStrategy`]
//! decides what the training loop actually sees.  The default shot-noise
//! strategy emulates finite-shot statistics with a Gaussian approximation
//! to the binomial outcome count:
//!
//!   p    = clip((1 − e)/2, 0, 1)
//!   draw ~ N(n·p, sqrt(max(n·p·(1−p), ε)))
//!   e'   = 1 − 2·clip(draw/n, 0, 1)
//!
//! Each (batch item, observable) entry uses its own seed token, so noise
//! is uncorrelated across entries and reproducible per token.

use ndarray::{Array2, ArrayView2};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::seeds::SeedSequence;

/// Variance floor preventing a degenerate zero-width Gaussian at p ∈ {0, 1}.
const VARIANCE_FLOOR: f64 = 1e-4;

/// Maps a batch of exact expectation values to measured ones.
pub trait MeasurementStrategy {
    /// Produce measured values, element-wise, shape-preserving.
    ///
    /// Every output entry lies in [-1, 1].
    fn sample(&self, exact: &ArrayView2<f64>, seeds: &mut SeedSequence) -> Array2<f64>;
}

/// The infinite-shot limit: measured values equal exact ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMeasurement;

impl MeasurementStrategy for ExactMeasurement {
    fn sample(&self, exact: &ArrayView2<f64>, _seeds: &mut SeedSequence) -> Array2<f64> {
        exact.to_owned()
    }
}

/// Gaussian-approximated finite-shot noise.
#[derive(Debug, Clone, Copy)]
pub struct ShotNoise {
    shots: u64,
}

impl ShotNoise {
    /// Noise model for `shots` repeated measurements per observable.
    ///
    /// `shots` must be positive; config validation enforces this before a
    /// trainer is built.
    pub fn new(shots: u64) -> Self {
        Self { shots }
    }

    /// Configured shot count.
    pub fn shots(&self) -> u64 {
        self.shots
    }

    fn perturb(&self, e: f64, seeds: &mut SeedSequence) -> f64 {
        let n = self.shots as f64;
        let p = ((1.0 - e) / 2.0).clamp(0.0, 1.0);
        let mean = n * p;
        let std = (n * p * (1.0 - p)).max(VARIANCE_FLOOR).sqrt();
        let mut rng = seeds.next_rng();
        let xi: f64 = rng.sample(StandardNormal);
        let draw = mean + std * xi;
        1.0 - 2.0 * (draw / n).clamp(0.0, 1.0)
    }
}

impl MeasurementStrategy for ShotNoise {
    fn sample(&self, exact: &ArrayView2<f64>, seeds: &mut SeedSequence) -> Array2<f64> {
        let mut out = Array2::zeros(exact.raw_dim());
        for ((b, o), &e) in exact.indexed_iter() {
            out[[b, o]] = self.perturb(e, seeds);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn exact_is_identity() {
        let exact = array![[0.5, -0.25], [1.0, -1.0]];
        let mut seeds = SeedSequence::new(3);
        let out = ExactMeasurement.sample(&exact.view(), &mut seeds);
        assert_eq!(out, exact);
        // The exact strategy consumes no tokens.
        assert_eq!(seeds.counter(), 0);
    }

    #[test]
    fn noisy_values_stay_in_range() {
        let noise = ShotNoise::new(16);
        let exact = array![[1.0, -1.0, 0.0, 0.3, -0.7]];
        for base in 0..200u64 {
            let mut seeds = SeedSequence::new(base);
            let out = noise.sample(&exact.view(), &mut seeds);
            assert!(out.iter().all(|v| (-1.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn same_tokens_same_noise() {
        let noise = ShotNoise::new(100);
        let exact = array![[0.2, -0.4], [0.9, 0.0]];
        let mut a = SeedSequence::new(17);
        let mut b = SeedSequence::new(17);
        assert_eq!(
            noise.sample(&exact.view(), &mut a),
            noise.sample(&exact.view(), &mut b)
        );
    }

    #[test]
    fn entries_use_independent_tokens() {
        let noise = ShotNoise::new(50);
        let exact = array![[0.0, 0.0]];
        let mut seeds = SeedSequence::new(5);
        let out = noise.sample(&exact.view(), &mut seeds);
        assert_eq!(seeds.counter(), 2);
        assert_ne!(out[[0, 0]], out[[0, 1]]);
    }

    #[test]
    fn large_shot_count_concentrates() {
        let noise = ShotNoise::new(10_000_000);
        let exact = array![[0.5]];
        let mut seeds = SeedSequence::new(23);
        let out = noise.sample(&exact.view(), &mut seeds);
        assert!((out[[0, 0]] - 0.5).abs() < 0.01);
    }
}
