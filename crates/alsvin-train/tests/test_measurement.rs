//! Property tests for the shot-noise measurement strategy.

use alsvin_train::{MeasurementStrategy, SeedSequence, ShotNoise};
use ndarray::Array2;
use proptest::prelude::*;

proptest! {
    #[test]
    fn noisy_output_always_in_range(
        e in -1.0f64..=1.0,
        shots in 1u64..100_000,
        base in 0u64..10_000,
    ) {
        let noise = ShotNoise::new(shots);
        let exact = Array2::from_elem((1, 1), e);
        let mut seeds = SeedSequence::new(base);
        let out = noise.sample(&exact.view(), &mut seeds);
        prop_assert!((-1.0..=1.0).contains(&out[[0, 0]]));
    }

    #[test]
    fn same_base_seed_same_noise(
        e in -1.0f64..=1.0,
        shots in 1u64..100_000,
        base in 0u64..10_000,
    ) {
        let noise = ShotNoise::new(shots);
        let exact = Array2::from_elem((2, 3), e);
        let mut a = SeedSequence::new(base);
        let mut b = SeedSequence::new(base);
        prop_assert_eq!(
            noise.sample(&exact.view(), &mut a),
            noise.sample(&exact.view(), &mut b)
        );
    }
}
