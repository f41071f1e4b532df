//! Tests for the layered ansatz: boundedness, determinism, gradients.

use alsvin_circuit::{Ansatz, ObservableSet};
use ndarray::{Array2, array};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn expectations_reproducible() {
    let ansatz = Ansatz::new(3, 2).unwrap();
    let set = ObservableSet::k_local(3, 2).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let params = ansatz.init_params(&mut rng);
    let latents = array![[0.2, -1.1], [2.4, 0.0]];

    let a = ansatz
        .expectation_batch(&params.view(), &latents.view(), &set)
        .unwrap();
    let b = ansatz
        .expectation_batch(&params.view(), &latents.view(), &set)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn init_params_in_range() {
    let ansatz = Ansatz::new(4, 3).unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    let params = ansatz.init_params(&mut rng);
    assert_eq!(params.dim(), (3, 7));
    assert!(
        params
            .iter()
            .all(|t| (-std::f64::consts::PI..std::f64::consts::PI).contains(t))
    );
}

// ---------------------------------------------------------------------------
// Gradients: parameter shift vs central finite differences
// ---------------------------------------------------------------------------

#[test]
fn parameter_shift_matches_finite_differences() {
    let ansatz = Ansatz::new(2, 2).unwrap();
    let set = ObservableSet::k_local(2, 2).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let params = ansatz.init_params(&mut rng);
    let latents = array![[0.4, -0.9], [1.7, 0.3]];
    // Arbitrary fixed cotangent.
    let upstream = Array2::from_shape_fn((2, set.len()), |(b, o)| {
        0.3 * (b as f64 + 1.0) - 0.01 * o as f64
    });

    let analytic = ansatz
        .grad(&params.view(), &latents.view(), &set, &upstream.view())
        .unwrap();

    let loss = |p: &Array2<f64>| -> f64 {
        let e = ansatz
            .expectation_batch(&p.view(), &latents.view(), &set)
            .unwrap();
        (&e * &upstream).sum()
    };

    let h = 1e-5;
    for layer in 0..2 {
        for col in 0..3 {
            let mut plus = params.clone();
            plus[[layer, col]] += h;
            let mut minus = params.clone();
            minus[[layer, col]] -= h;
            let numeric = (loss(&plus) - loss(&minus)) / (2.0 * h);
            assert!(
                (analytic[[layer, col]] - numeric).abs() < 1e-6,
                "grad mismatch at ({layer},{col}): analytic {} vs numeric {}",
                analytic[[layer, col]],
                numeric
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn expectations_bounded(
        seed in 0u64..1000,
        z0 in -3.2f64..3.2,
        z1 in -3.2f64..3.2,
    ) {
        let ansatz = Ansatz::new(3, 2).unwrap();
        let set = ObservableSet::k_local(3, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let params = ansatz.init_params(&mut rng);
        let latent = array![z0, z1];

        let e = ansatz.expectations(&params.view(), &latent.view(), &set).unwrap();
        for v in e.iter() {
            prop_assert!((-1.0 - 1e-12..=1.0 + 1e-12).contains(v));
        }
    }
}
