//! Linear observable-to-data readout.
//!
//! A trainable affine map from the measured observable vector to the
//! target data space: x = W·e + b.  Pure given its parameters; gradients
//! are analytic.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Affine readout parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readout {
    /// Weight matrix, shape (data_dim, n_observables).
    weight: Array2<f64>,
    /// Bias, length data_dim.
    bias: Array1<f64>,
}

/// Gradients of a scalar loss with respect to the readout parameters.
#[derive(Debug, Clone)]
pub struct ReadoutGrads {
    /// Same shape as the weight matrix.
    pub weight: Array2<f64>,
    /// Same length as the bias.
    pub bias: Array1<f64>,
}

impl Readout {
    /// Variance-scaled uniform initialization in ±1/√n_observables.
    pub fn init<R: Rng>(data_dim: usize, n_observables: usize, rng: &mut R) -> Self {
        let bound = 1.0 / (n_observables as f64).sqrt();
        Self {
            weight: Array2::from_shape_fn((data_dim, n_observables), |_| {
                rng.gen_range(-bound..bound)
            }),
            bias: Array1::from_shape_fn(data_dim, |_| rng.gen_range(-bound..bound)),
        }
    }

    /// Output dimension.
    pub fn data_dim(&self) -> usize {
        self.weight.nrows()
    }

    /// Input (observable-count) dimension.
    pub fn n_observables(&self) -> usize {
        self.weight.ncols()
    }

    /// Forward map for a batch of observable vectors (batch, n_obs) →
    /// (batch, data_dim).
    pub fn forward(&self, inputs: &ArrayView2<f64>) -> Array2<f64> {
        inputs.dot(&self.weight.t()) + &self.bias
    }

    /// Gradients given the upstream cotangent dL/dx of shape
    /// (batch, data_dim) and the inputs the forward pass saw.
    pub fn grads(&self, inputs: &ArrayView2<f64>, upstream: &ArrayView2<f64>) -> ReadoutGrads {
        ReadoutGrads {
            weight: upstream.t().dot(inputs),
            bias: upstream.sum_axis(Axis(0)),
        }
    }

    /// Cotangent propagated back to the inputs: dL/de = dL/dx · W.
    pub fn input_grad(&self, upstream: &ArrayView2<f64>) -> Array2<f64> {
        upstream.dot(&self.weight)
    }

    /// Flat views over (weight, bias) for the optimizer.
    pub fn params_mut(&mut self) -> (&mut Array2<f64>, &mut Array1<f64>) {
        (&mut self.weight, &mut self.bias)
    }

    /// Total number of trainable values.
    pub fn n_params(&self) -> usize {
        self.weight.len() + self.bias.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn forward_is_affine() {
        let readout = Readout {
            weight: array![[1.0, 0.0], [0.0, 2.0]],
            bias: array![0.5, -0.5],
        };
        let inputs = array![[1.0, 1.0], [0.0, -1.0]];
        let out = readout.forward(&inputs.view());
        assert_eq!(out, array![[1.5, 1.5], [0.5, -2.5]]);
    }

    #[test]
    fn grads_match_finite_differences() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut readout = Readout::init(2, 3, &mut rng);
        let inputs = array![[0.1, -0.4, 0.9], [0.7, 0.2, -0.3]];
        // Loss = Σ x² / 2 → upstream = x.
        let out = readout.forward(&inputs.view());
        let grads = readout.grads(&inputs.view(), &out.view());

        let h = 1e-6;
        let loss = |r: &Readout| 0.5 * r.forward(&inputs.view()).mapv(|v| v * v).sum();
        let base_weight = {
            let (w, _) = readout.params_mut();
            w.clone()
        };
        for i in 0..2 {
            for j in 0..3 {
                let mut plus = readout.clone();
                plus.params_mut().0[[i, j]] = base_weight[[i, j]] + h;
                let mut minus = readout.clone();
                minus.params_mut().0[[i, j]] = base_weight[[i, j]] - h;
                let numeric = (loss(&plus) - loss(&minus)) / (2.0 * h);
                assert!((grads.weight[[i, j]] - numeric).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn init_bound_scales_with_fan_in() {
        let mut rng = StdRng::seed_from_u64(1);
        let readout = Readout::init(4, 100, &mut rng);
        let bound = 1.0 / 10.0;
        assert!(readout.weight.iter().all(|w| w.abs() < bound));
    }
}
