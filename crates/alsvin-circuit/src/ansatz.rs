//! Layered generator ansatz.
//!
//! Each of the `n_layers` layers applies, in order:
//!
//! 1. `RX(z_l)` on every qubit — the latent input angle for layer `l`,
//!    shared across qubits;
//! 2. a trainable `RY(θ_{l,q})` on each qubit;
//! 3. a nearest-neighbour entangling chain: `CRX(θ_{l,nq+j})` with
//!    control `j` and target `j+1`, for every adjacent pair.
//!
//! The trainable angles live in an `Array2<f64>` of shape
//! `(n_layers, n_qubits + n_qubits - 1)`: per-qubit rotation columns
//! first, per-edge entangling columns after.
//!
//! Expectation values of Pauli observables are computed exactly on the
//! statevector, and gradients with respect to the trainable angles via
//! the parameter-shift rule — the two-term rule for RY and the four-term
//! rule for the controlled rotation, whose generator has eigenvalues
//! {0, ±1/2}.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rand::Rng;
use tracing::debug;

use crate::error::{CircuitError, CircuitResult};
use crate::pauli::ObservableSet;
use crate::statevector::Statevector;

use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};

/// Four-term shift-rule coefficients for controlled rotations.
const SHIFT_C1: f64 = (SQRT_2 + 1.0) / (4.0 * SQRT_2);
const SHIFT_C2: f64 = (SQRT_2 - 1.0) / (4.0 * SQRT_2);

/// The parameterized generator circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ansatz {
    n_qubits: usize,
    n_layers: usize,
}

impl Ansatz {
    /// Construct an ansatz over `n_qubits` qubits with `n_layers` layers.
    pub fn new(n_qubits: usize, n_layers: usize) -> CircuitResult<Self> {
        if n_qubits == 0 || n_layers == 0 {
            return Err(CircuitError::DegenerateGeometry { n_qubits, n_layers });
        }
        Ok(Self { n_qubits, n_layers })
    }

    /// Number of qubits.
    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    /// Number of layers; also the expected latent dimension.
    pub fn n_layers(&self) -> usize {
        self.n_layers
    }

    /// Columns per layer row: `n_qubits` rotation angles then
    /// `n_qubits - 1` entangling angles.
    pub fn n_columns(&self) -> usize {
        2 * self.n_qubits - 1
    }

    /// Total number of trainable angles.
    pub fn n_params(&self) -> usize {
        self.n_layers * self.n_columns()
    }

    /// Draw initial angles uniformly from [-π, π).
    pub fn init_params<R: Rng>(&self, rng: &mut R) -> Array2<f64> {
        Array2::from_shape_fn((self.n_layers, self.n_columns()), |_| {
            rng.gen_range(-PI..PI)
        })
    }

    /// Run the circuit and return the final statevector.
    pub fn prepare(
        &self,
        params: &ArrayView2<f64>,
        latent: &ArrayView1<f64>,
    ) -> CircuitResult<Statevector> {
        self.check_params(params)?;
        if latent.len() != self.n_layers {
            return Err(CircuitError::LatentDimMismatch {
                len: latent.len(),
                n_layers: self.n_layers,
            });
        }
        let mut sv = Statevector::new(self.n_qubits);
        for layer in 0..self.n_layers {
            let z = latent[layer];
            for q in 0..self.n_qubits {
                sv.rx(q, z);
            }
            for q in 0..self.n_qubits {
                sv.ry(q, params[[layer, q]]);
            }
            for j in 0..self.n_qubits.saturating_sub(1) {
                sv.crx(j, j + 1, params[[layer, self.n_qubits + j]]);
            }
        }
        Ok(sv)
    }

    /// Exact expectation of every observable in the set, canonical order.
    pub fn expectations(
        &self,
        params: &ArrayView2<f64>,
        latent: &ArrayView1<f64>,
        set: &ObservableSet,
    ) -> CircuitResult<Array1<f64>> {
        let sv = self.prepare(params, latent)?;
        let mut out = Array1::zeros(set.len());
        for (i, observable) in set.into_iter().enumerate() {
            out[i] = sv.expectation(observable)?;
        }
        Ok(out)
    }

    /// Batched expectations: one row per latent vector.
    pub fn expectation_batch(
        &self,
        params: &ArrayView2<f64>,
        latents: &ArrayView2<f64>,
        set: &ObservableSet,
    ) -> CircuitResult<Array2<f64>> {
        let batch = latents.nrows();
        let mut out = Array2::zeros((batch, set.len()));
        for b in 0..batch {
            let row = self.expectations(params, &latents.row(b), set)?;
            out.row_mut(b).assign(&row);
        }
        Ok(out)
    }

    /// Gradient of `Σ_{b,o} upstream[b,o] · E[b,o](params)` with respect
    /// to the trainable angles, via the parameter-shift rule.
    ///
    /// `upstream` must have shape (batch, |set|).  The result has the
    /// shape of `params`.  Exact to machine tolerance and deterministic:
    /// each shifted circuit is simulated with the same statevector engine
    /// as the forward pass.
    pub fn grad(
        &self,
        params: &ArrayView2<f64>,
        latents: &ArrayView2<f64>,
        set: &ObservableSet,
        upstream: &ArrayView2<f64>,
    ) -> CircuitResult<Array2<f64>> {
        self.check_params(params)?;
        debug!(
            n_params = self.n_params(),
            batch = latents.nrows(),
            n_observables = set.len(),
            "parameter-shift gradient"
        );

        // Contraction of the upstream cotangent with the expectation
        // matrix at shifted parameters.
        let contracted = |shifted: &Array2<f64>| -> CircuitResult<f64> {
            let e = self.expectation_batch(&shifted.view(), latents, set)?;
            Ok((&e * upstream).sum())
        };

        let mut grad = Array2::zeros(params.raw_dim());
        for layer in 0..self.n_layers {
            for col in 0..self.n_columns() {
                let shift_eval = |delta: f64| -> CircuitResult<f64> {
                    let mut shifted = params.to_owned();
                    shifted[[layer, col]] += delta;
                    contracted(&shifted)
                };
                grad[[layer, col]] = if col < self.n_qubits {
                    // RY: generator Y/2, eigenvalues ±1/2.
                    0.5 * (shift_eval(FRAC_PI_2)? - shift_eval(-FRAC_PI_2)?)
                } else {
                    // CRX: generator eigenvalues {0, ±1/2} — four-term rule.
                    SHIFT_C1 * (shift_eval(FRAC_PI_2)? - shift_eval(-FRAC_PI_2)?)
                        - SHIFT_C2
                            * (shift_eval(3.0 * FRAC_PI_2)? - shift_eval(-3.0 * FRAC_PI_2)?)
                };
            }
        }
        Ok(grad)
    }

    fn check_params(&self, params: &ArrayView2<f64>) -> CircuitResult<()> {
        if params.nrows() != self.n_layers || params.ncols() != self.n_columns() {
            return Err(CircuitError::ParamShapeMismatch {
                rows: params.nrows(),
                cols: params.ncols(),
                n_layers: self.n_layers,
                n_columns: self.n_columns(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn zero_qubits_rejected() {
        assert!(matches!(
            Ansatz::new(0, 1),
            Err(CircuitError::DegenerateGeometry { .. })
        ));
    }

    #[test]
    fn column_layout() {
        let ansatz = Ansatz::new(4, 2).unwrap();
        assert_eq!(ansatz.n_columns(), 7);
        assert_eq!(ansatz.n_params(), 14);
    }

    #[test]
    fn latent_length_checked() {
        let ansatz = Ansatz::new(2, 2).unwrap();
        let params = Array2::zeros((2, 3));
        let latent = array![0.1];
        assert!(matches!(
            ansatz.prepare(&params.view(), &latent.view()),
            Err(CircuitError::LatentDimMismatch { len: 1, n_layers: 2 })
        ));
    }

    #[test]
    fn param_shape_checked() {
        let ansatz = Ansatz::new(2, 1).unwrap();
        let params = Array2::zeros((1, 5));
        let latent = array![0.0];
        assert!(matches!(
            ansatz.prepare(&params.view(), &latent.view()),
            Err(CircuitError::ParamShapeMismatch { .. })
        ));
    }

    #[test]
    fn single_qubit_ry_expectation() {
        // Zero latent, one RY(θ): ⟨Z⟩ = cos θ.
        let ansatz = Ansatz::new(1, 1).unwrap();
        let theta = 0.7;
        let params = array![[theta]];
        let latent = array![0.0];
        let set = ObservableSet::k_local(1, 1).unwrap();
        let e = ansatz
            .expectations(&params.view(), &latent.view(), &set)
            .unwrap();
        // Canonical order: X, Y, Z.
        assert!((e[0] - theta.sin()).abs() < 1e-12);
        assert!(e[1].abs() < 1e-12);
        assert!((e[2] - theta.cos()).abs() < 1e-12);
    }
}
