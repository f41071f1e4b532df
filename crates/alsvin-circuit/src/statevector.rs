//! Dense statevector engine.
//!
//! Holds the 2^n complex amplitudes of an n-qubit pure state and applies
//! the gate set the generator ansatz needs (RX, RY, RZ, controlled-RX)
//! in place via bit-mask kernels.  Expectation values ⟨ψ|P|ψ⟩ of Pauli
//! strings are computed exactly by applying P to a copy of the state and
//! taking the inner product.

use num_complex::Complex64;

use crate::error::{CircuitError, CircuitResult};
use crate::pauli::{PauliOp, PauliString};

/// A statevector representing an n-qubit quantum state.
#[derive(Debug, Clone)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    n_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(n_qubits: usize) -> Self {
        let size = 1 << n_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            n_qubits,
        }
    }

    /// Number of qubits.
    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    /// The raw amplitudes, |0...0⟩ first.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Apply RX(θ) to one qubit.
    pub fn rx(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        let neg_i_s = Complex64::new(0.0, -s);
        for i in 0..(1 << self.n_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    /// Apply RY(θ) to one qubit.
    pub fn ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..(1 << self.n_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    /// Apply RZ(θ) to one qubit.
    pub fn rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for i in 0..(1 << self.n_qubits) {
            if i & mask == 0 {
                self.amplitudes[i] *= phase_0;
            } else {
                self.amplitudes[i] *= phase_1;
            }
        }
    }

    /// Apply a controlled-RX(θ): rotate `target` when `control` is |1⟩.
    pub fn crx(&mut self, control: usize, target: usize, theta: f64) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        let neg_i_s = Complex64::new(0.0, -s);
        for i in 0..(1 << self.n_qubits) {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    /// Apply a single-qubit Pauli operator.
    pub fn pauli(&mut self, qubit: usize, op: PauliOp) {
        let mask = 1 << qubit;
        match op {
            PauliOp::I => {}
            PauliOp::X => {
                for i in 0..(1 << self.n_qubits) {
                    if i & mask == 0 {
                        let j = i | mask;
                        self.amplitudes.swap(i, j);
                    }
                }
            }
            PauliOp::Y => {
                let i_val = Complex64::new(0.0, 1.0);
                for i in 0..(1 << self.n_qubits) {
                    if i & mask == 0 {
                        let j = i | mask;
                        let tmp = self.amplitudes[i];
                        self.amplitudes[i] = -i_val * self.amplitudes[j];
                        self.amplitudes[j] = i_val * tmp;
                    }
                }
            }
            PauliOp::Z => {
                for i in 0..(1 << self.n_qubits) {
                    if i & mask != 0 {
                        self.amplitudes[i] = -self.amplitudes[i];
                    }
                }
            }
        }
    }

    /// Exact expectation value ⟨ψ|P|ψ⟩ of a Pauli string.
    ///
    /// Pauli strings are Hermitian with eigenvalues ±1, so the result is
    /// real and lies in [-1, 1].
    pub fn expectation(&self, observable: &PauliString) -> CircuitResult<f64> {
        if observable.len() != self.n_qubits {
            return Err(CircuitError::ObservableWidthMismatch {
                len: observable.len(),
                n_qubits: self.n_qubits,
            });
        }
        let mut transformed = self.clone();
        for (qubit, op) in observable.support() {
            transformed.pauli(qubit, op);
        }
        let value: Complex64 = self
            .amplitudes
            .iter()
            .zip(transformed.amplitudes.iter())
            .map(|(a, b)| a.conj() * b)
            .sum();
        Ok(value.re)
    }
}
