//! `alsvin-circuit` — parameterized quantum circuit sampler.
//!
//! The generator half of the Alsvin pipeline: a layered ansatz over a
//! dense statevector, measured against the canonical k-local Pauli
//! observable set, with parameter-shift gradients so the circuit angles
//! can be trained by any first-order optimizer.
//!
//! # Quick start
//!
//! ```rust
//! use alsvin_circuit::{Ansatz, ObservableSet};
//! use ndarray::array;
//!
//! let ansatz = Ansatz::new(2, 1).unwrap();
//! let set = ObservableSet::k_local(2, 1).unwrap();
//! let params = array![[0.3, -0.2, 0.9]];
//! let latent = array![0.5];
//!
//! let e = ansatz.expectations(&params.view(), &latent.view(), &set).unwrap();
//! assert_eq!(e.len(), set.len());
//! assert!(e.iter().all(|v| (-1.0..=1.0).contains(v)));
//! ```

pub mod ansatz;
pub mod error;
pub mod pauli;
pub mod statevector;

pub use ansatz::Ansatz;
pub use error::{CircuitError, CircuitResult};
pub use pauli::{ObservableSet, PauliOp, PauliString, count_k_local};
pub use statevector::Statevector;
