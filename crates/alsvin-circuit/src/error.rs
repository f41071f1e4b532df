//! Error types for the circuit crate.

use thiserror::Error;

/// Errors produced by observable enumeration and circuit evaluation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CircuitError {
    /// Observable locality must satisfy 1 ≤ k ≤ n_qubits.
    #[error("observable locality {k} is out of range for {n_qubits} qubits (need 1 ≤ k ≤ n_qubits)")]
    LocalityOutOfRange {
        /// Requested locality.
        k: usize,
        /// Number of qubits.
        n_qubits: usize,
    },

    /// A Pauli string's length does not match the circuit width.
    #[error("Pauli string has {len} sites but circuit has {n_qubits} qubits")]
    ObservableWidthMismatch {
        /// Length of the offending string.
        len: usize,
        /// Number of qubits in the circuit.
        n_qubits: usize,
    },

    /// The latent vector length must equal the number of circuit layers.
    #[error("latent vector has {len} entries but the ansatz has {n_layers} layers")]
    LatentDimMismatch {
        /// Length of the offending latent vector.
        len: usize,
        /// Number of ansatz layers.
        n_layers: usize,
    },

    /// The parameter array shape does not match the ansatz geometry.
    #[error("parameter array is {rows}×{cols} but the ansatz expects {n_layers}×{n_columns}")]
    ParamShapeMismatch {
        /// Rows of the offending array.
        rows: usize,
        /// Columns of the offending array.
        cols: usize,
        /// Expected layer count.
        n_layers: usize,
        /// Expected column count (per-qubit + per-edge angles).
        n_columns: usize,
    },

    /// An ansatz needs at least one qubit and one layer.
    #[error("degenerate ansatz geometry: {n_qubits} qubits, {n_layers} layers")]
    DegenerateGeometry {
        /// Number of qubits.
        n_qubits: usize,
        /// Number of layers.
        n_layers: usize,
    },
}

/// Result type for circuit operations.
pub type CircuitResult<T> = Result<T, CircuitError>;
