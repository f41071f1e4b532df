//! Error types for the training crate.

use thiserror::Error;

/// Configuration problems caught before any training step runs.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Locality must satisfy 1 ≤ k ≤ n_qubits.
    #[error("locality {locality} is out of range for {n_qubits} qubits")]
    LocalityOutOfRange {
        /// Requested locality.
        locality: usize,
        /// Qubit count.
        n_qubits: usize,
    },

    /// The ansatz consumes one latent angle per layer.
    #[error("latent_dim {latent_dim} must equal n_layers {n_layers}")]
    LatentDimMismatch {
        /// Configured latent dimension.
        latent_dim: usize,
        /// Configured layer count.
        n_layers: usize,
    },

    /// Shot-noise measurement needs a positive shot count.
    #[error("shot count must be positive for the shot-noise strategy")]
    NonPositiveShots,

    /// A structural count (qubits, layers, batch, data_dim, n_critic,
    /// iterations) must be positive.
    #[error("{field} must be positive")]
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
    },

    /// Evaluation needs at least two generated samples.
    #[error("eval_samples must be at least 2, got {0}")]
    EvalSamplesTooSmall(usize),

    /// Batches are drawn without replacement within a pass; a batch
    /// cannot exceed the dataset.
    #[error("batch size {batch_size} exceeds dataset size {dataset_size}")]
    BatchExceedsDataset {
        /// Configured batch size.
        batch_size: usize,
        /// Rows in the training dataset.
        dataset_size: usize,
    },

    /// Dataset rows must match the configured data dimension.
    #[error("dataset vectors have {found} entries but data_dim is {expected}")]
    DataDimMismatch {
        /// Dimension found in the dataset.
        found: usize,
        /// Configured data dimension.
        expected: usize,
    },
}

/// Errors surfaced by the adversarial trainer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrainError {
    /// Invalid configuration, rejected before training starts.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// NaN/Inf in a loss or gradient. Fatal: continuing would corrupt the
    /// optimizer moment estimates.
    #[error("numeric divergence in {context} at iteration {iteration}")]
    NumericDivergence {
        /// Which loss/gradient went non-finite.
        context: &'static str,
        /// Outer iteration index.
        iteration: usize,
    },

    /// Circuit evaluation failed.
    #[error("circuit error: {0}")]
    Circuit(#[from] alsvin_circuit::CircuitError),
}

/// Result type for training operations.
pub type TrainResult<T> = Result<T, TrainError>;
