//! Training configuration.
//!
//! Read-only input to the trainer; validated in full before any step
//! runs, so every mistake surfaces as an [`ConfigError`] rather than a
//! mid-run failure.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::measurement::{ExactMeasurement, MeasurementStrategy, ShotNoise};
use crate::optim::AdamConfig;

/// Which measurement strategy turns exact expectations into samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MeasurementConfig {
    /// Infinite-shot limit: no noise.
    Exact,
    /// Gaussian-approximated finite-shot noise.
    ShotNoise {
        /// Shots per observable per batch item.
        shots: u64,
    },
}

impl MeasurementConfig {
    /// Build the configured strategy.
    pub fn build(&self) -> Box<dyn MeasurementStrategy> {
        match self {
            MeasurementConfig::Exact => Box::new(ExactMeasurement),
            MeasurementConfig::ShotNoise { shots } => Box::new(ShotNoise::new(*shots)),
        }
    }
}

/// Full configuration of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Qubit count of the generator circuit.
    pub n_qubits: usize,
    /// Circuit depth (layer count).
    pub n_layers: usize,
    /// Observable locality bound k.
    pub locality: usize,
    /// Latent dimension; the ansatz consumes one angle per layer.
    pub latent_dim: usize,
    /// Dimension of the real data vectors.
    pub data_dim: usize,
    /// Batch size for both real and generated batches.
    pub batch_size: usize,
    /// Critic updates per generator update.
    pub n_critic: usize,
    /// Gradient-penalty coefficient λ.
    pub lambda_gp: f64,
    /// Total outer iterations.
    pub iterations: usize,
    /// Evaluate the divergence every this many iterations.
    pub eval_every: usize,
    /// Generated sample count per evaluation.
    pub eval_samples: usize,
    /// Measurement strategy.
    pub measurement: MeasurementConfig,
    /// Optimizer for the circuit angles.
    pub circuit_opt: AdamConfig,
    /// Optimizer for the linear readout.
    pub readout_opt: AdamConfig,
    /// Optimizer for the critic.
    pub critic_opt: AdamConfig,
}

impl TrainerConfig {
    /// Check every structural constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("n_qubits", self.n_qubits),
            ("n_layers", self.n_layers),
            ("data_dim", self.data_dim),
            ("batch_size", self.batch_size),
            ("n_critic", self.n_critic),
            ("iterations", self.iterations),
            ("eval_every", self.eval_every),
        ] {
            if value == 0 {
                return Err(ConfigError::NonPositive { field });
            }
        }
        if self.locality == 0 || self.locality > self.n_qubits {
            return Err(ConfigError::LocalityOutOfRange {
                locality: self.locality,
                n_qubits: self.n_qubits,
            });
        }
        if self.latent_dim != self.n_layers {
            return Err(ConfigError::LatentDimMismatch {
                latent_dim: self.latent_dim,
                n_layers: self.n_layers,
            });
        }
        if matches!(self.measurement, MeasurementConfig::ShotNoise { shots: 0 }) {
            return Err(ConfigError::NonPositiveShots);
        }
        if self.eval_samples < 2 {
            return Err(ConfigError::EvalSamplesTooSmall(self.eval_samples));
        }
        Ok(())
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_qubits: 4,
            n_layers: 2,
            locality: 2,
            latent_dim: 2,
            data_dim: 4,
            batch_size: 32,
            n_critic: 5,
            lambda_gp: 10.0,
            iterations: 1000,
            eval_every: 50,
            eval_samples: 128,
            measurement: MeasurementConfig::ShotNoise { shots: 1024 },
            circuit_opt: AdamConfig::with_lr(1e-2),
            readout_opt: AdamConfig::with_lr(1e-3),
            critic_opt: AdamConfig::with_lr(1e-3),
        }
    }
}
