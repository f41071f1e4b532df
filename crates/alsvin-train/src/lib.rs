//! `alsvin-train` — adversarial training loop for the Alsvin generator.
//!
//! Wires the quantum circuit sampler (`alsvin-circuit`) into a
//! Wasserstein-with-gradient-penalty min-max loop against a feed-forward
//! critic, with a measurement strategy between the circuit's exact
//! expectation values and the linear readout.  Three parameter groups
//! (circuit angles, readout, critic) train jointly, each with its own
//! Adam optimizer; all randomness flows through explicit counter-based
//! seed tokens so runs replay bit-for-bit.

pub mod checkpoint;
pub mod config;
pub mod critic;
pub mod dataset;
pub mod error;
pub mod measurement;
pub mod optim;
pub mod readout;
pub mod seeds;
pub mod trainer;

pub use checkpoint::{Checkpoint, CheckpointSelector, Decision};
pub use config::{MeasurementConfig, TrainerConfig};
pub use critic::Critic;
pub use dataset::DatasetSampler;
pub use error::{ConfigError, TrainError, TrainResult};
pub use measurement::{ExactMeasurement, MeasurementStrategy, ShotNoise};
pub use optim::{AdamConfig, AdamState};
pub use readout::Readout;
pub use seeds::SeedSequence;
pub use trainer::{AdversarialTrainer, StepReport, TrainingState};
