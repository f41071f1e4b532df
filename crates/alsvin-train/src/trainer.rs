//! Adversarial trainer.
//!
//! One outer step runs the critic-dominance schedule of Wasserstein
//! training with gradient penalty:
//!
//! 1. **Critic phase** (× n_critic): fresh latent and real batches, fake
//!    batch through ansatz → measurement → readout with the generator
//!    frozen, critic loss
//!      mean(D(fake)) − mean(D(real)) + λ·mean((‖∇_x D(x̃)‖₂ − 1)²)
//!    at per-sample interpolates x̃ = ε·real + (1−ε)·fake, one Adam step
//!    on the critic only.
//! 2. **Generator phase**: one fresh latent batch shared by both
//!    generator sub-updates (so both see the same shot-noise
//!    realizations), loss −mean(D(fake)), gradient w.r.t. the readout
//!    with the circuit frozen and w.r.t. the circuit angles with the
//!    readout frozen — both against the same frozen snapshot, then one
//!    Adam step each with independent optimizer state.
//!
//! All mutable training state lives in the explicit [`TrainingState`]
//! aggregate threaded through each call, so a run can be checkpointed,
//! resumed, and replayed bit-for-bit.  A NaN/Inf in any loss or gradient
//! is fatal: continuing would corrupt the optimizer moment estimates.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

use alsvin_circuit::{Ansatz, ObservableSet};
use rand::Rng;

use crate::config::TrainerConfig;
use crate::critic::Critic;
use crate::dataset::DatasetSampler;
use crate::error::{ConfigError, TrainError, TrainResult};
use crate::measurement::MeasurementStrategy;
use crate::optim::AdamState;
use crate::readout::Readout;
use crate::seeds::SeedSequence;

/// All mutable state of a run: three parameter groups, their optimizer
/// states, the seed stream, and the iteration counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingState {
    /// Trainable circuit angles, shape (n_layers, 2·n_qubits − 1).
    pub circuit_params: Array2<f64>,
    /// Linear readout parameters.
    pub readout: Readout,
    /// Critic parameters.
    pub critic: Critic,
    /// Optimizer state for the circuit angles.
    pub circuit_opt: AdamState,
    /// Optimizer state for the readout.
    pub readout_opt: AdamState,
    /// Optimizer state for the critic.
    pub critic_opt: AdamState,
    /// The deterministic seed-token stream.
    pub seeds: SeedSequence,
    /// Completed outer iterations.
    pub iteration: usize,
}

/// Scalar losses of one outer step, for logging and the metric series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// Iteration index this report belongs to.
    pub iteration: usize,
    /// Critic loss of the last critic sub-step.
    pub critic_loss: f64,
    /// Generator loss −mean(D(fake)).
    pub generator_loss: f64,
    /// Gradient-penalty value of the last critic sub-step (unscaled).
    pub gradient_penalty: f64,
}

/// The min-max optimization driver.
pub struct AdversarialTrainer {
    config: TrainerConfig,
    ansatz: Ansatz,
    observables: ObservableSet,
    measurement: Box<dyn MeasurementStrategy>,
}

impl AdversarialTrainer {
    /// Build a trainer, validating the configuration against the dataset.
    pub fn new(config: TrainerConfig, sampler: &DatasetSampler) -> TrainResult<Self> {
        config.validate()?;
        if config.batch_size > sampler.len() {
            return Err(ConfigError::BatchExceedsDataset {
                batch_size: config.batch_size,
                dataset_size: sampler.len(),
            }
            .into());
        }
        if sampler.data_dim() != config.data_dim {
            return Err(ConfigError::DataDimMismatch {
                found: sampler.data_dim(),
                expected: config.data_dim,
            }
            .into());
        }
        let ansatz = Ansatz::new(config.n_qubits, config.n_layers)?;
        let observables = ObservableSet::k_local(config.n_qubits, config.locality)?;
        let measurement = config.measurement.build();
        debug!(
            n_qubits = config.n_qubits,
            n_layers = config.n_layers,
            n_observables = observables.len(),
            "trainer ready"
        );
        Ok(Self {
            config,
            ansatz,
            observables,
            measurement,
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// The canonical observable set the sampler measures.
    pub fn observables(&self) -> &ObservableSet {
        &self.observables
    }

    /// Fresh training state seeded from `base_seed`.
    pub fn init_state(&self, base_seed: u64) -> TrainingState {
        let mut seeds = SeedSequence::new(base_seed);
        let mut rng = seeds.next_rng();
        let circuit_params = self.ansatz.init_params(&mut rng);
        let readout = Readout::init(self.config.data_dim, self.observables.len(), &mut rng);
        let critic = Critic::init(self.config.data_dim, &mut rng);
        TrainingState {
            circuit_opt: AdamState::new(self.ansatz.n_params()),
            readout_opt: AdamState::new(readout.n_params()),
            critic_opt: AdamState::new(critic.n_params()),
            circuit_params,
            readout,
            critic,
            seeds,
            iteration: 0,
        }
    }

    /// Draw a latent batch: uniform angles in [-π, π), one token per batch.
    fn sample_latents(&self, batch: usize, seeds: &mut SeedSequence) -> Array2<f64> {
        let mut rng = seeds.next_rng();
        Array2::from_shape_fn((batch, self.config.latent_dim), |_| {
            rng.gen_range(-PI..PI)
        })
    }

    /// Generate `n` fake vectors with the given generator parameters.
    pub fn generate(
        &self,
        circuit_params: &Array2<f64>,
        readout: &Readout,
        n: usize,
        seeds: &mut SeedSequence,
    ) -> TrainResult<Array2<f64>> {
        let latents = self.sample_latents(n, seeds);
        let exact =
            self.ansatz
                .expectation_batch(&circuit_params.view(), &latents.view(), &self.observables)?;
        let measured = self.measurement.sample(&exact.view(), seeds);
        Ok(readout.forward(&measured.view()))
    }

    /// Run one full outer step (critic phase then generator phase).
    pub fn step(
        &self,
        state: &mut TrainingState,
        sampler: &mut DatasetSampler,
    ) -> TrainResult<StepReport> {
        let iteration = state.iteration;
        let batch = self.config.batch_size;
        let inv_batch = 1.0 / batch as f64;
        let lambda = self.config.lambda_gp;

        // --- Critic phase -------------------------------------------------
        let mut critic_loss = f64::NAN;
        let mut penalty = f64::NAN;
        for _ in 0..self.config.n_critic {
            let latents = self.sample_latents(batch, &mut state.seeds);
            let real = sampler.next_batch(batch, &mut state.seeds)?;
            let exact = self.ansatz.expectation_batch(
                &state.circuit_params.view(),
                &latents.view(),
                &self.observables,
            )?;
            let measured = self.measurement.sample(&exact.view(), &mut state.seeds);
            let fake = state.readout.forward(&measured.view());

            // Per-sample interpolates x̃ = ε·real + (1−ε)·fake.
            let mut eps_rng = state.seeds.next_rng();
            let mut interpolates = Array2::zeros(real.raw_dim());
            for b in 0..batch {
                let eps: f64 = eps_rng.r#gen();
                let row = &real.row(b) * eps + &fake.row(b) * (1.0 - eps);
                interpolates.row_mut(b).assign(&row);
            }

            let (fake_scores, fake_cache) = state.critic.score_with_cache(&fake.view());
            let (real_scores, real_cache) = state.critic.score_with_cache(&real.view());
            let up_fake = Array1::from_elem(batch, inv_batch);
            let up_real = Array1::from_elem(batch, -inv_batch);
            let mut grads = state.critic.score_grads(&fake_cache, &up_fake.view());
            let real_grads = state.critic.score_grads(&real_cache, &up_real.view());
            grads.accumulate(&real_grads, 1.0);
            let (gp, gp_grads) = state.critic.gradient_penalty(&interpolates.view());
            grads.accumulate(&gp_grads, lambda);

            critic_loss =
                (fake_scores.sum() - real_scores.sum()) * inv_batch + lambda * gp;
            penalty = gp;
            let flat = grads.flatten();
            ensure_finite(critic_loss, "critic loss", iteration)?;
            ensure_all_finite(&flat, "critic gradient", iteration)?;
            self.config
                .critic_opt
                .step(&mut state.critic_opt, state.critic.params_iter_mut(), &flat);
        }

        // --- Generator phase ----------------------------------------------
        // One latent batch shared by both sub-updates, so the readout and
        // the circuit see identical shot-noise realizations.
        let latents = self.sample_latents(batch, &mut state.seeds);
        let exact = self.ansatz.expectation_batch(
            &state.circuit_params.view(),
            &latents.view(),
            &self.observables,
        )?;
        let measured = self.measurement.sample(&exact.view(), &mut state.seeds);
        let fake = state.readout.forward(&measured.view());
        let (scores, cache) = state.critic.score_with_cache(&fake.view());
        let generator_loss = -scores.sum() * inv_batch;
        ensure_finite(generator_loss, "generator loss", iteration)?;

        // dL/dx for L = −mean(D(x)).
        let dl_dx = state.critic.input_gradient(&cache) * (-inv_batch);

        // Readout gradient with the circuit frozen (measured values are
        // the inputs the forward pass saw).
        let readout_grads = state.readout.grads(&measured.view(), &dl_dx.view());
        let readout_flat: Vec<f64> = readout_grads
            .weight
            .iter()
            .chain(readout_grads.bias.iter())
            .copied()
            .collect();
        ensure_all_finite(&readout_flat, "readout gradient", iteration)?;

        // Circuit gradient with the readout frozen: the measurement noise
        // is pass-through, so the upstream cotangent over the exact
        // expectations is dL/dx · W, contracted by parameter shift.
        let upstream = state.readout.input_grad(&dl_dx.view());
        let circuit_grad = self.ansatz.grad(
            &state.circuit_params.view(),
            &latents.view(),
            &self.observables,
            &upstream.view(),
        )?;
        let circuit_flat: Vec<f64> = circuit_grad.iter().copied().collect();
        ensure_all_finite(&circuit_flat, "circuit gradient", iteration)?;

        // Both groups step only after both gradients exist, so each was
        // computed against the frozen snapshot of the other.
        {
            let (weight, bias) = state.readout.params_mut();
            self.config.readout_opt.step(
                &mut state.readout_opt,
                weight.iter_mut().chain(bias.iter_mut()),
                &readout_flat,
            );
        }
        self.config.circuit_opt.step(
            &mut state.circuit_opt,
            state.circuit_params.iter_mut(),
            &circuit_flat,
        );

        state.iteration += 1;
        debug!(iteration, critic_loss, generator_loss, penalty, "step done");
        Ok(StepReport {
            iteration,
            critic_loss,
            generator_loss,
            gradient_penalty: penalty,
        })
    }
}

fn ensure_finite(value: f64, context: &'static str, iteration: usize) -> TrainResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TrainError::NumericDivergence { context, iteration })
    }
}

fn ensure_all_finite(values: &[f64], context: &'static str, iteration: usize) -> TrainResult<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(TrainError::NumericDivergence { context, iteration })
    }
}
