//! Train command implementation.
//!
//! `alsvin train --config <cfg.yaml> --dataset <data.json> --out <dir>`
//!
//! Runs the adversarial loop; every `eval_every` iterations the current
//! generator is sampled, scored against a held-out real batch, and fed
//! to the checkpoint selector.  Accepted checkpoints and the metric
//! history land in a timestamped run directory.

use anyhow::Context;
use chrono::Local;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use alsvin_eval::{EvalError, kl_divergence};
use alsvin_train::{
    AdversarialTrainer, Checkpoint, CheckpointSelector, DatasetSampler, Decision, TrainerConfig,
};

use super::common::load_sample_file;

/// One row of the metric time series.
#[derive(Debug, Serialize)]
struct HistoryPoint {
    iteration: usize,
    critic_loss: f64,
    generator_loss: f64,
    divergence: Option<f64>,
}

/// Execute the train command.
pub fn execute(config_path: &str, dataset_path: &str, out: &str, seed: u64) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(config_path)
        .with_context(|| format!("reading {config_path}"))?;
    let config: TrainerConfig =
        serde_yaml_ng::from_str(&text).with_context(|| format!("parsing {config_path}"))?;

    let data = load_sample_file(dataset_path)?;
    let mut sampler = DatasetSampler::new(data)?;
    let trainer = AdversarialTrainer::new(config.clone(), &sampler)?;
    let mut state = trainer.init_state(seed);
    let mut selector = CheckpointSelector::new();

    let run_dir = PathBuf::from(out).join(format!("run-{}", Local::now().format("%Y%m%d-%H%M%S")));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("creating {}", run_dir.display()))?;
    info!(run_dir = %run_dir.display(), seed, "training run started");

    let bar = ProgressBar::new(config.iterations as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} [{elapsed_precise}] {msg}")?,
    );

    let mut history = Vec::new();
    let eval_batch = config.eval_samples.min(sampler.len());
    for _ in 0..config.iterations {
        let report = trainer.step(&mut state, &mut sampler)?;
        bar.inc(1);
        bar.set_message(format!(
            "critic {:+.4}  gen {:+.4}",
            report.critic_loss, report.generator_loss
        ));

        if state.iteration % config.eval_every != 0 {
            continue;
        }

        let fake = trainer.generate(
            &state.circuit_params,
            &state.readout,
            config.eval_samples,
            &mut state.seeds,
        )?;
        let reference = sampler.next_batch(eval_batch, &mut state.seeds)?;
        let score = match kl_divergence(&fake.view(), &reference.view()) {
            Ok(d) => Some(d),
            Err(EvalError::DegenerateNeighborhood { index }) => {
                warn!(iteration = state.iteration, index, "degenerate evaluation round skipped");
                None
            }
            Err(e) => return Err(e.into()),
        };
        let decision = selector.observe(state.iteration, score);
        if decision != Decision::Skipped {
            let checkpoint = Checkpoint {
                iteration: state.iteration,
                score,
                circuit_params: state.circuit_params.clone(),
                readout: state.readout.clone(),
            };
            write_checkpoint(&run_dir, &checkpoint)?;
        }
        history.push(HistoryPoint {
            iteration: state.iteration,
            critic_loss: report.critic_loss,
            generator_loss: report.generator_loss,
            divergence: score,
        });
    }
    bar.finish();

    let history_path = run_dir.join("history.json");
    std::fs::write(&history_path, serde_json::to_string_pretty(&history)?)
        .with_context(|| format!("writing {}", history_path.display()))?;

    match selector.best() {
        Some((iteration, best)) => eprintln!(
            "{} best divergence {best:.4} at iteration {iteration} ({})",
            style("OK").green().bold(),
            run_dir.display()
        ),
        None => eprintln!(
            "{} no successful evaluation round; milestone checkpoints only ({})",
            style("WARN").yellow().bold(),
            run_dir.display()
        ),
    }
    Ok(())
}

fn write_checkpoint(run_dir: &Path, checkpoint: &Checkpoint) -> anyhow::Result<()> {
    let path = run_dir.join(format!("checkpoint-{:06}.json", checkpoint.iteration));
    std::fs::write(&path, serde_json::to_string(checkpoint)?)
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), score = ?checkpoint.score, "checkpoint written");
    Ok(())
}
