//! Synth command implementation.
//!
//! `alsvin synth --out <data.json> --rows 256 --spread 2.0`
//!
//! Writes a small two-cluster Gaussian dataset, handy for smoke-testing
//! the training loop without real data.

use console::style;
use ndarray::Array2;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;
use std::path::Path;

use super::common::write_sample_file;

/// Execute the synth command.
pub fn execute(out: &str, rows: usize, spread: f64, seed: u64) -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = Array2::zeros((rows, 2));
    for (i, mut row) in data.rows_mut().into_iter().enumerate() {
        let center = if i % 2 == 0 { spread } else { -spread };
        for x in row.iter_mut() {
            let noise: f64 = rng.sample(StandardNormal);
            *x = center + 0.5 * noise;
        }
    }
    write_sample_file(Path::new(out), &data)?;
    eprintln!(
        "{} wrote {rows} rows to {out}",
        style("OK").green().bold()
    );
    Ok(())
}
