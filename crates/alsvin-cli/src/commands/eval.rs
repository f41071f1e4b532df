//! Eval command implementation.
//!
//! `alsvin eval --generated <gen.json> --reference <ref.json>`
//!
//! Scores a generated sample file against a reference file with the
//! k-nearest-neighbour KL divergence estimator.

use console::style;

use alsvin_eval::kl_divergence;

use super::common::load_sample_file;

/// Execute the eval command.
pub fn execute(generated: &str, reference: &str) -> anyhow::Result<()> {
    let gen_sample = load_sample_file(generated)?;
    let ref_sample = load_sample_file(reference)?;
    let divergence = kl_divergence(&gen_sample.view(), &ref_sample.view())?;
    println!("{divergence:.6}");
    eprintln!(
        "{} D(generated || reference) over {} vs {} rows",
        style("OK").green().bold(),
        gen_sample.nrows(),
        ref_sample.nrows()
    );
    Ok(())
}
