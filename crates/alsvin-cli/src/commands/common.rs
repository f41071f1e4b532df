//! Shared helpers for the command implementations.

use anyhow::{Context, bail};
use ndarray::Array2;
use std::path::Path;

/// Load a JSON array of equal-length vectors into a (rows, dim) matrix.
pub fn load_sample_file(path: &str) -> anyhow::Result<Array2<f64>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let rows: Vec<Vec<f64>> =
        serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    let Some(first) = rows.first() else {
        bail!("{path} contains no vectors");
    };
    let dim = first.len();
    if dim == 0 {
        bail!("{path} contains zero-dimensional vectors");
    }
    if let Some(bad) = rows.iter().position(|r| r.len() != dim) {
        bail!("{path}: vector {bad} has {} entries, expected {dim}", rows[bad].len());
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(Array2::from_shape_vec((rows.len(), dim), flat)?)
}

/// Write a (rows, dim) matrix as a JSON array of vectors.
pub fn write_sample_file(path: &Path, data: &Array2<f64>) -> anyhow::Result<()> {
    let rows: Vec<Vec<f64>> = data.rows().into_iter().map(|r| r.to_vec()).collect();
    let json = serde_json::to_string_pretty(&rows)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
