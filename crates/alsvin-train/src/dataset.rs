//! Cyclic batch sampler over the real training set.
//!
//! The dataset itself is external and read-only; this sampler walks it in
//! a seeded shuffled order, reshuffling at the start of every full pass,
//! so every epoch sees every row exactly once in a fresh order.

use ndarray::{Array2, ArrayView2, Axis};
use rand::seq::SliceRandom;

use crate::error::{ConfigError, TrainResult};
use crate::seeds::SeedSequence;

/// Shuffled cyclic batches over a fixed dataset.
#[derive(Debug, Clone)]
pub struct DatasetSampler {
    data: Array2<f64>,
    order: Vec<usize>,
    cursor: usize,
}

impl DatasetSampler {
    /// Wrap a dataset of shape (rows, data_dim).
    ///
    /// Rejects an empty dataset; batch-size bounds are checked per draw.
    pub fn new(data: Array2<f64>) -> TrainResult<Self> {
        if data.nrows() == 0 {
            return Err(ConfigError::NonPositive {
                field: "dataset rows",
            }
            .into());
        }
        let order: Vec<usize> = (0..data.nrows()).collect();
        Ok(Self {
            data,
            order,
            cursor: usize::MAX, // force a shuffle before the first batch
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    /// True if the dataset has no rows (never after construction).
    pub fn is_empty(&self) -> bool {
        self.data.nrows() == 0
    }

    /// Dimension of each row.
    pub fn data_dim(&self) -> usize {
        self.data.ncols()
    }

    /// The full dataset.
    pub fn data(&self) -> ArrayView2<f64> {
        self.data.view()
    }

    /// Draw the next batch of `batch_size` rows.
    ///
    /// When fewer than `batch_size` rows remain in the current pass, the
    /// order is reshuffled (one seed token) and the pass restarts.
    pub fn next_batch(&mut self, batch_size: usize, seeds: &mut SeedSequence) -> TrainResult<Array2<f64>> {
        if batch_size == 0 {
            return Err(ConfigError::NonPositive {
                field: "batch_size",
            }
            .into());
        }
        if batch_size > self.len() {
            return Err(ConfigError::BatchExceedsDataset {
                batch_size,
                dataset_size: self.len(),
            }
            .into());
        }
        if self.cursor > self.len().saturating_sub(batch_size) {
            let mut rng = seeds.next_rng();
            self.order.shuffle(&mut rng);
            self.cursor = 0;
        }
        let picked: Vec<usize> = self.order[self.cursor..self.cursor + batch_size].to_vec();
        self.cursor += batch_size;
        Ok(self.data.select(Axis(0), &picked))
    }
}
