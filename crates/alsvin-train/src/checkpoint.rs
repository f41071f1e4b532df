//! Checkpoint snapshots and the best-model retention policy.
//!
//! A checkpoint freezes the generator half of the model (circuit angles
//! and readout) together with its iteration index and divergence score.
//! The selector takes a checkpoint unconditionally on a sparse milestone
//! ladder, and otherwise only when the divergence score strictly
//! improves on the best seen so far; ties and degenerate (failed) scores
//! never replace the best.

use serde::{Deserialize, Serialize};
use tracing::debug;

use ndarray::Array2;

use crate::readout::Readout;

/// Frozen generator snapshot tagged with its evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Outer iteration the snapshot was taken at.
    pub iteration: usize,
    /// Divergence score at that iteration; None for milestone snapshots
    /// whose evaluation was degenerate.
    pub score: Option<f64>,
    /// Circuit angles.
    pub circuit_params: Array2<f64>,
    /// Readout parameters.
    pub readout: Readout,
}

/// Why a checkpoint was (or was not) taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Milestone iteration: always kept.
    Milestone,
    /// Strict improvement over the previous best score.
    Improved,
    /// Neither a milestone nor an improvement.
    Skipped,
}

/// Periodic-evaluation checkpoint policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointSelector {
    best: Option<(usize, f64)>,
}

impl CheckpointSelector {
    /// A selector with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// The (iteration, score) of the current best, if any evaluation
    /// succeeded yet.
    pub fn best(&self) -> Option<(usize, f64)> {
        self.best
    }

    /// Decide whether the evaluation at `iteration` warrants a
    /// checkpoint.  `score` is None when the divergence estimate was
    /// degenerate for this round; such rounds never become the best.
    pub fn observe(&mut self, iteration: usize, score: Option<f64>) -> Decision {
        let improved = match (score, self.best) {
            (Some(s), Some((_, best))) => s < best,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if improved {
            // Unwrap-free: improved implies score is Some.
            if let Some(s) = score {
                self.best = Some((iteration, s));
            }
        }
        let decision = if is_milestone(iteration) {
            Decision::Milestone
        } else if improved {
            Decision::Improved
        } else {
            Decision::Skipped
        };
        debug!(iteration, ?score, ?decision, "checkpoint decision");
        decision
    }
}

/// Sparse geometric milestone ladder: 10, 20, 50, 100, 200, 500, ...
pub fn is_milestone(iteration: usize) -> bool {
    if iteration < 10 {
        return false;
    }
    let mut decade = 10usize;
    loop {
        for mult in [1, 2, 5] {
            match decade.checked_mul(mult) {
                Some(m) if m == iteration => return true,
                Some(m) if m > iteration => return false,
                Some(_) => {}
                None => return false,
            }
        }
        decade = match decade.checked_mul(10) {
            Some(d) => d,
            None => return false,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milestone_ladder() {
        let milestones: Vec<usize> = (0..=1100).filter(|i| is_milestone(*i)).collect();
        assert_eq!(milestones, vec![10, 20, 50, 100, 200, 500, 1000]);
    }

    #[test]
    fn first_score_becomes_best() {
        let mut selector = CheckpointSelector::new();
        assert_eq!(selector.observe(1, Some(5.0)), Decision::Improved);
        assert_eq!(selector.best(), Some((1, 5.0)));
    }

    #[test]
    fn ties_do_not_replace() {
        let mut selector = CheckpointSelector::new();
        selector.observe(1, Some(5.0));
        assert_eq!(selector.observe(2, Some(5.0)), Decision::Skipped);
        assert_eq!(selector.best(), Some((1, 5.0)));
    }

    #[test]
    fn milestones_taken_without_improvement() {
        let mut selector = CheckpointSelector::new();
        selector.observe(1, Some(1.0));
        assert_eq!(selector.observe(10, Some(9.0)), Decision::Milestone);
        // Best is untouched by the worse milestone score.
        assert_eq!(selector.best(), Some((1, 1.0)));
    }

    #[test]
    fn degenerate_scores_never_best() {
        let mut selector = CheckpointSelector::new();
        assert_eq!(selector.observe(3, None), Decision::Skipped);
        assert_eq!(selector.observe(10, None), Decision::Milestone);
        assert_eq!(selector.best(), None);
    }

    #[test]
    fn strict_improvement_sequence() {
        // Score sequence at non-milestone iterations: only strict
        // improvements are kept.
        let scores = [5.0, 5.0, 4.9, 6.0, 4.0];
        let mut selector = CheckpointSelector::new();
        let decisions: Vec<Decision> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| selector.observe(i + 1, Some(*s)))
            .collect();
        assert_eq!(
            decisions,
            vec![
                Decision::Improved,
                Decision::Skipped,
                Decision::Improved,
                Decision::Skipped,
                Decision::Improved,
            ]
        );
        assert_eq!(selector.best(), Some((5, 4.0)));
    }
}
