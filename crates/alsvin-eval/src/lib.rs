//! `alsvin-eval` — nearest-neighbour divergence estimation.
//!
//! Scores generated distributions against held-out real samples with a
//! two-sample KL estimator, used both for online evaluation during
//! training and for best-checkpoint selection.
//!
//! ```rust
//! use alsvin_eval::kl_divergence;
//! use ndarray::array;
//!
//! let generated = array![[0.0, 0.0], [1.0, 0.9], [0.4, 0.6]];
//! let reference = array![[0.1, 0.1], [0.9, 1.0], [0.5, 0.5]];
//! let d = kl_divergence(&generated.view(), &reference.view()).unwrap();
//! assert!(d.is_finite());
//! ```

pub mod divergence;
pub mod error;

pub use divergence::kl_divergence;
pub use error::{EvalError, EvalResult};
