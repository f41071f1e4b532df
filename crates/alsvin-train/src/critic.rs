//! Critic network.
//!
//! A feed-forward scorer data_dim → 512 → 512 → 512 → 1 with ReLU
//! between layers and a linear head.  No normalization layers: the
//! gradient penalty needs ∇_x D(x) to be well-defined pointwise.
//!
//! All derivatives are computed in closed form:
//!
//! - weight gradients of mean-score losses by ordinary backprop;
//! - the input gradient  g = ∇_x D(x) = W₁ᵀ D₁ W₂ᵀ D₂ W₃ᵀ D₃ w₄  with
//!   Dᵢ the ReLU activation masks;
//! - the penalty term  P = (‖g‖₂ − 1)²  differentiated with respect to
//!   the weights with the masks held constant (ReLU kinks are
//!   measure-zero).  Writing u = ∂P/∂g and forward-propagating u through
//!   the masked layers (t₁ = D₁W₁u, t₂ = D₂W₂t₁, t₃ = D₃W₃t₂) gives
//!     ∂P/∂W₁ = r₁uᵀ,  ∂P/∂W₂ = r₂t₁ᵀ,  ∂P/∂W₃ = r₃t₂ᵀ,  ∂P/∂w₄ = t₃,
//!   where rᵢ are the masked backward vectors from the g computation.
//!   Biases do not enter g, so their penalty gradient is zero.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Hidden width of each of the three hidden layers.
pub const HIDDEN_WIDTH: usize = 512;

/// Guard for the gradient-penalty derivative at ‖g‖ → 0.
const NORM_FLOOR: f64 = 1e-12;

/// One affine layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Dense {
    /// Shape (out, in).
    weight: Array2<f64>,
    /// Length out.
    bias: Array1<f64>,
}

impl Dense {
    fn init<R: Rng>(out_dim: usize, in_dim: usize, rng: &mut R) -> Self {
        let bound = 1.0 / (in_dim as f64).sqrt();
        Self {
            weight: Array2::from_shape_fn((out_dim, in_dim), |_| rng.gen_range(-bound..bound)),
            bias: Array1::from_shape_fn(out_dim, |_| rng.gen_range(-bound..bound)),
        }
    }

    /// Batched affine: (batch, in) → (batch, out).
    fn forward(&self, x: &ArrayView2<f64>) -> Array2<f64> {
        x.dot(&self.weight.t()) + &self.bias
    }
}

/// The critic's parameters: three hidden layers and a scalar head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Critic {
    hidden: Vec<Dense>,
    head: Dense,
}

/// Per-batch forward cache: inputs, pre-activations, activations.
pub struct CriticCache {
    /// The input batch (batch, data_dim).
    input: Array2<f64>,
    /// Pre-activations per hidden layer (batch, width).
    pre: Vec<Array2<f64>>,
    /// Post-ReLU activations per hidden layer (batch, width).
    act: Vec<Array2<f64>>,
}

/// Gradients with the same layout as [`Critic`].
#[derive(Debug, Clone)]
pub struct CriticGrads {
    weights: Vec<Array2<f64>>,
    biases: Vec<Array1<f64>>,
}

impl CriticGrads {
    fn zeros_like(critic: &Critic) -> Self {
        let mut weights = Vec::new();
        let mut biases = Vec::new();
        for layer in critic.hidden.iter().chain(std::iter::once(&critic.head)) {
            weights.push(Array2::zeros(layer.weight.raw_dim()));
            biases.push(Array1::zeros(layer.bias.raw_dim()));
        }
        Self { weights, biases }
    }

    /// Element-wise accumulate `other` scaled by `factor`.
    pub fn accumulate(&mut self, other: &CriticGrads, factor: f64) {
        for (a, b) in self.weights.iter_mut().zip(other.weights.iter()) {
            a.scaled_add(factor, b);
        }
        for (a, b) in self.biases.iter_mut().zip(other.biases.iter()) {
            a.scaled_add(factor, b);
        }
    }

    /// Flatten in the critic's canonical parameter order.
    pub fn flatten(&self) -> Vec<f64> {
        let mut out = Vec::new();
        for (w, b) in self.weights.iter().zip(self.biases.iter()) {
            out.extend(w.iter().copied());
            out.extend(b.iter().copied());
        }
        out
    }
}

impl Critic {
    /// Initialize a data_dim → 512³ → 1 critic.
    pub fn init<R: Rng>(data_dim: usize, rng: &mut R) -> Self {
        Self::with_hidden_width(data_dim, HIDDEN_WIDTH, rng)
    }

    /// Initialize with a custom hidden width (three hidden layers).
    pub fn with_hidden_width<R: Rng>(data_dim: usize, width: usize, rng: &mut R) -> Self {
        Self {
            hidden: vec![
                Dense::init(width, data_dim, rng),
                Dense::init(width, width, rng),
                Dense::init(width, width, rng),
            ],
            head: Dense::init(1, width, rng),
        }
    }

    /// Input dimension.
    pub fn data_dim(&self) -> usize {
        self.hidden[0].weight.ncols()
    }

    /// Total number of trainable values.
    pub fn n_params(&self) -> usize {
        self.hidden
            .iter()
            .chain(std::iter::once(&self.head))
            .map(|l| l.weight.len() + l.bias.len())
            .sum()
    }

    /// Mutable iterator over every parameter, canonical order (matches
    /// [`CriticGrads::flatten`]).
    pub fn params_iter_mut(&mut self) -> impl Iterator<Item = &mut f64> {
        self.hidden
            .iter_mut()
            .chain(std::iter::once(&mut self.head))
            .flat_map(|l| l.weight.iter_mut().chain(l.bias.iter_mut()))
    }

    /// Forward pass with cache for subsequent backward calls.
    pub fn score_with_cache(&self, x: &ArrayView2<f64>) -> (Array1<f64>, CriticCache) {
        let mut pre = Vec::with_capacity(self.hidden.len());
        let mut act = Vec::with_capacity(self.hidden.len());
        let mut h = x.to_owned();
        for layer in &self.hidden {
            let a = layer.forward(&h.view());
            let relu = a.mapv(|v| v.max(0.0));
            pre.push(a);
            h = relu.clone();
            act.push(relu);
        }
        let scores = self.head.forward(&h.view()).index_axis(Axis(1), 0).to_owned();
        (
            scores,
            CriticCache {
                input: x.to_owned(),
                pre,
                act,
            },
        )
    }

    /// Scores only.
    pub fn score(&self, x: &ArrayView2<f64>) -> Array1<f64> {
        self.score_with_cache(x).0
    }

    /// Weight gradients of `Σ_b upstream[b] · D(x_b)`.
    pub fn score_grads(&self, cache: &CriticCache, upstream: &ArrayView1<f64>) -> CriticGrads {
        let batch = cache.input.nrows();
        let mut grads = CriticGrads::zeros_like(self);

        // Head: y = w4·h3 + b4.
        let h3 = &cache.act[2];
        // delta over h3 per sample: upstream[b] * w4.
        let w4 = self.head.weight.row(0);
        for b in 0..batch {
            let u = upstream[b];
            grads.weights[3]
                .row_mut(0)
                .scaled_add(u, &h3.row(b));
            grads.biases[3][0] += u;
        }

        // Hidden layers, walking back.
        // delta_k: cotangent over activations of hidden layer k.
        let mut delta = Array2::zeros((batch, w4.len()));
        for b in 0..batch {
            delta.row_mut(b).assign(&(&w4 * upstream[b]));
        }
        for k in (0..3).rev() {
            // Through the ReLU.
            let mask = cache.pre[k].mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
            let r = &delta * &mask;
            let below: &Array2<f64> = if k == 0 { &cache.input } else { &cache.act[k - 1] };
            grads.weights[k] += &r.t().dot(below);
            grads.biases[k] += &r.sum_axis(Axis(0));
            if k > 0 {
                delta = r.dot(&self.hidden[k].weight);
            }
        }
        grads
    }

    /// Per-sample input gradients ∇_x D(x), shape (batch, data_dim).
    pub fn input_gradient(&self, cache: &CriticCache) -> Array2<f64> {
        let batch = cache.input.nrows();
        let w4 = self.head.weight.row(0);
        let mut delta = Array2::zeros((batch, w4.len()));
        for b in 0..batch {
            delta.row_mut(b).assign(&w4);
        }
        for k in (0..3).rev() {
            let mask = cache.pre[k].mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
            let r = &delta * &mask;
            delta = r.dot(&self.hidden[k].weight);
        }
        delta
    }

    /// Gradient-penalty value and weight gradients at the interpolates.
    ///
    /// Returns `mean_b (‖∇_x D(x_b)‖₂ − 1)²` and its gradient with the
    /// ReLU masks held constant.
    pub fn gradient_penalty(&self, x: &ArrayView2<f64>) -> (f64, CriticGrads) {
        let (_, cache) = self.score_with_cache(x);
        let batch = cache.input.nrows();
        let inv_batch = 1.0 / batch as f64;
        let masks: Vec<Array2<f64>> = cache
            .pre
            .iter()
            .map(|a| a.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }))
            .collect();

        let mut value = 0.0;
        let mut grads = CriticGrads::zeros_like(self);
        let w4 = self.head.weight.row(0).to_owned();

        for b in 0..batch {
            // Backward vectors of the input-gradient computation.
            let r3 = &masks[2].row(b) * &w4;
            let r2 = &masks[1].row(b) * &r3.dot(&self.hidden[2].weight.view());
            let r1 = &masks[0].row(b) * &r2.dot(&self.hidden[1].weight.view());
            let g = r1.dot(&self.hidden[0].weight.view());

            let norm = g.dot(&g).sqrt();
            value += (norm - 1.0).powi(2) * inv_batch;

            // u = ∂P/∂g, then forward-propagate through the masked layers.
            let u = g.mapv(|v| 2.0 * (norm - 1.0) / norm.max(NORM_FLOOR) * v);
            let t1 = &masks[0].row(b) * &self.hidden[0].weight.dot(&u);
            let t2 = &masks[1].row(b) * &self.hidden[1].weight.dot(&t1);
            let t3 = &masks[2].row(b) * &self.hidden[2].weight.dot(&t2);

            accumulate_outer(&mut grads.weights[0], &r1.view(), &u.view(), inv_batch);
            accumulate_outer(&mut grads.weights[1], &r2.view(), &t1.view(), inv_batch);
            accumulate_outer(&mut grads.weights[2], &r3.view(), &t2.view(), inv_batch);
            grads.weights[3].row_mut(0).scaled_add(inv_batch, &t3);
        }
        (value, grads)
    }
}

/// out += factor · rows ⊗ cols.
fn accumulate_outer(
    out: &mut Array2<f64>,
    rows: &ArrayView1<f64>,
    cols: &ArrayView1<f64>,
    factor: f64,
) {
    for (i, r) in rows.iter().enumerate() {
        out.row_mut(i).scaled_add(factor * r, cols);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn small_critic(seed: u64) -> Critic {
        let mut rng = StdRng::seed_from_u64(seed);
        Critic::with_hidden_width(2, 8, &mut rng)
    }

    #[test]
    fn score_shape() {
        let critic = small_critic(0);
        let x = array![[0.1, -0.2], [0.5, 0.5], [1.0, 0.0]];
        assert_eq!(critic.score(&x.view()).len(), 3);
    }

    #[test]
    fn input_gradient_matches_finite_differences() {
        let critic = small_critic(3);
        let x = array![[0.31, -0.77]];
        let (_, cache) = critic.score_with_cache(&x.view());
        let g = critic.input_gradient(&cache);

        let h = 1e-6;
        for j in 0..2 {
            let mut plus = x.clone();
            plus[[0, j]] += h;
            let mut minus = x.clone();
            minus[[0, j]] -= h;
            let numeric =
                (critic.score(&plus.view())[0] - critic.score(&minus.view())[0]) / (2.0 * h);
            assert!((g[[0, j]] - numeric).abs() < 1e-5);
        }
    }

    #[test]
    fn score_grads_match_finite_differences() {
        let critic = small_critic(9);
        let x = array![[0.4, 0.3], [-0.6, 0.9]];
        let upstream = array![0.5, -1.25];
        let (_, cache) = critic.score_with_cache(&x.view());
        let grads = critic.score_grads(&cache, &upstream.view()).flatten();

        let loss = |c: &Critic| c.score(&x.view()).dot(&upstream);
        let h = 1e-6;
        let n = critic.n_params();
        assert_eq!(n, grads.len());
        let mut plus = critic.clone();
        let mut minus = critic.clone();
        for i in 0..n {
            plus.clone_from(&critic);
            minus.clone_from(&critic);
            *plus.params_iter_mut().nth(i).unwrap() += h;
            *minus.params_iter_mut().nth(i).unwrap() -= h;
            let numeric = (loss(&plus) - loss(&minus)) / (2.0 * h);
            assert!(
                (grads[i] - numeric).abs() < 1e-5,
                "param {i}: analytic {} vs numeric {numeric}",
                grads[i]
            );
        }
    }

    #[test]
    fn penalty_zero_for_unit_slope_critic() {
        // Hand-built critic computing D(x) = x_0 for positive inputs:
        // each hidden layer passes coordinate 0 through with weight 1.
        let pass = |out: usize, in_dim: usize| Dense {
            weight: Array2::from_shape_fn((out, in_dim), |(i, j)| {
                if i == 0 && j == 0 { 1.0 } else { 0.0 }
            }),
            bias: Array1::from_elem(out, 0.0),
        };
        let critic = Critic {
            hidden: vec![pass(8, 2), pass(8, 8), pass(8, 8)],
            head: pass(1, 8),
        };
        // Positive first coordinate keeps the active path in the linear
        // regime, so D is affine with slope exactly 1 along it.
        let x = array![[0.7, 0.1], [1.3, -0.4]];
        let (penalty, grads) = critic.gradient_penalty(&x.view());
        assert!(penalty.abs() < 1e-24);
        assert!(grads.flatten().iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn penalty_grads_match_finite_differences() {
        let critic = small_critic(21);
        let x = array![[0.8, -0.3], [0.2, 0.9]];
        let (_, grads) = critic.gradient_penalty(&x.view());
        let flat = grads.flatten();

        let penalty = |c: &Critic| c.gradient_penalty(&x.view()).0;
        let h = 1e-6;
        let n = critic.n_params();
        let mut plus = critic.clone();
        let mut minus = critic.clone();
        for i in 0..n {
            plus.clone_from(&critic);
            minus.clone_from(&critic);
            *plus.params_iter_mut().nth(i).unwrap() += h;
            *minus.params_iter_mut().nth(i).unwrap() -= h;
            let numeric = (penalty(&plus) - penalty(&minus)) / (2.0 * h);
            assert!(
                (flat[i] - numeric).abs() < 1e-4,
                "param {i}: analytic {} vs numeric {numeric}",
                flat[i]
            );
        }
    }
}
