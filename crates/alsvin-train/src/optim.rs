//! Moment-based adaptive optimizer (Adam, Kingma & Ba 2015).
//!
//! Each of the three parameter groups (circuit angles, readout, critic)
//! carries its own [`AdamConfig`] and [`AdamState`]; steps are applied to
//! a flat view of the group in its canonical parameter order.

use serde::{Deserialize, Serialize};

/// Hyper-parameters of one optimizer group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdamConfig {
    /// Learning rate α.
    pub lr: f64,
    /// First-moment decay β₁.
    pub beta1: f64,
    /// Second-moment decay β₂.
    pub beta2: f64,
    /// Denominator guard ε.
    pub epsilon: f64,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            lr: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

impl AdamConfig {
    /// Convenience constructor with the default betas.
    pub fn with_lr(lr: f64) -> Self {
        Self {
            lr,
            ..Self::default()
        }
    }

    /// Apply one bias-corrected Adam step.
    ///
    /// `params` must iterate the group in the same order every call and
    /// match the state's length.
    pub fn step<'a>(
        &self,
        state: &mut AdamState,
        params: impl Iterator<Item = &'a mut f64>,
        grads: &[f64],
    ) {
        debug_assert_eq!(state.m.len(), grads.len());
        state.t += 1;
        let bc1 = 1.0 - self.beta1.powi(state.t as i32);
        let bc2 = 1.0 - self.beta2.powi(state.t as i32);
        for (i, p) in params.enumerate() {
            let g = grads[i];
            state.m[i] = self.beta1 * state.m[i] + (1.0 - self.beta1) * g;
            state.v[i] = self.beta2 * state.v[i] + (1.0 - self.beta2) * g * g;
            let m_hat = state.m[i] / bc1;
            let v_hat = state.v[i] / bc2;
            *p -= self.lr * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }
}

/// First/second moment accumulators and step counter of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdamState {
    m: Vec<f64>,
    v: Vec<f64>,
    t: u64,
}

impl AdamState {
    /// Fresh zeroed state for a group of `n` parameters.
    pub fn new(n: usize) -> Self {
        Self {
            m: vec![0.0; n],
            v: vec![0.0; n],
            t: 0,
        }
    }

    /// Number of steps taken.
    pub fn steps(&self) -> u64 {
        self.t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_moves_against_gradient() {
        let config = AdamConfig::with_lr(0.1);
        let mut state = AdamState::new(2);
        let mut params = [1.0, -1.0];
        let grads = [0.5, -0.5];
        config.step(&mut state, params.iter_mut(), &grads);
        assert!(params[0] < 1.0);
        assert!(params[1] > -1.0);
        assert_eq!(state.steps(), 1);
    }

    #[test]
    fn converges_on_quadratic() {
        // Minimize f(x) = (x - 3)².
        let config = AdamConfig::with_lr(0.05);
        let mut state = AdamState::new(1);
        let mut x = [0.0f64];
        for _ in 0..2000 {
            let grad = [2.0 * (x[0] - 3.0)];
            config.step(&mut state, x.iter_mut(), &grad);
        }
        assert!((x[0] - 3.0).abs() < 1e-3);
    }

    #[test]
    fn zero_grad_is_a_fixed_point() {
        let config = AdamConfig::default();
        let mut state = AdamState::new(1);
        let mut x = [2.0f64];
        config.step(&mut state, x.iter_mut(), &[0.0]);
        assert_eq!(x[0], 2.0);
    }
}
