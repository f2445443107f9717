use serde::{Deserialize, Serialize};

/// Tuning knobs for [`MateSolver`](super::MateSolver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Upper bound on gradient-descent iterations. Default: 100
    pub max_iterations: usize,

    /// Total error below which the solve counts as converged. Default: 1e-6
    pub tolerance: f64,

    /// Step size applied to the gradient. Default: 0.1
    pub learning_rate: f64,

    /// Extra factor on the step size. Default: 0.5
    pub damping: f64,

    /// Position change below which the solve counts as stagnated. Default: 1e-8
    pub min_step: f64,

    /// Angular tolerance in radians. Reserved; no current metric reads it. Default: 1e-4
    pub angular_tolerance: f64,

    /// Evaluate per-component gradients on the rayon pool. Default: false
    pub parallel_gradients: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
            learning_rate: 0.1,
            damping: 0.5,
            min_step: 1e-8,
            angular_tolerance: 1e-4,
            parallel_gradients: false,
        }
    }
}

impl SolverConfig {
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    #[must_use]
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    #[must_use]
    pub fn with_min_step(mut self, min_step: f64) -> Self {
        self.min_step = min_step;
        self
    }

    #[must_use]
    pub fn with_parallel_gradients(mut self, parallel: bool) -> Self {
        self.parallel_gradients = parallel;
        self
    }

    /// Effective multiplier on the gradient in the update rule.
    pub fn step_scale(&self) -> f64 {
        self.learning_rate * self.damping
    }

    /// Relaxed per-mate threshold used when classifying results.
    pub fn mate_tolerance(&self) -> f64 {
        self.tolerance * 10.0
    }
}
