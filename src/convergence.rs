//! Windowed convergence detector (§4.6, §9 open question 1).

use crate::config::{Config, ConvergenceMode};

/// Tracks the `state` history produced by score-and-propose stages and
/// decides whether the run has converged.
///
/// One observed behavior always appends to history but returns `false`
/// unconditionally, never halting early on its own — only
/// `maxIterations` stops it. Whether that's the intended behavior or an
/// unfinished branch is ambiguous, so both readings are exposed behind
/// [`ConvergenceMode`] rather than guessed at silently.
pub struct ConvergenceDetector {
    history: Vec<f64>,
    mode: ConvergenceMode,
    threshold: f64,
    window_size: i64,
}

impl ConvergenceDetector {
    pub fn new(config: &Config) -> Self {
        ConvergenceDetector {
            history: Vec::new(),
            mode: config.convergence_mode,
            threshold: config.convergence_threshold,
            window_size: config.window_size,
        }
    }

    /// Records the `state` aggregate produced at `superstep` and reports
    /// whether the coordinator should halt now.
    pub fn observe(&mut self, superstep: i64, state: f64) -> bool {
        self.history.push(state);
        if self.mode == ConvergenceMode::AlwaysRunToMax {
            return false;
        }
        if superstep < 3 + self.window_size {
            return false;
        }
        let best = self.history.iter().cloned().fold(f64::MIN, f64::max);
        if best == 0.0 {
            return false;
        }
        let step = (1.0 - state / best).abs();
        step < self.threshold
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }
}
