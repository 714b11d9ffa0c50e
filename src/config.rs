//! Run configuration (§6) and validation (§7 configuration faults).

use crate::error::{
    AlphaOutOfRangeSnafu, BetaOutOfRangeSnafu, InvalidRepartitionDeltaSnafu,
    NonPositivePartitionsSnafu, NonPositiveWindowSnafu,
};
use crate::error::Result;
use snafu::ensure;

/// Whether the convergence detector ever actually halts early, or always
/// runs to `max_iterations` while still recording history (§4.6, §9 open
/// question 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConvergenceMode {
    /// Halt as soon as the windowed step size drops below the threshold.
    ThresholdGated,
    /// Keep recording history but never halt on it; only `max_iterations`
    /// stops the run. Preserves the behavior observed when the detector's
    /// early-halt branch never actually fires.
    AlwaysRunToMax,
}

/// Which value score-and-propose broadcasts to neighbors for reinforcement
/// (§4.2 step 6, §9 open question 3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BroadcastSelector {
    /// Broadcast the argmax-of-score partition (the observed upstream
    /// behavior, and the default here).
    ArgmaxScore,
    /// Broadcast the LA-sampled `newPartition` instead.
    LaSample,
}

#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Target partition count (k).
    pub number_of_partitions: i64,
    /// Rescale delta (Δ); 0 means a fresh partitioning, not a rescale.
    pub repartition: i64,
    /// ε: extra slack folded into per-partition capacity.
    pub additional_capacity: f64,
    /// λ: penalty-term baseline.
    pub lambda: f64,
    /// α: LA reward rate.
    pub alpha: f64,
    /// β: LA penalty rate.
    pub beta: f64,
    /// Hard cap on supersteps of ComputeNewPartition/ComputeMigration.
    pub max_iterations: i64,
    /// Convergence step-size threshold.
    pub convergence_threshold: f64,
    /// Window of `state` history the convergence detector looks back over.
    pub window_size: i64,
    /// Default weight assigned to edges with no explicit weight field.
    pub edge_weight: u8,
    pub convergence_mode: ConvergenceMode,
    pub broadcast_selector: BroadcastSelector,
    /// Root seed for deriving deterministic per-vertex RNG streams.
    pub run_seed: u64,
    /// Emit a JSON progress line per superstep (teacher idiom from
    /// `recom::opt::short_bursts`), in addition to the final counters.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            number_of_partitions: 32,
            repartition: 0,
            additional_capacity: 0.05,
            lambda: 1.0,
            alpha: 0.98,
            beta: 0.02,
            max_iterations: 290,
            convergence_threshold: 0.001,
            window_size: 5,
            edge_weight: 1,
            convergence_mode: ConvergenceMode::ThresholdGated,
            broadcast_selector: BroadcastSelector::ArgmaxScore,
            run_seed: 0,
            verbose: false,
        }
    }
}

impl Config {
    /// Total action-space size (k+Δ). Partition labels range over
    /// `[0, partition_space())`.
    pub fn partition_space(&self) -> usize {
        (self.number_of_partitions + self.repartition) as usize
    }

    /// Validates the configuration, returning the first fault found.
    /// Must be called before superstep 0 (§7 configuration faults).
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.number_of_partitions > 0,
            NonPositivePartitionsSnafu {
                k: self.number_of_partitions
            }
        );
        ensure!(
            self.number_of_partitions + self.repartition > 0,
            InvalidRepartitionDeltaSnafu {
                k: self.number_of_partitions,
                delta: self.repartition,
            }
        );
        ensure!(
            self.window_size > 0,
            NonPositiveWindowSnafu {
                window_size: self.window_size
            }
        );
        ensure!(
            (0.0..=1.0).contains(&self.alpha),
            AlphaOutOfRangeSnafu { alpha: self.alpha }
        );
        ensure!(
            (0.0..=1.0).contains(&self.beta),
            BetaOutOfRangeSnafu { beta: self.beta }
        );
        Ok(())
    }
}
