//! Error kinds for the partitioner (§7).
//!
//! Configuration and data faults are fatal and abort the job before (or
//! during) superstep 0/1; arithmetic degeneracies are *not* represented
//! here since they're handled locally with defined fallbacks instead of
//! propagated as errors (see `stages::propose` and `la::update`).

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PartitionError {
    #[snafu(display("numberOfPartitions (k) must be positive, got {k}"))]
    NonPositivePartitions { k: i64 },

    #[snafu(display("repartition delta {delta} would leave fewer than 1 partition (k={k})"))]
    InvalidRepartitionDelta { k: i64, delta: i64 },

    #[snafu(display("windowSize must be positive, got {window_size}"))]
    NonPositiveWindow { window_size: i64 },

    #[snafu(display("alpha must be within [0,1], got {alpha}"))]
    AlphaOutOfRange { alpha: f64 },

    #[snafu(display("beta must be within [0,1], got {beta}"))]
    BetaOutOfRange { beta: f64 },

    #[snafu(display("malformed input at line {line}: {reason}"))]
    InputParse { line: usize, reason: String },

    #[snafu(display(
        "protocol violation: vertex {row} received a {expected}-stage message during a {actual}-stage superstep"
    ))]
    ProtocolViolation {
        row: usize,
        expected: &'static str,
        actual: &'static str,
    },
}

pub type Result<T, E = PartitionError> = std::result::Result<T, E>;
