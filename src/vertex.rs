//! Per-vertex state (§3).
//!
//! `directedFlags` (which incident edges were directed-present) lives on
//! [`crate::graph::Graph`]'s adjacency rather than duplicated here — the
//! graph already owns that per-neighbor flag and a vertex agent only ever
//! reads its own row.

/// Sentinel for "no partition assigned yet" (before the Initializer runs).
pub const UNASSIGNED: i32 = -1;

#[derive(Clone, Debug)]
pub struct VertexState {
    pub current_partition: i32,
    pub new_partition: i32,
    pub num_directed_edges: u32,
    /// LA probability distribution over the `k+Δ` actions. Always sums to
    /// 1 within 1e-9 once seeded by the Initializer/Rescaler.
    pub la_probability: Vec<f64>,
    /// LA signal accumulator, reset to zero after every LA update.
    pub la_signal: Vec<f64>,
}

impl VertexState {
    /// A vertex with no partition yet and a uniform LA distribution over
    /// `partition_space` actions — the state just before the Initializer
    /// commits a label (superstep 2 preconditions).
    pub fn unseeded(partition_space: usize) -> Self {
        VertexState {
            current_partition: UNASSIGNED,
            new_partition: UNASSIGNED,
            num_directed_edges: 0,
            la_probability: vec![1.0 / partition_space as f64; partition_space],
            la_signal: vec![0.0; partition_space],
        }
    }

    pub fn partition_space(&self) -> usize {
        self.la_probability.len()
    }

    pub fn reset_signal(&mut self) {
        self.la_signal.iter_mut().for_each(|s| *s = 0.0);
    }

    /// Sum of `la_probability`; should stay within 1e-9 of 1.0 (Testable
    /// Property 2).
    pub fn probability_mass(&self) -> f64 {
        self.la_probability.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseeded_probability_is_uniform_and_normalized() {
        let v = VertexState::unseeded(4);
        assert_eq!(v.current_partition, UNASSIGNED);
        assert!((v.probability_mass() - 1.0).abs() < 1e-9);
        assert!(v.la_probability.iter().all(|&p| (p - 0.25).abs() < 1e-12));
    }
}
