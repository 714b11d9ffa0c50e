//! The carried-but-thin single-process BSP substrate (§5).
//!
//! Stands in for the out-of-scope distributed graph execution framework:
//! vertex iteration across a fixed worker pool, one barrier per superstep.
//! Spawns one worker per thread budget on a `crossbeam::scope` and joins
//! before returning, fresh every superstep rather than keeping a
//! persistent job/result channel pair, since a superstep's workers have
//! nothing left to do once their row range is processed (no
//! cross-superstep work queue to keep them alive for).
//!
//! Only the admission and initialize/rescale stages run through this
//! engine: their per-vertex decisions are pure functions of a fixed
//! stage-start snapshot, so disjoint row ranges can run with no
//! cross-worker coordination. Score-and-propose cannot — the "speculative
//! local load" heuristic (§9) requires each vertex to observe the
//! tentative effect of every vertex processed earlier *in the same
//! stage*, so it runs sequentially (see `stages::propose`).

use crate::message::RowMessage;

/// Per-row output of a single stage invocation: outgoing messages plus the
/// aggregate contributions a vertex made this superstep. The coordinator
/// merges these into the global `Aggregates` and the next superstep's
/// inbox after every worker chunk reports in.
#[derive(Clone, Debug, Default)]
pub struct RowOutput {
    /// (destination row, message) pairs to deliver next superstep.
    pub messages: Vec<(usize, RowMessage)>,
    /// Sparse per-partition load deltas contributed by this row.
    pub load_delta: Vec<(usize, i64)>,
    /// Sparse per-partition demand contributed by this row.
    pub demand_delta: Vec<(usize, u64)>,
    pub migrated: bool,
    /// Set by score-and-propose: this row's directed-present edges that
    /// landed local / cut this round. Unused by the other stages.
    pub local_edges: u64,
    pub cut_edges: u64,
    /// Set by score-and-propose: this row's contribution to the `state`
    /// convergence proxy (its score at its own current partition).
    pub state: f64,
}

impl RowOutput {
    pub fn clear(&mut self) {
        self.messages.clear();
        self.load_delta.clear();
        self.demand_delta.clear();
        self.migrated = false;
        self.local_edges = 0;
        self.cut_edges = 0;
        self.state = 0.0;
    }
}

/// Splits three same-length slices into `n_workers` disjoint row ranges
/// and runs `f(row, vertex, rng, output)` for every row, fanning the
/// ranges out across a `crossbeam::scope` and joining before returning.
/// `f` must be `Sync` since the same closure value is shared (by
/// reference) across workers; each invocation only ever touches its own
/// row's slot.
pub fn parallel_rows<A, B, C, F>(a: &mut [A], b: &mut [B], c: &mut [C], n_workers: usize, f: F)
where
    A: Send,
    B: Send,
    C: Send,
    F: Fn(usize, &mut A, &mut B, &mut C) + Sync,
{
    let n = a.len();
    debug_assert_eq!(b.len(), n);
    debug_assert_eq!(c.len(), n);
    if n == 0 {
        return;
    }
    let workers = n_workers.max(1);
    let chunk_size = ((n + workers - 1) / workers).max(1);
    let f = &f;

    crossbeam::scope(|scope| {
        let mut base = 0;
        for ((a_chunk, b_chunk), c_chunk) in a
            .chunks_mut(chunk_size)
            .zip(b.chunks_mut(chunk_size))
            .zip(c.chunks_mut(chunk_size))
        {
            let start = base;
            scope.spawn(move |_| {
                for (offset, ((av, bv), cv)) in a_chunk
                    .iter_mut()
                    .zip(b_chunk.iter_mut())
                    .zip(c_chunk.iter_mut())
                    .enumerate()
                {
                    f(start + offset, av, bv, cv);
                }
            });
            base += chunk_size;
        }
    })
    .expect("engine worker panicked");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visits_every_row_exactly_once() {
        let mut a = vec![0i64; 37];
        let mut b = vec![0u8; 37];
        let mut c = vec![0u8; 37];
        parallel_rows(&mut a, &mut b, &mut c, 4, |row, av, _, _| {
            *av = row as i64;
        });
        for (row, &v) in a.iter().enumerate() {
            assert_eq!(v, row as i64);
        }
    }

    #[test]
    fn single_worker_still_covers_all_rows() {
        let mut a = vec![0i64; 10];
        let mut b = vec![0u8; 10];
        let mut c = vec![0u8; 10];
        parallel_rows(&mut a, &mut b, &mut c, 1, |row, av, _, _| {
            *av = row as i64 * 2;
        });
        assert_eq!(a, (0..10).map(|r| r * 2).collect::<Vec<i64>>());
    }
}
