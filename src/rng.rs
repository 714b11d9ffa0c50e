//! Deterministic per-vertex RNG streams (§5, REDESIGN FLAGS).
//!
//! Seeding one `SmallRng` per worker thread is only reproducible as long
//! as vertices land on the same thread every run, which a chunked worker
//! pool doesn't guarantee once the row count or thread count changes.
//! Determinism keyed on vertex *id*, independent of worker scheduling, is
//! what a reproducible run actually needs, so each vertex's seed is
//! instead derived by hashing `(run_seed, vertex_id)` through `sha3`.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use sha3::{Digest, Sha3_256};

/// Builds the deterministic `SmallRng` for a single vertex.
pub fn vertex_rng(run_seed: u64, vertex_id: u64) -> SmallRng {
    let mut hasher = Sha3_256::new();
    hasher.update(run_seed.to_be_bytes());
    hasher.update(vertex_id.to_be_bytes());
    let digest = hasher.finalize();
    let seed = u64::from_be_bytes(digest[0..8].try_into().unwrap());
    SmallRng::seed_from_u64(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn same_run_seed_and_vertex_id_give_same_stream() {
        let mut a = vertex_rng(1, 42);
        let mut b = vertex_rng(1, 42);
        let draws_a: Vec<u32> = (0..8).map(|_| a.gen()).collect();
        let draws_b: Vec<u32> = (0..8).map(|_| b.gen()).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn different_vertex_ids_diverge() {
        let mut a = vertex_rng(1, 42);
        let mut b = vertex_rng(1, 43);
        let draw_a: u64 = a.gen();
        let draw_b: u64 = b.gen();
        assert_ne!(draw_a, draw_b);
    }

    #[test]
    fn different_run_seeds_diverge() {
        let mut a = vertex_rng(1, 42);
        let mut b = vertex_rng(2, 42);
        let draw_a: u64 = a.gen();
        let draw_b: u64 = b.gen();
        assert_ne!(draw_a, draw_b);
    }
}
