//! Global, superstep-reduced aggregates (§3), exposed as typed fields and
//! accessor methods rather than string-keyed aggregator lookups
//! (REDESIGN FLAGS: "global aggregators → typed reducer handles").

/// The coordinator's global aggregate state. `load` and `directed_edges`
/// are persistent across supersteps; the rest are reset at the start of
/// whichever stage produces them.
#[derive(Clone, Debug)]
pub struct Aggregates {
    /// Per-partition load, persistent. `load[i]` = Σ numDirectedEdges over
    /// vertices currently assigned to partition `i`.
    load: Vec<u64>,
    /// Per-partition demand, reset every score-and-propose stage.
    demand: Vec<u64>,
    /// Σ per-vertex current score this round (convergence proxy).
    state: f64,
    /// Successful migrations this superstep.
    migrations_this_round: u64,
    /// Total successful migrations across the whole run.
    total_migrations: u64,
    /// Directed-present edges whose endpoints share a label, this round.
    local_edges: u64,
    /// Directed-present edges whose endpoints differ, this round.
    cut_edges: u64,
    /// Total directed-present edges. Persistent, set once by the
    /// edge reconciler.
    directed_edges: u64,
}

impl Aggregates {
    pub fn new(partition_space: usize) -> Self {
        Aggregates {
            load: vec![0; partition_space],
            demand: vec![0; partition_space],
            state: 0.0,
            migrations_this_round: 0,
            total_migrations: 0,
            local_edges: 0,
            cut_edges: 0,
            directed_edges: 0,
        }
    }

    pub fn partition_space(&self) -> usize {
        self.load.len()
    }

    // -- load (persistent) --

    pub fn load(&self, partition: usize) -> u64 {
        self.load[partition]
    }

    pub fn load_slice(&self) -> &[u64] {
        &self.load
    }

    pub fn add_load(&mut self, partition: usize, delta: i64) {
        let current = self.load[partition] as i64;
        self.load[partition] = (current + delta).max(0) as u64;
    }

    pub fn total_load(&self) -> u64 {
        self.load.iter().sum()
    }

    // -- demand (reset each propose stage) --

    pub fn demand(&self, partition: usize) -> u64 {
        self.demand[partition]
    }

    pub fn demand_slice(&self) -> &[u64] {
        &self.demand
    }

    pub fn add_demand(&mut self, partition: usize, amount: u64) {
        self.demand[partition] += amount;
    }

    pub fn reset_demand(&mut self) {
        self.demand.iter_mut().for_each(|d| *d = 0);
    }

    // -- state --

    pub fn state(&self) -> f64 {
        self.state
    }

    pub fn reset_state(&mut self) {
        self.state = 0.0;
    }

    pub fn add_state(&mut self, delta: f64) {
        self.state += delta;
    }

    // -- migrations --

    pub fn migrations_this_round(&self) -> u64 {
        self.migrations_this_round
    }

    pub fn total_migrations(&self) -> u64 {
        self.total_migrations
    }

    pub fn reset_round_migrations(&mut self) {
        self.migrations_this_round = 0;
    }

    pub fn record_migration(&mut self) {
        self.migrations_this_round += 1;
        self.total_migrations += 1;
    }

    // -- locality --

    pub fn local_edges(&self) -> u64 {
        self.local_edges
    }

    pub fn cut_edges(&self) -> u64 {
        self.cut_edges
    }

    pub fn reset_locality(&mut self) {
        self.local_edges = 0;
        self.cut_edges = 0;
    }

    pub fn add_local_edges(&mut self, n: u64) {
        self.local_edges += n;
    }

    pub fn add_cut_edges(&mut self, n: u64) {
        self.cut_edges += n;
    }

    // -- directed edges (persistent, set once) --

    pub fn directed_edges(&self) -> u64 {
        self.directed_edges
    }

    pub fn set_directed_edges(&mut self, total: u64) {
        self.directed_edges = total;
    }

    /// Fraction of directed-present edges that are local (same-label)
    /// this round. `0.0` if there are no directed-present edges.
    pub fn locality(&self) -> f64 {
        if self.directed_edges == 0 {
            0.0
        } else {
            self.local_edges as f64 / self.directed_edges as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_never_goes_negative_on_subtraction() {
        let mut agg = Aggregates::new(2);
        agg.add_load(0, 3);
        agg.add_load(0, -10);
        assert_eq!(agg.load(0), 0);
    }

    #[test]
    fn demand_reset_clears_all_partitions() {
        let mut agg = Aggregates::new(3);
        agg.add_demand(1, 5);
        agg.reset_demand();
        assert_eq!(agg.demand(1), 0);
    }

    #[test]
    fn migrations_split_round_vs_total() {
        let mut agg = Aggregates::new(2);
        agg.record_migration();
        agg.record_migration();
        assert_eq!(agg.migrations_this_round(), 2);
        agg.reset_round_migrations();
        agg.record_migration();
        assert_eq!(agg.migrations_this_round(), 1);
        assert_eq!(agg.total_migrations(), 3);
    }
}
