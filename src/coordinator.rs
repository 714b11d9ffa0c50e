//! The superstep-driven state machine (§4.1, §5).
//!
//! Folds superstep 0 (Propagate) and superstep 1 (Reconcile) into a
//! single [`crate::graph::Graph::reconcile`] call made before the first
//! tracked superstep, since both are pure graph transforms with no
//! per-vertex LA state or aggregate bookkeeping — there's nothing for a
//! "stage" abstraction to add there. Superstep 2 onward runs through
//! [`crate::stage::Stage::for_superstep`].

use rand::rngs::SmallRng;
use serde::Serialize;
use serde_json::json;

use crate::aggregators::Aggregates;
use crate::config::Config;
use crate::convergence::ConvergenceDetector;
use crate::edge::NeighborLabels;
use crate::engine::RowOutput;
use crate::error::Result;
use crate::graph::Graph;
use crate::message::RowMessage;
use crate::rng::vertex_rng;
use crate::stage::Stage;
use crate::stages::{admission, init, propose, rescale};
use crate::vertex::{VertexState, UNASSIGNED};

/// Final counters published on halt (§6, §8).
#[derive(Clone, Debug, Serialize)]
pub struct Counters {
    pub migrations: u64,
    pub iterations: i64,
    pub local_edges_pct: f64,
    pub max_min_imbalance_x1000: f64,
    pub max_normalized_load_x1000: f64,
    pub score_x1000: f64,
    pub cut_edges: u64,
    pub directed_edges: u64,
}

pub struct Coordinator {
    graph: Graph,
    vertices: Vec<VertexState>,
    neighbor_labels: Vec<NeighborLabels>,
    rngs: Vec<SmallRng>,
    aggregates: Aggregates,
    outputs: Vec<RowOutput>,
    inbox: Vec<Vec<RowMessage>>,
    convergence: ConvergenceDetector,
    config: Config,
    superstep: i64,
    n_workers: usize,
}

impl Coordinator {
    /// Builds a coordinator over `graph`, seeding each vertex's prior
    /// partition from `prior_partitions` (row-indexed, [`UNASSIGNED`] for
    /// vertices with no prior label). Reconciles the adjacency and sets
    /// the persistent `directedEdges` aggregate before returning.
    pub fn new(
        mut graph: Graph,
        config: Config,
        n_workers: usize,
        prior_partitions: Vec<i32>,
    ) -> Result<Self> {
        config.validate()?;
        graph.reconcile();

        let n = graph.num_vertices();
        let space = config.partition_space();
        let vertices: Vec<VertexState> = (0..n)
            .map(|row| {
                let mut v = VertexState::unseeded(space);
                v.current_partition = prior_partitions.get(row).copied().unwrap_or(UNASSIGNED);
                v
            })
            .collect();
        let neighbor_labels = vec![NeighborLabels::new(); n];
        let rngs: Vec<SmallRng> = (0..n)
            .map(|row| vertex_rng(config.run_seed, graph.vertex_id(row)))
            .collect();

        let mut aggregates = Aggregates::new(space);
        aggregates.set_directed_edges(graph.total_directed_edges());

        let outputs = vec![RowOutput::default(); n];
        let inbox = vec![Vec::new(); n];
        let convergence = ConvergenceDetector::new(&config);

        Ok(Coordinator {
            graph,
            vertices,
            neighbor_labels,
            rngs,
            aggregates,
            outputs,
            inbox,
            convergence,
            config,
            superstep: 2,
            n_workers,
        })
    }

    /// Drives the run to halt (maxIterations or convergence) and returns
    /// the final counters.
    pub fn run(&mut self) -> Counters {
        self.run_initialize_or_rescale();
        self.superstep = 3;

        loop {
            match Stage::for_superstep(self.superstep) {
                Stage::ComputeNewPartition => {
                    self.run_propose();
                    let converged = self
                        .convergence
                        .observe(self.superstep, self.aggregates.state());
                    if converged || self.superstep >= self.config.max_iterations {
                        break;
                    }
                }
                Stage::ComputeMigration => {
                    self.run_admission();
                    if self.superstep >= self.config.max_iterations {
                        break;
                    }
                }
                other => unreachable!("superstep {} dispatched to {:?}", self.superstep, other),
            }
            self.superstep += 1;
        }

        self.final_counters()
    }

    fn run_initialize_or_rescale(&mut self) {
        if self.config.repartition == 0 {
            init::run(
                &self.graph,
                &mut self.vertices,
                &mut self.rngs,
                &mut self.outputs,
                &self.config,
                self.n_workers,
            );
        } else {
            rescale::run(
                &self.graph,
                &mut self.vertices,
                &mut self.rngs,
                &mut self.outputs,
                &self.config,
                self.n_workers,
            );
        }
        for out in &self.outputs {
            for &(partition, delta) in &out.load_delta {
                self.aggregates.add_load(partition, delta);
            }
        }
        self.route_messages();
        self.log_superstep();
    }

    fn run_propose(&mut self) {
        self.aggregates.reset_state();
        self.aggregates.reset_demand();
        self.aggregates.reset_locality();

        let mut local_load = propose::SpeculativeLocalLoad::snapshot(&self.aggregates);
        propose::run(
            &self.graph,
            &mut self.vertices,
            &mut self.neighbor_labels,
            &mut self.rngs,
            &mut self.outputs,
            &self.inbox,
            &mut local_load,
            self.aggregates.directed_edges(),
            &self.config,
        );

        for out in &self.outputs {
            self.aggregates.add_state(out.state);
            self.aggregates.add_local_edges(out.local_edges);
            self.aggregates.add_cut_edges(out.cut_edges);
            for &(partition, amount) in &out.demand_delta {
                self.aggregates.add_demand(partition, amount);
            }
        }
        self.route_messages();
        self.log_superstep();
    }

    fn run_admission(&mut self) {
        self.aggregates.reset_round_migrations();
        let capacity = propose::total_capacity(
            self.aggregates.directed_edges(),
            self.config.additional_capacity,
            self.config.partition_space(),
        );
        let admit_prob = admission::compute_admission_probabilities(
            self.aggregates.load_slice(),
            self.aggregates.demand_slice(),
            capacity,
        );

        admission::run(
            &self.graph,
            &mut self.vertices,
            &mut self.rngs,
            &mut self.outputs,
            &self.inbox,
            &admit_prob,
            self.superstep,
            &self.config,
            self.n_workers,
        );

        for out in &self.outputs {
            for &(partition, delta) in &out.load_delta {
                self.aggregates.add_load(partition, delta);
            }
            if out.migrated {
                self.aggregates.record_migration();
            }
        }
        self.route_messages();
        self.log_superstep();
    }

    fn route_messages(&mut self) {
        for bucket in &mut self.inbox {
            bucket.clear();
        }
        for out in &self.outputs {
            for &(dest, msg) in &out.messages {
                self.inbox[dest].push(msg);
            }
        }
    }

    fn log_superstep(&self) {
        if !self.config.verbose {
            return;
        }
        println!(
            "{}",
            json!({
                "superstep": self.superstep,
                "stage": format!("{:?}", Stage::for_superstep(self.superstep)),
                "migrations": self.aggregates.total_migrations(),
                "state": self.aggregates.state(),
                "locality": self.aggregates.locality(),
            })
            .to_string()
        );
    }

    fn final_counters(&self) -> Counters {
        let load = self.aggregates.load_slice();
        let max_load = load.iter().copied().max().unwrap_or(0);
        let min_load = load.iter().copied().min().unwrap_or(0);
        let max_min_imbalance = if min_load == 0 {
            f64::INFINITY
        } else {
            max_load as f64 / min_load as f64
        };
        let avg_load = if load.is_empty() {
            0.0
        } else {
            self.aggregates.total_load() as f64 / load.len() as f64
        };
        let max_normalized_load = if avg_load > 0.0 {
            max_load as f64 / avg_load
        } else {
            0.0
        };

        Counters {
            migrations: self.aggregates.total_migrations(),
            iterations: self.superstep,
            local_edges_pct: self.aggregates.locality() * 100.0,
            max_min_imbalance_x1000: max_min_imbalance * 1000.0,
            max_normalized_load_x1000: max_normalized_load * 1000.0,
            score_x1000: self.aggregates.state() * 1000.0,
            cut_edges: self.aggregates.cut_edges(),
            directed_edges: self.aggregates.directed_edges(),
        }
    }

    pub fn vertices(&self) -> &[VertexState] {
        &self.vertices
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cliques() -> Graph {
        let mut g = Graph::new();
        for &(lo, hi) in &[(0u64, 5u64), (5u64, 10u64)] {
            for i in lo..hi {
                for j in lo..hi {
                    if i != j {
                        g.add_directed_edge(i, j, 1);
                    }
                }
            }
        }
        g
    }

    #[test]
    fn two_cliques_settle_into_two_partitions_with_perfect_locality() {
        let graph = two_cliques();
        let n = graph.num_vertices();
        let config = Config {
            number_of_partitions: 2,
            run_seed: 1,
            max_iterations: 40,
            ..Config::default()
        };
        let mut coordinator = Coordinator::new(graph, config, 2, vec![UNASSIGNED; n]).unwrap();
        let counters = coordinator.run();

        let label = |row: usize| coordinator.vertices()[row].current_partition;
        let clique_a: Vec<i32> = (0..5).map(label).collect();
        let clique_b: Vec<i32> = (5..10).map(label).collect();
        assert!(clique_a.windows(2).all(|w| w[0] == w[1]));
        assert!(clique_b.windows(2).all(|w| w[0] == w[1]));
        assert_ne!(clique_a[0], clique_b[0]);
        assert_eq!(counters.cut_edges, 0);
    }

    #[test]
    fn empty_graph_never_migrates() {
        let mut graph = Graph::new();
        for i in 0..8u64 {
            graph.ensure_row(i);
        }
        let n = graph.num_vertices();
        let config = Config {
            number_of_partitions: 8,
            max_iterations: 10,
            ..Config::default()
        };
        let mut coordinator = Coordinator::new(graph, config, 2, vec![UNASSIGNED; n]).unwrap();
        let counters = coordinator.run();
        assert_eq!(counters.migrations, 0);
        assert_eq!(counters.local_edges_pct, 0.0);
        assert_eq!(counters.score_x1000, 0.0);
    }
}
