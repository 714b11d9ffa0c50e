//! Rescaler (§4.1, §4.5): adapts a prior partitioning to a changed
//! partition count. Runs at superstep 2 when `repartition != 0`.

use rand::Rng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::engine::{self, RowOutput};
use crate::graph::Graph;
use crate::message::RowMessage;
use crate::vertex::VertexState;

/// `rngs` is the coordinator's persistent, vertex-keyed RNG stream — the
/// same array every stage draws from across the whole run (§5).
pub fn run(
    graph: &Graph,
    vertices: &mut [VertexState],
    rngs: &mut [SmallRng],
    outputs: &mut [RowOutput],
    config: &Config,
    n_workers: usize,
) {
    debug_assert_ne!(config.repartition, 0, "rescale requires a non-zero delta");
    let k = config.number_of_partitions;
    let delta = config.repartition;
    let space = config.partition_space();

    engine::parallel_rows(vertices, rngs, outputs, n_workers, |row, v, rng, out| {
        out.clear();
        let n_directed = graph.num_directed_edges(row);
        v.num_directed_edges = n_directed;

        if delta < 0 {
            let survivors = space as i32;
            if v.current_partition >= survivors || v.current_partition < 0 {
                v.current_partition = rng.gen_range(0..survivors);
            }
        } else {
            let grow_probability = delta as f64 / space as f64;
            if v.current_partition < 0 {
                v.current_partition = rng.gen_range(0..k) as i32;
            }
            if rng.gen::<f64>() < grow_probability {
                v.current_partition = k as i32 + rng.gen_range(0..delta as i32);
            }
        }

        v.new_partition = v.current_partition;
        v.la_probability = vec![1.0 / space as f64; space];
        v.la_signal = vec![0.0; space];
        out.load_delta
            .push((v.current_partition as usize, n_directed as i64));
        for neighbor in graph.neighbors(row) {
            out.messages.push((
                neighbor.row,
                RowMessage::new(row, v.current_partition as i16, 0.0),
            ));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::vertex_rng;

    fn cycle_graph(n: u64) -> Graph {
        let mut g = Graph::new();
        for i in 0..n {
            g.add_directed_edge(i, (i + 1) % n, 1);
            g.add_directed_edge((i + 1) % n, i, 1);
        }
        g.reconcile();
        g
    }

    #[test]
    fn shrink_redistributes_removed_partition_among_survivors() {
        let graph = cycle_graph(12);
        let config = Config {
            number_of_partitions: 4,
            repartition: -1,
            ..Config::default()
        };
        let mut vertices: Vec<VertexState> = (0..12)
            .map(|i| {
                let mut v = VertexState::unseeded(3);
                v.current_partition = i % 4;
                v
            })
            .collect();
        let mut rngs: Vec<SmallRng> = (0..graph.num_vertices())
            .map(|row| vertex_rng(config.run_seed, graph.vertex_id(row)))
            .collect();
        let mut outputs = vec![RowOutput::default(); 12];
        run(&graph, &mut vertices, &mut rngs, &mut outputs, &config, 2);
        for v in &vertices {
            assert!(v.current_partition >= 0 && v.current_partition < 3);
        }
    }

    #[test]
    fn grow_only_moves_into_new_labels() {
        let graph = cycle_graph(12);
        let config = Config {
            number_of_partitions: 4,
            repartition: 2,
            ..Config::default()
        };
        let mut vertices: Vec<VertexState> = (0..12)
            .map(|i| {
                let mut v = VertexState::unseeded(6);
                v.current_partition = i % 4;
                v
            })
            .collect();
        let mut rngs: Vec<SmallRng> = (0..graph.num_vertices())
            .map(|row| vertex_rng(config.run_seed, graph.vertex_id(row)))
            .collect();
        let mut outputs = vec![RowOutput::default(); 12];
        run(&graph, &mut vertices, &mut rngs, &mut outputs, &config, 2);
        for v in &vertices {
            assert!(v.current_partition >= 0 && v.current_partition < 6);
        }
    }
}
