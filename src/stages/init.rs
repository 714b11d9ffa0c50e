//! Initializer (§4.5): fresh or preserved partition labels, seeded LA
//! state. Runs at superstep 2 when `repartition == 0`.

use rand::rngs::SmallRng;
use rand::Rng;

use crate::config::Config;
use crate::engine::{self, RowOutput};
use crate::graph::Graph;
use crate::message::RowMessage;
use crate::vertex::{VertexState, UNASSIGNED};

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
    let space = config.partition_space();
    let k = config.number_of_partitions as usize;

    engine::parallel_rows(vertices, rngs, outputs, n_workers, |row, v, rng, out| {
        out.clear();
        let n_directed = graph.num_directed_edges(row);
        v.num_directed_edges = n_directed;
        if v.current_partition == UNASSIGNED {
            v.current_partition = rng.gen_range(0..k) as i32;
        }
        v.new_partition = v.current_partition;
        v.la_probability = vec![1.0 / space as f64; space];
        v.la_signal = vec![0.0; space];
        out.load_delta.push((v.current_partition as usize, n_directed as i64));
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

    fn tiny_graph() -> Graph {
        let mut g = Graph::new();
        g.add_directed_edge(0, 1, 1);
        g.add_directed_edge(1, 0, 1);
        g.add_directed_edge(1, 2, 1);
        g.add_directed_edge(2, 1, 1);
        g.reconcile();
        g
    }

    #[test]
    fn assigns_labels_in_range_and_seeds_uniform_la() {
        let graph = tiny_graph();
        let config = Config {
            number_of_partitions: 3,
            ..Config::default()
        };
        let mut vertices = vec![VertexState::unseeded(config.partition_space()); graph.num_vertices()];
        let mut rngs: Vec<SmallRng> = (0..graph.num_vertices())
            .map(|row| vertex_rng(config.run_seed, graph.vertex_id(row)))
            .collect();
        let mut outputs = vec![RowOutput::default(); graph.num_vertices()];
        run(&graph, &mut vertices, &mut rngs, &mut outputs, &config, 2);

        for v in &vertices {
            assert!(v.current_partition >= 0 && (v.current_partition as usize) < 3);
            assert_eq!(v.new_partition, v.current_partition);
            assert!((v.probability_mass() - 1.0).abs() < 1e-9);
        }
        for out in &outputs {
            assert!(!out.messages.is_empty());
        }
    }

    #[test]
    fn preserves_a_prior_label_instead_of_redrawing() {
        let graph = tiny_graph();
        let config = Config {
            number_of_partitions: 3,
            ..Config::default()
        };
        let mut vertices = vec![VertexState::unseeded(config.partition_space()); graph.num_vertices()];
        vertices[0].current_partition = 2;
        let mut rngs: Vec<SmallRng> = (0..graph.num_vertices())
            .map(|row| vertex_rng(config.run_seed, graph.vertex_id(row)))
            .collect();
        let mut outputs = vec![RowOutput::default(); graph.num_vertices()];
        run(&graph, &mut vertices, &mut rngs, &mut outputs, &config, 2);
        assert_eq!(vertices[0].current_partition, 2);
    }
}
