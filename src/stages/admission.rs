//! Admission / migration (§4.3, even supersteps ≥ 4).
//!
//! Each row's decision is a pure function of the persistent `load[]`/
//! `demand[]` snapshot taken at the start of the stage, so disjoint row
//! ranges can run through [`engine::parallel_rows`] with no cross-worker
//! coordination — unlike score-and-propose (`stages::propose`).

use rand::rngs::SmallRng;
use rand::Rng;

use crate::config::Config;
use crate::engine::{self, RowOutput};
use crate::graph::Graph;
use crate::la::update_probabilities;
use crate::message::{RowMessage, DEFAULT_SIGNAL};
use crate::vertex::VertexState;

/// `p_admit[i] = min(1, remain(i) / demand[i])`, or 0 if there's no
/// demand for `i` or no remaining capacity (§4.3 step 3).
pub fn compute_admission_probabilities(load: &[u64], demand: &[u64], capacity: f64) -> Vec<f64> {
    load.iter()
        .zip(demand.iter())
        .map(|(&l, &d)| {
            let remain = capacity - l as f64;
            if d == 0 || remain <= 0.0 {
                0.0
            } else {
                (remain / d as f64).min(1.0)
            }
        })
        .collect()
}

/// Runs admission/migration over every row. `inbox[row]` holds the
/// score-and-propose broadcasts delivered to `row` this superstep;
/// `admit_prob` is the stage-wide admission-probability snapshot from
/// [`compute_admission_probabilities`], computed once up front since it
/// depends only on the persistent `load`/`demand` aggregates, not on any
/// per-row mutation this stage makes.
#[allow(clippy::too_many_arguments)]
pub fn run(
    graph: &Graph,
    vertices: &mut [VertexState],
    rngs: &mut [SmallRng],
    outputs: &mut [RowOutput],
    inbox: &[Vec<RowMessage>],
    admit_prob: &[f64],
    superstep: i64,
    config: &Config,
    n_workers: usize,
) {
    let max_iterations = config.max_iterations;
    let alpha = config.alpha;
    let beta = config.beta;

    engine::parallel_rows(vertices, rngs, outputs, n_workers, |row, v, rng, out| {
        out.clear();

        // 1. Signal absorption.
        for msg in &inbox[row] {
            let destination = msg.partition as usize;
            if destination == v.new_partition as usize || admit_prob[destination] > 0.0 {
                v.la_signal[destination] += msg.signal;
            }
        }

        // 2. LA probability update, then reset the signal accumulator.
        update_probabilities(
            &mut v.la_probability,
            &mut v.la_signal,
            superstep,
            max_iterations,
            alpha,
            beta,
        );

        // 4. Decide migration (admission probabilities are the
        // precomputed `admit_prob` snapshot from step 3).
        let current = v.current_partition;
        let proposed = v.new_partition;
        if proposed == current {
            return;
        }
        let p = admit_prob[proposed as usize];
        if rng.gen::<f64>() < p {
            let n = v.num_directed_edges;
            out.load_delta.push((current as usize, -(n as i64)));
            out.load_delta.push((proposed as usize, n as i64));
            v.current_partition = proposed;
            out.migrated = true;
            for neighbor in graph.neighbors(row) {
                out.messages.push((
                    neighbor.row,
                    RowMessage::new(row, proposed as i16, DEFAULT_SIGNAL),
                ));
            }
        } else {
            v.new_partition = current;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::vertex_rng;

    fn two_vertex_graph() -> Graph {
        let mut g = Graph::new();
        g.add_directed_edge(0, 1, 1);
        g.add_directed_edge(1, 0, 1);
        g.reconcile();
        g
    }

    #[test]
    fn certain_admission_commits_the_move_and_broadcasts() {
        let g = two_vertex_graph();
        let config = Config {
            number_of_partitions: 2,
            ..Config::default()
        };
        let space = config.partition_space();
        let mut vertices = vec![VertexState::unseeded(space), VertexState::unseeded(space)];
        vertices[0].current_partition = 0;
        vertices[0].new_partition = 1;
        vertices[0].num_directed_edges = 1;
        vertices[1].current_partition = 1;
        vertices[1].new_partition = 1;
        vertices[1].num_directed_edges = 1;
        let mut rngs: Vec<SmallRng> = (0..2)
            .map(|row| vertex_rng(config.run_seed, g.vertex_id(row)))
            .collect();
        let mut outputs = vec![RowOutput::default(), RowOutput::default()];
        let inbox: Vec<Vec<RowMessage>> = vec![Vec::new(), Vec::new()];
        let admit_prob = vec![1.0; space];

        run(
            &g, &mut vertices, &mut rngs, &mut outputs, &inbox, &admit_prob, 4, &config, 2,
        );

        assert_eq!(vertices[0].current_partition, 1);
        assert!(outputs[0].migrated);
        assert_eq!(outputs[0].messages.len(), 1);
        assert_eq!(outputs[0].load_delta.len(), 2);
    }

    #[test]
    fn zero_admission_probability_reverts_the_proposal() {
        let g = two_vertex_graph();
        let config = Config {
            number_of_partitions: 2,
            ..Config::default()
        };
        let space = config.partition_space();
        let mut vertices = vec![VertexState::unseeded(space), VertexState::unseeded(space)];
        vertices[0].current_partition = 0;
        vertices[0].new_partition = 1;
        vertices[1].current_partition = 1;
        vertices[1].new_partition = 1;
        let mut rngs: Vec<SmallRng> = (0..2)
            .map(|row| vertex_rng(config.run_seed, g.vertex_id(row)))
            .collect();
        let mut outputs = vec![RowOutput::default(), RowOutput::default()];
        let inbox: Vec<Vec<RowMessage>> = vec![Vec::new(), Vec::new()];
        let admit_prob = vec![0.0; space];

        run(
            &g, &mut vertices, &mut rngs, &mut outputs, &inbox, &admit_prob, 4, &config, 2,
        );

        assert_eq!(vertices[0].current_partition, 0);
        assert_eq!(vertices[0].new_partition, 0);
        assert!(!outputs[0].migrated);
    }

    #[test]
    fn admission_probability_caps_at_one() {
        let p = compute_admission_probabilities(&[0], &[1], 100.0);
        assert_eq!(p[0], 1.0);
        let p = compute_admission_probabilities(&[90], &[1], 100.0);
        assert!((p[0] - 0.1).abs() < 1e-9);
        let p = compute_admission_probabilities(&[0], &[0], 100.0);
        assert_eq!(p[0], 0.0);
    }
}
