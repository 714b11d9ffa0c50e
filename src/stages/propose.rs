//! Score-and-propose (§4.2, odd supersteps ≥ 3).
//!
//! Runs sequentially over rows in order, by design: the "speculative
//! local load" heuristic (§9) requires each vertex to observe the
//! tentative load shift of every vertex processed earlier *in the same
//! stage*, which rules out the disjoint-row-range parallelism
//! `engine::parallel_rows` gives the admission/init/rescale stages.

use rand::rngs::SmallRng;

use crate::aggregators::Aggregates;
use crate::config::{BroadcastSelector, Config};
use crate::edge::NeighborLabels;
use crate::engine::RowOutput;
use crate::graph::Graph;
use crate::la::select_action;
use crate::message::RowMessage;
use crate::vertex::VertexState;

/// A per-stage copy of `load[]` that score-and-propose mutates as it
/// walks rows in order, so a later vertex sees an earlier vertex's
/// tentative move within the same stage. Never written back to
/// [`Aggregates`] — it's rebuilt from the persistent aggregate at the
/// start of every propose stage and discarded at the end.
pub struct SpeculativeLocalLoad {
    load: Vec<u64>,
}

impl SpeculativeLocalLoad {
    pub fn snapshot(aggregates: &Aggregates) -> Self {
        SpeculativeLocalLoad {
            load: aggregates.load_slice().to_vec(),
        }
    }

    pub fn get(&self, partition: usize) -> u64 {
        self.load[partition]
    }

    /// Optimistically moves `amount` of load from `from` to `to`.
    pub fn shift(&mut self, from: usize, to: usize, amount: u32) {
        let amount = amount as i64;
        self.load[from] = (self.load[from] as i64 - amount).max(0) as u64;
        self.load[to] += amount as u64;
    }
}

pub(crate) fn total_capacity(directed_edges: u64, additional_capacity: f64, space: usize) -> f64 {
    (directed_edges as f64 * (1.0 + additional_capacity) / space as f64).round()
}

/// Round up to 3 decimal places (§4.2 step 3, `ceil₃`).
fn ceil3(x: f64) -> f64 {
    (x * 1000.0).ceil() / 1000.0
}

fn argmax_first(scores: &[f64]) -> usize {
    let mut best_idx = 0;
    let mut best_val = f64::MIN;
    for (i, &v) in scores.iter().enumerate() {
        if v > best_val {
            best_val = v;
            best_idx = i;
        }
    }
    best_idx
}

/// Runs score-and-propose over every row in ascending order, mutating
/// `vertices`, `neighbor_labels`, and `local_load` in place and filling
/// `outputs[row]`. `inbox[row]` holds the admission-stage broadcasts
/// delivered to `row` this superstep (empty for a vertex with no
/// migrating neighbor, which also makes it "inactive" for step 7).
#[allow(clippy::too_many_arguments)]
pub fn run(
    graph: &Graph,
    vertices: &mut [VertexState],
    neighbor_labels: &mut [NeighborLabels],
    rngs: &mut [SmallRng],
    outputs: &mut [RowOutput],
    inbox: &[Vec<RowMessage>],
    local_load: &mut SpeculativeLocalLoad,
    directed_edges: u64,
    config: &Config,
) {
    let space = config.partition_space();
    let capacity = total_capacity(directed_edges, config.additional_capacity, space);

    for row in 0..vertices.len() {
        outputs[row].clear();

        // 1. Absorb migration messages from the previous admission stage.
        for msg in &inbox[row] {
            neighbor_labels[row].notify(msg.source_row, msg.partition as i32);
        }

        let current_partition = vertices[row].current_partition;
        debug_assert!(current_partition >= 0, "propose runs only after init");

        // 2. Tally neighborhood label frequency and locality.
        let mut partition_frequency = vec![0.0f64; space];
        let mut total_labels = 0.0f64;
        let mut local_edges = 0u64;
        let mut cut_edges = 0u64;
        for neighbor in graph.neighbors(row) {
            let label = neighbor_labels[row].get(neighbor.row);
            if label >= 0 {
                partition_frequency[label as usize] += neighbor.weight as f64;
                total_labels += neighbor.weight as f64;
            }
            if neighbor.directed_present {
                if label == current_partition {
                    local_edges += 1;
                } else {
                    cut_edges += 1;
                }
            }
        }

        // 3. Score every candidate partition. A zero `capacity` only
        // happens on a graph with no directed-present edges at all; treat
        // `pf[i]` the same way `lpa[i]` is treated when `totalLabels == 0`
        // below and default it to 0 rather than falling through to `lambda`.
        let mut pf = vec![0.0f64; space];
        if capacity > 0.0 {
            for (i, slot) in pf.iter_mut().enumerate() {
                let w = ceil3(local_load.get(i) as f64 / capacity);
                *slot = config.lambda - w;
            }
            if pf.iter().any(|&x| x < 0.0) {
                let min = pf.iter().cloned().fold(f64::INFINITY, f64::min);
                let max = pf.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                if (max - min).abs() > 1e-12 {
                    for x in pf.iter_mut() {
                        *x = (*x - min) / (max - min);
                    }
                } else {
                    for x in pf.iter_mut() {
                        *x = 0.0;
                    }
                }
            }
            let pf_sum: f64 = pf.iter().sum();
            if pf_sum > 0.0 {
                for x in pf.iter_mut() {
                    *x /= pf_sum;
                }
            } else {
                let uniform = 1.0 / space as f64;
                for x in pf.iter_mut() {
                    *x = uniform;
                }
            }
        }

        let mut lpa = vec![0.0f64; space];
        if total_labels > 0.0 {
            for (i, slot) in lpa.iter_mut().enumerate() {
                *slot = partition_frequency[i] / total_labels;
            }
        }

        let mut score = vec![0.0f64; space];
        for i in 0..space {
            score[i] = (pf[i] + lpa[i]) / 2.0;
        }

        // 4. Argmax, ties broken by first occurrence.
        let max_partition = argmax_first(&score);

        // 5. LA action selection chooses the proposed move.
        let new_partition = select_action(&vertices[row].la_probability, &mut rngs[row]);
        vertices[row].new_partition = new_partition as i32;

        // 6. Broadcast and self-reinforce.
        let broadcast_partition = match config.broadcast_selector {
            BroadcastSelector::ArgmaxScore => max_partition,
            BroadcastSelector::LaSample => new_partition,
        };
        vertices[row].la_signal[max_partition] += 1.0;
        for neighbor in graph.neighbors(row) {
            outputs[row].messages.push((
                neighbor.row,
                RowMessage::new(row, broadcast_partition as i16, 1.0),
            ));
        }

        // 7. Demand accounting + speculative local load shift.
        let active = !inbox[row].is_empty();
        if new_partition as i32 != current_partition && active {
            let n = vertices[row].num_directed_edges;
            outputs[row].demand_delta.push((new_partition, n as u64));
            local_load.shift(current_partition as usize, new_partition, n);
        }

        // 8. Aggregate this vertex's current-partition score into `state`.
        outputs[row].state = score[current_partition as usize];
        outputs[row].local_edges = local_edges;
        outputs[row].cut_edges = cut_edges;
    }
}
