//! Directed multigraph storage for the partitioner, backed by
//! [`petgraph::graph::DiGraph`].
//!
//! Vertices are addressed externally by an arbitrary `u64` id and
//! internally by a dense `row` index, so per-vertex state (`VertexState`,
//! LA vectors) can live in flat, row-indexed arenas rather than per-id
//! maps. `petgraph`'s `NodeIndex` is already a dense, insertion-ordered
//! `usize` as long as nodes are never removed, which this crate never
//! does, so `row == NodeIndex::index()` throughout. Adjacency starts out
//! as whatever the raw edge list encodes (possibly one-directional) and
//! is only made symmetric by [`Graph::reconcile`], the superstep-1 edge
//! reconciler (§4.7).

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

/// One adjacency-list entry: the neighbor's row, the edge weight, and
/// whether this direction of the edge was present in the raw input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighbor {
    pub row: usize,
    pub weight: u8,
    pub directed_present: bool,
}

/// A directed multigraph with dense row-indexed vertices.
///
/// Multi-edges between the same ordered pair collapse into a single
/// [`Neighbor`] entry (its weight is the last one seen), matching the
/// spec's per-neighbor edge state rather than `petgraph`'s native
/// multigraph semantics.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    ids: Vec<u64>,
    index: HashMap<u64, NodeIndex>,
    inner: DiGraph<u64, Neighbor>,
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            ids: Vec::new(),
            index: HashMap::new(),
            inner: DiGraph::new(),
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.inner.node_count()
    }

    pub fn vertex_id(&self, row: usize) -> u64 {
        self.ids[row]
    }

    pub fn row_of(&self, id: u64) -> Option<usize> {
        self.index.get(&id).map(|n| n.index())
    }

    /// Returns the row for `id`, creating a new (edge-less) vertex if needed.
    pub fn ensure_row(&mut self, id: u64) -> usize {
        if let Some(&n) = self.index.get(&id) {
            return n.index();
        }
        let n = self.inner.add_node(id);
        self.ids.push(id);
        self.index.insert(id, n);
        n.index()
    }

    /// Records a directed edge `src -> dst` as present in the raw input.
    /// Does not touch the reverse direction; see [`Graph::reconcile`].
    pub fn add_directed_edge(&mut self, src: u64, dst: u64, weight: u8) {
        let src_row = NodeIndex::new(self.ensure_row(src));
        let dst_row = NodeIndex::new(self.ensure_row(dst));
        let neighbor = Neighbor {
            row: dst_row.index(),
            weight,
            directed_present: true,
        };
        match self.inner.find_edge(src_row, dst_row) {
            Some(edge) => self.inner[edge] = neighbor,
            None => {
                self.inner.add_edge(src_row, dst_row, neighbor);
            }
        }
    }

    pub fn neighbors(&self, row: usize) -> impl Iterator<Item = &Neighbor> {
        self.inner
            .edges(NodeIndex::new(row))
            .map(|edge| edge.weight())
    }

    pub fn degree(&self, row: usize) -> usize {
        self.inner.edges(NodeIndex::new(row)).count()
    }

    pub fn neighbor_weight(&self, row: usize, neighbor_row: usize) -> Option<u8> {
        self.inner
            .find_edge(NodeIndex::new(row), NodeIndex::new(neighbor_row))
            .map(|edge| self.inner[edge].weight)
    }

    /// Symmetrizes the adjacency: for every recorded edge `u -> v` with no
    /// matching `v -> u`, add `v -> u` with the reciprocal's weight and
    /// `directed_present = false`. Edges that already exist in both
    /// directions are untouched (both remain whatever they already were,
    /// normally `true` on both sides since both came from the raw input).
    ///
    /// Running this twice is a no-op: the second pass finds no asymmetric
    /// pairs left to fix.
    pub fn reconcile(&mut self) {
        let mut missing_reverse: Vec<(NodeIndex, NodeIndex, u8)> = Vec::new();
        for node in self.inner.node_indices() {
            for edge in self.inner.edges(node) {
                let target = edge.target();
                if self.inner.find_edge(target, node).is_none() {
                    missing_reverse.push((target, node, edge.weight().weight));
                }
            }
        }
        for (row, back_to, weight) in missing_reverse {
            if self.inner.find_edge(row, back_to).is_none() {
                self.inner.add_edge(
                    row,
                    back_to,
                    Neighbor {
                        row: back_to.index(),
                        weight,
                        directed_present: false,
                    },
                );
            }
        }
    }

    /// Number of incident edges at `row` that were directed-present
    /// (present in the raw input, as opposed to added by reconciliation).
    pub fn num_directed_edges(&self, row: usize) -> u32 {
        self.inner
            .edges(NodeIndex::new(row))
            .filter(|edge| edge.weight().directed_present)
            .count() as u32
    }

    /// Total directed-present edges across the whole graph (the
    /// `directedEdges` aggregate).
    pub fn total_directed_edges(&self) -> u64 {
        (0..self.num_vertices())
            .map(|row| self.num_directed_edges(row) as u64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconcile_adds_reverse_edge_with_absent_flag() {
        let mut g = Graph::new();
        g.add_directed_edge(0, 1, 1);
        g.reconcile();
        let r0 = g.row_of(0).unwrap();
        let r1 = g.row_of(1).unwrap();
        assert!(g.neighbors(r0).any(|n| n.row == r1 && n.directed_present));
        assert!(g.neighbors(r1).any(|n| n.row == r0 && !n.directed_present));
    }

    #[test]
    fn reconcile_is_idempotent() {
        let mut g = Graph::new();
        g.add_directed_edge(0, 1, 1);
        g.add_directed_edge(1, 0, 1);
        g.reconcile();
        let before: Vec<_> = (0..g.num_vertices())
            .map(|r| {
                let mut v: Vec<_> = g.neighbors(r).copied().collect();
                v.sort_by_key(|n| n.row);
                v
            })
            .collect();
        g.reconcile();
        let after: Vec<_> = (0..g.num_vertices())
            .map(|r| {
                let mut v: Vec<_> = g.neighbors(r).copied().collect();
                v.sort_by_key(|n| n.row);
                v
            })
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn bidirectional_input_keeps_both_directed_present() {
        let mut g = Graph::new();
        g.add_directed_edge(0, 1, 1);
        g.add_directed_edge(1, 0, 1);
        g.reconcile();
        let r0 = g.row_of(0).unwrap();
        let r1 = g.row_of(1).unwrap();
        assert_eq!(g.num_directed_edges(r0), 1);
        assert_eq!(g.num_directed_edges(r1), 1);
        assert_eq!(g.total_directed_edges(), 2);
    }
}
