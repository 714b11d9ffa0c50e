//! Neighbor label cache (§3, REDESIGN FLAGS).
//!
//! The recorded label of each neighbor is logically a write-once-per-
//! migration cache, not a field a vertex program should mutate in place
//! while iterating edges. `NeighborLabels` is the explicit abstraction: the
//! only mutator is [`NeighborLabels::notify`].

use std::collections::HashMap;

use crate::vertex::UNASSIGNED;

#[derive(Clone, Debug, Default)]
pub struct NeighborLabels {
    labels: HashMap<usize, i32>,
}

impl NeighborLabels {
    pub fn new() -> Self {
        NeighborLabels {
            labels: HashMap::new(),
        }
    }

    /// The last label recorded for `neighbor_row`, or [`UNASSIGNED`] if no
    /// migration/initialization broadcast has been observed from it yet.
    pub fn get(&self, neighbor_row: usize) -> i32 {
        *self.labels.get(&neighbor_row).unwrap_or(&UNASSIGNED)
    }

    /// Records that `neighbor_row` migrated (or initialized) into
    /// `new_label`. The only legal mutation of the cache.
    pub fn notify(&mut self, neighbor_row: usize, new_label: i32) {
        self.labels.insert(neighbor_row, new_label);
    }
}
