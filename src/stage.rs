//! Tagged superstep-stage dispatch (§4.1, REDESIGN FLAGS: "dynamic-dispatch
//! stages → tagged stage enum"). Matches on superstep parity rather than
//! a runtime vtable lookup, so the five computation classes per superstep
//! are an exhaustively-checked enum instead of a dynamic dispatch.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// s=0: every vertex announces its id to its neighbors.
    Propagate,
    /// s=1: reconcile the adjacency into a symmetric graph.
    Reconcile,
    /// s=2: fresh initialization or Δ-driven rescale.
    InitializeOrRescale,
    /// odd s≥3: score-and-propose.
    ComputeNewPartition,
    /// even s≥3: admission/migration + LA update.
    ComputeMigration,
}

impl Stage {
    pub fn for_superstep(superstep: i64) -> Stage {
        match superstep {
            0 => Stage::Propagate,
            1 => Stage::Reconcile,
            2 => Stage::InitializeOrRescale,
            s if s % 2 == 1 => Stage::ComputeNewPartition,
            _ => Stage::ComputeMigration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_table_matches_the_superstep_schedule() {
        assert_eq!(Stage::for_superstep(0), Stage::Propagate);
        assert_eq!(Stage::for_superstep(1), Stage::Reconcile);
        assert_eq!(Stage::for_superstep(2), Stage::InitializeOrRescale);
        assert_eq!(Stage::for_superstep(3), Stage::ComputeNewPartition);
        assert_eq!(Stage::for_superstep(4), Stage::ComputeMigration);
        assert_eq!(Stage::for_superstep(5), Stage::ComputeNewPartition);
        assert_eq!(Stage::for_superstep(290), Stage::ComputeMigration);
    }
}
