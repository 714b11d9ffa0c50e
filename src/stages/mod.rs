//! Per-superstep computation stages (§4.1–§4.3, §4.5). Dispatch between
//! them lives in [`crate::stage::Stage`]; the reconcile stage (§4.7) is
//! folded into [`crate::graph::Graph::reconcile`] since it's a pure graph
//! transform with no per-vertex LA/aggregate bookkeeping of its own.

pub mod admission;
pub mod init;
pub mod propose;
pub mod rescale;
