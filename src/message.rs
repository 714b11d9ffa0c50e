//! `PartitionMessage` and its 18-byte big-endian wire layout (§6).
//!
//! `serde`/`serde_json` cover the structured progress-log encoding (see
//! `coordinator`); the fixed binary layout below is pinned down
//! byte-for-byte, so it gets its own hand-written codec rather than
//! relying on a serde binary backend.

use serde::{Deserialize, Serialize};

/// The default reinforcement signal for messages built without one
/// (§9 open question 2: canonicalized to 0.0 in this port).
pub const DEFAULT_SIGNAL: f64 = 0.0;

pub const WIRE_LEN: usize = 18;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartitionMessage {
    pub source_id: i64,
    pub partition: i16,
    pub signal: f64,
}

impl PartitionMessage {
    pub fn new(source_id: i64, partition: i16, signal: f64) -> Self {
        PartitionMessage {
            source_id,
            partition,
            signal,
        }
    }

    /// A label-broadcast message with the canonical default signal.
    pub fn label_only(source_id: i64, partition: i16) -> Self {
        PartitionMessage::new(source_id, partition, DEFAULT_SIGNAL)
    }

    pub fn to_bytes(&self) -> [u8; WIRE_LEN] {
        let mut buf = [0u8; WIRE_LEN];
        buf[0..8].copy_from_slice(&self.source_id.to_be_bytes());
        buf[8..10].copy_from_slice(&self.partition.to_be_bytes());
        buf[10..18].copy_from_slice(&self.signal.to_be_bytes());
        buf
    }

    pub fn from_bytes(buf: &[u8; WIRE_LEN]) -> Self {
        let source_id = i64::from_be_bytes(buf[0..8].try_into().unwrap());
        let partition = i16::from_be_bytes(buf[8..10].try_into().unwrap());
        let signal = f64::from_be_bytes(buf[10..18].try_into().unwrap());
        PartitionMessage {
            source_id,
            partition,
            signal,
        }
    }
}

/// Persisted edge value: `int16 partition | int8 weight` (§6), 3 bytes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeValue {
    pub partition: i16,
    pub weight: u8,
}

pub const EDGE_VALUE_LEN: usize = 3;

impl EdgeValue {
    pub fn to_bytes(&self) -> [u8; EDGE_VALUE_LEN] {
        let mut buf = [0u8; EDGE_VALUE_LEN];
        buf[0..2].copy_from_slice(&self.partition.to_be_bytes());
        buf[2] = self.weight;
        buf
    }

    pub fn from_bytes(buf: &[u8; EDGE_VALUE_LEN]) -> Self {
        let partition = i16::from_be_bytes(buf[0..2].try_into().unwrap());
        EdgeValue {
            partition,
            weight: buf[2],
        }
    }
}

/// Persisted vertex value: the vertex's final/prior partition label.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VertexValue {
    pub vertex_id: u64,
    pub partition: i32,
}

/// The in-process engine's internal message representation: identical
/// fields to [`PartitionMessage`], but keyed by dense row index instead of
/// external vertex id, so stage code never pays for an id→row lookup on
/// the hot path. The wire format (`PartitionMessage`) is reserved for
/// actual serialization boundaries (logging, persistence, tests).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowMessage {
    pub source_row: usize,
    pub partition: i16,
    pub signal: f64,
}

impl RowMessage {
    pub fn new(source_row: usize, partition: i16, signal: f64) -> Self {
        RowMessage {
            source_row,
            partition,
            signal,
        }
    }
}
