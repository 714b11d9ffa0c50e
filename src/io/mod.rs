//! Text I/O for vertex-value, edge-list, and partition-assignment formats
//! (§6). Out of scope for the core algorithm but carried as ambient
//! plumbing: plain field-splitting parsers with `snafu`-reported,
//! line-numbered errors.

use std::io::{BufRead, Write};

use crate::error::{InputParseSnafu, Result};
use crate::graph::Graph;
use crate::vertex::{VertexState, UNASSIGNED};

/// `SEP ∈ {0x01, TAB, SPACE}` (§6); a line splits on any run of these.
fn is_separator(c: char) -> bool {
    c == '\u{1}' || c == '\t' || c == ' '
}

fn fields(line: &str) -> Vec<&str> {
    line.split(is_separator).filter(|s| !s.is_empty()).collect()
}

fn parse_u64(s: &str, line_no: usize) -> Result<u64> {
    s.parse::<u64>()
        .map_err(|e| InputParseSnafu { line: line_no, reason: e.to_string() }.build())
}

fn parse_i32(s: &str, line_no: usize) -> Result<i32> {
    s.parse::<i32>()
        .map_err(|e| InputParseSnafu { line: line_no, reason: e.to_string() }.build())
}

fn parse_u8(s: &str, line_no: usize) -> Result<u8> {
    s.parse::<u8>()
        .map_err(|e| InputParseSnafu { line: line_no, reason: e.to_string() }.build())
}

/// Parses one `<vertexId>[SEP<priorPartition>]` line. A missing prior
/// partition maps to [`UNASSIGNED`] (fresh init).
fn parse_vertex_value_line(line: &str, line_no: usize) -> Result<(u64, i32)> {
    let parts = fields(line);
    let id_field = parts.first().ok_or_else(|| {
        InputParseSnafu {
            line: line_no,
            reason: "empty line".to_string(),
        }
        .build()
    })?;
    let id = parse_u64(id_field, line_no)?;
    let partition = match parts.get(1) {
        Some(s) => parse_i32(s, line_no)?,
        None => UNASSIGNED,
    };
    Ok((id, partition))
}

/// Parses one `<srcId>SEP<dstId>[SEP<weight>]` line.
fn parse_edge_line(line: &str, default_weight: u8, line_no: usize) -> Result<(u64, u64, u8)> {
    let parts = fields(line);
    if parts.len() < 2 {
        return Err(InputParseSnafu {
            line: line_no,
            reason: format!("expected at least 2 fields, got {}", parts.len()),
        }
        .build());
    }
    let src = parse_u64(parts[0], line_no)?;
    let dst = parse_u64(parts[1], line_no)?;
    let weight = match parts.get(2) {
        Some(s) => parse_u8(s, line_no)?,
        None => default_weight,
    };
    Ok((src, dst, weight))
}

/// Reads vertex-value lines into `(vertexId, priorPartition)` pairs.
pub fn read_vertex_values<R: BufRead>(reader: R) -> Result<Vec<(u64, i32)>> {
    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.unwrap_or_default();
        if line.trim().is_empty() {
            continue;
        }
        out.push(parse_vertex_value_line(&line, i + 1)?);
    }
    Ok(out)
}

/// Reads edge lines into `(src, dst, weight)` triples.
pub fn read_edges<R: BufRead>(reader: R, default_weight: u8) -> Result<Vec<(u64, u64, u8)>> {
    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.unwrap_or_default();
        if line.trim().is_empty() {
            continue;
        }
        out.push(parse_edge_line(&line, default_weight, i + 1)?);
    }
    Ok(out)
}

/// Builds a [`Graph`] and the row-indexed prior-partition vector that
/// [`crate::coordinator::Coordinator::new`] expects, from parsed edges
/// and (optional) vertex values.
pub fn build_graph(
    edges: &[(u64, u64, u8)],
    vertex_values: &[(u64, i32)],
) -> (Graph, Vec<i32>) {
    let mut graph = Graph::new();
    for &(src, dst, weight) in edges {
        graph.add_directed_edge(src, dst, weight);
    }
    for &(id, _) in vertex_values {
        graph.ensure_row(id);
    }
    let mut prior = vec![UNASSIGNED; graph.num_vertices()];
    for &(id, partition) in vertex_values {
        if let Some(row) = graph.row_of(id) {
            prior[row] = partition;
        }
    }
    (graph, prior)
}

/// Writes `<vertexId><delim><finalPartition>` lines, one per vertex.
pub fn write_assignments<W: Write>(
    mut writer: W,
    graph: &Graph,
    vertices: &[VertexState],
    delim: &str,
) -> std::io::Result<()> {
    for row in 0..graph.num_vertices() {
        writeln!(
            writer,
            "{}{}{}",
            graph.vertex_id(row),
            delim,
            vertices[row].current_partition
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn vertex_value_line_defaults_to_unassigned() {
        assert_eq!(parse_vertex_value_line("7", 1).unwrap(), (7, UNASSIGNED));
        assert_eq!(parse_vertex_value_line("7 3", 1).unwrap(), (7, 3));
        assert_eq!(parse_vertex_value_line("7\t3", 1).unwrap(), (7, 3));
    }

    #[test]
    fn edge_line_requires_two_fields() {
        assert!(parse_edge_line("1", 1, 1).is_err());
        assert_eq!(parse_edge_line("1 2", 1, 1).unwrap(), (1, 2, 1));
        assert_eq!(parse_edge_line("1 2 5", 1, 1).unwrap(), (1, 2, 5));
    }

    #[test]
    fn non_numeric_id_reports_the_line_number() {
        let err = parse_edge_line("abc 2", 1, 42).unwrap_err();
        assert!(err.to_string().contains("line 42"));
    }

    #[test]
    fn read_vertex_values_skips_blank_lines() {
        let input = "1 0\n\n2\n";
        let values = read_vertex_values(Cursor::new(input)).unwrap();
        assert_eq!(values, vec![(1, 0), (2, UNASSIGNED)]);
    }

    #[test]
    fn write_assignments_round_trips_the_delimiter() {
        let mut graph = Graph::new();
        graph.ensure_row(5);
        let mut vertices = vec![VertexState::unseeded(2)];
        vertices[0].current_partition = 1;
        let mut buf = Vec::new();
        write_assignments(&mut buf, &graph, &vertices, ",").unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "5,1\n");
    }

    #[test]
    fn build_graph_seeds_prior_partitions_by_row() {
        let edges = vec![(1, 2, 1)];
        let values = vec![(1, 3), (2, UNASSIGNED)];
        let (graph, prior) = build_graph(&edges, &values);
        let r1 = graph.row_of(1).unwrap();
        let r2 = graph.row_of(2).unwrap();
        assert_eq!(prior[r1], 3);
        assert_eq!(prior[r2], UNASSIGNED);
    }
}
