//! Serializer
//!
//! Text renderings of a finished graph for download.

use crate::generator::Graph;
use serde::Serialize;
use std::fmt::Write;

/// Download format, selected by the `graphKind` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphFormat {
    /// Adjacency matrix: one row per node, space separated cells
    #[default]
    Matrix,
    /// `{nodes, weighted, edges}` document
    Json,
    /// Graphviz `graph G { ... }`
    Dot,
}

impl GraphFormat {
    /// Parse a `graphKind` value. Absent or unrecognized values select the matrix.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::to_ascii_lowercase).as_deref() {
            Some("json") => GraphFormat::Json,
            Some("dot") => GraphFormat::Dot,
            _ => GraphFormat::Matrix,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            GraphFormat::Matrix => "text/plain",
            GraphFormat::Json => "application/json",
            GraphFormat::Dot => "text/vnd.graphviz",
        }
    }

    /// File extension used for downloaded graphs
    pub fn extension(self) -> &'static str {
        match self {
            GraphFormat::Matrix => "txt",
            GraphFormat::Json => "json",
            GraphFormat::Dot => "dot",
        }
    }
}

pub fn render(graph: &Graph, format: GraphFormat) -> String {
    match format {
        GraphFormat::Matrix => render_matrix(graph),
        GraphFormat::Json => render_json(graph),
        GraphFormat::Dot => render_dot(graph),
    }
}

/// Row `i` holds `cell(i, j)` for every `j`: the weight if weighted, else 1 or 0.
pub fn render_matrix(graph: &Graph) -> String {
    let n = graph.node_count();
    let mut out = String::with_capacity(n * n * 2);
    for u in 0..n {
        for v in 0..n {
            if v > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{}", graph.cell(u, v));
        }
        out.push('\n');
    }
    out
}

#[derive(Serialize)]
struct EdgeList {
    nodes: usize,
    weighted: bool,
    edges: Vec<Vec<u64>>,
}

pub fn render_json(graph: &Graph) -> String {
    let edges = graph
        .edges()
        .map(|(u, v)| match graph.weight(u, v) {
            Some(w) => vec![u as u64, v as u64, u64::from(w)],
            None => vec![u as u64, v as u64],
        })
        .collect();
    let document = EdgeList {
        nodes: graph.node_count(),
        weighted: graph.is_weighted(),
        edges,
    };
    // Serializing plain integers and vectors cannot fail.
    serde_json::to_string(&document).unwrap_or_default()
}

pub fn render_dot(graph: &Graph) -> String {
    let mut out = String::from("graph G {\n");
    for u in 0..graph.node_count() {
        let _ = writeln!(out, "  {};", u);
    }
    for (u, v) in graph.edges() {
        match graph.weight(u, v) {
            Some(w) => {
                let _ = writeln!(out, "  {} -- {} [weight={}, label={}];", u, v, w, w);
            }
            None => {
                let _ = writeln!(out, "  {} -- {};", u, v);
            }
        }
    }
    out.push_str("}\n");
    out
}
