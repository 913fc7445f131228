//! # Rendering
//!
//! Human-readable views of a graph for debugging pipelines: a node listing, a plain
//! text relation matrix, an HTML matrix, and Graphviz DOT. None of these are meant to
//! be parsed back.

use crate::constraint::ConstraintSource;
use crate::graph::TemporalGraph;
use crate::model::Node;
use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Order ids by alphabetic prefix, then by numeric suffix, so `ei2` sorts before
/// `ei10`.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    fn split(id: &str) -> (&str, Option<u64>) {
        let digits = id.len() - id.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        let (prefix, suffix) = id.split_at(id.len() - digits);
        (prefix, suffix.parse().ok())
    }
    let (prefix_a, num_a) = split(a);
    let (prefix_b, num_b) = split(b);
    prefix_a
        .cmp(prefix_b)
        .then(num_a.cmp(&num_b))
        .then_with(|| a.cmp(b))
}

fn sorted_nodes(graph: &TemporalGraph) -> Vec<&Node> {
    let mut nodes: Vec<&Node> = graph.nodes().collect();
    nodes.sort_by(|a, b| compare_ids(&a.id, &b.id));
    nodes
}

/// One line per node with the neighbors it has relations from and to.
pub fn pp_nodes(graph: &TemporalGraph) -> String {
    let matrix = graph.matrix();
    let mut out = String::new();
    for node in sorted_nodes(graph) {
        let ids = |edges: Vec<crate::model::NodeId>| -> String {
            let mut ids: Vec<&str> = edges
                .into_iter()
                .filter_map(|index| graph.node_at(index))
                .map(|n| n.id.as_str())
                .collect();
            ids.sort_by(|a, b| compare_ids(a, b));
            ids.join(" ")
        };
        let incoming = ids(matrix.edges_in(node.index).map(|e| e.node1).collect());
        let outgoing = ids(matrix.edges_out(node.index).map(|e| e.node2).collect());
        let _ = writeln!(out, "<Node {}>", node.id);
        let _ = writeln!(out, "    in:  {{{}}}", incoming);
        let _ = writeln!(out, "    out: {{{}}}", outgoing);
    }
    out
}

/// Fixed-width text matrix; row is the first node, column the second.
pub fn matrix_table(graph: &TemporalGraph) -> String {
    let nodes = sorted_nodes(graph);
    let matrix = graph.matrix();
    let cells: Vec<Vec<String>> = nodes
        .iter()
        .map(|row| {
            nodes
                .iter()
                .map(|col| {
                    if row.index == col.index {
                        return "-".to_string();
                    }
                    matrix
                        .get(row.index, col.index)
                        .relset
                        .map(|relset| relset.to_string())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    let width = nodes
        .iter()
        .map(|n| n.id.len())
        .chain(cells.iter().flatten().map(String::len))
        .max()
        .unwrap_or(1)
        .max(1);

    let mut out = String::new();
    let _ = write!(out, "{:width$}", "", width = width);
    for node in &nodes {
        let _ = write!(out, " | {:width$}", node.id, width = width);
    }
    out.push('\n');
    for (node, row) in nodes.iter().zip(&cells) {
        let _ = write!(out, "{:width$}", node.id, width = width);
        for cell in row {
            let _ = write!(out, " | {:width$}", cell, width = width);
        }
        out.push('\n');
    }
    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace(' ', "&nbsp;")
}

/// HTML table of the relation matrix, cells coloured by constraint source.
pub fn to_html(graph: &TemporalGraph) -> String {
    let nodes = sorted_nodes(graph);
    let matrix = graph.matrix();
    let mut html = String::new();

    html.push_str("<html>\n<head>\n<style type=\"text/css\">\n<!--\n");
    html.push_str("body { font-size: 14pt }\n");
    html.push_str("table { font-size: 14pt }\n");
    html.push_str(".user { background-color: lightblue }\n");
    html.push_str(".closure { background-color: pink }\n");
    html.push_str(".inverted { background-color: lightyellow }\n");
    html.push_str(".nocell { background-color: lightgrey }\n");
    html.push_str("-->\n</style>\n</head>\n<body>\n\n");
    html.push_str("<table cellpadding=3 cellspacing=0 border=1>\n\n<tr>\n  <td>&nbsp;\n");
    for node in &nodes {
        let _ = writeln!(html, "  <td>{}", escape_html(&node.id));
    }

    for row in &nodes {
        html.push_str("\n<tr align=center>\n");
        let _ = writeln!(html, "  <td align=left>{}", escape_html(&row.id));
        for col in &nodes {
            if row.index == col.index {
                html.push_str("  <td width=25pt class=\"nocell\">&nbsp;\n");
                continue;
            }
            let edge = matrix.get(row.index, col.index);
            let class = edge
                .constraint
                .and_then(|id| graph.constraint(id))
                .map(|c| match c.source {
                    ConstraintSource::User => " class=\"user\"",
                    ConstraintSource::Closure => " class=\"closure\"",
                    ConstraintSource::ClosureInverted => " class=\"inverted\"",
                })
                .unwrap_or("");
            let rel = edge
                .relset
                .map(|relset| escape_html(&relset.to_string()))
                .unwrap_or_else(|| "&nbsp;".to_string());
            let _ = writeln!(html, "  <td width=25pt{}>{}", class, rel);
        }
    }
    html.push_str("</table>\n</body>\n</html>\n");
    html
}

/// Write [`to_html`] to `path`, creating parent directories.
pub fn write_html(graph: &TemporalGraph, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, to_html(graph))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Export the graph to DOT format for visualization
pub fn export_to_dot(graph: &TemporalGraph) -> String {
    let mut dot = String::new();

    dot.push_str("digraph TemporalGraph {\n");
    dot.push_str("  rankdir=LR;\n");
    dot.push_str("  node [style=filled];\n");
    dot.push_str("  edge [fontsize=10];\n\n");

    for node in sorted_nodes(graph) {
        let (shape, color) = if node.is_event() {
            ("ellipse", "lightblue")
        } else {
            ("box", "lightyellow")
        };
        let _ = writeln!(
            dot,
            "  \"{}\" [shape={}, fillcolor={}];",
            node.id, shape, color
        );
    }
    dot.push('\n');

    for edge in graph.get_edges() {
        let (Some(from), Some(to), Some(relset)) = (
            graph.node_at(edge.node1),
            graph.node_at(edge.node2),
            edge.relset,
        ) else {
            continue;
        };
        let style = match edge.constraint.and_then(|id| graph.constraint(id)) {
            Some(c) if c.source == ConstraintSource::User => "solid",
            _ => "dashed",
        };
        let label = relset
            .timeml_label()
            .map(str::to_string)
            .unwrap_or_else(|| relset.to_string());
        let _ = writeln!(
            dot,
            "  \"{}\" -> \"{}\" [label=\"{}\", style={}];",
            from.id, to.id, label, style
        );
    }

    dot.push_str("}\n");
    dot
}
