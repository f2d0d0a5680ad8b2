use crate::TopologyGraph;
use anyhow::{anyhow, Result};
use petgraph::algo::connected_components;
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;

/// Summary statistics produced by `graph stats` (density/degree/connected components).
#[derive(Debug, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    /// Distinct bus pairs; lower than `edge_count` when parallel branches exist
    pub distinct_pairs: usize,
    pub connected_components: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub density: f64,
    pub is_radial: bool,
}

/// Island summary used in `graph islands`.
#[derive(Debug, Serialize)]
pub struct IslandSummary {
    pub island_id: usize,
    pub node_count: usize,
    /// Whether the traversal root lives in this island
    pub energized: bool,
}

#[derive(Debug, Serialize)]
pub struct NodeAssignment {
    pub node_index: usize,
    pub label: String,
    pub island_id: usize,
}

#[derive(Debug, Serialize)]
pub struct IslandAnalysis {
    pub islands: Vec<IslandSummary>,
    pub assignments: Vec<NodeAssignment>,
}

/// Calculates graph-level statistics such as density, degree distribution, and component counts.
pub fn graph_stats(topology: &TopologyGraph) -> Result<GraphStats> {
    let graph = &topology.graph;
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();
    let degrees: Vec<usize> = graph
        .node_indices()
        .map(|node| graph.edges(node).count())
        .collect();
    let min_degree = degrees.iter().copied().min().unwrap_or(0);
    let max_degree = degrees.iter().copied().max().unwrap_or(0);
    let avg_degree = if node_count == 0 {
        0.0
    } else {
        degrees.iter().sum::<usize>() as f64 / node_count as f64
    };
    let distinct_pairs = topology.edge_set().len();
    let density = if node_count < 2 {
        0.0
    } else {
        2.0 * distinct_pairs as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    };
    Ok(GraphStats {
        node_count,
        edge_count,
        distinct_pairs,
        connected_components: connected_components(graph),
        min_degree,
        avg_degree,
        max_degree,
        density,
        is_radial: topology.is_forest(),
    })
}

/// Labels connected components with a union-find over the branches and flags
/// the one holding the source bus. Island ids follow the lowest node index.
pub fn find_islands(topology: &TopologyGraph) -> Result<IslandAnalysis> {
    let graph = &topology.graph;
    let source = topology.source_bus().and_then(|name| topology.node(name));

    let mut sets = UnionFind::<usize>::new(graph.node_count());
    for edge in graph.edge_references() {
        sets.union(edge.source().index(), edge.target().index());
    }
    let labels = sets.into_labeling();

    let mut island_of_root: HashMap<usize, usize> = HashMap::new();
    let mut islands: Vec<IslandSummary> = Vec::new();
    let mut assignments = Vec::with_capacity(graph.node_count());
    for node in graph.node_indices() {
        let island_id = *island_of_root
            .entry(labels[node.index()])
            .or_insert_with(|| {
                islands.push(IslandSummary {
                    island_id: islands.len(),
                    node_count: 0,
                    energized: false,
                });
                islands.len() - 1
            });
        let island = &mut islands[island_id];
        island.node_count += 1;
        island.energized |= source == Some(node);
        assignments.push(NodeAssignment {
            node_index: node.index(),
            label: graph[node].name.clone(),
            island_id,
        });
    }
    Ok(IslandAnalysis {
        islands,
        assignments,
    })
}

/// Export the topology to a DOT string (Graphviz) so external tools can draw it.
pub fn export_graph(topology: &TopologyGraph, format: &str) -> Result<String> {
    match format.to_ascii_lowercase().as_str() {
        "graphviz" | "dot" => Ok(render_dot(topology)),
        other => Err(anyhow!("unsupported graph export format '{other}'")),
    }
}

fn render_dot(topology: &TopologyGraph) -> String {
    let graph = &topology.graph;
    let mut buffer = String::new();
    buffer.push_str("graph feeder {\n");
    for node in graph.node_indices() {
        let name = &graph[node].name;
        let label = sanitize_label(name);
        if topology.source_bus() == Some(name.as_str()) {
            buffer.push_str(&format!(
                "  n{} [label=\"{}\", shape=box];\n",
                node.index(),
                label
            ));
        } else {
            buffer.push_str(&format!("  n{} [label=\"{}\"];\n", node.index(), label));
        }
    }
    for edge in graph.edge_references() {
        let source = edge.source().index();
        let target = edge.target().index();
        let label = sanitize_label(&edge.weight().element);
        buffer.push_str(&format!("  n{source} -- n{target} [label=\"{label}\"];\n"));
    }
    buffer.push('}');
    buffer
}

fn sanitize_label(label: &str) -> String {
    label.replace('"', "\\\"")
}
