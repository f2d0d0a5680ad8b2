//! Bus connectivity graph.
//!
//! Nodes are buses keyed by name; edges are topological branches (lines,
//! transformers, switches) keyed by the element that produced them. The graph
//! is an undirected **multigraph**: two lines strung between the same pair of
//! buses stay two edges, and [`TopologyGraph::edge_set`] gives the collapsed
//! unordered-pair view when simple-graph semantics are wanted.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::connected_components;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::{Graph, Undirected};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusNode {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchEdge {
    /// Full element name, e.g. `Line.650632`
    pub element: String,
}

#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    pub graph: Graph<BusNode, BranchEdge, Undirected>,
    index: HashMap<String, NodeIndex>,
    source_bus: Option<String>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self {
            graph: Graph::new_undirected(),
            index: HashMap::new(),
            source_bus: None,
        }
    }

    /// Returns the node for `name`, inserting it on first sight.
    pub fn ensure_bus(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(BusNode {
            name: name.to_string(),
        });
        self.index.insert(name.to_string(), idx);
        idx
    }

    /// Inserts one branch between two buses.
    ///
    /// Both buses are created if needed. A branch whose terminals sit on the
    /// same bus (a grounded source, a shunt) only contributes the node and
    /// `None` is returned.
    pub fn add_branch(&mut self, from: &str, to: &str, element: &str) -> Option<EdgeIndex> {
        let a = self.ensure_bus(from);
        let b = self.ensure_bus(to);
        if a == b {
            return None;
        }
        Some(self.graph.add_edge(
            a,
            b,
            BranchEdge {
                element: element.to_string(),
            },
        ))
    }

    /// Marks the traversal root. The bus is inserted if it is not present yet.
    pub fn set_source_bus(&mut self, name: &str) {
        self.ensure_bus(name);
        self.source_bus = Some(name.to_string());
    }

    pub fn source_bus(&self) -> Option<&str> {
        self.source_bus.as_deref()
    }

    pub fn node(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    pub fn contains_bus(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn bus_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn branch_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn bus_names(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(|n| n.name.as_str())
    }

    /// Collapsed edge view: each connected bus pair once, as a sorted tuple.
    pub fn edge_set(&self) -> BTreeSet<(String, String)> {
        self.graph
            .edge_references()
            .map(|edge| {
                let a = &self.graph[edge.source()].name;
                let b = &self.graph[edge.target()].name;
                if a <= b {
                    (a.clone(), b.clone())
                } else {
                    (b.clone(), a.clone())
                }
            })
            .collect()
    }

    /// Number of branches connecting `a` and `b` (parallel branches counted).
    pub fn branch_multiplicity(&self, a: &str, b: &str) -> usize {
        match (self.node(a), self.node(b)) {
            (Some(a), Some(b)) => self.graph.edges_connecting(a, b).count(),
            _ => 0,
        }
    }

    /// Sorted neighbour names of a bus, empty for an unknown bus.
    pub fn neighbors(&self, name: &str) -> Vec<&str> {
        let Some(idx) = self.node(name) else {
            return Vec::new();
        };
        let mut names: Vec<&str> = self
            .graph
            .neighbors(idx)
            .map(|n| self.graph[n].name.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// True when the graph has no cycles (parallel branches count as one).
    pub fn is_forest(&self) -> bool {
        let components = connected_components(&self.graph);
        self.edge_set().len() + components == self.bus_count()
    }
}
