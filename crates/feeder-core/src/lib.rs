//! # feeder-core: distribution feeder data model
//!
//! Shared types for pulling per-phase state out of a solved distribution
//! circuit and arranging it as a graph.
//!
//! ## Design
//!
//! Distribution feeders are unbalanced: a lateral may carry one or two of the
//! three phases, so nothing here assumes a bus has all of them. Phase presence
//! is always an explicit `Option`/membership check, never a zero value.
//!
//! - [`TopologyGraph`] - undirected multigraph of buses (petgraph `Graph<BusNode, BranchEdge, Undirected>`)
//! - [`Phase`] / [`BusRef`] - node-phase numbering and `bus.1.2` terminal identifiers
//! - [`ComplexPower`], [`PhasePower`], [`PhaseVoltage`] - per-phase element quantities
//! - [`units`] - kW/kVAr/kV/pu newtypes
//!
//! ## Quick Start
//!
//! ```
//! use feeder_core::*;
//!
//! let mut topo = TopologyGraph::new();
//! let a = BusRef::parse("sourcebus.1.2.3");
//! let b = BusRef::parse("650.1.2.3");
//! topo.set_source_bus(&a.bus);
//! topo.add_branch(&a.bus, &b.bus, "Line.650");
//!
//! assert_eq!(topo.branch_count(), 1);
//! assert!(b.carries(Phase::B));
//! ```

use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod graph_utils;
pub mod topology;
pub mod units;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{FeederError, FeederResult};
pub use graph_utils::*;
pub use petgraph::graph::NodeIndex;
pub use topology::{BranchEdge, BusNode, TopologyGraph};
pub use units::{KilovoltAmperes, Kilovars, Kilovolts, Kilowatts, PerUnit, Volts};

/// One of the three conductors, numbered the way solvers number bus nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    A,
    B,
    C,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::A, Phase::B, Phase::C];

    /// Solver node number (1, 2 or 3).
    #[inline]
    pub fn node(self) -> u32 {
        match self {
            Phase::A => 1,
            Phase::B => 2,
            Phase::C => 3,
        }
    }

    /// Maps a node number back to a phase; ground (0) and higher nodes are `None`.
    pub fn from_node(node: u32) -> Option<Self> {
        match node {
            1 => Some(Phase::A),
            2 => Some(Phase::B),
            3 => Some(Phase::C),
            _ => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Phase::A => "a",
            Phase::B => "b",
            Phase::C => "c",
        };
        write!(f, "{label}")
    }
}

impl std::str::FromStr for Phase {
    type Err = FeederError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "a" => Ok(Phase::A),
            "2" | "b" => Ok(Phase::B),
            "3" | "c" => Ok(Phase::C),
            other => Err(FeederError::Config(format!(
                "unknown phase '{other}' (expected 1, 2, 3 or a, b, c)"
            ))),
        }
    }
}

/// Strips a node-phase suffix: `"bus1.1.2"` becomes `"bus1"`.
#[inline]
pub fn strip_node_suffix(name: &str) -> &str {
    match name.split_once('.') {
        Some((bus, _)) => bus,
        None => name,
    }
}

/// A terminal identifier as reported for circuit elements, `bus[.node]*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusRef {
    pub bus: String,
    /// Explicit node list; empty means the solver default (nodes 1, 2, 3)
    pub nodes: Vec<u32>,
}

impl BusRef {
    /// Parses `bus.1.2`; node fields that are not integers are ignored.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split('.');
        let bus = parts.next().unwrap_or_default().to_string();
        let nodes = parts.filter_map(|p| p.trim().parse::<u32>().ok()).collect();
        Self { bus, nodes }
    }

    /// Whether this terminal connects to `phase`.
    pub fn carries(&self, phase: Phase) -> bool {
        self.nodes.is_empty() || self.nodes.contains(&phase.node())
    }

    /// Renders the identifier back with an explicit node list.
    pub fn with_nodes(&self, nodes: &[u32]) -> String {
        let mut out = self.bus.clone();
        for node in nodes {
            out.push('.');
            out.push_str(&node.to_string());
        }
        out
    }
}

/// Schematic or geographic bus position; (0, 0) when the model has none.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Complex power of one conductor: real part in kW, imaginary in kVAr.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComplexPower {
    pub real: Kilowatts,
    pub imag: Kilovars,
}

impl ComplexPower {
    pub fn new(real: Kilowatts, imag: Kilovars) -> Self {
        Self { real, imag }
    }

    /// Builds from a solver sample pair in W / var.
    pub fn from_raw(watts: f64, vars: f64) -> Self {
        Self {
            real: Kilowatts::from_watts(watts),
            imag: Kilovars::from_vars(vars),
        }
    }

    pub fn apparent(&self) -> KilovoltAmperes {
        self.real.apparent_power(self.imag)
    }
}

/// Three-phase power of one circuit element, terminal order a, b, c.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhasePower {
    pub a: ComplexPower,
    pub b: ComplexPower,
    pub c: ComplexPower,
}

impl PhasePower {
    /// Takes the first three conductors; `None` when fewer are given.
    pub fn from_conductors(conductors: &[ComplexPower]) -> Option<Self> {
        match conductors {
            [a, b, c, ..] => Some(Self {
                a: *a,
                b: *b,
                c: *c,
            }),
            _ => None,
        }
    }

    pub fn get(&self, phase: Phase) -> ComplexPower {
        match phase {
            Phase::A => self.a,
            Phase::B => self.b,
            Phase::C => self.c,
        }
    }

    pub fn total(&self) -> ComplexPower {
        ComplexPower {
            real: self.a.real + self.b.real + self.c.real,
            imag: self.a.imag + self.b.imag + self.c.imag,
        }
    }
}

/// Per-unit voltage magnitude on each of the three phases.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhaseVoltage {
    pub a: PerUnit,
    pub b: PerUnit,
    pub c: PerUnit,
}

impl PhaseVoltage {
    pub fn get(&self, phase: Phase) -> PerUnit {
        match phase {
            Phase::A => self.a,
            Phase::B => self.b,
            Phase::C => self.c,
        }
    }
}
