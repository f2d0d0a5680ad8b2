//! # feeder-extract: per-phase state and topology from a solved circuit
//!
//! Distribution solvers expose their solution through a single "active bus /
//! active element" cursor. This crate wraps that protocol in borrow-scoped
//! views and builds the usual feeder analyses on top:
//!
//! | Step | Entry point | Output |
//! |------|-------------|--------|
//! | Cursor | [`ActiveCursor`] | [`BusView`] / [`ElementView`] |
//! | Quantities | [`extract`] | per-unit voltage, distance, kW/kVAr |
//! | Topology | [`build_topology_graph`] | [`feeder_core::TopologyGraph`] |
//! | Aggregates | [`collect_phase_aggregates`] | bus-keyed distance/voltage/position maps |
//!
//! [`SnapshotSolver`] is the bundled [`CircuitSolver`], backed by a JSON dump
//! of one power-flow solution.
//!
//! ## Example
//!
//! ```
//! use feeder_core::Phase;
//! use feeder_extract::{build_topology_graph, collect_phase_aggregates, ActiveCursor, CollectPolicy, SnapshotSolver};
//!
//! let json = r#"{
//!     "buses": [
//!         {"name": "src", "nodes": [1], "pu_voltage": [1.0, 0.0], "kv_base": 2.4},
//!         {"name": "b1", "nodes": [1], "pu_voltage": [0.97, 0.0], "kv_base": 2.4, "distance": 0.4}
//!     ],
//!     "elements": [{"name": "Line.l1", "bus_names": ["src.1", "b1.1"]}]
//! }"#;
//! let mut solver = SnapshotSolver::from_json_str(json).unwrap();
//! let mut cursor = ActiveCursor::new(&mut solver);
//!
//! let topo = build_topology_graph(&mut cursor).unwrap();
//! assert_eq!(topo.source_bus(), Some("src"));
//!
//! let agg = collect_phase_aggregates(&mut cursor, Phase::A, CollectPolicy::Abort).unwrap();
//! assert_eq!(agg.distance["b1"], 0.4);
//! ```

pub mod collect;
pub mod cursor;
pub mod extract;
pub mod snapshot;
pub mod solver;
pub mod topology;

pub use collect::{
    collect_bus_coordinates, collect_class_powers, collect_phase_aggregates, voltage_profile,
    voltage_tree, CollectPolicy, PhaseAggregates, ProfilePoint, VoltageTree,
};
pub use cursor::{ActiveCursor, BusView, ElementView};
pub use snapshot::{Snapshot, SnapshotBus, SnapshotElement, SnapshotSolver};
pub use solver::{element_class, CircuitSolver, LineTerminals};
pub use topology::{build_phase_line_graph, build_topology_graph};
