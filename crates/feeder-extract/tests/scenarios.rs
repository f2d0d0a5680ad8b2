//! End-to-end extraction against small solved circuits.

use std::collections::BTreeSet;
use std::path::PathBuf;

use feeder_core::{strip_node_suffix, BusRef, FeederError, Kilovars, Kilowatts, PerUnit, Phase};
use feeder_extract::extract::{bus_phase_voltage_pu, element_phase_power, element_voltage_pu};
use feeder_extract::{
    build_phase_line_graph, build_topology_graph, collect_phase_aggregates, voltage_tree,
    ActiveCursor, CircuitSolver, CollectPolicy, SnapshotSolver,
};

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join(relative)
}

fn ieee13() -> SnapshotSolver {
    SnapshotSolver::load(&repo_path("test_data/feeders/ieee13_lite.json")).unwrap()
}

const TWO_BUS: &str = r#"{
    "buses": [
        {"name": "bus1", "nodes": [1], "pu_voltage": [1.0, 0.0], "kv_base": 7.2, "distance": 0.0},
        {"name": "bus2", "nodes": [1], "pu_voltage": [0.6, 0.8], "kv_base": 7.2, "distance": 1.5}
    ],
    "elements": [{"name": "Line.l1", "bus_names": ["bus1.1", "bus2.1"]}]
}"#;

#[test]
fn two_bus_single_phase_circuit() {
    let mut solver = SnapshotSolver::from_json_str(TWO_BUS).unwrap();
    let mut cursor = ActiveCursor::new(&mut solver);

    for bus in ["bus1", "bus2"] {
        let v = bus_phase_voltage_pu(&mut cursor, bus, Phase::A).unwrap().unwrap();
        assert!((v.value() - 1.0).abs() < 1e-12, "{bus}: {v}");
        assert_eq!(bus_phase_voltage_pu(&mut cursor, bus, Phase::B).unwrap(), None);
    }

    let topo = build_topology_graph(&mut cursor).unwrap();
    assert_eq!(topo.branch_count(), 1);
    assert_eq!(
        topo.edge_set(),
        BTreeSet::from([("bus1".to_string(), "bus2".to_string())])
    );
}

#[test]
fn zero_branch_circuit_still_collects() {
    let json = r#"{"buses": [{"name": "only", "nodes": [1, 2, 3],
        "pu_voltage": [1, 0, 1, 0, 1, 0], "kv_base": 0.24}]}"#;
    let mut solver = SnapshotSolver::from_json_str(json).unwrap();
    let mut cursor = ActiveCursor::new(&mut solver);

    let topo = build_topology_graph(&mut cursor).unwrap();
    assert!(topo.bus_count() <= 1);
    assert_eq!(topo.branch_count(), 0);

    let agg = collect_phase_aggregates(&mut cursor, Phase::C, CollectPolicy::Abort).unwrap();
    assert_eq!(agg.len(), 1);
}

#[test]
fn empty_circuit_gives_empty_graph() {
    let mut solver = SnapshotSolver::from_json_str(r#"{"buses": []}"#).unwrap();
    let mut cursor = ActiveCursor::new(&mut solver);
    let topo = build_topology_graph(&mut cursor).unwrap();
    assert_eq!(topo.bus_count(), 0);
    assert_eq!(topo.source_bus(), None);
}

#[test]
fn topology_rebuild_is_stable() {
    let mut solver = ieee13();
    let mut cursor = ActiveCursor::new(&mut solver);
    let first = build_topology_graph(&mut cursor).unwrap();
    // move the cursor somewhere else between the two walks
    cursor.bus("652").unwrap();
    let second = build_topology_graph(&mut cursor).unwrap();

    assert_eq!(first.edge_set(), second.edge_set());
    assert_eq!(first.source_bus(), Some("sourcebus"));
    assert_eq!(first.bus_count(), 12);
    assert_eq!(first.branch_count(), 11);
    assert!(first.is_forest());
}

#[test]
fn collector_keys_match_buses_carrying_phase() {
    let mut solver = ieee13();
    let expected: BTreeSet<String> = solver
        .snapshot()
        .buses
        .iter()
        .filter(|b| b.nodes.contains(&Phase::B.node()))
        .map(|b| b.name.clone())
        .collect();

    let mut cursor = ActiveCursor::new(&mut solver);
    let agg = collect_phase_aggregates(&mut cursor, Phase::B, CollectPolicy::Abort).unwrap();

    let distance: BTreeSet<String> = agg.distance.keys().cloned().collect();
    let voltage: BTreeSet<String> = agg.voltage.keys().cloned().collect();
    let coordinate: BTreeSet<String> = agg.coordinate.keys().cloned().collect();
    assert_eq!(distance, expected);
    assert_eq!(voltage, expected);
    assert_eq!(coordinate, expected);
    assert_eq!(expected.len(), 9);
    assert!(!voltage.contains("611"));
}

#[test]
fn voltage_matches_complex_magnitude_at_node_position() {
    let mut solver = ieee13();
    let mut cursor = ActiveCursor::new(&mut solver);

    // 645 lists node 3 before node 2
    let c = bus_phase_voltage_pu(&mut cursor, "645", Phase::C).unwrap().unwrap();
    let b = bus_phase_voltage_pu(&mut cursor, "645", Phase::B).unwrap().unwrap();
    assert_eq!(c, PerUnit(0.984));
    assert_eq!(b, PerUnit(0.985));

    let src_b = bus_phase_voltage_pu(&mut cursor, "sourcebus", Phase::B)
        .unwrap()
        .unwrap();
    let expected = (0.5f64.powi(2) + 0.866025f64.powi(2)).sqrt();
    assert!((src_b.value() - expected).abs() < 1e-12);
}

#[test]
fn node_suffix_resolves_to_same_bus() {
    let mut solver = ieee13();
    for raw in ["684", "684.1", "684.1.3", "684.3.1"] {
        assert!(solver.set_active_bus(raw), "{raw}");
        assert_eq!(solver.bus_name(), "684");
    }
    let parsed = BusRef::parse("684.1.3");
    assert_eq!(strip_node_suffix(&parsed.with_nodes(&[3])), "684");
}

#[test]
fn element_power_and_voltage_of_main_line() {
    let mut solver = ieee13();
    let mut cursor = ActiveCursor::new(&mut solver);

    cursor.element_named("Line.650632").unwrap();
    let power = element_phase_power(&mut cursor).unwrap();
    assert_eq!(power.a.real, Kilowatts(1250.0));
    assert_eq!(power.c.imag, Kilovars(560.0));

    cursor.element_named("Line.650632").unwrap();
    let voltage = element_voltage_pu(&mut cursor).unwrap();
    for phase in Phase::ALL {
        assert!((voltage.get(phase).value() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn short_power_array_is_rejected_not_padded() {
    let mut solver = ieee13();
    let mut cursor = ActiveCursor::new(&mut solver);
    cursor.element_named("Line.684611").unwrap();
    let err = element_phase_power(&mut cursor).unwrap_err();
    assert!(matches!(err, FeederError::MalformedTerminalData { found: 2, .. }));
}

#[test]
fn phase_line_graph_follows_laterals() {
    let mut solver = ieee13();
    let cursor = ActiveCursor::new(&mut solver);

    let phase_b = build_phase_line_graph(&cursor, Phase::B);
    assert_eq!(phase_b.branch_count(), 6);
    assert!(phase_b.contains_bus("646"));
    assert!(!phase_b.contains_bus("684"));

    let phase_c = build_phase_line_graph(&cursor, Phase::C);
    assert!(phase_c.contains_bus("611"));
    assert!(!phase_c.contains_bus("652"));
}

#[test]
fn voltage_tree_places_every_line_end() {
    let mut solver = ieee13();
    let mut cursor = ActiveCursor::new(&mut solver);
    let tree = voltage_tree(&mut cursor, Phase::A, CollectPolicy::Abort).unwrap();

    assert_eq!(tree.segments().len(), tree.graph.edge_set().len());
    let (lo, hi) = (
        tree.positions.values().map(|p| p.voltage).fold(PerUnit(f64::MAX), PerUnit::min),
        tree.positions.values().map(|p| p.voltage).fold(PerUnit(f64::MIN), PerUnit::max),
    );
    assert_eq!(lo, PerUnit(0.955));
    assert_eq!(hi, PerUnit(1.0));
}
