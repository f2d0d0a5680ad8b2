//! In-memory solved-circuit snapshot.
//!
//! A [`Snapshot`] is the observable state of one power-flow solution: every
//! bus with its nodes, per-unit voltages, base and position, and every circuit
//! element with its terminals and telemetry. [`SnapshotSolver`] serves it back
//! through [`CircuitSolver`] with the same cursor behaviour as a live solver:
//! case-insensitive lookup, node suffixes ignored on bus activation, and a
//! zero return once topology traversal is exhausted.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use feeder_core::{strip_node_suffix, FeederError, FeederResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::solver::{element_class, CircuitSolver, LineTerminals};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub buses: Vec<SnapshotBus>,
    #[serde(default)]
    pub elements: Vec<SnapshotElement>,
    /// Branch traversal order by element name. Defaults to every element with
    /// at least two terminals, in listed order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotBus {
    pub name: String,
    pub nodes: Vec<u32>,
    /// Interleaved re/im per node
    pub pu_voltage: Vec<f64>,
    pub kv_base: f64,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotElement {
    /// Full name, `Class.name`
    pub name: String,
    pub bus_names: Vec<String>,
    /// Interleaved W/var per conductor
    #[serde(default)]
    pub powers: Vec<f64>,
    /// Interleaved V/deg per conductor
    #[serde(default)]
    pub voltages_mag_ang: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct SnapshotSolver {
    snapshot: Snapshot,
    bus_lookup: HashMap<String, usize>,
    element_lookup: HashMap<String, usize>,
    topology: Vec<usize>,
    active_bus: Option<usize>,
    active_element: Option<usize>,
    topology_pos: Option<usize>,
}

fn bus_key(name: &str) -> String {
    strip_node_suffix(name.trim()).to_ascii_lowercase()
}

fn element_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl SnapshotSolver {
    /// Loads and indexes a snapshot file.
    ///
    /// Any failure here means there is no circuit to query, so it is reported
    /// as [`FeederError::SolverUnavailable`].
    pub fn load(path: &Path) -> FeederResult<Self> {
        info!(path = %path.display(), "loading circuit snapshot");
        let contents = fs::read_to_string(path).map_err(|err| {
            FeederError::SolverUnavailable(format!("reading {}: {err}", path.display()))
        })?;
        Self::from_json_str(&contents).map_err(|err| match err {
            FeederError::SolverUnavailable(msg) => {
                FeederError::SolverUnavailable(format!("{}: {msg}", path.display()))
            }
            other => FeederError::SolverUnavailable(format!("{}: {other}", path.display())),
        })
    }

    pub fn from_json_str(json: &str) -> FeederResult<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    pub fn from_snapshot(snapshot: Snapshot) -> FeederResult<Self> {
        let mut bus_lookup = HashMap::with_capacity(snapshot.buses.len());
        for (idx, bus) in snapshot.buses.iter().enumerate() {
            if bus_lookup.insert(bus_key(&bus.name), idx).is_some() {
                return Err(FeederError::SolverUnavailable(format!(
                    "duplicate bus '{}'",
                    bus.name
                )));
            }
        }

        let mut element_lookup = HashMap::with_capacity(snapshot.elements.len());
        for (idx, element) in snapshot.elements.iter().enumerate() {
            if element_lookup
                .insert(element_key(&element.name), idx)
                .is_some()
            {
                return Err(FeederError::SolverUnavailable(format!(
                    "duplicate element '{}'",
                    element.name
                )));
            }
        }

        let topology = match &snapshot.topology {
            Some(order) => order
                .iter()
                .map(|name| {
                    element_lookup.get(&element_key(name)).copied().ok_or_else(|| {
                        FeederError::SolverUnavailable(format!(
                            "topology references unknown element '{name}'"
                        ))
                    })
                })
                .collect::<FeederResult<Vec<_>>>()?,
            None => snapshot
                .elements
                .iter()
                .enumerate()
                .filter(|(_, e)| e.bus_names.len() >= 2)
                .map(|(idx, _)| idx)
                .collect(),
        };

        debug!(
            buses = snapshot.buses.len(),
            elements = snapshot.elements.len(),
            branches = topology.len(),
            "indexed snapshot"
        );

        Ok(Self {
            snapshot,
            bus_lookup,
            element_lookup,
            topology,
            active_bus: None,
            active_element: None,
            topology_pos: None,
        })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn bus(&self) -> Option<&SnapshotBus> {
        self.active_bus.map(|idx| &self.snapshot.buses[idx])
    }

    fn element(&self) -> Option<&SnapshotElement> {
        self.active_element.map(|idx| &self.snapshot.elements[idx])
    }
}

impl CircuitSolver for SnapshotSolver {
    fn all_bus_names(&self) -> Vec<String> {
        self.snapshot.buses.iter().map(|b| b.name.clone()).collect()
    }

    fn set_active_bus(&mut self, name: &str) -> bool {
        match self.bus_lookup.get(&bus_key(name)) {
            Some(&idx) => {
                self.active_bus = Some(idx);
                true
            }
            None => false,
        }
    }

    fn bus_name(&self) -> String {
        self.bus().map(|b| b.name.clone()).unwrap_or_default()
    }

    fn bus_nodes(&self) -> Vec<u32> {
        self.bus().map(|b| b.nodes.clone()).unwrap_or_default()
    }

    fn bus_pu_voltage(&self) -> Vec<f64> {
        self.bus().map(|b| b.pu_voltage.clone()).unwrap_or_default()
    }

    fn bus_kv_base(&self) -> f64 {
        self.bus().map_or(0.0, |b| b.kv_base)
    }

    fn bus_distance(&self) -> f64 {
        self.bus().map_or(0.0, |b| b.distance)
    }

    fn bus_x(&self) -> f64 {
        self.bus().map_or(0.0, |b| b.x)
    }

    fn bus_y(&self) -> f64 {
        self.bus().map_or(0.0, |b| b.y)
    }

    fn topology_first(&mut self) -> i32 {
        match self.topology.first() {
            Some(&idx) => {
                self.topology_pos = Some(0);
                self.active_element = Some(idx);
                1
            }
            None => {
                self.topology_pos = None;
                0
            }
        }
    }

    fn topology_next(&mut self) -> i32 {
        let Some(pos) = self.topology_pos else {
            return 0;
        };
        match self.topology.get(pos + 1) {
            Some(&idx) => {
                self.topology_pos = Some(pos + 1);
                self.active_element = Some(idx);
                (pos + 2) as i32
            }
            None => 0,
        }
    }

    fn set_active_element(&mut self, name: &str) -> bool {
        match self.element_lookup.get(&element_key(name)) {
            Some(&idx) => {
                self.active_element = Some(idx);
                true
            }
            None => false,
        }
    }

    fn element_name(&self) -> String {
        self.element().map(|e| e.name.clone()).unwrap_or_default()
    }

    fn element_bus_names(&self) -> Vec<String> {
        self.element()
            .map(|e| e.bus_names.clone())
            .unwrap_or_default()
    }

    fn element_powers(&self) -> Vec<f64> {
        self.element().map(|e| e.powers.clone()).unwrap_or_default()
    }

    fn element_voltages_mag_ang(&self) -> Vec<f64> {
        self.element()
            .map(|e| e.voltages_mag_ang.clone())
            .unwrap_or_default()
    }

    fn element_names(&self, class: &str) -> Vec<String> {
        self.snapshot
            .elements
            .iter()
            .filter(|e| element_class(&e.name).eq_ignore_ascii_case(class))
            .map(|e| e.name.clone())
            .collect()
    }

    fn lines(&self) -> Vec<LineTerminals> {
        self.snapshot
            .elements
            .iter()
            .filter(|e| element_class(&e.name).eq_ignore_ascii_case("line"))
            .filter_map(|e| match e.bus_names.as_slice() {
                [bus1, bus2, ..] => Some(LineTerminals {
                    name: e.name.clone(),
                    bus1: bus1.clone(),
                    bus2: bus2.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "buses": [
            {"name": "sourcebus", "nodes": [1, 2, 3], "pu_voltage": [1,0,1,0,1,0], "kv_base": 2.4},
            {"name": "b1", "nodes": [1], "pu_voltage": [0.98, 0.01], "kv_base": 2.4, "distance": 0.3}
        ],
        "elements": [
            {"name": "Vsource.source", "bus_names": ["sourcebus", "sourcebus.0.0.0"]},
            {"name": "Line.l1", "bus_names": ["sourcebus.1", "b1.1"]},
            {"name": "Load.ld1", "bus_names": ["b1.1"], "powers": [1500, 300]}
        ]
    }"#;

    #[test]
    fn test_bus_lookup_is_case_and_suffix_insensitive() {
        let mut solver = SnapshotSolver::from_json_str(SNAPSHOT).unwrap();
        assert!(solver.set_active_bus("B1.1"));
        assert_eq!(solver.bus_name(), "b1");
        assert_eq!(solver.bus_distance(), 0.3);
        assert!(!solver.set_active_bus("b2"));
        // a failed activation leaves the previous bus active
        assert_eq!(solver.bus_name(), "b1");
    }

    #[test]
    fn test_default_topology_skips_single_terminal_elements() {
        let mut solver = SnapshotSolver::from_json_str(SNAPSHOT).unwrap();
        assert_eq!(solver.topology_first(), 1);
        assert_eq!(solver.element_name(), "Vsource.source");
        assert_ne!(solver.topology_next(), 0);
        assert_eq!(solver.element_name(), "Line.l1");
        assert_eq!(solver.topology_next(), 0);
        assert_eq!(solver.topology_next(), 0);
    }

    #[test]
    fn test_next_before_first_is_exhausted() {
        let mut solver = SnapshotSolver::from_json_str(SNAPSHOT).unwrap();
        assert_eq!(solver.topology_next(), 0);
    }

    #[test]
    fn test_explicit_topology_must_resolve() {
        let json = r#"{"buses": [], "elements": [], "topology": ["Line.ghost"]}"#;
        let err = SnapshotSolver::from_json_str(json).unwrap_err();
        assert!(matches!(err, FeederError::SolverUnavailable(_)));
    }

    #[test]
    fn test_duplicate_bus_rejected() {
        let json = r#"{"buses": [
            {"name": "a", "nodes": [1], "pu_voltage": [1, 0], "kv_base": 1},
            {"name": "A", "nodes": [1], "pu_voltage": [1, 0], "kv_base": 1}
        ]}"#;
        assert!(SnapshotSolver::from_json_str(json).is_err());
    }

    #[test]
    fn test_class_listing_and_lines() {
        let solver = SnapshotSolver::from_json_str(SNAPSHOT).unwrap();
        assert_eq!(solver.element_names("load"), vec!["Load.ld1"]);
        let lines = solver.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].bus2, "b1.1");
    }

    #[test]
    fn test_load_missing_file_is_solver_unavailable() {
        let err = SnapshotSolver::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, FeederError::SolverUnavailable(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        fs::write(&path, SNAPSHOT).unwrap();
        let solver = SnapshotSolver::load(&path).unwrap();
        assert_eq!(solver.all_bus_names(), vec!["sourcebus", "b1"]);
    }
}
