//! Circuit-wide collection of per-bus and per-element quantities.
//!
//! Every mapping here is keyed by the solver's canonical bus (or element)
//! name so it can be joined against a [`TopologyGraph`] built from the same
//! solution.

use std::collections::BTreeMap;

use feeder_core::{
    ComplexPower, Coordinate, Diagnostics, FeederResult, PerUnit, Phase, TopologyGraph,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cursor::ActiveCursor;
use crate::extract::element_conductor_powers;
use crate::solver::CircuitSolver;
use crate::topology::build_phase_line_graph;

/// What the collector does when one bus cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectPolicy {
    /// Return the first error.
    #[default]
    Abort,
    /// Skip the bus and record the failure in [`PhaseAggregates::diagnostics`].
    SkipAndRecord,
}

/// Distance, voltage and position of every bus carrying one phase.
///
/// The three maps always hold the same keys.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseAggregates {
    pub phase: Phase,
    pub distance: BTreeMap<String, f64>,
    pub voltage: BTreeMap<String, PerUnit>,
    pub coordinate: BTreeMap<String, Coordinate>,
    pub diagnostics: Diagnostics,
}

/// A bus placed on the voltage-versus-distance plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfilePoint {
    pub distance: f64,
    pub voltage: PerUnit,
}

impl PhaseAggregates {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            distance: BTreeMap::new(),
            voltage: BTreeMap::new(),
            coordinate: BTreeMap::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    fn insert(&mut self, bus: String, distance: f64, voltage: PerUnit, coordinate: Coordinate) {
        self.distance.insert(bus.clone(), distance);
        self.voltage.insert(bus.clone(), voltage);
        self.coordinate.insert(bus, coordinate);
    }

    pub fn len(&self) -> usize {
        self.voltage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voltage.is_empty()
    }

    pub fn buses(&self) -> impl Iterator<Item = &str> {
        self.voltage.keys().map(String::as_str)
    }

    /// Lowest and highest voltage seen, `None` when no bus carries the phase.
    pub fn voltage_range(&self) -> Option<(PerUnit, PerUnit)> {
        let mut values = self.voltage.values().copied();
        let first = values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    pub fn profile(&self) -> BTreeMap<String, ProfilePoint> {
        self.voltage
            .iter()
            .filter_map(|(bus, &voltage)| {
                let distance = *self.distance.get(bus)?;
                Some((bus.clone(), ProfilePoint { distance, voltage }))
            })
            .collect()
    }
}

/// One bus's contribution, `None` when it lacks the phase.
fn read_bus<S: CircuitSolver + ?Sized>(
    cursor: &mut ActiveCursor<'_, S>,
    name: &str,
    phase: Phase,
) -> FeederResult<Option<(String, f64, PerUnit, Coordinate)>> {
    let bus = cursor.bus(name)?;
    let Some(voltage) = bus.phase_voltage_pu(phase)? else {
        return Ok(None);
    };
    Ok(Some((bus.name(), bus.distance(), voltage, bus.coordinate())))
}

/// Visits every bus once and records the ones carrying `phase`.
pub fn collect_phase_aggregates<S: CircuitSolver + ?Sized>(
    cursor: &mut ActiveCursor<'_, S>,
    phase: Phase,
    policy: CollectPolicy,
) -> FeederResult<PhaseAggregates> {
    let mut aggregates = PhaseAggregates::new(phase);
    let names = cursor.bus_names();
    let mut absent = 0usize;

    for name in &names {
        match read_bus(cursor, name, phase) {
            Ok(Some((canonical, distance, voltage, coordinate))) => {
                aggregates.insert(canonical, distance, voltage, coordinate);
            }
            Ok(None) => absent += 1,
            Err(err) => match policy {
                CollectPolicy::Abort => return Err(err),
                CollectPolicy::SkipAndRecord => {
                    warn!(bus = %name, error = %err, "skipping bus");
                    aggregates.diagnostics.record_failure("collect", &err, name);
                }
            },
        }
    }

    debug!(
        %phase,
        buses = names.len(),
        present = aggregates.len(),
        absent,
        skipped = aggregates.diagnostics.error_count(),
        "collected phase aggregates"
    );
    Ok(aggregates)
}

/// Position of every bus, phases ignored.
pub fn collect_bus_coordinates<S: CircuitSolver + ?Sized>(
    cursor: &mut ActiveCursor<'_, S>,
) -> FeederResult<BTreeMap<String, Coordinate>> {
    let mut coordinates = BTreeMap::new();
    for name in cursor.bus_names() {
        let bus = cursor.bus(&name)?;
        coordinates.insert(bus.name(), bus.coordinate());
    }
    Ok(coordinates)
}

/// Bus name to `(distance, voltage)` for every bus carrying `phase`.
pub fn voltage_profile<S: CircuitSolver + ?Sized>(
    cursor: &mut ActiveCursor<'_, S>,
    phase: Phase,
    policy: CollectPolicy,
) -> FeederResult<BTreeMap<String, ProfilePoint>> {
    Ok(collect_phase_aggregates(cursor, phase, policy)?.profile())
}

/// Phase line graph paired with the profile position of each of its buses.
#[derive(Debug, Clone)]
pub struct VoltageTree {
    pub phase: Phase,
    pub graph: TopologyGraph,
    pub positions: BTreeMap<String, ProfilePoint>,
    /// Skipped buses, plus a warning for each line bus left without a position
    pub diagnostics: Diagnostics,
}

impl VoltageTree {
    /// Line endpoints as profile points; lines touching a bus with no
    /// position are left out.
    pub fn segments(&self) -> Vec<(ProfilePoint, ProfilePoint)> {
        self.graph
            .edge_set()
            .into_iter()
            .filter_map(|(a, b)| Some((*self.positions.get(&a)?, *self.positions.get(&b)?)))
            .collect()
    }
}

pub fn voltage_tree<S: CircuitSolver + ?Sized>(
    cursor: &mut ActiveCursor<'_, S>,
    phase: Phase,
    policy: CollectPolicy,
) -> FeederResult<VoltageTree> {
    let graph = build_phase_line_graph(cursor, phase);
    let aggregates = collect_phase_aggregates(cursor, phase, policy)?;
    let positions = aggregates.profile();
    let mut diagnostics = aggregates.diagnostics;

    for index in graph.graph.node_indices() {
        let node = &graph.graph[index];
        if positions.contains_key(&node.name) {
            continue;
        }
        let already_skipped = diagnostics
            .errors()
            .any(|issue| issue.entity.as_deref() == Some(node.name.as_str()));
        if !already_skipped {
            diagnostics.add_warning_with_entity(
                "voltage tree",
                &format!("line bus does not report phase {phase}"),
                &node.name,
            );
        }
    }

    Ok(VoltageTree {
        phase,
        graph,
        positions,
        diagnostics,
    })
}

/// Per-conductor power of every element of `class`, keyed by full element name.
pub fn collect_class_powers<S: CircuitSolver + ?Sized>(
    cursor: &mut ActiveCursor<'_, S>,
    class: &str,
) -> FeederResult<BTreeMap<String, Vec<ComplexPower>>> {
    let mut powers = BTreeMap::new();
    for name in cursor.element_names(class) {
        let element = cursor.element_named(&name)?;
        powers.insert(element.name(), element_conductor_powers(&element)?);
    }
    debug!(class, elements = powers.len(), "collected class powers");
    Ok(powers)
}
