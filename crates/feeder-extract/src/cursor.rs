//! Scoped access to the solver's active bus / active element.
//!
//! [`ActiveCursor`] owns the exclusive borrow of a [`CircuitSolver`]. Every
//! activation returns a view that re-borrows the cursor mutably, so while a
//! [`BusView`] or [`ElementView`] is alive no other activation can be issued:
//! reading bus X's voltage after something silently re-activated bus Y does not
//! compile.
//!
//! ```
//! use feeder_extract::cursor::ActiveCursor;
//! use feeder_extract::snapshot::SnapshotSolver;
//!
//! let json = r#"{"buses": [{"name": "bus1", "nodes": [1], "pu_voltage": [1.0, 0.0], "kv_base": 2.4}]}"#;
//! let mut solver = SnapshotSolver::from_json_str(json).unwrap();
//! let mut cursor = ActiveCursor::new(&mut solver);
//!
//! let bus = cursor.bus("bus1").unwrap();
//! assert_eq!(bus.nodes(), vec![1]);
//! // cursor.bus("bus2")  // rejected while `bus` is still in use
//! assert_eq!(bus.name(), "bus1");
//! ```

use feeder_core::{
    BusRef, Coordinate, FeederError, FeederResult, Kilovolts, PerUnit, Phase, Volts,
};
use num_complex::Complex64;
use tracing::trace;

use crate::solver::{CircuitSolver, LineTerminals};

pub struct ActiveCursor<'s, S: CircuitSolver + ?Sized> {
    solver: &'s mut S,
}

impl<'s, S: CircuitSolver + ?Sized> ActiveCursor<'s, S> {
    pub fn new(solver: &'s mut S) -> Self {
        Self { solver }
    }

    /// Bus names in solver order. No activation involved.
    pub fn bus_names(&self) -> Vec<String> {
        self.solver.all_bus_names()
    }

    /// Full names of every element of `class`. No activation involved.
    pub fn element_names(&self, class: &str) -> Vec<String> {
        self.solver.element_names(class)
    }

    /// Terminal pairs of every line. No activation involved.
    pub fn line_terminals(&self) -> Vec<LineTerminals> {
        self.solver.lines()
    }

    /// Activates `name` and returns a view bound to it.
    pub fn bus(&mut self, name: &str) -> FeederResult<BusView<'_, S>> {
        activate_bus(&mut *self.solver, name, "activate bus")
    }

    /// View of whatever element the solver currently has active.
    pub fn active_element(&mut self) -> ElementView<'_, S> {
        ElementView {
            solver: &mut *self.solver,
        }
    }

    /// Activates an element by full name.
    pub fn element_named(&mut self, name: &str) -> FeederResult<ElementView<'_, S>> {
        trace!(element = name, "activating element");
        if !self.solver.set_active_element(name) {
            return Err(FeederError::element_not_found(name, "activate element"));
        }
        Ok(ElementView {
            solver: &mut *self.solver,
        })
    }

    /// Restarts the topology traversal; `None` when the circuit has no branches.
    pub fn first_branch(&mut self) -> Option<ElementView<'_, S>> {
        if self.solver.topology_first() == 0 {
            trace!("topology traversal is empty");
            return None;
        }
        Some(ElementView {
            solver: &mut *self.solver,
        })
    }

    /// Advances the topology traversal; `None` once it is exhausted.
    pub fn next_branch(&mut self) -> Option<ElementView<'_, S>> {
        if self.solver.topology_next() == 0 {
            return None;
        }
        Some(ElementView {
            solver: &mut *self.solver,
        })
    }
}

fn activate_bus<'c, S: CircuitSolver + ?Sized>(
    solver: &'c mut S,
    name: &str,
    operation: &'static str,
) -> FeederResult<BusView<'c, S>> {
    trace!(bus = name, operation, "activating bus");
    if !solver.set_active_bus(name) {
        return Err(FeederError::bus_not_found(name, operation));
    }
    Ok(BusView { solver })
}

/// Read-only window onto the active bus.
pub struct BusView<'c, S: CircuitSolver + ?Sized> {
    solver: &'c mut S,
}

impl<'c, S: CircuitSolver + ?Sized> BusView<'c, S> {
    /// Canonical name as normalized by the solver.
    pub fn name(&self) -> String {
        self.solver.bus_name()
    }

    pub fn nodes(&self) -> Vec<u32> {
        self.solver.bus_nodes()
    }

    /// Phases present on the bus, in node order; ground and extra nodes are skipped.
    pub fn phases(&self) -> Vec<Phase> {
        self.nodes().into_iter().filter_map(Phase::from_node).collect()
    }

    pub fn has_phase(&self, phase: Phase) -> bool {
        self.nodes().contains(&phase.node())
    }

    /// Interleaved real/imaginary per-unit samples, one pair per node.
    pub fn pu_voltage_samples(&self) -> Vec<f64> {
        self.solver.bus_pu_voltage()
    }

    pub fn kv_base(&self) -> Kilovolts {
        Kilovolts(self.solver.bus_kv_base())
    }

    pub fn base_volts(&self) -> Volts {
        self.kv_base().to_volts()
    }

    pub fn distance(&self) -> f64 {
        self.solver.bus_distance()
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.solver.bus_x(), self.solver.bus_y())
    }

    /// Per-unit voltage magnitude on `phase`, `None` when the bus lacks it.
    ///
    /// The complex sample sits at pair `indexOf(phase, nodes)` of the
    /// interleaved array, i.e. at offsets `2i` and `2i + 1`.
    pub fn phase_voltage_pu(&self, phase: Phase) -> FeederResult<Option<PerUnit>> {
        let nodes = self.nodes();
        let Some(position) = nodes.iter().position(|&n| n == phase.node()) else {
            return Ok(None);
        };
        let samples = self.pu_voltage_samples();
        let offset = 2 * position;
        match samples.get(offset..offset + 2) {
            Some(&[re, im]) => Ok(Some(PerUnit(Complex64::new(re, im).norm()))),
            _ => Err(FeederError::MalformedTerminalData {
                entity: self.name(),
                operation: "bus phase voltage",
                expected: 2 * nodes.len(),
                found: samples.len(),
            }),
        }
    }

    /// Normalizes a magnitude in volts against this bus's base.
    pub fn voltage_pu_from_volts(&self, volts: Volts) -> FeederResult<PerUnit> {
        let kv_base = self.kv_base();
        volts
            .checked_per_unit(kv_base.to_volts())
            .ok_or_else(|| FeederError::InvalidBase {
                bus: self.name(),
                kv_base: kv_base.value(),
                operation: "per-unit conversion",
            })
    }
}

/// Read-only window onto the active circuit element.
pub struct ElementView<'c, S: CircuitSolver + ?Sized> {
    solver: &'c mut S,
}

impl<'c, S: CircuitSolver + ?Sized> ElementView<'c, S> {
    pub fn name(&self) -> String {
        self.solver.element_name()
    }

    pub fn bus_names(&self) -> Vec<String> {
        self.solver.element_bus_names()
    }

    pub fn terminals(&self) -> Vec<BusRef> {
        self.bus_names().iter().map(|b| BusRef::parse(b)).collect()
    }

    /// Interleaved W/var samples, one pair per conductor.
    pub fn power_samples(&self) -> Vec<f64> {
        self.solver.element_powers()
    }

    /// Interleaved volts/degrees samples, one pair per conductor.
    pub fn voltage_mag_ang_samples(&self) -> Vec<f64> {
        self.solver.element_voltages_mag_ang()
    }

    /// Gives up the element and activates its terminal-0 bus.
    ///
    /// Consuming the view is what keeps the element reads and the bus reads
    /// from interleaving: anything needed from the element has to be read
    /// before this call.
    pub fn reference_bus(self) -> FeederResult<BusView<'c, S>> {
        let terminals = self.bus_names();
        let Some(first) = terminals.first() else {
            return Err(FeederError::MalformedTerminalData {
                entity: self.name(),
                operation: "reference bus",
                expected: 1,
                found: 0,
            });
        };
        let first = first.clone();
        activate_bus(self.solver, &first, "activate reference bus")
    }
}
