//! The query surface of an external distribution solver.
//!
//! Solvers of this family keep one process-wide "active bus" and one "active
//! circuit element"; every accessor below reads from whichever was selected
//! last. Nothing in this crate calls these methods directly except
//! [`crate::cursor::ActiveCursor`], which scopes each selection to a borrow.

use serde::{Deserialize, Serialize};

/// The two terminal identifiers of a line element, as the circuit lists them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTerminals {
    pub name: String,
    pub bus1: String,
    pub bus2: String,
}

/// Raw single-cursor query interface of a solved circuit.
///
/// Sample arrays are returned exactly as the solver lays them out:
/// `bus_pu_voltage` interleaves real/imaginary per node, `element_powers`
/// interleaves W/var per conductor, `element_voltages_mag_ang` interleaves
/// volts/degrees per conductor. Accessors called with nothing active return
/// empty arrays or zeros, as the solvers do.
pub trait CircuitSolver {
    /// Every bus in solver order.
    fn all_bus_names(&self) -> Vec<String>;

    /// Selects a bus; `false` when the name does not resolve.
    fn set_active_bus(&mut self, name: &str) -> bool;

    /// Canonical name of the active bus.
    fn bus_name(&self) -> String;
    /// Node numbers present on the active bus, in sample order.
    fn bus_nodes(&self) -> Vec<u32>;
    fn bus_pu_voltage(&self) -> Vec<f64>;
    fn bus_kv_base(&self) -> f64;
    fn bus_distance(&self) -> f64;
    fn bus_x(&self) -> f64;
    fn bus_y(&self) -> f64;

    /// Positions the topology traversal on the first branch; 0 when there is none.
    fn topology_first(&mut self) -> i32;
    /// Advances the traversal; 0 on exhaustion.
    fn topology_next(&mut self) -> i32;

    /// Selects an element by full name (`Class.name`); `false` when unknown.
    fn set_active_element(&mut self, name: &str) -> bool;

    fn element_name(&self) -> String;
    /// Terminal bus identifiers of the active element, possibly `bus.1.2` suffixed.
    fn element_bus_names(&self) -> Vec<String>;
    fn element_powers(&self) -> Vec<f64>;
    fn element_voltages_mag_ang(&self) -> Vec<f64>;

    /// Full names of every element of `class` (e.g. `Load`), case-insensitive.
    fn element_names(&self, class: &str) -> Vec<String>;

    /// Terminal pairs of every line element.
    fn lines(&self) -> Vec<LineTerminals>;
}

/// Class part of a full element name: `"Line.l1"` gives `"Line"`.
pub fn element_class(full_name: &str) -> &str {
    full_name.split_once('.').map_or(full_name, |(class, _)| class)
}
