//! Topology graph construction from the solver's branch traversal.

use feeder_core::{strip_node_suffix, BusRef, FeederError, FeederResult, Phase, TopologyGraph};
use tracing::{debug, warn};

use crate::cursor::{ActiveCursor, ElementView};
use crate::solver::CircuitSolver;

/// Terminal buses of one visited branch, node suffixes stripped.
struct BranchEnds {
    element: String,
    from: String,
    to: String,
}

fn branch_ends<S: CircuitSolver + ?Sized>(
    branch: &ElementView<'_, S>,
) -> FeederResult<BranchEnds> {
    let terminals = branch.bus_names();
    match terminals.as_slice() {
        [from, to, ..] => Ok(BranchEnds {
            element: branch.name(),
            from: strip_node_suffix(from).to_string(),
            to: strip_node_suffix(to).to_string(),
        }),
        _ => Err(FeederError::MalformedTerminalData {
            entity: branch.name(),
            operation: "topology traversal",
            expected: 2,
            found: terminals.len(),
        }),
    }
}

/// Walks the topology once and returns the bus connectivity graph.
///
/// The first branch's terminal-0 bus becomes the source bus. Its own edge
/// is kept only when it joins two distinct buses, so a source element
/// grounded at its own bus contributes just the root. Parallel branches stay
/// separate edges and loops are kept as they are.
///
/// With no branches at all the graph holds only the first reported bus, or
/// nothing if the circuit has no buses.
pub fn build_topology_graph<S: CircuitSolver + ?Sized>(
    cursor: &mut ActiveCursor<'_, S>,
) -> FeederResult<TopologyGraph> {
    let mut topo = TopologyGraph::new();

    let first = match cursor.first_branch() {
        Some(branch) => Some(branch_ends(&branch)?),
        None => None,
    };

    let Some(first) = first else {
        if let Some(root) = cursor.bus_names().first() {
            topo.set_source_bus(strip_node_suffix(root));
        }
        debug!(buses = topo.bus_count(), "circuit has no branches");
        return Ok(topo);
    };

    topo.set_source_bus(&first.from);
    topo.add_branch(&first.from, &first.to, &first.element);

    while let Some(branch) = cursor.next_branch() {
        let ends = branch_ends(&branch)?;
        topo.add_branch(&ends.from, &ends.to, &ends.element);
    }

    if !topo.is_forest() {
        warn!(
            source = topo.source_bus().unwrap_or_default(),
            "topology is meshed; source bus was taken from the first branch and may not be the only source"
        );
    }
    debug!(
        buses = topo.bus_count(),
        branches = topo.branch_count(),
        "built topology graph"
    );
    Ok(topo)
}

/// Graph of the line elements that carry `phase` on both terminals.
///
/// A terminal without a node list carries all three phases.
pub fn build_phase_line_graph<S: CircuitSolver + ?Sized>(
    cursor: &ActiveCursor<'_, S>,
    phase: Phase,
) -> TopologyGraph {
    let mut topo = TopologyGraph::new();
    for line in cursor.line_terminals() {
        let from = BusRef::parse(&line.bus1);
        let to = BusRef::parse(&line.bus2);
        if from.carries(phase) && to.carries(phase) {
            topo.add_branch(&from.bus, &to.bus, &line.name);
        }
    }
    debug!(
        %phase,
        buses = topo.bus_count(),
        branches = topo.branch_count(),
        "built phase line graph"
    );
    topo
}
