//! Phase-aware quantity extraction.
//!
//! Bus quantities go through a [`BusView`](crate::cursor::BusView), element
//! quantities through an [`ElementView`](crate::cursor::ElementView); the
//! functions here only decide which samples to read and how to scale them.
//!
//! Phase absence is an `Ok(None)`, never a zero: a bus without phase b has no
//! phase-b voltage, which is different from a dead phase b.

use feeder_core::{
    ComplexPower, Coordinate, FeederError, FeederResult, PerUnit, Phase, PhasePower,
    PhaseVoltage, Volts,
};

use crate::cursor::{ActiveCursor, ElementView};
use crate::solver::CircuitSolver;

/// Per-unit voltage magnitude of `phase` at `bus`; `None` if the bus lacks the phase.
pub fn bus_phase_voltage_pu<S: CircuitSolver + ?Sized>(
    cursor: &mut ActiveCursor<'_, S>,
    bus: &str,
    phase: Phase,
) -> FeederResult<Option<PerUnit>> {
    cursor.bus(bus)?.phase_voltage_pu(phase)
}

/// Electrical distance of `bus` from the energizing source.
pub fn bus_distance<S: CircuitSolver + ?Sized>(
    cursor: &mut ActiveCursor<'_, S>,
    bus: &str,
) -> FeederResult<f64> {
    Ok(cursor.bus(bus)?.distance())
}

pub fn bus_coordinate<S: CircuitSolver + ?Sized>(
    cursor: &mut ActiveCursor<'_, S>,
    bus: &str,
) -> FeederResult<Coordinate> {
    Ok(cursor.bus(bus)?.coordinate())
}

/// Complex power of every conductor the element reports, in kW/kVAr.
///
/// Multi-terminal elements list terminal 1's conductors first, then
/// terminal 2's. An odd-length sample array is rejected.
pub fn element_conductor_powers<S: CircuitSolver + ?Sized>(
    element: &ElementView<'_, S>,
) -> FeederResult<Vec<ComplexPower>> {
    let samples = element.power_samples();
    if samples.len() % 2 != 0 {
        return Err(FeederError::UnpairedSamples {
            entity: element.name(),
            operation: "element conductor powers",
            found: samples.len(),
        });
    }
    Ok(samples
        .chunks_exact(2)
        .map(|pair| ComplexPower::from_raw(pair[0], pair[1]))
        .collect())
}

/// Three-phase power of the active element, phases a/b/c in terminal order.
pub fn element_phase_power<S: CircuitSolver + ?Sized>(
    cursor: &mut ActiveCursor<'_, S>,
) -> FeederResult<PhasePower> {
    phase_power_of(&cursor.active_element())
}

pub(crate) fn phase_power_of<S: CircuitSolver + ?Sized>(
    element: &ElementView<'_, S>,
) -> FeederResult<PhasePower> {
    let samples = element.power_samples();
    if samples.len() < 6 {
        return Err(FeederError::MalformedTerminalData {
            entity: element.name(),
            operation: "element phase power",
            expected: 6,
            found: samples.len(),
        });
    }
    let conductors: Vec<ComplexPower> = samples[..6]
        .chunks_exact(2)
        .map(|pair| ComplexPower::from_raw(pair[0], pair[1]))
        .collect();
    PhasePower::from_conductors(&conductors).ok_or_else(|| FeederError::MalformedTerminalData {
        entity: element.name(),
        operation: "element phase power",
        expected: 6,
        found: samples.len(),
    })
}

/// Per-unit terminal voltage of the active element on its three phases.
///
/// Magnitudes are read at stride 2 (angles skipped) and all three are
/// normalized against the base of the element's terminal-0 bus. The element
/// view is consumed before that bus is activated.
pub fn element_voltage_pu<S: CircuitSolver + ?Sized>(
    cursor: &mut ActiveCursor<'_, S>,
) -> FeederResult<PhaseVoltage> {
    let element = cursor.active_element();
    let samples = element.voltage_mag_ang_samples();
    if samples.len() < 6 {
        return Err(FeederError::MalformedTerminalData {
            entity: element.name(),
            operation: "element voltage",
            expected: 6,
            found: samples.len(),
        });
    }
    let magnitudes = [Volts(samples[0]), Volts(samples[2]), Volts(samples[4])];

    let reference = element.reference_bus()?;
    Ok(PhaseVoltage {
        a: reference.voltage_pu_from_volts(magnitudes[0])?,
        b: reference.voltage_pu_from_volts(magnitudes[1])?,
        c: reference.voltage_pu_from_volts(magnitudes[2])?,
    })
}
