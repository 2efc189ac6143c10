//! Voltage probe.

use super::{Component, Sweep};

/// Marks a node whose voltage should be reported.
///
/// A probe has a single terminal and never stages corrections, so it does
/// not affect the solution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Probe;

impl Probe {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn step(&self, component: &Component, sweep: &mut Sweep<'_>) {
        if let Some(voltage) = component.terminal(0).and_then(|t| sweep.voltage_of(t)) {
            tracing::trace!(probe = %component.label(), voltage = sweep.value(voltage), "probe");
        }
    }
}
