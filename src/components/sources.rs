//! Ideal voltage source and the ground reference.

use super::{Component, Sweep};

/// An ideal voltage source (battery).
///
/// Drives the voltage of terminal 1 relative to terminal 0 toward its
/// configured voltage. Its current is left entirely to the node balance.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    voltage: f64,
}

impl Source {
    /// Create a source holding `voltage` across its terminals.
    pub fn new(voltage: f64) -> Self {
        Self { voltage }
    }

    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    pub fn set_voltage(&mut self, voltage: f64) -> &mut Self {
        self.voltage = voltage;
        self
    }

    pub(crate) fn step(&self, component: &Component, sweep: &mut Sweep<'_>) {
        component.apply_expected_voltage(sweep, self.voltage, 1.0);
    }
}

/// Ground reference: pins the voltage of its single node to zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reference;

impl Reference {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn step(&self, component: &Component, sweep: &mut Sweep<'_>) {
        let Some(voltage) = component.terminal(0).and_then(|t| sweep.voltage_of(t)) else {
            return;
        };
        let error = -sweep.value(voltage);
        sweep.frame.record(error);
        let correction = error * sweep.frame.learning_rate;
        sweep.stage(voltage, correction);
    }
}
