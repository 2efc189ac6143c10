//! Component models for the relaxation solver.
//!
//! This module provides the closed set of supported components:
//! - Sources: [`Source`] (ideal battery), [`Reference`] (ground)
//! - Linear: [`Resistor`], [`Capacitor`]
//! - Observers: [`Probe`]
//!
//! Every component owns its terminals and one current scalar. Each step it
//! compares the circuit state against its constitutive law and stages a
//! damped correction through the shared helpers
//! [`Component::apply_expected_voltage`] and
//! [`Component::apply_expected_current`].

mod linear;
mod probe;
mod sources;

pub use linear::{Capacitor, Resistor};
pub use probe::Probe;
pub use sources::{Reference, Source};

use std::fmt;

use crate::circuit::{ComponentId, Node, Polarity, ScalarId, StatefulScalar, Terminal};
use crate::solver::Frame;

/// Default upper bound on the rate multiplier of the capacitor's current channel.
pub const DEFAULT_CAPACITOR_CURRENT_RATE: f64 = 1e-2;

/// Default cap on `rate * 2C / dt`, the conductance through which the
/// capacitor's current channel feeds the drop back into the current (siemens).
pub const DEFAULT_CAPACITOR_CURRENT_GAIN_LIMIT: f64 = 2e-3;

/// Variant-specific part of a component.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    Reference(Reference),
    Source(Source),
    Resistor(Resistor),
    Capacitor(Capacitor),
    Probe(Probe),
}

impl ComponentKind {
    /// Number of terminals a component of this kind exposes.
    pub fn terminal_count(&self) -> usize {
        match self {
            ComponentKind::Reference(_) | ComponentKind::Probe(_) => 1,
            ComponentKind::Source(_) | ComponentKind::Resistor(_) | ComponentKind::Capacitor(_) => 2,
        }
    }

    /// Short lowercase name of the kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            ComponentKind::Reference(_) => "reference",
            ComponentKind::Source(_) => "source",
            ComponentKind::Resistor(_) => "resistor",
            ComponentKind::Capacitor(_) => "capacitor",
            ComponentKind::Probe(_) => "probe",
        }
    }
}

impl From<Reference> for ComponentKind {
    fn from(value: Reference) -> Self {
        ComponentKind::Reference(value)
    }
}

impl From<Source> for ComponentKind {
    fn from(value: Source) -> Self {
        ComponentKind::Source(value)
    }
}

impl From<Resistor> for ComponentKind {
    fn from(value: Resistor) -> Self {
        ComponentKind::Resistor(value)
    }
}

impl From<Capacitor> for ComponentKind {
    fn from(value: Capacitor) -> Self {
        ComponentKind::Capacitor(value)
    }
}

impl From<Probe> for ComponentKind {
    fn from(value: Probe) -> Self {
        ComponentKind::Probe(value)
    }
}

/// Mutable view of the circuit state used during the compute pass.
///
/// Reads always see committed values; writes only stage corrections.
pub(crate) struct Sweep<'a> {
    pub nodes: &'a [Node],
    pub scalars: &'a mut [StatefulScalar],
    pub frame: &'a mut Frame,
}

impl Sweep<'_> {
    pub fn value(&self, scalar: ScalarId) -> f64 {
        self.scalars[scalar.0].value()
    }

    pub fn stage(&mut self, scalar: ScalarId, correction: f64) {
        self.scalars[scalar.0].add(correction);
    }

    /// Voltage scalar of the node a terminal is wired to.
    pub fn voltage_of(&self, terminal: &Terminal) -> Option<ScalarId> {
        terminal
            .node()
            .and_then(|node| self.nodes.get(node.0))
            .map(Node::voltage)
    }
}

/// A circuit component.
#[derive(Debug, Clone)]
pub struct Component {
    id: ComponentId,
    name: Option<String>,
    terminals: Vec<Terminal>,
    current: ScalarId,
    kind: ComponentKind,
}

impl Component {
    pub(crate) fn new(id: ComponentId, kind: ComponentKind, current: ScalarId) -> Self {
        let terminals = (0..kind.terminal_count())
            .map(|index| Terminal::new(id, Polarity::for_index(index)))
            .collect();
        Self {
            id,
            name: None,
            terminals,
            current,
            kind,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name for diagnostics: the given name, or the id when unnamed.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.id.to_string(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn kind(&self) -> &ComponentKind {
        &self.kind
    }

    /// Source parameters, if this component is a source.
    pub fn as_source_mut(&mut self) -> Option<&mut Source> {
        match &mut self.kind {
            ComponentKind::Source(source) => Some(source),
            _ => None,
        }
    }

    /// Resistor parameters, if this component is a resistor.
    pub fn as_resistor_mut(&mut self) -> Option<&mut Resistor> {
        match &mut self.kind {
            ComponentKind::Resistor(resistor) => Some(resistor),
            _ => None,
        }
    }

    /// Capacitor parameters, if this component is a capacitor.
    pub fn as_capacitor_mut(&mut self) -> Option<&mut Capacitor> {
        match &mut self.kind {
            ComponentKind::Capacitor(capacitor) => Some(capacitor),
            _ => None,
        }
    }

    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    pub fn terminal(&self, index: usize) -> Option<&Terminal> {
        self.terminals.get(index)
    }

    pub(crate) fn terminal_mut(&mut self, index: usize) -> Option<&mut Terminal> {
        self.terminals.get_mut(index)
    }

    pub fn is_two_terminal(&self) -> bool {
        self.terminals.len() == 2
    }

    /// Handle of the component current in the circuit's scalar arena.
    pub fn current_scalar(&self) -> ScalarId {
        self.current
    }

    /// Voltage scalars of both terminals of a two-terminal component.
    fn terminal_voltages(&self, sweep: &Sweep<'_>) -> Option<(ScalarId, ScalarId)> {
        let v0 = sweep.voltage_of(self.terminals.first()?)?;
        let v1 = sweep.voltage_of(self.terminals.get(1)?)?;
        Some((v0, v1))
    }

    /// Voltage of terminal 1 minus voltage of terminal 0.
    pub(crate) fn voltage_drop(&self, sweep: &Sweep<'_>) -> Option<f64> {
        let (v0, v1) = self.terminal_voltages(sweep)?;
        Some(sweep.value(v1) - sweep.value(v0))
    }

    /// Current entering through terminal 0.
    pub(crate) fn current(&self, sweep: &Sweep<'_>) -> f64 {
        sweep.value(self.current)
    }

    /// Nudge the voltage drop toward `expected`, split evenly between both nodes.
    pub(crate) fn apply_expected_voltage(&self, sweep: &mut Sweep<'_>, expected: f64, rate: f64) {
        let Some((v0, v1)) = self.terminal_voltages(sweep) else {
            return;
        };
        let actual = sweep.value(v1) - sweep.value(v0);
        let error = expected - actual;
        sweep.frame.record(error);

        let correction = error * sweep.frame.learning_rate * rate / 2.0;
        sweep.stage(v0, -correction);
        sweep.stage(v1, correction);

        tracing::trace!(component = %self.id, expected, error, correction, "voltage correction");
    }

    /// Nudge the component current toward `expected`.
    pub(crate) fn apply_expected_current(&self, sweep: &mut Sweep<'_>, expected: f64, rate: f64) {
        let error = expected - self.current(sweep);
        sweep.frame.record(error);

        let correction = error * sweep.frame.learning_rate * rate;
        sweep.stage(self.current, correction);

        tracing::trace!(component = %self.id, expected, error, correction, "current correction");
    }

    /// Stage this component's corrections for one iteration.
    pub(crate) fn step(&self, sweep: &mut Sweep<'_>) {
        match &self.kind {
            ComponentKind::Reference(r) => r.step(self, sweep),
            ComponentKind::Source(s) => s.step(self, sweep),
            ComponentKind::Resistor(r) => r.step(self, sweep),
            ComponentKind::Capacitor(c) => c.step(self, sweep),
            ComponentKind::Probe(p) => p.step(self, sweep),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.type_name(), self.label())
    }
}
