//! Terminals and the nodes that join them.

use super::scalar::StatefulScalar;
use super::types::{ComponentId, NodeId, Polarity, ScalarId, TerminalId};
use crate::components::Component;
use crate::error::{GradspiceError, Result};
use crate::solver::Frame;

/// A connection point on a component.
///
/// The link to the node is a plain handle, set once when the terminal is wired.
#[derive(Debug, Clone)]
pub struct Terminal {
    component: ComponentId,
    polarity: Polarity,
    node: Option<NodeId>,
}

impl Terminal {
    pub fn new(component: ComponentId, polarity: Polarity) -> Self {
        Self {
            component,
            polarity,
            node: None,
        }
    }

    pub fn component(&self) -> ComponentId {
        self.component
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// The node this terminal is wired to, if any.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_connected(&self) -> bool {
        self.node.is_some()
    }
}

/// An electrical junction.
///
/// Each step the node redistributes any current imbalance among the
/// two-terminal components attached to it (Kirchhoff's current law).
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    voltage: ScalarId,
    terminals: Vec<TerminalId>,
    name: Option<String>,
}

impl Node {
    pub(crate) fn new(id: NodeId, voltage: ScalarId) -> Self {
        Self {
            id,
            voltage,
            terminals: Vec::new(),
            name: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Handle of the node voltage in the circuit's scalar arena.
    pub fn voltage(&self) -> ScalarId {
        self.voltage
    }

    /// Terminals wired here, in wiring order.
    pub fn terminals(&self) -> &[TerminalId] {
        &self.terminals
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Wire a terminal to this node.
    ///
    /// `terminal` is `None` when `id` does not name an existing terminal.
    pub fn add_terminal(&mut self, id: TerminalId, terminal: Option<&mut Terminal>) -> Result<()> {
        let terminal = terminal.ok_or(GradspiceError::InvalidTerminal { terminal: id })?;
        if let Some(existing) = terminal.node {
            return Err(GradspiceError::TerminalAlreadyConnected {
                terminal: id,
                node: existing,
            });
        }
        terminal.node = Some(self.id);
        self.terminals.push(id);
        Ok(())
    }

    /// Current scalars and signs of the terminals that take part in the balance.
    ///
    /// Single-terminal components (references, probes) carry no branch current.
    fn participants<'a>(
        &'a self,
        components: &'a [Component],
    ) -> impl Iterator<Item = (ScalarId, f64)> + 'a {
        self.terminals.iter().filter_map(move |t| {
            let component = components.get(t.component.0)?;
            if !component.is_two_terminal() {
                return None;
            }
            let terminal = component.terminal(t.index)?;
            Some((component.current_scalar(), terminal.polarity().sign()))
        })
    }

    /// Number of participating terminals and their signed current sum.
    pub fn current_sum(&self, components: &[Component], scalars: &[StatefulScalar]) -> (usize, f64) {
        self.participants(components)
            .fold((0, 0.0), |(count, sum), (current, sign)| {
                (count + 1, sum + scalars[current.0].value() * sign)
            })
    }

    /// Stage a correction that nudges the attached currents toward balance.
    pub(crate) fn step(&self, components: &[Component], scalars: &mut [StatefulScalar], frame: &mut Frame) {
        let (count, sum) = self.current_sum(components, scalars);
        if count == 0 {
            return;
        }

        let imbalance = sum / count as f64;
        frame.record(imbalance);

        let correction = -imbalance * frame.learning_rate;
        for (current, sign) in self.participants(components) {
            scalars[current.0].add(correction * sign);
        }
    }
}
