//! Circuit verification.

use crate::components::ComponentKind;
use crate::error::{GradspiceError, Result};

use super::Circuit;

/// Verify that a circuit is ready for simulation.
///
/// Every terminal of every component must be wired to a node. A circuit
/// without a ground reference is accepted, but its voltages are only
/// defined up to a common offset.
pub fn verify_circuit(circuit: &Circuit) -> Result<()> {
    for component in circuit.components() {
        if let Some(index) = component.terminals().iter().position(|t| !t.is_connected()) {
            return Err(GradspiceError::UnconnectedTerminal {
                component: component.label(),
                terminal: index,
            });
        }
    }

    let has_reference = circuit
        .components()
        .iter()
        .any(|c| matches!(c.kind(), ComponentKind::Reference(_)));
    if !has_reference && !circuit.components().is_empty() {
        tracing::warn!("circuit has no ground reference");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Probe, Resistor};

    #[test]
    fn test_unconnected_terminal_is_reported() {
        let mut circuit = Circuit::new();
        circuit.create_reference(0).unwrap();
        let id = circuit.add_unconnected(Resistor::new(10.0).unwrap());
        let node = circuit.node(1);
        circuit
            .connect(crate::circuit::TerminalId::new(id, 0), node)
            .unwrap();

        match verify_circuit(&circuit).unwrap_err() {
            GradspiceError::UnconnectedTerminal { component, terminal } => {
                assert_eq!(component, "X1");
                assert_eq!(terminal, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unconnected_terminal_uses_component_name() {
        let mut circuit = Circuit::new();
        let id = circuit.add_unconnected(Probe::new());
        circuit.component_mut(id).unwrap().set_name("vout");

        let err = circuit.verify().unwrap_err();
        assert_eq!(err.to_string(), "Component 'vout' has a non-connected terminal (0)");
    }

    #[test]
    fn test_fully_wired_circuit_passes() {
        let mut circuit = Circuit::new();
        circuit.create_reference(0).unwrap();
        circuit.create_source(0, 1, 1.5).unwrap();
        circuit.create_resistor(0, 1, 10.0).unwrap();
        assert!(verify_circuit(&circuit).is_ok());
        assert!(Circuit::new().verify().is_ok());
    }
}
