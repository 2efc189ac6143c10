//! Circuit graph structure.

use super::node::Node;
use super::scalar::StatefulScalar;
use super::types::{ComponentId, NodeId, ScalarId, TerminalId};
use crate::components::{
    Capacitor, Component, ComponentKind, Probe, Reference, Resistor, Source, Sweep,
};
use crate::dsl::{CircuitAst, ElementType};
use crate::error::{GradspiceError, Result};
use crate::solver::Frame;

/// A circuit: the arenas of nodes, components and the scalars they own.
///
/// Node `i` is created on first use by [`Circuit::node`], so indices given to
/// [`Circuit::add`] may be sparse; the gaps become isolated nodes.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    nodes: Vec<Node>,
    components: Vec<Component>,
    scalars: Vec<StatefulScalar>,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a circuit from a parsed netlist.
    ///
    /// Ground is node 0; the netlist's other nodes follow in order of first
    /// appearance and keep their names.
    pub fn from_ast(ast: &CircuitAst) -> Result<Self> {
        let mut circuit = Circuit::new();

        let ground = circuit.node(0);
        circuit.nodes[ground.0].set_name("0");
        for (offset, name) in ast.nodes.iter().enumerate() {
            let id = circuit.node(offset + 1);
            circuit.nodes[id.0].set_name(name.as_str());
        }

        for element in &ast.elements {
            let connections = element
                .nodes
                .iter()
                .map(|name| {
                    circuit
                        .find_node(name)
                        .map(|id| id.0)
                        .ok_or_else(|| GradspiceError::NodeNotFound { node: name.clone() })
                })
                .collect::<Result<Vec<_>>>()?;

            let value = || {
                element.value.ok_or_else(|| {
                    GradspiceError::invalid_component(&element.name, element.line, "missing value")
                })
            };
            let kind: ComponentKind = match element.element_type {
                ElementType::Resistor => Resistor::new(value()?)?.into(),
                ElementType::Capacitor => Capacitor::new(value()?)?.into(),
                ElementType::Source => Source::new(value()?).into(),
                ElementType::Reference => Reference::new().into(),
                ElementType::Probe => Probe::new().into(),
            };

            circuit
                .add(kind, &connections)?
                .set_name(element.name.as_str());
        }

        Ok(circuit)
    }

    /// Handle of node `index`, creating it and any lower-numbered nodes on demand.
    pub fn node(&mut self, index: usize) -> NodeId {
        while self.nodes.len() <= index {
            let voltage = self.new_scalar();
            let id = NodeId(self.nodes.len());
            self.nodes.push(Node::new(id, voltage));
        }
        NodeId(index)
    }

    fn new_scalar(&mut self) -> ScalarId {
        self.scalars.push(StatefulScalar::new());
        ScalarId(self.scalars.len() - 1)
    }

    /// Add a component and wire terminal `i` to node `connections[i]`.
    pub fn add(&mut self, kind: impl Into<ComponentKind>, connections: &[usize]) -> Result<&mut Component> {
        let kind = kind.into();
        let expected = kind.terminal_count();
        if connections.len() != expected {
            return Err(GradspiceError::ConnectionMismatch {
                component: kind.type_name().to_string(),
                expected,
                actual: connections.len(),
            });
        }

        let id = self.add_unconnected(kind);
        for (index, &node) in connections.iter().enumerate() {
            let node = self.node(node);
            self.connect(TerminalId::new(id, index), node)?;
        }
        Ok(&mut self.components[id.0])
    }

    /// Add a component without wiring any of its terminals.
    pub fn add_unconnected(&mut self, kind: impl Into<ComponentKind>) -> ComponentId {
        let current = self.new_scalar();
        let id = ComponentId(self.components.len());
        self.components.push(Component::new(id, kind.into(), current));
        id
    }

    /// Wire one terminal to a node.
    pub fn connect(&mut self, terminal: TerminalId, node: NodeId) -> Result<()> {
        let target = self
            .nodes
            .get_mut(node.0)
            .ok_or_else(|| GradspiceError::NodeNotFound { node: node.to_string() })?;
        let slot = self
            .components
            .get_mut(terminal.component.0)
            .and_then(|c| c.terminal_mut(terminal.index));
        target.add_terminal(terminal, slot)
    }

    /// Add a battery driving `n1` to `voltage` above `n0`.
    pub fn create_source(&mut self, n0: usize, n1: usize, voltage: f64) -> Result<ComponentId> {
        Ok(self.add(Source::new(voltage), &[n0, n1])?.id())
    }

    pub fn create_resistor(&mut self, n0: usize, n1: usize, resistance: f64) -> Result<ComponentId> {
        Ok(self.add(Resistor::new(resistance)?, &[n0, n1])?.id())
    }

    pub fn create_capacitor(&mut self, n0: usize, n1: usize, capacitance: f64) -> Result<ComponentId> {
        Ok(self.add(Capacitor::new(capacitance)?, &[n0, n1])?.id())
    }

    pub fn create_reference(&mut self, node: usize) -> Result<ComponentId> {
        Ok(self.add(Reference::new(), &[node])?.id())
    }

    pub fn create_probe(&mut self, node: usize) -> Result<ComponentId> {
        Ok(self.add(Probe::new(), &[node])?.id())
    }

    /// Stage corrections from every node, then every component.
    ///
    /// Only committed values are read, so the order of the sweep does not
    /// affect the result.
    pub fn compute_corrections(&mut self, frame: &mut Frame) {
        for node in &self.nodes {
            node.step(&self.components, &mut self.scalars, frame);
        }

        let mut sweep = Sweep {
            nodes: &self.nodes,
            scalars: &mut self.scalars,
            frame,
        };
        for component in &self.components {
            component.step(&mut sweep);
        }
    }

    /// Apply every staged correction.
    pub fn commit_corrections(&mut self, frame: &Frame) {
        for scalar in &mut self.scalars {
            scalar.commit(frame.time_step);
        }
    }

    /// One inner iteration: compute, then commit.
    pub fn step(&mut self, frame: &mut Frame) {
        self.compute_corrections(frame);
        self.commit_corrections(frame);
    }

    /// Move every scalar's history to the next instant.
    pub fn advance_time(&mut self) {
        for scalar in &mut self.scalars {
            scalar.advance_time();
        }
    }

    /// Whether every node voltage and component current is finite.
    pub fn is_finite(&self) -> bool {
        self.scalars.iter().all(|s| s.value().is_finite())
    }

    /// Check that the circuit can be simulated.
    pub fn verify(&self) -> Result<()> {
        super::validate::verify_circuit(self)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0)
    }

    /// Mutable access for build-time changes (names, parameters).
    pub fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(id.0)
    }

    /// Parameters of a source, or `None` if `id` is not a source.
    pub fn source_mut(&mut self, id: ComponentId) -> Option<&mut Source> {
        self.component_mut(id)?.as_source_mut()
    }

    /// Parameters of a resistor, or `None` if `id` is not a resistor.
    pub fn resistor_mut(&mut self, id: ComponentId) -> Option<&mut Resistor> {
        self.component_mut(id)?.as_resistor_mut()
    }

    /// Parameters of a capacitor, or `None` if `id` is not a capacitor.
    pub fn capacitor_mut(&mut self, id: ComponentId) -> Option<&mut Capacitor> {
        self.component_mut(id)?.as_capacitor_mut()
    }

    /// Find a component by name.
    pub fn find_component(&self, name: &str) -> Option<ComponentId> {
        self.components
            .iter()
            .find(|c| c.name() == Some(name))
            .map(Component::id)
    }

    /// # Panics
    /// If `id` was not issued by this circuit.
    pub fn scalar(&self, id: ScalarId) -> &StatefulScalar {
        &self.scalars[id.0]
    }

    /// Committed voltage of a node.
    ///
    /// # Panics
    /// If `node` was not issued by this circuit.
    pub fn voltage(&self, node: NodeId) -> f64 {
        self.scalar(self.nodes[node.0].voltage()).value()
    }

    /// Voltage of the node a component terminal is wired to.
    pub fn terminal_voltage(&self, component: ComponentId, index: usize) -> Option<f64> {
        let node = self.component(component)?.terminal(index)?.node()?;
        Some(self.voltage(node))
    }

    /// Committed current of a component.
    ///
    /// # Panics
    /// If `component` was not issued by this circuit.
    pub fn current(&self, component: ComponentId) -> f64 {
        self.scalar(self.components[component.0].current_scalar()).value()
    }

    /// Voltage of terminal 1 minus voltage of terminal 0.
    pub fn voltage_drop(&self, component: ComponentId) -> Option<f64> {
        Some(self.terminal_voltage(component, 1)? - self.terminal_voltage(component, 0)?)
    }

    /// Charge carried by a component's current up to the present instant.
    ///
    /// # Panics
    /// If `component` was not issued by this circuit.
    pub fn charge(&self, component: ComponentId, dt: f64) -> f64 {
        self.scalar(self.components[component.0].current_scalar()).integral(dt)
    }

    /// Signed sum of the currents meeting at a node.
    pub fn node_current_sum(&self, node: NodeId) -> f64 {
        self.nodes[node.0].current_sum(&self.components, &self.scalars).1
    }

    /// Find a node by name. "0" and "GND" always name node 0.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        if crate::dsl::is_ground(name) {
            return self.nodes.first().map(Node::id);
        }
        self.nodes
            .iter()
            .find(|n| n.name() == Some(name))
            .map(Node::id)
    }

    /// Display name of a node: its netlist name, or its id.
    pub fn node_name(&self, node: NodeId) -> String {
        match self.nodes.get(node.0).and_then(Node::name) {
            Some(name) => name.to_string(),
            None => node.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::parse;
    use crate::solver::Simulator;
    use approx::assert_abs_diff_eq;

    /// A divider with an RC branch off its midpoint, components added in `order`.
    fn divider_with_rc(order: &[usize]) -> Circuit {
        let parts: Vec<(&str, ComponentKind, Vec<usize>)> = vec![
            ("B1", Source::new(1.5).into(), vec![0, 3]),
            ("R1", Resistor::new(10.0).unwrap().into(), vec![3, 1]),
            ("R2", Resistor::new(10.0).unwrap().into(), vec![1, 0]),
            ("R3", Resistor::new(10.0).unwrap().into(), vec![1, 2]),
            ("C1", Capacitor::new(0.01).unwrap().into(), vec![0, 2]),
            ("GND", Reference::new().into(), vec![0]),
        ];
        let mut circuit = Circuit::new();
        for &i in order {
            let (name, kind, nodes) = &parts[i];
            circuit.add(kind.clone(), nodes).unwrap().set_name(*name);
        }
        circuit
    }

    #[test]
    fn test_nodes_grow_on_demand() {
        let mut circuit = Circuit::new();
        assert_eq!(circuit.node(2), NodeId(2));
        assert_eq!(circuit.nodes().len(), 3);
        assert_eq!(circuit.node(1), NodeId(1));
        assert_eq!(circuit.nodes().len(), 3);
    }

    #[test]
    fn test_add_wires_terminals_in_order() {
        let mut circuit = Circuit::new();
        let r = circuit.create_resistor(3, 1, 10.0).unwrap();

        let component = circuit.component(r).unwrap();
        assert_eq!(component.terminal(0).unwrap().node(), Some(NodeId(3)));
        assert_eq!(component.terminal(1).unwrap().node(), Some(NodeId(1)));
        assert_eq!(circuit.nodes()[3].terminals(), &[TerminalId::new(r, 0)]);
        assert_eq!(circuit.nodes()[1].terminals(), &[TerminalId::new(r, 1)]);
        assert!(circuit.nodes()[0].terminals().is_empty());
    }

    #[test]
    fn test_connection_count_must_match() {
        let mut circuit = Circuit::new();
        let err = circuit.add(Resistor::new(1.0).unwrap(), &[0]).unwrap_err();
        assert!(matches!(
            err,
            GradspiceError::ConnectionMismatch { expected: 2, actual: 1, .. }
        ));
        assert!(circuit.components().is_empty());

        assert!(circuit.add(Probe::new(), &[0, 1]).is_err());
    }

    #[test]
    fn test_zero_resistance_fails_before_adding() {
        let mut circuit = Circuit::new();
        let err = circuit.create_resistor(0, 1, 0.0).unwrap_err();
        assert!(matches!(err, GradspiceError::InvalidParameter { .. }));
        assert!(circuit.components().is_empty());
    }

    #[test]
    fn test_connect_twice_fails() {
        let mut circuit = Circuit::new();
        let id = circuit.add_unconnected(Probe::new());
        let a = circuit.node(0);
        let b = circuit.node(1);
        let terminal = TerminalId::new(id, 0);

        circuit.connect(terminal, a).unwrap();
        assert!(matches!(
            circuit.connect(terminal, b).unwrap_err(),
            GradspiceError::TerminalAlreadyConnected { .. }
        ));
        assert!(matches!(
            circuit.connect(TerminalId::new(id, 1), b).unwrap_err(),
            GradspiceError::InvalidTerminal { .. }
        ));
        assert!(matches!(
            circuit.connect(terminal, NodeId(9)).unwrap_err(),
            GradspiceError::NodeNotFound { .. }
        ));
    }

    #[test]
    fn test_compute_only_stages() {
        let mut circuit = Circuit::new();
        circuit.create_source(0, 1, 2.0).unwrap();
        let mut frame = Frame::new(0.1, 1e-3);

        circuit.compute_corrections(&mut frame);
        assert_eq!(circuit.voltage(NodeId(1)), 0.0);
        // Both nodes report a zero imbalance, the source a 2 V shortfall
        assert_eq!(frame.parameters, 3);
        assert_eq!(frame.error, 2.0);

        circuit.commit_corrections(&frame);
        assert_eq!(circuit.voltage(NodeId(1)), 0.1);
        assert_eq!(circuit.voltage(NodeId(0)), -0.1);
    }

    #[test]
    fn test_node_without_two_terminal_components_is_silent() {
        let mut circuit = Circuit::new();
        circuit.create_probe(0).unwrap();
        let mut frame = Frame::new(0.1, 1e-3);
        circuit.step(&mut frame);
        assert_eq!(frame.parameters, 0);
        assert_eq!(frame.error, 0.0);
    }

    #[test]
    fn test_insertion_order_does_not_change_results() {
        let mut forward = divider_with_rc(&[0, 1, 2, 3, 4, 5]);
        let mut backward = divider_with_rc(&[5, 4, 3, 2, 1, 0]);

        for circuit in [&mut forward, &mut backward] {
            for _ in 0..4 {
                for _ in 0..50 {
                    circuit.step(&mut Frame::new(0.1, 1e-3));
                }
                circuit.advance_time();
            }
            assert!(circuit.is_finite());
        }

        for node in forward.nodes() {
            assert_abs_diff_eq!(
                forward.voltage(node.id()),
                backward.voltage(node.id()),
                epsilon = 1e-12
            );
        }
        for name in ["B1", "R1", "R2", "R3", "C1", "GND"] {
            let a = forward.find_component(name).unwrap();
            let b = backward.find_component(name).unwrap();
            assert_abs_diff_eq!(forward.current(a), backward.current(b), epsilon = 1e-12);
            assert_abs_diff_eq!(forward.charge(a, 1e-3), backward.charge(b, 1e-3), epsilon = 1e-12);
        }
        assert!(forward.voltage(NodeId(1)) > 0.0);
    }

    #[test]
    fn test_reconfigure_built_circuit() {
        let mut circuit = Circuit::new();
        let source = circuit.create_source(0, 1, 1.5).unwrap();
        let load = circuit.create_resistor(0, 1, 10.0).unwrap();
        let capacitor = circuit.create_capacitor(0, 2, 1e-6).unwrap();
        circuit.create_resistor(2, 1, 100.0).unwrap();
        circuit.create_reference(0).unwrap();

        assert!(circuit.resistor_mut(source).is_none());
        assert!(circuit.source_mut(load).is_none());
        assert!(circuit.capacitor_mut(ComponentId(42)).is_none());

        circuit.source_mut(source).unwrap().set_voltage(3.0);

        let resistor = circuit.resistor_mut(load).unwrap();
        assert!(matches!(
            resistor.set_resistance(0.0).unwrap_err(),
            GradspiceError::InvalidParameter { ref param, .. } if param == "resistance"
        ));
        assert_eq!(resistor.resistance(), 10.0);
        resistor.set_resistance(20.0).unwrap();

        let cap = circuit.capacitor_mut(capacitor).unwrap();
        assert!(cap.set_capacitance(0.0).is_err());
        cap.set_capacitance(1e-4).unwrap();
        assert!(matches!(
            circuit.component(capacitor).unwrap().kind(),
            ComponentKind::Capacitor(c) if c.capacitance() == 1e-4
        ));

        Simulator::default().run(&mut circuit).unwrap();
        assert_abs_diff_eq!(circuit.voltage(NodeId(1)), 3.0, epsilon = 1e-4);
        assert_abs_diff_eq!(circuit.current(load), 0.15, epsilon = 1e-4);
        assert_abs_diff_eq!(circuit.current(source), -0.15, epsilon = 1e-3);
    }

    #[test]
    #[should_panic]
    fn test_charge_of_unknown_component_panics() {
        let mut circuit = Circuit::new();
        circuit.create_capacitor(0, 1, 1e-6).unwrap();
        circuit.charge(ComponentId(7), 1e-3);
    }

    #[test]
    fn test_from_ast_names_nodes_and_components() {
        let ast = parse("B1 0 top 1.5\nR1 top mid 10\nR2 mid GND 10\nREF gnd 0\nPROBE vmid mid").unwrap();
        let circuit = Circuit::from_ast(&ast).unwrap();

        assert_eq!(circuit.nodes().len(), 3);
        assert_eq!(circuit.find_node("top"), Some(NodeId(1)));
        assert_eq!(circuit.find_node("mid"), Some(NodeId(2)));
        assert_eq!(circuit.find_node("GND"), Some(NodeId(0)));
        assert_eq!(circuit.find_node("nowhere"), None);
        assert_eq!(circuit.node_name(NodeId(2)), "mid");

        let r1 = circuit.find_component("R1").unwrap();
        let component = circuit.component(r1).unwrap();
        assert_eq!(component.to_string(), "resistor R1");
        assert_eq!(component.terminal(1).unwrap().node(), Some(NodeId(2)));
        assert!(circuit.verify().is_ok());
    }

    #[test]
    fn test_from_ast_rejects_bad_parameters() {
        let ast = parse("R1 a b 0").unwrap();
        assert!(matches!(
            Circuit::from_ast(&ast).unwrap_err(),
            GradspiceError::InvalidParameter { .. }
        ));
    }
}
