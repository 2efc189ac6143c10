//! Abstract Syntax Tree types for the netlist language.

/// Complete AST representation of a parsed netlist.
#[derive(Debug, Clone, Default)]
pub struct CircuitAst {
    /// All element instances, in source order
    pub elements: Vec<ElementDef>,
    /// Non-ground node names in order of first appearance
    pub nodes: Vec<String>,
    /// Simulation directives
    pub settings: NetlistSettings,
}

impl CircuitAst {
    /// Create a new empty circuit AST.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node name if it has not been seen yet. Ground is implicit.
    pub fn note_node(&mut self, name: &str) {
        if !is_ground(name) && !self.nodes.iter().any(|n| n == name) {
            self.nodes.push(name.to_string());
        }
    }
}

/// Whether a node name refers to the ground node.
pub fn is_ground(name: &str) -> bool {
    name == "0" || name.eq_ignore_ascii_case("GND")
}

/// An element line from the netlist.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDef {
    pub element_type: ElementType,
    /// Unique element name
    pub name: String,
    /// Connected node names
    pub nodes: Vec<String>,
    /// Element value (resistance, capacitance, voltage)
    pub value: Option<f64>,
    /// Source line number for error reporting
    pub line: usize,
}

/// Element types supported by the netlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Resistor,
    Capacitor,
    /// Ideal voltage source (battery)
    Source,
    /// Ground reference
    Reference,
    /// Voltage probe
    Probe,
}

impl ElementType {
    /// Parse an element type from the first letter of its name.
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix.to_ascii_uppercase() {
            'R' => Some(Self::Resistor),
            'C' => Some(Self::Capacitor),
            'V' | 'B' => Some(Self::Source),
            _ => None,
        }
    }

    /// Parse an element type from a keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_uppercase().as_str() {
            "REF" | "GROUND" => Some(Self::Reference),
            "PROBE" => Some(Self::Probe),
            _ => None,
        }
    }

    /// Number of nodes an element of this type connects.
    pub fn expected_node_count(&self) -> usize {
        match self {
            Self::Resistor | Self::Capacitor | Self::Source => 2,
            Self::Reference | Self::Probe => 1,
        }
    }

    /// Whether the element line must carry a value.
    pub fn requires_value(&self) -> bool {
        matches!(self, Self::Resistor | Self::Capacitor | Self::Source)
    }
}

/// Simulation parameters given as netlist directives.
///
/// Unset fields leave the driver's configuration untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetlistSettings {
    /// `.tstep`
    pub time_step: Option<f64>,
    /// `.rate`
    pub learning_rate: Option<f64>,
    /// `.instants`
    pub instants: Option<usize>,
    /// `.iterations`
    pub max_iterations: Option<usize>,
    /// `.tolerance`
    pub tolerance: Option<f64>,
}
