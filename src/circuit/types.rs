//! Index handles used to cross-reference circuit entities.
//!
//! Nodes, components and stateful scalars all live in arenas owned by the
//! [`Circuit`](super::Circuit). Everything else refers to them through these
//! copyable handles, so arenas can grow without invalidating references.

use std::fmt;

/// Handle of a node in the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Handle of a component in the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}", self.0)
    }
}

/// Handle of a [`StatefulScalar`](super::StatefulScalar) in the circuit's scalar arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScalarId(pub usize);

/// Handle of one terminal: the owning component and the terminal's position on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TerminalId {
    pub component: ComponentId,
    pub index: usize,
}

impl TerminalId {
    pub fn new(component: ComponentId, index: usize) -> Self {
        Self { component, index }
    }
}

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component, self.index)
    }
}

/// Orientation of a terminal relative to its component's current.
///
/// Terminal 0 of every component is [`Polarity::Positive`]; terminal 1 of a
/// two-terminal component is [`Polarity::Negative`]. The component current
/// counts as flowing in through the positive terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    /// Polarity of the terminal at `index` on a component.
    pub fn for_index(index: usize) -> Self {
        if index == 0 {
            Polarity::Positive
        } else {
            Polarity::Negative
        }
    }

    /// The sign as a multiplier.
    pub fn sign(self) -> f64 {
        match self {
            Polarity::Positive => 1.0,
            Polarity::Negative => -1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_follows_terminal_index() {
        assert_eq!(Polarity::for_index(0), Polarity::Positive);
        assert_eq!(Polarity::for_index(1), Polarity::Negative);
        assert_eq!(Polarity::Positive.sign(), 1.0);
        assert_eq!(Polarity::Negative.sign(), -1.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(NodeId(3).to_string(), "N3");
        assert_eq!(TerminalId::new(ComponentId(2), 1).to_string(), "X2.1");
    }
}
