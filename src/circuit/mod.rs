//! Circuit graph representation and verification.
//!
//! A [`Circuit`] owns three arenas: nodes, components, and the
//! [`StatefulScalar`]s that hold every node voltage and component current.
//! Cross references between them are index handles (see [`types`]).

mod graph;
mod node;
mod scalar;
pub mod types;
mod validate;

pub use graph::Circuit;
pub use node::{Node, Terminal};
pub use scalar::StatefulScalar;
pub use types::*;
pub use validate::verify_circuit;
