//! # Gradspice
//!
//! An iterative gradient-relaxation circuit solver.
//!
//! This library provides:
//! - A SPICE-flavoured netlist language for describing circuits
//! - A circuit graph of nodes, components and their stateful scalars
//! - Batteries, resistors, capacitors, ground references and voltage probes
//! - A driver that relaxes the circuit toward a consistent state, instant by instant
//!
//! ## Architecture
//!
//! - [`dsl`] - Parser for the netlist language
//! - [`circuit`] - Circuit graph representation and verification
//! - [`components`] - Component models and their correction rules
//! - [`solver`] - Iteration driver, observers and probe log
//!
//! ## Usage
//!
//! ```bash
//! gradspice divider.net --instants 50 -v
//! ```
//!
//! ```no_run
//! use gradspice::{Circuit, Simulator};
//!
//! let mut circuit = Circuit::new();
//! circuit.create_reference(0)?;
//! circuit.create_source(0, 1, 1.5)?;
//! let load = circuit.create_resistor(0, 1, 10.0)?;
//!
//! Simulator::default().run(&mut circuit)?;
//! println!("{} A", circuit.current(load));
//! # Ok::<(), gradspice::GradspiceError>(())
//! ```
//!
//! ## Simulation Method
//!
//! No matrix is assembled. Node voltages and component currents are plain
//! scalars; on every inner iteration each node and component measures how far
//! the state is from its own law and stages a correction proportional to that
//! residual. All staged corrections are then committed together. The inner
//! loop ends when the summed residual drops below the tolerance, and time
//! advances so that capacitors see their charge history. A run whose residual
//! grows without bound stops early and is reported as diverged.

pub mod circuit;
pub mod components;
pub mod dsl;
pub mod error;
pub mod solver;

// Re-export main types for convenience
pub use circuit::Circuit;
pub use components::{DEFAULT_CAPACITOR_CURRENT_GAIN_LIMIT, DEFAULT_CAPACITOR_CURRENT_RATE};
pub use error::{GradspiceError, Result};
pub use solver::{
    run_simulation, SimulationConfig, Simulator, DEFAULT_DIVERGENCE_LIMIT, DEFAULT_INSTANTS,
    DEFAULT_LEARNING_RATE, DEFAULT_MAX_ITERATIONS, DEFAULT_TIME_STEP, DEFAULT_TOLERANCE,
};
