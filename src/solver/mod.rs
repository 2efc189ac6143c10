//! Gradient-relaxation solver.
//!
//! This module provides the simulation driver for circuit relaxation.
//!
//! ## Relaxation
//!
//! Instead of assembling and solving a system of equations, every node and
//! component compares the present state against its own law and proposes a
//! small correction:
//!
//! ```text
//! correction = (expected - actual) * learning_rate * rate
//! ```
//!
//! One inner iteration is a compute pass that stages corrections from
//! committed values, followed by a commit pass. The sum of absolute residuals
//! recorded during the compute pass is the iteration's error. Iteration stops
//! once the error falls below the tolerance or the budget runs out, and time
//! then advances to the next instant.
//!
//! A run whose error turns non-finite or exceeds the divergence limit is
//! stopped at that instant and reported as diverged.

mod frame;
mod probes;
mod simulator;

pub use frame::Frame;
pub use probes::{ProbeLog, ProbeSample};
pub use simulator::{
    run_simulation, InstantReport, Observer, SimulationConfig, SimulationReport, Simulator,
};

/// Default time between simulated instants (seconds).
pub const DEFAULT_TIME_STEP: f64 = 1e-3;

/// Default fraction of each residual applied per iteration.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Default number of simulated instants.
pub const DEFAULT_INSTANTS: usize = 100;

/// Default iteration budget per instant.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Default convergence threshold on the summed residual.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Default error above which a run counts as diverged.
pub const DEFAULT_DIVERGENCE_LIMIT: f64 = 1e12;
