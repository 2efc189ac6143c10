//! Main simulation driver.

use crate::circuit::Circuit;
use crate::dsl::NetlistSettings;
use crate::error::{GradspiceError, Result};

use super::{
    Frame, DEFAULT_DIVERGENCE_LIMIT, DEFAULT_INSTANTS, DEFAULT_LEARNING_RATE,
    DEFAULT_MAX_ITERATIONS, DEFAULT_TIME_STEP, DEFAULT_TOLERANCE,
};

/// Configuration for the simulation driver.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Simulated time between instants (seconds).
    pub time_step: f64,
    /// Fraction of each residual applied per iteration.
    pub learning_rate: f64,
    /// Number of instants in the outer loop.
    pub instants: usize,
    /// Iteration budget per instant.
    pub max_iterations: usize,
    /// An instant is settled once an iteration's error falls below this.
    pub tolerance: f64,
    /// The run stops as diverged once an iteration's error exceeds this.
    pub divergence_limit: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP,
            learning_rate: DEFAULT_LEARNING_RATE,
            instants: DEFAULT_INSTANTS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            divergence_limit: DEFAULT_DIVERGENCE_LIMIT,
        }
    }
}

impl SimulationConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    /// Set the learning rate.
    ///
    /// Larger rates settle in fewer iterations but can oscillate or diverge;
    /// the default of 0.1 is stable for the supported components.
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_instants(mut self, instants: usize) -> Self {
        self.instants = instants;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_divergence_limit(mut self, divergence_limit: f64) -> Self {
        self.divergence_limit = divergence_limit;
        self
    }

    /// Apply the directives found in a netlist. Unset directives keep the current value.
    pub fn with_settings(mut self, settings: &NetlistSettings) -> Self {
        if let Some(v) = settings.time_step {
            self.time_step = v;
        }
        if let Some(v) = settings.learning_rate {
            self.learning_rate = v;
        }
        if let Some(v) = settings.instants {
            self.instants = v;
        }
        if let Some(v) = settings.max_iterations {
            self.max_iterations = v;
        }
        if let Some(v) = settings.tolerance {
            self.tolerance = v;
        }
        self
    }

    /// Check that every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("time step", self.time_step),
            ("learning rate", self.learning_rate),
            ("tolerance", self.tolerance),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(GradspiceError::simulation_param(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if self.divergence_limit.is_nan() || self.divergence_limit <= self.tolerance {
            return Err(GradspiceError::simulation_param(format!(
                "divergence limit must exceed the tolerance, got {}",
                self.divergence_limit
            )));
        }
        if self.instants == 0 {
            return Err(GradspiceError::simulation_param("instant count must be at least 1"));
        }
        if self.max_iterations == 0 {
            return Err(GradspiceError::simulation_param("iteration budget must be at least 1"));
        }
        Ok(())
    }
}

/// Outcome of one simulated instant.
#[derive(Debug, Clone, PartialEq)]
pub struct InstantReport {
    /// Position in the outer loop, from 0.
    pub index: usize,
    /// Simulated time at the end of this instant.
    pub time: f64,
    /// Inner iterations run.
    pub iterations: usize,
    /// Error of the last iteration.
    pub error: f64,
    /// Residuals recorded by the last iteration.
    pub parameters: usize,
    /// Whether the error fell below the tolerance within the budget.
    pub converged: bool,
    /// Whether the error or any scalar became non-finite, or the error
    /// exceeded the divergence limit. A diverged instant ends the run.
    pub diverged: bool,
}

/// Per-instant reports of a whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationReport {
    pub instants: Vec<InstantReport>,
}

impl SimulationReport {
    /// Report of the final instant.
    pub fn last(&self) -> Option<&InstantReport> {
        self.instants.last()
    }

    /// Whether every instant settled.
    pub fn converged(&self) -> bool {
        self.instants.iter().all(|r| r.converged)
    }

    /// Number of instants that did not settle.
    pub fn unconverged(&self) -> usize {
        self.instants.iter().filter(|r| !r.converged).count()
    }

    /// The instant at which the run diverged, if it did.
    pub fn divergence(&self) -> Option<&InstantReport> {
        self.instants.iter().find(|r| r.diverged)
    }

    pub fn diverged(&self) -> bool {
        self.divergence().is_some()
    }

    pub fn total_iterations(&self) -> usize {
        self.instants.iter().map(|r| r.iterations).sum()
    }
}

/// Hooks into a running simulation.
pub trait Observer {
    /// Called after every inner iteration.
    fn on_iteration(&mut self, _iteration: usize, _frame: &Frame) {}

    /// Called once per instant, after the inner loop and before time advances.
    fn on_instant(&mut self, _circuit: &Circuit, _report: &InstantReport) {}
}

/// The null observer.
impl Observer for () {}

/// The simulation driver.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    /// Create a driver, rejecting unusable parameters.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Verify the circuit, then run every instant.
    pub fn run(&self, circuit: &mut Circuit) -> Result<SimulationReport> {
        self.run_with(circuit, &mut ())
    }

    /// As [`run`](Self::run), reporting progress to `observer`.
    pub fn run_with<O: Observer + ?Sized>(
        &self,
        circuit: &mut Circuit,
        observer: &mut O,
    ) -> Result<SimulationReport> {
        circuit.verify()?;

        let config = &self.config;
        tracing::info!(
            nodes = circuit.nodes().len(),
            components = circuit.components().len(),
            instants = config.instants,
            time_step = config.time_step,
            learning_rate = config.learning_rate,
            "starting simulation"
        );

        let mut report = SimulationReport {
            instants: Vec::with_capacity(config.instants),
        };
        for index in 0..config.instants {
            let instant = self.run_instant(circuit, observer, index);

            if instant.diverged {
                tracing::warn!(
                    instant = index,
                    iterations = instant.iterations,
                    error = instant.error,
                    "relaxation diverged, stopping"
                );
            } else if instant.converged {
                tracing::debug!(
                    instant = index,
                    iterations = instant.iterations,
                    error = instant.error,
                    "instant settled"
                );
            } else {
                tracing::warn!(
                    instant = index,
                    error = instant.error,
                    max_iterations = config.max_iterations,
                    "instant did not settle within the iteration budget"
                );
            }

            observer.on_instant(circuit, &instant);
            let diverged = instant.diverged;
            report.instants.push(instant);
            if diverged {
                break;
            }
            circuit.advance_time();
        }

        tracing::info!(
            instants = report.instants.len(),
            unconverged = report.unconverged(),
            diverged = report.diverged(),
            iterations = report.total_iterations(),
            "simulation finished"
        );
        Ok(report)
    }

    fn run_instant<O: Observer + ?Sized>(
        &self,
        circuit: &mut Circuit,
        observer: &mut O,
        index: usize,
    ) -> InstantReport {
        let config = &self.config;
        let mut last = Frame::new(config.learning_rate, config.time_step);
        let mut iterations = 0;
        let mut diverged = false;

        for iteration in 0..config.max_iterations {
            let mut frame = Frame::new(config.learning_rate, config.time_step);
            circuit.step(&mut frame);
            iterations = iteration + 1;

            tracing::trace!(
                instant = index,
                iteration,
                error = frame.error,
                parameters = frame.parameters,
                "iteration"
            );
            observer.on_iteration(iteration, &frame);

            last = frame;
            if !last.error.is_finite() || last.error > config.divergence_limit {
                diverged = true;
                break;
            }
            if last.error < config.tolerance {
                break;
            }
        }
        let diverged = diverged || !circuit.is_finite();

        InstantReport {
            index,
            time: (index + 1) as f64 * config.time_step,
            iterations,
            error: last.error,
            parameters: last.parameters,
            converged: !diverged && last.error < config.tolerance,
            diverged,
        }
    }
}

/// Run the default driver with the given time step and learning rate.
pub fn run_simulation(circuit: &mut Circuit, time_step: f64, learning_rate: f64) -> Result<SimulationReport> {
    let config = SimulationConfig::new()
        .with_time_step(time_step)
        .with_learning_rate(learning_rate);
    Simulator::new(config)?.run(circuit)
}
