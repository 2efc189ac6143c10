//! Per-iteration context.

/// Parameters and error accounting for one inner iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Fraction of each residual applied as a correction.
    pub learning_rate: f64,
    /// Simulated time between instants (seconds).
    pub time_step: f64,
    /// Sum of absolute residuals recorded so far.
    pub error: f64,
    /// Number of residuals recorded so far.
    pub parameters: usize,
}

impl Frame {
    pub fn new(learning_rate: f64, time_step: f64) -> Self {
        Self {
            learning_rate,
            time_step,
            error: 0.0,
            parameters: 0,
        }
    }

    /// Record one residual.
    pub fn record(&mut self, residual: f64) {
        self.error += residual.abs();
        self.parameters += 1;
    }
}
