//! Scalar quantities with staged corrections and time history.

/// A scalar unknown of the relaxation (a node voltage or a branch current).
///
/// During an inner iteration corrections are only staged with [`add`](Self::add);
/// [`value`](Self::value) keeps returning the last committed value until
/// [`commit`](Self::commit). History used for derivatives and integrals moves
/// forward once per simulated instant with [`advance_time`](Self::advance_time).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatefulScalar {
    previous: f64,
    current: f64,
    correction: f64,
    integral: f64,
    previous_integral: f64,
}

impl StatefulScalar {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed value.
    pub fn value(&self) -> f64 {
        self.current
    }

    /// Value at the previous simulated instant.
    pub fn previous(&self) -> f64 {
        self.previous
    }

    /// The staged, not yet committed, correction.
    pub fn pending(&self) -> f64 {
        self.correction
    }

    /// Backward difference against the previous instant.
    pub fn derivative(&self, dt: f64) -> f64 {
        (self.current - self.previous) / dt
    }

    /// Running integral, extended to the current value with the trapezoidal rule.
    pub fn integral(&self, dt: f64) -> f64 {
        self.previous_integral + (self.current + self.previous) / 2.0 * dt
    }

    /// Integral stored at the previous instant.
    pub fn previous_integral(&self) -> f64 {
        self.previous_integral
    }

    /// Stage a correction.
    pub fn add(&mut self, correction: f64) {
        self.correction += correction;
    }

    /// Apply the staged correction and refresh the stored integral.
    pub fn commit(&mut self, dt: f64) {
        self.current += self.correction;
        self.integral = self.integral(dt);
        self.correction = 0.0;
    }

    /// Roll history forward to the next simulated instant.
    pub fn advance_time(&mut self) {
        self.previous = self.current;
        self.previous_integral = self.integral;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_add_is_staged_until_commit() {
        let mut s = StatefulScalar::new();
        s.add(0.5);
        s.add(0.25);
        assert_eq!(s.value(), 0.0);
        assert_eq!(s.pending(), 0.75);

        s.commit(1e-3);
        assert_eq!(s.value(), 0.75);
        assert_eq!(s.pending(), 0.0);
    }

    #[test]
    fn test_derivative_uses_previous_instant() {
        let mut s = StatefulScalar::new();
        s.add(1.0);
        s.commit(0.1);
        s.advance_time();
        s.add(0.5);
        s.commit(0.1);
        assert_abs_diff_eq!(s.derivative(0.1), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_trapezoidal_integral_accumulates_over_instants() {
        let dt = 0.5;
        let mut s = StatefulScalar::new();

        // Ramp 0 -> 2 over the first instant: area 0.5 * (0 + 2) / 2
        s.add(2.0);
        s.commit(dt);
        assert_abs_diff_eq!(s.integral(dt), 0.5, epsilon = 1e-12);
        s.advance_time();
        assert_abs_diff_eq!(s.previous_integral(), 0.5, epsilon = 1e-12);

        // Hold at 2: adds 0.5 * 2
        s.commit(dt);
        assert_abs_diff_eq!(s.integral(dt), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_advance_time_without_commit_keeps_integral() {
        let mut s = StatefulScalar::new();
        s.advance_time();
        assert_eq!(s.previous(), 0.0);
        assert_eq!(s.previous_integral(), 0.0);
    }
}
