//! Linear passive components: Resistor, Capacitor.

use super::{
    Component, Sweep, DEFAULT_CAPACITOR_CURRENT_GAIN_LIMIT, DEFAULT_CAPACITOR_CURRENT_RATE,
};
use crate::circuit::StatefulScalar;
use crate::error::{GradspiceError, Result};

/// A resistor.
///
/// Each step relaxes both forms of Ohm's law at once: the current toward
/// `drop / R` and the drop toward `current * R`, both computed from the
/// values committed before the step.
#[derive(Debug, Clone, PartialEq)]
pub struct Resistor {
    resistance: f64,
}

impl Resistor {
    /// Create a new resistor. Fails on zero or non-finite resistance.
    pub fn new(resistance: f64) -> Result<Self> {
        Self::check(resistance)?;
        Ok(Self { resistance })
    }

    pub fn resistance(&self) -> f64 {
        self.resistance
    }

    pub fn set_resistance(&mut self, resistance: f64) -> Result<&mut Self> {
        Self::check(resistance)?;
        self.resistance = resistance;
        Ok(self)
    }

    fn check(resistance: f64) -> Result<()> {
        if resistance == 0.0 {
            return Err(GradspiceError::invalid_parameter(
                "resistor",
                "resistance",
                "resistance cannot be zero for resistor",
            ));
        }
        if !resistance.is_finite() {
            return Err(GradspiceError::invalid_parameter(
                "resistor",
                "resistance",
                format!("resistance must be finite, got {resistance}"),
            ));
        }
        Ok(())
    }

    pub(crate) fn step(&self, component: &Component, sweep: &mut Sweep<'_>) {
        let Some(drop) = component.voltage_drop(sweep) else {
            return;
        };
        let current = component.current(sweep);

        component.apply_expected_current(sweep, drop / self.resistance, 1.0);
        component.apply_expected_voltage(sweep, current * self.resistance, 1.0);
    }
}

/// A capacitor.
///
/// Two channels are relaxed every step:
///
/// - charge: the drop is nudged toward `Q / C`, where `Q` is the trapezoidal
///   integral of the component current;
/// - current: the current is nudged toward the trapezoidal companion value
///   `2 (C * drop - Q_prev) / dt - I_prev`, the current that makes the
///   accumulated charge match `C * drop` at the end of the time step.
///
/// The companion target moves by `2C / dt` per volt of drop, so the current
/// channel behaves like a conductance of `rate * 2C / dt`. The rate used is
/// `current_rate`, lowered where needed so that this conductance stays at or
/// below `current_gain_limit` (see [`effective_current_rate`]).
///
/// # Stable range
///
/// With the default rate, limit and learning rate, a capacitor in series
/// with a resistance `R` relaxes stably when:
///
/// - `R * current_gain_limit` stays below about 20, which is `R` up to
///   10 kΩ with the default limit, at any capacitance;
/// - the charge channel's equivalent resistance `dt / (2C)` is no more than
///   about 25 times `R`.
///
/// Outside that range the relaxation oscillates with growing amplitude. The
/// driver reports such runs as diverged. A capacitor wired straight across a
/// source settles within the default iteration budget while the effective rate
/// stays at `current_rate`, that is while `C <= current_gain_limit * dt / (2 *
/// current_rate)`. Larger capacitors still approach the source voltage, but
/// they need more iterations per instant.
///
/// [`effective_current_rate`]: Self::effective_current_rate
#[derive(Debug, Clone, PartialEq)]
pub struct Capacitor {
    capacitance: f64,
    current_rate: f64,
    current_gain_limit: f64,
}

impl Capacitor {
    /// Create a new capacitor. Fails unless the capacitance is positive and finite.
    pub fn new(capacitance: f64) -> Result<Self> {
        Self::check_positive("capacitance", capacitance)?;
        Ok(Self {
            capacitance,
            current_rate: DEFAULT_CAPACITOR_CURRENT_RATE,
            current_gain_limit: DEFAULT_CAPACITOR_CURRENT_GAIN_LIMIT,
        })
    }

    pub fn capacitance(&self) -> f64 {
        self.capacitance
    }

    pub fn set_capacitance(&mut self, capacitance: f64) -> Result<&mut Self> {
        Self::check_positive("capacitance", capacitance)?;
        self.capacitance = capacitance;
        Ok(self)
    }

    pub fn current_rate(&self) -> f64 {
        self.current_rate
    }

    /// Set the upper bound on the current channel's rate multiplier.
    pub fn set_current_rate(&mut self, rate: f64) -> Result<&mut Self> {
        self.current_rate = Self::check_positive("current_rate", rate)?;
        Ok(self)
    }

    /// Builder form of [`set_current_rate`](Self::set_current_rate).
    pub fn with_current_rate(mut self, rate: f64) -> Result<Self> {
        self.set_current_rate(rate)?;
        Ok(self)
    }

    pub fn current_gain_limit(&self) -> f64 {
        self.current_gain_limit
    }

    /// Set the largest conductance, in siemens, the current channel may act with.
    pub fn set_current_gain_limit(&mut self, limit: f64) -> Result<&mut Self> {
        self.current_gain_limit = Self::check_positive("current_gain_limit", limit)?;
        Ok(self)
    }

    /// Rate multiplier of the current channel at time step `dt`:
    /// `min(current_rate, current_gain_limit * dt / (2C))`.
    pub fn effective_current_rate(&self, dt: f64) -> f64 {
        let capped = self.current_gain_limit * dt / (2.0 * self.capacitance);
        self.current_rate.min(capped)
    }

    /// Charge accumulated from the component current.
    pub fn charge(&self, current: &StatefulScalar, dt: f64) -> f64 {
        current.integral(dt)
    }

    fn check_positive(param: &str, value: f64) -> Result<f64> {
        if !(value > 0.0 && value.is_finite()) {
            return Err(GradspiceError::invalid_parameter(
                "capacitor",
                param,
                format!("{param} must be positive and finite, got {value}"),
            ));
        }
        Ok(value)
    }

    pub(crate) fn step(&self, component: &Component, sweep: &mut Sweep<'_>) {
        let Some(drop) = component.voltage_drop(sweep) else {
            return;
        };
        let dt = sweep.frame.time_step;
        let current = &sweep.scalars[component.current_scalar().0];
        let charge = self.charge(current, dt);
        let previous_charge = current.previous_integral();
        let previous_current = current.previous();

        component.apply_expected_voltage(sweep, charge / self.capacitance, 1.0);

        let expected_current =
            2.0 * (self.capacitance * drop - previous_charge) / dt - previous_current;
        component.apply_expected_current(sweep, expected_current, self.effective_current_rate(dt));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_resistance_rejected() {
        let err = Resistor::new(0.0).unwrap_err();
        assert!(matches!(err, GradspiceError::InvalidParameter { ref param, .. } if param == "resistance"));

        let mut r = Resistor::new(10.0).unwrap();
        assert!(r.set_resistance(0.0).is_err());
        assert_eq!(r.resistance(), 10.0);
        r.set_resistance(-5.0).unwrap();
        assert_eq!(r.resistance(), -5.0);
    }

    #[test]
    fn test_capacitance_must_be_positive() {
        assert!(Capacitor::new(0.0).is_err());
        assert!(Capacitor::new(-1e-6).is_err());
        assert!(Capacitor::new(f64::NAN).is_err());

        let mut c = Capacitor::new(1e-6).unwrap();
        assert_eq!(c.current_rate(), DEFAULT_CAPACITOR_CURRENT_RATE);
        assert_eq!(c.current_gain_limit(), DEFAULT_CAPACITOR_CURRENT_GAIN_LIMIT);
        assert!(c.clone().with_current_rate(0.0).is_err());
        assert!(c.set_current_gain_limit(f64::INFINITY).is_err());
        assert!(c.set_capacitance(-1.0).is_err());
        assert_eq!(c.capacitance(), 1e-6);
        assert_eq!(c.with_current_rate(0.5).unwrap().current_rate(), 0.5);
    }

    #[test]
    fn test_current_rate_is_capped_for_large_capacitance() {
        let dt = 1e-3;
        let small = Capacitor::new(1e-5).unwrap();
        assert_eq!(small.effective_current_rate(dt), DEFAULT_CAPACITOR_CURRENT_RATE);

        let mut large = Capacitor::new(1.0).unwrap();
        assert_relative_eq!(large.effective_current_rate(dt), 1e-6, max_relative = 1e-12);
        assert_relative_eq!(
            large.effective_current_rate(dt) * 2.0 / dt,
            DEFAULT_CAPACITOR_CURRENT_GAIN_LIMIT,
            max_relative = 1e-12
        );

        large.set_capacitance(1e-6).unwrap().set_current_rate(0.02).unwrap();
        assert_eq!(large.effective_current_rate(dt), 0.02);
    }

    #[test]
    fn test_charge_is_current_integral() {
        let c = Capacitor::new(2.0).unwrap();
        let mut current = StatefulScalar::new();
        current.add(4.0);
        current.commit(0.5);
        assert_eq!(c.charge(&current, 0.5), 1.0);
    }
}
