//! Probe voltage history.

use std::fmt::Write;

use crate::circuit::Circuit;
use crate::components::ComponentKind;

use super::{InstantReport, Observer};

/// Probe readings at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeSample {
    pub time: f64,
    /// `(probe label, voltage)` in component order.
    pub voltages: Vec<(String, f64)>,
}

/// Observer that records every probe's voltage at the end of each instant.
#[derive(Debug, Clone, Default)]
pub struct ProbeLog {
    samples: Vec<ProbeSample>,
}

impl ProbeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> &[ProbeSample] {
        &self.samples
    }

    /// Most recent voltage read by the named probe.
    pub fn latest(&self, probe: &str) -> Option<f64> {
        self.samples.last()?.voltages.iter().find(|(name, _)| name == probe).map(|(_, v)| *v)
    }

    /// Tab separated table, one line per instant: `time name:value ...`.
    pub fn render(&self) -> String {
        Self::render_samples(&self.samples)
    }

    /// Like [`render`](Self::render), for the final instant only.
    pub fn render_last(&self) -> String {
        let n = self.samples.len();
        Self::render_samples(&self.samples[n.saturating_sub(1)..])
    }

    fn render_samples(samples: &[ProbeSample]) -> String {
        let mut out = String::new();
        for sample in samples {
            let _ = write!(out, "{:.6}", sample.time);
            for (name, voltage) in &sample.voltages {
                let _ = write!(out, "\t{name}:{voltage:.6}");
            }
            out.push('\n');
        }
        out
    }
}

impl Observer for ProbeLog {
    fn on_instant(&mut self, circuit: &Circuit, report: &InstantReport) {
        let voltages = circuit
            .components()
            .iter()
            .filter(|c| matches!(c.kind(), ComponentKind::Probe(_)))
            .filter_map(|c| Some((c.label(), circuit.terminal_voltage(c.id(), 0)?)))
            .collect();
        self.samples.push(ProbeSample {
            time: report.time,
            voltages,
        });
    }
}
