//! Capabilities a model may expose to validation tests
//!
//! A capability is an operation contract. Model types implement the
//! capability traits they support and advertise them through [`Model`], which
//! lets a runner holding `&mut dyn Model` check conformance before any test
//! work starts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::trace::{EfelTrace, Trace};
use crate::Result;

/// Named capability, used for required-capability declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Can record the somatic membrane potential over a time window.
    SomaProducesMembranePotential,
    /// Can receive a square current pulse at the soma.
    SomaReceivesStepCurrent,
}

impl Capability {
    /// Capability name as used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SomaProducesMembranePotential => "SomaProducesMembranePotential",
            Self::SomaReceivesStepCurrent => "SomaReceivesStepCurrent",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Enables recording the membrane potential at the soma.
pub trait SomaProducesMembranePotential {
    /// Simulate for `stop_time_ms` (> 0) while recording somatic Vm.
    ///
    /// The returned trace must cover at least `[0, stop_time_ms]`, time in
    /// ms and voltage in mV.
    ///
    /// # Errors
    ///
    /// Implementation defined; simulation failures propagate to the run.
    fn get_soma_membrane_potential(&mut self, stop_time_ms: f64) -> Result<Trace>;

    /// Record a trace and attach the stimulus window for feature extraction.
    ///
    /// `stim_start_ms` / `stim_end_ms` are passed through unchecked.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::get_soma_membrane_potential`].
    fn get_soma_membrane_potential_efel_format(
        &mut self,
        stop_time_ms: f64,
        stim_start_ms: f64,
        stim_end_ms: f64,
    ) -> Result<EfelTrace> {
        let trace = self.get_soma_membrane_potential(stop_time_ms)?;
        Ok(trace.with_stimulus(stim_start_ms, stim_end_ms))
    }
}

/// Square current pulse delivered to the soma.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentInjection {
    /// Pulse onset in ms
    pub delay: f64,
    /// Pulse length in ms
    pub duration: f64,
    /// Pulse amplitude in nA
    pub amplitude: f64,
}

impl CurrentInjection {
    /// Create a pulse description.
    #[must_use]
    pub const fn new(delay: f64, duration: f64, amplitude: f64) -> Self {
        Self {
            delay,
            duration,
            amplitude,
        }
    }

    /// Pulse offset in ms.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.delay + self.duration
    }

    /// Injected current (nA) at time `t_ms`.
    #[must_use]
    pub fn current_at(&self, t_ms: f64) -> f64 {
        if t_ms >= self.delay && t_ms < self.end() {
            self.amplitude
        } else {
            0.0
        }
    }
}

/// Enables step current stimulus into the soma.
pub trait SomaReceivesStepCurrent {
    /// Configure a square pulse; the next recorded trace reflects it.
    ///
    /// # Errors
    ///
    /// Implementation defined.
    fn inject_soma_square_current(&mut self, current: CurrentInjection) -> Result<()>;
}

/// A simulated neuron model that tests can run against.
///
/// Capability accessors default to `None`; a model overrides the ones it
/// implements by returning `Some(self)`.
pub trait Model {
    /// Display name, used for the output directory.
    fn name(&self) -> &str;

    /// Access to membrane-potential recording, if supported.
    fn membrane_potential(&mut self) -> Option<&mut dyn SomaProducesMembranePotential> {
        None
    }

    /// Access to step-current injection, if supported.
    fn step_current(&mut self) -> Option<&mut dyn SomaReceivesStepCurrent> {
        None
    }
}

/// Whether `model` provides `capability`.
pub fn has_capability(model: &mut dyn Model, capability: Capability) -> bool {
    match capability {
        Capability::SomaProducesMembranePotential => model.membrane_potential().is_some(),
        Capability::SomaReceivesStepCurrent => model.step_current().is_some(),
    }
}

/// Required capabilities the model does not provide, in declaration order.
pub fn missing_capabilities(model: &mut dyn Model, required: &[Capability]) -> Vec<Capability> {
    required
        .iter()
        .copied()
        .filter(|&capability| !has_capability(model, capability))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder;

    impl SomaProducesMembranePotential for Recorder {
        fn get_soma_membrane_potential(&mut self, stop_time_ms: f64) -> Result<Trace> {
            Trace::new(vec![0.0, stop_time_ms], vec![-70.0, -70.0])
        }
    }

    impl Model for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn membrane_potential(&mut self) -> Option<&mut dyn SomaProducesMembranePotential> {
            Some(self)
        }
    }

    #[test]
    fn test_efel_format_wraps_window() {
        let efel = Recorder
            .get_soma_membrane_potential_efel_format(100.0, 20.0, 70.0)
            .unwrap();
        assert_eq!(efel.time(), &[0.0, 100.0]);
        assert!((efel.stim_start() - 20.0).abs() < f64::EPSILON);
        assert!((efel.stim_end() - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_efel_format_does_not_check_window() {
        let efel = Recorder
            .get_soma_membrane_potential_efel_format(10.0, 70.0, 20.0)
            .unwrap();
        assert!(efel.stim_start() > efel.stim_end());
    }

    #[test]
    fn test_missing_capabilities() {
        let mut model = Recorder;
        let missing = missing_capabilities(
            &mut model,
            &[
                Capability::SomaReceivesStepCurrent,
                Capability::SomaProducesMembranePotential,
            ],
        );
        assert_eq!(missing, vec![Capability::SomaReceivesStepCurrent]);
    }

    #[test]
    fn test_current_at() {
        let pulse = CurrentInjection::new(20.0, 50.0, -5.0);
        assert!((pulse.current_at(19.9)).abs() < f64::EPSILON);
        assert!((pulse.current_at(20.0) + 5.0).abs() < f64::EPSILON);
        assert!((pulse.current_at(69.9) + 5.0).abs() < f64::EPSILON);
        assert!((pulse.current_at(70.0)).abs() < f64::EPSILON);
    }
}
