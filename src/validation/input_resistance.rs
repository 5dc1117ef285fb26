//! Input resistance test

use serde_json::Value;
use tracing::debug;

use super::{capability_error, Prediction, ValidationTest};
use crate::capability::{Capability, CurrentInjection, Model};
use crate::features::{
    FeatureExtractor, StepResponseExtractor, OHMIC_INPUT_RESISTANCE_VB_SSSE, STIMULUS_CURRENT,
};
use crate::observation::Observation;
use crate::{Error, Result};

const INJECTION: CurrentInjection = CurrentInjection::new(20.0, 50.0, -5.0);
const STOP_TIME_MS: f64 = 100.0;
const STIM_START_MS: f64 = 20.0;
const STIM_END_MS: f64 = 70.0;
const STIMULUS_CURRENT_NA: f64 = -5.0;
const REQUIRED: [Capability; 2] = [
    Capability::SomaReceivesStepCurrent,
    Capability::SomaProducesMembranePotential,
];

/// Test the cell's input resistance.
///
/// Injects a hyperpolarizing pulse, records 100 ms and predicts
/// `ohmic_input_resistance_vb_ssse` from the feature extractor.
///
/// The extractor is reset at the start of every prediction, so repeated
/// runs against the same model see the same settings.
#[derive(Debug, Clone, PartialEq)]
pub struct InputResistance<E = StepResponseExtractor> {
    name: String,
    observation: Value,
    extractor: E,
}

impl InputResistance {
    /// Default display name.
    pub const DEFAULT_NAME: &'static str = "Input Resistance Test";
    /// Injected pulse: 20 ms delay, 50 ms long, -5 nA.
    pub const INJECTION: CurrentInjection = INJECTION;
    /// Recording window in ms.
    pub const STOP_TIME_MS: f64 = STOP_TIME_MS;
    /// Stimulus window start handed to the extractor, in ms.
    pub const STIM_START_MS: f64 = STIM_START_MS;
    /// Stimulus window end handed to the extractor, in ms.
    pub const STIM_END_MS: f64 = STIM_END_MS;
    /// `stimulus_current` extractor setting, in nA.
    pub const STIMULUS_CURRENT_NA: f64 = STIMULUS_CURRENT_NA;

    /// Create the test with an observation, usually `{mean, std}` in MOhm.
    #[must_use]
    pub fn new(observation: impl Into<Value>) -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            observation: observation.into(),
            extractor: StepResponseExtractor::new(),
        }
    }
}

impl<E: FeatureExtractor> InputResistance<E> {
    /// Override the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Use a different feature extractor.
    #[must_use]
    pub fn with_extractor<F: FeatureExtractor>(self, extractor: F) -> InputResistance<F> {
        InputResistance {
            name: self.name,
            observation: self.observation,
            extractor,
        }
    }

    /// The feature extractor in use.
    #[must_use]
    pub const fn extractor(&self) -> &E {
        &self.extractor
    }
}

impl Default for InputResistance {
    fn default() -> Self {
        Self::new(Observation::unset())
    }
}

impl<E: FeatureExtractor> ValidationTest for InputResistance<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Test the cell's input resistance"
    }

    fn required_capabilities(&self) -> &[Capability] {
        &REQUIRED
    }

    fn observation(&self) -> &Value {
        &self.observation
    }

    fn generate_prediction(&mut self, model: &mut dyn Model) -> Result<Prediction> {
        self.extractor.reset();
        let model_name = model.name().to_string();

        let injector = model.step_current().ok_or_else(|| {
            capability_error(&self.name, &model_name, Capability::SomaReceivesStepCurrent)
        })?;
        injector.inject_soma_square_current(INJECTION)?;

        let recorder = model.membrane_potential().ok_or_else(|| {
            capability_error(
                &self.name,
                &model_name,
                Capability::SomaProducesMembranePotential,
            )
        })?;
        let trace = recorder.get_soma_membrane_potential_efel_format(
            STOP_TIME_MS,
            STIM_START_MS,
            STIM_END_MS,
        )?;

        self.extractor
            .set_double_setting(STIMULUS_CURRENT, STIMULUS_CURRENT_NA)?;
        let values = self.extractor.get_feature_values(
            std::slice::from_ref(&trace),
            &[OHMIC_INPUT_RESISTANCE_VB_SSSE],
        )?;
        let value = values
            .first()
            .and_then(|features| features.get(OHMIC_INPUT_RESISTANCE_VB_SSSE))
            .and_then(|series| series.first())
            .copied()
            .ok_or_else(|| Error::FeatureUnavailable {
                feature: OHMIC_INPUT_RESISTANCE_VB_SSSE.to_string(),
                reason: "extractor returned no value".to_string(),
            })?;
        debug!(input_resistance = value, "feature extracted");

        Ok(Prediction::new(value, trace.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{SomaProducesMembranePotential, SomaReceivesStepCurrent};
    use crate::features::FeatureValues;
    use crate::trace::{EfelTrace, RecordedTrace, Trace};

    /// Responds with -65 mV at rest and -65 + 100 * I during the pulse.
    #[derive(Default)]
    struct StepCell {
        pulses: Vec<CurrentInjection>,
        windows: Vec<f64>,
    }

    impl SomaProducesMembranePotential for StepCell {
        fn get_soma_membrane_potential(&mut self, stop_time_ms: f64) -> Result<Trace> {
            self.windows.push(stop_time_ms);
            let pulse = self.pulses.last().copied();
            let time: Vec<f64> = (0..=100).map(f64::from).collect();
            let voltage = time
                .iter()
                .map(|&t| {
                    let current = pulse.map_or(0.0, |p| {
                        if t > p.delay && t <= p.end() {
                            p.amplitude
                        } else {
                            0.0
                        }
                    });
                    100.0f64.mul_add(current, -65.0)
                })
                .collect();
            Trace::new(time, voltage)
        }
    }

    impl SomaReceivesStepCurrent for StepCell {
        fn inject_soma_square_current(&mut self, current: CurrentInjection) -> Result<()> {
            self.pulses.push(current);
            Ok(())
        }
    }

    impl Model for StepCell {
        fn name(&self) -> &str {
            "step-cell"
        }

        fn membrane_potential(&mut self) -> Option<&mut dyn SomaProducesMembranePotential> {
            Some(self)
        }

        fn step_current(&mut self) -> Option<&mut dyn SomaReceivesStepCurrent> {
            Some(self)
        }
    }

    /// Extractor that records how it was driven.
    #[derive(Default)]
    struct Spy {
        resets: usize,
        settings: Vec<(String, f64)>,
    }

    impl FeatureExtractor for Spy {
        fn reset(&mut self) {
            self.resets += 1;
            self.settings.clear();
        }

        fn set_double_setting(&mut self, name: &str, value: f64) -> Result<()> {
            self.settings.push((name.to_string(), value));
            Ok(())
        }

        fn get_feature_values(
            &self,
            traces: &[EfelTrace],
            features: &[&str],
        ) -> Result<Vec<FeatureValues>> {
            Ok(traces
                .iter()
                .map(|_| features.iter().map(|f| ((*f).to_string(), vec![42.0])).collect())
                .collect())
        }
    }

    #[test]
    fn test_injects_fixed_pulse_before_recording() {
        let mut model = StepCell::default();
        let mut test = InputResistance::new(Observation::new(100.0, 10.0));
        test.generate_prediction(&mut model).unwrap();
        assert_eq!(model.pulses, vec![CurrentInjection::new(20.0, 50.0, -5.0)]);
        assert_eq!(model.windows, vec![100.0]);
    }

    #[test]
    fn test_trace_carries_stimulus_window() {
        let mut model = StepCell::default();
        let mut test = InputResistance::new(Observation::new(100.0, 10.0));
        let prediction = test.generate_prediction(&mut model).unwrap();
        let RecordedTrace::Efel(trace) = prediction.trace() else {
            panic!("expected a stimulus-annotated trace");
        };
        assert!((trace.stim_start() - 20.0).abs() < f64::EPSILON);
        assert!((trace.stim_end() - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_predicts_input_resistance() {
        let mut model = StepCell::default();
        let mut test = InputResistance::new(Observation::new(100.0, 10.0));
        let prediction = test.generate_prediction(&mut model).unwrap();
        assert!((prediction.value() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_extractor_reset_and_configured_each_run() {
        let mut model = StepCell::default();
        let mut test =
            InputResistance::new(Observation::new(100.0, 10.0)).with_extractor(Spy::default());
        let first = test.generate_prediction(&mut model).unwrap();
        let second = test.generate_prediction(&mut model).unwrap();

        assert_eq!(test.extractor().resets, 2);
        assert_eq!(
            test.extractor().settings,
            vec![(STIMULUS_CURRENT.to_string(), -5.0)]
        );
        assert!((first.value() - 42.0).abs() < f64::EPSILON);
        assert_eq!(first, second);
    }

    #[test]
    fn test_required_capabilities() {
        let test = InputResistance::default();
        assert_eq!(
            test.required_capabilities(),
            &[
                Capability::SomaReceivesStepCurrent,
                Capability::SomaProducesMembranePotential
            ]
        );
    }
}
