//! Resting membrane potential test

use serde_json::Value;

use super::{capability_error, Prediction, ValidationTest};
use crate::capability::{Capability, Model};
use crate::observation::Observation;
use crate::Result;

const REQUIRED: [Capability; 1] = [Capability::SomaProducesMembranePotential];

/// Test the cell's resting membrane potential.
///
/// Records 50 ms without stimulus and predicts the mean voltage.
#[derive(Debug, Clone, PartialEq)]
pub struct RestingPotential {
    name: String,
    observation: Value,
}

impl RestingPotential {
    /// Default display name.
    pub const DEFAULT_NAME: &'static str = "Resting Membrane Potential Test";
    /// Recording window in ms.
    pub const STOP_TIME_MS: f64 = 50.0;

    /// Create the test with an observation, usually `{mean, std}` in mV.
    ///
    /// The observation is checked when the test runs, not here.
    #[must_use]
    pub fn new(observation: impl Into<Value>) -> Self {
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            observation: observation.into(),
        }
    }

    /// Override the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl Default for RestingPotential {
    fn default() -> Self {
        Self::new(Observation::unset())
    }
}

impl ValidationTest for RestingPotential {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Test the cell's resting membrane potential"
    }

    fn required_capabilities(&self) -> &[Capability] {
        &REQUIRED
    }

    fn observation(&self) -> &Value {
        &self.observation
    }

    fn generate_prediction(&mut self, model: &mut dyn Model) -> Result<Prediction> {
        let model_name = model.name().to_string();
        let recorder = model.membrane_potential().ok_or_else(|| {
            capability_error(
                &self.name,
                &model_name,
                Capability::SomaProducesMembranePotential,
            )
        })?;
        let trace = recorder.get_soma_membrane_potential(Self::STOP_TIME_MS)?;
        let value = trace.mean_voltage()?;
        Ok(Prediction::new(value, trace.into()))
    }
}
