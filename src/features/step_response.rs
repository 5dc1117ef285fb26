//! Steady-state step-response features.

use std::collections::BTreeMap;

use tracing::debug;

use super::{
    FeatureExtractor, FeatureValues, OHMIC_INPUT_RESISTANCE_VB_SSSE, STEADY_STATE_VOLTAGE_STIMEND,
    STIMULUS_CURRENT, VOLTAGE_BASE, VOLTAGE_BASE_END_PERC, VOLTAGE_BASE_START_PERC,
    VOLTAGE_DEFLECTION_VB_SSSE,
};
use crate::trace::EfelTrace;
use crate::{Error, Result};

/// Fraction of the stimulus window, counted back from `stim_end`, that is
/// averaged for the steady-state voltage.
const STEADY_STATE_FRACTION: f64 = 0.1;

/// Built-in extractor for baseline, steady state, deflection and ohmic
/// input resistance.
///
/// ## Definitions
///
/// - `voltage_base`: mean V with `start_perc * stim_start <= t <= end_perc * stim_start`
/// - `steady_state_voltage_stimend`: mean V with
///   `stim_end - 0.1 * (stim_end - stim_start) <= t < stim_end`
/// - `voltage_deflection_vb_ssse`: steady state minus baseline
/// - `ohmic_input_resistance_vb_ssse`: deflection / `stimulus_current`
#[derive(Debug, Clone, PartialEq)]
pub struct StepResponseExtractor {
    settings: BTreeMap<&'static str, f64>,
}

impl StepResponseExtractor {
    /// Create an extractor with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: default_settings(),
        }
    }

    /// Current value of a setting.
    #[must_use]
    pub fn setting(&self, name: &str) -> Option<f64> {
        self.settings.get(name).copied()
    }

    fn setting_or_default(&self, name: &'static str) -> f64 {
        self.settings
            .get(name)
            .copied()
            .or_else(|| default_settings().get(name).copied())
            .unwrap_or_default()
    }

    fn voltage_base(&self, trace: &EfelTrace) -> Result<f64> {
        let start = self.setting_or_default(VOLTAGE_BASE_START_PERC) * trace.stim_start();
        let end = self.setting_or_default(VOLTAGE_BASE_END_PERC) * trace.stim_start();
        window_mean(trace, VOLTAGE_BASE, |t| t >= start && t <= end)
    }

    fn steady_state_voltage_stimend(trace: &EfelTrace) -> Result<f64> {
        let end = trace.stim_end();
        let begin = end - STEADY_STATE_FRACTION * (end - trace.stim_start());
        window_mean(trace, STEADY_STATE_VOLTAGE_STIMEND, |t| t >= begin && t < end)
    }

    fn voltage_deflection_vb_ssse(&self, trace: &EfelTrace) -> Result<f64> {
        Ok(Self::steady_state_voltage_stimend(trace)? - self.voltage_base(trace)?)
    }

    fn ohmic_input_resistance_vb_ssse(&self, trace: &EfelTrace) -> Result<f64> {
        let current = self.setting_or_default(STIMULUS_CURRENT);
        if current == 0.0 {
            return Err(Error::FeatureUnavailable {
                feature: OHMIC_INPUT_RESISTANCE_VB_SSSE.to_string(),
                reason: "stimulus_current is zero".to_string(),
            });
        }
        Ok(self.voltage_deflection_vb_ssse(trace)? / current)
    }

    fn compute(&self, trace: &EfelTrace, feature: &str) -> Result<f64> {
        match feature {
            VOLTAGE_BASE => self.voltage_base(trace),
            STEADY_STATE_VOLTAGE_STIMEND => Self::steady_state_voltage_stimend(trace),
            VOLTAGE_DEFLECTION_VB_SSSE => self.voltage_deflection_vb_ssse(trace),
            OHMIC_INPUT_RESISTANCE_VB_SSSE => self.ohmic_input_resistance_vb_ssse(trace),
            other => Err(Error::UnknownFeature(other.to_string())),
        }
    }
}

impl Default for StepResponseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor for StepResponseExtractor {
    fn reset(&mut self) {
        self.settings = default_settings();
    }

    fn set_double_setting(&mut self, name: &str, value: f64) -> Result<()> {
        let Some(slot) = self.settings.get_mut(name) else {
            return Err(Error::UnknownSetting(name.to_string()));
        };
        *slot = value;
        debug!(setting = name, value, "feature extractor setting updated");
        Ok(())
    }

    fn get_feature_values(
        &self,
        traces: &[EfelTrace],
        features: &[&str],
    ) -> Result<Vec<FeatureValues>> {
        traces
            .iter()
            .map(|trace| -> Result<FeatureValues> {
                trace.validate()?;
                features
                    .iter()
                    .map(|&feature| -> Result<(String, Vec<f64>)> {
                        Ok((feature.to_string(), vec![self.compute(trace, feature)?]))
                    })
                    .collect()
            })
            .collect()
    }
}

fn default_settings() -> BTreeMap<&'static str, f64> {
    BTreeMap::from([
        (STIMULUS_CURRENT, 0.0),
        (VOLTAGE_BASE_START_PERC, 0.9),
        (VOLTAGE_BASE_END_PERC, 1.0),
    ])
}

fn window_mean(trace: &EfelTrace, feature: &str, in_window: impl Fn(f64) -> bool) -> Result<f64> {
    let (sum, count) = trace
        .time()
        .iter()
        .zip(trace.voltage())
        .filter(|&(&t, _)| in_window(t))
        .fold((0.0, 0_u32), |(sum, count), (_, &v)| (sum + v, count + 1));
    if count == 0 {
        return Err(Error::FeatureUnavailable {
            feature: feature.to_string(),
            reason: "no samples inside the averaging window".to_string(),
        });
    }
    Ok(sum / f64::from(count))
}
