//! Electrophysiological feature extraction from voltage traces
//!
//! Tests do not compute features themselves; they drive a
//! [`FeatureExtractor`] the same way every time:
//!
//! 1. [`FeatureExtractor::reset`] - restore default settings
//! 2. [`FeatureExtractor::set_double_setting`] - e.g. `stimulus_current`
//! 3. [`FeatureExtractor::get_feature_values`] - one map per input trace
//!
//! [`StepResponseExtractor`] is the built-in implementation and covers the
//! steady-state step-response features.
//!
//! # Example
//!
//! ```rust
//! use soma_validation::features::{FeatureExtractor, StepResponseExtractor};
//! use soma_validation::trace::Trace;
//!
//! # fn main() -> soma_validation::Result<()> {
//! let time: Vec<f64> = (0..=100).map(f64::from).collect();
//! let voltage: Vec<f64> = time
//!     .iter()
//!     .map(|&t| if t > 20.0 && t <= 70.0 { -75.0 } else { -65.0 })
//!     .collect();
//! let trace = Trace::new(time, voltage)?.with_stimulus(20.0, 70.0);
//!
//! let mut extractor = StepResponseExtractor::new();
//! extractor.reset();
//! extractor.set_double_setting("stimulus_current", -5.0)?;
//! let values = extractor.get_feature_values(&[trace], &["ohmic_input_resistance_vb_ssse"])?;
//! assert_eq!(values[0]["ohmic_input_resistance_vb_ssse"], vec![2.0]);
//! # Ok(())
//! # }
//! ```

mod step_response;

pub use step_response::StepResponseExtractor;

use std::collections::BTreeMap;

use crate::trace::EfelTrace;
use crate::Result;

/// Feature name to computed values, for one trace.
pub type FeatureValues = BTreeMap<String, Vec<f64>>;

/// Mean voltage before stimulus onset (mV).
pub const VOLTAGE_BASE: &str = "voltage_base";
/// Mean voltage over the last 10% of the stimulus (mV).
pub const STEADY_STATE_VOLTAGE_STIMEND: &str = "steady_state_voltage_stimend";
/// Steady state minus baseline (mV).
pub const VOLTAGE_DEFLECTION_VB_SSSE: &str = "voltage_deflection_vb_ssse";
/// Deflection divided by stimulus current (MOhm for mV / nA).
pub const OHMIC_INPUT_RESISTANCE_VB_SSSE: &str = "ohmic_input_resistance_vb_ssse";

/// Stimulus current setting, in nA.
pub const STIMULUS_CURRENT: &str = "stimulus_current";
/// Baseline window start, as a fraction of `stim_start`.
pub const VOLTAGE_BASE_START_PERC: &str = "voltage_base_start_perc";
/// Baseline window end, as a fraction of `stim_start`.
pub const VOLTAGE_BASE_END_PERC: &str = "voltage_base_end_perc";

/// Computes named features from stimulus-annotated traces.
///
/// Settings are extractor state: callers reset before configuring so that
/// earlier runs cannot leak into the next one.
pub trait FeatureExtractor {
    /// Restore every setting to its default.
    fn reset(&mut self);

    /// Set a named floating-point option.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownSetting` for names the extractor does not use.
    fn set_double_setting(&mut self, name: &str, value: f64) -> Result<()>;

    /// Compute `features` for every trace.
    ///
    /// The result has one map per trace, in input order, each keyed by the
    /// requested feature names.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownFeature` for unsupported names and
    /// `Error::FeatureUnavailable` when a trace does not support a value.
    fn get_feature_values(
        &self,
        traces: &[EfelTrace],
        features: &[&str],
    ) -> Result<Vec<FeatureValues>>;
}
