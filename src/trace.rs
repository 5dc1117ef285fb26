//! Membrane-potential traces recorded at the soma
//!
//! Two shapes are used:
//! - [`Trace`]: `{"T": [...], "V": [...]}`, time in ms and voltage in mV
//! - [`EfelTrace`]: the same series plus single-element `stim_start` /
//!   `stim_end` lists, the input layout of the feature extractor
//!
//! Both serialize with exactly those keys so `trace_data.json` can be read
//! back into the value that produced a prediction.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Paired time/voltage series.
///
/// Invariants (checked by [`Trace::new`] and [`Trace::validate`]):
/// - `T` and `V` have the same length
/// - `T` is non-decreasing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trace {
    #[serde(rename = "T")]
    time: Vec<f64>,
    #[serde(rename = "V")]
    voltage: Vec<f64>,
}

impl Trace {
    /// Create a trace from time points (ms) and voltage samples (mV).
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTrace` if the series differ in length or time
    /// decreases anywhere.
    pub fn new(time: Vec<f64>, voltage: Vec<f64>) -> Result<Self> {
        let trace = Self { time, voltage };
        trace.validate()?;
        Ok(trace)
    }

    /// Check the shape invariants.
    ///
    /// Useful after deserializing a trace from disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTrace` describing the first violation.
    pub fn validate(&self) -> Result<()> {
        check_series(&self.time, &self.voltage)
    }

    /// Time points in ms.
    #[must_use]
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Membrane potential samples in mV.
    #[must_use]
    pub fn voltage(&self) -> &[f64] {
        &self.voltage
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Whether the trace holds no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Arithmetic mean of the voltage samples.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTrace` for an empty trace.
    pub fn mean_voltage(&self) -> Result<f64> {
        if self.voltage.is_empty() {
            return Err(Error::InvalidTrace(
                "cannot average an empty voltage series".to_string(),
            ));
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.voltage.len() as f64;
        Ok(self.voltage.iter().sum::<f64>() / n)
    }

    /// Attach a stimulus window, producing the feature-extractor layout.
    ///
    /// The window is not checked against the trace or for ordering; callers
    /// pass `stim_start < stim_end` within the recorded span.
    #[must_use]
    pub fn with_stimulus(self, stim_start_ms: f64, stim_end_ms: f64) -> EfelTrace {
        EfelTrace {
            time: self.time,
            voltage: self.voltage,
            stim_start: [stim_start_ms],
            stim_end: [stim_end_ms],
        }
    }
}

/// Trace with its stimulus window, as consumed by feature extraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EfelTrace {
    #[serde(rename = "T")]
    time: Vec<f64>,
    #[serde(rename = "V")]
    voltage: Vec<f64>,
    stim_start: [f64; 1],
    stim_end: [f64; 1],
}

impl EfelTrace {
    /// Time points in ms.
    #[must_use]
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// Membrane potential samples in mV.
    #[must_use]
    pub fn voltage(&self) -> &[f64] {
        &self.voltage
    }

    /// Stimulus onset in ms.
    #[must_use]
    pub const fn stim_start(&self) -> f64 {
        self.stim_start[0]
    }

    /// Stimulus offset in ms.
    #[must_use]
    pub const fn stim_end(&self) -> f64 {
        self.stim_end[0]
    }

    /// Check the shape invariants of the underlying series.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidTrace` describing the first violation.
    pub fn validate(&self) -> Result<()> {
        check_series(&self.time, &self.voltage)
    }
}

/// Trace kept by a run for its artifacts: plain or with stimulus window.
///
/// Serialized without a tag, so the JSON is exactly the wrapped trace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RecordedTrace {
    /// Trace with stimulus window (listed first so it wins when decoding)
    Efel(EfelTrace),
    /// Plain time/voltage trace
    Plain(Trace),
}

impl RecordedTrace {
    /// Time points in ms.
    #[must_use]
    pub fn time(&self) -> &[f64] {
        match self {
            Self::Efel(trace) => trace.time(),
            Self::Plain(trace) => trace.time(),
        }
    }

    /// Membrane potential samples in mV.
    #[must_use]
    pub fn voltage(&self) -> &[f64] {
        match self {
            Self::Efel(trace) => trace.voltage(),
            Self::Plain(trace) => trace.voltage(),
        }
    }
}

impl From<Trace> for RecordedTrace {
    fn from(trace: Trace) -> Self {
        Self::Plain(trace)
    }
}

impl From<EfelTrace> for RecordedTrace {
    fn from(trace: EfelTrace) -> Self {
        Self::Efel(trace)
    }
}

fn check_series(time: &[f64], voltage: &[f64]) -> Result<()> {
    if time.len() != voltage.len() {
        return Err(Error::InvalidTrace(format!(
            "time has {} samples but voltage has {}",
            time.len(),
            voltage.len()
        )));
    }
    if let Some(i) = time.windows(2).position(|w| w[1] < w[0]) {
        return Err(Error::InvalidTrace(format!(
            "time decreases at index {}: {} -> {}",
            i + 1,
            time[i],
            time[i + 1]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_new_valid() {
        let trace = Trace::new(vec![0.0, 25.0, 50.0], vec![-65.0, -65.0, -65.0]).unwrap();
        assert_eq!(trace.len(), 3);
        assert!(!trace.is_empty());
    }

    #[test]
    fn test_trace_length_mismatch() {
        let err = Trace::new(vec![0.0, 1.0], vec![-65.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidTrace(_)));
    }

    #[test]
    fn test_trace_decreasing_time() {
        let err = Trace::new(vec![0.0, 2.0, 1.0], vec![0.0; 3]).unwrap_err();
        assert!(format!("{err}").contains("index 2"));
    }

    #[test]
    fn test_trace_repeated_time_allowed() {
        assert!(Trace::new(vec![0.0, 1.0, 1.0], vec![0.0; 3]).is_ok());
    }

    #[test]
    fn test_mean_voltage() {
        let trace = Trace::new(vec![0.0, 25.0, 50.0], vec![-70.0, -65.0, -60.0]).unwrap();
        assert!((trace.mean_voltage().unwrap() + 65.0).abs() < 1e-12);
    }

    #[test]
    fn test_mean_voltage_empty() {
        let trace = Trace::new(vec![], vec![]).unwrap();
        assert!(trace.mean_voltage().is_err());
    }

    #[test]
    fn test_efel_json_layout() {
        let efel = Trace::new(vec![0.0, 1.0], vec![-65.0, -64.0])
            .unwrap()
            .with_stimulus(20.0, 70.0);
        let json = serde_json::to_value(&efel).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "T": [0.0, 1.0],
                "V": [-65.0, -64.0],
                "stim_start": [20.0],
                "stim_end": [70.0]
            })
        );
    }

    #[test]
    fn test_recorded_trace_decodes_efel_form() {
        let efel = Trace::new(vec![0.0], vec![-65.0]).unwrap().with_stimulus(1.0, 2.0);
        let json = serde_json::to_string(&RecordedTrace::from(efel.clone())).unwrap();
        let back: RecordedTrace = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RecordedTrace::Efel(efel));
    }
}
