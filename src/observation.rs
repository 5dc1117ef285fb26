//! Observed statistics a prediction is scored against

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

const SHAPE_MESSAGE: &str =
    "Observation must return a dictionary of the form: {'mean': NUM1, 'std': NUM2}";

/// Experimentally observed mean and standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observed mean
    pub mean: f64,
    /// Observed standard deviation
    pub std: f64,
}

impl Observation {
    /// Create an observation from its two statistics.
    #[must_use]
    pub const fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }

    /// Raw observation a test gets when none is supplied.
    ///
    /// `{"mean": null, "std": null}`; it never passes validation.
    #[must_use]
    pub fn unset() -> Value {
        serde_json::json!({ "mean": null, "std": null })
    }

    /// This observation as a raw JSON mapping.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "mean": self.mean, "std": self.std })
    }
}

impl From<Observation> for Value {
    fn from(observation: Observation) -> Self {
        observation.to_value()
    }
}

/// Check that `raw` is exactly `{"mean": number, "std": number}`.
///
/// Integers and reals are accepted; booleans, strings, nulls, missing keys
/// and extra keys are not.
///
/// # Errors
///
/// Returns `Error::Observation` on any shape violation.
pub fn validate_observation(raw: &Value) -> Result<Observation> {
    let Some(map) = raw.as_object() else {
        return Err(Error::Observation(SHAPE_MESSAGE.to_string()));
    };
    if map.len() != 2 {
        return Err(Error::Observation(SHAPE_MESSAGE.to_string()));
    }
    let field = |key: &str| {
        map.get(key)
            .and_then(Value::as_f64)
            .ok_or_else(|| Error::Observation(SHAPE_MESSAGE.to_string()))
    };
    Ok(Observation::new(field("mean")?, field("std")?))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_accepts_integers_and_reals() {
        let obs = validate_observation(&json!({"mean": -65, "std": 5.5})).unwrap();
        assert_eq!(obs, Observation::new(-65.0, 5.5));
    }

    #[test]
    fn test_rejects_unset_default() {
        assert!(matches!(
            validate_observation(&Observation::unset()),
            Err(Error::Observation(_))
        ));
    }

    #[test]
    fn test_rejects_boolean() {
        assert!(validate_observation(&json!({"mean": true, "std": 1})).is_err());
    }

    #[test]
    fn test_rejects_extra_key() {
        assert!(validate_observation(&json!({"mean": 1, "std": 1, "n": 10})).is_err());
    }

    #[test]
    fn test_rejects_wrong_key() {
        assert!(validate_observation(&json!({"mean": 1, "sd": 1})).is_err());
    }

    #[test]
    fn test_rejects_non_mapping() {
        assert!(validate_observation(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_message_names_expected_shape() {
        let err = validate_observation(&json!({})).unwrap_err();
        assert!(format!("{err}").contains("{'mean': NUM1, 'std': NUM2}"));
    }
}
