//! Z-score of a prediction against an observation

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::observation::Observation;

/// Artifacts attached to a score by the binding stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedData {
    /// Files written for the run, in write order
    pub figures: Vec<PathBuf>,
}

/// Standardized deviation of a prediction from the observed mean.
///
/// The value is fixed at creation; only [`RelatedData`] is filled in later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScore {
    score: f64,
    related_data: RelatedData,
}

impl ZScore {
    /// `(prediction - observation.mean) / observation.std`.
    ///
    /// A zero standard deviation is not rejected and yields an infinite or
    /// NaN score.
    #[must_use]
    pub fn compute(observation: &Observation, prediction: f64) -> Self {
        Self {
            score: (prediction - observation.mean) / observation.std,
            related_data: RelatedData::default(),
        }
    }

    /// The Z value.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Attached artifacts.
    #[must_use]
    pub const fn related_data(&self) -> &RelatedData {
        &self.related_data
    }

    /// Replace the attached figure list.
    #[must_use]
    pub fn with_figures(mut self, figures: Vec<PathBuf>) -> Self {
        self.related_data.figures = figures;
        self
    }
}

impl fmt::Display for ZScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Z = {:.2}", self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zscore_one_std_above() {
        let score = ZScore::compute(&Observation::new(-65.0, 5.0), -60.0);
        assert!((score.score() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zscore_at_mean() {
        let score = ZScore::compute(&Observation::new(-65.0, 5.0), -65.0);
        assert!(score.score().abs() < f64::EPSILON);
    }

    #[test]
    fn test_zscore_zero_std() {
        let score = ZScore::compute(&Observation::new(0.0, 0.0), 1.0);
        assert!(score.score().is_infinite());
    }

    #[test]
    fn test_zscore_display() {
        let score = ZScore::compute(&Observation::new(0.0, 4.0), -3.0);
        assert_eq!(score.to_string(), "Z = -0.75");
    }

    #[test]
    fn test_figures_start_empty() {
        let score = ZScore::compute(&Observation::new(0.0, 1.0), 0.0);
        assert!(score.related_data().figures.is_empty());
    }
}
