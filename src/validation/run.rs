//! Test Run - one pass of a test against a model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Prediction;
use crate::observation::Observation;
use crate::output::ArtifactRecord;
use crate::score::ZScore;
use crate::Error;

/// Lifecycle stage of a run.
///
/// Stages only move forward, one per protocol step. `Failed` is terminal
/// and may follow any stage before `Bound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RunStage {
    /// Run is created but nothing has executed.
    Created,
    /// Observation passed the shape check.
    ObservationValidated,
    /// Model was driven and the trace reduced to a prediction.
    PredictionGenerated,
    /// Prediction was scored against the observation.
    Scored,
    /// Artifacts were written and attached to the score.
    Bound,
    /// A stage raised an error; see [`TestRun::failure`].
    Failed,
}

/// Why a run stopped, and the last stage it completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    reached: RunStage,
    message: String,
}

impl RunFailure {
    /// Last stage completed before the error.
    #[must_use]
    pub const fn reached(&self) -> RunStage {
        self.reached
    }

    /// Error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Context threaded through the validate, predict, score and bind stages.
///
/// Holds what the stages produce so nothing lives on the test itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestRun {
    test_name: String,
    model_name: String,
    stage: RunStage,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    observation: Option<Observation>,
    prediction: Option<Prediction>,
    score: Option<ZScore>,
    artifacts: Vec<ArtifactRecord>,
    failure: Option<RunFailure>,
}

impl TestRun {
    /// Create a run in the `Created` stage.
    #[must_use]
    pub fn new(test_name: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            model_name: model_name.into(),
            stage: RunStage::Created,
            started_at: Utc::now(),
            ended_at: None,
            observation: None,
            prediction: None,
            score: None,
            artifacts: Vec::new(),
            failure: None,
        }
    }

    /// Get the test display name.
    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Get the model display name.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Get the current stage.
    #[must_use]
    pub const fn stage(&self) -> RunStage {
        self.stage
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Get the time the run reached `Bound` or `Failed`, if it has.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Get the validated observation.
    #[must_use]
    pub const fn observation(&self) -> Option<&Observation> {
        self.observation.as_ref()
    }

    /// Get the prediction and its trace.
    #[must_use]
    pub const fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    /// Get the score.
    #[must_use]
    pub const fn score(&self) -> Option<&ZScore> {
        self.score.as_ref()
    }

    /// Get the written artifacts, in write order.
    #[must_use]
    pub fn artifacts(&self) -> &[ArtifactRecord] {
        &self.artifacts
    }

    /// Get the failure, if the run stopped on an error.
    #[must_use]
    pub const fn failure(&self) -> Option<&RunFailure> {
        self.failure.as_ref()
    }

    /// Check if the run stopped on an error.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.stage == RunStage::Failed
    }

    /// Record the validated observation.
    pub fn observation_validated(&mut self, observation: Observation) {
        self.observation = Some(observation);
        self.stage = RunStage::ObservationValidated;
    }

    /// Record the prediction.
    pub fn prediction_generated(&mut self, prediction: Prediction) {
        self.prediction = Some(prediction);
        self.stage = RunStage::PredictionGenerated;
    }

    /// Record the score.
    pub fn scored(&mut self, score: ZScore) {
        self.score = Some(score);
        self.stage = RunStage::Scored;
    }

    /// Record the bound score and its artifacts; sets `ended_at`.
    pub fn bound(&mut self, score: ZScore, artifacts: Vec<ArtifactRecord>) {
        self.score = Some(score);
        self.artifacts = artifacts;
        self.stage = RunStage::Bound;
        self.ended_at = Some(Utc::now());
    }

    /// Record `error` against the current stage and move to `Failed`.
    ///
    /// Whatever earlier stages produced stays on the run.
    pub fn failed(&mut self, error: &Error) {
        self.failure = Some(RunFailure {
            reached: self.stage,
            message: error.to_string(),
        });
        self.stage = RunStage::Failed;
        self.ended_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Trace;

    #[test]
    fn test_run_stage_default() {
        let run = TestRun::new("test", "model");
        assert_eq!(run.stage(), RunStage::Created);
        assert!(run.ended_at().is_none());
    }

    #[test]
    fn test_run_lifecycle() {
        let observation = Observation::new(-65.0, 5.0);
        let mut run = TestRun::new("test", "model");
        run.observation_validated(observation);
        assert_eq!(run.stage(), RunStage::ObservationValidated);

        let trace = Trace::new(vec![0.0], vec![-60.0]).unwrap();
        run.prediction_generated(Prediction::new(-60.0, trace.into()));
        assert_eq!(run.stage(), RunStage::PredictionGenerated);

        run.scored(ZScore::compute(&observation, -60.0));
        assert_eq!(run.stage(), RunStage::Scored);

        let score = run.score().cloned().unwrap();
        run.bound(score, Vec::new());
        assert_eq!(run.stage(), RunStage::Bound);
        assert!(run.ended_at().unwrap() >= run.started_at());
    }

    #[test]
    fn test_run_failure_keeps_reached_stage() {
        let observation = Observation::new(-65.0, 5.0);
        let mut run = TestRun::new("test", "model");
        run.observation_validated(observation);
        run.failed(&Error::InvalidTrace("empty".to_string()));

        assert_eq!(run.stage(), RunStage::Failed);
        assert!(run.is_failed());
        assert!(run.ended_at().is_some());
        assert_eq!(run.observation(), Some(&observation));
        let failure = run.failure().unwrap();
        assert_eq!(failure.reached(), RunStage::ObservationValidated);
        assert_eq!(failure.message(), "Invalid trace: empty");
    }

    #[test]
    fn test_failed_run_serializes() {
        let mut run = TestRun::new("test", "model");
        run.failed(&Error::Other("boom".to_string()));
        let json = serde_json::to_string(&run).unwrap();
        let back: TestRun = serde_json::from_str(&json).unwrap();
        assert_eq!(back, run);
    }

    #[test]
    fn test_stage_ordering() {
        assert!(RunStage::Created < RunStage::ObservationValidated);
        assert!(RunStage::Scored < RunStage::Bound);
    }
}
