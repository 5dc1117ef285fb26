//! Validation tests and the protocol that runs them
//!
//! A test is four stages behind the [`ValidationTest`] trait:
//!
//! ```text
//! validate_observation ─> generate_prediction ─> compute_score ─> bind_score
//!        (Observation)        (Prediction)           (ZScore)      (artifacts)
//! ```
//!
//! [`run_test`] drives them in order against one model after checking the
//! model provides every required capability. Any error stops the run where
//! it happened; later stages never execute and nothing is scored.
//! [`run_test_recorded`] does the same but hands back the partial
//! [`TestRun`], marked `Failed`, alongside the error.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use soma_validation::models::PassiveSoma;
//! use soma_validation::observation::Observation;
//! use soma_validation::output::OutputConfig;
//! use soma_validation::validation::{run_test, RestingPotential};
//!
//! # fn main() -> soma_validation::Result<()> {
//! let mut model = PassiveSoma::builder("passive").build()?;
//! let mut test = RestingPotential::new(Observation::new(-65.0, 5.0));
//! let run = run_test(&mut test, &mut model, &OutputConfig::default())?;
//! println!("{}", run.score().expect("bound runs carry a score"));
//! # Ok(())
//! # }
//! ```

mod input_resistance;
mod resting_potential;
mod run;
mod suite;

pub use input_resistance::InputResistance;
pub use resting_potential::RestingPotential;
pub use run::{RunFailure, RunStage, TestRun};
pub use suite::{SuiteEntry, SuiteOutcome, SuiteReport, TestSuite};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, info_span, warn};

use crate::capability::{missing_capabilities, Capability, Model};
use crate::observation::{validate_observation, Observation};
use crate::output::{ArtifactRecord, ArtifactWriter, BasicData, OutputConfig};
use crate::score::ZScore;
use crate::trace::RecordedTrace;
use crate::{Error, Result};

/// Scalar prediction together with the trace it was reduced from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prediction {
    value: f64,
    trace: RecordedTrace,
}

impl Prediction {
    /// Create a prediction.
    #[must_use]
    pub const fn new(value: f64, trace: RecordedTrace) -> Self {
        Self { value, trace }
    }

    /// The predicted value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// The trace behind the value.
    #[must_use]
    pub const fn trace(&self) -> &RecordedTrace {
        &self.trace
    }
}

/// A validation test: observation check, prediction, scoring and binding.
///
/// Only [`generate_prediction`](Self::generate_prediction) is test
/// specific for the tests in this crate; the other stages default to the
/// shared `{mean, std}` check, the Z-score and the three-artifact layout.
pub trait ValidationTest {
    /// Display name; also the first output directory level.
    fn name(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str;

    /// Capabilities a model must provide before the run starts.
    fn required_capabilities(&self) -> &[Capability];

    /// Observation as supplied at construction.
    fn observation(&self) -> &Value;

    /// Check the observation shape.
    ///
    /// # Errors
    ///
    /// Returns `Error::Observation` unless it is exactly `{mean, std}`.
    fn validate_observation(&self, observation: &Value) -> Result<Observation> {
        validate_observation(observation)
    }

    /// Drive the model and reduce its trace to one number.
    ///
    /// # Errors
    ///
    /// Propagates model and feature extraction failures.
    fn generate_prediction(&mut self, model: &mut dyn Model) -> Result<Prediction>;

    /// Score the prediction.
    fn compute_score(&self, observation: &Observation, prediction: &Prediction) -> ZScore {
        ZScore::compute(observation, prediction.value())
    }

    /// Write the run artifacts and attach their paths to the score.
    ///
    /// # Errors
    ///
    /// Propagates filesystem and plot errors.
    fn bind_score(
        &self,
        score: ZScore,
        model_name: &str,
        prediction: &Prediction,
        output: &OutputConfig,
    ) -> Result<(ZScore, Vec<ArtifactRecord>)> {
        let basic = BasicData {
            observation: self.observation(),
            prediction: prediction.value(),
            score: score.score(),
        };
        let artifacts =
            ArtifactWriter::new(output).write_all(self.name(), model_name, &basic, prediction.trace())?;
        let figures = artifacts.iter().map(|a| a.path().to_path_buf()).collect();
        Ok((score.with_figures(figures), artifacts))
    }
}

/// Run `test` against `model` through every stage.
///
/// # Errors
///
/// Returns `Error::MissingCapability` before any work if the model lacks a
/// required capability, otherwise the first error raised by a stage.
pub fn run_test(
    test: &mut dyn ValidationTest,
    model: &mut dyn Model,
    output: &OutputConfig,
) -> Result<TestRun> {
    let (run, error) = run_test_recorded(test, model, output);
    error.map_or(Ok(run), Err)
}

/// Run `test` against `model` and keep the run whether or not it finishes.
///
/// On error the run is in [`RunStage::Failed`], its [`RunFailure`] names
/// the last stage completed, and the error is returned next to it.
pub fn run_test_recorded(
    test: &mut dyn ValidationTest,
    model: &mut dyn Model,
    output: &OutputConfig,
) -> (TestRun, Option<Error>) {
    let span = info_span!(
        "validation_run",
        test = test.name(),
        description = test.description(),
        model = model.name()
    );
    let _guard = span.enter();

    let mut run = TestRun::new(test.name(), model.name());
    match drive(test, model, output, &mut run) {
        Ok(()) => (run, None),
        Err(err) => {
            warn!(reached = ?run.stage(), error = %err, "validation run failed");
            run.failed(&err);
            (run, Some(err))
        }
    }
}

fn drive(
    test: &mut dyn ValidationTest,
    model: &mut dyn Model,
    output: &OutputConfig,
    run: &mut TestRun,
) -> Result<()> {
    let missing = missing_capabilities(model, test.required_capabilities());
    if !missing.is_empty() {
        warn!(?missing, "model lacks required capabilities");
        return Err(Error::MissingCapability {
            test: test.name().to_string(),
            model: model.name().to_string(),
            capabilities: missing,
        });
    }

    let observation = test.validate_observation(test.observation())?;
    run.observation_validated(observation);
    debug!(stage = ?run.stage(), mean = observation.mean, std = observation.std);

    let prediction = test.generate_prediction(model)?;
    run.prediction_generated(prediction.clone());
    debug!(stage = ?run.stage(), prediction = prediction.value());

    let score = test.compute_score(&observation, &prediction);
    run.scored(score.clone());
    debug!(stage = ?run.stage(), score = score.score());

    let (score, artifacts) = test.bind_score(score, model.name(), &prediction, output)?;
    let z = score.score();
    run.bound(score, artifacts);
    info!(score = z, artifacts = run.artifacts().len(), "validation run bound");
    Ok(())
}

/// Error for a capability that vanished between the pre-run check and use.
fn capability_error(test: &str, model: &str, capability: Capability) -> Error {
    Error::MissingCapability {
        test: test.to_string(),
        model: model.to_string(),
        capabilities: vec![capability],
    }
}
