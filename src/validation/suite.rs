//! Test Suite - many tests against many models
//!
//! Runs every test against every model and keeps one outcome per pair,
//! so one failing pair does not stop the others.

use tracing::{info, warn};

use super::{run_test_recorded, TestRun, ValidationTest};
use crate::capability::{missing_capabilities, Capability, Model};
use crate::output::OutputConfig;
use crate::Error;

/// Result of one test/model pair.
#[derive(Debug)]
pub enum SuiteOutcome {
    /// Every stage ran.
    Completed(TestRun),
    /// Model lacks capabilities the test requires; nothing ran.
    Skipped(Vec<Capability>),
    /// A stage failed; later stages did not run.
    Failed {
        /// Run as far as it got, in the `Failed` stage
        run: TestRun,
        /// Error that stopped it
        error: Error,
    },
}

/// Outcome for a named test/model pair.
#[derive(Debug)]
pub struct SuiteEntry {
    test_name: String,
    test_description: String,
    model_name: String,
    outcome: SuiteOutcome,
}

impl SuiteEntry {
    /// Get the test display name.
    #[must_use]
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Get the test description.
    #[must_use]
    pub fn test_description(&self) -> &str {
        &self.test_description
    }

    /// Get the model display name.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Get the outcome.
    #[must_use]
    pub const fn outcome(&self) -> &SuiteOutcome {
        &self.outcome
    }

    /// The completed run, if any.
    #[must_use]
    pub const fn run(&self) -> Option<&TestRun> {
        match &self.outcome {
            SuiteOutcome::Completed(run) => Some(run),
            _ => None,
        }
    }

    /// The failed run, if any.
    #[must_use]
    pub const fn failed_run(&self) -> Option<&TestRun> {
        match &self.outcome {
            SuiteOutcome::Failed { run, .. } => Some(run),
            _ => None,
        }
    }
}

/// Outcomes of a suite, in test-major order.
#[derive(Debug, Default)]
pub struct SuiteReport {
    entries: Vec<SuiteEntry>,
}

impl SuiteReport {
    /// All entries.
    #[must_use]
    pub fn entries(&self) -> &[SuiteEntry] {
        &self.entries
    }

    /// Check if the report is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the outcome for a test/model pair.
    #[must_use]
    pub fn get(&self, test_name: &str, model_name: &str) -> Option<&SuiteEntry> {
        self.entries
            .iter()
            .find(|e| e.test_name == test_name && e.model_name == model_name)
    }

    /// Completed runs.
    pub fn completed(&self) -> impl Iterator<Item = &TestRun> {
        self.entries.iter().filter_map(SuiteEntry::run)
    }

    /// Number of skipped pairs.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, SuiteOutcome::Skipped(_)))
    }

    /// Number of failed pairs.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, SuiteOutcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&SuiteOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| predicate(&e.outcome)).count()
    }
}

/// Ordered collection of validation tests.
#[derive(Default)]
pub struct TestSuite {
    name: String,
    tests: Vec<Box<dyn ValidationTest>>,
}

impl TestSuite {
    /// Create an empty suite.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: Vec::new(),
        }
    }

    /// Add a test.
    #[must_use]
    pub fn with_test(mut self, test: impl ValidationTest + 'static) -> Self {
        self.tests.push(Box::new(test));
        self
    }

    /// Suite name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of tests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Check if the suite has no tests.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Run every test against every model.
    ///
    /// Pairs whose model lacks a required capability are skipped up front;
    /// other failures are recorded and the suite moves on.
    pub fn judge(&mut self, models: &mut [Box<dyn Model>], output: &OutputConfig) -> SuiteReport {
        let mut report = SuiteReport::default();
        for test in &mut self.tests {
            for model in models.iter_mut() {
                let test_name = test.name().to_string();
                let test_description = test.description().to_string();
                let model_name = model.name().to_string();
                let missing = missing_capabilities(model.as_mut(), test.required_capabilities());
                let outcome = if missing.is_empty() {
                    match run_test_recorded(test.as_mut(), model.as_mut(), output) {
                        (run, None) => SuiteOutcome::Completed(run),
                        (run, Some(error)) => {
                            warn!(test = %test_name, model = %model_name, %error, "run failed");
                            SuiteOutcome::Failed { run, error }
                        }
                    }
                } else {
                    SuiteOutcome::Skipped(missing)
                };
                report.entries.push(SuiteEntry {
                    test_name,
                    test_description,
                    model_name,
                    outcome,
                });
            }
        }
        info!(
            suite = %self.name,
            runs = report.entries.len(),
            skipped = report.skipped_count(),
            failed = report.failed_count(),
            "suite judged"
        );
        report
    }
}
