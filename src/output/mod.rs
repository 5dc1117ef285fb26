//! Run artifacts on disk
//!
//! Every bound run writes three files under
//! `<root>/<test name>/<model name>/`:
//!
//! ```text
//! basic_data.json   {"observation": {...}, "prediction": NUM, "score": NUM}
//! trace_data.json   the trace the prediction was computed from
//! trace_plot.pdf    Vm vs t
//! ```
//!
//! Writes are independent: nothing is rolled back if a later file fails.

mod artifact_record;
mod config;

pub use artifact_record::ArtifactRecord;
pub use config::{OutputConfig, OutputConfigBuilder, DEFAULT_ROOT};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::info;

use crate::plot::render_trace_plot;
use crate::trace::RecordedTrace;
use crate::Result;

/// Observation, prediction and score of a run.
pub const BASIC_DATA_FILE: &str = "basic_data.json";
/// Trace behind the prediction.
pub const TRACE_DATA_FILE: &str = "trace_data.json";
/// Voltage-vs-time plot.
pub const TRACE_PLOT_FILE: &str = "trace_plot.pdf";

/// Content of `basic_data.json`.
#[derive(Debug, Serialize)]
pub struct BasicData<'a> {
    /// Observation as supplied to the test
    pub observation: &'a Value,
    /// Scalar prediction
    pub prediction: f64,
    /// Z value
    pub score: f64,
}

/// Writes the artifacts of one test/model pair.
#[derive(Debug)]
pub struct ArtifactWriter<'a> {
    config: &'a OutputConfig,
}

impl<'a> ArtifactWriter<'a> {
    /// Create a writer for `config`.
    #[must_use]
    pub const fn new(config: &'a OutputConfig) -> Self {
        Self { config }
    }

    /// Write all three artifacts, in order: basic data, trace data, plot.
    ///
    /// The run directory is created if absent; existing files are
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns the first IO, JSON or plot error; files already written stay.
    pub fn write_all(
        &self,
        test_name: &str,
        model_name: &str,
        basic: &BasicData<'_>,
        trace: &RecordedTrace,
    ) -> Result<Vec<ArtifactRecord>> {
        let dir = self.config.run_dir(test_name, model_name);
        fs::create_dir_all(&dir)?;

        let basic_path = dir.join(BASIC_DATA_FILE);
        self.write_json(&basic_path, basic)?;
        let trace_path = dir.join(TRACE_DATA_FILE);
        self.write_json(&trace_path, trace)?;
        let plot_path = dir.join(TRACE_PLOT_FILE);
        render_trace_plot(&plot_path, trace.time(), trace.voltage(), self.config.plot_size())?;

        let artifacts = [
            (BASIC_DATA_FILE, basic_path),
            (TRACE_DATA_FILE, trace_path),
            (TRACE_PLOT_FILE, plot_path),
        ]
        .into_iter()
        .map(|(key, path)| -> Result<ArtifactRecord> {
            let size = fs::metadata(&path)?.len();
            info!(artifact = key, path = %path.display(), size, "artifact written");
            Ok(ArtifactRecord::new(key, path, size))
        })
        .collect::<Result<Vec<_>>>()?;
        Ok(artifacts)
    }

    fn write_json(&self, path: &Path, value: &impl Serialize) -> Result<()> {
        let indent = " ".repeat(self.config.json_indent());
        let mut writer = BufWriter::new(File::create(path)?);
        let mut serializer = serde_json::Serializer::with_formatter(
            &mut writer,
            PrettyFormatter::with_indent(indent.as_bytes()),
        );
        value.serialize(&mut serializer)?;
        writer.flush()?;
        Ok(())
    }
}
