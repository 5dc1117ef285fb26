//! Output configuration for validation artifacts

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Default directory that holds every run's artifacts.
pub const DEFAULT_ROOT: &str = "./validation_results";

/// Where and how run artifacts are written.
///
/// Missing fields in a configuration file take their defaults:
///
/// ```json
/// { "root": "./validation_results", "json_indent": 4, "plot_width": 640, "plot_height": 480 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    root: PathBuf,
    json_indent: usize,
    plot_width: u32,
    plot_height: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            json_indent: 4,
            plot_width: 640,
            plot_height: 480,
        }
    }
}

impl OutputConfig {
    /// Create a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> OutputConfigBuilder {
        OutputConfigBuilder::default()
    }

    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Json` if
    /// it is not a valid configuration.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Root output directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Spaces per JSON indentation level.
    #[must_use]
    pub const fn json_indent(&self) -> usize {
        self.json_indent
    }

    /// Plot size in pixels as `(width, height)`.
    #[must_use]
    pub const fn plot_size(&self) -> (u32, u32) {
        (self.plot_width, self.plot_height)
    }

    /// Directory for one test/model pair: `<root>/<test name>/<model name>`.
    #[must_use]
    pub fn run_dir(&self, test_name: &str, model_name: &str) -> PathBuf {
        self.root.join(test_name).join(model_name)
    }
}

/// Builder for `OutputConfig`.
#[derive(Debug, Default)]
pub struct OutputConfigBuilder {
    config: OutputConfig,
}

impl OutputConfigBuilder {
    /// Set the root output directory.
    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    /// Set spaces per JSON indentation level.
    #[must_use]
    pub const fn json_indent(mut self, spaces: usize) -> Self {
        self.config.json_indent = spaces;
        self
    }

    /// Set the plot size in pixels.
    #[must_use]
    pub const fn plot_size(mut self, width: u32, height: u32) -> Self {
        self.config.plot_width = width;
        self.config.plot_height = height;
        self
    }

    /// Build the `OutputConfig`.
    #[must_use]
    pub fn build(self) -> OutputConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OutputConfig::default();
        assert_eq!(config.root(), Path::new(DEFAULT_ROOT));
        assert_eq!(config.json_indent(), 4);
        assert_eq!(config.plot_size(), (640, 480));
    }

    #[test]
    fn test_run_dir_layout() {
        let config = OutputConfig::builder().root("out").build();
        assert_eq!(
            config.run_dir("Input Resistance Test", "cell"),
            Path::new("out/Input Resistance Test/cell")
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: OutputConfig = serde_json::from_str(r#"{"json_indent": 2}"#).unwrap();
        assert_eq!(config.json_indent(), 2);
        assert_eq!(config.root(), Path::new(DEFAULT_ROOT));
    }
}
