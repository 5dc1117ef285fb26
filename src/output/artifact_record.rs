//! Artifact Record - one file written while binding a score

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Artifact Record represents a file produced by a validation run.
///
/// The `key` is the file name inside the run directory (e.g.
/// `basic_data.json`); `path` is where it was written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRecord {
    key: String,
    path: PathBuf,
    size_bytes: u64,
    created_at: DateTime<Utc>,
}

impl ArtifactRecord {
    /// Create a new artifact record.
    ///
    /// # Arguments
    ///
    /// * `key` - Artifact name (e.g., "`trace_data.json`")
    /// * `path` - Location of the written file
    /// * `size_bytes` - Size of the artifact in bytes
    ///
    /// # Returns
    ///
    /// A new `ArtifactRecord` with the current timestamp.
    #[must_use]
    pub fn new(key: impl Into<String>, path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
            size_bytes,
            created_at: Utc::now(),
        }
    }

    /// Get the artifact key/name.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the artifact location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the artifact size in bytes.
    #[must_use]
    pub const fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_record_new() {
        let artifact = ArtifactRecord::new("basic_data.json", "out/basic_data.json", 120);
        assert_eq!(artifact.key(), "basic_data.json");
        assert_eq!(artifact.path(), Path::new("out/basic_data.json"));
        assert_eq!(artifact.size_bytes(), 120);
    }

    #[test]
    fn test_artifact_record_serialization() {
        let artifact = ArtifactRecord::new("trace_plot.pdf", "out/trace_plot.pdf", 0);
        let json = serde_json::to_string(&artifact).unwrap();
        let back: ArtifactRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(artifact, back);
    }
}
