//! The run manifest: what a build wrote, and how much.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CubeError, Result};
use crate::output::write_atomic;
use crate::serializer::Format;

/// One written graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Logical name: a partition digit or `dep`.
    pub name: String,
    /// File name inside the output directory.
    pub file: String,
    /// Distinct statements in the graph.
    pub statements: usize,
    /// Observations in the graph.
    pub observations: usize,
    /// Data rows that went into the graph.
    pub rows_selected: usize,
}

/// Geographic codes no partition selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapEntry {
    /// Number of rows dropped.
    pub count: usize,
    /// Their geographic codes.
    pub codes: Vec<String>,
}

/// Summary of a complete run, stored as `manifest.json` next to the artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Data set IRI.
    pub dataset: String,
    /// Serialization format of every artifact.
    pub format: Format,
    /// Partition artifacts, digit order.
    pub partitions: Vec<ArtifactEntry>,
    /// Department aggregate artifact.
    pub department: Option<ArtifactEntry>,
    /// Sum of statements over all artifacts.
    pub total_statements: usize,
    /// Rows lost to the partition scheme.
    pub partition_gap: GapEntry,
}

impl RunManifest {
    /// File name of the manifest inside the output directory.
    pub const FILE_NAME: &'static str = "manifest.json";

    /// All artifacts, partitions first.
    pub fn artifacts(&self) -> impl Iterator<Item = &ArtifactEntry> {
        self.partitions.iter().chain(self.department.iter())
    }

    /// Writes the manifest into `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn write(&self, dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(&dir.join(Self::FILE_NAME), json.as_bytes())
    }

    /// Reads the manifest from `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or not a valid manifest.
    pub fn read(dir: &Path) -> Result<Self> {
        let path = dir.join(Self::FILE_NAME);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| CubeError::io(format!("cannot read {}", path.display()), e))?;
        Ok(serde_json::from_str(&text)?)
    }
}
