//! Error type shared by every stage of the cube build.
//!
//! Variants fall into three fatal families:
//! - structural: the sheet layout does not match the configured header/data geometry;
//! - value: a measure cell does not hold a number;
//! - mapping: a geographic code has no department.
//!
//! Codes that fall outside every partition are not errors; they are reported
//! through [`crate::partition::PartitionGap`].

use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CubeError>;

/// Every failure the cube build can surface.
#[derive(Debug, thiserror::Error)]
pub enum CubeError {
    /// The configured header range is empty or inverted.
    #[error("invalid header range: rows {first}..={last}")]
    InvalidHeaderRange {
        /// First header row (0-based).
        first: usize,
        /// Last header row (0-based).
        last: usize,
    },

    /// The header block, or the first data row, lies beyond the end of the sheet.
    #[error("sheet '{sheet}' has {rows} rows, layout needs row {needed}")]
    SheetTooShort {
        /// Sheet name.
        sheet: String,
        /// Number of rows present.
        rows: usize,
        /// Row index the layout refers to.
        needed: usize,
    },

    /// A header row carries no dimension concept identifier.
    #[error("header row {row} of sheet '{sheet}' has no concept identifier in column {column}")]
    MissingConcept {
        /// Sheet name.
        sheet: String,
        /// Absolute row index.
        row: usize,
        /// Column the concept was expected in.
        column: usize,
    },

    /// A data column is present in some header rows but not in all of them.
    #[error("header column {column} of sheet '{sheet}' has no code in row {row}")]
    HeaderGap {
        /// Sheet name.
        sheet: String,
        /// Absolute row index of the missing code.
        row: usize,
        /// Column index.
        column: usize,
    },

    /// The header block declares no data column.
    #[error("header block of sheet '{sheet}' declares no data column")]
    EmptyHeader {
        /// Sheet name.
        sheet: String,
    },

    /// A data row has cells but no geographic code in column 0.
    #[error("row {row} of sheet '{sheet}' has no geographic code")]
    MissingGeoCode {
        /// Sheet name.
        sheet: String,
        /// Absolute row index.
        row: usize,
    },

    /// A data row stops before the last header column.
    #[error("row {row} of sheet '{sheet}' has {found} cells, header needs {expected}")]
    RowTooShort {
        /// Sheet name.
        sheet: String,
        /// Absolute row index.
        row: usize,
        /// Cells required by the header.
        expected: usize,
        /// Cells present.
        found: usize,
    },

    /// A data row holds a value in a column the header does not describe.
    #[error("row {row} of sheet '{sheet}' has a value in column {column}, which has no header")]
    UnexpectedColumn {
        /// Sheet name.
        sheet: String,
        /// Absolute row index.
        row: usize,
        /// Column index.
        column: usize,
    },

    /// A measure cell holds something other than a number.
    #[error("cell ({row}, {column}) of sheet '{sheet}' is not numeric: {value:?}")]
    NonNumericCell {
        /// Sheet name.
        sheet: String,
        /// Absolute row index.
        row: usize,
        /// Column index.
        column: usize,
        /// Rendering of the offending cell.
        value: String,
    },

    /// A geographic code has no known department.
    #[error("geographic code {code:?} maps to no department")]
    UnmappedGeoCode {
        /// The geographic code.
        code: String,
    },

    /// The tabular source has no sheet at the requested index.
    #[error("workbook has no sheet at index {index}")]
    MissingSheet {
        /// Requested sheet index.
        index: usize,
    },

    /// The workbook could not be opened or decoded.
    #[error("cannot read workbook {path}: {source}")]
    Workbook {
        /// Workbook path.
        path: PathBuf,
        /// Underlying calamine error.
        #[source]
        source: calamine::Error,
    },

    /// The configuration file could not be parsed.
    #[error("invalid configuration {path}: {source}")]
    Config {
        /// Configuration path.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// The run manifest could not be encoded or decoded.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// A file system operation failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being done.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The run was cancelled between two partitions.
    #[error("run cancelled before partition {next}")]
    Cancelled {
        /// Label of the partition that was not started.
        next: String,
    },
}

impl CubeError {
    /// Wraps an I/O error with a description of the failed operation.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        CubeError::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns true for errors caused by the sheet geometry.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            CubeError::InvalidHeaderRange { .. }
                | CubeError::SheetTooShort { .. }
                | CubeError::MissingConcept { .. }
                | CubeError::HeaderGap { .. }
                | CubeError::EmptyHeader { .. }
                | CubeError::MissingGeoCode { .. }
                | CubeError::RowTooShort { .. }
                | CubeError::UnexpectedColumn { .. }
                | CubeError::MissingSheet { .. }
        )
    }
}
