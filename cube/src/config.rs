//! Run configuration, read from a TOML file.
//!
//! ```toml
//! [source]
//! path = "data/BTX_TD_POP5_2014.xls"
//! first_header_row = 9
//! last_header_row = 11
//! first_data_row = 12
//!
//! [dataset]
//! reference_year = "2014"
//! geo_year = "2017"
//!
//! [output]
//! dir = "out"
//! format = "turtle"
//!
//! [throttle]
//! pause_secs = 20
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CubeError, Result};
use crate::serializer::Format;

/// Full run configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Workbook location and geometry.
    pub source: SourceConfig,
    /// Data set description.
    #[serde(default)]
    pub dataset: DataSetConfig,
    /// Output location and format.
    #[serde(default)]
    pub output: OutputConfig,
    /// Pause between partitions.
    #[serde(default)]
    pub throttle: ThrottleConfig,
}

impl Config {
    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CubeError::io(format!("cannot read {}", path.display()), e))?;
        Self::parse(&text, path)
    }

    /// Parses configuration text; `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::Config`] on malformed TOML or an unusable header range.
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|source| CubeError::Config {
            path: origin.to_path_buf(),
            source,
        })?;
        config.source.layout.validate()?;
        Ok(config)
    }
}

/// Where the workbook is and how its sheets are laid out.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Workbook path (xls, xlsx or ods).
    pub path: PathBuf,
    /// Sheet geometry.
    #[serde(flatten)]
    pub layout: SheetLayout,
}

/// Geometry shared by the municipality and arrondissement sheets.
///
/// Row and column indices are 0-based and absolute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Sheet holding municipalities.
    #[serde(default)]
    pub municipality_sheet: usize,
    /// Sheet holding municipal arrondissements.
    #[serde(default = "default_arrondissement_sheet")]
    pub arrondissement_sheet: usize,
    /// First row of the header block.
    pub first_header_row: usize,
    /// Last row of the header block (inclusive).
    pub last_header_row: usize,
    /// First data row.
    pub first_data_row: usize,
}

fn default_arrondissement_sheet() -> usize {
    1
}

impl SheetLayout {
    /// Column holding the geographic code of a data row.
    pub const GEO_CODE_COLUMN: usize = 0;
    /// Column holding the label of a data row and the concept of a header row.
    pub const LABEL_COLUMN: usize = 1;
    /// First column carrying measures (data rows) or codes (header rows).
    pub const FIRST_MEASURE_COLUMN: usize = 2;

    /// Number of rows in the header block.
    #[must_use]
    pub fn header_size(&self) -> usize {
        self.last_header_row + 1 - self.first_header_row
    }

    /// Absolute indices of the header rows.
    pub fn header_rows(&self) -> std::ops::RangeInclusive<usize> {
        self.first_header_row..=self.last_header_row
    }

    /// Checks that the header range is non-empty and ends before the data.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::InvalidHeaderRange`] otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.first_header_row > self.last_header_row
            || self.last_header_row >= self.first_data_row
        {
            return Err(CubeError::InvalidHeaderRange {
                first: self.first_header_row,
                last: self.last_header_row,
            });
        }
        Ok(())
    }
}

/// Description of the produced data set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataSetConfig {
    /// Reference year of the census figures.
    pub reference_year: String,
    /// Year of the geographic code list the municipalities belong to.
    pub geo_year: String,
    /// Data structure definition identifier.
    pub dsd_id: String,
    /// Suffix appended to the reference year to form the data set identifier.
    pub dataset_suffix: String,
    /// Measure code.
    pub measure: String,
    /// French label; the reference year is appended.
    pub label_fr: String,
    /// English label; the reference year is appended.
    pub label_en: String,
}

impl Default for DataSetConfig {
    fn default() -> Self {
        Self {
            reference_year: "2014".into(),
            geo_year: "2017".into(),
            dsd_id: "depcomarm".into(),
            dataset_suffix: "depcomarm".into(),
            measure: "pop15Plus".into(),
            label_fr: "POP5 - Population de 15 ans ou plus par commune ou arrondissement \
                       municipal, sexe, âge et type d'activité - France hors Mayotte"
                .into(),
            label_en: "POP5 - Population age 15 or more by municipality or municipal \
                       arrondissement, sex, age and type of activity - France except Mayotte"
                .into(),
        }
    }
}

impl DataSetConfig {
    /// Data set identifier, e.g. `2014-depcomarm`.
    #[must_use]
    pub fn dataset_id(&self) -> String {
        format!("{}-{}", self.reference_year, self.dataset_suffix)
    }

    /// French label including the reference year.
    #[must_use]
    pub fn full_label_fr(&self) -> String {
        format!("{} - {}", self.label_fr, self.reference_year)
    }

    /// English label including the reference year.
    #[must_use]
    pub fn full_label_en(&self) -> String {
        format!("{} - {}", self.label_en, self.reference_year)
    }
}

/// Where and how artifacts are written.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Output directory.
    pub dir: PathBuf,
    /// File name stem; partitions append `-<digit>`, the aggregate `-dep`.
    pub file_stem: String,
    /// Serialization format.
    pub format: Format,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("out"),
            file_stem: "ds-pop5".into(),
            format: Format::Turtle,
        }
    }
}

/// Pause observed between partitions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThrottleConfig {
    /// Seconds to wait after each partition but the last; 0 disables.
    pub pause_secs: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self { pause_secs: 20 }
    }
}

impl ThrottleConfig {
    /// Pause as a duration.
    #[must_use]
    pub fn pause(&self) -> Duration {
        Duration::from_secs(self.pause_secs)
    }
}
