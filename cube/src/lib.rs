//! POP5 census table as an RDF Data Cube.
//!
//! The `pop5-cube` crate reads the INSEE POP5 workbook (population aged 15 or
//! more by sex, age band and activity type, per municipality and municipal
//! arrondissement) and turns it into `qb:Observation` graphs:
//!
//! - ten partition graphs, one per leading digit of the geographic code;
//! - one department aggregate graph summing municipalities per department.
//!
//! # Entry Point
//!
//! ```no_run
//! use std::path::Path;
//! use pop5_cube::{build, ArtifactWriter, Config, CubeContext, InseeNaming, Throttle, Workbook};
//!
//! # fn main() -> pop5_cube::Result<()> {
//! let config = Config::load(Path::new("config/pop5.toml"))?;
//! let workbook = Workbook::open(&config.source.path)?;
//! let naming = InseeNaming::new(config.dataset.geo_year.clone());
//! let ctx = CubeContext::new(&workbook, &naming, &config.source.layout, &config.dataset);
//! let mut writer = ArtifactWriter::new(&config.output.dir, &config.output.file_stem, config.output.format)?;
//! let manifest = build(ctx, &Throttle::default(), &mut writer)?;
//! println!("{} statements", manifest.total_statements);
//! # Ok(())
//! # }
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod config;
pub mod context;
pub mod department;
pub mod error;
pub mod header;
pub mod manifest;
pub mod model;
pub mod naming;
pub mod observation;
pub mod output;
pub mod partition;
pub mod record;
pub mod run;
pub mod serializer;
pub mod tabular;

pub use config::{Config, DataSetConfig, OutputConfig, SheetLayout, SourceConfig, ThrottleConfig};
pub use context::CubeContext;
pub use department::{DepartmentAggregate, DepartmentAggregator, DepartmentKey};
pub use error::{CubeError, Result};
pub use header::{Dimension, Header, HeaderColumn};
pub use manifest::{ArtifactEntry, GapEntry, RunManifest};
pub use model::{Graph, Term, Triple};
pub use naming::{ComponentKind, GeoLevel, InseeNaming, Naming};
pub use observation::{Generated, GenerationStats, Observation, ObservationGenerator};
pub use output::{ArtifactWriter, GraphSink};
pub use partition::{Cancellation, Partition, PartitionDriver, PartitionGap, Throttle};
pub use run::{build, DEPARTMENT_ARTIFACT};
pub use serializer::Format;
pub use tabular::{Cell, Sheet, TabularSource, Workbook};
