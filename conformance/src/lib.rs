//! POP5 cube conformance suite.
//!
//! Validates the output directory of a `pop5-build` run against the run
//! manifest it wrote alongside the artifacts.
//!
//! # Conformance Scope
//!
//! | Check | Standard |
//! |-------|----------|
//! | Inventory | manifest lists every artifact, nothing stray |
//! | Artifacts | RDF 1.1 Turtle / N-Triples, counts match the manifest |
//! | Partitioning | one `qb:structure` link, disjoint observation sets |
//!
//! # Entry Point
//!
//! ```no_run
//! use std::path::Path;
//!
//! let report = pop5_conformance::run_all(Path::new("out")).expect("Failed to run conformance");
//! assert!(report.all_passed());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod report;
#[cfg(test)]
mod tests;
pub mod validators;

use std::path::Path;

use pop5_cube::RunManifest;

pub use report::{ConformanceReport, Severity, TestResult};

/// Runs all conformance validators against an output directory.
///
/// Validators are run in this order:
/// 1. Inventory (manifest, listed files, stray files)
/// 2. RDF well-formedness and statement counts
/// 3. Partitioning properties
///
/// The last two need a readable manifest and are skipped without one; the
/// inventory validator already reports that as a failure.
///
/// # Errors
///
/// Returns an error only if a file system operation fails.
pub fn run_all(artifacts: &Path) -> anyhow::Result<ConformanceReport> {
    let mut report = ConformanceReport::new();

    // 1. Inventory
    report.extend(validators::artifacts::inventory::validate(artifacts)?);

    let Ok(manifest) = RunManifest::read(artifacts) else {
        return Ok(report);
    };

    // 2. RDF 1.1
    report.extend(validators::artifacts::rdf::validate(artifacts, &manifest)?);

    // 3. Partitioning
    report.extend(validators::artifacts::partition::validate(artifacts, &manifest)?);

    Ok(report)
}

#[cfg(test)]
mod tests_unit {
    use super::*;

    #[test]
    fn built_output_conforms() {
        let dir = tests::fixtures::built_output();
        let report = run_all(dir.path()).unwrap();
        assert!(report.all_passed(), "{:#?}", report.results);
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn empty_directory_stops_after_inventory() {
        let dir = tempfile::tempdir().unwrap();
        let report = run_all(dir.path()).unwrap();
        assert_eq!(report.results.len(), 1);
        assert!(!report.all_passed());
    }
}
