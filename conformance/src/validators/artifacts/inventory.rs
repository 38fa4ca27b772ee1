//! Output inventory validator.
//!
//! Verifies that the output directory holds exactly what the manifest lists:
//! - `manifest.json` exists and decodes
//! - ten partition artifacts plus the department aggregate are listed
//! - every listed file exists
//! - no stray `.ttl`, `.nt` or `.tmp` files are present

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Result;
use pop5_cube::RunManifest;
use walkdir::WalkDir;

use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "artifacts/inventory";
const EXPECTED_PARTITIONS: usize = 10;

/// Validates the output inventory of `artifacts` against its manifest.
///
/// # Errors
///
/// This validator reports problems as results; it does not currently fail.
pub fn validate(artifacts: &Path) -> Result<ConformanceReport> {
    let mut report = ConformanceReport::new();

    let manifest = match RunManifest::read(artifacts) {
        Ok(manifest) => {
            report.push(TestResult::pass(
                VALIDATOR,
                format!("{} decodes", RunManifest::FILE_NAME),
            ));
            manifest
        }
        Err(e) => {
            report.push(TestResult::fail(
                VALIDATOR,
                format!("{} unusable: {e}", RunManifest::FILE_NAME),
            ));
            return Ok(report);
        }
    };

    if manifest.partitions.len() == EXPECTED_PARTITIONS {
        report.push(TestResult::pass(
            VALIDATOR,
            format!("{EXPECTED_PARTITIONS} partition artifacts listed"),
        ));
    } else {
        report.push(TestResult::fail(
            VALIDATOR,
            format!(
                "{} partition artifacts listed (expected {EXPECTED_PARTITIONS})",
                manifest.partitions.len()
            ),
        ));
    }
    if manifest.department.is_none() {
        report.push(TestResult::fail(
            VALIDATOR,
            "Department aggregate artifact not listed",
        ));
    }

    let listed: BTreeSet<&str> = manifest.artifacts().map(|a| a.file.as_str()).collect();
    let missing: Vec<String> = listed
        .iter()
        .filter(|file| !artifacts.join(file).is_file())
        .map(|file| (*file).to_owned())
        .collect();
    if missing.is_empty() {
        report.push(TestResult::pass(
            VALIDATOR,
            format!("All {} listed artifacts exist", listed.len()),
        ));
    } else {
        report.push(TestResult::fail_with_details(
            VALIDATOR,
            "Listed artifacts missing from output directory",
            missing,
        ));
    }

    let stray: Vec<String> = WalkDir::new(artifacts)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_owned))
        .filter(|name| is_rdf_or_partial(name) && !listed.contains(name.as_str()))
        .collect();
    if stray.is_empty() {
        report.push(TestResult::pass(VALIDATOR, "No stray artifacts"));
    } else {
        report.push(TestResult::fail_with_details(
            VALIDATOR,
            "Output directory holds files the manifest does not list",
            stray,
        ));
    }

    Ok(report)
}

fn is_rdf_or_partial(name: &str) -> bool {
    [".ttl", ".nt", ".tmp"].iter().any(|ext| name.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures;

    #[test]
    fn complete_build_passes() {
        let dir = fixtures::built_output();
        let report = validate(dir.path()).unwrap();
        assert!(report.all_passed(), "{:#?}", report.results);
    }

    #[test]
    fn leftover_temporary_file_is_stray() {
        let dir = fixtures::built_output();
        std::fs::write(dir.path().join("ds-pop5-3.ttl.tmp"), "").unwrap();
        let report = validate(dir.path()).unwrap();
        assert_eq!(report.failure_count(), 1);
    }

    #[test]
    fn missing_manifest_fails() {
        let dir = tempfile::tempdir().unwrap();
        let report = validate(dir.path()).unwrap();
        assert!(!report.all_passed());
    }
}
