//! RDF 1.1 validator.
//!
//! Re-parses every listed artifact with sophia's Turtle or N-Triples parser
//! and compares its triple count with the count the manifest recorded.

use std::path::Path;

use anyhow::Result;
use pop5_cube::RunManifest;

use super::parse_artifact;
use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "artifacts/rdf";

/// Validates the well-formedness and statement counts of every artifact.
///
/// # Errors
///
/// Returns an error if a listed artifact exists but cannot be read.
pub fn validate(artifacts: &Path, manifest: &RunManifest) -> Result<ConformanceReport> {
    let mut report = ConformanceReport::new();

    for artifact in manifest.artifacts() {
        let path = artifacts.join(&artifact.file);
        if !path.is_file() {
            // Reported by the inventory validator.
            continue;
        }
        match parse_artifact(&path, manifest.format, &mut |_| {})? {
            Ok(count) if count == artifact.statements => {
                report.push(TestResult::pass(
                    VALIDATOR,
                    format!("{} parses ({count} triples)", artifact.file),
                ));
            }
            Ok(count) => {
                report.push(TestResult::fail(
                    VALIDATOR,
                    format!(
                        "{} has {count} triples, manifest records {}",
                        artifact.file, artifact.statements
                    ),
                ));
            }
            Err(e) => {
                report.push(TestResult::fail_with_details(
                    VALIDATOR,
                    format!("{} does not parse", artifact.file),
                    vec![e],
                ));
            }
        }
    }

    let sum: usize = manifest.artifacts().map(|a| a.statements).sum();
    if sum == manifest.total_statements {
        report.push(TestResult::pass(
            VALIDATOR,
            format!("Manifest total of {sum} statements is consistent"),
        ));
    } else {
        report.push(TestResult::fail(
            VALIDATOR,
            format!(
                "Manifest total {} differs from the sum of its artifacts ({sum})",
                manifest.total_statements
            ),
        ));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures;

    #[test]
    fn built_artifacts_parse_with_recorded_counts() {
        let dir = fixtures::built_output();
        let manifest = RunManifest::read(dir.path()).unwrap();
        let report = validate(dir.path(), &manifest).unwrap();
        assert!(report.all_passed(), "{:#?}", report.results);
        assert_eq!(report.results.len(), 12);
    }

    #[test]
    fn truncated_artifact_fails() {
        let dir = fixtures::built_output();
        let manifest = RunManifest::read(dir.path()).unwrap();
        let path = dir.path().join(&manifest.partitions[0].file);
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        std::fs::write(&path, lines[..lines.len() / 2].join("\n")).unwrap();
        let report = validate(dir.path(), &manifest).unwrap();
        assert_eq!(report.failure_count(), 1);
    }

    #[test]
    fn ntriples_output_is_checked_with_ntriples_parser() {
        let dir = fixtures::built_output_as(pop5_cube::Format::NTriples);
        let manifest = RunManifest::read(dir.path()).unwrap();
        let report = validate(dir.path(), &manifest).unwrap();
        assert!(report.all_passed(), "{:#?}", report.results);
    }
}
