//! Partitioning validator.
//!
//! Checks the properties that make the partition artifacts mergeable:
//! - `qb:structure` is asserted once, in partition `0`, and nowhere else
//! - no observation appears in two partitions
//! - each artifact holds as many observations as the manifest records
//! - codes outside every partition are surfaced as a warning

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use pop5_cube::model::iris;
use pop5_cube::RunManifest;

use super::parse_artifact;
use crate::report::{ConformanceReport, TestResult};

const VALIDATOR: &str = "artifacts/partition";

/// Validates structure-link placement and observation disjointness.
///
/// # Errors
///
/// Returns an error if a listed artifact exists but cannot be read.
pub fn validate(artifacts: &Path, manifest: &RunManifest) -> Result<ConformanceReport> {
    let mut report = ConformanceReport::new();
    let mut owner: HashMap<String, String> = HashMap::new();
    let mut overlaps: Vec<String> = Vec::new();
    let mut misplaced: Vec<String> = Vec::new();
    let mut structure_in_zero = 0usize;

    for artifact in manifest.artifacts() {
        let path = artifacts.join(&artifact.file);
        if !path.is_file() {
            continue;
        }
        let is_partition = artifact.name.len() == 1;
        let mut structure_links = 0usize;
        let mut observations = 0usize;
        let parsed = parse_artifact(&path, manifest.format, &mut |st| {
            if st.predicate == iris::QB_STRUCTURE {
                structure_links += 1;
            }
            if st.predicate == iris::RDF_TYPE
                && st.object.as_deref() == Some(iris::QB_OBSERVATION)
            {
                observations += 1;
                if let (true, Some(subject)) = (is_partition, st.subject) {
                    if let Some(previous) = owner.insert(subject.clone(), artifact.name.clone()) {
                        overlaps.push(format!("{subject} in {previous} and {}", artifact.name));
                    }
                }
            }
        })?;
        if parsed.is_err() {
            // Reported by the RDF validator.
            continue;
        }

        if artifact.name == "0" {
            structure_in_zero = structure_links;
        } else if structure_links > 0 {
            misplaced.push(format!("{} ({structure_links})", artifact.file));
        }

        if observations != artifact.observations {
            report.push(TestResult::fail(
                VALIDATOR,
                format!(
                    "{} has {observations} observations, manifest records {}",
                    artifact.file, artifact.observations
                ),
            ));
        }
    }

    if structure_in_zero == 1 && misplaced.is_empty() {
        report.push(TestResult::pass(
            VALIDATOR,
            "qb:structure asserted exactly once, in partition 0",
        ));
    } else {
        let mut details = misplaced;
        details.insert(0, format!("partition 0: {structure_in_zero}"));
        report.push(TestResult::fail_with_details(
            VALIDATOR,
            "qb:structure must appear once, in partition 0 only",
            details,
        ));
    }

    if overlaps.is_empty() {
        report.push(TestResult::pass(
            VALIDATOR,
            format!("{} observations, pairwise disjoint across partitions", owner.len()),
        ));
    } else {
        let count = overlaps.len();
        overlaps.truncate(10);
        report.push(TestResult::fail_with_details(
            VALIDATOR,
            format!("{count} observations appear in more than one partition"),
            overlaps,
        ));
    }

    let gap = &manifest.partition_gap;
    if gap.count == 0 {
        report.push(TestResult::pass(VALIDATOR, "Every geographic code was partitioned"));
    } else {
        let mut result = TestResult::warn(
            VALIDATOR,
            format!("{} geographic codes belong to no partition", gap.count),
        );
        result.details = gap.codes.iter().take(20).cloned().collect();
        report.push(result);
    }

    Ok(report)
}
