//! `pop5-conformance`: Validates a `pop5-build` output directory.
//!
//! Checks the artifact inventory against `manifest.json`, re-parses every
//! artifact as RDF, and verifies the partitioning properties.
//!
//! **Usage:**
//! ```
//! pop5-conformance [--artifacts <path>]
//! ```
//!
//! Exits non-zero if any conformance check fails.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use pop5_conformance::run_all;

/// Run the POP5 cube conformance suite.
#[derive(Parser)]
#[command(
    name = "pop5-conformance",
    about = "Validate POP5 data cube artifacts"
)]
struct Args {
    /// Output directory of a build (default: out/).
    #[arg(long, default_value = "out")]
    artifacts: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let report = run_all(&args.artifacts)?;

    println!("POP5 Data Cube Conformance Report");
    println!("=================================");
    println!();
    for result in &report.results {
        println!("{result}");
    }

    let failed = report.failure_count();
    println!();
    println!(
        "Summary: {} passed, {} warnings, {} failed",
        report.results.len() - failed - report.warning_count(),
        report.warning_count(),
        failed
    );

    if failed > 0 {
        eprintln!("Conformance FAILED: {failed} check(s) did not pass.");
        process::exit(1);
    }

    println!("Conformance PASSED.");
    Ok(())
}
