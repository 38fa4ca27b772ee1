//! `pop5-inspect`: Prints a workbook's sheets and, given a layout, its parsed header.
//!
//! Use it to find the header rows of a new POP5 release before writing its
//! configuration.
//!
//! **Usage:**
//! ```
//! pop5-inspect <workbook> [--config <path>] [--rows <n>]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pop5_cube::{header, Config, InseeNaming, TabularSource, Workbook};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

/// Inspect a POP5 workbook.
#[derive(Parser)]
#[command(name = "pop5-inspect", about = "Print workbook sheets and the parsed POP5 header")]
struct Args {
    /// Workbook (xls, xlsx or ods).
    workbook: PathBuf,

    /// Run configuration whose layout is applied to the workbook.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Leading rows to print per sheet.
    #[arg(long, default_value_t = 15)]
    rows: usize,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env).with_target(false).init();

    let args = Args::parse();
    let workbook = Workbook::open(&args.workbook)
        .with_context(|| format!("Failed to open {}", args.workbook.display()))?;

    println!("Sheets ({}):", workbook.sheet_count());
    for (index, sheet) in workbook.sheets().iter().enumerate() {
        println!("\n[{index}] {}: {} rows", sheet.name(), sheet.row_count());
        for row in 0..sheet.row_count().min(args.rows) {
            let cells: Vec<String> = (0..sheet.row_len(row))
                .map(|col| sheet.cell(row, col).to_string())
                .collect();
            println!("  {row:>3}: {}", cells.join(" | "));
        }
    }

    let Some(config_path) = args.config else {
        return Ok(());
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let layout = &config.source.layout;
    let naming = InseeNaming::new(config.dataset.geo_year.clone());

    for (label, index) in [
        ("municipality", layout.municipality_sheet),
        ("arrondissement", layout.arrondissement_sheet),
    ] {
        let sheet = workbook.sheet(index)?;
        match header::parse(sheet, layout, &naming) {
            Ok(parsed) => {
                println!("\nHeader of {label} sheet '{}':", sheet.name());
                let concepts: Vec<&str> =
                    parsed.dimensions.iter().map(|d| d.concept.as_str()).collect();
                println!("  concepts: {}", concepts.join(", "));
                for column in parsed.columns() {
                    println!("  column {:>3}: {}", column.index, column.codes.join(" / "));
                }
            }
            Err(e) => warn!(sheet = sheet.name(), "header does not parse: {e}"),
        }
    }
    Ok(())
}
