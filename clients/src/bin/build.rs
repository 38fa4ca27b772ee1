//! `pop5-build`: Converts the POP5 workbook into RDF Data Cube artifacts.
//!
//! **Outputs:**
//! - `<out>/<stem>-0.ttl` … `<out>/<stem>-9.ttl`: one graph per leading digit
//! - `<out>/<stem>-dep.ttl`: department aggregate
//! - `<out>/manifest.json`: run manifest
//!
//! **Usage:**
//! ```
//! pop5-build [--config <path>] [--input <xls>] [--out <dir>] [--format turtle|ntriples] [--pause-secs <n>]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pop5_cube::{
    build, ArtifactWriter, Cancellation, Config, CubeContext, Format, InseeNaming, Throttle,
    Workbook,
};
use tracing_subscriber::{fmt, EnvFilter};

/// Build the POP5 data cube artifacts.
#[derive(Parser)]
#[command(name = "pop5-build", about = "Build POP5 RDF Data Cube artifacts")]
struct Args {
    /// Run configuration (TOML).
    #[arg(long, default_value = "config/pop5.toml")]
    config: PathBuf,

    /// Workbook to read, overriding `[source] path`.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output directory, overriding `[output] dir`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Output format, overriding `[output] format`.
    #[arg(long)]
    format: Option<Format>,

    /// Seconds to pause between partitions, overriding `[throttle] pause_secs`.
    #[arg(long)]
    pause_secs: Option<u64>,
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env).with_target(false).init();

    let args = Args::parse();
    let mut config = Config::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    if let Some(input) = args.input {
        config.source.path = input;
    }
    if let Some(out) = args.out {
        config.output.dir = out;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    let pause = args
        .pause_secs
        .map_or_else(|| config.throttle.pause(), Duration::from_secs);

    let workbook = Workbook::open(&config.source.path)
        .with_context(|| format!("Failed to open {}", config.source.path.display()))?;
    let naming = InseeNaming::new(config.dataset.geo_year.clone());
    let ctx = CubeContext::new(&workbook, &naming, &config.source.layout, &config.dataset);
    let mut writer = ArtifactWriter::new(
        &config.output.dir,
        config.output.file_stem.clone(),
        config.output.format,
    )
    .context("Failed to prepare output directory")?;
    let throttle = Throttle::new(pause, Cancellation::new());

    let manifest = build(ctx, &throttle, &mut writer).context("Build failed")?;

    println!("POP5 data cube {}", manifest.dataset);
    for artifact in manifest.artifacts() {
        println!(
            "  Written: {} ({} statements, {} observations)",
            writer.dir().join(&artifact.file).display(),
            artifact.statements,
            artifact.observations
        );
    }
    if manifest.partition_gap.count > 0 {
        println!(
            "  Skipped: {} rows outside every partition",
            manifest.partition_gap.count
        );
    }
    println!("Total: {} statements", manifest.total_statements);
    Ok(())
}
