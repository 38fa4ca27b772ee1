//! Build output validators (inventory, RDF well-formedness, partitioning).

use std::path::Path;

use anyhow::{Context, Result};
use pop5_cube::Format;
use sophia_api::source::TripleSource;
use sophia_api::term::Term;
use sophia_api::triple::Triple;
use sophia_turtle::parser::{nt, turtle};

pub mod inventory;
pub mod partition;
pub mod rdf;

/// One parsed statement, with IRIs in their absolute form.
///
/// Subject and object are `None` when they are not IRIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Subject IRI.
    pub subject: Option<String>,
    /// Predicate IRI.
    pub predicate: String,
    /// Object IRI.
    pub object: Option<String>,
}

/// Parses the artifact at `path` with sophia and hands every statement to `visit`.
///
/// The outer result fails on I/O; the inner one carries the parser's message
/// and is what validators report.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn parse_artifact(
    path: &Path,
    format: Format,
    visit: &mut dyn FnMut(Statement),
) -> Result<std::result::Result<usize, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(match format {
        Format::Turtle => drain(turtle::parse_str(&content), visit),
        Format::NTriples => drain(nt::parse_str(&content), visit),
    })
}

fn drain<S: TripleSource>(
    mut source: S,
    visit: &mut dyn FnMut(Statement),
) -> std::result::Result<usize, String> {
    let mut count = 0usize;
    source
        .for_each_triple(|t| {
            count += 1;
            visit(Statement {
                subject: t.s().iri().map(|i| i.as_str().to_owned()),
                predicate: t.p().iri().map(|i| i.as_str().to_owned()).unwrap_or_default(),
                object: t.o().iri().map(|i| i.as_str().to_owned()),
            });
        })
        .map_err(|e| e.to_string())?;
    Ok(count)
}
