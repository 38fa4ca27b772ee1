//! Serializers for cube graphs.
//!
//! Two formats are supported:
//! - **Turtle** ([`turtle`]): prefixed, grouped by subject; the default
//! - **N-Triples** ([`ntriples`]): one triple per line, absolute IRIs

use serde::{Deserialize, Serialize};

use crate::model::Graph;

pub mod ntriples;
pub mod turtle;

/// Output serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Turtle 1.1.
    Turtle,
    /// N-Triples.
    NTriples,
}

impl Format {
    /// File extension, without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Format::Turtle => "ttl",
            Format::NTriples => "nt",
        }
    }

    /// Renders `graph` in this format.
    #[must_use]
    pub fn render(self, graph: &Graph) -> String {
        match self {
            Format::Turtle => turtle::to_turtle(graph),
            Format::NTriples => ntriples::to_ntriples(graph),
        }
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "turtle" | "ttl" => Ok(Format::Turtle),
            "ntriples" | "n-triples" | "nt" => Ok(Format::NTriples),
            other => Err(format!("unknown format '{other}' (expected turtle or ntriples)")),
        }
    }
}

/// Escapes a literal's lexical form for a double-quoted string.
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}
