//! N-Triples serializer for cube graphs.
//!
//! Produces a valid N-Triples document (one triple per line, absolute IRIs).
//! Each line stands alone, so partition files can be concatenated into one
//! data set file with `cat`.

use crate::model::{Graph, Term};
use crate::serializer::escape;

/// Serializes `graph` to an N-Triples string.
#[must_use]
pub fn to_ntriples(graph: &Graph) -> String {
    let mut out = String::with_capacity(graph.len() * 160);
    for t in graph.triples() {
        out.push('<');
        out.push_str(&t.subject);
        out.push_str("> <");
        out.push_str(&t.predicate);
        out.push_str("> ");
        out.push_str(&object(&t.object));
        out.push_str(" .\n");
    }
    out
}

fn object(term: &Term) -> String {
    match term {
        Term::Iri(iri) => format!("<{iri}>"),
        Term::LangString { value, lang } => format!("\"{}\"@{}", escape(value), lang),
        Term::Typed { value, datatype } => format!("\"{}\"^^<{}>", escape(value), datatype),
    }
}
