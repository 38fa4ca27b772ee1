//! Turtle 1.1 serializer for cube graphs.
//!
//! Emits the graph's prefix declarations, then one block per subject with
//! `;`-separated predicate/object pairs. IRIs are compacted against the
//! declared prefixes when the local part is a plain name.

use crate::model::{iris, Graph, Term};
use crate::serializer::escape;

/// Serializes `graph` to a Turtle string.
#[must_use]
pub fn to_turtle(graph: &Graph) -> String {
    let mut out = String::with_capacity(graph.len() * 96 + 1024);
    let prefixes = graph.prefixes();

    for (prefix, namespace) in prefixes {
        out.push_str(&format!("@prefix {prefix}: <{namespace}> .\n"));
    }
    if !prefixes.is_empty() {
        out.push('\n');
    }

    let mut current: Option<&str> = None;
    for t in graph.triples() {
        if current == Some(t.subject.as_str()) {
            out.push_str(" ;\n    ");
        } else {
            if current.is_some() {
                out.push_str(" .\n\n");
            }
            out.push_str(&name(&t.subject, prefixes));
            out.push_str("\n    ");
            current = Some(t.subject.as_str());
        }
        if t.predicate == iris::RDF_TYPE {
            out.push('a');
        } else {
            out.push_str(&name(&t.predicate, prefixes));
        }
        out.push(' ');
        out.push_str(&object(&t.object, prefixes));
    }
    if current.is_some() {
        out.push_str(" .\n");
    }
    out
}

fn object(term: &Term, prefixes: &[(String, String)]) -> String {
    match term {
        Term::Iri(iri) => name(iri, prefixes),
        Term::LangString { value, lang } => format!("\"{}\"@{}", escape(value), lang),
        Term::Typed { value, datatype } => {
            format!("\"{}\"^^{}", escape(value), name(datatype, prefixes))
        }
    }
}

/// Prefixed name for `iri` if a declared namespace matches, `<iri>` otherwise.
fn name(iri: &str, prefixes: &[(String, String)]) -> String {
    prefixes
        .iter()
        .filter_map(|(prefix, namespace)| {
            iri.strip_prefix(namespace.as_str())
                .filter(|local| is_plain_local(local))
                .map(|local| (namespace.len(), prefix, local))
        })
        .max_by_key(|(len, _, _)| *len)
        .map_or_else(|| format!("<{iri}>"), |(_, prefix, local)| format!("{prefix}:{local}"))
}

/// Local names restricted to `[A-Za-z0-9_-]`, not starting with `-`; anything
/// else stays a full IRI so no Turtle escaping is needed.
fn is_plain_local(local: &str) -> bool {
    !local.starts_with('-')
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Graph {
        let mut g = Graph::new();
        g.set_prefix("qb", iris::QB);
        g.set_prefix("xsd", iris::XSD);
        g.set_prefix("obs", "http://example.org/obs/");
        g.set_prefix("obs-com", "http://example.org/obs/com/");
        g.add("http://example.org/obs/com/01001-M", iris::RDF_TYPE, Term::iri(iris::QB_OBSERVATION));
        g.add("http://example.org/obs/com/01001-M", "http://example.org/m", Term::float(3.5));
        g.add("http://example.org/obs/x%2Dy", iris::RDF_TYPE, Term::iri(iris::QB_OBSERVATION));
        g
    }

    #[test]
    fn prefixes_are_declared_first() {
        let ttl = to_turtle(&sample());
        assert!(ttl.starts_with("@prefix qb: <http://purl.org/linked-data/cube#> .\n"));
        assert!(ttl.contains("@prefix obs-com: <http://example.org/obs/com/> ."));
    }

    #[test]
    fn longest_namespace_wins_and_subjects_are_grouped() {
        let ttl = to_turtle(&sample());
        assert!(ttl.contains(
            "obs-com:01001-M\n    <http://example.org/m> \"3.5\"^^xsd:float ;\n    a qb:Observation .\n"
        ));
    }

    #[test]
    fn escaped_local_names_stay_full_iris() {
        let ttl = to_turtle(&sample());
        assert!(ttl.contains("<http://example.org/obs/x%2Dy>\n    a qb:Observation .\n"));
    }

    #[test]
    fn empty_graph_renders_prefixes_only() {
        let mut g = Graph::new();
        g.set_prefix("qb", iris::QB);
        assert_eq!(to_turtle(&g), "@prefix qb: <http://purl.org/linked-data/cube#> .\n\n");
    }
}
