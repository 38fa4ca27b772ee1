//! In-memory RDF graph.
//!
//! A [`Graph`] is a set of triples with owned IRIs and literals, plus the
//! namespace prefixes the serializers use to compact output. Triples are kept
//! in a `BTreeSet`, so duplicates collapse and iteration is grouped by subject
//! in a stable order.

use std::collections::BTreeSet;

/// Object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    /// An IRI reference.
    Iri(String),
    /// A language-tagged string.
    LangString {
        /// Lexical form.
        value: String,
        /// BCP 47 language tag.
        lang: String,
    },
    /// A typed literal.
    Typed {
        /// Lexical form.
        value: String,
        /// Datatype IRI.
        datatype: String,
    },
}

impl Term {
    /// An IRI term.
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// A language-tagged string.
    pub fn lang(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Term::LangString {
            value: value.into(),
            lang: lang.into(),
        }
    }

    /// An `xsd:float` literal.
    #[must_use]
    pub fn float(value: f64) -> Self {
        Term::Typed {
            value: float_lexical(value),
            datatype: iris::XSD_FLOAT.to_owned(),
        }
    }
}

/// Lexical form of an `xsd:float`: always carries a decimal point or an exponent.
fn float_lexical(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_owned()
    } else if value.is_infinite() {
        (if value > 0.0 { "INF" } else { "-INF" }).to_owned()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// A single statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Triple {
    /// Subject IRI.
    pub subject: String,
    /// Predicate IRI.
    pub predicate: String,
    /// Object term.
    pub object: Term,
}

/// A set of triples with serialization prefixes.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    prefixes: Vec<(String, String)>,
    triples: BTreeSet<Triple>,
}

impl Graph {
    /// Creates an empty graph with no prefixes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a namespace prefix. Redeclaring a prefix replaces its namespace.
    pub fn set_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        let namespace = namespace.into();
        match self.prefixes.iter_mut().find(|(p, _)| *p == prefix) {
            Some(entry) => entry.1 = namespace,
            None => self.prefixes.push((prefix, namespace)),
        }
    }

    /// Declared prefixes, in declaration order.
    #[must_use]
    pub fn prefixes(&self) -> &[(String, String)] {
        &self.prefixes
    }

    /// Adds a statement. Returns false if it was already present.
    pub fn add(&mut self, subject: &str, predicate: &str, object: Term) -> bool {
        self.triples.insert(Triple {
            subject: subject.to_owned(),
            predicate: predicate.to_owned(),
            object,
        })
    }

    /// Number of distinct statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns true if the graph holds no statement.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterates over statements, ordered by subject, predicate, object.
    pub fn triples(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Returns true if the exact statement is present.
    #[must_use]
    pub fn contains(&self, subject: &str, predicate: &str, object: &Term) -> bool {
        self.triples.iter().any(|t| {
            t.subject == subject && t.predicate == predicate && t.object == *object
        })
    }

    /// Objects of all statements with the given subject and predicate.
    pub fn objects<'a>(
        &'a self,
        subject: &'a str,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.triples
            .iter()
            .filter(move |t| t.subject == subject && t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// Subjects typed with `class` (`rdf:type`).
    pub fn instances_of<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.triples
            .iter()
            .filter(move |t| {
                t.predicate == iris::RDF_TYPE && matches!(&t.object, Term::Iri(c) if c == class)
            })
            .map(|t| t.subject.as_str())
    }
}

/// Standard vocabulary IRIs.
pub mod iris {
    /// RDF namespace.
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// RDFS namespace.
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    /// XSD namespace.
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
    /// RDF Data Cube namespace.
    pub const QB: &str = "http://purl.org/linked-data/cube#";

    /// `rdf:type`.
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// `rdfs:label`.
    pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    /// `xsd:float`.
    pub const XSD_FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";

    /// `qb:DataSet`.
    pub const QB_DATASET: &str = "http://purl.org/linked-data/cube#DataSet";
    /// `qb:Observation`.
    pub const QB_OBSERVATION: &str = "http://purl.org/linked-data/cube#Observation";
    /// `qb:dataSet`.
    pub const QB_DATASET_PROP: &str = "http://purl.org/linked-data/cube#dataSet";
    /// `qb:structure`.
    pub const QB_STRUCTURE: &str = "http://purl.org/linked-data/cube#structure";

    /// Prefixes every cube graph declares.
    pub const STANDARD_PREFIXES: &[(&str, &str)] = &[
        ("rdf", RDF),
        ("rdfs", RDFS),
        ("xsd", XSD),
        ("qb", QB),
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_statements_collapse() {
        let mut g = Graph::new();
        assert!(g.add("urn:s", iris::RDF_TYPE, Term::iri(iris::QB_DATASET)));
        assert!(!g.add("urn:s", iris::RDF_TYPE, Term::iri(iris::QB_DATASET)));
        assert_eq!(g.len(), 1);
        assert_eq!(g.instances_of(iris::QB_DATASET).collect::<Vec<_>>(), ["urn:s"]);
    }

    #[test]
    fn float_lexical_forms() {
        assert_eq!(Term::float(12.0), Term::Typed {
            value: "12.0".into(),
            datatype: iris::XSD_FLOAT.into(),
        });
        assert!(matches!(Term::float(2.25), Term::Typed { value, .. } if value == "2.25"));
        assert!(matches!(Term::float(f64::NAN), Term::Typed { value, .. } if value == "NaN"));
    }

    #[test]
    fn prefixes_are_replaced_not_duplicated() {
        let mut g = Graph::new();
        g.set_prefix("qb", "urn:a");
        g.set_prefix("qb", iris::QB);
        assert_eq!(g.prefixes(), [("qb".to_owned(), iris::QB.to_owned())]);
    }
}
