//! The explicit context threaded through every stage of a build.

use crate::config::{DataSetConfig, SheetLayout};
use crate::model::{iris, Graph, Term};
use crate::naming::{ComponentKind, GeoLevel, Naming};
use crate::tabular::TabularSource;

/// Everything a stage needs to read the workbook and name what it produces.
///
/// Owned by the caller for the duration of a run; stages only borrow it.
#[derive(Clone, Copy)]
pub struct CubeContext<'a> {
    /// The loaded workbook.
    pub source: &'a dyn TabularSource,
    /// IRI scheme and department lookup.
    pub naming: &'a dyn Naming,
    /// Sheet geometry.
    pub layout: &'a SheetLayout,
    /// Data set description.
    pub dataset: &'a DataSetConfig,
}

impl<'a> CubeContext<'a> {
    /// Bundles the collaborators of a run.
    #[must_use]
    pub fn new(
        source: &'a dyn TabularSource,
        naming: &'a dyn Naming,
        layout: &'a SheetLayout,
        dataset: &'a DataSetConfig,
    ) -> Self {
        Self {
            source,
            naming,
            layout,
            dataset,
        }
    }

    /// IRI of the data set this run populates.
    #[must_use]
    pub fn dataset_iri(&self) -> String {
        self.naming.dataset_uri(&self.dataset.dataset_id())
    }

    /// IRI of the measure property.
    #[must_use]
    pub fn measure_iri(&self) -> String {
        self.naming
            .component_uri(ComponentKind::Measure, &self.dataset.measure)
    }

    /// The data sheets in processing order, with the geographic level of their rows.
    #[must_use]
    pub fn data_sheets(&self) -> [(usize, GeoLevel); 2] {
        [
            (self.layout.municipality_sheet, GeoLevel::Commune),
            (
                self.layout.arrondissement_sheet,
                GeoLevel::ArrondissementMunicipal,
            ),
        ]
    }

    /// A fresh graph with the standard and naming prefixes declared.
    #[must_use]
    pub fn new_graph(&self) -> Graph {
        let mut graph = Graph::new();
        for (prefix, namespace) in iris::STANDARD_PREFIXES {
            graph.set_prefix(*prefix, *namespace);
        }
        for (prefix, namespace) in self.naming.prefixes() {
            graph.set_prefix(prefix, namespace);
        }
        graph
    }

    /// Asserts the data set resource, its labels and, if `attach_schema`, its structure.
    pub fn add_dataset(&self, graph: &mut Graph, attach_schema: bool) {
        let dataset = self.dataset_iri();
        graph.add(&dataset, iris::RDF_TYPE, Term::iri(iris::QB_DATASET));
        graph.add(
            &dataset,
            iris::RDFS_LABEL,
            Term::lang(self.dataset.full_label_fr(), "fr"),
        );
        graph.add(
            &dataset,
            iris::RDFS_LABEL,
            Term::lang(self.dataset.full_label_en(), "en"),
        );
        if attach_schema {
            graph.add(
                &dataset,
                iris::QB_STRUCTURE,
                Term::iri(self.naming.dsd_uri(&self.dataset.dsd_id)),
            );
        }
    }
}
