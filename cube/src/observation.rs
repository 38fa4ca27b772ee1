//! Observation generation.
//!
//! One observation is emitted per (geographic unit, header column) cell of the
//! municipality and arrondissement sheets. A selection predicate on the
//! geographic code decides which rows take part, which is how
//! [`crate::partition`] slices a run.

use tracing::{debug, info};

use crate::context::CubeContext;
use crate::error::Result;
use crate::header::{Header, HeaderColumn};
use crate::model::{iris, Graph, Term};
use crate::naming::GeoLevel;
use crate::record::RecordReader;

/// A single cube observation, ready to be asserted into a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Observation IRI.
    pub iri: String,
    /// IRI of the geographic unit.
    pub geo: String,
    /// `(dimension property, code item)` pairs in header-row order.
    pub dimensions: Vec<(String, String)>,
    /// Measure value.
    pub value: f64,
}

impl Observation {
    /// Asserts the observation's facts into `graph`.
    pub fn add_to(&self, graph: &mut Graph, dataset: &str, geo_dimension: &str, measure: &str) {
        graph.add(&self.iri, iris::RDF_TYPE, Term::iri(iris::QB_OBSERVATION));
        graph.add(&self.iri, iris::QB_DATASET_PROP, Term::iri(dataset));
        graph.add(&self.iri, geo_dimension, Term::iri(&self.geo));
        for (property, code) in &self.dimensions {
            graph.add(&self.iri, property, Term::iri(code));
        }
        graph.add(&self.iri, measure, Term::float(self.value));
    }
}

/// Counters for one generator call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    /// Rows accepted by the predicate.
    pub rows_selected: usize,
    /// Rows rejected by the predicate.
    pub rows_rejected: usize,
    /// Observations emitted.
    pub observations: usize,
}

/// Output of one generator call.
#[derive(Debug)]
pub struct Generated {
    /// The produced graph.
    pub graph: Graph,
    /// What went into it.
    pub stats: GenerationStats,
}

/// Turns data rows into observations.
pub struct ObservationGenerator<'a> {
    ctx: CubeContext<'a>,
    header: &'a Header,
    dataset: String,
    geo_dimension: String,
    measure: String,
}

impl<'a> ObservationGenerator<'a> {
    /// Creates a generator for the columns described by `header`.
    #[must_use]
    pub fn new(ctx: CubeContext<'a>, header: &'a Header) -> Self {
        Self {
            dataset: ctx.dataset_iri(),
            geo_dimension: ctx.naming.geographic_dimension_uri(),
            measure: ctx.measure_iri(),
            ctx,
            header,
        }
    }

    /// Builds the observation for one cell.
    #[must_use]
    pub fn observation(
        &self,
        level: GeoLevel,
        geo_code: &str,
        column: &HeaderColumn,
        value: f64,
    ) -> Observation {
        Observation {
            iri: self.ctx.naming.observation_uri(geo_code, &column.codes),
            geo: self.ctx.naming.geographic_unit_uri(level, geo_code),
            dimensions: self
                .header
                .dimensions
                .iter()
                .zip(&column.code_iris)
                .map(|(dimension, code)| (dimension.property.clone(), code.clone()))
                .collect(),
            value,
        }
    }

    /// Generates the graph for every row whose geographic code satisfies `select`.
    ///
    /// The data set resource and its labels are always asserted; its
    /// `qb:structure` link only when `attach_schema` is set.
    ///
    /// # Errors
    ///
    /// Returns a structural error for a missing sheet or a misaligned row, and
    /// a value error for a non-numeric measure cell.
    pub fn generate(&self, select: &dyn Fn(&str) -> bool, attach_schema: bool) -> Result<Generated> {
        let mut graph = self.ctx.new_graph();
        self.ctx.add_dataset(&mut graph, attach_schema);
        let mut stats = GenerationStats::default();

        for (sheet_index, level) in self.ctx.data_sheets() {
            let sheet = self.ctx.source.sheet(sheet_index)?;
            let reader = RecordReader::new(sheet, self.ctx.layout)?;
            for record in reader.geo_codes() {
                let (row, geo_code) = record?;
                if !select(&geo_code) {
                    stats.rows_rejected += 1;
                    continue;
                }
                let values = reader.measures(row, self.header)?;
                let observations: Vec<Observation> = self
                    .header
                    .columns()
                    .zip(values)
                    .map(|(column, value)| self.observation(level, &geo_code, column, value))
                    .collect();
                for observation in &observations {
                    observation.add_to(&mut graph, &self.dataset, &self.geo_dimension, &self.measure);
                }
                stats.rows_selected += 1;
                stats.observations += observations.len();
            }
            debug!(sheet = sheet.name(), ?stats, "sheet processed");
        }

        info!(
            statements = graph.len(),
            observations = stats.observations,
            "model complete"
        );
        Ok(Generated { graph, stats })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::DataSetConfig;
    use crate::error::CubeError;
    use crate::header::{self, tests::header_rows, tests::layout};
    use crate::naming::{InseeNaming, Naming};
    use crate::tabular::{Cell, Sheet, TabularSource, Workbook};

    pub(crate) fn row(code: &str, values: &[f64]) -> Vec<Cell> {
        let mut cells = vec![Cell::from(code), Cell::from("label")];
        cells.extend(values.iter().copied().map(Cell::from));
        cells
    }

    pub(crate) fn workbook(communes: Vec<Vec<Cell>>, arrondissements: Vec<Vec<Cell>>) -> Workbook {
        let mut com = header_rows();
        com.extend(communes);
        let mut arm = header_rows();
        arm.extend(arrondissements);
        Workbook::from_sheets(vec![Sheet::from_rows("COM", com), Sheet::from_rows("ARM", arm)])
    }

    fn generate(wb: &Workbook, select: &dyn Fn(&str) -> bool, schema: bool) -> Result<Generated> {
        let naming = InseeNaming::new("2017");
        let layout = layout();
        let dataset = DataSetConfig::default();
        let ctx = CubeContext::new(wb, &naming, &layout, &dataset);
        let header = header::parse(wb.sheet(0)?, &layout, &naming)?;
        ObservationGenerator::new(ctx, &header).generate(select, schema)
    }

    #[test]
    fn one_observation_per_measured_cell() {
        let wb = workbook(vec![row("01001", &[10.0, 20.0, 30.0, 40.0])], vec![]);
        let out = generate(&wb, &|_| true, true).unwrap();
        assert_eq!(out.stats.observations, 4);

        let naming = InseeNaming::new("2017");
        let geo_dim = naming.geographic_dimension_uri();
        let observations: Vec<&str> = out.graph.instances_of(iris::QB_OBSERVATION).collect();
        assert_eq!(observations.len(), 4);

        let expected = [("M", "Y", 10.0), ("M", "O", 20.0), ("F", "Y", 30.0), ("F", "O", 40.0)];
        for (sex, age, value) in expected {
            let iri = naming.observation_uri("01001", &[sex.to_owned(), age.to_owned()]);
            assert!(out.graph.contains(
                &iri,
                &geo_dim,
                &Term::iri("http://id.insee.fr/codes/cog2017/commune/01001")
            ));
            assert!(out.graph.contains(
                &iri,
                "http://id.insee.fr/meta/dimension/SEXE",
                &Term::iri(naming.code_item_uri("SEXE", sex))
            ));
            assert!(out.graph.contains(
                &iri,
                "http://id.insee.fr/meta/dimension/AGEQ65",
                &Term::iri(naming.code_item_uri("AGEQ65", age))
            ));
            assert!(out.graph.contains(
                &iri,
                "http://id.insee.fr/meta/mesure/pop15Plus",
                &Term::float(value)
            ));
        }
    }

    #[test]
    fn rejected_rows_leave_no_trace() {
        let wb = workbook(vec![row("01001", &[10.0, 20.0, 30.0, 40.0])], vec![]);
        let all = generate(&wb, &|_| false, false).unwrap();
        assert_eq!(all.stats.observations, 0);
        assert_eq!(all.stats.rows_rejected, 1);
        assert_eq!(all.graph.instances_of(iris::QB_OBSERVATION).count(), 0);

        let empty = Workbook::from_sheets(vec![
            Sheet::from_rows("COM", header_rows()),
            Sheet::from_rows("ARM", header_rows()),
        ]);
        let baseline = generate(&empty, &|_| true, false).unwrap();
        assert_eq!(all.graph.len(), baseline.graph.len());
    }

    #[test]
    fn rejected_rows_are_not_validated() {
        let mut bad = row("1A001", &[1.0; 4]);
        bad[2] = Cell::from("x");
        let wb = workbook(vec![bad, row("01001", &[1.0; 4])], vec![]);
        let out = generate(&wb, &|code| code.starts_with('0'), false).unwrap();
        assert_eq!(out.stats.observations, 4);
    }

    #[test]
    fn arrondissements_follow_municipalities() {
        let wb = workbook(
            vec![row("75056", &[1.0; 4])],
            vec![row("75101", &[2.0; 4])],
        );
        let out = generate(&wb, &|_| true, false).unwrap();
        assert_eq!(out.stats.rows_selected, 2);
        let naming = InseeNaming::new("2017");
        let iri = naming.observation_uri("75101", &["M".to_owned(), "Y".to_owned()]);
        assert!(out.graph.contains(
            &iri,
            &naming.geographic_dimension_uri(),
            &Term::iri("http://id.insee.fr/codes/cog2017/arrondissementMunicipal/75101")
        ));
    }

    #[test]
    fn identity_is_a_function_of_code_and_column() {
        let wb = workbook(vec![row("01001", &[10.0, 20.0, 30.0, 40.0])], vec![]);
        let a = generate(&wb, &|_| true, false).unwrap();
        let b = generate(&wb, &|_| true, false).unwrap();
        let a: Vec<_> = a.graph.triples().cloned().collect();
        let b: Vec<_> = b.graph.triples().cloned().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn schema_link_only_when_requested() {
        let wb = workbook(vec![row("01001", &[1.0; 4])], vec![]);
        let naming = InseeNaming::new("2017");
        let dataset = naming.dataset_uri("2014-depcomarm");
        let with = generate(&wb, &|_| true, true).unwrap();
        let without = generate(&wb, &|_| true, false).unwrap();
        assert_eq!(with.graph.objects(&dataset, iris::QB_STRUCTURE).count(), 1);
        assert_eq!(without.graph.objects(&dataset, iris::QB_STRUCTURE).count(), 0);
        assert_eq!(without.graph.objects(&dataset, iris::RDFS_LABEL).count(), 2);
    }

    #[test]
    fn non_numeric_cell_aborts_generation() {
        let mut bad = row("01001", &[1.0; 4]);
        bad[5] = Cell::from("secret");
        let wb = workbook(vec![bad], vec![]);
        assert!(matches!(
            generate(&wb, &|_| true, false),
            Err(CubeError::NonNumericCell { column: 5, .. })
        ));
    }

    #[test]
    fn missing_arrondissement_sheet_is_fatal() {
        let mut com = header_rows();
        com.push(row("01001", &[1.0; 4]));
        let wb = Workbook::from_sheets(vec![Sheet::from_rows("COM", com)]);
        assert!(matches!(
            generate(&wb, &|_| true, false),
            Err(CubeError::MissingSheet { index: 1 })
        ));
    }
}
