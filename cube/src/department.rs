//! Department roll-up of municipal measures.
//!
//! Only the municipality sheet contributes: municipalities with arrondissements
//! (Paris, Lyon, Marseille) already carry their totals there, so adding the
//! arrondissement sheet would count those populations twice.

use std::collections::BTreeMap;

use tracing::info;

use crate::context::CubeContext;
use crate::error::{CubeError, Result};
use crate::header::{self, Header};
use crate::naming::GeoLevel;
use crate::observation::{GenerationStats, Generated, Observation};
use crate::record::RecordReader;

/// Aggregation key: a department and one code per header row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DepartmentKey {
    /// Department code.
    pub department: String,
    /// Dimension codes, in header-row order.
    pub codes: Vec<String>,
}

/// Running sums per [`DepartmentKey`].
#[derive(Debug, Clone, Default)]
pub struct DepartmentAggregate {
    sums: BTreeMap<DepartmentKey, f64>,
    rows: usize,
}

impl DepartmentAggregate {
    /// Adds `value` to the sum of `key`, starting from zero on first sight.
    pub fn add(&mut self, key: DepartmentKey, value: f64) {
        *self.sums.entry(key).or_insert(0.0) += value;
    }

    /// Current sum for `key`.
    #[must_use]
    pub fn get(&self, key: &DepartmentKey) -> Option<f64> {
        self.sums.get(key).copied()
    }

    /// Number of municipality rows folded in.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sums.len()
    }

    /// Returns true if nothing was accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sums.is_empty()
    }

    /// Keys and sums in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&DepartmentKey, f64)> {
        self.sums.iter().map(|(k, v)| (k, *v))
    }
}

/// Builds department-level observations from the municipality sheet.
pub struct DepartmentAggregator<'a> {
    ctx: CubeContext<'a>,
}

impl<'a> DepartmentAggregator<'a> {
    /// Creates an aggregator over `ctx`.
    #[must_use]
    pub fn new(ctx: CubeContext<'a>) -> Self {
        Self { ctx }
    }

    /// Sums every municipality cell into its department key.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::UnmappedGeoCode`] for a code with no department,
    /// and the structural and value errors of [`RecordReader::measures`].
    pub fn accumulate(&self, header: &Header) -> Result<DepartmentAggregate> {
        let sheet = self.ctx.source.sheet(self.ctx.layout.municipality_sheet)?;
        let reader = RecordReader::new(sheet, self.ctx.layout)?;
        let mut aggregate = DepartmentAggregate::default();
        for record in reader.geo_codes() {
            let (row, geo_code) = record?;
            let department = self
                .ctx
                .naming
                .department_of(&geo_code)
                .ok_or(CubeError::UnmappedGeoCode { code: geo_code })?;
            let values = reader.measures(row, header)?;
            for (column, value) in header.columns().zip(values) {
                let key = DepartmentKey {
                    department: department.clone(),
                    codes: column.codes.clone(),
                };
                aggregate.add(key, value);
            }
            aggregate.rows += 1;
        }
        Ok(aggregate)
    }

    /// Re-parses the header, accumulates, and emits one observation per key.
    ///
    /// # Errors
    ///
    /// See [`header::parse`] and [`DepartmentAggregator::accumulate`].
    pub fn generate(&self) -> Result<Generated> {
        let sheet = self.ctx.source.sheet(self.ctx.layout.municipality_sheet)?;
        let header = header::parse(sheet, self.ctx.layout, self.ctx.naming)?;
        let aggregate = self.accumulate(&header)?;

        let mut graph = self.ctx.new_graph();
        self.ctx.add_dataset(&mut graph, false);
        let dataset = self.ctx.dataset_iri();
        let geo_dimension = self.ctx.naming.geographic_dimension_uri();
        let measure = self.ctx.measure_iri();

        for (key, sum) in aggregate.iter() {
            self.observation(&header, key, sum)
                .add_to(&mut graph, &dataset, &geo_dimension, &measure);
        }

        let stats = GenerationStats {
            rows_selected: aggregate.rows(),
            rows_rejected: 0,
            observations: aggregate.len(),
        };
        info!(
            statements = graph.len(),
            observations = stats.observations,
            "department model complete"
        );
        Ok(Generated { graph, stats })
    }

    fn observation(&self, header: &Header, key: &DepartmentKey, value: f64) -> Observation {
        let naming = self.ctx.naming;
        Observation {
            iri: naming.observation_uri(&key.department, &key.codes),
            geo: naming.geographic_unit_uri(GeoLevel::Departement, &key.department),
            dimensions: header
                .dimensions
                .iter()
                .zip(&key.codes)
                .map(|(dimension, code)| {
                    (
                        dimension.property.clone(),
                        naming.code_item_uri(&dimension.concept, code),
                    )
                })
                .collect(),
            value,
        }
    }
}
