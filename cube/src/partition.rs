//! Partitioned generation.
//!
//! The full data set does not need to fit in memory at once: the driver runs
//! the observation generator once per leading digit of the geographic code,
//! hands each graph to a sink and drops it before starting the next digit.
//! Only partition `0` carries the data set's `qb:structure` link, so merging
//! all partition outputs yields it exactly once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::context::CubeContext;
use crate::error::{CubeError, Result};
use crate::header::Header;
use crate::manifest::{ArtifactEntry, GapEntry};
use crate::naming::GeoLevel;
use crate::observation::ObservationGenerator;
use crate::output::GraphSink;
use crate::record::RecordReader;

/// A slice of the geographic universe: codes starting with one digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    digit: char,
}

impl Partition {
    /// The ten partitions, `0` to `9`.
    pub fn all() -> impl Iterator<Item = Partition> {
        ('0'..='9').map(|digit| Partition { digit })
    }

    /// Leading digit selected by this partition.
    #[must_use]
    pub fn digit(self) -> char {
        self.digit
    }

    /// Logical artifact name.
    #[must_use]
    pub fn name(self) -> String {
        self.digit.to_string()
    }

    /// Returns true if `geo_code` belongs to this partition.
    #[must_use]
    pub fn selects(self, geo_code: &str) -> bool {
        geo_code.starts_with(self.digit)
    }

    /// Returns true for the partition that carries the data set structure link.
    #[must_use]
    pub fn attaches_schema(self) -> bool {
        self.digit == '0'
    }
}

/// Geographic codes that no partition selects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionGap {
    /// The codes, in sheet order.
    pub codes: Vec<String>,
}

impl PartitionGap {
    /// Number of dropped rows.
    #[must_use]
    pub fn count(&self) -> usize {
        self.codes.len()
    }

    /// Reads every data row of both sheets once and collects the codes
    /// outside every partition.
    ///
    /// The pass also checks what the later stages would otherwise only find
    /// after some artifacts are on disk: each row's measures against `header`,
    /// and the department of each municipality code.
    ///
    /// # Errors
    ///
    /// Returns the structural and value errors of [`RecordReader::measures`],
    /// or [`CubeError::UnmappedGeoCode`] for a municipality with no department.
    pub fn scan(ctx: &CubeContext<'_>, header: &Header) -> Result<Self> {
        let mut codes = Vec::new();
        for (sheet_index, level) in ctx.data_sheets() {
            let sheet = ctx.source.sheet(sheet_index)?;
            let reader = RecordReader::new(sheet, ctx.layout)?;
            for record in reader.geo_codes() {
                let (row, code) = record?;
                reader.measures(row, header)?;
                if level == GeoLevel::Commune && ctx.naming.department_of(&code).is_none() {
                    return Err(CubeError::UnmappedGeoCode { code });
                }
                if !Partition::all().any(|p| p.selects(&code)) {
                    codes.push(code);
                }
            }
        }
        Ok(Self { codes })
    }

    /// Manifest form.
    #[must_use]
    pub fn to_entry(&self) -> GapEntry {
        GapEntry {
            count: self.count(),
            codes: self.codes.clone(),
        }
    }
}

/// Cooperative cancellation flag, cheap to clone and share.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    /// A flag that is not yet raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`Cancellation::cancel`] has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Interruptible pause between partitions.
#[derive(Debug, Clone, Default)]
pub struct Throttle {
    pause: Duration,
    cancellation: Cancellation,
}

impl Throttle {
    const SLICE: Duration = Duration::from_millis(100);

    /// Pauses for `pause` between partitions, unless `cancellation` is raised.
    #[must_use]
    pub fn new(pause: Duration, cancellation: Cancellation) -> Self {
        Self {
            pause,
            cancellation,
        }
    }

    /// The cancellation flag this throttle observes.
    #[must_use]
    pub fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    /// Sleeps for the configured pause in short slices. Returns false if the
    /// run was cancelled before or during the pause.
    pub fn wait(&self) -> bool {
        let deadline = Instant::now() + self.pause;
        loop {
            if self.cancellation.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            std::thread::sleep(Self::SLICE.min(deadline - now));
        }
    }
}

/// Runs the observation generator once per partition.
pub struct PartitionDriver<'a> {
    ctx: CubeContext<'a>,
    header: &'a Header,
    throttle: &'a Throttle,
}

impl<'a> PartitionDriver<'a> {
    /// Creates a driver over the columns of `header`.
    #[must_use]
    pub fn new(ctx: CubeContext<'a>, header: &'a Header, throttle: &'a Throttle) -> Self {
        Self {
            ctx,
            header,
            throttle,
        }
    }

    /// Generates, stores and releases each partition in digit order.
    ///
    /// # Errors
    ///
    /// Returns the first generation or sink error, or [`CubeError::Cancelled`]
    /// if the throttle's cancellation flag is raised between partitions.
    pub fn run(&self, sink: &mut dyn GraphSink) -> Result<Vec<ArtifactEntry>> {
        let generator = ObservationGenerator::new(self.ctx, self.header);
        let mut entries = Vec::with_capacity(10);
        let mut total = 0usize;

        for (i, partition) in Partition::all().enumerate() {
            if i > 0 && !self.throttle.wait() {
                return Err(CubeError::Cancelled {
                    next: partition.name(),
                });
            }
            info!(
                digit = %partition.digit(),
                "creating model, selecting geographic codes starting with {}",
                partition.digit()
            );
            let started = Instant::now();
            let generated =
                generator.generate(&|code| partition.selects(code), partition.attaches_schema())?;
            let file = sink.accept(&partition.name(), &generated.graph)?;
            total += generated.graph.len();
            entries.push(ArtifactEntry {
                name: partition.name(),
                file,
                statements: generated.graph.len(),
                observations: generated.stats.observations,
                rows_selected: generated.stats.rows_selected,
            });
            drop(generated);
            debug!(digit = %partition.digit(), elapsed = ?started.elapsed(), total, "partition released");
        }
        Ok(entries)
    }
}

/// Logs the gap as a warning when it is not empty.
pub fn report_gap(gap: &PartitionGap) {
    if gap.count() > 0 {
        warn!(
            count = gap.count(),
            codes = ?gap.codes,
            "geographic codes not starting with a digit are not selected by any partition"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use proptest::prelude::*;

    use super::*;
    use crate::config::DataSetConfig;
    use crate::header::{self, tests::layout};
    use crate::model::{iris, Graph, Triple};
    use crate::naming::{InseeNaming, Naming};
    use crate::observation::tests::{row, workbook};
    use crate::tabular::{TabularSource, Workbook};

    /// Keeps every graph it receives.
    #[derive(Default)]
    struct Collect {
        graphs: BTreeMap<String, Vec<Triple>>,
    }

    impl GraphSink for Collect {
        fn accept(&mut self, name: &str, graph: &Graph) -> Result<String> {
            self.graphs
                .insert(name.to_owned(), graph.triples().cloned().collect());
            Ok(format!("mem:{name}"))
        }
    }

    fn drive(wb: &Workbook, throttle: &Throttle, sink: &mut dyn GraphSink) -> Result<Vec<ArtifactEntry>> {
        let naming = InseeNaming::new("2017");
        let layout = layout();
        let dataset = DataSetConfig::default();
        let ctx = CubeContext::new(wb, &naming, &layout, &dataset);
        let header = header::parse(wb.sheet(0)?, &layout, &naming)?;
        PartitionDriver::new(ctx, &header, throttle).run(sink)
    }

    fn sample() -> Workbook {
        workbook(
            vec![
                row("01001", &[1.0; 4]),
                row("2A004", &[1.0; 4]),
                row("35238", &[2.0; 4]),
                row("75056", &[3.0; 4]),
                row("97101", &[4.0; 4]),
            ],
            vec![
                row("75101", &[5.0; 4]),
                row("13201", &[6.0; 4]),
                row("ZZ001", &[7.0; 4]),
            ],
        )
    }

    proptest! {
        #[test]
        fn digit_led_codes_belong_to_exactly_one_partition(code in "[0-9][0-9A-Z]{0,6}") {
            prop_assert_eq!(Partition::all().filter(|p| p.selects(&code)).count(), 1);
        }

        #[test]
        fn other_codes_belong_to_none(code in "[A-Za-z ][0-9A-Z]{0,6}") {
            prop_assert_eq!(Partition::all().filter(|p| p.selects(&code)).count(), 0);
        }
    }

    #[test]
    fn partitions_are_disjoint_and_cover_selectable_rows() {
        let mut sink = Collect::default();
        let entries = drive(&sample(), &Throttle::default(), &mut sink).unwrap();
        assert_eq!(entries.len(), 10);
        assert_eq!(sink.graphs.len(), 10);

        let mut seen = BTreeSet::new();
        for triples in sink.graphs.values() {
            for t in triples {
                let is_obs = t.predicate == iris::RDF_TYPE
                    && t.object == crate::model::Term::iri(iris::QB_OBSERVATION);
                if is_obs {
                    assert!(seen.insert(t.subject.clone()), "{} in two partitions", t.subject);
                }
            }
        }
        // 7 digit-led rows of 4 cells each; ZZ001 falls in no partition.
        assert_eq!(seen.len(), 28);
        let rows: usize = entries.iter().map(|e| e.rows_selected).sum();
        assert_eq!(rows, 7);
        assert_eq!(entries[7].rows_selected, 2);
        assert_eq!(entries[2].rows_selected, 1);
        assert_eq!(entries[1].rows_selected, 1);
    }

    #[test]
    fn structure_link_only_in_partition_zero() {
        let mut sink = Collect::default();
        drive(&sample(), &Throttle::default(), &mut sink).unwrap();
        let dataset = InseeNaming::new("2017").dataset_uri("2014-depcomarm");
        for (name, triples) in &sink.graphs {
            let links = triples
                .iter()
                .filter(|t| t.subject == dataset && t.predicate == iris::QB_STRUCTURE)
                .count();
            assert_eq!(links, usize::from(name == "0"), "partition {name}");
        }
    }

    #[test]
    fn gap_scan_counts_codes_outside_every_partition() {
        let wb = sample();
        let naming = InseeNaming::new("2017");
        let layout = layout();
        let dataset = DataSetConfig::default();
        let ctx = CubeContext::new(&wb, &naming, &layout, &dataset);
        let header = header::parse(wb.sheet(0).unwrap(), &layout, &naming).unwrap();
        let gap = PartitionGap::scan(&ctx, &header).unwrap();
        assert_eq!(gap.codes, ["ZZ001"]);
        assert_eq!(gap.to_entry().count, 1);
    }

    #[test]
    fn gap_scan_rejects_bad_rows_before_generation() {
        let naming = InseeNaming::new("2017");
        let layout = layout();
        let dataset = DataSetConfig::default();

        let mut text = row("75056", &[1.0; 4]);
        text[4] = crate::tabular::Cell::from("n/a");
        let wb = workbook(vec![row("01001", &[1.0; 4]), text], vec![]);
        let ctx = CubeContext::new(&wb, &naming, &layout, &dataset);
        let header = header::parse(wb.sheet(0).unwrap(), &layout, &naming).unwrap();
        assert!(matches!(
            PartitionGap::scan(&ctx, &header),
            Err(CubeError::NonNumericCell { row: 5, column: 4, .. })
        ));

        // Unmapped on the municipality sheet only; the same code is a mere gap
        // among the arrondissements.
        let wb = workbook(vec![row("ZZ001", &[1.0; 4])], vec![]);
        let ctx = CubeContext::new(&wb, &naming, &layout, &dataset);
        assert!(matches!(
            PartitionGap::scan(&ctx, &header),
            Err(CubeError::UnmappedGeoCode { ref code }) if code == "ZZ001"
        ));
    }

    #[test]
    fn cancellation_stops_before_next_partition() {
        /// Raises the flag once partition `0` is stored.
        struct CancelAfterFirst {
            cancellation: Cancellation,
            seen: Vec<String>,
        }
        impl GraphSink for CancelAfterFirst {
            fn accept(&mut self, name: &str, _graph: &Graph) -> Result<String> {
                self.seen.push(name.to_owned());
                if name == "0" {
                    self.cancellation.cancel();
                }
                Ok(name.to_owned())
            }
        }

        let cancellation = Cancellation::new();
        let throttle = Throttle::new(Duration::from_secs(3600), cancellation.clone());
        let mut sink = CancelAfterFirst {
            cancellation,
            seen: Vec::new(),
        };
        let started = Instant::now();
        let err = drive(&sample(), &throttle, &mut sink).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(err, CubeError::Cancelled { ref next } if next == "1"));
        assert_eq!(sink.seen, ["0"]);
    }

    #[test]
    fn cancelling_during_a_pause_cuts_it_short() {
        let cancellation = Cancellation::new();
        let throttle = Throttle::new(Duration::from_secs(3600), cancellation.clone());
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            cancellation.cancel();
        });
        let started = Instant::now();
        assert!(!throttle.wait());
        assert!(started.elapsed() < Duration::from_secs(5));
        canceller.join().unwrap();
    }

    #[test]
    fn uncancelled_throttle_completes_its_pause() {
        let throttle = Throttle::new(Duration::from_millis(20), Cancellation::new());
        let started = Instant::now();
        assert!(throttle.wait());
        assert!(started.elapsed() >= Duration::from_millis(20));
        throttle.cancellation().cancel();
        assert!(!throttle.wait());
    }
}
