//! The reporter collaborator boundary (§2: "A reporter collaborator consumes result
//! records; a comparator is invoked by the reporter to compute baseline diffs").
//! `spec.md` §1 keeps every concrete renderer (table/text/HTML, Perfetto/JSON
//! exporters) out of scope; this module defines only the trait seam a concrete
//! reporter would implement, grounded in the teacher's own `Report` trait
//! (`src/report.rs`) which the real crate's `CliReport`/`BencherReport`/etc.
//! implement.

use crate::result::{DifferenceCI, MeasuredResults};

/// Consumes sealed result records (and, for comparisons, the bootstrap CI the
/// harness computed against a baseline). Nothing in this crate implements this
/// trait beyond [`NullReporter`]; concrete renderers are external collaborators.
pub trait Reporter {
    /// A single benchmark finished measuring.
    fn benchmark_complete(&mut self, _results: &MeasuredResults) {}
    /// A benchmark was compared against a baseline.
    fn comparison_complete(&mut self, _name: &str, _diff: &DifferenceCI) {}
    /// A benchmark group finished.
    fn group_complete(&mut self, _group_name: &str) {}
}

/// Discards everything. Used as the default reporter in tests and anywhere a caller
/// doesn't need report output, the same role the teacher's own tests give a
/// `NullReporter`-equivalent stub.
pub struct NullReporter;
impl Reporter for NullReporter {}
