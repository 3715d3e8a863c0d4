//! `benchcore`: the statistics-driven core of a benchmark harness for short-running
//! code units.
//!
//! This crate owns three tightly coupled subsystems (§1 of the design): the sample
//! collection loop (warmup, settle, measurement), the adaptive controller that
//! decides when enough samples have been collected, and the bootstrap comparator
//! that turns two sample distributions into a confidence interval on their percentage
//! difference. Around that core sit the isolated worker execution model, the matrix
//! runner (variants x cases), and the canonical result record reporters consume.
//!
//! Everything a caller needs to drive a benchmark is re-exported at the crate root;
//! finer-grained types live in their owning modules.

pub mod adaptive;
pub mod bootstrap;
pub mod clock;
pub mod collector;
pub mod config;
pub mod error;
pub mod gc_trace;
pub mod group;
pub mod matrix;
pub mod profiler;
pub mod reporter;
pub mod result;
pub mod spec;
pub mod stats;
pub mod worker;

pub use bootstrap::{bootstrap_compare, BootstrapOptions};
pub use collector::collect;
pub use error::{Error, Result};
pub use group::{run_group, GroupMemberResult, GroupResult};
pub use matrix::{BenchMatrix, Baseline, CaseSet, MatrixFilter, MatrixResult, VariantSet};
pub use result::{Convergence, DifferenceCI, Direction, MeasuredResults};
pub use spec::{BenchGroup, BenchmarkSpec, Callable, RunnerOptions};
