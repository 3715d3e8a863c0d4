//! The data model types a caller builds before handing work to the orchestrator (§3):
//! [`BenchmarkSpec`], [`BenchGroup`], and [`RunnerOptions`].

use crate::error::{Error, Result};
use std::sync::Arc;

/// Either an in-process callable or a `(module location, export name)` descriptor the
/// worker re-resolves inside the isolated child process. The teacher's design note
/// (`SPEC_FULL.md` §9, "Dynamic callable shipped to a worker") prefers the
/// identifier-based path for exactly the reason stated there: a systems language can't
/// ship a closure's source text across a process boundary.
#[derive(Clone)]
pub enum Callable {
    /// Runs in-process; only valid when the benchmark is executed without a worker.
    InProcess(Arc<dyn Fn(Option<&str>) -> Result<()> + Send + Sync>),
    /// Re-resolved inside the worker child via a stable registry key.
    Exported {
        module_path: String,
        export_name: String,
        setup_export_name: Option<String>,
    },
}

impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callable::InProcess(_) => write!(f, "Callable::InProcess(..)"),
            Callable::Exported {
                module_path,
                export_name,
                setup_export_name,
            } => f
                .debug_struct("Callable::Exported")
                .field("module_path", module_path)
                .field("export_name", export_name)
                .field("setup_export_name", setup_export_name)
                .finish(),
        }
    }
}

/// A named unit of measurable work.
#[derive(Clone, Debug)]
pub struct BenchmarkSpec {
    pub name: String,
    pub callable: Callable,
    /// Passed once into each iteration (stateless) or into a setup step that returns
    /// state (stateful); the distinction lives in whether `setup_export_name` is set.
    pub param: Option<String>,
}

impl BenchmarkSpec {
    pub fn in_process(
        name: impl Into<String>,
        param: Option<String>,
        f: impl Fn(Option<&str>) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        BenchmarkSpec {
            name: name.into(),
            callable: Callable::InProcess(Arc::new(f)),
            param,
        }
    }

    pub fn exported(
        name: impl Into<String>,
        module_path: impl Into<String>,
        export_name: impl Into<String>,
        setup_export_name: Option<String>,
        param: Option<String>,
    ) -> Self {
        BenchmarkSpec {
            name: name.into(),
            callable: Callable::Exported {
                module_path: module_path.into(),
                export_name: export_name.into(),
                setup_export_name,
            },
            param,
        }
    }
}

/// An ordered list of [`BenchmarkSpec`]s that share a single setup step and an
/// optional baseline compared against every member, mirroring the teacher's
/// `BenchmarkGroup` (generalized from in-process closures to re-resolvable specs).
/// Run with [`crate::group::run_group`], which implements the ordering guarantees
/// of §5: baseline first (if any), then each benchmark in declared order, unless
/// `batches > 1` splits the group's time budget into alternating-order rounds.
#[derive(Clone, Debug, Default)]
pub struct BenchGroup {
    pub name: String,
    pub benchmarks: Vec<BenchmarkSpec>,
    pub baseline: Option<BenchmarkSpec>,
    pub metadata: std::collections::BTreeMap<String, String>,
    /// Splits the group's total measurement time budget across this many rounds,
    /// alternating `(baseline-first, benchmarks)` then `(benchmarks, baseline)` to
    /// cancel systematic drift (§5 "batching"). `0` or `1` means no batching: a
    /// single sequential pass in declared order.
    pub batches: u64,
}

impl BenchGroup {
    pub fn new(name: impl Into<String>) -> Self {
        BenchGroup {
            name: name.into(),
            benchmarks: Vec::new(),
            baseline: None,
            metadata: Default::default(),
            batches: 1,
        }
    }

    pub fn push(&mut self, spec: BenchmarkSpec) -> &mut Self {
        self.benchmarks.push(spec);
        self
    }

    pub fn with_baseline(mut self, baseline: BenchmarkSpec) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// Enables alternating-order batching across `batches` rounds (§5).
    pub fn with_batches(mut self, batches: u64) -> Self {
        self.batches = batches;
        self
    }
}

/// All tunables consumed by the collector (§3).
#[derive(Clone, Debug)]
pub struct RunnerOptions {
    pub max_time_ms: Option<u64>,
    pub max_iterations: Option<u64>,
    pub warmup_iterations: u64,
    /// Not in the user-facing option table (§3), but named directly in §4.3's warmup
    /// rule ("If warmup_iterations > 0 and not skip_warmup"). Used internally by the
    /// adaptive controller to append follow-up batches without re-running warmup.
    pub skip_warmup: bool,
    pub skip_settle: bool,
    pub collect: bool,
    pub pause_first: Option<u64>,
    pub pause_interval: Option<u64>,
    pub pause_duration_ms: u64,
    pub trace_opt: bool,
    pub gc_stats: bool,
    pub adaptive: bool,
    pub min_time_ms: u64,
    pub target_confidence: f64,
}

/// Settle window after warmup, fixed per §4.3.
pub const SETTLE_MS: u64 = 1000;

impl Default for RunnerOptions {
    fn default() -> Self {
        RunnerOptions {
            max_time_ms: Some(5000),
            max_iterations: None,
            warmup_iterations: 3,
            skip_warmup: false,
            skip_settle: false,
            collect: false,
            pause_first: None,
            pause_interval: None,
            pause_duration_ms: 0,
            trace_opt: false,
            gc_stats: false,
            adaptive: false,
            min_time_ms: 1000,
            target_confidence: 95.0,
        }
    }
}

impl RunnerOptions {
    /// Validates §7's `ConfigInvalid` conditions that are detectable from options
    /// alone (the `baseline_dir`/`baseline_variant` exclusivity lives on `BenchMatrix`
    /// instead, since it isn't an option of a single benchmark run).
    pub fn validate(&self) -> Result<()> {
        if self.max_time_ms.is_none() && self.max_iterations.is_none() {
            return Err(Error::ConfigInvalid {
                message: "neither max_time_ms nor max_iterations was set".into(),
            });
        }
        if self.max_time_ms == Some(0) && self.max_iterations == Some(0) {
            return Err(Error::ConfigInvalid {
                message: "max_time_ms = 0 and max_iterations = 0 leaves no budget".into(),
            });
        }
        Ok(())
    }
}
