//! External-profiler hooks (§2 "External-profiler hooks", §4.3's `RuntimeHooks`
//! companion at the orchestrator layer): optional heap sampling and optimization-tier
//! status, plus pause-point notification, modeled as a trait an embedder can
//! implement -- the same "extension trait with start/stop hooks" shape the teacher
//! uses for its own `Profiler` trait, generalized from "in-process profiler for
//! `--profile-time`" to the richer set of signals this spec's collector consumes.

use std::path::Path;

/// Hooks an embedder can wire up to expose heap-sampling and optimization-tier
/// introspection to the collector, beyond the bare [`crate::collector::RuntimeHooks`]
/// used inside the measurement loop itself. Grounded in the teacher's `Profiler`
/// trait (`start_profiling`/`stop_profiling` around a benchmark), extended with the
/// per-pause notification §4.3 names ("pause points") and an optional heap-sampling
/// profile the worker orchestrator attaches to the sealed result (§4.5 point 4,
/// `ResultMessage { heap_profile? }`).
pub trait ExternalProfiler {
    /// Called once before a benchmark's measurement phase begins.
    fn start_profiling(&mut self, _benchmark_name: &str, _benchmark_dir: &Path) {}
    /// Called once after a benchmark's measurement phase ends.
    fn stop_profiling(&mut self, _benchmark_name: &str, _benchmark_dir: &Path) {}
    /// Notified at each scheduled pause point (§4.3 phase 2, step 5), so a sampling
    /// profiler can snapshot the heap precisely when the benchmark is quiescent.
    fn on_pause(&mut self, _benchmark_name: &str, _sample_index: usize) {}
    /// Returns a heap-sampling profile for the just-completed benchmark, if this
    /// profiler collected one. The tree-flattening consumer of this is an external
    /// collaborator per `spec.md` §1 -- out of scope here, so the return type is the
    /// same opaque JSON payload [`crate::result::HeapProfile`] already carries.
    fn heap_profile(&mut self, _benchmark_name: &str) -> Option<serde_json::Value> {
        None
    }
}

/// The default profiler: every hook is a no-op, mirroring the teacher's
/// `ExternalProfiler` placeholder for "the profiler is an external process (perf,
/// etc.) that doesn't need start/stop hooks".
pub struct NullProfiler;
impl ExternalProfiler for NullProfiler {}
