//! The canonical result record produced by a benchmark run (§3) and the smaller
//! value types it's built from. Shaped the way the teacher shapes `MeasurementData`
//! and `Estimates` in `src/report.rs`/`src/estimate.rs`: plain serde-friendly structs,
//! no behavior beyond construction and the invariants documented per field.

use serde::{Deserialize, Serialize};

use crate::gc_trace::GcStats;
use crate::stats::TimeSummary;

/// One scheduled pause that was injected into the measurement loop.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PausePoint {
    pub sample_index: usize,
    pub duration_ms: f64,
}

/// `{converged, confidence, reason}`, written once at the end of the adaptive loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Convergence {
    pub converged: bool,
    pub confidence: f64,
    pub reason: String,
}

/// Amortized heap growth per sample, in KB. A single scalar -- see `SPEC_FULL.md` §E.3
/// for why this isn't the placeholder `{min, avg, max}` triple the spec's Design Notes
/// flag as likely dead weight.
pub type HeapGrowthKb = f64;

/// Optional per-sample optimization-tier status, when the runtime exposes one.
pub type OptSample = u32;

/// The canonical shape consumed by reporters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MeasuredResults {
    pub name: String,
    /// ms per iteration, insertion-ordered. Invariant: non-empty.
    pub samples: Vec<f64>,
    pub time: TimeSummary,
    pub warmup_samples: Option<Vec<f64>>,
    /// Per-sample used-heap bytes.
    pub heap_samples: Option<Vec<u64>>,
    /// Wall-clock microseconds, one per sample.
    pub timestamps: Option<Vec<u64>>,
    pub opt_samples: Option<Vec<OptSample>>,
    pub pause_points: Option<Vec<PausePoint>>,
    pub gc_stats: Option<GcStats>,
    pub heap_profile: Option<HeapProfile>,
    pub convergence: Option<Convergence>,
    pub total_time_s: Option<f64>,
    pub heap_growth_kb: Option<HeapGrowthKb>,
}

impl MeasuredResults {
    /// Validates the cross-field invariants from §3. Intentionally not called
    /// automatically by the constructors below -- the collection loop builds these
    /// fields incrementally and only the final, sealed record is expected to satisfy
    /// every invariant.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.samples.is_empty() {
            return Err("samples must be non-empty".into());
        }
        let t = &self.time;
        if !(t.min <= t.p50 && t.p50 <= t.p99 && t.p99 <= t.max) {
            return Err("time percentiles are not monotonic".into());
        }
        if let (Some(p25), Some(p95)) = (t.p25, t.p95) {
            if !(t.min <= p25 && p25 <= t.p50 && t.p75 <= p95 && p95 <= t.p99) {
                return Err("adaptive time percentiles are not monotonic".into());
            }
        }
        if let Some(points) = &self.pause_points {
            for p in points {
                if p.sample_index >= self.samples.len() {
                    return Err("pause_point index out of range".into());
                }
            }
        }
        if let Some(timestamps) = &self.timestamps {
            if timestamps.len() != self.samples.len() {
                return Err("timestamps length does not match samples length".into());
            }
        }
        Ok(())
    }
}

/// Opaque placeholder for a heap-sampling profile; the tree-flattening consumer of
/// this is an external collaborator per `spec.md` §1 (out of scope here).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HeapProfile {
    pub raw: serde_json::Value,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Faster,
    Slower,
    Uncertain,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Histogram {
    pub bin_midpoints: Vec<f64>,
    pub counts: Vec<u64>,
}

/// Produced by the bootstrap comparator (§4.2/§3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DifferenceCI {
    pub percent: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub direction: Direction,
    pub histogram: Option<Histogram>,
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_results() -> MeasuredResults {
        MeasuredResults {
            name: "noop".into(),
            samples: vec![1.0, 2.0, 3.0],
            time: TimeSummary {
                min: 1.0,
                max: 3.0,
                avg: 2.0,
                p50: 2.0,
                p75: 2.5,
                p99: 3.0,
                p999: 3.0,
                ..Default::default()
            },
            warmup_samples: None,
            heap_samples: None,
            timestamps: None,
            opt_samples: None,
            pause_points: None,
            gc_stats: None,
            heap_profile: None,
            convergence: None,
            total_time_s: None,
            heap_growth_kb: None,
        }
    }

    #[test]
    fn well_formed_result_passes_invariant_check() {
        assert!(sample_results().check_invariants().is_ok());
    }

    #[test]
    fn pause_point_past_sample_len_is_rejected() {
        let mut r = sample_results();
        r.pause_points = Some(vec![PausePoint {
            sample_index: 99,
            duration_ms: 5.0,
        }]);
        assert!(r.check_invariants().is_err());
    }

    #[test]
    fn mismatched_timestamps_length_is_rejected() {
        let mut r = sample_results();
        r.timestamps = Some(vec![1, 2]);
        assert!(r.check_invariants().is_err());
    }
}
