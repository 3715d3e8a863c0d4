//! The group runner (§3 `BenchGroup`, §5 ordering guarantees): runs a group's
//! baseline (if any) and each of its benchmarks, comparing the baseline against
//! every member via the bootstrap comparator. Grounded in the teacher's own
//! `BenchmarkGroup` iteration (`src/benchmark_group.rs`) -- "one group, one setup,
//! baseline compared against every member" -- plus its `ActualSamplingMode`
//! batching idea (`src/benchmark.rs`) for the alternating-order drift cancellation
//! §5 names.

use std::collections::BTreeMap;

use crate::bootstrap::{bootstrap_compare, BootstrapOptions};
use crate::collector::{collect, BenchFn, NullHooks};
use crate::error::Result;
use crate::result::{DifferenceCI, MeasuredResults, PausePoint};
use crate::spec::{BenchGroup, BenchmarkSpec, Callable, RunnerOptions};
use crate::stats::summarize;
use crate::worker::WorkerOrchestrator;

/// One group member's outcome, plus its comparison against the group's baseline (if
/// the group has one).
#[derive(Clone, Debug)]
pub struct GroupMemberResult {
    pub name: String,
    pub results: MeasuredResults,
    pub baseline_diff: Option<DifferenceCI>,
}

/// The full outcome of running a [`BenchGroup`]: the baseline's own results (if
/// any), each member's results, and the group's metadata, which flows unchanged to
/// a report (§3 "Group-level metadata flows unchanged to the report").
#[derive(Clone, Debug)]
pub struct GroupResult {
    pub name: String,
    pub metadata: BTreeMap<String, String>,
    pub baseline: Option<MeasuredResults>,
    pub members: Vec<GroupMemberResult>,
}

/// Runs `group`'s baseline (if any) and every benchmark, in declared order (§5
/// "the baseline runs first (if any), then each benchmark in declared order"),
/// unless `group.batches > 1` enables alternating-order batching.
pub fn run_group(group: &BenchGroup, options: &RunnerOptions) -> Result<GroupResult> {
    options.validate()?;

    if group.batches <= 1 {
        run_group_sequential(group, options)
    } else {
        run_group_batched(group, options)
    }
}

fn run_group_sequential(group: &BenchGroup, options: &RunnerOptions) -> Result<GroupResult> {
    let baseline = group
        .baseline
        .as_ref()
        .map(|spec| run_spec(spec, options))
        .transpose()?;

    let mut members = Vec::with_capacity(group.benchmarks.len());
    for spec in &group.benchmarks {
        let results = run_spec(spec, options)?;
        let baseline_diff = diff_against(&baseline, &results);
        members.push(GroupMemberResult {
            name: spec.name.clone(),
            results,
            baseline_diff,
        });
    }

    Ok(GroupResult {
        name: group.name.clone(),
        metadata: group.metadata.clone(),
        baseline,
        members,
    })
}

/// Splits the group's total time/iteration budget into `group.batches` rounds,
/// alternating `(baseline-first, benchmarks)` then `(benchmarks, baseline)` (§5),
/// and merges each spec's per-batch results in collection order, shifting
/// `pause_points.sample_index` by the cumulative sample offset.
fn run_group_batched(group: &BenchGroup, options: &RunnerOptions) -> Result<GroupResult> {
    let batches = group.batches.max(1);
    let batch_options = divide_time_budget(options, batches);

    let mut baseline_acc = group.baseline.as_ref().map(|_| BatchMerge::new());
    let mut member_accs: Vec<BatchMerge> = group.benchmarks.iter().map(|_| BatchMerge::new()).collect();

    for round in 0..batches {
        let baseline_first = round % 2 == 0;

        let run_baseline = |baseline_acc: &mut Option<BatchMerge>| -> Result<()> {
            if let (Some(spec), Some(acc)) = (&group.baseline, baseline_acc.as_mut()) {
                acc.extend(run_spec(spec, &batch_options)?);
            }
            Ok(())
        };
        let run_benchmarks = |member_accs: &mut [BatchMerge]| -> Result<()> {
            for (spec, acc) in group.benchmarks.iter().zip(member_accs.iter_mut()) {
                acc.extend(run_spec(spec, &batch_options)?);
            }
            Ok(())
        };

        if baseline_first {
            run_baseline(&mut baseline_acc)?;
            run_benchmarks(&mut member_accs)?;
        } else {
            run_benchmarks(&mut member_accs)?;
            run_baseline(&mut baseline_acc)?;
        }
    }

    let baseline_name = group.baseline.as_ref().map(|s| s.name.clone());
    let baseline = baseline_acc
        .zip(baseline_name)
        .map(|(acc, name)| acc.seal(name, options.adaptive));

    let mut members = Vec::with_capacity(group.benchmarks.len());
    for (spec, acc) in group.benchmarks.iter().zip(member_accs.into_iter()) {
        let results = acc.seal(spec.name.clone(), options.adaptive);
        let baseline_diff = diff_against(&baseline, &results);
        members.push(GroupMemberResult {
            name: spec.name.clone(),
            results,
            baseline_diff,
        });
    }

    Ok(GroupResult {
        name: group.name.clone(),
        metadata: group.metadata.clone(),
        baseline,
        members,
    })
}

fn diff_against(baseline: &Option<MeasuredResults>, current: &MeasuredResults) -> Option<DifferenceCI> {
    baseline
        .as_ref()
        .map(|b| bootstrap_compare(&b.samples, &current.samples, BootstrapOptions::default()))
}

/// Divides a time/iteration budget evenly across `batches` rounds. Each round
/// otherwise runs the full warmup/settle pipeline -- §5 says only the *budget* is
/// divided, not the warmup behavior.
fn divide_time_budget(options: &RunnerOptions, batches: u64) -> RunnerOptions {
    let mut batch_options = options.clone();
    if let Some(ms) = options.max_time_ms {
        batch_options.max_time_ms = Some((ms / batches).max(1));
    }
    if let Some(iters) = options.max_iterations {
        batch_options.max_iterations = Some((iters / batches).max(1));
    }
    batch_options
}

fn run_spec(spec: &BenchmarkSpec, options: &RunnerOptions) -> Result<MeasuredResults> {
    match &spec.callable {
        Callable::InProcess(f) => {
            let bench_fn: &BenchFn<'_> = f.as_ref();
            collect(&spec.name, bench_fn, spec.param.as_deref(), options, &NullHooks)
        }
        Callable::Exported { .. } => {
            let orchestrator = WorkerOrchestrator::new()?;
            let mut results = orchestrator.run(spec, "wall_time", options, spec.param.as_deref())?;
            Ok(results.remove(0))
        }
    }
}

/// Accumulates one spec's per-batch [`MeasuredResults`] in collection order (§5
/// "samples appear in collection order"), shifting each batch's `pause_points` by
/// the running sample offset before the merged record is sealed.
struct BatchMerge {
    samples: Vec<f64>,
    warmup_samples: Vec<f64>,
    timestamps: Vec<u64>,
    heap_samples: Vec<u64>,
    opt_samples: Vec<u32>,
    pause_points: Vec<PausePoint>,
    any_heap: bool,
    any_opt: bool,
    total_time_s: f64,
}

impl BatchMerge {
    fn new() -> Self {
        BatchMerge {
            samples: Vec::new(),
            warmup_samples: Vec::new(),
            timestamps: Vec::new(),
            heap_samples: Vec::new(),
            opt_samples: Vec::new(),
            pause_points: Vec::new(),
            any_heap: false,
            any_opt: false,
            total_time_s: 0.0,
        }
    }

    fn extend(&mut self, batch: MeasuredResults) {
        let offset = self.samples.len();
        self.samples.extend(batch.samples);
        if let Some(warmup) = batch.warmup_samples {
            self.warmup_samples.extend(warmup);
        }
        if let Some(timestamps) = batch.timestamps {
            self.timestamps.extend(timestamps);
        }
        if let Some(heap) = batch.heap_samples {
            self.any_heap = true;
            self.heap_samples.extend(heap);
        }
        if let Some(opt) = batch.opt_samples {
            self.any_opt = true;
            self.opt_samples.extend(opt);
        }
        if let Some(points) = batch.pause_points {
            self.pause_points
                .extend(points.into_iter().map(|p| PausePoint {
                    sample_index: p.sample_index + offset,
                    duration_ms: p.duration_ms,
                }));
        }
        if let Some(t) = batch.total_time_s {
            self.total_time_s += t;
        }
    }

    fn seal(self, name: String, adaptive: bool) -> MeasuredResults {
        let time = summarize(&self.samples, adaptive);
        MeasuredResults {
            name,
            samples: self.samples,
            time,
            warmup_samples: none_if_empty(self.warmup_samples),
            heap_samples: if self.any_heap {
                Some(self.heap_samples)
            } else {
                None
            },
            timestamps: none_if_empty(self.timestamps),
            opt_samples: if self.any_opt {
                Some(self.opt_samples)
            } else {
                None
            },
            pause_points: none_if_empty(self.pause_points),
            gc_stats: None,
            heap_profile: None,
            convergence: None,
            total_time_s: Some(self.total_time_s),
            heap_growth_kb: None,
        }
    }
}

fn none_if_empty<T>(v: Vec<T>) -> Option<Vec<T>> {
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}
