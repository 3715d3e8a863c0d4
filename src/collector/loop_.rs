//! The sample collection loop (§4.3): warmup, settle, measurement, per-sample
//! instrumentation, in one pass. The heart of accurate measurement.

use std::thread::sleep;
use std::time::Duration;

use crate::clock::{time_ms, Clock};
use crate::collector::pause::should_pause;
use crate::error::{Error, Result};
use crate::result::{MeasuredResults, PausePoint};
use crate::spec::{RunnerOptions, SETTLE_MS};
use crate::stats::summarize;

/// Plugs runtime-specific introspection into the loop. In a systems-language target
/// these are explicit allocator-flush hooks or no-ops, per the design notes
/// (`SPEC_FULL.md` §9, "Global mutable state around the runtime") -- there is no
/// portable GC or optimization-tier query in stable Rust, so the default
/// implementation below is a no-op that still lets the rest of the loop run
/// unconditionally.
pub trait RuntimeHooks {
    /// Best-effort allocator/GC hint; a no-op is a valid implementation.
    fn gc_hint(&self) {}
    /// Used-heap bytes, if the embedding runtime can report one.
    fn heap_used_bytes(&self) -> Option<u64> {
        None
    }
    /// Optimization-tier status for the current call, if the runtime exposes one.
    fn opt_tier(&self) -> Option<u32> {
        None
    }
}

/// The default, portable set of hooks: every query is a no-op / `None`.
pub struct NullHooks;
impl RuntimeHooks for NullHooks {}

/// A benchmark body invoked once per iteration.
pub type BenchFn<'a> = dyn Fn(Option<&str>) -> Result<()> + 'a;

fn estimate_capacity(options: &RunnerOptions) -> usize {
    match (options.max_iterations, options.max_time_ms) {
        (Some(iters), _) => iters as usize,
        (None, Some(ms)) => (ms as f64 / 0.1).ceil() as usize,
        (None, None) => 0, // unreachable once `RunnerOptions::validate` has run
    }
}

/// Runs the full warmup + settle + measurement pipeline described in §4.3 and
/// returns a sealed [`MeasuredResults`], or `Err(EmptySamples)` if the measurement
/// phase produced zero samples.
pub fn collect(
    name: &str,
    f: &BenchFn<'_>,
    param: Option<&str>,
    options: &RunnerOptions,
    hooks: &dyn RuntimeHooks,
) -> Result<MeasuredResults> {
    options.validate()?;

    // --- Phase 1: warmup ---
    let mut warmup_samples = Vec::with_capacity(options.warmup_iterations as usize);
    if options.warmup_iterations > 0 && !options.skip_warmup {
        for _ in 0..options.warmup_iterations {
            let (result, elapsed) = time_ms(|| f(param));
            result?;
            warmup_samples.push(elapsed);
        }
        hooks.gc_hint();
        if !options.skip_settle {
            sleep(Duration::from_millis(SETTLE_MS));
            hooks.gc_hint();
        }
    }

    // --- Phase 2: measurement ---
    let capacity = estimate_capacity(options);
    let mut samples: Vec<f64> = Vec::with_capacity(capacity);
    let mut timestamps: Vec<u64> = Vec::with_capacity(capacity);
    let mut heap_samples: Vec<u64> = Vec::with_capacity(capacity);
    let mut opt_samples: Vec<u32> = Vec::with_capacity(capacity);
    let mut pause_points: Vec<PausePoint> = Vec::new();

    let heap_used_before = hooks.heap_used_bytes();
    let loop_start = Clock::start();
    let wall_clock_epoch = std::time::SystemTime::now();
    let mut exclusion_ms: f64 = 0.0;
    let mut count: u64 = 0;
    let mut any_heap_sample = false;
    let mut any_opt_sample = false;

    loop {
        if let Some(max_iters) = options.max_iterations {
            if count >= max_iters {
                break;
            }
        }
        let elapsed = loop_start.elapsed_ms() - exclusion_ms;
        if let Some(max_ms) = options.max_time_ms {
            if elapsed >= max_ms as f64 {
                break;
            }
        }

        let (result, elapsed_ms) = time_ms(|| f(param));
        result.map_err(|e| match e {
            Error::BenchmarkFailed { message, stack, .. } => Error::BenchmarkFailed {
                name: name.to_string(),
                message,
                stack,
            },
            other => other,
        })?;
        samples.push(elapsed_ms);

        let since_epoch = wall_clock_epoch
            .elapsed()
            .unwrap_or(Duration::ZERO)
            .as_micros() as u64;
        timestamps.push(since_epoch);

        if let Some(bytes) = hooks.heap_used_bytes() {
            any_heap_sample = true;
            heap_samples.push(bytes);
        } else {
            heap_samples.push(0);
        }

        if options.trace_opt {
            if let Some(tier) = hooks.opt_tier() {
                any_opt_sample = true;
                opt_samples.push(tier);
            } else {
                opt_samples.push(0);
            }
        }

        if options.collect {
            hooks.gc_hint();
        }

        if should_pause(count, options) {
            pause_points.push(PausePoint {
                sample_index: count as usize,
                duration_ms: options.pause_duration_ms as f64,
            });
            sleep(Duration::from_millis(options.pause_duration_ms));
            exclusion_ms += options.pause_duration_ms as f64;
        }

        count += 1;
    }

    if count == 0 {
        return Err(Error::EmptySamples {
            name: name.to_string(),
        });
    }

    let heap_used_after = hooks.heap_used_bytes();
    let heap_growth_kb = match (heap_used_before, heap_used_after) {
        (Some(before), Some(after)) => {
            Some(after.saturating_sub(before) as f64 / 1024.0 / count as f64)
        }
        _ => None,
    };

    let total_time_s = loop_start.elapsed().as_secs_f64();

    let time_summary = summarize(&samples, options.adaptive);

    Ok(MeasuredResults {
        name: name.to_string(),
        samples,
        time: time_summary,
        warmup_samples: if warmup_samples.is_empty() {
            None
        } else {
            Some(warmup_samples)
        },
        heap_samples: if any_heap_sample { Some(heap_samples) } else { None },
        timestamps: Some(timestamps),
        opt_samples: if any_opt_sample { Some(opt_samples) } else { None },
        pause_points: if pause_points.is_empty() {
            None
        } else {
            Some(pause_points)
        },
        gc_stats: None,
        heap_profile: None,
        convergence: None,
        total_time_s: Some(total_time_s),
        heap_growth_kb,
    })
}
