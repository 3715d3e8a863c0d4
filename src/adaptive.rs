//! The adaptive controller (§4.4): wraps the base collector and repeatedly invokes it
//! until convergence, a time budget is exhausted, or a fallback confidence is
//! satisfied after `min_time_ms`.

use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::collector::{collect, BenchFn, RuntimeHooks};
use crate::error::{Error, Result};
use crate::result::{Convergence, MeasuredResults};
use crate::spec::RunnerOptions;
use crate::stats::{median, outlier_impact, summarize};

const DRIFT_THRESHOLD: f64 = 0.05;
const DEFAULT_WINDOW: usize = 50;
const INITIAL_BATCH_MS: u64 = 100;
const FOLLOWUP_BATCH_MS: u64 = 100;
const FOLLOWUP_ITER_CAP: u64 = 10;
const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Window size scales inversely with per-iteration time, judged from the median of
/// the last 20 samples (or the default 50-sample window if fewer than 20 are in
/// hand yet).
fn window_size(samples: &[f64]) -> usize {
    if samples.len() < 20 {
        return DEFAULT_WINDOW;
    }
    let recent20 = &samples[samples.len() - 20..];
    let median_ms = median(recent20);
    if median_ms < 0.010 {
        200
    } else if median_ms < 0.100 {
        100
    } else if median_ms < 1.0 {
        50
    } else if median_ms < 10.0 {
        30
    } else {
        20
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConvergenceCheck {
    pub converged: bool,
    pub confidence: f64,
    pub reason: String,
}

/// Compares the stability of two sliding windows (`recent` vs `previous`) against the
/// 5% drift threshold, on both median drift and outlier-impact drift.
pub fn check_convergence(samples: &[f64]) -> ConvergenceCheck {
    let w = window_size(samples);
    let needed = 2 * w;
    if samples.len() < needed {
        return ConvergenceCheck {
            converged: false,
            confidence: (samples.len() as f64 / needed as f64) * 100.0,
            reason: format!("Collecting samples: {}/{}", samples.len(), needed),
        };
    }

    let n = samples.len();
    let recent = &samples[n - w..];
    let previous = &samples[n - 2 * w..n - w];

    let median_recent = median(recent);
    let median_previous = median(previous);
    let median_drift = if median_previous == 0.0 {
        0.0
    } else {
        (median_recent - median_previous).abs() / median_previous
    };

    let impact_recent = outlier_impact(recent);
    let impact_previous = outlier_impact(previous);
    let impact_drift = (impact_recent - impact_previous).abs();

    let median_stable = median_drift < DRIFT_THRESHOLD;
    let impact_stable = impact_drift < DRIFT_THRESHOLD;

    if median_stable && impact_stable {
        return ConvergenceCheck {
            converged: true,
            confidence: 100.0,
            reason: "Stable performance pattern".to_string(),
        };
    }

    let confidence = (50.0 * (1.0 - median_drift / DRIFT_THRESHOLD)
        + 50.0 * (1.0 - impact_drift / DRIFT_THRESHOLD))
        .max(0.0)
        .min(100.0);

    let reason = if median_drift >= impact_drift {
        format!(
            "Median drift {:.1}% exceeds {:.0}% threshold",
            median_drift * 100.0,
            DRIFT_THRESHOLD * 100.0
        )
    } else {
        format!(
            "Outlier-impact drift {:.1}% exceeds {:.0}% threshold",
            impact_drift * 100.0,
            DRIFT_THRESHOLD * 100.0
        )
    };

    ConvergenceCheck {
        converged: false,
        confidence,
        reason,
    }
}

/// Runs the full adaptive protocol (§4.4) and returns a sealed [`MeasuredResults`]
/// whose `convergence` field is populated.
pub fn run_adaptive(
    name: &str,
    f: &BenchFn<'_>,
    param: Option<&str>,
    options: &RunnerOptions,
    hooks: &dyn RuntimeHooks,
) -> Result<MeasuredResults> {
    let max_time_ms = options.max_time_ms.ok_or_else(|| Error::ConfigInvalid {
        message: "adaptive mode requires max_time_ms".into(),
    })?;

    let mut initial_options = options.clone();
    initial_options.max_time_ms = Some(INITIAL_BATCH_MS);
    initial_options.max_iterations = None;
    initial_options.adaptive = true;

    let mut result = collect(name, f, param, &initial_options, hooks)?;
    let mut samples = result.samples.clone();

    // The adaptive clock starts *after* the initial (warmup-inclusive) batch, so
    // warmup is never charged against `max_time_ms`.
    let clock = Clock::start();
    let mut last_progress = Instant::now()
        .checked_sub(PROGRESS_INTERVAL)
        .unwrap_or_else(Instant::now);
    let mut check = check_convergence(&samples);

    loop {
        check = check_convergence(&samples);

        if last_progress.elapsed() >= PROGRESS_INTERVAL {
            eprintln!("{}: {}", name, check.reason);
            last_progress = Instant::now();
        }

        let elapsed_ms = clock.elapsed_ms();
        if elapsed_ms >= max_time_ms as f64 {
            break;
        }
        if check.converged && check.confidence >= options.target_confidence {
            break;
        }
        let fallback_confidence = options.target_confidence.max(80.0);
        if elapsed_ms >= options.min_time_ms as f64 && check.confidence >= fallback_confidence {
            break;
        }

        let mut batch_options = options.clone();
        batch_options.max_time_ms = Some(FOLLOWUP_BATCH_MS);
        batch_options.max_iterations = Some(FOLLOWUP_ITER_CAP);
        batch_options.skip_warmup = true;
        batch_options.warmup_iterations = 0;

        let batch = collect(name, f, param, &batch_options, hooks)?;
        samples.extend(batch.samples);
    }

    result.time = summarize(&samples, true);
    result.samples = samples;
    result.convergence = Some(Convergence {
        converged: check.converged,
        confidence: check.confidence,
        reason: check.reason,
    });
    result.total_time_s = Some(clock.elapsed().as_secs_f64());

    Ok(result)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::collector::NullHooks;

    #[test]
    fn insufficient_samples_report_progress() {
        let samples = vec![1.0; 10];
        let check = check_convergence(&samples);
        assert!(!check.converged);
        assert!(check.reason.starts_with("Collecting samples"));
    }

    #[test]
    fn stable_samples_converge_with_full_confidence() {
        // 2*200 = 400 samples needed for the <10us window, but our samples are in ms
        // scale (median ~50ms), so the window is 20 and we need 40 stable samples.
        let samples: Vec<f64> = (0..40)
            .map(|i| 50.0 + if i % 2 == 0 { 0.1 } else { -0.1 })
            .collect();
        let check = check_convergence(&samples);
        assert!(check.converged);
        assert_eq!(check.confidence, 100.0);
        assert_eq!(check.reason, "Stable performance pattern");
    }

    #[test]
    fn drifting_median_does_not_converge() {
        let mut samples: Vec<f64> = vec![50.0; 20];
        samples.extend(vec![100.0; 20]);
        let check = check_convergence(&samples);
        assert!(!check.converged);
        assert!(check.confidence < 100.0);
    }

    #[test]
    fn window_scales_with_sample_time() {
        let micro: Vec<f64> = vec![0.001; 20]; // < 10us -> window 200
        assert_eq!(window_size(&micro), 200);
        let milli: Vec<f64> = vec![5.0; 20]; // < 10ms -> window 30
        assert_eq!(window_size(&milli), 30);
        let slow: Vec<f64> = vec![20.0; 20]; // >= 10ms -> window 20
        assert_eq!(window_size(&slow), 20);
    }

    #[test]
    fn run_adaptive_populates_convergence() {
        let mut options = RunnerOptions::default();
        options.adaptive = true;
        options.max_time_ms = Some(50);
        options.min_time_ms = 10;
        options.target_confidence = 95.0;
        options.warmup_iterations = 1;
        options.skip_settle = true;

        let result = run_adaptive("stable", &|_| Ok(()), None, &options, &NullHooks).unwrap();
        assert!(result.convergence.is_some());
        assert!(!result.samples.is_empty());
    }
}
