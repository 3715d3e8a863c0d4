//! The bootstrap comparator: a confidence interval on the percentage difference of
//! medians between a baseline and a candidate sample, built by repeated
//! resample-with-replacement. Grounded in the teacher's two-sample bootstrap
//! (`src/stats/univariate/mod.rs::bootstrap`), specialized here to the single
//! percent-difference-of-medians statistic this harness reports.

use crate::result::{Direction, DifferenceCI, Histogram};
use crate::stats::{median, resample::Resampler};

#[derive(Debug, Clone, Copy)]
pub struct BootstrapOptions {
    pub resamples: usize,
    pub confidence: f64,
    pub histogram_bins: usize,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        BootstrapOptions {
            resamples: 10_000,
            confidence: 0.95,
            histogram_bins: 30,
        }
    }
}

/// `100 * (median(current) - median(baseline)) / median(baseline)`.
///
/// If `median(baseline)` is zero the numerator dominates; the spec treats the
/// percentage as undefined in that case, so this returns `None` rather than `inf`/`NaN`
/// and callers (here, only [`bootstrap_compare`]) must tolerate it.
fn percent_difference(baseline_median: f64, current_median: f64) -> Option<f64> {
    if baseline_median == 0.0 {
        None
    } else {
        Some(100.0 * (current_median - baseline_median) / baseline_median)
    }
}

/// Bins `values` into `bins` equal-width buckets and returns `(bin midpoint, count)`
/// pairs, for transport to a reporter.
fn histogram(values: &[f64], bins: usize) -> Histogram {
    if values.is_empty() || bins == 0 {
        return Histogram {
            bin_midpoints: Vec::new(),
            counts: Vec::new(),
        };
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let width = if max > min {
        (max - min) / bins as f64
    } else {
        // Degenerate (all resamples identical): give every value its own unit-width bin
        // centered on the shared value so callers still get `bins` buckets back.
        1.0
    };

    let mut counts = vec![0u64; bins];
    for &v in values {
        let idx = if width == 0.0 {
            0
        } else {
            (((v - min) / width) as usize).min(bins - 1)
        };
        counts[idx] += 1;
    }

    let bin_midpoints: Vec<f64> = (0..bins)
        .map(|i| min + width * (i as f64 + 0.5))
        .collect();

    Histogram {
        bin_midpoints,
        counts,
    }
}

/// Compares two sample arrays and returns a bootstrap confidence interval on the
/// percentage difference of their medians.
///
/// Note: deliberately *not* symmetric under swapping `baseline` and `current` when the
/// two distributions have different variances -- an open question left unresolved by
/// design (see `SPEC_FULL.md` §E.1); do not "fix" this without re-deriving the CI math.
pub fn bootstrap_compare(
    baseline: &[f64],
    current: &[f64],
    options: BootstrapOptions,
) -> DifferenceCI {
    assert!(!baseline.is_empty() && !current.is_empty());

    let baseline_median = median(baseline);
    let current_median = median(current);

    let observed = match percent_difference(baseline_median, current_median) {
        Some(p) => p,
        None => {
            return DifferenceCI {
                percent: 0.0,
                ci_lower: 0.0,
                ci_upper: 0.0,
                direction: Direction::Uncertain,
                histogram: None,
            }
        }
    };

    let mut baseline_resampler = Resampler::new(baseline);
    let mut current_resampler = Resampler::new(current);

    let mut diffs: Vec<f64> = Vec::with_capacity(options.resamples);
    for _ in 0..options.resamples {
        let b = baseline_resampler.next_resample();
        let c = current_resampler.next_resample();
        let b_med = median(&b);
        if let Some(p) = percent_difference(b_med, median(&c)) {
            diffs.push(p);
        }
    }

    if diffs.is_empty() {
        return DifferenceCI {
            percent: observed,
            ci_lower: 0.0,
            ci_upper: 0.0,
            direction: Direction::Uncertain,
            histogram: None,
        };
    }

    diffs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let alpha = 1.0 - options.confidence;
    let lower = crate::stats::percentile(&diffs, alpha / 2.0);
    let upper = crate::stats::percentile(&diffs, 1.0 - alpha / 2.0);

    let direction = if upper < 0.0 {
        Direction::Faster
    } else if lower > 0.0 {
        Direction::Slower
    } else {
        Direction::Uncertain
    };

    DifferenceCI {
        percent: observed,
        ci_lower: lower,
        ci_upper: upper,
        direction,
        histogram: Some(histogram(&diffs, options.histogram_bins)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn range(start: i64, end: i64) -> Vec<f64> {
        (start..end).map(|v| v as f64).collect()
    }

    #[test]
    fn detects_a_20_percent_speedup() {
        let baseline = range(50, 150);
        let current: Vec<f64> = baseline.iter().map(|v| v * 0.8).collect();
        let result = bootstrap_compare(&baseline, &current, BootstrapOptions::default());
        assert_relative_eq!(result.percent, -20.0, epsilon = 1.0);
        assert!(result.ci_upper < 0.0);
        assert_eq!(result.direction, Direction::Faster);
    }

    #[test]
    fn detects_a_30_percent_regression() {
        let baseline = range(100, 200);
        let current: Vec<f64> = baseline.iter().map(|v| v * 1.3).collect();
        let result = bootstrap_compare(&baseline, &current, BootstrapOptions::default());
        assert_relative_eq!(result.percent, 30.0, epsilon = 1.0);
        assert!(result.ci_lower > 0.0);
        assert_eq!(result.direction, Direction::Slower);
    }

    #[test]
    fn no_signal_under_small_noise() {
        let baseline = range(200, 300);
        // deterministic "noise": +/- 1, alternating, rather than RNG draws.
        let current: Vec<f64> = baseline
            .iter()
            .enumerate()
            .map(|(i, v)| v + if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let result = bootstrap_compare(&baseline, &current, BootstrapOptions::default());
        assert!(result.percent.abs() < 5.0);
        assert_eq!(result.direction, Direction::Uncertain);
    }

    #[test]
    fn strong_signal_from_a_4x_spread() {
        let base = range(50, 150);
        let fast: Vec<f64> = base.iter().map(|v| v * 0.5).collect();
        let slow: Vec<f64> = base.iter().map(|v| v * 2.0).collect();
        let result = bootstrap_compare(&fast, &slow, BootstrapOptions::default());
        assert!(result.ci_lower > 0.0);
        assert_eq!(result.direction, Direction::Slower);
    }

    #[test]
    fn single_value_baseline_vs_identical_vector() {
        let baseline = vec![50.0];
        let current = vec![50.0; 5];
        let result = bootstrap_compare(&baseline, &current, BootstrapOptions::default());
        assert_eq!(result.percent, 0.0);
        assert_eq!(result.direction, Direction::Uncertain);
    }

    #[test]
    fn zero_median_baseline_is_uncertain_not_a_crash() {
        let baseline = vec![0.0, 0.0, 0.0];
        let current = vec![1.0, 2.0, 3.0];
        let result = bootstrap_compare(&baseline, &current, BootstrapOptions::default());
        assert_eq!(result.percent, 0.0);
        assert_eq!(result.direction, Direction::Uncertain);
    }

    #[test]
    fn identical_distributions_are_uncertain() {
        let baseline = range(1, 100);
        let current = baseline.clone();
        let result = bootstrap_compare(&baseline, &current, BootstrapOptions::default());
        assert!(result.percent.abs() < 1e-9);
        assert_eq!(result.direction, Direction::Uncertain);
    }
}
