//! End-to-end scenarios for the bootstrap comparator (§4.2, §8 "End-to-end
//! scenarios"), driven through the public `benchcore` surface.

use benchcore::{bootstrap_compare, BootstrapOptions, Direction};

fn range(start: i64, end: i64) -> Vec<f64> {
    (start..end).map(|v| v as f64).collect()
}

#[test]
fn twenty_percent_speedup_is_detected_as_faster() {
    let baseline = range(50, 150);
    let current: Vec<f64> = baseline.iter().map(|v| v * 0.8).collect();
    let diff = bootstrap_compare(&baseline, &current, BootstrapOptions::default());
    assert!((diff.percent + 20.0).abs() < 1.0);
    assert!(diff.ci_upper < 0.0);
    assert_eq!(diff.direction, Direction::Faster);
}

#[test]
fn thirty_percent_regression_is_detected_as_slower() {
    let baseline = range(100, 200);
    let current: Vec<f64> = baseline.iter().map(|v| v * 1.3).collect();
    let diff = bootstrap_compare(&baseline, &current, BootstrapOptions::default());
    assert!((diff.percent - 30.0).abs() < 1.0);
    assert!(diff.ci_lower > 0.0);
    assert_eq!(diff.direction, Direction::Slower);
}

#[test]
fn identical_distributions_report_uncertain_direction() {
    let samples = range(1, 200);
    let diff = bootstrap_compare(&samples, &samples, BootstrapOptions::default());
    assert!(diff.percent.abs() < 1e-9);
    assert!(diff.ci_lower <= diff.percent && diff.percent <= diff.ci_upper);
    assert_eq!(diff.direction, Direction::Uncertain);
}

#[test]
fn zero_median_baseline_never_panics_and_is_uncertain() {
    let baseline = vec![0.0; 10];
    let current: Vec<f64> = (0..10).map(|i| i as f64).collect();
    let diff = bootstrap_compare(&baseline, &current, BootstrapOptions::default());
    assert_eq!(diff.percent, 0.0);
    assert_eq!(diff.direction, Direction::Uncertain);
}

#[test]
fn resample_distribution_histogram_has_thirty_bins_by_default() {
    let baseline = range(1, 100);
    let current: Vec<f64> = baseline.iter().map(|v| v * 1.5).collect();
    let diff = bootstrap_compare(&baseline, &current, BootstrapOptions::default());
    let histogram = diff.histogram.expect("non-degenerate comparison has a histogram");
    assert_eq!(histogram.bin_midpoints.len(), 30);
    assert_eq!(histogram.counts.len(), 30);
    let total: u64 = histogram.counts.iter().sum();
    assert_eq!(total, 10_000);
}

#[test]
fn four_x_spread_gives_a_strong_signal_excluding_zero() {
    let base = range(50, 150);
    let fast: Vec<f64> = base.iter().map(|v| v * 0.5).collect();
    let slow: Vec<f64> = base.iter().map(|v| v * 2.0).collect();
    let diff = bootstrap_compare(&fast, &slow, BootstrapOptions::default());
    assert!(diff.ci_lower > 0.0);
    assert_eq!(diff.direction, Direction::Slower);
}
