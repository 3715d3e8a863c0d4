//! Percentile, dispersion and shape statistics over a slice of `f64` samples.
//!
//! Percentiles use the nearest-rank method rather than the teacher's
//! linear-interpolation `Percentiles::at`: for `p` in `[0, 1]` of `n` sorted values,
//! `index = max(0, ceil(n * p) - 1)`.

/// Returns the percentile at `p` (`p` in `[0, 1]`) using nearest-rank indexing.
///
/// `sorted` must already be sorted ascending. Panics if `sorted` is empty.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    assert!(!sorted.is_empty(), "percentile of empty sample");
    let n = sorted.len();
    let rank = (n as f64 * p).ceil() as isize - 1;
    let idx = rank.max(0) as usize;
    sorted[idx.min(n - 1)]
}

/// Sorts a copy of `values` and returns the percentile at `p`.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    percentile_sorted(&sorted, p)
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with Bessel's correction. Returns 0 for `n <= 1`.
pub fn std_dev(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }
    let m = mean(values);
    let sum_sq = values.iter().map(|x| (x - m).powi(2)).sum::<f64>();
    (sum_sq / (n as f64 - 1.0)).sqrt()
}

/// Coefficient of variation: `stddev / mean`, 0 if the mean is 0.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m == 0.0 {
        0.0
    } else {
        std_dev(values) / m
    }
}

/// Median absolute deviation: the median of `|x - median(x)|`.
pub fn median_abs_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let med = percentile(values, 0.5);
    let deviations: Vec<f64> = values.iter().map(|x| (x - med).abs()).collect();
    percentile(&deviations, 0.5)
}

pub fn median(values: &[f64]) -> f64 {
    percentile(values, 0.5)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeSummary {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub p25: Option<f64>,
    pub p50: f64,
    pub p75: f64,
    pub p95: Option<f64>,
    pub p99: f64,
    pub p999: f64,
    pub cv: Option<f64>,
    pub mad: Option<f64>,
    pub outlier_rate: Option<f64>,
}

/// Builds the `time` block described in the result record. `adaptive` controls whether
/// the adaptive-only fields (`p25`, `p95`, `cv`, `mad`, `outlier_rate`) are populated.
pub fn summarize(samples: &[f64], adaptive: bool) -> TimeSummary {
    assert!(!samples.is_empty(), "cannot summarize an empty sample set");
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mut summary = TimeSummary {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        avg: mean(samples),
        p50: percentile_sorted(&sorted, 0.50),
        p75: percentile_sorted(&sorted, 0.75),
        p99: percentile_sorted(&sorted, 0.99),
        p999: percentile_sorted(&sorted, 0.999),
        ..Default::default()
    };

    if adaptive {
        summary.p25 = Some(percentile_sorted(&sorted, 0.25));
        summary.p95 = Some(percentile_sorted(&sorted, 0.95));
        summary.cv = Some(coefficient_of_variation(samples));
        summary.mad = Some(median_abs_dev(samples));
        summary.outlier_rate = Some(super::outliers::tukey_outliers(samples).rate);
    }

    summary
}

#[cfg(test)]
mod test {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn percentile_single_element() {
        let v = [42.0];
        for p in [0.0, 0.25, 0.5, 0.75, 0.99, 1.0] {
            assert_eq!(percentile(&v, p), 42.0);
        }
    }

    #[test]
    fn percentile_monotonic_nearest_rank() {
        let v: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let p50 = percentile(&v, 0.50);
        let p99 = percentile(&v, 0.99);
        let p999 = percentile(&v, 0.999);
        assert!(p50 <= p99);
        assert!(p99 <= p999);
    }

    #[test]
    fn std_dev_of_single_value_is_zero() {
        assert_eq!(std_dev(&[5.0]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn cv_zero_mean_is_zero() {
        assert_eq!(coefficient_of_variation(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn summary_percentiles_are_monotonic() {
        let samples: Vec<f64> = (1..=200).map(|i| i as f64).collect();
        let s = summarize(&samples, true);
        assert!(s.min <= s.p25.unwrap());
        assert!(s.p25.unwrap() <= s.p50);
        assert!(s.p50 <= s.p75);
        assert!(s.p75 <= s.p95.unwrap());
        assert!(s.p95.unwrap() <= s.p99);
        assert!(s.p99 <= s.p999);
        assert!(s.p999 <= s.max);
    }

    quickcheck! {
        fn mad_and_cv_never_negative(values: Vec<i16>) -> bool {
            if values.is_empty() {
                return true;
            }
            let values: Vec<f64> = values.iter().map(|&v| v as f64).collect();
            median_abs_dev(&values) >= 0.0 && coefficient_of_variation(&values) >= 0.0
        }
    }
}
