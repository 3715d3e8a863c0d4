//! Tukey's-fence outlier detection and the adaptive controller's "outlier impact"
//! (time cost of outliers, not their count).
//!
//! Grounded in the teacher's `src/stats/univariate/outliers/tukey.rs`, which computes
//! the same `(q1 - 1.5*iqr, q3 + 1.5*iqr)` fences but classifies severity with an
//! extra pair of outer fences we don't need here.

use super::sample::percentile;

pub struct OutlierReport {
    pub rate: f64,
    pub indices: Vec<usize>,
}

/// Classifies every sample outside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]` as an outlier.
pub fn tukey_outliers(samples: &[f64]) -> OutlierReport {
    if samples.is_empty() {
        return OutlierReport {
            rate: 0.0,
            indices: Vec::new(),
        };
    }
    let q1 = percentile(samples, 0.25);
    let q3 = percentile(samples, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - 1.5 * iqr;
    let upper = q3 + 1.5 * iqr;

    let indices: Vec<usize> = samples
        .iter()
        .enumerate()
        .filter(|(_, &x)| x < lower || x > upper)
        .map(|(i, _)| i)
        .collect();

    OutlierReport {
        rate: indices.len() as f64 / samples.len() as f64,
        indices,
    }
}

/// The fraction of total measured time attributable to samples beyond the upper
/// Tukey fence (`med + 1.5*(q75 - med)`), used by the adaptive controller to weight
/// drift by time cost rather than outlier count: one 10x outlier matters more than
/// ten 1.1x outliers.
pub fn outlier_impact(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let med = percentile(samples, 0.5);
    let q75 = percentile(samples, 0.75);
    let threshold = med + 1.5 * (q75 - med);

    let total_time: f64 = samples.iter().sum();
    if total_time <= 0.0 {
        return 0.0;
    }

    let excess: f64 = samples
        .iter()
        .filter(|&&s| s > threshold)
        .map(|&s| s - med)
        .sum();

    excess / total_time
}
