//! Statistics primitives: percentiles, dispersion, outlier detection and resampling.
//!
//! This is the harness's implementation detail, same spirit as the teacher's own
//! `src/stats` module ("no plans to stabilize it" as an API) -- it exists to serve
//! the bootstrap comparator and the adaptive controller.

pub mod outliers;
pub mod resample;
pub mod sample;

pub use outliers::{outlier_impact, tukey_outliers, OutlierReport};
pub use resample::{resample_with_replacement, Resampler};
pub use sample::{
    coefficient_of_variation, mean, median, median_abs_dev, percentile, std_dev, summarize,
    TimeSummary,
};
