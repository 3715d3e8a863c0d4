//! The matrix runner (§4.6): a `variants x cases` cross product, with optional
//! baseline-directory or baseline-variant comparison. Grounded in the teacher's own
//! `BenchmarkGroup` iteration (`src/benchmark_group.rs`) generalized from "one group,
//! one setup" to "two independent axes". The alternating-order batching idea (§5)
//! belongs to a group's shared baseline rather than to a variant cross product; see
//! [`crate::group::run_group`] for that.

use std::path::PathBuf;

use crate::collector::{collect, BenchFn, NullHooks};
use crate::error::{Error, Result};
use crate::result::MeasuredResults;
use crate::spec::{BenchmarkSpec, Callable, RunnerOptions};
use crate::worker::WorkerOrchestrator;

/// The code under test: either a callable defined in the calling process, or a
/// directory of re-resolvable variant modules (§3 `BenchMatrix`).
#[derive(Clone)]
pub enum VariantSet {
    /// Run directly with the in-process collector; incompatible with `baseline_dir`
    /// by design (§4.6 point 1 -- `baseline_dir` requires re-resolvable modules).
    Inline(Vec<BenchmarkSpec>),
    /// Every (variant, case) pair runs in its own fresh worker.
    Dir(PathBuf),
}

/// The input the code under test runs against (§3 `BenchMatrix`).
#[derive(Clone, Debug)]
pub enum CaseSet {
    Inline(Vec<String>),
    /// A module that loads data per identifier; the identifiers themselves are still
    /// enumerated up front so filtering (§4.6 "Filtering") can run without re-entering
    /// the module for every candidate.
    Module { path: PathBuf, ids: Vec<String> },
}

impl CaseSet {
    fn ids(&self) -> &[String] {
        match self {
            CaseSet::Inline(ids) => ids,
            CaseSet::Module { ids, .. } => ids,
        }
    }
}

/// Exactly one of these may be set (§3 invariant: "never both").
#[derive(Clone, Debug)]
pub enum Baseline {
    /// For each variant that also exists in the baseline directory, run the baseline
    /// variant (same case) in a fresh worker and attach its results.
    Dir(PathBuf),
    /// One variant's results serve as baseline for every other variant (same case).
    Variant(String),
}

#[derive(Clone, Debug, Default)]
pub struct MatrixFilter {
    pub text: Option<String>,
    pub filtered_cases: Option<Vec<String>>,
    pub filtered_variants: Option<Vec<String>>,
}

impl MatrixFilter {
    /// A filter string is `"case/variant"`, either half optional; matching is
    /// case-insensitive substring (§4.6 "Filtering").
    fn parse(&self) -> (Option<String>, Option<String>) {
        match &self.text {
            None => (None, None),
            Some(raw) => match raw.split_once('/') {
                Some((case, variant)) => (non_empty(case), non_empty(variant)),
                None => (non_empty(raw), None),
            },
        }
    }

    fn matches(&self, case_id: &str, variant_name: &str) -> bool {
        let (case_needle, variant_needle) = self.parse();
        let case_ok = case_needle
            .map(|needle| contains_ci(case_id, &needle))
            .unwrap_or(true);
        let variant_ok = variant_needle
            .map(|needle| contains_ci(variant_name, &needle))
            .unwrap_or(true);
        let preexisting_case_ok = self
            .filtered_cases
            .as_ref()
            .map(|cases| cases.iter().any(|c| c == case_id))
            .unwrap_or(true);
        let preexisting_variant_ok = self
            .filtered_variants
            .as_ref()
            .map(|variants| variants.iter().any(|v| v == variant_name))
            .unwrap_or(true);
        case_ok && variant_ok && preexisting_case_ok && preexisting_variant_ok
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A named collection of variants and cases (§3 `BenchMatrix`).
pub struct BenchMatrix {
    pub name: String,
    pub variants: VariantSet,
    pub cases: CaseSet,
    pub baseline: Option<Baseline>,
    pub filter: MatrixFilter,
    pub options: RunnerOptions,
}

impl BenchMatrix {
    /// Validates the `ConfigInvalid` conditions §4.6/§7 name: inline variants with
    /// `baseline_dir`.
    pub fn validate(&self) -> Result<()> {
        if let (VariantSet::Inline(_), Some(Baseline::Dir(_))) = (&self.variants, &self.baseline) {
            return Err(Error::ConfigInvalid {
                message: "inline variants cannot be compared against a baseline_dir; \
                          baseline_dir requires re-resolvable modules"
                    .into(),
            });
        }
        self.options.validate()
    }

    fn variant_names(&self) -> Vec<String> {
        match &self.variants {
            VariantSet::Inline(specs) => specs.iter().map(|s| s.name.clone()).collect(),
            VariantSet::Dir(dir) => list_variant_modules(dir),
        }
    }

    /// The filtered `(case, variant)` cross product. A filter that matches nothing is
    /// a hard error (§4.6 "Filtering").
    fn selected_pairs(&self) -> Result<Vec<(String, String)>> {
        let variants = self.variant_names();
        let cases = self.cases.ids();

        let pairs: Vec<(String, String)> = cases
            .iter()
            .flat_map(|case| {
                variants
                    .iter()
                    .filter(|variant| self.filter.matches(case, variant))
                    .map(move |variant| (case.clone(), variant.clone()))
            })
            .collect();

        if pairs.is_empty() {
            return Err(Error::FilterNoMatch {
                filter: self.filter.text.clone().unwrap_or_default(),
            });
        }
        Ok(pairs)
    }

    /// Runs the full matrix and returns one [`MatrixResult`] per selected
    /// `(case, variant)` pair.
    pub fn run(&self) -> Result<Vec<MatrixResult>> {
        self.validate()?;
        let pairs = self.selected_pairs()?;

        let mut out = Vec::with_capacity(pairs.len());
        for (case, variant) in pairs {
            let results = self.run_pair(&case, &variant)?;
            let (baseline_results, delta_percent) = self.run_baseline_for(&case, &variant, &results)?;
            out.push(MatrixResult {
                case,
                variant,
                results,
                baseline: baseline_results,
                delta_percent,
            });
        }
        Ok(out)
    }

    fn run_pair(&self, case: &str, variant: &str) -> Result<MeasuredResults> {
        match &self.variants {
            VariantSet::Inline(specs) => {
                let spec = specs
                    .iter()
                    .find(|s| s.name == variant)
                    .expect("variant_names() only returns names drawn from specs");
                run_inline(spec, case, &self.options)
            }
            VariantSet::Dir(dir) => {
                let module_path = dir.join(variant).to_string_lossy().into_owned();
                let spec = BenchmarkSpec::exported(variant, module_path, "run", None, Some(case.to_string()));
                let orchestrator = WorkerOrchestrator::new()?;
                let mut results = orchestrator.run(&spec, "wall_time", &self.options, Some(case))?;
                Ok(results.remove(0))
            }
        }
    }

    fn run_baseline_for(
        &self,
        case: &str,
        variant: &str,
        current: &MeasuredResults,
    ) -> Result<(Option<MeasuredResults>, Option<f64>)> {
        match &self.baseline {
            None => Ok((None, None)),
            Some(Baseline::Variant(baseline_variant)) => {
                if variant == baseline_variant {
                    return Ok((None, None));
                }
                let baseline_results = self.run_pair(case, baseline_variant)?;
                let delta = delta_percent(&baseline_results, current);
                Ok((Some(baseline_results), Some(delta)))
            }
            Some(Baseline::Dir(dir)) => {
                if !dir.join(variant).exists() {
                    return Ok((None, None));
                }
                let module_path = dir.join(variant).to_string_lossy().into_owned();
                let spec = BenchmarkSpec::exported(
                    format!("{variant}@baseline"),
                    module_path,
                    "run",
                    None,
                    Some(case.to_string()),
                );
                let orchestrator = WorkerOrchestrator::new()?;
                let mut baseline_results =
                    orchestrator.run(&spec, "wall_time", &self.options, Some(case))?;
                let baseline_results = baseline_results.remove(0);
                let delta = delta_percent(&baseline_results, current);
                Ok((Some(baseline_results), Some(delta)))
            }
        }
    }
}

fn run_inline(spec: &BenchmarkSpec, case: &str, options: &RunnerOptions) -> Result<MeasuredResults> {
    match &spec.callable {
        Callable::InProcess(f) => {
            let bench_fn: &BenchFn<'_> = f.as_ref();
            collect(&spec.name, bench_fn, Some(case), options, &NullHooks)
        }
        Callable::Exported { .. } => Err(Error::ConfigInvalid {
            message: format!(
                "variant '{}' is an exported spec but was listed as an inline variant",
                spec.name
            ),
        }),
    }
}

/// `(avg(current) - avg(baseline)) / avg(baseline) * 100`, `0` if `avg(baseline)` is
/// `0` (§4.6 "Baseline semantics", `baseline_dir` bullet).
fn delta_percent(baseline: &MeasuredResults, current: &MeasuredResults) -> f64 {
    let baseline_avg = baseline.time.avg;
    if baseline_avg == 0.0 {
        0.0
    } else {
        (current.time.avg - baseline_avg) / baseline_avg * 100.0
    }
}

/// Enumerates variant module names from a directory (each top-level entry is one
/// variant module). A real embedding would defer this to whatever module-loading
/// convention the host language uses; here it's a one-level directory walk via
/// `walkdir`, the teacher's own dependency for directory traversal (`baseline_dir`
/// comparisons and report output layout in the real crate).
fn list_variant_modules(dir: &std::path::Path) -> Vec<String> {
    walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_os_string().into_string().ok())
        .collect()
}

/// One `(case, variant)` slot's outcome.
pub struct MatrixResult {
    pub case: String,
    pub variant: String,
    pub results: MeasuredResults,
    pub baseline: Option<MeasuredResults>,
    pub delta_percent: Option<f64>,
}
