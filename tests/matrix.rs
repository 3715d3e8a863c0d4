//! The matrix runner's cross-product, filtering, and baseline semantics (§4.6),
//! through the public `benchcore` surface.

use benchcore::{BenchMatrix, Baseline, BenchmarkSpec, CaseSet, MatrixFilter, RunnerOptions, VariantSet};
use benchcore::error::Error;
use std::path::PathBuf;

fn fast_options() -> RunnerOptions {
    let mut o = RunnerOptions::default();
    o.max_iterations = Some(5);
    o.max_time_ms = None;
    o.warmup_iterations = 0;
    o.skip_settle = true;
    o
}

fn spec(name: &str) -> BenchmarkSpec {
    BenchmarkSpec::in_process(name, None, |_| Ok(()))
}

#[test]
fn cross_product_covers_every_variant_and_case() {
    let matrix = BenchMatrix {
        name: "matrix".into(),
        variants: VariantSet::Inline(vec![spec("a"), spec("b"), spec("c")]),
        cases: CaseSet::Inline(vec!["x".into(), "y".into()]),
        baseline: None,
        filter: MatrixFilter::default(),
        options: fast_options(),
    };
    let results = matrix.run().unwrap();
    assert_eq!(results.len(), 6);
    for variant in ["a", "b", "c"] {
        for case in ["x", "y"] {
            assert!(results
                .iter()
                .any(|r| r.variant == variant && r.case == case));
        }
    }
}

#[test]
fn both_baseline_dir_and_baseline_variant_cannot_both_be_modeled_at_once() {
    // The data model only allows one `Baseline` value at a time (an enum, not two
    // optional fields), which is how the "never both" invariant (§3) is enforced at
    // the type level rather than by runtime validation.
    let _dir_only = Baseline::Dir(PathBuf::from("/tmp/baselines"));
    let _variant_only = Baseline::Variant("reference".into());
}

#[test]
fn inline_variants_paired_with_baseline_dir_is_rejected() {
    let matrix = BenchMatrix {
        name: "matrix".into(),
        variants: VariantSet::Inline(vec![spec("a")]),
        cases: CaseSet::Inline(vec!["x".into()]),
        baseline: Some(Baseline::Dir(PathBuf::from("/tmp/baselines"))),
        filter: MatrixFilter::default(),
        options: fast_options(),
    };
    assert!(matches!(matrix.run(), Err(Error::ConfigInvalid { .. })));
}

#[test]
fn filter_is_case_insensitive_substring_on_case_and_variant() {
    let matrix = BenchMatrix {
        name: "matrix".into(),
        variants: VariantSet::Inline(vec![spec("Alpha"), spec("Beta")]),
        cases: CaseSet::Inline(vec!["Case1".into(), "Case2".into()]),
        baseline: None,
        filter: MatrixFilter {
            text: Some("case1/alpha".into()),
            ..Default::default()
        },
        options: fast_options(),
    };
    let results = matrix.run().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].variant, "Alpha");
    assert_eq!(results[0].case, "Case1");
}

#[test]
fn filter_matching_nothing_is_a_hard_error() {
    let matrix = BenchMatrix {
        name: "matrix".into(),
        variants: VariantSet::Inline(vec![spec("alpha")]),
        cases: CaseSet::Inline(vec!["case1".into()]),
        baseline: None,
        filter: MatrixFilter {
            text: Some("nothing-matches-this".into()),
            ..Default::default()
        },
        options: fast_options(),
    };
    assert!(matches!(matrix.run(), Err(Error::FilterNoMatch { .. })));
}

#[test]
fn baseline_variant_attaches_delta_to_every_other_variant_only() {
    let matrix = BenchMatrix {
        name: "matrix".into(),
        variants: VariantSet::Inline(vec![spec("reference"), spec("candidate-a"), spec("candidate-b")]),
        cases: CaseSet::Inline(vec!["case1".into()]),
        baseline: Some(Baseline::Variant("reference".into())),
        filter: MatrixFilter::default(),
        options: fast_options(),
    };
    let results = matrix.run().unwrap();
    assert_eq!(results.len(), 3);
    let reference = results.iter().find(|r| r.variant == "reference").unwrap();
    assert!(reference.baseline.is_none());
    assert!(reference.delta_percent.is_none());
    for name in ["candidate-a", "candidate-b"] {
        let r = results.iter().find(|r| r.variant == name).unwrap();
        assert!(r.baseline.is_some());
        assert!(r.delta_percent.is_some());
    }
}
