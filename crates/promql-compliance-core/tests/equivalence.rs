// crates/promql-compliance-core/tests/equivalence.rs
// ============================================================================
// Module: Equivalence Tests
// Description: Tolerance, special values, label canonicalization, and diffs.
// Purpose: Ensure value-level comparison is order-insensitive and tolerant.
// Dependencies: promql-compliance-core, proptest, serde_json
// ============================================================================
//! ## Overview
//! Validates numeric tolerance, NaN and infinity handling, series matching by
//! canonical label set, timestamp handling, and diff rendering.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use promql_compliance_core::LabelSet;
use promql_compliance_core::QueryData;
use promql_compliance_core::ResultType;
use promql_compliance_core::Sample;
use promql_compliance_core::TargetRole;
use promql_compliance_core::Tolerance;
use promql_compliance_core::format_label_set;
use promql_compliance_core::runtime::DiffEntry;
use promql_compliance_core::runtime::EquivalenceOptions;
use promql_compliance_core::runtime::compare_query_data;
use promql_compliance_core::runtime::render_diff;
use proptest::prelude::*;

fn options() -> EquivalenceOptions<'static> {
    EquivalenceOptions {
        tolerance: Tolerance::default(),
        reference_drop_labels: &[],
        test_drop_labels: &[],
    }
}

// ============================================================================
// SECTION: Tolerance
// ============================================================================

/// Verifies the default tolerance accepts float noise and rejects real drift.
#[test]
fn default_tolerance_accepts_noise_only() {
    let tolerance = Tolerance::default();
    assert!(tolerance.equivalent(1.000_000, 1.000_000_9));
    assert!(!tolerance.equivalent(1.0, 1.1));
    assert!(tolerance.equivalent(12.5, 12.500_000_1));
    assert!(!tolerance.equivalent(12.5, 12.6));
}

/// Verifies NaN and infinity rules.
#[test]
fn special_values_compare_by_kind() {
    let tolerance = Tolerance::default();
    assert!(tolerance.equivalent(f64::NAN, f64::NAN));
    assert!(!tolerance.equivalent(f64::NAN, 0.0));
    assert!(tolerance.equivalent(f64::INFINITY, f64::INFINITY));
    assert!(!tolerance.equivalent(f64::INFINITY, f64::NEG_INFINITY));
    assert!(!tolerance.equivalent(f64::INFINITY, f64::MAX));
}

proptest! {
    /// Equivalence is symmetric and reflexive for finite values.
    #[test]
    fn tolerance_is_symmetric(a in -1.0e12_f64 .. 1.0e12, b in -1.0e12_f64 .. 1.0e12) {
        let tolerance = Tolerance::default();
        prop_assert_eq!(tolerance.equivalent(a, b), tolerance.equivalent(b, a));
        prop_assert!(tolerance.equivalent(a, a));
    }
}

// ============================================================================
// SECTION: Series Matching
// ============================================================================

/// Verifies NaN samples at the same timestamp are equivalent.
#[test]
fn nan_samples_match() {
    let reference = common::matrix(&[("job", "api")], &[(1_000, f64::NAN)]);
    let test = common::matrix(&[("job", "api")], &[(1_000, f64::NAN)]);
    assert!(compare_query_data(&reference, &test, &options()).is_empty());
}

/// Verifies label order and series order do not matter.
#[test]
fn label_and_series_order_are_ignored() {
    let reference = QueryData::Matrix(vec![
        common::series(&[("a", "1"), ("b", "2")], &[(1_000, 1.0)]),
        common::series(&[("a", "3")], &[(1_000, 3.0)]),
    ]);
    let test = QueryData::Matrix(vec![
        common::series(&[("a", "3")], &[(1_000, 3.0)]),
        common::series(&[("b", "2"), ("a", "1")], &[(1_000, 1.0)]),
    ]);
    assert!(compare_query_data(&reference, &test, &options()).is_empty());
}

/// Verifies label sets decoded from JSON with different key order match.
#[test]
fn json_key_order_is_canonicalized() {
    let first: LabelSet = serde_json::from_str(r#"{"a":"1","b":"2"}"#).unwrap();
    let second: LabelSet = serde_json::from_str(r#"{"b":"2","a":"1"}"#).unwrap();
    assert_eq!(first, second);
    assert_eq!(format_label_set(&first), r#"{a="1", b="2"}"#);
}

/// Verifies a series present on one side only is reported by label set.
#[test]
fn missing_series_is_reported() {
    let reference = QueryData::Matrix(vec![
        common::series(&[("__name__", "up"), ("job", "api")], &[(1_000, 1.0)]),
        common::series(&[("__name__", "up"), ("job", "db")], &[(1_000, 1.0)]),
    ]);
    let test = common::matrix(&[("__name__", "up"), ("job", "api")], &[(1_000, 1.0)]);

    let diffs = compare_query_data(&reference, &test, &options());
    assert_eq!(diffs.len(), 1);
    assert!(matches!(&diffs[0], DiffEntry::MissingSeries { .. }));
    assert_eq!(diffs[0].to_string(), r#"missing series up{job="db"}"#);

    let reversed = compare_query_data(&test, &reference, &options());
    assert!(matches!(&reversed[0], DiffEntry::UnexpectedSeries { .. }));
}

/// Verifies dropped labels are removed before matching and duplicates after
/// dropping are reported.
#[test]
fn dropped_labels_merge_series() {
    let reference = common::matrix(&[("job", "api")], &[(1_000, 1.0)]);
    let test = QueryData::Matrix(vec![
        common::series(&[("job", "api"), ("instance", "a")], &[(1_000, 1.0)]),
        common::series(&[("job", "api"), ("instance", "b")], &[(1_000, 1.0)]),
    ]);
    let drop = vec!["instance".to_string()];
    let options = EquivalenceOptions {
        test_drop_labels: &drop,
        ..options()
    };
    let diffs = compare_query_data(&reference, &test, &options);
    assert_eq!(diffs.len(), 1);
    assert!(matches!(
        &diffs[0],
        DiffEntry::DuplicateSeries {
            role: TargetRole::Test,
            ..
        }
    ));
}

// ============================================================================
// SECTION: Samples and Types
// ============================================================================

/// Verifies extra and missing timestamps are listed.
#[test]
fn timestamp_differences_are_listed() {
    let reference = common::matrix(&[("job", "api")], &[(1_000, 1.0), (2_000, 2.0)]);
    let test = common::matrix(&[("job", "api")], &[(2_000, 2.0), (3_000, 3.0)]);
    let diffs = compare_query_data(&reference, &test, &options());
    assert_eq!(diffs.len(), 2);
    assert!(matches!(diffs[0], DiffEntry::MissingSample { timestamp_ms: 1_000, .. }));
    assert!(matches!(diffs[1], DiffEntry::UnexpectedSample { timestamp_ms: 3_000, .. }));
}

/// Verifies repeated timestamps within a series are reported, not collapsed.
#[test]
fn duplicate_timestamps_are_reported() {
    let reference = common::matrix(&[("job", "api")], &[(1_000, 1.0), (1_000, 5.0)]);
    let test = common::matrix(&[("job", "api")], &[(1_000, 5.0)]);
    let diffs = compare_query_data(&reference, &test, &options());
    assert_eq!(diffs.len(), 2);
    assert!(matches!(
        diffs[0],
        DiffEntry::DuplicateSample {
            role: TargetRole::Reference,
            timestamp_ms: 1_000,
            ..
        }
    ));
    assert!(matches!(diffs[1], DiffEntry::Value { timestamp_ms: 1_000, .. }));
    let rendered = diffs[0].to_string();
    assert!(rendered.starts_with(r#"duplicate sample {job="api"} @"#), "{rendered}");
    assert!(rendered.ends_with("in reference result"), "{rendered}");

    let reversed = compare_query_data(&test, &reference, &options());
    assert!(reversed.iter().any(|diff| matches!(
        diff,
        DiffEntry::DuplicateSample {
            role: TargetRole::Test,
            ..
        }
    )));
}

/// Verifies single-sample instant results ignore timestamps.
#[test]
fn instant_results_compare_values_only() {
    let reference = QueryData::Vector(vec![common::series(&[("job", "api")], &[(1_000, 4.0)])]);
    let test = QueryData::Vector(vec![common::series(&[("job", "api")], &[(1_005, 4.0)])]);
    assert!(compare_query_data(&reference, &test, &options()).is_empty());

    let scalar = compare_query_data(
        &QueryData::Scalar(Sample::new(1_000, 2.0)),
        &QueryData::Scalar(Sample::new(2_000, 3.0)),
        &options(),
    );
    assert_eq!(scalar.len(), 1);
}

/// Verifies result-type and string mismatches.
#[test]
fn type_and_string_mismatches_are_reported() {
    let diffs = compare_query_data(
        &QueryData::Scalar(Sample::new(0, 1.0)),
        &QueryData::Vector(Vec::new()),
        &options(),
    );
    assert_eq!(
        diffs,
        vec![DiffEntry::ResultType {
            expected: ResultType::Scalar,
            actual: ResultType::Vector,
        }]
    );

    let strings = compare_query_data(
        &QueryData::String {
            timestamp_ms: 0,
            value: "a".to_string(),
        },
        &QueryData::String {
            timestamp_ms: 0,
            value: "b".to_string(),
        },
        &options(),
    );
    assert_eq!(strings.len(), 1);
}

/// Verifies diff rendering truncates with a remainder count.
#[test]
fn render_diff_truncates() {
    let samples: Vec<(i64, f64)> = (0 .. 12).map(|index| (index * 1_000, 1.0)).collect();
    let shifted: Vec<(i64, f64)> = (0 .. 12).map(|index| (index * 1_000, 2.0)).collect();
    let diffs = compare_query_data(
        &common::matrix(&[("job", "api")], &samples),
        &common::matrix(&[("job", "api")], &shifted),
        &options(),
    );
    let rendered = render_diff(&diffs, 10);
    assert_eq!(rendered.lines().count(), 11);
    assert!(rendered.ends_with("... and 2 more"));
    assert!(rendered.starts_with(r#"value mismatch {job="api"} @0.000: expected 1, actual 2"#));
}
