// crates/promql-compliance-core/tests/fingerprint.rs
// ============================================================================
// Module: Suite Fingerprint Tests
// Description: Stability and sensitivity of the suite fingerprint.
// Purpose: Ensure identical matrices hash identically and changes are seen.
// Dependencies: promql-compliance-core
// ============================================================================
//! ## Overview
//! The fingerprint covers case identity only; tolerance changes keep it.

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

use promql_compliance_core::PlaceholderCatalog;
use promql_compliance_core::QueryTemplate;
use promql_compliance_core::QueryTweaker;
use promql_compliance_core::RunSummary;
use promql_compliance_core::TestCase;
use promql_compliance_core::Tolerance;
use promql_compliance_core::expand_test_cases;
use promql_compliance_core::suite_fingerprint;

fn cases(query: &str) -> Vec<TestCase> {
    expand_test_cases(
        &[QueryTemplate::new("t", query)],
        &PlaceholderCatalog::default(),
        &QueryTweaker::default(),
        common::window(),
    )
    .unwrap()
}

/// Verifies the fingerprint is stable, hex-encoded, and identity-sensitive.
#[test]
fn fingerprint_tracks_case_identity() {
    let first = suite_fingerprint(&cases("up")).unwrap();
    assert_eq!(first, suite_fingerprint(&cases("up")).unwrap());
    assert_eq!(first.len(), 64);
    assert!(first.chars().all(|ch| ch.is_ascii_hexdigit()));
    assert_ne!(first, suite_fingerprint(&cases("down")).unwrap());

    let mut relaxed = cases("up");
    relaxed[0].tolerance = Some(Tolerance::new(1.0, 1.0));
    assert_eq!(first, suite_fingerprint(&relaxed).unwrap());
}

/// Verifies pass percentage over mixed outcomes.
#[test]
fn pass_percentage_counts_all_results() {
    let mut summary = RunSummary::default();
    assert!(summary.pass_percentage().abs() < f64::EPSILON);
    summary.record(promql_compliance_core::Outcome::Success);
    summary.record(promql_compliance_core::Outcome::Unsupported);
    summary.record(promql_compliance_core::Outcome::Mismatch);
    summary.record(promql_compliance_core::Outcome::Success);
    assert!((summary.pass_percentage() - 50.0).abs() < 1e-9);
    assert_eq!(summary.failed(), 1);
}
