// crates/promql-compliance-output/tests/common/mod.rs
// ============================================================================
// Module: Output Test Support
// Description: Fixture results and report builders for reporter tests.
// Purpose: Render reporters over a fixed, mixed-outcome run.
// Dependencies: promql-compliance-core, promql-compliance-output
// ============================================================================
//! ## Overview
//! Builds one result per outcome so each reporter sees passing, failing,
//! unsupported, and errored cases.

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared test helpers are not used by every test binary."
)]

use promql_compliance_core::AppliedTweak;
use promql_compliance_core::ComparisonResult;
use promql_compliance_core::Outcome;
use promql_compliance_core::QueryData;
use promql_compliance_core::QueryKind;
use promql_compliance_core::QueryResponse;
use promql_compliance_core::QueryWindow;
use promql_compliance_core::RunSummary;
use promql_compliance_core::Sample;
use promql_compliance_core::Substitution;
use promql_compliance_core::TargetError;
use promql_compliance_core::TargetReply;
use promql_compliance_core::TargetRole;
use promql_compliance_core::TestCase;
use promql_compliance_output::RunReport;

/// Reference URL used in fixtures.
pub const REFERENCE_URL: &str = "http://reference:9090";
/// Test URL used in fixtures.
pub const TEST_URL: &str = "http://test:9090/prometheus";

/// Builds a test case for `query`.
pub fn case(template: &str, query: &str) -> TestCase {
    TestCase {
        template: template.to_string(),
        query: query.to_string(),
        window: QueryWindow::new(1_700_000_000_000, 1_700_000_600_000, 10_000).unwrap(),
        kind: QueryKind::Range,
        should_fail: false,
        skip_comparison: false,
        tolerance: None,
        note: None,
        substitutions: vec![Substitution {
            placeholder: "range".to_string(),
            value: "5m".to_string(),
        }],
        skipped_for: Vec::new(),
    }
}

fn data() -> TargetReply {
    TargetReply::Data(QueryResponse::new(QueryData::Scalar(Sample::new(0, 1.0))))
}

/// Builds a result with the given outcome and diff.
pub fn result(query: &str, outcome: Outcome, diff: Option<&str>) -> ComparisonResult {
    ComparisonResult {
        test_case: case("t", query),
        reference_query: query.to_string(),
        test_query: query.to_string(),
        reference: data(),
        test: data(),
        outcome,
        failed_target: None,
        diff: diff.map(str::to_string),
        tweaks: Vec::new(),
        duration_ms: 12,
    }
}

/// One result per interesting outcome.
pub fn mixed_results() -> Vec<ComparisonResult> {
    let mut failure = result("rate(x[5m])", Outcome::UnexpectedFailure, None);
    failure.failed_target = Some(TargetRole::Test);
    failure.test = TargetReply::Failed(TargetError::Api {
        error_type: "bad_data".to_string(),
        message: "unknown function <rate>".to_string(),
    });
    let mut unsupported = result("holt_winters(x[5m], 0.5, 0.5)", Outcome::Unsupported, Some("not implemented"));
    unsupported.tweaks.push(AppliedTweak {
        role: TargetRole::Test,
        note: "not implemented".to_string(),
        no_bug: false,
    });
    vec![
        result("sum(x)", Outcome::Success, None),
        result("max(x)", Outcome::Mismatch, Some("value mismatch {} @1700000000.000: expected 1, actual 2\nmissing series {job=\"db\"}")),
        unsupported,
        failure,
    ]
}

/// Builds a report over `results`.
pub fn report(results: &[ComparisonResult], include_passing: bool) -> RunReport<'_> {
    RunReport {
        summary: RunSummary::from_results(results),
        fingerprint: "abc123",
        reference_url: REFERENCE_URL,
        test_url: TEST_URL,
        tweak_notes: vec!["not implemented".to_string(), "<b>escaped</b>".to_string()],
        cancelled: false,
        include_passing,
        results,
    }
}

/// Renders `report` with `reporter` into a string.
pub fn render<R: promql_compliance_output::Reporter>(reporter: &R, report: &RunReport<'_>) -> String {
    let mut out = Vec::new();
    reporter.report(report, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}
