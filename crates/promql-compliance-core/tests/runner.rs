// crates/promql-compliance-core/tests/runner.rs
// ============================================================================
// Module: Runner Tests
// Description: Ordering, cancellation, progress, and fatal errors.
// Purpose: Ensure results follow input order under any concurrency.
// Dependencies: promql-compliance-core
// ============================================================================
//! ## Overview
//! Runs generated suites with randomized per-call latency and verifies the
//! result order, summary counts, fingerprint stability, cancellation prefix,
//! and error propagation.

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

use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use common::ScriptedTarget;
use promql_compliance_core::CancellationFlag;
use promql_compliance_core::Comparer;
use promql_compliance_core::ComparerConfig;
use promql_compliance_core::Outcome;
use promql_compliance_core::Placeholder;
use promql_compliance_core::PlaceholderCatalog;
use promql_compliance_core::ProgressObserver;
use promql_compliance_core::QueryData;
use promql_compliance_core::QueryResponse;
use promql_compliance_core::QueryTemplate;
use promql_compliance_core::QueryTweaker;
use promql_compliance_core::QueryWindow;
use promql_compliance_core::RunError;
use promql_compliance_core::RunOptions;
use promql_compliance_core::Runner;
use promql_compliance_core::Sample;
use promql_compliance_core::TestCase;
use promql_compliance_core::expand_test_cases;
use promql_compliance_core::suite_fingerprint;

fn suite() -> Vec<TestCase> {
    let catalog = PlaceholderCatalog::new(vec![Placeholder::new(
        "n",
        (0 .. 24).map(|value| value.to_string()),
    )])
    .unwrap();
    expand_test_cases(
        &[QueryTemplate::new("scalar", "scalar({{n}})")],
        &catalog,
        &QueryTweaker::default(),
        common::window(),
    )
    .unwrap()
}

/// Target echoing the number in `scalar(N)` after a query-dependent delay.
fn echo(name: &str, offset: f64) -> ScriptedTarget {
    ScriptedTarget::new(name, move |request| {
        let digits: String = request.query.chars().filter(char::is_ascii_digit).collect();
        let value: u64 = digits.parse().unwrap();
        thread::sleep(Duration::from_millis((value * 7) % 5));
        Ok(QueryResponse::new(QueryData::Scalar(Sample::new(0, value as f64 + offset))))
    })
}

struct RecordingProgress(Mutex<Vec<usize>>);

impl ProgressObserver for RecordingProgress {
    fn case_completed(&self, completed: usize, _total: usize) {
        self.0.lock().unwrap().push(completed);
    }
}

/// Verifies output order equals input order for every concurrency level.
#[test]
fn results_follow_input_order() {
    let cases = suite();
    let reference = echo("ref", 0.0);
    let test = echo("test", 0.0);
    let comparer =
        Comparer::new(&reference, &test, QueryTweaker::default(), ComparerConfig::default());
    for concurrency in [1, 4, 64] {
        let outcome = Runner::new(&comparer, RunOptions {
            concurrency,
        })
        .run(&cases)
        .unwrap();
        let ids: Vec<String> = outcome.results.iter().map(|result| result.test_case.id()).collect();
        let expected: Vec<String> = cases.iter().map(TestCase::id).collect();
        assert_eq!(ids, expected);
        assert_eq!(outcome.summary.total, 24);
        assert_eq!(outcome.summary.passed, 24);
        assert!(!outcome.cancelled);
        assert_eq!(outcome.fingerprint, suite_fingerprint(&cases).unwrap());
    }
}

/// Verifies summary counts and progress notifications.
#[test]
fn summary_and_progress_are_reported() {
    let cases = suite();
    let reference = echo("ref", 0.0);
    let test = echo("test", 1.0);
    let comparer =
        Comparer::new(&reference, &test, QueryTweaker::default(), ComparerConfig::default());
    let progress = Arc::new(RecordingProgress(Mutex::new(Vec::new())));
    let outcome = Runner::new(&comparer, RunOptions {
        concurrency: 3,
    })
    .with_progress(progress.clone())
    .run(&cases)
    .unwrap();
    assert_eq!(outcome.summary.mismatched, 24);
    assert_eq!(outcome.summary.failed(), 24);
    assert!(outcome.results.iter().all(|result| result.outcome == Outcome::Mismatch));
    let mut seen = progress.0.lock().unwrap().clone();
    seen.sort_unstable();
    assert_eq!(seen, (1 ..= 24).collect::<Vec<_>>());
}

/// Verifies a cancelled run returns the completed prefix.
#[test]
fn cancellation_returns_completed_prefix() {
    let cases = suite();
    let cancellation = CancellationFlag::new();
    let trigger = cancellation.clone();
    let reference = ScriptedTarget::new("ref", move |request| {
        if request.query == "scalar(5)" {
            trigger.cancel();
        }
        Ok(QueryResponse::new(QueryData::Scalar(Sample::new(0, 1.0))))
    });
    let test = echo("test", 0.0);
    let comparer =
        Comparer::new(&reference, &test, QueryTweaker::default(), ComparerConfig::default());
    let outcome = Runner::new(&comparer, RunOptions::default())
        .with_cancellation(cancellation)
        .run(&cases)
        .unwrap();
    assert!(outcome.cancelled);
    assert_eq!(outcome.results.len(), 6);
    assert_eq!(outcome.summary.total, 6);
    assert_eq!(outcome.results[5].test_case.query, "scalar(5)");
}

/// Verifies invalid concurrency and compare errors abort the run.
#[test]
fn fatal_errors_abort_the_run() {
    let target = echo("t", 0.0);
    let comparer =
        Comparer::new(&target, &target, QueryTweaker::default(), ComparerConfig::default());
    let err = Runner::new(&comparer, RunOptions {
        concurrency: 0,
    })
    .run(&suite())
    .unwrap_err();
    assert!(matches!(err, RunError::InvalidConcurrency(0)));

    let mut cases = suite();
    cases[3].window = QueryWindow {
        start_ms: 0,
        end_ms: 10,
        step_ms: -1,
    };
    let err = Runner::new(&comparer, RunOptions {
        concurrency: 2,
    })
    .run(&cases)
    .unwrap_err();
    assert!(matches!(err, RunError::Compare(_)));
}

/// Verifies an empty suite completes with zero counts.
#[test]
fn empty_suite_completes() {
    let target = echo("t", 0.0);
    let comparer =
        Comparer::new(&target, &target, QueryTweaker::default(), ComparerConfig::default());
    let outcome = Runner::new(&comparer, RunOptions::default()).run(&[]).unwrap();
    assert!(outcome.results.is_empty());
    assert!(!outcome.cancelled);
    assert!(outcome.summary.pass_percentage().abs() < f64::EPSILON);
}
