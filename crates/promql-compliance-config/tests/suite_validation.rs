// crates/promql-compliance-config/tests/suite_validation.rs
// ============================================================================
// Module: Suite Validation Tests
// Description: Structural validation of targets, run settings, and suites.
// Purpose: Ensure invalid configurations fail before any query runs.
// Dependencies: promql-compliance-config, promql-compliance-core
// ============================================================================
//! ## Overview
//! Each test starts from the minimal configuration, introduces one defect,
//! and checks that validation names it.

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

use std::collections::HashMap;

use promql_compliance_config::ComplianceConfig;
use promql_compliance_config::LogSinkKind;
use promql_compliance_config::TelemetryConfig;
use promql_compliance_core::PlaceholderCatalog;
use promql_compliance_core::QueryKind;
use promql_compliance_core::QueryTweaker;
use promql_compliance_core::Tolerance;
use promql_compliance_core::expand_test_cases;

fn invalid(extra: &str) -> String {
    ComplianceConfig::from_toml_str(&common::with_minimal(extra)).unwrap_err().to_string()
}

/// Verifies target URL and timeout checks.
#[test]
fn targets_are_validated() {
    let err = ComplianceConfig::from_toml_str(
        "[reference_target]\nquery_url = \"ftp://x\"\n[test_target]\nquery_url = \"http://y\"\n",
    )
    .unwrap_err();
    assert!(err.to_string().contains("reference_target.query_url"), "{err}");

    let err = ComplianceConfig::from_toml_str(
        "[reference_target]\nquery_url = \"http://x\"\n[test_target]\nquery_url = \"http://u:p@y\"\n",
    )
    .unwrap_err();
    assert!(err.to_string().contains("credentials"), "{err}");

    let err = ComplianceConfig::from_toml_str(
        "[reference_target]\nquery_url = \"http://x\"\ntimeout_ms = 50\n[test_target]\nquery_url = \"http://y\"\n",
    )
    .unwrap_err();
    assert!(err.to_string().contains("timeout_ms"), "{err}");
}

/// Verifies run and comparison bounds.
#[test]
fn run_and_comparison_bounds() {
    assert!(invalid("[run]\nconcurrency = 0\n").contains("run.concurrency"));
    assert!(invalid("[run]\nconcurrency = 65\n").contains("run.concurrency"));
    assert!(invalid("[run]\nstep_ms = 0\n").contains("run.step_ms"));
    assert!(invalid("[comparison]\nabsolute_tolerance = -1.0\n").contains("tolerances"));
    assert!(invalid("[comparison]\nmax_diff_entries = 0\n").contains("max_diff_entries"));
}

/// Verifies placeholder, template, and tweak errors name the offender.
#[test]
fn suite_errors_name_the_offender() {
    let err = invalid("[[test_cases]]\nquery = \"rate(x[{{range}}])\"\n");
    assert!(err.contains("unknown placeholder `range`"), "{err}");

    let err = invalid("[[placeholders]]\nname = \"r\"\nvalues = [\"1m\", \"1m\"]\n");
    assert!(err.contains("placeholders"), "{err}");

    let err = invalid(
        "[[test_cases]]\nname = \"a\"\nquery = \"up\"\n[[test_cases]]\nname = \"a\"\nquery = \"down\"\n",
    );
    assert!(err.contains("duplicate test case name `a`"), "{err}");

    let err = invalid("[[test_cases]]\nquery = \"sum({{\"\n");
    assert!(err.contains("test_cases[0]"), "{err}");

    let err = invalid(
        "[[query_tweaks]]\nnote = \"bad\"\n[query_tweaks.rewrite]\nfind = \"rate\"\nreplace = \"irate\"\n",
    );
    assert!(err.contains("query_tweaks"), "{err}");
}

/// Verifies logging and telemetry sections.
#[test]
fn logging_and_telemetry_sections() {
    assert!(invalid("[logging]\nsink = \"file\"\n").contains("logging.path"));
    assert!(invalid("[logging]\npath = \"x.jsonl\"\n").contains("logging.path"));
    assert!(invalid("[telemetry]\ncollector_url = \"nope\"\n").contains("collector_url"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let config = ComplianceConfig::from_toml_str(&common::with_minimal(&format!(
        "[logging]\nsink = \"file\"\npath = {:?}\n",
        path.display().to_string()
    )))
    .unwrap();
    assert_eq!(config.logging.sink, LogSinkKind::File);
    config.logging.build_sink().unwrap();
    assert!(path.exists());
}

/// Verifies environment overrides replace configured telemetry values.
#[test]
fn telemetry_env_overrides() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("INSIGHTS_COLLECTOR_URL", "https://collector.example.com/v1"),
        ("INSIGHTS_INSERT_KEY", "key-123"),
        ("PROMQL_COMPLIANCE_EVENT_TYPE", ""),
    ]);
    let telemetry = TelemetryConfig::default()
        .with_env_overrides(|name| env.get(name).map(|value| (*value).to_string()));
    assert_eq!(telemetry.collector_url.as_deref(), Some("https://collector.example.com/v1"));
    assert_eq!(telemetry.insert_key.as_deref(), Some("key-123"));
    assert_eq!(telemetry.event_type, "PromQLComplianceTestResult");
}

/// Verifies window derivation and the expanded suite.
#[test]
fn window_and_suite_drive_expansion() {
    let config = ComplianceConfig::from_toml_str(&common::with_minimal(
        r#"
[run]
step_ms = 15000
window_ms = 60000
end_offset_ms = 120000

[comparison]
absolute_tolerance = 0.5
relative_tolerance = 0.0
max_diff_entries = 3

[[placeholders]]
name = "agg"
values = ["sum", "max"]

[[placeholders]]
name = "range"
values = ["1m", "5m"]

[[test_cases]]
name = "agg_rate"
query = "{{agg}}(rate(http_requests_total[{{range}}]))"

[[test_cases]]
query = "time()"
query_type = "instant"
skip_comparison = true
tolerance = { absolute = 1.0, relative = 0.0 }
"#,
    ))
    .unwrap();

    let window = config.query_window(1_700_000_000_000).unwrap();
    assert_eq!(window.end_ms, 1_699_999_880_000);
    assert_eq!(window.start_ms, 1_699_999_820_000);
    assert_eq!(window.step_ms, 15_000);

    let comparer = config.comparer_config();
    assert_eq!(comparer.tolerance, Tolerance::new(0.5, 0.0));
    assert_eq!(comparer.max_diff_entries, 3);

    let suite = config.suite().unwrap();
    assert_eq!(suite.templates[1].name, "time()");
    assert_eq!(suite.templates[1].kind, QueryKind::Instant);
    let cases = expand_test_cases(&suite.templates, &suite.catalog, &suite.tweaker, window).unwrap();
    assert_eq!(cases.len(), 5);
    assert_eq!(cases[0].query, "sum(rate(http_requests_total[1m]))");
    assert_eq!(cases[3].query, "max(rate(http_requests_total[5m]))");
}

/// Verifies an empty suite is valid and expands to nothing.
#[test]
fn empty_suite_is_valid() {
    let config = ComplianceConfig::from_toml_str(common::MINIMAL_TOML).unwrap();
    let suite = config.suite().unwrap();
    assert!(suite.templates.is_empty());
    let window = config.query_window(10_000_000).unwrap();
    let cases = expand_test_cases(
        &suite.templates,
        &PlaceholderCatalog::default(),
        &QueryTweaker::default(),
        window,
    )
    .unwrap();
    assert!(cases.is_empty());
}
