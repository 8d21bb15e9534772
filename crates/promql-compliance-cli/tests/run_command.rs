// crates/promql-compliance-cli/tests/run_command.rs
// ============================================================================
// Module: CLI Run Tests
// Description: End-to-end runs of the tester binary against local targets.
// Purpose: Ensure flags, reports, exit codes, and setup failures behave.
// Dependencies: promql-compliance-cli binary, tempfile, tiny_http, serde_json
// ============================================================================
//! ## Overview
//! Serves both targets from one `tiny_http` server: requests under `/ref`
//! act as the reference and requests under `/test` as the engine under test.
//! The test side answers `max` queries with a different value so a run
//! yields one passing and one mismatching case.

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;
use std::thread;

use tempfile::TempDir;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Path of the compiled tester binary.
fn tester_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_promql-compliance-tester"))
}

/// Starts a server answering every query, returning its base URL.
fn start_targets() -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    thread::spawn(move || {
        for request in server.incoming_requests() {
            let url = request.url().to_string();
            let value = if url.starts_with("/test") && url.contains("max") { "2" } else { "1" };
            let body = format!(
                r#"{{"status":"success","data":{{"resultType":"matrix","result":[{{"metric":{{"job":"api"}},"values":[[1700000000,"{value}"]]}}]}}}}"#
            );
            let response = Response::from_string(body)
                .with_header(Header::from_bytes("Content-Type", "application/json").unwrap());
            let _ = request.respond(response);
        }
    });
    format!("http://{addr}")
}

/// Writes a two-case suite pointing at `base` and returns its path.
fn write_config(dir: &TempDir, base: &str) -> PathBuf {
    let path = dir.path().join("suite.toml");
    let config = format!(
        r#"
[reference_target]
query_url = "{base}/ref"

[test_target]
query_url = "{base}/test"

[logging]
sink = "none"

[[test_cases]]
query = "sum(x)"

[[test_cases]]
query = "max(x)"
"#
    );
    fs::write(&path, config).unwrap();
    path
}

/// Runs the tester with `args` and a clean environment.
fn run_tester(args: &[&str]) -> Output {
    Command::new(tester_bin())
        .args(args)
        .env_remove("PROMQL_COMPLIANCE_LANG")
        .env_remove("PROMQL_COMPLIANCE_CONFIG")
        .env_remove("INSIGHTS_COLLECTOR_URL")
        .env_remove("INSIGHTS_INSERT_KEY")
        .env_remove("PROMQL_COMPLIANCE_EVENT_TYPE")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .output()
        .unwrap()
}

/// Renders `path` as a command-line argument.
fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies `--version` prints the binary name and version.
#[test]
fn version_flag_prints_version() {
    let output = run_tester(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim(), format!("promql-compliance-tester {}", env!("CARGO_PKG_VERSION")));
}

/// Verifies a missing config file fails before any query runs.
#[test]
fn missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    let output = run_tester(&["--config-file", &path_arg(&missing)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to load configuration"), "{stderr}");
    assert!(output.stdout.is_empty());
}

/// Verifies a text run reports the mismatch and still exits successfully.
#[test]
fn text_run_reports_failures() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, &start_targets());
    let output = run_tester(&["--config-file", &path_arg(&config)]);
    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(output.status.success(), "{stderr}");
    assert!(stdout.contains("QUERY: max(x)"), "{stdout}");
    assert!(stdout.contains("OUTCOME: mismatch"));
    assert!(!stdout.contains("QUERY: sum(x)"));
    assert!(stdout.contains("Total: 1 / 2 (50.00%) passed, 0 unsupported"));
    assert!(stderr.contains("Running 2 test cases"), "{stderr}");
    assert!(stderr.contains("[2/2]"), "{stderr}");
}

/// Verifies the JSON report with passing cases and a concurrency override.
#[test]
fn json_run_includes_passing() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, &start_targets());
    let output = run_tester(&[
        "--config-file",
        &path_arg(&config),
        "--output-format",
        "json",
        "--output-passing",
        "--concurrency",
        "2",
    ]);
    assert!(output.status.success());
    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["summary"]["total"], 2);
    assert_eq!(document["summary"]["passed"], 1);
    assert_eq!(document["results"].as_array().unwrap().len(), 2);
    assert_eq!(document["results"][0]["outcome"], "success");
    assert_eq!(document["results"][1]["outcome"], "mismatch");
    assert_eq!(document["cancelled"], false);
}

/// Verifies an out-of-range concurrency override fails the run.
#[test]
fn invalid_concurrency_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, &start_targets());
    let output = run_tester(&["--config-file", &path_arg(&config), "--concurrency", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("concurrency must be between 1 and 64"), "{stderr}");
}

/// Verifies the event format requires telemetry settings before running.
#[test]
fn event_format_without_telemetry_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "http://127.0.0.1:9");
    let output = run_tester(&["--config-file", &path_arg(&config), "--output-format", "event"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("event reporter"), "{stderr}");
    assert!(!stderr.contains("Running"), "{stderr}");
}

/// Verifies the Catalan locale prints the translation disclaimer.
#[test]
fn catalan_locale_prints_disclaimer() {
    let output = run_tester(&["--lang", "ca", "--version"]);
    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("Nota:"), "{stderr}");
}
