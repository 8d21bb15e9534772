// crates/promql-compliance-output/src/event.rs
// ============================================================================
// Module: Telemetry Event Reporter
// Description: Posts one JSON event per result to a telemetry collector.
// Purpose: Track compliance results over time in an external event store.
// Dependencies: promql-compliance-core, promql-compliance-http, rand,
//               reqwest, serde, serde_json, time
// ============================================================================

//! ## Overview
//! Every result of the run (passing or not) becomes one event tagged with a
//! random run id and the run timestamp. Events are posted with the
//! `X-Insert-Key` header. Delivery failures never fail the report: each one
//! is recorded as a `report_delivery_failed` run event and counted in the
//! closing summary. Long diffs and tweak notes are truncated on a character
//! boundary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use promql_compliance_core::ComparisonResult;
use promql_compliance_core::NoopEventSink;
use promql_compliance_core::QueryRequest;
use promql_compliance_core::ReportDeliveryEvent;
use promql_compliance_core::RunEventSink;
use promql_compliance_http::query_request_url;
use rand::RngCore;
use rand::rngs::OsRng;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::report::ReportError;
use crate::report::Reporter;
use crate::report::RunReport;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the collector insert key.
pub const INSERT_KEY_HEADER: &str = "X-Insert-Key";
/// Maximum bytes kept from diffs and tweak notes.
pub const MAX_EVENT_TEXT_BYTES: usize = 4096;
/// Per-event delivery timeout.
const DELIVERY_TIMEOUT_MS: u64 = 10_000;

// ============================================================================
// SECTION: Event Payload
// ============================================================================

/// One telemetry event.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TelemetryEvent<'a> {
    /// Collector event type.
    event_type: &'a str,
    /// Random run id shared by all events of a run.
    test_id: &'a str,
    /// Run timestamp, RFC 3339.
    test_time_stamp: &'a str,
    /// Test case id.
    test_case: String,
    /// Concrete query.
    query: &'a str,
    /// Equivalent GET request against the test target.
    get_request_test_target: String,
    /// Equivalent GET request against the reference target.
    get_request_reference_target: String,
    /// Window start, RFC 3339.
    start: String,
    /// Window end, RFC 3339.
    end: String,
    /// Step in milliseconds.
    step: i64,
    /// Whether the case passed.
    passed: bool,
    /// `passed`, `unsupported`, or `failed`.
    result: &'static str,
    /// Detailed outcome label.
    outcome: &'static str,
    /// Reference succeeded on an expected failure.
    unexpected_success: bool,
    /// A target failed unexpectedly.
    unexpected_failure: bool,
    /// Truncated diff or error text.
    diff: &'a str,
    /// Truncated tweak notes.
    query_tweaks: &'a str,
    /// Reference target URL.
    reference_target_query_url: &'a str,
    /// Test target URL.
    test_target_query_url: &'a str,
}

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// Reporter posting results to a telemetry collector.
pub struct EventReporter {
    /// Collector endpoint.
    collector_url: Url,
    /// Insert key header value.
    insert_key: String,
    /// Event type attached to each event.
    event_type: String,
    /// HTTP client used for delivery.
    client: Client,
    /// Sink receiving delivery failures.
    events: Arc<dyn RunEventSink>,
}

impl EventReporter {
    /// Creates a reporter for the given collector settings.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Config`] when the collector URL or insert key
    /// is missing or invalid.
    pub fn new(
        collector_url: Option<&str>,
        insert_key: Option<&str>,
        event_type: &str,
    ) -> Result<Self, ReportError> {
        let collector_url = collector_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ReportError::Config("telemetry collector url is not set".to_string()))?;
        let insert_key = insert_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ReportError::Config("telemetry insert key is not set".to_string()))?;
        let collector_url = Url::parse(collector_url)
            .map_err(|err| ReportError::Config(format!("invalid collector url: {err}")))?;
        let client = Client::builder()
            .timeout(Duration::from_millis(DELIVERY_TIMEOUT_MS))
            .redirect(Policy::none())
            .build()
            .map_err(|_| ReportError::Config("http client build failed".to_string()))?;
        Ok(Self {
            collector_url,
            insert_key: insert_key.to_string(),
            event_type: event_type.to_string(),
            client,
            events: Arc::new(NoopEventSink),
        })
    }

    /// Routes delivery failures to `events`.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn RunEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Posts one event, returning a failure description when delivery fails.
    fn deliver(&self, event: &TelemetryEvent<'_>) -> Result<(), String> {
        let body = serde_json::to_vec(event).map_err(|err| format!("serialization failed: {err}"))?;
        let response = self
            .client
            .post(self.collector_url.clone())
            .header(INSERT_KEY_HEADER, &self.insert_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|err| format!("request failed: {err}"))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(format!("collector responded with status {}", status.as_u16()))
        }
    }
}

impl Reporter for EventReporter {
    fn name(&self) -> &'static str {
        "event"
    }

    fn report(&self, report: &RunReport<'_>, out: &mut dyn Write) -> Result<(), ReportError> {
        let run_id = new_run_id();
        let run_timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|err| ReportError::Serialize(err.to_string()))?;
        let notes = report.tweak_notes.join(", ");
        let query_tweaks = truncate_utf8(&notes, MAX_EVENT_TEXT_BYTES);
        let reference_base = Url::parse(report.reference_url).ok();
        let test_base = Url::parse(report.test_url).ok();

        let mut failed = 0_usize;
        for result in report.results {
            let detail = crate::report::failure_detail(result).unwrap_or_default();
            let event = TelemetryEvent {
                event_type: &self.event_type,
                test_id: &run_id,
                test_time_stamp: &run_timestamp,
                test_case: result.test_case.id(),
                query: &result.test_case.query,
                get_request_test_target: request_url(test_base.as_ref(), result, &result.test_query),
                get_request_reference_target: request_url(
                    reference_base.as_ref(),
                    result,
                    &result.reference_query,
                ),
                start: format_rfc3339_ms(result.test_case.window.start_ms),
                end: format_rfc3339_ms(result.test_case.window.end_ms),
                step: result.test_case.window.step_ms,
                passed: result.success(),
                result: result_label(result),
                outcome: result.outcome.as_str(),
                unexpected_success: result.unexpected_success(),
                unexpected_failure: result.unexpected_failure(),
                diff: truncate_utf8(&detail, MAX_EVENT_TEXT_BYTES),
                query_tweaks,
                reference_target_query_url: report.reference_url,
                test_target_query_url: report.test_url,
            };
            if let Err(detail) = self.deliver(&event) {
                failed += 1;
                self.events.record_report_delivery(&ReportDeliveryEvent::new(
                    self.name(),
                    format!("{}: {detail}", event.test_case),
                ));
            }
        }

        writeln!(out, "{}", "=".repeat(80))?;
        writeln!(out, "Test Run ID: {run_id}")?;
        writeln!(out, "{}", report.total_line())?;
        writeln!(
            out,
            "Delivered: {} / {} events, {failed} failed",
            report.results.len() - failed,
            report.results.len()
        )?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns a 128-bit random run id as lowercase hex.
#[must_use]
pub fn new_run_id() -> String {
    let mut bytes = [0_u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Truncates `value` to at most `max_bytes` without splitting a character.
#[must_use]
pub fn truncate_utf8(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[.. end]
}

/// Classifies a result as `passed`, `unsupported`, or `failed`.
const fn result_label(result: &ComparisonResult) -> &'static str {
    match result.outcome {
        promql_compliance_core::Outcome::Success => "passed",
        promql_compliance_core::Outcome::Unsupported => "unsupported",
        _ => "failed",
    }
}

/// Builds the GET request URL a target would receive for `query`.
fn request_url(base: Option<&Url>, result: &ComparisonResult, query: &str) -> String {
    base.map(|base| {
        let request = QueryRequest {
            query: query.to_string(),
            kind: result.test_case.kind,
            window: result.test_case.window,
        };
        query_request_url(base, &request).to_string()
    })
    .unwrap_or_default()
}

/// Formats Unix milliseconds as RFC 3339, or an empty string when out of range.
fn format_rfc3339_ms(millis: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .ok()
        .and_then(|timestamp| timestamp.format(&Rfc3339).ok())
        .unwrap_or_default()
}
