// crates/promql-compliance-output/src/report.rs
// ============================================================================
// Module: Run Report
// Description: Read-only report model and the reporter contract.
// Purpose: Give every output format the same view of a finished run.
// Dependencies: promql-compliance-core, serde, thiserror
// ============================================================================

//! ## Overview
//! A [`RunReport`] borrows the results of a run together with the metadata
//! reporters need. Reporters only read it; they never mutate results.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Write;

use promql_compliance_core::ComparisonResult;
use promql_compliance_core::RunSummary;
use promql_compliance_core::format_unix_seconds;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Report
// ============================================================================

/// Everything a reporter may render about a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<'a> {
    /// Outcome counts.
    pub summary: RunSummary,
    /// Suite fingerprint.
    pub fingerprint: &'a str,
    /// Reference target URL.
    pub reference_url: &'a str,
    /// Test target URL.
    pub test_url: &'a str,
    /// Distinct notes of all configured tweak rules.
    pub tweak_notes: Vec<String>,
    /// Whether the run stopped early.
    pub cancelled: bool,
    /// Whether passing results are rendered too.
    #[serde(skip)]
    pub include_passing: bool,
    /// Results in test-case order.
    pub results: &'a [ComparisonResult],
}

impl RunReport<'_> {
    /// Returns the results selected for detailed rendering.
    pub fn selected(&self) -> impl Iterator<Item = &ComparisonResult> {
        let include_passing = self.include_passing;
        self.results.iter().filter(move |result| include_passing || !result.success())
    }

    /// Renders the summary line shared by text-based formats.
    #[must_use]
    pub fn total_line(&self) -> String {
        format!(
            "Total: {} / {} ({:.2}%) passed, {} unsupported",
            self.summary.passed,
            self.summary.total,
            self.summary.pass_percentage(),
            self.summary.unsupported
        )
    }
}

/// Renders the query window of a result as `start .. end step s`.
#[must_use]
pub fn describe_window(result: &ComparisonResult) -> String {
    let window = result.test_case.window;
    format!(
        "{} .. {} step {}s",
        format_unix_seconds(window.start_ms),
        format_unix_seconds(window.end_ms),
        format_unix_seconds(window.step_ms)
    )
}

/// Returns the most useful single-line explanation of a non-passing result.
#[must_use]
pub fn failure_detail(result: &ComparisonResult) -> Option<String> {
    if let Some(err) = result.failure() {
        return Some(err.to_string());
    }
    result.diff.clone()
}

// ============================================================================
// SECTION: Reporter Contract
// ============================================================================

/// Errors produced while rendering or delivering a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing to the output stream failed.
    #[error("report output failed: {0}")]
    Io(#[from] io::Error),
    /// Report serialization failed.
    #[error("report serialization failed: {0}")]
    Serialize(String),
    /// The HTML template could not be used.
    #[error("invalid html template: {0}")]
    Template(String),
    /// The reporter is missing required settings.
    #[error("reporter configuration error: {0}")]
    Config(String),
}

/// Renders a run report to an output stream.
pub trait Reporter {
    /// Returns a stable reporter name.
    fn name(&self) -> &'static str;

    /// Renders `report` into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when rendering or writing fails.
    fn report(&self, report: &RunReport<'_>, out: &mut dyn Write) -> Result<(), ReportError>;
}
