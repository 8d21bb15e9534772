// crates/promql-compliance-output/src/json.rs
// ============================================================================
// Module: JSON Reporter
// Description: Machine-readable report as a single JSON document.
// Purpose: Feed run results to downstream tooling.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Serializes the whole [`RunReport`] (summary, fingerprint, tweak notes, and
//! the selected results) as one pretty-printed JSON object.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use promql_compliance_core::ComparisonResult;
use promql_compliance_core::RunSummary;
use serde::Serialize;

use crate::report::ReportError;
use crate::report::Reporter;
use crate::report::RunReport;

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// JSON document reporter.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReporter;

/// Serialized report shape.
#[derive(Serialize)]
struct JsonDocument<'a> {
    /// Outcome counts.
    summary: RunSummary,
    /// Pass percentage over all results.
    pass_percentage: f64,
    /// Suite fingerprint.
    fingerprint: &'a str,
    /// Reference target URL.
    reference_url: &'a str,
    /// Test target URL.
    test_url: &'a str,
    /// Configured tweak notes.
    tweak_notes: &'a [String],
    /// Whether the run stopped early.
    cancelled: bool,
    /// Selected results.
    results: Vec<&'a ComparisonResult>,
}

impl Reporter for JsonReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn report(&self, report: &RunReport<'_>, out: &mut dyn Write) -> Result<(), ReportError> {
        let document = JsonDocument {
            summary: report.summary,
            pass_percentage: report.summary.pass_percentage(),
            fingerprint: report.fingerprint,
            reference_url: report.reference_url,
            test_url: report.test_url,
            tweak_notes: &report.tweak_notes,
            cancelled: report.cancelled,
            results: report.selected().collect(),
        };
        serde_json::to_writer_pretty(&mut *out, &document)
            .map_err(|err| ReportError::Serialize(err.to_string()))?;
        writeln!(out)?;
        Ok(())
    }
}
