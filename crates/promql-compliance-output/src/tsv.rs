// crates/promql-compliance-output/src/tsv.rs
// ============================================================================
// Module: TSV Reporter
// Description: Tab-separated report, one row per result.
// Purpose: Allow spreadsheet and shell-pipeline analysis of a run.
// Dependencies: promql-compliance-core
// ============================================================================

//! ## Overview
//! Writes a header row followed by one row per selected result. Tabs and
//! line breaks inside fields are replaced by spaces so every result stays on
//! one line.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use crate::report::ReportError;
use crate::report::Reporter;
use crate::report::RunReport;
use crate::report::failure_detail;

/// Column names in output order.
pub const TSV_HEADER: [&str; 5] = ["query", "outcome", "failed_target", "duration_ms", "diff"];

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// Tab-separated values reporter.
#[derive(Debug, Default, Clone, Copy)]
pub struct TsvReporter;

impl Reporter for TsvReporter {
    fn name(&self) -> &'static str {
        "tsv"
    }

    fn report(&self, report: &RunReport<'_>, out: &mut dyn Write) -> Result<(), ReportError> {
        writeln!(out, "{}", TSV_HEADER.join("\t"))?;
        for result in report.selected() {
            let detail = failure_detail(result).unwrap_or_default();
            let first_line = detail.lines().next().unwrap_or_default();
            let failed_target = result.failed_target.map(|role| role.as_str()).unwrap_or_default();
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}",
                sanitize(&result.test_case.query),
                result.outcome.as_str(),
                failed_target,
                result.duration_ms,
                sanitize(first_line)
            )?;
        }
        Ok(())
    }
}

/// Replaces field and record separators with spaces.
fn sanitize(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
