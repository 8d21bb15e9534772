// crates/promql-compliance-output/src/text.rs
// ============================================================================
// Module: Text Reporter
// Description: Human-readable terminal report.
// Purpose: Show failing cases with their evidence and a final pass rate.
// Dependencies: promql-compliance-core
// ============================================================================

//! ## Overview
//! Each selected result is printed as a ruled block naming the query, the
//! window, the outcome, and the diff or target error. The report ends with
//! the configured tweak notes and the total line.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;

use promql_compliance_core::ComparisonResult;

use crate::report::ReportError;
use crate::report::Reporter;
use crate::report::RunReport;
use crate::report::describe_window;
use crate::report::failure_detail;

/// Width of the separator rules.
const RULE_WIDTH: usize = 80;

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// Plain-text reporter.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReporter;

impl Reporter for TextReporter {
    fn name(&self) -> &'static str {
        "text"
    }

    fn report(&self, report: &RunReport<'_>, out: &mut dyn Write) -> Result<(), ReportError> {
        for result in report.selected() {
            write_result(result, out)?;
        }
        if !report.tweak_notes.is_empty() {
            writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
            writeln!(out, "General query tweaks:")?;
            for note in &report.tweak_notes {
                writeln!(out, "*  {note}")?;
            }
        }
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "{}", report.total_line())?;
        Ok(())
    }
}

/// Writes one result block.
fn write_result(result: &ComparisonResult, out: &mut dyn Write) -> Result<(), ReportError> {
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(out, "QUERY: {}", result.test_case.query)?;
    if result.test_query != result.test_case.query {
        writeln!(out, "TEST QUERY: {}", result.test_query)?;
    }
    if result.reference_query != result.test_case.query {
        writeln!(out, "REFERENCE QUERY: {}", result.reference_query)?;
    }
    writeln!(out, "CASE: {}", result.test_case.id())?;
    writeln!(out, "WINDOW: {}", describe_window(result))?;
    writeln!(out, "OUTCOME: {}", result.outcome.as_str())?;
    if let Some(role) = result.failed_target {
        writeln!(out, "FAILED TARGET: {}", role.as_str())?;
    }
    for tweak in &result.tweaks {
        writeln!(out, "TWEAK ({}): {}", tweak.role.as_str(), tweak.note)?;
    }
    if let Some(detail) = failure_detail(result) {
        writeln!(out, "RESULT:")?;
        writeln!(out, "{detail}")?;
    }
    Ok(())
}
