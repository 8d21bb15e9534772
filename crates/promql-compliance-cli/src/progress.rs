// crates/promql-compliance-cli/src/progress.rs
// ============================================================================
// Module: Run Progress Printer
// Description: Throttled `[done/total]` progress lines for long runs.
// Purpose: Show run progress on stderr without flooding it.
// Dependencies: promql-compliance-core
// ============================================================================

//! ## Overview
//! [`ProgressPrinter`] writes a progress line each time another tenth of the
//! suite completes and once more when the last case finishes. Write failures
//! are ignored; progress output never affects the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;
use std::sync::PoisonError;

use promql_compliance_core::ProgressObserver;

use crate::t;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of progress lines emitted over a full run (excluding the final one).
const PROGRESS_STEPS: usize = 10;

// ============================================================================
// SECTION: Printer
// ============================================================================

/// Progress observer writing throttled lines to `W`.
pub struct ProgressPrinter<W> {
    /// Destination, shared between workers.
    writer: Mutex<W>,
}

impl<W: Write + Send> ProgressPrinter<W> {
    /// Creates a printer writing to `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the destination, consuming the printer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns whether a line is due after `completed` of `total` cases.
#[must_use]
pub fn progress_due(completed: usize, total: usize) -> bool {
    if total == 0 || completed == 0 {
        return false;
    }
    let interval = (total / PROGRESS_STEPS).max(1);
    completed == total || completed % interval == 0
}

impl<W: Write + Send> ProgressObserver for ProgressPrinter<W> {
    fn case_completed(&self, completed: usize, total: usize) {
        if !progress_due(completed, total) {
            return;
        }
        let line = t!("run.progress", done = completed, total = total);
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(writer, "{line}");
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used, reason = "Test fixtures use explicit asserts and unwraps for clarity.")]

    use super::*;

    /// Verifies at most one line per tenth of the run plus the final one.
    #[test]
    fn lines_are_throttled() {
        let printer = ProgressPrinter::new(Vec::new());
        for completed in 1 ..= 95 {
            printer.case_completed(completed, 95);
        }
        let output = String::from_utf8(printer.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "[9/95]");
        assert_eq!(lines[9], "[90/95]");
        assert_eq!(lines[10], "[95/95]");
    }

    /// Verifies small runs report every case.
    #[test]
    fn small_runs_report_each_case() {
        assert!(progress_due(1, 3));
        assert!(progress_due(3, 3));
        assert!(!progress_due(0, 3));
        assert!(!progress_due(0, 0));
        assert!(!progress_due(3, 40));
        assert!(progress_due(4, 40));
        assert!(progress_due(40, 40));
    }
}
