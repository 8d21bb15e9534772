// crates/promql-compliance-core/src/events.rs
// ============================================================================
// Module: Run Events
// Description: Structured JSON-lines events emitted during a compliance run.
// Purpose: Log run progress without binding the core to a logging backend.
// Dependencies: serde, serde_json, crate::core
// ============================================================================

//! ## Overview
//! The runner and reporters emit run events through a [`RunEventSink`].
//! Events are serialized as one JSON object per line. Sink failures are
//! swallowed: logging never changes the outcome of a run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::Outcome;
use crate::core::RunSummary;
use crate::core::TargetRole;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Emitted once before the first comparison.
#[derive(Debug, Clone, Serialize)]
pub struct RunStartedEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Expanded test cases in the run.
    pub case_count: usize,
    /// Worker count.
    pub concurrency: usize,
    /// Suite fingerprint.
    pub fingerprint: String,
}

impl RunStartedEvent {
    /// Creates a run-started event stamped with the current time.
    #[must_use]
    pub fn new(case_count: usize, concurrency: usize, fingerprint: impl Into<String>) -> Self {
        Self {
            event: "run_started",
            timestamp_ms: now_ms(),
            case_count,
            concurrency,
            fingerprint: fingerprint.into(),
        }
    }
}

/// Emitted after each comparison completes.
#[derive(Debug, Clone, Serialize)]
pub struct CaseComparedEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Position of the case in the run.
    pub index: usize,
    /// Test case identifier.
    pub test_case: String,
    /// Comparison verdict.
    pub outcome: Outcome,
    /// Comparison duration.
    pub duration_ms: u64,
    /// Whether any tweak applied.
    pub tweaked: bool,
}

impl CaseComparedEvent {
    /// Creates a case-compared event stamped with the current time.
    #[must_use]
    pub fn new(
        index: usize,
        test_case: impl Into<String>,
        outcome: Outcome,
        duration_ms: u64,
        tweaked: bool,
    ) -> Self {
        Self {
            event: "case_compared",
            timestamp_ms: now_ms(),
            index,
            test_case: test_case.into(),
            outcome,
            duration_ms,
            tweaked,
        }
    }
}

/// Emitted when a target call fails.
#[derive(Debug, Clone, Serialize)]
pub struct TargetFailedEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Test case identifier.
    pub test_case: String,
    /// Target that failed.
    pub role: TargetRole,
    /// Normalized error kind label.
    pub error_kind: &'static str,
    /// Error detail.
    pub message: String,
}

impl TargetFailedEvent {
    /// Creates a target-failed event stamped with the current time.
    #[must_use]
    pub fn new(
        test_case: impl Into<String>,
        role: TargetRole,
        error_kind: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            event: "target_failed",
            timestamp_ms: now_ms(),
            test_case: test_case.into(),
            role,
            error_kind,
            message: message.into(),
        }
    }
}

/// Emitted once after the last comparison.
#[derive(Debug, Clone, Serialize)]
pub struct RunFinishedEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Outcome counts.
    pub summary: RunSummary,
    /// The run stopped early.
    pub cancelled: bool,
}

impl RunFinishedEvent {
    /// Creates a run-finished event stamped with the current time.
    #[must_use]
    pub fn new(summary: RunSummary, cancelled: bool) -> Self {
        Self {
            event: "run_finished",
            timestamp_ms: now_ms(),
            summary,
            cancelled,
        }
    }
}

/// Emitted when a reporter fails to deliver output.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDeliveryEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Reporter name.
    pub reporter: String,
    /// Failure detail.
    pub detail: String,
}

impl ReportDeliveryEvent {
    /// Creates a delivery-failure event stamped with the current time.
    #[must_use]
    pub fn new(reporter: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            event: "report_delivery_failed",
            timestamp_ms: now_ms(),
            reporter: reporter.into(),
            detail: detail.into(),
        }
    }
}

/// Returns the current time in milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Destination for run events.
pub trait RunEventSink: Send + Sync {
    /// Records a per-case event.
    fn record_case(&self, event: &CaseComparedEvent);

    /// Records the start of a run.
    fn record_run_started(&self, _event: &RunStartedEvent) {}

    /// Records a target failure.
    fn record_target_failed(&self, _event: &TargetFailedEvent) {}

    /// Records the end of a run.
    fn record_run_finished(&self, _event: &RunFinishedEvent) {}

    /// Records a reporter delivery failure.
    fn record_report_delivery(&self, _event: &ReportDeliveryEvent) {}
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Writes events as JSON lines to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrEventSink;

impl StderrEventSink {
    /// Serializes one event to stderr.
    fn emit<T: Serialize>(event: &T) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

impl RunEventSink for StderrEventSink {
    fn record_case(&self, event: &CaseComparedEvent) {
        Self::emit(event);
    }

    fn record_run_started(&self, event: &RunStartedEvent) {
        Self::emit(event);
    }

    fn record_target_failed(&self, event: &TargetFailedEvent) {
        Self::emit(event);
    }

    fn record_run_finished(&self, event: &RunFinishedEvent) {
        Self::emit(event);
    }

    fn record_report_delivery(&self, event: &ReportDeliveryEvent) {
        Self::emit(event);
    }
}

/// Appends events as JSON lines to a file.
pub struct FileEventSink {
    /// Open log file.
    file: Mutex<File>,
}

impl FileEventSink {
    /// Opens (or creates) the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Serializes one event to the file.
    fn emit<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl RunEventSink for FileEventSink {
    fn record_case(&self, event: &CaseComparedEvent) {
        self.emit(event);
    }

    fn record_run_started(&self, event: &RunStartedEvent) {
        self.emit(event);
    }

    fn record_target_failed(&self, event: &TargetFailedEvent) {
        self.emit(event);
    }

    fn record_run_finished(&self, event: &RunFinishedEvent) {
        self.emit(event);
    }

    fn record_report_delivery(&self, event: &ReportDeliveryEvent) {
        self.emit(event);
    }
}

/// Discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventSink;

impl RunEventSink for NoopEventSink {
    fn record_case(&self, _event: &CaseComparedEvent) {}
}
