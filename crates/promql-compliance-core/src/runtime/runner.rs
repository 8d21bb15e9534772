// crates/promql-compliance-core/src/runtime/runner.rs
// ============================================================================
// Module: Runner
// Description: Bounded-concurrency driver over the test-case sequence.
// Purpose: Compare every case while preserving input order in the output.
// Dependencies: thiserror, crate::{core, events, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Scoped worker threads claim case indices from an atomic cursor and store
//! each result in a pre-sized slot at its index, so output order equals input
//! order regardless of concurrency. Cancellation stops new claims; in-flight
//! comparisons finish and the completed prefix is returned. A
//! [`CompareError`] stops further claims and is returned once in-flight work
//! drains.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;

use thiserror::Error;

use crate::core::ComparisonResult;
use crate::core::HashError;
use crate::core::RunSummary;
use crate::core::TestCase;
use crate::core::suite_fingerprint;
use crate::events::CaseComparedEvent;
use crate::events::RunFinishedEvent;
use crate::events::RunStartedEvent;
use crate::interfaces::NoopProgress;
use crate::interfaces::ProgressObserver;
use crate::interfaces::QueryTarget;
use crate::runtime::comparer::CompareError;
use crate::runtime::comparer::Comparer;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Maximum number of concurrent comparisons.
pub const MAX_CONCURRENCY: usize = 64;

/// Runner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Concurrent comparisons, `1..=MAX_CONCURRENCY`.
    pub concurrency: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
        }
    }
}

/// Shared flag that stops a run from claiming new cases.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Creates an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    /// Concurrency is outside `1..=MAX_CONCURRENCY`.
    #[error("concurrency must be between 1 and 64, got {0}")]
    InvalidConcurrency(usize),
    /// The suite fingerprint could not be computed.
    #[error(transparent)]
    Fingerprint(#[from] HashError),
    /// A case could not be evaluated.
    #[error(transparent)]
    Compare(#[from] CompareError),
}

/// Results of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Results in input order (the completed prefix when cancelled).
    pub results: Vec<ComparisonResult>,
    /// Outcome counts over `results`.
    pub summary: RunSummary,
    /// Suite fingerprint of the full input sequence.
    pub fingerprint: String,
    /// The run stopped before every case completed.
    pub cancelled: bool,
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Drives a comparer over a test-case sequence.
pub struct Runner<'a, R, T> {
    /// Comparer shared by all workers.
    comparer: &'a Comparer<R, T>,
    /// Runner settings.
    options: RunOptions,
    /// Cancellation flag.
    cancellation: CancellationFlag,
    /// Progress observer.
    progress: Arc<dyn ProgressObserver>,
}

impl<'a, R: QueryTarget, T: QueryTarget> Runner<'a, R, T> {
    /// Creates a runner without progress reporting.
    #[must_use]
    pub fn new(comparer: &'a Comparer<R, T>, options: RunOptions) -> Self {
        Self {
            comparer,
            options,
            cancellation: CancellationFlag::new(),
            progress: Arc::new(NoopProgress),
        }
    }

    /// Uses `cancellation` to stop the run early.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Notifies `progress` after each completed case.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    /// Compares every case.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] for invalid options or when a case cannot be
    /// evaluated.
    pub fn run(&self, cases: &[TestCase]) -> Result<RunOutcome, RunError> {
        let concurrency = self.options.concurrency;
        if !(1 ..= MAX_CONCURRENCY).contains(&concurrency) {
            return Err(RunError::InvalidConcurrency(concurrency));
        }
        let fingerprint = suite_fingerprint(cases)?;
        let events = self.comparer.events();
        events.record_run_started(&RunStartedEvent::new(
            cases.len(),
            concurrency,
            fingerprint.clone(),
        ));

        let slots: Vec<OnceLock<ComparisonResult>> =
            (0 .. cases.len()).map(|_| OnceLock::new()).collect();
        let cursor = AtomicUsize::new(0);
        let completed = AtomicUsize::new(0);
        let halted = AtomicBool::new(false);
        let failure: Mutex<Option<(usize, CompareError)>> = Mutex::new(None);
        let workers = concurrency.min(cases.len());

        thread::scope(|scope| {
            for _ in 0 .. workers {
                scope.spawn(|| {
                    self.work(cases, &slots, &cursor, &completed, &halted, &failure);
                });
            }
        });

        let failure = failure.into_inner().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, err)) = failure {
            return Err(err.into());
        }
        let results: Vec<ComparisonResult> =
            slots.into_iter().map_while(OnceLock::into_inner).collect();
        let summary = RunSummary::from_results(&results);
        let cancelled = results.len() < cases.len();
        events.record_run_finished(&RunFinishedEvent::new(summary, cancelled));
        Ok(RunOutcome {
            results,
            summary,
            fingerprint,
            cancelled,
        })
    }

    /// Worker loop: claims indices until the sequence is exhausted, the run
    /// is cancelled, or a comparison error halts it.
    fn work(
        &self,
        cases: &[TestCase],
        slots: &[OnceLock<ComparisonResult>],
        cursor: &AtomicUsize,
        completed: &AtomicUsize,
        halted: &AtomicBool,
        failure: &Mutex<Option<(usize, CompareError)>>,
    ) {
        let events = self.comparer.events();
        loop {
            if halted.load(Ordering::Acquire) || self.cancellation.is_cancelled() {
                return;
            }
            let index = cursor.fetch_add(1, Ordering::AcqRel);
            let Some(case) = cases.get(index) else {
                return;
            };
            match self.comparer.compare(case) {
                Ok(result) => {
                    events.record_case(&CaseComparedEvent::new(
                        index,
                        case.id(),
                        result.outcome,
                        result.duration_ms,
                        result.tweaked(),
                    ));
                    if let Some(slot) = slots.get(index) {
                        let _ = slot.set(result);
                    }
                    let done = completed.fetch_add(1, Ordering::AcqRel) + 1;
                    self.progress.case_completed(done, cases.len());
                }
                Err(err) => {
                    halted.store(true, Ordering::Release);
                    let mut guard = failure.lock().unwrap_or_else(PoisonError::into_inner);
                    if guard.as_ref().is_none_or(|(first, _)| index < *first) {
                        *guard = Some((index, err));
                    }
                    return;
                }
            }
        }
    }
}
