// crates/promql-compliance-core/src/runtime/comparer.rs
// ============================================================================
// Module: Comparer
// Description: Runs one test case against both targets and derives a verdict.
// Purpose: Turn target replies into a classified, evidence-bearing result.
// Dependencies: thiserror, crate::{core, events, interfaces, runtime}
// ============================================================================

//! ## Overview
//! For each test case the comparer tweaks the query per target, short-circuits
//! skipped cases as unsupported without any outbound call, queries both
//! targets concurrently, and classifies the replies. A target that panics is
//! reported as a transport failure for its role. Target failures are data
//! and never escape as errors; [`CompareError`] is reserved for cases the
//! comparer cannot evaluate at all.
//!
//! Classification order:
//! 1. reference failed and the case should fail: success
//! 2. the case should fail but the reference succeeded: unexpected success
//! 3. reference failed and test failed: unexpected failure (reference)
//! 4. reference failed and test succeeded: unexpected success
//! 5. test failed: unexpected failure (test)
//! 6. comparison skipped: success
//! 7. otherwise: value-level equivalence

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use thiserror::Error;

use crate::core::AppliedTweak;
use crate::core::ComparisonResult;
use crate::core::Outcome;
use crate::core::QueryResponse;
use crate::core::TargetReply;
use crate::core::TargetRole;
use crate::core::TestCase;
use crate::core::Tolerance;
use crate::core::WindowError;
use crate::events::NoopEventSink;
use crate::events::RunEventSink;
use crate::events::TargetFailedEvent;
use crate::interfaces::QueryRequest;
use crate::interfaces::QueryTarget;
use crate::interfaces::TargetError;
use crate::runtime::equivalence::EquivalenceOptions;
use crate::runtime::equivalence::compare_query_data;
use crate::runtime::equivalence::render_diff;
use crate::runtime::tweaker::ComparisonAdjustments;
use crate::runtime::tweaker::QueryTweaker;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default number of diff entries rendered per result.
pub const DEFAULT_MAX_DIFF_ENTRIES: usize = 10;

/// Run-level comparison settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparerConfig {
    /// Run-wide tolerance; templates and tweaks may override it.
    pub tolerance: Tolerance,
    /// Maximum diff entries rendered per result.
    pub max_diff_entries: usize,
}

impl Default for ComparerConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            max_diff_entries: DEFAULT_MAX_DIFF_ENTRIES,
        }
    }
}

/// Errors that prevent a test case from being evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    /// The test case window is malformed.
    #[error("test case {test_case}: {source}")]
    InvalidWindow {
        /// Test case identifier.
        test_case: String,
        /// Window failure.
        source: WindowError,
    },
}

// ============================================================================
// SECTION: Comparer
// ============================================================================

/// Compares a reference target against a test target.
pub struct Comparer<R, T> {
    /// Trusted target.
    reference: R,
    /// Target under evaluation.
    test: T,
    /// Validated tweak rules.
    tweaker: QueryTweaker,
    /// Comparison settings.
    config: ComparerConfig,
    /// Run event sink.
    events: Arc<dyn RunEventSink>,
}

impl<R: QueryTarget, T: QueryTarget> Comparer<R, T> {
    /// Creates a comparer that logs nothing.
    #[must_use]
    pub fn new(reference: R, test: T, tweaker: QueryTweaker, config: ComparerConfig) -> Self {
        Self {
            reference,
            test,
            tweaker,
            config,
            events: Arc::new(NoopEventSink),
        }
    }

    /// Routes run events to `events`.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn RunEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Returns the tweak rules.
    #[must_use]
    pub const fn tweaker(&self) -> &QueryTweaker {
        &self.tweaker
    }

    /// Returns the run event sink.
    #[must_use]
    pub fn events(&self) -> &dyn RunEventSink {
        self.events.as_ref()
    }

    /// Returns the reference target.
    #[must_use]
    pub const fn reference(&self) -> &R {
        &self.reference
    }

    /// Returns the test target.
    #[must_use]
    pub const fn test(&self) -> &T {
        &self.test
    }

    /// Evaluates one test case.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError`] when the case cannot be evaluated.
    pub fn compare(&self, case: &TestCase) -> Result<ComparisonResult, CompareError> {
        case.window.validate().map_err(|source| CompareError::InvalidWindow {
            test_case: case.id(),
            source,
        })?;
        let started = Instant::now();
        let reference_tweak = self.tweaker.tweak(case, TargetRole::Reference);
        let test_tweak = self.tweaker.tweak(case, TargetRole::Test);
        let adjustments = self.tweaker.adjustments(case);
        let mut tweaks = Vec::new();
        for applied in reference_tweak
            .applied
            .iter()
            .chain(&test_tweak.applied)
            .chain(&adjustments.applied)
        {
            push_unique(&mut tweaks, applied);
        }

        let skipped = reference_tweak.skipped()
            || test_tweak.skipped()
            || TargetRole::ALL.into_iter().any(|role| case.is_skipped_for(role));
        if skipped {
            let note = reference_tweak.skip.clone().or_else(|| test_tweak.skip.clone());
            return Ok(ComparisonResult {
                test_case: case.clone(),
                reference_query: reference_tweak.query,
                test_query: test_tweak.query,
                reference: TargetReply::NotQueried,
                test: TargetReply::NotQueried,
                outcome: Outcome::Unsupported,
                failed_target: None,
                diff: note,
                tweaks,
                duration_ms: elapsed_ms(started),
            });
        }

        let reference_request = QueryRequest {
            query: reference_tweak.query.clone(),
            kind: case.kind,
            window: case.window,
        };
        let test_request = QueryRequest {
            query: test_tweak.query.clone(),
            kind: case.kind,
            window: case.window,
        };
        let (reference, test) = thread::scope(|scope| {
            let reference_call = scope.spawn(|| self.reference.query(&reference_request));
            let test_call = scope.spawn(|| self.test.query(&test_request));
            (
                joined(reference_call.join(), TargetRole::Reference),
                joined(test_call.join(), TargetRole::Test),
            )
        });
        self.log_failure(case, TargetRole::Reference, &reference);
        self.log_failure(case, TargetRole::Test, &test);

        let verdict = self.classify(case, &reference, &test, &adjustments);
        Ok(ComparisonResult {
            test_case: case.clone(),
            reference_query: reference_tweak.query,
            test_query: test_tweak.query,
            reference: into_reply(reference),
            test: into_reply(test),
            outcome: verdict.outcome,
            failed_target: verdict.failed_target,
            diff: verdict.diff,
            tweaks,
            duration_ms: elapsed_ms(started),
        })
    }

    /// Derives the verdict from both replies.
    fn classify(
        &self,
        case: &TestCase,
        reference: &Result<QueryResponse, TargetError>,
        test: &Result<QueryResponse, TargetError>,
        adjustments: &ComparisonAdjustments,
    ) -> Verdict {
        match (reference, test) {
            (Err(_), _) if case.should_fail => Verdict::outcome(Outcome::Success),
            (Ok(_), _) if case.should_fail => Verdict {
                outcome: Outcome::UnexpectedSuccess,
                failed_target: None,
                diff: Some("reference query succeeded but is expected to fail".to_string()),
            },
            (Err(err), Err(_)) => Verdict {
                outcome: Outcome::UnexpectedFailure,
                failed_target: Some(TargetRole::Reference),
                diff: Some(format!("reference query failed: {err}")),
            },
            (Err(err), Ok(_)) => Verdict {
                outcome: Outcome::UnexpectedSuccess,
                failed_target: None,
                diff: Some(format!("reference query failed but test query succeeded: {err}")),
            },
            (Ok(_), Err(err)) => Verdict {
                outcome: Outcome::UnexpectedFailure,
                failed_target: Some(TargetRole::Test),
                diff: Some(format!("test query failed: {err}")),
            },
            (Ok(_), Ok(_)) if case.skip_comparison => Verdict::outcome(Outcome::Success),
            (Ok(expected), Ok(actual)) => {
                let options = EquivalenceOptions {
                    tolerance: adjustments
                        .tolerance
                        .or(case.tolerance)
                        .unwrap_or(self.config.tolerance),
                    reference_drop_labels: adjustments.drop_labels(TargetRole::Reference),
                    test_drop_labels: adjustments.drop_labels(TargetRole::Test),
                };
                let entries = compare_query_data(&expected.data, &actual.data, &options);
                if entries.is_empty() {
                    Verdict::outcome(Outcome::Success)
                } else {
                    Verdict {
                        outcome: Outcome::Mismatch,
                        failed_target: None,
                        diff: Some(render_diff(&entries, self.config.max_diff_entries)),
                    }
                }
            }
        }
    }

    /// Emits a target-failed event for a failed call.
    fn log_failure(
        &self,
        case: &TestCase,
        role: TargetRole,
        reply: &Result<QueryResponse, TargetError>,
    ) {
        if let Err(err) = reply {
            self.events.record_target_failed(&TargetFailedEvent::new(
                case.id(),
                role,
                err.kind(),
                err.to_string(),
            ));
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Classification output.
struct Verdict {
    /// Derived outcome.
    outcome: Outcome,
    /// Target that failed, if any.
    failed_target: Option<TargetRole>,
    /// Difference description.
    diff: Option<String>,
}

impl Verdict {
    /// Verdict without supporting detail.
    const fn outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            failed_target: None,
            diff: None,
        }
    }
}

/// Converts a call result into a stored reply.
fn into_reply(result: Result<QueryResponse, TargetError>) -> TargetReply {
    match result {
        Ok(response) => TargetReply::Data(response),
        Err(err) => TargetReply::Failed(err),
    }
}

/// Appends `applied` unless an identical entry is already present.
fn push_unique(tweaks: &mut Vec<AppliedTweak>, applied: &AppliedTweak) {
    if !tweaks.contains(applied) {
        tweaks.push(applied.clone());
    }
}

/// Converts a panicked query thread into a transport failure for `role`.
fn joined(
    outcome: thread::Result<Result<QueryResponse, TargetError>>,
    role: TargetRole,
) -> Result<QueryResponse, TargetError> {
    outcome.unwrap_or_else(|_| {
        Err(TargetError::Transport {
            message: format!("{role} query thread panicked"),
        })
    })
}

/// Milliseconds elapsed since `started`.
fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
