// crates/promql-compliance-core/src/core/result.rs
// ============================================================================
// Module: Comparison Results
// Description: Per-case verdicts and whole-run summaries.
// Purpose: Carry comparison evidence from the comparer to reporters.
// Dependencies: serde, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! A [`ComparisonResult`] is created exactly once per test case by the
//! comparer and is read-only afterwards. [`RunSummary`] aggregates outcome
//! counts for reporting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::response::QueryResponse;
use crate::core::target::TargetRole;
use crate::core::test_case::TestCase;
use crate::interfaces::TargetError;

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Verdict for one test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Both targets agree (or the expected failure occurred).
    Success,
    /// Both targets answered but the results differ.
    Mismatch,
    /// A tweak marked the case as unsupported for a target.
    Unsupported,
    /// A query expected to fail succeeded, or only the test target answered.
    UnexpectedSuccess,
    /// A query expected to succeed failed.
    UnexpectedFailure,
}

impl Outcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Mismatch => "mismatch",
            Self::Unsupported => "unsupported",
            Self::UnexpectedSuccess => "unexpected_success",
            Self::UnexpectedFailure => "unexpected_failure",
        }
    }
}

// ============================================================================
// SECTION: Target Replies
// ============================================================================

/// What one target returned for a test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reply", rename_all = "snake_case")]
pub enum TargetReply {
    /// The target answered with data.
    Data(QueryResponse),
    /// The target call failed.
    Failed(TargetError),
    /// The target was not queried.
    NotQueried,
}

impl TargetReply {
    /// Returns the response when the target answered.
    #[must_use]
    pub const fn response(&self) -> Option<&QueryResponse> {
        match self {
            Self::Data(response) => Some(response),
            Self::Failed(_) | Self::NotQueried => None,
        }
    }

    /// Returns the error when the target call failed.
    #[must_use]
    pub const fn error(&self) -> Option<&TargetError> {
        match self {
            Self::Failed(err) => Some(err),
            Self::Data(_) | Self::NotQueried => None,
        }
    }
}

/// A tweak that changed how a case was evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedTweak {
    /// Target the tweak applied to.
    pub role: TargetRole,
    /// Tweak note.
    pub note: String,
    /// The divergence is accepted rather than a test-target bug.
    pub no_bug: bool,
}

// ============================================================================
// SECTION: Comparison Result
// ============================================================================

/// Verdict and evidence for one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    /// Originating test case.
    pub test_case: TestCase,
    /// Query text sent (or that would be sent) to the reference target.
    pub reference_query: String,
    /// Query text sent (or that would be sent) to the test target.
    pub test_query: String,
    /// Reference target reply.
    pub reference: TargetReply,
    /// Test target reply.
    pub test: TargetReply,
    /// Derived verdict.
    pub outcome: Outcome,
    /// Target that failed, for [`Outcome::UnexpectedFailure`].
    pub failed_target: Option<TargetRole>,
    /// Human-readable difference description.
    pub diff: Option<String>,
    /// Tweaks that applied to either target.
    pub tweaks: Vec<AppliedTweak>,
    /// Wall-clock duration of the comparison.
    pub duration_ms: u64,
}

impl ComparisonResult {
    /// Returns true exactly when the outcome is [`Outcome::Success`].
    #[must_use]
    pub fn success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    /// Returns true when a tweak marked the case unsupported.
    #[must_use]
    pub fn unsupported(&self) -> bool {
        self.outcome == Outcome::Unsupported
    }

    /// Returns true when the expected outcome did not occur because a query
    /// succeeded.
    #[must_use]
    pub fn unexpected_success(&self) -> bool {
        self.outcome == Outcome::UnexpectedSuccess
    }

    /// Returns true when a query that should have succeeded failed.
    #[must_use]
    pub fn unexpected_failure(&self) -> bool {
        self.outcome == Outcome::UnexpectedFailure
    }

    /// Returns true when any tweak applied.
    #[must_use]
    pub const fn tweaked(&self) -> bool {
        !self.tweaks.is_empty()
    }

    /// Returns the reply for `role`.
    #[must_use]
    pub const fn reply(&self, role: TargetRole) -> &TargetReply {
        match role {
            TargetRole::Reference => &self.reference,
            TargetRole::Test => &self.test,
        }
    }

    /// Returns the error reported by the failed target, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&TargetError> {
        self.failed_target.and_then(|role| self.reply(role).error())
    }
}

// ============================================================================
// SECTION: Run Summary
// ============================================================================

/// Outcome counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Results produced.
    pub total: usize,
    /// [`Outcome::Success`] results.
    pub passed: usize,
    /// [`Outcome::Mismatch`] results.
    pub mismatched: usize,
    /// [`Outcome::Unsupported`] results.
    pub unsupported: usize,
    /// [`Outcome::UnexpectedSuccess`] results.
    pub unexpected_success: usize,
    /// [`Outcome::UnexpectedFailure`] results.
    pub unexpected_failure: usize,
}

impl RunSummary {
    /// Counts outcomes over `results`.
    #[must_use]
    pub fn from_results(results: &[ComparisonResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.record(result.outcome);
        }
        summary
    }

    /// Adds one outcome to the counts.
    pub const fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Success => self.passed += 1,
            Outcome::Mismatch => self.mismatched += 1,
            Outcome::Unsupported => self.unsupported += 1,
            Outcome::UnexpectedSuccess => self.unexpected_success += 1,
            Outcome::UnexpectedFailure => self.unexpected_failure += 1,
        }
    }

    /// Results that neither passed nor were unsupported.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.mismatched + self.unexpected_success + self.unexpected_failure
    }

    /// Percentage of all results that passed; zero for an empty run.
    #[must_use]
    pub fn pass_percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let passed = f64::from(u32::try_from(self.passed).unwrap_or(u32::MAX));
        let total = f64::from(u32::try_from(self.total).unwrap_or(u32::MAX));
        100.0 * passed / total
    }
}
