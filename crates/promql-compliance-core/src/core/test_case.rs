// crates/promql-compliance-core/src/core/test_case.rs
// ============================================================================
// Module: Test Cases
// Description: Concrete, time-bounded queries produced by expansion.
// Purpose: Carry a query, its window, and its provenance to the comparer.
// Dependencies: serde, thiserror, crate::core::{target, template, tolerance}
// ============================================================================

//! ## Overview
//! A [`TestCase`] is created once by the expander and never mutated. Within
//! one run it is uniquely identified by its template name plus substitution
//! tuple, rendered by [`TestCase::id`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::target::TargetRole;
use crate::core::template::QueryKind;
use crate::core::tolerance::Tolerance;

// ============================================================================
// SECTION: Query Window
// ============================================================================

/// Errors raised for malformed query windows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// Step must be strictly positive.
    #[error("query step must be positive, got {0} ms")]
    NonPositiveStep(i64),
    /// End precedes start.
    #[error("query window end {end_ms} precedes start {start_ms}")]
    EndBeforeStart {
        /// Window start (Unix ms).
        start_ms: i64,
        /// Window end (Unix ms).
        end_ms: i64,
    },
}

/// Time window and resolution for a query.
///
/// # Invariants
/// - `step_ms > 0` and `start_ms <= end_ms` once validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryWindow {
    /// Window start, Unix milliseconds.
    pub start_ms: i64,
    /// Window end, Unix milliseconds.
    pub end_ms: i64,
    /// Resolution step in milliseconds.
    pub step_ms: i64,
}

impl QueryWindow {
    /// Creates a validated window.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError`] when the step or bounds are invalid.
    pub const fn new(start_ms: i64, end_ms: i64, step_ms: i64) -> Result<Self, WindowError> {
        let window = Self {
            start_ms,
            end_ms,
            step_ms,
        };
        match window.validate() {
            Ok(()) => Ok(window),
            Err(err) => Err(err),
        }
    }

    /// Checks the window invariants.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError`] when the step or bounds are invalid.
    pub const fn validate(&self) -> Result<(), WindowError> {
        if self.step_ms <= 0 {
            return Err(WindowError::NonPositiveStep(self.step_ms));
        }
        if self.end_ms < self.start_ms {
            return Err(WindowError::EndBeforeStart {
                start_ms: self.start_ms,
                end_ms: self.end_ms,
            });
        }
        Ok(())
    }

    /// Truncates start and end down to a multiple of the step.
    #[must_use]
    pub const fn aligned_to_step(self) -> Self {
        if self.step_ms <= 0 {
            return self;
        }
        Self {
            start_ms: self.start_ms.saturating_sub(self.start_ms.rem_euclid(self.step_ms)),
            end_ms: self.end_ms.saturating_sub(self.end_ms.rem_euclid(self.step_ms)),
            step_ms: self.step_ms,
        }
    }

    /// Moves the start forward by one step, never past the end.
    #[must_use]
    pub const fn without_first_step(self) -> Self {
        let start = self.start_ms.saturating_add(self.step_ms);
        Self {
            start_ms: if start > self.end_ms { self.end_ms } else { start },
            end_ms: self.end_ms,
            step_ms: self.step_ms,
        }
    }
}

// ============================================================================
// SECTION: Test Case
// ============================================================================

/// One placeholder binding that produced a test case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Substitution {
    /// Placeholder name.
    pub placeholder: String,
    /// Bound value.
    pub value: String,
}

/// A concrete, time-bounded query derived from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Originating template name.
    pub template: String,
    /// Concrete query text (before target tweaks).
    pub query: String,
    /// Query window and step.
    pub window: QueryWindow,
    /// Query API used.
    pub kind: QueryKind,
    /// The reference target is expected to reject the query.
    pub should_fail: bool,
    /// Only success/failure agreement is checked.
    pub skip_comparison: bool,
    /// Template-level tolerance override.
    pub tolerance: Option<Tolerance>,
    /// Template note, if any.
    pub note: Option<String>,
    /// Ordered placeholder bindings (catalog declaration order).
    pub substitutions: Vec<Substitution>,
    /// Roles a tweak marks as skipped for this case.
    pub skipped_for: Vec<TargetRole>,
}

impl TestCase {
    /// Returns the run-unique identifier: template name plus bindings.
    #[must_use]
    pub fn id(&self) -> String {
        if self.substitutions.is_empty() {
            return self.template.clone();
        }
        let bindings: Vec<String> = self
            .substitutions
            .iter()
            .map(|binding| format!("{}={}", binding.placeholder, binding.value))
            .collect();
        format!("{}[{}]", self.template, bindings.join(","))
    }

    /// Returns true when a tweak marked this case as skipped for `role`.
    #[must_use]
    pub fn is_skipped_for(&self, role: TargetRole) -> bool {
        self.skipped_for.contains(&role)
    }
}
