// crates/promql-compliance-core/src/core/tweak.rs
// ============================================================================
// Module: Query Tweaks
// Description: Declarative rules that rewrite, skip, or relax test cases.
// Purpose: Encode known, accepted incompatibilities between targets.
// Dependencies: serde, thiserror, crate::core::{target, tolerance}
// ============================================================================

//! ## Overview
//! A [`QueryTweak`] pairs a matcher with a scope and a set of actions. Rules
//! are validated once at load time and never mutated afterwards.
//!
//! Invariants:
//! - Every rule carries a non-empty note and at least one action.
//! - A rewrite never searches for empty text.
//! - A rewrite replacement never overlaps its own search text, and deletions
//!   only remove single characters, so no occurrence of the search text can
//!   form in the output and repeated application is a no-op after the first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::target::TargetRole;
use crate::core::tolerance::Tolerance;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised for malformed tweak rules.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TweakError {
    /// The rule has no note.
    #[error("query tweak {index}: note must be non-empty")]
    MissingNote {
        /// Rule position in declaration order.
        index: usize,
    },
    /// The rule has no action.
    #[error("query tweak {index}: at least one action is required")]
    NoAction {
        /// Rule position in declaration order.
        index: usize,
    },
    /// The rewrite search text is empty.
    #[error("query tweak {index}: rewrite find text must be non-empty")]
    EmptyFind {
        /// Rule position in declaration order.
        index: usize,
    },
    /// The rewrite output can contain its search text again.
    #[error("query tweak {index}: rewrite `{find}` -> `{replace}` can reintroduce its find text")]
    NonIdempotentRewrite {
        /// Rule position in declaration order.
        index: usize,
        /// Search text.
        find: String,
        /// Replacement text.
        replace: String,
    },
    /// `additive` was set without a rewrite.
    #[error("query tweak {index}: additive requires a rewrite")]
    AdditiveWithoutRewrite {
        /// Rule position in declaration order.
        index: usize,
    },
    /// The tolerance override is negative or not finite.
    #[error("query tweak {index}: value tolerance must be finite and non-negative")]
    InvalidTolerance {
        /// Rule position in declaration order.
        index: usize,
    },
    /// A label to drop is empty.
    #[error("query tweak {index}: dropped label names must be non-empty")]
    EmptyLabel {
        /// Rule position in declaration order.
        index: usize,
    },
}

// ============================================================================
// SECTION: Scope and Matcher
// ============================================================================

/// Targets a tweak applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TweakScope {
    /// Reference target only.
    Reference,
    /// Test target only.
    Test,
    /// Both targets.
    #[default]
    Both,
}

impl TweakScope {
    /// Returns true when the scope covers `role`.
    #[must_use]
    pub const fn applies_to(self, role: TargetRole) -> bool {
        matches!(
            (self, role),
            (Self::Both, _)
                | (Self::Reference, TargetRole::Reference)
                | (Self::Test, TargetRole::Test)
        )
    }
}

/// Selects the test cases a tweak applies to. Empty fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TweakMatcher {
    /// Exact template name.
    #[serde(default)]
    pub template: Option<String>,
    /// Substring of the concrete query.
    #[serde(default)]
    pub query_contains: Option<String>,
}

impl TweakMatcher {
    /// Returns true when the matcher selects the case.
    #[must_use]
    pub fn matches(&self, template: &str, query: &str) -> bool {
        self.template.as_deref().is_none_or(|name| name == template)
            && self.query_contains.as_deref().is_none_or(|needle| query.contains(needle))
    }
}

// ============================================================================
// SECTION: Rule
// ============================================================================

/// Literal text replacement applied to every occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryRewrite {
    /// Text to search for.
    pub find: String,
    /// Replacement text.
    pub replace: String,
}

impl QueryRewrite {
    /// Creates a rewrite.
    #[must_use]
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }

    /// Returns true when the rewrite changes `query`.
    #[must_use]
    pub fn applies(&self, query: &str) -> bool {
        query.contains(&self.find)
    }

    /// Applies the rewrite to `query`.
    #[must_use]
    pub fn apply(&self, query: &str) -> String {
        query.replace(&self.find, &self.replace)
    }

    /// Returns true when applying the rewrite twice equals applying it once.
    ///
    /// Any new occurrence of `find` in the output must touch a replacement.
    /// An empty replacement joins the text around it, which can only form
    /// `find` when it is longer than one character. A non-empty replacement
    /// must not contain `find`, sit inside it, or share a border with it.
    #[must_use]
    pub fn is_idempotent(&self) -> bool {
        let find = self.find.as_str();
        let replace = self.replace.as_str();
        if replace.is_empty() {
            return find.chars().nth(1).is_none();
        }
        if replace.contains(find) || find.contains(replace) {
            return false;
        }
        let borders = find.char_indices().skip(1).map(|(offset, _)| offset);
        for offset in borders {
            let (head, tail) = find.split_at(offset);
            if replace.ends_with(head) || replace.starts_with(tail) {
                return false;
            }
        }
        true
    }
}

/// An ordered query tweak rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryTweak {
    /// Case selector.
    #[serde(default)]
    pub matcher: TweakMatcher,
    /// Targets the rule applies to.
    #[serde(default)]
    pub scope: TweakScope,
    /// Human-readable explanation.
    pub note: String,
    /// The divergence is accepted rather than a test-target bug.
    #[serde(default)]
    pub no_bug: bool,
    /// Optional query rewrite.
    #[serde(default)]
    pub rewrite: Option<QueryRewrite>,
    /// The rewrite stacks with an earlier matching rewrite.
    #[serde(default)]
    pub additive: bool,
    /// Skip the case for the scoped targets.
    #[serde(default)]
    pub skip: bool,
    /// Labels removed from scoped results before matching.
    #[serde(default)]
    pub drop_result_labels: Vec<String>,
    /// Start the window one step later.
    #[serde(default)]
    pub ignore_first_step: bool,
    /// Truncate window bounds to a step multiple.
    #[serde(default)]
    pub align_timestamps_to_step: bool,
    /// Comparison tolerance override.
    #[serde(default)]
    pub value_tolerance: Option<Tolerance>,
}

impl QueryTweak {
    /// Creates a rule with a note and no actions; callers set actions on the
    /// returned value and then call [`QueryTweak::validate`].
    #[must_use]
    pub fn new(scope: TweakScope, note: impl Into<String>) -> Self {
        Self {
            matcher: TweakMatcher::default(),
            scope,
            note: note.into(),
            no_bug: false,
            rewrite: None,
            additive: false,
            skip: false,
            drop_result_labels: Vec::new(),
            ignore_first_step: false,
            align_timestamps_to_step: false,
            value_tolerance: None,
        }
    }

    /// Returns true when the rule selects the case for `role`.
    #[must_use]
    pub fn selects(&self, role: TargetRole, template: &str, query: &str) -> bool {
        self.scope.applies_to(role) && self.matcher.matches(template, query)
    }

    /// Returns true when the rule adjusts the query window.
    #[must_use]
    pub const fn adjusts_window(&self) -> bool {
        self.ignore_first_step || self.align_timestamps_to_step
    }

    /// Validates the rule at declaration position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`TweakError`] when the rule is malformed.
    pub fn validate(&self, index: usize) -> Result<(), TweakError> {
        if self.note.trim().is_empty() {
            return Err(TweakError::MissingNote {
                index,
            });
        }
        if let Some(rewrite) = &self.rewrite {
            if rewrite.find.is_empty() {
                return Err(TweakError::EmptyFind {
                    index,
                });
            }
            if !rewrite.is_idempotent() {
                return Err(TweakError::NonIdempotentRewrite {
                    index,
                    find: rewrite.find.clone(),
                    replace: rewrite.replace.clone(),
                });
            }
        } else if self.additive {
            return Err(TweakError::AdditiveWithoutRewrite {
                index,
            });
        }
        if self.value_tolerance.is_some_and(|tolerance| !tolerance.is_valid()) {
            return Err(TweakError::InvalidTolerance {
                index,
            });
        }
        if self.drop_result_labels.iter().any(|label| label.trim().is_empty()) {
            return Err(TweakError::EmptyLabel {
                index,
            });
        }
        let has_action = self.rewrite.is_some()
            || self.skip
            || !self.drop_result_labels.is_empty()
            || self.adjusts_window()
            || self.value_tolerance.is_some();
        if !has_action {
            return Err(TweakError::NoAction {
                index,
            });
        }
        Ok(())
    }
}
