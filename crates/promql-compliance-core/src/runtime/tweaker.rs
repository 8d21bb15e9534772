// crates/promql-compliance-core/src/runtime/tweaker.rs
// ============================================================================
// Module: Query Tweaker
// Description: Applies ordered tweak rules to test cases per target.
// Purpose: Produce the query sent to each target plus comparison adjustments.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The tweaker is a sequential scan over an immutable, validated rule list.
//! Matchers always see the untweaked query, so rule selection does not depend
//! on earlier rewrites. Rewrites are exclusive: the first matching
//! non-additive rewrite for a target wins, while additive rewrites stack.
//!
//! Invariants:
//! - Rules are validated on construction and never mutated.
//! - Tweaking is deterministic and performs no I/O.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::AppliedTweak;
use crate::core::QueryTweak;
use crate::core::QueryWindow;
use crate::core::TargetRole;
use crate::core::TestCase;
use crate::core::Tolerance;
use crate::core::TweakError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Query text and skip decision for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweakedQuery {
    /// Query to send.
    pub query: String,
    /// Note of the rule that skips the case for this target.
    pub skip: Option<String>,
    /// Rules that rewrote or skipped the query.
    pub applied: Vec<AppliedTweak>,
}

impl TweakedQuery {
    /// Returns true when the case must not be sent to the target.
    #[must_use]
    pub const fn skipped(&self) -> bool {
        self.skip.is_some()
    }
}

/// Result-side adjustments requested by tweak rules for a test case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonAdjustments {
    /// Labels removed from reference series before matching.
    pub reference_drop_labels: Vec<String>,
    /// Labels removed from test series before matching.
    pub test_drop_labels: Vec<String>,
    /// Tolerance override from the first matching rule that sets one.
    pub tolerance: Option<Tolerance>,
    /// Rules that contributed adjustments.
    pub applied: Vec<AppliedTweak>,
}

impl ComparisonAdjustments {
    /// Returns the labels dropped for `role`.
    #[must_use]
    pub fn drop_labels(&self, role: TargetRole) -> &[String] {
        match role {
            TargetRole::Reference => &self.reference_drop_labels,
            TargetRole::Test => &self.test_drop_labels,
        }
    }
}

// ============================================================================
// SECTION: Tweaker
// ============================================================================

/// Ordered, validated tweak rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryTweaker {
    /// Rules in declaration order.
    rules: Vec<QueryTweak>,
}

impl QueryTweaker {
    /// Validates and wraps an ordered rule list.
    ///
    /// # Errors
    ///
    /// Returns [`TweakError`] for the first malformed rule.
    pub fn new(rules: Vec<QueryTweak>) -> Result<Self, TweakError> {
        for (index, rule) in rules.iter().enumerate() {
            rule.validate(index)?;
        }
        Ok(Self {
            rules,
        })
    }

    /// Returns the rules in declaration order.
    #[must_use]
    pub fn rules(&self) -> &[QueryTweak] {
        &self.rules
    }

    /// Returns the distinct rule notes in declaration order.
    #[must_use]
    pub fn notes(&self) -> Vec<&str> {
        let mut notes: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !notes.contains(&rule.note.as_str()) {
                notes.push(rule.note.as_str());
            }
        }
        notes
    }

    /// Returns the query to send to `role` and whether the case is skipped.
    #[must_use]
    pub fn tweak(&self, case: &TestCase, role: TargetRole) -> TweakedQuery {
        let mut query = case.query.clone();
        let mut skip = None;
        let mut exclusive_applied = false;
        let mut applied = Vec::new();
        for rule in self.selected(role, &case.template, &case.query) {
            let mut changed = false;
            if rule.skip && skip.is_none() {
                skip = Some(rule.note.clone());
                changed = true;
            }
            if let Some(rewrite) = &rule.rewrite
                && (rule.additive || !exclusive_applied)
                && rewrite.applies(&query)
            {
                query = rewrite.apply(&query);
                exclusive_applied |= !rule.additive;
                changed = true;
            }
            if changed {
                applied.push(applied_tweak(rule, role));
            }
        }
        TweakedQuery {
            query,
            skip,
            applied,
        }
    }

    /// Returns the result-side adjustments for a case.
    #[must_use]
    pub fn adjustments(&self, case: &TestCase) -> ComparisonAdjustments {
        let mut adjustments = ComparisonAdjustments::default();
        for role in TargetRole::ALL {
            for rule in self.selected(role, &case.template, &case.query) {
                let mut changed = false;
                if !rule.drop_result_labels.is_empty() {
                    let labels = match role {
                        TargetRole::Reference => &mut adjustments.reference_drop_labels,
                        TargetRole::Test => &mut adjustments.test_drop_labels,
                    };
                    for label in &rule.drop_result_labels {
                        if !labels.contains(label) {
                            labels.push(label.clone());
                        }
                    }
                    changed = true;
                }
                if let Some(tolerance) = rule.value_tolerance {
                    adjustments.tolerance.get_or_insert(tolerance);
                    changed = true;
                }
                changed |= rule.adjusts_window();
                if changed {
                    adjustments.applied.push(applied_tweak(rule, role));
                }
            }
        }
        adjustments
    }

    /// Returns the window after matching window rules: alignment to the step
    /// first, then dropping the first step.
    #[must_use]
    pub fn adjusted_window(&self, template: &str, query: &str, window: QueryWindow) -> QueryWindow {
        let mut align = false;
        let mut ignore_first = false;
        for rule in self.rules.iter().filter(|rule| rule.matcher.matches(template, query)) {
            align |= rule.align_timestamps_to_step;
            ignore_first |= rule.ignore_first_step;
        }
        let mut adjusted = window;
        if align {
            adjusted = adjusted.aligned_to_step();
        }
        if ignore_first {
            adjusted = adjusted.without_first_step();
        }
        adjusted
    }

    /// Returns the roles for which a skip rule selects the case.
    #[must_use]
    pub fn skipped_roles(&self, template: &str, query: &str) -> Vec<TargetRole> {
        TargetRole::ALL
            .into_iter()
            .filter(|role| {
                self.rules.iter().any(|rule| rule.skip && rule.selects(*role, template, query))
            })
            .collect()
    }

    /// Iterates rules selecting the case for `role`.
    fn selected<'a>(
        &'a self,
        role: TargetRole,
        template: &'a str,
        query: &'a str,
    ) -> impl Iterator<Item = &'a QueryTweak> + 'a {
        self.rules.iter().filter(move |rule| rule.selects(role, template, query))
    }
}

/// Records a rule application for `role`.
fn applied_tweak(rule: &QueryTweak, role: TargetRole) -> AppliedTweak {
    AppliedTweak {
        role,
        note: rule.note.clone(),
        no_bug: rule.no_bug,
    }
}
