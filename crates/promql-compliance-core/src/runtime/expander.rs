// crates/promql-compliance-core/src/runtime/expander.rs
// ============================================================================
// Module: Test-Case Expander
// Description: Cartesian expansion of query templates over a catalog.
// Purpose: Produce the ordered, deterministic test-case matrix for a run.
// Dependencies: thiserror, crate::core, crate::runtime::tweaker
// ============================================================================

//! ## Overview
//! For each template, in declaration order, the expander orders the
//! referenced placeholders by catalog position and enumerates the Cartesian
//! product of their values with the last placeholder varying fastest. Tweaks
//! are consulted only to adjust the query window and to mark skipped roles;
//! query rewriting happens later, per target, in the comparer.
//!
//! Invariants:
//! - Expansion is pure: identical inputs yield identical sequences.
//! - No two test cases share a (template, substitution tuple) key.
//! - Configuration errors surface before any test case is produced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::PlaceholderCatalog;
use crate::core::QueryTemplate;
use crate::core::QueryWindow;
use crate::core::Substitution;
use crate::core::TemplateError;
use crate::core::TestCase;
use crate::core::WindowError;
use crate::runtime::tweaker::QueryTweaker;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum number of test cases a suite may expand into.
pub const MAX_EXPANDED_CASES: usize = 1_000_000;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised during expansion.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// A template is malformed.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// A template references a placeholder missing from the catalog.
    #[error("template {template}: unknown placeholder {placeholder}")]
    UnknownPlaceholder {
        /// Template name.
        template: String,
        /// Placeholder name.
        placeholder: String,
    },
    /// A referenced placeholder has no values.
    #[error("template {template}: placeholder {placeholder} has no values")]
    EmptyPlaceholder {
        /// Template name.
        template: String,
        /// Placeholder name.
        placeholder: String,
    },
    /// Two templates share a name.
    #[error("duplicate template name: {0}")]
    DuplicateTemplate(String),
    /// The window is malformed.
    #[error("invalid query window: {0}")]
    Window(#[from] WindowError),
    /// The product exceeds [`MAX_EXPANDED_CASES`].
    #[error("template {template}: expansion exceeds {limit} test cases")]
    TooManyCases {
        /// Template at which the limit was crossed.
        template: String,
        /// Case limit.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Expansion
// ============================================================================

/// Expands templates into the ordered test-case sequence.
///
/// # Errors
///
/// Returns [`ExpandError`] for malformed templates, unknown or empty
/// placeholders, duplicate template names, invalid windows, or oversize
/// expansions.
pub fn expand_test_cases(
    templates: &[QueryTemplate],
    catalog: &PlaceholderCatalog,
    tweaker: &QueryTweaker,
    window: QueryWindow,
) -> Result<Vec<TestCase>, ExpandError> {
    window.validate()?;
    let mut names = BTreeSet::new();
    let mut plans = Vec::with_capacity(templates.len());
    let mut total: usize = 0;
    for template in templates {
        if !names.insert(template.name.as_str()) {
            return Err(ExpandError::DuplicateTemplate(template.name.clone()));
        }
        let axes = template_axes(template, catalog)?;
        let count = axes
            .iter()
            .try_fold(1_usize, |acc, (_, values)| acc.checked_mul(values.len()))
            .and_then(|count| total.checked_add(count))
            .filter(|count| *count <= MAX_EXPANDED_CASES)
            .ok_or_else(|| ExpandError::TooManyCases {
                template: template.name.clone(),
                limit: MAX_EXPANDED_CASES,
            })?;
        total = count;
        plans.push((template, axes));
    }

    let mut cases = Vec::with_capacity(total);
    for (template, axes) in plans {
        let mut indices = vec![0_usize; axes.len()];
        loop {
            cases.push(build_case(template, &axes, &indices, tweaker, window)?);
            if !advance(&mut indices, &axes) {
                break;
            }
        }
    }
    Ok(cases)
}

/// Placeholder name and ordered values for one product axis.
type Axis<'a> = (&'a str, &'a [String]);

/// Resolves the template's placeholders into catalog-ordered axes.
fn template_axes<'a>(
    template: &QueryTemplate,
    catalog: &'a PlaceholderCatalog,
) -> Result<Vec<Axis<'a>>, ExpandError> {
    let mut positioned = Vec::new();
    for name in template.placeholders()? {
        let Some(position) = catalog.position(&name) else {
            return Err(ExpandError::UnknownPlaceholder {
                template: template.name.clone(),
                placeholder: name,
            });
        };
        positioned.push(position);
    }
    positioned.sort_unstable();
    let mut axes = Vec::with_capacity(positioned.len());
    for placeholder in catalog.iter().enumerate().filter_map(|(position, placeholder)| {
        positioned.binary_search(&position).is_ok().then_some(placeholder)
    }) {
        if placeholder.values.is_empty() {
            return Err(ExpandError::EmptyPlaceholder {
                template: template.name.clone(),
                placeholder: placeholder.name.clone(),
            });
        }
        axes.push((placeholder.name.as_str(), placeholder.values.as_slice()));
    }
    Ok(axes)
}

/// Advances the odometer; returns false after the last tuple.
fn advance(indices: &mut [usize], axes: &[Axis<'_>]) -> bool {
    for position in (0 .. indices.len()).rev() {
        indices[position] += 1;
        if indices[position] < axes[position].1.len() {
            return true;
        }
        indices[position] = 0;
    }
    false
}

/// Renders one tuple into a test case.
fn build_case(
    template: &QueryTemplate,
    axes: &[Axis<'_>],
    indices: &[usize],
    tweaker: &QueryTweaker,
    window: QueryWindow,
) -> Result<TestCase, ExpandError> {
    let bindings: Vec<(&str, &str)> = axes
        .iter()
        .zip(indices)
        .map(|((name, values), index)| (*name, values[*index].as_str()))
        .collect();
    let query = template.render(&bindings)?;
    let window = tweaker.adjusted_window(&template.name, &query, window);
    let skipped_for = tweaker.skipped_roles(&template.name, &query);
    Ok(TestCase {
        template: template.name.clone(),
        window,
        kind: template.kind,
        should_fail: template.should_fail,
        skip_comparison: template.skip_comparison,
        tolerance: template.tolerance,
        note: template.note.clone(),
        substitutions: bindings
            .iter()
            .map(|(placeholder, value)| Substitution {
                placeholder: (*placeholder).to_string(),
                value: (*value).to_string(),
            })
            .collect(),
        skipped_for,
        query,
    })
}
