// crates/promql-compliance-core/tests/tweaker.rs
// ============================================================================
// Module: Query Tweaker Tests
// Description: Rule validation, rewrite precedence, and scoping.
// Purpose: Ensure tweaks rewrite only what they declare, per target.
// Dependencies: promql-compliance-core
// ============================================================================
//! ## Overview
//! Exercises rule validation failures, first-wins rewrite precedence with
//! additive stacking, role scoping, and comparison adjustments.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use promql_compliance_core::PlaceholderCatalog;
use promql_compliance_core::QueryRewrite;
use promql_compliance_core::QueryTemplate;
use promql_compliance_core::QueryTweak;
use promql_compliance_core::QueryTweaker;
use promql_compliance_core::TargetRole;
use promql_compliance_core::TestCase;
use promql_compliance_core::Tolerance;
use promql_compliance_core::TweakError;
use promql_compliance_core::TweakScope;
use promql_compliance_core::expand_test_cases;

fn rewrite(scope: TweakScope, note: &str, find: &str, replace: &str) -> QueryTweak {
    let mut tweak = QueryTweak::new(scope, note);
    tweak.rewrite = Some(QueryRewrite::new(find, replace));
    tweak
}

fn case(query: &str, tweaker: &QueryTweaker) -> TestCase {
    expand_test_cases(
        &[QueryTemplate::new("t", query)],
        &PlaceholderCatalog::default(),
        tweaker,
        common::window(),
    )
    .unwrap()
    .remove(0)
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Verifies malformed rules are rejected with their position.
#[test]
fn malformed_rules_are_rejected() {
    let no_action = QueryTweak::new(TweakScope::Both, "nothing");
    assert_eq!(
        QueryTweaker::new(vec![no_action]).unwrap_err(),
        TweakError::NoAction {
            index: 0,
        }
    );

    let ok = rewrite(TweakScope::Both, "fine", "a", "b");
    let empty_find = rewrite(TweakScope::Both, "empty", "", "b");
    assert_eq!(
        QueryTweaker::new(vec![ok, empty_find]).unwrap_err(),
        TweakError::EmptyFind {
            index: 1,
        }
    );

    let growing = rewrite(TweakScope::Both, "grows", "rate", "irate");
    assert!(matches!(
        QueryTweaker::new(vec![growing]).unwrap_err(),
        TweakError::NonIdempotentRewrite { .. }
    ));

    let unnamed = rewrite(TweakScope::Both, "  ", "a", "b");
    assert!(matches!(
        QueryTweaker::new(vec![unnamed]).unwrap_err(),
        TweakError::MissingNote { .. }
    ));

    let mut negative = QueryTweak::new(TweakScope::Both, "loose");
    negative.value_tolerance = Some(Tolerance::new(-1.0, 0.0));
    assert!(matches!(
        QueryTweaker::new(vec![negative]).unwrap_err(),
        TweakError::InvalidTolerance { .. }
    ));
}

// ============================================================================
// SECTION: Rewrites
// ============================================================================

/// Verifies the first matching non-additive rewrite wins and additive ones
/// stack.
#[test]
fn first_matching_rewrite_wins_and_additive_rewrites_stack() {
    let tweaker = QueryTweaker::new(vec![
        rewrite(TweakScope::Test, "no match", "absent_text", "z"),
        rewrite(TweakScope::Test, "first", "sum(", "sum without() ("),
        rewrite(TweakScope::Test, "shadowed", "rate(", "increase("),
        {
            let mut additive = rewrite(TweakScope::Test, "stacked", "[5m]", "[6m]");
            additive.additive = true;
            additive
        },
    ])
    .unwrap();
    let case = case("sum(rate(x[5m]))", &tweaker);

    let test = tweaker.tweak(&case, TargetRole::Test);
    assert_eq!(test.query, "sum without() (rate(x[6m]))");
    let notes: Vec<&str> = test.applied.iter().map(|applied| applied.note.as_str()).collect();
    assert_eq!(notes, vec!["first", "stacked"]);
    assert!(!test.skipped());

    let reference = tweaker.tweak(&case, TargetRole::Reference);
    assert_eq!(reference.query, "sum(rate(x[5m]))");
    assert!(reference.applied.is_empty());
}

/// Verifies applying a tweaked query again changes nothing.
#[test]
fn rewrites_are_idempotent() {
    let tweaker = QueryTweaker::new(vec![rewrite(TweakScope::Both, "n", "holt_winters", "hw")])
        .unwrap();
    let first = tweaker.tweak(&case("holt_winters(x[1m], 0.1, 0.1)", &tweaker), TargetRole::Test);
    let second = tweaker.tweak(&case(&first.query, &tweaker), TargetRole::Test);
    assert_eq!(first.query, second.query);
}

/// Verifies rewrites whose output can form the search text again are rejected.
#[test]
fn overlapping_rewrites_are_rejected() {
    // "abb" would become "ab" and then "a".
    let shrinking = QueryRewrite::new("ab", "a");
    assert_eq!(shrinking.apply(&shrinking.apply("abb")), "a");
    assert!(!shrinking.is_idempotent());
    assert!(matches!(
        QueryTweaker::new(vec![rewrite(TweakScope::Both, "n", "ab", "a")]).unwrap_err(),
        TweakError::NonIdempotentRewrite {
            index: 0,
            ..
        }
    ));

    for (find, replace) in [("ab", "b"), ("ab", "ba"), ("abc", "b"), ("ab", ""), ("==", "=")] {
        assert!(!QueryRewrite::new(find, replace).is_idempotent(), "{find} -> {replace}");
    }
    for (find, replace) in [("x", ""), ("[5m]", "[6m]"), ("rate(", "increase("), ("holt_winters", "hw")] {
        assert!(QueryRewrite::new(find, replace).is_idempotent(), "{find} -> {replace}");
    }
}

/// Verifies skip rules report the skipping note for scoped roles only.
#[test]
fn skip_rules_apply_to_their_scope() {
    let mut skip = QueryTweak::new(TweakScope::Reference, "reference lacks feature");
    skip.skip = true;
    skip.no_bug = true;
    let tweaker = QueryTweaker::new(vec![skip]).unwrap();
    let case = case("up", &tweaker);

    let reference = tweaker.tweak(&case, TargetRole::Reference);
    assert_eq!(reference.skip.as_deref(), Some("reference lacks feature"));
    assert!(reference.applied[0].no_bug);
    assert!(!tweaker.tweak(&case, TargetRole::Test).skipped());
}

// ============================================================================
// SECTION: Adjustments
// ============================================================================

/// Verifies label drops are per role and the first tolerance override wins.
#[test]
fn adjustments_collect_label_drops_and_tolerance() {
    let mut drop = QueryTweak::new(TweakScope::Test, "extra label");
    drop.drop_result_labels = vec!["instance".to_string()];
    let mut loose = QueryTweak::new(TweakScope::Both, "float drift");
    loose.value_tolerance = Some(Tolerance::new(0.01, 0.0));
    let mut looser = QueryTweak::new(TweakScope::Both, "more drift");
    looser.value_tolerance = Some(Tolerance::new(1.0, 0.0));
    let tweaker = QueryTweaker::new(vec![drop, loose, looser]).unwrap();

    let adjustments = tweaker.adjustments(&case("up", &tweaker));
    assert!(adjustments.drop_labels(TargetRole::Reference).is_empty());
    assert_eq!(adjustments.drop_labels(TargetRole::Test), ["instance".to_string()]);
    assert_eq!(adjustments.tolerance, Some(Tolerance::new(0.01, 0.0)));
    assert_eq!(tweaker.notes(), vec!["extra label", "float drift", "more drift"]);
}
