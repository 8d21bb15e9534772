// crates/promql-compliance-cli/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Exercises the translation catalog and placeholder substitution.
// Purpose: Ensure CLI user-facing strings route through stable i18n helpers.
// Dependencies: promql-compliance-cli i18n module and the `t!` macro.
// ============================================================================

//! ## Overview
//! Validates the compliance tester i18n catalog behavior:
//! - Message arguments capture key/value substitutions.
//! - Translation falls back to keys on misses.
//! - The [`t!`](promql_compliance_cli::t) macro formats placeholders correctly.

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use promql_compliance_cli::i18n::MessageArg;
use promql_compliance_cli::i18n::translate;
use promql_compliance_cli::t;

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Confirms message arguments capture key/value pairs.
#[test]
fn message_arg_new_captures_key_and_value() {
    let arg = MessageArg::new("error", "connection refused");
    assert_eq!(arg.key, "error");
    assert_eq!(arg.value, "connection refused");
}

/// Confirms catalog entries resolve and replace placeholders.
#[test]
fn translate_substitutes_placeholders() {
    let args = vec![MessageArg::new("done", "3"), MessageArg::new("total", "10")];
    assert_eq!(translate("run.progress", args), "[3/10]");
    let args = vec![MessageArg::new("completed", "4")];
    assert_eq!(translate("run.cancelled", args), "Run cancelled after 4 test cases.");
}

/// Confirms missing keys fall back to the key string.
#[test]
fn translate_falls_back_to_key() {
    assert_eq!(translate("missing.key", Vec::new()), "missing.key");
}

/// Confirms the t! macro formats named arguments.
#[test]
fn t_macro_formats_message() {
    let rendered = t!("target.init_failed", role = "test", error = "invalid url");
    assert_eq!(rendered, "Failed to initialize the test target: invalid url");
}
