// crates/promql-compliance-cli/src/lib.rs
// ============================================================================
// Module: PromQL Compliance CLI Library
// Description: Shared helpers for the compliance tester binary.
// Purpose: Expose the message catalog and progress output for reuse and tests.
// Dependencies: promql-compliance-core
// ============================================================================

//! ## Overview
//! Library half of the `promql-compliance-tester` binary: the localized
//! message catalog behind [`t!`] and the throttled progress printer.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod i18n;
pub mod progress;
