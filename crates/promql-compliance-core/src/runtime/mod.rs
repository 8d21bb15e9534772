// crates/promql-compliance-core/src/runtime/mod.rs
// ============================================================================
// Module: Compliance Runtime
// Description: Expansion, tweaking, comparison, and run orchestration.
// Purpose: Execute a compliance suite against a reference and a test target.
// Dependencies: crate::{core, events, interfaces}
// ============================================================================

//! ## Overview
//! Control flow is linear: templates and the catalog expand into test cases,
//! the runner drives the comparer over them, and the comparer produces one
//! result per case. Every engine here is synchronous; concurrency comes from
//! scoped threads so borrowed targets never need to be `'static`.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod comparer;
pub mod equivalence;
pub mod expander;
pub mod runner;
pub mod tweaker;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use comparer::CompareError;
pub use comparer::Comparer;
pub use comparer::ComparerConfig;
pub use comparer::DEFAULT_MAX_DIFF_ENTRIES;
pub use equivalence::DiffEntry;
pub use equivalence::EquivalenceOptions;
pub use equivalence::compare_query_data;
pub use equivalence::render_diff;
pub use expander::ExpandError;
pub use expander::MAX_EXPANDED_CASES;
pub use expander::expand_test_cases;
pub use runner::CancellationFlag;
pub use runner::MAX_CONCURRENCY;
pub use runner::RunError;
pub use runner::RunOptions;
pub use runner::RunOutcome;
pub use runner::Runner;
pub use tweaker::ComparisonAdjustments;
pub use tweaker::QueryTweaker;
pub use tweaker::TweakedQuery;
