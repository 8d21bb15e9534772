// crates/promql-compliance-core/src/core/mod.rs
// ============================================================================
// Module: Compliance Data Model
// Description: Core types shared by the expander, comparer, and reporters.
// Purpose: Group the immutable data model under a single namespace.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The data model is deliberately passive: placeholders, templates, test
//! cases, tweaks, query responses, and comparison results. Engines in
//! [`crate::runtime`] create these values; nothing mutates them afterwards.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod catalog;
pub mod hashing;
pub mod response;
pub mod result;
pub mod target;
pub mod template;
pub mod test_case;
pub mod tolerance;
pub mod tweak;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::CatalogError;
pub use catalog::Placeholder;
pub use catalog::PlaceholderCatalog;
pub use hashing::HashError;
pub use hashing::suite_fingerprint;
pub use response::LabelSet;
pub use response::QueryData;
pub use response::QueryResponse;
pub use response::ResultType;
pub use response::Sample;
pub use response::Series;
pub use response::format_label_set;
pub use response::format_sample_value;
pub use result::AppliedTweak;
pub use result::ComparisonResult;
pub use result::Outcome;
pub use result::RunSummary;
pub use result::TargetReply;
pub use target::TargetRole;
pub use template::QueryKind;
pub use template::QueryTemplate;
pub use template::TemplateError;
pub use test_case::QueryWindow;
pub use test_case::Substitution;
pub use test_case::TestCase;
pub use test_case::WindowError;
pub use tolerance::DEFAULT_ABSOLUTE_TOLERANCE;
pub use tolerance::DEFAULT_RELATIVE_TOLERANCE;
pub use tolerance::Tolerance;
pub use tweak::QueryRewrite;
pub use tweak::QueryTweak;
pub use tweak::TweakError;
pub use tweak::TweakMatcher;
pub use tweak::TweakScope;
