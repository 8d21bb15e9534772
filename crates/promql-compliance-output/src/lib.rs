// crates/promql-compliance-output/src/lib.rs
// ============================================================================
// Module: PromQL Compliance Output
// Description: Report renderers and telemetry delivery for compliance runs.
// Purpose: Present run results in text, json, tsv, html, or event form.
// Dependencies: promql-compliance-core, reqwest, serde_json, rand, time
// ============================================================================

//! ## Overview
//! Reporters consume a read-only [`RunReport`] and write to any
//! [`std::io::Write`]. The event reporter additionally posts each result to
//! a telemetry collector.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod event;
pub mod html;
pub mod json;
pub mod report;
pub mod text;
pub mod tsv;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use event::EventReporter;
pub use event::INSERT_KEY_HEADER;
pub use event::MAX_EVENT_TEXT_BYTES;
pub use event::new_run_id;
pub use event::truncate_utf8;
pub use html::HtmlReporter;
pub use html::escape_html;
pub use json::JsonReporter;
pub use report::ReportError;
pub use report::Reporter;
pub use report::RunReport;
pub use text::TextReporter;
pub use tsv::TsvReporter;
