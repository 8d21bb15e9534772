// crates/promql-compliance-core/src/lib.rs
// ============================================================================
// Module: PromQL Compliance Core Library
// Description: Public API surface for the compliance comparison core.
// Purpose: Expose the data model, target interfaces, and runtime engines.
// Dependencies: crate::{core, interfaces, runtime, events}
// ============================================================================

//! ## Overview
//! The compliance core expands query templates into a deterministic matrix of
//! test cases and compares the answers of a reference PromQL engine against a
//! test engine under numeric tolerance. It never evaluates PromQL itself: all
//! evaluation is delegated to [`QueryTarget`] implementations supplied by the
//! caller.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod events;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use events::CaseComparedEvent;
pub use events::FileEventSink;
pub use events::NoopEventSink;
pub use events::ReportDeliveryEvent;
pub use events::RunEventSink;
pub use events::RunFinishedEvent;
pub use events::RunStartedEvent;
pub use events::StderrEventSink;
pub use events::TargetFailedEvent;
pub use interfaces::NoopProgress;
pub use interfaces::ProgressObserver;
pub use interfaces::QueryRequest;
pub use interfaces::QueryTarget;
pub use interfaces::TargetError;
pub use interfaces::format_unix_seconds;
pub use runtime::CancellationFlag;
pub use runtime::CompareError;
pub use runtime::Comparer;
pub use runtime::ComparerConfig;
pub use runtime::ExpandError;
pub use runtime::QueryTweaker;
pub use runtime::RunError;
pub use runtime::RunOptions;
pub use runtime::RunOutcome;
pub use runtime::Runner;
pub use runtime::TweakedQuery;
pub use runtime::expand_test_cases;
