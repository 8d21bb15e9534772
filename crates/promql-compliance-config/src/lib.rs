// crates/promql-compliance-config/src/lib.rs
// ============================================================================
// Module: PromQL Compliance Config Library
// Description: Canonical config model and validation for compliance runs.
// Purpose: Single source of truth for promql-compliance-tester.toml semantics.
// Dependencies: promql-compliance-core, promql-compliance-http, serde, toml
// ============================================================================

//! ## Overview
//! `promql-compliance-config` defines the configuration model for a
//! compliance run: the two targets, the run window, comparison tolerances,
//! logging, telemetry, and the query suite itself. Validation is strict and
//! fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
