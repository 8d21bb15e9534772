// crates/promql-compliance-http/src/lib.rs
// ============================================================================
// Module: PromQL Compliance HTTP Target
// Description: Prometheus HTTP API client used as a query target.
// Purpose: Connect the comparison engine to remote PromQL engines.
// Dependencies: promql-compliance-core, reqwest, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This crate implements [`promql_compliance_core::QueryTarget`] over the
//! Prometheus HTTP query API and decodes its JSON responses into the core
//! result model.

pub mod decode;
pub mod target;

pub use decode::decode_query_response;
pub use decode::parse_decimal_seconds;
pub use decode::parse_sample_value;
pub use target::DEFAULT_MAX_RESPONSE_BYTES;
pub use target::DEFAULT_TIMEOUT_MS;
pub use target::DEFAULT_USER_AGENT;
pub use target::HttpQueryTarget;
pub use target::HttpTargetConfig;
pub use target::HttpTargetError;
pub use target::query_request_url;
