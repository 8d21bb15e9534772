// crates/promql-compliance-core/src/interfaces/mod.rs
// ============================================================================
// Module: Compliance Interfaces
// Description: Backend-agnostic contracts for query targets and progress.
// Purpose: Decouple the comparer from transport and presentation details.
// Dependencies: serde, thiserror, crate::core
// ============================================================================

//! ## Overview
//! A [`QueryTarget`] evaluates one PromQL request against a remote engine and
//! returns a typed [`QueryResponse`] or a [`TargetError`]. Target errors are
//! data: the comparer folds them into outcomes instead of aborting the run.
//! Implementations must be safe for concurrent use across worker threads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::QueryKind;
use crate::core::QueryResponse;
use crate::core::QueryWindow;

// ============================================================================
// SECTION: Query Request
// ============================================================================

/// Range query API path.
pub const QUERY_RANGE_PATH: &str = "/api/v1/query_range";
/// Instant query API path.
pub const QUERY_INSTANT_PATH: &str = "/api/v1/query";

/// One query issued to a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Concrete (possibly tweaked) query text.
    pub query: String,
    /// Query API used.
    pub kind: QueryKind,
    /// Evaluation window; instant queries use `end_ms`.
    pub window: QueryWindow,
}

impl QueryRequest {
    /// Returns the API path for the request kind.
    #[must_use]
    pub const fn api_path(&self) -> &'static str {
        match self.kind {
            QueryKind::Range => QUERY_RANGE_PATH,
            QueryKind::Instant => QUERY_INSTANT_PATH,
        }
    }

    /// Returns the query-string parameters in wire order.
    #[must_use]
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self.kind {
            QueryKind::Range => vec![
                ("query", self.query.clone()),
                ("start", format_unix_seconds(self.window.start_ms)),
                ("end", format_unix_seconds(self.window.end_ms)),
                ("step", format_unix_seconds(self.window.step_ms)),
            ],
            QueryKind::Instant => vec![
                ("query", self.query.clone()),
                ("time", format_unix_seconds(self.window.end_ms)),
            ],
        }
    }
}

/// Formats milliseconds as decimal seconds with millisecond precision.
#[must_use]
pub fn format_unix_seconds(millis: i64) -> String {
    let sign = if millis < 0 { "-" } else { "" };
    let abs = millis.unsigned_abs();
    format!("{sign}{}.{:03}", abs / 1000, abs % 1000)
}

// ============================================================================
// SECTION: Query Target
// ============================================================================

/// Errors returned by a query target.
///
/// # Invariants
/// - Variants are stable; [`TargetError::kind`] labels are stable strings.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetError {
    /// The request could not be sent or the body could not be read.
    #[error("transport error: {message}")]
    Transport {
        /// Transport failure detail.
        message: String,
    },
    /// The request exceeded its timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },
    /// The target answered with a non-2xx status and no API error payload.
    #[error("unexpected http status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },
    /// The response body was not a valid query response.
    #[error("invalid response: {message}")]
    Decode {
        /// Decode failure detail.
        message: String,
    },
    /// The target reported a query error.
    #[error("{error_type}: {message}")]
    Api {
        /// Prometheus error type (for example `bad_data`).
        error_type: String,
        /// Error message.
        message: String,
    },
}

impl TargetError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport {
                ..
            } => "transport",
            Self::Timeout {
                ..
            } => "timeout",
            Self::HttpStatus {
                ..
            } => "http_status",
            Self::Decode {
                ..
            } => "decode",
            Self::Api {
                ..
            } => "api",
        }
    }
}

/// A PromQL engine reachable for queries.
pub trait QueryTarget: Send + Sync {
    /// Returns a display name for the target (typically its URL).
    fn name(&self) -> &str;

    /// Evaluates `request` and returns the decoded response.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError`] when the call fails or the target rejects it.
    fn query(&self, request: &QueryRequest) -> Result<QueryResponse, TargetError>;
}

impl<T: QueryTarget + ?Sized> QueryTarget for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn query(&self, request: &QueryRequest) -> Result<QueryResponse, TargetError> {
        (**self).query(request)
    }
}

impl<T: QueryTarget + ?Sized> QueryTarget for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn query(&self, request: &QueryRequest) -> Result<QueryResponse, TargetError> {
        (**self).query(request)
    }
}

impl<T: QueryTarget + ?Sized> QueryTarget for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn query(&self, request: &QueryRequest) -> Result<QueryResponse, TargetError> {
        (**self).query(request)
    }
}

// ============================================================================
// SECTION: Progress
// ============================================================================

/// Receives progress notifications from the runner.
pub trait ProgressObserver: Send + Sync {
    /// Called once after each test case completes.
    fn case_completed(&self, completed: usize, total: usize);
}

/// Progress observer that ignores all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn case_completed(&self, _completed: usize, _total: usize) {}
}
