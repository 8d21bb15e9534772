// crates/promql-compliance-core/tests/common/mod.rs
// ============================================================================
// Module: Test Support
// Description: Scripted query targets and fixture builders for core tests.
// Purpose: Exercise the comparer and runner without network access.
// Dependencies: promql-compliance-core
// ============================================================================
//! ## Overview
//! [`ScriptedTarget`] answers every request through a closure and counts the
//! calls it receives.

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared test helpers are not used by every test binary."
)]

use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use promql_compliance_core::QueryData;
use promql_compliance_core::QueryRequest;
use promql_compliance_core::QueryResponse;
use promql_compliance_core::QueryTarget;
use promql_compliance_core::QueryWindow;
use promql_compliance_core::Sample;
use promql_compliance_core::Series;
use promql_compliance_core::TargetError;

/// Responder signature used by [`ScriptedTarget`].
type Responder = dyn Fn(&QueryRequest) -> Result<QueryResponse, TargetError> + Send + Sync;

/// Query target driven by a closure.
pub struct ScriptedTarget {
    /// Display name.
    name: String,
    /// Reply generator.
    responder: Box<Responder>,
    /// Number of calls received.
    calls: AtomicUsize,
    /// Queries received, in arrival order.
    queries: Mutex<Vec<String>>,
}

impl ScriptedTarget {
    /// Creates a target answering through `responder`.
    pub fn new<F>(name: &str, responder: F) -> Self
    where
        F: Fn(&QueryRequest) -> Result<QueryResponse, TargetError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Creates a target that always answers with `data`.
    pub fn answering(name: &str, data: QueryData) -> Self {
        Self::new(name, move |_| Ok(QueryResponse::new(data.clone())))
    }

    /// Creates a target that always fails with `err`.
    pub fn failing(name: &str, err: TargetError) -> Self {
        Self::new(name, move |_| Err(err.clone()))
    }

    /// Returns the number of calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the queries received.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl QueryTarget for ScriptedTarget {
    fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, request: &QueryRequest) -> Result<QueryResponse, TargetError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(request.query.clone());
        (self.responder)(request)
    }
}

/// Ten-minute window ending at 1700000000s with a 10s step.
pub fn window() -> QueryWindow {
    QueryWindow::new(1_699_999_400_000, 1_700_000_000_000, 10_000).unwrap()
}

/// Single-series matrix with one sample per `(timestamp_ms, value)` pair.
pub fn matrix(labels: &[(&str, &str)], samples: &[(i64, f64)]) -> QueryData {
    QueryData::Matrix(vec![series(labels, samples)])
}

/// Series with the given labels and samples.
pub fn series(labels: &[(&str, &str)], samples: &[(i64, f64)]) -> Series {
    Series::new(
        labels.iter().copied(),
        samples.iter().map(|(timestamp_ms, value)| Sample::new(*timestamp_ms, *value)).collect(),
    )
}

/// Bad-data API error.
pub fn bad_data() -> TargetError {
    TargetError::Api {
        error_type: "bad_data".to_string(),
        message: "parse error".to_string(),
    }
}
