// crates/promql-compliance-core/src/core/response.rs
// ============================================================================
// Module: Query Responses
// Description: Typed PromQL results returned by a query target.
// Purpose: Represent vector, matrix, scalar, and string results uniformly.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Responses are decoded by target implementations into [`QueryData`]. Label
//! sets are canonical [`BTreeMap`]s, so the wire order of labels carries no
//! meaning. The metric name is the `__name__` label.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Labels
// ============================================================================

/// Canonical label set (sorted by label name).
pub type LabelSet = BTreeMap<String, String>;

/// Label carrying the metric name.
pub const METRIC_NAME_LABEL: &str = "__name__";

/// Renders a label set as `name{a="1", b="2"}`.
#[must_use]
pub fn format_label_set(labels: &LabelSet) -> String {
    let mut out = String::new();
    if let Some(name) = labels.get(METRIC_NAME_LABEL) {
        out.push_str(name);
    }
    out.push('{');
    let mut first = true;
    for (name, value) in labels {
        if name == METRIC_NAME_LABEL {
            continue;
        }
        if !first {
            out.push_str(", ");
        }
        first = false;
        let _ = write!(out, "{name}=\"{}\"", escape_label_value(value));
    }
    out.push('}');
    out
}

/// Escapes backslashes, quotes, and newlines in a label value.
fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Renders a sample value using Prometheus spellings for special values.
#[must_use]
pub fn format_sample_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() { "+Inf".to_string() } else { "-Inf".to_string() }
    } else {
        value.to_string()
    }
}

// ============================================================================
// SECTION: Samples and Series
// ============================================================================

/// A single `(timestamp, value)` sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Sample timestamp, Unix milliseconds.
    pub timestamp_ms: i64,
    /// Sample value.
    pub value: f64,
}

impl Sample {
    /// Creates a sample.
    #[must_use]
    pub const fn new(timestamp_ms: i64, value: f64) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }
}

/// A labeled sequence of samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Series identity.
    pub labels: LabelSet,
    /// Samples in wire order.
    pub samples: Vec<Sample>,
}

impl Series {
    /// Creates a series from label pairs and samples.
    #[must_use]
    pub fn new<I, K, V>(labels: I, samples: Vec<Sample>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(|(name, value)| (name.into(), value.into())).collect(),
            samples,
        }
    }
}

// ============================================================================
// SECTION: Query Data
// ============================================================================

/// PromQL result type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    /// Instant vector.
    Vector,
    /// Range vector.
    Matrix,
    /// Scalar value.
    Scalar,
    /// String value.
    String,
}

impl ResultType {
    /// Returns the wire label for the result type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vector => "vector",
            Self::Matrix => "matrix",
            Self::Scalar => "scalar",
            Self::String => "string",
        }
    }
}

/// Typed query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result_type", content = "result", rename_all = "snake_case")]
pub enum QueryData {
    /// Instant vector; every series carries exactly one sample.
    Vector(Vec<Series>),
    /// Range vector.
    Matrix(Vec<Series>),
    /// Scalar sample.
    Scalar(Sample),
    /// String value at a timestamp.
    String {
        /// Evaluation timestamp, Unix milliseconds.
        timestamp_ms: i64,
        /// String value.
        value: String,
    },
}

impl QueryData {
    /// Returns the result type tag.
    #[must_use]
    pub const fn result_type(&self) -> ResultType {
        match self {
            Self::Vector(_) => ResultType::Vector,
            Self::Matrix(_) => ResultType::Matrix,
            Self::Scalar(_) => ResultType::Scalar,
            Self::String {
                ..
            } => ResultType::String,
        }
    }

    /// Returns the number of series (scalars and strings count as one).
    #[must_use]
    pub const fn series_count(&self) -> usize {
        match self {
            Self::Vector(series) | Self::Matrix(series) => series.len(),
            Self::Scalar(_)
            | Self::String {
                ..
            } => 1,
        }
    }
}

/// Successful response from a query target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Decoded result.
    pub data: QueryData,
    /// Warnings reported alongside the result.
    pub warnings: Vec<String>,
}

impl QueryResponse {
    /// Wraps data without warnings.
    #[must_use]
    pub const fn new(data: QueryData) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }
}
