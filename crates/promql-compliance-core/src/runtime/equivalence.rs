// crates/promql-compliance-core/src/runtime/equivalence.rs
// ============================================================================
// Module: Result Equivalence
// Description: Value-level comparison of two PromQL query results.
// Purpose: Decide whether two engines returned the same data, within tolerance.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Series are matched by canonical label set after dropping tweak-listed
//! labels, so the wire order of series and labels never matters. Matched
//! series are compared sample by sample on exact millisecond timestamps and
//! tolerant values. Instant results carrying a single sample per series
//! (vectors and scalars) are compared on value only, since engines stamp
//! instant evaluations differently. Strings compare exactly.
//!
//! The returned [`DiffEntry`] list is ordered deterministically: type
//! mismatch, then per-series findings in label-set order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use crate::core::LabelSet;
use crate::core::QueryData;
use crate::core::ResultType;
use crate::core::Sample;
use crate::core::Series;
use crate::core::TargetRole;
use crate::core::Tolerance;
use crate::core::format_label_set;
use crate::core::format_sample_value;
use crate::interfaces::format_unix_seconds;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Parameters for one equivalence check.
#[derive(Debug, Clone, Copy)]
pub struct EquivalenceOptions<'a> {
    /// Value tolerance.
    pub tolerance: Tolerance,
    /// Labels removed from reference series before matching.
    pub reference_drop_labels: &'a [String],
    /// Labels removed from test series before matching.
    pub test_drop_labels: &'a [String],
}

/// One divergence between the reference and test results.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffEntry {
    /// Result types differ.
    ResultType {
        /// Reference result type.
        expected: ResultType,
        /// Test result type.
        actual: ResultType,
    },
    /// A series appears only in the reference result.
    MissingSeries {
        /// Series labels.
        labels: LabelSet,
    },
    /// A series appears only in the test result.
    UnexpectedSeries {
        /// Series labels.
        labels: LabelSet,
    },
    /// Two series share a label set within one result.
    DuplicateSeries {
        /// Result containing the duplicate.
        role: TargetRole,
        /// Series labels.
        labels: LabelSet,
    },
    /// Two samples share a timestamp within one series.
    DuplicateSample {
        /// Result containing the duplicate.
        role: TargetRole,
        /// Series labels.
        labels: LabelSet,
        /// Repeated timestamp.
        timestamp_ms: i64,
    },
    /// A reference sample has no test counterpart.
    MissingSample {
        /// Series labels.
        labels: LabelSet,
        /// Sample timestamp.
        timestamp_ms: i64,
        /// Reference value.
        expected: f64,
    },
    /// A test sample has no reference counterpart.
    UnexpectedSample {
        /// Series labels.
        labels: LabelSet,
        /// Sample timestamp.
        timestamp_ms: i64,
        /// Test value.
        actual: f64,
    },
    /// Sample values differ beyond tolerance.
    Value {
        /// Series labels.
        labels: LabelSet,
        /// Sample timestamp.
        timestamp_ms: i64,
        /// Reference value.
        expected: f64,
        /// Test value.
        actual: f64,
    },
    /// String results differ.
    String {
        /// Reference value.
        expected: String,
        /// Test value.
        actual: String,
    },
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResultType {
                expected,
                actual,
            } => write!(
                f,
                "result type mismatch: expected {}, actual {}",
                expected.as_str(),
                actual.as_str()
            ),
            Self::MissingSeries {
                labels,
            } => write!(f, "missing series {}", format_label_set(labels)),
            Self::UnexpectedSeries {
                labels,
            } => write!(f, "unexpected series {}", format_label_set(labels)),
            Self::DuplicateSeries {
                role,
                labels,
            } => write!(f, "duplicate series {} in {role} result", format_label_set(labels)),
            Self::DuplicateSample {
                role,
                labels,
                timestamp_ms,
            } => write!(
                f,
                "duplicate sample {} @{} in {role} result",
                format_label_set(labels),
                format_unix_seconds(*timestamp_ms)
            ),
            Self::MissingSample {
                labels,
                timestamp_ms,
                expected,
            } => write!(
                f,
                "missing sample {} @{}: expected {}",
                format_label_set(labels),
                format_unix_seconds(*timestamp_ms),
                format_sample_value(*expected)
            ),
            Self::UnexpectedSample {
                labels,
                timestamp_ms,
                actual,
            } => write!(
                f,
                "unexpected sample {} @{}: actual {}",
                format_label_set(labels),
                format_unix_seconds(*timestamp_ms),
                format_sample_value(*actual)
            ),
            Self::Value {
                labels,
                timestamp_ms,
                expected,
                actual,
            } => write!(
                f,
                "value mismatch {} @{}: expected {}, actual {}",
                format_label_set(labels),
                format_unix_seconds(*timestamp_ms),
                format_sample_value(*expected),
                format_sample_value(*actual)
            ),
            Self::String {
                expected,
                actual,
            } => write!(f, "string mismatch: expected \"{expected}\", actual \"{actual}\""),
        }
    }
}

// ============================================================================
// SECTION: Comparison
// ============================================================================

/// Returns every divergence between `reference` and `test`; empty means
/// equivalent.
#[must_use]
pub fn compare_query_data(
    reference: &QueryData,
    test: &QueryData,
    options: &EquivalenceOptions<'_>,
) -> Vec<DiffEntry> {
    let mut diffs = Vec::new();
    match (reference, test) {
        (QueryData::Vector(expected), QueryData::Vector(actual)) => {
            compare_series_sets(expected, actual, options, true, &mut diffs);
        }
        (QueryData::Matrix(expected), QueryData::Matrix(actual)) => {
            compare_series_sets(expected, actual, options, false, &mut diffs);
        }
        (QueryData::Scalar(expected), QueryData::Scalar(actual)) => {
            if !options.tolerance.equivalent(expected.value, actual.value) {
                diffs.push(DiffEntry::Value {
                    labels: LabelSet::new(),
                    timestamp_ms: expected.timestamp_ms,
                    expected: expected.value,
                    actual: actual.value,
                });
            }
        }
        (
            QueryData::String {
                value: expected,
                ..
            },
            QueryData::String {
                value: actual,
                ..
            },
        ) => {
            if expected != actual {
                diffs.push(DiffEntry::String {
                    expected: expected.clone(),
                    actual: actual.clone(),
                });
            }
        }
        _ => diffs.push(DiffEntry::ResultType {
            expected: reference.result_type(),
            actual: test.result_type(),
        }),
    }
    diffs
}

/// Renders at most `limit` entries, one per line, plus a remainder count.
#[must_use]
pub fn render_diff(entries: &[DiffEntry], limit: usize) -> String {
    let mut lines: Vec<String> = entries.iter().take(limit).map(ToString::to_string).collect();
    let remaining = entries.len().saturating_sub(limit);
    if remaining > 0 {
        lines.push(format!("... and {remaining} more"));
    }
    lines.join("\n")
}

/// Keys series by canonical labels after dropping `drop` labels, reporting
/// duplicates.
fn index_series<'a>(
    series: &'a [Series],
    drop: &[String],
    role: TargetRole,
    diffs: &mut Vec<DiffEntry>,
) -> BTreeMap<LabelSet, &'a [Sample]> {
    let mut indexed = BTreeMap::new();
    for entry in series {
        let mut labels = entry.labels.clone();
        for name in drop {
            labels.remove(name);
        }
        if indexed.contains_key(&labels) {
            diffs.push(DiffEntry::DuplicateSeries {
                role,
                labels,
            });
            continue;
        }
        indexed.insert(labels, entry.samples.as_slice());
    }
    indexed
}

/// Matches series by label set and compares their samples.
fn compare_series_sets(
    expected: &[Series],
    actual: &[Series],
    options: &EquivalenceOptions<'_>,
    instant: bool,
    diffs: &mut Vec<DiffEntry>,
) {
    let expected =
        index_series(expected, options.reference_drop_labels, TargetRole::Reference, diffs);
    let actual = index_series(actual, options.test_drop_labels, TargetRole::Test, diffs);
    for (labels, expected_samples) in &expected {
        match actual.get(labels) {
            Some(actual_samples) => compare_samples(
                labels,
                expected_samples,
                actual_samples,
                options.tolerance,
                instant,
                diffs,
            ),
            None => diffs.push(DiffEntry::MissingSeries {
                labels: labels.clone(),
            }),
        }
    }
    for labels in actual.keys().filter(|labels| !expected.contains_key(*labels)) {
        diffs.push(DiffEntry::UnexpectedSeries {
            labels: labels.clone(),
        });
    }
}

/// Compares two sample sequences of a matched series.
fn compare_samples(
    labels: &LabelSet,
    expected: &[Sample],
    actual: &[Sample],
    tolerance: Tolerance,
    instant: bool,
    diffs: &mut Vec<DiffEntry>,
) {
    if instant
        && let ([expected], [actual]) = (expected, actual)
    {
        if !tolerance.equivalent(expected.value, actual.value) {
            diffs.push(DiffEntry::Value {
                labels: labels.clone(),
                timestamp_ms: expected.timestamp_ms,
                expected: expected.value,
                actual: actual.value,
            });
        }
        return;
    }
    let expected = index_samples(labels, expected, TargetRole::Reference, diffs);
    let actual = index_samples(labels, actual, TargetRole::Test, diffs);
    for (timestamp_ms, expected_value) in &expected {
        match actual.get(timestamp_ms) {
            Some(actual_value) if tolerance.equivalent(*expected_value, *actual_value) => {}
            Some(actual_value) => diffs.push(DiffEntry::Value {
                labels: labels.clone(),
                timestamp_ms: *timestamp_ms,
                expected: *expected_value,
                actual: *actual_value,
            }),
            None => diffs.push(DiffEntry::MissingSample {
                labels: labels.clone(),
                timestamp_ms: *timestamp_ms,
                expected: *expected_value,
            }),
        }
    }
    for (timestamp_ms, actual_value) in &actual {
        if !expected.contains_key(timestamp_ms) {
            diffs.push(DiffEntry::UnexpectedSample {
                labels: labels.clone(),
                timestamp_ms: *timestamp_ms,
                actual: *actual_value,
            });
        }
    }
}

/// Keys samples by timestamp, keeping the first value and reporting repeats.
fn index_samples(
    labels: &LabelSet,
    samples: &[Sample],
    role: TargetRole,
    diffs: &mut Vec<DiffEntry>,
) -> BTreeMap<i64, f64> {
    let mut indexed = BTreeMap::new();
    for sample in samples {
        if indexed.contains_key(&sample.timestamp_ms) {
            diffs.push(DiffEntry::DuplicateSample {
                role,
                labels: labels.clone(),
                timestamp_ms: sample.timestamp_ms,
            });
            continue;
        }
        indexed.insert(sample.timestamp_ms, sample.value);
    }
    indexed
}
