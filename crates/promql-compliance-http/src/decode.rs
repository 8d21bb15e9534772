// crates/promql-compliance-http/src/decode.rs
// ============================================================================
// Module: Prometheus Response Decoding
// Description: Decodes Prometheus query API JSON into typed query data.
// Purpose: Turn raw HTTP bodies into `QueryResponse` or `TargetError`.
// Dependencies: promql-compliance-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The Prometheus API wraps results in a `{status, data, warnings}` envelope
//! or reports failures as `{status: "error", errorType, error}`. Sample
//! values arrive as strings (`"NaN"`, `"+Inf"`, `"-Inf"` included) and
//! timestamps as decimal seconds, which are converted to integer
//! milliseconds without floating-point rounding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use promql_compliance_core::LabelSet;
use promql_compliance_core::QueryData;
use promql_compliance_core::QueryResponse;
use promql_compliance_core::Sample;
use promql_compliance_core::Series;
use promql_compliance_core::TargetError;
use serde::Deserialize;
use serde_json::Number;
use serde_json::Value;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum body excerpt kept in HTTP status errors.
const MAX_ERROR_BODY_CHARS: usize = 512;

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// API response envelope.
#[derive(Debug, Deserialize)]
struct Envelope {
    /// `success` or `error`.
    status: String,
    /// Result payload on success.
    #[serde(default)]
    data: Option<RawData>,
    /// Error class on failure.
    #[serde(default, rename = "errorType")]
    error_type: Option<String>,
    /// Error message on failure.
    #[serde(default)]
    error: Option<String>,
    /// Non-fatal warnings.
    #[serde(default)]
    warnings: Vec<String>,
}

/// Typed result payload.
#[derive(Debug, Deserialize)]
struct RawData {
    /// `vector`, `matrix`, `scalar`, or `string`.
    #[serde(rename = "resultType")]
    result_type: String,
    /// Result body, shaped by `result_type`.
    result: Value,
}

/// `[timestamp, "value"]` pair.
type RawSample = (Number, String);

/// Instant-vector element.
#[derive(Debug, Deserialize)]
struct RawInstantSeries {
    /// Series labels.
    #[serde(default)]
    metric: LabelSet,
    /// Single sample.
    value: RawSample,
}

/// Range-vector element.
#[derive(Debug, Deserialize)]
struct RawRangeSeries {
    /// Series labels.
    #[serde(default)]
    metric: LabelSet,
    /// Samples in time order.
    #[serde(default)]
    values: Vec<RawSample>,
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decodes an HTTP response body into a query response.
///
/// An API error payload wins over the HTTP status; a non-2xx status without
/// one is reported as [`TargetError::HttpStatus`].
///
/// # Errors
///
/// Returns [`TargetError`] for API errors, unexpected statuses, and bodies
/// that are not valid query responses.
pub fn decode_query_response(status: u16, body: &[u8]) -> Result<QueryResponse, TargetError> {
    let success_status = (200 .. 300).contains(&status);
    let envelope: Envelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(err) if success_status => {
            return Err(decode_error(format!("malformed json body: {err}")));
        }
        Err(_) => {
            return Err(TargetError::HttpStatus {
                status,
                body: body_excerpt(body),
            });
        }
    };
    if envelope.status == "error" {
        return Err(TargetError::Api {
            error_type: envelope.error_type.unwrap_or_else(|| "unknown".to_string()),
            message: envelope.error.unwrap_or_default(),
        });
    }
    if !success_status {
        return Err(TargetError::HttpStatus {
            status,
            body: body_excerpt(body),
        });
    }
    if envelope.status != "success" {
        return Err(decode_error(format!("unknown response status {}", envelope.status)));
    }
    let data = envelope.data.ok_or_else(|| decode_error("missing data".to_string()))?;
    Ok(QueryResponse {
        data: decode_data(data)?,
        warnings: envelope.warnings,
    })
}

/// Decodes the typed result payload.
fn decode_data(data: RawData) -> Result<QueryData, TargetError> {
    match data.result_type.as_str() {
        "vector" => {
            let raw: Vec<RawInstantSeries> = from_value(data.result)?;
            let series = raw
                .into_iter()
                .map(|entry| {
                    Ok(Series {
                        labels: entry.metric,
                        samples: vec![decode_sample(&entry.value)?],
                    })
                })
                .collect::<Result<Vec<_>, TargetError>>()?;
            Ok(QueryData::Vector(series))
        }
        "matrix" => {
            let raw: Vec<RawRangeSeries> = from_value(data.result)?;
            let series = raw
                .into_iter()
                .map(|entry| {
                    Ok(Series {
                        labels: entry.metric,
                        samples: entry
                            .values
                            .iter()
                            .map(decode_sample)
                            .collect::<Result<Vec<_>, TargetError>>()?,
                    })
                })
                .collect::<Result<Vec<_>, TargetError>>()?;
            Ok(QueryData::Matrix(series))
        }
        "scalar" => {
            let raw: RawSample = from_value(data.result)?;
            Ok(QueryData::Scalar(decode_sample(&raw)?))
        }
        "string" => {
            let (timestamp, value): RawSample = from_value(data.result)?;
            Ok(QueryData::String {
                timestamp_ms: decode_timestamp(&timestamp)?,
                value,
            })
        }
        other => Err(decode_error(format!("unknown result type {other}"))),
    }
}

/// Deserializes a JSON value, mapping failures to decode errors.
fn from_value<T: for<'de> Deserialize<'de>>(value: Value) -> Result<T, TargetError> {
    serde_json::from_value(value).map_err(|err| decode_error(format!("invalid result: {err}")))
}

/// Decodes one `[timestamp, "value"]` pair.
fn decode_sample((timestamp, value): &RawSample) -> Result<Sample, TargetError> {
    Ok(Sample::new(decode_timestamp(timestamp)?, parse_sample_value(value)?))
}

/// Parses a Prometheus sample value string.
///
/// # Errors
///
/// Returns [`TargetError::Decode`] when the value is not a number.
pub fn parse_sample_value(value: &str) -> Result<f64, TargetError> {
    match value {
        "NaN" => Ok(f64::NAN),
        "+Inf" | "Inf" => Ok(f64::INFINITY),
        "-Inf" => Ok(f64::NEG_INFINITY),
        other => {
            other.parse::<f64>().map_err(|_| decode_error(format!("invalid sample value {other}")))
        }
    }
}

/// Converts a timestamp in seconds to integer milliseconds.
fn decode_timestamp(timestamp: &Number) -> Result<i64, TargetError> {
    if let Some(seconds) = timestamp.as_i64() {
        return seconds
            .checked_mul(1000)
            .ok_or_else(|| decode_error(format!("timestamp out of range {timestamp}")));
    }
    let text = match timestamp.as_f64() {
        Some(seconds) if seconds.is_finite() => format!("{seconds:.3}"),
        _ => timestamp.to_string(),
    };
    parse_decimal_seconds(&text)
        .ok_or_else(|| decode_error(format!("invalid timestamp {timestamp}")))
}

/// Parses `[-]S[.fff]` seconds into milliseconds, truncating past 3 digits.
#[must_use]
pub fn parse_decimal_seconds(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty()
        || !whole.bytes().all(|byte| byte.is_ascii_digit())
        || !fraction.bytes().all(|byte| byte.is_ascii_digit())
    {
        return None;
    }
    let mut millis_text: String = fraction.chars().take(3).collect();
    while millis_text.len() < 3 {
        millis_text.push('0');
    }
    let fraction_ms = millis_text.parse::<i64>().ok()?;
    let millis = whole.parse::<i64>().ok()?.checked_mul(1000)?.checked_add(fraction_ms)?;
    Some(if negative { -millis } else { millis })
}

/// Builds a decode error.
const fn decode_error(message: String) -> TargetError {
    TargetError::Decode {
        message,
    }
}

/// Returns a bounded, lossy UTF-8 excerpt of a response body.
fn body_excerpt(body: &[u8]) -> String {
    String::from_utf8_lossy(body).chars().take(MAX_ERROR_BODY_CHARS).collect()
}
