// crates/promql-compliance-http/src/target.rs
// ============================================================================
// Module: HTTP Query Target
// Description: Query target backed by the Prometheus HTTP API.
// Purpose: Issue bounded range and instant queries against remote engines.
// Dependencies: promql-compliance-core, reqwest, serde, thiserror
// ============================================================================

//! ## Overview
//! [`HttpQueryTarget`] sends GET requests to `<base>/api/v1/query_range` or
//! `<base>/api/v1/query`, forwarding configured headers on every request.
//! Redirects are disabled, bodies are read under a size limit, and every
//! transport failure is returned as a [`TargetError`] so the comparer can
//! classify it. Construction rejects non-HTTP schemes and embedded
//! credentials, which belong in headers instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Read;
use std::time::Duration;

use promql_compliance_core::QueryRequest;
use promql_compliance_core::QueryResponse;
use promql_compliance_core::QueryTarget;
use promql_compliance_core::TargetError;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::decode::decode_query_response;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default maximum response body size in bytes.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;
/// Default user agent sent with each request.
pub const DEFAULT_USER_AGENT: &str = "promql-compliance-tester/0.1";

/// Connection settings for one query target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpTargetConfig {
    /// Base URL; API paths are appended to its path.
    pub query_url: String,
    /// Headers forwarded verbatim on every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Maximum response body size in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpTargetConfig {
    /// Creates a config for `query_url` with default limits.
    #[must_use]
    pub fn new(query_url: impl Into<String>) -> Self {
        Self {
            query_url: query_url.into(),
            headers: BTreeMap::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Serde default for [`HttpTargetConfig::timeout_ms`].
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Serde default for [`HttpTargetConfig::max_response_bytes`].
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

/// Serde default for [`HttpTargetConfig::user_agent`].
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Errors raised while constructing an HTTP target.
#[derive(Debug, Error)]
pub enum HttpTargetError {
    /// The base URL could not be parsed.
    #[error("invalid query url `{url}`: {message}")]
    InvalidUrl {
        /// Configured URL.
        url: String,
        /// Parse failure detail.
        message: String,
    },
    /// The base URL uses a scheme other than http or https.
    #[error("unsupported url scheme `{0}`")]
    UnsupportedScheme(String),
    /// The base URL embeds credentials.
    #[error("query url must not embed credentials; use headers instead")]
    CredentialsInUrl,
    /// A configured header name or value is invalid.
    #[error("invalid header `{0}`")]
    InvalidHeader(String),
    /// The configured limits are unusable.
    #[error("invalid target limits: {0}")]
    InvalidLimits(String),
    /// The HTTP client could not be built.
    #[error("http client build failed")]
    Client,
}

// ============================================================================
// SECTION: Target
// ============================================================================

/// Query target speaking the Prometheus HTTP API.
#[derive(Debug)]
pub struct HttpQueryTarget {
    /// Target configuration.
    config: HttpTargetConfig,
    /// Parsed base URL.
    base_url: Url,
    /// Blocking HTTP client with default headers installed.
    client: Client,
}

impl HttpQueryTarget {
    /// Builds a target from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpTargetError`] when the URL, headers, or limits are
    /// invalid or the client cannot be built.
    pub fn new(config: HttpTargetConfig) -> Result<Self, HttpTargetError> {
        let base_url = Url::parse(&config.query_url).map_err(|err| HttpTargetError::InvalidUrl {
            url: config.query_url.clone(),
            message: err.to_string(),
        })?;
        match base_url.scheme() {
            "http" | "https" => {}
            other => return Err(HttpTargetError::UnsupportedScheme(other.to_string())),
        }
        if !base_url.username().is_empty() || base_url.password().is_some() {
            return Err(HttpTargetError::CredentialsInUrl);
        }
        if config.timeout_ms == 0 {
            return Err(HttpTargetError::InvalidLimits("timeout_ms must be positive".to_string()));
        }
        if config.max_response_bytes == 0 {
            return Err(HttpTargetError::InvalidLimits(
                "max_response_bytes must be positive".to_string(),
            ));
        }
        let headers = build_headers(&config.headers)?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .redirect(Policy::none())
            .build()
            .map_err(|_| HttpTargetError::Client)?;
        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// Returns the target configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpTargetConfig {
        &self.config
    }

    /// Builds the full request URL for `request`.
    #[must_use]
    pub fn request_url(&self, request: &QueryRequest) -> Url {
        query_request_url(&self.base_url, request)
    }
}

/// Appends the API path and query parameters of `request` to `base`.
#[must_use]
pub fn query_request_url(base: &Url, request: &QueryRequest) -> Url {
    let mut url = base.clone();
    let path = format!("{}{}", base.path().trim_end_matches('/'), request.api_path());
    url.set_path(&path);
    url.set_query(None);
    url.query_pairs_mut().extend_pairs(request.query_params());
    url
}

impl QueryTarget for HttpQueryTarget {
    fn name(&self) -> &str {
        &self.config.query_url
    }

    fn query(&self, request: &QueryRequest) -> Result<QueryResponse, TargetError> {
        let url = self.request_url(request);
        let mut response = self.client.get(url).send().map_err(|err| self.send_error(&err))?;
        let status = response.status().as_u16();
        let body = read_response_limited(
            &mut response,
            self.config.max_response_bytes,
            self.config.timeout_ms,
        )?;
        decode_query_response(status, &body)
    }
}

impl HttpQueryTarget {
    /// Maps a send failure to a target error.
    fn send_error(&self, err: &reqwest::Error) -> TargetError {
        if err.is_timeout() {
            return TargetError::Timeout {
                timeout_ms: self.config.timeout_ms,
            };
        }
        TargetError::Transport {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts configured headers into a header map.
fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, HttpTargetError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| HttpTargetError::InvalidHeader(name.clone()))?;
        let mut header_value = HeaderValue::from_str(value)
            .map_err(|_| HttpTargetError::InvalidHeader(name.clone()))?;
        header_value.set_sensitive(true);
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Reads a response body while enforcing a maximum size.
fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
    timeout_ms: u64,
) -> Result<Vec<u8>, TargetError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes).map_err(|_| TargetError::Transport {
        message: "response size limit exceeds u64".to_string(),
    })?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(oversized(max_bytes));
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    handle.read_to_end(&mut buf).map_err(|err| {
        if err.kind() == std::io::ErrorKind::TimedOut {
            TargetError::Timeout {
                timeout_ms,
            }
        } else {
            TargetError::Transport {
                message: format!("failed to read response: {err}"),
            }
        }
    })?;
    if buf.len() > max_bytes {
        return Err(oversized(max_bytes));
    }
    if let Some(expected) = expected_len {
        let expected = usize::try_from(expected).map_err(|_| TargetError::Transport {
            message: "invalid response length".to_string(),
        })?;
        if buf.len() < expected {
            return Err(TargetError::Transport {
                message: "http response truncated".to_string(),
            });
        }
    }
    Ok(buf)
}

/// Builds the error for a body over the size limit.
fn oversized(max_bytes: usize) -> TargetError {
    TargetError::Transport {
        message: format!("http response exceeds size limit of {max_bytes} bytes"),
    }
}
