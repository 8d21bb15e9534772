// crates/promql-compliance-config/src/config.rs
// ============================================================================
// Module: Compliance Configuration
// Description: Configuration loading and validation for compliance runs.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: promql-compliance-core, promql-compliance-http, serde, toml,
//               serde_yaml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file (or YAML, selected by extension)
//! with strict size and path limits. Validation builds the core catalog,
//! templates, and tweak rules so that every structural error surfaces before
//! any query is issued.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use promql_compliance_core::ComparerConfig;
use promql_compliance_core::DEFAULT_ABSOLUTE_TOLERANCE;
use promql_compliance_core::DEFAULT_RELATIVE_TOLERANCE;
use promql_compliance_core::FileEventSink;
use promql_compliance_core::NoopEventSink;
use promql_compliance_core::Placeholder;
use promql_compliance_core::PlaceholderCatalog;
use promql_compliance_core::QueryKind;
use promql_compliance_core::QueryTemplate;
use promql_compliance_core::QueryTweak;
use promql_compliance_core::QueryTweaker;
use promql_compliance_core::QueryWindow;
use promql_compliance_core::RunEventSink;
use promql_compliance_core::StderrEventSink;
use promql_compliance_core::Tolerance;
use promql_compliance_core::runtime::MAX_CONCURRENCY;
use promql_compliance_http::HttpTargetConfig;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "promql-compliance-tester.toml";
/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "PROMQL_COMPLIANCE_CONFIG";
/// Environment variable overriding the telemetry collector URL.
pub const COLLECTOR_URL_ENV_VAR: &str = "INSIGHTS_COLLECTOR_URL";
/// Environment variable overriding the telemetry insert key.
pub const INSERT_KEY_ENV_VAR: &str = "INSIGHTS_INSERT_KEY";
/// Environment variable overriding the telemetry event type.
pub const EVENT_TYPE_ENV_VAR: &str = "PROMQL_COMPLIANCE_EVENT_TYPE";
/// Default telemetry event type.
pub const DEFAULT_EVENT_TYPE: &str = "PromQLComplianceTestResult";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum per-request timeout.
pub(crate) const MIN_TARGET_TIMEOUT_MS: u64 = 100;
/// Maximum per-request timeout.
pub(crate) const MAX_TARGET_TIMEOUT_MS: u64 = 600_000;
/// Maximum diff entries rendered per result.
pub(crate) const MAX_DIFF_ENTRIES_LIMIT: usize = 1000;
/// Default query resolution.
pub(crate) const DEFAULT_STEP_MS: i64 = 10_000;
/// Default query window length.
pub(crate) const DEFAULT_WINDOW_MS: i64 = 600_000;
/// Default distance between now and the window end.
pub(crate) const DEFAULT_END_OFFSET_MS: i64 = 120_000;

// ============================================================================
// SECTION: Top-Level Config
// ============================================================================

/// Complete compliance run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComplianceConfig {
    /// Engine whose answers are treated as correct.
    pub reference_target: HttpTargetConfig,
    /// Engine under test.
    pub test_target: HttpTargetConfig,
    /// Run window and concurrency.
    #[serde(default)]
    pub run: RunConfig,
    /// Comparison tolerance and diff limits.
    #[serde(default)]
    pub comparison: ComparisonConfig,
    /// Run event logging.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Telemetry reporter settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Placeholder catalog in declaration order.
    #[serde(default)]
    pub placeholders: Vec<Placeholder>,
    /// Query templates.
    #[serde(default)]
    pub test_cases: Vec<TestCaseConfig>,
    /// Ordered tweak rules.
    #[serde(default)]
    pub query_tweaks: Vec<QueryTweak>,
}

impl ComplianceConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| {
            ConfigError::Io(format!("{}: {err}", resolved.display()))
        })?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        match ConfigFormat::from_path(&resolved) {
            ConfigFormat::Toml => Self::from_toml_str(content),
            ConfigFormat::Yaml => Self::from_yaml_str(content),
        }
    }

    /// Parses and validates TOML configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates YAML configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_target("reference_target", &self.reference_target)?;
        validate_target("test_target", &self.test_target)?;
        self.run.validate()?;
        self.comparison.validate()?;
        self.logging.validate()?;
        self.telemetry.validate()?;
        self.suite()?;
        Ok(())
    }

    /// Builds the core suite: catalog, templates, and tweak rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a placeholder, template, or tweak rule is
    /// malformed.
    pub fn suite(&self) -> Result<ComplianceSuite, ConfigError> {
        let catalog = PlaceholderCatalog::new(self.placeholders.clone())
            .map_err(|err| ConfigError::Invalid(format!("placeholders: {err}")))?;
        let mut names = BTreeSet::new();
        let mut templates = Vec::with_capacity(self.test_cases.len());
        for (index, case) in self.test_cases.iter().enumerate() {
            let template = case.to_template();
            let tokens = template.placeholders().map_err(|err| {
                ConfigError::Invalid(format!("test_cases[{index}] `{}`: {err}", template.name))
            })?;
            if let Some(unknown) = tokens.iter().find(|token| catalog.get(token).is_none()) {
                return Err(ConfigError::Invalid(format!(
                    "test_cases[{index}] `{}` references unknown placeholder `{unknown}`",
                    template.name
                )));
            }
            if let Some(tolerance) = template.tolerance
                && !tolerance.is_valid()
            {
                return Err(ConfigError::Invalid(format!(
                    "test_cases[{index}] `{}` tolerance must be finite and non-negative",
                    template.name
                )));
            }
            if !names.insert(template.name.clone()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate test case name `{}`",
                    template.name
                )));
            }
            templates.push(template);
        }
        let tweaker = QueryTweaker::new(self.query_tweaks.clone())
            .map_err(|err| ConfigError::Invalid(format!("query_tweaks: {err}")))?;
        Ok(ComplianceSuite {
            catalog,
            templates,
            tweaker,
        })
    }

    /// Derives the run window ending `end_offset_ms` before `now_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the window arithmetic overflows or the
    /// resulting window is invalid.
    pub fn query_window(&self, now_ms: i64) -> Result<QueryWindow, ConfigError> {
        let end_ms = now_ms
            .checked_sub(self.run.end_offset_ms)
            .ok_or_else(|| ConfigError::Invalid("run window end overflows".to_string()))?;
        let start_ms = end_ms
            .checked_sub(self.run.window_ms)
            .ok_or_else(|| ConfigError::Invalid("run window start overflows".to_string()))?;
        QueryWindow::new(start_ms, end_ms, self.run.step_ms)
            .map_err(|err| ConfigError::Invalid(format!("run window: {err}")))
    }

    /// Returns the comparer settings.
    #[must_use]
    pub fn comparer_config(&self) -> ComparerConfig {
        ComparerConfig {
            tolerance: self.comparison.tolerance(),
            max_diff_entries: self.comparison.max_diff_entries,
        }
    }
}

/// Configuration file syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (default).
    Toml,
    /// YAML, selected by a `.yml` or `.yaml` extension.
    Yaml,
}

impl ConfigFormat {
    /// Selects the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml") => {
                Self::Yaml
            }
            _ => Self::Toml,
        }
    }
}

/// Validated core inputs built from configuration.
#[derive(Debug, Clone)]
pub struct ComplianceSuite {
    /// Placeholder catalog.
    pub catalog: PlaceholderCatalog,
    /// Query templates in declaration order.
    pub templates: Vec<QueryTemplate>,
    /// Validated tweak rules.
    pub tweaker: QueryTweaker,
}

// ============================================================================
// SECTION: Test Cases
// ============================================================================

/// One configured query template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestCaseConfig {
    /// Template name; defaults to the query text.
    #[serde(default)]
    pub name: Option<String>,
    /// Query text with `{{name}}` placeholder tokens.
    pub query: String,
    /// The query is expected to fail on the reference target.
    #[serde(default)]
    pub should_fail: bool,
    /// Only success/failure agreement is checked.
    #[serde(default)]
    pub skip_comparison: bool,
    /// Query API used.
    #[serde(default)]
    pub query_type: QueryKind,
    /// Optional free-form note.
    #[serde(default)]
    pub note: Option<String>,
    /// Optional tolerance override.
    #[serde(default)]
    pub tolerance: Option<Tolerance>,
}

impl TestCaseConfig {
    /// Converts the entry into a core template.
    #[must_use]
    pub fn to_template(&self) -> QueryTemplate {
        let name = self.name.clone().unwrap_or_else(|| self.query.clone());
        let mut template = QueryTemplate::new(name, self.query.clone());
        template.should_fail = self.should_fail;
        template.skip_comparison = self.skip_comparison;
        template.kind = self.query_type;
        template.note.clone_from(&self.note);
        template.tolerance = self.tolerance;
        template
    }
}

// ============================================================================
// SECTION: Run
// ============================================================================

/// Run window and worker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Number of test cases compared in parallel.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Query resolution in milliseconds.
    #[serde(default = "default_step_ms")]
    pub step_ms: i64,
    /// Window length in milliseconds.
    #[serde(default = "default_window_ms")]
    pub window_ms: i64,
    /// Distance between now and the window end in milliseconds.
    #[serde(default = "default_end_offset_ms")]
    pub end_offset_ms: i64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            step_ms: DEFAULT_STEP_MS,
            window_ms: DEFAULT_WINDOW_MS,
            end_offset_ms: DEFAULT_END_OFFSET_MS,
        }
    }
}

impl RunConfig {
    /// Validates run settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(ConfigError::Invalid(format!(
                "run.concurrency must be between 1 and {MAX_CONCURRENCY}"
            )));
        }
        if self.step_ms <= 0 {
            return Err(ConfigError::Invalid("run.step_ms must be positive".to_string()));
        }
        if self.window_ms <= 0 {
            return Err(ConfigError::Invalid("run.window_ms must be positive".to_string()));
        }
        if self.end_offset_ms < 0 {
            return Err(ConfigError::Invalid("run.end_offset_ms must be non-negative".to_string()));
        }
        Ok(())
    }
}

/// Serde default for [`RunConfig::concurrency`].
const fn default_concurrency() -> usize {
    1
}

/// Serde default for [`RunConfig::step_ms`].
const fn default_step_ms() -> i64 {
    DEFAULT_STEP_MS
}

/// Serde default for [`RunConfig::window_ms`].
const fn default_window_ms() -> i64 {
    DEFAULT_WINDOW_MS
}

/// Serde default for [`RunConfig::end_offset_ms`].
const fn default_end_offset_ms() -> i64 {
    DEFAULT_END_OFFSET_MS
}

// ============================================================================
// SECTION: Comparison
// ============================================================================

/// Run-wide comparison settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComparisonConfig {
    /// Absolute tolerance.
    #[serde(default = "default_absolute_tolerance")]
    pub absolute_tolerance: f64,
    /// Relative tolerance.
    #[serde(default = "default_relative_tolerance")]
    pub relative_tolerance: f64,
    /// Maximum diff entries rendered per result.
    #[serde(default = "default_max_diff_entries")]
    pub max_diff_entries: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            absolute_tolerance: DEFAULT_ABSOLUTE_TOLERANCE,
            relative_tolerance: DEFAULT_RELATIVE_TOLERANCE,
            max_diff_entries: default_max_diff_entries(),
        }
    }
}

impl ComparisonConfig {
    /// Returns the configured tolerance.
    #[must_use]
    pub const fn tolerance(&self) -> Tolerance {
        Tolerance::new(self.absolute_tolerance, self.relative_tolerance)
    }

    /// Validates comparison settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance().is_valid() {
            return Err(ConfigError::Invalid(
                "comparison tolerances must be finite and non-negative".to_string(),
            ));
        }
        if self.max_diff_entries == 0 || self.max_diff_entries > MAX_DIFF_ENTRIES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "comparison.max_diff_entries must be between 1 and {MAX_DIFF_ENTRIES_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Serde default for [`ComparisonConfig::absolute_tolerance`].
const fn default_absolute_tolerance() -> f64 {
    DEFAULT_ABSOLUTE_TOLERANCE
}

/// Serde default for [`ComparisonConfig::relative_tolerance`].
const fn default_relative_tolerance() -> f64 {
    DEFAULT_RELATIVE_TOLERANCE
}

/// Serde default for [`ComparisonConfig::max_diff_entries`].
const fn default_max_diff_entries() -> usize {
    promql_compliance_core::runtime::DEFAULT_MAX_DIFF_ENTRIES
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Run event sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Events are discarded.
    None,
}

/// Run event logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: LogSinkKind,
    /// Output path for the `file` sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl LoggingConfig {
    /// Validates logging settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkKind::File, Some(path)) => validate_path_string("logging.path", path),
            (LogSinkKind::File, None) => {
                Err(ConfigError::Invalid("logging.path is required for the file sink".to_string()))
            }
            (_, Some(_)) => {
                Err(ConfigError::Invalid("logging.path is only valid for the file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }

    /// Builds the configured event sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the log file cannot be opened.
    pub fn build_sink(&self) -> Result<Arc<dyn RunEventSink>, ConfigError> {
        match (self.sink, &self.path) {
            (LogSinkKind::Stderr, _) => Ok(Arc::new(StderrEventSink)),
            (LogSinkKind::None, _) => Ok(Arc::new(NoopEventSink)),
            (LogSinkKind::File, Some(path)) => {
                let sink = FileEventSink::new(Path::new(path))
                    .map_err(|err| ConfigError::Io(format!("{path}: {err}")))?;
                Ok(Arc::new(sink))
            }
            (LogSinkKind::File, None) => {
                Err(ConfigError::Invalid("logging.path is required for the file sink".to_string()))
            }
        }
    }
}

// ============================================================================
// SECTION: Telemetry
// ============================================================================

/// Telemetry reporter settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Collector endpoint receiving one event per result.
    #[serde(default)]
    pub collector_url: Option<String>,
    /// Insert key sent as `X-Insert-Key`.
    #[serde(default)]
    pub insert_key: Option<String>,
    /// Event type attached to each event.
    #[serde(default = "default_event_type")]
    pub event_type: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            collector_url: None,
            insert_key: None,
            event_type: default_event_type(),
        }
    }
}

impl TelemetryConfig {
    /// Overlays non-empty values from `lookup` (typically the process
    /// environment) onto the configured settings.
    #[must_use]
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.is_empty());
        if let Some(url) = read(COLLECTOR_URL_ENV_VAR) {
            self.collector_url = Some(url);
        }
        if let Some(key) = read(INSERT_KEY_ENV_VAR) {
            self.insert_key = Some(key);
        }
        if let Some(event_type) = read(EVENT_TYPE_ENV_VAR) {
            self.event_type = event_type;
        }
        self
    }

    /// Overlays the process environment onto the configured settings.
    #[must_use]
    pub fn with_process_env(self) -> Self {
        self.with_env_overrides(|name| env::var(name).ok())
    }

    /// Validates telemetry settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the collector URL is malformed or the
    /// event type is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(collector_url) = &self.collector_url {
            validate_http_url("telemetry.collector_url", collector_url)?;
        }
        if self.event_type.trim().is_empty() {
            return Err(ConfigError::Invalid("telemetry.event_type must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Serde default for [`TelemetryConfig::event_type`].
fn default_event_type() -> String {
    DEFAULT_EVENT_TYPE.to_string()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// Parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates an http(s) URL without embedded credentials.
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url =
        Url::parse(value).map_err(|err| ConfigError::Invalid(format!("{field} is invalid: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!("{field} must use http or https")));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(ConfigError::Invalid(format!(
            "{field} must not embed credentials; use headers instead"
        )));
    }
    Ok(())
}

/// Validates one target section.
fn validate_target(field: &str, target: &HttpTargetConfig) -> Result<(), ConfigError> {
    validate_http_url(&format!("{field}.query_url"), &target.query_url)?;
    if !(MIN_TARGET_TIMEOUT_MS ..= MAX_TARGET_TIMEOUT_MS).contains(&target.timeout_ms) {
        return Err(ConfigError::Invalid(format!(
            "{field}.timeout_ms must be between {MIN_TARGET_TIMEOUT_MS} and {MAX_TARGET_TIMEOUT_MS}"
        )));
    }
    if target.max_response_bytes == 0 {
        return Err(ConfigError::Invalid(format!("{field}.max_response_bytes must be positive")));
    }
    if target.user_agent.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field}.user_agent must be non-empty")));
    }
    for (name, value) in &target.headers {
        let valid_name = !name.is_empty()
            && name.bytes().all(|byte| byte.is_ascii_graphic() && byte != b':');
        let valid_value = value.bytes().all(|byte| byte == b'\t' || (byte >= 0x20 && byte != 0x7f));
        if !valid_name || !valid_value {
            return Err(ConfigError::Invalid(format!("{field}.headers `{name}` is invalid")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
