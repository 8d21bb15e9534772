// crates/promql-compliance-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings of the compliance tester.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The compliance tester stores its user-facing strings in a small
//! translation catalog. All runtime output outside of reports is routed
//! through the [`t!`](crate::t) macro. Reports themselves are not translated
//! so that their format stays stable for downstream tooling.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Catalan.
    Ca,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ca => "ca",
        }
    }

    /// Attempts to parse a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let normalized = value.to_ascii_lowercase();
        let lang = normalized.split(['-', '_', '.']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "ca" => Some(Self::Ca),
            _ => None,
        }
    }
}

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "promql-compliance-tester {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("config.load_failed", "Failed to load configuration: {error}"),
    ("config.suite_invalid", "Invalid test suite: {error}"),
    ("config.window_invalid", "Invalid query window: {error}"),
    ("config.clock_invalid", "System clock is outside the supported range."),
    ("logging.init_failed", "Failed to open the run log: {error}"),
    ("suite.expand_failed", "Failed to expand test cases: {error}"),
    ("target.init_failed", "Failed to initialize the {role} target: {error}"),
    ("reporter.init_failed", "Failed to initialize the {format} reporter: {error}"),
    ("run.started", "Running {count} test cases against {test} (reference {reference})."),
    ("run.progress", "[{done}/{total}]"),
    ("run.cancel_requested", "Interrupt received; finishing in-flight comparisons."),
    ("run.cancelled", "Run cancelled after {completed} test cases."),
    ("run.signal_failed", "Failed to listen for interrupts: {error}"),
    ("run.failed", "Run failed: {error}"),
    ("run.worker_failed", "Run worker stopped unexpectedly: {error}"),
    ("report.failed", "Failed to write the {format} report: {error}"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
];

/// Catalan catalog entries.
const CATALOG_CA: &[(&str, &str)] = &[
    ("main.version", "promql-compliance-tester {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "sortida"),
    ("output.write_failed", "No s'ha pogut escriure a {stream}: {error}"),
    ("config.load_failed", "No s'ha pogut carregar la configuració: {error}"),
    ("config.suite_invalid", "Conjunt de proves no vàlid: {error}"),
    ("config.window_invalid", "Finestra de consulta no vàlida: {error}"),
    ("config.clock_invalid", "El rellotge del sistema és fora de l'interval admès."),
    ("logging.init_failed", "No s'ha pogut obrir el registre d'execució: {error}"),
    ("suite.expand_failed", "No s'han pogut expandir els casos de prova: {error}"),
    ("target.init_failed", "No s'ha pogut inicialitzar el destí {role}: {error}"),
    ("reporter.init_failed", "No s'ha pogut inicialitzar l'informe {format}: {error}"),
    ("run.started", "S'executen {count} casos de prova contra {test} (referència {reference})."),
    ("run.progress", "[{done}/{total}]"),
    ("run.cancel_requested", "Interrupció rebuda; s'acaben les comparacions en curs."),
    ("run.cancelled", "Execució cancel·lada després de {completed} casos de prova."),
    ("run.signal_failed", "No s'han pogut escoltar les interrupcions: {error}"),
    ("run.failed", "L'execució ha fallat: {error}"),
    ("run.worker_failed", "Un treballador de l'execució s'ha aturat inesperadament: {error}"),
    ("report.failed", "No s'ha pogut escriure l'informe {format}: {error}"),
    ("i18n.lang.invalid_env", "Valor no vàlid per a {env}: {value}. S'esperava 'en' o 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la sortida que no és en anglès està traduïda automàticament i pot ser inexacta.",
    ),
];

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_CA_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    match locale {
        Locale::En => CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect()),
        Locale::Ca => CATALOG_CA_MAP.get_or_init(|| CATALOG_CA.iter().copied().collect()),
    }
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let locale = current_locale();
    let template = catalog_for(locale)
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}

// ============================================================================
// SECTION: Tests
// ============================================================================
