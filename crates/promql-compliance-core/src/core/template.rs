// crates/promql-compliance-core/src/core/template.rs
// ============================================================================
// Module: Query Templates
// Description: PromQL query strings with embedded placeholder tokens.
// Purpose: Parse and render `{{name}}` tokens for test-case expansion.
// Dependencies: serde, thiserror, crate::core::{catalog, tolerance}
// ============================================================================

//! ## Overview
//! A template is a PromQL query containing zero or more `{{name}}` tokens.
//! Whitespace inside the braces is ignored and a leading `.` is accepted, so
//! `{{ .range }}` and `{{range}}` reference the same placeholder.
//!
//! Invariants:
//! - Every `{{` must be closed by `}}`.
//! - Token names are valid placeholder identifiers.
//! - Templates are immutable once loaded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::catalog::is_valid_placeholder_name;
use crate::core::tolerance::Tolerance;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Token opening delimiter.
const TOKEN_OPEN: &str = "{{";
/// Token closing delimiter.
const TOKEN_CLOSE: &str = "}}";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Query API used to evaluate a test case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Range query over `[start, end)` at `step` resolution.
    #[default]
    Range,
    /// Instant query evaluated at the window end.
    Instant,
}

impl QueryKind {
    /// Returns a stable label for the query kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Range => "range",
            Self::Instant => "instant",
        }
    }
}

/// Errors raised while parsing or rendering a template.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A `{{` has no matching `}}`.
    #[error("template {template}: unclosed placeholder token at byte {offset}")]
    Unclosed {
        /// Template name.
        template: String,
        /// Byte offset of the opening delimiter.
        offset: usize,
    },
    /// A token is empty or not a valid identifier.
    #[error("template {template}: invalid placeholder token `{token}`")]
    InvalidToken {
        /// Template name.
        template: String,
        /// Raw token text.
        token: String,
    },
    /// A token has no bound value during rendering.
    #[error("template {template}: no value bound for placeholder {placeholder}")]
    Unbound {
        /// Template name.
        template: String,
        /// Placeholder name.
        placeholder: String,
    },
}

/// A query template with placeholder tokens and comparison metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryTemplate {
    /// Human-readable template name, unique within a suite.
    pub name: String,
    /// Raw query text with `{{name}}` tokens.
    pub query: String,
    /// The query is expected to fail on the reference target.
    pub should_fail: bool,
    /// Only success/failure agreement is checked; values are not compared.
    pub skip_comparison: bool,
    /// Optional free-form note.
    pub note: Option<String>,
    /// Optional per-template tolerance override.
    pub tolerance: Option<Tolerance>,
    /// Query API used for this template.
    pub kind: QueryKind,
}

/// Parsed template fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    /// Literal query text.
    Literal(&'a str),
    /// Placeholder reference by name.
    Token(&'a str),
}

impl QueryTemplate {
    /// Creates a range-query template with default metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            should_fail: false,
            skip_comparison: false,
            note: None,
            tolerance: None,
            kind: QueryKind::Range,
        }
    }

    /// Returns the distinct placeholder names referenced by the template, in
    /// order of first appearance.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when a token is malformed.
    pub fn placeholders(&self) -> Result<Vec<String>, TemplateError> {
        let mut names: Vec<String> = Vec::new();
        for segment in self.segments()? {
            if let Segment::Token(name) = segment
                && !names.iter().any(|existing| existing == name)
            {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    /// Renders the template, replacing every token with its bound value.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when a token is malformed or unbound.
    pub fn render(&self, bindings: &[(&str, &str)]) -> Result<String, TemplateError> {
        let mut rendered = String::with_capacity(self.query.len());
        for segment in self.segments()? {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Token(name) => {
                    let value = bindings
                        .iter()
                        .find(|(placeholder, _)| *placeholder == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| TemplateError::Unbound {
                            template: self.name.clone(),
                            placeholder: name.to_string(),
                        })?;
                    rendered.push_str(value);
                }
            }
        }
        Ok(rendered)
    }

    /// Splits the query into literal and token segments.
    fn segments(&self) -> Result<Vec<Segment<'_>>, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = self.query.as_str();
        let mut consumed = 0;
        while let Some(open) = rest.find(TOKEN_OPEN) {
            if open > 0 {
                segments.push(Segment::Literal(&rest[.. open]));
            }
            let after_open = &rest[open + TOKEN_OPEN.len() ..];
            let close = after_open.find(TOKEN_CLOSE).ok_or_else(|| TemplateError::Unclosed {
                template: self.name.clone(),
                offset: consumed + open,
            })?;
            let raw = &after_open[.. close];
            let name = raw.trim();
            let name = name.strip_prefix('.').unwrap_or(name).trim();
            if !is_valid_placeholder_name(name) {
                return Err(TemplateError::InvalidToken {
                    template: self.name.clone(),
                    token: raw.to_string(),
                });
            }
            segments.push(Segment::Token(name));
            let advance = open + TOKEN_OPEN.len() + close + TOKEN_CLOSE.len();
            consumed += advance;
            rest = &rest[advance ..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest));
        }
        Ok(segments)
    }
}
