// crates/promql-compliance-core/src/core/catalog.rs
// ============================================================================
// Module: Placeholder Catalog
// Description: Named value sets substituted into query templates.
// Purpose: Provide ordered, duplicate-free placeholder values for expansion.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A catalog maps placeholder names to the ordered values they may take.
//! Declaration order matters: the expander enumerates the Cartesian product
//! in catalog order, so reordering placeholders reorders test cases.
//!
//! Invariants:
//! - Placeholder names are unique and match `[A-Za-z_][A-Za-z0-9_]*`.
//! - Values within one placeholder are unique.
//! - An empty value set is representable; expansion rejects it on use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A named placeholder and its ordered substitution values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Placeholder {
    /// Placeholder name referenced as `{{name}}` in templates.
    pub name: String,
    /// Ordered substitution values.
    pub values: Vec<String>,
}

impl Placeholder {
    /// Creates a placeholder from a name and values.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Errors raised when building a placeholder catalog.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The same placeholder name was declared twice.
    #[error("duplicate placeholder: {0}")]
    DuplicatePlaceholder(String),
    /// A placeholder declares the same value twice.
    #[error("placeholder {placeholder} declares duplicate value `{value}`")]
    DuplicateValue {
        /// Placeholder name.
        placeholder: String,
        /// Repeated value.
        value: String,
    },
    /// A placeholder name is not a valid identifier.
    #[error("invalid placeholder name: `{0}`")]
    InvalidName(String),
}

/// Ordered placeholder catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderCatalog {
    /// Placeholders in declaration order.
    placeholders: Vec<Placeholder>,
}

impl PlaceholderCatalog {
    /// Builds a catalog, rejecting duplicate names, duplicate values, and
    /// malformed names.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the catalog is malformed.
    pub fn new(placeholders: Vec<Placeholder>) -> Result<Self, CatalogError> {
        let mut names = BTreeSet::new();
        for placeholder in &placeholders {
            if !is_valid_placeholder_name(&placeholder.name) {
                return Err(CatalogError::InvalidName(placeholder.name.clone()));
            }
            if !names.insert(placeholder.name.as_str()) {
                return Err(CatalogError::DuplicatePlaceholder(placeholder.name.clone()));
            }
            let mut seen = BTreeSet::new();
            for value in &placeholder.values {
                if !seen.insert(value.as_str()) {
                    return Err(CatalogError::DuplicateValue {
                        placeholder: placeholder.name.clone(),
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(Self {
            placeholders,
        })
    }

    /// Returns the placeholder with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Placeholder> {
        self.placeholders.iter().find(|placeholder| placeholder.name == name)
    }

    /// Returns the declaration position of the named placeholder.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.placeholders.iter().position(|placeholder| placeholder.name == name)
    }

    /// Iterates placeholders in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Placeholder> {
        self.placeholders.iter()
    }

    /// Returns the number of declared placeholders.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.placeholders.len()
    }

    /// Returns true when no placeholders are declared.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }
}

/// Returns true when `name` is a valid placeholder identifier.
#[must_use]
pub fn is_valid_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
