// crates/promql-compliance-core/src/core/hashing.rs
// ============================================================================
// Module: Suite Fingerprint
// Description: Canonical hashing of an expanded test-case sequence.
// Purpose: Let two reports prove they compared the same query matrix.
// Dependencies: serde, serde_jcs, sha2, thiserror
// ============================================================================

//! ## Overview
//! The fingerprint is SHA-256 over the RFC 8785 (JCS) encoding of each test
//! case's identity: template, query, window, and query kind. Tweaks and
//! tolerances are excluded, so relaxing a comparison keeps the fingerprint.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

use crate::core::template::QueryKind;
use crate::core::test_case::QueryWindow;
use crate::core::test_case::TestCase;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when computing the suite fingerprint.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

// ============================================================================
// SECTION: Fingerprint
// ============================================================================

/// Identity fields of a test case that participate in the fingerprint.
#[derive(Serialize)]
struct CaseIdentity<'a> {
    /// Template name.
    template: &'a str,
    /// Concrete query.
    query: &'a str,
    /// Query window.
    window: QueryWindow,
    /// Query API.
    kind: QueryKind,
}

/// Returns the lowercase hex SHA-256 fingerprint of a test-case sequence.
///
/// # Errors
///
/// Returns [`HashError::Canonicalization`] when serialization fails.
pub fn suite_fingerprint(cases: &[TestCase]) -> Result<String, HashError> {
    let identities: Vec<CaseIdentity<'_>> = cases
        .iter()
        .map(|case| CaseIdentity {
            template: &case.template,
            query: &case.query,
            window: case.window,
            kind: case.kind,
        })
        .collect();
    let bytes = serde_jcs::to_vec(&identities)
        .map_err(|err| HashError::Canonicalization(err.to_string()))?;
    let digest = Sha256::digest(&bytes);
    Ok(hex_encode(&digest))
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(char::from(HEX[usize::from(byte >> 4)]));
        out.push(char::from(HEX[usize::from(byte & 0x0f)]));
    }
    out
}
